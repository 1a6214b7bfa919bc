use std::sync::Arc;

use tracing::debug;

use crate::{
    domain::UserId,
    messaging::types::ReactionEvent,
    reading::{glyph, ReaderContext},
    Result,
};

/// What a reaction glyph asks a session to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavCommand {
    Next,
    Prev,
    Stop,
    Share,
    Unshare,
}

impl NavCommand {
    pub fn from_glyph(emoji: &str) -> Option<Self> {
        match emoji {
            glyph::NEXT => Some(Self::Next),
            glyph::PREV => Some(Self::Prev),
            glyph::STOP => Some(Self::Stop),
            glyph::SHARE => Some(Self::Share),
            glyph::UNSHARE => Some(Self::Unshare),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    SelfReaction,
    UnknownMessage,
    Forbidden,
    UnknownGlyph,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionOutcome {
    Applied(NavCommand),
    Ignored(IgnoreReason),
}

/// Turns reactions on reading displays into session commands.
///
/// Pipeline: self filter, retract the mark, resolve the session, access check,
/// dispatch. Every rejection is silent.
pub struct ReactionController {
    ctx: Arc<ReaderContext>,
    bot_user: UserId,
}

impl ReactionController {
    pub fn new(ctx: Arc<ReaderContext>, bot_user: UserId) -> Self {
        Self { ctx, bot_user }
    }

    pub async fn handle(&self, ev: &ReactionEvent) -> Result<ReactionOutcome> {
        if ev.actor == self.bot_user {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::SelfReaction));
        }

        // Reactions are buttons, not votes.
        if let Err(e) = self
            .ctx
            .messenger
            .remove_user_reaction(ev.message, &ev.emoji, ev.actor)
            .await
        {
            debug!(actor = %ev.actor, "could not retract reaction: {e}");
        }

        let Some(session) = self.ctx.registry.get_by_display_handle(ev.message).await else {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::UnknownMessage));
        };

        if !session.may_navigate(ev.actor) {
            debug!(actor = %ev.actor, owner = %session.owner().id, "reaction on private session ignored");
            return Ok(ReactionOutcome::Ignored(IgnoreReason::Forbidden));
        }

        let Some(cmd) = NavCommand::from_glyph(&ev.emoji) else {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::UnknownGlyph));
        };

        match cmd {
            NavCommand::Next => {
                session.next().await?;
            }
            NavCommand::Prev => {
                session.prev().await?;
            }
            NavCommand::Stop => {
                session.stop().await;
            }
            NavCommand::Share => {
                session.set_shared(true).await?;
            }
            NavCommand::Unshare => {
                session.set_shared(false).await?;
            }
        }

        Ok(ReactionOutcome::Applied(cmd))
    }
}
