//! Telegram adapter (teloxide).
//!
//! This crate implements the `lgr-core` MessagingPort over Telegram Bot API.
//! Telegram has no reactions a bot can offer as buttons, so reaction
//! affordances are rendered as an inline keyboard whose callback data is the
//! glyph itself.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, InputFile, InputMedia, InputMediaPhoto,
        ParseMode,
    },
    ApiError, RequestError,
};

use tokio::time::sleep;
use tracing::debug;

pub mod handlers;
pub mod router;

use lgr_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    errors::Error,
    formatting::rich_caption_html,
    messaging::{
        port::MessagingPort,
        types::RichMessage,
    },
    Result,
};

/// Buttons currently attached to each message we manage.
#[derive(Debug, Default)]
struct KeyboardMap {
    inner: Mutex<HashMap<MessageRef, Vec<String>>>,
}

impl KeyboardMap {
    fn lock(&self) -> MutexGuard<'_, HashMap<MessageRef, Vec<String>>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current(&self, msg: MessageRef) -> Vec<String> {
        self.lock().get(&msg).cloned().unwrap_or_default()
    }

    /// Apply `change`. Returns `(before, after)` only if it changed anything.
    fn stage(
        &self,
        msg: MessageRef,
        change: impl FnOnce(&mut Vec<String>),
    ) -> Option<(Vec<String>, Vec<String>)> {
        let mut map = self.lock();
        let entry = map.entry(msg).or_default();
        let before = entry.clone();
        change(entry);
        if *entry == before {
            return None;
        }
        Some((before, entry.clone()))
    }

    /// Undo a staged change that never reached the chat, unless a later one
    /// replaced it meanwhile.
    fn rollback(&self, msg: MessageRef, before: Vec<String>, pushed: &[String]) {
        let mut map = self.lock();
        if let Some(entry) = map.get_mut(&msg) {
            if entry.as_slice() == pushed {
                *entry = before;
            }
        }
    }

    fn forget(&self, msg: MessageRef) {
        self.lock().remove(&msg);
    }
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
    keyboards: Arc<KeyboardMap>,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            keyboards: Arc::new(KeyboardMap::default()),
        }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: RequestError) -> Error {
        match e {
            RequestError::Api(
                ApiError::MessageToDeleteNotFound
                | ApiError::MessageToEditNotFound
                | ApiError::MessageIdInvalid,
            ) => Error::NotFound(format!("telegram: {e}")),
            other => Error::External(format!("telegram error: {other}")),
        }
    }

    fn photo(url: &str) -> Result<InputFile> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| Error::External(format!("invalid image url {url}: {e}")))?;
        Ok(InputFile::url(url))
    }

    async fn retry_after<T, Fut>(
        &self,
        mut op: impl FnMut() -> Fut,
    ) -> std::result::Result<T, RequestError>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Err(RequestError::RetryAfter(d)) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    sleep(d).await;
                }
                other => return other,
            }
        }
    }

    async fn with_retry<T, Fut>(&self, op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, RequestError>>,
        Fut::IntoFuture: Send,
    {
        self.retry_after(op).await.map_err(Self::map_err)
    }

    /// Edits that change nothing are reported by Telegram as errors.
    async fn edit<T, Fut>(&self, op: impl FnMut() -> Fut) -> Result<()>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, RequestError>>,
        Fut::IntoFuture: Send,
    {
        match self.retry_after(op).await {
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(Self::map_err(e)),
        }
    }

    /// Apply `change` to the message's buttons and push the result if it differs.
    async fn update_keyboard(
        &self,
        msg: MessageRef,
        change: impl FnOnce(&mut Vec<String>),
    ) -> Result<()> {
        let Some((before, buttons)) = self.keyboards.stage(msg, change) else {
            return Ok(());
        };

        let markup = keyboard_markup(&buttons);
        let result = self
            .edit(|| {
                self.bot
                    .edit_message_reply_markup(
                        Self::tg_chat(msg.chat_id),
                        Self::tg_msg_id(msg.message_id),
                    )
                    .reply_markup(markup.clone())
            })
            .await;
        match &result {
            Err(e) if e.is_not_found() => self.keyboards.forget(msg),
            Err(_) => self.keyboards.rollback(msg, before, &buttons),
            Ok(()) => {}
        }
        result
    }
}

/// One row of buttons; each button's callback data is its glyph.
pub fn keyboard_markup(buttons: &[String]) -> InlineKeyboardMarkup {
    if buttons.is_empty() {
        return InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new());
    }
    InlineKeyboardMarkup::new(vec![buttons
        .iter()
        .map(|b| InlineKeyboardButton::callback(b.clone(), b.clone()))
        .collect::<Vec<_>>()])
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html)
                    .disable_web_page_preview(true)
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_rich(&self, chat_id: ChatId, rich: &RichMessage) -> Result<MessageRef> {
        let caption = rich_caption_html(rich);
        let msg = match rich.image_url.as_deref() {
            Some(url) => {
                let photo = Self::photo(url)?;
                self.with_retry(|| {
                    self.bot
                        .send_photo(Self::tg_chat(chat_id), photo.clone())
                        .caption(caption.clone())
                        .parse_mode(ParseMode::Html)
                })
                .await?
            }
            None => {
                self.with_retry(|| {
                    self.bot
                        .send_message(Self::tg_chat(chat_id), caption.clone())
                        .parse_mode(ParseMode::Html)
                })
                .await?
            }
        };

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_rich(&self, msg: MessageRef, rich: &RichMessage) -> Result<()> {
        let caption = rich_caption_html(rich);
        // Replacing the media drops the reply markup unless it is sent again.
        let markup = keyboard_markup(&self.keyboards.current(msg));
        let chat = Self::tg_chat(msg.chat_id);
        let id = Self::tg_msg_id(msg.message_id);

        match rich.image_url.as_deref() {
            Some(url) => {
                let media = InputMedia::Photo(
                    InputMediaPhoto::new(Self::photo(url)?)
                        .caption(caption)
                        .parse_mode(ParseMode::Html),
                );
                self.edit(|| {
                    self.bot
                        .edit_message_media(chat, id, media.clone())
                        .reply_markup(markup.clone())
                })
                .await
            }
            None => {
                self.edit(|| {
                    self.bot
                        .edit_message_caption(chat, id)
                        .caption(caption.clone())
                        .parse_mode(ParseMode::Html)
                        .reply_markup(markup.clone())
                })
                .await
            }
        }
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        let result = self
            .with_retry(|| {
                self.bot
                    .delete_message(Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg.message_id))
            })
            .await;
        if result.is_ok() || matches!(result, Err(ref e) if e.is_not_found()) {
            self.keyboards.forget(msg);
        }
        result.map(|_| ())
    }

    async fn add_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()> {
        self.update_keyboard(msg, |buttons| {
            if !buttons.iter().any(|b| b == emoji) {
                buttons.push(emoji.to_string());
            }
        })
        .await
    }

    async fn remove_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()> {
        self.update_keyboard(msg, |buttons| buttons.retain(|b| b != emoji))
            .await
    }

    async fn remove_user_reaction(
        &self,
        msg: MessageRef,
        _emoji: &str,
        user: UserId,
    ) -> Result<()> {
        // Button presses leave no mark; the callback query is answered by the handler.
        debug!(message = msg.message_id.0, user = %user, "button press acknowledged");
        Ok(())
    }

    async fn send_direct(&self, user: UserId, html: &str) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .send_message(Self::tg_chat(ChatId::from(user)), html.to_string())
                .parse_mode(ParseMode::Html)
        })
        .await?;
        Ok(())
    }
}
