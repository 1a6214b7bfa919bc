use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{
    domain::{ChatId, MessageRef, UserId},
    messaging::{
        port::MessagingPort,
        types::RichMessage,
    },
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    /// Minimum spacing between *any* API calls (global flood control).
    pub global_min_interval: Duration,
    /// Minimum spacing between calls per chat.
    pub per_chat_min_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        // Page flips are human-paced; keep per-chat spacing short so a fast
        // reader does not feel the limiter.
        Self {
            global_min_interval: Duration::from_millis(40), // ~25/sec
            per_chat_min_interval: Duration::from_millis(350),
        }
    }
}

#[derive(Debug)]
struct IntervalLimiter {
    interval: Duration,
    next: Instant,
}

impl IntervalLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Reserve the next slot and return the wait duration required before executing.
    fn reserve(&mut self) -> Duration {
        let now = Instant::now();
        let start = if now >= self.next { now } else { self.next };
        self.next = start + self.interval;
        start.saturating_duration_since(now)
    }
}

/// MessagingPort decorator that rate-limits outbound calls.
///
/// Each reading page flip costs an edit plus a few affordance updates, so a
/// busy shared session can burst quickly. This spreads those calls out to stay
/// clear of platform 429s.
pub struct ThrottledMessenger {
    inner: Arc<dyn MessagingPort>,
    cfg: ThrottleConfig,
    global: Mutex<IntervalLimiter>,
    per_chat: Mutex<HashMap<i64, Arc<Mutex<IntervalLimiter>>>>,
}

impl ThrottledMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, cfg: ThrottleConfig) -> Self {
        Self {
            inner,
            cfg,
            global: Mutex::new(IntervalLimiter::new(cfg.global_min_interval)),
            per_chat: Mutex::new(HashMap::new()),
        }
    }

    async fn limiter_for_chat(&self, chat_id: i64) -> Arc<Mutex<IntervalLimiter>> {
        let mut map = self.per_chat.lock().await;
        map.entry(chat_id)
            .or_insert_with(|| {
                Arc::new(Mutex::new(IntervalLimiter::new(
                    self.cfg.per_chat_min_interval,
                )))
            })
            .clone()
    }

    async fn throttle_chat(&self, chat_id: i64) {
        let global_wait = { self.global.lock().await.reserve() };
        let chat_wait = {
            let lim = self.limiter_for_chat(chat_id).await;
            let mut guard = lim.lock().await;
            guard.reserve()
        };

        let wait = global_wait.max(chat_wait);
        if wait > Duration::ZERO {
            sleep(wait).await;
        }
    }

    async fn throttle_global(&self) {
        let wait = { self.global.lock().await.reserve() };
        if wait > Duration::ZERO {
            sleep(wait).await;
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for ThrottledMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.throttle_chat(chat_id.0).await;
        self.inner.send_html(chat_id, html).await
    }

    async fn send_rich(&self, chat_id: ChatId, msg: &RichMessage) -> Result<MessageRef> {
        self.throttle_chat(chat_id.0).await;
        self.inner.send_rich(chat_id, msg).await
    }

    async fn edit_rich(&self, msg: MessageRef, rich: &RichMessage) -> Result<()> {
        self.throttle_chat(msg.chat_id.0).await;
        self.inner.edit_rich(msg, rich).await
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.throttle_chat(msg.chat_id.0).await;
        self.inner.delete_message(msg).await
    }

    async fn add_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()> {
        self.throttle_chat(msg.chat_id.0).await;
        self.inner.add_reaction(msg, emoji).await
    }

    async fn remove_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()> {
        self.throttle_chat(msg.chat_id.0).await;
        self.inner.remove_reaction(msg, emoji).await
    }

    async fn remove_user_reaction(
        &self,
        msg: MessageRef,
        emoji: &str,
        user: UserId,
    ) -> Result<()> {
        // Runs ahead of every page flip; keep it off the per-chat queue.
        self.throttle_global().await;
        self.inner.remove_user_reaction(msg, emoji, user).await
    }

    async fn send_direct(&self, user: UserId, html: &str) -> Result<()> {
        // Private chat ids are not paced with the group chat; global only.
        self.throttle_global().await;
        self.inner.send_direct(user, html).await
    }
}
