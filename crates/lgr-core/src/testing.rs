//! In-memory fakes shared by the unit tests of this crate.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicI32, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    catalog::{
        port::CatalogPort,
        types::{Chapter, MangaRef, Page},
    },
    domain::{ChatId, MessageId, MessageRef, Reader, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::RichMessage,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    SendHtml(ChatId, String),
    SendRich(MessageRef),
    EditRich(MessageRef),
    Delete(MessageRef),
    AddReaction(MessageRef, String),
    RemoveReaction(MessageRef, String),
    RemoveUserReaction(MessageRef, String, UserId),
    Direct(UserId, String),
}

/// Records every outbound call and keeps the live state of each message.
#[derive(Default)]
pub struct FakeMessenger {
    next_id: AtomicI32,
    calls: Mutex<Vec<Call>>,
    live: Mutex<HashMap<MessageRef, RichMessage>>,
    reactions: Mutex<HashMap<MessageRef, Vec<String>>>,
    vanished: Mutex<HashSet<MessageRef>>,
    fail_edits: AtomicBool,
    edit_delay: Mutex<Duration>,
}

impl FakeMessenger {
    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        MessageRef {
            chat_id,
            message_id: MessageId(id),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_html(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendHtml(_, html) => Some(html),
                _ => None,
            })
            .collect()
    }

    pub fn directs(&self) -> Vec<(UserId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Direct(u, html) => Some((u, html)),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<MessageRef> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn rich_sends(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::SendRich(_)))
            .count()
    }

    pub fn edits(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::EditRich(_)))
            .count()
    }

    /// Current content of a live message.
    pub fn shown(&self, msg: MessageRef) -> Option<RichMessage> {
        self.live.lock().unwrap().get(&msg).cloned()
    }

    pub fn is_live(&self, msg: MessageRef) -> bool {
        self.live.lock().unwrap().contains_key(&msg)
    }

    pub fn reactions_on(&self, msg: MessageRef) -> Vec<String> {
        self.reactions
            .lock()
            .unwrap()
            .get(&msg)
            .cloned()
            .unwrap_or_default()
    }

    /// Simulate a user deleting the message by hand.
    pub fn vanish(&self, msg: MessageRef) {
        self.live.lock().unwrap().remove(&msg);
        self.vanished.lock().unwrap().insert(msg);
    }

    /// Make every `edit_rich` fail with a platform error.
    pub fn set_fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    /// Make every `edit_rich` take `delay` before it lands.
    pub fn set_edit_delay(&self, delay: Duration) {
        *self.edit_delay.lock().unwrap() = delay;
    }

    fn check_present(&self, msg: MessageRef) -> Result<()> {
        if self.vanished.lock().unwrap().contains(&msg) || !self.is_live(msg) {
            return Err(Error::NotFound(format!("message {}", msg.message_id.0)));
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.record(Call::SendHtml(chat_id, html.to_string()));
        Ok(self.alloc(chat_id))
    }

    async fn send_rich(&self, chat_id: ChatId, msg: &RichMessage) -> Result<MessageRef> {
        let m = self.alloc(chat_id);
        self.record(Call::SendRich(m));
        self.live.lock().unwrap().insert(m, msg.clone());
        Ok(m)
    }

    async fn edit_rich(&self, msg: MessageRef, rich: &RichMessage) -> Result<()> {
        self.record(Call::EditRich(msg));
        let delay = *self.edit_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(Error::External("edit rejected".to_string()));
        }
        self.check_present(msg)?;
        self.live.lock().unwrap().insert(msg, rich.clone());
        Ok(())
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.record(Call::Delete(msg));
        self.check_present(msg)?;
        self.live.lock().unwrap().remove(&msg);
        self.reactions.lock().unwrap().remove(&msg);
        Ok(())
    }

    async fn add_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()> {
        self.record(Call::AddReaction(msg, emoji.to_string()));
        self.check_present(msg)?;
        let mut map = self.reactions.lock().unwrap();
        let list = map.entry(msg).or_default();
        if !list.iter().any(|e| e == emoji) {
            list.push(emoji.to_string());
        }
        Ok(())
    }

    async fn remove_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()> {
        self.record(Call::RemoveReaction(msg, emoji.to_string()));
        self.check_present(msg)?;
        if let Some(list) = self.reactions.lock().unwrap().get_mut(&msg) {
            list.retain(|e| e != emoji);
        }
        Ok(())
    }

    async fn remove_user_reaction(
        &self,
        msg: MessageRef,
        emoji: &str,
        user: UserId,
    ) -> Result<()> {
        self.record(Call::RemoveUserReaction(msg, emoji.to_string(), user));
        Ok(())
    }

    async fn send_direct(&self, user: UserId, html: &str) -> Result<()> {
        self.record(Call::Direct(user, html.to_string()));
        Ok(())
    }
}

/// Catalog backed by fixed data.
#[derive(Default)]
pub struct FakeCatalog {
    pub mangas: Vec<MangaRef>,
    pub chapters: Vec<Chapter>,
    pub offsets_seen: Mutex<Vec<u32>>,
}

#[async_trait]
impl CatalogPort for FakeCatalog {
    async fn list_mangas(&self) -> Result<Vec<MangaRef>> {
        Ok(self.mangas.clone())
    }

    async fn list_chapters(&self, slug: &str, page_offset: u32) -> Result<Vec<Chapter>> {
        self.offsets_seen.lock().unwrap().push(page_offset);
        Ok(self
            .chapters
            .iter()
            .filter(|c| c.manga.slug == slug)
            .cloned()
            .collect())
    }

    async fn get_chapter(&self, slug: &str, number: f64) -> Result<Option<Chapter>> {
        Ok(self
            .chapters
            .iter()
            .find(|c| c.manga.slug == slug && c.number == number)
            .cloned())
    }
}

pub fn naruto() -> MangaRef {
    MangaRef {
        id: "m1".to_string(),
        slug: "naruto".to_string(),
        name: "Naruto".to_string(),
        thumb: Some("naruto/thumb.jpg".to_string()),
    }
}

pub fn chapter(pages: usize) -> Arc<Chapter> {
    Arc::new(chapter_value(1.0, pages))
}

pub fn chapter_value(number: f64, pages: usize) -> Chapter {
    Chapter {
        id: format!("c{number}"),
        number,
        name: None,
        thumb: Some("naruto/1/thumb.jpg".to_string()),
        pages: (0..pages)
            .map(|i| Page {
                colored: None,
                original: format!("naruto/1/{}.jpg", i + 1),
            })
            .collect(),
        manga: naruto(),
    }
}

pub fn owner() -> Reader {
    Reader {
        id: UserId(100),
        name: "@owner".to_string(),
    }
}

pub fn other_user() -> UserId {
    UserId(200)
}
