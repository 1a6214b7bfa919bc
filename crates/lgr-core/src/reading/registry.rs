use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    domain::{MessageRef, UserId},
    reading::session::ReadingSession,
};

/// Process-wide table of live reading sessions, keyed by owner.
///
/// Created empty at startup and handed to whoever needs lookups. Holds at most
/// one session per owner.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<UserId, Arc<ReadingSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert by owner. Returns the session that was displaced, if it was a
    /// different one.
    pub async fn put(&self, session: Arc<ReadingSession>) -> Option<Arc<ReadingSession>> {
        let mut map = self.inner.lock().await;
        let prev = map.insert(session.owner().id, session.clone());
        prev.filter(|p| !Arc::ptr_eq(p, &session))
    }

    pub async fn get_by_owner(&self, owner: UserId) -> Option<Arc<ReadingSession>> {
        self.inner.lock().await.get(&owner).cloned()
    }

    /// Which session renders into `handle`. Linear scan; concurrent sessions are few.
    pub async fn get_by_display_handle(&self, handle: MessageRef) -> Option<Arc<ReadingSession>> {
        let map = self.inner.lock().await;
        map.values()
            .find(|s| s.display_handle() == Some(handle))
            .cloned()
    }

    pub async fn remove(&self, owner: UserId) -> Option<Arc<ReadingSession>> {
        self.inner.lock().await.remove(&owner)
    }

    /// Remove the owner's entry only while it still points at `session`.
    pub async fn remove_if(&self, owner: UserId, session: &ReadingSession) -> bool {
        let mut map = self.inner.lock().await;
        let matches = map
            .get(&owner)
            .map(|s| std::ptr::eq(Arc::as_ptr(s), session))
            .unwrap_or(false);
        if matches {
            map.remove(&owner);
        }
        matches
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
