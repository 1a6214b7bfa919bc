use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex as StdMutex,
};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    catalog::types::Chapter,
    domain::{ChatId, MessageRef, Reader, UserId},
    errors::Error,
    formatting::escape_html,
    messaging::types::RichMessage,
    reading::{
        glyph,
        render::{self, DisplayState},
        ReaderContext,
    },
    Result,
};

/// A requested page position.
///
/// `NotANumber` comes from a page argument that did not parse; asking for it
/// tears the session down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageArg {
    Number(i64),
    NotANumber,
}

#[derive(Clone, Debug)]
pub struct StartReading {
    pub owner: Reader,
    pub chat_id: ChatId,
    pub chapter: Arc<Chapter>,
    /// Zero-based, clamped into the chapter.
    pub page: PageArg,
    pub shared: bool,
}

#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub owner: Reader,
    pub chapter: Arc<Chapter>,
    pub page: usize,
    pub shared: bool,
    pub display: Option<MessageRef>,
    pub title: String,
}

/// One user's live reading position, bound to one chat message.
///
/// Mutating operations queue on `page` so commands for one session apply in
/// arrival order. `stopped` flips exactly once.
pub struct ReadingSession {
    ctx: Arc<ReaderContext>,
    owner: Reader,
    chat_id: ChatId,
    chapter: Arc<Chapter>,
    page: Mutex<usize>,
    shared: AtomicBool,
    stopped: AtomicBool,
    display: StdMutex<Option<MessageRef>>,
    expiry: StdMutex<Option<CancellationToken>>,
}

impl ReadingSession {
    /// Start reading `req.chapter`, replacing any session the owner already has.
    ///
    /// Returns `Ok(None)` when the requested page was not a number; the new
    /// session is stopped without ever being displayed.
    pub async fn create(ctx: &Arc<ReaderContext>, req: StartReading) -> Result<Option<Arc<Self>>> {
        if req.chapter.pages.is_empty() {
            return Err(Error::Catalog(format!(
                "chapter {} {} has no pages",
                req.chapter.manga.slug,
                req.chapter.number_label()
            )));
        }

        if let Some(prev) = ctx.registry.get_by_owner(req.owner.id).await {
            prev.stop().await;
        }

        let initial = match req.page {
            PageArg::Number(n) => clamp_page(n, req.chapter.last_page()),
            PageArg::NotANumber => 0,
        };

        let session = Arc::new(Self {
            ctx: ctx.clone(),
            owner: req.owner,
            chat_id: req.chat_id,
            chapter: req.chapter,
            page: Mutex::new(initial),
            shared: AtomicBool::new(req.shared),
            stopped: AtomicBool::new(false),
            display: StdMutex::new(None),
            expiry: StdMutex::new(None),
        });

        // Registered before the first render so early reactions resolve.
        if let Some(displaced) = ctx.registry.put(session.clone()).await {
            displaced.stop().await;
        }

        if req.page == PageArg::NotANumber {
            session.stop().await;
            return Ok(None);
        }

        let rich = session.render_at(initial);
        let handle = match ctx.messenger.send_rich(session.chat_id, &rich).await {
            Ok(h) => h,
            Err(e) => {
                session.stop().await;
                return Err(e);
            }
        };
        session.set_display(Some(handle));

        // A stop that ran during the send could not see the handle.
        if session.is_stopped() {
            if let Some(orphan) = session.take_display() {
                session.delete_display(orphan).await;
            }
            return Ok(None);
        }

        info!(
            owner = %session.owner.id,
            manga = %session.chapter.manga.slug,
            chapter = %session.chapter.number_label(),
            page = initial,
            shared = req.shared,
            "reading session started"
        );

        match session.set_page(PageArg::Number(initial as i64)).await {
            Ok(Some(_)) => Ok(Some(session)),
            Ok(None) => Ok(None),
            Err(e) => {
                // Without a timer nothing would ever clean this session up.
                session.stop().await;
                Err(e)
            }
        }
    }

    pub fn owner(&self) -> &Reader {
        &self.owner
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn chapter(&self) -> &Arc<Chapter> {
        &self.chapter
    }

    pub fn is_shared(&self) -> bool {
        self.shared.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn display_handle(&self) -> Option<MessageRef> {
        *lock(&self.display)
    }

    /// Anyone may navigate a shared session; otherwise only the owner.
    pub fn may_navigate(&self, user: UserId) -> bool {
        self.is_shared() || user == self.owner.id
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let page = *self.page.lock().await;
        SessionSnapshot {
            owner: self.owner.clone(),
            chapter: self.chapter.clone(),
            page,
            shared: self.is_shared(),
            display: self.display_handle(),
            title: render::title(&self.chapter, page),
        }
    }

    /// Move to `page` (clamped). Returns the page shown, or `None` if the
    /// session is (or just got) stopped.
    pub async fn set_page(self: &Arc<Self>, page: PageArg) -> Result<Option<usize>> {
        self.navigate(|_| page).await
    }

    pub async fn next(self: &Arc<Self>) -> Result<Option<usize>> {
        self.navigate(|p| PageArg::Number(p as i64 + 1)).await
    }

    pub async fn prev(self: &Arc<Self>) -> Result<Option<usize>> {
        self.navigate(|p| PageArg::Number(p as i64 - 1)).await
    }

    async fn navigate(
        self: &Arc<Self>,
        target: impl FnOnce(usize) -> PageArg,
    ) -> Result<Option<usize>> {
        let mut current = self.page.lock().await;
        if self.is_stopped() {
            return Ok(None);
        }

        let requested = match target(*current) {
            PageArg::Number(n) => n,
            PageArg::NotANumber => {
                debug!(owner = %self.owner.id, "page is not a number, stopping session");
                drop(current);
                self.stop().await;
                return Ok(None);
            }
        };

        let page = clamp_page(requested, self.chapter.last_page());

        let Some(handle) = self.display_handle() else {
            *current = page;
            return Ok(None);
        };

        // The position only moves once the display shows it.
        let rich = self.render_at(page);
        tolerate_missing(self.ctx.messenger.edit_rich(handle, &rich).await)?;
        *current = page;

        for g in glyph::NAVIGATION {
            tolerate_missing(self.ctx.messenger.add_reaction(handle, g).await)?;
        }
        self.sync_shared_affordance(handle).await?;

        self.arm_inactivity();
        debug!(owner = %self.owner.id, page, "page shown");
        Ok(Some(page))
    }

    /// Toggle who may navigate. Not a navigation: the inactivity timer is kept.
    pub async fn set_shared(self: &Arc<Self>, shared: bool) -> Result<bool> {
        let current = self.page.lock().await;
        if self.is_stopped() {
            return Ok(false);
        }

        self.shared.store(shared, Ordering::SeqCst);

        let Some(handle) = self.display_handle() else {
            return Ok(false);
        };
        let rich = self.render_at(*current);
        tolerate_missing(self.ctx.messenger.edit_rich(handle, &rich).await)?;
        self.sync_shared_affordance(handle).await?;

        info!(owner = %self.owner.id, shared, "reading session sharing changed");
        Ok(true)
    }

    /// Tear the session down: registry entry, timer, display.
    ///
    /// Only the first call does anything and returns `true`.
    pub async fn stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }

        if let Some(token) = lock(&self.expiry).take() {
            token.cancel();
        }
        self.ctx.registry.remove_if(self.owner.id, self).await;

        if let Some(handle) = self.take_display() {
            self.delete_display(handle).await;
        }

        info!(owner = %self.owner.id, "reading session stopped");
        true
    }

    fn render_at(&self, page: usize) -> RichMessage {
        render::render(
            &DisplayState {
                chapter: &self.chapter,
                page,
                shared: self.is_shared(),
                owner: &self.owner,
            },
            &self.ctx.links,
        )
    }

    /// Exactly one of the share / unshare glyphs, matching `shared`.
    async fn sync_shared_affordance(&self, handle: MessageRef) -> Result<()> {
        let (stale, wanted) = if self.is_shared() {
            (glyph::SHARE, glyph::UNSHARE)
        } else {
            (glyph::UNSHARE, glyph::SHARE)
        };
        let messenger = &self.ctx.messenger;
        tolerate_missing(messenger.remove_reaction(handle, stale).await)?;
        tolerate_missing(messenger.add_reaction(handle, wanted).await)
    }

    /// Replace the inactivity timer with a fresh one.
    fn arm_inactivity(self: &Arc<Self>) {
        let token = {
            let mut slot = lock(&self.expiry);
            if let Some(old) = slot.take() {
                old.cancel();
            }
            if self.is_stopped() {
                return;
            }
            let token = CancellationToken::new();
            *slot = Some(token.clone());
            token
        };

        let session = Arc::clone(self);
        let timeout = self.ctx.inactivity_timeout;
        tokio::spawn(async move {
            tokio::select! {
              _ = token.cancelled() => {}
              _ = tokio::time::sleep(timeout) => {
                session.expire(&token).await;
              }
            }
        });
    }

    async fn expire(&self, token: &CancellationToken) {
        // Hold the queue so a page flip in flight either wins or waits.
        let page = self.page.lock().await;
        if token.is_cancelled() {
            return;
        }
        let title = render::title(&self.chapter, *page);
        if !self.stop().await {
            return;
        }
        drop(page);

        info!(owner = %self.owner.id, "reading session expired after inactivity");
        let notice = format!(
            "Ta lecture de <b>{}</b> a été stoppée car elle est inactive depuis un moment",
            escape_html(&title)
        );
        if let Err(e) = self.ctx.messenger.send_direct(self.owner.id, &notice).await {
            warn!(owner = %self.owner.id, "failed to send inactivity notice: {e}");
        }
    }

    fn set_display(&self, handle: Option<MessageRef>) {
        *lock(&self.display) = handle;
    }

    fn take_display(&self) -> Option<MessageRef> {
        lock(&self.display).take()
    }

    async fn delete_display(&self, handle: MessageRef) {
        match self.ctx.messenger.delete_message(handle).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(owner = %self.owner.id, "display already gone");
            }
            Err(e) => warn!(owner = %self.owner.id, "failed to delete display: {e}"),
        }
    }
}

/// Clamp a requested index into `[0, last]`.
pub fn clamp_page(requested: i64, last: usize) -> usize {
    if requested <= 0 {
        0
    } else {
        (requested as u64).min(last as u64) as usize
    }
}

fn tolerate_missing(res: Result<()>) -> Result<()> {
    match res {
        Err(e) if e.is_not_found() => {
            debug!("display mutation on a missing message: {e}");
            Ok(())
        }
        other => other,
    }
}

fn lock<T>(m: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        catalog::links::CatalogLinks,
        reading::{render::READER_FIELD, SessionRegistry},
        testing::{chapter, other_user, owner, FakeMessenger},
    };

    fn context(messenger: Arc<FakeMessenger>) -> Arc<ReaderContext> {
        Arc::new(ReaderContext {
            messenger,
            registry: Arc::new(SessionRegistry::new()),
            links: CatalogLinks::new("https://littlexgarden.com"),
            inactivity_timeout: Duration::from_secs(5 * 60),
        })
    }

    fn start(pages: usize, page: PageArg, shared: bool) -> StartReading {
        StartReading {
            owner: owner(),
            chat_id: ChatId(-1),
            chapter: chapter(pages),
            page,
            shared,
        }
    }

    async fn open(ctx: &Arc<ReaderContext>, req: StartReading) -> Arc<ReadingSession> {
        ReadingSession::create(ctx, req)
            .await
            .unwrap()
            .expect("session created")
    }

    fn shown_title(fake: &FakeMessenger, s: &ReadingSession) -> String {
        fake.shown(s.display_handle().unwrap()).unwrap().title
    }

    #[tokio::test(start_paused = true)]
    async fn reads_forward_and_holds_at_last_page() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(10, PageArg::Number(0), false)).await;

        assert_eq!(s.snapshot().await.page, 0);
        assert_eq!(shown_title(&fake, &s), "Naruto 1 - 1");

        for _ in 0..2 {
            s.next().await.unwrap();
        }
        assert_eq!(s.snapshot().await.page, 2);
        assert_eq!(shown_title(&fake, &s), "Naruto 1 - 3");

        for _ in 0..9 {
            s.next().await.unwrap();
        }
        assert_eq!(s.snapshot().await.page, 9);
        assert_eq!(shown_title(&fake, &s), "Naruto 1 - 10");
        assert_eq!(fake.rich_sends(), 1, "page changes edit in place");
    }

    #[tokio::test(start_paused = true)]
    async fn set_page_clamps_every_request() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(10, PageArg::Number(50), false)).await;
        assert_eq!(s.snapshot().await.page, 9);

        for (requested, expected) in [(-5, 0), (0, 0), (9, 9), (10, 9), (i64::MAX, 9), (4, 4)] {
            let got = s.set_page(PageArg::Number(requested)).await.unwrap();
            assert_eq!(got, Some(expected), "requested {requested}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn prev_holds_at_first_page() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(3, PageArg::Number(0), false)).await;

        assert_eq!(s.prev().await.unwrap(), Some(0));
        assert_eq!(s.prev().await.unwrap(), Some(0));
        assert_eq!(shown_title(&fake, &s), "Naruto 1 - 1");
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_affordances_are_attached() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(3, PageArg::Number(0), false)).await;

        let reactions = fake.reactions_on(s.display_handle().unwrap());
        for g in glyph::NAVIGATION {
            assert!(reactions.iter().any(|r| r == g), "missing {g}");
        }
        assert!(reactions.iter().any(|r| r == glyph::SHARE));
        assert!(!reactions.iter().any(|r| r == glyph::UNSHARE));
    }

    #[tokio::test(start_paused = true)]
    async fn new_session_replaces_previous_one() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let first = open(&ctx, start(3, PageArg::Number(0), false)).await;
        let first_handle = first.display_handle().unwrap();

        let second = open(&ctx, start(5, PageArg::Number(1), false)).await;

        assert!(first.is_stopped());
        assert!(!fake.is_live(first_handle));
        assert_eq!(fake.deletes(), vec![first_handle]);
        assert_eq!(ctx.registry.len().await, 1);
        let current = ctx.registry.get_by_owner(owner().id).await.unwrap();
        assert!(Arc::ptr_eq(&current, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn share_round_trip_restores_display() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(3, PageArg::Number(0), false)).await;
        let handle = s.display_handle().unwrap();

        let before = fake.shown(handle).unwrap();
        let mut before_reactions = fake.reactions_on(handle);
        before_reactions.sort();

        assert!(s.set_shared(true).await.unwrap());
        assert!(s.may_navigate(other_user()));
        let shared_view = fake.shown(handle).unwrap();
        assert_eq!(
            shared_view.field(READER_FIELD),
            Some("@owner - Lecture partagée")
        );
        let reactions = fake.reactions_on(handle);
        assert!(reactions.iter().any(|r| r == glyph::UNSHARE));
        assert!(!reactions.iter().any(|r| r == glyph::SHARE));

        assert!(s.set_shared(false).await.unwrap());
        let mut after_reactions = fake.reactions_on(handle);
        after_reactions.sort();
        assert_eq!(fake.shown(handle).unwrap(), before);
        assert_eq!(after_reactions, before_reactions);
    }

    #[tokio::test(start_paused = true)]
    async fn inactivity_stops_once_and_notifies_once() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(5, PageArg::Number(0), false)).await;
        let handle = s.display_handle().unwrap();

        tokio::time::sleep(Duration::from_secs(4 * 60)).await;
        s.next().await.unwrap();
        tokio::time::sleep(Duration::from_secs(4 * 60)).await;
        assert!(!s.is_stopped(), "navigation pushes the deadline back");

        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        tokio::task::yield_now().await;
        assert!(s.is_stopped());
        assert!(ctx.registry.get_by_owner(owner().id).await.is_none());

        tokio::time::sleep(Duration::from_secs(30 * 60)).await;
        tokio::task::yield_now().await;

        let directs = fake.directs();
        assert_eq!(directs.len(), 1);
        assert_eq!(directs[0].0, owner().id);
        assert!(directs[0].1.contains("Naruto 1 - 2"));
        assert_eq!(fake.deletes(), vec![handle]);
    }

    #[tokio::test(start_paused = true)]
    async fn set_shared_does_not_reset_inactivity() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(5, PageArg::Number(0), false)).await;

        tokio::time::sleep(Duration::from_secs(4 * 60)).await;
        s.set_shared(true).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        tokio::task::yield_now().await;

        assert!(s.is_stopped());
        assert_eq!(fake.directs().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(3, PageArg::Number(0), false)).await;

        assert!(s.stop().await);
        assert!(!s.stop().await);
        assert_eq!(fake.deletes().len(), 1);
        assert!(ctx.registry.is_empty().await);

        // Navigation after stop is inert.
        assert_eq!(s.next().await.unwrap(), None);
        assert_eq!(fake.edits(), 1);

        // Timer was cancelled with the session.
        tokio::time::sleep(Duration::from_secs(10 * 60)).await;
        tokio::task::yield_now().await;
        assert!(fake.directs().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_after_timeout_is_a_no_op() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(3, PageArg::Number(0), false)).await;

        tokio::time::sleep(Duration::from_secs(6 * 60)).await;
        tokio::task::yield_now().await;
        assert!(s.is_stopped());

        assert!(!s.stop().await);
        assert_eq!(fake.deletes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn vanished_display_is_not_an_error() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(3, PageArg::Number(0), false)).await;
        fake.vanish(s.display_handle().unwrap());

        assert_eq!(s.next().await.unwrap(), Some(1));
        assert!(s.set_shared(true).await.is_ok());
        assert!(s.stop().await);
    }

    #[tokio::test(start_paused = true)]
    async fn page_that_is_not_a_number_stops_without_rendering() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let first = open(&ctx, start(3, PageArg::Number(0), false)).await;

        let created = ReadingSession::create(&ctx, start(3, PageArg::NotANumber, false))
            .await
            .unwrap();

        assert!(created.is_none());
        assert!(first.is_stopped());
        assert_eq!(fake.rich_sends(), 1);
        assert!(ctx.registry.is_empty().await);

        let s = open(&ctx, start(3, PageArg::Number(1), false)).await;
        assert_eq!(s.set_page(PageArg::NotANumber).await.unwrap(), None);
        assert!(s.is_stopped());
        assert!(ctx.registry.is_empty().await);
    }

    #[tokio::test]
    async fn empty_chapter_is_refused() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let err = ReadingSession::create(&ctx, start(0, PageArg::Number(0), false))
            .await
            .err()
            .expect("refused");
        assert!(matches!(err, Error::Catalog(_)));
        assert!(ctx.registry.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_first_render_tears_the_session_down() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        fake.set_fail_edits(true);

        let res = ReadingSession::create(&ctx, start(3, PageArg::Number(0), false)).await;
        assert!(matches!(res, Err(Error::External(_))));

        assert!(ctx.registry.is_empty().await);
        assert_eq!(fake.rich_sends(), 1);
        assert_eq!(fake.deletes().len(), 1);

        tokio::time::sleep(Duration::from_secs(60 * 60)).await;
        tokio::task::yield_now().await;
        assert!(fake.directs().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_edit_keeps_the_shown_page() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(5, PageArg::Number(1), false)).await;

        fake.set_fail_edits(true);
        assert!(s.next().await.is_err());
        assert_eq!(s.snapshot().await.page, 1);
        assert_eq!(shown_title(&fake, &s), "Naruto 1 - 2");

        fake.set_fail_edits(false);
        assert_eq!(s.next().await.unwrap(), Some(2));
        assert_eq!(shown_title(&fake, &s), "Naruto 1 - 3");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_commands_apply_in_arrival_order() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(10, PageArg::Number(0), false)).await;
        fake.set_edit_delay(Duration::from_millis(50));

        let flips: Vec<_> = (0..4)
            .map(|_| {
                let s = s.clone();
                tokio::spawn(async move { s.next().await })
            })
            .collect();
        for f in flips {
            f.await.unwrap().unwrap();
        }
        assert_eq!(s.snapshot().await.page, 4);

        let jumps: Vec<_> = [7, 1, 3]
            .into_iter()
            .map(|p| {
                let s = s.clone();
                tokio::spawn(async move { s.set_page(PageArg::Number(p)).await })
            })
            .collect();
        for j in jumps {
            j.await.unwrap().unwrap();
        }
        assert_eq!(s.snapshot().await.page, 3);
        assert_eq!(shown_title(&fake, &s), "Naruto 1 - 4");
    }

    #[tokio::test(start_paused = true)]
    async fn page_flip_in_flight_beats_expiry() {
        let fake = Arc::new(FakeMessenger::default());
        let ctx = context(fake.clone());
        let s = open(&ctx, start(5, PageArg::Number(0), false)).await;

        // The flip starts before the deadline and lands after it.
        fake.set_edit_delay(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(295)).await;
        let flip = {
            let s = s.clone();
            tokio::spawn(async move { s.set_page(PageArg::Number(2)).await })
        };
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(flip.await.unwrap().unwrap(), Some(2));
        tokio::task::yield_now().await;

        assert!(!s.is_stopped());
        assert!(fake.directs().is_empty());
        assert_eq!(s.snapshot().await.page, 2);

        tokio::time::sleep(Duration::from_secs(5 * 60)).await;
        tokio::task::yield_now().await;
        assert!(s.is_stopped());
        assert_eq!(fake.directs().len(), 1);
    }

    #[test]
    fn clamp_page_bounds() {
        assert_eq!(clamp_page(-1, 9), 0);
        assert_eq!(clamp_page(0, 9), 0);
        assert_eq!(clamp_page(9, 9), 9);
        assert_eq!(clamp_page(10, 9), 9);
        assert_eq!(clamp_page(3, 0), 0);
    }
}
