//! Infinite Scroll - headless pagination controller for prepend-style feeds
//!
//! A presentation layer reports scrolls and drag gestures; the controller
//! fetches pages from a [`PageSource`], prepends them newest-first, holds
//! merges back while the user is dragging, and publishes [`FeedEvent`]s that
//! say whether an insertion should animate or keep the visible row anchored.

pub mod config;
pub mod error;
pub mod generator;
pub mod scrolling;

use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use ankurah_signals::{Mut, Read};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};

pub use ankurah_signals;
pub use config::PaginationConfig;
pub use error::{ConfigError, FetchError};
pub use generator::{ItemGenerator, PageSource};
pub use scrolling::ScrollTracker;

// ============================================================================
// Core Types
// ============================================================================

/// A single row. Equality and hashing are keyed on `id` only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    id: String,
    text: String,
}

impl Item {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Placeholder item for counter value `n`
    pub(crate) fn numbered(n: u64) -> Self {
        Self::new(format!("id-{}", n), format!("Hello World - {}", n))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// One fetch result, newest item first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    items: Vec<Item>,
}

impl Page {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Join a newer page in front of an older one
    fn followed_by(mut self, older: Page) -> Page {
        self.items.extend(older.items);
        self
    }
}

impl From<Vec<Item>> for Page {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}

/// Snapshot of the controller flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerState {
    /// A fetch is in flight
    pub is_loading: bool,
    /// The user is dragging the list
    pub is_dragging: bool,
    /// A completed page is buffered until the drag ends
    pub has_pending_change: bool,
}

/// The row that must stay visually fixed after an insertion above it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    /// Id of the item that was first before the insertion
    pub id: String,
    /// Its index in the new item list
    pub index: usize,
}

/// Render notification for the presentation layer
#[derive(Clone, Debug, PartialEq)]
pub struct Render {
    /// Full ordered item list, newest first
    pub items: Vec<Item>,
    /// Number of items prepended by this update
    pub inserted: usize,
    /// True if the insertion may animate; false when the anchor is preserved
    pub animate: bool,
    /// Present when the first row was on screen at merge time
    pub anchor: Option<Anchor>,
}

impl Render {
    pub fn preserves_anchor(&self) -> bool {
        self.anchor.is_some()
    }

    /// Scroll offset correction to apply after re-rendering.
    ///
    /// `extent_of` measures a row in presentation units. Only prepends happen,
    /// so the content growth is exactly the extent of the inserted rows, which
    /// are the first `inserted` items.
    pub fn scroll_adjustment(&self, extent_of: impl Fn(&Item) -> f64) -> f64 {
        if !self.preserves_anchor() {
            return 0.0;
        }
        scrolling::content_extent(self.items.iter().take(self.inserted).map(extent_of))
    }
}

/// Outbound notification
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    /// Items were merged into the list
    Render(Render),
    /// A fetch did not complete; the list is unchanged and loading has stopped
    FetchFailed(FetchError),
}

type FetchOutcome = Result<Page, FetchError>;

// ============================================================================
// Feed State
// ============================================================================

/// Everything the controller mutates, kept behind one lock so every
/// transition is a single atomic update.
#[derive(Debug)]
struct FeedState {
    items: Vec<Item>,
    flags: ControllerState,
    /// Page held back while dragging
    pending: Option<Page>,
    tracker: ScrollTracker,
    /// Last first-row visibility reported by the presentation layer
    first_row_visible: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            flags: ControllerState::default(),
            pending: None,
            tracker: ScrollTracker::default(),
            // A fresh list sits at its top
            first_row_visible: true,
        }
    }
}

impl FeedState {
    /// Buffer the page while dragging, otherwise prepend it
    fn merge(&mut self, page: Page, first_row_visible: bool) -> Option<FeedEvent> {
        if !self.flags.is_dragging {
            return Some(FeedEvent::Render(self.apply(page, first_row_visible)));
        }

        let buffered = match self.pending.take() {
            Some(older) => {
                tracing::warn!("merge_result: page already buffered, combining");
                page.followed_by(older)
            }
            None => page,
        };
        tracing::debug!("merge_result: deferred while dragging ({} items buffered)", buffered.len());
        self.pending = Some(buffered);
        self.flags.has_pending_change = true;
        None
    }

    /// Prepend a page and describe the result
    fn apply(&mut self, page: Page, first_row_visible: bool) -> Render {
        let inserted = page.len();

        // An empty list has no visible first row to hold in place
        let anchor = match self.items.first() {
            Some(first) if first_row_visible => Some(Anchor {
                id: first.id().to_string(),
                index: inserted,
            }),
            _ => None,
        };

        let mut items = page.into_items();
        items.append(&mut self.items);
        self.items = items;

        tracing::debug!(
            "apply: inserted={}, total={}, preserve_anchor={}",
            inserted,
            self.items.len(),
            anchor.is_some()
        );

        Render {
            items: self.items.clone(),
            inserted,
            animate: anchor.is_none(),
            anchor,
        }
    }
}

// ============================================================================
// PaginationController
// ============================================================================

/// Pagination controller for a newest-first, prepend-only list
///
/// Every inbound call updates the feed state under one lock, so fetch
/// completions applied by [`run`](Self::run) on a runtime worker cannot
/// overwrite drag or scroll updates arriving from another thread. Events are
/// published after the lock is released; subscribers may call back into the
/// controller.
pub struct PaginationController<S: PageSource + 'static> {
    source: Arc<S>,
    config: PaginationConfig,
    feed: StdMutex<FeedState>,
    events: Mut<Option<FeedEvent>>,
    completions_tx: mpsc::UnboundedSender<FetchOutcome>,
    completions_rx: Mutex<mpsc::UnboundedReceiver<FetchOutcome>>,
}

impl<S: PageSource + 'static> PaginationController<S> {
    /// Create a controller with an empty list
    ///
    /// # Arguments
    /// * `source` - Page source used for every fetch
    /// * `config` - Page size and trigger threshold (validated here)
    pub fn new(source: Arc<S>, config: PaginationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Ok(Self {
            source,
            config,
            feed: StdMutex::new(FeedState::default()),
            events: Mut::new(None),
            completions_tx,
            completions_rx: Mutex::new(completions_rx),
        })
    }

    fn feed(&self) -> MutexGuard<'_, FeedState> {
        // State is updated field by field without unwinding in between
        self.feed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: Option<FeedEvent>) {
        if let Some(event) = event {
            self.events.set(Some(event));
        }
    }

    // Accessors
    pub fn items(&self) -> Vec<Item> {
        self.feed().items.clone()
    }

    pub fn state(&self) -> ControllerState {
        self.feed().flags
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Signal carrying the most recent [`FeedEvent`] (None until the first one)
    pub fn events(&self) -> Read<Option<FeedEvent>> {
        self.events.read()
    }

    /// Ask for another page.
    ///
    /// No-op while a fetch is in flight or a deferred merge is outstanding.
    /// Must be called from within a Tokio runtime; otherwise the request
    /// fails with [`FetchError::NoRuntime`]. The result is only applied by
    /// [`next_completion`](Self::next_completion) or [`run`](Self::run): if
    /// neither is driven, `is_loading` stays set and every later request is
    /// skipped.
    pub fn request_more(&self) {
        let mut feed = self.feed();
        let flags = feed.flags;
        if flags.is_loading || flags.has_pending_change {
            tracing::debug!(
                "request_more: skipped (is_loading={}, has_pending_change={})",
                flags.is_loading,
                flags.has_pending_change
            );
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            drop(feed);
            tracing::warn!("request_more: no runtime to dispatch fetch");
            self.publish(Some(FeedEvent::FetchFailed(FetchError::NoRuntime)));
            return;
        };

        tracing::debug!("request_more: fetching {} items", self.config.page_size);
        feed.flags.is_loading = true;
        drop(feed);

        let source = self.source.clone();
        let tx = self.completions_tx.clone();
        let count = self.config.page_size;
        handle.spawn(async move {
            let fetch = tokio::spawn(async move { source.request_page(count).await });
            let outcome = fetch.await.unwrap_or_else(|e| {
                tracing::warn!("fetch task aborted: {}", e);
                Err(FetchError::Disconnected)
            });
            // Receiver lives as long as the controller
            let _ = tx.send(outcome);
        });
    }

    /// Wait for the in-flight fetch and apply its outcome.
    pub async fn next_completion(&self) {
        let outcome = {
            let mut rx = self.completions_rx.lock().await;
            rx.recv().await
        };
        if let Some(outcome) = outcome {
            self.complete(outcome);
        }
    }

    /// Apply completions forever; generally this should be backgrounded.
    pub async fn run(&self) {
        loop {
            self.next_completion().await;
        }
    }

    fn complete(&self, outcome: FetchOutcome) {
        let event = {
            let mut feed = self.feed();
            feed.flags.is_loading = false;
            match outcome {
                Ok(page) => {
                    let first_row_visible = feed.first_row_visible;
                    feed.merge(page, first_row_visible)
                }
                Err(error) => {
                    tracing::warn!("fetch failed: {}", error);
                    Some(FeedEvent::FetchFailed(error))
                }
            }
        };
        self.publish(event);
    }

    /// Merge a fetched page into the list.
    ///
    /// While dragging the page is buffered and `has_pending_change` is set;
    /// otherwise it is prepended and a [`FeedEvent::Render`] is published.
    /// `first_row_visible` comes from the presentation layer, which is the
    /// only party that knows what is on screen.
    pub fn merge_result(&self, page: Page, first_row_visible: bool) {
        let event = self.feed().merge(page, first_row_visible);
        self.publish(event);
    }

    pub fn on_drag_start(&self) {
        self.feed().flags.is_dragging = true;
    }

    /// End of a drag gesture; applies the buffered page if there is one
    pub fn on_drag_end(&self) {
        let event = {
            let mut feed = self.feed();
            feed.flags.is_dragging = false;
            if !feed.flags.has_pending_change {
                return;
            }
            feed.flags.has_pending_change = false;
            let first_row_visible = feed.first_row_visible;
            let pending = feed.pending.take();
            let event = pending.map(|page| {
                tracing::debug!("on_drag_end: applying deferred page");
                FeedEvent::Render(feed.apply(page, first_row_visible))
            });
            event
        };
        self.publish(event);
    }

    /// Notify the controller of a scroll event
    ///
    /// # Arguments
    /// * `offset_from_top` - Distance between the content top and the viewport top
    /// * `first_row_visible` - True if the first (newest) row is on screen
    pub fn on_scroll(&self, offset_from_top: f64, first_row_visible: bool) {
        let trigger = {
            let mut feed = self.feed();
            feed.first_row_visible = first_row_visible;
            let scrolling_upward = feed.tracker.observe(offset_from_top);
            scrolling::should_request_more(offset_from_top, scrolling_upward, self.config.trigger_threshold)
        };
        if trigger {
            self.request_more();
        }
    }

    /// Scrolling came to rest; direction tracking starts over
    pub fn on_deceleration_end(&self) {
        self.feed().tracker.reset();
    }
}
