//! Test utilities for infinite-scroll integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::Level;

pub use infinite_scroll::ankurah_signals::{Get, Subscribe};
pub use infinite_scroll::{
    Anchor, ControllerState, FeedEvent, FetchError, Item, ItemGenerator, Page, PageSource,
    PaginationConfig, PaginationController, Render,
};

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_test_writer()
        .try_init();
}

/// Default config with no simulated latency
pub fn test_config() -> PaginationConfig {
    PaginationConfig {
        latency_ms: 0,
        ..PaginationConfig::default()
    }
}

/// Controller over an immediate, counting generator
pub fn controller() -> (Arc<PaginationController<CountingSource>>, Arc<CountingSource>) {
    let source = Arc::new(CountingSource::default());
    let pc = PaginationController::new(source.clone(), test_config()).expect("valid config");
    (Arc::new(pc), source)
}

pub fn ids(items: &[Item]) -> Vec<String> {
    items.iter().map(|item| item.id().to_string()).collect()
}

/// Expected ids for counters `from` down to `to`, e.g. `expected_ids(20, 1)`
pub fn expected_ids(from: u64, to: u64) -> Vec<String> {
    (to..=from).rev().map(|n| format!("id-{}", n)).collect()
}

// ============================================================================
// Fake sources
// ============================================================================

/// Generator wrapper that counts how many fetches were dispatched
#[derive(Debug)]
pub struct CountingSource {
    inner: ItemGenerator,
    calls: AtomicUsize,
}

impl CountingSource {
    pub fn new(inner: ItemGenerator) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for CountingSource {
    fn default() -> Self {
        Self::new(ItemGenerator::immediate())
    }
}

#[async_trait]
impl PageSource for CountingSource {
    async fn request_page(&self, count: usize) -> Result<Page, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.request_page(count).await
    }
}

/// Source that fails a fixed number of times before delegating
#[derive(Debug)]
pub struct FlakySource {
    inner: ItemGenerator,
    failures_left: AtomicUsize,
}

impl FlakySource {
    pub fn failing(times: usize) -> Self {
        Self {
            inner: ItemGenerator::immediate(),
            failures_left: AtomicUsize::new(times),
        }
    }
}

#[async_trait]
impl PageSource for FlakySource {
    async fn request_page(&self, count: usize) -> Result<Page, FetchError> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(FetchError::failed("backend unavailable"));
        }
        self.inner.request_page(count).await
    }
}

// ============================================================================
// MockRenderer
// ============================================================================

/// Simulates a list view that consumes FeedEvents from the controller.
///
/// Rows have a uniform height. The renderer tracks the scroll offset and
/// reports scrolls (with first-row visibility) back to the controller. On an
/// anchored render it shifts the offset by the inserted content extent, like
/// a table view holding its visible row in place.
pub struct MockRenderer<S: PageSource + 'static> {
    pc: Arc<PaginationController<S>>,
    rx: mpsc::UnboundedReceiver<FeedEvent>,
    _guard: infinite_scroll::ankurah_signals::SubscriptionGuard,
    pub scroll_offset: f64,
    viewport_height: f64,
    row_height: f64,
    items: Vec<Item>,
}

impl<S: PageSource + 'static> MockRenderer<S> {
    /// Create a new MockRenderer subscribed to the controller's event signal.
    pub fn new(pc: Arc<PaginationController<S>>, viewport_height: f64, row_height: f64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let guard = pc.events().subscribe(move |event: Option<FeedEvent>| {
            if let Some(event) = event {
                let _ = tx.send(event);
            }
        });
        Self {
            pc,
            rx,
            _guard: guard,
            scroll_offset: 0.0,
            viewport_height,
            row_height,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn content_height(&self) -> f64 {
        self.items.len() as f64 * self.row_height
    }

    fn max_offset(&self) -> f64 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    /// True if any pixel of row 0 is inside the viewport
    pub fn first_row_visible(&self) -> bool {
        !self.items.is_empty() && self.scroll_offset < self.row_height
    }

    /// Index of the row at the top edge of the viewport
    pub fn top_row(&self) -> usize {
        (self.scroll_offset / self.row_height).floor() as usize
    }

    /// Wait for the next event from the controller.
    pub async fn next_event(&mut self) -> Result<FeedEvent, MockRendererError> {
        match tokio::time::timeout(Duration::from_millis(500), self.rx.recv()).await {
            Ok(Some(event)) => Ok(event),
            Ok(None) => Err(MockRendererError("channel closed")),
            Err(_) => Err(MockRendererError("expected event did not arrive within 500ms")),
        }
    }

    /// Wait for the next render and apply it, adjusting the scroll offset when
    /// the anchor must be preserved.
    pub async fn next_render(&mut self) -> Result<Render, MockRendererError> {
        let render = match self.next_event().await? {
            FeedEvent::Render(render) => render,
            FeedEvent::FetchFailed(_) => return Err(MockRendererError("fetch failed")),
        };
        let row_height = self.row_height;
        self.scroll_offset += render.scroll_adjustment(|_| row_height);
        self.items = render.items.clone();
        Ok(render)
    }

    /// Panics if an event arrives within 10ms
    pub async fn expect_no_event(&mut self) {
        match tokio::time::timeout(Duration::from_millis(10), self.rx.recv()).await {
            Ok(Some(event)) => panic!("unexpected event received: {:?}", event),
            Ok(None) => panic!("channel closed"),
            Err(_) => {} // timeout - good
        }
    }

    /// Move to `offset` (clamped to the content) and report it
    pub fn scroll_to(&mut self, offset: f64) {
        self.scroll_offset = offset.clamp(0.0, self.max_offset());
        self.pc.on_scroll(self.scroll_offset, self.first_row_visible());
    }

    pub fn scroll_up(&mut self, px: f64) {
        self.scroll_to(self.scroll_offset - px);
    }

    pub fn scroll_down(&mut self, px: f64) {
        self.scroll_to(self.scroll_offset + px);
    }
}

#[derive(Debug)]
pub struct MockRendererError(pub &'static str);

impl std::fmt::Display for MockRendererError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MockRendererError {}
