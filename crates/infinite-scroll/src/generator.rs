//! Page sources
//!
//! The controller only knows the [`PageSource`] capability. [`ItemGenerator`]
//! is the in-memory source that fabricates sequential placeholder items after
//! a fixed delay, standing in for a backend page fetch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::PaginationConfig;
use crate::error::FetchError;
use crate::{Item, Page};

/// Asynchronous capability to fetch one page of items.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `count` items, newest-first
    async fn request_page(&self, count: usize) -> Result<Page, FetchError>;
}

/// Counter-based item generator.
///
/// Every generated item advances a shared counter, so ids keep increasing
/// across pages: `id-1`, `id-2`, ... with text `"Hello World - N"`.
#[derive(Debug)]
pub struct ItemGenerator {
    counter: AtomicU64,
    latency: Duration,
}

impl ItemGenerator {
    pub fn new(latency: Duration) -> Self {
        Self {
            counter: AtomicU64::new(0),
            latency,
        }
    }

    /// Generator that answers without any delay
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn from_config(config: &PaginationConfig) -> Self {
        Self::new(config.latency())
    }

    /// Number of items generated so far
    pub fn counter(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Produce a page synchronously.
    ///
    /// Items are created in counter order and then reversed, so the highest
    /// counter value comes first.
    pub fn generate(&self, count: usize) -> Page {
        let start = self.counter.fetch_add(count as u64, Ordering::SeqCst);
        let mut items: Vec<Item> = (start + 1..=start + count as u64)
            .map(Item::numbered)
            .collect();
        items.reverse();
        Page::new(items)
    }
}

impl Default for ItemGenerator {
    fn default() -> Self {
        Self::from_config(&PaginationConfig::default())
    }
}

#[async_trait]
impl PageSource for ItemGenerator {
    async fn request_page(&self, count: usize) -> Result<Page, FetchError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let page = self.generate(count);
        tracing::debug!("generated page of {} items (counter={})", page.len(), self.counter());
        Ok(page)
    }
}
