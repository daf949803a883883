//! Scroll Math Module
//!
//! Pure functions for scroll direction tracking, load triggering and anchor
//! preservation. None of these touch the item list.

// ============================================================================
// Direction
// ============================================================================

/// True when the content moved toward the top since the previous report
pub fn derive_direction(previous_offset: f64, current_offset: f64) -> bool {
    previous_offset > current_offset
}

/// Tracks the previously reported offset to derive scroll direction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollTracker {
    previous_offset: Option<f64>,
    scrolling_upward: bool,
}

impl ScrollTracker {
    /// Record a scroll report and return whether the list is scrolling upward.
    ///
    /// With no previous offset (first report, or right after [`reset`](Self::reset))
    /// the last known direction is kept.
    pub fn observe(&mut self, offset_from_top: f64) -> bool {
        if let Some(previous) = self.previous_offset {
            self.scrolling_upward = derive_direction(previous, offset_from_top);
        }
        self.previous_offset = Some(offset_from_top);
        self.scrolling_upward
    }

    /// Forget direction history (deceleration finished)
    pub fn reset(&mut self) {
        self.previous_offset = None;
        self.scrolling_upward = false;
    }

    pub fn previous_offset(&self) -> Option<f64> {
        self.previous_offset
    }

    pub fn is_scrolling_upward(&self) -> bool {
        self.scrolling_upward
    }
}

// ============================================================================
// Trigger Logic
// ============================================================================

/// Check if an upward scroll near the top should request more items
pub fn should_request_more(offset_from_top: f64, scrolling_upward: bool, threshold: f64) -> bool {
    scrolling_upward && offset_from_top < threshold
}

// ============================================================================
// Anchor Preservation
// ============================================================================

/// Offset correction that keeps the previously visible row in place after
/// content was inserted above it: new content extent minus old content extent.
pub fn anchor_delta(old_content_extent: f64, new_content_extent: f64) -> f64 {
    new_content_extent - old_content_extent
}

/// Total extent of a run of rows
pub fn content_extent<I>(extents: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    extents.into_iter().sum()
}
