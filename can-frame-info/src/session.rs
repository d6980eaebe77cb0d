//! Selection and refresh session
//!
//! Models the boundary between a frame history owned by the application and
//! whatever presents per-identifier details. The session tracks which
//! identifiers exist, which one is selected, and the detail computed for it.
//!
//! State machine:
//!
//! ```text
//!            cleared                    replaced (non-empty)
//!   Empty <------------ any state ---------------------------> Detailed
//!     |                                                           ^
//!     | appended / replaced (no selectable id)                    | select
//!     v                                                           |
//!   Listing ------------------------------------------------------+
//! ```
//!
//! Appending frames never recomputes a detail that is already shown. The
//! detail is flagged stale instead and stays as it was until the identifier is
//! selected again.

use crate::identifier::IdentifierIndex;
use crate::j1939::J1939Fields;
use crate::stats::{self, FrameStatistics};
use crate::types::CanFrame;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No identifiers known
    Empty,
    /// Identifiers known, none shown in detail
    Listing,
    /// One identifier selected with computed detail
    Detailed,
}

/// Change notification for the frame history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramesUpdate {
    /// Every frame was deleted
    Cleared,
    /// A whole new set of frames replaced the history
    Replaced,
    /// This many frames were appended to the end of the history
    Appended(usize),
}

/// Everything computed for the selected identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    /// Selected identifier
    pub id: u32,
    /// Aggregated statistics over the matching frames
    pub stats: FrameStatistics,
    /// J1939 fields, present when the frames use extended identifiers
    pub j1939: Option<J1939Fields>,
}

impl Detail {
    /// Compute the detail for `id` over `frames`
    ///
    /// Returns `None` when no frame carries the identifier.
    pub fn compute(frames: &[CanFrame], id: u32) -> Option<Self> {
        let stats = stats::compute(frames, id)?;
        let j1939 = stats.extended().then(|| J1939Fields::decode(id));
        Some(Self { id, stats, j1939 })
    }
}

/// Identifier listing plus the currently selected detail
#[derive(Debug, Clone, Default)]
pub struct FrameInfoSession {
    index: IdentifierIndex,
    selected: Option<u32>,
    detail: Option<Detail>,
    stale: bool,
}

impl FrameInfoSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        if self.detail.is_some() {
            SessionState::Detailed
        } else if self.index.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Listing
        }
    }

    /// Known identifiers
    pub fn index(&self) -> &IdentifierIndex {
        &self.index
    }

    /// Identifier currently selected, if any
    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    /// Detail for the selected identifier, if computed
    pub fn detail(&self) -> Option<&Detail> {
        self.detail.as_ref()
    }

    /// True if frames for the selected identifier arrived after its detail
    /// was computed
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Apply a history change notification
    ///
    /// `frames` is the history after the change.
    pub fn apply_update(&mut self, frames: &[CanFrame], update: FramesUpdate) {
        match update {
            FramesUpdate::Cleared => self.frames_cleared(),
            FramesUpdate::Replaced => self.frames_replaced(frames),
            FramesUpdate::Appended(count) => self.frames_appended(frames, count),
        }
    }

    /// The history was deleted; drop the listing and any detail
    pub fn frames_cleared(&mut self) {
        log::debug!("Frame history cleared");
        *self = Self::default();
    }

    /// A new capture replaced the history; rebuild and auto-select the lowest
    /// identifier
    pub fn frames_replaced(&mut self, frames: &[CanFrame]) {
        self.index = IdentifierIndex::rebuild(frames);
        self.selected = None;
        self.detail = None;
        self.stale = false;

        if let Some(lowest) = self.index.lowest() {
            self.select(frames, lowest);
        }
    }

    /// `count` frames were appended to the end of `frames`
    ///
    /// The identifier list grows; a shown detail is not recomputed, only
    /// flagged stale when the new frames include its identifier.
    pub fn frames_appended(&mut self, frames: &[CanFrame], count: usize) {
        let tail_start = frames.len().saturating_sub(count);
        let tail = &frames[tail_start..];

        let added = self.index.extend(tail);
        if !added.is_empty() {
            log::debug!("{} new identifiers after append", added.len());
        }

        if let Some(detail) = &self.detail {
            if tail.iter().any(|f| f.id == detail.id) {
                log::warn!(
                    "New frames for 0x{:X}; shown statistics are stale until reselected",
                    detail.id
                );
                self.stale = true;
            }
        }
    }

    /// Select an identifier and compute its detail from `frames`
    ///
    /// Returns the resulting state: `Detailed` when the index knows `id`,
    /// otherwise the listing without detail. An `Empty` session has nothing to
    /// select and stays `Empty`.
    pub fn select(&mut self, frames: &[CanFrame], id: u32) -> SessionState {
        if self.index.is_empty() {
            log::debug!("Ignoring selection of 0x{:X}: no frames", id);
            return self.state();
        }

        log::debug!("Selecting identifier 0x{:X}", id);
        self.selected = Some(id);
        self.stale = false;
        self.detail = if self.index.contains(id) {
            Detail::compute(frames, id)
        } else {
            log::debug!("No frames for identifier 0x{:X}", id);
            None
        };
        self.state()
    }
}
