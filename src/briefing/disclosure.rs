//! Finding disclosure control — one expanded/collapsed boolean per card.
//!
//! Four input channels feed the same boolean: explicit activation
//! (click or Enter/Space), keyboard focus/blur, and pointer hover with
//! a delayed expand. Rather than three ad-hoc flags, the controller is
//! an explicit state machine whose states record *who* holds the card
//! open. Precedence when events overlap:
//!
//! 1. Activation toggles, independent of hover/focus.
//! 2. Gaining focus forces expanded (never toggles).
//! 3. Blur forces collapsed, even while hovering, and disarms any
//!    pending hover timer so it cannot re-expand a blurred card.
//! 4. Hover-enter arms a delayed expand that fires only if the pointer
//!    is still over the card; hover-leave collapses immediately and
//!    disarms the timer.
//! 5. `dispose()` disarms the timer and ignores all further events.
//!
//! The clock is injected (`Instant` arguments), so every timing
//! scenario is deterministic in tests. Controllers are independent:
//! nothing enforces "only one card expanded at a time".

use std::time::{Duration, Instant};

use crate::config::ViewerConfig;

// ═══════════════════════════════════════════════════════════
// State machine
// ═══════════════════════════════════════════════════════════

/// Which trigger currently holds the card open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisclosureState {
    Collapsed,
    ExpandedByFocus,
    ExpandedByHover,
    ExpandedByClick,
}

/// Per-finding disclosure controller.
///
/// Created when a finding card is rendered, disposed when the finding
/// list is replaced (e.g. on regenerate). Expansion state does not
/// survive regeneration.
#[derive(Debug)]
pub struct DisclosureController {
    state: DisclosureState,
    hover_delay: Duration,
    /// Deadline of the armed hover-expand timer, if any.
    pending_hover: Option<Instant>,
    /// Pointer currently over the card.
    hovering: bool,
    disposed: bool,
}

impl DisclosureController {
    pub fn new(hover_delay: Duration) -> Self {
        Self {
            state: DisclosureState::Collapsed,
            hover_delay,
            pending_hover: None,
            hovering: false,
            disposed: false,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(Duration::from_millis(config.hover_expand_delay_ms))
    }

    /// Explicit activation (click, or Enter/Space while focused):
    /// toggles the current state.
    pub fn on_activate(&mut self) {
        if self.disposed {
            return;
        }
        self.state = if self.is_expanded() {
            DisclosureState::Collapsed
        } else {
            DisclosureState::ExpandedByClick
        };
    }

    /// Gaining keyboard focus always expands.
    pub fn on_focus(&mut self) {
        if self.disposed {
            return;
        }
        self.state = DisclosureState::ExpandedByFocus;
    }

    /// Losing focus always collapses, even while hovering, and disarms
    /// the hover timer so it cannot fire afterwards.
    pub fn on_blur(&mut self) {
        if self.disposed {
            return;
        }
        self.pending_hover = None;
        self.state = DisclosureState::Collapsed;
    }

    /// Pointer entered the card: arm the delayed expand.
    pub fn on_hover_start(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.hovering = true;
        self.pending_hover = Some(now + self.hover_delay);
    }

    /// Pointer left the card: collapse immediately and disarm the timer.
    pub fn on_hover_end(&mut self) {
        if self.disposed {
            return;
        }
        self.hovering = false;
        self.pending_hover = None;
        self.state = DisclosureState::Collapsed;
    }

    /// Advance the injected clock: fires the armed hover-expand once its
    /// deadline has passed, provided the pointer is still over the card.
    /// Returns the expanded state after the tick.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.disposed {
            return false;
        }
        if let Some(deadline) = self.pending_hover {
            if now >= deadline {
                self.pending_hover = None;
                if self.hovering {
                    self.state = DisclosureState::ExpandedByHover;
                }
            }
        }
        self.is_expanded()
    }

    /// Teardown: disarm the timer and ignore all further events.
    pub fn dispose(&mut self) {
        self.pending_hover = None;
        self.disposed = true;
    }

    pub fn is_expanded(&self) -> bool {
        self.state != DisclosureState::Collapsed
    }

    /// Value for the card's `aria-expanded` attribute.
    pub fn aria_expanded(&self) -> &'static str {
        if self.is_expanded() {
            "true"
        } else {
            "false"
        }
    }

    /// Is a hover-expand timer currently armed?
    #[cfg(test)]
    fn hover_timer_armed(&self) -> bool {
        self.pending_hover.is_some()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
