//! Open/close state machine for a single Item.
//!
//! ```text
//! Closed --open--> Opening --settle--> Open --close--> Closing --settle--> Closed
//!                     \________close________/  \______open______/
//! ```
//!
//! A close request while `Closing` (or `Closed`) is a no-op, which makes a
//! double close unrepresentable. Opposing requests mid-flight start the
//! opposing sequence; callbacks of the superseded one are dropped by epoch.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl ItemState {
    /// Target of an open request, or `None` when it must be ignored.
    pub fn request_open(self) -> Option<ItemState> {
        match self {
            ItemState::Closed | ItemState::Closing => Some(ItemState::Opening),
            ItemState::Opening | ItemState::Open => None,
        }
    }

    /// Target of a close request, or `None` when it must be ignored.
    pub fn request_close(self) -> Option<ItemState> {
        match self {
            ItemState::Open | ItemState::Opening => Some(ItemState::Closing),
            ItemState::Closing | ItemState::Closed => None,
        }
    }

    /// Stable state reached when the in-flight sequence completes.
    pub fn settle(self) -> Option<ItemState> {
        match self {
            ItemState::Opening => Some(ItemState::Open),
            ItemState::Closing => Some(ItemState::Closed),
            ItemState::Open | ItemState::Closed => None,
        }
    }

    /// Visual open marker: set from the start of an open until a close settles.
    #[inline]
    pub fn is_marked_open(self) -> bool {
        !matches!(self, ItemState::Closed)
    }

    /// What a toggle does from this state: `true` = open.
    ///
    /// A toggle during `Closing` resolves to a close request, which the guard
    /// then ignores.
    #[inline]
    pub fn toggle_opens(self) -> bool {
        matches!(self, ItemState::Closed)
    }

    #[inline]
    pub fn is_animating(self) -> bool {
        matches!(self, ItemState::Opening | ItemState::Closing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle() {
        let s = ItemState::Closed;
        let s = s.request_open().unwrap();
        assert_eq!(s, ItemState::Opening);
        let s = s.settle().unwrap();
        assert_eq!(s, ItemState::Open);
        let s = s.request_close().unwrap();
        assert_eq!(s, ItemState::Closing);
        assert_eq!(s.settle(), Some(ItemState::Closed));
    }

    #[test]
    fn double_close_is_rejected() {
        assert_eq!(ItemState::Closing.request_close(), None);
        assert_eq!(ItemState::Closed.request_close(), None);
    }

    #[test]
    fn opposing_requests_interrupt() {
        assert_eq!(ItemState::Opening.request_close(), Some(ItemState::Closing));
        assert_eq!(ItemState::Closing.request_open(), Some(ItemState::Opening));
        assert_eq!(ItemState::Opening.request_open(), None);
    }

    #[test]
    fn toggle_during_close_does_not_reopen() {
        assert!(!ItemState::Closing.toggle_opens());
        assert!(!ItemState::Opening.toggle_opens());
        assert!(ItemState::Closed.toggle_opens());
    }

    #[test]
    fn stable_states_do_not_settle() {
        assert_eq!(ItemState::Open.settle(), None);
        assert_eq!(ItemState::Closed.settle(), None);
    }
}
