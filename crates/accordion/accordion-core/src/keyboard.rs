//! Keyboard routing over a Container's ordered toggles.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavKey {
    Next,
    Previous,
    First,
    Last,
    Activate,
}

impl NavKey {
    /// Map a DOM `KeyboardEvent.key` value. Unknown keys are not intercepted.
    pub fn from_dom(key: &str) -> Option<NavKey> {
        match key {
            "ArrowDown" | "Down" => Some(NavKey::Next),
            "ArrowUp" | "Up" => Some(NavKey::Previous),
            "Home" => Some(NavKey::First),
            "End" => Some(NavKey::Last),
            "Enter" | " " | "Spacebar" => Some(NavKey::Activate),
            _ => None,
        }
    }

    /// Index to focus, given the current index among `len` toggles.
    /// `None` for `Activate`, which does not move focus.
    pub fn target(self, current: usize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self {
            NavKey::Next => Some((current + 1) % len),
            NavKey::Previous => Some((current + len - 1) % len),
            NavKey::First => Some(0),
            NavKey::Last => Some(len - 1),
            NavKey::Activate => None,
        }
    }
}

/// Whether the host should stop default handling of the key event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

impl KeyOutcome {
    #[inline]
    pub fn is_handled(self) -> bool {
        self == KeyOutcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_wrap() {
        assert_eq!(NavKey::Next.target(2, 3), Some(0));
        assert_eq!(NavKey::Previous.target(0, 3), Some(2));
        assert_eq!(NavKey::Next.target(0, 3), Some(1));
    }

    #[test]
    fn home_end_jump() {
        assert_eq!(NavKey::First.target(1, 3), Some(0));
        assert_eq!(NavKey::Last.target(0, 3), Some(2));
    }

    #[test]
    fn dom_key_mapping() {
        assert_eq!(NavKey::from_dom("ArrowDown"), Some(NavKey::Next));
        assert_eq!(NavKey::from_dom(" "), Some(NavKey::Activate));
        assert_eq!(NavKey::from_dom("Enter"), Some(NavKey::Activate));
        assert_eq!(NavKey::from_dom("Tab"), None);
        assert_eq!(NavKey::from_dom("a"), None);
    }

    #[test]
    fn empty_container_has_no_target() {
        assert_eq!(NavKey::Next.target(0, 0), None);
    }
}
