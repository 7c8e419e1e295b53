//! Semantic notifications produced by the engine.
//!
//! Events are queued as state changes happen and drained by the adapter,
//! which may re-dispatch them to the page (custom DOM events) or ignore them.

use serde::{Deserialize, Serialize};

use crate::ids::{ContainerId, ItemKey};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AccordionEvent {
    ContainerHydrated {
        container: ContainerId,
        items: usize,
    },
    ContainerDestroyed {
        container: ContainerId,
    },
    /// An Item reached the stable `Open` state.
    ItemOpened {
        container: ContainerId,
        item: ItemKey,
        item_id: String,
    },
    /// An Item reached the stable `Closed` state.
    ItemClosed {
        container: ContainerId,
        item: ItemKey,
        item_id: String,
    },
}

/// Pending events, in the order they happened.
#[derive(Clone, Debug, Default)]
pub struct Outputs {
    pub events: Vec<AccordionEvent>,
}

impl Outputs {
    #[inline]
    pub fn push(&mut self, event: AccordionEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<AccordionEvent> {
        std::mem::take(&mut self.events)
    }
}
