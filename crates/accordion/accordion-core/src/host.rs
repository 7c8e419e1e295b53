//! Host contracts implemented by adapters (browser, in-memory test page).
//!
//! The engine never owns the document. Every read, write, scheduled callback
//! and listener goes through these traits, so the same engine runs against
//! `web-sys` in the browser and against a virtual page in tests.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::ids::ItemKey;

/// Document access: tree queries, attributes, classes, inline style, layout.
pub trait Dom {
    /// Opaque element handle. Equality must mean "same element".
    type Node: Clone + PartialEq + Debug;

    /// Root of the document; link groups are resolved across its whole subtree.
    fn document_root(&self) -> Self::Node;

    /// Element children in document order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// All element descendants of `node` in document order, excluding `node`.
    fn descendants(&self, node: &Self::Node) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Self::Node> = self.children(node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            stack.extend(self.children(&next).into_iter().rev());
            out.push(next);
        }
        out
    }

    /// Inclusive containment: a node contains itself.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        let mut cursor = Some(node.clone());
        while let Some(current) = cursor {
            if &current == ancestor {
                return true;
            }
            cursor = self.parent(&current);
        }
        false
    }

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&mut self, node: &Self::Node, class: &str);
    fn remove_class(&mut self, node: &Self::Node, class: &str);

    /// Inline style property, `None` when not set inline.
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);
    fn remove_style(&mut self, node: &Self::Node, property: &str);

    /// Natural content height (`scrollHeight`).
    fn scroll_height(&self, node: &Self::Node) -> f64;

    /// Rendered height of the full border box.
    fn box_height(&self, node: &Self::Node) -> f64;

    /// Force the host to commit pending style writes before the next step.
    fn flush_layout(&mut self, node: &Self::Node);

    fn focus(&mut self, node: &Self::Node);
    fn focused(&self) -> Option<Self::Node>;

    /// Whether the environment currently asks for reduced motion.
    fn prefers_reduced_motion(&self) -> bool;
}

/// Which step of an open/close sequence a scheduled [`Task`] resumes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Next animation frame after the open pre-positioning.
    BeginOpen,
    /// Next animation frame after the close height lock.
    BeginClose,
    /// Fallback timer standing in for a transition end that never fired.
    Settle,
}

/// Scheduled continuation handed back to [`Engine::run_task`](crate::Engine::run_task).
///
/// `epoch` identifies the sequence that scheduled it; a task whose epoch no
/// longer matches its item is stale and ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub item: ItemKey,
    pub epoch: u32,
    pub step: Step,
}

/// Deferred execution on the host's single UI thread.
pub trait Scheduler {
    type Timer: Debug;

    /// Run `task` on the next animation frame.
    fn request_frame(&mut self, task: Task);
    fn set_timeout(&mut self, delay_ms: u32, task: Task) -> Self::Timer;
    fn clear_timeout(&mut self, timer: Self::Timer);
}

/// Listener and observer kinds the engine attaches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Toggle activation, routed to [`Engine::on_click`](crate::Engine::on_click).
    Click,
    /// Container keyboard routing, routed to [`Engine::on_keydown`](crate::Engine::on_keydown).
    KeyDown,
    /// Panel transition completion, routed to [`Engine::on_transition_end`](crate::Engine::on_transition_end).
    TransitionEnd,
    /// Container size observation, routed to [`Engine::on_resize`](crate::Engine::on_resize).
    Resize,
}

/// Listener registration. Dropping a subscription must go through `unsubscribe`.
pub trait Events: Dom {
    type Subscription: Debug;

    fn subscribe(&mut self, node: &Self::Node, kind: EventKind) -> Self::Subscription;
    fn unsubscribe(&mut self, subscription: Self::Subscription);
}

/// Everything the engine needs from its environment.
pub trait Host: Dom + Scheduler + Events {}

impl<T: Dom + Scheduler + Events> Host for T {}
