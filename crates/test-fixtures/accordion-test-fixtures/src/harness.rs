//! Test driver pairing an [`Engine`] with a [`FakePage`].
//!
//! Event helpers only reach the engine when the page holds a matching
//! subscription, the way a browser only calls attached listeners.

use accordion_core::{
    AccordionEvent, Dom, Engine, EngineConfig, EventKind, ItemKey, ItemState, KeyOutcome,
    Transition,
};

use crate::page::{FakePage, NodeId, NodeSpec};

pub struct Harness {
    pub engine: Engine<FakePage>,
    pub page: FakePage,
}

impl Harness {
    /// Build the page and run the initial hydration pass over the document.
    pub fn new(root: &NodeSpec) -> Self {
        Self::with_config(root, EngineConfig::default())
    }

    pub fn with_config(root: &NodeSpec, cfg: EngineConfig) -> Self {
        let mut page = FakePage::new(root);
        let mut engine = Engine::new(cfg);
        let doc = page.root();
        engine.hydrate(&mut page, &doc);
        Harness { engine, page }
    }

    /// Build the page without hydrating it.
    pub fn unhydrated(root: &NodeSpec) -> Self {
        Harness {
            engine: Engine::default(),
            page: FakePage::new(root),
        }
    }

    pub fn hydrate(&mut self) -> usize {
        let doc = self.page.root();
        self.engine.hydrate(&mut self.page, &doc).len()
    }

    pub fn key_of(&self, item_id: &str) -> ItemKey {
        let toggle = self.page.toggle_of(item_id);
        self.engine
            .item_by_toggle(&toggle)
            .unwrap_or_else(|| panic!("item `{item_id}` is not hydrated"))
    }

    pub fn state(&self, item_id: &str) -> ItemState {
        let key = self.key_of(item_id);
        self.engine
            .item_state(key)
            .unwrap_or_else(|| panic!("item `{item_id}` has no state"))
    }

    /// Click a node; reaches the engine only through an attached listener.
    pub fn click(&mut self, node: NodeId) -> Transition {
        if !self.page.has_subscription(node, EventKind::Click) {
            return Transition::Ignored;
        }
        self.engine.on_click(&mut self.page, &node)
    }

    pub fn click_item(&mut self, item_id: &str) -> Transition {
        let toggle = self.page.toggle_of(item_id);
        self.click(toggle)
    }

    /// Dispatch a keydown at `target`, bubbling through every ancestor with a
    /// keydown listener until one handles it.
    pub fn key(&mut self, target: NodeId, key: &str) -> KeyOutcome {
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            if self.page.has_subscription(node, EventKind::KeyDown) {
                let outcome = self.engine.on_keydown(&mut self.page, &node, &target, key);
                if outcome.is_handled() {
                    return outcome;
                }
            }
            cursor = self.page.parent(&node);
        }
        KeyOutcome::Ignored
    }

    /// Press a key with focus on the current focused element.
    pub fn press(&mut self, key: &str) -> KeyOutcome {
        match self.page.focused() {
            Some(target) => self.key(target, key),
            None => KeyOutcome::Ignored,
        }
    }

    pub fn resize(&mut self, container: NodeId) -> usize {
        if !self.page.has_subscription(container, EventKind::Resize) {
            return 0;
        }
        self.engine.on_resize(&mut self.page, &container)
    }

    /// Run the frame callbacks queued so far.
    pub fn frame(&mut self) -> usize {
        let frames = self.page.take_frames();
        let count = frames.len();
        for task in frames {
            self.engine.run_task(&mut self.page, task);
        }
        count
    }

    /// Fire `transitionend` at `target` if it or an ancestor listens for it.
    pub fn transition_end(&mut self, target: NodeId, property: &str) -> Transition {
        let mut cursor = Some(target);
        let mut listened = false;
        while let Some(node) = cursor {
            listened |= self.page.has_subscription(node, EventKind::TransitionEnd);
            cursor = self.page.parent(&node);
        }
        if !listened {
            return Transition::Ignored;
        }
        self.engine.on_transition_end(&mut self.page, &target, property)
    }

    /// Fire `transitionend` for every element with a running height transition.
    pub fn finish_transitions(&mut self) -> usize {
        let running: Vec<NodeId> = self
            .page
            .descendants(&self.page.root())
            .into_iter()
            .filter(|n| {
                self.page
                    .style(n, "transition")
                    .is_some_and(|t| t.starts_with("height"))
            })
            .collect();
        let count = running.len();
        for node in running {
            self.transition_end(node, "height");
        }
        count
    }

    /// Advance the virtual clock, running timers that come due.
    pub fn advance(&mut self, ms: u64) -> usize {
        let due = self.page.advance(ms);
        let count = due.len();
        for task in due {
            self.engine.run_task(&mut self.page, task);
        }
        count
    }

    /// Run frames and complete transitions until nothing is in flight.
    pub fn settle(&mut self) {
        for _ in 0..16 {
            let frames = self.frame();
            let ended = self.finish_transitions();
            if frames == 0 && ended == 0 {
                break;
            }
        }
    }

    /// Detach `node` and report it as one removal batch.
    pub fn remove(&mut self, node: NodeId) {
        self.page.detach(node);
        self.engine.on_mutations(&mut self.page, &[], &[node]);
    }

    /// Append `spec` under `parent` and report it as one addition batch.
    pub fn insert(&mut self, parent: NodeId, spec: &NodeSpec) -> NodeId {
        let node = self.page.append(parent, spec);
        self.engine.on_mutations(&mut self.page, &[node], &[]);
        node
    }

    pub fn events(&mut self) -> Vec<AccordionEvent> {
        self.engine.drain_events()
    }
}
