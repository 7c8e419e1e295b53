//! Container coordinator: owns the direct-child Items of one accordion,
//! enforces auto-close, routes the keyboard and refreshes open panels on resize.

use log::debug;

use crate::attrs;
use crate::config::EngineConfig;
use crate::host::{EventKind, Host, Task};
use crate::ids::{ContainerId, IdAllocator, ItemKey};
use crate::item::{Item, ItemInfo, Transition};
use crate::keyboard::{KeyOutcome, NavKey};
use crate::outputs::{AccordionEvent, Outputs};
use crate::profile::{self, AnimationProfile};
use crate::state::ItemState;

pub struct Coordinator<H: Host> {
    pub id: ContainerId,
    pub node: H::Node,
    pub auto_close: bool,
    /// Informational; enforcement is the inverse of `auto_close`.
    pub allow_multiple: bool,
    pub defaults: AnimationProfile,
    items: Vec<Item<H>>,
    keydown: Option<H::Subscription>,
    resize: Option<H::Subscription>,
}

impl<H: Host> Coordinator<H> {
    pub fn hydrate(
        host: &mut H,
        cfg: &EngineConfig,
        ids: &mut IdAllocator,
        id: ContainerId,
        node: H::Node,
    ) -> Self {
        let auto_close = attrs::read_bool(host, &node, attrs::AUTO_CLOSE, false);
        let allow_multiple = attrs::read_bool(host, &node, attrs::ALLOW_MULTIPLE, !auto_close);
        let defaults = AnimationProfile::read(host, &node, &cfg.fallback);
        let keydown = host.subscribe(&node, EventKind::KeyDown);
        let resize = host.subscribe(&node, EventKind::Resize);
        host.set_attribute(&node, &cfg.hydrated_attribute, "true");

        let mut coordinator = Coordinator {
            id,
            node,
            auto_close,
            allow_multiple,
            defaults,
            items: Vec::new(),
            keydown: Some(keydown),
            resize: Some(resize),
        };
        coordinator.reconcile(host, cfg, ids);
        coordinator
    }

    pub fn items(&self) -> impl Iterator<Item = &Item<H>> {
        self.items.iter()
    }

    pub fn item_infos(&self) -> Vec<ItemInfo> {
        self.items.iter().map(Item::info).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, key: ItemKey) -> Option<&Item<H>> {
        self.items.iter().find(|i| i.key == key)
    }

    pub fn contains_item(&self, key: ItemKey) -> bool {
        self.item(key).is_some()
    }

    pub fn item_by_toggle(&self, toggle: &H::Node) -> Option<ItemKey> {
        self.items.iter().find(|i| &i.toggle == toggle).map(|i| i.key)
    }

    pub fn item_by_node(&self, node: &H::Node) -> Option<ItemKey> {
        self.items.iter().find(|i| &i.node == node).map(|i| i.key)
    }

    /// Effective profile for one of this Container's Items.
    pub fn profile_for(&self, host: &H, key: ItemKey) -> Option<AnimationProfile> {
        let item = self.item(key)?;
        Some(profile::resolve(
            &self.defaults,
            &item.overrides,
            host.prefers_reduced_motion(),
        ))
    }

    /// Open one Item; with auto-close, close every other open sibling that is
    /// not in the opened Item's link group.
    pub fn open_item(
        &mut self,
        host: &mut H,
        cfg: &EngineConfig,
        key: ItemKey,
        out: &mut Outputs,
    ) -> Transition {
        let Some(profile) = self.profile_for(host, key) else {
            return Transition::Ignored;
        };
        let Some(pos) = self.position(key) else {
            return Transition::Ignored;
        };
        let transition = self.items[pos].open(host, cfg, profile);
        self.report(key, transition, out);
        if transition == Transition::Ignored || !self.auto_close {
            return transition;
        }

        let group = self.items[pos].link_group.clone();
        let siblings: Vec<ItemKey> = self
            .items
            .iter()
            .filter(|i| i.key != key && matches!(i.state(), ItemState::Open | ItemState::Opening))
            .filter(|i| group.as_deref().map_or(true, |g| !i.in_group(g)))
            .map(|i| i.key)
            .collect();
        for sibling in siblings {
            self.close_item(host, cfg, sibling, out);
        }
        transition
    }

    pub fn close_item(
        &mut self,
        host: &mut H,
        cfg: &EngineConfig,
        key: ItemKey,
        out: &mut Outputs,
    ) -> Transition {
        let Some(profile) = self.profile_for(host, key) else {
            return Transition::Ignored;
        };
        let Some(item) = self.items.iter_mut().find(|i| i.key == key) else {
            return Transition::Ignored;
        };
        let transition = item.close(host, cfg, profile);
        self.report(key, transition, out);
        transition
    }

    pub fn run_task(
        &mut self,
        host: &mut H,
        cfg: &EngineConfig,
        task: Task,
        out: &mut Outputs,
    ) -> Transition {
        let Some(item) = self.items.iter_mut().find(|i| i.key == task.item) else {
            return Transition::Ignored;
        };
        let transition = item.run_task(host, cfg, task);
        self.report(task.item, transition, out);
        transition
    }

    pub fn on_transition_end(
        &mut self,
        host: &mut H,
        cfg: &EngineConfig,
        target: &H::Node,
        property: &str,
        out: &mut Outputs,
    ) -> Transition {
        let Some(item) = self.items.iter_mut().find(|i| &i.panel == target) else {
            return Transition::Ignored;
        };
        let key = item.key;
        let transition = item.on_transition_end(host, cfg, target, property);
        self.report(key, transition, out);
        transition
    }

    /// Move focus between this Container's toggles. Returns the Item to
    /// activate for Enter/Space; the caller runs the activation so link
    /// groups stay in sync.
    pub fn on_keydown(
        &self,
        host: &mut H,
        target: &H::Node,
        key: &str,
    ) -> (KeyOutcome, Option<ItemKey>) {
        let Some(nav) = NavKey::from_dom(key) else {
            return (KeyOutcome::Ignored, None);
        };
        // Events bubbling up from a nested accordion belong to that accordion.
        let Some(current) = self.items.iter().position(|i| &i.toggle == target) else {
            return (KeyOutcome::Ignored, None);
        };
        if nav == NavKey::Activate {
            return (KeyOutcome::Handled, Some(self.items[current].key));
        }
        if let Some(next) = nav.target(current, self.items.len()) {
            host.focus(&self.items[next].toggle);
        }
        (KeyOutcome::Handled, None)
    }

    /// Refresh settled open panels to their new natural height.
    pub fn on_resize(&mut self, host: &mut H) -> usize {
        self.items
            .iter_mut()
            .map(|item| item.refresh_height(host))
            .filter(|refreshed| *refreshed)
            .count()
    }

    /// Bring the Item list in line with the Container's current children:
    /// existing Items keep their state, new ones are hydrated, missing ones
    /// are torn down. Returns whether anything changed.
    pub fn reconcile(&mut self, host: &mut H, cfg: &EngineConfig, ids: &mut IdAllocator) -> bool {
        let nodes: Vec<H::Node> = host
            .children(&self.node)
            .into_iter()
            .filter(|n| host.has_class(n, &cfg.item_class))
            .collect();
        let mut previous = std::mem::take(&mut self.items);
        let mut changed = false;
        for node in nodes {
            if let Some(pos) = previous.iter().position(|i| i.node == node) {
                self.items.push(previous.remove(pos));
                continue;
            }
            match Item::hydrate(host, cfg, ids.alloc_item(), node) {
                Ok(item) => {
                    self.items.push(item);
                    changed = true;
                }
                Err(err) => debug!("container {:?}: skipping item: {err}", self.id),
            }
        }
        for mut gone in previous {
            gone.teardown(host);
            changed = true;
        }
        changed
    }

    /// Release every listener, observer and timer. Idempotent.
    pub fn teardown(&mut self, host: &mut H, cfg: &EngineConfig) {
        for item in &mut self.items {
            item.teardown(host);
        }
        self.items.clear();
        if let Some(sub) = self.keydown.take() {
            host.unsubscribe(sub);
        }
        if let Some(sub) = self.resize.take() {
            host.unsubscribe(sub);
        }
        host.remove_attribute(&self.node, &cfg.hydrated_attribute);
    }

    fn position(&self, key: ItemKey) -> Option<usize> {
        self.items.iter().position(|i| i.key == key)
    }

    fn report(&self, key: ItemKey, transition: Transition, out: &mut Outputs) {
        let Transition::Settled(state) = transition else {
            return;
        };
        let Some(item) = self.item(key) else {
            return;
        };
        let item_id = item.id.clone();
        match state {
            ItemState::Open => out.push(AccordionEvent::ItemOpened {
                container: self.id,
                item: key,
                item_id,
            }),
            ItemState::Closed => out.push(AccordionEvent::ItemClosed {
                container: self.id,
                item: key,
                item_id,
            }),
            ItemState::Opening | ItemState::Closing => {}
        }
    }
}
