//! Engine: lifecycle management and event entry points.
//!
//! Methods:
//! - hydrate, on_mutations, destroy, destroy_all (lifecycle)
//! - on_click, on_keydown, on_transition_end, on_resize, run_task (host events)
//! - open, close, toggle (programmatic control, same rules as a click)

use hashbrown::HashMap;
use log::debug;

use crate::config::EngineConfig;
use crate::container::Coordinator;
use crate::host::{Host, Task};
use crate::ids::{ContainerId, IdAllocator, ItemKey};
use crate::item::{ItemInfo, Transition};
use crate::keyboard::KeyOutcome;
use crate::link;
use crate::outputs::{AccordionEvent, Outputs};
use crate::registry::InstanceRegistry;
use crate::state::ItemState;

pub struct Engine<H: Host> {
    cfg: EngineConfig,
    ids: IdAllocator,
    registry: InstanceRegistry<H::Node>,
    containers: HashMap<ContainerId, Coordinator<H>>,
    outputs: Outputs,
}

impl<H: Host> Default for Engine<H> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<H: Host> Engine<H> {
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            registry: InstanceRegistry::new(),
            containers: HashMap::new(),
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Hydrate every un-hydrated Container in `root` (inclusive), outermost
    /// first. Returns the new Container ids.
    pub fn hydrate(&mut self, host: &mut H, root: &H::Node) -> Vec<ContainerId> {
        let mut candidates = vec![root.clone()];
        candidates.extend(host.descendants(root));
        let mut created = Vec::new();
        for node in candidates {
            if !host.has_class(&node, &self.cfg.container_class) {
                continue;
            }
            if self.registry.resolve(&node).is_some()
                || host.has_attribute(&node, &self.cfg.hydrated_attribute)
            {
                continue;
            }
            let id = self.ids.alloc_container();
            let coordinator = Coordinator::hydrate(host, &self.cfg, &mut self.ids, id, node.clone());
            debug!("hydrated container {id:?} with {} items", coordinator.len());
            self.outputs.push(AccordionEvent::ContainerHydrated {
                container: id,
                items: coordinator.len(),
            });
            self.registry.register(node, id);
            self.containers.insert(id, coordinator);
            created.push(id);
        }
        created
    }

    /// Apply one batch of document mutations: tear down removed Containers
    /// (nested ones included), hydrate added subtrees and reconcile the Item
    /// lists of live Containers whose children changed.
    pub fn on_mutations(&mut self, host: &mut H, added: &[H::Node], removed: &[H::Node]) {
        for node in removed {
            self.destroy_node(host, node);
        }

        let touched: Vec<ContainerId> = self
            .containers
            .values()
            .filter(|c| {
                added.iter().any(|n| host.parent(n).as_ref() == Some(&c.node))
                    || removed.iter().any(|n| c.item_by_node(n).is_some())
            })
            .map(|c| c.id)
            .collect();
        for id in touched {
            if let Some(coordinator) = self.containers.get_mut(&id) {
                if coordinator.reconcile(host, &self.cfg, &mut self.ids) {
                    debug!("container {id:?} reconciled to {} items", coordinator.len());
                }
            }
        }

        for node in added {
            self.hydrate(host, node);
        }
    }

    /// Tear down one Container. Unknown or already-destroyed ids are a no-op.
    pub fn destroy(&mut self, host: &mut H, id: ContainerId) -> bool {
        let Some(mut coordinator) = self.containers.remove(&id) else {
            return false;
        };
        coordinator.teardown(host, &self.cfg);
        self.registry.unregister(id);
        self.outputs
            .push(AccordionEvent::ContainerDestroyed { container: id });
        debug!("destroyed container {id:?}");
        true
    }

    /// Tear down every live Container.
    pub fn destroy_all(&mut self, host: &mut H) -> usize {
        let ids: Vec<ContainerId> = self.containers.keys().copied().collect();
        ids.into_iter().filter(|id| self.destroy(host, *id)).count()
    }

    /// Tear down every Container at or inside `node`.
    pub fn destroy_node(&mut self, host: &mut H, node: &H::Node) -> usize {
        let ids = self.registry.contained_in(host, node);
        ids.into_iter().filter(|id| self.destroy(host, *id)).count()
    }

    // ---------------------------------------------------------------------
    // Host events
    // ---------------------------------------------------------------------

    /// Toggle activation. Clicks on nodes no live Item owns are ignored.
    pub fn on_click(&mut self, host: &mut H, toggle: &H::Node) -> Transition {
        match self.item_by_toggle(toggle) {
            Some(key) => self.toggle(host, key),
            None => Transition::Ignored,
        }
    }

    /// Keyboard routing for the Container at `container`; `target` is the
    /// focused element the event was dispatched to.
    pub fn on_keydown(
        &mut self,
        host: &mut H,
        container: &H::Node,
        target: &H::Node,
        key: &str,
    ) -> KeyOutcome {
        let Some(coordinator) = self
            .registry
            .resolve(container)
            .and_then(|id| self.containers.get(&id))
        else {
            return KeyOutcome::Ignored;
        };
        let (outcome, activate) = coordinator.on_keydown(host, target, key);
        if let Some(item) = activate {
            self.toggle(host, item);
        }
        outcome
    }

    pub fn on_transition_end(&mut self, host: &mut H, target: &H::Node, property: &str) -> Transition {
        let Engine {
            cfg,
            containers,
            outputs,
            ..
        } = self;
        for coordinator in containers.values_mut() {
            let transition = coordinator.on_transition_end(host, cfg, target, property, outputs);
            if transition != Transition::Ignored {
                return transition;
            }
        }
        Transition::Ignored
    }

    /// Size change of a Container. Returns how many open panels were refreshed.
    pub fn on_resize(&mut self, host: &mut H, container: &H::Node) -> usize {
        self.registry
            .resolve(container)
            .and_then(|id| self.containers.get_mut(&id))
            .map_or(0, |c| c.on_resize(host))
    }

    /// Resume a scheduled step. Tasks for torn-down Items are ignored.
    pub fn run_task(&mut self, host: &mut H, task: Task) -> Transition {
        let Engine {
            cfg,
            containers,
            outputs,
            ..
        } = self;
        match containers.values_mut().find(|c| c.contains_item(task.item)) {
            Some(coordinator) => coordinator.run_task(host, cfg, task, outputs),
            None => Transition::Ignored,
        }
    }

    // ---------------------------------------------------------------------
    // Programmatic control
    // ---------------------------------------------------------------------

    pub fn toggle(&mut self, host: &mut H, item: ItemKey) -> Transition {
        match self.item_state(item) {
            Some(state) if state.toggle_opens() => self.drive(host, item, true),
            Some(_) => self.drive(host, item, false),
            None => Transition::Ignored,
        }
    }

    pub fn open(&mut self, host: &mut H, item: ItemKey) -> Transition {
        self.drive(host, item, true)
    }

    pub fn close(&mut self, host: &mut H, item: ItemKey) -> Transition {
        self.drive(host, item, false)
    }

    /// Drive one Item through its Coordinator, then propagate the target
    /// state to its link group.
    fn drive(&mut self, host: &mut H, item: ItemKey, open: bool) -> Transition {
        let Engine {
            cfg,
            registry,
            containers,
            outputs,
            ..
        } = self;
        let Some(coordinator) = containers.values_mut().find(|c| c.contains_item(item)) else {
            return Transition::Ignored;
        };
        let transition = if open {
            coordinator.open_item(host, cfg, item, outputs)
        } else {
            coordinator.close_item(host, cfg, item, outputs)
        };
        if transition == Transition::Ignored {
            return transition;
        }
        let link = coordinator
            .item(item)
            .and_then(|i| i.link_group.clone().map(|g| (g, i.node.clone())));
        if let Some((group, trigger)) = link {
            link::sync(host, cfg, registry, containers, outputs, &group, open, &trigger);
        }
        transition
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn resolve(&self, node: &H::Node) -> Option<ContainerId> {
        self.registry.resolve(node)
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn container(&self, id: ContainerId) -> Option<&Coordinator<H>> {
        self.containers.get(&id)
    }

    pub fn items(&self, id: ContainerId) -> Vec<ItemInfo> {
        self.containers
            .get(&id)
            .map(Coordinator::item_infos)
            .unwrap_or_default()
    }

    pub fn item_state(&self, item: ItemKey) -> Option<ItemState> {
        self.containers
            .values()
            .find_map(|c| c.item(item))
            .map(|i| i.state())
    }

    pub fn item_by_toggle(&self, toggle: &H::Node) -> Option<ItemKey> {
        self.containers
            .values()
            .find_map(|c| c.item_by_toggle(toggle))
    }

    /// Item whose element is `node`.
    pub fn item_by_node(&self, node: &H::Node) -> Option<ItemKey> {
        self.containers.values().find_map(|c| c.item_by_node(node))
    }

    /// Events produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<AccordionEvent> {
        self.outputs.drain()
    }
}
