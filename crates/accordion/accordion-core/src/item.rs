//! Item controller: one toggle + panel pair and its animation sequences.
//!
//! Open:  mark open → unhide → pre-position children → measure → lock 0 + flush
//!        → (frame) animate to target → (transitionend | timeout) release.
//! Close: lock current height (overflow hidden, flush, measure, flush)
//!        → (frame) animate to 0 → (transitionend | timeout) hide + clean up.
//!
//! Instant profiles run the release step synchronously.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::attrs;
use crate::config::EngineConfig;
use crate::error::HydrateError;
use crate::host::{EventKind, Host, Step, Task};
use crate::ids::ItemKey;
use crate::profile::{AnimationProfile, ProfileOverrides};
use crate::state::ItemState;

const ARIA_EXPANDED: &str = "aria-expanded";
const HIDDEN: &str = "hidden";

/// Inline properties the sequences write on the panel.
const PANEL_PROPS: [&str; 4] = ["height", "transition", "overflow", "box-sizing"];
/// Inline properties the sequences write on animated children.
const CHILD_PROPS: [&str; 3] = ["transition", "opacity", "transform"];

/// Result of driving an Item.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Request rejected by the state machine or the callback was stale.
    Ignored,
    /// Sequence running; completion is asynchronous.
    Started,
    /// A stable state was reached during this call.
    Settled(ItemState),
}

/// Read-only view of an Item for queries and tests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub key: ItemKey,
    pub id: String,
    pub state: ItemState,
    pub link_group: Option<String>,
}

pub struct Item<H: Host> {
    pub key: ItemKey,
    pub id: String,
    pub node: H::Node,
    pub toggle: H::Node,
    pub panel: H::Node,
    pub open_default: bool,
    pub link_group: Option<String>,
    pub custom_class: Option<String>,
    pub overrides: ProfileOverrides,
    state: ItemState,
    /// Bumped by every new sequence; stale tasks carry an older value.
    epoch: u32,
    /// Profile frozen at the start of the running sequence.
    active: Option<AnimationProfile>,
    /// Set once the height transition has actually been started.
    armed: bool,
    target_height: f64,
    natural_height: f64,
    timer: Option<H::Timer>,
    click: Option<H::Subscription>,
    transition_end: Option<H::Subscription>,
}

impl<H: Host> Item<H> {
    /// Wire one Item: locate its parts, derive ARIA linkage, attach listeners
    /// and apply the initial state without animation.
    pub fn hydrate(
        host: &mut H,
        cfg: &EngineConfig,
        key: ItemKey,
        node: H::Node,
    ) -> Result<Self, HydrateError> {
        let id = attrs::read_non_empty(host, &node, attrs::ITEM_ID)
            .unwrap_or_else(|| format!("accordion-item-{}", key.0));

        let descendants = host.descendants(&node);
        let panel = descendants
            .iter()
            .find(|n| host.has_class(n, &cfg.panel_class))
            .cloned();
        // The toggle must not come from a nested accordion inside the panel.
        let toggle = descendants
            .iter()
            .find(|n| {
                host.has_class(n, &cfg.toggle_class)
                    && panel.as_ref().map_or(true, |p| !host.contains(p, n))
            })
            .cloned();
        let toggle = toggle.ok_or_else(|| HydrateError::MissingToggle {
            item_id: id.clone(),
        })?;
        let panel = panel.ok_or_else(|| HydrateError::MissingPanel {
            item_id: id.clone(),
        })?;

        let toggle_id = host
            .attribute(&toggle, "id")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("{id}-toggle"));
        let panel_id = host
            .attribute(&panel, "id")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("{id}-panel"));
        host.set_attribute(&toggle, "id", &toggle_id);
        host.set_attribute(&toggle, "aria-controls", &panel_id);
        host.set_attribute(&panel, "id", &panel_id);
        host.set_attribute(&panel, "role", "region");
        host.set_attribute(&panel, "aria-labelledby", &toggle_id);

        let custom_class = attrs::read_non_empty(host, &node, attrs::CUSTOM_CLASS);
        if let Some(class) = &custom_class {
            host.add_class(&node, class);
        }

        let open_default = attrs::read_bool(host, &node, attrs::OPEN_DEFAULT, false);
        let click = host.subscribe(&toggle, EventKind::Click);
        let transition_end = host.subscribe(&panel, EventKind::TransitionEnd);

        let mut item = Item {
            key,
            link_group: attrs::read_non_empty(host, &node, attrs::LINK_GROUP),
            overrides: ProfileOverrides::read(host, &node),
            id,
            node,
            toggle,
            panel,
            open_default,
            custom_class,
            state: ItemState::Closed,
            epoch: 0,
            active: None,
            armed: false,
            target_height: 0.0,
            natural_height: 0.0,
            timer: None,
            click: Some(click),
            transition_end: Some(transition_end),
        };
        item.apply_stable(host, cfg, open_default);
        Ok(item)
    }

    #[inline]
    pub fn state(&self) -> ItemState {
        self.state
    }

    /// Natural height recorded by the last resize refresh.
    #[inline]
    pub fn natural_height(&self) -> f64 {
        self.natural_height
    }

    pub fn info(&self) -> ItemInfo {
        ItemInfo {
            key: self.key,
            id: self.id.clone(),
            state: self.state,
            link_group: self.link_group.clone(),
        }
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.link_group.as_deref() == Some(group)
    }

    pub fn open(&mut self, host: &mut H, cfg: &EngineConfig, profile: AnimationProfile) -> Transition {
        let Some(next) = self.state.request_open() else {
            return Transition::Ignored;
        };
        self.begin_sequence(host, next, profile);
        trace!("item {} opening ({:?})", self.id, profile);

        host.add_class(&self.node, &cfg.open_class);
        host.set_attribute(&self.toggle, ARIA_EXPANDED, "true");
        host.remove_attribute(&self.panel, HIDDEN);

        let children = host.children(&self.panel);
        if profile.fades() {
            let offset = format!("translateY({}px)", profile.slide_distance);
            for child in &children {
                host.set_style(child, "transition", "none");
                host.set_style(child, "opacity", "0");
                host.set_style(child, "transform", &offset);
            }
        } else {
            clear_props(host, &children, &CHILD_PROPS);
        }

        // Measure without any constraint, or the previous lock leaks into the target.
        host.remove_style(&self.panel, "transition");
        host.remove_style(&self.panel, "height");
        self.target_height = host.box_height(&self.panel);

        if profile.is_instant() {
            return Transition::Settled(self.settle(host, cfg));
        }

        host.set_style(&self.panel, "box-sizing", "border-box");
        host.set_style(&self.panel, "overflow", "hidden");
        host.set_style(&self.panel, "height", "0px");
        host.flush_layout(&self.panel);
        host.request_frame(self.task(Step::BeginOpen));
        Transition::Started
    }

    pub fn close(&mut self, host: &mut H, cfg: &EngineConfig, profile: AnimationProfile) -> Transition {
        let Some(next) = self.state.request_close() else {
            return Transition::Ignored;
        };
        self.begin_sequence(host, next, profile);
        trace!("item {} closing ({:?})", self.id, profile);

        if profile.is_instant() {
            return Transition::Settled(self.settle(host, cfg));
        }

        host.set_style(&self.panel, "transition", "none");
        host.set_style(&self.panel, "box-sizing", "border-box");
        host.set_style(&self.panel, "overflow", "hidden");
        host.flush_layout(&self.panel);
        let locked = host.box_height(&self.panel);
        host.set_style(&self.panel, "height", &format!("{locked}px"));
        host.flush_layout(&self.panel);
        host.request_frame(self.task(Step::BeginClose));
        Transition::Started
    }

    /// Resume a scheduled step. Tasks from superseded sequences are ignored.
    pub fn run_task(&mut self, host: &mut H, cfg: &EngineConfig, task: Task) -> Transition {
        if task.epoch != self.epoch {
            trace!("item {}: stale {:?} (epoch {} != {})", self.id, task.step, task.epoch, self.epoch);
            return Transition::Ignored;
        }
        let Some(profile) = self.active else {
            return Transition::Ignored;
        };
        match (task.step, self.state) {
            (Step::BeginOpen, ItemState::Opening) if !self.armed => {
                host.set_style(&self.panel, "transition", &profile.height_transition());
                host.set_style(&self.panel, "height", &format!("{}px", self.target_height));
                if profile.fades() {
                    for (index, child) in host.children(&self.panel).iter().enumerate() {
                        host.set_style(child, "transition", &profile.child_transition(index, true));
                        host.set_style(child, "opacity", "1");
                        host.set_style(child, "transform", "translateY(0)");
                    }
                }
                self.arm(host, cfg, profile);
                Transition::Started
            }
            (Step::BeginClose, ItemState::Closing) if !self.armed => {
                host.set_style(&self.panel, "transition", &profile.height_transition());
                host.set_style(&self.panel, "height", "0px");
                if profile.fades() {
                    let offset = format!("translateY(-{}px)", profile.slide_distance);
                    for (index, child) in host.children(&self.panel).iter().enumerate() {
                        host.set_style(child, "transition", &profile.child_transition(index, false));
                        host.set_style(child, "opacity", "0");
                        host.set_style(child, "transform", &offset);
                    }
                }
                self.arm(host, cfg, profile);
                Transition::Started
            }
            (Step::Settle, state) if state.is_animating() && self.armed => {
                // The timer fired; nothing left to clear.
                self.timer = None;
                trace!("item {}: settle fallback fired", self.id);
                Transition::Settled(self.settle(host, cfg))
            }
            _ => Transition::Ignored,
        }
    }

    /// Transition completion on the panel. Only the panel's own height
    /// transition counts; child and nested-panel transitions are ignored.
    pub fn on_transition_end(
        &mut self,
        host: &mut H,
        cfg: &EngineConfig,
        target: &H::Node,
        property: &str,
    ) -> Transition {
        if target != &self.panel || property != "height" {
            return Transition::Ignored;
        }
        if !self.state.is_animating() || !self.armed {
            trace!("item {}: late transitionend ignored", self.id);
            return Transition::Ignored;
        }
        Transition::Settled(self.settle(host, cfg))
    }

    /// Re-release a settled open panel after a resize. Released panels carry
    /// no inline height, so this only drops a stray one and records the new
    /// natural height. Returns whether the item was eligible.
    pub fn refresh_height(&mut self, host: &mut H) -> bool {
        if self.state != ItemState::Open || self.armed || self.timer.is_some() {
            return false;
        }
        if host.style(&self.panel, "height").is_some() {
            host.remove_style(&self.panel, "height");
        }
        self.natural_height = host.scroll_height(&self.panel);
        true
    }

    /// Release listeners and timers. Safe to call more than once.
    pub fn teardown(&mut self, host: &mut H) {
        self.epoch = self.epoch.wrapping_add(1);
        self.armed = false;
        self.active = None;
        if let Some(timer) = self.timer.take() {
            host.clear_timeout(timer);
        }
        if let Some(sub) = self.click.take() {
            host.unsubscribe(sub);
        }
        if let Some(sub) = self.transition_end.take() {
            host.unsubscribe(sub);
        }
    }

    fn task(&self, step: Step) -> Task {
        Task {
            item: self.key,
            epoch: self.epoch,
            step,
        }
    }

    fn begin_sequence(&mut self, host: &mut H, next: ItemState, profile: AnimationProfile) {
        self.epoch = self.epoch.wrapping_add(1);
        self.armed = false;
        if let Some(timer) = self.timer.take() {
            host.clear_timeout(timer);
        }
        self.state = next;
        self.active = Some(profile);
    }

    fn arm(&mut self, host: &mut H, cfg: &EngineConfig, profile: AnimationProfile) {
        self.armed = true;
        let delay = cfg.fallback_delay_ms(profile.duration_ms());
        self.timer = Some(host.set_timeout(delay, self.task(Step::Settle)));
    }

    fn settle(&mut self, host: &mut H, cfg: &EngineConfig) -> ItemState {
        if let Some(timer) = self.timer.take() {
            host.clear_timeout(timer);
        }
        self.armed = false;
        self.active = None;
        let open = self.state.settle().unwrap_or(self.state) == ItemState::Open;
        self.apply_stable(host, cfg, open);
        debug!("item {} settled {:?}", self.id, self.state);
        self.state
    }

    /// Write the DOM end state of a stable Item.
    ///
    /// Opening only releases the panel: child fades run on their own timescale
    /// and may outlast the height transition. The next close or open resets
    /// the children.
    fn apply_stable(&mut self, host: &mut H, cfg: &EngineConfig, open: bool) {
        clear_props(host, std::slice::from_ref(&self.panel), &PANEL_PROPS);
        if open {
            host.add_class(&self.node, &cfg.open_class);
            host.set_attribute(&self.toggle, ARIA_EXPANDED, "true");
            host.remove_attribute(&self.panel, HIDDEN);
            self.state = ItemState::Open;
        } else {
            let children = host.children(&self.panel);
            clear_props(host, &children, &CHILD_PROPS);
            host.remove_class(&self.node, &cfg.open_class);
            host.set_attribute(&self.toggle, ARIA_EXPANDED, "false");
            host.set_attribute(&self.panel, HIDDEN, "");
            self.state = ItemState::Closed;
        }
    }
}

fn clear_props<H: Host>(host: &mut H, nodes: &[H::Node], props: &[&str]) {
    for node in nodes {
        for prop in props {
            if host.style(node, prop).is_some() {
                host.remove_style(node, prop);
            }
        }
    }
}
