//! In-memory page implementing the accordion host traits.
//!
//! Layout is deliberately simple: an element's natural height is its own
//! `height` plus the box heights of its visible children, and its box height
//! adds `border`. An inline `height: Npx` overrides the box height, `hidden`
//! collapses it to zero. Time only moves through [`FakePage::advance`].

use std::collections::BTreeMap;

use serde::Deserialize;

use accordion_core::{Dom, EventKind, Events, Scheduler, Task};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u32);

/// Declarative element tree used to build pages (JSON fixtures or builders).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub tag: String,
    /// Space separated class list.
    pub class: String,
    pub attrs: BTreeMap<String, String>,
    pub height: f64,
    pub border: f64,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: &str) -> Self {
        NodeSpec {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn attrs(mut self, attrs: &[(&str, &str)]) -> Self {
        for (name, value) in attrs {
            self.attrs.insert(name.to_string(), value.to_string());
        }
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn border(mut self, border: f64) -> Self {
        self.border = border;
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Clone, Debug, Default)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    height: f64,
    border: f64,
}

#[derive(Debug)]
pub struct FakePage {
    nodes: Vec<Element>,
    root: NodeId,
    focused: Option<NodeId>,
    reduced_motion: bool,
    now_ms: u64,
    frames: Vec<Task>,
    timers: BTreeMap<TimerId, (u64, Task)>,
    next_timer: u32,
    subscriptions: BTreeMap<SubscriptionId, (NodeId, EventKind)>,
    next_subscription: u32,
    flushes: usize,
}

impl FakePage {
    /// Build a page whose document root is `root`.
    pub fn new(root: &NodeSpec) -> Self {
        let mut page = FakePage {
            nodes: Vec::new(),
            root: NodeId(0),
            focused: None,
            reduced_motion: false,
            now_ms: 0,
            frames: Vec::new(),
            timers: BTreeMap::new(),
            next_timer: 0,
            subscriptions: BTreeMap::new(),
            next_subscription: 0,
            flushes: 0,
        };
        page.root = page.build(root, None);
        page
    }

    fn build(&mut self, spec: &NodeSpec, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element {
            tag: if spec.tag.is_empty() {
                "div".into()
            } else {
                spec.tag.clone()
            },
            classes: spec.class.split_whitespace().map(str::to_string).collect(),
            attrs: spec.attrs.clone(),
            parent,
            height: spec.height,
            border: spec.border,
            ..Default::default()
        });
        for child in &spec.children {
            let child_id = self.build(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    // ---- tree edits -------------------------------------------------------

    /// Build `spec` and append it under `parent`.
    pub fn append(&mut self, parent: NodeId, spec: &NodeSpec) -> NodeId {
        let id = self.build(spec, Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Detach `node` from its parent. The subtree stays addressable.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    pub fn set_content_height(&mut self, node: NodeId, height: f64) {
        self.nodes[node.0].height = height;
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    // ---- lookups ----------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(&self.root)
            .into_iter()
            .filter(|n| self.has_class(n, class))
            .collect()
    }

    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        self.descendants(&self.root)
            .into_iter()
            .find(|n| self.attribute(n, name).as_deref() == Some(value))
    }

    /// Item element by `data-item-id`.
    pub fn item(&self, item_id: &str) -> NodeId {
        self.find_by_attr("data-item-id", item_id)
            .unwrap_or_else(|| panic!("no item `{item_id}` on page"))
    }

    pub fn first_with_class(&self, within: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(&within)
            .into_iter()
            .find(|n| self.has_class(n, class))
    }

    pub fn toggle_of(&self, item_id: &str) -> NodeId {
        let item = self.item(item_id);
        self.first_with_class(item, "accordion-toggle")
            .unwrap_or_else(|| panic!("item `{item_id}` has no toggle"))
    }

    pub fn panel_of(&self, item_id: &str) -> NodeId {
        let item = self.item(item_id);
        self.first_with_class(item, "accordion-content")
            .unwrap_or_else(|| panic!("item `{item_id}` has no panel"))
    }

    pub fn styles(&self, node: NodeId) -> &BTreeMap<String, String> {
        &self.nodes[node.0].style
    }

    pub fn attributes(&self, node: NodeId) -> &BTreeMap<String, String> {
        &self.nodes[node.0].attrs
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        &self.nodes[node.0].classes
    }

    // ---- scheduling / listeners introspection ----------------------------

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Take every queued frame callback.
    pub fn take_frames(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.frames)
    }

    /// Move the clock forward and return timers that came due, in due order.
    pub fn advance(&mut self, ms: u64) -> Vec<Task> {
        self.now_ms += ms;
        let now = self.now_ms;
        let mut due: Vec<(TimerId, u64, Task)> = self
            .timers
            .iter()
            .filter(|(_, (at, _))| *at <= now)
            .map(|(id, (at, task))| (*id, *at, *task))
            .collect();
        due.sort_by_key(|(id, at, _)| (*at, *id));
        for (id, _, _) in &due {
            self.timers.remove(id);
        }
        due.into_iter().map(|(_, _, task)| task).collect()
    }

    pub fn subscriptions_on(&self, node: NodeId) -> Vec<EventKind> {
        self.subscriptions
            .values()
            .filter(|(n, _)| *n == node)
            .map(|(_, kind)| *kind)
            .collect()
    }

    pub fn has_subscription(&self, node: NodeId, kind: EventKind) -> bool {
        self.subscriptions_on(node).contains(&kind)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        self.nodes[node.0].attrs.contains_key("hidden")
    }
}

fn px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

impl Dom for FakePage {
    type Node = NodeId;

    fn document_root(&self) -> NodeId {
        self.root
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.clone()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let el = &self.nodes[node.0];
        if name == "class" {
            return Some(el.classes.join(" "));
        }
        el.attrs.get(name).cloned()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        let el = &mut self.nodes[node.0];
        if name == "class" {
            el.classes = value.split_whitespace().map(str::to_string).collect();
            return;
        }
        el.attrs.insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        self.nodes[node.0].attrs.remove(name);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.nodes[node.0].classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        self.nodes[node.0].classes.retain(|c| c != class);
    }

    fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.nodes[node.0].style.get(property).cloned()
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        self.nodes[node.0]
            .style
            .insert(property.to_string(), value.to_string());
    }

    fn remove_style(&mut self, node: &NodeId, property: &str) {
        self.nodes[node.0].style.remove(property);
    }

    fn scroll_height(&self, node: &NodeId) -> f64 {
        let el = &self.nodes[node.0];
        el.height
            + el
                .children
                .iter()
                .filter(|c| !self.is_hidden(**c))
                .map(|c| self.box_height(c))
                .sum::<f64>()
    }

    fn box_height(&self, node: &NodeId) -> f64 {
        if self.is_hidden(*node) {
            return 0.0;
        }
        let el = &self.nodes[node.0];
        match el.style.get("height").and_then(|h| px(h)) {
            Some(h) => h,
            None => self.scroll_height(node) + el.border,
        }
    }

    fn flush_layout(&mut self, _node: &NodeId) {
        self.flushes += 1;
    }

    fn focus(&mut self, node: &NodeId) {
        self.focused = Some(*node);
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
}

impl Scheduler for FakePage {
    type Timer = TimerId;

    fn request_frame(&mut self, task: Task) {
        self.frames.push(task);
    }

    fn set_timeout(&mut self, delay_ms: u32, task: Task) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(id, (self.now_ms + delay_ms as u64, task));
        id
    }

    fn clear_timeout(&mut self, timer: TimerId) {
        self.timers.remove(&timer);
    }
}

impl Events for FakePage {
    type Subscription = SubscriptionId;

    fn subscribe(&mut self, node: &NodeId, kind: EventKind) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(id, (*node, kind));
        id
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.subscriptions.remove(&subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FakePage {
        FakePage::new(
            &NodeSpec::new("body").child(
                NodeSpec::new("div")
                    .class("panel")
                    .border(2.0)
                    .child(NodeSpec::new("p").height(40.0))
                    .child(NodeSpec::new("p").height(60.0)),
            ),
        )
    }

    #[test]
    fn heights_follow_children_and_inline_overrides() {
        let mut page = sample();
        let panel = page.find_all_by_class("panel")[0];
        assert_eq!(page.scroll_height(&panel), 100.0);
        assert_eq!(page.box_height(&panel), 102.0);
        page.set_style(&panel, "height", "30px");
        assert_eq!(page.box_height(&panel), 30.0);
        page.remove_style(&panel, "height");
        page.set_attribute(&panel, "hidden", "");
        assert_eq!(page.box_height(&panel), 0.0);
    }

    #[test]
    fn timers_fire_in_due_order_and_can_be_cleared() {
        let mut page = sample();
        let task = |epoch| Task {
            item: accordion_core::ItemKey(0),
            epoch,
            step: accordion_core::Step::Settle,
        };
        let late = page.set_timeout(50, task(1));
        page.set_timeout(10, task(2));
        let cleared = page.set_timeout(5, task(3));
        page.clear_timeout(cleared);
        assert_eq!(page.advance(20), vec![task(2)]);
        assert_eq!(page.pending_timers(), 1);
        page.clear_timeout(late);
        assert!(page.advance(100).is_empty());
    }

    #[test]
    fn detach_keeps_subtree_addressable() {
        let mut page = sample();
        let panel = page.find_all_by_class("panel")[0];
        page.detach(panel);
        assert!(page.children(&page.root()).is_empty());
        assert_eq!(page.children(&panel).len(), 2);
        assert!(page.find_all_by_class("panel").is_empty());
    }
}
