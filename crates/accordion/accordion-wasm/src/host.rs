//! `web-sys` implementation of the engine's host traits.
//!
//! Frames and timers reuse two long-lived closures: queued frame tasks are
//! drained by a single `requestAnimationFrame` callback, and timeouts carry
//! their [`Task`] as the callback argument.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;
use js_sys::Array;
use log::{debug, trace, warn};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Event, HtmlElement, KeyboardEvent, ResizeObserver, TransitionEvent, Window,
};

use accordion_core::{Dom, EventKind, Events, Scheduler, Task};

use crate::runtime::{with_runtime, Runtime};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// `setTimeout` handle; `None` when the browser refused to schedule.
#[derive(Debug)]
pub struct WebTimer(Option<i32>);

#[derive(Debug)]
pub struct WebSubscription(u32);

enum Listener {
    Dom {
        node: HtmlElement,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    },
    Resize {
        observer: ResizeObserver,
        _callback: Closure<dyn FnMut(Array)>,
    },
}

pub struct WebHost {
    window: Window,
    document: Document,
    root: HtmlElement,
    runtime: Weak<RefCell<Runtime>>,
    frames: Vec<Task>,
    frame_pending: bool,
    on_frame: Closure<dyn FnMut(f64)>,
    on_timeout: Closure<dyn FnMut(JsValue)>,
    listeners: HashMap<u32, Listener>,
    next_listener: u32,
}

impl WebHost {
    pub(crate) fn new(
        window: Window,
        document: Document,
        root: HtmlElement,
        runtime: Weak<RefCell<Runtime>>,
    ) -> Self {
        let frame_runtime = runtime.clone();
        let on_frame = Closure::new(move |_timestamp: f64| {
            if let Some(shared) = frame_runtime.upgrade() {
                run_frame(&shared);
            }
        });
        let timeout_runtime = runtime.clone();
        let on_timeout = Closure::new(move |raw: JsValue| {
            let task: Task = match swb::from_value(raw) {
                Ok(task) => task,
                Err(err) => {
                    warn!("dropping malformed timer task: {err}");
                    return;
                }
            };
            if let Some(shared) = timeout_runtime.upgrade() {
                with_runtime(&shared, |engine, host| engine.run_task(host, task));
            }
        });
        WebHost {
            window,
            document,
            root,
            runtime,
            frames: Vec::new(),
            frame_pending: false,
            on_frame,
            on_timeout,
            listeners: HashMap::new(),
            next_listener: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Frame tasks queued since the last frame; re-arms scheduling.
    fn take_frames(&mut self) -> Vec<Task> {
        self.frame_pending = false;
        std::mem::take(&mut self.frames)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn listen(&self, node: &HtmlElement, kind: EventKind) -> Option<Listener> {
        let event = match kind {
            EventKind::Click => "click",
            EventKind::KeyDown => "keydown",
            EventKind::TransitionEnd => "transitionend",
            EventKind::Resize => return self.observe_resize(node),
        };
        let runtime = self.runtime.clone();
        let current = node.clone();
        let callback: Closure<dyn FnMut(Event)> = Closure::new(move |event: Event| {
            if let Some(shared) = runtime.upgrade() {
                route(&shared, kind, &current, &event);
            }
        });
        if let Err(err) = node.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
            warn!("failed to attach {event} listener: {err:?}");
            return None;
        }
        Some(Listener::Dom {
            node: node.clone(),
            event,
            callback,
        })
    }

    fn observe_resize(&self, node: &HtmlElement) -> Option<Listener> {
        let runtime = self.runtime.clone();
        let container = node.clone();
        let callback: Closure<dyn FnMut(Array)> = Closure::new(move |_entries: Array| {
            if let Some(shared) = runtime.upgrade() {
                with_runtime(&shared, |engine, host| engine.on_resize(host, &container));
            }
        });
        let observer = match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(err) => {
                debug!("ResizeObserver unavailable: {err:?}");
                return None;
            }
        };
        observer.observe(node);
        Some(Listener::Resize {
            observer,
            _callback: callback,
        })
    }
}

fn run_frame(shared: &Rc<RefCell<Runtime>>) {
    with_runtime(shared, |engine, host| {
        for task in host.take_frames() {
            engine.run_task(host, task);
        }
    });
}

/// Deliver one DOM event to the engine entry point for its kind.
fn route(shared: &Rc<RefCell<Runtime>>, kind: EventKind, current: &HtmlElement, event: &Event) {
    match kind {
        EventKind::Click => {
            with_runtime(shared, |engine, host| engine.on_click(host, current));
        }
        EventKind::KeyDown => {
            let (Some(key_event), Some(target)) =
                (event.dyn_ref::<KeyboardEvent>(), event_target(event))
            else {
                return;
            };
            let key = key_event.key();
            let outcome =
                with_runtime(shared, |engine, host| engine.on_keydown(host, current, &target, &key));
            if outcome.is_some_and(|o| o.is_handled()) {
                event.prevent_default();
            }
        }
        EventKind::TransitionEnd => {
            let (Some(transition), Some(target)) =
                (event.dyn_ref::<TransitionEvent>(), event_target(event))
            else {
                return;
            };
            let property = transition.property_name();
            with_runtime(shared, |engine, host| {
                engine.on_transition_end(host, &target, &property)
            });
        }
        EventKind::Resize => {}
    }
}

fn event_target(event: &Event) -> Option<HtmlElement> {
    event.target()?.dyn_into::<HtmlElement>().ok()
}

fn report(result: Result<(), JsValue>, what: &str) {
    if let Err(err) = result {
        trace!("{what} failed: {err:?}");
    }
}

fn html_elements(items: impl Iterator<Item = Option<JsValue>>) -> Vec<HtmlElement> {
    items
        .flatten()
        .filter_map(|v| v.dyn_into::<HtmlElement>().ok())
        .collect()
}

impl Dom for WebHost {
    type Node = HtmlElement;

    fn document_root(&self) -> HtmlElement {
        self.root.clone()
    }

    fn children(&self, node: &HtmlElement) -> Vec<HtmlElement> {
        let list = node.children();
        html_elements((0..list.length()).map(|i| list.item(i).map(JsValue::from)))
    }

    fn parent(&self, node: &HtmlElement) -> Option<HtmlElement> {
        node.parent_element()?.dyn_into::<HtmlElement>().ok()
    }

    fn descendants(&self, node: &HtmlElement) -> Vec<HtmlElement> {
        match node.query_selector_all("*") {
            Ok(list) => html_elements((0..list.length()).map(|i| list.item(i).map(JsValue::from))),
            Err(err) => {
                trace!("querySelectorAll failed: {err:?}");
                Vec::new()
            }
        }
    }

    fn contains(&self, ancestor: &HtmlElement, node: &HtmlElement) -> bool {
        let node: &web_sys::Node = node.as_ref();
        ancestor.contains(Some(node))
    }

    fn attribute(&self, node: &HtmlElement, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &HtmlElement, name: &str, value: &str) {
        report(node.set_attribute(name, value), "setAttribute");
    }

    fn remove_attribute(&mut self, node: &HtmlElement, name: &str) {
        report(node.remove_attribute(name), "removeAttribute");
    }

    fn has_attribute(&self, node: &HtmlElement, name: &str) -> bool {
        node.has_attribute(name)
    }

    fn has_class(&self, node: &HtmlElement, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &HtmlElement, class: &str) {
        report(node.class_list().add_1(class), "classList.add");
    }

    fn remove_class(&mut self, node: &HtmlElement, class: &str) {
        report(node.class_list().remove_1(class), "classList.remove");
    }

    fn style(&self, node: &HtmlElement, property: &str) -> Option<String> {
        node.style()
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn set_style(&mut self, node: &HtmlElement, property: &str, value: &str) {
        report(node.style().set_property(property, value), "style.setProperty");
    }

    fn remove_style(&mut self, node: &HtmlElement, property: &str) {
        report(
            node.style().remove_property(property).map(|_| ()),
            "style.removeProperty",
        );
    }

    fn scroll_height(&self, node: &HtmlElement) -> f64 {
        f64::from(node.scroll_height())
    }

    fn box_height(&self, node: &HtmlElement) -> f64 {
        node.get_bounding_client_rect().height()
    }

    fn flush_layout(&mut self, node: &HtmlElement) {
        // Reading a layout property forces a synchronous reflow.
        let _ = node.offset_height();
    }

    fn focus(&mut self, node: &HtmlElement) {
        report(node.focus(), "focus");
    }

    fn focused(&self) -> Option<HtmlElement> {
        self.document.active_element()?.dyn_into::<HtmlElement>().ok()
    }

    fn prefers_reduced_motion(&self) -> bool {
        matches!(self.window.match_media(REDUCED_MOTION_QUERY), Ok(Some(query)) if query.matches())
    }
}

impl Scheduler for WebHost {
    type Timer = WebTimer;

    fn request_frame(&mut self, task: Task) {
        self.frames.push(task);
        if self.frame_pending {
            return;
        }
        match self
            .window
            .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
        {
            Ok(_) => self.frame_pending = true,
            Err(err) => warn!("requestAnimationFrame failed: {err:?}"),
        }
    }

    fn set_timeout(&mut self, delay_ms: u32, task: Task) -> WebTimer {
        let arg = match swb::to_value(&task) {
            Ok(arg) => arg,
            Err(err) => {
                warn!("cannot encode timer task: {err}");
                return WebTimer(None);
            }
        };
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_1(
                self.on_timeout.as_ref().unchecked_ref(),
                delay,
                &arg,
            );
        match handle {
            Ok(handle) => WebTimer(Some(handle)),
            Err(err) => {
                warn!("setTimeout failed: {err:?}");
                WebTimer(None)
            }
        }
    }

    fn clear_timeout(&mut self, timer: WebTimer) {
        if let Some(handle) = timer.0 {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Events for WebHost {
    type Subscription = WebSubscription;

    fn subscribe(&mut self, node: &HtmlElement, kind: EventKind) -> WebSubscription {
        let id = self.next_listener;
        self.next_listener = self.next_listener.wrapping_add(1);
        if let Some(listener) = self.listen(node, kind) {
            self.listeners.insert(id, listener);
        }
        WebSubscription(id)
    }

    fn unsubscribe(&mut self, subscription: WebSubscription) {
        match self.listeners.remove(&subscription.0) {
            Some(Listener::Dom {
                node,
                event,
                callback,
            }) => report(
                node.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref()),
                "removeEventListener",
            ),
            Some(Listener::Resize { observer, .. }) => observer.disconnect(),
            None => {}
        }
    }
}
