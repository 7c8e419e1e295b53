//! Shared engine + host pair behind every browser callback.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use log::{debug, trace, warn};
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CustomEvent, CustomEventInit, HtmlElement, MutationObserver, MutationObserverInit,
    MutationRecord, NodeList,
};

use accordion_core::{AccordionEvent, Engine, EngineConfig};

use crate::host::WebHost;

pub const OPENED_EVENT: &str = "accordion:opened";
pub const CLOSED_EVENT: &str = "accordion:closed";

pub struct Runtime {
    pub engine: Engine<WebHost>,
    pub host: WebHost,
    watch: Option<Watch>,
}

/// Document mutation subscription feeding [`Engine::on_mutations`].
struct Watch {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl Runtime {
    pub fn new(cfg: EngineConfig) -> Result<Rc<RefCell<Runtime>>, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        let root = document
            .document_element()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| JsValue::from_str("document has no root element"))?;
        Ok(Rc::new_cyclic(|weak| {
            RefCell::new(Runtime {
                engine: Engine::new(cfg),
                host: WebHost::new(window, document, root, weak.clone()),
                watch: None,
            })
        }))
    }

    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    pub fn unwatch(&mut self) {
        if let Some(watch) = self.watch.take() {
            watch.observer.disconnect();
        }
    }
}

/// Start delivering child-list mutations under `target` to the engine.
/// Replaces any previous watch.
pub fn watch(shared: &Rc<RefCell<Runtime>>, target: &HtmlElement) -> Result<(), JsValue> {
    let weak = Rc::downgrade(shared);
    let callback: Closure<dyn FnMut(Array, MutationObserver)> =
        Closure::new(move |records: Array, _observer: MutationObserver| {
            let (added, removed) = collect_mutations(&records);
            if added.is_empty() && removed.is_empty() {
                return;
            }
            if let Some(shared) = weak.upgrade() {
                with_runtime(&shared, |engine, host| {
                    engine.on_mutations(host, &added, &removed)
                });
            }
        });
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(target, &init)?;

    let mut runtime = shared
        .try_borrow_mut()
        .map_err(|_| JsValue::from_str("accordion runtime is busy"))?;
    runtime.unwatch();
    runtime.watch = Some(Watch {
        observer,
        _callback: callback,
    });
    Ok(())
}

fn collect_mutations(records: &Array) -> (Vec<HtmlElement>, Vec<HtmlElement>) {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    for record in records.iter() {
        let Ok(record) = record.dyn_into::<MutationRecord>() else {
            continue;
        };
        added.extend(elements(&record.added_nodes()));
        removed.extend(elements(&record.removed_nodes()));
    }
    (added, removed)
}

fn elements(list: &NodeList) -> Vec<HtmlElement> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

/// Run `f` against the engine, then dispatch the DOM events it produced once
/// the runtime is released. Returns `None` when the runtime is already
/// borrowed (a callback re-entered from inside an engine call).
pub fn with_runtime<R>(
    shared: &Rc<RefCell<Runtime>>,
    f: impl FnOnce(&mut Engine<WebHost>, &mut WebHost) -> R,
) -> Option<R> {
    let (result, notices) = {
        let Ok(mut runtime) = shared.try_borrow_mut() else {
            trace!("runtime busy, dropping re-entrant callback");
            return None;
        };
        let Runtime { engine, host, .. } = &mut *runtime;
        let result = f(engine, host);
        (result, notices(engine))
    };
    for notice in notices {
        notice.dispatch();
    }
    Some(result)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Detail {
    item_id: String,
}

/// A settled Item announcement waiting to be dispatched on its element.
struct Notice {
    node: HtmlElement,
    name: &'static str,
    detail: Detail,
}

impl Notice {
    fn dispatch(self) {
        if let Err(err) = self.try_dispatch() {
            warn!("failed to dispatch {}: {err:?}", self.name);
        }
    }

    fn try_dispatch(&self) -> Result<(), JsValue> {
        let detail = swb::to_value(&self.detail)?;
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        init.set_detail(&detail);
        let event = CustomEvent::new_with_event_init_dict(self.name, &init)?;
        self.node.dispatch_event(&event)?;
        Ok(())
    }
}

fn notices(engine: &mut Engine<WebHost>) -> Vec<Notice> {
    let events = engine.drain_events();
    events
        .into_iter()
        .filter_map(|event| {
            let (container, item, item_id, name) = match event {
                AccordionEvent::ItemOpened {
                    container,
                    item,
                    item_id,
                } => (container, item, item_id, OPENED_EVENT),
                AccordionEvent::ItemClosed {
                    container,
                    item,
                    item_id,
                } => (container, item, item_id, CLOSED_EVENT),
                other => {
                    debug!("{other:?}");
                    return None;
                }
            };
            let node = engine.container(container)?.item(item)?.node.clone();
            Some(Notice {
                node,
                name,
                detail: Detail { item_id },
            })
        })
        .collect()
}
