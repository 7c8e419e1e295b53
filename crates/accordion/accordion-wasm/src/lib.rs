//! Browser adapter for `accordion-core`.
//!
//! With the default `autostart` feature the module hydrates the document as
//! soon as it is loaded and keeps following DOM mutations. Pages that want
//! control over configuration build without it and call [`init`] themselves.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use accordion_core::{Dom, EngineConfig, ItemKey, ItemState, Transition};

mod host;
mod logger;
mod runtime;

pub use host::{WebHost, WebSubscription, WebTimer};
pub use runtime::{CLOSED_EVENT, OPENED_EVENT};

use runtime::{with_runtime, Runtime};

/// Options accepted by [`Accordions::new`] and [`init`]: every
/// [`EngineConfig`] field plus an optional console log level.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InitOptions {
    #[serde(flatten)]
    engine: EngineConfig,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    log_level: Option<String>,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn busy() -> JsError {
    JsError::new("accordion runtime is busy")
}

fn js_error(err: JsValue) -> JsError {
    JsError::new(&format!("{err:?}"))
}

#[derive(Copy, Clone)]
enum Request {
    Open,
    Close,
    Toggle,
}

/// Handle to one hydration engine bound to the current document.
#[wasm_bindgen]
#[derive(Clone)]
pub struct Accordions {
    runtime: Rc<RefCell<Runtime>>,
}

#[wasm_bindgen]
impl Accordions {
    /// Create an engine. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new Accordions({ open_class: "expanded", log_level: "debug" })
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<Accordions, JsError> {
        #[cfg(feature = "panic-hook")]
        console_error_panic_hook::set_once();

        let options: InitOptions = if jsvalue_is_undefined_or_null(&options) {
            InitOptions::default()
        } else {
            swb::from_value(options).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        options.engine.validate()?;
        if let Some(level) = &options.log_level {
            let level = level
                .parse()
                .map_err(|_| JsError::new(&format!("config error: unknown log level `{level}`")))?;
            logger::install(level);
        }

        let runtime = Runtime::new(options.engine).map_err(js_error)?;
        Ok(Accordions { runtime })
    }

    /// Hydrate every Container in `root` (the whole document when omitted).
    /// Returns how many Containers were created.
    pub fn hydrate(&self, root: Option<HtmlElement>) -> Result<u32, JsError> {
        let root = match root {
            Some(root) => root,
            None => self.document_root()?,
        };
        let created = with_runtime(&self.runtime, |engine, host| engine.hydrate(host, &root).len())
            .ok_or_else(busy)?;
        Ok(u32::try_from(created).unwrap_or(u32::MAX))
    }

    /// Follow node additions and removals under `root` (the whole document
    /// when omitted). Replaces a previous observation.
    pub fn observe(&self, root: Option<HtmlElement>) -> Result<(), JsError> {
        let root = match root {
            Some(root) => root,
            None => self.document_root()?,
        };
        runtime::watch(&self.runtime, &root).map_err(js_error)
    }

    /// Whether a mutation observation is active.
    pub fn observing(&self) -> bool {
        self.runtime
            .try_borrow()
            .map(|runtime| runtime.is_watching())
            .unwrap_or(false)
    }

    /// Open the Item owning `node` (its element or its toggle). Returns
    /// whether the request was accepted.
    pub fn open(&self, node: &HtmlElement) -> bool {
        self.request(node, Request::Open)
    }

    pub fn close(&self, node: &HtmlElement) -> bool {
        self.request(node, Request::Close)
    }

    pub fn toggle(&self, node: &HtmlElement) -> bool {
        self.request(node, Request::Toggle)
    }

    /// `"closed"`, `"opening"`, `"open"` or `"closing"`; undefined for nodes
    /// no hydrated Item owns.
    pub fn state(&self, node: &HtmlElement) -> Option<String> {
        let runtime = self.runtime.try_borrow().ok()?;
        let engine = &runtime.engine;
        let key = item_for(engine, node)?;
        let name = match engine.item_state(key)? {
            ItemState::Closed => "closed",
            ItemState::Opening => "opening",
            ItemState::Open => "open",
            ItemState::Closing => "closing",
        };
        Some(name.to_string())
    }

    /// Tear down every Container at or inside `node`. Returns how many.
    pub fn destroy(&self, node: &HtmlElement) -> u32 {
        let destroyed = with_runtime(&self.runtime, |engine, host| engine.destroy_node(host, node))
            .unwrap_or(0);
        u32::try_from(destroyed).unwrap_or(u32::MAX)
    }

    pub fn container_count(&self) -> u32 {
        self.runtime
            .try_borrow()
            .map(|runtime| u32::try_from(runtime.engine.container_count()).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    /// Live listeners and observers held for hydrated Containers and Items.
    pub fn listener_count(&self) -> u32 {
        self.runtime
            .try_borrow()
            .map(|runtime| u32::try_from(runtime.host.listener_count()).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    /// Stop observing and tear down every Container.
    pub fn dispose(&self) -> Result<(), JsError> {
        self.runtime.try_borrow_mut().map_err(|_| busy())?.unwatch();
        with_runtime(&self.runtime, |engine, host| engine.destroy_all(host)).ok_or_else(busy)?;
        Ok(())
    }
}

impl Accordions {
    fn document_root(&self) -> Result<HtmlElement, JsError> {
        self.runtime
            .try_borrow()
            .map(|runtime| runtime.host.document_root())
            .map_err(|_| busy())
    }

    fn request(&self, node: &HtmlElement, request: Request) -> bool {
        let transition = with_runtime(&self.runtime, |engine, host| {
            let key = item_for(engine, node)?;
            Some(match request {
                Request::Open => engine.open(host, key),
                Request::Close => engine.close(host, key),
                Request::Toggle => engine.toggle(host, key),
            })
        });
        matches!(transition, Some(Some(t)) if t != Transition::Ignored)
    }

    /// Observe and hydrate the whole document.
    fn start(&self) -> Result<(), JsError> {
        self.observe(None)?;
        self.hydrate(None)?;
        Ok(())
    }
}

fn item_for(engine: &accordion_core::Engine<WebHost>, node: &HtmlElement) -> Option<ItemKey> {
    engine
        .item_by_node(node)
        .or_else(|| engine.item_by_toggle(node))
}

/// Create an engine for the current document and start it: immediately when
/// the document has been parsed, otherwise on `DOMContentLoaded`.
#[wasm_bindgen]
pub fn init(options: JsValue) -> Result<Accordions, JsError> {
    let accordions = Accordions::new(options)?;
    let document = accordions
        .runtime
        .try_borrow()
        .map(|runtime| runtime.host.document().clone())
        .map_err(|_| busy())?;

    if document.ready_state() != "loading" {
        accordions.start()?;
        return Ok(accordions);
    }

    // Hydrating while the parser is still streaming would see half-built Items.
    let deferred = accordions.clone();
    let on_ready = Closure::once_into_js(move || {
        if let Err(err) = deferred.start() {
            log::warn!("deferred start failed: {:?}", JsValue::from(err));
        }
    });
    document
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
        .map_err(js_error)?;
    Ok(accordions)
}

#[cfg(feature = "autostart")]
thread_local! {
    static AUTOSTARTED: RefCell<Option<Accordions>> = const { RefCell::new(None) };
}

#[cfg(feature = "autostart")]
#[wasm_bindgen(start)]
fn autostart() -> Result<(), JsValue> {
    let accordions = init(JsValue::UNDEFINED).map_err(JsValue::from)?;
    AUTOSTARTED.with(|slot| *slot.borrow_mut() = Some(accordions));
    Ok(())
}

/// The engine started at module load, if any.
#[wasm_bindgen]
pub fn autostarted() -> Option<Accordions> {
    #[cfg(feature = "autostart")]
    {
        AUTOSTARTED.with(|slot| slot.borrow().clone())
    }
    #[cfg(not(feature = "autostart"))]
    {
        None
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
