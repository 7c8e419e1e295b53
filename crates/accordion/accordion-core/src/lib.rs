//! Accordion hydration core (host-agnostic)
//!
//! Turns static accordion markup into an interactive, accessible, animated
//! widget. The engine is driven entirely through the [`Host`] traits: adapters
//! provide document access, frame/timer scheduling and listener registration,
//! and feed events back into the [`Engine`] entry points.
//!
//! ```text
//! Engine::hydrate ─▶ Coordinator (per Container) ─▶ Item (per section)
//!       ▲                    │ auto-close, keyboard, resize
//!       │                    ▼
//!  on_mutations       link::sync ─▶ InstanceRegistry ─▶ other Coordinators
//! ```

pub mod attrs;
pub mod config;
pub mod container;
pub mod engine;
pub mod error;
pub mod host;
pub mod ids;
pub mod item;
pub mod keyboard;
pub mod link;
pub mod outputs;
pub mod profile;
pub mod registry;
pub mod state;

// Re-exports for consumers (adapters)
pub use config::EngineConfig;
pub use container::Coordinator;
pub use engine::Engine;
pub use error::{ConfigError, HydrateError, ParseEasingError};
pub use host::{Dom, EventKind, Events, Host, Scheduler, Step, Task};
pub use ids::{ContainerId, ItemKey};
pub use item::{ItemInfo, Transition};
pub use keyboard::{KeyOutcome, NavKey};
pub use outputs::AccordionEvent;
pub use profile::{AnimationProfile, Easing, ProfileOverrides};
pub use registry::InstanceRegistry;
pub use state::ItemState;
