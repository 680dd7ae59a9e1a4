//! Hook dispatch: the event source a trace listens on.
//!
//! The host fires named hooks during a request. Listeners subscribe through
//! [`EventSource`] with a pattern, a priority and an argument limit;
//! [`HookRegistry`] is the in-process implementation.

pub mod registry;
pub mod traits;
pub mod value;

pub use registry::HookRegistry;
pub use traits::{EventSource, HookAction, HookEvent, HookPattern, Listener};
pub use value::{dump_args, HookValue};

/// Create the default in-process hook registry.
pub fn create_registry() -> HookRegistry {
    HookRegistry::new()
}
