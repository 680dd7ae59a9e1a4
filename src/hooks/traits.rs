use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::value::HookValue;

/// Which hooks a subscription listens to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HookPattern {
    /// Wildcard: every hook the host fires.
    All,
    Named(String),
}

impl HookPattern {
    pub fn matches(&self, hook: &str) -> bool {
        match self {
            HookPattern::All => true,
            HookPattern::Named(name) => name == hook,
        }
    }
}

/// Payload delivered to listeners when a hook fires.
#[derive(Debug, Clone, Copy)]
pub struct HookEvent<'a> {
    pub name: &'a str,
    pub args: &'a [HookValue],
}

/// Action returned by a listener to control request flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookAction {
    Continue,
    /// Abort the remainder of the request. Not recoverable.
    Halt { reason: String },
}

impl HookAction {
    pub fn is_halt(&self) -> bool {
        matches!(self, HookAction::Halt { .. })
    }
}

/// A callback the host invokes once per matching hook firing.
pub trait Listener: Send + Sync {
    fn name(&self) -> &str;
    fn on_event(&self, event: &HookEvent<'_>) -> HookAction;
}

/// Anything that dispatches hooks to subscribed listeners.
///
/// Lower priority values run first; listeners with equal priority run in
/// subscription order. `accepted_args` caps how many positional arguments
/// the listener receives.
pub trait EventSource: Send + Sync {
    fn subscribe(
        &self,
        pattern: HookPattern,
        priority: i32,
        accepted_args: usize,
        listener: Arc<dyn Listener>,
    );
    fn name(&self) -> &str;
}
