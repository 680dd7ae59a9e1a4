use parking_lot::Mutex;
use std::sync::Arc;

use super::traits::{EventSource, HookAction, HookEvent, HookPattern, Listener};
use super::value::HookValue;

struct Subscription {
    pattern: HookPattern,
    priority: i32,
    accepted_args: usize,
    listener: Arc<dyn Listener>,
}

/// Default in-process hook dispatcher.
///
/// Stores subscriptions behind a `Mutex` and dispatches each firing in
/// priority order. A listener that returns [`HookAction::Halt`] aborts the
/// request: dispatch stops and every later `fire` is refused.
pub struct HookRegistry {
    subscriptions: Mutex<Vec<Subscription>>,
    firing: Mutex<Vec<String>>,
    halted: Mutex<Option<String>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            firing: Mutex::new(Vec::new()),
            halted: Mutex::new(None),
        }
    }

    /// Fire `hook` with `args` and run every matching listener.
    pub fn fire(&self, hook: &str, args: &[HookValue]) -> HookAction {
        if let Some(reason) = self.halted.lock().clone() {
            tracing::debug!(hook, "request halted, ignoring hook");
            return HookAction::Halt { reason };
        }

        // Snapshot so listeners can fire nested hooks without deadlocking.
        let mut relevant: Vec<(i32, usize, Arc<dyn Listener>)> = {
            let subscriptions = self.subscriptions.lock();
            subscriptions
                .iter()
                .filter(|s| s.pattern.matches(hook))
                .map(|s| (s.priority, s.accepted_args, Arc::clone(&s.listener)))
                .collect()
        };
        // Stable sort keeps subscription order among equal priorities.
        relevant.sort_by_key(|(priority, _, _)| *priority);

        self.firing.lock().push(hook.to_string());

        let mut action = HookAction::Continue;
        for (_, accepted_args, listener) in relevant {
            let event = HookEvent {
                name: hook,
                args: &args[..args.len().min(accepted_args)],
            };
            action = listener.on_event(&event);
            if let HookAction::Halt { reason } = &action {
                tracing::warn!(hook, listener = listener.name(), %reason, "request halted");
                *self.halted.lock() = Some(reason.clone());
                break;
            }
            // A nested fire inside the listener may have halted the request.
            if let Some(reason) = self.halted.lock().clone() {
                action = HookAction::Halt { reason };
                break;
            }
        }

        self.firing.lock().pop();
        action
    }

    /// Name of the innermost hook currently being dispatched.
    pub fn current_hook(&self) -> Option<String> {
        self.firing.lock().last().cloned()
    }

    pub fn is_halted(&self) -> bool {
        self.halted.lock().is_some()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for HookRegistry {
    fn subscribe(
        &self,
        pattern: HookPattern,
        priority: i32,
        accepted_args: usize,
        listener: Arc<dyn Listener>,
    ) {
        tracing::debug!(
            listener = listener.name(),
            ?pattern,
            priority,
            accepted_args,
            "listener subscribed"
        );
        self.subscriptions.lock().push(Subscription {
            pattern,
            priority,
            accepted_args,
            listener,
        });
    }

    fn name(&self) -> &str {
        "registry"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Appends `tag:hook:argc` to a shared log on every call.
    struct Spy {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        halt_on: Option<&'static str>,
    }

    impl Spy {
        fn new(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                tag,
                log: Arc::clone(log),
                halt_on: None,
            })
        }
    }

    impl Listener for Spy {
        fn name(&self) -> &str {
            self.tag
        }

        fn on_event(&self, event: &HookEvent<'_>) -> HookAction {
            self.log
                .lock()
                .push(format!("{}:{}:{}", self.tag, event.name, event.args.len()));
            if self.halt_on == Some(event.name) {
                return HookAction::Halt {
                    reason: "stopped".into(),
                };
            }
            HookAction::Continue
        }
    }

    #[test]
    fn dispatches_in_priority_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HookRegistry::new();
        registry.subscribe(HookPattern::All, 99_999, 99, Spy::new("late", &log));
        registry.subscribe(HookPattern::All, 10, 99, Spy::new("early", &log));
        registry.subscribe(HookPattern::All, 10, 99, Spy::new("early2", &log));

        registry.fire("init", &[]);

        assert_eq!(
            *log.lock(),
            vec!["early:init:0", "early2:init:0", "late:init:0"]
        );
    }

    #[test]
    fn named_subscription_only_sees_its_hook() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HookRegistry::new();
        registry.subscribe(
            HookPattern::Named("wp_loaded".into()),
            10,
            1,
            Spy::new("named", &log),
        );

        registry.fire("init", &[]);
        registry.fire("wp_loaded", &[]);

        assert_eq!(*log.lock(), vec!["named:wp_loaded:0"]);
    }

    #[test]
    fn truncates_arguments_to_accepted_count() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HookRegistry::new();
        registry.subscribe(HookPattern::All, 10, 2, Spy::new("two", &log));

        let args = vec![HookValue::Int(1), HookValue::Int(2), HookValue::Int(3)];
        registry.fire("save_post", &args);

        assert_eq!(*log.lock(), vec!["two:save_post:2"]);
    }

    #[test]
    fn halt_stops_dispatch_and_later_fires() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HookRegistry::new();
        registry.subscribe(
            HookPattern::All,
            1,
            99,
            Arc::new(Spy {
                tag: "stopper",
                log: Arc::clone(&log),
                halt_on: Some("shutdown"),
            }),
        );
        registry.subscribe(HookPattern::All, 2, 99, Spy::new("after", &log));

        assert!(registry.fire("shutdown", &[]).is_halt());
        assert!(registry.is_halted());
        assert!(registry.fire("init", &[]).is_halt());

        assert_eq!(*log.lock(), vec!["stopper:shutdown:0"]);
    }

    #[test]
    fn halt_inside_nested_fire_aborts_outer_dispatch() {
        /// Fires `inner` from inside `outer`.
        struct Relay(Arc<HookRegistry>);

        impl Listener for Relay {
            fn name(&self) -> &str {
                "relay"
            }

            fn on_event(&self, event: &HookEvent<'_>) -> HookAction {
                if event.name == "outer" {
                    self.0.fire("inner", &[]);
                }
                HookAction::Continue
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(HookRegistry::new());
        registry.subscribe(
            HookPattern::All,
            1,
            99,
            Arc::new(Relay(Arc::clone(&registry))),
        );
        registry.subscribe(
            HookPattern::Named("inner".into()),
            2,
            99,
            Arc::new(Spy {
                tag: "stopper",
                log: Arc::clone(&log),
                halt_on: Some("inner"),
            }),
        );
        registry.subscribe(HookPattern::All, 5, 99, Spy::new("late", &log));

        let action = registry.fire("outer", &[]);

        assert_eq!(
            action,
            HookAction::Halt {
                reason: "stopped".into()
            }
        );
        assert!(registry.is_halted());
        assert_eq!(*log.lock(), vec!["stopper:inner:0"]);
        assert_eq!(registry.current_hook(), None);
    }

    #[test]
    fn current_hook_tracks_nested_fires() {
        struct Nester {
            registry: Arc<HookRegistry>,
            seen: Mutex<Vec<Option<String>>>,
        }

        impl Listener for Nester {
            fn name(&self) -> &str {
                "nester"
            }

            fn on_event(&self, event: &HookEvent<'_>) -> HookAction {
                self.seen.lock().push(self.registry.current_hook());
                if event.name == "outer" {
                    self.registry.fire("inner", &[]);
                    self.seen.lock().push(self.registry.current_hook());
                }
                HookAction::Continue
            }
        }

        let registry = Arc::new(HookRegistry::new());
        let nester = Arc::new(Nester {
            registry: Arc::clone(&registry),
            seen: Mutex::new(Vec::new()),
        });
        registry.subscribe(HookPattern::All, 10, 99, nester.clone());

        registry.fire("outer", &[]);

        assert_eq!(
            *nester.seen.lock(),
            vec![
                Some("outer".to_string()),
                Some("inner".to_string()),
                Some("outer".to_string()),
            ]
        );
        assert_eq!(registry.current_hook(), None);
    }
}
