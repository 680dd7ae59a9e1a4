use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use super::format::{render, FormatOptions};
use super::record::{TraceList, TraceRecord};
use super::sink::TraceSink;
use crate::config::TraceFlags;
use crate::hooks::{HookAction, HookEvent, Listener};
use crate::host::HostContext;

/// Records every hook fired during one request and flushes the trace when
/// the terminal hook fires.
///
/// One collector is one trace session: its [`TraceList`] starts empty and
/// is never shared with another request.
pub struct ActionCollector {
    excluded: HashSet<String>,
    terminal_hook: String,
    options: FormatOptions,
    sink: Box<dyn TraceSink>,
    host: Arc<dyn HostContext>,
    records: Mutex<TraceList>,
}

impl ActionCollector {
    pub fn new(
        excluded: impl IntoIterator<Item = String>,
        terminal_hook: &str,
        flags: TraceFlags,
        sink: Box<dyn TraceSink>,
        host: Arc<dyn HostContext>,
    ) -> Self {
        Self {
            excluded: excluded.into_iter().collect(),
            terminal_hook: terminal_hook.to_string(),
            options: FormatOptions {
                show_args: flags.show_args,
                show_time: flags.show_time,
            },
            sink,
            host,
            records: Mutex::new(TraceList::new()),
        }
    }

    pub fn is_excluded(&self, hook: &str) -> bool {
        self.excluded.contains(hook)
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> TraceList {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn flush(&self) -> HookAction {
        let output = {
            let records = self.records.lock();
            tracing::info!(
                records = records.len(),
                sink = self.sink.name(),
                "Emitting action trace"
            );
            render(&*records, self.options)
        };

        match self.sink.emit(&output, self.host.as_ref()) {
            Ok(()) => HookAction::Continue,
            Err(error) => {
                let reason = error.to_string();
                self.host.log_error(&reason);
                HookAction::Halt { reason }
            }
        }
    }
}

impl Listener for ActionCollector {
    fn name(&self) -> &str {
        "action-trace"
    }

    fn on_event(&self, event: &HookEvent<'_>) -> HookAction {
        if self.is_excluded(event.name) {
            tracing::trace!(hook = event.name, "excluded hook skipped");
        } else {
            tracing::debug!(hook = event.name, args = event.args.len(), "hook recorded");
            self.records
                .lock()
                .push(TraceRecord::capture(event.name, event.args));
        }

        if event.name == self.terminal_hook {
            return self.flush();
        }
        HookAction::Continue
    }
}
