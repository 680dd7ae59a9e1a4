//! Request-scoped action tracing.
//!
//! [`install`] subscribes an [`ActionCollector`] on every hook when the
//! request asks for a trace. The collector records each firing and, when
//! the terminal hook arrives, renders the trace with [`format::render`] and
//! hands it to a [`TraceSink`]: inline in the page, or a log file under the
//! host's upload area.

pub mod collector;
pub mod format;
pub mod record;
pub mod sink;

pub use collector::ActionCollector;
pub use format::{pad_fraction, render, render_timestamp, FormatOptions};
pub use record::{TraceList, TraceRecord};
pub use sink::{log_file_name, FileSink, InlineSink, TraceError, TraceSink};

use std::sync::Arc;

use crate::config::{Config, TraceFlags};
use crate::hooks::{EventSource, HookPattern};
use crate::host::HostContext;

/// Pick the sink the flags ask for.
pub fn create_sink(flags: &TraceFlags, config: &Config) -> Box<dyn TraceSink> {
    if flags.log_to_file {
        Box::new(FileSink::new(&config.trace.dir_name))
    } else {
        Box::new(InlineSink)
    }
}

/// Subscribe a collector on every hook if `flags.enabled`.
///
/// Returns `None` without touching `source` when tracing is off. The
/// collector runs at the configured (lowest) priority so it observes each
/// hook after every other listener.
pub fn install(
    source: &dyn EventSource,
    flags: TraceFlags,
    config: &Config,
    host: Arc<dyn HostContext>,
) -> Option<Arc<ActionCollector>> {
    if !flags.enabled {
        return None;
    }

    let collector = Arc::new(ActionCollector::new(
        config.trace.exclude.iter().cloned(),
        &config.trace.terminal_hook,
        flags,
        create_sink(&flags, config),
        host,
    ));
    source.subscribe(
        HookPattern::All,
        config.trace.priority,
        config.trace.accepted_args,
        collector.clone(),
    );
    tracing::info!(
        source = source.name(),
        show_args = flags.show_args,
        show_time = flags.show_time,
        log_to_file = flags.log_to_file,
        "Action trace installed"
    );

    Some(collector)
}
