#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::needless_pass_by_value,
    clippy::needless_raw_string_hashes,
    clippy::return_self_not_must_use,
    clippy::similar_names,
    clippy::struct_field_names,
    clippy::too_many_lines,
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]

//! Record every hook fired during a request and dump the trace inline or to
//! a log file.
//!
//! ```no_run
//! use std::sync::Arc;
//! use action_trace::{hooks::HookRegistry, host::LocalHost, trace, Config, TraceFlags};
//!
//! let config = Config::default();
//! let registry = HookRegistry::new();
//! let host = Arc::new(LocalHost::new(&config.upload_dir_path()));
//! let flags = TraceFlags::from_query("showDebugTrace=1&showDebugTime=1");
//!
//! trace::install(&registry, flags, &config, host);
//! registry.fire("init", &[]);
//! registry.fire("shutdown", &[]);
//! ```

pub mod config;
pub mod hooks;
pub mod host;
pub mod trace;

pub use config::{Config, TraceFlags};
