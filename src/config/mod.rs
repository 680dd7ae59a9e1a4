pub mod flags;
pub mod schema;

pub use flags::{is_truthy, TraceFlags};
pub use schema::{Config, TraceConfig};
