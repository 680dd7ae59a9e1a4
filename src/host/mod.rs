//! Host platform services: upload area, current content item, page output
//! and error log.

pub mod local;
pub mod traits;

pub use local::LocalHost;
pub use traits::HostContext;

use crate::config::Config;

/// Create a stdout-backed local host rooted at the configured upload directory.
pub fn create_host(config: &Config) -> LocalHost {
    LocalHost::new(&config.upload_dir_path())
}
