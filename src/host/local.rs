use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::traits::HostContext;

/// Host backed by the local filesystem, writing page output to any
/// `Write` sink (stdout by default) and errors to `tracing`.
pub struct LocalHost {
    upload_dir: PathBuf,
    slug: Mutex<Option<String>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl LocalHost {
    pub fn new(upload_dir: &Path) -> Self {
        Self::with_output(upload_dir, Box::new(std::io::stdout()))
    }

    pub fn with_output(upload_dir: &Path, output: Box<dyn Write + Send>) -> Self {
        Self {
            upload_dir: upload_dir.to_path_buf(),
            slug: Mutex::new(None),
            output: Mutex::new(output),
        }
    }

    /// Set (or clear) the content item the request is rendering.
    pub fn set_current_slug(&self, slug: Option<String>) {
        *self.slug.lock() = slug.filter(|s| !s.is_empty());
    }
}

impl HostContext for LocalHost {
    fn upload_base_dir(&self) -> PathBuf {
        self.upload_dir.clone()
    }

    fn current_slug(&self) -> Option<String> {
        self.slug.lock().clone()
    }

    fn write_output(&self, text: &str) {
        let mut output = self.output.lock();
        if let Err(error) = output.write_all(text.as_bytes()).and_then(|()| output.flush()) {
            tracing::warn!("Failed to write page output: {error}");
        }
    }

    fn log_error(&self, message: &str) {
        tracing::error!(target: "action_trace::host", "{message}");
    }

    fn name(&self) -> &str {
        "local"
    }
}
