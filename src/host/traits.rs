use std::path::PathBuf;

/// Services the host platform provides to a trace during one request.
pub trait HostContext: Send + Sync {
    /// Base directory of the host's upload area.
    fn upload_base_dir(&self) -> PathBuf;
    /// Slug of the content item being rendered, if any.
    fn current_slug(&self) -> Option<String>;
    /// Append text to the response body.
    fn write_output(&self, text: &str);
    /// Host error log.
    fn log_error(&self, message: &str);
    fn name(&self) -> &str;
}
