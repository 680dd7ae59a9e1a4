use chrono::{DateTime, Local};
use regex::Regex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use crate::host::HostContext;

/// Host-style `Y-m-d-h-i-s`: the hour is on the 12-hour clock.
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%I-%M-%S";

static SLUG_UNSAFE: OnceLock<Regex> = OnceLock::new();

/// Failures while writing a trace log. Each one aborts the request.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("[action-trace] Cannot open file ({})", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[action-trace] Cannot write to file ({})", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[action-trace] Cannot close file ({})", .path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for a rendered trace.
pub trait TraceSink: Send + Sync {
    fn emit(&self, output: &str, host: &dyn HostContext) -> Result<(), TraceError>;
    fn name(&self) -> &str;
}

/// Writes the trace into the page, wrapped in a styleable container.
pub struct InlineSink;

impl TraceSink for InlineSink {
    fn emit(&self, output: &str, host: &dyn HostContext) -> Result<(), TraceError> {
        host.write_output(&format!("<pre class=\"debug\">{output}</pre>"));
        Ok(())
    }

    fn name(&self) -> &str {
        "inline"
    }
}

/// Writes the trace to `<upload_dir>/<dir_name>/[slug_]<timestamp>.log`.
pub struct FileSink {
    dir_name: String,
}

impl FileSink {
    pub fn new(dir_name: &str) -> Self {
        Self {
            dir_name: dir_name.to_string(),
        }
    }

    pub fn trace_dir(&self, host: &dyn HostContext) -> PathBuf {
        host.upload_base_dir().join(&self.dir_name)
    }

    fn write_file(path: &Path, output: &str) -> Result<(), TraceError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| TraceError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        write_and_close(file, path, output, close)
    }
}

/// Write `output` in full, then hand the writer to `close`. `path` only
/// labels the error.
fn write_and_close<W: Write>(
    mut out: W,
    path: &Path,
    output: &str,
    close: impl FnOnce(W) -> std::io::Result<()>,
) -> Result<(), TraceError> {
    out.write_all(output.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|source| TraceError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    close(out).map_err(|source| TraceError::Close {
        path: path.to_path_buf(),
        source,
    })
}

impl TraceSink for FileSink {
    fn emit(&self, output: &str, host: &dyn HostContext) -> Result<(), TraceError> {
        let dir = self.trace_dir(host);
        if !dir.is_dir() {
            // A failure here resurfaces as an open error below.
            if let Err(error) = create_private_dir(&dir) {
                tracing::warn!("Failed to create trace directory {}: {error}", dir.display());
            }
        }

        let slug = host.current_slug();
        let path = dir.join(log_file_name(slug.as_deref(), Local::now()));
        Self::write_file(&path, output)?;

        tracing::info!(path = %path.display(), bytes = output.len(), "Trace written");
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// `[slug_]YYYY-MM-DD-hh-mm-ss.log`, with the slug reduced to filename-safe characters.
pub fn log_file_name(slug: Option<&str>, at: DateTime<Local>) -> String {
    let mut name = String::new();
    if let Some(slug) = slug.map(sanitize_slug).filter(|s| !s.is_empty()) {
        name.push_str(&slug);
        name.push('_');
    }
    name.push_str(&at.format(FILE_TIMESTAMP_FORMAT).to_string());
    name.push_str(".log");
    name
}

fn sanitize_slug(slug: &str) -> String {
    let re = SLUG_UNSAFE.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9_.-]").unwrap_or_else(|_| unreachable!("static pattern"))
    });
    let cleaned = re.replace_all(slug.trim(), "-");
    // Dots alone would name a parent directory.
    if cleaned.chars().all(|c| c == '.') {
        String::new()
    } else {
        cleaned.into_owned()
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new().mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir(dir)
}

fn close(file: File) -> std::io::Result<()> {
    file.sync_all()
}
