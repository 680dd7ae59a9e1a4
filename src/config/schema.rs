use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hooks that fire constantly and drown out the interesting ones.
const DEFAULT_EXCLUDED_HOOKS: &[&str] = &[
    "gettext",
    "gettext_with_context",
    "set_url_scheme",
    "sanitize_key",
    "pre_option_siteurl",
    "option_siteurl",
    "clean_url",
    "attribute_escape",
    "alloptions",
    "admin_url",
    "wp_parse_str",
];

// ── Top-level config ──────────────────────────────────────────────

/// Top-level configuration, loaded from `config.toml`.
///
/// Resolution order: `--config` path → `~/.action-trace/config.toml` → built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Host upload area; trace logs go in a subdirectory of it. `~` and `$VARS` are expanded.
    /// Overridden by `ACTION_TRACE_UPLOAD_DIR`.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Trace collection settings (`[trace]`).
    #[serde(default)]
    pub trace: TraceConfig,
}

/// Trace collection configuration (`[trace]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Subdirectory of the upload area that receives log files. Default: `"wp-action-trace"`.
    #[serde(default = "default_dir_name")]
    pub dir_name: String,

    /// Hook names never recorded. Replaces the built-in list when set.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Dispatch priority of the collector. Higher runs later. Default: `99999`.
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Maximum positional arguments captured per hook. Default: `99`.
    #[serde(default = "default_accepted_args")]
    pub accepted_args: usize,

    /// Hook that ends the request and flushes the trace. Default: `"shutdown"`.
    #[serde(default = "default_terminal_hook")]
    pub terminal_hook: String,
}

fn default_upload_dir() -> String {
    "~/.action-trace/uploads".into()
}

fn default_dir_name() -> String {
    "wp-action-trace".into()
}

fn default_exclude() -> Vec<String> {
    DEFAULT_EXCLUDED_HOOKS.iter().map(|s| (*s).to_string()).collect()
}

fn default_priority() -> i32 {
    99_999
}

fn default_accepted_args() -> usize {
    99
}

fn default_terminal_hook() -> String {
    "shutdown".into()
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            dir_name: default_dir_name(),
            exclude: default_exclude(),
            priority: default_priority(),
            accepted_args: default_accepted_args(),
            terminal_hook: default_terminal_hook(),
        }
    }
}

// ── Config impl ──────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        let config_path = default_config_dir()
            .unwrap_or_else(|_| PathBuf::from(".action-trace"))
            .join("config.toml");

        Self {
            config_path,
            upload_dir: default_upload_dir(),
            trace: TraceConfig::default(),
        }
    }
}

fn default_config_dir() -> Result<PathBuf> {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home.join(".action-trace"))
}

impl Config {
    /// Load `path` (or the default location). A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_dir()?.join("config.toml"),
        };

        let (mut config, initialized) = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            (config, false)
        } else {
            (Config::default(), true)
        };
        config.config_path = config_path;

        config.apply_env_overrides();
        config.validate()?;
        tracing::info!(
            path = %config.config_path.display(),
            upload_dir = %config.upload_dir,
            defaults = initialized,
            "Config loaded"
        );
        Ok(config)
    }

    /// Apply `ACTION_TRACE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("ACTION_TRACE_UPLOAD_DIR") {
            if !dir.is_empty() {
                self.upload_dir = dir;
            }
        }

        if let Some(name) = lookup("ACTION_TRACE_DIR_NAME") {
            if !name.is_empty() {
                self.trace.dir_name = name;
            }
        }

        // Comma-separated; an explicitly empty value clears the list.
        if let Some(list) = lookup("ACTION_TRACE_EXCLUDE") {
            self.trace.exclude = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    /// Validate configuration values that would cause runtime failures.
    pub fn validate(&self) -> Result<()> {
        if self.upload_dir.trim().is_empty() {
            anyhow::bail!("upload_dir must not be empty");
        }

        let dir_name = self.trace.dir_name.trim();
        if dir_name.is_empty() {
            anyhow::bail!("trace.dir_name must not be empty");
        }
        if dir_name.contains(['/', '\\']) || dir_name == "." || dir_name == ".." {
            anyhow::bail!("trace.dir_name must be a single path component ({dir_name})");
        }

        if self.trace.accepted_args == 0 {
            anyhow::bail!("trace.accepted_args must be greater than 0");
        }

        if self.trace.terminal_hook.trim().is_empty() {
            anyhow::bail!("trace.terminal_hook must not be empty");
        }

        Ok(())
    }

    /// Upload directory with `~` and environment variables expanded.
    pub fn upload_dir_path(&self) -> PathBuf {
        let expanded = shellexpand::full(&self.upload_dir)
            .map_or_else(|_| shellexpand::tilde(&self.upload_dir), |v| v);
        PathBuf::from(expanded.as_ref())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_host_plugin() {
        let config = Config::default();
        assert_eq!(config.trace.dir_name, "wp-action-trace");
        assert_eq!(config.trace.priority, 99_999);
        assert_eq!(config.trace.accepted_args, 99);
        assert_eq!(config.trace.terminal_hook, "shutdown");
        assert_eq!(config.trace.exclude.len(), 11);
        assert!(config.trace.exclude.iter().any(|h| h == "gettext"));
        config.validate().unwrap();
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.toml");
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.config_path, path);
        assert_eq!(config.trace.terminal_hook, "shutdown");
    }

    #[test]
    fn load_reads_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "upload_dir = \"/srv/uploads\"\n[trace]\nexclude = [\"init\"]\naccepted_args = 3\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.trace.exclude, vec!["init".to_string()]);
        assert_eq!(config.trace.accepted_args, 3);
        assert_eq!(config.trace.dir_name, "wp-action-trace");
    }

    #[test]
    fn load_rejects_invalid_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[trace]\ndir_name = \"../escape\"\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());

        std::fs::write(&path, "not = [valid").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn validate_rejects_zero_accepted_args() {
        let mut config = Config::default();
        config.trace.accepted_args = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("ACTION_TRACE_UPLOAD_DIR", "/var/uploads"),
            ("ACTION_TRACE_DIR_NAME", "traces"),
            ("ACTION_TRACE_EXCLUDE", "gettext, init ,,"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.upload_dir, "/var/uploads");
        assert_eq!(config.trace.dir_name, "traces");
        assert_eq!(config.trace.exclude, vec!["gettext", "init"]);
    }

    #[test]
    fn empty_env_values_are_ignored_except_exclude() {
        let mut config = Config::default();
        config.apply_overrides_from(|k| match k {
            "ACTION_TRACE_UPLOAD_DIR" | "ACTION_TRACE_EXCLUDE" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.upload_dir, default_upload_dir());
        assert!(config.trace.exclude.is_empty());
    }

    #[test]
    fn upload_dir_expands_absolute_path_unchanged() {
        let mut config = Config::default();
        config.upload_dir = "/srv/uploads".into();
        assert_eq!(config.upload_dir_path(), PathBuf::from("/srv/uploads"));
    }

    #[test]
    fn toml_roundtrip_keeps_trace_section() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[trace]"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.trace.exclude, config.trace.exclude);
    }
}
