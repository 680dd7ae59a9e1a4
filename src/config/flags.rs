//! Per-request switches read from the query string.

use serde::{Deserialize, Serialize};

pub const PARAM_ENABLED: &str = "showDebugTrace";
pub const PARAM_SHOW_ARGS: &str = "showDebugArgs";
pub const PARAM_SHOW_TIME: &str = "showDebugTime";
pub const PARAM_LOG_TO_FILE: &str = "logToFile";

/// The four independent switches controlling a trace.
///
/// When `enabled` is false the other three are irrelevant: nothing is
/// subscribed and nothing is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFlags {
    pub enabled: bool,
    pub show_args: bool,
    pub show_time: bool,
    pub log_to_file: bool,
}

impl TraceFlags {
    /// Parse `a=1&b=0` style query text. A leading `?` is accepted and
    /// `%XX` / `+` escapes are decoded before truthiness is applied.
    pub fn from_query(query: &str) -> Self {
        let decoded: Vec<(String, String)> =
            form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect();
        Self::from_params(decoded.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Build flags from already-decoded parameters. Later duplicates win.
    pub fn from_params<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut enabled = None;
        let mut show_args = None;
        let mut show_time = None;
        let mut log_to_file = None;

        for (key, value) in params {
            let slot = match key {
                PARAM_ENABLED => &mut enabled,
                PARAM_SHOW_ARGS => &mut show_args,
                PARAM_SHOW_TIME => &mut show_time,
                PARAM_LOG_TO_FILE => &mut log_to_file,
                _ => continue,
            };
            *slot = Some(is_truthy(value));
        }

        Self {
            enabled: enabled.unwrap_or(false),
            show_args: show_args.unwrap_or(false),
            show_time: show_time.unwrap_or(false),
            log_to_file: log_to_file.unwrap_or(false),
        }
    }
}

/// Host truthiness for query values: `""` and `"0"` are false, anything else is true.
pub fn is_truthy(value: &str) -> bool {
    !(value.is_empty() || value == "0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_parameters_are_false() {
        assert_eq!(TraceFlags::from_query(""), TraceFlags::default());
        assert_eq!(TraceFlags::from_query("?page=2"), TraceFlags::default());
    }

    #[test]
    fn truthiness_follows_host_rules() {
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("false"));
        assert!(is_truthy("0.0"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn parses_all_four_flags() {
        let flags = TraceFlags::from_query(
            "?showDebugTrace=1&showDebugArgs=1&showDebugTime=true&logToFile=1",
        );
        assert_eq!(
            flags,
            TraceFlags {
                enabled: true,
                show_args: true,
                show_time: true,
                log_to_file: true,
            }
        );
    }

    #[test]
    fn falsy_activation_disables() {
        assert!(!TraceFlags::from_query("showDebugTrace=0").enabled);
        assert!(!TraceFlags::from_query("showDebugTrace=").enabled);
        assert!(!TraceFlags::from_query("showDebugTrace").enabled);
    }

    #[test]
    fn encoded_values_are_decoded() {
        assert!(!TraceFlags::from_query("showDebugTrace=%30").enabled);
        assert!(TraceFlags::from_query("showDebugTrace=%31").enabled);
        assert!(TraceFlags::from_query("show%44ebugTrace=1").enabled);
        assert!(TraceFlags::from_query("showDebugTrace=+").enabled);
        assert!(!TraceFlags::from_query("showDebugTrace=1&logToFile=%30").log_to_file);
    }

    #[test]
    fn later_duplicate_wins() {
        assert!(TraceFlags::from_query("showDebugTrace=0&showDebugTrace=1").enabled);
        assert!(!TraceFlags::from_query("showDebugTrace=1&showDebugTrace=0").enabled);
    }

    #[test]
    fn from_params_ignores_unknown_keys() {
        let flags = TraceFlags::from_params([("showDebugTime", "1"), ("other", "1")]);
        assert!(flags.show_time);
        assert!(!flags.enabled);
    }
}
