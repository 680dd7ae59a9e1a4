//! Hook argument values and their dump rendering.
//!
//! Hooks pass arbitrary positional arguments. They are captured as
//! [`HookValue`] trees and printed in the host's `print_r` layout, so a
//! trace reads the same as the host's own debug output:
//!
//! ```text
//! Array
//! (
//!     [0] => init
//!     [1] => Array
//!         (
//!             [k] => v
//!         )
//!
//! )
//! ```

use std::fmt::Write;

/// Indent step between a container's brackets and its entries.
const INDENT: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum HookValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<HookValue>),
    /// Keyed container; keys keep insertion order.
    Map(Vec<(String, HookValue)>),
    Object {
        class: String,
        fields: Vec<(String, HookValue)>,
    },
    /// Placeholder for a handle that cannot be captured by value.
    Opaque(String),
}

impl HookValue {
    /// Render this value in `print_r` layout, starting at column zero.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, indent: usize) {
        match self {
            HookValue::Null | HookValue::Bool(false) => {}
            HookValue::Bool(true) => out.push('1'),
            HookValue::Int(n) => {
                let _ = write!(out, "{n}");
            }
            HookValue::Float(f) => out.push_str(&format_float(*f)),
            HookValue::Str(s) => out.push_str(s),
            HookValue::Opaque(id) => {
                let _ = write!(out, "Resource id #{id}");
            }
            HookValue::List(items) => {
                out.push_str("Array\n");
                let entries = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v));
                dump_entries(out, entries, indent);
            }
            HookValue::Map(fields) => {
                out.push_str("Array\n");
                dump_entries(out, fields.iter().map(|(k, v)| (k.clone(), v)), indent);
            }
            HookValue::Object { class, fields } => {
                let _ = writeln!(out, "{class} Object");
                dump_entries(out, fields.iter().map(|(k, v)| (k.clone(), v)), indent);
            }
        }
    }
}

fn dump_entries<'a>(
    out: &mut String,
    entries: impl Iterator<Item = (String, &'a HookValue)>,
    indent: usize,
) {
    let pad = " ".repeat(indent);
    let inner = " ".repeat(indent + INDENT);
    let _ = writeln!(out, "{pad}(");
    for (key, value) in entries {
        let _ = write!(out, "{inner}[{key}] => ");
        value.dump_into(out, indent + 2 * INDENT);
        out.push('\n');
    }
    let _ = writeln!(out, "{pad})");
}

/// Significant digits the host uses when printing floats.
const FLOAT_PRECISION: i32 = 14;

/// Format a float the way the host prints it: 14 significant digits,
/// trailing zeros dropped, `1.0E+20` style outside `1e-5 ..< 1e14`.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".into();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF".into() } else { "-INF".into() };
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0".into() } else { "0".into() };
    }

    let sign = if f < 0.0 { "-" } else { "" };
    // One leading digit plus thirteen more.
    let sci = format!("{:.13e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = digits.trim_end_matches('0');

    if exp < -4 || exp >= FLOAT_PRECISION {
        let (first, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        return format!("{sign}{first}.{rest}E{exp_sign}{}", exp.abs());
    }

    // Position of the decimal point relative to the digit string.
    let point = exp + 1;
    let body = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let point = point.unsigned_abs() as usize;
        if point >= digits.len() {
            format!("{digits}{}", "0".repeat(point - digits.len()))
        } else {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
    };
    format!("{sign}{body}")
}

/// Render a hook's full positional argument list.
pub fn dump_args(args: &[HookValue]) -> String {
    HookValue::List(args.to_vec()).dump()
}

impl From<serde_json::Value> for HookValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => HookValue::Null,
            serde_json::Value::Bool(b) => HookValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => HookValue::Int(i),
                None => HookValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => HookValue::Str(s),
            serde_json::Value::Array(items) => {
                HookValue::List(items.into_iter().map(HookValue::from).collect())
            }
            serde_json::Value::Object(map) => HookValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, HookValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for HookValue {
    fn from(value: &str) -> Self {
        HookValue::Str(value.to_string())
    }
}

impl From<String> for HookValue {
    fn from(value: String) -> Self {
        HookValue::Str(value)
    }
}

impl From<i64> for HookValue {
    fn from(value: i64) -> Self {
        HookValue::Int(value)
    }
}

impl From<f64> for HookValue {
    fn from(value: f64) -> Self {
        HookValue::Float(value)
    }
}

impl From<bool> for HookValue {
    fn from(value: bool) -> Self {
        HookValue::Bool(value)
    }
}
