//! Plain-text rendering of a trace.

use std::fmt::Write;

use super::record::TraceRecord;

/// Digits the fractional part of a timestamp is padded to.
const FRACTION_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub show_args: bool,
    pub show_time: bool,
}

/// Render `records` in order, one block per record.
pub fn render<'a>(
    records: impl IntoIterator<Item = &'a TraceRecord>,
    options: FormatOptions,
) -> String {
    let mut output = String::new();

    for record in records {
        output.push_str("Action Name: ");

        if options.show_time {
            output.push_str(&render_timestamp(record.timestamp));
        }

        output.push_str(&record.action);
        output.push('\n');

        if options.show_args && record.arg_count > 0 {
            let _ = writeln!(output, "Args:\n{}", record.arguments);
        }
    }

    output
}

/// `(seconds.fraction) ` with the fraction right-padded to four digits.
pub fn render_timestamp(timestamp: f64) -> String {
    let text = timestamp.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    format!("({whole}.{}) ", pad_fraction(fraction, FRACTION_WIDTH))
}

/// Right-pad with zeros to `width`. Longer input is returned unchanged.
pub fn pad_fraction(fraction: &str, width: usize) -> String {
    format!("{fraction:0<width$}")
}
