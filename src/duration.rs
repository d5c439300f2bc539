// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Duration parsing for Go-style duration strings.
//!
//! Provider configuration documents express timeouts the way the ACME tooling
//! ecosystem does: `"60s"`, `"2m"`, `"1h30m"`, `"500ms"`. Environment variables
//! traditionally carry bare numbers, which are read as seconds.

use anyhow::{bail, Context, Result};
use std::time::Duration;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Parse a Go-style duration string into a Rust `Duration`.
///
/// Supported units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`, `d`, `w`.
/// Components may be chained (`"1h30m"`) and may carry a fraction (`"1.5h"`).
/// A bare number (`"120"`, `"1.5"`) is a number of seconds.
///
/// # Examples
///
/// ```
/// use dns01_providers::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("120").unwrap(), Duration::from_secs(120));
/// assert_eq!(parse_duration("1.5").unwrap(), Duration::from_millis(1500));
/// assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
///
/// assert!(parse_duration("").is_err());
/// assert!(parse_duration("10x").is_err());
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The string is empty
/// - A component has no value or no unit
/// - A unit is not recognized
/// - The total overflows `Duration`
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    let input = duration_str.trim();
    if input.is_empty() {
        bail!("Duration string cannot be empty");
    }

    // Bare numbers are seconds
    if input.chars().all(|c| c.is_ascii_digit()) {
        let secs: u64 = input
            .parse()
            .with_context(|| format!("Duration '{input}' is too large"))?;
        return Ok(Duration::from_secs(secs));
    }
    if input.chars().all(|c| c.is_ascii_digit() || c == '.') {
        let secs: f64 = input
            .parse()
            .with_context(|| format!("Invalid duration value '{input}'"))?;
        return Duration::try_from_secs_f64(secs)
            .with_context(|| format!("Duration '{input}' is out of range"));
    }

    let mut total = Duration::ZERO;
    let mut rest = input;

    while !rest.is_empty() {
        let value_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .with_context(|| format!("Duration '{input}' must end with a unit"))?;
        if value_end == 0 {
            bail!("Duration '{input}' has a unit without a value");
        }

        let (value_str, tail) = rest.split_at(value_end);
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);

        let unit_nanos = match unit {
            "ns" => 1,
            "us" | "µs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SECOND,
            "m" => 60 * NANOS_PER_SECOND,
            "h" => 3_600 * NANOS_PER_SECOND,
            "d" => 86_400 * NANOS_PER_SECOND,
            "w" => 604_800 * NANOS_PER_SECOND,
            _ => bail!(
                "Unsupported duration unit '{unit}' in '{input}'. Use ns, us, ms, s, m, h, d or w"
            ),
        };

        let component = if value_str.contains('.') {
            let value: f64 = value_str
                .parse()
                .with_context(|| format!("Invalid duration value '{value_str}'"))?;
            #[allow(clippy::cast_precision_loss)]
            let secs = value * unit_nanos as f64 / NANOS_PER_SECOND as f64;
            Duration::try_from_secs_f64(secs)
                .with_context(|| format!("Duration '{input}' is out of range"))?
        } else {
            let value: u64 = value_str
                .parse()
                .with_context(|| format!("Invalid duration value '{value_str}'"))?;
            let nanos = value
                .checked_mul(unit_nanos)
                .with_context(|| format!("Duration '{input}' is too large (overflow)"))?;
            Duration::from_nanos(nanos)
        };

        total = total
            .checked_add(component)
            .with_context(|| format!("Duration '{input}' is too large (overflow)"))?;
        rest = next;
    }

    Ok(total)
}

/// Render a duration in the form accepted by [`parse_duration`].
///
/// Whole seconds render as `"<n>s"`, anything finer as `"<n>ms"`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod duration_tests;
