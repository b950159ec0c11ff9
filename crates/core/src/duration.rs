//! Go-style duration strings (`"10m"`, `"1h0m0s"`, `"1.5s"`, `"250ms"`).
//!
//! The configuration document was historically written by a Go service, so
//! intervals are stored the way `time.Duration` marshals them. Bare integers
//! are accepted as nanosecond counts.

use std::fmt::Write as _;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parse a Go-style duration string into a [`Duration`].
///
/// Supports the units `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`, each
/// optionally fractional, combined in any order: `"2h45m"`, `"1.5h"`, `"90s"`.
/// A lone `"0"` is zero. Returns `None` for empty, signed or unparseable input.
pub fn parse_go_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s == "0" {
        return Some(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return None;
        }
        let (number, tail) = rest.split_at(num_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let unit_nanos = match unit {
            "ns" => 1,
            "us" | "µs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            _ => return None,
        };

        total = total.checked_add(scale(number, unit_nanos)?)?;
        rest = tail;
    }

    u64::try_from(total).ok().map(Duration::from_nanos)
}

/// `number` (digits with at most one dot) times `unit_nanos`.
fn scale(number: &str, unit_nanos: u128) -> Option<u128> {
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let whole: u128 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
    let mut nanos = whole.checked_mul(unit_nanos)?;

    if !frac_part.is_empty() {
        // Digits past nanosecond resolution of an hour cannot matter.
        let digits = &frac_part[..frac_part.len().min(18)];
        let frac: u128 = digits.parse().ok()?;
        let divisor = 10u128.checked_pow(u32::try_from(digits.len()).ok()?)?;
        nanos = nanos.checked_add(frac * unit_nanos / divisor)?;
    }

    Some(nanos)
}

/// Format a [`Duration`] the way Go's `time.Duration.String` does.
///
/// `0s`, `250ms`, `1.5s`, `10m0s`, `1h0m0s`.
pub fn format_go_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{nanos}ns");
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", decimal(nanos, NANOS_PER_MICRO));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, NANOS_PER_MILLI));
    }

    let secs = d.as_secs();
    let hours = secs / 3_600;
    let minutes = (secs % 3_600) / 60;
    let sub_minute = u128::from(secs % 60) * NANOS_PER_SEC + u128::from(d.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{}s", decimal(sub_minute, NANOS_PER_SEC));
    out
}

/// `value / unit` as a decimal with trailing zeros trimmed.
fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let frac = format!("{rem:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Serde adapter for `Duration` fields stored as Go-style strings.
pub mod serde_go {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Nanos(u64),
    }

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_go_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => super::parse_go_duration(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid duration: {s:?}"))),
            Raw::Nanos(n) => Ok(Duration::from_nanos(n)),
        }
    }
}
