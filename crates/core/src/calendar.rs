//! Plain-text calendar of upcoming new and full moons.

use std::fmt::Write as _;

use chrono::{DateTime, Datelike, TimeDelta, Utc};

use crate::phase::{display_offset, PhaseCalculator};

const NEW_MOON: char = '○';
const FULL_MOON: char = '●';

/// Render new and full moons from the most recent new moon before `now`
/// until `weeks` weeks later, grouped under year and month headings.
///
/// ```text
/// Year 2025
///
/// Jun Wed/25:○
/// Jul Thu/10:● Fri/25:○
/// ```
pub fn lunar_calendar(calc: &PhaseCalculator, now: DateTime<Utc>, weeks: u32) -> String {
    let offset = display_offset();
    let last_new = now - calc.since_new(now);
    let end = last_new + TimeDelta::weeks(i64::from(weeks));

    let mut out = String::new();
    let mut year = None;
    let mut month = None;
    let mut moon = last_new;
    let mut full = false;

    while moon < end {
        let local = moon.with_timezone(&offset);

        if year != Some(local.year()) {
            year = Some(local.year());
            month = None;
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            let _ = writeln!(out, "Year {}", local.year());
        }
        if month != Some(local.month()) {
            month = Some(local.month());
            let _ = write!(out, "\n{}", local.format("%b"));
        }

        let symbol = if full { FULL_MOON } else { NEW_MOON };
        let _ = write!(out, " {}:{symbol}", local.format("%a/%-d"));

        moon += calc.half_cycle();
        full = !full;
    }

    out
}
