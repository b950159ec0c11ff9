//! New/full moon proximity from two observed new-moon references.
//!
//! The synodic month is not hard-coded: it is derived by dividing the span
//! between two observed new moons by the number of whole cycles between them.
//! Everything here is a pure function of the instant passed in.

use chrono::{DateTime, FixedOffset, Offset, TimeDelta, TimeZone, Utc};

use crate::error::PhaseError;

/// How close to a phase extremum an instant must be to be reported.
pub const PROXIMITY_WINDOW: TimeDelta = TimeDelta::hours(24);

/// Offset messages are rendered in (UTC+5:30).
pub const DISPLAY_OFFSET_SECS: i32 = 330 * 60;

const TIME_FORMAT: &str = "%H:%M %A, %B %-d";
const DATE_FORMAT: &str = "%A, %B %-d";

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// The fixed offset messages are rendered in.
pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Proximity of an instant to the nearest new or full moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoonPhase {
    /// A new moon happened less than a day ago.
    JustWasNew { at: DateTime<Utc> },
    /// A new moon is less than a day away.
    ApproachingNew {
        at: DateTime<Utc>,
        next_full: DateTime<Utc>,
    },
    /// A full moon happened less than a day ago.
    JustWasFull { at: DateTime<Utc> },
    /// A full moon is less than a day away.
    ApproachingFull {
        at: DateTime<Utc>,
        next_new: DateTime<Utc>,
    },
    /// Nothing worth reporting.
    None,
}

impl MoonPhase {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MoonPhase::JustWasNew { .. } => "just_was_new",
            MoonPhase::ApproachingNew { .. } => "approaching_new",
            MoonPhase::JustWasFull { .. } => "just_was_full",
            MoonPhase::ApproachingFull { .. } => "approaching_full",
            MoonPhase::None => "none",
        }
    }

    /// Human-readable message, or `None` when there is nothing to report.
    pub fn message(&self) -> Option<String> {
        let offset = display_offset();
        let time = |t: &DateTime<Utc>| t.with_timezone(&offset).format(TIME_FORMAT).to_string();
        let date = |t: &DateTime<Utc>| t.with_timezone(&offset).format(DATE_FORMAT).to_string();

        match self {
            MoonPhase::JustWasNew { at } => Some(format!("New Moon was at {}.", time(at))),
            MoonPhase::ApproachingNew { at, next_full } => Some(format!(
                "New Moon at {}; next Full Moon on {}.",
                time(at),
                date(next_full)
            )),
            MoonPhase::JustWasFull { at } => Some(format!("Full Moon was at {}.", time(at))),
            MoonPhase::ApproachingFull { at, next_new } => Some(format!(
                "Full Moon at {}; next New Moon on {}.",
                time(at),
                date(next_new)
            )),
            MoonPhase::None => None,
        }
    }
}

/// Classifies instants against a self-calibrated synodic cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseCalculator {
    reference: DateTime<Utc>,
    cycle: TimeDelta,
}

impl PhaseCalculator {
    /// Build a calculator from two observed new moons `cycles` synodic
    /// months apart. The later observation becomes the phase origin.
    pub fn new(
        first: DateTime<Utc>,
        second: DateTime<Utc>,
        cycles: u32,
    ) -> Result<Self, PhaseError> {
        if second <= first {
            return Err(PhaseError::ReferencesOutOfOrder);
        }
        if cycles == 0 {
            return Err(PhaseError::ZeroCycles);
        }
        let span = (second - first)
            .num_nanoseconds()
            .ok_or(PhaseError::CycleOutOfRange)?;
        let cycle = span / i64::from(cycles);
        if cycle <= 0 {
            return Err(PhaseError::CycleOutOfRange);
        }

        Ok(Self {
            reference: second,
            cycle: TimeDelta::nanoseconds(cycle),
        })
    }

    /// Length of one synodic month.
    pub fn cycle(&self) -> TimeDelta {
        self.cycle
    }

    /// Half a synodic month: new moon to full moon.
    pub fn half_cycle(&self) -> TimeDelta {
        self.cycle / 2
    }

    /// The new moon all offsets are measured from.
    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    /// Time elapsed since the most recent new moon, in `[0, cycle)`.
    pub fn since_new(&self, now: DateTime<Utc>) -> TimeDelta {
        let elapsed = now - self.reference;
        let elapsed =
            i128::from(elapsed.num_seconds()) * NANOS_PER_SEC + i128::from(elapsed.subsec_nanos());
        let cycle = i128::from(self.cycle.num_nanoseconds().unwrap_or(i64::MAX));
        // The remainder is below the cycle, which itself fits in i64.
        let since = i64::try_from(elapsed.rem_euclid(cycle)).unwrap_or(0);
        TimeDelta::nanoseconds(since)
    }

    /// Classify `now`. The windows are checked in a fixed order so an
    /// instant near a cycle boundary only ever matches the first of them.
    pub fn classify(&self, now: DateTime<Utc>) -> MoonPhase {
        let since_new = self.since_new(now);
        let half = self.half_cycle();

        if since_new < PROXIMITY_WINDOW {
            return MoonPhase::JustWasNew {
                at: now - since_new,
            };
        }

        let till_new = self.cycle - since_new;
        if till_new < PROXIMITY_WINDOW {
            let at = now + till_new;
            return MoonPhase::ApproachingNew {
                at,
                next_full: at + half,
            };
        }

        // Not wrapped: compared against the window only.
        let since_full = since_new + half;
        if since_full < PROXIMITY_WINDOW {
            return MoonPhase::JustWasFull {
                at: now - since_full,
            };
        }

        let till_full = half - since_new;
        if till_full >= TimeDelta::zero() && till_full < PROXIMITY_WINDOW {
            let at = now + till_full;
            return MoonPhase::ApproachingFull {
                at,
                next_new: at + half,
            };
        }

        MoonPhase::None
    }

    /// Shorthand for `classify(now).message()`.
    pub fn message(&self, now: DateTime<Utc>) -> Option<String> {
        self.classify(now).message()
    }
}

impl Default for PhaseCalculator {
    /// New moons of 2020-12-14 16:16 UTC and 2025-06-25 10:31 UTC, 56 cycles apart.
    fn default() -> Self {
        let first = Utc.with_ymd_and_hms(2020, 12, 14, 16, 16, 0).single();
        let second = Utc.with_ymd_and_hms(2025, 6, 25, 10, 31, 0).single();
        match (first, second) {
            (Some(first), Some(second)) => Self {
                reference: second,
                cycle: (second - first) / 56,
            },
            // Both literals are valid UTC instants.
            _ => Self {
                reference: DateTime::<Utc>::UNIX_EPOCH,
                cycle: TimeDelta::seconds(2_551_443),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn calc() -> PhaseCalculator {
        PhaseCalculator::default()
    }

    #[test]
    fn default_matches_explicit_references() {
        let explicit =
            PhaseCalculator::new(utc(2020, 12, 14, 16, 16), utc(2025, 6, 25, 10, 31), 56).unwrap();
        assert_eq!(explicit, calc());
        assert_eq!(calc().cycle(), TimeDelta::nanoseconds(2_551_516_071_428_571));
    }

    #[test]
    fn cycle_is_a_synodic_month() {
        let days = calc().cycle().num_seconds() as f64 / 86_400.0;
        assert!((29.5..29.6).contains(&days), "cycle was {days} days");
    }

    #[test]
    fn rejects_bad_references() {
        let a = utc(2020, 12, 14, 16, 16);
        let b = utc(2025, 6, 25, 10, 31);
        assert_eq!(PhaseCalculator::new(b, a, 56), Err(PhaseError::ReferencesOutOfOrder));
        assert_eq!(PhaseCalculator::new(a, a, 56), Err(PhaseError::ReferencesOutOfOrder));
        assert_eq!(PhaseCalculator::new(a, b, 0), Err(PhaseError::ZeroCycles));
    }

    #[test]
    fn reference_instant_is_just_new() {
        let now = calc().reference();
        assert_eq!(calc().since_new(now), TimeDelta::zero());
        assert_eq!(calc().classify(now), MoonPhase::JustWasNew { at: now });
        assert_eq!(
            calc().message(now).as_deref(),
            Some("New Moon was at 16:01 Wednesday, June 25.")
        );
    }

    #[test]
    fn since_new_wraps_before_reference() {
        let now = calc().reference() - TimeDelta::hours(1);
        assert_eq!(calc().since_new(now), calc().cycle() - TimeDelta::hours(1));
    }

    #[test]
    fn since_new_stays_in_range() {
        let c = calc();
        for days in (-4_000..4_000).step_by(37) {
            let since = c.since_new(c.reference() + TimeDelta::days(days));
            assert!(since >= TimeDelta::zero() && since < c.cycle());
        }
    }

    #[test]
    fn first_reference_lands_at_cycle_boundary() {
        // The span is 56 cycles plus a few nanoseconds of integer remainder.
        let first = utc(2020, 12, 14, 16, 16);
        assert!(matches!(
            calc().classify(first),
            MoonPhase::ApproachingNew { at, .. } if (at - first) < TimeDelta::microseconds(1)
        ));
    }

    #[test]
    fn approaching_new_reports_following_full() {
        let c = calc();
        let new_moon = c.reference() + c.cycle();
        let now = new_moon - TimeDelta::hours(2);
        assert_eq!(
            c.classify(now),
            MoonPhase::ApproachingNew {
                at: new_moon,
                next_full: new_moon + c.half_cycle(),
            }
        );
        assert_eq!(
            c.message(now).as_deref(),
            Some("New Moon at 04:46 Friday, July 25; next Full Moon on Friday, August 8.")
        );
    }

    #[test]
    fn approaching_full_reports_following_new() {
        let c = calc();
        let full_moon = c.reference() + c.half_cycle();
        let now = full_moon - TimeDelta::hours(2);
        assert_eq!(
            c.classify(now),
            MoonPhase::ApproachingFull {
                at: full_moon,
                next_new: full_moon + c.half_cycle(),
            }
        );
        assert_eq!(
            c.message(now).as_deref(),
            Some("Full Moon at 10:23 Thursday, July 10; next New Moon on Friday, July 25.")
        );
    }

    #[test]
    fn mid_cycle_is_quiet() {
        let c = calc();
        let now = c.reference() + TimeDelta::days(7);
        assert_eq!(c.classify(now), MoonPhase::None);
        assert_eq!(c.message(now), None);
    }

    #[test]
    fn after_full_moon_is_quiet() {
        // sinceFull is never wrapped, so the day after a full moon stays quiet.
        let c = calc();
        let now = c.reference() + c.half_cycle() + TimeDelta::hours(1);
        assert_eq!(c.classify(now), MoonPhase::None);
    }

    #[test]
    fn window_edges() {
        let c = calc();
        let r = c.reference();
        assert!(matches!(c.classify(r + TimeDelta::hours(24) - TimeDelta::nanoseconds(1)), MoonPhase::JustWasNew { .. }));
        assert_eq!(c.classify(r + TimeDelta::hours(24)), MoonPhase::None);

        let full = r + c.half_cycle();
        assert!(matches!(c.classify(full), MoonPhase::ApproachingFull { at, .. } if at == full));
        assert_eq!(c.classify(full - TimeDelta::hours(24)), MoonPhase::None);
    }

    #[test]
    fn dense_sample_over_one_cycle() {
        let c = calc();
        let start = c.reference();
        let step = TimeDelta::minutes(10);
        let mut now = start;
        let mut seen = std::collections::HashMap::new();

        while now < start + c.cycle() {
            let since_new = c.since_new(now);
            let phase = c.classify(now);
            *seen.entry(phase.kind()).or_insert(0u32) += 1;

            match phase {
                MoonPhase::JustWasNew { at } => {
                    assert!(since_new < PROXIMITY_WINDOW);
                    assert!(now - at < PROXIMITY_WINDOW);
                }
                MoonPhase::ApproachingNew { at, next_full } => {
                    assert!(since_new >= PROXIMITY_WINDOW);
                    assert!(at > now && at - now < PROXIMITY_WINDOW);
                    assert_eq!(next_full - at, c.half_cycle());
                }
                MoonPhase::JustWasFull { .. } => panic!("unreachable window fired at {now}"),
                MoonPhase::ApproachingFull { at, next_new } => {
                    assert!(at >= now && at - now < PROXIMITY_WINDOW);
                    assert_eq!(next_new - at, c.half_cycle());
                }
                MoonPhase::None => assert!(phase.message().is_none()),
            }
            assert_eq!(phase.message().is_some(), phase != MoonPhase::None);
            now += step;
        }

        // 24h of each reported window at 10 minute steps.
        assert_eq!(seen.get("just_was_new"), Some(&144));
        assert!(seen.get("approaching_new").is_some_and(|n| (143..=145).contains(n)));
        assert!(seen.get("approaching_full").is_some_and(|n| (143..=145).contains(n)));
        assert!(seen.get("none").is_some_and(|n| *n > 3_000));
    }
}
