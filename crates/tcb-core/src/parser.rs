//! Free-form time expression parser (`18:10 + 45 мин`, `18 10 + 45`, `18.10 - 1h 5m`).
//!
//! The recognizer is a fixed sequence of independent regex scans over the normalized text.
//! Later scans overwrite what earlier scans found; they never merge.

use std::{ops::Range, sync::OnceLock};

use regex::{Captures, Regex};

use crate::{errors::Error, Result};

/// Substrings that make a bare `+N` / `-N` count as hours.
const HOUR_MARKERS: [&str; 4] = ["час", "ч", "hour", "h"];

/// A parsed `base time + delta` expression.
///
/// The base time is always a valid wall-clock time; the delta is unbounded and
/// each component carries its own sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeExpression {
    base_hour: u32,
    base_minute: u32,
    delta_hours: i64,
    delta_minutes: i64,
}

impl TimeExpression {
    pub fn new(
        base_hour: u32,
        base_minute: u32,
        delta_hours: i64,
        delta_minutes: i64,
    ) -> Result<Self> {
        if base_hour > 23 || base_minute > 59 {
            return Err(Error::NotUnderstood);
        }
        Ok(Self {
            base_hour,
            base_minute,
            delta_hours,
            delta_minutes,
        })
    }

    pub fn base_hour(&self) -> u32 {
        self.base_hour
    }

    pub fn base_minute(&self) -> u32 {
        self.base_minute
    }

    pub fn delta_hours(&self) -> i64 {
        self.delta_hours
    }

    pub fn delta_minutes(&self) -> i64 {
        self.delta_minutes
    }

    /// `delta_hours * 60 + delta_minutes`, or `None` if that does not fit in an `i64`.
    pub fn total_delta_minutes(&self) -> Option<i64> {
        self.delta_hours
            .checked_mul(60)?
            .checked_add(self.delta_minutes)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Delta {
    hours: i64,
    minutes: i64,
}

impl Delta {
    fn is_zero(self) -> bool {
        self.hours == 0 && self.minutes == 0
    }

    fn with_sign(self, sign: &str) -> Self {
        if sign == "-" {
            Self {
                hours: -self.hours,
                minutes: -self.minutes,
            }
        } else {
            self
        }
    }
}

/// Parse `text` into a base time plus delta.
///
/// Fails with [`Error::NotUnderstood`] when no `H:M`-like pair is found, when the first
/// pair found is out of range, or when a delta number does not fit in an `i64`.
pub fn parse(text: &str) -> Result<TimeExpression> {
    let text = text.trim().to_lowercase();

    let base = base_time_re()
        .captures(&text)
        .ok_or(Error::NotUnderstood)?;
    let hour = number::<u32>(&base[1])?;
    let minute = number::<u32>(&base[2])?;
    if hour > 23 || minute > 59 {
        return Err(Error::NotUnderstood);
    }

    let base_span = base.get(0).map(|m| m.range()).unwrap_or(0..0);

    let mut delta = unit_delta(&text)?;
    if delta.is_zero() {
        if let Some(signed) = signed_number_delta(&text, &base_span)? {
            delta = signed;
        }
    }
    if let Some(signed) = signed_tail_delta(&text, &base_span)? {
        delta = signed;
    }

    TimeExpression::new(hour, minute, delta.hours, delta.minutes)
}

/// `<digits> <hour unit>` and `<digits> <minute unit>`, searched independently.
fn unit_delta(hay: &str) -> Result<Delta> {
    let hours = match hour_unit_re().captures(hay) {
        Some(c) => number::<i64>(&c[1])?,
        None => 0,
    };
    let minutes = match minute_unit_re().captures(hay) {
        Some(c) => number::<i64>(&c[1])?,
        None => 0,
    };
    Ok(Delta { hours, minutes })
}

/// Bare `+N` / `-N`: hours if the text mentions an hour unit anywhere, minutes otherwise.
///
/// The hour test is a plain substring check, so any stray `h` or `ч` in the text turns
/// the number into hours.
fn signed_number_delta(text: &str, base_span: &Range<usize>) -> Result<Option<Delta>> {
    let Some(c) = find_signed(signed_number_re(), text, base_span) else {
        return Ok(None);
    };
    let value = number::<i64>(&c[2])?;
    let delta = if HOUR_MARKERS.iter().any(|m| text.contains(m)) {
        Delta {
            hours: value,
            minutes: 0,
        }
    } else {
        Delta {
            hours: 0,
            minutes: value,
        }
    };
    Ok(Some(delta.with_sign(&c[1])))
}

/// `+ <rest>` / `- <rest>`: re-derive the whole delta from the rest of the line.
fn signed_tail_delta(text: &str, base_span: &Range<usize>) -> Result<Option<Delta>> {
    let Some(c) = find_signed(signed_tail_re(), text, base_span) else {
        return Ok(None);
    };
    let rest = &c[2];

    let mut delta = unit_delta(rest)?;
    if delta.is_zero() {
        let runs: Vec<&str> = digits_re().find_iter(rest).map(|m| m.as_str()).collect();
        delta = match runs.as_slice() {
            [h, m] => Delta {
                hours: number(h)?,
                minutes: number(m)?,
            },
            [m] => Delta {
                hours: 0,
                minutes: number(m)?,
            },
            _ => Delta::default(),
        };
    }
    Ok(Some(delta.with_sign(&c[1])))
}

/// Leftmost match of a `([+-])...` pattern whose sign is not inside the base time, so a
/// `-` delimiter (`18-10`) never reads as a subtraction. Signs before or after the base
/// time both count, and the match runs on to the end of the line.
fn find_signed<'t>(
    re: &Regex,
    text: &'t str,
    base_span: &Range<usize>,
) -> Option<Captures<'t>> {
    let mut start = 0;
    while start <= text.len() {
        let c = re.captures_at(text, start)?;
        let sign = c.get(1)?.start();
        if !base_span.contains(&sign) {
            return Some(c);
        }
        // Signs are ASCII, so the next byte is a char boundary.
        start = sign + 1;
    }
    None
}

fn number<T: std::str::FromStr>(digits: &str) -> Result<T> {
    digits.parse::<T>().map_err(|_| Error::NotUnderstood)
}

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

// `[0-9]` rather than `\d`: Unicode digits would match but then fail `str::parse`.
fn base_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"([0-9]{1,2})[:\-.\s]([0-9]{1,2})")
}

fn hour_unit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"([0-9]+)\s*(?:час|ч|hour|h|hours)")
}

fn minute_unit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"([0-9]+)\s*(?:мин|м|min|m|minutes)")
}

fn signed_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"([+-])\s*([0-9]+)")
}

fn signed_tail_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"([+-])\s*(.+)")
}

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"[0-9]+")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> (u32, u32, i64, i64) {
        let e = parse(text).unwrap();
        (
            e.base_hour(),
            e.base_minute(),
            e.delta_hours(),
            e.delta_minutes(),
        )
    }

    #[test]
    fn bare_time_has_no_delta() {
        for h in 0..24 {
            for m in 0..60 {
                let text = format!("{h:02}:{m:02}");
                assert_eq!(parsed(&text), (h, m, 0, 0), "{text}");
            }
        }
    }

    #[test]
    fn minutes_with_russian_unit() {
        assert_eq!(parsed("18:10 + 45 мин"), (18, 10, 0, 45));
    }

    #[test]
    fn dash_delimiter_is_not_a_minus() {
        assert_eq!(parsed("18-10 + 1час 30 минут"), (18, 10, 1, 30));
        assert_eq!(parsed("18-10 + 30м"), (18, 10, 0, 30));
    }

    #[test]
    fn subtraction_with_dot_delimiter() {
        assert_eq!(parsed("18.10 - 30 мин"), (18, 10, 0, -30));
    }

    #[test]
    fn bare_number_after_sign_is_minutes() {
        assert_eq!(parsed("18 10 + 45"), (18, 10, 0, 45));
    }

    #[test]
    fn operator_before_the_time_keeps_its_sign() {
        assert_eq!(parsed("-1ч 18:10"), (18, 10, -1, 0));
        assert_eq!(parsed("- 30 мин 18:10"), (18, 10, 0, -30));
        // The remainder after a leading sign runs over the base time too.
        assert_eq!(parsed("+ 18:10"), (18, 10, 18, 10));
    }

    #[test]
    fn dash_delimiter_skipped_but_later_minus_counts() {
        assert_eq!(parsed("18-10 - 15"), (18, 10, 0, -15));
        assert_eq!(parsed("18-10"), (18, 10, 0, 0));
    }

    #[test]
    fn two_bare_numbers_are_hours_then_minutes() {
        assert_eq!(parsed("18:10 + 1 20"), (18, 10, 1, 20));
        assert_eq!(parsed("18:10 - 2 5"), (18, 10, -2, -5));
    }

    #[test]
    fn three_bare_numbers_mean_no_delta() {
        assert_eq!(parsed("18:10 + 1 2 3"), (18, 10, 0, 0));
    }

    #[test]
    fn english_units_and_case() {
        assert_eq!(parsed("  09:00 + 2 HOURS  "), (9, 0, 2, 0));
        assert_eq!(parsed("09:00 + 1h 15m"), (9, 0, 1, 15));
        assert_eq!(parsed("09:00 - 1h15min"), (9, 0, -1, -15));
    }

    #[test]
    fn signed_scan_overwrites_units_found_elsewhere() {
        // `2ч` sits before the sign, so only the bare 15 after `+` survives.
        assert_eq!(parsed("18:10 2ч + 15"), (18, 10, 0, 15));
    }

    #[test]
    fn units_without_sign_are_added() {
        assert_eq!(parsed("18:10 45 мин"), (18, 10, 0, 45));
        assert_eq!(parsed("7:05 2 ч"), (7, 5, 2, 0));
    }

    #[test]
    fn stray_letter_after_sign_reads_as_hour_unit() {
        // "5 через" contains `5 ч`, which the hour pattern accepts.
        assert_eq!(parsed("18:10 + 5 через"), (18, 10, 5, 0));
    }

    #[test]
    fn bare_signed_number_uses_hour_marker_anywhere() {
        let d = signed_number_delta("18:10 -5 hi", &(0..5)).unwrap().unwrap();
        assert_eq!(d, Delta { hours: -5, minutes: 0 });

        let d = signed_number_delta("18:10 -5", &(0..5)).unwrap().unwrap();
        assert_eq!(d, Delta { hours: 0, minutes: -5 });

        assert_eq!(signed_number_delta("18:10", &(0..5)).unwrap(), None);
        assert_eq!(signed_number_delta("18-10", &(0..5)).unwrap(), None);

        let d = signed_number_delta("+7 18:10", &(3..8)).unwrap().unwrap();
        assert_eq!(d, Delta { hours: 0, minutes: 7 });
    }

    #[test]
    fn first_pair_wins_even_if_out_of_range() {
        assert!(matches!(parse("25:99"), Err(Error::NotUnderstood)));
        assert!(matches!(parse("24:00 or 10:00"), Err(Error::NotUnderstood)));
        assert!(matches!(parse("10:60"), Err(Error::NotUnderstood)));
    }

    #[test]
    fn no_pair_is_not_understood() {
        assert!(matches!(parse("hello world"), Err(Error::NotUnderstood)));
        assert!(matches!(parse(""), Err(Error::NotUnderstood)));
        assert!(matches!(parse("1800 + 5"), Err(Error::NotUnderstood)));
    }

    #[test]
    fn only_ascii_digits_count() {
        assert!(matches!(parse("١٨:١٠ + 5"), Err(Error::NotUnderstood)));
    }

    #[test]
    fn leftmost_pair_inside_longer_digit_runs() {
        assert_eq!(parsed("123:45"), (23, 45, 0, 0));
    }

    #[test]
    fn huge_delta_is_not_understood() {
        assert!(matches!(
            parse("10:00 + 99999999999999999999999 мин"),
            Err(Error::NotUnderstood)
        ));
    }

    #[test]
    fn total_delta_minutes_checks_overflow() {
        let e = TimeExpression::new(1, 2, 1, -30).unwrap();
        assert_eq!(e.total_delta_minutes(), Some(30));
        let e = TimeExpression::new(1, 2, i64::MAX, 0).unwrap();
        assert_eq!(e.total_delta_minutes(), None);
        assert!(TimeExpression::new(24, 0, 0, 0).is_err());
    }
}
