use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use crate::{
    errors::Error,
    parser::{self, TimeExpression},
    Result,
};

/// Result of applying a delta to a base time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calculation {
    time: NaiveTime,
    formatted: String,
    annotation: Option<String>,
    total_delta_minutes: i64,
    rolled_days: i64,
}

impl Calculation {
    pub fn naive_time(&self) -> NaiveTime {
        self.time
    }

    /// Zero-padded `HH:MM`.
    pub fn time(&self) -> &str {
        &self.formatted
    }

    /// `(+ 1 ч 30 мин)` style delta, or `None` when the delta is zero.
    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    pub fn total_delta_minutes(&self) -> i64 {
        self.total_delta_minutes
    }

    /// Calendar days crossed (negative when going back past midnight). Never shown to users.
    pub fn rolled_days(&self) -> i64 {
        self.rolled_days
    }
}

/// Apply `expr`'s delta to its base time on `now`'s date.
pub fn compute(expr: &TimeExpression, now: NaiveDateTime) -> Result<Calculation> {
    let base = now
        .date()
        .and_hms_opt(expr.base_hour(), expr.base_minute(), 0)
        .ok_or_else(|| {
            Error::Calculation(format!(
                "invalid base time {:02}:{:02}",
                expr.base_hour(),
                expr.base_minute()
            ))
        })?;

    let total = expr
        .total_delta_minutes()
        .ok_or_else(|| Error::Calculation("delta does not fit in minutes".to_string()))?;
    let delta = TimeDelta::try_minutes(total)
        .ok_or_else(|| Error::Calculation(format!("delta of {total} minutes is too large")))?;
    let result = base
        .checked_add_signed(delta)
        .ok_or_else(|| Error::Calculation(format!("{total} minutes leaves the calendar range")))?;

    Ok(Calculation {
        time: result.time(),
        formatted: result.format("%H:%M").to_string(),
        annotation: annotation(expr, total),
        total_delta_minutes: total,
        rolled_days: result
            .date()
            .signed_duration_since(base.date())
            .num_days(),
    })
}

/// Parse then compute.
pub fn evaluate(text: &str, now: NaiveDateTime) -> Result<Calculation> {
    compute(&parser::parse(text)?, now)
}

fn annotation(expr: &TimeExpression, total: i64) -> Option<String> {
    if total == 0 {
        return None;
    }

    let mut parts = Vec::with_capacity(2);
    if expr.delta_hours() != 0 {
        parts.push(format!("{} ч", expr.delta_hours().unsigned_abs()));
    }
    if expr.delta_minutes() != 0 {
        parts.push(format!("{} мин", expr.delta_minutes().unsigned_abs()));
    }
    let sign = if total >= 0 { '+' } else { '-' };

    Some(format!("({sign} {})", parts.join(" ")))
}
