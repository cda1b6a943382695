//! Billing-cycle window. The default cycle runs from the 27th of one month
//! through the 26th of the next.

use serde::Serialize;
use time::{
    error::ComponentRange,
    macros::{format_description, time},
    Date, Month, OffsetDateTime, PrimitiveDateTime, Time,
};

use crate::error::{AppError, AppResult};

const CYCLE_START_DAY: u8 = 27;
const CYCLE_END_DAY: u8 = 26;

time::serde::format_description!(ymd, Date, "[year]-[month]-[day]");

/// Inclusive date range; the end date is included through 23:59:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingWindow {
    #[serde(rename = "start_date", with = "ymd")]
    pub start: Date,
    #[serde(rename = "end_date", with = "ymd")]
    pub end: Date,
}

impl BillingWindow {
    /// Uses the explicit dates when both are given; if either is missing the
    /// whole window falls back to the cycle containing `today`.
    pub fn resolve(start: Option<&str>, end: Option<&str>, today: Date) -> AppResult<Self> {
        let start = start.map(str::trim).filter(|s| !s.is_empty());
        let end = end.map(str::trim).filter(|s| !s.is_empty());
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self {
                start: parse_date("start_date", start)?,
                end: parse_date("end_date", end)?,
            }),
            _ => Self::default_cycle(today)
                .map_err(|e| AppError::Internal(format!("billing cycle out of range: {e}"))),
        }
    }

    /// On or after the 27th: [27th this month, 26th next month].
    /// Before the 27th: [27th last month, 26th this month].
    pub fn default_cycle(today: Date) -> Result<Self, ComponentRange> {
        let (year, month) = (today.year(), today.month());
        if today.day() >= CYCLE_START_DAY {
            let (next_year, next_month) = following(year, month);
            Ok(Self {
                start: Date::from_calendar_date(year, month, CYCLE_START_DAY)?,
                end: Date::from_calendar_date(next_year, next_month, CYCLE_END_DAY)?,
            })
        } else {
            let (prev_year, prev_month) = preceding(year, month);
            Ok(Self {
                start: Date::from_calendar_date(prev_year, prev_month, CYCLE_START_DAY)?,
                end: Date::from_calendar_date(year, month, CYCLE_END_DAY)?,
            })
        }
    }

    pub fn starts_at(&self) -> OffsetDateTime {
        PrimitiveDateTime::new(self.start, Time::MIDNIGHT).assume_utc()
    }

    pub fn ends_at(&self) -> OffsetDateTime {
        PrimitiveDateTime::new(self.end, time!(23:59:59)).assume_utc()
    }

    pub fn contains(&self, at: OffsetDateTime) -> bool {
        at >= self.starts_at() && at <= self.ends_at()
    }
}

fn following(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::December => (year + 1, Month::January),
        m => (year, m.next()),
    }
}

fn preceding(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::January => (year - 1, Month::December),
        m => (year, m.previous()),
    }
}

fn parse_date(field: &str, raw: &str) -> AppResult<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation(format!("{field} must be a date in YYYY-MM-DD format")))
}
