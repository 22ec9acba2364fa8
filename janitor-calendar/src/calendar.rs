//! Business-day calendar.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Utc, Weekday};
use tracing::trace;

use crate::clock::{Clock, SystemClock};

/// Calendar capability injected into rules.
pub trait BusinessCalendar: Send + Sync + Debug {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the instant `days` business days after `from`.
    ///
    /// The result always falls on a business day and keeps the time of day of
    /// `from`. Non-business days between the two are skipped without being counted.
    /// Returns `None` when the result lies outside the representable date range.
    fn add_business_days(&self, from: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>>;

    /// Returns `true` when `at` falls on a business day.
    fn is_business_day(&self, at: DateTime<Utc>) -> bool;
}

/// Monday-to-Friday calendar with an explicit holiday list.
///
/// Days are evaluated in a fixed UTC offset so that an instant late on a Friday in
/// the operators' time zone is not mistaken for Saturday.
#[derive(Debug, Clone)]
pub struct WorkCalendar {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    holidays: BTreeSet<NaiveDate>,
}

impl WorkCalendar {
    /// Creates a UTC calendar without holidays.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            offset: FixedOffset::east_opt(0).expect("zero offset is valid"),
            holidays: BTreeSet::new(),
        }
    }

    /// Creates a calendar backed by the wall clock.
    #[must_use]
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Evaluates days in the supplied offset.
    #[must_use]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Adds holidays, which are skipped like weekends.
    #[must_use]
    pub fn with_holidays<I>(mut self, holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.holidays.extend(holidays);
        self
    }

    /// Returns the configured offset.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Returns the configured holidays.
    #[must_use]
    pub fn holidays(&self) -> &BTreeSet<NaiveDate> {
        &self.holidays
    }

    fn is_business_date(&self, date: NaiveDate) -> bool {
        is_weekday(date) && !self.holidays.contains(&date)
    }

    /// Walks `days` business days forward from `start`.
    ///
    /// Whole weeks are jumped at once: any seven consecutive days hold exactly
    /// five weekdays, minus the holidays that fall on them.
    fn business_date_after(&self, start: NaiveDate, days: u32) -> Option<NaiveDate> {
        let mut date = start;
        let mut remaining = days;
        while remaining >= 5 {
            let weeks = remaining / 5;
            let next = date.checked_add_days(Days::new(u64::from(weeks) * 7))?;
            let skipped = self
                .holidays
                .range(date..next)
                .filter(|holiday| is_weekday(**holiday))
                .count();
            // at most five weekdays per week, so this never exceeds `weeks * 5`
            let skipped = u32::try_from(skipped).unwrap_or(u32::MAX).min(weeks * 5);
            remaining -= weeks * 5 - skipped;
            date = next;
        }
        loop {
            if self.is_business_date(date) {
                if remaining == 0 {
                    return Some(date);
                }
                remaining -= 1;
            }
            date = date.succ_opt()?;
        }
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl BusinessCalendar for WorkCalendar {
    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn add_business_days(&self, from: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
        let local = from.with_timezone(&self.offset);
        let start = local.date_naive();
        let target = self.business_date_after(start, days)?;
        let until = local.checked_add_signed(target.signed_duration_since(start))?;
        trace!(%from, days, %until, "computed business day");
        Some(until.with_timezone(&Utc))
    }

    fn is_business_day(&self, at: DateTime<Utc>) -> bool {
        self.is_business_date(at.with_timezone(&self.offset).date_naive())
    }
}
