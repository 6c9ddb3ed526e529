//! Display helpers for member cards and detail views
//!
//! All helpers take the reference date explicitly so callers (and renderers)
//! stay deterministic.

use chrono::{Datelike, NaiveDate};

/// Age in full years on `today`
///
/// The count drops by one until the birthday has been reached in `today`'s year.
/// Dates in the future yield 0.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    if today <= date_of_birth {
        return 0;
    }

    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }

    age.max(0) as u32
}

/// Compact date used on cards, e.g. `Mar 1, 1950`
pub fn format_short(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Long date used in the detail view, e.g. `Wednesday, March 1, 1950`
pub fn format_long(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
