//! Date helper functions

use chrono::{DateTime, Datelike, TimeZone};

/// French month names, indexed by `month0`
const FRENCH_MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Format a date in long French form (like "1 janvier 2024")
pub fn french_date<D: Datelike>(date: &D) -> String {
    format!(
        "{} {} {}",
        date.day(),
        FRENCH_MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Format a date in ISO 8601 / XML form, as sitemaps and feeds expect
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}
