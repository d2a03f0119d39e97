//! Spanish date phrasing and name normalization

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const MESES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Field order of the captures in a date pattern
#[derive(Clone, Copy)]
enum DateOrder {
    YearMonthDay,
    DayMonthYear,
}

static DATE_FORMATS: LazyLock<[(Regex, DateOrder); 4]> = LazyLock::new(|| {
    let re = |pattern: &str| Regex::new(pattern).expect("date pattern is valid");
    [
        (re(r"^(\d{4})-(\d{1,2})-(\d{1,2})$"), DateOrder::YearMonthDay),
        (re(r"^(\d{4})/(\d{1,2})/(\d{1,2})$"), DateOrder::YearMonthDay),
        (re(r"^(\d{1,2})-(\d{1,2})-(\d{4})$"), DateOrder::DayMonthYear),
        (re(r"^(\d{1,2})/(\d{1,2})/(\d{4})$"), DateOrder::DayMonthYear),
    ]
});

/// Render a numeric date as `"<mes> de <año>"`.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `DD-MM-YYYY` and `DD/MM/YYYY`. Anything
/// else, including a well-shaped but impossible date such as `2025-02-30`, is
/// returned unchanged.
pub fn fecha_a_espanol(fecha: &str) -> String {
    let trimmed = fecha.trim();

    for (pattern, order) in DATE_FORMATS.iter() {
        let Some(caps) = pattern.captures(trimmed) else {
            continue;
        };
        let field = |i: usize| caps[i].parse::<u32>().ok();
        let (year, month, day) = match order {
            DateOrder::YearMonthDay => (field(1), field(2), field(3)),
            DateOrder::DayMonthYear => (field(3), field(2), field(1)),
        };
        let date = match (year, month, day) {
            (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y as i32, m, d),
            _ => None,
        };
        if let Some(date) = date {
            return format!("{} de {}", MESES[date.month0() as usize], date.year());
        }
    }

    fecha.to_string()
}

/// Filesystem- and archive-safe form of a human name.
///
/// Strips diacritics (NFD, drop combining marks) and maps space, `/` and
/// `\` to `_`. Applying it twice gives the same result as applying it once.
pub fn clean_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// Capitalize each whitespace-separated word and rejoin with single spaces.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full upper case, as printed for course names.
pub fn upper_case(text: &str) -> String {
    text.to_uppercase()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
