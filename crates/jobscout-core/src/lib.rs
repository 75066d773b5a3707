//! Core domain model and pure normalization rules for jobscout.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CRATE_NAME: &str = "jobscout-core";

/// One job posting candidate, as translated by a source adapter.
///
/// Immutable once constructed, except that the pipeline attaches
/// `fit_rationale` after a candidate is accepted and before it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub source: String,
    /// Globally unique per source; primary key of persisted state. Adapters
    /// derive it from source-native identifiers, or from a hash of the
    /// canonical link when the source has no stable id.
    pub external_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: String,
    pub description: String,
    /// The origin's reported date, or the fetch date if unavailable.
    pub posted_date: NaiveDate,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub fit_rationale: Option<String>,
}

/// Strip everything non-alphanumeric and casefold. Two listings whose title
/// and company both normalize equal are treated as the same role.
pub fn normalize_key_fragment(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized (title, company) pair used by the fuzzy duplicate check.
pub fn dedup_key(title: &str, company: &str) -> (String, String) {
    (normalize_key_fragment(title), normalize_key_fragment(company))
}

pub const WORK_HOURS_PER_YEAR: f64 = 2080.0; // 40 h x 52 wk
/// Dollar mentions at or below this are not salaries (bonuses, fees).
pub const SALARY_NOISE_FLOOR: i64 = 15_000;

#[derive(Debug, Clone, Copy)]
struct DollarFigure {
    value: f64,
    int_digits: usize,
    thousands: bool,
    start: usize,
    end: usize,
}

fn scan_dollar_figures(text: &str) -> Vec<DollarFigure> {
    let bytes = text.as_bytes();
    let mut figures = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        let start = i;
        let mut j = i + 1;
        let mut int_part = String::new();
        while j < bytes.len() {
            let c = bytes[j];
            if c.is_ascii_digit() {
                int_part.push(c as char);
                j += 1;
            } else if c == b',' && bytes.get(j + 1).is_some_and(u8::is_ascii_digit) {
                j += 1;
            } else {
                break;
            }
        }
        if int_part.is_empty() {
            i += 1;
            continue;
        }
        let mut frac_part = String::new();
        if bytes.get(j) == Some(&b'.') && bytes.get(j + 1).is_some_and(u8::is_ascii_digit) {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                frac_part.push(bytes[j] as char);
                j += 1;
            }
        }
        let mut thousands = false;
        if (bytes.get(j) == Some(&b'k') || bytes.get(j) == Some(&b'K'))
            && !bytes.get(j + 1).is_some_and(u8::is_ascii_alphanumeric)
        {
            thousands = true;
            j += 1;
        }
        let rendered = if frac_part.is_empty() {
            int_part.clone()
        } else {
            format!("{int_part}.{frac_part}")
        };
        if let Ok(value) = rendered.parse::<f64>() {
            figures.push(DollarFigure {
                value,
                int_digits: int_part.len(),
                thousands,
                start,
                end: j,
            });
        }
        i = j;
    }
    figures
}

fn annualize_hourly(rate: f64) -> i64 {
    (rate * WORK_HOURS_PER_YEAR).round() as i64
}

/// Hourly shape: `$A[-$B]/hr`, the figure (or range) immediately before the
/// `/hr` marker.
fn hourly_range(text: &str, lower: &str, figures: &[DollarFigure]) -> Option<(i64, i64)> {
    let marker = lower.find("/hr")?;
    let hi_idx = figures
        .iter()
        .position(|f| f.end <= marker && text[f.end..marker].chars().all(char::is_whitespace))?;
    let hi = &figures[hi_idx];
    let mut lo = hi;
    if hi_idx > 0 {
        let prev = &figures[hi_idx - 1];
        let gap = &text[prev.end..hi.start];
        if gap.contains('-') && gap.chars().all(|c| c.is_whitespace() || c == '-') {
            lo = prev;
        }
    }
    let a = annualize_hourly(lo.value);
    let b = annualize_hourly(hi.value);
    Some((a.min(b), a.max(b)))
}

/// Extract a normalized annual salary range from free-text compensation
/// mentions. Three mutually exclusive shapes, first match wins: an hourly
/// rate or range (`$45/hr`, annualized), thousands shorthand (`$120k`), and
/// bare 4-7 digit dollar figures above [`SALARY_NOISE_FLOOR`]. Absence is a
/// normal outcome, never an error.
pub fn normalize_salary(text: &str) -> (Option<i64>, Option<i64>) {
    let figures = scan_dollar_figures(text);
    if figures.is_empty() {
        return (None, None);
    }

    let lower = text.to_ascii_lowercase();
    if let Some((lo, hi)) = hourly_range(text, &lower, &figures) {
        return (Some(lo), Some(hi));
    }

    let shorthand: Vec<i64> = figures
        .iter()
        .filter(|f| f.thousands && (2..=3).contains(&f.int_digits))
        .map(|f| (f.value * 1000.0).round() as i64)
        .collect();
    if let (Some(&lo), Some(&hi)) = (shorthand.iter().min(), shorthand.iter().max()) {
        return (Some(lo), Some(hi));
    }

    let bare: Vec<i64> = figures
        .iter()
        .filter(|f| !f.thousands && (4..=7).contains(&f.int_digits))
        .map(|f| f.value.round() as i64)
        .filter(|v| *v > SALARY_NOISE_FLOOR)
        .collect();
    match (bare.iter().min(), bare.iter().max()) {
        (Some(&lo), Some(&hi)) => (Some(lo), Some(hi)),
        _ => (None, None),
    }
}
