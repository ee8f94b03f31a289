// src/criteria.rs
// Target criteria for one run: the calendar day and the CPV code set.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::error::{ScanError, ScanResult};

/// CPV codes scanned for when the caller supplies none.
pub const DEFAULT_CPV: [&str; 3] = ["09330000", "45261215", "45315300"];

/// PLACSP publishes in Spanish civil time; "today" is resolved there.
pub const PLACSP_TZ: Tz = chrono_tz::Europe::Madrid;

/// Immutable filter criteria, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct TargetCriteria {
    date: NaiveDate,
    iso_date: String,
    codes: BTreeSet<String>,
}

impl TargetCriteria {
    /// Resolve criteria from a caller-supplied date (ISO-8601, or today in
    /// [`PLACSP_TZ`] when omitted) and a candidate CPV list.
    ///
    /// Candidates are trimmed, non-numeric ones discarded, the rest
    /// left-zero-padded to 8 characters and de-duplicated. An empty result
    /// set is a configuration error: a run with no valid codes would match
    /// nothing meaningful.
    pub fn resolve(date: Option<&str>, candidate_codes: &[String]) -> ScanResult<Self> {
        let date = resolve_target_date(date)?;
        let codes = normalize_codes(candidate_codes);
        if codes.is_empty() {
            return Err(ScanError::Configuration(
                "no valid CPV codes (8 digits) after normalization".to_string(),
            ));
        }
        Ok(Self {
            iso_date: date.format("%Y-%m-%d").to_string(),
            date,
            codes,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The target date as `YYYY-MM-DD`, precomputed for the prefix test.
    pub fn iso_date(&self) -> &str {
        &self.iso_date
    }

    pub fn codes(&self) -> &BTreeSet<String> {
        &self.codes
    }

    /// Sorted codes joined for logs and the report meta line.
    pub fn codes_display(&self) -> String {
        self.codes.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn resolve_target_date(date: Option<&str>) -> ScanResult<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| ScanError::Configuration(format!("invalid target date {s:?}: {e}"))),
        None => Ok(chrono::Utc::now().with_timezone(&PLACSP_TZ).date_naive()),
    }
}

fn normalize_codes(candidates: &[String]) -> BTreeSet<String> {
    candidates
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()))
        .map(|c| format!("{c:0>8}"))
        .collect()
}
