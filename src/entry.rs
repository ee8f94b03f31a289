// src/entry.rs
// Per-entry filtering and field extraction.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::criteria::TargetCriteria;
use crate::xml::Node;

/// Normalized output for one matching tender entry. Field order is the CSV
/// column order. Every field degrades to an empty string when the source
/// node is missing; absent data is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TenderRecord {
    pub expediente: String,
    pub objeto: String,
    pub organo: String,
    pub estado: String,
    pub importe: String,
    pub cpv: String,
    pub fecha_updated: String,
    pub enlace: String,
}

/// Prefix test against the entry's `updated` timestamp. Deliberately not a
/// parsed-timestamp comparison: time-of-day and timezone suffixes vary and
/// are sometimes malformed in the source.
pub fn updated_on(entry: &Node, iso_date: &str) -> bool {
    match entry.child("updated") {
        Some(updated) => !updated.text().is_empty() && updated.text().starts_with(iso_date),
        None => false,
    }
}

/// Every CPV code anywhere beneath the entry. Codes nest under
/// sub-structures of varying depth, so this walks all descendants.
pub fn classification_codes(entry: &Node) -> BTreeSet<String> {
    entry
        .descendants("ItemClassificationCode")
        .into_iter()
        .map(|n| n.text().to_string())
        .filter(|code| !code.is_empty())
        .collect()
}

/// Both predicates must hold: updated on the target day AND at least one
/// CPV code in common with the target set.
pub fn matches(entry: &Node, criteria: &TargetCriteria) -> bool {
    updated_on(entry, criteria.iso_date())
        && classification_codes(entry)
            .intersection(criteria.codes())
            .next()
            .is_some()
}

/// Extract the eight record fields from a matching entry.
///
/// Single-valued fields take the first matching node even when several
/// exist (e.g. more than one `TotalAmount`); this mirrors the upstream
/// feed contract and is an accepted limitation, not an oversight. The CPV
/// field is the exception: all codes are collected, de-duplicated, sorted
/// and semicolon-joined.
pub fn extract(entry: &Node) -> TenderRecord {
    let cpv = classification_codes(entry)
        .into_iter()
        .collect::<Vec<_>>()
        .join(";");
    TenderRecord {
        expediente: descendant_text(entry, "ContractFolderID"),
        objeto: child_text(entry, "title"),
        organo: descendant_text(entry, "ContractingPartyName"),
        estado: descendant_text(entry, "ContractFolderStatus"),
        importe: descendant_text(entry, "TotalAmount"),
        cpv,
        fecha_updated: child_text(entry, "updated"),
        enlace: entry
            .child("link")
            .and_then(|link| link.attribute("href"))
            .unwrap_or_default()
            .to_string(),
    }
}

fn child_text(entry: &Node, local_name: &str) -> String {
    entry
        .child(local_name)
        .map(|n| n.text().to_string())
        .unwrap_or_default()
}

fn descendant_text(entry: &Node, local_name: &str) -> String {
    entry
        .descendant(local_name)
        .map(|n| n.text().to_string())
        .unwrap_or_default()
}
