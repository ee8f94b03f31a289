// src/pipeline.rs
// Drives the scan across every feed member of one monthly archive.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::criteria::TargetCriteria;
use crate::entry::{self, TenderRecord};
use crate::xml;

/// Feed members carry the `.atom` suffix; everything else in the archive
/// (indexes, signatures) is skipped without comment.
pub fn is_feed_member(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".atom")
}

/// Scan one monthly archive: for each feed member, parse tolerantly, keep
/// the entries matching the criteria, extract their records.
///
/// Record order is archive-iteration then entry-iteration order,
/// deterministic for identical input bytes. Unreadable members are skipped
/// with a warning; only the two fatal error kinds (retrieval,
/// configuration) ever abort a run, and neither originates here.
pub fn scan_archive(zip_bytes: &[u8], criteria: &TargetCriteria) -> Vec<TenderRecord> {
    let mut archive = match ZipArchive::new(Cursor::new(zip_bytes)) {
        Ok(archive) => archive,
        Err(e) => {
            tracing::warn!(error = ?e, "archive is not readable, yielding no records");
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    for index in 0..archive.len() {
        let mut member = match archive.by_index(index) {
            Ok(member) => member,
            Err(e) => {
                tracing::warn!(error = ?e, index, "skipping unopenable archive member");
                continue;
            }
        };
        let name = member.name().to_string();
        if !is_feed_member(&name) {
            continue;
        }

        let mut bytes = Vec::new();
        if let Err(e) = member.read_to_end(&mut bytes) {
            tracing::warn!(error = ?e, member = %name, "skipping unreadable feed member");
            continue;
        }

        let document = xml::parse(&bytes);
        let before = found.len();
        for raw_entry in document.entries() {
            if entry::matches(raw_entry, criteria) {
                found.push(entry::extract(raw_entry));
            }
        }
        tracing::debug!(member = %name, matched = found.len() - before, "scanned feed member");
    }
    found
}
