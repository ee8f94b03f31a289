// tests/scan_pipeline.rs
// End-to-end scan scenarios over in-memory fixture archives.

use std::io::{Cursor, Write};

use async_trait::async_trait;
use placsp_cpv_scanner::{
    scan_archive, ArchiveSource, ScanError, ScanResult, TargetCriteria,
};
use zip::write::SimpleFileOptions;

fn build_archive(members: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in members {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn criteria(date: &str, codes: &[&str]) -> ScanResult<TargetCriteria> {
    let codes: Vec<String> = codes.iter().map(|s| s.to_string()).collect();
    TargetCriteria::resolve(Some(date), &codes)
}

const FEED_ONE_ENTRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title>Sustitución de cubierta</title>
    <link href="https://example.test/licitacion/1"/>
    <updated>2024-03-05T10:00:00+01:00</updated>
    <cac-place-ext:ContractFolder xmlns:cac-place-ext="urn:p" xmlns:cbc="urn:c">
      <cbc:ContractFolderID>EXP 2024/1</cbc:ContractFolderID>
      <cbc:ContractingPartyName>Ayto. de Soria</cbc:ContractingPartyName>
      <cbc:ItemClassificationCode>45261215</cbc:ItemClassificationCode>
    </cac-place-ext:ContractFolder>
  </entry>
</feed>"#;

#[test]
fn scenario_matching_date_and_code_yields_one_record() {
    let archive = build_archive(&[("licitaciones_1.atom", FEED_ONE_ENTRY)]);
    let criteria = criteria("2024-03-05", &["45261215"]).unwrap();

    let records = scan_archive(&archive, &criteria);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cpv, "45261215");
    assert_eq!(records[0].expediente, "EXP 2024/1");
    assert_eq!(records[0].enlace, "https://example.test/licitacion/1");
}

#[test]
fn scenario_wrong_date_yields_no_records() {
    let archive = build_archive(&[("licitaciones_1.atom", FEED_ONE_ENTRY)]);
    let criteria = criteria("2024-03-06", &["45261215"]).unwrap();
    assert!(scan_archive(&archive, &criteria).is_empty());
}

#[test]
fn scenario_no_normalizable_codes_is_a_configuration_error() {
    // "123" zero-pads to a valid code; only "abc" is dropped.
    let ok = criteria("2024-03-05", &["abc", "123"]).unwrap();
    assert!(ok.codes().contains("00000123"));

    // With every candidate invalid, resolution fails before any I/O.
    let err = criteria("2024-03-05", &["abc", "x1", ""]).unwrap_err();
    assert!(matches!(err, ScanError::Configuration(_)));
}

#[test]
fn non_feed_members_are_skipped() {
    let archive = build_archive(&[
        ("README.txt", "not a feed"),
        ("index.xml", "<root/>"),
        ("licitaciones_1.atom", FEED_ONE_ENTRY),
    ]);
    let criteria = criteria("2024-03-05", &["45261215"]).unwrap();
    assert_eq!(scan_archive(&archive, &criteria).len(), 1);
}

#[test]
fn malformed_member_still_yields_recoverable_entries() {
    let truncated = r#"<feed>
      <entry>
        <updated>2024-03-05T08:00:00Z</updated>
        <cbc:ItemClassificationCode>45261215</cbc:ItemClassificationCode>
      </entry>
      <entry><updated>2024-03-05T09:<<<broken"#;
    let archive = build_archive(&[("roto.atom", truncated)]);
    let criteria = criteria("2024-03-05", &["45261215"]).unwrap();

    let records = scan_archive(&archive, &criteria);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cpv, "45261215");
}

#[test]
fn records_keep_archive_then_entry_order() {
    let feed = |exp: &str| {
        format!(
            r#"<feed><entry>
                 <updated>2024-03-05T08:00:00Z</updated>
                 <cbc:ContractFolderID>{exp}</cbc:ContractFolderID>
                 <cbc:ItemClassificationCode>45261215</cbc:ItemClassificationCode>
               </entry></feed>"#
        )
    };
    let (a, b) = (feed("B-SECOND"), feed("A-FIRST"));
    let archive = build_archive(&[("1.atom", &a), ("2.atom", &b)]);
    let criteria = criteria("2024-03-05", &["45261215"]).unwrap();

    let records = scan_archive(&archive, &criteria);
    let ids: Vec<&str> = records.iter().map(|r| r.expediente.as_str()).collect();
    assert_eq!(ids, vec!["B-SECOND", "A-FIRST"]);
}

struct FixtureSource(Vec<u8>);

#[async_trait]
impl ArchiveSource for FixtureSource {
    async fn fetch(&self) -> ScanResult<Vec<u8>> {
        Ok(self.0.clone())
    }

    fn origin(&self) -> &str {
        "fixture"
    }
}

#[tokio::test]
async fn scan_runs_through_the_source_seam() {
    let source = FixtureSource(build_archive(&[("licitaciones_1.atom", FEED_ONE_ENTRY)]));
    let criteria = criteria("2024-03-05", &["45261215"]).unwrap();

    let bytes = source.fetch().await.unwrap();
    let records = scan_archive(&bytes, &criteria);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].organo, "Ayto. de Soria");
}
