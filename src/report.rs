// src/report.rs
// Output rendering: CSV rows and the self-contained HTML report.

use std::io::Write;

use crate::criteria::TargetCriteria;
use crate::entry::TenderRecord;

pub const CSV_COLUMNS: [&str; 8] = [
    "expediente",
    "objeto",
    "organo",
    "estado",
    "importe",
    "cpv",
    "fecha_updated",
    "enlace",
];

const REPORT_TITLE: &str = "Licitaciones PLACSP por CPV";

/// Write the fixed 8-column header plus one row per record. Quoting for
/// embedded commas/newlines is the csv writer's concern.
pub fn write_csv<W: Write>(records: &[TenderRecord], out: W) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Render the report: title with count badge, meta line with date and
/// target CPVs, one table row per record (placeholder row when none). All
/// text is escaped; the link lands in an href opened without opener or
/// referrer leakage.
pub fn render_html(records: &[TenderRecord], criteria: &TargetCriteria) -> String {
    let mut rows = String::new();
    if records.is_empty() {
        rows.push_str(
            r#"<tr><td colspan="8" style="text-align:center;padding:16px;color:#666;">
        No se han encontrado licitaciones para los CPV objetivo en la fecha indicada.</td></tr>"#,
        );
    } else {
        for record in records {
            rows.push_str(&format!(
                r#"
            <tr>
              <td>{organo}</td>
              <td>{expediente}</td>
              <td>{estado}</td>
              <td style="text-align:right">{importe}</td>
              <td>{cpv}</td>
              <td>{updated}</td>
              <td><a href="{enlace}" target="_blank" rel="noopener noreferrer">Ver</a></td>
              <td>{objeto}</td>
            </tr>"#,
                organo = esc(&record.organo),
                expediente = esc(&record.expediente),
                estado = esc(&record.estado),
                importe = esc(&record.importe),
                cpv = esc(&record.cpv),
                updated = esc(&record.fecha_updated),
                enlace = esc_attr(&record.enlace),
                objeto = esc(&record.objeto),
            ));
        }
    }

    format!(
        r#"<!doctype html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>{title} — {date}</title>
<meta name="viewport" content="width=device-width,initial-scale=1">
<style>
  body{{font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Cantarell,"Noto Sans",Arial,sans-serif;line-height:1.35;margin:0;background:#f7f7f8;color:#111;}}
  .wrap{{max-width:960px;margin:0 auto;padding:24px;}}
  h1{{margin:0 0 8px 0;font-size:20px}}
  .meta{{color:#555;margin:0 0 16px 0;font-size:14px}}
  table{{border-collapse:collapse;width:100%;background:#fff;border:1px solid #e5e7eb}}
  th,td{{border-bottom:1px solid #eee;padding:8px;vertical-align:top;font-size:14px}}
  th{{text-align:left;background:#fafafa}}
  .footer{{margin-top:16px;color:#666;font-size:12px}}
  .badge{{display:inline-block;background:#111;color:#fff;border-radius:999px;padding:2px 8px;font-size:12px}}
</style>
</head>
<body>
  <div class="wrap">
    <h1>{title} <span class="badge">{count}</span></h1>
    <p class="meta"><strong>Fecha:</strong> {date} (Europe/Madrid) ·
    <strong>CPV:</strong> {cpvs}</p>
    <table>
      <thead>
        <tr>
          <th>Órgano</th>
          <th>Expediente</th>
          <th>Estado</th>
          <th>Importe</th>
          <th>CPV</th>
          <th>Updated</th>
          <th>Enlace</th>
          <th>Objeto</th>
        </tr>
      </thead>
      <tbody>{rows}
      </tbody>
    </table>
    <p class="footer">Fuente: Sindicación 643 (PLACSP). Este mensaje se generó automáticamente.</p>
  </div>
</body>
</html>"#,
        title = esc(REPORT_TITLE),
        date = esc(criteria.iso_date()),
        count = records.len(),
        cpvs = esc(&criteria.codes_display()),
        rows = rows,
    )
}

fn esc(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

fn esc_attr(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s).into_owned()
}
