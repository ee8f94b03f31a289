//! PLACSP CPV Scanner — Binary Entrypoint
//! One-shot run: resolve criteria, download the monthly archive, scan its
//! feed members, write the CSV and the HTML report.

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use placsp_cpv_scanner::fetch::ArchiveSource;
use placsp_cpv_scanner::{
    pipeline, report, HttpArchiveSource, TargetCriteria, DEFAULT_CPV, PLACSP_TZ,
};

#[derive(Parser, Debug)]
#[command(
    name = "placsp-cpv-scanner",
    about = "Scans the PLACSP monthly syndication archive for tenders updated on a given day, filtered by CPV code."
)]
struct Cli {
    /// Target date (YYYY-MM-DD). Defaults to today in Europe/Madrid.
    #[arg(long)]
    date: Option<String>,

    /// CPV code to match; repeat for several. Defaults to the built-in list.
    #[arg(long = "cpv", value_name = "CODE")]
    cpv: Vec<String>,

    /// CSV output path. Defaults to placsp_<date>_cpv.csv.
    #[arg(long, value_name = "PATH")]
    csv_out: Option<PathBuf>,

    /// HTML report path. Defaults to placsp_<date>_cpv.html.
    #[arg(long, value_name = "PATH")]
    html_out: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("placsp_cpv_scanner=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let candidates: Vec<String> = if cli.cpv.is_empty() {
        DEFAULT_CPV.iter().map(|c| c.to_string()).collect()
    } else {
        cli.cpv.clone()
    };
    let criteria = TargetCriteria::resolve(cli.date.as_deref(), &candidates)?;

    info!(fecha = %criteria.iso_date(), tz = %PLACSP_TZ, "target date");
    info!(cpv = %criteria.codes_display(), "target codes");

    let source = HttpArchiveSource::for_month(criteria.date());
    info!(url = %source.origin(), "downloading monthly archive");
    let zip_bytes = source.fetch().await?;

    info!("processing .atom members");
    let mut records = pipeline::scan_archive(&zip_bytes, &criteria);
    records.sort_by(|a, b| {
        a.organo
            .cmp(&b.organo)
            .then_with(|| a.expediente.cmp(&b.expediente))
    });

    let csv_path = cli
        .csv_out
        .unwrap_or_else(|| PathBuf::from(format!("placsp_{}_cpv.csv", criteria.iso_date())));
    let html_path = cli
        .html_out
        .unwrap_or_else(|| PathBuf::from(format!("placsp_{}_cpv.html", criteria.iso_date())));

    let csv_file = File::create(&csv_path)?;
    report::write_csv(&records, csv_file)?;
    std::fs::write(&html_path, report::render_html(&records, &criteria))?;

    info!(
        count = records.len(),
        fecha = %criteria.iso_date(),
        "licitaciones found"
    );
    info!(csv = %csv_path.display(), html = %html_path.display(), "outputs written");
    Ok(())
}
