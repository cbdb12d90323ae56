use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use surf_report::config::AppConfig;
use surf_report::loader::{load_snapshot, snapshot_date};
use surf_report::models::SlotFilter;
use surf_report::pipeline::{Pipeline, PipelineOutput};
use surf_report::scraper::SurfReportScraper;
use surf_report::storage::{ReportExport, resolve_output_path, write_report_json};
use surf_report::utils::{self, fmt_metres, fmt_speed};

#[derive(Parser)]
#[command(name = "surf-report", about = "Surf forecast scraper and quality report", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape the forecast page, save the CSV snapshot and print the report
    Scrape {
        /// Forecast page URL (default: scraper.url from config)
        #[arg(short, long, env = "SURF_URL")]
        url: Option<String>,

        /// CSV output file or directory (default: ./data_surf.csv)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write slots + report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Headline only slots with a northerly wind
        #[arg(long)]
        north_only: bool,

        /// Date treated as "today" for day labels (default: fetch date)
        #[arg(long)]
        reference_date: Option<NaiveDate>,
    },

    /// Recompute the report from a saved CSV snapshot
    Report {
        /// Snapshot written by `scrape`
        #[arg(short, long)]
        csv: PathBuf,

        #[arg(long)]
        json: Option<PathBuf>,

        #[arg(long)]
        north_only: bool,

        /// Date treated as "today" for day labels (default: the snapshot's write date)
        #[arg(long)]
        reference_date: Option<NaiveDate>,
    },

    /// Validate and print the active scoring rules
    CheckRules,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "surf_report=info,warn",
        1 => "surf_report=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Scrape { url, out, json, north_only, reference_date } => {
            let _t = utils::Timer::start("Forecast scrape");
            let url = url.unwrap_or_else(|| config.scraper.url.clone());
            let csv_path = resolve_output_path(out.as_deref().or(config.output.csv_path.as_deref()))?;
            let json_path = json.or_else(|| config.output.json_path.clone());

            let scraper = SurfReportScraper::new(&config.scraper)?;
            let output = Pipeline::new(config)?
                .run(&scraper, &url, reference_date, Some(&csv_path))
                .await?;

            finish(&output, north_only, json_path)?;
        }

        Command::Report { csv, json, north_only, reference_date } => {
            let _t = utils::Timer::start("Offline report");
            let raw = load_snapshot(&csv)?;
            let reference = reference_date
                .or_else(|| snapshot_date(&csv))
                .unwrap_or_else(|| Local::now().date_naive());
            let json_path = json.or_else(|| config.output.json_path.clone());

            let output = Pipeline::new(config)?.analyse(raw, reference);
            finish(&output, north_only, json_path)?;
        }

        Command::CheckRules => {
            config.validate()?;
            let rules = &config.scoring;
            println!("Direction : +{} if it contains {:?}", rules.direction_points, rules.north_keyword);
            for (name, unit, bands) in [("Waves", "m", &rules.wave_bands), ("Wind", "km/h", &rules.wind_bands)] {
                for band in bands {
                    println!("{:<10}: +{} if <= {} {}", name, band.points, band.max, unit);
                }
            }
            println!("Best total: {}", rules.max_total());
        }
    }

    Ok(())
}

fn finish(output: &PipelineOutput, north_only: bool, json_path: Option<PathBuf>) -> Result<()> {
    println!("{:<20} {:<7} {:>9} {:>10}  {}", "Day", "Hour", "Waves", "Wind", "Quality");
    for s in output.scored.iter().take(10) {
        println!(
            "{:<20} {:<7} {:>9} {:>10}  {}",
            s.slot.day_label,
            s.slot.hour_label,
            fmt_metres(s.slot.wave_size_mean),
            fmt_speed(s.slot.wind_speed_value),
            s.quality.map(|q| q.to_string()).unwrap_or_else(|| "—".into())
        );
    }
    if output.scored.len() > 10 {
        println!("… {} more rows", output.scored.len() - 10);
    }

    let filter = if north_only { SlotFilter::NorthOnly } else { SlotFilter::Any };
    match output.report_for(filter) {
        Ok(report) => utils::print_report(&format!("Surf report ({})", filter), report),
        Err(e) => println!("No report: {}", e),
    }

    if let Some(path) = json_path {
        write_report_json(
            &path,
            &ReportExport {
                slots: &output.scored,
                report: output.report.as_ref().ok(),
                north_report: output.north_report.as_ref().ok(),
                skipped_rows: output.skipped,
            },
        )?;
    }

    info!("{} rows, {} skipped", output.raw.len(), output.skipped);
    Ok(())
}
