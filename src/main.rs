// Donor Insights report runner
//
// Loads donation exports into a fresh session and prints the dashboard
// tables as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use donor_insights_lib::commands::{self, Session};
use donor_insights_lib::config::{load_settings, Settings};

#[derive(Debug, Parser)]
#[command(
    name = "donor-insights",
    version,
    about = "Donor retention, churn, cohort and Pareto reports from GiveButter exports"
)]
struct Cli {
    /// Exported .xlsx/.xls/.ods/.csv files
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// JSON settings file
    #[arg(long, env = "DONOR_INSIGHTS_SETTINGS")]
    settings: Option<PathBuf>,

    /// Zero-based row holding the column headers
    #[arg(long)]
    header_row: Option<usize>,

    /// Target share for the Pareto cutoff (10-100)
    #[arg(long)]
    pareto_target: Option<f64>,

    /// Rows in detail tables, 0 for all
    #[arg(long)]
    detail_rows: Option<usize>,

    /// Load the GeoNames postal index and include the ZIP map
    #[arg(long)]
    geocode: bool,

    /// Directory for the GeoNames cache
    #[arg(long, env = "DONOR_INSIGHTS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Start month for cumulative growth (YYYY-MM)
    #[arg(long)]
    growth_from: Option<String>,

    /// End month for cumulative growth (YYYY-MM)
    #[arg(long)]
    growth_to: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn settings(&self) -> Result<Settings, String> {
        let mut settings = match &self.settings {
            Some(path) => load_settings(path)?,
            None => Settings::default(),
        };

        if let Some(row) = self.header_row {
            settings.header_row = row;
        }
        if let Some(target) = self.pareto_target {
            settings.pareto_target_pct = target;
        }
        if let Some(rows) = self.detail_rows {
            settings.detail_rows = rows;
        }
        if let Some(dir) = &self.data_dir {
            settings.data_dir = Some(dir.clone());
        }

        settings.validate()?;
        Ok(settings)
    }
}

async fn run(cli: Cli) -> Result<String, String> {
    let mut session = Session::new(cli.settings()?);

    let result = commands::import::import_paths(&mut session, &cli.files)?;
    for failure in &result.failures {
        log::error!("Failed to load {}: {}", failure.file_name, failure.error);
    }
    if !result.unrecognized_headers.is_empty() {
        log::info!("Unrecognized columns: {}", result.unrecognized_headers.join(", "));
    }

    if cli.geocode {
        // The report still runs without the map
        if let Err(e) = commands::geo::sync_postal_index(&mut session).await {
            log::warn!("Geocoding unavailable: {}", e);
        }
    }

    let dashboard = commands::reports::get_dashboard(
        &mut session,
        cli.growth_from.as_deref(),
        cli.growth_to.as_deref(),
    )?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&dashboard)
    } else {
        serde_json::to_string(&dashboard)
    };
    json.map_err(|e| format!("Failed to serialize dashboard: {}", e))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging - default to info level for our crate
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("donor_insights_lib=info,donor_insights=info"),
    )
    .init();

    match run(Cli::parse()).await {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
