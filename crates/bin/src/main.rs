//! Lyon CLI binary.
//!
//! Provides command-line interface for fetching market data and running the
//! sector risk/return analysis.

mod integration;

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use integration::pipeline::{
    analyze_dataset, export_table, fetch_dataset, history_window, yahoo_source,
};
use lyon::data::dataset::{read_dataset, write_dataset};
use lyon::output::{ExportFormat, WorkbookOutcome, to_ascii_table};
use lyon::risk::AnalyticsTable;
use lyon::universe::OTHER_SECTOR;
use lyon::{Settings, Universe};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration as StdDuration;

#[derive(Parser)]
#[command(name = "lyon")]
#[command(about = "Lyon: sector risk/return analytics against a benchmark index", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (JSON); compiled-in defaults otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download prices, build the benchmark and save the dataset
    Fetch {
        /// History length in years
        #[arg(long, default_value = "5")]
        years: u32,

        /// Dataset directory
        #[arg(long, default_value = "data")]
        out: PathBuf,
    },

    /// Analyse a saved dataset
    Analyze {
        /// Dataset directory
        #[arg(long, default_value = "data")]
        data: PathBuf,

        /// Results directory
        #[arg(long, default_value = "results")]
        out: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },

    /// Fetch then analyse in one go
    Run {
        /// History length in years
        #[arg(long, default_value = "5")]
        years: u32,

        /// Dataset directory
        #[arg(long, default_value = "data")]
        data: PathBuf,

        /// Results directory
        #[arg(long, default_value = "results")]
        out: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },

    /// Show the configured universe
    Universe {
        /// List sectors with their company counts only
        #[arg(long)]
        list_sectors: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
    PrettyJson,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::PrettyJson => Self::PrettyJson,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    integration::logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch { years, out } => {
            fetch(&settings, years, &out).await?;
        }
        Commands::Analyze { data, out, format } => {
            let dataset = read_dataset(&data)?;
            println!(
                "Loaded {} rows x {} columns from {}",
                dataset.prices().height(),
                dataset.prices().width(),
                data.display()
            );
            let table = analyze_dataset(&settings, &dataset)?;
            report(&table, &out, format.into())?;
        }
        Commands::Run {
            years,
            data,
            out,
            format,
        } => {
            let dataset = fetch(&settings, years, &data).await?;
            let table = analyze_dataset(&settings, &dataset)?;
            report(&table, &out, format.into())?;
        }
        Commands::Universe { list_sectors } => {
            print_universe(&settings, list_sectors);
        }
    }

    Ok(())
}

async fn fetch(
    settings: &Settings,
    years: u32,
    out: &Path,
) -> Result<lyon::data::Dataset, Box<dyn std::error::Error>> {
    let (start, end) = history_window(years);
    println!(
        "Fetching {} symbols from {} to {}",
        settings.universe.size(),
        start.date_naive(),
        end.date_naive()
    );

    let source = yahoo_source(settings)?;

    let pb = ProgressBar::new(settings.universe.size() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(StdDuration::from_millis(100));

    let (benchmark, dataset) = match fetch_dataset(&source, settings, start, end, Some(&pb)).await {
        Ok(fetched) => {
            pb.finish_with_message(format!(
                "Fetched {} symbols ({} rows)",
                fetched.1.prices().width().saturating_sub(1),
                fetched.1.prices().height()
            ));
            fetched
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    println!("Benchmark: {} ({:?})", benchmark.symbol(), benchmark.kind());
    write_dataset(&dataset, out)?;
    println!("Dataset written to {}", out.display());

    Ok(dataset)
}

fn report(
    table: &AnalyticsTable,
    out: &Path,
    format: ExportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", to_ascii_table(table, "SECTOR RISK/RETURN ANALYSIS"));

    match export_table(table, out, format)? {
        WorkbookOutcome::Structured { dir, sheets } => {
            println!("Workbook written to {} ({} sheets)", dir.display(), sheets.len());
        }
        WorkbookOutcome::Flat(path) => {
            println!("Workbook export failed, flat results written to {}", path.display());
        }
    }
    println!("Companies analysed: {}", table.assets().len());
    Ok(())
}

fn print_universe(settings: &Settings, list_sectors: bool) {
    let universe = &settings.universe;

    if list_sectors {
        println!("Sectors:");
        println!("========\n");
        for (sector, count) in universe.sector_counts() {
            println!("{:<28} {:>3}", sector, count);
        }
        return;
    }

    println!("{:<30} {:<10} {:<24} {:>8}", "Company", "Symbol", "Sector", "Currency");
    println!("{}", "-".repeat(75));
    for company in universe.companies() {
        let sector = universe.sector_of(&company.symbol);
        println!(
            "{:<30} {:<10} {:<24} {:>8}",
            company.name,
            company.symbol,
            if sector == OTHER_SECTOR { "-" } else { sector },
            settings.exchange_currencies.currency_for(&company.symbol)
        );
    }
    println!("\nBenchmark: {} (fallback {})", settings.benchmark.primary_symbol, settings.benchmark.alternate_symbol);
}
