//! Fetch, analyse and export steps shared by the subcommands.

use chrono::{DateTime, Duration, Utc};
use indicatif::ProgressBar;
use lyon::data::{
    Benchmark, BenchmarkBuilder, Dataset, DatasetAssembler, PriceSource, RetryingSource,
    YahooQuoteProvider,
};
use lyon::output::{ExportFormat, WorkbookExporter, WorkbookOutcome};
use lyon::risk::AnalyticsTable;
use lyon::{Analyzer, Settings};
use std::path::Path;
use tracing::info;

/// `[now - years, now]`.
pub(crate) fn history_window(years: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = Utc::now();
    (end - Duration::days(i64::from(years) * 365), end)
}

/// Yahoo source wrapped with the configured retry policy.
pub(crate) fn yahoo_source(settings: &Settings) -> lyon::Result<RetryingSource<YahooQuoteProvider>> {
    Ok(RetryingSource::new(
        YahooQuoteProvider::new()?,
        settings.retry.clone(),
    ))
}

/// Build the benchmark, then the dataset anchored on it.
///
/// `progress`, when given, advances once per universe symbol.
pub(crate) async fn fetch_dataset<S: PriceSource>(
    source: &S,
    settings: &Settings,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    progress: Option<&ProgressBar>,
) -> lyon::Result<(Benchmark, Dataset)> {
    let symbols = settings.symbols();

    if let Some(pb) = progress {
        pb.set_message(format!("Building benchmark ({})...", settings.benchmark.primary_symbol));
    }
    let benchmark = BenchmarkBuilder::new(settings.benchmark.clone())
        .build(source, &symbols, start, end)
        .await?;
    info!(symbol = benchmark.symbol(), kind = ?benchmark.kind(), "benchmark ready");

    if let Some(pb) = progress {
        pb.set_length(symbols.len() as u64);
        pb.set_message(format!(
            "Fetching {} symbols ({} concurrent)...",
            symbols.len(),
            settings.concurrency
        ));
    }
    let dataset = DatasetAssembler::new(
        settings.fx_rates.clone(),
        settings.exchange_currencies.clone(),
    )
    .with_concurrency(settings.concurrency)
    .assemble_with_progress(source, &benchmark, &symbols, start, end, |symbol, _| {
        if let Some(pb) = progress {
            pb.inc(1);
            pb.set_message(symbol.to_string());
        }
    })
    .await?;

    Ok((benchmark, dataset))
}

/// Analytics table for the configured universe.
pub(crate) fn analyze_dataset(settings: &Settings, dataset: &Dataset) -> lyon::Result<AnalyticsTable> {
    Analyzer::new(settings.analytics.clone(), settings.benchmark.label.clone())
        .analyze(dataset, &settings.universe)
}

/// Write the workbook and reduced metrics under `out`.
pub(crate) fn export_table(
    table: &AnalyticsTable,
    out: &Path,
    format: ExportFormat,
) -> lyon::Result<WorkbookOutcome> {
    Ok(WorkbookExporter::new(format).export(table, out)?)
}
