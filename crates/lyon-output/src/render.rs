//! Console rendering of analytics tables.

use lyon_risk::{AnalyticsTable, MetricsRecord};

const WIDTH: usize = 118;

/// Render the full analytics table as fixed-width text.
///
/// Rates and volatilities are shown as percentages, beta, R² and correlation
/// as plain decimals. NaN renders as `n/a`.
pub fn to_ascii_table(table: &AnalyticsTable, title: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{title}\n"));
    output.push_str(&"=".repeat(WIDTH));
    output.push('\n');

    output.push_str(&format!(
        "{:<24} {:<10} {:>8} {:>7} {:>6} {:>6} {:>9} {:>8} {:>8} {:>8}\n",
        "Company", "Symbol", "Alpha", "Beta", "R²", "Corr", "GeoReturn", "TotVol", "SysVol", "ResVol"
    ));
    output.push_str(&"-".repeat(WIDTH));
    output.push('\n');

    let mut current_sector: Option<&str> = None;
    for row in table.benchmark().into_iter().chain(table.assets()) {
        if current_sector != Some(row.sector.as_str()) {
            output.push_str(&format!("[{}]\n", row.sector));
            current_sector = Some(row.sector.as_str());
        }
        output.push_str(&format_row(row, &row.company));
    }

    if !table.averages().is_empty() {
        output.push_str(&"-".repeat(WIDTH));
        output.push('\n');
        output.push_str("Sector averages\n");
        for row in table.averages() {
            output.push_str(&format_row(row, &row.sector));
        }
    }

    output.push_str(&"=".repeat(WIDTH));
    output.push('\n');
    output
}

fn format_row(row: &MetricsRecord, label: &str) -> String {
    format!(
        "{:<24} {:<10} {:>8} {:>7} {:>6} {:>6} {:>9} {:>8} {:>8} {:>8}\n",
        truncate(label, 24),
        truncate(&row.symbol, 10),
        percent(row.alpha),
        decimal(row.beta, 3),
        decimal(row.r_squared, 2),
        decimal(row.correlation, 2),
        percent(row.geometric_return),
        percent(row.total_volatility),
        percent(row.systematic_volatility),
        percent(row.residual_volatility),
    )
}

fn percent(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}%", value * 100.0)
    }
}

fn decimal(value: f64, places: usize) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{value:.places$}")
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon_risk::Metrics;

    #[test]
    fn test_render_groups_by_sector() {
        let m = Metrics {
            alpha: 0.0215,
            beta: 1.234,
            r_squared: 0.5,
            correlation: 0.71,
            geometric_return: f64::NAN,
            total_volatility: 0.2,
            systematic_volatility: 0.15,
            residual_volatility: 0.1323,
        };
        let table = AnalyticsTable::new(
            Some(MetricsRecord::new("Index", "Eurostoxx", "^STOXX", &m)),
            vec![MetricsRecord::new("Materials", "RIO TINTO PLC", "RIO.L", &m)],
        );

        let text = to_ascii_table(&table, "Sector analysis");
        assert!(text.contains("Sector analysis"));
        assert!(text.contains("[Index]"));
        assert!(text.contains("[Materials]"));
        assert!(text.contains("RIO TINTO PLC"));
        assert!(text.contains("2.15%"));
        assert!(text.contains("1.234"));
        assert!(text.contains("n/a"));
        assert!(text.contains("Sector averages"));
    }
}
