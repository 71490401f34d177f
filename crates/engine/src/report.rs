use common::ResultRow;

const HEADERS: [&str; 10] = [
    "Ticker",
    "Signal",
    "Confidence",
    "Price_Advice",
    "Stop_Loss",
    "Take_Profit",
    "Hist_Win_Rate",
    "Max_Drawdown",
    "Risk_Score",
    "Sharpe",
];

const PLACEHOLDER: &str = "-";

/// Format one row's cells in column order.
pub fn row_cells(row: &ResultRow) -> [String; 10] {
    let price = |f: fn(&common::PriceAdvice) -> f64| {
        row.advice
            .as_ref()
            .map(|a| format!("{:.2}", f(a)))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };
    [
        row.ticker.clone(),
        row.signal.to_string(),
        format!("{:.2}", row.confidence),
        price(|a| a.limit_price),
        price(|a| a.stop_loss),
        price(|a| a.take_profit),
        percent(row.stats.win_rate),
        percent(row.stats.max_drawdown),
        format!("{:.2}", row.risk_score.value()),
        format!("{:.2}", row.stats.sharpe),
    ]
}

/// Render rows as a padded markdown table.
pub fn render_table(rows: &[ResultRow]) -> String {
    let cells: Vec<[String; 10]> = rows.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    let line = |values: &[String]| {
        let padded: Vec<String> = values
            .iter()
            .zip(widths.iter())
            .map(|(v, w)| format!("{v:<w$}"))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut out = Vec::with_capacity(cells.len() + 2);
    out.push(line(&HEADERS.map(String::from)));
    out.push(format!(
        "|{}|",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("|")
    ));
    for row in &cells {
        out.push(line(row));
    }
    out.join("\n")
}

fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{BacktestStats, PriceAdvice, RiskScore, Signal};

    fn row(ticker: &str, signal: Signal, advice: Option<PriceAdvice>) -> ResultRow {
        ResultRow {
            ticker: ticker.to_string(),
            signal,
            confidence: 0.6543,
            advice,
            risk_score: RiskScore::new(0.25).unwrap(),
            stats: BacktestStats {
                win_rate: 0.55,
                sharpe: 1.234,
                max_drawdown: 0.1234,
            },
        }
    }

    #[test]
    fn hold_renders_placeholders() {
        let cells = row_cells(&row("AAPL", Signal::Hold, None));
        assert_eq!(cells[1], "HOLD");
        assert_eq!(cells[2], "0.65");
        assert_eq!(&cells[3..6], &["-", "-", "-"]);
        assert_eq!(cells[6], "55.00%");
        assert_eq!(cells[7], "12.34%");
        assert_eq!(cells[8], "0.25");
        assert_eq!(cells[9], "1.23");
    }

    #[test]
    fn advice_renders_two_decimals() {
        let advice = PriceAdvice {
            limit_price: 99.5,
            stop_loss: 95.5,
            take_profit: 105.5,
        };
        let cells = row_cells(&row("X", Signal::Buy, Some(advice)));
        assert_eq!(&cells[3..6], &["99.50", "95.50", "105.50"]);
    }

    #[test]
    fn table_has_header_separator_and_rows() {
        let table = render_table(&[row("AAPL", Signal::Hold, None), row("MSFT", Signal::Sell, None)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("| Ticker"));
        assert!(lines[0].contains("Hist_Win_Rate"));
        assert!(lines[1].starts_with("|---"));
        assert!(lines[2].contains("AAPL"));
        assert!(lines[3].contains("SELL"));
        // Every line has the same width.
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn empty_table_is_just_header() {
        assert_eq!(render_table(&[]).lines().count(), 2);
    }
}
