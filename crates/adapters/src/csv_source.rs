use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use common::{Bar, Error, MarketDataSource, Result, Series};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Reads `<dir>/<TICKER>.csv` files with a
/// `timestamp,open,high,low,close,volume` header.
///
/// The file is the whole window: `period` and `interval` are ignored.
pub struct CsvMarketData {
    dir: PathBuf,
}

impl CsvMarketData {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }
}

#[async_trait]
impl MarketDataSource for CsvMarketData {
    async fn fetch(&self, instrument: &str, _period: &str, _interval: &str) -> Result<Series> {
        let path = self.csv_path(instrument);
        debug!(ticker = instrument, path = %path.display(), "Reading CSV history");
        let content = tokio::fs::read(&path).await?;
        read_series(content.as_slice())
    }
}

/// Parse CSV rows into a series, sorting them oldest first.
pub fn read_series<R: Read>(reader: R) -> Result<Series> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut bars = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        let row = row?;
        bars.push(Bar {
            timestamp: parse_timestamp(row.timestamp.trim())?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    bars.sort_by_key(|b| b.timestamp);
    Series::new(bars)
}

/// RFC 3339 or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::InvalidData(format!("unrecognised timestamp '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_dates_and_sorts_rows() {
        let data = "\
timestamp,open,high,low,close,volume
2024-01-03,11,12,10,11.5,300
2024-01-02,10,11,9,10.5,200
2024-01-04T00:00:00Z,12,13,11,12.5,400
";
        let series = read_series(data.as_bytes()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![10.5, 11.5, 12.5]);
        assert_eq!(series.last().volume, 400.0);
    }

    #[test]
    fn bad_timestamp_is_invalid_data() {
        let data = "timestamp,open,high,low,close,volume\n03/01/2024,1,2,0.5,1.5,10\n";
        assert!(matches!(read_series(data.as_bytes()), Err(Error::InvalidData(_))));
    }

    #[test]
    fn non_numeric_field_is_csv_error() {
        let data = "timestamp,open,high,low,close,volume\n2024-01-02,abc,2,0.5,1.5,10\n";
        assert!(matches!(read_series(data.as_bytes()), Err(Error::Csv(_))));
    }

    #[test]
    fn duplicate_dates_rejected() {
        let data = "\
timestamp,open,high,low,close,volume
2024-01-02,10,11,9,10.5,200
2024-01-02,10,11,9,10.5,200
";
        assert!(matches!(read_series(data.as_bytes()), Err(Error::InvalidData(_))));
    }

    #[tokio::test]
    async fn fetch_reads_ticker_file() {
        let dir = std::env::temp_dir().join(format!("pricebot-csv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("ACME.csv"),
            "timestamp,open,high,low,close,volume\n2024-01-02,10,11,9,10.5,200\n",
        )
        .unwrap();

        let source = CsvMarketData::new(&dir);
        let series = source.fetch("ACME", "1mo", "1d").await.unwrap();
        assert_eq!(series.len(), 1);

        let missing = source.fetch("NOPE", "1mo", "1d").await.unwrap_err();
        assert!(matches!(missing, Error::Io(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
