//! Daily price series loading and normalization
//!
//! A [`PriceSource`] returns raw, possibly gappy quotes. The [`DataLoader`]
//! turns them into a [`PriceSeries`] with exactly one finite price per
//! calendar day, filling holes by linear interpolation between the nearest
//! known neighbors.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Days, NaiveDate};
use polars::prelude::*;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// One observed price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Chronological daily price series without gaps or missing values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series, checking that dates are consecutive calendar days and
    /// prices are finite
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| !p.price.is_finite()) {
            return Err(ForecastError::ValidationError(format!(
                "Price on {} is not finite",
                bad.date
            )));
        }

        for pair in points.windows(2) {
            if pair[0].date.checked_add_days(Days::new(1)) != Some(pair[1].date) {
                return Err(ForecastError::ValidationError(format!(
                    "Dates must be consecutive calendar days: {} is followed by {}",
                    pair[0].date, pair[1].date
                )));
            }
        }

        Ok(Self { points })
    }

    /// Create a series of consecutive days starting at `start`
    pub fn from_prices(start: NaiveDate, prices: Vec<f64>) -> Result<Self> {
        let points = prices
            .into_iter()
            .enumerate()
            .map(|(i, price)| {
                start
                    .checked_add_days(Days::new(i as u64))
                    .map(|date| PricePoint { date, price })
                    .ok_or_else(|| {
                        ForecastError::ValidationError("Date out of range".to_string())
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Prices in chronological order
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Dates in chronological order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// The most recent `n` observations
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        &self.points[self.points.len().saturating_sub(n)..]
    }

    /// Price observed on `date`, if it is inside the series
    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        let first = self.first_date()?;
        let offset = usize::try_from((date - first).num_days()).ok()?;
        self.points.get(offset).map(|p| p.price)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Two-column frame (`date` as `YYYY-MM-DD`, `price`) for rendering or export
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self
            .points
            .iter()
            .map(|p| p.date.format("%Y-%m-%d").to_string())
            .collect();
        let prices = self.prices();

        Ok(DataFrame::new(vec![
            Series::new("date", dates),
            Series::new("price", prices),
        ])?)
    }
}

/// A raw quote as returned by a source; `close` may be missing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawQuote {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

/// Anything that can supply daily closing prices for a ticker
pub trait PriceSource {
    /// Fetch raw quotes for `ticker` covering `start..=end`
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawQuote>>;
}

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart API client
#[derive(Debug, Clone)]
pub struct YahooFinanceSource {
    client: Client,
    base_url: String,
}

impl YahooFinanceSource {
    /// Create a client with a 30 second request timeout
    pub fn new() -> Result<Self> {
        Self::with_base_url(YAHOO_CHART_URL)
    }

    /// Create a client against a different chart endpoint
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; brent-panorama/0.1)")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl PriceSource for YahooFinanceSource {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawQuote>> {
        let period1 = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        // period2 is exclusive, so step one day past `end`
        let period2 = end
            .checked_add_days(Days::new(1))
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();

        let url = format!("{}/{}", self.base_url, ticker);
        debug!(ticker, %start, %end, "fetching daily chart from Yahoo Finance");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(ForecastError::DataError(format!(
                "Yahoo Finance request for {} failed: {}",
                ticker, status
            )));
        }

        let body = response.text()?;
        parse_chart_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Decode a Yahoo chart payload into raw quotes
pub(crate) fn parse_chart_response(body: &str) -> Result<Vec<RawQuote>> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        if error.code == "Not Found" {
            return Ok(Vec::new());
        }
        return Err(ForecastError::DataError(format!(
            "Yahoo Finance error {}: {}",
            error.code, error.description
        )));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let offset = result.meta.map(|m| m.gmtoffset).unwrap_or(0);
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    result
        .timestamp
        .iter()
        .enumerate()
        .map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| ForecastError::DataError(format!("Invalid timestamp {}", ts)))?;
            Ok(RawQuote {
                date,
                close: closes.get(i).copied().flatten(),
            })
        })
        .collect()
}

/// Local CSV file with a date column and a price column
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Detect the time column in a DataFrame
    fn detect_time_column(df: &DataFrame) -> Result<String> {
        for name in df.get_column_names() {
            let lower_name = name.to_lowercase();
            if lower_name == "data"
                || lower_name.contains("date")
                || lower_name.contains("time")
                || lower_name.contains("timestamp")
            {
                return Ok(name.to_string());
            }
        }

        Err(ForecastError::DataError(
            "No time column found in data".to_string(),
        ))
    }

    /// Detect the price column, preferring a close column
    fn detect_price_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        for candidate in ["close", "price", "valor", "value"] {
            if let Some(name) = column_names
                .iter()
                .find(|name| name.to_lowercase().contains(candidate))
            {
                return Ok(name.to_string());
            }
        }

        Err(ForecastError::DataError(
            "No price column found in data".to_string(),
        ))
    }
}

impl PriceSource for CsvSource {
    fn fetch(&self, _ticker: &str, _start: NaiveDate, _end: NaiveDate) -> Result<Vec<RawQuote>> {
        let file = File::open(&self.path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        let time_column = Self::detect_time_column(&df)?;
        let price_column = Self::detect_price_column(&df)?;
        debug!(path = %self.path.display(), %time_column, %price_column, rows = df.height(), "read price csv");

        let dates = df.column(&time_column)?.cast(&DataType::Utf8)?;
        let closes = df.column(&price_column)?.cast(&DataType::Float64)?;

        dates
            .utf8()?
            .into_iter()
            .zip(closes.f64()?.into_iter())
            .filter_map(|(date, close)| date.map(|d| (d, close)))
            .map(|(date, close)| {
                let day = date.get(..10).unwrap_or(date);
                let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                    ForecastError::DataError(format!("Invalid date '{}': {}", date, e))
                })?;
                Ok(RawQuote { date, close })
            })
            .collect()
    }
}

/// Loads a [`PriceSeries`] from a [`PriceSource`]
#[derive(Debug, Clone)]
pub struct DataLoader<S> {
    source: S,
}

impl DataLoader<YahooFinanceSource> {
    /// Loader backed by Yahoo Finance
    pub fn yahoo() -> Result<Self> {
        Ok(Self::new(YahooFinanceSource::new()?))
    }
}

impl DataLoader<CsvSource> {
    /// Loader backed by a local CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Self {
        Self::new(CsvSource::new(path))
    }
}

impl<S: PriceSource> DataLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Load `ticker` for `start..=end` as a gap-free daily series
    pub fn load(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }

        let raw = self.source.fetch(ticker, start, end)?;
        let fetched = raw.len();
        let known = normalize_quotes(raw, start, end);

        if known.is_empty() {
            return Err(ForecastError::DataUnavailable {
                ticker: ticker.to_string(),
                start,
                end,
            });
        }

        let series = PriceSeries::new(interpolate_daily(&known))?;
        debug!(
            ticker,
            fetched,
            observed = known.len(),
            days = series.len(),
            "normalized price series"
        );
        Ok(series)
    }
}

/// Keep finite quotes inside the range, sorted, last duplicate wins
fn normalize_quotes(mut raw: Vec<RawQuote>, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    raw.retain(|q| q.date >= start && q.date <= end);
    // Stable sort keeps source order among equal dates
    raw.sort_by_key(|q| q.date);

    let mut known: Vec<PricePoint> = Vec::with_capacity(raw.len());
    for quote in raw {
        let Some(price) = quote.close.filter(|p| p.is_finite()) else {
            continue;
        };
        match known.last_mut() {
            Some(last) if last.date == quote.date => last.price = price,
            _ => known.push(PricePoint {
                date: quote.date,
                price,
            }),
        }
    }
    known
}

/// Reindex known points to every calendar day, interpolating linearly in time
fn interpolate_daily(known: &[PricePoint]) -> Vec<PricePoint> {
    let mut points = Vec::new();

    for pair in known.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        let span = (right.date - left.date).num_days();
        for step in 0..span {
            let date = left.date + chrono::Duration::days(step);
            let price = left.price + (right.price - left.price) * step as f64 / span as f64;
            points.push(PricePoint { date, price });
        }
    }

    if let Some(&last) = known.last() {
        points.push(last);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn interpolation_is_linear_in_time() {
        let known = vec![
            PricePoint { date: day(2023, 1, 6), price: 80.0 },
            PricePoint { date: day(2023, 1, 9), price: 86.0 },
        ];
        let points = interpolate_daily(&known);

        assert_eq!(points.len(), 4);
        assert_relative_eq!(points[1].price, 82.0);
        assert_relative_eq!(points[2].price, 84.0);
        assert_eq!(points[3].date, day(2023, 1, 9));
    }

    #[test]
    fn normalize_drops_missing_and_keeps_last_duplicate() {
        let raw = vec![
            RawQuote { date: day(2023, 1, 3), close: Some(2.0) },
            RawQuote { date: day(2023, 1, 2), close: None },
            RawQuote { date: day(2023, 1, 3), close: Some(3.0) },
            RawQuote { date: day(2023, 1, 1), close: Some(f64::NAN) },
            RawQuote { date: day(2023, 2, 1), close: Some(9.0) },
        ];
        let known = normalize_quotes(raw, day(2023, 1, 1), day(2023, 1, 31));

        assert_eq!(known.len(), 1);
        assert_eq!(known[0].date, day(2023, 1, 3));
        assert_relative_eq!(known[0].price, 3.0);
    }

    #[test]
    fn parses_yahoo_chart_payload() {
        // 2023-01-03 and 2023-01-04 at 05:00 UTC with a -5h exchange offset
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"gmtoffset": -18000},
                    "timestamp": [1672722000, 1672808400],
                    "indicators": {"quote": [{"close": [82.1, null]}]}
                }],
                "error": null
            }
        }"#;
        let quotes = parse_chart_response(body).unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].date, day(2023, 1, 3));
        assert_eq!(quotes[0].close, Some(82.1));
        assert_eq!(quotes[1].date, day(2023, 1, 4));
        assert_eq!(quotes[1].close, None);
    }

    #[test]
    fn yahoo_not_found_is_empty() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        assert!(parse_chart_response(body).unwrap().is_empty());

        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        assert!(matches!(
            parse_chart_response(body),
            Err(ForecastError::DataError(_))
        ));
    }

    #[test]
    fn series_rejects_gaps() {
        let points = vec![
            PricePoint { date: day(2023, 1, 1), price: 1.0 },
            PricePoint { date: day(2023, 1, 3), price: 1.0 },
        ];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn series_lookup_and_tail() {
        let series = PriceSeries::from_prices(day(2023, 1, 1), vec![1.0, 2.0, 3.0]).unwrap();

        assert_eq!(series.price_on(day(2023, 1, 2)), Some(2.0));
        assert_eq!(series.price_on(day(2022, 12, 31)), None);
        assert_eq!(series.price_on(day(2023, 1, 4)), None);
        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.tail(10).len(), 3);
        assert_eq!(series.last_date(), Some(day(2023, 1, 3)));
    }
}
