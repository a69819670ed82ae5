// src/services/fred.rs
use chrono::{NaiveDate, Utc};
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::sync::{Arc, Mutex};

use crate::error::{PolicyError, Result};
use crate::models::DataSeries;
use crate::services::cache::{FileCache, DEFAULT_TTL};

const FRED_API_URL: &str = "https://api.stlouisfed.org/fred";

/// Federal funds target rate, upper limit (post 2008-12-15 regime).
pub const FED_TARGET_SERIES: &str = "DFEDTARU";
/// Federal funds target rate, single value (pre 2008-12-15 regime).
pub const FED_TARGET_SERIES_PRE_2008: &str = "DFEDTAR";

/// Read access to an external series source. `FredClient` is the production
/// implementation; tests substitute an in-memory provider.
#[allow(async_fn_in_trait)]
pub trait SeriesProvider {
    /// Fetch the full series for `series_id`.
    async fn fetch_series(&self, series_id: &str) -> Result<DataSeries>;

    /// Human-readable title for `series_id`.
    async fn series_display_name(&self, series_id: &str) -> Result<String>;

    /// Most recent observation dated on or before today. Sources publish
    /// some series ahead of the calendar; those never count as "latest".
    async fn latest_value(&self, series_id: &str) -> Result<Option<f64>> {
        let series = self.fetch_series(series_id).await?;
        let today = Utc::now().date_naive();
        Ok(series.last_on_or_before(today))
    }

    /// Observation `periods` positions from the end of the series (negative
    /// offset), or `None` if the series is too short.
    async fn historical_value(&self, series_id: &str, periods: i64) -> Result<Option<f64>> {
        let series = self.fetch_series(series_id).await?;
        Ok(series.at_offset(periods))
    }

    /// Keep a caller-supplied value; otherwise resolve it from the source,
    /// latest when `periods == 0` and `periods` back otherwise.
    async fn value_or_fetch(
        &self,
        current: Option<f64>,
        series_id: &str,
        periods: i64,
    ) -> Result<Option<f64>> {
        match current {
            Some(value) => Ok(Some(value)),
            None if periods == 0 => self.latest_value(series_id).await,
            None => self.historical_value(series_id, periods).await,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct SeriesInfoResponse {
    seriess: Vec<SeriesInfo>,
}

#[derive(Debug, Deserialize)]
struct SeriesInfo {
    title: String,
}

/// FRED client: resolves credentials once at construction and interposes the
/// file cache in front of every series fetch.
pub struct FredClient {
    http: Client,
    api_key: String,
    cache: FileCache,
}

static SHARED: Mutex<Option<Arc<FredClient>>> = Mutex::new(None);

impl FredClient {
    /// Build a client. Credential resolution order: explicit argument, then
    /// the `FRED_API_KEY` environment variable (the dotenv-loaded `.env`
    /// file feeds the environment at startup). No credential is a fatal
    /// configuration error; construction is never retried.
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let api_key = match api_key {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => env::var("FRED_API_KEY").map_err(|_| {
                PolicyError::Configuration(
                    "FRED API key must be provided or set via FRED_API_KEY".to_string(),
                )
            })?,
        };
        let http = Client::builder().build()?;
        Ok(FredClient {
            http,
            api_key,
            cache: FileCache::from_env(),
        })
    }

    /// Process-wide shared instance, constructed lazily under a lock so that
    /// racing first-time callers still perform credential resolution and
    /// connection setup exactly once. Construction failure leaves the slot
    /// empty; a later call with the configuration fixed may succeed.
    pub fn shared() -> Result<Arc<FredClient>> {
        let mut slot = SHARED.lock().expect("FRED client lock poisoned");
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = Arc::new(FredClient::new(None)?);
        *slot = Some(client.clone());
        Ok(client)
    }

    fn parse_observations(&self, series_id: &str, body: ObservationsResponse) -> Result<DataSeries> {
        let mut observations = Vec::with_capacity(body.observations.len());
        for obs in body.observations {
            // FRED reports unpublished points as "."
            if obs.value == "." {
                continue;
            }
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
                PolicyError::DataUnavailable(format!(
                    "unparseable observation date '{}' in series {}: {}",
                    obs.date, series_id, e
                ))
            })?;
            let value = obs.value.parse::<f64>().map_err(|e| {
                PolicyError::DataUnavailable(format!(
                    "unparseable observation value '{}' in series {}: {}",
                    obs.value, series_id, e
                ))
            })?;
            observations.push((date, value));
        }
        Ok(DataSeries::new(observations))
    }
}

impl SeriesProvider for FredClient {
    async fn fetch_series(&self, series_id: &str) -> Result<DataSeries> {
        let cache_key = format!("series_{}", series_id);
        if let Some(series) = self.cache.get::<DataSeries>(&cache_key, DEFAULT_TTL) {
            info!("Data for {} loaded from cache", series_id);
            return Ok(series);
        }

        debug!("Cache miss for {}, querying FRED", series_id);
        let url = format!("{}/series/observations", FRED_API_URL);
        let body: ObservationsResponse = self
            .http
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let series = self.parse_observations(series_id, body)?;
        if series.is_empty() {
            error!("FRED returned no data for series {}", series_id);
            return Err(PolicyError::DataUnavailable(format!(
                "no data found for series {}",
                series_id
            )));
        }

        self.cache.put(&cache_key, &series)?;
        info!("Data for {} fetched and cached ({} observations)", series_id, series.len());
        Ok(series)
    }

    async fn series_display_name(&self, series_id: &str) -> Result<String> {
        let url = format!("{}/series", FRED_API_URL);
        let body: SeriesInfoResponse = self
            .http
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body.seriess
            .into_iter()
            .next()
            .map(|info| info.title)
            .ok_or_else(|| {
                PolicyError::DataUnavailable(format!("no metadata found for series {}", series_id))
            })
    }
}

/// Federal funds target rate history across both publication regimes: the
/// single target value through 2008-12-15, the upper limit of the target
/// range afterwards.
pub async fn fetch_fed_funds_rate<P: SeriesProvider>(client: &P) -> Result<DataSeries> {
    let cutover = NaiveDate::from_ymd_opt(2008, 12, 15).expect("valid cutover date");
    let single = client.fetch_series(FED_TARGET_SERIES_PRE_2008).await?;
    let upper = client.fetch_series(FED_TARGET_SERIES).await?;

    let observations = single
        .observations
        .into_iter()
        .filter(|(date, _)| *date <= cutover)
        .chain(
            upper
                .observations
                .into_iter()
                .filter(|(date, _)| *date > cutover),
        )
        .collect();
    Ok(DataSeries::new(observations))
}
