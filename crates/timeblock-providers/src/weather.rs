//! Weather forecast lookup backed by the 7timer civillight API.

use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use timeblock_core::{GeoPoint, WeatherSnapshot};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::source::{BoxFuture, WeatherSource};

const DEFAULT_BASE_URL: &str = "https://www.7timer.info";
const USER_AGENT: &str = concat!("timeblock/", env!("CARGO_PKG_VERSION"));

/// Daily min/max temperature pair.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TemperatureRange {
    pub max: i64,
    pub min: i64,
}

/// One day of the civillight forecast series.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastDay {
    /// Compact date as `yyyymmdd`.
    pub date: u32,
    /// Condition summary (e.g. "clear", "lightrain").
    pub weather: String,
    pub temp2m: TemperatureRange,
    /// Maximum 10m wind speed on the provider's own scale.
    pub wind10m_max: i64,
    /// Relative humidity percentage; not present in every product.
    #[serde(default)]
    pub rh2m: i64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    dataseries: Vec<ForecastDay>,
}

fn compact_date(date: NaiveDate) -> u32 {
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}

/// Picks the forecast day matching `date` and formats it for display.
fn snapshot_on(days: &[ForecastDay], date: NaiveDate) -> Option<WeatherSnapshot> {
    let key = compact_date(date);
    days.iter().find(|day| day.date == key).map(|day| WeatherSnapshot {
        temperature: format!("{} C", day.temp2m.max),
        humidity: format!("{}%", day.rh2m),
        wind_speed: format!("{} KM", day.wind10m_max),
        condition: day.weather.clone(),
    })
}

/// [`WeatherSource`] backed by <https://www.7timer.info>.
///
/// The civillight product covers roughly a week ahead; dates outside the
/// horizon resolve to `Ok(None)`.
pub struct SevenTimerWeatherSource {
    client: Client,
    base_url: String,
}

impl SevenTimerWeatherSource {
    /// Creates a source with the production endpoint.
    pub fn new(timeout: std::time::Duration) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Overrides the endpoint base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_series(&self, point: GeoPoint) -> ProviderResult<Vec<ForecastDay>> {
        let url = format!(
            "{}/bin/civillight.php?lon={}&lat={}&ac=0&unit=metric&output=json&tzshift=0",
            self.base_url, point.longitude, point.latitude
        );
        debug!(%url, "fetching weather forecast");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::server(format!(
                "weather lookup returned status {status}"
            ))
            .with_source_name(self.name()));
        }

        let body: ForecastResponse = response.json().await?;
        Ok(body.dataseries)
    }
}

impl WeatherSource for SevenTimerWeatherSource {
    fn name(&self) -> &str {
        "7timer"
    }

    fn forecast(
        &self,
        date: NaiveDate,
        point: GeoPoint,
    ) -> BoxFuture<'_, ProviderResult<Option<WeatherSnapshot>>> {
        Box::pin(async move {
            let days = self.fetch_series(point).await?;
            Ok(snapshot_on(&days, date))
        })
    }
}
