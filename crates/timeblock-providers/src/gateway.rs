//! Combines the enrichment sources behind one injectable gateway.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use timeblock_core::{EventMetadata, GeoPoint};
use tracing::warn;

use crate::error::ProviderResult;
use crate::source::{HolidaySource, WeatherSource};

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_COUNTRY: &str = "AU";

/// Fetches event metadata from the holiday and weather sources.
///
/// The two lookups run concurrently, each bounded by the same timeout,
/// and degrade independently: a failed or timed-out lookup logs a warning
/// and contributes `None` instead of failing the request. The weekend
/// flag needs no remote call and is always present.
///
/// The gateway is injected into the request handler rather than being a
/// process-wide global, so tests swap in canned sources.
pub struct EnrichmentGateway {
    holidays: Arc<dyn HolidaySource>,
    weather: Arc<dyn WeatherSource>,
    lookup_timeout: Duration,
    country: String,
}

impl EnrichmentGateway {
    /// Creates a gateway over the two sources with default timeout and
    /// country.
    pub fn new(holidays: Arc<dyn HolidaySource>, weather: Arc<dyn WeatherSource>) -> Self {
        Self {
            holidays,
            weather,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    /// Builder: set the per-lookup timeout.
    #[must_use]
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Builder: set the holiday country code.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Assembles the `_metadata` block for an event on `date` at `point`.
    pub async fn fetch_metadata(&self, date: NaiveDate, point: GeoPoint) -> EventMetadata {
        let (holiday, weather) = tokio::join!(
            tokio::time::timeout(
                self.lookup_timeout,
                self.holidays.holiday_name(date, &self.country),
            ),
            tokio::time::timeout(self.lookup_timeout, self.weather.forecast(date, point)),
        );

        let holiday = settle(holiday, "holiday", self.holidays.name());
        let weather = settle(weather, "weather", self.weather.name());

        EventMetadata::new(date, holiday, weather)
    }
}

/// Collapses a timed lookup outcome to its value, logging failures.
fn settle<T>(
    outcome: Result<ProviderResult<Option<T>>, tokio::time::error::Elapsed>,
    lookup: &str,
    source: &str,
) -> Option<T> {
    match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(error)) => {
            warn!(lookup, source, %error, "enrichment lookup failed");
            None
        }
        Err(_) => {
            warn!(lookup, source, "enrichment lookup timed out");
            None
        }
    }
}
