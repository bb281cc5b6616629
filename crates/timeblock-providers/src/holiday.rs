//! Public-holiday lookup backed by the date.nager.at API.

use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::source::{BoxFuture, HolidaySource};

const DEFAULT_BASE_URL: &str = "https://date.nager.at";
const USER_AGENT: &str = concat!("timeblock/", env!("CARGO_PKG_VERSION"));

/// One holiday entry as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicHoliday {
    /// ISO date (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// English name.
    pub name: String,
    /// Name in the country's language.
    #[serde(default)]
    pub local_name: Option<String>,
}

/// Finds the holiday falling on `date` in a year's worth of entries.
fn holiday_on(holidays: &[PublicHoliday], date: NaiveDate) -> Option<String> {
    holidays
        .iter()
        .find(|holiday| holiday.date == date)
        .map(|holiday| holiday.name.clone())
}

/// [`HolidaySource`] backed by <https://date.nager.at>.
///
/// One request fetches the whole year for the queried date's country, and
/// the matching entry (if any) is picked out locally.
pub struct NagerHolidaySource {
    client: Client,
    base_url: String,
}

impl NagerHolidaySource {
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

    async fn fetch_year(&self, year: i32, country: &str) -> ProviderResult<Vec<PublicHoliday>> {
        let url = format!("{}/api/v2/publicholidays/{year}/{country}", self.base_url);
        debug!(%url, "fetching public holidays");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::server(format!(
                "holiday lookup returned status {status}"
            ))
            .with_source_name(self.name()));
        }

        Ok(response.json().await?)
    }
}

impl HolidaySource for NagerHolidaySource {
    fn name(&self) -> &str {
        "nager"
    }

    fn holiday_name(
        &self,
        date: NaiveDate,
        country: &str,
    ) -> BoxFuture<'_, ProviderResult<Option<String>>> {
        let country = country.to_string();
        Box::pin(async move {
            let holidays = self.fetch_year(date.year(), &country).await?;
            Ok(holiday_on(&holidays, date))
        })
    }
}
