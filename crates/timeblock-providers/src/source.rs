//! Source trait definitions for enrichment lookups.
//!
//! Both traits return boxed futures so they stay object-safe; the gateway
//! holds them as `Arc<dyn HolidaySource>` / `Arc<dyn WeatherSource>` and
//! test doubles slot in without any HTTP machinery.

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDate;
use timeblock_core::{GeoPoint, WeatherSnapshot};

use crate::error::ProviderResult;

/// A boxed future for async trait methods, keeping the traits object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Looks up public holidays for a country.
pub trait HolidaySource: Send + Sync {
    /// The source name, for logging (e.g. "nager").
    fn name(&self) -> &str;

    /// The name of the public holiday on `date` in `country`, if any.
    ///
    /// `Ok(None)` means the lookup succeeded and the date is not a
    /// holiday; errors are reserved for failed lookups.
    fn holiday_name(
        &self,
        date: NaiveDate,
        country: &str,
    ) -> BoxFuture<'_, ProviderResult<Option<String>>>;
}

/// Looks up a one-day weather forecast for a location.
pub trait WeatherSource: Send + Sync {
    /// The source name, for logging (e.g. "7timer").
    fn name(&self) -> &str;

    /// The forecast for `date` at `point`.
    ///
    /// `Ok(None)` means the lookup succeeded but the forecast horizon
    /// does not cover `date`.
    fn forecast(
        &self,
        date: NaiveDate,
        point: GeoPoint,
    ) -> BoxFuture<'_, ProviderResult<Option<WeatherSnapshot>>>;
}
