//! Enrichment sources for event metadata.
//!
//! This crate provides the lookups the server attaches to single-event
//! responses:
//!
//! - [`HolidaySource`] / [`WeatherSource`] - object-safe traits for the
//!   two kinds of lookup
//! - [`NagerHolidaySource`] - public holidays from date.nager.at
//! - [`SevenTimerWeatherSource`] - forecasts from 7timer
//! - [`EnrichmentGateway`] - runs both lookups with a bounded timeout
//!   and degrades each to `None` on failure
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ date.nager.at│   │   7timer     │
//! └──────┬───────┘   └──────┬───────┘
//!        ▼                  ▼
//! ┌──────────────┐   ┌──────────────┐
//! │ HolidaySource│   │ WeatherSource│
//! └──────┬───────┘   └──────┬───────┘
//!        └───────┬──────────┘
//!                ▼
//!       ┌──────────────────┐
//!       │ EnrichmentGateway│──▶ EventMetadata
//!       └──────────────────┘
//! ```

pub mod error;
pub mod gateway;
pub mod holiday;
pub mod source;
pub mod weather;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use gateway::EnrichmentGateway;
pub use holiday::NagerHolidaySource;
pub use source::{BoxFuture, HolidaySource, WeatherSource};
pub use weather::SevenTimerWeatherSource;
