//! Daily solar event times and local/UTC calendar-day mapping.
//!
//! The calculator ([`solar`]) turns a date, a location and a fixed UTC offset
//! into dawn, sunrise, solar noon, sunset, dusk and the night midpoint. The
//! mapper ([`span`]) converts local date ranges in an IANA zone into the UTC
//! dates that cover them, and [`country`] picks a zone for a country code.
//! [`service`] wraps both behind validated request/response types.

pub mod config;
pub mod country;
pub mod error;
pub mod geo;
pub mod service;
pub mod solar;
pub mod span;
pub mod time;

mod zone_table;

pub use config::{Config, OutputFormat};
pub use error::{Error, Result};
pub use geo::GeoLocation;
pub use solar::{AngleParameters, MidnightConvention, SolarTimes};
pub use span::LocalUtcSpan;
