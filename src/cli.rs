//! Command-Line Interface Module
//!
//! Handles argument parsing and validation for the miqat binary.

use clap::{Parser, Subcommand};
use serde::Deserialize;

use miqat::geo::MAX_UTC_OFFSET_HOURS;
use miqat::solar::{
    MAX_DAWN_ANGLE_DEG, MAX_DUSK_OFFSET_MIN, MIN_DAWN_ANGLE_DEG, MIN_DUSK_OFFSET_MIN,
    MidnightConvention,
};

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about, arg_required_else_help = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print JSON instead of text
    #[arg(long, global = true, env = "MIQAT_JSON")]
    pub json: bool,

    /// Show build info from Cargo.lock at time of building
    #[arg(long)]
    pub show_build_info: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Daily prayer times for a location
    Times(TimesArgs),
    /// UTC dates covering a local date range in a country
    Span {
        /// First local date (YYYY-MM-DD); the current month when omitted
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Last local date (YYYY-MM-DD), inclusive
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// ISO 3166-1 alpha-2 country code
        #[arg(long, env = "MIQAT_COUNTRY")]
        country: Option<String>,
    },
    /// Time zone chosen for a country, with every candidate
    Zone {
        /// ISO 3166-1 alpha-2 country code
        #[arg(long, env = "MIQAT_COUNTRY")]
        country: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct TimesArgs {
    /// Observer latitude in decimal degrees (-90 to 90)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_latitude, env = "MIQAT_LATITUDE")]
    pub latitude: f64,
    /// Observer longitude in decimal degrees (-180 to 180)
    #[arg(
        long,
        allow_hyphen_values = true,
        value_parser = parse_longitude,
        env = "MIQAT_LONGITUDE"
    )]
    pub longitude: f64,
    /// Time zone to use ("system", "location", or IANA time zone name)
    #[arg(long, default_value = "system", env = "MIQAT_TIMEZONE")]
    pub timezone: String,
    /// Fixed UTC offset in hours; overrides --timezone
    #[arg(long, allow_hyphen_values = true, value_parser = parse_utc_offset)]
    pub utc_offset: Option<f64>,

    /// Date for calculations (e.g., "2025-06-21" or "tomorrow"); defaults to today
    #[arg(long)]
    pub date: Option<String>,

    /// Sun depression below the horizon at dawn, degrees
    #[arg(long, default_value_t = 17.7, value_parser = parse_dawn_angle, env = "MIQAT_DAWN_ANGLE")]
    pub dawn_angle: f64,
    /// Minutes from sunset to dusk
    #[arg(long, default_value_t = 4.0, value_parser = parse_dusk_offset, env = "MIQAT_DUSK_OFFSET")]
    pub dusk_offset: f64,
    /// Night midpoint: dusk-to-dawn or sunset-to-sunrise
    #[arg(
        long,
        default_value = "dusk-to-dawn",
        value_parser = parse_midnight,
        env = "MIQAT_MIDNIGHT"
    )]
    pub midnight: MidnightConvention,
}

// Define the structure to match what we serialized in build.rs
#[derive(Debug, Deserialize)]
pub struct DepInfo {
    pub name: String,
    pub version: String,
    pub checksum: Option<String>,
    pub source: Option<String>,
}

// ===================== CLI VALUE PARSERS =====================

fn parse_latitude(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-90.0..=90.0).contains(&v) {
        return Err(format!("Latitude must be between -90 and 90, got {}", v));
    }
    Ok(v)
}

fn parse_longitude(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-180.0..=180.0).contains(&v) {
        return Err(format!("Longitude must be between -180 and 180, got {}", v));
    }
    Ok(v)
}

fn parse_utc_offset(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(-MAX_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS).contains(&v) {
        return Err(format!("UTC offset must be between -14 and 14 hours, got {}", v));
    }
    Ok(v)
}

fn parse_dawn_angle(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(MIN_DAWN_ANGLE_DEG..=MAX_DAWN_ANGLE_DEG).contains(&v) {
        return Err(format!(
            "Dawn angle must be between {} and {} degrees, got {}",
            MIN_DAWN_ANGLE_DEG, MAX_DAWN_ANGLE_DEG, v
        ));
    }
    Ok(v)
}

fn parse_dusk_offset(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(MIN_DUSK_OFFSET_MIN..=MAX_DUSK_OFFSET_MIN).contains(&v) {
        return Err(format!(
            "Dusk offset must be between {} and {} minutes, got {}",
            MIN_DUSK_OFFSET_MIN, MAX_DUSK_OFFSET_MIN, v
        ));
    }
    Ok(v)
}

fn parse_midnight(s: &str) -> Result<MidnightConvention, String> {
    s.parse()
}
