use std::env;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use clap::{CommandFactory, Parser};
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod output;

use cli::{Args, Command, DepInfo, TimesArgs};
use miqat::country::{country_timezones, normalize_country, resolve_country_timezone};
use miqat::geo::fixed_offset_from_hours;
use miqat::service::{self, DaySpanQuery, PrayerTimesQuery};
use miqat::time::{
    parse_date_expr, parse_timezone, resolve_timezone, system_timezone, utc_offset_hours,
};
use miqat::{AngleParameters, Config, Error, GeoLocation, OutputFormat};
use output::ZoneListing;

// ===================== MAIN =====================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stderr only; stdout carries the result
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG").ok().and_then(|s| s.parse().ok()).unwrap_or(Level::WARN),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.show_build_info {
        println!("Built from Git commit: {}\n", env!("MIQAT_GIT_HASH"));
        const DEP_INFO_RAW: &str = include_str!(env!("MIQAT_DEPS_INFO_PATH"));
        let deps: Vec<DepInfo> = serde_json::from_str(DEP_INFO_RAW)?;

        println!("Found {} dependencies.", deps.len());
        for dep in deps {
            println!("- {} v{}", dep.name, dep.version);
            if let Some(sum) = dep.checksum {
                println!("    Checksum: {}", sum);
            }
            if let Some(src) = dep.source {
                println!("    Source:   {}", src);
            }
        }
        return Ok(());
    }

    let format = if args.json { OutputFormat::Json } else { OutputFormat::Text };
    let now = Utc::now();

    match args.command {
        Some(Command::Times(times)) => run_times(&times, format, now),
        Some(Command::Span { start, end, country }) => {
            let config = Config::default()
                .with_default_country(normalize_country(country.as_deref()))
                .with_output(format);
            let query = DaySpanQuery { start, end, country: None };
            let res = service::day_span(&config, &query, now)?;
            match config.output {
                OutputFormat::Json => output::print_json(&res)?,
                OutputFormat::Text => print!("{}", output::render_day_span(&res)),
            }
            Ok(())
        }
        Some(Command::Zone { country }) => {
            let code = normalize_country(country.as_deref());
            let listing = ZoneListing {
                country: &code,
                timezone: resolve_country_timezone(Some(code.as_str())),
                candidates: country_timezones(&code),
            };
            match format {
                OutputFormat::Json => output::print_json(&listing)?,
                OutputFormat::Text => print!("{}", output::render_zone(&listing)),
            }
            Ok(())
        }
        None => {
            Args::command().print_help()?;
            Ok(())
        }
    }
}

// ===================== TIMES =====================

fn run_times(
    args: &TimesArgs,
    format: OutputFormat,
    now: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    let angles = AngleParameters::default()
        .with_dawn_angle(args.dawn_angle)
        .with_dusk_offset(args.dusk_offset)
        .with_midnight(args.midnight);
    let config = Config::default().with_angles(angles).with_output(format);
    config.validate()?;

    // A fixed offset wins; otherwise the zone's offset at local noon of the date is used
    let (date, offset_hours) = match args.utc_offset {
        Some(hours) => {
            let offset =
                fixed_offset_from_hours(hours).ok_or(Error::UnrepresentableOffset(hours))?;
            (resolve_date(args.date.as_deref(), now.with_timezone(&offset))?, hours)
        }
        None => {
            let tz: Tz = match args.timezone.as_str() {
                "system" => system_timezone(),
                "location" => resolve_timezone(args.longitude, args.latitude),
                other => parse_timezone(other)?,
            };
            let date = resolve_date(args.date.as_deref(), now.with_timezone(&tz))?;
            let hours = utc_offset_hours(tz, date);
            debug!(%tz, %date, hours, "resolved UTC offset");
            (date, hours)
        }
    };

    let location = GeoLocation::new(args.latitude, args.longitude, offset_hours)?;
    let query = PrayerTimesQuery { date: Some(date.to_string()), ..Default::default() };
    let res = service::prayer_times(&config, &location, &query, now)?;

    match config.output {
        OutputFormat::Json => output::print_json(&res)?,
        OutputFormat::Text => print!("{}", output::render_prayer_times(&res)),
    }
    Ok(())
}

/// Resolve the --date argument against "now" in the target zone.
fn resolve_date<T>(value: Option<&str>, anchor: DateTime<T>) -> miqat::Result<NaiveDate>
where
    T: TimeZone,
    T::Offset: Copy,
{
    match value {
        Some(s) => parse_date_expr(s, anchor, "date"),
        None => Ok(anchor.date_naive()),
    }
}
