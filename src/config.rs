//! Service Configuration
//!
//! Settings shared by every request a front end serves. Built once by the
//! caller and passed into the service functions explicitly.

use serde::{Deserialize, Serialize};

use crate::country::DEFAULT_COUNTRY;
use crate::error::Result;
use crate::solar::AngleParameters;

/// Output rendering for the command-line front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Country used by day-span queries that name none
    pub default_country: String,
    /// Angles used by prayer-time queries that override none
    pub angles: AngleParameters,
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_country: DEFAULT_COUNTRY.to_string(),
            angles: AngleParameters::default(),
            output: OutputFormat::Text,
        }
    }
}

impl Config {
    pub fn with_default_country(mut self, code: impl Into<String>) -> Self {
        self.default_country = code.into().to_ascii_uppercase();
        self
    }

    pub fn with_angles(mut self, angles: AngleParameters) -> Self {
        self.angles = angles;
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    /// Reject default angles outside their documented ranges.
    pub fn validate(&self) -> Result<()> {
        self.angles.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solar::MidnightConvention;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_country, "IQ");
        assert_eq!(config.angles.dawn_angle_deg, 17.7);
        assert_eq!(config.angles.dusk_offset_min, 4.0);
        assert_eq!(config.angles.midnight, MidnightConvention::DuskToDawn);
        assert_eq!(config.output, OutputFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_default_country("ir")
            .with_angles(AngleParameters::default().with_dawn_angle(35.0))
            .with_output(OutputFormat::Json);
        assert_eq!(config.default_country, "IR");
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.validate().is_err());
    }
}
