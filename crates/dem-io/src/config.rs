//! Configuration for grid encoders and decoders.

use serde::{Deserialize, Serialize};

use crate::error::{GridIoError, Result};

/// Largest useful number of fractional digits for an `f64`.
pub const MAX_PRECISION: usize = 17;

/// Configuration shared by the readers and writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Fractional digits for decimal cells and header fields in text output.
    /// At most 17.
    pub precision: usize,

    /// Fractional digits for the corner, cellsize and no-data fields of a
    /// binary `.hdr` file.
    pub header_precision: usize,

    /// What to do when a payload holds more or fewer cells than declared.
    pub size_check: SizeCheck,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            precision: 8,
            header_precision: 10,
            size_check: SizeCheck::Strict,
        }
    }
}

impl IoConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup, falling back to
    /// defaults for missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("DEM_IO_PRECISION") {
            if let Ok(precision) = val.trim().parse() {
                config.precision = precision;
            }
        }

        if let Some(val) = lookup("DEM_IO_HEADER_PRECISION") {
            if let Ok(precision) = val.trim().parse() {
                config.header_precision = precision;
            }
        }

        if let Some(val) = lookup("DEM_IO_SIZE_CHECK") {
            config.size_check = SizeCheck::from_str(&val);
        }

        config
    }

    /// Set the text precision, builder style.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Set the size check policy, builder style.
    pub fn with_size_check(mut self, size_check: SizeCheck) -> Self {
        self.size_check = size_check;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.precision > MAX_PRECISION {
            return Err(GridIoError::Config(format!(
                "precision must be <= {}, got {}",
                MAX_PRECISION, self.precision
            )));
        }

        if self.header_precision > MAX_PRECISION {
            return Err(GridIoError::Config(format!(
                "header_precision must be <= {}, got {}",
                MAX_PRECISION, self.header_precision
            )));
        }

        Ok(())
    }
}

/// Policy for payloads whose length disagrees with the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeCheck {
    /// Reject the file before touching the destination grid.
    #[default]
    Strict,
    /// Read what is there: missing cells stay no-data, extra data is ignored.
    Lenient,
}

impl SizeCheck {
    /// Parse from string (case-insensitive). Unknown values mean `Strict`.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "lenient" | "loose" => Self::Lenient,
            _ => Self::Strict,
        }
    }

    /// Get the policy name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = IoConfig::default();
        assert_eq!(config.precision, 8);
        assert_eq!(config.header_precision, 10);
        assert_eq!(config.size_check, SizeCheck::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DEM_IO_PRECISION", "3"),
            ("DEM_IO_SIZE_CHECK", "Lenient"),
            ("DEM_IO_HEADER_PRECISION", "not a number"),
        ]
        .into_iter()
        .collect();

        let config = IoConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.precision, 3);
        assert_eq!(config.size_check, SizeCheck::Lenient);
        assert_eq!(config.header_precision, 10);
    }

    #[test]
    fn test_validate_rejects_huge_precision() {
        let config = IoConfig::default().with_precision(40);
        assert!(matches!(config.validate(), Err(GridIoError::Config(_))));
    }

    #[test]
    fn test_size_check_parse() {
        assert_eq!(SizeCheck::from_str("strict"), SizeCheck::Strict);
        assert_eq!(SizeCheck::from_str(" LENIENT "), SizeCheck::Lenient);
        assert_eq!(SizeCheck::from_str("bogus"), SizeCheck::Strict);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: IoConfig =
            serde_json::from_str(r#"{"precision": 2, "size_check": "lenient"}"#).unwrap();
        assert_eq!(config.precision, 2);
        assert_eq!(config.header_precision, 10);
        assert_eq!(config.size_check, SizeCheck::Lenient);
    }
}
