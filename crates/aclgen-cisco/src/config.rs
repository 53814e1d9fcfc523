//! Generator configuration.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields the stock Cisco behaviour. The command line overrides file values.

use chrono::{Days, Local, NaiveDate};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use aclgen_policy::services::DEFAULT_TERM_NAME_MAX_LENGTH;

use crate::error::{AclGenError, Result};

/// Platform token the generator answers to in policy headers.
pub const DEFAULT_PLATFORM: &str = "cisco";

/// How protocols are written on rule lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolForm {
    /// Keywords as written in the policy (`tcp`, `udp`, `gre`).
    #[default]
    Name,
    /// IANA numbers where known (`6`, `17`, `47`).
    Number,
}

/// Configuration for one generator run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Platform token matched against header targets.
    pub platform: String,
    /// Warn about terms expiring within this many weeks.
    pub exp_info_weeks: u64,
    /// Compilation date; `None` uses the local date.
    pub today: Option<NaiveDate>,
    /// Protocol rendering form.
    pub protocol_form: ProtocolForm,
    /// Wrap width for standard and object-group comments.
    pub comment_width: usize,
    /// Extended/inet6 remark lines are cut to this many characters.
    pub remark_max_length: usize,
    /// Term names longer than this are truncated.
    pub term_name_max_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            platform: DEFAULT_PLATFORM.to_string(),
            exp_info_weeks: 2,
            today: None,
            protocol_form: ProtocolForm::Name,
            comment_width: 70,
            remark_max_length: 100,
            term_name_max_length: DEFAULT_TERM_NAME_MAX_LENGTH,
        }
    }
}

impl GeneratorConfig {
    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| AclGenError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&text).map_err(|message| AclGenError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parses configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> std::result::Result<Self, String> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| e.to_string())
    }

    /// The compilation date.
    pub fn current_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Terms expiring on or before this date trigger an informational warning.
    pub fn expiry_warning_date(&self) -> NaiveDate {
        self.current_date()
            .checked_add_days(Days::new(self.exp_info_weeks.saturating_mul(7)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// True when `expiration` falls within the warning window, expired dates
    /// included.
    pub fn expires_soon(&self, expiration: NaiveDate) -> bool {
        expiration <= self.expiry_warning_date()
    }

    /// True when `expiration` is on or before the compilation date.
    pub fn is_expired(&self, expiration: NaiveDate) -> bool {
        expiration <= self.current_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.platform, "cisco");
        assert_eq!(config.exp_info_weeks, 2);
        assert_eq!(config.protocol_form, ProtocolForm::Name);
        assert_eq!(config.comment_width, 70);
        assert_eq!(config.remark_max_length, 100);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = GeneratorConfig::from_yaml_str(
            "exp_info_weeks: 4\ntoday: 2024-03-01\nprotocol_form: number\n",
        )
        .unwrap();
        assert_eq!(config.exp_info_weeks, 4);
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(config.protocol_form, ProtocolForm::Number);
        assert_eq!(config.platform, "cisco");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            GeneratorConfig::from_yaml_str("").unwrap(),
            GeneratorConfig::default()
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(GeneratorConfig::from_yaml_str("colour: blue\n").is_err());
    }

    #[test]
    fn test_expiry_warning_date() {
        let config = GeneratorConfig {
            today: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert_eq!(
            config.expiry_warning_date(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_expired_dates_are_also_within_warning_window() {
        let config = GeneratorConfig {
            today: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..Default::default()
        };
        let expired = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert!(config.is_expired(expired));
        assert!(config.expires_soon(expired));

        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(config.is_expired(today));

        let soon = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert!(!config.is_expired(soon));
        assert!(config.expires_soon(soon));

        let later = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert!(!config.expires_soon(later));
    }
}
