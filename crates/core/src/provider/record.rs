//! Pipe-delimited persisted form of a provider record.
//!
//! Full form (9 fields):
//! `name|url|key|categories|enabled|search_mode|search_fallback|enable_daily|enable_backlog`
//!
//! Legacy short form (5 fields): `name|url|key|categories|enabled`. Extra trailing
//! fields on a record that is not exactly 9 long are ignored, as older writers did.

use thiserror::Error;

use super::types::{join_categories, parse_tv_categories, ProviderRecord, SearchMode, DEFAULT_CATEGORIES};

/// Separator between records in a persisted catalog string.
pub const RECORD_SEPARATOR: &str = "!!!";
/// Separator between fields of one record.
pub const FIELD_SEPARATOR: char = '|';

const FULL_FIELD_COUNT: usize = 9;
const MIN_FIELD_COUNT: usize = 5;

/// Why a persisted record could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected 9 or at least 5 fields, got {0}")]
    WrongFieldCount(usize),

    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("invalid flag value '{value}' for '{field}'")]
    InvalidFlag { field: &'static str, value: String },

    #[error("unknown search mode '{0}'")]
    InvalidSearchMode(String),
}

impl ProviderRecord {
    /// Decode one persisted record.
    pub fn from_config_string(config: &str) -> Result<Self, RecordError> {
        let values: Vec<&str> = config.split(FIELD_SEPARATOR).collect();
        if values.len() < MIN_FIELD_COUNT {
            return Err(RecordError::WrongFieldCount(values.len()));
        }

        let name = values[0].trim();
        if name.is_empty() {
            return Err(RecordError::EmptyField("name"));
        }
        let url = values[1].trim();
        if url.is_empty() {
            return Err(RecordError::EmptyField("url"));
        }

        let mut categories = parse_tv_categories(values[3]);
        if categories.is_empty() {
            categories = DEFAULT_CATEGORIES.to_vec();
        }

        let mut record = ProviderRecord {
            name: name.to_string(),
            url: url.to_string(),
            api_key: values[2].trim().to_string(),
            categories,
            enabled: parse_flag("enabled", values[4])?,
            search_mode: SearchMode::Episode,
            search_fallback: false,
            enable_daily: false,
            enable_backlog: false,
            is_default: false,
        };

        if values.len() == FULL_FIELD_COUNT {
            record.search_mode = values[5]
                .parse()
                .map_err(RecordError::InvalidSearchMode)?;
            record.search_fallback = parse_flag("search_fallback", values[6])?;
            record.enable_daily = parse_flag("enable_daily", values[7])?;
            record.enable_backlog = parse_flag("enable_backlog", values[8])?;
        }

        Ok(record)
    }

    /// Encode as the 9-field persisted form.
    pub fn config_string(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.name,
            self.url,
            self.api_key,
            join_categories(&self.categories),
            self.enabled as u8,
            self.search_mode,
            self.search_fallback as u8,
            self.enable_daily as u8,
            self.enable_backlog as u8,
        )
    }
}

/// Join records into one persisted catalog string.
pub fn serialize_catalog(records: &[ProviderRecord]) -> String {
    records
        .iter()
        .map(ProviderRecord::config_string)
        .collect::<Vec<_>>()
        .join(RECORD_SEPARATOR)
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, RecordError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(RecordError::InvalidFlag {
            field,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let record = ProviderRecord::from_config_string(
            "NZBGeek|https://api.nzbgeek.info/|abc|5030,5040,2000|1|sponly|1|0|1",
        )
        .unwrap();

        assert_eq!(record.name, "NZBGeek");
        assert_eq!(record.url, "https://api.nzbgeek.info/");
        assert_eq!(record.api_key, "abc");
        assert_eq!(record.categories, vec![5030, 5040]);
        assert!(record.enabled);
        assert_eq!(record.search_mode, SearchMode::Season);
        assert!(record.search_fallback);
        assert!(!record.enable_daily);
        assert!(record.enable_backlog);
        assert!(!record.is_default);
        assert!(record.needs_auth());
    }

    #[test]
    fn test_parse_short_record_defaults() {
        let record =
            ProviderRecord::from_config_string("Old|https://old.example/|0|5030|0").unwrap();

        assert_eq!(record.search_mode, SearchMode::Episode);
        assert!(!record.search_fallback);
        assert!(!record.enable_daily);
        assert!(!record.enable_backlog);
        assert!(!record.enabled);
        assert!(record.is_public());
    }

    #[test]
    fn test_parse_record_with_extra_fields_uses_short_form() {
        let record =
            ProviderRecord::from_config_string("Odd|https://odd.example/|0|5030|1|season|1")
                .unwrap();
        assert_eq!(record.search_mode, SearchMode::Episode);
        assert!(!record.search_fallback);
    }

    #[test]
    fn test_parse_too_few_fields() {
        assert_eq!(
            ProviderRecord::from_config_string("Broken|https://x.example/|0"),
            Err(RecordError::WrongFieldCount(3))
        );
    }

    #[test]
    fn test_parse_empty_name() {
        assert_eq!(
            ProviderRecord::from_config_string("|https://x.example/|0|5030|1"),
            Err(RecordError::EmptyField("name"))
        );
    }

    #[test]
    fn test_parse_invalid_flag() {
        let err = ProviderRecord::from_config_string("X|https://x.example/|0|5030|maybe");
        assert!(matches!(err, Err(RecordError::InvalidFlag { field: "enabled", .. })));
    }

    #[test]
    fn test_parse_invalid_search_mode() {
        let err =
            ProviderRecord::from_config_string("X|https://x.example/|0|5030|1|weekly|0|0|0");
        assert_eq!(err, Err(RecordError::InvalidSearchMode("weekly".to_string())));
    }

    #[test]
    fn test_non_tv_categories_fall_back_to_default() {
        let record =
            ProviderRecord::from_config_string("X|https://x.example/|0|2000,7000|1").unwrap();
        assert_eq!(record.categories, DEFAULT_CATEGORIES.to_vec());
    }

    #[test]
    fn test_config_string_is_nine_fields() {
        let record = ProviderRecord::from_config_string("Old|https://old.example/|0|5030|1").unwrap();
        let encoded = record.config_string();
        assert_eq!(encoded, "Old|https://old.example/|0|5030|1|episode|0|0|0");
        assert_eq!(ProviderRecord::from_config_string(&encoded).unwrap(), record);
    }

    #[test]
    fn test_serialize_catalog_joins_records() {
        let a = ProviderRecord::new("A", "https://a.example/");
        let b = ProviderRecord::new("B", "https://b.example/");
        let joined = serialize_catalog(&[a, b]);
        assert_eq!(joined.matches(RECORD_SEPARATOR).count(), 1);
        assert!(joined.starts_with("A|https://a.example/|0|5030,5040|0|episode|0|1|0"));
    }
}
