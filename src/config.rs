//! Process configuration from environment variables

use crate::dialogue::RecordFaq;
use chrono::FixedOffset;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_WHATSAPP_API_BASE: &str = "https://graph.facebook.com/v18.0";
const DEFAULT_SHEETS_RANGE: &str = "ListadoConsultas!A:J";
/// America/Montevideo has no DST
const DEFAULT_SHEETS_OFFSET_MINUTES: &str = "-180";
const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub api_base: String,
    pub phone_id: String,
    pub access_token: String,
}

/// How the spreadsheet recorder obtains bearer tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetsAuth {
    /// Service account key file; tokens are minted and refreshed from it
    ServiceAccount(PathBuf),
    /// Pre-issued token, used as-is until it expires
    AccessToken(String),
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub auth: SheetsAuth,
    pub range: String,
    pub utc_offset: FixedOffset,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    /// `None` rejects every verification attempt
    pub verify_token: Option<String>,
    /// `None` rejects every admin request
    pub api_key: Option<String>,
    /// `None` logs replies instead of sending them
    pub whatsapp: Option<WhatsAppConfig>,
    /// `None` disables the spreadsheet recorder
    pub sheets: Option<SheetsConfig>,
    pub record_faq: RecordFaq,
    pub outbound_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let db_path = var("BOT_DB_PATH").map_or_else(
            || {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".whatsapp-menu-bot/consultas.db")
            },
            PathBuf::from,
        );

        let whatsapp = match (var("WHATSAPP_PHONE_ID"), var("WHATSAPP_ACCESS_TOKEN")) {
            (Some(phone_id), Some(access_token)) => Some(WhatsAppConfig {
                api_base: var("WHATSAPP_API_BASE")
                    .unwrap_or_else(|| DEFAULT_WHATSAPP_API_BASE.to_string()),
                phone_id,
                access_token,
            }),
            _ => None,
        };

        let raw_offset = var("SHEETS_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|| DEFAULT_SHEETS_OFFSET_MINUTES.to_string());
        let minutes: i32 = parse_number("SHEETS_UTC_OFFSET_MINUTES", &raw_offset)?;
        let utc_offset =
            crate::sheets::offset_from_minutes(minutes).ok_or(ConfigError::Invalid {
                name: "SHEETS_UTC_OFFSET_MINUTES",
                value: raw_offset,
                reason: "offset must be less than a day",
            })?;

        // A key file wins over a bare token when both are set
        let sheets_auth = var("GOOGLE_SHEETS_CREDENTIALS_FILE")
            .map(|path| SheetsAuth::ServiceAccount(PathBuf::from(path)))
            .or_else(|| var("GOOGLE_SHEETS_ACCESS_TOKEN").map(SheetsAuth::AccessToken));

        let sheets = match (var("GOOGLE_SHEETS_ID"), sheets_auth) {
            (Some(spreadsheet_id), Some(auth)) => Some(SheetsConfig {
                spreadsheet_id,
                auth,
                range: var("GOOGLE_SHEETS_RANGE")
                    .unwrap_or_else(|| DEFAULT_SHEETS_RANGE.to_string()),
                utc_offset,
            }),
            _ => None,
        };

        let record_faq = match var("RECORD_FAQ_REPLIES") {
            Some(raw) => {
                if parse_bool("RECORD_FAQ_REPLIES", &raw)? {
                    RecordFaq::Record
                } else {
                    RecordFaq::Skip
                }
            }
            None => RecordFaq::default(),
        };

        let outbound_timeout = match var("OUTBOUND_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = parse_number("OUTBOUND_TIMEOUT_SECS", &raw)?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: "OUTBOUND_TIMEOUT_SECS",
                        value: raw,
                        reason: "must be at least 1",
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_OUTBOUND_TIMEOUT_SECS),
        };

        Ok(Self {
            port,
            db_path,
            verify_token: var("VERIFY_TOKEN"),
            api_key: var("API_KEY"),
            whatsapp,
            sheets,
            record_faq,
            outbound_timeout,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: "not a number in range",
    })
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "expected true or false",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = config_from(&[("HOME", "/home/bot")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(
            config.db_path,
            PathBuf::from("/home/bot/.whatsapp-menu-bot/consultas.db")
        );
        assert!(config.verify_token.is_none());
        assert!(config.api_key.is_none());
        assert!(config.whatsapp.is_none());
        assert!(config.sheets.is_none());
        assert_eq!(config.record_faq, RecordFaq::Skip);
        assert_eq!(config.outbound_timeout, Duration::from_secs(10));
    }

    #[test]
    fn full_configuration() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("BOT_DB_PATH", "/data/bot.db"),
            ("VERIFY_TOKEN", "verify-me"),
            ("API_KEY", "secret"),
            ("WHATSAPP_PHONE_ID", "123"),
            ("WHATSAPP_ACCESS_TOKEN", "wa-token"),
            ("GOOGLE_SHEETS_ID", "sheet"),
            ("GOOGLE_SHEETS_CREDENTIALS_FILE", "/secrets/sheets.json"),
            ("SHEETS_UTC_OFFSET_MINUTES", "60"),
            ("RECORD_FAQ_REPLIES", "TRUE"),
            ("OUTBOUND_TIMEOUT_SECS", "3"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from("/data/bot.db"));
        assert_eq!(config.verify_token.as_deref(), Some("verify-me"));
        assert_eq!(config.api_key.as_deref(), Some("secret"));

        let whatsapp = config.whatsapp.unwrap();
        assert_eq!(whatsapp.api_base, "https://graph.facebook.com/v18.0");
        assert_eq!(whatsapp.phone_id, "123");

        let sheets = config.sheets.unwrap();
        assert_eq!(
            sheets.auth,
            SheetsAuth::ServiceAccount(PathBuf::from("/secrets/sheets.json"))
        );
        assert_eq!(sheets.range, "ListadoConsultas!A:J");
        assert_eq!(sheets.utc_offset.local_minus_utc(), 3600);

        assert_eq!(config.record_faq, RecordFaq::Record);
        assert_eq!(config.outbound_timeout, Duration::from_secs(3));
    }

    #[test]
    fn default_sheet_offset_is_montevideo() {
        let config = config_from(&[
            ("GOOGLE_SHEETS_ID", "sheet"),
            ("GOOGLE_SHEETS_ACCESS_TOKEN", "sheets-token"),
        ])
        .unwrap();
        assert_eq!(config.sheets.unwrap().utc_offset.local_minus_utc(), -10_800);
    }

    #[test]
    fn sheets_credentials_file_takes_precedence_over_token() {
        let both = config_from(&[
            ("GOOGLE_SHEETS_ID", "sheet"),
            ("GOOGLE_SHEETS_ACCESS_TOKEN", "sheets-token"),
            ("GOOGLE_SHEETS_CREDENTIALS_FILE", "/secrets/sheets.json"),
        ])
        .unwrap();
        assert_eq!(
            both.sheets.unwrap().auth,
            SheetsAuth::ServiceAccount(PathBuf::from("/secrets/sheets.json"))
        );

        let token_only = config_from(&[
            ("GOOGLE_SHEETS_ID", "sheet"),
            ("GOOGLE_SHEETS_ACCESS_TOKEN", "sheets-token"),
        ])
        .unwrap();
        assert_eq!(
            token_only.sheets.unwrap().auth,
            SheetsAuth::AccessToken("sheets-token".to_string())
        );
    }

    #[test]
    fn partial_credentials_disable_the_integration() {
        let config = config_from(&[
            ("WHATSAPP_PHONE_ID", "123"),
            ("GOOGLE_SHEETS_CREDENTIALS_FILE", "/secrets/sheets.json"),
            ("VERIFY_TOKEN", "  "),
        ])
        .unwrap();
        assert!(config.whatsapp.is_none());
        assert!(config.sheets.is_none());
        assert!(config.verify_token.is_none());
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("PORT", "70000")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("RECORD_FAQ_REPLIES", "maybe")]),
            Err(ConfigError::Invalid { name: "RECORD_FAQ_REPLIES", .. })
        ));
        assert!(matches!(
            config_from(&[("OUTBOUND_TIMEOUT_SECS", "0")]),
            Err(ConfigError::Invalid { name: "OUTBOUND_TIMEOUT_SECS", .. })
        ));
        assert!(matches!(
            config_from(&[("SHEETS_UTC_OFFSET_MINUTES", "100000")]),
            Err(ConfigError::Invalid { name: "SHEETS_UTC_OFFSET_MINUTES", .. })
        ));
    }
}
