//! Google Sheets interaction recorder
//!
//! Appends one row per interaction through the `values:append` REST call.
//! Date and time columns are rendered at a fixed UTC offset.

pub mod auth;

use crate::db::InteractionRecord;
use crate::runtime::{DeliveryError, InteractionRecorder};
use async_trait::async_trait;
use auth::TokenProvider;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Error)]
pub enum SheetsSetupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("invalid Sheets endpoint: {0}")]
    Endpoint(String),
}

#[derive(Serialize)]
struct AppendRequest {
    values: Vec<Vec<Value>>,
}

pub struct SheetsRecorder {
    client: Client,
    endpoint: Url,
    tokens: Arc<dyn TokenProvider>,
    offset: FixedOffset,
}

impl SheetsRecorder {
    pub fn new(
        spreadsheet_id: &str,
        range: &str,
        tokens: Arc<dyn TokenProvider>,
        offset: FixedOffset,
        timeout: Duration,
    ) -> Result<Self, SheetsSetupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: append_url(SHEETS_API_BASE, spreadsheet_id, range)?,
            tokens,
            offset,
        })
    }
}

fn append_url(api_base: &str, spreadsheet_id: &str, range: &str) -> Result<Url, SheetsSetupError> {
    let mut url = Url::parse(api_base).map_err(|e| SheetsSetupError::Endpoint(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| SheetsSetupError::Endpoint(api_base.to_string()))?
        .pop_if_empty()
        .extend([spreadsheet_id, "values", format!("{range}:append").as_str()]);
    url.query_pairs_mut()
        .append_pair("valueInputOption", "RAW")
        .append_pair("insertDataOption", "INSERT_ROWS");
    Ok(url)
}

/// `[phone, name, date, message, context, state, time, time, 1]`
///
/// The repeated time and trailing count feed the sheet's first-seen,
/// last-seen and message-count columns.
fn row(record: &InteractionRecord, offset: FixedOffset) -> Vec<Value> {
    let local: DateTime<FixedOffset> = record.recorded_at.with_timezone(&offset);
    let date = local.format("%-d/%-m/%Y").to_string();
    let time = local.format("%H:%M:%S").to_string();

    vec![
        json!(record.sender),
        json!(record.display_name),
        json!(date),
        json!(record.message),
        json!(record.context),
        json!(record.state_label),
        json!(time),
        json!(time),
        json!(1),
    ]
}

/// Offset from whole minutes east of UTC
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

#[async_trait]
impl InteractionRecorder for SheetsRecorder {
    async fn record(&self, record: &InteractionRecord) -> Result<(), DeliveryError> {
        let body = AppendRequest {
            values: vec![row(record, self.offset)],
        };

        let token = self
            .tokens
            .token()
            .await
            .map_err(|e| DeliveryError::Credentials(e.to_string()))?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(sender = %record.sender, "Row appended to sheet");
        Ok(())
    }

    fn name(&self) -> &str {
        "sheets"
    }
}
