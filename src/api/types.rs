//! API request and response types

use crate::db::InteractionRecord;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;
pub const DEFAULT_PURGE_DAYS: u32 = 30;

/// Query of the webhook verification handshake
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    /// `(page, limit)` with page ≥ 1 and limit in `1..=100`
    pub fn normalized(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        (page, limit)
    }
}

#[derive(Debug, Deserialize)]
pub struct PurgeQuery {
    pub dias: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ConsultasResponse {
    pub success: bool,
    pub data: Vec<InteractionRecord>,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub success: bool,
    pub message: String,
    pub deleted: usize,
}

#[derive(Debug, Serialize)]
pub struct ConversationEntry {
    pub sender: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationsResponse {
    pub success: bool,
    pub data: Vec<ConversationEntry>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults_and_clamps() {
        let query = |page, limit| PageQuery { page, limit }.normalized();

        assert_eq!(query(None, None), (1, 10));
        assert_eq!(query(Some(0), Some(0)), (1, 1));
        assert_eq!(query(Some(3), Some(500)), (3, 100));
    }
}
