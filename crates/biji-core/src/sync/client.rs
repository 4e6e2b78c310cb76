//! HTTP client for the biji relay

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Note;

use super::wire::{NotesResponse, RegisterResponse, SyncRequest, SyncResponse, SYNC_CODE_HEADER};

const RELAY_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Clone)]
pub struct SyncClient {
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SyncClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SyncClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(&base_url.into())?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(RELAY_HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a new account and return its sync code
    pub async fn register(&self) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/register", self.base_url))
            .header("Accept", "application/json")
            .send()
            .await?;
        let payload = check_status(response)
            .await?
            .json::<RegisterResponse>()
            .await?;
        Ok(payload.sync_code)
    }

    pub async fn fetch_notes(&self, sync_code: &str) -> Result<Vec<Note>> {
        let response = self
            .client
            .get(format!("{}/api/notes", self.base_url))
            .header(SYNC_CODE_HEADER, require_code(sync_code)?)
            .header("Accept", "application/json")
            .send()
            .await?;
        let payload = check_status(response)
            .await?
            .json::<NotesResponse>()
            .await?;
        Ok(payload.notes)
    }

    /// Upload `notes` and return the relay's reconciled set
    pub async fn push(
        &self,
        sync_code: &str,
        notes: Vec<Note>,
        last_sync: Option<DateTime<Utc>>,
    ) -> Result<SyncResponse> {
        let response = self
            .client
            .post(format!("{}/api/sync", self.base_url))
            .header(SYNC_CODE_HEADER, require_code(sync_code)?)
            .json(&SyncRequest { notes, last_sync })
            .send()
            .await?;
        Ok(check_status(response).await?.json::<SyncResponse>().await?)
    }
}

fn require_code(sync_code: &str) -> Result<&str> {
    let sync_code = sync_code.trim();
    if sync_code.is_empty() {
        Err(Error::Unauthorized)
    } else {
        Ok(sync_code)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: Option<String>,
}

fn status_error(status: StatusCode, body: &str) -> Error {
    let message = parse_api_error(status, body);
    match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized,
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::BAD_REQUEST => Error::MalformedInput(message),
        _ => Error::Http(message),
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(RelayErrorBody {
        error: Some(message),
    }) = serde_json::from_str::<RelayErrorBody>(body)
    {
        return format!("{} ({})", message.trim(), status.as_u16());
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(Error::MalformedInput(
            "relay URL must not be empty".to_string(),
        ));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::MalformedInput(
            "relay URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url("").is_err());
        assert!(normalize_base_url("relay.example.com").is_err());
        assert_eq!(
            normalize_base_url(" https://relay.example.com/ ").unwrap(),
            "https://relay.example.com"
        );
    }

    #[test]
    fn parse_api_error_prefers_json_message() {
        let message = parse_api_error(StatusCode::NOT_FOUND, r#"{"error":"Account not found"}"#);
        assert_eq!(message, "Account not found (404)");
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down (502)"
        );
    }

    #[test]
    fn status_error_maps_taxonomy() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            Error::Unauthorized
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, ""),
            Error::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, ""),
            Error::MalformedInput(_)
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, ""),
            Error::Http(_)
        ));
    }

    #[tokio::test]
    async fn requests_without_sync_code_fail_locally() {
        let client = SyncClient::new("http://127.0.0.1:9").unwrap();
        let error = client.fetch_notes("  ").await.unwrap_err();
        assert!(matches!(error, Error::Unauthorized));
    }
}
