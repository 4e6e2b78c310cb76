//! JSON bodies exchanged with the relay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Note;

/// Request header carrying the account's sync code
pub const SYNC_CODE_HEADER: &str = "X-Sync-Code";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub sync_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesResponse {
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub notes: Vec<Note>,
    /// The client's previous sync marker; absent, `null`, and `""` all mean never
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_sync: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub notes: Vec<Note>,
    pub last_sync: DateTime<Utc>,
}

fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|timestamp| Some(timestamp.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_request_accepts_missing_null_and_empty_last_sync() {
        for raw in [
            r#"{"notes": []}"#,
            r#"{"notes": [], "lastSync": null}"#,
            r#"{"notes": [], "lastSync": ""}"#,
        ] {
            let request: SyncRequest = serde_json::from_str(raw).unwrap();
            assert!(request.last_sync.is_none(), "{raw}");
        }
    }

    #[test]
    fn sync_request_parses_rfc3339_last_sync() {
        let request: SyncRequest =
            serde_json::from_str(r#"{"notes": [], "lastSync": "2025-01-02T03:04:05+02:00"}"#)
                .unwrap();
        let last_sync = request.last_sync.unwrap();
        assert_eq!(last_sync.to_rfc3339(), "2025-01-02T01:04:05+00:00");
    }

    #[test]
    fn sync_request_rejects_garbage_last_sync() {
        let result = serde_json::from_str::<SyncRequest>(r#"{"lastSync": "yesterday"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn register_response_uses_camel_case() {
        let body = serde_json::to_string(&RegisterResponse {
            sync_code: "AB12 CD34 EF56 GH78".to_string(),
        })
        .unwrap();
        assert_eq!(body, r#"{"syncCode":"AB12 CD34 EF56 GH78"}"#);
    }
}
