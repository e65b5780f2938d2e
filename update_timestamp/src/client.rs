//! The two HTTP calls made against the PocketBase backend.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::{ActionError, Result};

const USER_AGENT: &str = "pocketbase-action";
const LOGIN_PATH: &str = "api/collections/_superusers/auth-with-password";

#[derive(Serialize, Debug)]
struct LoginRequest<'a> {
    identity: &'a str,
    password: &'a str,
}

#[derive(Deserialize, Debug)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UpdatePayload {
    last_update: String,
}

/// Renders a timestamp the way the backend stores `lastUpdate`:
/// RFC 3339, UTC, millisecond precision, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn login_url(base_url: &Url) -> Result<Url> {
    join(base_url, LOGIN_PATH)
}

pub fn record_url(base_url: &Url, collection_id: &str, record_id: &str) -> Result<Url> {
    join(
        base_url,
        &format!("api/collections/{}/records/{}", collection_id, record_id),
    )
}

fn join(base_url: &Url, path: &str) -> Result<Url> {
    base_url
        .join(path)
        .map_err(|e| ActionError::configuration(format!("Cannot build URL for {}: {}", path, e)))
}

pub struct PocketBaseClient {
    http: Client,
}

impl PocketBaseClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }

    /// Exchanges identity and password for a token. Exactly one request, no retry.
    pub async fn login(&self, base_url: &Url, identity: &str, password: &str) -> Result<String> {
        let url = login_url(base_url)?;

        let response = self
            .http
            .post(url)
            .json(&LoginRequest { identity, password })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ActionError::Authentication {
                status: status.as_u16(),
            });
        }

        // A body that is not JSON, or JSON without a token, is treated the same.
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|_| ActionError::MissingToken)?;

        body.token
            .filter(|t| !t.is_empty())
            .ok_or(ActionError::MissingToken)
    }

    /// Sets the record's `lastUpdate` field to `at`.
    ///
    /// The token goes into the `authorization` header as-is, without a scheme
    /// prefix; that is what PocketBase expects.
    pub async fn update_last_update(
        &self,
        base_url: &Url,
        collection_id: &str,
        record_id: &str,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let url = record_url(base_url, collection_id, record_id)?;

        let response = self
            .http
            .patch(url)
            .header(reqwest::header::AUTHORIZATION, token)
            .json(&UpdatePayload {
                last_update: format_timestamp(at),
            })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ActionError::Update {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> Url {
        Url::parse("https://pb.example.com/").unwrap()
    }

    #[test]
    fn timestamp_has_millis_and_z() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 5).unwrap();
        assert_eq!(format_timestamp(at), "2026-10-19T12:00:05.000Z");
    }

    #[test]
    fn urls_are_joined_onto_base() {
        assert_eq!(
            login_url(&base()).unwrap().as_str(),
            "https://pb.example.com/api/collections/_superusers/auth-with-password"
        );
        assert_eq!(
            record_url(&base(), "c1", "r1").unwrap().as_str(),
            "https://pb.example.com/api/collections/c1/records/r1"
        );
    }

    #[test]
    fn subpath_base_is_kept() {
        let base = Url::parse("https://host.example/pb/").unwrap();
        assert_eq!(
            record_url(&base, "c1", "r1").unwrap().as_str(),
            "https://host.example/pb/api/collections/c1/records/r1"
        );
    }

    #[test]
    fn payload_uses_camel_case() {
        let payload = UpdatePayload {
            last_update: "2026-10-19T12:00:05.000Z".into(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({ "lastUpdate": "2026-10-19T12:00:05.000Z" })
        );
    }
}
