use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::SourceError;

use super::types::Issue;

const USER_AGENT: &str = concat!("issuemap/", env!("CARGO_PKG_VERSION"));

/// Where the issue list lives
#[derive(Debug, Clone, PartialEq)]
pub enum IssueLocation {
    File(PathBuf),
    Http(String),
}

impl IssueLocation {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            IssueLocation::Http(source.to_string())
        } else {
            IssueLocation::File(PathBuf::from(source))
        }
    }
}

/// Issue list client (local file or HTTP endpoint)
pub struct IssueClient {
    client: Client,
    location: IssueLocation,
}

impl IssueClient {
    pub fn new(location: IssueLocation) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, location })
    }

    pub fn location(&self) -> &IssueLocation {
        &self.location
    }

    /// Fetch and decode the full issue list
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Vec<Issue>, SourceError> {
        let body = match &self.location {
            IssueLocation::File(path) => {
                debug!(path = ?path, "Reading issues");
                tokio::fs::read(path).await?
            }
            IssueLocation::Http(url) => {
                debug!(url, "Fetching issues");
                let response = self.client.get(url).send().await?;

                if !response.status().is_success() {
                    return Err(SourceError::HttpStatus(response.status()));
                }

                response.bytes().await?.to_vec()
            }
        };

        decode_issues(&body)
    }
}

/// Decode an issue payload.
///
/// Accepts a bare array or `{"issues": [...]}`. Records that do not decode
/// are skipped so one bad row does not hide the rest.
pub fn decode_issues(body: &[u8]) -> Result<Vec<Issue>, SourceError> {
    let payload: Value = serde_json::from_slice(body)?;

    let records = match payload {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("issues") {
            Some(Value::Array(records)) => records,
            _ => return Err(SourceError::UnexpectedPayload),
        },
        _ => return Err(SourceError::UnexpectedPayload),
    };

    let total = records.len();
    let issues: Vec<Issue> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(issue) => Some(issue),
            Err(e) => {
                warn!(index, error = %e, "Skipping undecodable issue record");
                None
            }
        })
        .collect();

    debug!(count = issues.len(), skipped = total - issues.len(), "Decoded issues");
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse() {
        assert_eq!(
            IssueLocation::parse("https://api.example.org/issues"),
            IssueLocation::Http("https://api.example.org/issues".into())
        );
        assert_eq!(
            IssueLocation::parse("data/issues.json"),
            IssueLocation::File(PathBuf::from("data/issues.json"))
        );
    }

    #[test]
    fn test_decode_array_and_wrapped() {
        let bare = br#"[{"id": 1, "lat": 12.97, "lng": 77.59, "type": "garbage"}]"#;
        assert_eq!(decode_issues(bare).unwrap().len(), 1);

        let wrapped = br#"{"issues": [{"id": 1}, {"id": 2}]}"#;
        assert_eq!(decode_issues(wrapped).unwrap().len(), 2);
    }

    #[test]
    fn test_decode_skips_bad_records() {
        let body = br#"[
            {"id": 1, "lat": 12.97, "lng": 77.59},
            {"title": "no id"},
            {"id": [1, 2]},
            {"id": 4, "lat": null, "lng": 77.60}
        ]"#;

        let issues = decode_issues(body).unwrap();
        let ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_decode_rejects_unexpected_payload() {
        assert!(matches!(
            decode_issues(br#"{"data": []}"#),
            Err(SourceError::UnexpectedPayload)
        ));
        assert!(matches!(decode_issues(b"42"), Err(SourceError::UnexpectedPayload)));
        assert!(matches!(decode_issues(b"not json"), Err(SourceError::Json(_))));
    }

    #[test]
    fn test_fetch_from_file() {
        let path = std::env::temp_dir().join(format!("issuemap-client-{}.json", std::process::id()));
        std::fs::write(&path, br#"[{"id": 1, "lat": 12.97, "lng": 77.59}]"#).unwrap();

        let client = IssueClient::new(IssueLocation::File(path.clone())).unwrap();
        let issues = tokio_test::block_on(client.fetch()).unwrap();
        assert_eq!(issues.len(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_fetch_missing_file() {
        let client = IssueClient::new(IssueLocation::File(PathBuf::from(
            "/nonexistent/issuemap/issues.json",
        )))
        .unwrap();

        let err = tokio_test::block_on(client.fetch()).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
        assert!(!err.is_recoverable());
    }
}
