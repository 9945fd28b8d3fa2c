//! Google Drive v3 and Sheets v4 REST clients
//!
//! Both are thin blocking wrappers over a shared `ureq` agent that carries the
//! bearer token. Authentication itself happens elsewhere: the user supplies
//! an access token through the config file or environment.

pub mod drive;
pub mod sheets;

pub use drive::DriveClient;
pub use sheets::SheetsClient;

use crate::error::{Result, TidyError};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Characters kept as-is in a URL path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Longest response body excerpt carried into an error message
const MAX_ERROR_BODY: usize = 300;

pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Authorized request builder shared by both clients
#[derive(Clone)]
pub(crate) struct ApiClient {
    agent: ureq::Agent,
    bearer: String,
}

impl ApiClient {
    pub(crate) fn new(access_token: &str, timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .user_agent(concat!("drivetidy/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            bearer: format!("Bearer {}", access_token),
        }
    }

    pub(crate) fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &self.bearer)
    }
}

/// Turn a `ureq` outcome into a response or a [`TidyError::RemoteService`]
pub(crate) fn check(
    operation: &str,
    outcome: std::result::Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response> {
    match outcome {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            Err(TidyError::remote(operation, status_message(code, &body)))
        }
        Err(ureq::Error::Transport(transport)) => Err(TidyError::remote(operation, transport)),
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(operation: &str, response: ureq::Response) -> Result<T> {
    response
        .into_json()
        .map_err(|e| TidyError::remote(operation, format!("invalid response body: {}", e)))
}

fn status_message(code: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {}", code);
    }
    let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
    format!("HTTP {}: {}", code, excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("1AbC-d_e"), "1AbC-d_e");
        assert_eq!(encode_segment("'My Files'!A1"), "%27My%20Files%27%21A1");
    }

    #[test]
    fn test_status_message_truncates_body() {
        assert_eq!(status_message(404, ""), "HTTP 404");
        let long = "x".repeat(1000);
        let msg = status_message(500, &long);
        assert_eq!(msg.len(), "HTTP 500: ".len() + MAX_ERROR_BODY);
    }
}
