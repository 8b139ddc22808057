//! Blocking REST client for the kiosk backend.
//!
//! One method per backend operation; nothing is retried. Every failure is
//! terminal for the single user action that triggered it, and maps onto the
//! three-way [`ApiError`] taxonomy the console dispatches on.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use ureq::Agent;

use crate::api::types::{
    Attachment, CreatedEntry, Entity, ErrorBody, LineItem, NewEntry, ScaleReading,
};

/// Filename used when the export response carries no usable
/// content-disposition header.
pub const DEFAULT_EXPORT_NAME: &str = "data_export.xlsx";

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure modes of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Lookup failure: the backend does not know the requested resource.
    NotFound,
    /// The backend refused the operation and reported a message.
    Rejected(String),
    /// Network or decode failure.
    Transport(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "not found"),
            ApiError::Rejected(message) => write!(f, "{message}"),
            ApiError::Transport(message) => write!(f, "backend unreachable: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Backend operations the console depends on.
///
/// [`ApiClient`] is the live implementation; tests substitute a recording
/// mock so dispatch behavior can be asserted without a server.
pub trait Backend {
    fn ping(&self) -> ApiResult<()>;
    fn scale(&self) -> ApiResult<ScaleReading>;
    fn entity(&self, code: &str) -> ApiResult<Entity>;
    fn create_entry(&self, entry: &NewEntry) -> ApiResult<CreatedEntry>;
    fn entries(&self, date: Option<NaiveDate>) -> ApiResult<Vec<LineItem>>;
    fn update_quantity(&self, id: u64, quantity: i64) -> ApiResult<()>;
    fn update_comment(&self, id: u64, comment: &str) -> ApiResult<()>;
    fn delete_entry(&self, id: u64) -> ApiResult<()>;
    fn download(&self) -> ApiResult<Attachment>;
    fn quit(&self) -> ApiResult<()>;
}

/// HTTP client bound to a fixed backend origin.
pub struct ApiClient {
    agent: Agent,
    base_url: String,
}

impl ApiClient {
    pub fn new(server_url: &str) -> Self {
        // Non-2xx responses are part of the contract (not-found lookups,
        // rejected submissions), so they must not surface as ureq errors.
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(HTTP_TIMEOUT))
            .build();

        Self {
            agent: Agent::new_with_config(config),
            base_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

impl Backend for ApiClient {
    fn ping(&self) -> ApiResult<()> {
        let res = self.agent.get(self.url("ping").as_str()).call()?;
        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Transport(format!("ping returned HTTP {status}")))
        }
    }

    fn scale(&self) -> ApiResult<ScaleReading> {
        let mut res = self.agent.get(self.url("scale").as_str()).call()?;
        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!("scale returned HTTP {status}")));
        }
        res.body_mut().read_json::<ScaleReading>().map_err(Into::into)
    }

    fn entity(&self, code: &str) -> ApiResult<Entity> {
        let mut res = self
            .agent
            .get(self.url(&format!("entity/{code}")).as_str())
            .call()?;
        if !res.status().is_success() {
            return Err(ApiError::NotFound);
        }
        res.body_mut().read_json::<Entity>().map_err(Into::into)
    }

    fn create_entry(&self, entry: &NewEntry) -> ApiResult<CreatedEntry> {
        let mut res = self.agent.post(self.url("input").as_str()).send_json(entry)?;
        let status = res.status();
        if status.is_success() {
            res.body_mut().read_json::<CreatedEntry>().map_err(Into::into)
        } else {
            let body: ErrorBody = res.body_mut().read_json().unwrap_or_default();
            Err(ApiError::Rejected(body.erreur.unwrap_or_else(|| {
                format!("entry rejected (HTTP {})", status.as_u16())
            })))
        }
    }

    fn entries(&self, date: Option<NaiveDate>) -> ApiResult<Vec<LineItem>> {
        let path = match date {
            Some(date) => format!("input/{}", date.format("%Y-%m-%d")),
            None => "input".to_string(),
        };
        let mut res = self.agent.get(self.url(&path).as_str()).call()?;
        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!(
                "entry list returned HTTP {status}"
            )));
        }
        res.body_mut().read_json::<Vec<LineItem>>().map_err(Into::into)
    }

    fn update_quantity(&self, id: u64, quantity: i64) -> ApiResult<()> {
        self.update(id, serde_json::json!({ "quantity": quantity }))
    }

    fn update_comment(&self, id: u64, comment: &str) -> ApiResult<()> {
        self.update(id, serde_json::json!({ "comment": comment }))
    }

    fn delete_entry(&self, id: u64) -> ApiResult<()> {
        let res = self
            .agent
            .delete(self.url(&format!("input/{id}")).as_str())
            .call()?;
        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Rejected(format!(
                "delete rejected (HTTP {})",
                status.as_u16()
            )))
        }
    }

    fn download(&self) -> ApiResult<Attachment> {
        let mut res = self.agent.get(self.url("download").as_str()).call()?;
        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Rejected(format!(
                "download rejected (HTTP {})",
                status.as_u16()
            )));
        }

        let filename = attachment_filename(
            res.headers()
                .get("content-disposition")
                .and_then(|value| value.to_str().ok()),
        );
        let bytes = res.body_mut().read_to_vec()?;
        Ok(Attachment { filename, bytes })
    }

    fn quit(&self) -> ApiResult<()> {
        let res = self.agent.get(self.url("quit").as_str()).call()?;
        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Transport(format!("quit returned HTTP {status}")))
        }
    }
}

impl ApiClient {
    fn update(&self, id: u64, body: serde_json::Value) -> ApiResult<()> {
        let mut res = self
            .agent
            .put(self.url(&format!("input/{id}")).as_str())
            .send_json(&body)?;
        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            let payload: ErrorBody = res.body_mut().read_json().unwrap_or_default();
            Err(ApiError::Rejected(payload.erreur.unwrap_or_else(|| {
                format!("update rejected (HTTP {})", status.as_u16())
            })))
        }
    }
}

static FILENAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"filename[^;=\n]*=\s*(?:"([^"\n]*)"|'([^'\n]*)'|([^;\n]*))"#)
        .expect("content-disposition filename pattern")
});

/// Extract the attachment filename from a content-disposition header,
/// falling back to [`DEFAULT_EXPORT_NAME`] when the header is absent or
/// carries no usable name.
pub fn attachment_filename(header: Option<&str>) -> String {
    let name = header
        .and_then(|header| FILENAME_PATTERN.captures(header))
        .and_then(|captures| {
            captures
                .get(1)
                .or_else(|| captures.get(2))
                .or_else(|| captures.get(3))
        })
        .map(|name| name.as_str().trim().to_string())
        .unwrap_or_default();

    if name.is_empty() {
        DEFAULT_EXPORT_NAME.to_string()
    } else {
        name
    }
}
