/// API module for talking to Xray
///
/// This module provides the client used to import execution results and to
/// export datasets, for both Xray server/data-center (hosted inside Jira) and
/// Xray cloud.
use crate::convert::{XrayFormat, XrayReport};
use base64::{Engine as _, engine::general_purpose};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

const USER_AGENT: &str = concat!("bruno-xray/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Base URL of every Xray cloud instance
pub const CLOUD_URL: &str = "https://xray.cloud.getxray.app";

/// How the client authenticates
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Xray cloud API key pair, exchanged for a bearer token
    Cloud { client_id: String, client_secret: String },
    /// Jira server personal access token
    ServerToken { token: String },
    /// Jira server basic authentication
    ServerBasic { username: String, password: String },
}

impl Credentials {
    /// The report format the matching Xray deployment expects
    pub fn format(&self) -> XrayFormat {
        match self {
            Credentials::Cloud { .. } => XrayFormat::Cloud,
            Credentials::ServerToken { .. } | Credentials::ServerBasic { .. } => XrayFormat::Server,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Cloud { client_id, .. } => write!(f, "Cloud {{ client_id: {:?}, .. }}", client_id),
            Credentials::ServerToken { .. } => write!(f, "ServerToken {{ .. }}"),
            Credentials::ServerBasic { username, .. } => write!(f, "ServerBasic {{ username: {:?}, .. }}", username),
        }
    }
}

/// Errors returned by the Xray client
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read response: {0}")]
    Io(#[from] std::io::Error),
}

/// Response of the import endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportResponse {
    Server {
        #[serde(rename = "testExecIssue")]
        test_exec_issue: IssueRef,
    },
    Cloud(IssueRef),
}

impl ImportResponse {
    /// Key of the created or updated test execution issue
    pub fn key(&self) -> &str {
        match self {
            ImportResponse::Server { test_exec_issue } => &test_exec_issue.key,
            ImportResponse::Cloud(issue) => &issue.key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRef {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Client for one Xray instance
///
/// Construct one per invocation and pass it to whoever needs it; the underlying
/// agent keeps connections alive between requests.
pub struct XrayClient {
    agent: ureq::Agent,
    base_url: String,
    credentials: Credentials,
    cloud_token: RefCell<Option<String>>,
}

impl XrayClient {
    /// Create a client. Server credentials talk to `jira_url`, cloud credentials to [`CLOUD_URL`].
    pub fn new(credentials: Credentials, jira_url: &str) -> Self {
        let base_url = match credentials {
            Credentials::Cloud { .. } => CLOUD_URL.to_string(),
            _ => jira_url.trim_end_matches('/').to_string(),
        };
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).user_agent(USER_AGENT).build();
        Self { agent, base_url, credentials, cloud_token: RefCell::new(None) }
    }

    /// Point the client at a different host (e.g. a proxy in front of Xray cloud)
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn format(&self) -> XrayFormat {
        self.credentials.format()
    }

    /// Upload execution results.
    ///
    /// # Arguments
    /// * `report` - The converted results
    /// * `project_key` - Project in which new test execution issues are created
    pub fn import_execution(&self, report: &XrayReport, project_key: &str) -> Result<ImportResponse, ApiError> {
        let url = self.url(match self.format() {
            XrayFormat::Cloud => "/api/v2/import/execution",
            XrayFormat::Server => "/rest/raven/1.0/import/execution",
        });
        let body = serde_json::to_string(report)?;
        debug!("importing {} test(s) into {} via {}", report.tests.len(), project_key, url);

        let result = self
            .agent
            .post(&url)
            .query("projectKey", project_key)
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .set("Authorization", &self.authorization()?)
            .send_string(&body);
        let text = read_response(&url, result)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Export the dataset of a test issue as CSV text.
    pub fn download_dataset(&self, test_issue_key: &str) -> Result<String, ApiError> {
        let url = self.url(match self.format() {
            XrayFormat::Cloud => "/api/v2/dataset/export",
            XrayFormat::Server => "/rest/raven/2.0/api/dataset/export",
        });
        debug!("downloading dataset of {} from {}", test_issue_key, url);

        let result = self
            .agent
            .get(&url)
            .query("testIssueKey", test_issue_key)
            .set("Authorization", &self.authorization()?)
            .call();
        read_response(&url, result)
    }

    /// Value of the `Authorization` header for the configured credentials
    pub fn authorization(&self) -> Result<String, ApiError> {
        match &self.credentials {
            Credentials::ServerToken { token } => Ok(format!("Bearer {}", token)),
            Credentials::ServerBasic { username, password } => Ok(basic_authorization(username, password)),
            Credentials::Cloud { client_id, client_secret } => {
                if let Some(token) = self.cloud_token.borrow().as_ref() {
                    return Ok(format!("Bearer {}", token));
                }
                let token = self.authenticate(client_id, client_secret)?;
                *self.cloud_token.borrow_mut() = Some(token.clone());
                Ok(format!("Bearer {}", token))
            }
        }
    }

    fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<String, ApiError> {
        let url = self.url("/api/v2/authenticate");
        debug!("authenticating against {}", url);

        let body = serde_json::json!({ "client_id": client_id, "client_secret": client_secret });
        let result = self
            .agent
            .post(&url)
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .send_string(&body.to_string());
        let text = read_response(&url, result)?;
        // The token comes back as a JSON string literal
        Ok(serde_json::from_str::<String>(&text)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// `Basic` authorization header value
pub fn basic_authorization(username: &str, password: &str) -> String {
    format!("Basic {}", general_purpose::STANDARD.encode(format!("{}:{}", username, password)))
}

/// Accept only 200 responses and return their body
fn read_response(url: &str, result: Result<ureq::Response, ureq::Error>) -> Result<String, ApiError> {
    match result {
        Ok(response) if response.status() == 200 => Ok(response.into_string()?),
        Ok(response) => {
            let status = response.status();
            Err(ApiError::UnexpectedStatus { status, body: response.into_string().unwrap_or_default() })
        }
        Err(ureq::Error::Status(status, response)) => {
            Err(ApiError::UnexpectedStatus { status, body: response.into_string().unwrap_or_default() })
        }
        Err(ureq::Error::Transport(transport)) => {
            Err(ApiError::Transport { url: url.to_string(), message: transport.to_string() })
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
