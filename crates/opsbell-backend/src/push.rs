//! Client for the push broadcast REST API.

use opsbell_bridge::push::{PushHistoryItem, PushRequest, PushStats};
use serde_json::Value;
use url::Url;

use crate::endpoint::endpoint;

/// Errors that can occur while talking to the push broadcast API.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The broadcast is missing its title or body; nothing was sent.
    #[error("Please fill out both title and message")]
    Incomplete,
    /// The configured base URL or a derived route is not a valid URL.
    #[error("invalid push api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The request could not be performed or its response not decoded.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("{0}")]
    Rejected(String),
}

/// Extracts the reason a request was rejected from its JSON body.
fn rejection_reason(body: Option<&Value>) -> String {
    body.and_then(|body| {
        ["error", "message"]
            .iter()
            .find_map(|field| body.get(field)?.as_str())
    })
    .unwrap_or("Unknown error")
    .to_string()
}

#[derive(Debug, Clone)]
pub struct PushApiClient {
    client: reqwest::Client,
    base: Url,
}

impl PushApiClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, PushError> {
        Ok(Self {
            client,
            base: Url::parse(base_url)?,
        })
    }

    /// Checks that a broadcast has both a title and a body.
    pub fn validate(request: &PushRequest) -> Result<(), PushError> {
        if request.title.trim().is_empty() || request.body.trim().is_empty() {
            return Err(PushError::Incomplete);
        }
        Ok(())
    }

    fn route(&self, route: &str) -> Result<Url, PushError> {
        Ok(endpoint(&self.base, &format!("notifications/{route}"))?)
    }

    /// Sends a broadcast. Incomplete broadcasts are rejected before any
    /// request is made.
    pub async fn send(&self, request: &PushRequest) -> Result<(), PushError> {
        Self::validate(request)?;
        let response = self
            .client
            .post(self.route("send")?)
            .json(request)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn history(&self) -> Result<Vec<PushHistoryItem>, PushError> {
        let response = self.client.get(self.route("history")?).send().await?;
        let history: Option<Vec<PushHistoryItem>> = check(response).await?.json().await?;
        Ok(history.unwrap_or_default())
    }

    /// Sends the broadcast with the given identifier again.
    pub async fn resend(&self, id: &str) -> Result<(), PushError> {
        let mut url = self.route("resend")?;
        url.path_segments_mut()
            .map_err(|_| PushError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id);

        let response = self.client.post(url).send().await?;
        check(response).await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<PushStats, PushError> {
        let response = self.client.get(self.route("stats")?).send().await?;
        Ok(check(response).await?.json().await?)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, PushError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.json::<Value>().await.ok();
    let reason = rejection_reason(body.as_ref());
    log::warn!("Push api answered {status}: {reason}");
    Err(PushError::Rejected(reason))
}
