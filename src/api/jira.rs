use crate::errors::{BulkError, Result};
use crate::models::issue::{CreateIssuePayload, SubmissionOutcome};
use reqwest::{redirect, Client, StatusCode};

/// Session-cookie client for a Jira Server instance.
///
/// Every request goes through the same `reqwest::Client`, so the cookie set
/// by [`JiraClient::login`] is sent with each later call.
pub struct JiraClient {
    client: Client,
    base_url: String,
}

impl JiraClient {
    pub fn new(base_url: String, insecure: bool) -> Result<Self> {
        if insecure {
            tracing::warn!(%base_url, "TLS certificate validation is disabled");
        }

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .danger_accept_invalid_certs(insecure)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub async fn login(&self, user: &str, password: &str) -> Result<()> {
        let url = format!("{}/login.jsp", self.base_url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("os_username", user),
                ("os_password", password),
                ("login", "Log In"),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "login response");

        if status != StatusCode::OK && status != StatusCode::FOUND {
            let text = response.text().await?;
            return Err(BulkError::JiraLoginFailed(status.as_u16(), text));
        }

        Ok(())
    }

    /// Posts one issue. The response status is returned as-is, not checked.
    pub async fn create_issue(&self, payload: &CreateIssuePayload) -> Result<SubmissionOutcome> {
        let url = format!("{}/rest/api/2/issue/", self.base_url);

        let response = self.client.post(&url).json(payload).send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(SubmissionOutcome { status, body })
    }
}
