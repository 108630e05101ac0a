use crate::api::jira::JiraClient;
use crate::config::settings::Settings;
use crate::errors::{BulkError, Result};
use crate::models::fields::{convert_row, ConversionKind};
use crate::models::issue::CreateIssuePayload;
use crate::models::row::Row;
use colored::*;
use std::collections::HashMap;

/// Sends normalized rows to Jira one at a time.
pub struct Submitter<'a> {
    client: &'a JiraClient,
    conversions: &'a HashMap<String, ConversionKind>,
    step: bool,
}

impl<'a> Submitter<'a> {
    pub fn new(
        client: &'a JiraClient,
        conversions: &'a HashMap<String, ConversionKind>,
        step: bool,
    ) -> Self {
        Self {
            client,
            conversions,
            step,
        }
    }

    /// Returns the number of rows posted.
    ///
    /// The first conversion or transport error stops the loop; rows before it
    /// have already been created in Jira.
    pub async fn submit_all(&self, rows: &[Row]) -> Result<usize> {
        for (i, row) in rows.iter().enumerate() {
            let fields = convert_row(row, self.conversions)?;
            let payload = CreateIssuePayload { fields };

            tracing::debug!(
                row = i,
                payload = ?payload.fields,
                "will send"
            );
            if self.step {
                confirm(&format!("Send row {}?", i))?;
            }

            let outcome = self.client.create_issue(&payload).await?;

            tracing::debug!(row = i, status = outcome.status, body = %outcome.body, "response");
            println!(
                "{}",
                format!("  Row {} sent (HTTP {})", i, outcome.status).dimmed()
            );
        }

        Ok(rows.len())
    }
}

/// Logs in once, then submits every row with the same session.
pub async fn create_issues(settings: &Settings, rows: &[Row], step: bool) -> Result<usize> {
    let client = JiraClient::new(settings.jira.url.clone(), settings.jira.insecure)?;

    println!("{}", "  Logging in to Jira...".dimmed());
    client
        .login(&settings.jira.user, &settings.jira.password)
        .await?;
    println!("{}", "  ✓ Logged in".green());

    println!("{}", "  Creating issues...".dimmed());
    Submitter::new(&client, &settings.columns.conversions, step)
        .submit_all(rows)
        .await
}

/// Asks the operator to continue; declining aborts the run.
pub fn confirm(prompt: &str) -> Result<()> {
    let proceed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()?;

    if proceed {
        Ok(())
    } else {
        Err(BulkError::Aborted)
    }
}
