use serde::Serialize;
use serde_json::{Map, Value};

/// Body of `POST /rest/api/2/issue/`.
#[derive(Debug, Serialize)]
pub struct CreateIssuePayload {
    pub fields: Map<String, Value>,
}

/// Raw answer to one issue-creation call. The status is not interpreted.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub status: u16,
    pub body: String,
}
