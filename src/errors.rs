use colored::*;
use std::fmt;

#[derive(Debug)]
pub enum BulkError {
    // Configuration errors
    ConfigInvalid(String),
    MissingSetting(&'static str),
    UnknownConversion { field: String, kind: String },

    // Input errors
    InputRead(String),
    CsvInvalid(String),
    MissingHeader,
    ColumnCountMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },

    // Conversion errors
    InvalidNumber { field: String, value: String },

    // Jira errors
    JiraLoginFailed(u16, String),

    // Network errors
    NetworkError(String),

    // Operator declined a --step prompt
    Aborted,

    // Generic error
    Other(String),
}

impl fmt::Display for BulkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Configuration errors
            BulkError::ConfigInvalid(msg) => {
                write!(f, "{}\n", "Invalid configuration".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check the command line flags: {}\n", "jira-bulk-create --help".green())?;
                write!(f, "   2. Or check the file passed with --config")
            }
            BulkError::MissingSetting(name) => {
                write!(f, "{}\n", format!("Missing required setting '{}'", name).red().bold())?;
                write!(f, "   {}\n\n", "It was given neither on the command line nor in the config file".dimmed())?;
                write!(f, "   To fix: pass {}", format!("--{}", name.replace('_', "-")).green())
            }
            BulkError::UnknownConversion { field, kind } => {
                write!(f, "{}\n", format!("Type {} not defined", kind).red().bold())?;
                write!(f, "   {}\n\n", format!("Declared for field '{}'", field).dimmed())?;
                write!(f, "   Known types: MultiSelect, MultiUserPicker, NumberField, SelectList, UserPicker")
            }

            // Input errors
            BulkError::InputRead(msg) => {
                write!(f, "{}\n", "Could not read input file".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }
            BulkError::CsvInvalid(msg) => {
                write!(f, "{}\n", "Malformed CSV input".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check --csv-column-separator matches the file\n")?;
                write!(f, "   2. Check --input-file-encoding matches the file")
            }
            BulkError::MissingHeader => {
                write!(f, "{}\n", "Input file has no header line".red().bold())?;
                write!(f, "   {}", "The first CSV line must name the columns".dimmed())
            }
            BulkError::ColumnCountMismatch { line, expected, found } => {
                write!(f, "{}\n", format!("Line {} has {} columns, header has {}", line, found, expected).red().bold())?;
                write!(f, "   {}", "Every data line must have as many columns as the header".dimmed())
            }

            // Conversion errors
            BulkError::InvalidNumber { field, value } => {
                write!(f, "{}\n", format!("Field '{}' is not a number", field).red().bold())?;
                write!(f, "   {}", format!("Value: {:?}", value).dimmed())
            }

            // Jira errors
            BulkError::JiraLoginFailed(status, body) => {
                write!(f, "{}\n", format!("Jira login failed ({})", status).red().bold())?;
                write!(f, "   {}\n\n", body.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check --jira-user and --jira-password\n")?;
                write!(f, "   2. Check --url points at the Jira base URL")
            }

            // Network errors
            BulkError::NetworkError(msg) => {
                write!(f, "{}\n", "Network error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Verify you can reach the Jira server\n")?;
                write!(f, "   2. For self-signed certificates pass {}", "--insecure".green())
            }

            BulkError::Aborted => write!(f, "{}", "Aborted".yellow().bold()),

            // Generic
            BulkError::Other(msg) => {
                write!(f, "{}\n", "Error".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }
        }
    }
}

impl std::error::Error for BulkError {}

// Conversion from anyhow::Error
impl From<anyhow::Error> for BulkError {
    fn from(err: anyhow::Error) -> Self {
        BulkError::Other(format!("{:#}", err))
    }
}

impl From<std::io::Error> for BulkError {
    fn from(err: std::io::Error) -> Self {
        BulkError::InputRead(err.to_string())
    }
}

impl From<csv::Error> for BulkError {
    fn from(err: csv::Error) -> Self {
        BulkError::CsvInvalid(err.to_string())
    }
}

impl From<reqwest::Error> for BulkError {
    fn from(err: reqwest::Error) -> Self {
        BulkError::NetworkError(err.to_string())
    }
}

impl From<dialoguer::Error> for BulkError {
    fn from(err: dialoguer::Error) -> Self {
        BulkError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BulkError>;
