use crate::errors::{BulkError, Result};
use crate::models::fields::ConversionKind;
use anyhow::Context;
use encoding_rs::Encoding;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fully resolved configuration for one run.
#[derive(Debug)]
pub struct Settings {
    pub jira: JiraConfig,
    pub input: InputConfig,
    pub columns: ColumnConfig,
    pub defaults: DefaultFields,
}

#[derive(Debug)]
pub struct JiraConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    /// Skip TLS certificate validation (self-signed internal servers).
    pub insecure: bool,
}

#[derive(Debug)]
pub struct InputConfig {
    pub file: PathBuf,
    pub encoding: &'static Encoding,
    pub separator: u8,
}

#[derive(Debug, Default)]
pub struct ColumnConfig {
    pub renames: HashMap<String, String>,
    pub conversions: HashMap<String, ConversionKind>,
}

/// Values used when a row has no value (or an empty one) for the field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DefaultFields {
    pub assignee: Option<String>,
    pub component: Option<String>,
    pub description: Option<String>,
    pub issue_type: Option<String>,
    pub project_key: Option<String>,
}

impl DefaultFields {
    /// Row field name paired with its default, empty when unset.
    pub fn by_field(&self) -> [(&'static str, &str); 5] {
        [
            ("assignee", self.assignee.as_deref().unwrap_or_default()),
            ("components", self.component.as_deref().unwrap_or_default()),
            ("description", self.description.as_deref().unwrap_or_default()),
            ("issuetype", self.issue_type.as_deref().unwrap_or_default()),
            ("project", self.project_key.as_deref().unwrap_or_default()),
        ]
    }

    fn merge(self, overrides: DefaultFields) -> Self {
        Self {
            assignee: overrides.assignee.or(self.assignee),
            component: overrides.component.or(self.component),
            description: overrides.description.or(self.description),
            issue_type: overrides.issue_type.or(self.issue_type),
            project_key: overrides.project_key.or(self.project_key),
        }
    }
}

/// Partial settings as found in a TOML file or on the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialSettings {
    pub jira: PartialJira,
    pub input: PartialInput,
    pub columns: PartialColumns,
    pub defaults: DefaultFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialJira {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub insecure: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialInput {
    pub file: Option<PathBuf>,
    pub encoding: Option<String>,
    pub separator: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialColumns {
    /// Source column name -> Jira field name.
    pub rename: HashMap<String, String>,
    /// Jira field name -> conversion kind name.
    pub convert: HashMap<String, String>,
}

impl PartialSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let settings: PartialSettings = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(settings)
    }

    /// Layers `overrides` on top of `self`; set values in `overrides` win.
    pub fn merge(mut self, overrides: PartialSettings) -> Self {
        self.columns.rename.extend(overrides.columns.rename);
        self.columns.convert.extend(overrides.columns.convert);

        Self {
            jira: PartialJira {
                url: overrides.jira.url.or(self.jira.url),
                user: overrides.jira.user.or(self.jira.user),
                password: overrides.jira.password.or(self.jira.password),
                insecure: overrides.jira.insecure.or(self.jira.insecure),
            },
            input: PartialInput {
                file: overrides.input.file.or(self.input.file),
                encoding: overrides.input.encoding.or(self.input.encoding),
                separator: overrides.input.separator.or(self.input.separator),
            },
            columns: self.columns,
            defaults: self.defaults.merge(overrides.defaults),
        }
    }

    pub fn resolve(self) -> Result<Settings> {
        let url = self.jira.url.ok_or(BulkError::MissingSetting("url"))?;
        let user = self.jira.user.ok_or(BulkError::MissingSetting("jira_user"))?;
        let password = self.jira.password.ok_or(BulkError::MissingSetting("jira_password"))?;
        let file = self.input.file.ok_or(BulkError::MissingSetting("input_file"))?;

        let encoding_label = self.input.encoding.unwrap_or_else(|| "utf-8".to_string());
        let encoding = Encoding::for_label(encoding_label.trim().as_bytes()).ok_or_else(|| {
            BulkError::ConfigInvalid(format!("Unknown input file encoding '{}'", encoding_label))
        })?;

        let separator = parse_separator(self.input.separator.as_deref().unwrap_or(","))?;

        let conversions = self
            .columns
            .convert
            .into_iter()
            .map(|(field, kind)| match kind.parse::<ConversionKind>() {
                Ok(parsed) => Ok((field, parsed)),
                Err(kind) => Err(BulkError::UnknownConversion { field, kind }),
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Settings {
            jira: JiraConfig {
                url: url.trim_end_matches('/').to_string(),
                user,
                password,
                insecure: self.jira.insecure.unwrap_or(false),
            },
            input: InputConfig {
                file,
                encoding,
                separator,
            },
            columns: ColumnConfig {
                renames: self.columns.rename,
                conversions,
            },
            defaults: self.defaults,
        })
    }
}

/// Parses a `key:value` command line pair, splitting on the first `:`.
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once(':') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY:VALUE, got '{}'", s)),
    }
}

pub fn parse_separator(s: &str) -> Result<u8> {
    match s.as_bytes() {
        [b] => Ok(*b),
        _ if s == "\\t" => Ok(b'\t'),
        _ => Err(BulkError::ConfigInvalid(format!(
            "CSV column separator must be a single ASCII character, got '{}'",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PartialSettings {
        PartialSettings {
            jira: PartialJira {
                url: Some("https://jira.example.com/".to_string()),
                user: Some("jdoe".to_string()),
                password: Some("secret".to_string()),
                insecure: None,
            },
            input: PartialInput {
                file: Some(PathBuf::from("issues.csv")),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [jira]
            url = "https://jira.example.com"
            user = "jdoe"
            insecure = true

            [input]
            file = "issues.csv"
            separator = ";"
            encoding = "windows-1252"

            [columns.rename]
            Name = "summary"

            [columns.convert]
            count = "NumberField"

            [defaults]
            project_key = "ABC"
            issue_type = "Task"
        "#;

        let settings: PartialSettings = toml::from_str(toml_str).unwrap();

        assert_eq!(settings.jira.url.as_deref(), Some("https://jira.example.com"));
        assert_eq!(settings.jira.insecure, Some(true));
        assert_eq!(settings.jira.password, None);
        assert_eq!(settings.input.separator.as_deref(), Some(";"));
        assert_eq!(settings.columns.rename["Name"], "summary");
        assert_eq!(settings.columns.convert["count"], "NumberField");
        assert_eq!(settings.defaults.project_key.as_deref(), Some("ABC"));
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let result: std::result::Result<PartialSettings, _> = toml::from_str("[jira]\ntoken = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_load_missing_file() {
        let result = PartialSettings::load(Path::new("/nonexistent/jira-bulk-create.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_overrides_win() {
        let mut file = complete();
        file.columns.rename.insert("Name".to_string(), "summary".to_string());
        file.columns.rename.insert("Desc".to_string(), "description".to_string());
        file.defaults.project_key = Some("ABC".to_string());
        file.defaults.assignee = Some("jdoe".to_string());

        let mut cli = PartialSettings::default();
        cli.jira.url = Some("https://other.example.com".to_string());
        cli.columns.rename.insert("Name".to_string(), "title".to_string());
        cli.defaults.project_key = Some("XYZ".to_string());

        let merged = file.merge(cli);

        assert_eq!(merged.jira.url.as_deref(), Some("https://other.example.com"));
        assert_eq!(merged.jira.user.as_deref(), Some("jdoe"));
        assert_eq!(merged.columns.rename["Name"], "title");
        assert_eq!(merged.columns.rename["Desc"], "description");
        assert_eq!(merged.defaults.project_key.as_deref(), Some("XYZ"));
        assert_eq!(merged.defaults.assignee.as_deref(), Some("jdoe"));
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = complete().resolve().unwrap();

        assert_eq!(settings.jira.url, "https://jira.example.com");
        assert!(!settings.jira.insecure);
        assert_eq!(settings.input.separator, b',');
        assert_eq!(settings.input.encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn test_resolve_missing_url() {
        let mut partial = complete();
        partial.jira.url = None;

        assert!(matches!(partial.resolve(), Err(BulkError::MissingSetting("url"))));
    }

    #[test]
    fn test_resolve_parses_conversions() {
        let mut partial = complete();
        partial.columns.convert.insert("count".to_string(), "NumberField".to_string());
        partial.columns.convert.insert("labels".to_string(), "multi-select".to_string());

        let settings = partial.resolve().unwrap();

        assert_eq!(settings.columns.conversions["count"], ConversionKind::NumberField);
        assert_eq!(settings.columns.conversions["labels"], ConversionKind::MultiSelect);
    }

    #[test]
    fn test_resolve_unknown_conversion() {
        let mut partial = complete();
        partial.columns.convert.insert("count".to_string(), "integer".to_string());

        match partial.resolve() {
            Err(BulkError::UnknownConversion { field, kind }) => {
                assert_eq!(field, "count");
                assert_eq!(kind, "integer");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_unknown_encoding() {
        let mut partial = complete();
        partial.input.encoding = Some("klingon".to_string());

        assert!(matches!(partial.resolve(), Err(BulkError::ConfigInvalid(_))));
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("name:summary"),
            Ok(("name".to_string(), "summary".to_string()))
        );
        assert_eq!(
            parse_key_value("url:https://x"),
            Ok(("url".to_string(), "https://x".to_string()))
        );
        assert!(parse_key_value("nocolon").is_err());
        assert!(parse_key_value(":summary").is_err());
    }

    #[test]
    fn test_parse_separator() {
        assert_eq!(parse_separator(";").unwrap(), b';');
        assert_eq!(parse_separator("\\t").unwrap(), b'\t');
        assert!(parse_separator("").is_err());
        assert!(parse_separator(";;").is_err());
        assert!(parse_separator("é").is_err());
    }
}
