// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration loading (YAML/JSON file plus CLI overrides) and validation.

use crate::domain::entities::DEFAULT_SCHEMA;
use crate::domain::errors::{ExportError, Result};
use crate::domain::locale::{NumberLocale, DEFAULT_LOCALE};
use crate::domain::path_template::PathTemplate;
use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;

pub const DEFAULT_PORT: u16 = 1433;
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u32 = 30;
pub const DEFAULT_DRIVER: &str = "ODBC Driver 18 for SQL Server";
pub const DEFAULT_BATCH_SIZE: usize = 100_000;
pub const DEFAULT_FETCH_SIZE: usize = 1_000;
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 8_192;

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub export: ExportConfig,
    /// Present for period-partitioned exports.
    pub period: Option<PeriodConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    /// No username means integrated (Windows/Kerberos) authentication.
    pub username: Option<String>,
    pub password: Option<String>,
    pub connection_timeout_secs: Option<u32>,
    pub driver: Option<String>,
    pub encrypt: Option<bool>,
    pub trust_server_certificate: Option<bool>,
    /// Full ODBC connection string; when set, all other fields are ignored.
    pub connection_string: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    pub schema: Option<String>,
    pub table: Option<String>,
    pub query: Option<String>,
    /// Output file, or template with `{}` for period exports.
    pub output: String,
    pub batch_size: Option<usize>,
    pub fetch_size: Option<usize>,
    pub max_text_length: Option<usize>,
    pub field_delimiter: Option<String>,
    pub locale: Option<String>,
    pub report_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PeriodConfig {
    pub date_column: String,
    pub start_period: String,
    pub end_period: String,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    // Overrides for ad-hoc runs
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub database: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub connection_timeout: Option<u32>,
    #[arg(long)]
    pub driver: Option<String>,
    /// Encrypt the connection (default true)
    #[arg(long)]
    pub encrypt: Option<bool>,
    #[arg(long)]
    pub trust_server_certificate: Option<bool>,
    /// Full ODBC connection string; replaces host, port and credentials
    #[arg(long)]
    pub connection_string: Option<String>,
    #[arg(long)]
    pub schema: Option<String>,
    #[arg(long)]
    pub table: Option<String>,
    #[arg(long)]
    pub query: Option<String>,
    /// Output file; for period exports a template containing `{}`
    #[arg(short, long)]
    pub output: Option<String>,
    #[arg(long)]
    pub batch_size: Option<usize>,
    #[arg(long)]
    pub fetch_size: Option<usize>,
    /// Longest text value accepted per field, in bytes
    #[arg(long)]
    pub max_text_length: Option<usize>,
    #[arg(long)]
    pub delimiter: Option<String>,
    /// Culture used for decimal separators, e.g. en-US or de-DE
    #[arg(long)]
    pub locale: Option<String>,
    #[arg(long)]
    pub report: Option<String>,
    /// Date column used to split the export into monthly files
    #[arg(long)]
    pub date_column: Option<String>,
    /// yyyy, yyyy-MM or yyyy-MM-dd
    #[arg(long)]
    pub start_period: Option<String>,
    #[arg(long)]
    pub end_period: Option<String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ExportError::ConfigError(format!("Cannot open {}: {}", path, e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: AppConfig = if path.ends_with(".json") {
            serde_json::from_str(&contents)
                .map_err(|e| ExportError::ConfigError(format!("{}: {}", path, e)))?
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|e| ExportError::ConfigError(format!("{}: {}", path, e)))?
        };

        Ok(config)
    }

    /// Builds a configuration purely from command-line arguments.
    pub fn default_from_cli(args: &CliArgs) -> Self {
        Self {
            database: DatabaseConfig {
                host: args.host.clone().unwrap_or_else(|| "localhost".to_string()),
                port: args.port.unwrap_or(DEFAULT_PORT),
                database: args.database.clone().unwrap_or_default(),
                username: None,
                password: None,
                connection_timeout_secs: None,
                driver: None,
                encrypt: None,
                trust_server_certificate: None,
                connection_string: None,
            },
            export: ExportConfig {
                schema: None,
                table: None,
                query: None,
                output: String::new(),
                batch_size: None,
                fetch_size: None,
                max_text_length: None,
                field_delimiter: None,
                locale: None,
                report_file: None,
            },
            period: None,
        }
    }

    pub fn merge_cli(&mut self, args: &CliArgs) {
        if let Some(h) = &args.host { self.database.host = h.clone(); }
        if let Some(p) = args.port { self.database.port = p; }
        if let Some(d) = &args.database { self.database.database = d.clone(); }
        if let Some(u) = &args.username { self.database.username = Some(u.clone()); }
        if let Some(p) = &args.password { self.database.password = Some(p.clone()); }
        if let Some(t) = args.connection_timeout { self.database.connection_timeout_secs = Some(t); }
        if let Some(d) = &args.driver { self.database.driver = Some(d.clone()); }
        if let Some(e) = args.encrypt { self.database.encrypt = Some(e); }
        if let Some(t) = args.trust_server_certificate { self.database.trust_server_certificate = Some(t); }
        if let Some(c) = &args.connection_string { self.database.connection_string = Some(c.clone()); }

        if let Some(s) = &args.schema { self.export.schema = Some(s.clone()); }
        // A table or query flag replaces the other one from the config file.
        // Both flags together are kept so the source check rejects them.
        match (&args.table, &args.query) {
            (Some(t), None) => {
                self.export.table = Some(t.clone());
                self.export.query = None;
            }
            (None, Some(q)) => {
                self.export.query = Some(q.clone());
                self.export.table = None;
            }
            (Some(t), Some(q)) => {
                self.export.table = Some(t.clone());
                self.export.query = Some(q.clone());
            }
            (None, None) => {}
        }
        if let Some(o) = &args.output { self.export.output = o.clone(); }
        if let Some(b) = args.batch_size { self.export.batch_size = Some(b); }
        if let Some(f) = args.fetch_size { self.export.fetch_size = Some(f); }
        if let Some(m) = args.max_text_length { self.export.max_text_length = Some(m); }
        if let Some(d) = &args.delimiter { self.export.field_delimiter = Some(d.clone()); }
        if let Some(l) = &args.locale { self.export.locale = Some(l.clone()); }
        if let Some(r) = &args.report { self.export.report_file = Some(r.clone()); }

        if args.date_column.is_some() || args.start_period.is_some() || args.end_period.is_some() {
            let mut period = self.period.clone().unwrap_or(PeriodConfig {
                date_column: String::new(),
                start_period: String::new(),
                end_period: String::new(),
            });
            if let Some(c) = &args.date_column { period.date_column = c.clone(); }
            if let Some(s) = &args.start_period { period.start_period = s.clone(); }
            if let Some(e) = &args.end_period { period.end_period = e.clone(); }
            self.period = Some(period);
        }
    }

    /// Checks settings that can be verified without touching the database.
    pub fn validate(&self) -> Result<()> {
        if self.database.connection_string.is_none() {
            if self.database.host.trim().is_empty() {
                return Err(ExportError::ConfigError("database.host is required".into()));
            }
            if self.database.database.trim().is_empty() {
                return Err(ExportError::ConfigError("database.database is required".into()));
            }
        }
        if self.export.output.trim().is_empty() {
            return Err(ExportError::ConfigError("export.output is required".into()));
        }
        if self.batch_size() == 0 || self.fetch_size() == 0 {
            return Err(ExportError::ConfigError(
                "batch_size and fetch_size must be at least 1".into(),
            ));
        }
        self.delimiter()?;
        self.locale()?;

        if let Some(period) = &self.period {
            if period.date_column.trim().is_empty()
                || period.start_period.trim().is_empty()
                || period.end_period.trim().is_empty()
            {
                return Err(ExportError::ConfigError(
                    "period export needs date_column, start_period and end_period".into(),
                ));
            }
            PathTemplate::parse(&self.export.output)?;
        }
        Ok(())
    }

    pub fn schema(&self) -> &str {
        self.export.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    pub fn batch_size(&self) -> usize {
        self.export.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn fetch_size(&self) -> usize {
        self.export.fetch_size.unwrap_or(DEFAULT_FETCH_SIZE)
    }

    pub fn max_text_length(&self) -> usize {
        self.export.max_text_length.unwrap_or(DEFAULT_MAX_TEXT_LENGTH)
    }

    /// Field delimiter as a single byte; `\t` is accepted for tabs.
    pub fn delimiter(&self) -> Result<u8> {
        let raw = self.export.field_delimiter.as_deref().unwrap_or(",");
        let raw = if raw == "\\t" { "\t" } else { raw };
        match raw.as_bytes() {
            [b] if b.is_ascii() && *b != b'"' && *b != b'\r' && *b != b'\n' => Ok(*b),
            _ => Err(ExportError::ConfigError(format!(
                "field_delimiter must be one ASCII character other than a quote or line break, got {:?}",
                raw
            ))),
        }
    }

    pub fn locale(&self) -> Result<NumberLocale> {
        NumberLocale::parse(self.export.locale.as_deref().unwrap_or(DEFAULT_LOCALE))
    }
}

impl DatabaseConfig {
    /// Assembles the ODBC connection string.
    pub fn get_connection_string(&self) -> String {
        if let Some(cs) = &self.connection_string {
            return cs.clone();
        }

        let driver = self.driver.as_deref().unwrap_or(DEFAULT_DRIVER);
        let mut parts = vec![
            format!("Driver={{{}}}", driver),
            format!("Server=tcp:{},{}", self.host, self.port),
            format!("Database={}", escape_value(&self.database)),
        ];

        match &self.username {
            Some(user) => {
                // Fall back to the environment so passwords stay out of config files.
                let password = self
                    .password
                    .clone()
                    .or_else(|| std::env::var("MSSQL_PASSWORD").ok())
                    .unwrap_or_default();
                parts.push(format!("Uid={}", escape_value(user)));
                parts.push(format!("Pwd={}", escape_value(&password)));
            }
            None => parts.push("Trusted_Connection=yes".to_string()),
        }

        parts.push(format!(
            "Encrypt={}",
            if self.encrypt.unwrap_or(true) { "yes" } else { "no" }
        ));
        if self.trust_server_certificate.unwrap_or(false) {
            parts.push("TrustServerCertificate=yes".to_string());
        }

        parts.join(";") + ";"
    }

    pub fn connection_timeout_secs(&self) -> u32 {
        self.connection_timeout_secs
            .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS)
    }
}

/// Braces a connection-string value when it contains characters with meaning
/// in the ODBC syntax.
fn escape_value(value: &str) -> String {
    if value.contains([';', '{', '}', '=']) || value.starts_with(' ') || value.ends_with(' ') {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Source;
    use std::io::Write;

    fn load(yaml: &str) -> AppConfig {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", yaml).unwrap();
        AppConfig::from_file(file.path().to_str().unwrap()).expect("Failed to parse config")
    }

    #[test]
    fn test_load_yaml_config() {
        let config = load(
            r#"
database:
  host: "sql01"
  database: "Sales"
  username: "exporter"
  password: "s3cret"
export:
  table: "Orders"
  output: "./out/orders_{}.csv"
  batch_size: 50000
  locale: "de-DE"
period:
  date_column: "OrderDate"
  start_period: "2022-01"
  end_period: "2022-04"
"#,
        );

        assert_eq!(config.database.port, 1433);
        assert_eq!(config.database.connection_timeout_secs(), 30);
        assert_eq!(config.schema(), "dbo");
        assert_eq!(config.batch_size(), 50_000);
        assert_eq!(config.fetch_size(), DEFAULT_FETCH_SIZE);
        assert_eq!(config.delimiter().unwrap(), b',');
        assert_eq!(config.locale().unwrap().decimal_separator(), ',');
        assert_eq!(config.period.as_ref().unwrap().date_column, "OrderDate");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"database": {{"host": "h", "port": 1500, "database": "db"}},
                "export": {{"query": "SELECT 1", "output": "x.csv"}}}}"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database.port, 1500);
        assert_eq!(config.export.query.as_deref(), Some("SELECT 1"));
        assert!(config.period.is_none());
        assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let err = AppConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ExportError::ConfigError(_)));
    }

    #[test]
    fn test_connection_string_sql_auth() {
        let config = load(
            r#"
database:
  host: "sql01"
  port: 1444
  database: "Sales"
  username: "exporter"
  password: "p;w"
  trust_server_certificate: true
export:
  output: "x.csv"
"#,
        );
        assert_eq!(
            config.database.get_connection_string(),
            "Driver={ODBC Driver 18 for SQL Server};Server=tcp:sql01,1444;Database=Sales;Uid=exporter;Pwd={p;w};Encrypt=yes;TrustServerCertificate=yes;"
        );
    }

    #[test]
    fn test_connection_string_integrated_auth() {
        let config = load(
            r#"
database:
  host: "sql01"
  database: "Sales"
  encrypt: false
export:
  output: "x.csv"
"#,
        );
        let cs = config.database.get_connection_string();
        assert!(cs.contains("Trusted_Connection=yes"));
        assert!(cs.contains("Encrypt=no"));
        assert!(!cs.contains("Uid="));
    }

    #[test]
    fn test_raw_connection_string_wins() {
        let mut config = AppConfig::default_from_cli(&CliArgs::default());
        config.database.connection_string = Some("DSN=warehouse;".to_string());
        assert_eq!(config.database.get_connection_string(), "DSN=warehouse;");
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = load(
            r#"
database:
  host: "sql01"
  database: "Sales"
export:
  table: "Orders"
  output: "x.csv"
"#,
        );
        let args = CliArgs {
            query: Some("SELECT TOP 10 * FROM Orders".into()),
            batch_size: Some(10),
            delimiter: Some("\\t".into()),
            date_column: Some("OrderDate".into()),
            start_period: Some("2022".into()),
            end_period: Some("2023".into()),
            ..Default::default()
        };
        config.merge_cli(&args);

        assert!(config.export.table.is_none());
        assert_eq!(config.export.query.as_deref(), Some("SELECT TOP 10 * FROM Orders"));
        assert_eq!(config.batch_size(), 10);
        assert_eq!(config.delimiter().unwrap(), b'\t');
        assert_eq!(config.period.as_ref().unwrap().start_period, "2022");
    }

    #[test]
    fn test_table_and_query_flags_together_are_rejected() {
        let mut config = load(
            r#"
database:
  host: "sql01"
  database: "Sales"
export:
  output: "x.csv"
"#,
        );
        let args = CliArgs {
            table: Some("Orders".into()),
            query: Some("SELECT 1".into()),
            ..Default::default()
        };
        config.merge_cli(&args);

        let source = Source::from_parts(
            Some(config.schema()),
            config.export.table.as_deref(),
            config.export.query.as_deref(),
        );
        assert!(matches!(source, Err(ExportError::ValidationError(_))));
    }

    #[test]
    fn test_merge_cli_connection_overrides() {
        let mut config = load(
            r#"
database:
  host: "sql01"
  database: "Sales"
export:
  table: "Orders"
  output: "x.csv"
"#,
        );
        let args = CliArgs {
            encrypt: Some(false),
            trust_server_certificate: Some(true),
            max_text_length: Some(65536),
            ..Default::default()
        };
        config.merge_cli(&args);

        let conn = config.database.get_connection_string();
        assert!(conn.contains("Encrypt=no;"));
        assert!(conn.contains("TrustServerCertificate=yes;"));
        assert_eq!(config.max_text_length(), 65536);

        config.merge_cli(&CliArgs {
            connection_string: Some("DSN=Sales;".into()),
            ..Default::default()
        });
        assert_eq!(config.database.get_connection_string(), "DSN=Sales;");
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let base = load(
            r#"
database:
  host: "sql01"
  database: "Sales"
export:
  table: "Orders"
  output: "x.csv"
"#,
        );
        assert!(base.validate().is_ok());

        let mut bad = base.clone();
        bad.export.field_delimiter = Some(";;".into());
        assert!(bad.validate().is_err());

        let mut bad = base.clone();
        bad.export.locale = Some("zz".into());
        assert!(bad.validate().is_err());

        let mut bad = base.clone();
        bad.export.batch_size = Some(0);
        assert!(bad.validate().is_err());

        // Period mode needs a template with a placeholder
        let mut bad = base.clone();
        bad.period = Some(PeriodConfig {
            date_column: "d".into(),
            start_period: "2022-01".into(),
            end_period: "2022-02".into(),
        });
        assert!(bad.validate().is_err());
    }
}
