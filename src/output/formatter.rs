//! Output formatters for gateway answers
//!
//! Table, JSON, CSV and raw renderings of an [`ApiResponse`] and of the
//! remote method listing.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{ApiResponse, RemoteMethod, ResponseFormat, Transport};

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    JsonPretty,
    Csv,
    /// Values joined by the delimiter, as the API sends them
    Raw,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "raw" | "delimited" => Some(OutputFormat::Raw),
            _ => None,
        }
    }

    /// Raw output asks the API for the delimited string directly
    pub fn wants_delimited(&self) -> bool {
        matches!(self, OutputFormat::Raw)
    }
}

/// Renders responses for the terminal
pub struct ResponseFormatter {
    format: OutputFormat,
    delimiter: char,
    colorize: bool,
}

#[derive(Serialize)]
struct MethodRow<'a> {
    method: &'a str,
    transport: String,
    description: &'a str,
    result_keys: &'a [&'a str],
}

impl ResponseFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            delimiter: ResponseFormat::DEFAULT_DELIMITER,
            colorize: true,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format the answer of one call
    pub fn format_response(&self, response: &ApiResponse) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_response_table(response)),
            OutputFormat::Json => {
                serde_json::to_string(response).context("Failed to serialize response")
            }
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(response).context("Failed to serialize response")
            }
            OutputFormat::Csv => self.format_response_csv(response),
            OutputFormat::Raw => Ok(match response {
                ApiResponse::Delimited(raw) => raw_text(raw),
                ApiResponse::Fields(fields) => fields.join(self.delimiter),
            }),
        }
    }

    fn format_response_table(&self, response: &ApiResponse) -> String {
        let fields = match response {
            ApiResponse::Delimited(raw) => return raw_text(raw),
            ApiResponse::Fields(fields) => fields,
        };

        let width = fields.keys().map(str::len).max().unwrap_or(0);
        let mut output = String::new();
        output.push_str(&format!("{}\n", self.status_line(response)));
        output.push_str(&format!("{}\n", "─".repeat(width + 24)));
        for (key, value) in fields.iter() {
            output.push_str(&format!("{key:width$}  {value}\n"));
        }
        output
    }

    fn status_line(&self, response: &ApiResponse) -> String {
        let (symbol, color) = match response.result_code() {
            Some("0") => ("✓ APPROVED", "\x1b[32m"),
            Some(_) => ("✗ DECLINED", "\x1b[31m"),
            None => ("○ NO RESULT CODE", "\x1b[33m"),
        };
        let code = response.result_code().unwrap_or("-");
        if self.colorize {
            format!("{color}{symbol}\x1b[0m (Result {code})")
        } else {
            format!("{symbol} (Result {code})")
        }
    }

    fn format_response_csv(&self, response: &ApiResponse) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        match response {
            ApiResponse::Fields(fields) => {
                writer.write_record(fields.keys())?;
                writer.write_record(fields.values())?;
            }
            ApiResponse::Delimited(raw) => {
                writer.write_record(raw_text(raw).split(self.delimiter))?;
            }
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {e}"))?;
        String::from_utf8(bytes).context("CSV output is not UTF-8")
    }

    /// Format the table of remote methods
    pub fn format_methods(&self, methods: &[RemoteMethod]) -> Result<String> {
        let rows: Vec<MethodRow> = methods
            .iter()
            .map(|m| MethodRow {
                method: m.name(),
                transport: m.transport().to_string(),
                description: m.description(),
                result_keys: m.result_keys(),
            })
            .collect();

        match self.format {
            OutputFormat::Json => serde_json::to_string(&rows).context("Failed to serialize methods"),
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(&rows).context("Failed to serialize methods")
            }
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                writer.write_record(["method", "transport", "description", "result_keys"])?;
                for row in &rows {
                    writer.write_record([
                        row.method,
                        row.transport.as_str(),
                        row.description,
                        row.result_keys.join(" ").as_str(),
                    ])?;
                }
                let bytes = writer
                    .into_inner()
                    .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {e}"))?;
                String::from_utf8(bytes).context("CSV output is not UTF-8")
            }
            OutputFormat::Table | OutputFormat::Raw => Ok(self.format_methods_table(methods)),
        }
    }

    fn format_methods_table(&self, methods: &[RemoteMethod]) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{:34} {:9} {}\n",
            "Method", "Transport", "Description"
        ));
        output.push_str(&format!("{}\n", "─".repeat(90)));
        for method in methods {
            let transport = match method.transport() {
                Transport::Soap if self.colorize => "\x1b[36mSOAP\x1b[0m     ".to_string(),
                other => format!("{:9}", other.to_string()),
            };
            output.push_str(&format!(
                "{:34} {} {}\n",
                method.name(),
                transport,
                method.description()
            ));
            if !method.result_keys().is_empty() {
                output.push_str(&format!(
                    "{:34} {:9} → {}\n",
                    "",
                    "",
                    method.result_keys().join(", ")
                ));
            }
        }
        output
    }
}

/// Delimited body for display, without the trailing line break
fn raw_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultFields;

    fn approved() -> ApiResponse {
        ApiResponse::Fields(
            [
                ("Result", "0"),
                ("ResultDescription", "OK, verified"),
                ("Check_ID", "12322"),
            ]
            .into_iter()
            .collect::<ResultFields>(),
        )
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(
            OutputFormat::from_str("json-pretty"),
            Some(OutputFormat::JsonPretty)
        );
        assert_eq!(OutputFormat::from_str("raw"), Some(OutputFormat::Raw));
        assert_eq!(OutputFormat::from_str("xml"), None);
        assert!(OutputFormat::Raw.wants_delimited());
        assert!(!OutputFormat::Table.wants_delimited());
    }

    #[test]
    fn test_table_output() {
        let output = ResponseFormatter::new(OutputFormat::Table)
            .no_color()
            .format_response(&approved())
            .unwrap();
        assert!(output.starts_with("✓ APPROVED (Result 0)"));
        assert!(output.contains("Check_ID           12322"));
    }

    #[test]
    fn test_json_output_keeps_order() {
        let output = ResponseFormatter::new(OutputFormat::Json)
            .format_response(&approved())
            .unwrap();
        assert_eq!(
            output,
            r#"{"Result":"0","ResultDescription":"OK, verified","Check_ID":"12322"}"#
        );
    }

    #[test]
    fn test_csv_output_quotes_values() {
        let output = ResponseFormatter::new(OutputFormat::Csv)
            .format_response(&approved())
            .unwrap();
        assert_eq!(
            output,
            "Result,ResultDescription,Check_ID\n0,\"OK, verified\",12322\n"
        );
    }

    #[test]
    fn test_raw_output() {
        let formatter = ResponseFormatter::new(OutputFormat::Raw).with_delimiter('|');
        assert_eq!(
            formatter.format_response(&approved()).unwrap(),
            "0|OK, verified|12322"
        );
        let raw = ApiResponse::Delimited(b"0|OK\r\n".to_vec());
        assert_eq!(formatter.format_response(&raw).unwrap(), "0|OK");
    }

    #[test]
    fn test_methods_listing() {
        let methods = RemoteMethod::all();
        let table = ResponseFormatter::new(OutputFormat::Table)
            .no_color()
            .format_methods(&methods)
            .unwrap();
        assert!(table.contains("UploadSignatureImage"));
        assert!(table.contains("SOAP"));

        let json = ResponseFormatter::new(OutputFormat::Json)
            .format_methods(&methods)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 20);
        assert_eq!(parsed[6]["method"], "CheckStatus");
        assert_eq!(parsed[6]["result_keys"].as_array().unwrap().len(), 13);
    }
}
