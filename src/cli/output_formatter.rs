use colored::*;
use serde_json::Value as JsonValue;

use crate::cli::cli_args::OutputFormat;
use crate::utils::error::{EngineError, EngineResult};
use crate::utils::types::{QueryResponse, Row};

/// Formats query results for CLI output
pub struct OutputFormatter;

impl OutputFormatter {
    /// Format a query response according to the specified format
    pub fn format_response(response: &QueryResponse, format: &OutputFormat) -> EngineResult<String> {
        match format {
            OutputFormat::Table => Ok(Self::format_table(response)),
            OutputFormat::Json => Self::format_json(response),
            OutputFormat::Csv => Self::format_csv(&response.data),
        }
    }

    /// Format loose rows (e.g. a single record) according to the specified format
    pub fn format_rows(rows: &[Row], format: &OutputFormat) -> EngineResult<String> {
        match format {
            OutputFormat::Table => Ok(Self::format_row_table(rows)),
            OutputFormat::Json => {
                let value = match rows {
                    [single] => JsonValue::Object(single.clone()),
                    _ => JsonValue::Array(rows.iter().cloned().map(JsonValue::Object).collect()),
                };
                Self::to_pretty_json(&value)
            }
            OutputFormat::Csv => Self::format_csv(rows),
        }
    }

    /// Pretty-print any serializable value
    pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> EngineResult<String> {
        serde_json::to_string_pretty(value)
            .map_err(|e| EngineError::Internal(format!("Failed to encode JSON: {}", e)))
    }

    /// Header names: every key seen, in first-seen order
    fn headers(rows: &[Row]) -> Vec<String> {
        let mut headers: Vec<String> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
        headers
    }

    /// Format a response as a colored table with a pagination footer
    fn format_table(response: &QueryResponse) -> String {
        let mut output = Self::format_row_table(&response.data);
        if response.is_empty() {
            return output;
        }

        output.push_str(&format!(
            "\n{} of {} {}",
            response.row_count().to_string().green().bold(),
            response.total.to_string().green().bold(),
            if response.total == 1 { "record" } else { "records" }
        ));
        if let Some(pagination) = &response.pagination {
            output.push_str(&format!(
                " (page {} of {})",
                pagination.page.to_string().cyan(),
                pagination.pages.to_string().cyan()
            ));
        }
        output.push('\n');

        output
    }

    fn format_row_table(rows: &[Row]) -> String {
        if rows.is_empty() {
            return "No results found.".dimmed().to_string();
        }

        let headers = Self::headers(rows);

        // Calculate column widths
        let mut col_widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (i, header) in headers.iter().enumerate() {
                let width = row.get(header).map(Self::value_to_string).unwrap_or_default().chars().count();
                col_widths[i] = col_widths[i].max(width);
            }
        }

        // Ensure minimum width
        for width in &mut col_widths {
            *width = (*width).max(4);
        }

        let mut output = String::new();

        // Header
        output.push_str(&Self::format_table_separator(&col_widths, true));
        output.push('|');
        for (i, header) in headers.iter().enumerate() {
            output.push_str(&format!(" {} |", Self::pad(header, col_widths[i]).bold().cyan()));
        }
        output.push('\n');
        output.push_str(&Self::format_table_separator(&col_widths, false));

        // Data rows
        for row in rows {
            output.push('|');
            for (i, header) in headers.iter().enumerate() {
                let cell = match row.get(header) {
                    Some(value) => Self::format_value_colored(value, col_widths[i]),
                    None => Self::pad("", col_widths[i]).normal(),
                };
                output.push_str(&format!(" {} |", cell));
            }
            output.push('\n');
        }

        output.push_str(&Self::format_table_separator(&col_widths, true));
        output
    }

    fn pad(text: &str, width: usize) -> String {
        format!("{:<width$}", text, width = width)
    }

    /// Format table separator line
    fn format_table_separator(col_widths: &[usize], is_border: bool) -> String {
        let edge = if is_border { '+' } else { '|' };
        let mut separator = String::new();

        separator.push(edge);
        for &width in col_widths {
            separator.push_str(&"-".repeat(width + 2));
            separator.push(edge);
        }

        separator.push('\n');
        separator
    }

    /// Format the full response as JSON
    fn format_json(response: &QueryResponse) -> EngineResult<String> {
        Self::to_pretty_json(response)
    }

    /// Format rows as CSV. Nested objects are written as compact JSON.
    fn format_csv(rows: &[Row]) -> EngineResult<String> {
        let headers = Self::headers(rows);
        let mut writer = csv::Writer::from_writer(Vec::new());

        let csv_error = |e: csv::Error| EngineError::Internal(format!("Failed to write CSV: {}", e));

        if !headers.is_empty() {
            writer.write_record(&headers).map_err(csv_error)?;
        }
        for row in rows {
            let record: Vec<String> = headers
                .iter()
                .map(|header| row.get(header).map(Self::value_to_string).unwrap_or_default())
                .collect();
            writer.write_record(&record).map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| EngineError::Internal(format!("Failed to flush CSV: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| EngineError::Internal(format!("CSV is not UTF-8: {}", e)))
    }

    /// Convert a JSON value to a display string
    fn value_to_string(value: &JsonValue) -> String {
        match value {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => "NULL".to_string(),
            other => other.to_string(),
        }
    }

    /// Convert a JSON value to a colored, padded string for table display
    fn format_value_colored(value: &JsonValue, width: usize) -> ColoredString {
        let text = Self::pad(&Self::value_to_string(value), width);
        match value {
            JsonValue::String(_) => text.normal(),
            JsonValue::Number(_) => text.blue(),
            JsonValue::Bool(true) => text.green(),
            JsonValue::Bool(false) => text.red(),
            JsonValue::Object(_) | JsonValue::Array(_) => text.magenta(),
            JsonValue::Null => text.dimmed(),
        }
    }

    /// Format error message for CLI display
    pub fn format_error(error: &EngineError) -> String {
        format!("{} {}", "Error:".red().bold(), error.to_string().red())
    }

    /// Format info message for CLI display
    pub fn format_info(message: &str) -> String {
        format!("{} {}", "Info:".blue().bold(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::types::{DataFormat, Pagination};
    use serde_json::json;

    fn rows() -> Vec<Row> {
        vec![
            json!({"id": 1, "name": "Leanne Graham", "address": {"city": "Gwenborough"}})
                .as_object()
                .unwrap()
                .clone(),
            json!({"id": 2, "email": "Shanna@melissa.tv, inc"}).as_object().unwrap().clone(),
        ]
    }

    fn response() -> QueryResponse {
        QueryResponse {
            data: rows(),
            columns: vec!["id".to_string(), "name".to_string()],
            total: 10,
            pagination: Some(Pagination {
                page: 1,
                limit: 2,
                total: 10,
                pages: 5,
                has_next: true,
                has_prev: false,
            }),
            format: DataFormat::Nested,
        }
    }

    #[test]
    fn test_headers_union_in_first_seen_order() {
        assert_eq!(OutputFormatter::headers(&rows()), vec!["id", "name", "address", "email"]);
    }

    #[test]
    fn test_csv_output() {
        colored::control::set_override(false);
        let csv = OutputFormatter::format_response(&response(), &OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "id,name,address,email");
        assert_eq!(lines[1], r#"1,Leanne Graham,"{""city"":""Gwenborough""}","#);
        assert_eq!(lines[2], r#"2,,,"Shanna@melissa.tv, inc""#);
    }

    #[test]
    fn test_json_output_is_full_response() {
        let output = OutputFormatter::format_response(&response(), &OutputFormat::Json).unwrap();
        let parsed: JsonValue = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["total"], json!(10));
        assert_eq!(parsed["pagination"]["pages"], json!(5));
        assert_eq!(parsed["format"], json!("nested"));
    }

    #[test]
    fn test_table_output() {
        colored::control::set_override(false);
        let output = OutputFormatter::format_response(&response(), &OutputFormat::Table).unwrap();

        assert!(output.contains("| id   | name          |"));
        assert!(output.contains("2 of 10 records (page 1 of 5)"));
    }

    #[test]
    fn test_empty_table() {
        colored::control::set_override(false);
        let empty = QueryResponse::empty(DataFormat::Flat);
        let output = OutputFormatter::format_response(&empty, &OutputFormat::Table).unwrap();
        assert_eq!(output, "No results found.");
    }

    #[test]
    fn test_single_row_json() {
        let output = OutputFormatter::format_rows(&rows()[..1], &OutputFormat::Json).unwrap();
        let parsed: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["name"], json!("Leanne Graham"));
    }
}
