//! JSON I/O handling for CLI
//!
//! - Input: query text, one per line in shell mode
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read non-empty lines from stdin, trimmed
pub fn read_lines() -> impl Iterator<Item = CliResult<String>> {
    io::stdin()
        .lock()
        .lines()
        .map(|line| line.map(|l| l.trim().to_string()).map_err(CliError::from))
        .filter(|line| !matches!(line, Ok(l) if l.is_empty()))
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&mut io::stdout(), &response_ok(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&mut io::stdout(), &response_error(code, message))
}

fn response_ok(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

fn response_error(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_line<W: Write>(writer: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let mut out = Vec::new();
        write_line(&mut out, &response_ok(json!({"tables": ["a"]}))).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["data"]["tables"][0], "a");
    }

    #[test]
    fn test_error_envelope() {
        let parsed = response_error("TABQ_TABLE_NOT_FOUND", "Table 'x' not found");
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["code"], "TABQ_TABLE_NOT_FOUND");
        assert_eq!(parsed["message"], "Table 'x' not found");
    }
}
