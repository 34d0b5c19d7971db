use crate::judge::executor::RawExecution;
use bigdecimal::BigDecimal;
use serde_json::Value as JsonValue;
use std::str::FromStr;

const COMPILE_OK: &str = "OK";

fn run_status_field<'a>(raw: &'a RawExecution, field: &str) -> Option<&'a JsonValue> {
    raw.as_json().get("run_status")?.get(field)
}

fn run_status_text(raw: &RawExecution, field: &str) -> Option<String> {
    run_status_field(raw, field)?.as_str().map(str::to_string)
}

/// Program standard output, if the run produced one.
pub fn extract_stdout(raw: &RawExecution) -> Option<String> {
    run_status_text(raw, "output")
}

/// Elapsed run time in seconds, accepted either as a numeric string or a number.
pub fn extract_time(raw: &RawExecution) -> Option<BigDecimal> {
    match run_status_field(raw, "time_used")? {
        JsonValue::String(text) => BigDecimal::from_str(text.trim()).ok(),
        JsonValue::Number(number) => BigDecimal::from_str(&number.to_string()).ok(),
        _ => None,
    }
}

pub fn extract_stderr(raw: &RawExecution) -> Option<String> {
    run_status_text(raw, "stderr")
}

/// Compiler message when compilation did not succeed.
pub fn extract_compile_errors(raw: &RawExecution) -> Option<String> {
    let status = raw.as_json().get("compile_status")?.as_str()?;
    if status == COMPILE_OK {
        None
    } else {
        Some(status.to_string())
    }
}
