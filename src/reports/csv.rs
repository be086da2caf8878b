use crate::errors::AppResult;
use serde::Serialize;
use serde_json::Value;

/// Renders flat records as comma-separated text.
///
/// The header comes from the keys of the first record in insertion order and
/// every row is looked up by those keys. Values containing a comma are
/// wrapped in double quotes; embedded quotes and newlines are written as-is.
pub fn to_csv<T: Serialize>(records: &[T]) -> AppResult<String> {
    let rows = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    let headers: Vec<String> = match rows.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => return Ok(String::new()),
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    for row in &rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|header| format_cell(row.get(header.as_str())))
            .collect();
        lines.push(cells.join(","));
    }
    Ok(lines.join("\n"))
}

fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => quote_if_needed(text.clone()),
        Some(Value::Number(number)) => format_number(number),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(nested) => quote_if_needed(nested.to_string()),
    }
}

fn quote_if_needed(text: String) -> String {
    if text.contains(',') {
        format!("\"{}\"", text)
    } else {
        text
    }
}

/// Integral values print without a fractional part, like a JavaScript number.
fn format_number(number: &serde_json::Number) -> String {
    if let Some(value) = number.as_i64() {
        return value.to_string();
    }
    if let Some(value) = number.as_u64() {
        return value.to_string();
    }
    match number.as_f64() {
        Some(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", value as i64)
        }
        Some(value) => value.to_string(),
        None => number.to_string(),
    }
}
