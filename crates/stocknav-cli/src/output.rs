use std::io::{self, Write};

use serde_json::{Map, Value};
use stocknav_core::Envelope;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_to(&mut out, envelope, format, pretty)?;
    out.flush()?;
    Ok(())
}

pub fn render_to<W: Write>(
    out: &mut W,
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => render_table(out, envelope)?,
    }
    Ok(())
}

fn render_table<W: Write>(out: &mut W, envelope: &Envelope<Value>) -> Result<(), CliError> {
    writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
    if let Some(view) = envelope.meta.view {
        writeln!(out, "view        : {view}")?;
    }
    writeln!(
        out,
        "sources     : {}",
        envelope
            .meta
            .source_chain
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",")
    )?;
    writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;

    if !envelope.meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    match &envelope.data {
        Value::Null => {}
        Value::Object(fields) => {
            writeln!(out, "data:")?;
            render_fields(out, fields)?;
        }
        other => {
            writeln!(out, "data:")?;
            render_value(out, "  ", other)?;
        }
    }

    if !envelope.errors.is_empty() {
        writeln!(out, "errors:")?;
        for error in &envelope.errors {
            writeln!(out, "  - {}: {}", error.code, error.message)?;
        }
    }
    Ok(())
}

fn render_fields<W: Write>(out: &mut W, fields: &Map<String, Value>) -> Result<(), CliError> {
    for (key, value) in fields {
        match value {
            Value::Object(chart) if chart.contains_key("traces") => {
                writeln!(out, "  {key}: {}", chart_summary(chart))?;
            }
            Value::Array(items) if key == "notes" => {
                writeln!(out, "  notes:")?;
                for note in items {
                    let term = note.get("term").and_then(Value::as_str).unwrap_or_default();
                    let description = note
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    writeln!(out, "    {term}: {description}")?;
                }
            }
            Value::Array(items) if items.iter().all(Value::is_string) => {
                writeln!(out, "  {key}:")?;
                for item in items {
                    writeln!(out, "    {}", item.as_str().unwrap_or_default())?;
                }
            }
            Value::Array(items) => writeln!(out, "  {key}: {} rows", items.len())?,
            Value::Object(nested) => writeln!(out, "  {key}: {} fields", nested.len())?,
            scalar => writeln!(out, "  {key}: {}", scalar_text(scalar))?,
        }
    }
    Ok(())
}

fn render_value<W: Write>(out: &mut W, indent: &str, value: &Value) -> Result<(), CliError> {
    match value {
        Value::Array(items) => {
            for item in items {
                writeln!(out, "{indent}- {}", compact(item))?;
            }
        }
        other => writeln!(out, "{indent}{}", compact(other))?,
    }
    Ok(())
}

fn chart_summary(chart: &Map<String, Value>) -> String {
    let title = chart.get("title").and_then(Value::as_str).unwrap_or_default();
    let kind = chart.get("kind").and_then(Value::as_str).unwrap_or_default();
    let traces = chart
        .get("traces")
        .and_then(Value::as_array)
        .map(|traces| {
            traces
                .iter()
                .map(|trace| {
                    let name = trace.get("name").and_then(Value::as_str).unwrap_or("?");
                    let points = trace.get("x").and_then(Value::as_array).map_or(0, Vec::len);
                    format!("{name}={points}")
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    format!("{title} [{kind}] {traces}")
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn compact(value: &Value) -> String {
    match value {
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| format!("{key}={}", scalar_text(value)))
            .collect::<Vec<_>>()
            .join("  "),
        other => scalar_text(other),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stocknav_core::{EnvelopeError, EnvelopeMeta, ProviderId};

    use super::*;

    fn envelope(data: Value, errors: Vec<EnvelopeError>) -> Envelope<Value> {
        let meta = EnvelopeMeta::new("request-12345", vec![ProviderId::Mock], 4).expect("meta");
        Envelope::with_errors(meta, data, errors).expect("envelope")
    }

    #[test]
    fn table_summarizes_charts_and_notes() {
        let data = json!({
            "relative_returns": {
                "title": "Relative Returns for Apple Inc.",
                "kind": "line",
                "traces": [{ "name": "AAPL", "x": ["2024-01-02", "2024-01-03"] }]
            },
            "notes": [{ "term": "Relative Returns", "description": "Cumulative change." }]
        });
        let mut out = Vec::new();
        render_to(&mut out, &envelope(data, Vec::new()), OutputFormat::Table, false)
            .expect("render");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.contains("relative_returns: Relative Returns for Apple Inc. [line] AAPL=2"));
        assert!(text.contains("Relative Returns: Cumulative change."));
    }

    #[test]
    fn json_output_is_single_line_unless_pretty() {
        let error = EnvelopeError::new("comparison.warning", "Please select at least one asset to compare.")
            .expect("error");
        let mut out = Vec::new();
        render_to(&mut out, &envelope(Value::Null, vec![error]), OutputFormat::Json, false)
            .expect("render");
        let text = String::from_utf8(out).expect("utf8");

        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("comparison.warning"));
    }
}
