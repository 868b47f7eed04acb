use std::io::{BufRead, Write};

use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::context::AppContext;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let (Some(obj), Some(extra)) =
                (response.as_object_mut(), data.as_ref().and_then(Value::as_object))
            {
                obj.extend(extra.clone());
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": message
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print an opaque payload. Pass-through endpoints return arbitrary JSON,
/// so both formats pretty-print it.
pub fn output_value(_output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prompt on stderr and read one trimmed line from stdin.
pub fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Ask a yes/no question; only an explicit "y"/"yes" confirms.
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} [y/N]", question))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// After any networked command: if a 401/403 cleared the session, tell
/// the user to sign in again.
pub fn warn_if_expired(ctx: &AppContext, output_format: &OutputFormat) -> anyhow::Result<()> {
    if ctx.session_expired() {
        output_error(output_format, "Session expired; run `wotlwedu login` to sign in again")?;
    }
    Ok(())
}
