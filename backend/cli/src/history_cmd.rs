//! `kokoro history`: read or clear the log through a running server.

use anyhow::{Context, Result};
use serde_json::Value;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

pub async fn run(port: u16, clear: bool) -> Result<()> {
    let url = format!("http://localhost:{}/history", port);
    let client = reqwest::Client::new();

    let request = if clear { client.delete(&url) } else { client.get(&url) };
    let response = match request.send().await {
        Ok(response) => response,
        Err(_) => {
            println!("kokoro is not running on port {}", port);
            return Ok(());
        }
    };

    let body: Value = response
        .error_for_status()?
        .json()
        .await
        .context("Server returned a non-JSON body")?;

    if clear {
        println!("{}", body["message"].as_str().unwrap_or("History cleared."));
    } else {
        print!("{}", render_history(&body));
    }
    Ok(())
}

/// One block per participant, one line per record.
fn render_history(log: &Value) -> String {
    let Some(participants) = log.as_object().filter(|m| !m.is_empty()) else {
        return "(no history)\n".to_string();
    };

    let mut out = String::new();
    for (participant, records) in participants {
        out.push_str(&format!("{BOLD}{participant}{RESET}\n"));
        for record in records.as_array().into_iter().flatten() {
            let role = record["role"].as_str().unwrap_or("?");
            let color = if role == "user" { CYAN } else { GREEN };
            out.push_str(&format!(
                "  {DIM}{}{RESET} {color}{role:>4}{RESET} {}\n",
                record["timestamp"].as_str().unwrap_or(""),
                record["message"].as_str().unwrap_or(""),
            ));
        }
    }
    out
}
