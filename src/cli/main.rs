use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medrisk-cli")]
#[command(about = "MedRisk CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "MEDRISK_ENDPOINT", default_value = "http://localhost:5000")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,

    /// Run a risk assessment from a JSON intake file
    Assess {
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Submit patient feedback
    Feedback {
        #[arg(short, long)]
        patient_id: String,

        #[arg(short, long)]
        text: String,
    },

    /// List stored assessments
    Patients,

    /// Show dashboard statistics
    Stats,

    /// List stored feedback
    #[command(name = "feedback-list")]
    FeedbackList,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();
    let endpoint = cli.endpoint.trim_end_matches('/');

    let response = match cli.command {
        Commands::Health => client.get(format!("{}/health", endpoint)).send().await?,

        Commands::Assess { file } => {
            let text = std::fs::read_to_string(&file)?;
            let intake: serde_json::Value = serde_json::from_str(&text)?;

            client
                .post(format!("{}/api/assessment", endpoint))
                .json(&intake)
                .send()
                .await?
        }

        Commands::Feedback { patient_id, text } => {
            client
                .post(format!("{}/submit_feedback", endpoint))
                .json(&json!({
                    "patient_id": patient_id,
                    "feedback_text": text,
                }))
                .send()
                .await?
        }

        Commands::Patients => client.get(format!("{}/api/patients", endpoint)).send().await?,

        Commands::Stats => {
            client
                .get(format!("{}/api/dashboard-stats", endpoint))
                .send()
                .await?
        }

        Commands::FeedbackList => client.get(format!("{}/api/feedback", endpoint)).send().await?,
    };

    let status = response.status();
    let text = response.text().await?;
    println!("{}", render_body(&text));

    if !status.is_success() {
        eprintln!("Request failed: {}", status);
        std::process::exit(1);
    }
    Ok(())
}

/// Pretty-print JSON bodies; anything else (timeouts, rejected media types) verbatim
fn render_body(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .and_then(|body| serde_json::to_string_pretty(&body))
        .unwrap_or_else(|_| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_body() {
        let rendered = render_body(r#"{"status":"healthy"}"#);
        assert_eq!(rendered, "{\n  \"status\": \"healthy\"\n}");
    }

    #[test]
    fn test_render_plain_body() {
        assert_eq!(
            render_body("Expected request with `Content-Type: application/json`"),
            "Expected request with `Content-Type: application/json`"
        );
        assert_eq!(render_body(""), "");
    }

    #[test]
    fn test_cli_parses_endpoint() {
        let cli = Cli::parse_from(["medrisk-cli", "--endpoint", "http://example:8080", "stats"]);
        assert_eq!(cli.endpoint, "http://example:8080");
        assert!(matches!(cli.command, Commands::Stats));
    }
}
