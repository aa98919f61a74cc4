use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "jar-cli")]
#[command(about = "Command-line client for the venting jar API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current amount and recent history
    Show,
    /// Add $1 to the jar
    Add,
    /// Reset the jar to $0 (asks twice unless --yes)
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Check service health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let jar_url = format!("{}/api/jar", cli.url.trim_end_matches('/'));

    match cli.command {
        Commands::Show => {
            let res = client.get(&jar_url).send().await?;
            print_response(res).await?;
        }
        Commands::Add => {
            let res = client.post(&jar_url).json(&json!({ "action": "add" })).send().await?;
            print_response(res).await?;
        }
        Commands::Reset { yes } => {
            if !yes
                && !(confirm("Are you sure you want to reset the jar to $0?")?
                    && confirm("This will permanently delete all vent history. Really reset?")?)
            {
                println!("Reset cancelled");
                return Ok(());
            }
            let res = client.post(&jar_url).json(&json!({ "action": "reset" })).send().await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client
                .get(format!("{}/health", cli.url.trim_end_matches('/')))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> std::io::Result<bool> {
    use std::io::Write;

    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return ensure_success(status);
    }
    ensure_success(status)?;

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Non-2xx responses become errors so the process exits non-zero.
fn ensure_success(status: StatusCode) -> Result<(), Box<dyn std::error::Error>> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("jar API returned status {}", status).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status_passes() {
        assert!(ensure_success(StatusCode::OK).is_ok());
    }

    #[test]
    fn test_error_status_fails() {
        let err = ensure_success(StatusCode::INTERNAL_SERVER_ERROR).unwrap_err();
        assert_eq!(err.to_string(), "jar API returned status 500 Internal Server Error");
        assert!(ensure_success(StatusCode::BAD_REQUEST).is_err());
    }
}
