mod cli;

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use cli::{Cli, Commands};
use skillrelay_agent::ChatError;
use skillrelay_core::config::{load_dotenv, ProcessEnv, SkillsConfig};
use skillrelay_core::observability;
use skillrelay_core::skill::SecretBinding;

fn main() -> Result<()> {
    load_dotenv();
    observability::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat { message } => {
            let message = if message == "-" {
                let mut s = String::new();
                std::io::stdin().read_to_string(&mut s)?;
                s.trim_end().to_string()
            } else {
                message
            };
            let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            rt.block_on(run_chat(&message))?;
        }
        Commands::Skills { json } => {
            list_skills(json)?;
        }
    }
    Ok(())
}

async fn run_chat(message: &str) -> Result<()> {
    let runtime = skillrelay_agent::bootstrap().await?;
    match runtime.orchestrator.chat(message).await {
        Ok(outcome) => {
            println!("{}", json!({ "reply": outcome.reply }));
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

/// Print the classified error body and exit non-zero.
fn fail(err: &ChatError) -> ! {
    let body = failure_body(err);
    tracing::error!(%body, "chat failed");
    println!("{}", body);
    std::process::exit(1);
}

fn failure_body(err: &ChatError) -> serde_json::Value {
    let reply = err.classify();
    json!({ "error": reply.error, "status": reply.status })
}

fn list_skills(as_json: bool) -> Result<()> {
    let config = SkillsConfig::from_env();
    let (store, _meta) = skillrelay_agent::bootstrap::prepare_skills(&config, &ProcessEnv);
    let (_, audit) = SecretBinding::resolve(&store, &ProcessEnv);
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&audit).context("Failed to serialize skill audit")?
        );
    } else {
        println!("{}", audit.render());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillrelay_agent::types::StopReason;

    #[test]
    fn test_failure_body_carries_status_and_error() {
        let body = failure_body(&ChatError::UnexpectedStopReason(StopReason::MaxTokens));
        assert_eq!(body["status"], 500);
        assert_eq!(body["error"], "Unexpected stop_reason: max_tokens");
    }
}
