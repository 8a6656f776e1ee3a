use clap::{Parser, Subcommand};

/// SkillRelay - one message in, one reply out, using skill-selected API calls
#[derive(Parser, Debug)]
#[command(name = "skillrelay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer one message. Prints {"reply": ...} or {"error": ..., "status": N}
    Chat {
        /// The user message. Use "-" to read it from stdin
        #[arg(value_name = "MESSAGE")]
        message: String,
    },

    /// Load skills and print which credentials resolved (no model calls)
    Skills {
        /// Print the audit as JSON
        #[arg(long)]
        json: bool,
    },
}
