//! proctor CLI — operator tooling for the assessment subsystem.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "proctor", version, about = "Assessment session tooling for the learning platform")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a student's aptitude-test assignment state
    Status {
        /// Student id (falls back to the config's student_id)
        #[arg(long)]
        student: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Ask the backend to assign aptitude tests to a student
    Assign {
        /// Student id (falls back to the config's student_id)
        #[arg(long)]
        student: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Download an assessment definition to a JSON file
    Fetch {
        /// Assessment id
        #[arg(long)]
        assessment: String,

        /// Output file
        #[arg(long, default_value = "assessment.json")]
        out: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a response sheet offline against an assessment file
    Score {
        /// Assessment JSON file
        #[arg(long)]
        assessment: PathBuf,

        /// Responses JSON file (question id -> answer value)
        #[arg(long)]
        responses: PathBuf,

        /// Seconds the session took (defaults to the full time limit)
        #[arg(long)]
        elapsed: Option<u32>,

        /// Also write the graded result as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check assessment files for authoring issues
    Validate {
        /// Assessment JSON file or directory
        #[arg(long)]
        assessment: PathBuf,
    },

    /// List or discard locally persisted draft state
    Drafts {
        /// Draft directory (falls back to the config's draft_dir)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Discard the draft state of one assessment id
        #[arg(long)]
        discard: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter proctor.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("proctor=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Status { student, config } => commands::status::execute(student, config).await,
        Commands::Assign { student, config } => commands::assign::execute(student, config).await,
        Commands::Fetch {
            assessment,
            out,
            config,
        } => commands::fetch::execute(assessment, out, config).await,
        Commands::Score {
            assessment,
            responses,
            elapsed,
            out,
        } => commands::score::execute(assessment, responses, elapsed, out),
        Commands::Validate { assessment } => commands::validate::execute(assessment),
        Commands::Drafts {
            dir,
            discard,
            config,
        } => commands::drafts::execute(dir, discard, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
