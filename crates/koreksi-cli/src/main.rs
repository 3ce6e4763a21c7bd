//! koreksi CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "koreksi",
    version,
    about = "Grade OCR'd exam sheets against verified answer keys"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter koreksi.toml
    Init,

    /// Create a new exam
    CreateExam {
        /// Exam title
        #[arg(long)]
        title: String,
    },

    /// Replace an exam's answer key with the answers read from a key sheet
    IngestKey {
        /// Exam id
        #[arg(long)]
        exam: u64,

        /// Transcript file, or an image when --ocr is set
        #[arg(long)]
        input: PathBuf,

        /// Run the input through the configured OCR backend
        #[arg(long)]
        ocr: bool,
    },

    /// Apply human corrections and mark keys verified
    Verify {
        /// Exam id
        #[arg(long)]
        exam: u64,

        /// JSON file with a list of {key_id, question_number, corrected_text}
        #[arg(long, conflicts_with = "accept_all", required_unless_present = "accept_all")]
        corrections: Option<PathBuf>,

        /// Confirm every key of the exam exactly as read
        #[arg(long)]
        accept_all: bool,
    },

    /// List an exam's answer keys
    Keys {
        /// Exam id
        #[arg(long)]
        exam: u64,

        /// Include unverified keys and raw OCR text
        #[arg(long)]
        all: bool,
    },

    /// Grade student sheets against the verified key
    Check {
        /// Exam id
        #[arg(long)]
        exam: u64,

        /// Student transcript files, or images when --ocr is set
        #[arg(long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Run the inputs through the configured OCR backend
        #[arg(long)]
        ocr: bool,

        /// Save JSON reports to this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Save JSON reports to the configured output directory
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("koreksi=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::CreateExam { title } => commands::create_exam::execute(title, config).await,
        Commands::IngestKey { exam, input, ocr } => {
            commands::ingest_key::execute(exam, input, ocr, config).await
        }
        Commands::Verify {
            exam,
            corrections,
            accept_all,
        } => commands::verify::execute(exam, corrections, accept_all, config).await,
        Commands::Keys { exam, all } => commands::keys::execute(exam, all, config).await,
        Commands::Check {
            exam,
            input,
            ocr,
            output,
            save,
        } => commands::check::execute(exam, input, ocr, output, save, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
