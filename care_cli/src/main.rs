use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod demo;
mod generate;

#[derive(Debug, Parser)]
#[command(
    name = "carectl",
    version,
    about = "CareBridge platform tooling",
    long_about = "carectl generates synthetic FHIR data for the CareBridge demonstration \
        platform and walks a running gateway through all three clinical use cases.\n\n\
        EXAMPLES:\n\
        \n  carectl generate --patients 100 --output data/    Generate a synthetic bundle\n\
        \n  carectl demo                                      Run the interactive demo\n\
        \n  carectl demo --base-url http://localhost:9000     Demo against another port"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate synthetic FHIR patient data.
    Generate {
        /// Number of patients to generate.
        #[arg(long, default_value_t = 100)]
        patients: usize,
        /// Output directory for the generated files.
        #[arg(long, default_value = "data")]
        output: PathBuf,
        /// Seed for reproducible output.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Walk a running gateway through all three clinical use cases.
    Demo {
        /// Base URL of the gateway.
        #[arg(long, default_value = "http://127.0.0.1:8720")]
        base_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            patients,
            output,
            seed,
        } => generate::run(patients, &output, seed),
        Command::Demo { base_url } => demo::run(&base_url).await,
    }
}
