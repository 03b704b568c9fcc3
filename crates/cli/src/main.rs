use clap::{Parser, Subcommand};

mod commands;

use commands::{AnalyzeArgs, TemplateArgs};

#[derive(Parser)]
#[command(name = "abtest")]
#[command(about = "Landing page A/B test analysis", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, clean, and test an uploaded experiment CSV
    Analyze(AnalyzeArgs),
    /// Write the sample CSV showing the required columns
    Template(TemplateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = abtest_core::ConfigLoader::load_from(&cli.config)?;

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze(args) => commands::run_analyze(args, config.analysis)?,
        Commands::Template(args) => commands::run_template(&args)?,
    }

    Ok(())
}
