//! Template CLI command.
//!
//! Writes a four-row sample file showing the columns `analyze` expects.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use abtest_experiment::Dataset;

/// Arguments for the template command.
#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Destination file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Runs the template command.
///
/// # Errors
/// Returns an error if the destination cannot be written.
pub fn run_template(args: &TemplateArgs) -> Result<()> {
    let template = Dataset::template();

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            template.write_csv(file)?;
            tracing::info!("Template written to {}", path.display());
        }
        None => template.write_csv(std::io::stdout().lock())?,
    }

    Ok(())
}
