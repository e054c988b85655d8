//! Submit command handler
//!
//! Resolves the location and registers it as a clinic.

use crate::cli::init_logging;
use crate::cli::location::{pick, LocationArgs};
use crate::config::Config;
use crate::error::Result;
use crate::submit::{ClinicSubmitter, SubmissionOutcome};
use clap::Args;

/// Submit command arguments
#[derive(Args)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Print the request body instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Override the registration endpoint
    #[arg(long)]
    pub endpoint: Option<String>,
}

/// Run the submit command
pub async fn run(args: SubmitArgs) -> Result<()> {
    let mut config = Config::load()?;
    init_logging(&config.logging.level);

    if let Some(endpoint) = args.endpoint {
        config.submission.endpoint = endpoint;
    }

    let (resolver, address) = pick(&args.location, &config).await?;
    eprintln!("Adding clinic at: {}", address);

    let payload = resolver.payload().await;

    if args.dry_run {
        let body = ClinicSubmitter::encode(payload.as_ref())?;
        println!("POST {}", config.submission.endpoint);
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    let submitter = ClinicSubmitter::from_config(&config)?;

    // The process would exit before a detached request finished
    match submitter.submit(payload.as_ref()).await {
        SubmissionOutcome::Delivered { status, body } => {
            println!("Response ({}): {}", status, body);
        }
        SubmissionOutcome::TransportFailed { reason } => {
            eprintln!("Submission not delivered: {}", reason);
        }
    }

    Ok(())
}
