//! Resolve command handler
//!
//! Drops the pin and prints the postal address it resolves to.

use crate::cli::init_logging;
use crate::cli::location::{pick, LocationArgs};
use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Resolve command arguments
#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Output JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the resolve command
pub async fn run(args: ResolveArgs) -> Result<()> {
    let config = Config::load()?;
    init_logging(&config.logging.level);

    let (_, address) = pick(&args.location, &config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&address)?);
    } else {
        println!("Name:           {}", address.name);
        println!("Street address: {}", address.street_address);
        println!("City:           {}", address.city);
        println!("State:          {}", address.state);
        println!("Zip code:       {}", address.zip_code);
        println!("Country:        {}", address.country);
    }

    Ok(())
}
