//! Search command handler
//!
//! One-shot place lookup, or an interactive mode where each stdin line is
//! the new content of the search box and settled results are printed as
//! they arrive.

use crate::cli::init_logging;
use crate::config::Config;
use crate::error::Result;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{PlaceLookup, PlaceResult};
use crate::search::{SearchDebouncer, SearchResults};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// How long to wait for a pending lookup after stdin closes
const FINAL_LOOKUP_WAIT: Duration = Duration::from_secs(5);

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Text to search for
    #[arg(required_unless_present = "interactive")]
    pub query: Option<String>,

    /// Read successive search box values from stdin, one per line
    #[arg(long, short = 'i', conflicts_with = "query")]
    pub interactive: bool,

    /// Output JSON instead of a list
    #[arg(long)]
    pub json: bool,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    init_logging(&config.logging.level);

    let lookup = NominatimBackend::from_config(&config)?;

    if args.interactive {
        return run_interactive(Arc::new(lookup), config.debounce_window(), args.json).await;
    }

    let query = args.query.unwrap_or_default();
    let places = lookup.search(&query.to_lowercase()).await?;
    print_results(&Some(places), args.json)
}

async fn run_interactive(
    lookup: Arc<NominatimBackend>,
    window: Duration,
    json: bool,
) -> Result<()> {
    let debouncer = SearchDebouncer::spawn(lookup, window);
    let mut results = debouncer.results();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(text) => debouncer.set_query(text.trim()),
                    None => break,
                }
            }
            changed = results.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let batch = results.borrow_and_update().clone();
                print_results(&batch, json)?;
            }
        }
    }

    // Let the last edit settle and its lookup land
    tokio::time::sleep(window).await;
    if let Ok(Ok(())) = tokio::time::timeout(FINAL_LOOKUP_WAIT, results.changed()).await {
        let batch = results.borrow_and_update().clone();
        print_results(&batch, json)?;
    }

    Ok(())
}

fn print_results(results: &SearchResults, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(results)?);
        return Ok(());
    }

    match results {
        Some(places) if !places.is_empty() => {
            for (i, place) in places.iter().enumerate() {
                println!("{:>2}. {}", i + 1, describe(place));
            }
        }
        _ => println!("No results. Use `resolve --here` to pick your current location."),
    }
    println!();
    Ok(())
}

fn describe(place: &PlaceResult) -> String {
    let name = place.name.as_deref().unwrap_or("Unnamed place");
    match place.locality.as_deref() {
        Some(locality) => format!("{} - {} ({})", name, locality, place.coordinates),
        None => format!("{} ({})", name, place.coordinates),
    }
}
