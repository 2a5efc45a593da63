//! Interactive type-ahead search against the live catalog.
//! Every line typed on stdin is a new submission; bursts of lines inside the quiet period
//! collapse into one request, and only the newest result set is printed.
//! Usage:
//!   cargo run --bin typeahead -- [popularity|voteAverage|releaseDate] [min_rating]
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cinescope::config::Config;
use cinescope::images::{image_url, ImageSize};
use cinescope::pipeline::{QueryCriteria, SortKey};
use cinescope::session::SearchSession;
use cinescope::CatalogClient;
use dotenvy::dotenv;
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let sort_key = match args.first() {
        Some(raw) => serde_json::from_value::<SortKey>(serde_json::Value::String(raw.clone()))
            .with_context(|| format!("unknown sort key '{}'", raw))?,
        None => SortKey::Popularity,
    };
    let min_rating = match args.get(1) {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("min_rating must be a number, got '{}'", raw))?,
        None => 0.0,
    };

    let config = Config::from_env()?;
    let session = Arc::new(SearchSession::new(Arc::new(CatalogClient::new(
        config.api_key,
    ))));

    let mut pending = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin failed")? {
        let criteria = QueryCriteria::new(Some(line), sort_key, min_rating);
        let session = session.clone();
        pending.push(tokio::spawn(async move {
            match session.submit(criteria).await {
                Ok(Some(outcome)) => {
                    let label = outcome.criteria.term().unwrap_or("popular");
                    println!(
                        "#{} '{}': {} shown of {} found",
                        outcome.ticket,
                        label,
                        outcome.movies.len(),
                        outcome.total_results
                    );
                    for movie in outcome.movies.iter().take(10) {
                        println!(
                            "  {:>4.1}  {:<10}  {}  {}",
                            movie.vote_average,
                            movie.release_date.as_deref().unwrap_or("-"),
                            movie.title,
                            image_url(ImageSize::Small, movie.poster_path.as_deref())
                        );
                    }
                }
                Ok(None) => {}
                Err(e) => eprintln!("Something went wrong: {}", e),
            }
        }));
    }
    for task in pending {
        task.await.context("search task panicked")?;
    }

    if let Some(outcome) = session.latest().await {
        println!("Last applied submission: #{}", outcome.ticket);
    }
    Ok(())
}
