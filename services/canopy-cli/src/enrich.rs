//! Look up page summaries for scientific names.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use canopy_common::CanopyConfig;
use enrichment::{EnrichmentCache, LookupOutcome, TitleResolver, WikipediaSummarySource};

#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// Scientific names as recorded in the inventory, e.g. "Acer rubrum 'Armstrong'"
    #[arg(required = true)]
    pub names: Vec<String>,
}

#[derive(Serialize)]
struct EnrichLine<'a> {
    name: &'a str,
    title: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extract_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<String>,
}

pub async fn run(args: EnrichArgs, config: &CanopyConfig) -> Result<()> {
    let source = Arc::new(WikipediaSummarySource::from_config(config)?);
    let cache = EnrichmentCache::from_config(source, config);
    let titles = TitleResolver::from_config(config);

    // one at a time: a lookup for a new name supersedes the one in flight
    for name in &args.names {
        let outcome = cache.lookup(name).await;
        let mut line = EnrichLine {
            name,
            title: titles.resolve(name),
            status: "resolved",
            thumbnail: None,
            extract_html: None,
            page: None,
        };
        match outcome {
            LookupOutcome::Resolved(summary) => {
                line.thumbnail = summary.thumbnail_url().map(str::to_string);
                line.extract_html = summary.extract_html().map(str::to_string);
                line.page = summary.page_url().map(str::to_string);
            }
            LookupOutcome::Failed => line.status = "failed",
            LookupOutcome::Cancelled => line.status = "cancelled",
        }
        println!("{}", serde_json::to_string(&line)?);
    }

    Ok(())
}
