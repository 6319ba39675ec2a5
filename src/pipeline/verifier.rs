use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::config::VerifyConfig;
use crate::constants::limits;
use crate::db::{CatalogCounts, Store, TitleMatch};
use crate::error::Result;

/// What the read-only pass over a finished artifact found.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub counts: CatalogCounts,
    pub dangling_links: i64,
    pub orphan_actors: i64,
    pub title_query: String,
    pub title_matches: Vec<TitleMatch>,
    pub name_query: String,
    pub name_matches: Vec<String>,
    pub sample_title: String,
    pub sample_year: i32,
    pub sample_cast: Vec<String>,
}

impl VerificationReport {
    /// Integrity problems worth surfacing. Empty sample results are not
    /// problems: a partial dump may simply not contain the sample movie.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.dangling_links > 0 {
            problems.push(format!(
                "{} links reference a missing movie or actor",
                self.dangling_links
            ));
        }
        if self.orphan_actors > 0 {
            problems.push(format!("{} actors have no links", self.orphan_actors));
        }
        problems
    }
}

/// Opens the artifact read-only and runs the sanity queries.
pub async fn verify(path: &Path, samples: &VerifyConfig) -> Result<VerificationReport> {
    let store = Store::open_read_only(path).await?;
    store.ping().await?;
    let catalog = store.catalog();
    let search = store.search();

    let counts = catalog.counts().await?;
    info!(
        movies = counts.movies,
        actors = counts.actors,
        links = counts.links,
        "Row counts"
    );

    let title_matches = search
        .search_titles(&samples.title_query, limits::SAMPLE_SEARCH_LIMIT)
        .await?;
    for hit in &title_matches {
        info!(
            query = %samples.title_query,
            title = %hit.title,
            year = ?hit.year,
            votes = ?hit.votes,
            "Title search hit"
        );
    }

    let name_matches = search
        .search_names(&samples.name_query, limits::SAMPLE_SEARCH_LIMIT)
        .await?;
    for name in &name_matches {
        info!(query = %samples.name_query, name = %name, "Name search hit");
    }

    let sample_cast: Vec<String> = catalog
        .cast_of(&samples.title, samples.year, limits::SAMPLE_CAST_LIMIT)
        .await?
        .into_iter()
        .map(|actor| actor.name)
        .collect();
    info!(
        title = %samples.title,
        year = samples.year,
        cast = ?sample_cast,
        "Sample cast"
    );

    let report = VerificationReport {
        counts,
        dangling_links: catalog.dangling_links().await?,
        orphan_actors: catalog.orphan_actors().await?,
        title_query: samples.title_query.clone(),
        title_matches,
        name_query: samples.name_query.clone(),
        name_matches,
        sample_title: samples.title.clone(),
        sample_year: samples.year,
        sample_cast,
    };

    for problem in report.problems() {
        warn!(problem = %problem, "Verification found an integrity problem");
    }

    store.close().await?;
    Ok(report)
}
