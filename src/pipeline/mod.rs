//! The catalog build: extract, close, load, index, rename, verify.
//!
//! Every stage takes the previous stage's output by value or reference and
//! returns its own; nothing is shared through globals. The database is built
//! at a temporary path beside the target and only renamed into place once it
//! is complete, so a failed or killed build never replaces a good artifact.

pub mod closure;
pub mod indexer;
pub mod loader;
pub mod verifier;

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{BuildConfig, Config, VerifyConfig};
use crate::constants::inputs;
use crate::db::Store;
use crate::domain::events::{BuildEvent, EventBus, Stage};
use crate::domain::{Adjacency, MovieTable, PersonTable, RatingTable};
use crate::error::{BuildError, Result};
use crate::extract::{self, ExtractContext, ExtractStats};

use closure::{ClosureStats, apply_closure, join_ratings};
use loader::LoadStats;
use verifier::VerificationReport;

/// Tables produced by the four extractors.
pub struct Extraction {
    pub ratings: RatingTable,
    pub movies: MovieTable,
    pub people: PersonTable,
    pub adjacency: Adjacency,
    pub stats: ExtractionStats,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionStats {
    pub ratings: ExtractStats,
    pub movies: ExtractStats,
    pub people: ExtractStats,
    pub links: ExtractStats,
}

#[derive(Debug)]
pub struct BuildSummary {
    pub path: PathBuf,
    pub extraction: ExtractionStats,
    pub closure: ClosureStats,
    pub load: LoadStats,
    /// `None` when verification is disabled or failed to run.
    pub verification: Option<VerificationReport>,
}

pub struct Builder {
    build: BuildConfig,
    verify: VerifyConfig,
    bus: EventBus,
}

impl Builder {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            build: config.build.clone(),
            verify: config.verify.clone(),
            bus: EventBus::new(config.build.event_buffer_size),
        }
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.build.database_path()
    }

    /// Runs the whole build. Fails before touching the output directory if
    /// any input file is missing.
    pub async fn run(&self) -> Result<BuildSummary> {
        let start = Instant::now();
        info!(
            event = "build_started",
            data_dir = %self.build.data_dir.display(),
            output = %self.database_path().display(),
            "Building movie catalog"
        );

        self.bus.started(Stage::Preflight);
        check_inputs(&self.build.data_dir)?;
        if self.build.insert_chunk_size == 0 {
            return Err(BuildError::Config(
                "insert_chunk_size must be > 0".to_string(),
            ));
        }
        self.bus.finished(Stage::Preflight, 0, 0);

        let ctx = ExtractContext {
            bus: self.bus.clone(),
            max_rows: self.build.max_rows_in_memory,
            progress_interval: self.build.progress_interval,
        };
        let data_dir = self.build.data_dir.clone();

        // CPU-intensive: offloaded to blocking thread
        let extraction =
            tokio::task::spawn_blocking(move || extract_all(&data_dir, &ctx)).await??;

        self.bus.started(Stage::Closure);
        let stats = extraction.stats;
        let movies = join_ratings(extraction.movies, &extraction.ratings);
        let closure = apply_closure(extraction.people, &extraction.adjacency);
        drop(extraction.ratings);
        drop(extraction.adjacency);
        info!(
            event = "closure_applied",
            actors = closure.actors.len(),
            links = closure.links.len(),
            unknown_people = closure.stats.unknown_people,
            dropped_links = closure.stats.dropped_links,
            "Restricted people to credited actors"
        );
        self.bus.finished(
            Stage::Closure,
            closure.actors.len() as u64,
            closure.stats.dropped_links as u64,
        );

        let target = self.database_path();
        let load = self.write_artifact(&target, &movies, &closure).await?;

        let verification = if self.verify.enabled {
            self.verify_artifact(&target).await
        } else {
            debug!("Verification disabled");
            None
        };

        info!(
            event = "build_finished",
            path = %target.display(),
            movies = load.movies,
            actors = load.actors,
            links = load.links,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Build complete"
        );

        Ok(BuildSummary {
            path: target,
            extraction: stats,
            closure: closure.stats,
            load,
            verification,
        })
    }

    /// Builds into a temporary sibling of `target` and renames it into place.
    async fn write_artifact(
        &self,
        target: &Path,
        movies: &[crate::domain::MovieRecord],
        closure: &closure::Closure,
    ) -> Result<LoadStats> {
        tokio::fs::create_dir_all(&self.build.output_dir).await?;
        let temp = temp_path(&self.build.output_dir, &self.build.database_name);
        debug!(path = %temp.display(), "Building at temporary path");

        let result = async {
            let store = Store::create(&temp).await?;

            self.bus.started(Stage::Load);
            let load = loader::load(
                &store,
                movies,
                closure,
                self.build.insert_chunk_size,
                &self.bus,
            )
            .await?;
            self.bus
                .finished(Stage::Load, load.movies + load.actors + load.links, 0);

            self.bus.started(Stage::Index);
            indexer::build_indexes(&store).await?;
            self.bus.finished(Stage::Index, 0, 0);

            store.close().await?;
            tokio::fs::rename(&temp, target).await?;
            Ok::<_, BuildError>(load)
        }
        .await;

        match result {
            Ok(load) => {
                let size_bytes = tokio::fs::metadata(target).await?.len();
                info!(
                    event = "artifact_ready",
                    path = %target.display(),
                    size_mb = size_bytes / (1024 * 1024),
                    "Database written"
                );
                self.bus.emit(BuildEvent::ArtifactReady {
                    path: target.to_path_buf(),
                    size_bytes,
                });
                Ok(load)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                    debug!(path = %temp.display(), error = %cleanup, "Temporary file not removed");
                }
                Err(e)
            }
        }
    }

    /// Verification problems are reported, never fatal.
    async fn verify_artifact(&self, path: &Path) -> Option<VerificationReport> {
        self.bus.started(Stage::Verify);
        match verifier::verify(path, &self.verify).await {
            Ok(report) => {
                let problems = report.problems();
                if !problems.is_empty() {
                    self.bus.emit(BuildEvent::VerificationFailed {
                        message: problems.join("; "),
                    });
                }
                self.bus.finished(Stage::Verify, report.counts.movies, 0);
                Some(report)
            }
            Err(e) => {
                error!(error = %e, "Verification failed");
                self.bus.emit(BuildEvent::VerificationFailed {
                    message: e.to_string(),
                });
                None
            }
        }
    }
}

/// Fails on the first required input that is not a file in `data_dir`.
pub fn check_inputs(data_dir: &Path) -> Result<()> {
    for &file in inputs::REQUIRED {
        if !data_dir.join(file).is_file() {
            return Err(BuildError::MissingInput {
                file,
                dir: data_dir.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn temp_path(output_dir: &Path, database_name: &str) -> PathBuf {
    output_dir.join(format!(".{database_name}.{}.tmp", Uuid::new_v4()))
}

/// Runs the four extractors in dependency order.
///
/// The principals pass needs the finished movie table, so it always runs
/// after the movie extractor.
pub fn extract_all(data_dir: &Path, ctx: &ExtractContext) -> Result<Extraction> {
    let ratings = run_stage(Stage::Ratings, ctx, || {
        extract::ratings::extract(extract::open_input(data_dir, inputs::RATINGS)?, ctx)
    })?;

    let movies = run_stage(Stage::Movies, ctx, || {
        extract::movies::extract(extract::open_input(data_dir, inputs::TITLES)?, ctx)
    })?;

    let people = run_stage(Stage::People, ctx, || {
        extract::people::extract(extract::open_input(data_dir, inputs::NAMES)?, ctx)
    })?;

    let links = run_stage(Stage::Links, ctx, || {
        extract::principals::extract(
            extract::open_input(data_dir, inputs::PRINCIPALS)?,
            &movies.table,
            ctx,
        )
    })?;

    Ok(Extraction {
        stats: ExtractionStats {
            ratings: ratings.stats,
            movies: movies.stats,
            people: people.stats,
            links: links.stats,
        },
        ratings: ratings.table,
        movies: movies.table,
        people: people.table,
        adjacency: links.table,
    })
}

fn run_stage<T>(
    stage: Stage,
    ctx: &ExtractContext,
    f: impl FnOnce() -> Result<extract::Extracted<T>>,
) -> Result<extract::Extracted<T>> {
    let start = Instant::now();
    ctx.bus.started(stage);

    let out = f()?;

    if out.stats.skipped > 0 {
        warn!(
            stage = %stage,
            skipped = out.stats.skipped,
            "Malformed rows skipped"
        );
    }
    info!(
        event = "stage_finished",
        stage = %stage,
        read = out.stats.read,
        kept = out.stats.kept,
        filtered = out.stats.filtered(),
        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Extracted {}",
        extract::source_file(stage)
    );
    ctx.bus.finished(stage, out.stats.kept, out.stats.skipped);
    Ok(out)
}
