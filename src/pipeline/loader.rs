use tracing::info;

use super::closure::Closure;
use crate::db::Store;
use crate::db::repositories::catalog::CatalogRepository;
use crate::domain::MovieRecord;
use crate::domain::events::{BuildEvent, EventBus};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub movies: u64,
    pub actors: u64,
    pub links: u64,
}

/// Inserts the three base tables in one transaction.
pub async fn load(
    store: &Store,
    movies: &[MovieRecord],
    closure: &Closure,
    chunk_size: usize,
    bus: &EventBus,
) -> Result<LoadStats> {
    let txn = store.begin().await?;
    let repo = CatalogRepository::new(&txn);

    let movies = repo.insert_movies(movies, chunk_size).await?;
    info!(event = "table_loaded", table = "movies", rows = movies, "Inserted movies");
    bus.emit(BuildEvent::TableLoaded {
        table: "movies",
        rows: movies,
    });

    let actors = repo.insert_actors(&closure.actors, chunk_size).await?;
    info!(event = "table_loaded", table = "actors", rows = actors, "Inserted actors");
    bus.emit(BuildEvent::TableLoaded {
        table: "actors",
        rows: actors,
    });

    let links = repo.insert_links(&closure.links, chunk_size).await?;
    info!(event = "table_loaded", table = "movie_actors", rows = links, "Inserted movie-actor links");
    bus.emit(BuildEvent::TableLoaded {
        table: "movie_actors",
        rows: links,
    });

    txn.commit().await?;

    Ok(LoadStats {
        movies,
        actors,
        links,
    })
}
