use sea_orm::{ConnectionTrait, DbErr};
use sea_orm_migration::SchemaManager;
use sea_orm_migration::prelude::{Index, IndexCreateStatement, IndexOrder};
use tracing::{debug, info};

use crate::db::Store;
use crate::entities::{movie_actors, movies};

/// Populates the search tables and creates the lookup indexes.
///
/// Runs after the bulk load so the inserts never pay for index upkeep.
pub async fn build_indexes(store: &Store) -> Result<(), DbErr> {
    let conn = &store.conn;

    // External-content FTS5 tables read their text back from the base tables.
    conn.execute_unprepared("INSERT INTO movies_fts(movies_fts) VALUES('rebuild')")
        .await?;
    debug!("Built title search index");

    conn.execute_unprepared("INSERT INTO actors_fts(actors_fts) VALUES('rebuild')")
        .await?;
    debug!("Built name search index");

    let manager = SchemaManager::new(conn);
    for index in secondary_indexes() {
        manager.create_index(index).await?;
    }

    conn.execute_unprepared("ANALYZE").await?;

    info!(event = "indexes_built", "Search and lookup indexes built");
    Ok(())
}

fn secondary_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_movies_votes")
            .table(movies::Entity)
            .col((movies::Column::Votes, IndexOrder::Desc))
            .to_owned(),
        Index::create()
            .name("idx_movies_year")
            .table(movies::Entity)
            .col(movies::Column::Year)
            .to_owned(),
        Index::create()
            .name("idx_movie_actors_movie")
            .table(movie_actors::Entity)
            .col(movie_actors::Column::Tconst)
            .to_owned(),
        Index::create()
            .name("idx_movie_actors_actor")
            .table(movie_actors::Entity)
            .col(movie_actors::Column::Nconst)
            .to_owned(),
    ]
}
