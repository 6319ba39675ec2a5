use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Statement,
};
use serde::Serialize;

use crate::domain::{AppearanceLink, MovieRecord, PersonRecord};
use crate::entities::{actors, movie_actors, movies};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub movies: u64,
    pub actors: u64,
    pub links: u64,
}

/// Base-table access, usable on a pool or inside the build transaction.
pub struct CatalogRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> CatalogRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Inserts movies as multi-row INSERTs of `chunk_size` rows.
    pub async fn insert_movies(
        &self,
        records: &[MovieRecord],
        chunk_size: usize,
    ) -> Result<u64, DbErr> {
        let mut inserted = 0;
        for chunk in records.chunks(chunk_size.max(1)) {
            let models = chunk.iter().map(|m| movies::ActiveModel {
                tconst: Set(m.id.to_string()),
                title: Set(m.title.clone()),
                year: Set(m.year),
                genres: Set(Some(m.genres.clone())),
                rating: Set(m.rating),
                votes: Set(m.votes),
            });
            inserted += movies::Entity::insert_many(models)
                .exec_without_returning(self.conn)
                .await?;
        }
        Ok(inserted)
    }

    pub async fn insert_actors(
        &self,
        records: &[PersonRecord],
        chunk_size: usize,
    ) -> Result<u64, DbErr> {
        let mut inserted = 0;
        for chunk in records.chunks(chunk_size.max(1)) {
            let models = chunk.iter().map(|p| actors::ActiveModel {
                nconst: Set(p.id.to_string()),
                name: Set(p.name.clone()),
                known_for: Set(p.known_for_column()),
            });
            inserted += actors::Entity::insert_many(models)
                .exec_without_returning(self.conn)
                .await?;
        }
        Ok(inserted)
    }

    pub async fn insert_links(
        &self,
        links: &[AppearanceLink],
        chunk_size: usize,
    ) -> Result<u64, DbErr> {
        let mut inserted = 0;
        for chunk in links.chunks(chunk_size.max(1)) {
            let models = chunk.iter().map(|l| movie_actors::ActiveModel {
                tconst: Set(l.movie.to_string()),
                nconst: Set(l.person.to_string()),
            });
            inserted += movie_actors::Entity::insert_many(models)
                .exec_without_returning(self.conn)
                .await?;
        }
        Ok(inserted)
    }

    pub async fn counts(&self) -> Result<CatalogCounts, DbErr> {
        Ok(CatalogCounts {
            movies: movies::Entity::find().count(self.conn).await?,
            actors: actors::Entity::find().count(self.conn).await?,
            links: movie_actors::Entity::find().count(self.conn).await?,
        })
    }

    pub async fn get_movie(&self, tconst: &str) -> Result<Option<movies::Model>, DbErr> {
        movies::Entity::find_by_id(tconst.to_string())
            .one(self.conn)
            .await
    }

    /// Actors credited in the movie with this exact title and year.
    pub async fn cast_of(
        &self,
        title: &str,
        year: i32,
        limit: u64,
    ) -> Result<Vec<actors::Model>, DbErr> {
        actors::Entity::find()
            .join(JoinType::InnerJoin, actors::Relation::MovieActors.def())
            .join(JoinType::InnerJoin, movie_actors::Relation::Movie.def())
            .filter(movies::Column::Title.eq(title))
            .filter(movies::Column::Year.eq(year))
            .order_by_asc(actors::Column::Name)
            .limit(limit)
            .all(self.conn)
            .await
    }

    /// Links whose movie or actor row is missing.
    pub async fn dangling_links(&self) -> Result<i64, DbErr> {
        self.scalar(
            "SELECT COUNT(*) AS n FROM movie_actors ma \
             LEFT JOIN movies m ON m.tconst = ma.tconst \
             LEFT JOIN actors a ON a.nconst = ma.nconst \
             WHERE m.tconst IS NULL OR a.nconst IS NULL",
        )
        .await
    }

    /// Actors that no link points at.
    pub async fn orphan_actors(&self) -> Result<i64, DbErr> {
        self.scalar(
            "SELECT COUNT(*) AS n FROM actors a \
             WHERE NOT EXISTS (SELECT 1 FROM movie_actors ma WHERE ma.nconst = a.nconst)",
        )
        .await
    }

    async fn scalar(&self, sql: &str) -> Result<i64, DbErr> {
        let backend = self.conn.get_database_backend();
        let row = self
            .conn
            .query_one(Statement::from_string(backend, sql.to_string()))
            .await?
            .ok_or_else(|| DbErr::Custom(format!("no row returned for: {sql}")))?;
        row.try_get("", "n")
    }
}
