use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    Statement, TransactionTrait,
};
use std::path::Path;
use tracing::{debug, info};

pub mod migrator;
pub mod repositories;

pub use repositories::catalog::CatalogCounts;
pub use repositories::search::TitleMatch;

/// Connection to one catalog artifact.
///
/// A build opens a fresh file with [`Store::create`]; everything that only
/// inspects a finished artifact goes through [`Store::open_read_only`].
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    /// Creates an empty database file at `path` and applies the schema.
    ///
    /// The file must not exist yet; the builder always targets a fresh
    /// temporary path.
    pub async fn create(path: &Path) -> Result<Self, DbErr> {
        use sea_orm_migration::MigratorTrait;

        let conn = connect(&format!("sqlite:{}?mode=rwc", path.display())).await?;

        // The file is thrown away if the build dies, so durability buys nothing.
        conn.execute_unprepared("PRAGMA journal_mode = MEMORY")
            .await?;
        conn.execute_unprepared("PRAGMA synchronous = OFF").await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(path = %path.display(), "Database created & schema applied");

        Ok(Self { conn })
    }

    pub async fn open_read_only(path: &Path) -> Result<Self, DbErr> {
        if !path.exists() {
            return Err(DbErr::Custom(format!(
                "No database at {}",
                path.display()
            )));
        }
        let conn = connect(&format!("sqlite:{}?mode=ro", path.display())).await?;
        debug!(path = %path.display(), "Opened database read-only");
        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<(), DbErr> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    pub async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.conn.begin().await
    }

    /// Closes the pool so the file can be renamed.
    pub async fn close(self) -> Result<(), DbErr> {
        self.conn.close().await
    }

    #[must_use]
    pub fn catalog(&self) -> repositories::catalog::CatalogRepository<'_, DatabaseConnection> {
        repositories::catalog::CatalogRepository::new(&self.conn)
    }

    #[must_use]
    pub fn search(&self) -> repositories::search::SearchRepository<'_> {
        repositories::search::SearchRepository::new(&self.conn)
    }
}

/// One connection: the build is a single writer and readers never overlap it.
///
/// Foreign keys stay declared in the schema but are not enforced; the
/// closure stage already guarantees every link has both endpoints. The
/// setting lives on the connect options so a reopened connection keeps it.
async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url.to_string());
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false)
        .map_sqlx_sqlite_opts(|o| o.foreign_keys(false));

    Database::connect(opt).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("moviechain-store-{}.sqlite", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_create_leaves_foreign_keys_unenforced() {
        let path = temp_db();
        let store = Store::create(&path).await.unwrap();
        let backend = store.conn.get_database_backend();

        let row = store
            .conn
            .query_one(Statement::from_string(backend, "PRAGMA foreign_keys".to_string()))
            .await
            .unwrap()
            .expect("pragma returned no row");
        let enabled: i32 = row.try_get_by_index(0).unwrap();
        assert_eq!(enabled, 0);

        // A link may be written before either endpoint exists.
        store
            .conn
            .execute_unprepared("INSERT INTO movie_actors (tconst, nconst) VALUES ('tt_x', 'nm_x')")
            .await
            .unwrap();
        assert_eq!(store.catalog().counts().await.unwrap().links, 1);

        store.close().await.unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_open_read_only_requires_existing_file() {
        let err = Store::open_read_only(&temp_db()).await.err().unwrap();
        assert!(err.to_string().contains("No database at"));
    }
}
