use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// External-content FTS5 tables over the base tables. They stay empty until
/// the indexer rebuilds them after the bulk load.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE VIRTUAL TABLE IF NOT EXISTS movies_fts USING fts5(
                title,
                content='movies',
                content_rowid='rowid'
            )",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE VIRTUAL TABLE IF NOT EXISTS actors_fts USING fts5(
                name,
                content='actors',
                content_rowid='rowid'
            )",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP TABLE IF EXISTS actors_fts")
            .await?;

        conn.execute_unprepared("DROP TABLE IF EXISTS movies_fts")
            .await?;

        Ok(())
    }
}
