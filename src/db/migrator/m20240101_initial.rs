use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Movies::Tconst).text().not_null().primary_key())
                    .col(ColumnDef::new(Movies::Title).text().not_null())
                    .col(ColumnDef::new(Movies::Year).integer())
                    .col(ColumnDef::new(Movies::Genres).text())
                    .col(ColumnDef::new(Movies::Rating).double())
                    .col(ColumnDef::new(Movies::Votes).big_integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Actors::Nconst).text().not_null().primary_key())
                    .col(ColumnDef::new(Actors::Name).text().not_null())
                    .col(ColumnDef::new(Actors::KnownFor).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieActors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MovieActors::Tconst).text().not_null())
                    .col(ColumnDef::new(MovieActors::Nconst).text().not_null())
                    .primary_key(
                        Index::create()
                            .col(MovieActors::Tconst)
                            .col(MovieActors::Nconst),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actors_movie")
                            .from(MovieActors::Table, MovieActors::Tconst)
                            .to(Movies::Table, Movies::Tconst),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actors_actor")
                            .from(MovieActors::Table, MovieActors::Nconst)
                            .to(Actors::Table, Actors::Nconst),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MovieActors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Actors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Tconst,
    Title,
    Year,
    Genres,
    Rating,
    Votes,
}

#[derive(DeriveIden)]
enum Actors {
    Table,
    Nconst,
    Name,
    KnownFor,
}

#[derive(DeriveIden)]
enum MovieActors {
    Table,
    Tconst,
    Nconst,
}
