use sea_orm_migration::{prelude::*, schema::*};

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
                    .col(pk_auto(Movies::Id))
                    .col(string(Movies::Title))
                    .col(big_integer(Movies::ReleaseTimestamp))
                    .to_owned(),
            )
            .await?;

        // For filtering upcoming movies once the catalog grows.
        manager
            .create_index(
                Index::create()
                    .name("idx_movies_release_timestamp")
                    .table(Movies::Table)
                    .col(Movies::ReleaseTimestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(string(Users::Username).primary_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Watched::Table)
                    .if_not_exists()
                    .col(pk_auto(Watched::Id))
                    .col(string(Watched::UserUsername))
                    .col(integer(Watched::MovieId))
                    .col(string_null(Watched::Review))
                    .col(integer_null(Watched::Rating))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watched_user")
                            .from(Watched::Table, Watched::UserUsername)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watched_movie")
                            .from(Watched::Table, Watched::MovieId)
                            .to(Movies::Table, Movies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watched_user_movie")
                    .table(Watched::Table)
                    .col(Watched::UserUsername)
                    .col(Watched::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Planned::Table)
                    .if_not_exists()
                    .col(pk_auto(Planned::Id))
                    .col(string(Planned::UserUsername))
                    .col(integer(Planned::MovieId))
                    .col(string_null(Planned::Expectation))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_planned_user")
                            .from(Planned::Table, Planned::UserUsername)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_planned_movie")
                            .from(Planned::Table, Planned::MovieId)
                            .to(Movies::Table, Movies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_planned_user_movie")
                    .table(Planned::Table)
                    .col(Planned::UserUsername)
                    .col(Planned::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Planned::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Watched::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    ReleaseTimestamp,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Username,
}

#[derive(DeriveIden)]
enum Watched {
    Table,
    Id,
    UserUsername,
    MovieId,
    Review,
    Rating,
}

#[derive(DeriveIden)]
enum Planned {
    Table,
    Id,
    UserUsername,
    MovieId,
    Expectation,
}
