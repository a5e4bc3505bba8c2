use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Films::Table)
                    .if_not_exists()
                    .col(pk_auto(Films::Id))
                    .col(string(Films::Title))
                    .col(integer_null(Films::Year))
                    .col(string_null(Films::Language))
                    .col(integer_null(Films::Duration))
                    .col(text_null(Films::Summary))
                    .col(string_null(Films::PosterUrl))
                    .col(integer_null(Films::DirectorId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_films_title")
                    .table(Films::Table)
                    .col(Films::Title)
                    .to_owned(),
            )
            .await?;

        create_name_table(manager, Genres::Table, Genres::Id, Genres::Name).await?;
        create_name_table(manager, Countries::Table, Countries::Id, Countries::Name).await?;
        create_name_table(manager, Writers::Table, Writers::Id, Writers::Name).await?;
        create_name_table(manager, People::Table, People::Id, People::Name).await?;

        create_link_table(
            manager,
            FilmGenres::Table,
            FilmGenres::FilmId,
            FilmGenres::GenreId,
            Genres::Table,
            Genres::Id,
        )
        .await?;
        create_link_table(
            manager,
            FilmCountries::Table,
            FilmCountries::FilmId,
            FilmCountries::CountryId,
            Countries::Table,
            Countries::Id,
        )
        .await?;
        create_link_table(
            manager,
            FilmWriters::Table,
            FilmWriters::FilmId,
            FilmWriters::WriterId,
            Writers::Table,
            Writers::Id,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(pk_auto(Roles::Id))
                    .col(integer(Roles::FilmId))
                    .col(integer(Roles::PersonId))
                    .col(string_null(Roles::Character))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Roles::Table, Roles::FilmId)
                            .to(Films::Table, Films::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Roles::Table, Roles::PersonId)
                            .to(People::Table, People::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_roles_film")
                    .table(Roles::Table)
                    .col(Roles::FilmId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Trailers::Table)
                    .if_not_exists()
                    .col(pk_auto(Trailers::Id))
                    .col(integer(Trailers::FilmId))
                    .col(string(Trailers::Url))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Trailers::Table, Trailers::FilmId)
                            .to(Films::Table, Films::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trailers_film")
                    .table(Trailers::Table)
                    .col(Trailers::FilmId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Trailers::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Roles::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(FilmWriters::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(FilmCountries::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(FilmGenres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(People::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Writers::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Countries::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Films::Table).to_owned()).await?;
        Ok(())
    }
}

async fn create_name_table<T, I, N>(
    manager: &SchemaManager<'_>,
    table: T,
    id: I,
    name: N,
) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
    I: IntoIden + 'static,
    N: IntoIden + 'static,
{
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(pk_auto(id))
                .col(string(name))
                .to_owned(),
        )
        .await
}

async fn create_link_table<T, F, O, R, P>(
    manager: &SchemaManager<'_>,
    table: T,
    film_id: F,
    other_id: O,
    other_table: R,
    other_pk: P,
) -> Result<(), DbErr>
where
    T: IntoIden + Copy + 'static,
    F: IntoIden + Copy + 'static,
    O: IntoIden + Copy + 'static,
    R: IntoIden + 'static,
    P: IntoIden + 'static,
{
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(integer(film_id))
                .col(integer(other_id))
                .primary_key(Index::create().col(film_id).col(other_id))
                .foreign_key(
                    ForeignKey::create()
                        .from(table, film_id)
                        .to(Films::Table, Films::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(table, other_id)
                        .to(other_table, other_pk)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Films {
    Table,
    Id,
    Title,
    Year,
    Language,
    Duration,
    Summary,
    PosterUrl,
    DirectorId,
}

#[derive(DeriveIden)]
enum Genres {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Countries {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Writers {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum People {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden, Clone, Copy)]
enum FilmGenres {
    Table,
    FilmId,
    GenreId,
}

#[derive(DeriveIden, Clone, Copy)]
enum FilmCountries {
    Table,
    FilmId,
    CountryId,
}

#[derive(DeriveIden, Clone, Copy)]
enum FilmWriters {
    Table,
    FilmId,
    WriterId,
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    FilmId,
    PersonId,
    Character,
}

#[derive(DeriveIden)]
enum Trailers {
    Table,
    Id,
    FilmId,
    Url,
}
