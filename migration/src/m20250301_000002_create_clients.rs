use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(pk_auto(Clients::Id))
                    .col(string_uniq(Clients::Email))
                    .col(string(Clients::PasswordHash))
                    .col(string(Clients::LastName))
                    .col(string(Clients::FirstName))
                    .col(string_null(Clients::Phone))
                    .col(string_null(Clients::BirthDate))
                    .col(string_null(Clients::Address))
                    .col(string_null(Clients::City))
                    .col(string_null(Clients::Province))
                    .col(string_null(Clients::PostalCode))
                    .col(string_null(Clients::Plan))
                    .col(integer(Clients::Credits).default(0))
                    .to_owned(),
            )
            .await?;

        // Repeat rentals of the same film are allowed, so no unique index here.
        manager
            .create_table(
                Table::create()
                    .table(Rentals::Table)
                    .if_not_exists()
                    .col(pk_auto(Rentals::Id))
                    .col(integer(Rentals::ClientId))
                    .col(integer(Rentals::FilmId))
                    .col(big_integer(Rentals::RentedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Rentals::Table, Rentals::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Rentals::Table, Rentals::FilmId)
                            .to(Films::Table, Films::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rentals_client")
                    .table(Rentals::Table)
                    .col(Rentals::ClientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Rentals::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Clients::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    Email,
    PasswordHash,
    LastName,
    FirstName,
    Phone,
    BirthDate,
    Address,
    City,
    Province,
    PostalCode,
    Plan,
    Credits,
}

#[derive(DeriveIden)]
enum Rentals {
    Table,
    Id,
    ClientId,
    FilmId,
    RentedAt,
}

#[derive(DeriveIden)]
enum Films {
    Table,
    Id,
}
