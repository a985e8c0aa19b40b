use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Link::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Link::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Link::Code).string_len(10).not_null())
                    .col(ColumnDef::new(Link::TargetUrl).text().not_null())
                    .col(
                        ColumnDef::new(Link::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Link::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Link::OwnerId).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // The registry-wide uniqueness guarantee for codes lives here.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_code")
                    .table(Link::Table)
                    .col(Link::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_owner_created")
                    .table(Link::Table)
                    .col(Link::OwnerId)
                    .col(Link::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_links_owner_created").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_links_code").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Link::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Link {
    #[sea_orm(iden = "links")]
    Table,
    Id,
    Code,
    TargetUrl,
    CreatedAt,
    ExpiresAt,
    Active,
    ClickCount,
    OwnerId,
}
