use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // link_id is a plain column: click events only reference links by identifier.
        manager
            .create_table(
                Table::create()
                    .table(ClickEvent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClickEvent::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClickEvent::LinkId).big_integer().not_null())
                    .col(
                        ColumnDef::new(ClickEvent::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClickEvent::IpAddress).string().null())
                    .col(ColumnDef::new(ClickEvent::UserAgent).text().null())
                    .col(ColumnDef::new(ClickEvent::Referrer).text().null())
                    .col(ColumnDef::new(ClickEvent::Browser).string().null())
                    .col(ColumnDef::new(ClickEvent::DeviceType).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_events_link_time")
                    .table(ClickEvent::Table)
                    .col(ClickEvent::LinkId)
                    .col(ClickEvent::ClickedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_click_events_link_time").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ClickEvent::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClickEvent {
    #[sea_orm(iden = "click_events")]
    Table,
    Id,
    LinkId,
    ClickedAt,
    IpAddress,
    UserAgent,
    Referrer,
    Browser,
    DeviceType,
}
