use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
}

/// 报名参与者表
#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
    EventId,
    Name,
    IsWinner,
    RegisteredAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Participants::EventId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::IsWinner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Participants::RegisteredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participants_event")
                            .from(Participants::Table, Participants::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一活动内名称唯一（区分大小写）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_participants_event_name_unique")
                    .table(Participants::Table)
                    .col(Participants::EventId)
                    .col(Participants::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 抽奖时按 (event_id, is_winner) 查询候选人
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_participants_event_winner")
                    .table(Participants::Table)
                    .col(Participants::EventId)
                    .col(Participants::IsWinner)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Participants::Table)
                    .to_owned(),
            )
            .await
    }
}
