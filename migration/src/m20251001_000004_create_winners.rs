use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
}

/// 中奖记录表
/// - participant_id 唯一：同一参与者最多中奖一次
/// - (event_id, draw_order) 唯一：同一活动内抽奖顺序不重复
#[derive(DeriveIden)]
enum Winners {
    Table,
    Id,
    EventId,
    ParticipantId,
    DrawOrder,
    DrawnAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Winners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Winners::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Winners::EventId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Winners::ParticipantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Winners::DrawOrder).integer().not_null())
                    .col(
                        ColumnDef::new(Winners::DrawnAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_winners_event")
                            .from(Winners::Table, Winners::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_winners_participant")
                            .from(Winners::Table, Winners::ParticipantId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_winners_participant_unique")
                    .table(Winners::Table)
                    .col(Winners::ParticipantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_winners_event_draw_order_unique")
                    .table(Winners::Table)
                    .col(Winners::EventId)
                    .col(Winners::DrawOrder)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Winners::Table).to_owned())
            .await
    }
}
