use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Promotions {
    Table,
    Id,
    Name,
    StartDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    PromotionId,
    PartnerCode,
    Name,
    Description,
    Code,
    IsWon,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Winnings {
    Table,
    Id,
    UserId,
    PrizeId,
    PromotionId,
    Date,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Partners {
    Table,
    Id,
    Code,
    Name,
    Url,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Promotions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Promotions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Promotions::Name).string().not_null())
                    .col(ColumnDef::new(Promotions::StartDate).date().not_null())
                    .col(
                        ColumnDef::new(Promotions::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Promotions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prizes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prizes::PromotionId).big_integer().not_null())
                    .col(ColumnDef::new(Prizes::PartnerCode).string().not_null())
                    .col(ColumnDef::new(Prizes::Name).string().not_null())
                    .col(ColumnDef::new(Prizes::Description).text().null())
                    .col(ColumnDef::new(Prizes::Code).string().not_null())
                    .col(
                        ColumnDef::new(Prizes::IsWon)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Prizes::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Prizes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prizes_promotion")
                            .from(Prizes::Table, Prizes::PromotionId)
                            .to(Promotions::Table, Promotions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // unique (code)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_prizes_code")
                    .table(Prizes::Table)
                    .col(Prizes::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_promotion_id")
                    .table(Prizes::Table)
                    .col(Prizes::PromotionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Winnings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Winnings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Winnings::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Winnings::PrizeId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Winnings::PromotionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Winnings::Date).date().not_null())
                    .col(
                        ColumnDef::new(Winnings::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 一个奖品最多只能被赢取一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_winnings_prize")
                    .table(Winnings::Table)
                    .col(Winnings::PrizeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 同一用户在同一活动的同一天最多一条中奖记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_winnings_user_promotion_date")
                    .table(Winnings::Table)
                    .col(Winnings::UserId)
                    .col(Winnings::PromotionId)
                    .col(Winnings::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Partners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Partners::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Partners::Code).string().not_null())
                    .col(ColumnDef::new(Partners::Name).string().not_null())
                    .col(ColumnDef::new(Partners::Url).string().not_null())
                    .col(
                        ColumnDef::new(Partners::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_partners_code")
                    .table(Partners::Table)
                    .col(Partners::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Winnings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Prizes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Partners::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Promotions::Table).to_owned())
            .await?;
        Ok(())
    }
}
