use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 中奖记录实体 (只增不改)
/// 说明:
/// - 仅由分配事务创建, 之后不可修改或删除
/// - 唯一约束: (user_id, promotion_id, date) 以及 (prize_id),
///   即同一用户同一活动每天最多中奖一次, 每个奖品最多被赢取一次
/// - date 为中奖的日历日, 用于 "当天是否已玩过" 判定
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "winnings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 用户ID (外部身份, 仅存ID)
    pub user_id: i64,
    /// 奖品ID
    pub prize_id: i64,
    /// 活动ID
    pub promotion_id: i64,
    /// 中奖日期
    pub date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
