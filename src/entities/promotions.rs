use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 促销活动实体
/// 说明:
/// - 每个活动固定跨越两天: start_date 与 start_date + 1
/// - 活动拥有自己的奖品池 (prizes.promotion_id, 级联删除)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "promotions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 活动名称
    pub name: String,
    /// 活动开始日期 (第一天)
    pub start_date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 活动覆盖的两个日历日
    pub fn promotion_days(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.start_date + chrono::Days::new(1))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
