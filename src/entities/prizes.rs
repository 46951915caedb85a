use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 奖品实体
/// 说明:
/// - code 全局唯一, 是发给中奖用户的兑换码
/// - partner_code 指向 partners.code (弱引用, 合作伙伴可能不存在)
/// - is_won 只允许 false -> true 单向翻转, 且仅由分配事务写入
/// - 创建顺序 (id 升序) 决定奖品在两天窗口中的归属
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 所属活动ID (级联删除)
    pub promotion_id: i64,
    /// 合作伙伴编码
    pub partner_code: String,
    /// 奖品名称
    pub name: String,
    /// 奖品描述
    pub description: Option<String>,
    /// 兑换码 (唯一)
    pub code: String,
    /// 是否已被赢取
    pub is_won: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::promotions::Entity",
        from = "Column::PromotionId",
        to = "super::promotions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Promotion,
}

impl Related<super::promotions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Promotion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
