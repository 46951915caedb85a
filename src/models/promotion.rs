use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{partner_entity, prize_entity, promotion_entity};

/// 抽奖资格校验失败原因 (一次请求可能同时返回多个)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Violation {
    /// 当前日期不在活动的两天窗口内
    OutsideDate,
    /// 当前时刻处于禁止抽奖时段
    OutsideHours,
    /// 用户当天已经在该活动中奖过
    UserPlayed,
}

impl Violation {
    pub fn token(&self) -> &'static str {
        match self {
            Violation::OutsideDate => "outsideDate",
            Violation::OutsideHours => "outsideHours",
            Violation::UserPlayed => "userPlayed",
        }
    }
}

/// 中奖查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WinningCheckQuery {
    /// 活动ID (可选, 不传则返回用户在所有活动中的中奖记录)
    pub id: Option<i64>,
}

/// 中奖奖品数据 (仅暴露名称与兑换码)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeData {
    /// 奖品名称
    pub name: String,
    /// 兑换码
    pub code: String,
}

impl From<prize_entity::Model> for PrizeData {
    fn from(m: prize_entity::Model) -> Self {
        PrizeData {
            name: m.name,
            code: m.code,
        }
    }
}

/// 合作伙伴数据
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PartnerData {
    /// 名称
    pub name: String,
    /// 编码
    pub code: String,
    /// 官网地址
    pub url: String,
}

impl From<partner_entity::Model> for PartnerData {
    fn from(m: partner_entity::Model) -> Self {
        PartnerData {
            name: m.name,
            code: m.code,
            url: m.url,
        }
    }
}

/// 抽奖成功 / 中奖查询响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PromotionPlayResponse {
    /// 活动ID
    pub id: i64,
    /// 活动名称
    pub name: String,
    /// 活动开始日期
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    /// 中奖奖品
    pub prize: PrizeData,
    /// 合作伙伴 (找不到时省略)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<PartnerData>,
}

impl PromotionPlayResponse {
    pub fn assemble(
        promotion: &promotion_entity::Model,
        prize: prize_entity::Model,
        partner: Option<partner_entity::Model>,
    ) -> Self {
        PromotionPlayResponse {
            id: promotion.id,
            name: promotion.name.clone(),
            start_date: promotion.start_date,
            prize: prize.into(),
            partner: partner.map(Into::into),
        }
    }
}
