use crate::models::*;
use crate::services::PromotionService;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Local;
use serde_json::json;

/// 从请求扩展中获取用户ID（中间件在鉴权后注入）
fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

/// 从 Accept-Language 取首选语言, 缺省为 en
fn get_locale_from_request(req: &HttpRequest) -> String {
    req.headers()
        .get("Accept-Language")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "en".to_string())
}

#[utoipa::path(
    get,
    path = "/promotions/{id}/play",
    tag = "promotions",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖成功, 返回奖品与合作伙伴信息", body = PromotionPlayResponse),
        (status = 400, description = "资格校验失败 (outsideDate / outsideHours / userPlayed)"),
        (status = 401, description = "未授权"),
        (status = 404, description = "活动不存在或奖品已抽完"),
        (status = 500, description = "内部错误")
    )
)]
/// 在活动中抽奖:
/// 1. 资格校验 (两天日期窗口 / 禁抽时段 / 当天是否已中奖)
/// 2. 按当天奖品池窗口随机挑选
/// 3. 事务内加锁复核并写入中奖记录
pub async fn play(
    service: web::Data<PromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    let locale = get_locale_from_request(&req);
    let now = Local::now().naive_local();

    match service
        .play(user_id, path.into_inner(), now, &locale)
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/promotions/check",
    tag = "promotions",
    params(
        ("id" = Option<i64>, Query, description = "活动ID (可选)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "返回用户的中奖记录列表", body = [PromotionPlayResponse]),
        (status = 401, description = "未授权"),
        (status = 404, description = "指定的活动不存在")
    )
)]
/// 查询用户的中奖记录 (可按活动过滤)
pub async fn check(
    service: web::Data<PromotionService>,
    req: HttpRequest,
    query: web::Query<WinningCheckQuery>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);

    match service.check_winnings(user_id, query.id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn promotion_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/promotions")
            .route("/check", web::get().to(check))
            .route("/{id}/play", web::get().to(play)),
    );
}
