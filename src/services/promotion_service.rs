use crate::config::DrawConfig;
use crate::entities::{
    partner_entity as partners, prize_entity as prizes, promotion_entity as promotions,
    winning_entity as winnings,
};
use crate::error::{AppError, AppResult};
use crate::models::{PromotionPlayResponse, Violation};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// 禁止抽奖时段边界 (闭区间, 以当天零点起的秒数表示):
/// [00:00:00, 09:00:00] 与 [20:00:00, 23:59:59]
const MORNING_BLACKOUT_END_SECS: u32 = 9 * 3600;
const EVENING_BLACKOUT_START_SECS: u32 = 20 * 3600;

/// 客户端兜底超时在服务端 lock_timeout 之后触发
const LOCK_WAIT_GRACE: Duration = Duration::from_secs(1);

/// 某一天可抽取的奖品池窗口 (基于奖品创建顺序)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySegment {
    pub offset: u64,
    pub limit: u64,
}

/// 当前时刻是否允许抽奖 (true = 允许)
pub fn within_draw_hours(time: NaiveTime) -> bool {
    let secs = time.num_seconds_from_midnight();
    secs > MORNING_BLACKOUT_END_SECS && secs < EVENING_BLACKOUT_START_SECS
}

/// 计算某天可用的奖品池窗口。
///
/// 窗口永远基于完整的、未过滤的奖品创建顺序计算:
/// 第一天取前一半 (向上取整), 第二天取剩余部分。
/// 这样无论已有多少奖品被赢取, 两天的边界都不会漂移。
pub fn day_segment(total: u64, start_date: NaiveDate, today: NaiveDate) -> DaySegment {
    let half = total.div_ceil(2);

    if today == start_date {
        DaySegment {
            offset: 0,
            limit: half,
        }
    } else {
        DaySegment {
            offset: half,
            limit: total - half,
        }
    }
}

/// 从候选奖品中等概率随机挑选一个, 候选为空时返回 None。不做任何持久化。
pub fn pick_random(candidates: &[prizes::Model]) -> Option<&prizes::Model> {
    if candidates.is_empty() {
        return None;
    }

    let index = rand::thread_rng().gen_range(0..candidates.len());
    candidates.get(index)
}

/// Postgres 在 lock_timeout 到期时以 SQLSTATE 55P03 中止当前语句
fn is_lock_timeout(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("55P03") || msg.contains("lock timeout")
}

#[derive(Clone)]
pub struct PromotionService {
    // Arc because DatabaseConnection is not Clone when sea-orm's `mock`
    // feature is enabled (as it is for tests)
    pool: Arc<DatabaseConnection>,
    lock_wait: Duration,
    conflict_retries: u32,
}

impl PromotionService {
    pub fn new(pool: DatabaseConnection, draw: &DrawConfig) -> Self {
        Self {
            pool: Arc::new(pool),
            lock_wait: Duration::from_millis(draw.lock_wait_timeout_ms),
            conflict_retries: draw.conflict_retries,
        }
    }

    /// 抽奖主流程:
    /// 1. 查找活动 (不存在 -> NotFound)
    /// 2. 资格校验 (日期窗口 / 禁抽时段 / 当天已中奖), 违规则全部收集后返回
    /// 3. 解析当天可用候选奖品并随机挑选一个
    /// 4. 在事务内锁定奖品、复核 is_won 并写入中奖记录
    /// 5. 分配冲突时重新解析候选并重选, 次数受 conflict_retries 限制
    pub async fn play(
        &self,
        user_id: i64,
        promotion_id: i64,
        now: NaiveDateTime,
        locale: &str,
    ) -> AppResult<PromotionPlayResponse> {
        let promotion = promotions::Entity::find_by_id(promotion_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Promotion not found".to_string()))?;

        let violations = self.validate(user_id, &promotion, now).await?;

        if !violations.is_empty() {
            return Err(AppError::Eligibility(violations));
        }

        let today = now.date();
        let mut attempts = 0u32;

        loop {
            // 每次尝试都重新解析候选池, 避免重复撞上已被拿走的奖品
            let candidates = self.resolve_candidates(&promotion, today).await?;

            let Some(prize) = pick_random(&candidates) else {
                return Err(AppError::NoPrizesLeft);
            };

            match self.allocate(user_id, &promotion, prize.id, today).await {
                Ok(winning) => {
                    log::info!(
                        "User {} won prize {} in promotion {} (winning {}, locale {})",
                        user_id,
                        prize.code,
                        promotion.id,
                        winning.id,
                        locale
                    );

                    let partner = self.find_partner(&prize.partner_code).await?;
                    return Ok(PromotionPlayResponse::assemble(
                        &promotion,
                        prize.clone(),
                        partner,
                    ));
                }
                Err(AppError::PrizeConflict) if attempts < self.conflict_retries => {
                    attempts += 1;
                    log::info!(
                        "Prize {} was taken by a concurrent draw, reselecting (attempt {})",
                        prize.id,
                        attempts
                    );
                }
                Err(AppError::PrizeConflict) => {
                    // 重试耗尽, 对调用方表现为奖品池已空
                    return Err(AppError::NoPrizesLeft);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 资格校验 (只读, 不短路, 收集所有违规原因)
    pub async fn validate(
        &self,
        user_id: i64,
        promotion: &promotions::Model,
        now: NaiveDateTime,
    ) -> AppResult<Vec<Violation>> {
        let mut violations = Vec::new();

        let (first_day, second_day) = promotion.promotion_days();
        let today = now.date();

        if today != first_day && today != second_day {
            violations.push(Violation::OutsideDate);
        }

        if !within_draw_hours(now.time()) {
            violations.push(Violation::OutsideHours);
        }

        // 同一用户同一活动每天只能中奖一次
        let played = winnings::Entity::find()
            .filter(winnings::Column::UserId.eq(user_id))
            .filter(winnings::Column::PromotionId.eq(promotion.id))
            .filter(winnings::Column::Date.eq(today))
            .one(self.pool.as_ref())
            .await?;

        if played.is_some() {
            violations.push(Violation::UserPlayed);
        }

        Ok(violations)
    }

    /// 解析当天仍可抽取的候选奖品 (无锁读取, 竞争在分配事务中解决)
    async fn resolve_candidates(
        &self,
        promotion: &promotions::Model,
        today: NaiveDate,
    ) -> AppResult<Vec<prizes::Model>> {
        // 窗口基于全部奖品计算, 与已赢取状态无关
        let total = prizes::Entity::find()
            .filter(prizes::Column::PromotionId.eq(promotion.id))
            .count(self.pool.as_ref())
            .await?;

        let segment = day_segment(total, promotion.start_date, today);

        if segment.limit == 0 {
            return Ok(Vec::new());
        }

        let window = prizes::Entity::find()
            .filter(prizes::Column::PromotionId.eq(promotion.id))
            .order_by_asc(prizes::Column::Id)
            .offset(segment.offset)
            .limit(segment.limit)
            .all(self.pool.as_ref())
            .await?;

        if window.is_empty() {
            return Ok(Vec::new());
        }

        // 防御性二次过滤: 即使 is_won 状态过期, 已有中奖记录的奖品也绝不能再出现在候选中
        let window_ids: Vec<i64> = window.iter().map(|p| p.id).collect();
        let won_ids: HashSet<i64> = winnings::Entity::find()
            .filter(winnings::Column::PrizeId.is_in(window_ids))
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|w| w.prize_id)
            .collect();

        Ok(window
            .into_iter()
            .filter(|p| !p.is_won && !won_ids.contains(&p.id))
            .collect())
    }

    /// 原子分配一个奖品:
    /// 事务内以排它行锁重读奖品, 复核 is_won 后写入中奖记录并翻转标志。
    /// 锁等待有超时上限; 任何失败路径都会回滚整个事务。
    async fn allocate(
        &self,
        user_id: i64,
        promotion: &promotions::Model,
        prize_id: i64,
        today: NaiveDate,
    ) -> AppResult<winnings::Model> {
        let txn = self.pool.begin().await?;

        // 锁等待上限设在服务端: 超过后 Postgres 自己中止等待,
        // 不会出现连接仍挂在行锁上而调用方早已放弃的情况
        txn.execute_unprepared(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_wait.as_millis()
        ))
        .await?;

        let locked = match tokio::time::timeout(
            self.lock_wait + LOCK_WAIT_GRACE,
            prizes::Entity::find_by_id(prize_id)
                .lock_exclusive()
                .one(&txn),
        )
        .await
        {
            Ok(Ok(found)) => found,
            Ok(Err(err)) if is_lock_timeout(&err) => {
                txn.rollback().await?;
                return Err(AppError::LockTimeout);
            }
            // 事务随 drop 回滚
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => {
                txn.rollback().await?;
                return Err(AppError::LockTimeout);
            }
        };

        // 奖品在选择与加锁之间被删除, 按冲突处理让调用方重选
        let Some(locked) = locked else {
            txn.rollback().await?;
            return Err(AppError::PrizeConflict);
        };

        // 持锁复核: 并发的另一次分配可能已经拿走了这个奖品
        if locked.is_won {
            txn.rollback().await?;
            return Err(AppError::PrizeConflict);
        }

        let winning = winnings::ActiveModel {
            user_id: Set(user_id),
            prize_id: Set(locked.id),
            promotion_id: Set(promotion.id),
            date: Set(today),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut prize = locked.into_active_model();
        prize.is_won = Set(true);
        prize.updated_at = Set(Some(Utc::now()));
        prize.update(&txn).await?;

        txn.commit().await?;

        Ok(winning)
    }

    /// 查询用户的中奖记录, 可按活动过滤 (活动不存在 -> NotFound)
    pub async fn check_winnings(
        &self,
        user_id: i64,
        promotion_id: Option<i64>,
    ) -> AppResult<Vec<PromotionPlayResponse>> {
        let mut query = winnings::Entity::find().filter(winnings::Column::UserId.eq(user_id));

        if let Some(id) = promotion_id {
            promotions::Entity::find_by_id(id)
                .one(self.pool.as_ref())
                .await?
                .ok_or_else(|| AppError::NotFound("Promotion not found".to_string()))?;

            query = query.filter(winnings::Column::PromotionId.eq(id));
        }

        let wins = query
            .order_by_asc(winnings::Column::Id)
            .all(self.pool.as_ref())
            .await?;

        let mut response = Vec::with_capacity(wins.len());

        for win in wins {
            // 中奖记录只存ID, 显式加载奖品与活动
            let Some(prize) = prizes::Entity::find_by_id(win.prize_id).one(self.pool.as_ref()).await?
            else {
                continue;
            };
            let Some(promotion) = promotions::Entity::find_by_id(win.promotion_id)
                .one(self.pool.as_ref())
                .await?
            else {
                continue;
            };

            let partner = self.find_partner(&prize.partner_code).await?;
            response.push(PromotionPlayResponse::assemble(&promotion, prize, partner));
        }

        Ok(response)
    }

    async fn find_partner(&self, code: &str) -> AppResult<Option<partners::Model>> {
        let partner = partners::Entity::find()
            .filter(partners::Column::Code.eq(code))
            .one(self.pool.as_ref())
            .await?;

        Ok(partner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn promotion(id: i64, start: NaiveDate) -> promotions::Model {
        promotions::Model {
            id,
            name: "Spring promotion".to_string(),
            start_date: start,
            created_at: None,
            updated_at: None,
        }
    }

    fn prize(id: i64, promotion_id: i64, is_won: bool) -> prizes::Model {
        prizes::Model {
            id,
            promotion_id,
            partner_code: format!("pt{id}"),
            name: format!("Prize {id}"),
            description: None,
            code: format!("pr{id}"),
            is_won,
            created_at: None,
            updated_at: None,
        }
    }

    fn winning(id: i64, user_id: i64, prize_id: i64, promotion_id: i64, d: NaiveDate) -> winnings::Model {
        winnings::Model {
            id,
            user_id,
            prize_id,
            promotion_id,
            date: d,
            created_at: None,
        }
    }

    /// PaginatorTrait::count 期望一行 num_items
    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        std::collections::BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(n)))])
    }

    #[test]
    fn test_draw_hours_boundaries() {
        // 上午禁抽时段为闭区间 [00:00:00, 09:00:00]
        assert!(!within_draw_hours(time(0, 0, 0)));
        assert!(!within_draw_hours(time(8, 59, 59)));
        assert!(!within_draw_hours(time(9, 0, 0)));
        assert!(within_draw_hours(time(9, 0, 1)));

        // 晚间禁抽时段为闭区间 [20:00:00, 23:59:59]
        assert!(within_draw_hours(time(12, 0, 0)));
        assert!(within_draw_hours(time(19, 59, 59)));
        assert!(!within_draw_hours(time(20, 0, 0)));
        assert!(!within_draw_hours(time(23, 59, 59)));
    }

    #[test]
    fn test_day_segment_even_pool() {
        let start = date(2023, 4, 3);

        let first = day_segment(10, start, start);
        assert_eq!(first, DaySegment { offset: 0, limit: 5 });

        let second = day_segment(10, start, date(2023, 4, 4));
        assert_eq!(second, DaySegment { offset: 5, limit: 5 });
    }

    #[test]
    fn test_day_segment_odd_pool() {
        let start = date(2023, 4, 3);

        // 奇数个奖品: 第一天拿到向上取整的一半
        let first = day_segment(7, start, start);
        assert_eq!(first, DaySegment { offset: 0, limit: 4 });

        let second = day_segment(7, start, date(2023, 4, 4));
        assert_eq!(second, DaySegment { offset: 4, limit: 3 });
    }

    #[test]
    fn test_day_segment_tiny_pools() {
        let start = date(2023, 4, 3);

        assert_eq!(day_segment(0, start, start), DaySegment { offset: 0, limit: 0 });
        assert_eq!(
            day_segment(0, start, date(2023, 4, 4)),
            DaySegment { offset: 0, limit: 0 }
        );

        // 单个奖品归第一天, 第二天窗口为空
        assert_eq!(day_segment(1, start, start), DaySegment { offset: 0, limit: 1 });
        assert_eq!(
            day_segment(1, start, date(2023, 4, 4)),
            DaySegment { offset: 1, limit: 0 }
        );
    }

    #[test]
    fn test_promotion_days_span() {
        let p = promotion(1, date(2023, 4, 3));
        assert_eq!(p.promotion_days(), (date(2023, 4, 3), date(2023, 4, 4)));
    }

    #[test]
    fn test_pick_random_empty_and_single() {
        assert!(pick_random(&[]).is_none());

        let only = vec![prize(1, 1, false)];
        assert_eq!(pick_random(&only).map(|p| p.id), Some(1));
    }

    #[test]
    fn test_lock_timeout_error_detection() {
        assert!(is_lock_timeout(&DbErr::Custom(
            "canceling statement due to lock timeout".to_string()
        )));
        assert!(is_lock_timeout(&DbErr::Custom(
            "error returned from database: 55P03".to_string()
        )));
        assert!(!is_lock_timeout(&DbErr::Custom(
            "duplicate key value violates unique constraint".to_string()
        )));
    }

    #[test]
    fn test_pick_random_stays_in_candidates() {
        let candidates = vec![prize(1, 1, false), prize(2, 1, false), prize(3, 1, false)];

        for _ in 0..100 {
            let picked = pick_random(&candidates).expect("non-empty candidates");
            assert!(candidates.iter().any(|p| p.id == picked.id));
        }
    }

    #[tokio::test]
    async fn test_validate_passes_inside_window() {
        // 当天无中奖记录
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<winnings::Model>::new()])
            .into_connection();
        let service = PromotionService::new(db, &DrawConfig::default());

        let p = promotion(1, date(2023, 4, 3));
        let now = date(2023, 4, 3).and_time(time(10, 0, 0));

        let violations = service.validate(7, &p, now).await.unwrap();
        assert!(violations.is_empty());
    }

    #[tokio::test]
    async fn test_validate_collects_every_violation() {
        // 已有中奖记录 + 日期越界 + 禁抽时段, 三个原因一次性返回
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![winning(1, 7, 3, 1, date(2023, 4, 5))]])
            .into_connection();
        let service = PromotionService::new(db, &DrawConfig::default());

        let p = promotion(1, date(2023, 4, 3));
        let now = date(2023, 4, 5).and_time(time(8, 59, 59));

        let violations = service.validate(7, &p, now).await.unwrap();
        assert_eq!(
            violations,
            vec![
                Violation::OutsideDate,
                Violation::OutsideHours,
                Violation::UserPlayed
            ]
        );
    }

    #[tokio::test]
    async fn test_validate_user_played_today() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![winning(1, 7, 3, 1, date(2023, 4, 3))]])
            .into_connection();
        let service = PromotionService::new(db, &DrawConfig::default());

        let p = promotion(1, date(2023, 4, 3));
        let now = date(2023, 4, 3).and_time(time(10, 0, 0));

        let violations = service.validate(7, &p, now).await.unwrap();
        assert_eq!(violations, vec![Violation::UserPlayed]);
    }

    #[tokio::test]
    async fn test_allocate_commits_winning_and_flips_flag() {
        let start = date(2023, 4, 3);
        let won = winnings::Model {
            id: 42,
            user_id: 7,
            prize_id: 3,
            promotion_id: 1,
            date: start,
            created_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // 持锁重读 -> 尚未被赢取
            .append_query_results([vec![prize(3, 1, false)]])
            // 中奖记录插入
            .append_query_results([vec![won.clone()]])
            // 奖品 is_won 翻转
            .append_query_results([vec![prize(3, 1, true)]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 42,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 3,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let service = PromotionService::new(db, &DrawConfig::default());

        let p = promotion(1, start);
        let result = service.allocate(7, &p, 3, start).await.unwrap();

        assert_eq!(result.id, 42);
        assert_eq!(result.prize_id, 3);
        assert_eq!(result.user_id, 7);
        assert_eq!(result.date, start);
    }

    #[tokio::test]
    async fn test_allocate_fails_closed_when_prize_already_won() {
        // 持锁复核发现 is_won=true, 必须回滚并报冲突, 绝不重复发奖
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![prize(3, 1, true)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let service = PromotionService::new(db, &DrawConfig::default());

        let p = promotion(1, date(2023, 4, 3));
        let result = service.allocate(7, &p, 3, date(2023, 4, 3)).await;

        assert!(matches!(result, Err(AppError::PrizeConflict)));
    }

    #[tokio::test]
    async fn test_allocate_conflict_when_prize_disappeared() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<prizes::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let service = PromotionService::new(db, &DrawConfig::default());

        let p = promotion(1, date(2023, 4, 3));
        let result = service.allocate(7, &p, 3, date(2023, 4, 3)).await;

        assert!(matches!(result, Err(AppError::PrizeConflict)));
    }

    #[tokio::test]
    async fn test_play_awards_prize_from_day_window() {
        let start = date(2023, 4, 3);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // 活动查找
            .append_query_results([vec![promotion(1, start)]])
            // 资格校验: 当天无中奖记录
            .append_query_results([Vec::<winnings::Model>::new()])
            // 奖品总数 -> 当天窗口
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![prize(3, 1, false)]])
            // 窗口内奖品均无中奖记录
            .append_query_results([Vec::<winnings::Model>::new()])
            // 持锁重读 -> 插入中奖记录 -> 翻转 is_won
            .append_query_results([vec![prize(3, 1, false)]])
            .append_query_results([vec![winning(42, 7, 3, 1, start)]])
            .append_query_results([vec![prize(3, 1, true)]])
            // 合作伙伴不存在, 响应省略 partner
            .append_query_results([Vec::<partners::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 42,
                rows_affected: 1,
            }])
            .into_connection();
        let service = PromotionService::new(db, &DrawConfig::default());

        let now = start.and_time(time(10, 0, 0));
        let response = service.play(7, 1, now, "en").await.unwrap();

        assert_eq!(response.id, 1);
        assert_eq!(response.prize.code, "pr3");
        assert!(response.partner.is_none());
    }

    #[tokio::test]
    async fn test_play_no_prizes_left_when_window_exhausted() {
        // 当天窗口内的奖品全部已被赢取
        let start = date(2023, 4, 3);
        let won_window: Vec<prizes::Model> = (1..=5).map(|id| prize(id, 1, true)).collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![promotion(1, start)]])
            .append_query_results([Vec::<winnings::Model>::new()])
            .append_query_results([vec![count_row(10)]])
            .append_query_results([won_window])
            .append_query_results([Vec::<winnings::Model>::new()])
            .into_connection();
        let service = PromotionService::new(db, &DrawConfig::default());

        let now = start.and_time(time(10, 0, 0));
        let result = service.play(7, 1, now, "en").await;

        assert!(matches!(result, Err(AppError::NoPrizesLeft)));
    }

    #[tokio::test]
    async fn test_play_drops_stale_prize_referenced_by_winning() {
        // is_won 仍为 false 但已有中奖记录指向它: 防御性过滤必须将其剔除
        let start = date(2023, 4, 3);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![promotion(1, start)]])
            .append_query_results([Vec::<winnings::Model>::new()])
            .append_query_results([vec![count_row(2)]])
            .append_query_results([vec![prize(1, 1, false)]])
            .append_query_results([vec![winning(9, 99, 1, 1, start)]])
            .into_connection();
        let service = PromotionService::new(db, &DrawConfig::default());

        let now = start.and_time(time(10, 0, 0));
        let result = service.play(7, 1, now, "en").await;

        assert!(matches!(result, Err(AppError::NoPrizesLeft)));
    }

    #[tokio::test]
    async fn test_play_surfaces_no_prizes_left_after_conflict_retries() {
        // 每次分配都在持锁复核时发现奖品已被拿走:
        // 冲突 -> 重新解析候选 -> 再冲突 -> 重试耗尽后对外表现为奖品池已空
        let start = date(2023, 4, 3);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![promotion(1, start)]])
            .append_query_results([Vec::<winnings::Model>::new()])
            // 第一次尝试
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![prize(3, 1, false)]])
            .append_query_results([Vec::<winnings::Model>::new()])
            .append_query_results([vec![prize(3, 1, true)]])
            // 冲突后重选: 候选重新解析
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![prize(3, 1, false)]])
            .append_query_results([Vec::<winnings::Model>::new()])
            .append_query_results([vec![prize(3, 1, true)]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let service = PromotionService::new(
            db,
            &DrawConfig {
                lock_wait_timeout_ms: 5_000,
                conflict_retries: 1,
            },
        );

        let now = start.and_time(time(10, 0, 0));
        let result = service.play(7, 1, now, "en").await;

        assert!(matches!(result, Err(AppError::NoPrizesLeft)));
    }
}
