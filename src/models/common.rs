use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 错误响应体中的 error 对象 (资格校验失败时 message 换成 reasons 列表)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}
