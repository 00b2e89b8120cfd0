//! 错误类型
//!
//! 查询未命中不是错误（返回空名要素），这里只收录真正的失败：
//! 启动数据损坏、配置错误、传输失败，以及请求里缺失必填字段。

use thiserror::Error;
use tonic::Status;

#[derive(Debug, Error)]
pub enum GuideError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// GeoJSON 解析错误
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// 启动数据中第 index 条记录无效
    #[error("Invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },

    /// 请求消息缺少必填字段
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// 配置加载或校验失败
    #[error("Config error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// 对端返回的 RPC 状态
    #[error("RPC failed: {0}")]
    Rpc(#[from] Status),
}

impl From<GuideError> for Status {
    fn from(err: GuideError) -> Self {
        match err {
            GuideError::MissingField(_) => Status::invalid_argument(err.to_string()),
            GuideError::Rpc(status) => status,
            other => Status::internal(other.to_string()),
        }
    }
}
