// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 应用错误类型
///
/// 封装所有面向客户端的错误，提供统一的错误响应格式。
/// 校验和认证错误在到达任务存储之前就被拒绝。
#[derive(Error, Debug)]
pub enum ApiError {
    /// 请求不合法（400）
    #[error("Validation error: {0}")]
    Validation(String),

    /// 缺少或无效的令牌（401）
    #[error("Unauthorized")]
    Unauthorized,

    /// 任务不存在（404）
    #[error("Task not found")]
    NotFound,

    /// 任务当前状态不允许该操作（409）
    #[error("{0}")]
    Conflict(String),

    /// 内部错误（500）
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
