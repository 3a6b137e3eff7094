// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::settings::Settings;
use crate::presentation::handlers::{crawl_handler, task_handler};
use crate::presentation::middleware::auth_middleware::{auth_middleware, AuthState};
use crate::queue::work_queue::WorkQueue;
use crate::store::task_store::TaskStore;

/// 健康检查
///
/// 常数时间返回，不访问任务存储和队列，工作器全忙时也不阻塞。
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 版本信息
pub async fn version() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

/// 创建应用路由
///
/// 健康检查和版本端点公开，其余端点经过认证中间件。
///
/// # 参数
///
/// * `store` - 任务存储
/// * `queue` - 待处理队列
/// * `settings` - 应用配置
///
/// # 返回值
///
/// 返回配置好的路由
pub fn build_router(
    store: Arc<TaskStore>,
    queue: Arc<WorkQueue>,
    settings: Arc<Settings>,
) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version));

    let auth_state = AuthState {
        api_token: settings.auth.api_token.clone(),
    };

    let protected_routes = Router::new()
        .route("/crawl", post(crawl_handler::create_crawl))
        .route("/task/{task_id}", get(task_handler::get_task_status))
        .route("/task/{task_id}", delete(task_handler::cancel_task))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(Extension(store))
        .layer(Extension(queue))
        .layer(Extension(settings))
        .layer(TraceLayer::new_for_http())
}
