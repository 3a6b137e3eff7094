// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json, Path};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::application::dto::task_response::TaskStatusDto;
use crate::presentation::errors::ApiError;
use crate::queue::work_queue::WorkQueue;
use crate::store::task_store::TaskStore;

fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    // A malformed id is indistinguishable from an unknown one
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

/// 查询任务状态
///
/// # 返回值
///
/// 任务快照；部分失败的任务返回逐URL的错误记录
pub async fn get_task_status(
    Extension(store): Extension<Arc<TaskStore>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusDto>, ApiError> {
    let id = parse_task_id(&task_id)?;
    let job = store.get(&id).ok_or(ApiError::NotFound)?;
    Ok(Json(TaskStatusDto::from(job.as_ref())))
}

/// 取消排队中的任务
///
/// 只有还没被工作器认领的Pending任务才能取消；取消就是
/// 把任务移出队列并删除记录，没有其他副作用。Running和
/// 终态任务返回409。
pub async fn cancel_task(
    Extension(store): Extension<Arc<TaskStore>>,
    Extension(queue): Extension<Arc<WorkQueue>>,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_task_id(&task_id)?;
    let job = store.get(&id).ok_or(ApiError::NotFound)?;

    // The queue decides: a job that is no longer queued has been claimed
    if !queue.cancel(&id) {
        return Err(ApiError::Conflict(format!(
            "task is {} and can no longer be cancelled",
            job.status
        )));
    }

    store.delete(&id);
    info!("Job {} cancelled while pending", id);
    Ok(Json(json!({ "task_id": id, "cancelled": true })))
}
