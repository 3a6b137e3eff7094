// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::info;
use url::Url;
use validator::Validate;

use crate::application::dto::crawl_request::CrawlRequestDto;
use crate::application::dto::task_response::CrawlCreatedDto;
use crate::config::settings::Settings;
use crate::domain::models::job::Job;
use crate::presentation::errors::ApiError;
use crate::queue::work_queue::WorkQueue;
use crate::store::task_store::TaskStore;

/// 提交爬取任务
///
/// 校验通过后在任务存储里创建Pending记录、入队并立即返回
/// 任务ID；抓取在后台由工作器完成。
pub async fn create_crawl(
    Extension(store): Extension<Arc<TaskStore>>,
    Extension(queue): Extension<Arc<WorkQueue>>,
    Extension(settings): Extension<Arc<Settings>>,
    Json(payload): Json<CrawlRequestDto>,
) -> Result<Json<CrawlCreatedDto>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let urls = payload.urls.clone().into_vec();
    if urls.is_empty() {
        return Err(ApiError::Validation("urls cannot be empty".to_string()));
    }
    for url in &urls {
        let parsed =
            Url::parse(url).map_err(|_| ApiError::Validation(format!("invalid url: {url}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ApiError::Validation(format!(
                "unsupported url scheme: {url}"
            )));
        }
    }

    if let Some(schema) = &payload.schema {
        schema
            .validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;
    }

    let page_timeout_ms = payload
        .page_timeout_ms
        .unwrap_or(settings.dispatcher.page_timeout_ms)
        .clamp(1000, 60000);

    let job = Job::new(urls, payload.priority, page_timeout_ms, payload.schema);
    let priority = job.priority;
    let url_count = job.urls.len();

    // Pending in the store first, then visible to workers
    let task_id = store.create(job);
    queue.push(task_id, priority);

    info!(
        "Job {} submitted ({} urls, priority {})",
        task_id, url_count, priority
    );
    Ok(Json(CrawlCreatedDto { task_id }))
}
