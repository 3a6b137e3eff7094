// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::models::job::{CrawlResult, Job, JobStats, JobStatus};

/// 任务提交响应
#[derive(Debug, Serialize)]
pub struct CrawlCreatedDto {
    pub task_id: Uuid,
}

/// 任务结果载荷
#[derive(Debug, Serialize)]
pub struct TaskResultDto {
    pub records: Vec<CrawlResult>,
    pub stats: JobStats,
}

/// 任务状态快照
///
/// result只在终态任务上填充；部分失败的任务照常返回
/// Completed加上逐URL的错误记录，而不是一个笼统的失败。
#[derive(Debug, Serialize)]
pub struct TaskStatusDto {
    pub id: Uuid,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResultDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for TaskStatusDto {
    fn from(job: &Job) -> Self {
        let result = match (&job.stats, job.status.is_terminal()) {
            (Some(stats), true) => Some(TaskResultDto {
                records: job.records.clone(),
                stats: stats.clone(),
            }),
            _ => None,
        };

        Self {
            id: job.id,
            status: job.status,
            result,
            error: job.error.clone(),
        }
    }
}
