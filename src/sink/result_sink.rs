// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::domain::models::job::Job;

/// 落盘错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 结果落盘器
///
/// 任务进入终态后，把产物写到 `<output_dir>/<job_id>/` 下：
/// results.jsonl（成功记录）、errors.jsonl（失败记录）、
/// stats.json（汇总统计）、metadata.json（任务元数据）。
/// 写入是尽力而为的，失败只记日志，不影响任务终态。
pub struct ResultSink {
    output_dir: PathBuf,
}

impl ResultSink {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// 任务产物目录
    pub fn job_dir(&self, job: &Job) -> PathBuf {
        self.output_dir.join(job.id.to_string())
    }

    /// 写出一个终态任务的全部产物
    ///
    /// # 参数
    ///
    /// * `job` - 终态任务（records/stats已填充）
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 全部产物写出成功
    /// * `Err(SinkError)` - 任一产物写出失败
    pub async fn write_job(&self, job: &Job) -> Result<(), SinkError> {
        let dir = self.job_dir(job);
        fs::create_dir_all(&dir).await?;

        let metadata = json!({
            "job_id": job.id,
            "submitted_at": job.submitted_at,
            "priority": job.priority,
            "urls": job.urls,
        });
        fs::write(dir.join("metadata.json"), serde_json::to_vec_pretty(&metadata)?).await?;

        let mut results = String::new();
        let mut errors = String::new();
        for record in &job.records {
            if record.is_success() {
                results.push_str(&serde_json::to_string(record)?);
                results.push('\n');
            } else {
                let entry = json!({
                    "url": record.url,
                    "error": record.error,
                });
                errors.push_str(&serde_json::to_string(&entry)?);
                errors.push('\n');
            }
        }
        fs::write(dir.join("results.jsonl"), results).await?;
        fs::write(dir.join("errors.jsonl"), errors).await?;

        if let Some(stats) = &job.stats {
            fs::write(dir.join("stats.json"), serde_json::to_vec_pretty(stats)?).await?;
        }

        debug!("Artifacts for job {} written to {}", job.id, dir.display());
        Ok(())
    }
}
