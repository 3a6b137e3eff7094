// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::schema::ExtractionSchema;

/// 爬取任务实体
///
/// 表示一次提交的爬取作业：一组目标URL加上优先级和提取配置，
/// 从创建到终态被任务存储全程跟踪。记录字段（records/stats/error）
/// 只在进入终态时一次性写入，之前保持为空。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 目标URL列表，按提交顺序处理
    pub urls: Vec<String>,
    /// 任务优先级，数值越大越先被调度
    pub priority: i32,
    /// 任务状态，跟踪任务在其生命周期中的当前阶段
    pub status: JobStatus,
    /// 可选的结构化提取模式
    pub schema: Option<ExtractionSchema>,
    /// 单页抓取超时时间（毫秒）
    pub page_timeout_ms: u64,
    /// 提交时间
    pub submitted_at: DateTime<Utc>,
    /// 开始执行时间
    pub started_at: Option<DateTime<Utc>>,
    /// 进入终态的时间
    pub completed_at: Option<DateTime<Utc>>,
    /// 每个URL的爬取记录，终态时填充
    pub records: Vec<CrawlResult>,
    /// 汇总统计，终态时填充
    pub stats: Option<JobStats>,
    /// 整体失败原因，仅在Failed状态下填充
    pub error: Option<String>,
}

/// 任务状态枚举
///
/// 状态转换是单调的：
/// Pending → Running → Completed/Failed
/// 不允许逆向转换，终态后不再变化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 已创建但尚未被工作器认领
    #[default]
    Pending,
    /// 正在被某个工作器处理
    Running,
    /// 至少一个URL成功
    Completed,
    /// 所有URL都失败
    Failed,
}

impl JobStatus {
    /// 判断是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 单个URL的爬取记录
///
/// 由抓取和提取流水线产出，生成后不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// 目标URL
    pub url: String,
    /// 提取出的结构化内容，失败时为空
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    /// 失败原因，成功时为空
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 抓取耗时（毫秒）
    pub fetch_duration_ms: u64,
    /// 页面字节大小
    pub page_size_bytes: u64,
}

impl CrawlResult {
    pub fn success(
        url: impl Into<String>,
        content: serde_json::Value,
        fetch_duration_ms: u64,
        page_size_bytes: u64,
    ) -> Self {
        Self {
            url: url.into(),
            content: Some(content),
            error: None,
            fetch_duration_ms,
            page_size_bytes,
        }
    }

    pub fn failure(
        url: impl Into<String>,
        error: impl Into<String>,
        fetch_duration_ms: u64,
        page_size_bytes: u64,
    ) -> Self {
        Self {
            url: url.into(),
            content: None,
            error: Some(error.into()),
            fetch_duration_ms,
            page_size_bytes,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// 任务汇总统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStats {
    /// URL总数
    pub total: usize,
    /// 成功数
    pub succeeded: usize,
    /// 失败数
    pub failed: usize,
    /// 任务整体耗时（毫秒）
    pub duration_ms: u64,
}

impl JobStats {
    /// 根据爬取记录汇总统计
    pub fn from_records(records: &[CrawlResult], duration_ms: u64) -> Self {
        let succeeded = records.iter().filter(|r| r.is_success()).count();
        Self {
            total: records.len(),
            succeeded,
            failed: records.len() - succeeded,
            duration_ms,
        }
    }

    /// 根据统计决定终态
    ///
    /// 至少一个URL成功则为Completed，全部失败才算Failed。
    pub fn terminal_status(&self) -> JobStatus {
        if self.succeeded > 0 {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换，当任务状态转换不符合单调规则时发生
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// 验证错误，当输入数据不符合领域规则时发生
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Job {
    /// 创建一个新的任务
    ///
    /// # 参数
    ///
    /// * `urls` - 目标URL列表
    /// * `priority` - 优先级
    /// * `page_timeout_ms` - 单页抓取超时（毫秒）
    /// * `schema` - 可选的提取模式
    ///
    /// # 返回值
    ///
    /// Pending状态的新任务实例
    pub fn new(
        urls: Vec<String>,
        priority: i32,
        page_timeout_ms: u64,
        schema: Option<ExtractionSchema>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            urls,
            priority,
            status: JobStatus::Pending,
            schema,
            page_timeout_ms,
            submitted_at: Utc::now(),
            started_at: None,
            completed_at: None,
            records: Vec::new(),
            stats: None,
            error: None,
        }
    }

    /// 启动任务
    ///
    /// 将任务状态从Pending变更为Running
    ///
    /// # 返回值
    ///
    /// * `Ok(Job)` - 成功启动的任务
    /// * `Err(DomainError)` - 状态转换失败
    pub fn start(mut self) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Pending => {
                self.status = JobStatus::Running;
                self.started_at = Some(Utc::now());
                Ok(self)
            }
            from => Err(DomainError::InvalidTransition {
                from,
                to: JobStatus::Running,
            }),
        }
    }

    /// 结束任务
    ///
    /// 根据统计结果将任务从Running转入终态。全部URL失败时
    /// 状态为Failed，并把各URL的失败原因汇总为整体错误信息。
    ///
    /// # 参数
    ///
    /// * `records` - 每个URL的爬取记录
    /// * `stats` - 汇总统计
    ///
    /// # 返回值
    ///
    /// * `Ok(Job)` - 进入终态的任务
    /// * `Err(DomainError)` - 状态转换失败
    pub fn finish(mut self, records: Vec<CrawlResult>, stats: JobStats) -> Result<Self, DomainError> {
        let to = stats.terminal_status();
        match self.status {
            JobStatus::Running => {
                if to == JobStatus::Failed {
                    let reasons: Vec<String> = records
                        .iter()
                        .filter_map(|r| r.error.as_ref())
                        .map(|e| e.to_string())
                        .collect();
                    self.error = Some(reasons.join("; "));
                }
                self.status = to;
                self.records = records;
                self.stats = Some(stats);
                self.completed_at = Some(Utc::now());
                Ok(self)
            }
            from => Err(DomainError::InvalidTransition { from, to }),
        }
    }
}
