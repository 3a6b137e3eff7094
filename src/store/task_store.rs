// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::job::{DomainError, Job};

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    /// 任务不存在
    #[error("Task not found")]
    NotFound,

    /// 状态转换违反单调规则
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// 任务存储
///
/// 以任务ID为键的内存存储。任务记录整体以Arc持有，
/// 更新时原子地替换整条记录而不是就地改字段，
/// 读者拿到的快照要么是更新前的、要么是更新后的，
/// 不会读到半新半旧的状态。
#[derive(Default)]
pub struct TaskStore {
    jobs: DashMap<Uuid, Arc<Job>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入新任务
    ///
    /// # 参数
    ///
    /// * `job` - Pending状态的新任务
    ///
    /// # 返回值
    ///
    /// 任务的唯一标识符
    pub fn create(&self, job: Job) -> Uuid {
        let id = job.id;
        // v4 collisions are not a practical concern; an existing entry
        // here means a caller reused a Job
        debug_assert!(!self.jobs.contains_key(&id));
        self.jobs.insert(id, Arc::new(job));
        id
    }

    /// 按ID读取任务快照
    pub fn get(&self, id: &Uuid) -> Option<Arc<Job>> {
        self.jobs.get(id).map(|entry| entry.value().clone())
    }

    /// 应用一次状态转换
    ///
    /// 在持有分片锁的情况下克隆当前记录、应用转换、整体替换，
    /// 同一任务的并发更新因此被串行化。
    ///
    /// # 参数
    ///
    /// * `id` - 任务ID
    /// * `transition` - 消费旧任务、产出新任务的转换函数
    ///
    /// # 返回值
    ///
    /// * `Ok(Arc<Job>)` - 更新后的任务快照
    /// * `Err(StoreError)` - 任务不存在或转换无效
    pub fn update<F>(&self, id: Uuid, transition: F) -> Result<Arc<Job>, StoreError>
    where
        F: FnOnce(Job) -> Result<Job, DomainError>,
    {
        let mut entry = self.jobs.get_mut(&id).ok_or(StoreError::NotFound)?;
        let updated = Arc::new(transition(entry.value().as_ref().clone())?);
        *entry.value_mut() = updated.clone();
        Ok(updated)
    }

    /// 删除任务
    ///
    /// # 返回值
    ///
    /// 如果存在并被删除则返回true
    pub fn delete(&self, id: &Uuid) -> bool {
        self.jobs.remove(id).is_some()
    }

    /// 清理超过保留时间的终态任务
    ///
    /// Pending和Running的任务永远不会被清理。
    ///
    /// # 参数
    ///
    /// * `retention` - 终态后的保留时长
    ///
    /// # 返回值
    ///
    /// 被清理的任务数量
    pub fn sweep(&self, retention: Duration) -> usize {
        let cutoff = Utc::now()
            - ChronoDuration::from_std(retention).unwrap_or_else(|_| ChronoDuration::seconds(0));
        let before = self.jobs.len();
        self.jobs.retain(|_, job| {
            !(job.status.is_terminal()
                && job.completed_at.map(|t| t < cutoff).unwrap_or(false))
        });
        before - self.jobs.len()
    }

    /// 当前存储的任务数量
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
