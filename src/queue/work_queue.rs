// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use tokio::sync::Notify;
use uuid::Uuid;

/// 队列中的一个待处理任务
///
/// 排序规则：优先级越高越先出队，同优先级按入队顺序先进先出。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueuedJob {
    id: Uuid,
    priority: i32,
    seq: u64,
}

impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher priority first, then lower sequence number
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
struct Inner {
    heap: BinaryHeap<QueuedJob>,
    /// 仍在排队的任务ID集合；取消只需把ID移出集合，
    /// 堆里的残留条目在出队时被跳过
    live: HashSet<Uuid>,
}

/// 待处理任务队列
///
/// 所有可变访问都在一把锁内完成，入队和出队互相原子。
/// 同一个任务在队列中最多出现一次（由live集合保证）。
#[derive(Default)]
pub struct WorkQueue {
    inner: Mutex<Inner>,
    seq: AtomicU64,
    notify: Notify,
    closed: AtomicBool,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入队一个Pending任务
    ///
    /// 立即返回，不等待任务被处理。
    ///
    /// # 参数
    ///
    /// * `id` - 任务ID
    /// * `priority` - 优先级，越大越先出队
    pub fn push(&self, id: Uuid, priority: i32) {
        let seq = self.seq.fetch_add(1, AtomicOrdering::Relaxed);
        {
            let mut inner = self.inner.lock();
            if !inner.live.insert(id) {
                // Already queued; a job never appears twice
                return;
            }
            inner.heap.push(QueuedJob { id, priority, seq });
        }
        self.notify.notify_one();
    }

    /// 出队优先级最高的任务
    ///
    /// 队列为空时挂起等待，队列关闭后返回None。
    pub async fn pop(&self) -> Option<Uuid> {
        loop {
            // Register interest before checking the heap, otherwise a push
            // or close landing between the check and the await is lost
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(id) = self.try_pop() {
                return Some(id);
            }
            if self.closed.load(AtomicOrdering::Acquire) {
                return None;
            }
            notified.await;
        }
    }

    /// 非阻塞出队
    pub fn try_pop(&self) -> Option<Uuid> {
        let mut inner = self.inner.lock();
        while let Some(entry) = inner.heap.pop() {
            if inner.live.remove(&entry.id) {
                return Some(entry.id);
            }
            // Cancelled entry, skip it
        }
        None
    }

    /// 取消一个仍在排队的任务
    ///
    /// # 返回值
    ///
    /// 任务还在队列里并被移除则返回true；任务已被工作器
    /// 认领（或根本不在队列里）则返回false。
    pub fn cancel(&self, id: &Uuid) -> bool {
        self.inner.lock().live.remove(id)
    }

    /// 当前排队任务数
    pub fn len(&self) -> usize {
        self.inner.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 关闭队列
    ///
    /// 已入队的任务仍会被取完，之后pop返回None，工作器退出。
    pub fn close(&self) {
        self.closed.store(true, AtomicOrdering::Release);
        self.notify.notify_waiters();
    }
}

#[cfg(test)]
#[path = "work_queue_test.rs"]
mod tests;
