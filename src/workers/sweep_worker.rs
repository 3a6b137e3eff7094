// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use crate::store::task_store::TaskStore;

/// 任务保留清理工作器
///
/// 定期扫描任务存储，删除超过保留时间的终态任务。
/// Pending和Running的任务不受影响。
pub struct SweepWorker {
    store: Arc<TaskStore>,
    retention: Duration,
    interval: Duration,
}

impl SweepWorker {
    pub fn new(store: Arc<TaskStore>, retention: Duration, interval: Duration) -> Self {
        Self {
            store,
            retention,
            interval,
        }
    }

    /// 运行工作器
    pub async fn run(&self) {
        info!(
            "Sweep worker started (retention {}s, interval {}s)",
            self.retention.as_secs(),
            self.interval.as_secs()
        );

        let mut interval = tokio::time::interval(self.interval);
        // First tick fires immediately; skip it so a fresh store is not
        // swept at startup
        interval.tick().await;

        loop {
            interval.tick().await;
            let removed = self.store.sweep(self.retention);
            if removed > 0 {
                info!("Swept {} expired jobs", removed);
            }
        }
    }

    /// 启动后台运行
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}
