// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::settings::DispatcherSettings;
use crate::engines::traits::{ContentExtractor, PageFetcher};
use crate::queue::work_queue::WorkQueue;
use crate::sink::result_sink::ResultSink;
use crate::store::task_store::TaskStore;
use crate::workers::crawl_worker::CrawlWorker;

/// 工作管理器
///
/// 启动固定数量的爬取工作器并负责优雅停机。工作器数量就是
/// 系统的并发抓取上限：每个工作器同一时刻只处理一个任务，
/// 任务内的URL又是顺序处理的。
pub struct WorkerManager {
    store: Arc<TaskStore>,
    queue: Arc<WorkQueue>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ContentExtractor>,
    sink: Arc<ResultSink>,
    settings: DispatcherSettings,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(
        store: Arc<TaskStore>,
        queue: Arc<WorkQueue>,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ContentExtractor>,
        sink: Arc<ResultSink>,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            store,
            queue,
            fetcher,
            extractor,
            sink,
            settings,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// 创建并启动指定数量的工作进程
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub fn start_workers(&mut self, count: usize) {
        for _ in 0..count {
            let worker = CrawlWorker::new(
                self.store.clone(),
                self.fetcher.clone(),
                self.extractor.clone(),
                self.sink.clone(),
                &self.settings,
            );

            let queue = self.queue.clone();
            // Each worker loop runs on its own task so slow fetches in one
            // worker never stall the others
            let handle = tokio::spawn(async move {
                worker.run(queue).await;
            });
            self.handles.push(handle);
        }
        info!("Started {} crawl workers", count);
    }

    /// 关闭队列并等待所有工作器退出
    ///
    /// 队列里已有的任务会被取完，之后工作器自行退出。
    pub async fn shutdown(&mut self) {
        info!("Shutting down workers...");
        self.queue.close();
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
        info!("Workers shut down successfully");
    }
}
