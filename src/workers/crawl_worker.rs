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

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::settings::DispatcherSettings;
use crate::domain::models::job::{CrawlResult, Job, JobStats};
use crate::engines::traits::{ContentExtractor, FetchError, PageFetcher};
use crate::queue::work_queue::WorkQueue;
use crate::sink::result_sink::ResultSink;
use crate::store::task_store::{StoreError, TaskStore};

/// 爬取工作器
///
/// 一个工作器一次只处理一个任务：从队列认领后把任务转入
/// Running，按提交顺序逐个抓取并提取每个URL，单个URL的失败
/// 只记入该URL的记录，不影响同任务的其余URL，也绝不让工作器
/// 本身退出。全部URL处理完后按终态策略收尾并写出产物。
pub struct CrawlWorker {
    store: Arc<TaskStore>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ContentExtractor>,
    sink: Arc<ResultSink>,
    /// 超时重试次数，上限1次
    fetch_retries: u32,
    /// 可选的任务整体时限
    job_timeout: Option<Duration>,
    worker_id: Uuid,
}

impl CrawlWorker {
    /// 创建新的爬取工作器实例
    pub fn new(
        store: Arc<TaskStore>,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ContentExtractor>,
        sink: Arc<ResultSink>,
        settings: &DispatcherSettings,
    ) -> Self {
        Self {
            store,
            fetcher,
            extractor,
            sink,
            fetch_retries: settings.fetch_retries.min(1),
            job_timeout: settings.job_timeout_ms.map(Duration::from_millis),
            worker_id: Uuid::new_v4(),
        }
    }

    /// 运行爬取工作器
    ///
    /// 循环从队列认领任务直到队列关闭。
    pub async fn run(&self, queue: Arc<WorkQueue>) {
        info!("Crawl worker {} started", self.worker_id);

        while let Some(job_id) = queue.pop().await {
            if let Err(e) = self.process_job(job_id).await {
                error!("Worker {}: error processing job {}: {}", self.worker_id, job_id, e);
            }
        }

        info!("Crawl worker {} stopped", self.worker_id);
    }

    #[instrument(skip(self), fields(worker_id = %self.worker_id, job_id = %job_id))]
    async fn process_job(&self, job_id: Uuid) -> Result<()> {
        let job = match self.store.update(job_id, |j| j.start()) {
            Ok(job) => job,
            Err(StoreError::NotFound) => {
                // Deleted between enqueue and claim; nothing to do
                warn!("Job vanished before it could be claimed");
                return Ok(());
            }
            Err(e) => {
                // A queued job must be pending; anything else is an
                // internal inconsistency
                error!("Refusing to run job in unexpected state: {}", e);
                return Err(e.into());
            }
        };

        info!("Processing job ({} urls, priority {})", job.urls.len(), job.priority);
        let started = Instant::now();
        let deadline = self.job_timeout.map(|limit| started + limit);

        let mut records = Vec::with_capacity(job.urls.len());
        for url in &job.urls {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                // No cooperative cancel of an in-flight fetch; the budget
                // check runs between URLs
                records.push(CrawlResult::failure(
                    url,
                    "job timeout exceeded before fetch",
                    0,
                    0,
                ));
                continue;
            }
            records.push(self.crawl_url(url, &job).await);
        }

        let stats = JobStats::from_records(&records, started.elapsed().as_millis() as u64);
        info!(
            "Job finished: {}/{} urls succeeded in {}ms",
            stats.succeeded, stats.total, stats.duration_ms
        );

        let finished = self.store.update(job_id, move |j| j.finish(records, stats))?;

        // Best effort: the in-memory record is authoritative
        if let Err(e) = self.sink.write_job(&finished).await {
            error!("Failed to persist artifacts for job {}: {}", job_id, e);
        }

        Ok(())
    }

    /// 处理单个URL，永不失败
    ///
    /// 抓取、提取中的任何错误都折叠成该URL的失败记录。
    /// 只有超时会触发至多一次的内部重试。
    async fn crawl_url(&self, url: &str, job: &Job) -> CrawlResult {
        let timeout = Duration::from_millis(job.page_timeout_ms);
        let mut attempt = 0u32;

        loop {
            let outcome = match tokio::time::timeout(timeout, self.fetcher.fetch(url, timeout)).await
            {
                Ok(result) => result,
                // The dispatcher enforces the page timeout even if the
                // fetcher implementation ignores its argument
                Err(_) => Err(FetchError::Timeout(timeout.as_millis() as u64)),
            };

            match outcome {
                Ok(page) => {
                    let duration = page.fetch_duration_ms;
                    let size = page.size_bytes();
                    return match self.extractor.extract(&page, job.schema.as_ref()) {
                        Ok(content) => CrawlResult::success(url, content, duration, size),
                        Err(e) => {
                            warn!("Extraction failed for {}: {}", url, e);
                            CrawlResult::failure(url, e.to_string(), duration, size)
                        }
                    };
                }
                Err(e) if e.is_timeout() && attempt < self.fetch_retries => {
                    attempt += 1;
                    warn!("Fetch timed out for {}, retry {}/{}", url, attempt, self.fetch_retries);
                }
                Err(e) => {
                    warn!("Fetch failed for {}: {}", url, e);
                    return CrawlResult::failure(url, e.to_string(), 0, 0);
                }
            }
        }
    }
}
