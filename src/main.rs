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

use crawlq::config::settings::Settings;
use crawlq::engines::http_fetcher::HttpFetcher;
use crawlq::engines::markdown_extractor::MarkdownExtractor;
use crawlq::engines::traits::{ContentExtractor, PageFetcher};
use crawlq::presentation::routes;
use crawlq::queue::work_queue::WorkQueue;
use crawlq::sink::result_sink::ResultSink;
use crawlq::store::task_store::TaskStore;
use crawlq::utils::telemetry;
use crawlq::workers::manager::WorkerManager;
use crawlq::workers::sweep_worker::SweepWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting crawlq...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Initialize components
    let store = Arc::new(TaskStore::new());
    let queue = Arc::new(WorkQueue::new());
    let sink = Arc::new(ResultSink::new(&settings.sink.output_dir));

    let fetcher: Arc<dyn PageFetcher> =
        Arc::new(HttpFetcher::new().map_err(|e| anyhow::anyhow!(e.to_string()))?);
    let extractor: Arc<dyn ContentExtractor> =
        Arc::new(MarkdownExtractor::new(settings.extractor.min_word_count));

    // 4. Start workers
    let mut worker_manager = WorkerManager::new(
        store.clone(),
        queue.clone(),
        fetcher,
        extractor,
        sink,
        settings.dispatcher.clone(),
    );
    worker_manager.start_workers(settings.dispatcher.max_concurrent_tasks);

    let sweep_handle = SweepWorker::new(
        store.clone(),
        Duration::from_secs(settings.store.retention_secs),
        Duration::from_secs(settings.store.sweep_interval_secs),
    )
    .start();

    // 5. Start HTTP server
    let app = routes::build_router(store, queue.clone(), settings.clone());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 6. Drain in-flight jobs before exit
    info!("Shutdown signal received");
    worker_manager.shutdown().await;
    sweep_handle.abort();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Unable to listen for shutdown signal: {}", err);
    }
}
