// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum::Router;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crawlq::config::settings::{
    AuthSettings, DispatcherSettings, ExtractorSettings, ServerSettings, Settings, SinkSettings,
    StoreSettings,
};
use crawlq::engines::traits::{FetchError, FetchedPage, PageFetcher};
use crawlq::presentation::routes;
use crawlq::queue::work_queue::WorkQueue;
use crawlq::store::task_store::TaskStore;

/// 测试配置
///
/// 不经过config加载，直接构造，避免测试间的环境变量串扰。
pub fn test_settings(api_token: Option<String>) -> Arc<Settings> {
    Arc::new(Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        auth: AuthSettings { api_token },
        dispatcher: DispatcherSettings {
            max_concurrent_tasks: 2,
            page_timeout_ms: 30000,
            fetch_retries: 1,
            job_timeout_ms: None,
        },
        extractor: ExtractorSettings { min_word_count: 1 },
        sink: SinkSettings {
            output_dir: "./output".to_string(),
        },
        store: StoreSettings {
            retention_secs: 3600,
            sweep_interval_secs: 60,
        },
    })
}

/// 组装一个不启动工作器的测试路由
///
/// API层的行为（校验、认证、查询）不依赖工作器，任务会停留
/// 在Pending状态，方便断言。
pub fn test_app(api_token: Option<String>) -> (Router, Arc<TaskStore>, Arc<WorkQueue>) {
    let store = Arc::new(TaskStore::new());
    let queue = Arc::new(WorkQueue::new());
    let settings = test_settings(api_token);
    let app = routes::build_router(store.clone(), queue.clone(), settings);
    (app, store, queue)
}

/// 单个URL的预设行为
#[derive(Clone)]
pub enum Script {
    /// 返回给定的HTML
    Html(String),
    /// 挂起指定时长后才返回，用于触发调度器的超时
    Hang(Duration),
    /// 返回抓取错误
    Fail(String),
}

/// 脚本化的页面抓取器
///
/// 按URL返回预设结果，同时记录每个URL的尝试次数和
/// 并发抓取的峰值，供调度器属性测试断言。
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, Script>>,
    attempts: Mutex<HashMap<String, usize>>,
    fetch_log: Mutex<Vec<String>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            attempts: Mutex::new(HashMap::new()),
            fetch_log: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn script(&self, url: &str, script: Script) {
        self.scripts.lock().insert(url.to_string(), script);
    }

    /// 某个URL被尝试抓取的次数
    pub fn attempts(&self, url: &str) -> usize {
        self.attempts.lock().get(url).copied().unwrap_or(0)
    }

    /// 观测到的并发抓取峰值
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// 按抓取发生的先后顺序记录的URL列表
    pub fn fetch_log(&self) -> Vec<String> {
        self.fetch_log.lock().clone()
    }
}

impl Default for ScriptedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchedPage, FetchError> {
        *self.attempts.lock().entry(url.to_string()).or_insert(0) += 1;
        self.fetch_log.lock().push(url.to_string());

        let current = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(current, Ordering::SeqCst);

        let script = self
            .scripts
            .lock()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Script::Html(default_page(url)));

        let outcome = match script {
            Script::Html(html) => {
                // A small delay keeps fetches overlapping for the
                // concurrency assertions
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(FetchedPage {
                    url: url.to_string(),
                    content: html,
                    status_code: 200,
                    fetch_duration_ms: 20,
                })
            }
            Script::Hang(delay) => {
                tokio::time::sleep(delay).await;
                Ok(FetchedPage {
                    url: url.to_string(),
                    content: default_page(url),
                    status_code: 200,
                    fetch_duration_ms: delay.as_millis() as u64,
                })
            }
            Script::Fail(reason) => Err(FetchError::RequestFailed(reason)),
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

fn default_page(url: &str) -> String {
    format!("<html><head><title>{url}</title></head><body><p>scripted page body</p></body></html>")
}

/// 轮询任务存储直到所有任务进入终态
///
/// # Panics
///
/// 超过时限仍有任务未终态时panic
pub async fn wait_for_terminal(store: &TaskStore, ids: &[Uuid], timeout: Duration) {
    let deadline = Instant::now() + timeout;
    loop {
        let all_done = ids.iter().all(|id| {
            store
                .get(id)
                .map(|job| job.status.is_terminal())
                .unwrap_or(false)
        });
        if all_done {
            return;
        }
        assert!(
            Instant::now() < deadline,
            "jobs did not reach a terminal state within {:?}",
            timeout
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
