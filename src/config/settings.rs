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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含服务器、认证、调度、提取、落盘和存储清理等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 认证配置；整节缺省时不启用认证
    #[serde(default)]
    pub auth: AuthSettings,
    /// 调度器配置
    pub dispatcher: DispatcherSettings,
    /// 内容提取配置
    pub extractor: ExtractorSettings,
    /// 结果落盘配置
    pub sink: SinkSettings,
    /// 任务存储配置
    pub store: StoreSettings,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 认证配置设置
#[derive(Debug, Default, Deserialize)]
pub struct AuthSettings {
    /// API访问令牌，未配置时不启用认证
    pub api_token: Option<String>,
}

/// 调度器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherSettings {
    /// 最大并发任务数（即工作器数量）
    pub max_concurrent_tasks: usize,
    /// 默认单页抓取超时时间（毫秒）
    pub page_timeout_ms: u64,
    /// 抓取超时后的内部重试次数（最多1次）
    pub fetch_retries: u32,
    /// 可选的任务整体超时时间（毫秒）
    pub job_timeout_ms: Option<u64>,
}

/// 内容提取配置设置
#[derive(Debug, Deserialize)]
pub struct ExtractorSettings {
    /// 文本块的最小词数阈值
    pub min_word_count: usize,
}

/// 结果落盘配置设置
#[derive(Debug, Deserialize)]
pub struct SinkSettings {
    /// 产物输出根目录
    pub output_dir: String,
}

/// 任务存储配置设置
#[derive(Debug, Deserialize)]
pub struct StoreSettings {
    /// 终态任务的保留时间（秒）
    pub retention_secs: u64,
    /// 清理扫描间隔（秒）
    pub sweep_interval_secs: u64,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 11235)?
            // Default Dispatcher settings
            .set_default("dispatcher.max_concurrent_tasks", 5)?
            .set_default("dispatcher.page_timeout_ms", 30000)?
            .set_default("dispatcher.fetch_retries", 1)?
            // Default Extractor settings
            .set_default("extractor.min_word_count", 50)?
            // Default Sink settings
            .set_default("sink.output_dir", "./output")?
            // Default Store retention settings
            .set_default("store.retention_secs", 3600)?
            .set_default("store.sweep_interval_secs", 60)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CRAWLQ").separator("__"));

        builder.build()?.try_deserialize()
    }
}
