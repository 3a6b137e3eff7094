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

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::models::schema::ExtractionSchema;

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// 服务端返回非成功状态码
    #[error("HTTP status {0}")]
    Status(u16),
    /// 超时
    #[error("Timeout after {0}ms")]
    Timeout(u64),
    /// URL无效
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// 判断错误是否为超时
    ///
    /// 超时是唯一允许工作器内部重试的失败类型。
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

/// 提取错误类型
#[derive(Error, Debug)]
pub enum ExtractError {
    /// 选择器无法解析
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
    /// 页面没有可用文本
    #[error("Page has no extractable text")]
    EmptyContent,
    /// 其他错误
    #[error("Extraction failed: {0}")]
    Other(String),
}

/// 抓取到的原始页面
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// 实际抓取的URL
    pub url: String,
    /// 页面原始内容
    pub content: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 抓取耗时（毫秒）
    pub fetch_duration_ms: u64,
}

impl FetchedPage {
    /// 页面字节大小
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

/// 页面抓取能力
///
/// 调度器对抓取方式不做任何假设，只要求在给定超时内
/// 返回页面内容或错误。
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取单个URL
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `timeout` - 单次抓取的超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedPage)` - 抓取到的页面
    /// * `Err(FetchError)` - 抓取失败
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError>;
}

/// 内容提取能力
///
/// 把原始页面转换为结构化记录。提取是纯CPU操作，
/// 保持同步接口以避免把解析树跨越await点。
pub trait ContentExtractor: Send + Sync {
    /// 提取结构化内容
    ///
    /// # 参数
    ///
    /// * `page` - 抓取到的页面
    /// * `schema` - 可选的提取模式
    ///
    /// # 返回值
    ///
    /// * `Ok(Value)` - 结构化记录
    /// * `Err(ExtractError)` - 提取失败
    fn extract(
        &self,
        page: &FetchedPage,
        schema: Option<&ExtractionSchema>,
    ) -> Result<serde_json::Value, ExtractError>;
}
