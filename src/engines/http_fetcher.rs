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
use std::time::{Duration, Instant};
use url::Url;

use crate::engines::traits::{FetchError, FetchedPage, PageFetcher};

/// HTTP抓取器
///
/// 基于reqwest实现的基本页面抓取器
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// 创建新的HTTP抓取器实例
    ///
    /// 连接复用由共享的客户端负责，每次请求单独设置超时。
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; crawlq/0.1)")
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `timeout` - 单次抓取超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedPage)` - 抓取到的页面
    /// * `Err(FetchError)` - 抓取过程中出现的错误
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(timeout.as_millis() as u64)
                } else {
                    FetchError::RequestFailed(e.to_string())
                }
            })?;

        let status_code = response.status().as_u16();
        if response.status().is_client_error() || response.status().is_server_error() {
            return Err(FetchError::Status(status_code));
        }

        let content = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(timeout.as_millis() as u64)
            } else {
                FetchError::RequestFailed(e.to_string())
            }
        })?;

        Ok(FetchedPage {
            url: url.to_string(),
            content,
            status_code,
            fetch_duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
