// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::models::schema::ExtractionSchema;

/// 单个URL或URL数组
///
/// 请求体里 `urls` 既可以是字符串也可以是字符串数组。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum UrlList {
    Single(String),
    Many(Vec<String>),
}

impl UrlList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            UrlList::Single(url) => vec![url],
            UrlList::Many(urls) => urls,
        }
    }
}

/// 爬取任务提交请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CrawlRequestDto {
    /// 目标URL，字符串或数组
    pub urls: UrlList,
    /// 优先级，越大越先被调度
    #[serde(default)]
    pub priority: i32,
    /// 覆盖默认的单页超时（毫秒）
    #[validate(range(min = 1000, max = 60000))]
    pub page_timeout_ms: Option<u64>,
    /// 可选的结构化提取模式
    pub schema: Option<ExtractionSchema>,
}
