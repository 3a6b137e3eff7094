// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Value};
use url::Url;

use crate::domain::models::schema::{ExtractionSchema, FieldType, SchemaField};
use crate::engines::traits::{ContentExtractor, ExtractError, FetchedPage};

/// 内容提取器
///
/// 把原始HTML转换为适合下游消费的结构化记录：标题、正文文本、
/// 经过词数阈值过滤的精简文本、链接列表，以及可选的按模式
/// 提取的字段。
pub struct MarkdownExtractor {
    /// 文本块计入精简文本所需的最小词数
    min_word_count: usize,
}

impl MarkdownExtractor {
    pub fn new(min_word_count: usize) -> Self {
        Self { min_word_count }
    }

    fn selector(s: &str) -> Result<Selector, ExtractError> {
        Selector::parse(s).map_err(|_| ExtractError::InvalidSelector(s.to_string()))
    }

    /// 按模式提取单个字段的值
    fn extract_field(root: ElementRef<'_>, field: &SchemaField) -> Result<Value, ExtractError> {
        let selector = Self::selector(&field.selector)?;
        let value = match field.field_type {
            FieldType::Text => root.select(&selector).next().map(|el| {
                Value::String(el.text().collect::<Vec<_>>().join(" ").trim().to_string())
            }),
            FieldType::Html => root
                .select(&selector)
                .next()
                .map(|el| Value::String(el.inner_html())),
            FieldType::Attribute => {
                // Validated at submission, but a schema may still be built in code
                let attr = field.attribute.as_deref().ok_or_else(|| {
                    ExtractError::Other(format!("field {:?} names no attribute", field.name))
                })?;
                root.select(&selector)
                    .next()
                    .and_then(|el| el.value().attr(attr))
                    .map(|v| Value::String(v.to_string()))
            }
            FieldType::List => {
                let values: Vec<Value> = root
                    .select(&selector)
                    .map(|el| {
                        Value::String(el.text().collect::<Vec<_>>().join(" ").trim().to_string())
                    })
                    .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some(Value::Array(values))
                }
            }
        };

        Ok(value
            .or_else(|| field.default.clone())
            .unwrap_or(Value::Null))
    }

    fn extract_with_schema(
        document: &Html,
        schema: &ExtractionSchema,
    ) -> Result<Value, ExtractError> {
        let root = match &schema.base_selector {
            Some(base) => {
                let selector = Self::selector(base)?;
                document
                    .select(&selector)
                    .next()
                    .unwrap_or_else(|| document.root_element())
            }
            None => document.root_element(),
        };

        let mut out = serde_json::Map::new();
        for field in &schema.fields {
            out.insert(field.name.clone(), Self::extract_field(root, field)?);
        }
        Ok(Value::Object(out))
    }
}

impl ContentExtractor for MarkdownExtractor {
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
    ) -> Result<Value, ExtractError> {
        let document = Html::parse_document(&page.content);

        let title = Self::selector("title")?
            .pipe_first_text(&document)
            .or_else(|| Self::selector("h1").ok().and_then(|s| s.pipe_first_text(&document)))
            .unwrap_or_default();

        let block_selector = Self::selector("p, li, h1, h2, h3, h4, h5, h6, blockquote, pre")?;
        let blocks: Vec<String> = document
            .select(&block_selector)
            .map(|el| {
                el.text()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|text| !text.is_empty())
            .collect();

        let word_count: usize = blocks.iter().map(|b| b.split_whitespace().count()).sum();
        if word_count == 0 && schema.is_none() {
            return Err(ExtractError::EmptyContent);
        }

        let text = blocks.join("\n\n");
        let fit_text = blocks
            .iter()
            .filter(|b| b.split_whitespace().count() >= self.min_word_count)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n");

        // Resolve links against the page URL, keeping http(s) only
        let base = Url::parse(&page.url).ok();
        let link_selector = Self::selector("a[href]")?;
        let mut links: Vec<String> = document
            .select(&link_selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| match &base {
                Some(base) => base.join(href).ok().map(|u| u.to_string()),
                None => Url::parse(href).ok().map(|u| u.to_string()),
            })
            .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
            .collect();
        links.sort();
        links.dedup();

        let mut record = json!({
            "url": page.url,
            "title": title,
            "text": text,
            "fit_text": fit_text,
            "word_count": word_count,
            "links": links,
        });

        if let Some(schema) = schema {
            let extracted = Self::extract_with_schema(&document, schema)?;
            record["extracted"] = extracted;
        }

        Ok(record)
    }
}

/// 取选择器第一个匹配的文本
trait FirstText {
    fn pipe_first_text(&self, document: &Html) -> Option<String>;
}

impl FirstText for Selector {
    fn pipe_first_text(&self, document: &Html) -> Option<String> {
        document
            .select(self)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
