// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::domain::models::job::DomainError;

/// 结构化提取模式
///
/// 描述从页面中提取哪些字段。在提交时整体校验，
/// 避免在工作器里才发现选择器写错。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSchema {
    /// 模式名称，仅用于产物元数据
    pub name: Option<String>,
    /// 限定提取范围的根选择器，缺省为整个文档
    pub base_selector: Option<String>,
    /// 要提取的字段列表
    pub fields: Vec<SchemaField>,
}

/// 提取字段定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    /// 输出记录中的字段名
    pub name: String,
    /// CSS选择器
    pub selector: String,
    /// 提取方式
    #[serde(default)]
    pub field_type: FieldType,
    /// field_type为attribute时要读取的属性名
    pub attribute: Option<String>,
    /// 选择器无匹配时的默认值
    pub default: Option<serde_json::Value>,
}

/// 字段提取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// 第一个匹配元素的文本
    #[default]
    Text,
    /// 第一个匹配元素的内部HTML
    Html,
    /// 第一个匹配元素的某个属性值
    Attribute,
    /// 所有匹配元素的文本数组
    List,
}

impl ExtractionSchema {
    /// 校验提取模式
    ///
    /// 字段列表不能为空，所有选择器必须可解析，
    /// attribute类型的字段必须给出属性名。
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 模式有效
    /// * `Err(DomainError)` - 校验失败及原因
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.fields.is_empty() {
            return Err(DomainError::Validation(
                "extraction schema requires at least one field".to_string(),
            ));
        }

        if let Some(base) = &self.base_selector {
            Selector::parse(base).map_err(|_| {
                DomainError::Validation(format!("invalid base selector: {:?}", base))
            })?;
        }

        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(DomainError::Validation(
                    "schema field name cannot be empty".to_string(),
                ));
            }
            Selector::parse(&field.selector).map_err(|_| {
                DomainError::Validation(format!(
                    "invalid selector for field {:?}: {:?}",
                    field.name, field.selector
                ))
            })?;
            if field.field_type == FieldType::Attribute && field.attribute.is_none() {
                return Err(DomainError::Validation(format!(
                    "field {:?} uses attribute extraction but names no attribute",
                    field.name
                )));
            }
        }

        Ok(())
    }
}
