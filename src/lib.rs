// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含请求和响应的数据传输对象
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体和状态转换规则
pub mod domain;

/// 引擎模块
///
/// 页面抓取和内容提取的能力接口及其实现
pub mod engines;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和中间件
pub mod presentation;

/// 队列模块
///
/// 实现按优先级排序的待处理任务队列
pub mod queue;

/// 结果落盘模块
///
/// 将终态任务的产物写入任务目录
pub mod sink;

/// 存储模块
///
/// 任务状态的内存存储
pub mod store;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现后台任务处理和工作器管理
pub mod workers;
