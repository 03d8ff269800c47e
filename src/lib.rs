// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理浏览器、抓取与认证相关的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含目标与字段模型、页面提取操作以及抓取编排服务
pub mod domain;

/// 引擎模块
///
/// 浏览器会话抽象、Chromium 实现、回放实现与认证
pub mod engines;

/// 会话模块
///
/// 面向调用方的高层 API
pub mod session;

/// 工具模块
///
/// 提供错误类型、遥测与重试策略
pub mod utils;

pub use domain::models::fields::{FieldGroup, FieldSelection, PageBudget};
pub use domain::models::record::ScrapedRecord;
pub use domain::models::target::{EntityKind, ScrapeTarget};
pub use session::LinkedInSession;
pub use utils::errors::ScrapeError;
