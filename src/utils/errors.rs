// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::target::EntityKind;
use crate::engines::traits::NavigationError;
use thiserror::Error;

/// 抓取层错误类型
///
/// 只有前置条件类错误会中止整个抓取，其余失败都记录在结果的字段错误表中
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// 目标URL无法解析为期望的实体类型
    #[error("Invalid target {url}: {reason}")]
    InvalidTarget {
        url: String,
        expected: EntityKind,
        reason: String,
    },

    /// 字段选择中包含不属于该实体类型的字段组
    #[error("Invalid field selection: {0}")]
    InvalidSelection(String),

    /// 没有可用的浏览器会话
    #[error("No valid session: {0}")]
    NoSession(String),

    /// 认证失败
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// 主页面导航失败
    #[error("Primary page navigation failed: {0}")]
    PrimaryNavigation(#[source] NavigationError),

    /// 目标不存在或不可访问
    #[error("Target unavailable: {0}")]
    TargetUnavailable(String),

    /// 浏览器启动或控制错误
    #[error("Browser error: {0}")]
    Browser(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ScrapeError {
    /// 判断错误是否属于前置条件错误（调用方重试无意义）
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ScrapeError::InvalidTarget { .. }
                | ScrapeError::InvalidSelection(_)
                | ScrapeError::NoSession(_)
                | ScrapeError::AuthenticationFailed(_)
        )
    }
}

/// 凭据错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Cookie cannot be empty")]
    EmptyCookie,

    #[error("Invalid li_at cookie format")]
    MalformedCookie,

    #[error("Email and password must both be provided")]
    MissingPassword,
}
