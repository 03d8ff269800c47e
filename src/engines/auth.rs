// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::AuthSettings;
use crate::engines::chromium_engine::{first_segment, ChromiumSession};
use crate::engines::traits::NavigationError;
use crate::utils::errors::{CredentialsError, ScrapeError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static COOKIE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{100,}$").expect("valid cookie pattern"));

const AUTHENTICATED_SECTIONS: &[&str] = &["feed", "in", "mynetwork", "jobs"];

/// 登录凭据
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// li_at 会话cookie
    Cookie(String),
    /// 邮箱与密码
    Password { email: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Cookie(_) => f.write_str("Credentials::Cookie(<redacted>)"),
            Credentials::Password { email, .. } => f
                .debug_struct("Credentials::Password")
                .field("email", email)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// 校验并创建cookie凭据
    pub fn cookie(value: &str) -> Result<Self, CredentialsError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(CredentialsError::EmptyCookie);
        }
        if !COOKIE_PATTERN.is_match(value) {
            return Err(CredentialsError::MalformedCookie);
        }
        Ok(Credentials::Cookie(value.to_string()))
    }

    pub fn password(email: &str, password: &str) -> Result<Self, CredentialsError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(CredentialsError::MissingPassword);
        }
        Ok(Credentials::Password {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
    }

    /// 从认证配置中选取凭据，cookie优先
    pub fn from_settings(auth: &AuthSettings) -> Result<Self, CredentialsError> {
        if let Some(cookie) = auth.cookie.as_deref().filter(|c| !c.trim().is_empty()) {
            return Self::cookie(cookie);
        }
        match (auth.email.as_deref(), auth.password.as_deref()) {
            (Some(email), Some(password)) => Self::password(email, password),
            (None, None) => Err(CredentialsError::EmptyCookie),
            _ => Err(CredentialsError::MissingPassword),
        }
    }
}

/// 登录后落地页面的判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Authenticated,
    SecurityChallenge,
    LoggedOut,
}

/// 根据落地URL判断登录状态
pub fn classify_landing(url: &str) -> LoginState {
    let Some(section) = first_segment(url) else {
        return LoginState::LoggedOut;
    };
    match section.as_str() {
        "checkpoint" | "challenge" => LoginState::SecurityChallenge,
        s if AUTHENTICATED_SECTIONS.contains(&s) => LoginState::Authenticated,
        _ => LoginState::LoggedOut,
    }
}

fn check_landing(url: &str) -> Result<(), ScrapeError> {
    match classify_landing(url) {
        LoginState::Authenticated => Ok(()),
        LoginState::SecurityChallenge => Err(ScrapeError::AuthenticationFailed(format!(
            "security challenge required at {}",
            url
        ))),
        LoginState::LoggedOut => Err(ScrapeError::AuthenticationFailed(format!(
            "not logged in after authentication, landed on {}",
            url
        ))),
    }
}

/// 在浏览器会话上应用凭据并校验登录状态
pub async fn authenticate(
    session: &mut ChromiumSession,
    credentials: &Credentials,
    base_url: &str,
) -> Result<(), ScrapeError> {
    let base = base_url.trim_end_matches('/');
    let failed = |e: NavigationError| ScrapeError::AuthenticationFailed(e.to_string());
    let landing = match credentials {
        Credentials::Cookie(value) => {
            session
                .set_session_cookie(value)
                .await
                .map_err(|e| ScrapeError::Browser(e.to_string()))?;
            session.load(&format!("{}/feed/", base)).await.map_err(failed)?
        }
        Credentials::Password { email, password } => {
            session.load(&format!("{}/login", base)).await.map_err(failed)?;
            session.type_into("#username", email).await.map_err(failed)?;
            session.type_into("#password", password).await.map_err(failed)?;
            session
                .click_and_wait("button[type=submit]")
                .await
                .map_err(failed)?
                .final_url
        }
    };

    tracing::debug!("Authentication landed on {}", landing);
    check_landing(&landing)
}
