// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// 全进程共享的导航限流器
///
/// 多个会话并发抓取时共用同一个配额，克隆后仍指向同一限流器
#[derive(Clone)]
pub struct NavigationThrottle {
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl NavigationThrottle {
    /// 创建每分钟 `per_minute` 次导航的限流器，`0` 表示不限流
    pub fn per_minute(per_minute: u32) -> Self {
        let limiter = NonZeroU32::new(per_minute)
            .map(|n| Arc::new(RateLimiter::direct(Quota::per_minute(n))));
        Self { limiter }
    }

    /// 不限流
    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    /// 等待下一次导航许可
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

impl std::fmt::Debug for NavigationThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationThrottle")
            .field("limited", &self.limiter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_permit_is_immediate() {
        let throttle = NavigationThrottle::per_minute(30);
        tokio::time::timeout(Duration::from_millis(200), throttle.acquire())
            .await
            .expect("first navigation should not wait");
    }

    #[tokio::test]
    async fn test_unlimited_and_zero_never_wait() {
        let throttle = NavigationThrottle::per_minute(0);
        for _ in 0..50 {
            tokio::time::timeout(Duration::from_millis(200), throttle.acquire())
                .await
                .expect("zero quota means unlimited");
        }
        NavigationThrottle::unlimited().acquire().await;
    }
}
