//! Session Resolver.
//!
//! Finds the bearer credential for the wishlist service in the browser's
//! cookie jar. The identity provider does not promise a cookie name, so the
//! lookup is two-tier: an explicit token cookie first, then anything that
//! looks like an opaque session blob.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::types::cookie::Cookie;
use crate::types::errors::CookieError;

/// Read access to the browser's cookies.
#[async_trait]
pub trait CookieSource: Send + Sync {
    /// Cookies whose domain is `domain` or one of its subdomains.
    async fn cookies_for(&self, domain: &str) -> Result<Vec<Cookie>, CookieError>;
}

/// Cookie source over a fixed list, e.g. cookies forwarded by the host.
#[derive(Debug, Clone, Default)]
pub struct StaticCookieJar {
    cookies: Vec<Cookie>,
}

impl StaticCookieJar {
    pub fn new(cookies: Vec<Cookie>) -> Self {
        Self { cookies }
    }
}

#[async_trait]
impl CookieSource for StaticCookieJar {
    async fn cookies_for(&self, domain: &str) -> Result<Vec<Cookie>, CookieError> {
        let wanted = domain.trim_start_matches('.');
        Ok(self
            .cookies
            .iter()
            .filter(|c| {
                let d = c.domain.trim_start_matches('.');
                d.is_empty() || d == wanted || d.ends_with(&format!(".{}", wanted))
            })
            .cloned()
            .collect())
    }
}

/// Cookie-name heuristics.
#[derive(Debug, Clone)]
pub struct ResolverPolicy {
    /// Substrings marking an explicit auth/access token cookie.
    pub token_markers: Vec<String>,
    /// Substring marking a session cookie.
    pub session_marker: String,
    /// Name prefix used by the identity provider.
    pub provider_prefix: String,
    /// Values strictly longer than this count as an opaque session blob.
    pub min_blob_len: usize,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            token_markers: vec![
                "auth-token".to_string(),
                "access-token".to_string(),
                "access_token".to_string(),
            ],
            session_marker: "session".to_string(),
            provider_prefix: "sb-".to_string(),
            min_blob_len: 100,
        }
    }
}

/// Resolves the bearer token for one cookie domain.
pub struct SessionResolver {
    cookies: Arc<dyn CookieSource>,
    domain: String,
    policy: ResolverPolicy,
}

impl SessionResolver {
    pub fn new(cookies: Arc<dyn CookieSource>, domain: impl Into<String>) -> Self {
        Self::with_policy(cookies, domain, ResolverPolicy::default())
    }

    pub fn with_policy(
        cookies: Arc<dyn CookieSource>,
        domain: impl Into<String>,
        policy: ResolverPolicy,
    ) -> Self {
        Self {
            cookies,
            domain: domain.into(),
            policy,
        }
    }

    /// The bearer token, or `None` when no cookie qualifies or the jar is unreadable.
    pub async fn resolve(&self) -> Option<String> {
        let cookies = match self.cookies.cookies_for(&self.domain).await {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!(domain = %self.domain, error = %e, "cookie read failed; treating as logged out");
                return None;
            }
        };
        let token = select_token(&cookies, &self.policy);
        debug!(domain = %self.domain, found = token.is_some(), cookies = cookies.len(), "session lookup");
        token
    }
}

/// Applies the two-tier cookie rules to an already loaded cookie list.
pub fn select_token(cookies: &[Cookie], policy: &ResolverPolicy) -> Option<String> {
    let explicit = cookies.iter().find(|c| {
        !c.value.is_empty()
            && policy
                .token_markers
                .iter()
                .any(|marker| c.name.contains(marker.as_str()))
    });
    if let Some(cookie) = explicit {
        return Some(cookie.value.clone());
    }

    cookies
        .iter()
        .find(|c| {
            !c.value.is_empty()
                && (c.name.contains(policy.session_marker.as_str())
                    || (c.name.starts_with(policy.provider_prefix.as_str())
                        && c.value.chars().count() > policy.min_blob_len))
        })
        .map(|c| c.value.clone())
}
