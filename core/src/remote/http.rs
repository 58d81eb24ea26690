//! HTTP implementation of the boss/user service

use std::time::Duration;

use bossrush_types::AppConfig;
use reqwest::Url;
use tracing::debug;

use super::{BossRecord, BossService, RemoteError, RemoteUserRecord, RewardTotals};

const USER_AGENT: &str = concat!("bossrush/", env!("CARGO_PKG_VERSION"));

/// `reqwest` client bound to a service base URL.
///
/// Every request inherits the client-wide timeout so no remote call can leave
/// the encounter suspended indefinitely.
#[derive(Debug, Clone)]
pub struct HttpBossService {
    client: reqwest::Client,
    base: Url,
    base_url: String,
}

impl HttpBossService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Client)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| RemoteError::InvalidUrl {
                url: base_url.clone(),
            })?;
        Ok(Self {
            client,
            base,
            base_url,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, RemoteError> {
        Self::new(
            config.base_url(),
            Duration::from_secs(config.request_timeout_secs.max(1)),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn bosses_url(&self) -> Url {
        self.route(&["bosses"])
    }

    /// `user_id` is a single percent-encoded path segment
    pub(crate) fn user_url(&self, user_id: &str) -> Url {
        self.route(&["user", user_id])
    }

    fn route(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` only accepts URLs that can carry a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

impl BossService for HttpBossService {
    async fn list_bosses(&self) -> Result<Vec<BossRecord>, RemoteError> {
        let url = self.bosses_url();
        debug!(%url, "fetching boss catalog");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| RemoteError::from_reqwest(url.as_str(), e))?;

        response
            .json::<Vec<BossRecord>>()
            .await
            .map_err(|e| RemoteError::from_reqwest(url.as_str(), e))
    }

    async fn fetch_user(&self, user_id: &str) -> Result<RemoteUserRecord, RemoteError> {
        let url = self.user_url(user_id);
        debug!(%url, "fetching user snapshot");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| RemoteError::from_reqwest(url.as_str(), e))?;

        response
            .json::<RemoteUserRecord>()
            .await
            .map_err(|e| RemoteError::from_reqwest(url.as_str(), e))
    }

    async fn commit_totals(&self, user_id: &str, totals: RewardTotals) -> Result<(), RemoteError> {
        let url = self.user_url(user_id);
        debug!(
            %url,
            mined_boss_coin = totals.mined_boss_coin,
            total_experience = totals.total_experience,
            "committing reward totals"
        );
        self.client
            .put(url.clone())
            .json(&totals)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| RemoteError::from_reqwest(url.as_str(), e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_are_joined_to_base_url() {
        let service =
            HttpBossService::new("https://example.test/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(service.base_url(), "https://example.test/api");
        assert_eq!(
            service.bosses_url().as_str(),
            "https://example.test/api/bosses"
        );
        assert_eq!(
            service.user_url("u-7").as_str(),
            "https://example.test/api/user/u-7"
        );
    }

    #[test]
    fn user_id_cannot_change_the_route() {
        let service =
            HttpBossService::new("https://example.test/api", Duration::from_secs(5)).unwrap();
        assert_eq!(
            service.user_url("a/b?c#d").as_str(),
            "https://example.test/api/user/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn host_only_base_url_gets_routes() {
        let service = HttpBossService::new("http://game.test", Duration::from_secs(5)).unwrap();
        assert_eq!(service.bosses_url().as_str(), "http://game.test/bosses");
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        for url in ["not a url", "mailto:boss@example.test"] {
            assert!(matches!(
                HttpBossService::new(url, Duration::from_secs(5)),
                Err(RemoteError::InvalidUrl { .. })
            ));
        }
    }

    #[test]
    fn from_config_uses_configured_url() {
        let config = AppConfig {
            service_url: "http://127.0.0.1:9/api".to_string(),
            request_timeout_secs: 0,
            ..Default::default()
        };
        let service = HttpBossService::from_config(&config).unwrap();
        assert_eq!(service.bosses_url().as_str(), "http://127.0.0.1:9/api/bosses");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_remote_error() {
        // Port 9 (discard) is not expected to speak HTTP
        let service =
            HttpBossService::new("http://127.0.0.1:9/api", Duration::from_millis(500)).unwrap();
        let err = service.list_bosses().await.unwrap_err();
        assert!(matches!(
            err,
            RemoteError::Transport { .. } | RemoteError::Timeout { .. }
        ));
    }
}
