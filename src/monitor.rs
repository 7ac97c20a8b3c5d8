use std::time::Duration;

use tokio::sync::watch;

use crate::api::ApiClient;
use crate::config::PollingConfig;
use crate::models::{AnalyticsSnapshot, HealthSnapshot};
use crate::poller::{self, PollState, PollerHandle};

/// The two background pollers: service health and usage analytics.
///
/// They share nothing but the api client; each keeps its own cadence,
/// failure state and publish channel.
pub struct ServiceMonitor {
    health: PollerHandle<HealthSnapshot>,
    analytics: PollerHandle<AnalyticsSnapshot>,
}

impl ServiceMonitor {
    pub fn start(api: ApiClient, polling: &PollingConfig) -> Self {
        Self::start_with(api, polling.health_interval(), polling.analytics_interval())
    }

    pub fn start_with(api: ApiClient, health_every: Duration, analytics_every: Duration) -> Self {
        let health = poller::start("health", health_every, {
            let api = api.clone();
            move || {
                let api = api.clone();
                async move { api.health().await }
            }
        });
        let analytics = poller::start("analytics", analytics_every, move || {
            let api = api.clone();
            async move { api.analytics().await }
        });

        Self { health, analytics }
    }

    pub fn health(&self) -> PollState<HealthSnapshot> {
        self.health.latest()
    }

    pub fn analytics(&self) -> PollState<AnalyticsSnapshot> {
        self.analytics.latest()
    }

    pub fn subscribe_health(&self) -> watch::Receiver<PollState<HealthSnapshot>> {
        self.health.subscribe()
    }

    pub fn subscribe_analytics(&self) -> watch::Receiver<PollState<AnalyticsSnapshot>> {
        self.analytics.subscribe()
    }

    /// Manual "refresh" of the analytics panel.
    pub fn refresh_analytics(&self) {
        self.analytics.refresh();
    }

    pub fn refresh_health(&self) {
        self.health.refresh();
    }

    pub async fn stop(self) {
        self.health.stop().await;
        self.analytics.stop().await;
    }
}
