//! Shared application services: runtime, HTTP client, sync bus, shutdown.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use pact_core::{Config, ViewSyncBus};
use pact_services::{CalendarZone, PactClient, PactClientConfig};

/// Per-view settings resolved from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub zone: CalendarZone,
    pub page_size: u32,
    pub baseline_activity: bool,
}

impl ViewSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            zone: CalendarZone::from_offset_minutes(config.calendar.utc_offset_minutes),
            page_size: config.api.page_size,
            baseline_activity: config.calendar.baseline_activity,
        }
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything a view needs to talk to the outside world.
///
/// Views call [`ViewContext::for_view`] on mount so that their pending work
/// can be cancelled on teardown without touching other views.
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub runtime: Handle,
    pub client: Arc<PactClient>,
    pub bus: ViewSyncBus,
    pub cancel: CancellationToken,
    pub settings: ViewSettings,
}

impl ViewContext {
    pub fn new(
        runtime: Handle,
        client: Arc<PactClient>,
        bus: ViewSyncBus,
        settings: ViewSettings,
    ) -> Self {
        Self {
            runtime,
            client,
            bus,
            cancel: CancellationToken::new(),
            settings,
        }
    }

    /// Same services, with a cancellation token scoped to one view.
    pub fn for_view(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            ..self.clone()
        }
    }
}

/// Application-wide services container, created once at startup.
pub struct AppServices {
    /// Tokio runtime for network work
    runtime: tokio::runtime::Runtime,

    client: Arc<PactClient>,

    /// Collection change notifications shared by all views
    bus: ViewSyncBus,

    settings: ViewSettings,

    /// Parent of every view's cancellation token
    shutdown: CancellationToken,
}

impl AppServices {
    pub fn new(config: &Config) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("pact-tokio")
            .build()
            .context("Failed to create tokio runtime")?;

        let client = PactClient::new_with_config(PactClientConfig {
            base_url: config.api.base_url().to_string(),
            timeout: Duration::from_secs(config.api.timeout_secs),
        })?;

        tracing::info!("Pact server: {}", client.base_url());

        Ok(Self {
            runtime,
            client: Arc::new(client),
            bus: ViewSyncBus::new(),
            settings: ViewSettings::from_config(config),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn runtime(&self) -> Handle {
        self.runtime.handle().clone()
    }

    pub fn bus(&self) -> &ViewSyncBus {
        &self.bus
    }

    pub fn settings(&self) -> ViewSettings {
        self.settings
    }

    /// A context for mounting views. Cancelled by [`AppServices::shutdown`].
    pub fn context(&self) -> ViewContext {
        ViewContext {
            runtime: self.runtime(),
            client: self.client.clone(),
            bus: self.bus.clone(),
            cancel: self.shutdown.child_token(),
            settings: self.settings,
        }
    }

    /// Drive a future to completion on the service runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Cancel pending work for every view created from this container.
    pub fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.calendar.utc_offset_minutes = Some(60);
        config.calendar.baseline_activity = false;
        config.api.page_size = 25;

        let settings = ViewSettings::from_config(&config);
        assert_eq!(settings.page_size, 25);
        assert!(!settings.baseline_activity);
        assert_ne!(settings.zone, CalendarZone::Local);
    }

    #[test]
    fn test_shutdown_cancels_view_contexts() {
        let services = AppServices::new(&Config::default()).unwrap();
        let ctx = services.context();
        let view_ctx = ctx.for_view();

        services.shutdown();
        assert!(services.is_shut_down());
        assert!(ctx.cancel.is_cancelled());
        assert!(view_ctx.cancel.is_cancelled());
    }

    #[test]
    fn test_view_cancel_does_not_affect_siblings() {
        let services = AppServices::new(&Config::default()).unwrap();
        let ctx = services.context();
        let a = ctx.for_view();
        let b = ctx.for_view();

        a.cancel.cancel();
        assert!(!b.cancel.is_cancelled());
        assert!(!services.is_shut_down());
        assert_eq!(services.bus().subscriber_count(), 0);
        assert_eq!(services.settings(), ViewSettings::default());
    }
}
