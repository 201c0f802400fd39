// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Lead Relay Service
//!
//! Receives customer leads from a web form and posts them to a DingTalk
//! custom robot, allowing at most 10 submissions per phone number per day.
//!
//! ## Endpoints
//!
//! - `POST /api/dingtalk/send/customer`: validated, rate limited lead
//! - `POST /api/dingtalk/send?content=...`: plain text, no checks
//! - `GET /health`, `GET /healthz`
//! - `GET /metrics`
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `DINGTALK_WEBHOOK_URL`: Robot webhook URL with `access_token` (required)
//! - `DINGTALK_SECRET`: Robot signing secret (required)
//! - `MAX_DAILY_USAGE`: Submissions per phone per day (default: 10)
//! - `CLEANUP_INTERVAL_SECS`: Stale usage eviction interval (default: 3600)
//! - `METRICS_ENABLED`: Expose Prometheus metrics (default: true)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lead_relay::{
    clock::{Clock, SystemClock},
    config::Config,
    handlers::{router, AppState},
    limiter::RateLimiter,
    metrics::Metrics,
    notifier::DingTalkNotifier,
    service::LeadService,
    store::InMemoryUsageStore,
    validator::LeadValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        max_daily_usage = config.rate_limit.max_daily_usage,
        metrics_enabled = config.metrics.enabled,
        "Starting lead relay"
    );

    // Wire components
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let limiter = RateLimiter::new(
        config.rate_limit.clone(),
        Arc::new(InMemoryUsageStore::new()),
        clock.clone(),
    );
    let notifier = Arc::new(DingTalkNotifier::new(config.dingtalk.clone(), clock));
    let service = LeadService::new(limiter, notifier, Metrics::new()?);
    let validator = LeadValidator::new(&config.validation)?;

    let state = Arc::new(AppState {
        service,
        validator,
        config: config.clone(),
    });

    // Spawn cleanup task
    let cleanup_state = state.clone();
    let cleanup_interval = config.rate_limit.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            cleanup_state.service.limiter().cleanup().await;
        }
    });

    // Start server
    let app = router(state);
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
