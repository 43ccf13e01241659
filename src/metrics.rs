//! StatsD metrics for the data-access layer.
//!
//! Every helper is a no-op until [`setup_metrics`] installs a client, so
//! library code can record unconditionally.

use crate::config::Config;
use cadence::{BufferedUdpMetricSink, Counted, CountedExt, QueuingMetricSink, StatsdClient, Timed};
use once_cell::sync::OnceCell;
use std::sync::Arc;

// Wrapper for StatsdClient that logs send failures instead of surfacing them
pub struct StatsdClientWrapper {
    client: Arc<StatsdClient>,
    use_tags: bool,
}

impl Clone for StatsdClientWrapper {
    fn clone(&self) -> Self {
        Self { client: self.client.clone(), use_tags: self.use_tags }
    }
}

impl StatsdClientWrapper {
    pub fn new(client: StatsdClient, use_tags: bool) -> Self {
        tracing::info!("Created StatsdClient wrapper with use_tags={}", use_tags);
        Self { client: Arc::new(client), use_tags }
    }

    pub fn count(&self, key: &str, value: u64) {
        if self.use_tags {
            self.client.count_with_tags(key, value as i64).with_tag("service", "hibachi").send();
        } else if let Err(e) = self.client.count(key, value as i64) {
            tracing::warn!("Failed to send metric {}: {}", key, e);
        }
    }

    pub fn incr(&self, key: &str) {
        if self.use_tags {
            self.client.incr_with_tags(key).with_tag("service", "hibachi").send();
        } else if let Err(e) = self.client.incr(key) {
            tracing::warn!("Failed to send metric {}: {}", key, e);
        }
    }

    pub fn time(&self, key: &str, millis: u64) {
        if self.use_tags {
            self.client.time_with_tags(key, millis).with_tag("service", "hibachi").send();
        } else if let Err(e) = self.client.time(key, millis) {
            tracing::warn!("Failed to send metric {}: {}", key, e);
        }
    }
}

static METRICS_CLIENT: OnceCell<Option<StatsdClientWrapper>> = OnceCell::new();

/// Initialize the global StatsD client from configuration
pub fn setup_metrics(config: &Config) {
    METRICS_CLIENT.get_or_init(|| {
        if !config.statsd.enabled {
            tracing::info!("Metrics disabled in configuration");
            return None;
        }

        let addr = config.statsd.addr.as_str();
        let prefix = config.statsd.prefix.as_str();
        tracing::info!("Initializing StatsD metrics with endpoint {} and prefix '{}'", addr, prefix);

        match create_statsd_client(addr, prefix) {
            Ok(client) => Some(StatsdClientWrapper::new(client, config.statsd.use_tags)),
            Err(e) => {
                tracing::error!("Failed to create StatsD client: {}", e);
                None
            },
        }
    });
}

fn create_statsd_client(
    addr: &str,
    prefix: &str,
) -> Result<StatsdClient, Box<dyn std::error::Error + Send + Sync>> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0")?;
    socket.set_nonblocking(true)?;

    let udp_sink = BufferedUdpMetricSink::from(addr, socket)?;
    let queuing_sink = QueuingMetricSink::from(udp_sink);

    Ok(StatsdClient::from_sink(prefix, queuing_sink))
}

fn get_client() -> Option<&'static StatsdClientWrapper> {
    METRICS_CLIENT.get().and_then(|client| client.as_ref())
}

pub fn incr(key: &str) {
    if let Some(client) = get_client() {
        client.incr(key);
    }
}

pub fn count(key: &str, value: u64) {
    if let Some(client) = get_client() {
        client.count(key, value);
    }
}

pub fn time(key: &str, millis: u64) {
    if let Some(client) = get_client() {
        client.time(key, millis);
    }
}
