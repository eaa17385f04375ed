//! Waiting for the host node to report itself started.
//!
//! The preferred source is a `watch` channel the host flips to `true`.
//! Without one, a [`StartedSignal`] is polled at a fixed interval. There is
//! no timeout: the watchdog is useless until the node serves requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::config::NodeConfig;
use crate::lifecycle::shutdown::ShutdownSignal;

/// Pollable "host service started" signal.
#[async_trait]
pub trait StartedSignal: Send + Sync {
    async fn is_started(&self) -> bool;
}

/// Flag the host flips once it has finished starting.
#[derive(Debug, Clone, Default)]
pub struct StartedFlag(Arc<AtomicBool>);

impl StartedFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_started(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl StartedSignal for StartedFlag {
    async fn is_started(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Treats the node as started once its readiness endpoint answers 2xx.
///
/// A node that is still booting answers 503, which must keep the gate shut.
/// Used by the standalone binary, which has no in-process signal.
#[derive(Debug, Clone)]
pub struct NodeReachability {
    http: Client,
    url: String,
}

impl NodeReachability {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).no_proxy().build()?;
        Ok(Self { http, url: url.into() })
    }

    /// Poll `readiness_path` when configured, else the API base URL.
    pub fn from_config(node: &NodeConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let base = node.api_base_url.trim_end_matches('/');
        let url = match node.readiness_path.as_deref() {
            Some(path) => format!("{}{}", base, path),
            None => base.to_string(),
        };
        Self::new(url, timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StartedSignal for NodeReachability {
    async fn is_started(&self) -> bool {
        match self.http.get(&self.url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!(
                    url = %self.url,
                    status = %response.status(),
                    "Node not started yet"
                );
                false
            }
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "Node API not reachable yet");
                false
            }
        }
    }
}

/// Where the gate learns that the host has started.
pub enum ReadinessSource {
    Watch(watch::Receiver<bool>),
    Poll {
        signal: Arc<dyn StartedSignal>,
        interval: Duration,
    },
}

impl ReadinessSource {
    pub fn poll(signal: Arc<dyn StartedSignal>, interval: Duration) -> Self {
        ReadinessSource::Poll { signal, interval }
    }
}

/// Blocks the watchdog until the host reports started.
pub struct ReadinessGate {
    source: ReadinessSource,
}

impl ReadinessGate {
    pub fn new(source: ReadinessSource) -> Self {
        Self { source }
    }

    /// Returns `false` if shutdown arrived first.
    pub async fn wait(&mut self, shutdown: &mut ShutdownSignal) -> bool {
        tokio::select! {
            _ = self.opened() => true,
            _ = shutdown.recv() => {
                tracing::info!("Readiness wait cancelled by shutdown");
                false
            }
        }
    }

    async fn opened(&mut self) {
        match &mut self.source {
            ReadinessSource::Watch(rx) => {
                let closed = rx.wait_for(|started| *started).await.is_err();
                if closed {
                    // Sender gone without ever reporting started.
                    tracing::warn!("Readiness channel closed before node started");
                    std::future::pending::<()>().await;
                }
            }
            ReadinessSource::Poll { signal, interval } => {
                while !signal.is_started().await {
                    tracing::info!("Waiting for node to start...");
                    sleep(*interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use std::sync::atomic::AtomicU32;

    struct CountingSignal {
        polls: AtomicU32,
        ready_after: u32,
    }

    #[async_trait]
    impl StartedSignal for CountingSignal {
        async fn is_started(&self) -> bool {
            self.polls.fetch_add(1, Ordering::SeqCst) + 1 >= self.ready_after
        }
    }

    #[tokio::test]
    async fn test_poll_until_started() {
        let signal = Arc::new(CountingSignal {
            polls: AtomicU32::new(0),
            ready_after: 3,
        });
        let mut gate = ReadinessGate::new(ReadinessSource::poll(
            signal.clone(),
            Duration::from_millis(1),
        ));

        assert!(gate.wait(&mut ShutdownSignal::never()).await);
        assert_eq!(signal.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_watch_opens_when_flag_flips() {
        let (tx, rx) = watch::channel(false);
        let mut gate = ReadinessGate::new(ReadinessSource::Watch(rx));

        let waiter = tokio::spawn(async move { gate.wait(&mut ShutdownSignal::never()).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        tx.send(true).unwrap();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_watch_never_opens_but_can_be_cancelled() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let mut gate = ReadinessGate::new(ReadinessSource::Watch(rx));

        let shutdown = Shutdown::new();
        let mut signal = shutdown.signal();
        let waiter = tokio::spawn(async move { gate.wait(&mut signal).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        shutdown.trigger();
        assert!(!waiter.await.unwrap());
    }

    #[test]
    fn test_reachability_url_prefers_readiness_path() {
        let mut node = NodeConfig {
            api_base_url: "http://127.0.0.1:8848/".into(),
            ..NodeConfig::default()
        };
        node.readiness_path = Some("/nacos/v1/console/health/readiness".into());
        let signal = NodeReachability::from_config(&node, Duration::from_secs(1)).unwrap();
        assert_eq!(signal.url(), "http://127.0.0.1:8848/nacos/v1/console/health/readiness");

        node.readiness_path = None;
        let signal = NodeReachability::from_config(&node, Duration::from_secs(1)).unwrap();
        assert_eq!(signal.url(), "http://127.0.0.1:8848");
    }

    #[tokio::test]
    async fn test_started_flag() {
        let flag = StartedFlag::new();
        assert!(!flag.is_started().await);
        flag.clone().set_started();
        assert!(flag.is_started().await);
    }
}
