//! Shared uptime feed.
//!
//! One upstream event stream serves every subscriber: the first
//! [`UptimeFeed::subscribe`] opens it and dropping the last
//! [`UptimeSubscription`] closes it. Snapshots replace the monitor state,
//! updates append a heartbeat and prune entries older than the window.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, VecDeque};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use auto_store::schema::PATH_UPTIME_STREAM;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use futures::{Stream, StreamExt};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiResult, HttpTransport};

/// Heartbeat history kept per monitor.
pub const HEARTBEAT_WINDOW_SECS: i64 = 2 * 60 * 60;
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// One heartbeat. Status 1 is up, 0 down, 2 pending, 3 maintenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatEntry {
    pub status: i32,
    pub time: String,
    #[serde(default)]
    pub ping: Option<i32>,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorUptime {
    pub kuma_id: i64,
    #[serde(default)]
    pub heartbeats: Vec<HeartbeatEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UptimeEvent {
    Snapshot {
        #[serde(deserialize_with = "monitor_map")]
        monitors: BTreeMap<i64, MonitorUptime>,
    },
    Update {
        kuma_id: i64,
        entry: HeartbeatEntry,
    },
}

// Tagged enums buffer their content, and buffered map keys stay strings.
fn monitor_map<'de, D>(deserializer: D) -> Result<BTreeMap<i64, MonitorUptime>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, MonitorUptime>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, monitor)| {
            key.parse::<i64>()
                .map(|kuma_id| (kuma_id, monitor))
                .map_err(|_| de::Error::custom(format!("invalid monitor id: {key}")))
        })
        .collect()
}

pub type UptimeStream = Pin<Box<dyn Stream<Item = ApiResult<UptimeEvent>> + Send>>;

/// Opens the upstream event stream. Malformed events are dropped by the
/// source; stream errors end the connection.
#[async_trait]
pub trait UptimeSource: Send + Sync {
    async fn connect(&self) -> ApiResult<UptimeStream>;
}

#[async_trait]
impl UptimeSource for HttpTransport {
    async fn connect(&self) -> ApiResult<UptimeStream> {
        let response = self.open_stream(PATH_UPTIME_STREAM).await?;
        let instance_url = self.instance_url().to_string();
        let bytes = Box::pin(response.bytes_stream());

        let events = futures::stream::unfold(
            (bytes, SseParser::default(), VecDeque::new()),
            move |(mut bytes, mut parser, mut pending)| {
                let instance_url = instance_url.clone();
                async move {
                    loop {
                        if let Some(event) = pending.pop_front() {
                            return Some((Ok(event), (bytes, parser, pending)));
                        }
                        match bytes.next().await {
                            Some(Ok(chunk)) => pending.extend(decode_events(&parser.push(&chunk))),
                            Some(Err(err)) => {
                                debug!("uptime stream read failed: {err}");
                                let err = ApiError::Network {
                                    base_url: instance_url,
                                };
                                return Some((Err(err), (bytes, parser, pending)));
                            }
                            None => return None,
                        }
                    }
                }
            },
        );
        Ok(Box::pin(events))
    }
}

fn decode_events(payloads: &[String]) -> Vec<UptimeEvent> {
    payloads
        .iter()
        .filter_map(|data| match serde_json::from_str(data) {
            Ok(event) => Some(event),
            Err(err) => {
                debug!("ignoring malformed uptime event: {err}");
                None
            }
        })
        .collect()
}

/// Incremental `text/event-stream` decoder yielding each event's data.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseParser {
    /// Feeds a chunk and returns the data of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            let text = String::from_utf8_lossy(&raw);
            let line = text.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }
            let (field, value) = line
                .split_once(':')
                .map_or((line, ""), |(field, value)| {
                    (field, value.strip_prefix(' ').unwrap_or(value))
                });
            if field == "data" {
                self.data.push(value.to_string());
            }
        }
        events
    }
}

struct Connection {
    subscribers: usize,
    task: Option<JoinHandle<()>>,
}

struct FeedInner {
    source: Arc<dyn UptimeSource>,
    monitors: RwLock<BTreeMap<i64, MonitorUptime>>,
    connection: Mutex<Connection>,
    reconnect_delay: Duration,
}

/// Reference-counted view over the upstream uptime stream.
#[derive(Clone)]
pub struct UptimeFeed {
    inner: Arc<FeedInner>,
}

impl UptimeFeed {
    pub fn new(source: Arc<dyn UptimeSource>) -> Self {
        Self::with_reconnect_delay(source, DEFAULT_RECONNECT_DELAY)
    }

    pub fn with_reconnect_delay(source: Arc<dyn UptimeSource>, reconnect_delay: Duration) -> Self {
        Self {
            inner: Arc::new(FeedInner {
                source,
                monitors: RwLock::new(BTreeMap::new()),
                connection: Mutex::new(Connection {
                    subscribers: 0,
                    task: None,
                }),
                reconnect_delay,
            }),
        }
    }

    /// Registers a consumer, opening the upstream connection for the first.
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn subscribe(&self) -> UptimeSubscription {
        let mut connection = self.inner.lock_connection();
        connection.subscribers += 1;
        if connection.task.is_none() {
            info!("opening uptime feed");
            connection.task = Some(tokio::spawn(run(Arc::clone(&self.inner))));
        }
        UptimeSubscription { feed: self.clone() }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock_connection().subscribers
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.lock_connection().task.is_some()
    }

    #[must_use]
    pub fn monitors(&self) -> BTreeMap<i64, MonitorUptime> {
        self.inner
            .monitors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn monitor(&self, kuma_id: i64) -> Option<MonitorUptime> {
        self.inner
            .monitors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kuma_id)
            .cloned()
    }

    fn release(&self) {
        let mut connection = self.inner.lock_connection();
        connection.subscribers = connection.subscribers.saturating_sub(1);
        if connection.subscribers == 0
            && let Some(task) = connection.task.take()
        {
            task.abort();
            info!("closed uptime feed");
        }
    }
}

impl FeedInner {
    fn lock_connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, event: UptimeEvent, now: DateTime<Utc>) {
        let mut monitors = self.monitors.write().unwrap_or_else(PoisonError::into_inner);
        match event {
            UptimeEvent::Snapshot { monitors: snapshot } => *monitors = snapshot,
            UptimeEvent::Update { kuma_id, entry } => {
                let monitor = match monitors.entry(kuma_id) {
                    // First heartbeat of an unknown monitor is kept as is.
                    Entry::Vacant(slot) => {
                        slot.insert(MonitorUptime {
                            kuma_id,
                            heartbeats: vec![entry],
                        });
                        return;
                    }
                    Entry::Occupied(slot) => slot.into_mut(),
                };
                let cutoff = now - TimeDelta::seconds(HEARTBEAT_WINDOW_SECS);
                monitor.heartbeats.push(entry);
                monitor
                    .heartbeats
                    .retain(|beat| parse_time(&beat.time).is_some_and(|time| time > cutoff));
            }
        }
    }
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|time| time.and_utc())
        })
}

async fn run(inner: Arc<FeedInner>) {
    loop {
        match inner.source.connect().await {
            Ok(mut events) => {
                info!("uptime feed connected");
                while let Some(event) = events.next().await {
                    match event {
                        Ok(event) => inner.apply(event, Utc::now()),
                        Err(err) => {
                            warn!("uptime stream failed: {err}");
                            break;
                        }
                    }
                }
            }
            Err(err) => warn!("uptime feed connect failed: {err}"),
        }
        tokio::time::sleep(inner.reconnect_delay).await;
    }
}

/// Keeps the shared feed open while alive.
pub struct UptimeSubscription {
    feed: UptimeFeed,
}

impl UptimeSubscription {
    #[must_use]
    pub const fn feed(&self) -> &UptimeFeed {
        &self.feed
    }
}

impl Drop for UptimeSubscription {
    fn drop(&mut self) {
        self.feed.release();
    }
}
