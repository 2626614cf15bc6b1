//! Shared utilities for lifecycle integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use bot_host::bot::{BotError, BotFactory, BotSession};
use bot_host::database::{Database, DatabaseError};
use bot_host::lifecycle::{Checkpoints, Lifecycle};

/// Token accepted by the mock Bot API.
pub const GOOD_TOKEN: &str = "42:good-secret";

/// A collaborator call observed by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    DbInit,
    BotBuild,
    BotStart,
    BotStop,
}

/// Ordered log of collaborator calls, shared by all mocks of one test.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Event>>>);

impl Recorder {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, event: Event) -> usize {
        self.events().iter().filter(|e| **e == event).count()
    }
}

/// Captures checkpoint output and counts flushes.
#[derive(Clone, Default)]
pub struct Output {
    bytes: Arc<Mutex<Vec<u8>>>,
    flushes: Arc<Mutex<usize>>,
}

impl Output {
    pub fn text(&self) -> String {
        String::from_utf8(self.bytes.lock().unwrap().clone()).unwrap()
    }

    pub fn flushes(&self) -> usize {
        *self.flushes.lock().unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}

pub struct MockDatabase {
    recorder: Recorder,
    fail: bool,
}

#[async_trait]
impl Database for MockDatabase {
    async fn init(&self) -> Result<(), DatabaseError> {
        self.recorder.push(Event::DbInit);
        if self.fail {
            return Err(DatabaseError::InvalidUri("relative URL without a base".into()));
        }
        Ok(())
    }
}

/// Database whose `init` blocks until the paired sender fires.
pub struct GatedDatabase {
    recorder: Recorder,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

#[async_trait]
impl Database for GatedDatabase {
    async fn init(&self) -> Result<(), DatabaseError> {
        self.recorder.push(Event::DbInit);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(())
    }
}

/// How the mock factory and its session behave.
#[derive(Debug, Clone, Copy, Default)]
pub enum BotBehavior {
    #[default]
    Healthy,
    /// `build` returns `Ok(None)`.
    Missing,
    /// `build` returns an error.
    BuildError,
    /// `start` fails.
    StartFails,
    /// `stop` fails.
    StopFails,
    /// `stop` never completes.
    StopHangs,
}

pub struct MockFactory {
    recorder: Recorder,
    behavior: BotBehavior,
}

impl BotFactory for MockFactory {
    fn build(&self) -> Result<Option<Box<dyn BotSession>>, BotError> {
        self.recorder.push(Event::BotBuild);
        match self.behavior {
            BotBehavior::Missing => Ok(None),
            BotBehavior::BuildError => Err(BotError::InvalidToken),
            behavior => Ok(Some(Box::new(MockSession {
                recorder: self.recorder.clone(),
                behavior,
                connected: false,
            }))),
        }
    }
}

pub struct MockSession {
    recorder: Recorder,
    behavior: BotBehavior,
    connected: bool,
}

#[async_trait]
impl BotSession for MockSession {
    async fn start(&mut self) -> Result<(), BotError> {
        self.recorder.push(Event::BotStart);
        if let BotBehavior::StartFails = self.behavior {
            return Err(BotError::Rejected("Unauthorized".into()));
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn stop(&mut self) -> Result<(), BotError> {
        self.recorder.push(Event::BotStop);
        match self.behavior {
            BotBehavior::StopFails => Err(BotError::Rejected("stop refused".into())),
            BotBehavior::StopHangs => {
                std::future::pending::<()>().await;
                Ok(())
            }
            _ => {
                self.connected = false;
                Ok(())
            }
        }
    }
}

/// Build a lifecycle over mock collaborators.
pub fn mock_lifecycle(db_fails: bool, behavior: BotBehavior) -> (Lifecycle, Recorder, Output) {
    let recorder = Recorder::default();
    let database = MockDatabase {
        recorder: recorder.clone(),
        fail: db_fails,
    };
    let (lifecycle, output) = lifecycle_over(Box::new(database), &recorder, behavior);
    (lifecycle, recorder, output)
}

/// Build a healthy lifecycle whose step 1 blocks until the returned sender
/// fires (or is dropped).
pub fn gated_lifecycle() -> (Lifecycle, Recorder, oneshot::Sender<()>) {
    let recorder = Recorder::default();
    let (release, gate) = oneshot::channel();
    let database = GatedDatabase {
        recorder: recorder.clone(),
        gate: Mutex::new(Some(gate)),
    };
    let (lifecycle, _output) = lifecycle_over(Box::new(database), &recorder, BotBehavior::Healthy);
    (lifecycle, recorder, release)
}

fn lifecycle_over(
    database: Box<dyn Database>,
    recorder: &Recorder,
    behavior: BotBehavior,
) -> (Lifecycle, Output) {
    let output = Output::default();
    let lifecycle = Lifecycle::new(
        database,
        Box::new(MockFactory {
            recorder: recorder.clone(),
            behavior,
        }),
        Checkpoints::new(output.clone()),
    );
    (lifecycle, output)
}

/// A loopback address with no listener on it.
pub fn unused_local_address() -> SocketAddr {
    let placeholder = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    placeholder.local_addr().unwrap()
}

/// Start a mock Bot API answering `getMe` for [`GOOD_TOKEN`] and refusing
/// every other token.
pub async fn start_mock_bot_api() -> SocketAddr {
    async fn get_me(Path(segment): Path<String>) -> (StatusCode, Json<Value>) {
        if segment == format!("bot{}", GOOD_TOKEN) {
            (
                StatusCode::OK,
                Json(json!({
                    "ok": true,
                    "result": {
                        "id": 42,
                        "is_bot": true,
                        "first_name": "Mock",
                        "username": "mock_bot"
                    }
                })),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "ok": false,
                    "error_code": 401,
                    "description": "Unauthorized"
                })),
            )
        }
    }

    let app = Router::new().route("/{segment}/getMe", get(get_me));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Poll until `condition` holds or the attempts run out.
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition never became true");
}

/// Poll `url` until it answers or the attempts run out.
pub async fn wait_until_serving(client: &reqwest::Client, url: &str) -> reqwest::Response {
    for _ in 0..50 {
        if let Ok(res) = client.get(url).send().await {
            return res;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server at {} never answered", url);
}
