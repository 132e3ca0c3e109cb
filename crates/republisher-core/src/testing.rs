//! In-process HTTP backend standing in for the native store and the notifier.
//!
//! The server answers every request through a caller-supplied responder and
//! records what it received, so tests can assert on exact paths, headers and
//! bodies.

use crate::{
    collection::CollectionTable,
    endpoint::{Endpoints, HttpSettings, build_client},
    worker::Republisher,
};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
};
use core::time::Duration;
use std::{
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

pub(crate) const READ_PREFIX: &str = "/content";
pub(crate) const PUBLISH_PATH: &str = "/notify";

type Responder = Arc<dyn Fn(&Method, &str) -> (StatusCode, String) + Send + Sync>;
type Matcher = Arc<dyn Fn(&Method, &str) -> bool + Send + Sync>;

#[derive(Clone, Debug)]
pub(crate) struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
struct MockState {
    responder: Responder,
    delay: Duration,
    delayed: Matcher,
    requests: Arc<Mutex<Vec<Recorded>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

pub(crate) struct MockBackend {
    addr: SocketAddr,
    state: MockState,
}

impl MockBackend {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Method, &str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        Self::start_with_delay(Duration::ZERO, responder).await
    }

    /// Like [`MockBackend::start`], holding every response for `delay`.
    pub async fn start_with_delay<F>(delay: Duration, responder: F) -> Self
    where
        F: Fn(&Method, &str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        Self::start_with_slow(delay, |_, _| true, responder).await
    }

    /// Holds only the responses to requests matching `slow` for `delay`.
    pub async fn start_with_slow<S, F>(delay: Duration, slow: S, responder: F) -> Self
    where
        S: Fn(&Method, &str) -> bool + Send + Sync + 'static,
        F: Fn(&Method, &str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let state = MockState {
            responder: Arc::new(responder),
            delay,
            delayed: Arc::new(slow),
            requests: Arc::default(),
            in_flight: Arc::default(),
            peak_in_flight: Arc::default(),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn read_endpoint(&self) -> String {
        format!("http://{}{READ_PREFIX}", self.addr)
    }

    pub fn publish_endpoint(&self) -> String {
        format!("http://{}{PUBLISH_PATH}", self.addr)
    }

    pub fn republisher(&self, collections: CollectionTable) -> Republisher {
        republisher(&self.read_endpoint(), &self.publish_endpoint(), collections)
    }

    /// Worker whose requests give up after `request_timeout`.
    pub fn republisher_with_timeout(
        &self,
        collections: CollectionTable,
        request_timeout: Duration,
    ) -> Republisher {
        republisher_with(
            &self.read_endpoint(),
            &self.publish_endpoint(),
            collections,
            HttpSettings {
                request_timeout,
                connect_timeout: Duration::from_secs(1),
            },
        )
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<Recorded> {
        self.with_method(&Method::GET)
    }

    pub fn posts(&self) -> Vec<Recorded> {
        self.with_method(&Method::POST)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }

    fn with_method(&self, method: &Method) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == *method)
            .collect()
    }
}

pub(crate) fn republisher(read: &str, publish: &str, collections: CollectionTable) -> Republisher {
    let settings = HttpSettings {
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(1),
    };
    republisher_with(read, publish, collections, settings)
}

fn republisher_with(
    read: &str,
    publish: &str,
    collections: CollectionTable,
    settings: HttpSettings,
) -> Republisher {
    Republisher::new(
        build_client(settings).unwrap(),
        Endpoints::new(read, publish).unwrap(),
        collections,
    )
}

/// Address nothing is listening on.
pub(crate) fn closed_endpoint(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}{path}")
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri.path().to_owned();
    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        headers,
        body,
    });

    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak_in_flight.fetch_max(current, Ordering::SeqCst);
    if !state.delay.is_zero() && (state.delayed)(&method, &path) {
        tokio::time::sleep(state.delay).await;
    }
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    (state.responder)(&method, &path)
}
