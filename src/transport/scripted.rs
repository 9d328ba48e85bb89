//! In-memory transport for unit tests.
//!
//! Each URL path owns a queue of scripted steps. Once a queue is empty the
//! transport answers `200 []`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;

use super::{RequestDescriptor, Transport, TransportError, TransportResponse};

#[derive(Debug, Clone)]
pub(crate) enum Step {
    Respond(u16, String),
    Fail(TransportError),
    Hang,
    Delay(Duration, Box<Step>),
}

impl Step {
    pub(crate) fn ok(body: &str) -> Self {
        Step::Respond(200, body.to_string())
    }

    pub(crate) fn status(code: u16) -> Self {
        Step::Respond(code, String::new())
    }

    pub(crate) fn network() -> Self {
        Step::Fail(TransportError::Network("connection refused".into()))
    }
}

#[derive(Debug)]
pub(crate) struct StubResponse {
    status: StatusCode,
    body: Vec<u8>,
    body_reads: Arc<AtomicUsize>,
}

impl TransportResponse for StubResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    async fn into_body(self) -> Result<Vec<u8>, TransportError> {
        self.body_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.body)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<HashMap<String, u32>>,
    requests: Mutex<Vec<RequestDescriptor>>,
    body_reads: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script(self, path: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(path.to_string(), steps.into_iter().collect());
        self
    }

    pub(crate) fn calls(&self, path: &str) -> u32 {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub(crate) fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn body_reads(&self) -> usize {
        self.body_reads.load(Ordering::SeqCst)
    }

    fn next_step(&self, request: &RequestDescriptor) -> Step {
        let path = request.url.path().to_string();
        *self.calls.lock().unwrap().entry(path.clone()).or_insert(0) += 1;
        self.requests.lock().unwrap().push(request.clone());
        self.scripts
            .lock()
            .unwrap()
            .get_mut(&path)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Step::ok("[]"))
    }

    async fn run(&self, step: Step) -> Result<StubResponse, TransportError> {
        let mut step = step;
        loop {
            match step {
                Step::Respond(code, body) => {
                    return Ok(StubResponse {
                        status: StatusCode::from_u16(code).unwrap(),
                        body: body.into_bytes(),
                        body_reads: self.body_reads.clone(),
                    })
                }
                Step::Fail(e) => return Err(e),
                Step::Hang => std::future::pending::<()>().await,
                Step::Delay(d, next) => {
                    tokio::time::sleep(d).await;
                    step = *next;
                }
            }
        }
    }
}

impl Transport for ScriptedTransport {
    type Response = StubResponse;

    async fn execute(&self, request: RequestDescriptor) -> Result<StubResponse, TransportError> {
        let step = self.next_step(&request);
        self.run(step).await
    }
}
