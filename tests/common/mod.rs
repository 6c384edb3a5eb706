// Copyright 2024 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared helpers for integration tests.

#![allow(dead_code)]

use kubesec_admission::api::manifest;
use kubesec_admission::{AdmissionError, AdmissionResult, ScanResult, Scanner, WorkloadObject};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(testdata(name)).unwrap()
}

pub fn fixture(name: &str) -> WorkloadObject {
    manifest::decode(&read_fixture(name)).unwrap()
}

/// PostureScanner scores the pod template the way kubesec weighs the most
/// common settings: a privileged container costs 30 points; runAsNonRoot,
/// readOnlyRootFilesystem, dropping ALL capabilities and a memory limit earn
/// one point each.
#[derive(Default)]
pub struct PostureScanner {
    calls: AtomicUsize,
    last: Mutex<Option<Vec<u8>>>,
}

impl PostureScanner {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_definition(&self) -> Option<String> {
        self.last
            .lock()
            .unwrap()
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Scanner for PostureScanner {
    fn scan(&self, definition: &[u8]) -> AdmissionResult<ScanResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(definition.to_vec());

        let text = std::str::from_utf8(definition)
            .map_err(|err| AdmissionError::scan_failed(err.to_string()))?;
        let object = manifest::decode(text)?;
        let spec = object
            .pod_spec()
            .ok_or_else(|| AdmissionError::scan_service_error("no pod spec found"))?;

        let mut score = 0;
        spec.visit_containers_with_path("spec", |container, _| {
            if let Some(sc) = &container.security_context {
                if sc.privileged == Some(true) {
                    score -= 30;
                }
                if sc.run_as_non_root == Some(true) {
                    score += 1;
                }
                if sc.read_only_root_filesystem == Some(true) {
                    score += 1;
                }
                if sc.capabilities.as_ref().map_or(false, |c| c.drops_all()) {
                    score += 1;
                }
            }
            if container.resources.has_limit("memory") {
                score += 1;
            }
            true
        });

        ScanResult::from_value(serde_json::json!({
            "object": format!("{}/{}.{}", object.kind_name(), object.name(), object.namespace()),
            "valid": true,
            "message": format!("Scored {} points", score),
            "score": score,
        }))
    }
}

/// FixedScanner reports the same score for every object.
pub struct FixedScanner(pub i64);

impl Scanner for FixedScanner {
    fn scan(&self, _definition: &[u8]) -> AdmissionResult<ScanResult> {
        Ok(ScanResult::with_score(self.0))
    }
}

/// FailingScanner always returns the same error.
pub struct FailingScanner(pub AdmissionError);

impl Scanner for FailingScanner {
    fn scan(&self, _definition: &[u8]) -> AdmissionResult<ScanResult> {
        Err(self.0.clone())
    }
}

/// A request captured by the fake scan service.
#[derive(Debug, Default)]
pub struct RecordedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// FakeScanService answers exactly one HTTP request with a canned response.
pub struct FakeScanService {
    pub url: String,
    handle: JoinHandle<RecordedRequest>,
}

impl FakeScanService {
    pub fn respond(status: u16, body: &str) -> Self {
        Self::respond_after(status, body, Duration::ZERO)
    }

    pub fn respond_after(status: u16, body: &str, delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/scan", listener.local_addr().unwrap());
        let body = body.to_string();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let request = read_request(&mut reader);

            thread::sleep(delay);
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason(status),
                body.len(),
                body
            );
            let _ = reader.get_mut().write_all(response.as_bytes());
            request
        });

        Self { url, handle }
    }

    /// Wait for the request to be served and return what was received.
    pub fn request(self) -> RecordedRequest {
        self.handle.join().unwrap()
    }
}

fn read_request<R: BufRead>(reader: &mut R) -> RecordedRequest {
    let mut request = RecordedRequest::default();
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    request.request_line = line.trim_end().to_string();

    loop {
        line.clear();
        reader.read_line(&mut line).unwrap();
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((key, value)) = header.split_once(':') {
            request
                .headers
                .push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = request
        .header("content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).unwrap();
    request.body = body;
    request
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}

/// A URL nothing listens on.
pub fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/scan", addr)
}

/// A kubesec style response holding one result with the given score.
pub fn scan_response(object: &str, score: i64) -> String {
    serde_json::json!([{
        "object": object,
        "valid": true,
        "fileName": "API",
        "message": format!("Scored {} points", score),
        "score": score,
        "scoring": {
            "advise": [{
                "id": "ServiceAccountName",
                "selector": ".spec .serviceAccountName",
                "reason": "Service accounts restrict Kubernetes API access and should be configured with least privilege",
                "points": 3
            }]
        }
    }])
    .to_string()
}
