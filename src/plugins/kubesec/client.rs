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

//! Client for the kubesec scan service.
//!
//! The service takes a manifest in the request body and answers with a JSON
//! list holding one result per object in the manifest. The validator always
//! submits exactly one object, so anything but a single clean result is a
//! failure regardless of what the transport reported.

use crate::admission::{AdmissionError, AdmissionResult};
use crate::config::ScanConfig;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;

const USER_AGENT: &str = concat!("kubesec-admission/", env!("CARGO_PKG_VERSION"));

/// RuleOutcome is one scoring rule that matched the scanned object.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub points: i64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Scoring groups the matched rules by severity.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Scoring {
    #[serde(default)]
    pub critical: Vec<RuleOutcome>,
    #[serde(default)]
    pub passed: Vec<RuleOutcome>,
    #[serde(default)]
    pub advise: Vec<RuleOutcome>,
}

/// ScanResult is the scanner's verdict on one object.
///
/// The typed fields are a view over the entry the scanner returned; the entry
/// itself is kept verbatim in `raw` and is what gets reported.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub message: String,
    pub score: i64,
    #[serde(default)]
    pub scoring: Option<Scoring>,
    #[serde(default)]
    pub error: String,
    #[serde(skip)]
    raw: Value,
}

impl ScanResult {
    /// Interpret one entry of a scan response.
    pub fn from_value(raw: Value) -> AdmissionResult<Self> {
        let mut result: ScanResult = serde_json::from_value(raw.clone()).map_err(|err| {
            AdmissionError::scan_failed(format!("malformed scan response: {}", err))
        })?;
        result.raw = raw;
        Ok(result)
    }

    /// Create a result carrying only a score.
    pub fn with_score(score: i64) -> Self {
        Self {
            valid: true,
            score,
            raw: json!({ "score": score, "valid": true }),
            ..Default::default()
        }
    }

    /// The entry exactly as the scanner returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Scanner scores one canonical manifest.
pub trait Scanner: Send + Sync {
    fn scan(&self, definition: &[u8]) -> AdmissionResult<ScanResult>;
}

/// ScanClient talks to a kubesec-compatible HTTP endpoint.
pub struct ScanClient {
    agent: ureq::Agent,
    url: String,
}

impl ScanClient {
    pub fn new(config: &ScanConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build();

        Self {
            agent,
            url: config.url.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Scanner for ScanClient {
    fn scan(&self, definition: &[u8]) -> AdmissionResult<ScanResult> {
        debug!(url = %self.url, bytes = definition.len(), "sending manifest to scan service");

        let response = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/x-yaml")
            .send_bytes(definition)
            .map_err(|err| match err {
                ureq::Error::Status(code, response) => {
                    let body = response.into_string().unwrap_or_default();
                    AdmissionError::scan_failed(format!(
                        "{} returned HTTP {}: {}",
                        self.url,
                        code,
                        body.trim()
                    ))
                }
                ureq::Error::Transport(transport) => AdmissionError::scan_failed(format!(
                    "request to {} failed: {}",
                    self.url, transport
                )),
            })?;

        let body = response.into_string().map_err(|err| {
            AdmissionError::scan_failed(format!("unable to read scan response: {}", err))
        })?;

        parse_response(&body)
    }
}

/// Parse a scan response body into the result for the single submitted object.
pub fn parse_response(body: &str) -> AdmissionResult<ScanResult> {
    let results: Vec<Value> = serde_json::from_str(body)
        .map_err(|err| AdmissionError::scan_failed(format!("malformed scan response: {}", err)))?;
    single_result(results)
}

/// Enforce one result per submitted object, with no embedded error.
pub fn single_result(mut results: Vec<Value>) -> AdmissionResult<ScanResult> {
    let result = match results.len() {
        0 => return Err(AdmissionError::scan_failed("empty result")),
        1 => ScanResult::from_value(results.remove(0))?,
        n => {
            return Err(AdmissionError::scan_failed(format!(
                "unexpected multiplicity: {} results for one resource",
                n
            )))
        }
    };

    if !result.error.is_empty() {
        return Err(AdmissionError::scan_service_error(result.error));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const KUBESEC_RESPONSE: &str = r#"[
  {
    "object": "Pod/web.default",
    "valid": true,
    "fileName": "API",
    "message": "Passed with a score of 3 points",
    "score": 3,
    "scoring": {
      "passed": [
        {
          "id": "ReadOnlyRootFilesystem",
          "selector": "containers[] .securityContext .readOnlyRootFilesystem == true",
          "reason": "An immutable root filesystem can prevent malicious binaries being added to PATH and increase attack cost",
          "points": 1
        }
      ],
      "advise": [
        {
          "id": "ApparmorAny",
          "selector": ".metadata .annotations .\"container.apparmor.security.beta.kubernetes.io/nginx\"",
          "reason": "Well defined AppArmor policies may provide greater protection from unknown threats. WARNING: NOT PRODUCTION READY",
          "points": 3
        }
      ]
    }
  }
]"#;

    #[test]
    fn test_parse_kubesec_response() {
        let result = parse_response(KUBESEC_RESPONSE).unwrap();
        assert_eq!(result.score, 3);
        assert_eq!(result.object, "Pod/web.default");
        let scoring = result.scoring.unwrap();
        assert_eq!(scoring.passed[0].id, "ReadOnlyRootFilesystem");
        assert_eq!(scoring.advise[0].points, 3);
        assert!(scoring.critical.is_empty());
    }

    #[test]
    fn test_parse_negative_score_and_unknown_fields() {
        let result =
            parse_response(r#"[{"score": -30, "message": "Failed", "rules": {"v": 2}}]"#).unwrap();
        assert_eq!(result.score, -30);
        assert_eq!(result.raw()["rules"], json!({"v": 2}));
        assert_eq!(result.object, "");
        assert!(result.raw().get("object").is_none());
    }

    #[test]
    fn test_rule_outcome_keeps_unknown_fields() {
        let result = parse_response(
            r#"[{"score": 1, "scoring": {"advise": [{"id": "LimitsCPU", "points": 1, "href": "https://kubesec.io"}]}}]"#,
        )
        .unwrap();
        let advise = &result.scoring.unwrap().advise[0];
        assert_eq!(advise.id, "LimitsCPU");
        assert_eq!(advise.extra["href"], json!("https://kubesec.io"));
    }

    #[test]
    fn test_empty_result() {
        assert_matches!(
            parse_response("[]"),
            Err(AdmissionError::ScanFailed(ref msg)) if msg == "empty result"
        );
    }

    #[test]
    fn test_multiple_results() {
        assert_matches!(
            parse_response(r#"[{"score": 1}, {"score": 2}]"#),
            Err(AdmissionError::ScanFailed(ref msg)) if msg.contains("unexpected multiplicity")
        );
    }

    #[test]
    fn test_embedded_error() {
        assert_matches!(
            parse_response(r#"[{"score": 0, "error": "failed to parse manifest"}]"#),
            Err(AdmissionError::ScanServiceError(ref msg)) if msg == "failed to parse manifest"
        );
    }

    #[test]
    fn test_malformed_payload() {
        assert_matches!(
            parse_response("<html>bad gateway</html>"),
            Err(AdmissionError::ScanFailed(ref msg)) if msg.starts_with("malformed scan response")
        );
        assert_matches!(
            parse_response(r#"{"score": 1}"#),
            Err(AdmissionError::ScanFailed(_))
        );
        assert_matches!(
            parse_response(r#"[{"message": "no score"}]"#),
            Err(AdmissionError::ScanFailed(_))
        );
    }

    #[test]
    fn test_single_result_checks_multiplicity_before_error() {
        let broken = json!({"score": 0, "error": "boom"});
        assert_matches!(
            single_result(vec![broken.clone(), broken]),
            Err(AdmissionError::ScanFailed(_))
        );
    }

    #[test]
    fn test_client_uses_configured_url() {
        let client = ScanClient::new(&ScanConfig {
            url: "http://127.0.0.1:9/scan".to_string(),
            ..Default::default()
        });
        assert_eq!(client.url(), "http://127.0.0.1:9/scan");
    }
}
