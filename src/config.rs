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

//! Validator configuration.
//!
//! Everything here is fixed when the validator is built and never changes for
//! the life of the process.

use std::fmt;
use std::time::Duration;

/// Default scan endpoint of the public kubesec v2 service.
pub const DEFAULT_SCAN_URL: &str = "https://v2.kubesec.io/scan";

/// Default timeout for one scan call.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(15);

/// FailurePolicy defines how to handle failures to canonicalize or scan an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Ignore means the request is admitted when the object cannot be scored.
    #[default]
    Ignore,
    /// Fail means the request is rejected when the object cannot be scored.
    Fail,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Ignore => "Ignore",
            FailurePolicy::Fail => "Fail",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Some(FailurePolicy::Ignore),
            "fail" => Some(FailurePolicy::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ScanConfig locates the scan service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// URL the canonical manifest is POSTed to.
    pub url: String,
    /// Upper bound on the whole scan call, connect included.
    pub timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SCAN_URL.to_string(),
            timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }
}

/// ValidatorConfig is the full configuration of the kubesec validator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatorConfig {
    /// Minimum score a workload needs to be admitted.
    pub min_score: i64,
    pub failure_policy: FailurePolicy,
    pub scan: ScanConfig,
}

impl ValidatorConfig {
    pub fn new(min_score: i64) -> Self {
        Self {
            min_score,
            ..Default::default()
        }
    }
}
