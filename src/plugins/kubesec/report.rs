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

//! Human-readable rendering of scan results.

use super::client::ScanResult;
use std::slice;

/// Render the scanner's response, a one-entry list, as JSON indented by two
/// spaces. Object keys come out sorted.
pub fn render_result(result: &ScanResult) -> String {
    serde_json::to_string_pretty(slice::from_ref(result.raw()))
        .unwrap_or_else(|_| format!("{:?}", result))
}

/// Build the message returned when a workload scores below the threshold.
pub fn format_denial(name: &str, score: i64, threshold: i64, result: &ScanResult) -> String {
    format!(
        "{} score is {}, minimum accepted score is {}\nScan Result:\n{}",
        name,
        score,
        threshold,
        render_result(result)
    )
}
