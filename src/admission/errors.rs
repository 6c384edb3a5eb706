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

//! Admission error types.
//!
//! None of these block admission on their own. The validator absorbs every
//! variant into a permissive verdict unless the failure policy says otherwise;
//! a denial is a `Verdict`, never an error.

use thiserror::Error;

/// Result type for admission operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// AdmissionError represents errors that can occur while validating a workload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// BadRequest indicates the request did not carry a usable object.
    #[error("{0}")]
    BadRequest(String),

    /// UnsupportedKind indicates an object whose kind is not scanned.
    #[error("resource kind {0:?} is not supported")]
    UnsupportedKind(String),

    /// SerializationFailed indicates the object could not be encoded as a manifest.
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// ScanFailed indicates a transport or protocol failure talking to the scanner.
    #[error("scan failed: {0}")]
    ScanFailed(String),

    /// ScanServiceError indicates the scanner itself reported an error for the resource.
    #[error("scan service error: {0}")]
    ScanServiceError(String),

    /// Decode indicates a manifest could not be decoded into an object.
    #[error("unable to decode manifest: {0}")]
    Decode(String),
}

impl AdmissionError {
    /// Create a new BadRequest error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AdmissionError::BadRequest(msg.into())
    }

    /// Create a new UnsupportedKind error.
    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        AdmissionError::UnsupportedKind(kind.into())
    }

    /// Create a new SerializationFailed error.
    pub fn serialization_failed(msg: impl Into<String>) -> Self {
        AdmissionError::SerializationFailed(msg.into())
    }

    /// Create a new ScanFailed error.
    pub fn scan_failed(msg: impl Into<String>) -> Self {
        AdmissionError::ScanFailed(msg.into())
    }

    /// Create a new ScanServiceError error.
    pub fn scan_service_error(msg: impl Into<String>) -> Self {
        AdmissionError::ScanServiceError(msg.into())
    }

    /// Create a new Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        AdmissionError::Decode(msg.into())
    }
}

impl From<serde_yaml::Error> for AdmissionError {
    fn from(err: serde_yaml::Error) -> Self {
        AdmissionError::Decode(err.to_string())
    }
}
