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

//! Kubesec admission validation.
//!
//! A validating admission plugin that submits workload manifests (Pods,
//! Deployments, DaemonSets and StatefulSets) to a kubesec scan service and
//! rejects those scoring below a configured minimum.

pub mod admission;
pub mod api;
pub mod config;
pub mod plugins;

// Re-export commonly used types
pub use admission::{
    AdmissionError, AdmissionResult, Attributes, AttributesRecord, Handler, Interface, Operation,
    ValidationInterface, Verdict,
};
pub use api::{WorkloadKind, WorkloadObject};
pub use config::{FailurePolicy, ScanConfig, ValidatorConfig};
pub use plugins::kubesec::{KubesecValidator, ScanClient, ScanResult, Scanner};
