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

//! Canonical manifest encoding.
//!
//! The scanner only knows the current API versions, so every object is
//! re-stamped with its kind's canonical apiVersion before it is encoded.

use crate::admission::{AdmissionError, AdmissionResult};
use crate::api::{WorkloadKind, WorkloadObject};
use serde::Serialize;

/// Encode a workload as the YAML manifest submitted to the scanner.
pub fn canonicalize(object: &WorkloadObject) -> AdmissionResult<Vec<u8>> {
    let manifest = match object {
        WorkloadObject::Pod(pod) => {
            let mut pod = pod.clone();
            stamp(&mut pod.api_version, &mut pod.kind, WorkloadKind::Pod);
            encode(&pod)?
        }
        WorkloadObject::Deployment(deployment) => {
            let mut deployment = deployment.clone();
            stamp(
                &mut deployment.api_version,
                &mut deployment.kind,
                WorkloadKind::Deployment,
            );
            encode(&deployment)?
        }
        WorkloadObject::DaemonSet(daemon_set) => {
            let mut daemon_set = daemon_set.clone();
            stamp(
                &mut daemon_set.api_version,
                &mut daemon_set.kind,
                WorkloadKind::DaemonSet,
            );
            encode(&daemon_set)?
        }
        WorkloadObject::StatefulSet(stateful_set) => {
            let mut stateful_set = stateful_set.clone();
            stamp(
                &mut stateful_set.api_version,
                &mut stateful_set.kind,
                WorkloadKind::StatefulSet,
            );
            encode(&stateful_set)?
        }
        WorkloadObject::Unsupported(_) => {
            return Err(AdmissionError::unsupported_kind(object.kind_name()))
        }
    };

    Ok(manifest.into_bytes())
}

fn stamp(api_version: &mut String, kind: &mut String, workload: WorkloadKind) {
    *api_version = workload.canonical_api_version().to_string();
    *kind = workload.as_str().to_string();
}

fn encode<T: Serialize>(object: &T) -> AdmissionResult<String> {
    serde_yaml::to_string(object).map_err(|err| AdmissionError::serialization_failed(err.to_string()))
}
