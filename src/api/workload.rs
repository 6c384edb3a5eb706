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

//! The closed set of objects an admission request can carry to the validator.

use super::apps::{DaemonSet, Deployment, StatefulSet};
use super::core::{ApiObject, ObjectMeta, Pod, PodSpec, UnstructuredObject};
use std::any::Any;
use std::fmt;

/// WorkloadKind is a resource family the validator scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Pod,
    Deployment,
    DaemonSet,
    StatefulSet,
}

impl WorkloadKind {
    /// All scanned kinds.
    pub const ALL: [WorkloadKind; 4] = [
        WorkloadKind::Pod,
        WorkloadKind::Deployment,
        WorkloadKind::DaemonSet,
        WorkloadKind::StatefulSet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Pod => "Pod",
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::StatefulSet => "StatefulSet",
        }
    }

    /// The apiVersion every object of this kind is stamped with before scanning.
    pub fn canonical_api_version(&self) -> &'static str {
        match self {
            WorkloadKind::Pod => "v1",
            WorkloadKind::Deployment | WorkloadKind::DaemonSet | WorkloadKind::StatefulSet => {
                "apps/v1"
            }
        }
    }

    /// Resolve an apiVersion/kind pair to a scanned kind.
    ///
    /// Deprecated groups are accepted for the controllers that used to live
    /// there. An empty apiVersion resolves by kind alone.
    pub fn resolve(api_version: &str, kind: &str) -> Option<Self> {
        let group = match api_version.split_once('/') {
            Some((group, _)) => group,
            None if api_version.is_empty() => return Self::from_kind(kind),
            None => "",
        };

        match (group, kind) {
            ("", "Pod") => Some(WorkloadKind::Pod),
            ("apps" | "extensions", "Deployment") => Some(WorkloadKind::Deployment),
            ("apps" | "extensions", "DaemonSet") => Some(WorkloadKind::DaemonSet),
            ("apps", "StatefulSet") => Some(WorkloadKind::StatefulSet),
            _ => None,
        }
    }

    fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == kind)
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WorkloadObject is the typed object of an admission request.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkloadObject {
    Pod(Pod),
    Deployment(Deployment),
    DaemonSet(DaemonSet),
    StatefulSet(StatefulSet),
    /// Any other kind. Never scanned.
    Unsupported(UnstructuredObject),
}

impl WorkloadObject {
    /// Returns the scanned kind, or None for unsupported objects.
    pub fn workload_kind(&self) -> Option<WorkloadKind> {
        match self {
            WorkloadObject::Pod(_) => Some(WorkloadKind::Pod),
            WorkloadObject::Deployment(_) => Some(WorkloadKind::Deployment),
            WorkloadObject::DaemonSet(_) => Some(WorkloadKind::DaemonSet),
            WorkloadObject::StatefulSet(_) => Some(WorkloadKind::StatefulSet),
            WorkloadObject::Unsupported(_) => None,
        }
    }

    /// Returns the runtime kind name.
    pub fn kind_name(&self) -> &str {
        match self {
            WorkloadObject::Unsupported(obj) if obj.kind.is_empty() => "Unknown",
            WorkloadObject::Unsupported(obj) => &obj.kind,
            other => other.workload_kind().map_or("Unknown", |k| k.as_str()),
        }
    }

    /// Returns the apiVersion the object arrived with.
    pub fn api_version(&self) -> &str {
        match self {
            WorkloadObject::Pod(o) => &o.api_version,
            WorkloadObject::Deployment(o) => &o.api_version,
            WorkloadObject::DaemonSet(o) => &o.api_version,
            WorkloadObject::StatefulSet(o) => &o.api_version,
            WorkloadObject::Unsupported(o) => &o.api_version,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            WorkloadObject::Pod(o) => &o.metadata,
            WorkloadObject::Deployment(o) => &o.metadata,
            WorkloadObject::DaemonSet(o) => &o.metadata,
            WorkloadObject::StatefulSet(o) => &o.metadata,
            WorkloadObject::Unsupported(o) => &o.metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata().namespace
    }

    /// Returns the pod specification the workload runs, if it has one.
    pub fn pod_spec(&self) -> Option<&PodSpec> {
        match self {
            WorkloadObject::Pod(o) => Some(&o.spec),
            WorkloadObject::Deployment(o) => Some(&o.spec.template.spec),
            WorkloadObject::DaemonSet(o) => Some(&o.spec.template.spec),
            WorkloadObject::StatefulSet(o) => Some(&o.spec.template.spec),
            WorkloadObject::Unsupported(_) => None,
        }
    }
}

impl ApiObject for WorkloadObject {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> &str {
        self.kind_name()
    }
}

impl From<Pod> for WorkloadObject {
    fn from(pod: Pod) -> Self {
        WorkloadObject::Pod(pod)
    }
}

impl From<Deployment> for WorkloadObject {
    fn from(deployment: Deployment) -> Self {
        WorkloadObject::Deployment(deployment)
    }
}

impl From<DaemonSet> for WorkloadObject {
    fn from(daemon_set: DaemonSet) -> Self {
        WorkloadObject::DaemonSet(daemon_set)
    }
}

impl From<StatefulSet> for WorkloadObject {
    fn from(stateful_set: StatefulSet) -> Self {
        WorkloadObject::StatefulSet(stateful_set)
    }
}

impl From<UnstructuredObject> for WorkloadObject {
    fn from(object: UnstructuredObject) -> Self {
        WorkloadObject::Unsupported(object)
    }
}
