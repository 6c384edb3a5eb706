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

//! Core Kubernetes API types (Pod, PodSpec, Container, SecurityContext, ObjectMeta).
//!
//! Only the fields the validator reads are typed. Everything else an object
//! carries is kept in an ordered `extra` map so that re-encoding an object
//! hands the scanner the same manifest the user submitted.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;

/// Fields is an ordered map of untyped fields preserved verbatim.
pub type Fields = BTreeMap<String, serde_json::Value>;

/// ResourceList is a map of resource names to quantities.
pub type ResourceList = BTreeMap<String, serde_json::Value>;

/// ApiObject is a trait for Kubernetes API objects that can be used in admission.
pub trait ApiObject: Send + Sync {
    /// Returns the object as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the kind of this object.
    fn kind(&self) -> &str;
}

// ============================================================================
// Metadata
// ============================================================================

/// ObjectMeta is the metadata every persisted resource carries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl ObjectMeta {
    /// Create metadata with the given name and namespace.
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }
}

/// LabelSelector is a label query over a set of resources.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Fields,
}

// ============================================================================
// Security Context
// ============================================================================

/// Capabilities are the POSIX capabilities added to or dropped from a container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop: Vec<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Capabilities {
    /// Check if every capability is dropped.
    pub fn drops_all(&self) -> bool {
        self.drop.iter().any(|c| c.eq_ignore_ascii_case("ALL"))
    }
}

/// SecurityContext holds container-level security attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_privilege_escalation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_non_root: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_group: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_root_filesystem: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl SecurityContext {
    /// The locked-down context: unprivileged, non-root, read-only, no capabilities.
    pub fn hardened() -> Self {
        Self {
            privileged: Some(false),
            allow_privilege_escalation: Some(false),
            run_as_non_root: Some(true),
            run_as_user: Some(10001),
            read_only_root_filesystem: Some(true),
            capabilities: Some(Capabilities {
                drop: vec!["ALL".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// PodSecurityContext holds pod-level security attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_group: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_non_root: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_group: Option<i64>,
    #[serde(flatten)]
    pub extra: Fields,
}

// ============================================================================
// Resource Types
// ============================================================================

/// ResourceRequirements describes the compute resource requirements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceRequirements {
    /// Limits describes the maximum amount of compute resources allowed.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: ResourceList,
    /// Requests describes the minimum amount of compute resources required.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: ResourceList,
    /// Claims and any other field not modelled here.
    #[serde(flatten)]
    pub extra: Fields,
}

impl ResourceRequirements {
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty() && self.requests.is_empty() && self.extra.is_empty()
    }

    /// Check if a limit is declared for the named resource.
    pub fn has_limit(&self, name: &str) -> bool {
        self.limits.contains_key(name)
    }
}

// ============================================================================
// Container
// ============================================================================

/// Container represents a single container in a pod.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Name of the container.
    #[serde(default)]
    pub name: String,
    /// Container image name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
    /// Compute Resources required by this container.
    #[serde(default, skip_serializing_if = "ResourceRequirements::is_empty")]
    pub resources: ResourceRequirements,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Container {
    /// Create a new container with the given name and image.
    pub fn new(name: &str, image: &str) -> Self {
        Self {
            name: name.to_string(),
            image: image.to_string(),
            ..Default::default()
        }
    }

    /// Set the container security context.
    pub fn with_security_context(mut self, security_context: SecurityContext) -> Self {
        self.security_context = Some(security_context);
        self
    }

    /// Declare a resource limit.
    pub fn with_limit(mut self, name: &str, quantity: &str) -> Self {
        self.resources
            .limits
            .insert(name.to_string(), serde_json::Value::from(quantity));
        self
    }
}

// ============================================================================
// PodSpec
// ============================================================================

/// PodSpec describes the specification of a pod.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// List of initialization containers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init_containers: Vec<Container>,
    /// List of containers.
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<PodSecurityContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_network: Option<bool>,
    #[serde(default, rename = "hostPID", skip_serializing_if = "Option::is_none")]
    pub host_pid: Option<bool>,
    #[serde(default, rename = "hostIPC", skip_serializing_if = "Option::is_none")]
    pub host_ipc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl PodSpec {
    /// Create a PodSpec running the given containers.
    pub fn with_containers(containers: Vec<Container>) -> Self {
        Self {
            containers,
            ..Default::default()
        }
    }

    /// Visit all containers with their field paths.
    pub fn visit_containers_with_path<F>(&self, base_path: &str, mut visitor: F) -> bool
    where
        F: FnMut(&Container, String) -> bool,
    {
        for (i, c) in self.init_containers.iter().enumerate() {
            let path = format!("{}.initContainers[{}]", base_path, i);
            if !visitor(c, path) {
                return false;
            }
        }
        for (i, c) in self.containers.iter().enumerate() {
            let path = format!("{}.containers[{}]", base_path, i);
            if !visitor(c, path) {
                return false;
            }
        }
        true
    }
}

/// PodTemplateSpec describes the pods a controller creates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PodTemplateSpec {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(flatten)]
    pub extra: Fields,
}

// ============================================================================
// Pod
// ============================================================================

/// Pod represents a Kubernetes Pod.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Pod specification.
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Pod {
    /// Create a new pod with the given name and namespace.
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            metadata: ObjectMeta::new(name, namespace),
            ..Default::default()
        }
    }
}

// ============================================================================
// Unstructured
// ============================================================================

/// UnstructuredObject is any object of a kind the validator does not scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnstructuredObject {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub extra: Fields,
}

impl UnstructuredObject {
    pub fn new(api_version: &str, kind: &str, name: &str, namespace: &str) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            metadata: ObjectMeta::new(name, namespace),
            extra: Fields::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
