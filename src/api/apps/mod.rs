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

//! Workload controller types from the apps API group (Deployment, DaemonSet, StatefulSet).
//!
//! These also decode objects submitted under the retired `extensions/v1beta1`,
//! `apps/v1beta1` and `apps/v1beta2` versions; the pod template layout is the same.

use crate::api::core::{Fields, LabelSelector, ObjectMeta, PodSpec, PodTemplateSpec};
use serde::{Deserialize, Serialize};

// ============================================================================
// Deployment
// ============================================================================

/// DeploymentSpec is the specification of a Deployment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    #[serde(default)]
    pub template: PodTemplateSpec,
    #[serde(flatten)]
    pub extra: Fields,
}

/// Deployment represents a Kubernetes Deployment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DeploymentSpec,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Deployment {
    /// Create a deployment whose pod template runs the given spec.
    pub fn new(name: &str, namespace: &str, pod_spec: PodSpec) -> Self {
        Self {
            metadata: ObjectMeta::new(name, namespace),
            spec: DeploymentSpec {
                replicas: Some(1),
                template: PodTemplateSpec {
                    spec: pod_spec,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

// ============================================================================
// DaemonSet
// ============================================================================

/// DaemonSetSpec is the specification of a DaemonSet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonSetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    #[serde(default)]
    pub template: PodTemplateSpec,
    #[serde(flatten)]
    pub extra: Fields,
}

/// DaemonSet represents a Kubernetes DaemonSet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonSet {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DaemonSetSpec,
    #[serde(flatten)]
    pub extra: Fields,
}

impl DaemonSet {
    pub fn new(name: &str, namespace: &str, pod_spec: PodSpec) -> Self {
        Self {
            metadata: ObjectMeta::new(name, namespace),
            spec: DaemonSetSpec {
                template: PodTemplateSpec {
                    spec: pod_spec,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

// ============================================================================
// StatefulSet
// ============================================================================

/// StatefulSetSpec is the specification of a StatefulSet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatefulSetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    #[serde(default)]
    pub template: PodTemplateSpec,
    #[serde(flatten)]
    pub extra: Fields,
}

/// StatefulSet represents a Kubernetes StatefulSet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatefulSet {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: StatefulSetSpec,
    #[serde(flatten)]
    pub extra: Fields,
}

impl StatefulSet {
    pub fn new(name: &str, namespace: &str, pod_spec: PodSpec) -> Self {
        Self {
            metadata: ObjectMeta::new(name, namespace),
            spec: StatefulSetSpec {
                replicas: Some(1),
                service_name: Some(name.to_string()),
                template: PodTemplateSpec {
                    spec: pod_spec,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::core::Container;

    #[test]
    fn test_deployment_deserialize() {
        let deployment: Deployment = serde_yaml::from_str(
            r#"
apiVersion: extensions/v1beta1
kind: Deployment
metadata:
  name: web
spec:
  replicas: 3
  revisionHistoryLimit: 2
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
    spec:
      containers:
      - name: main
        image: nginx
"#,
        )
        .unwrap();

        assert_eq!(deployment.api_version, "extensions/v1beta1");
        assert_eq!(deployment.spec.replicas, Some(3));
        assert!(deployment.spec.extra.contains_key("revisionHistoryLimit"));
        assert_eq!(
            deployment.spec.selector.unwrap().match_labels["app"],
            "web"
        );
        assert_eq!(deployment.spec.template.metadata.labels["app"], "web");
        assert_eq!(deployment.spec.template.spec.containers[0].name, "main");
    }

    #[test]
    fn test_statefulset_new() {
        let sts = StatefulSet::new(
            "db",
            "data",
            PodSpec::with_containers(vec![Container::new("postgres", "postgres:16")]),
        );
        assert_eq!(sts.metadata.namespace, "data");
        assert_eq!(sts.spec.service_name.as_deref(), Some("db"));
        assert_eq!(sts.spec.template.spec.containers.len(), 1);
    }

    #[test]
    fn test_daemonset_roundtrip_keeps_update_strategy() {
        let yaml = r#"
apiVersion: apps/v1
kind: DaemonSet
metadata:
  name: agent
  namespace: kube-system
spec:
  updateStrategy:
    type: RollingUpdate
  template:
    spec:
      hostNetwork: true
      containers:
      - name: agent
        image: agent:1.0
"#;
        let ds: DaemonSet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(ds.spec.template.spec.host_network, Some(true));

        let encoded = serde_yaml::to_string(&ds).unwrap();
        assert!(encoded.contains("updateStrategy"));
        assert!(encoded.contains("RollingUpdate"));
        assert!(encoded.contains("hostNetwork: true"));
    }
}
