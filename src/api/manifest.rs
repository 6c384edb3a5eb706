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

//! Decoding of YAML or JSON manifests into workload objects.

use super::workload::{WorkloadKind, WorkloadObject};
use crate::admission::{AdmissionError, AdmissionResult};
use serde::Deserialize;
use serde_yaml::Value;

/// Decode a single-document manifest.
pub fn decode(manifest: &str) -> AdmissionResult<WorkloadObject> {
    let value: Value = serde_yaml::from_str(manifest)?;
    from_value(value)
}

/// Decode every document of a multi-document manifest, skipping empty documents.
pub fn decode_all(manifests: &str) -> AdmissionResult<Vec<WorkloadObject>> {
    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(manifests) {
        let value = Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        objects.push(from_value(value)?);
    }
    Ok(objects)
}

fn from_value(value: Value) -> AdmissionResult<WorkloadObject> {
    if !value.is_mapping() {
        return Err(AdmissionError::decode("manifest is not an object"));
    }

    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| AdmissionError::decode("object has no kind"))?;
    let api_version = value.get("apiVersion").and_then(Value::as_str).unwrap_or("");

    let object = match WorkloadKind::resolve(api_version, kind) {
        Some(WorkloadKind::Pod) => WorkloadObject::Pod(serde_yaml::from_value(value)?),
        Some(WorkloadKind::Deployment) => WorkloadObject::Deployment(serde_yaml::from_value(value)?),
        Some(WorkloadKind::DaemonSet) => WorkloadObject::DaemonSet(serde_yaml::from_value(value)?),
        Some(WorkloadKind::StatefulSet) => {
            WorkloadObject::StatefulSet(serde_yaml::from_value(value)?)
        }
        None => WorkloadObject::Unsupported(serde_yaml::from_value(value)?),
    };
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_decode_pod() {
        let obj = decode(
            r#"
apiVersion: v1
kind: Pod
metadata:
  name: web
  namespace: default
spec:
  containers:
  - name: main
    image: nginx
"#,
        )
        .unwrap();

        assert_matches!(obj, WorkloadObject::Pod(_));
        assert_eq!(obj.name(), "web");
        assert_eq!(obj.api_version(), "v1");
    }

    #[test]
    fn test_decode_deprecated_group() {
        let obj = decode(
            r#"
---
apiVersion: extensions/v1beta1
kind: DaemonSet
metadata:
  name: agent
spec:
  template:
    spec:
      containers:
      - name: agent
        image: agent:1.0
"#,
        )
        .unwrap();

        assert_matches!(obj, WorkloadObject::DaemonSet(_));
        assert_eq!(obj.api_version(), "extensions/v1beta1");
    }

    #[test]
    fn test_decode_json() {
        let obj = decode(r#"{"apiVersion":"apps/v1","kind":"StatefulSet","metadata":{"name":"db"}}"#)
            .unwrap();
        assert_matches!(obj, WorkloadObject::StatefulSet(_));
        assert_eq!(obj.name(), "db");
    }

    #[test]
    fn test_decode_unsupported() {
        let obj = decode(
            r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
data:
  key: value
"#,
        )
        .unwrap();

        match obj {
            WorkloadObject::Unsupported(ref cm) => {
                assert_eq!(cm.kind, "ConfigMap");
                assert!(cm.extra.contains_key("data"));
            }
            other => panic!("expected unsupported object, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_errors() {
        assert_matches!(decode("metadata:\n  name: x\n"), Err(AdmissionError::Decode(_)));
        assert_matches!(decode("- a\n- b\n"), Err(AdmissionError::Decode(_)));
        assert_matches!(decode("kind: Pod\nspec: [unclosed"), Err(AdmissionError::Decode(_)));
        assert_matches!(
            decode("kind: Pod\nspec:\n  containers: 3\n"),
            Err(AdmissionError::Decode(_))
        );
    }

    #[test]
    fn test_decode_all() {
        let objects = decode_all(
            r#"
---
apiVersion: v1
kind: Pod
metadata:
  name: one
---
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: two
---
apiVersion: v1
kind: Service
metadata:
  name: three
"#,
        )
        .unwrap();

        let names: Vec<_> = objects.iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
        assert_eq!(objects[2].workload_kind(), None);
    }
}
