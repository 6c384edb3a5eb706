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

//! Admission attributes that describe an admission request.

use super::interfaces::Operation;
use crate::api::core::ApiObject;
use crate::api::{WorkloadKind, WorkloadObject};

/// GroupVersionResource identifies a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }
}

/// GroupVersionKind identifies a kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Split an apiVersion such as `apps/v1` or `v1` into a GroupVersionKind.
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::new("", api_version, kind),
        }
    }
}

/// Attributes is an interface used by admission controllers to get information
/// about a request that is used to make an admission decision.
pub trait Attributes {
    /// Returns the name of the object as presented in the request.
    fn get_name(&self) -> &str;

    /// Returns the namespace associated with the request (if any).
    fn get_namespace(&self) -> &str;

    /// Returns the resource being requested.
    fn get_resource(&self) -> &GroupVersionResource;

    /// Returns the name of the subresource being requested.
    fn get_subresource(&self) -> &str;

    /// Returns the operation being performed.
    fn get_operation(&self) -> Operation;

    /// Returns the object from the incoming request.
    fn get_object(&self) -> Option<&dyn ApiObject>;

    /// Returns the kind of object being manipulated.
    fn get_kind(&self) -> &GroupVersionKind;

    /// Returns the object as a workload, if it is one.
    fn get_workload(&self) -> Option<&WorkloadObject> {
        self.get_object()
            .and_then(|obj| obj.as_any().downcast_ref::<WorkloadObject>())
    }
}

/// AttributesRecord is a concrete implementation of Attributes.
pub struct AttributesRecord {
    pub name: String,
    pub namespace: String,
    pub resource: GroupVersionResource,
    pub subresource: String,
    pub operation: Operation,
    pub object: Option<Box<dyn ApiObject>>,
    pub kind: GroupVersionKind,
}

impl AttributesRecord {
    /// Create a new AttributesRecord.
    pub fn new(
        name: &str,
        namespace: &str,
        resource: GroupVersionResource,
        subresource: &str,
        operation: Operation,
        object: Option<Box<dyn ApiObject>>,
        kind: GroupVersionKind,
    ) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            resource,
            subresource: subresource.to_string(),
            operation,
            object,
            kind,
        }
    }

    /// Build the attributes of a request for the given workload, deriving
    /// name, namespace, resource and kind from the object itself.
    pub fn for_workload(operation: Operation, object: WorkloadObject) -> Self {
        let kind = GroupVersionKind::from_api_version(object.api_version(), object.kind_name());
        let resource = match object.workload_kind() {
            Some(WorkloadKind::Pod) => GroupVersionResource::new("", "v1", "pods"),
            Some(WorkloadKind::Deployment) => GroupVersionResource::new("apps", "v1", "deployments"),
            Some(WorkloadKind::DaemonSet) => GroupVersionResource::new("apps", "v1", "daemonsets"),
            Some(WorkloadKind::StatefulSet) => {
                GroupVersionResource::new("apps", "v1", "statefulsets")
            }
            None => GroupVersionResource::new(
                &kind.group,
                &kind.version,
                &format!("{}s", kind.kind.to_lowercase()),
            ),
        };

        Self {
            name: object.name().to_string(),
            namespace: object.namespace().to_string(),
            resource,
            subresource: String::new(),
            operation,
            object: Some(Box::new(object)),
            kind,
        }
    }
}

impl Attributes for AttributesRecord {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_namespace(&self) -> &str {
        &self.namespace
    }

    fn get_resource(&self) -> &GroupVersionResource {
        &self.resource
    }

    fn get_subresource(&self) -> &str {
        &self.subresource
    }

    fn get_operation(&self) -> Operation {
        self.operation
    }

    fn get_object(&self) -> Option<&dyn ApiObject> {
        self.object.as_ref().map(|o| o.as_ref())
    }

    fn get_kind(&self) -> &GroupVersionKind {
        &self.kind
    }
}
