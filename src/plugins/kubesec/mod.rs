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

//! KubesecValidation admission controller.
//!
//! This admission controller scores Pods, Deployments, DaemonSets and
//! StatefulSets with a kubesec scan service and rejects any workload scoring
//! below the configured minimum. Other kinds are admitted with a warning.
//! When the object cannot be scored at all the failure policy decides; the
//! default is to admit.

pub mod canonical;
pub mod client;
pub mod report;

use crate::admission::{
    AdmissionError, AdmissionResult, Attributes, Handler, Interface, Operation,
    ValidationInterface, Verdict,
};
use crate::api::{WorkloadKind, WorkloadObject};
use crate::config::{FailurePolicy, ValidatorConfig};
use std::sync::Arc;
use tracing::{debug, error, info};

pub use canonical::canonicalize;
pub use client::{ScanClient, ScanResult, Scanner};
pub use report::{format_denial, render_result};

pub const PLUGIN_NAME: &str = "KubesecValidation";

/// Warning attached to objects of kinds the validator does not score.
pub const UNSUPPORTED_KIND_WARNING: &str = "resource kind not supported, validation skipped";

/// KubesecValidator admits or rejects workloads based on their kubesec score.
pub struct KubesecValidator {
    handler: Handler,
    min_score: i64,
    failure_policy: FailurePolicy,
    scanner: Arc<dyn Scanner>,
}

impl KubesecValidator {
    /// Create a validator backed by the HTTP scan service in `config`.
    pub fn new(config: &ValidatorConfig) -> Self {
        let client = ScanClient::new(&config.scan);
        debug!(
            url = client.url(),
            timeout_secs = config.scan.timeout.as_secs_f64(),
            "using kubesec scan service"
        );
        Self::with_scanner(config, Arc::new(client))
    }

    /// Create a validator backed by an arbitrary scanner.
    pub fn with_scanner(config: &ValidatorConfig, scanner: Arc<dyn Scanner>) -> Self {
        Self {
            handler: Handler::new_create_update(),
            min_score: config.min_score,
            failure_policy: config.failure_policy,
            scanner,
        }
    }

    pub fn min_score(&self) -> i64 {
        self.min_score
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Decide on a single workload object.
    pub fn validate_workload(&self, object: &WorkloadObject) -> Verdict {
        let kind = match object.workload_kind() {
            Some(kind) => kind,
            None => {
                let verdict = Verdict::AllowedWithWarning(UNSUPPORTED_KIND_WARNING.to_string());
                info!(
                    kind = object.kind_name(),
                    namespace = object.namespace(),
                    name = object.name(),
                    outcome = verdict.outcome(),
                    "skipping scan of unsupported kind"
                );
                return verdict;
            }
        };

        match self.score(kind, object) {
            Ok(verdict) => verdict,
            Err(err) => self.on_failure(object, err),
        }
    }

    fn score(&self, kind: WorkloadKind, object: &WorkloadObject) -> AdmissionResult<Verdict> {
        let definition = canonicalize(object)?;
        let result = self.scanner.scan(&definition)?;

        debug!(
            kind = %kind,
            namespace = object.namespace(),
            name = object.name(),
            "Scan Result:\n{}",
            render_result(&result)
        );

        let verdict = if result.score < self.min_score {
            Verdict::Denied(format_denial(
                object.name(),
                result.score,
                self.min_score,
                &result,
            ))
        } else {
            Verdict::Allowed
        };

        info!(
            kind = %kind,
            namespace = object.namespace(),
            name = object.name(),
            score = result.score,
            min_score = self.min_score,
            outcome = verdict.outcome(),
            "workload scored"
        );

        Ok(verdict)
    }

    fn on_failure(&self, object: &WorkloadObject, err: AdmissionError) -> Verdict {
        let verdict = match self.failure_policy {
            FailurePolicy::Ignore => Verdict::Allowed,
            FailurePolicy::Fail => {
                Verdict::Denied(format!("{} could not be scored: {}", object.name(), err))
            }
        };

        error!(
            kind = object.kind_name(),
            namespace = object.namespace(),
            name = object.name(),
            failure_policy = %self.failure_policy,
            outcome = verdict.outcome(),
            error = %err,
            "kubesec validation failed"
        );

        verdict
    }
}

impl Interface for KubesecValidator {
    fn handles(&self, operation: Operation) -> bool {
        self.handler.handles(operation)
    }
}

impl ValidationInterface for KubesecValidator {
    fn validate(&self, attributes: &dyn Attributes) -> Verdict {
        if !self.handler.admits(attributes) {
            debug!(
                kind = attributes.get_kind().kind.as_str(),
                namespace = attributes.get_namespace(),
                name = attributes.get_name(),
                operation = %attributes.get_operation(),
                subresource = attributes.get_subresource(),
                outcome = "allowed",
                "request not subject to scanning"
            );
            return Verdict::Allowed;
        }

        match attributes.get_workload() {
            Some(object) => self.validate_workload(object),
            None => {
                let err = AdmissionError::bad_request("request carries no workload object");
                error!(
                    kind = attributes.get_kind().kind.as_str(),
                    namespace = attributes.get_namespace(),
                    name = attributes.get_name(),
                    outcome = "allowed",
                    error = %err,
                    "admitting request without scanning"
                );
                Verdict::Allowed
            }
        }
    }
}
