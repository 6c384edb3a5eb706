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

//! The outcome of validating one admission request.

use std::fmt;

/// Verdict is the admission decision for a single request.
///
/// It maps directly onto the admission response: `allowed`, an optional
/// status `message`, and an optional list of `warnings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The request is admitted.
    Allowed,
    /// The request is rejected with an audit message.
    Denied(String),
    /// The request is admitted, and the caller is told why it was not checked.
    AllowedWithWarning(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Verdict::Denied(_))
    }

    /// Returns the rejection message, if the request was denied.
    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Denied(message) => Some(message),
            _ => None,
        }
    }

    /// Returns the warnings to attach to the admission response.
    pub fn warnings(&self) -> Vec<&str> {
        match self {
            Verdict::AllowedWithWarning(warning) => vec![warning.as_str()],
            _ => vec![],
        }
    }

    /// Short outcome label used in logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Verdict::Allowed => "allowed",
            Verdict::Denied(_) => "denied",
            Verdict::AllowedWithWarning(_) => "allowed with warning",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allowed => write!(f, "allowed"),
            Verdict::Denied(message) => write!(f, "denied: {}", message),
            Verdict::AllowedWithWarning(warning) => write!(f, "allowed with warning: {}", warning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed() {
        let verdict = Verdict::Allowed;
        assert!(verdict.is_allowed());
        assert_eq!(verdict.message(), None);
        assert!(verdict.warnings().is_empty());
        assert_eq!(verdict.outcome(), "allowed");
    }

    #[test]
    fn test_denied() {
        let verdict = Verdict::Denied("web score is -30".to_string());
        assert!(!verdict.is_allowed());
        assert_eq!(verdict.message(), Some("web score is -30"));
        assert!(verdict.warnings().is_empty());
        assert_eq!(verdict.to_string(), "denied: web score is -30");
    }

    #[test]
    fn test_allowed_with_warning() {
        let verdict = Verdict::AllowedWithWarning("skipped".to_string());
        assert!(verdict.is_allowed());
        assert_eq!(verdict.message(), None);
        assert_eq!(verdict.warnings(), vec!["skipped"]);
        assert_eq!(verdict.outcome(), "allowed with warning");
    }
}
