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

use anyhow::{Context, Result};
use clap::Parser;
use kubesec_admission::api::manifest;
use kubesec_admission::config::{FailurePolicy, ScanConfig, ValidatorConfig, DEFAULT_SCAN_URL};
use kubesec_admission::plugins::kubesec::PLUGIN_NAME;
use kubesec_admission::{
    AttributesRecord, KubesecValidator, Operation, ValidationInterface, WorkloadObject,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "kubesec-admission",
    version,
    about = "Score workload manifests with kubesec and apply the admission decision"
)]
struct Cli {
    /// Manifest files to validate; `-` reads standard input
    #[arg(required = true)]
    manifests: Vec<PathBuf>,

    /// Minimum kubesec score a workload needs to be admitted
    #[arg(long, env = "KUBESEC_MIN_SCORE", default_value_t = 0, allow_hyphen_values = true)]
    min_score: i64,

    /// Scan service endpoint
    #[arg(long, env = "KUBESEC_SCAN_URL", default_value = DEFAULT_SCAN_URL)]
    scan_url: String,

    /// Scan call timeout in seconds
    #[arg(long, env = "KUBESEC_SCAN_TIMEOUT", default_value_t = 15)]
    scan_timeout: u64,

    /// What to do when an object cannot be scored (Ignore or Fail)
    #[arg(
        long,
        env = "KUBESEC_FAILURE_POLICY",
        default_value = "Ignore",
        value_parser = parse_failure_policy
    )]
    failure_policy: FailurePolicy,

    /// Admission operation the objects are validated as
    #[arg(long, default_value = "CREATE", value_parser = parse_operation)]
    operation: Operation,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Enable JSON logging
    #[arg(long)]
    enable_json_logging: bool,
}

impl Cli {
    fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            min_score: self.min_score,
            failure_policy: self.failure_policy,
            scan: ScanConfig {
                url: self.scan_url.clone(),
                timeout: Duration::from_secs(self.scan_timeout),
            },
        }
    }
}

fn parse_failure_policy(s: &str) -> Result<FailurePolicy, String> {
    FailurePolicy::parse(s)
        .ok_or_else(|| format!("unknown failure policy {:?}, expected Ignore or Fail", s))
}

fn parse_operation(s: &str) -> Result<Operation, String> {
    Operation::parse(s).ok_or_else(|| format!("unknown operation {:?}", s))
}

fn init_logging(debug: bool, json: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn read_manifest(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read manifest from stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_objects(paths: &[PathBuf]) -> Result<Vec<WorkloadObject>> {
    let mut objects = Vec::new();
    for path in paths {
        let input = read_manifest(path)?;
        let decoded = manifest::decode_all(&input)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        objects.extend(decoded);
    }
    Ok(objects)
}

fn run(cli: Cli) -> Result<bool> {
    let validator = KubesecValidator::new(&cli.validator_config());
    tracing::debug!(
        plugin = PLUGIN_NAME,
        min_score = validator.min_score(),
        failure_policy = %validator.failure_policy(),
        "validator configured"
    );

    let objects = load_objects(&cli.manifests)?;

    let mut denied = false;
    for object in objects {
        let label = format!("{}/{}", object.kind_name(), object.name());
        let attributes = AttributesRecord::for_workload(cli.operation, object);
        let verdict = validator.validate(&attributes);
        denied |= !verdict.is_allowed();
        println!("{}: {}", label, verdict);
    }

    Ok(denied)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.enable_json_logging);

    match run(cli) {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}
