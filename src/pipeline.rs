//! End-to-end validation run: baseline, fan-out, output.

use crate::config::ValidatorConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{PipelineError, ValidationError};
use crate::limits::{self, FD_HEADROOM};
use crate::oracle;
use crate::tester::ProxyTester;
use crate::utils;

use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Baseline IP the proxies were checked against.
    pub caller_ip: String,
    /// Number of candidates tested.
    pub tested: usize,
    /// Number of proxies written to `output`.
    pub written: usize,
    pub output: PathBuf,
}

/// Drives one validation run from an input file to the output file.
pub struct Pipeline {
    config: Arc<ValidatorConfig>,
}

impl Pipeline {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate every candidate in `input` and write the survivors.
    ///
    /// Per-proxy failures only reach `report`. Any error returned here is
    /// fatal, and the output file is left untouched in that case.
    pub async fn run<F>(&self, input: &Path, report: F) -> Result<Summary, PipelineError>
    where
        F: Fn(&str, &Result<(), ValidationError>) + Send + Sync + 'static,
    {
        self.config.validate()?;

        let caller_ip = oracle::resolve_caller_ip(&self.config)
            .await
            .map_err(PipelineError::CallerIp)?;

        let candidates = utils::read_candidates(input)
            .await
            .map_err(|source| PipelineError::Input {
                path: input.to_path_buf(),
                source,
            })?;
        let tested = candidates.len();
        info!("Loaded {} candidates from {}", tested, input.display());

        limits::raise_fd_limit(self.config.concurrency as u64 + FD_HEADROOM)?;

        let tester = ProxyTester::new(Arc::clone(&self.config), caller_ip.as_str());
        let dispatcher = Dispatcher::new(Arc::new(tester), self.config.concurrency);
        let proxies = dispatcher.run(candidates, report).await.drain();

        let output = self.config.output_path.clone();
        utils::write_proxy_list(&output, &proxies).map_err(|source| PipelineError::Output {
            path: output.clone(),
            source,
        })?;

        Ok(Summary {
            caller_ip,
            tested,
            written: proxies.len(),
            output,
        })
    }
}
