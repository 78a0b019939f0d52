// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Worker pool configuration.

use arbor_core::{ArborError, ArborResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Options for the parallel traverser and transformer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelOptions {
    /// Size of a dedicated worker pool. `None` runs on rayon's global pool.
    pub threads: Option<usize>,
}

impl ParallelOptions {
    /// Run on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Run on rayon's global pool.
    pub fn global_pool(mut self) -> Self {
        self.threads = None;
        self
    }
}

/// Run `job` on the pool described by `options`.
pub(crate) fn install<R, F>(options: &ParallelOptions, job: F) -> ArborResult<R>
where
    R: Send,
    F: FnOnce() -> ArborResult<R> + Send,
{
    let Some(threads) = options.threads else {
        return job();
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("arbor-worker-{}", index))
        .build()
        .map_err(|err| ArborError::worker_pool(err.to_string()))?;
    debug!(threads, "dedicated worker pool built");
    pool.install(job)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_global_pool() {
        assert_eq!(ParallelOptions::default().threads, None);
    }

    #[test]
    fn deserialize() {
        let options: ParallelOptions = serde_json::from_str(r#"{"threads":2}"#).unwrap();
        assert_eq!(options, ParallelOptions::default().with_threads(2));
        let options: ParallelOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.threads, None);
    }

    #[test]
    fn install_on_dedicated_pool() {
        let options = ParallelOptions::default().with_threads(2);
        let name = install(&options, || {
            Ok(std::thread::current().name().map(str::to_string))
        })
        .unwrap();
        assert_eq!(name.as_deref().map(|n| n.starts_with("arbor-worker-")), Some(true));
        assert_eq!(
            install(&options, || Ok(rayon::current_num_threads())).unwrap(),
            2
        );
    }

    #[test]
    fn install_propagates_job_errors() {
        let err = install(&ParallelOptions::default(), || -> ArborResult<()> {
            Err(ArborError::worker_pool("boom"))
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "worker pool error: boom");
    }
}
