//! Build orchestration: at-most-one concurrent build plus the periodic
//! incremental scheduler. Background threads are owned, not detached; the
//! coordinator keeps their join handles and `shutdown` reaps both.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::metrics::EngineMetrics;

use super::{BuildResult, IndexBuilder};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Build,
    Update,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Build => "build",
            BuildMode::Update => "update",
        }
    }
}

/// Outcome of the last completed (or failed) build.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LastBuild {
    pub mode: BuildMode,
    pub dataset: String,
    pub threads: usize,
    pub result: Option<BuildResult>,
    pub error: Option<String>,
}

/// Result of a start request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

struct Defaults {
    dataset: String,
    threads: usize,
}

pub struct BuildCoordinator {
    builder: IndexBuilder,
    metrics: EngineMetrics,

    running: AtomicBool,
    has_result: AtomicBool,
    last: Mutex<Option<LastBuild>>,
    defaults: Mutex<Defaults>,

    scheduler_enabled: AtomicBool,
    scheduler_interval_s: AtomicU64,
    stop_scheduler: AtomicBool,

    build_handle: Mutex<Option<JoinHandle<()>>>,
    scheduler_handle: Mutex<Option<JoinHandle<()>>>,
}

impl BuildCoordinator {
    pub fn new(
        builder: IndexBuilder,
        metrics: EngineMetrics,
        dataset: String,
        threads: usize,
    ) -> Self {
        Self {
            builder,
            metrics,
            running: AtomicBool::new(false),
            has_result: AtomicBool::new(false),
            last: Mutex::new(None),
            defaults: Mutex::new(Defaults {
                dataset,
                threads: threads.max(1),
            }),
            scheduler_enabled: AtomicBool::new(false),
            scheduler_interval_s: AtomicU64::new(30),
            stop_scheduler: AtomicBool::new(false),
            build_handle: Mutex::new(None),
            scheduler_handle: Mutex::new(None),
        }
    }

    pub fn is_building(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn defaults(&self) -> (String, usize) {
        let d = self.defaults.lock();
        (d.dataset.clone(), d.threads)
    }

    pub fn set_defaults(&self, dataset: String, threads: usize) {
        let mut d = self.defaults.lock();
        d.dataset = dataset;
        d.threads = threads.max(1);
    }

    pub fn scheduler_enabled(&self) -> bool {
        self.scheduler_enabled.load(Ordering::Acquire)
    }

    pub fn set_scheduler_enabled(&self, enabled: bool) {
        self.scheduler_enabled.store(enabled, Ordering::Release);
    }

    pub fn scheduler_interval_s(&self) -> u64 {
        self.scheduler_interval_s.load(Ordering::Acquire)
    }

    pub fn set_scheduler_interval_s(&self, interval_s: u64) {
        self.scheduler_interval_s
            .store(interval_s.max(1), Ordering::Release);
    }

    /// The last completed build, if any. Cleared while a new build is in
    /// flight.
    pub fn last(&self) -> Option<LastBuild> {
        if !self.has_result.load(Ordering::Acquire) {
            return None;
        }
        self.last.lock().clone()
    }

    /// Try to start a build. Exactly one caller wins the `running` latch;
    /// losers observe `AlreadyRunning` with no side effects.
    pub fn start(
        coordinator: &Arc<Self>,
        dataset: String,
        threads: usize,
        incremental: bool,
    ) -> StartOutcome {
        if coordinator
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return StartOutcome::AlreadyRunning;
        }

        coordinator.has_result.store(false, Ordering::Release);

        // Reap the previous build thread before replacing its handle.
        if let Some(done) = coordinator.build_handle.lock().take() {
            let _ = done.join();
        }

        let coord = Arc::clone(coordinator);
        let handle = std::thread::spawn(move || coord.run_build(dataset, threads, incremental));
        *coordinator.build_handle.lock() = Some(handle);

        StartOutcome::Started
    }

    fn run_build(&self, dataset: String, threads: usize, incremental: bool) {
        let mode = if incremental {
            BuildMode::Update
        } else {
            BuildMode::Build
        };
        info!(mode = mode.as_str(), dataset = %dataset, threads, "build job started");

        let outcome = if incremental {
            self.builder.update_from_directory(&dataset, threads)
        } else {
            self.builder.build_from_directory(&dataset, threads)
        };

        let last = match outcome {
            Ok(result) => {
                self.metrics
                    .documents_indexed
                    .inc_by(result.indexed_files as f64);
                LastBuild {
                    mode,
                    dataset,
                    threads,
                    result: Some(result),
                    error: None,
                }
            }
            Err(e) => {
                error!(mode = mode.as_str(), "build job failed: {e}");
                LastBuild {
                    mode,
                    dataset,
                    threads,
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        };

        *self.last.lock() = Some(last);
        self.has_result.store(true, Ordering::Release);
        self.running.store(false, Ordering::Release);
    }

    /// Spawn the periodic incremental scheduler thread.
    pub fn spawn_scheduler(coordinator: &Arc<Self>) {
        let coord = Arc::clone(coordinator);
        let handle = std::thread::spawn(move || coord.scheduler_loop());
        *coordinator.scheduler_handle.lock() = Some(handle);
    }

    fn scheduler_loop(self: Arc<Self>) {
        loop {
            let interval = self.scheduler_interval_s().max(1);
            std::thread::sleep(Duration::from_secs(interval));

            if self.stop_scheduler.load(Ordering::Acquire) {
                break;
            }
            if !self.scheduler_enabled() {
                continue;
            }
            let (dataset, threads) = self.defaults();
            if dataset.is_empty() {
                continue;
            }
            if self.is_building() {
                continue;
            }

            info!(dataset = %dataset, "scheduler triggering incremental build");
            Self::start(&self, dataset, threads, true);
        }
    }

    /// Stop the scheduler and wait for it and any in-flight build. The
    /// scheduler sleep is not interrupted, so this can block for up to one
    /// interval.
    pub fn shutdown(&self) {
        self.stop_scheduler.store(true, Ordering::Release);
        if let Some(handle) = self.scheduler_handle.lock().take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.build_handle.lock().take() {
            let _ = handle.join();
        }
    }
}
