//! Harness
//!
//! Wires one run together: load, spawn workers and the aggregator, wait,
//! join, summarize.
//!
//! ## Lifecycle
//! ```text
//! validate ─▶ bulk load ─▶ spawn aggregator ─▶ spawn writer + readers
//!                                                         │
//!        run_for elapsed / Shutdown::trigger / policy halt ◀┘
//!                                                         │
//!                 join workers ─▶ stop aggregator ─▶ RunSummary | Err
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info, warn};

use crate::codec::ValueCodec;
use crate::config::WorkloadConfig;
use crate::engine::Engine;
use crate::error::{HarnessError, Result};
use crate::loader::{bulk_load, LoadReport};
use crate::stats::{Aggregator, Counters, Totals};
use crate::store::Store;
use crate::workload::{
    worker_rng, FailFast, Failure, FailurePolicy, KeySampler, Reader, Role, Shutdown,
    WorkerExit, Writer,
};

/// Outcome of a run that was not halted by a failure
#[derive(Debug)]
pub struct RunSummary {
    pub load: LoadReport,

    /// Counts drained by the aggregator over the whole run
    pub totals: Totals,

    /// Per-worker exit records; writer first
    pub workers: Vec<WorkerExit>,

    /// Failures recorded by a policy that let the run continue
    pub failures: Vec<Failure>,
}

impl RunSummary {
    pub fn writes_completed(&self) -> u64 {
        self.workers
            .iter()
            .filter(|w| w.role == Role::Writer)
            .map(|w| w.completed)
            .sum()
    }

    pub fn reads_completed(&self) -> u64 {
        self.workers
            .iter()
            .filter(|w| w.role != Role::Writer)
            .map(|w| w.completed)
            .sum()
    }
}

/// One configured workload against one store handle
pub struct Harness<S: Store> {
    config: WorkloadConfig,
    store: Arc<S>,
    codec: ValueCodec,
    sampler: KeySampler,
    counters: Arc<Counters>,
    shutdown: Shutdown,
    policy: Arc<dyn FailurePolicy>,
}

impl Harness<Engine> {
    /// Open the bundled engine at `config.data_dir` and wrap it
    pub fn open(config: WorkloadConfig) -> Result<Self> {
        config.validate()?;
        let engine = Engine::open(&config.data_dir, config.store_config())?;
        Self::with_store(config, Arc::new(engine))
    }
}

impl<S: Store> Harness<S> {
    /// Drive an already-open store
    pub fn with_store(config: WorkloadConfig, store: Arc<S>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            codec: ValueCodec::new(config.value_size, config.fill),
            sampler: KeySampler::new(config.population)?,
            store,
            counters: Arc::new(Counters::new()),
            shutdown: Shutdown::new(),
            policy: Arc::new(FailFast::new()),
            config,
        })
    }

    /// Replace the default fail-fast policy
    pub fn with_policy(mut self, policy: Arc<dyn FailurePolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Signal that stops this harness's workers when triggered
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Populate the key space
    pub fn load(&self) -> Result<LoadReport> {
        bulk_load(self.store.as_ref(), self.config.population, &self.codec)
    }

    /// Load, then run the workload until stopped
    ///
    /// Returns the first failure if the policy halted the run. Without a
    /// configured `run_for` this only returns on a halt or an external
    /// `Shutdown::trigger`.
    pub fn run(self) -> Result<RunSummary> {
        let load = self.load()?;

        info!(
            population = self.config.population,
            value_size = self.config.value_size,
            readers = self.config.readers,
            read_mode = ?self.config.read_mode,
            write_mode = ?self.config.write_mode,
            write_delay_us = self.config.write_delay.as_micros() as u64,
            "starting workload"
        );

        let aggregator_stop = Shutdown::new();
        let aggregator = {
            let aggregator = Aggregator::new(Arc::clone(&self.counters), self.config.interval);
            let stop = aggregator_stop.clone();
            thread::Builder::new()
                .name("kvload-aggregator".into())
                .spawn(move || aggregator.run(&stop))?
        };

        let workers = match self.spawn_workers() {
            Ok(workers) => workers,
            Err(e) => {
                self.shutdown.trigger();
                aggregator_stop.trigger();
                return Err(e);
            }
        };

        match self.config.run_for {
            Some(duration) => {
                self.shutdown.pause(duration);
                self.shutdown.trigger();
            }
            None => self.shutdown.wait(),
        }

        let mut exits = Vec::with_capacity(workers.len());
        let mut panicked = None;
        for (name, handle) in workers {
            match handle.join() {
                Ok(exit) => exits.push(exit),
                Err(_) => panicked = Some(name),
            }
        }

        // Workers are joined, so the aggregator's final drain sees every count.
        aggregator_stop.trigger();
        let totals = aggregator
            .join()
            .map_err(|_| {
                error!(worker = "kvload-aggregator", "aggregator panicked");
                HarnessError::WorkerPanicked("kvload-aggregator".into())
            })?;

        if let Some(name) = panicked {
            return Err(HarnessError::WorkerPanicked(name));
        }

        let mut failures = self.policy.drain();
        if exits.iter().any(|exit| exit.halted) && !failures.is_empty() {
            return Err(failures.swap_remove(0).error);
        }
        if !failures.is_empty() {
            warn!(count = failures.len(), "run finished with recorded failures");
        }

        info!(
            writes = totals.writes,
            reads = totals.reads,
            intervals = totals.intervals,
            "workload stopped"
        );

        Ok(RunSummary {
            load,
            totals,
            workers: exits,
            failures,
        })
    }

    fn spawn_workers(&self) -> Result<Vec<(String, JoinHandle<WorkerExit>)>> {
        let mut handles = Vec::with_capacity(self.config.readers + 1);

        let writer = Writer::new(
            Arc::clone(&self.store),
            self.codec.clone(),
            self.sampler.clone(),
            worker_rng(self.config.seed, 0),
            Arc::clone(&self.counters),
        )
        .with_mode(self.config.write_mode)
        .with_delay(self.config.write_delay);
        handles.push(self.spawn("kvload-writer".to_string(), move |shutdown, policy| {
            writer.run(shutdown, policy)
        })?);

        for index in 0..self.config.readers {
            let reader = Reader::new(
                index,
                Arc::clone(&self.store),
                self.codec.clone(),
                self.sampler.clone(),
                worker_rng(self.config.seed, index as u64 + 1),
                Arc::clone(&self.counters),
            )
            .with_mode(self.config.read_mode);
            handles.push(self.spawn(format!("kvload-reader-{index}"), move |shutdown, policy| {
                reader.run(shutdown, policy)
            })?);
        }

        Ok(handles)
    }

    fn spawn<F>(&self, name: String, body: F) -> Result<(String, JoinHandle<WorkerExit>)>
    where
        F: FnOnce(&Shutdown, &dyn FailurePolicy) -> WorkerExit + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        let policy = Arc::clone(&self.policy);
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let _guard = StopOnPanic(&shutdown);
                body(&shutdown, policy.as_ref())
            })?;
        Ok((name, handle))
    }
}

/// Stops the run if the owning worker thread unwinds
struct StopOnPanic<'a>(&'a Shutdown);

impl Drop for StopOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(
                worker = thread::current().name().unwrap_or("unnamed"),
                "worker panicked, stopping run"
            );
            self.0.trigger();
        }
    }
}
