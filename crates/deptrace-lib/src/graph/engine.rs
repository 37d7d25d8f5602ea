//! Depth-bounded traversal with path-based cycle detection
//!
//! The walk is iterative: an explicit stack of frames is the active
//! root-to-here path, so recursion depth never touches the host stack.
//!
//! # Rules
//!
//! 1. A node deeper than the bound is pruned silently.
//! 2. A node already on the active path closes a cycle; the cycle is
//!    recorded and the node is not expanded again on this branch.
//! 3. Otherwise the node's dependencies are fetched, its edges recorded (on
//!    first expansion only), and each dependency is visited in source order.
//! 4. A fetch failure becomes a warning; the node keeps an empty edge list
//!    and the walk carries on with its siblings.
//!
//! Leaving a node pops it off the path, so the same package may be
//! expanded again from an unrelated branch. With memoisation on, that
//! re-expansion reuses the first fetch result instead of asking the source
//! again; cycle detection is unaffected because the walk still re-descends.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, trace, warn};

use super::accumulator::{Cycle, CycleReport, DependencyGraph, GraphAccumulator, SourceWarning};
use super::key::{DependencyDescriptor, MaxDepth, PackageKey};
use super::source::{DependencySource, SourceError};

/// Caller errors rejected before any fetch is made
#[derive(Debug, Error)]
pub enum TraversalError {
    #[error("Invalid root package: {reason}")]
    InvalidRoot { reason: String },

    #[error("Invalid depth bound {depth}: must be zero or greater")]
    InvalidDepth { depth: i64 },
}

/// How a traversal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
    Complete,
    Cancelled,
    TimedOut,
}

/// Engine tuning; the defaults give the plain sequential walk with
/// memoised fetches
#[derive(Debug, Clone)]
pub struct TraversalOptions {
    /// Reuse a package's first fetch result for later encounters
    pub memoize: bool,
    /// Concurrent sibling prefetches; 1 disables prefetching
    pub prefetch_jobs: usize,
    /// Stop and return partial results at this instant
    pub deadline: Option<Instant>,
    /// Stop and return partial results once this flips to `true`
    pub cancel: Option<watch::Receiver<bool>>,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            memoize: true,
            prefetch_jobs: 1,
            deadline: None,
            cancel: None,
        }
    }
}

/// Result of one traversal
#[derive(Debug, Clone, Serialize)]
pub struct Traversal {
    pub root: PackageKey,
    pub max_depth: MaxDepth,
    pub graph: DependencyGraph,
    pub cycles: CycleReport,
    pub warnings: Vec<SourceWarning>,
    pub completion: Completion,
    /// Source calls issued, prefetches included
    pub fetches: usize,
}

impl Traversal {
    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Complete
    }
}

type Dependencies = Arc<Vec<DependencyDescriptor>>;
type FetchResult = Result<Vec<DependencyDescriptor>, SourceError>;

/// Traversal engine over a dependency source
pub struct TraversalEngine<S> {
    source: Arc<S>,
    options: TraversalOptions,
}

impl<S> TraversalEngine<S>
where
    S: DependencySource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            options: TraversalOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TraversalOptions) -> Self {
        self.options = options;
        self
    }

    /// Walk the dependency relation from `root` down to `max_depth`
    pub async fn build_graph(
        &self,
        root: PackageKey,
        max_depth: MaxDepth,
    ) -> Result<Traversal, TraversalError> {
        root.validate()?;

        info!(
            root = %root,
            max_depth = %max_depth,
            source = %self.source.describe(),
            "Building dependency graph"
        );

        let mut walk = Walk::new(self.source.clone(), &self.options, max_depth);
        let completion = match walk.run(&root).await {
            Ok(()) => Completion::Complete,
            Err(interrupted) => {
                warn!(
                    "Traversal {:?} with {} nodes expanded; returning partial graph",
                    interrupted,
                    walk.acc.graph.node_count()
                );
                interrupted
            }
        };

        let traversal = walk.finish(root, completion);
        info!(
            nodes = traversal.graph.node_count(),
            edges = traversal.graph.edge_count(),
            cycles = traversal.cycles.len(),
            warnings = traversal.warnings.len(),
            fetches = traversal.fetches,
            "Dependency graph built"
        );
        Ok(traversal)
    }
}

/// Convenience wrapper: default options, depth given as a signed integer
pub async fn build_graph<S>(
    root: PackageKey,
    max_depth: i64,
    source: Arc<S>,
) -> Result<Traversal, TraversalError>
where
    S: DependencySource + 'static,
{
    let max_depth = MaxDepth::try_from(max_depth)?;
    TraversalEngine::new(source).build_graph(root, max_depth).await
}

/// One node on the active path
struct Frame {
    key: PackageKey,
    depth: u32,
    dependencies: Dependencies,
    next: usize,
}

/// Scratch state of a single traversal
struct Walk<S> {
    source: Arc<S>,
    max_depth: MaxDepth,
    memoize: bool,
    prefetch: Option<Arc<Semaphore>>,
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,

    path: Vec<Frame>,
    /// Position of each key on `path`
    on_path: HashMap<PackageKey, usize>,
    memo: HashMap<PackageKey, Dependencies>,
    pending: HashMap<PackageKey, JoinHandle<FetchResult>>,
    acc: GraphAccumulator,
    fetches: usize,
}

impl<S> Walk<S>
where
    S: DependencySource + 'static,
{
    fn new(source: Arc<S>, options: &TraversalOptions, max_depth: MaxDepth) -> Self {
        let prefetch = (options.memoize && options.prefetch_jobs > 1)
            .then(|| Arc::new(Semaphore::new(options.prefetch_jobs)));
        Self {
            source,
            max_depth,
            memoize: options.memoize,
            prefetch,
            deadline: options.deadline,
            cancel: options.cancel.clone(),
            path: Vec::new(),
            on_path: HashMap::new(),
            memo: HashMap::new(),
            pending: HashMap::new(),
            acc: GraphAccumulator::default(),
            fetches: 0,
        }
    }

    async fn run(&mut self, root: &PackageKey) -> Result<(), Completion> {
        self.visit(root.clone(), 0).await?;

        while let Some(frame) = self.path.last_mut() {
            if frame.next < frame.dependencies.len() {
                let child = frame.dependencies[frame.next].key();
                let depth = frame.depth + 1;
                frame.next += 1;
                self.visit(child, depth).await?;
            } else if let Some(done) = self.path.pop() {
                self.on_path.remove(&done.key);
                trace!(package = %done.key, "Leaving node");
            }
        }
        Ok(())
    }

    async fn visit(&mut self, key: PackageKey, depth: u32) -> Result<(), Completion> {
        if !self.max_depth.allows(depth) {
            trace!(package = %key, depth, "Depth bound reached, not expanding");
            return Ok(());
        }

        if let Some(&start) = self.on_path.get(&key) {
            let mut path: Vec<PackageKey> =
                self.path[start..].iter().map(|frame| frame.key.clone()).collect();
            path.push(key.clone());
            let cycle = Cycle { closing: key, path };
            if self.acc.cycles.record(cycle.clone()) {
                info!("Cycle detected: {}", cycle);
            }
            return Ok(());
        }

        let dependencies = self.dependencies_of(&key, depth).await?;
        if self.acc.graph.insert_node(&key, depth, &dependencies) {
            debug!(package = %key, depth, count = dependencies.len(), "Expanded node");
        } else {
            trace!(package = %key, depth, "Re-expanding node from another branch");
        }

        self.on_path.insert(key.clone(), self.path.len());
        self.path.push(Frame {
            key,
            depth,
            dependencies: dependencies.clone(),
            next: 0,
        });
        self.prefetch_children(&dependencies, depth + 1);
        Ok(())
    }

    /// Dependency list for `key`, from memo, a prefetch, or the source
    async fn dependencies_of(
        &mut self,
        key: &PackageKey,
        depth: u32,
    ) -> Result<Dependencies, Completion> {
        if let Some(cached) = self.memo.get(key) {
            trace!(package = %key, "Using memoised dependencies");
            return Ok(cached.clone());
        }

        let result = match self.pending.remove(key) {
            Some(handle) => {
                let abort = handle.abort_handle();
                let joined = match self.interruptible(handle).await {
                    Ok(joined) => joined,
                    Err(interrupted) => {
                        abort.abort();
                        return Err(interrupted);
                    }
                };
                joined.unwrap_or_else(|e| {
                    Err(SourceError::TaskFailed {
                        package: key.to_string(),
                        reason: e.to_string(),
                    })
                })
            }
            None => {
                self.fetches += 1;
                let source = self.source.clone();
                let span = crate::fetch_span!(key, depth = depth);
                let fetch = async move {
                    source
                        .fetch_dependencies(key.name(), key.version())
                        .await
                }
                .instrument(span);
                self.interruptible(fetch).await?
            }
        };

        let dependencies = match result {
            Ok(list) => Arc::new(list),
            Err(e) => {
                warn!(package = %key, "Could not fetch dependencies: {}", e);
                self.acc.warn(key, e.reason());
                Arc::new(Vec::new())
            }
        };

        if self.memoize {
            self.memo.insert(key.clone(), dependencies.clone());
        }
        Ok(dependencies)
    }

    /// Start fetches for children that will be expanded next
    fn prefetch_children(&mut self, dependencies: &[DependencyDescriptor], depth: u32) {
        let Some(permits) = self.prefetch.clone() else {
            return;
        };
        if !self.max_depth.allows(depth) {
            return;
        }

        for descriptor in dependencies {
            let key = descriptor.key();
            if self.on_path.contains_key(&key)
                || self.memo.contains_key(&key)
                || self.pending.contains_key(&key)
            {
                continue;
            }

            self.fetches += 1;
            let source = self.source.clone();
            let permits = permits.clone();
            let span = crate::fetch_span!(key, depth = depth);
            let task_key = key.clone();
            let handle = tokio::spawn(
                async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|e| SourceError::TaskFailed {
                            package: task_key.to_string(),
                            reason: e.to_string(),
                        })?;
                    source
                        .fetch_dependencies(task_key.name(), task_key.version())
                        .await
                }
                .instrument(span),
            );
            trace!(package = %key, "Prefetch started");
            self.pending.insert(key, handle);
        }
    }

    /// Await `work` unless the deadline passes or cancellation fires first
    async fn interruptible<F: Future>(&self, work: F) -> Result<F::Output, Completion> {
        let deadline = self.deadline;
        let mut cancel = self.cancel.clone();

        tokio::select! {
            biased;
            _ = wait_for_cancel(&mut cancel) => Err(Completion::Cancelled),
            _ = wait_for_deadline(deadline) => Err(Completion::TimedOut),
            output = work => Ok(output),
        }
    }

    fn finish(mut self, root: PackageKey, completion: Completion) -> Traversal {
        self.abort_pending();
        let acc = std::mem::take(&mut self.acc);
        Traversal {
            root,
            max_depth: self.max_depth,
            graph: acc.graph,
            cycles: acc.cycles,
            warnings: acc.warnings,
            completion,
            fetches: self.fetches,
        }
    }

    fn abort_pending(&mut self) {
        for (key, handle) in self.pending.drain() {
            trace!(package = %key, "Abandoning prefetch");
            handle.abort();
        }
    }
}

impl<S> Drop for Walk<S> {
    fn drop(&mut self) {
        for handle in self.pending.values() {
            handle.abort();
        }
    }
}

async fn wait_for_cancel(cancel: &mut Option<watch::Receiver<bool>>) {
    let Some(rx) = cancel else {
        return std::future::pending().await;
    };
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone without cancelling
            return std::future::pending().await;
        }
    }
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    include!("engine.test.rs");
}
