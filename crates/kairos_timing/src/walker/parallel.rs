use super::GraphWalker;
use crate::error::TimingError;
use crate::ids::NodeId;
use crate::visitor::GraphVisitor;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;

/// Visits all nodes of a level concurrently and joins before the next level.
///
/// Uses the global rayon pool unless built with [`ParallelWalker::with_threads`].
#[derive(Default)]
pub struct ParallelWalker {
    pool: Option<ThreadPool>,
}

impl ParallelWalker {
    /// A walker on the global rayon pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// A walker owning a dedicated pool of `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self, TimingError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("kairos-walker-{i}"))
            .build()
            .map_err(|e| TimingError::ThreadPool(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }

    /// Number of worker threads visits are spread over.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl fmt::Debug for ParallelWalker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelWalker")
            .field("threads", &self.num_threads())
            .field("dedicated_pool", &self.pool.is_some())
            .finish()
    }
}

impl GraphWalker for ParallelWalker {
    fn map_nodes<V, T, F>(&self, nodes: &[NodeId], visitor: &V, f: F) -> Vec<(NodeId, T)>
    where
        V: GraphVisitor,
        T: Send,
        F: Fn(&V, NodeId) -> T + Sync,
    {
        let run = || -> Vec<(NodeId, T)> {
            nodes
                .par_iter()
                .map(|&node| (node, f(visitor, node)))
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
