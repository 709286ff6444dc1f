//! Window transactions to dense matrices.
//!
//! One [`FlowGraph`] is built per analysis cycle from the immutable window
//! snapshot and then shared read-only by every detector:
//!
//! - a symmetric distance matrix, `d = 1 / (amount + epsilon)`, collapsed to
//!   the minimum distance per unordered pair (the largest single transfer
//!   dominates)
//! - a directed adjacency matrix with graded thresholds (one huge transfer,
//!   or repeated mid or small transfers, sets an edge)
//! - per-account volumes and unordered pair frequencies

use ringfence_core::prelude::{GraphConfig, Transaction};
use std::collections::HashMap;

/// Dense per-cycle view of the transaction window.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    accounts: Vec<String>,
    index: HashMap<String, usize>,
    /// Row-major `n * n` symmetric distances, `f64::INFINITY` when no
    /// transaction connects the pair, `0.0` on the diagonal.
    distances: Vec<f64>,
    /// Row-major `n * n` directed adjacency, 0 or 1.
    adjacency: Vec<u8>,
    /// Window volume per account; every amount is credited to both the
    /// sender and the receiver.
    volumes: Vec<f64>,
    /// Transaction count per unordered pair, keyed `(min, max)`.
    pair_counts: HashMap<(usize, usize), u32>,
}

impl FlowGraph {
    /// Build the graph for one window snapshot.
    ///
    /// Accounts are indexed in first-seen order over the snapshot, so equal
    /// snapshots always produce identical matrices.
    #[must_use]
    pub fn build(window: &[Transaction], config: &GraphConfig) -> Self {
        let mut accounts: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        fn intern(
            name: &str,
            accounts: &mut Vec<String>,
            index: &mut HashMap<String, usize>,
        ) -> usize {
            if let Some(&i) = index.get(name) {
                return i;
            }
            let i = accounts.len();
            accounts.push(name.to_owned());
            index.insert(name.to_owned(), i);
            i
        }

        let mut pairs: Vec<(usize, usize, f64)> = Vec::with_capacity(window.len());
        let mut pair_counts: HashMap<(usize, usize), u32> = HashMap::new();
        for tx in window {
            let s = intern(&tx.sender, &mut accounts, &mut index);
            let r = intern(&tx.receiver, &mut accounts, &mut index);
            pairs.push((s, r, tx.amount));
            if s != r {
                *pair_counts.entry((s.min(r), s.max(r))).or_insert(0) += 1;
            }
        }

        let n = accounts.len();
        let mut distances = vec![f64::INFINITY; n * n];
        let mut adjacency = vec![0u8; n * n];
        let mut volumes = vec![0.0f64; n];
        for i in 0..n {
            distances[i * n + i] = 0.0;
        }

        for &(s, r, amount) in &pairs {
            volumes[s] += amount;
            volumes[r] += amount;
            if s == r {
                continue;
            }

            // Symmetric, min-collapsed: the largest transfer on the pair
            // wins regardless of direction.
            let d = 1.0 / (amount + config.epsilon);
            let slot = &mut distances[s * n + r];
            if d < *slot {
                *slot = d;
                distances[r * n + s] = d;
            }

            let freq = pair_counts[&(s.min(r), s.max(r))];
            let edge = amount > config.high_amount
                || (amount > config.mid_amount && freq >= config.mid_frequency)
                || (amount > config.low_amount && freq >= config.high_frequency);
            if edge {
                adjacency[s * n + r] = 1;
            }
        }

        Self {
            accounts,
            index,
            distances,
            adjacency,
            volumes,
            pair_counts,
        }
    }

    /// Number of accounts (matrix dimension).
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True when the window named no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Account id at index `i`.
    #[must_use]
    pub fn account(&self, i: usize) -> &str {
        &self.accounts[i]
    }

    /// Index of an account id, when present in the window.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Pair distance.
    #[must_use]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[i * self.len() + j]
    }

    /// Row-major distance matrix.
    #[must_use]
    pub fn distance_matrix(&self) -> &[f64] {
        &self.distances
    }

    /// True when the directed edge `i -> j` is set.
    #[must_use]
    pub fn is_edge(&self, i: usize, j: usize) -> bool {
        self.adjacency[i * self.len() + j] != 0
    }

    /// Row-major adjacency matrix.
    #[must_use]
    pub fn adjacency_matrix(&self) -> &[u8] {
        &self.adjacency
    }

    /// Window volume of account `i`.
    #[must_use]
    pub fn volume(&self, i: usize) -> f64 {
        self.volumes[i]
    }

    /// Transaction count on the unordered pair `{i, j}`.
    #[must_use]
    pub fn pair_frequency(&self, i: usize, j: usize) -> u32 {
        self.pair_counts
            .get(&(i.min(j), i.max(j)))
            .copied()
            .unwrap_or(0)
    }
}
