//! Structuring detection.
//!
//! Directed three-hop relays over the thresholded adjacency matrix. With
//! `A` the adjacency matrix, a nonzero entry on the diagonal of `A^3` means
//! the account sits on a directed 3-cycle; the cycle itself is recovered by
//! walking `root -> j -> k -> root` over edges. Each triangle is reported
//! once, deduplicated by its sorted account triple.

use crate::graph::FlowGraph;
use ringfence_core::prelude::{Result, TriangleCase};
use std::collections::HashSet;

/// Directed-triangle detector over matrix powers.
pub struct TriangleDetector;

impl TriangleDetector {
    /// Detect directed 3-cycles in one window snapshot.
    pub fn detect(graph: &FlowGraph) -> Result<Vec<TriangleCase>> {
        let n = graph.len();
        if n < 3 {
            return Ok(Vec::new());
        }
        let a = graph.adjacency_matrix();

        // A^2, then the diagonal of A^3.
        let mut a2 = vec![0u32; n * n];
        for i in 0..n {
            for k in 0..n {
                if a[i * n + k] == 0 {
                    continue;
                }
                for j in 0..n {
                    a2[i * n + j] += u32::from(a[k * n + j]);
                }
            }
        }
        let mut diag3 = vec![0u32; n];
        for i in 0..n {
            for j in 0..n {
                diag3[i] += a2[i * n + j] * u32::from(a[j * n + i]);
            }
        }

        let mut seen: HashSet<[usize; 3]> = HashSet::new();
        let mut cases = Vec::new();
        for root in 0..n {
            if diag3[root] == 0 {
                continue;
            }
            for j in 0..n {
                if a[root * n + j] == 0 {
                    continue;
                }
                for k in 0..n {
                    if a[j * n + k] == 0 || a[k * n + root] == 0 {
                        continue;
                    }
                    let mut key = [root, j, k];
                    key.sort_unstable();
                    if seen.insert(key) {
                        cases.push(TriangleCase {
                            accounts: [
                                graph.account(root).to_owned(),
                                graph.account(j).to_owned(),
                                graph.account(k).to_owned(),
                            ],
                        });
                    }
                }
            }
        }
        Ok(cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringfence_core::prelude::{GraphConfig, Transaction};

    fn create_tx(sender: &str, receiver: &str, amount: f64) -> Transaction {
        Transaction {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            epoch: 1_700_000_000,
        }
    }

    #[test]
    fn test_directed_triangle_detected_once() {
        // One directed 3-cycle of large transfers; three possible roots but
        // a single reported case.
        let window = vec![
            create_tx("acc-a", "acc-b", 5_000.0),
            create_tx("acc-b", "acc-c", 5_000.0),
            create_tx("acc-c", "acc-a", 5_000.0),
        ];
        let graph = FlowGraph::build(&window, &GraphConfig::default());
        let cases = TriangleDetector::detect(&graph).unwrap();
        assert_eq!(cases.len(), 1);
        let mut accounts = cases[0].accounts.clone();
        accounts.sort();
        assert_eq!(accounts, ["acc-a", "acc-b", "acc-c"]);
    }

    #[test]
    fn test_undirected_triangle_not_reported() {
        // Edges form a triangle shape but never a directed cycle.
        let window = vec![
            create_tx("acc-a", "acc-b", 5_000.0),
            create_tx("acc-a", "acc-c", 5_000.0),
            create_tx("acc-b", "acc-c", 5_000.0),
        ];
        let graph = FlowGraph::build(&window, &GraphConfig::default());
        assert!(TriangleDetector::detect(&graph).unwrap().is_empty());
    }

    #[test]
    fn test_small_amounts_make_no_triangle() {
        let window = vec![
            create_tx("acc-a", "acc-b", 300.0),
            create_tx("acc-b", "acc-c", 300.0),
            create_tx("acc-c", "acc-a", 300.0),
        ];
        let graph = FlowGraph::build(&window, &GraphConfig::default());
        assert!(TriangleDetector::detect(&graph).unwrap().is_empty());
    }

    #[test]
    fn test_two_triangles_sharing_an_edge() {
        let window = vec![
            create_tx("acc-a", "acc-b", 5_000.0),
            create_tx("acc-b", "acc-c", 5_000.0),
            create_tx("acc-c", "acc-a", 5_000.0),
            create_tx("acc-b", "acc-d", 5_000.0),
            create_tx("acc-d", "acc-a", 5_000.0),
        ];
        let graph = FlowGraph::build(&window, &GraphConfig::default());
        let cases = TriangleDetector::detect(&graph).unwrap();
        assert_eq!(cases.len(), 2);
    }
}
