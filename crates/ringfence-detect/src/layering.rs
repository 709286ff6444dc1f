//! Layering detection.
//!
//! Low-persistence H1 classes over the distance matrix correspond to closed
//! chains of similarly sized transfers, the signature of funds relayed
//! through intermediaries. Raw topological features are then filtered on
//! economics before anything is reported:
//!
//! - combined member volume must scale with ring size
//! - enough transactions must run strictly between members
//! - internal amounts must be uniform (layering keeps hops similar so no
//!   single hop draws attention)

use crate::graph::FlowGraph;
use crate::homology;
use ringfence_core::prelude::{LayeringConfig, LayeringCase, Result, Transaction};
use std::collections::HashSet;
use tracing::debug;

/// Persistent-cycle based laundering-ring detector.
pub struct CycleDetector;

impl CycleDetector {
    /// Detect laundering rings in one window snapshot.
    ///
    /// Two features naming the same account set collapse into one case,
    /// keeping the lowest persistence.
    pub fn detect(
        graph: &FlowGraph,
        window: &[Transaction],
        config: &LayeringConfig,
    ) -> Result<Vec<LayeringCase>> {
        let features = homology::persistent_cycles(graph.len(), graph.distance_matrix())?;

        let mut cases: Vec<LayeringCase> = Vec::new();
        for feature in features {
            let persistence = feature.persistence();
            if !persistence.is_finite() || persistence >= config.persistence_bound {
                continue;
            }

            let members = feature.vertices();
            if members.len() < 3 {
                continue;
            }

            let volume: f64 = members.iter().map(|&i| graph.volume(i)).sum();
            if volume < config.min_volume_per_member * members.len() as f64 {
                debug!(volume, members = members.len(), "ring below volume floor");
                continue;
            }

            let names: HashSet<&str> = members.iter().map(|&i| graph.account(i)).collect();
            let internal: Vec<f64> = window
                .iter()
                .filter(|tx| {
                    names.contains(tx.sender.as_str()) && names.contains(tx.receiver.as_str())
                })
                .map(|tx| tx.amount)
                .collect();
            if internal.len() < config.min_internal_txs {
                continue;
            }
            if coefficient_of_variation(&internal) >= config.max_amount_cv {
                debug!(members = members.len(), "ring amounts too dispersed");
                continue;
            }

            let mut accounts: Vec<String> =
                members.iter().map(|&i| graph.account(i).to_owned()).collect();
            accounts.sort();

            match cases.iter_mut().find(|c| c.accounts == accounts) {
                Some(existing) => {
                    existing.persistence = existing.persistence.min(persistence);
                }
                None => cases.push(LayeringCase {
                    persistence,
                    accounts,
                    volume,
                }),
            }
        }
        Ok(cases)
    }
}

/// Standard deviation over mean; zero for degenerate input.
fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt() / mean
}
