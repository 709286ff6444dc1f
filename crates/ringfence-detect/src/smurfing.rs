//! Fan-out (smurfing) detection.
//!
//! Two independent heuristics, reported side by side:
//!
//! - **near pairs**: a pair distance close to zero means at least one very
//!   large transfer; combined with high pair frequency it marks a conduit
//!   moving big money repeatedly
//! - **hubs**: an account spraying real money across many distinct
//!   recipients with a healthy average amount

use crate::graph::FlowGraph;
use ringfence_core::prelude::{Result, SmurfingCase, SmurfingConfig, Transaction};
use std::collections::HashMap;

/// Near-pair and hub-dispersal detector.
pub struct FanOutDetector;

impl FanOutDetector {
    /// Detect fan-out cases in one window snapshot.
    pub fn detect(
        graph: &FlowGraph,
        window: &[Transaction],
        config: &SmurfingConfig,
    ) -> Result<Vec<SmurfingCase>> {
        let mut cases = Vec::new();
        Self::near_pairs(graph, config, &mut cases);
        Self::hubs(graph, window, config, &mut cases);
        Ok(cases)
    }

    /// Upper-triangle scan for conduit pairs.
    fn near_pairs(graph: &FlowGraph, config: &SmurfingConfig, out: &mut Vec<SmurfingCase>) {
        let n = graph.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let d = graph.distance(i, j);
                let freq = graph.pair_frequency(i, j);
                if d < config.near_distance && freq > config.min_pair_frequency {
                    out.push(SmurfingCase::NearPair {
                        u1: graph.account(i).to_owned(),
                        u2: graph.account(j).to_owned(),
                        freq,
                        score: d,
                    });
                }
            }
        }
    }

    /// Per-sender dispersal scan. Only transfers at or above the real-money
    /// floor count toward a hub.
    fn hubs(
        graph: &FlowGraph,
        window: &[Transaction],
        config: &SmurfingConfig,
        out: &mut Vec<SmurfingCase>,
    ) {
        struct Outgoing {
            recipients: Vec<String>,
            tx_count: u32,
            total: f64,
        }

        let mut by_sender: HashMap<&str, Outgoing> = HashMap::new();
        for tx in window {
            if tx.amount < config.min_real_amount || tx.sender == tx.receiver {
                continue;
            }
            let entry = by_sender.entry(tx.sender.as_str()).or_insert(Outgoing {
                recipients: Vec::new(),
                tx_count: 0,
                total: 0.0,
            });
            entry.tx_count += 1;
            entry.total += tx.amount;
            entry.recipients.push(tx.receiver.clone());
        }

        // Deterministic case order regardless of hash-map iteration.
        let mut senders: Vec<(&str, Outgoing)> = by_sender.into_iter().collect();
        senders.sort_unstable_by(|a, b| a.0.cmp(b.0));

        for (sender, mut outgoing) in senders {
            outgoing.recipients.sort();
            outgoing.recipients.dedup();
            let recipient_count = outgoing.recipients.len() as u32;
            let avg = outgoing.total / f64::from(outgoing.tx_count.max(1));
            if outgoing.tx_count >= config.min_tx_count
                && recipient_count >= config.min_recipients
                && avg >= config.min_avg_amount
            {
                debug_assert!(graph.index_of(sender).is_some());
                out.push(SmurfingCase::Hub {
                    account: sender.to_owned(),
                    recipients: outgoing.recipients,
                    tx_count: outgoing.tx_count,
                    recipient_count,
                    total_volume: outgoing.total,
                });
            }
        }
    }
}
