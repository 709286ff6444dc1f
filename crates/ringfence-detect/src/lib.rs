//! # Ringfence Detect
//!
//! Pure detection kernels over one analysis cycle's immutable snapshot.
//!
//! ## Pipeline
//!
//! - [`graph::FlowGraph`] — window transactions to dense distance and
//!   adjacency matrices, plus per-account volumes and pair frequencies
//! - [`homology`] — 1-dimensional persistent homology of the Vietoris–Rips
//!   filtration over the distance matrix
//! - [`layering::CycleDetector`] — low-persistence cycles filtered into
//!   laundering rings
//! - [`smurfing::FanOutDetector`] — near-distance pairs and hub dispersal
//! - [`structuring::TriangleDetector`] — directed 3-cycles via matrix powers
//!
//! All detectors read the same snapshot and write only their own result
//! lists, so a caller may run them in parallel; results merge at publish
//! time.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod homology;
pub mod layering;
pub mod smurfing;
pub mod structuring;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::graph::FlowGraph;
    pub use crate::homology::{persistent_cycles, PersistenceFeature};
    pub use crate::layering::CycleDetector;
    pub use crate::smurfing::FanOutDetector;
    pub use crate::structuring::TriangleDetector;
}
