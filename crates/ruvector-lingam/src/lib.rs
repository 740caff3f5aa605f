//! DirectLiNGAM causal discovery for the ruvector ecosystem.
//!
//! Given observations of `n` variables generated by a linear acyclic model
//! with non-Gaussian, mutually independent noise, this crate recovers a
//! causal ordering of the variables and the direct-effect coefficients
//! `B[child][parent]` that are consistent with it.
//!
//! # Pipeline
//!
//! | Stage | Module | Entry point |
//! |-------|--------|-------------|
//! | Causal ordering | [`ordering`] | [`discover_ordering`] |
//! | Edge weights | [`estimator`] | [`estimate_weights`] |
//! | Both, with events and pruning | [`lingam`] | [`DirectLingam::fit`] |
//! | Fit plus audit record | [`audit`] | [`DirectLingam::fit_audited`] |
//! | Graphviz export | [`dot`] | [`to_dot`] |
//!
//! # Example
//!
//! ```rust
//! use ruvector_lingam::{DataMatrix, DirectLingam, LingamConfig};
//!
//! // x1 -> x0 with skewed noise.
//! let x1: Vec<f64> = (0..400).map(|k| ((k * 37 % 101) as f64 / 101.0).powi(3)).collect();
//! let e: Vec<f64> = (0..400).map(|k| ((k * 53 % 97) as f64 / 97.0).powi(3)).collect();
//! let x0: Vec<f64> = x1.iter().zip(&e).map(|(a, b)| 2.0 * a + b).collect();
//!
//! let data = DataMatrix::from_rows(vec![x0, x1]).unwrap();
//! let config = LingamConfig { workers: 2, ..Default::default() };
//! let result = DirectLingam::new(config).fit(&data).unwrap();
//!
//! assert_eq!(result.ordering.len(), 2);
//! assert_eq!(result.adjacency.nonzero_count(), 1);
//! ```
//!
//! # Feature flags
//!
//! * `parallel` (default) -- pairwise scoring on a run-scoped rayon pool
//!   when `workers > 1`. Without it every run is sequential.

pub mod audit;
pub mod budget;
pub mod config;
pub mod dot;
pub mod error;
pub mod estimator;
pub mod events;
pub mod kernels;
pub mod lingam;
pub mod measure;
pub mod ordering;
pub mod types;
pub mod validation;

pub use audit::DiscoveryAuditEntry;
pub use config::LingamConfig;
pub use dot::{to_dot, DotOptions};
pub use error::{LingamError, ValidationError};
pub use estimator::estimate_weights;
pub use events::LingamEvent;
pub use lingam::DirectLingam;
pub use measure::MeasureKind;
pub use ordering::discover_ordering;
pub use types::{AdjacencyMatrix, CausalOrdering, DataMatrix, DiscoveryResult};
