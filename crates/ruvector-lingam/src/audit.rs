//! Audit trail for discovery runs.
//!
//! Every fit can produce a [`DiscoveryAuditEntry`] that captures a
//! fingerprint of the input data, a fingerprint of the discovered structure
//! (ordering and weights), and timing. Entries are cheap to produce and can
//! be streamed to any log sink.
//!
//! # Hashing
//!
//! We use [`std::hash::DefaultHasher`] rather than a cryptographic hash.
//! This is sufficient for deduplication and reproducibility checks but is
//! **not** suitable for tamper proofing.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::measure::MeasureKind;
use crate::types::{AdjacencyMatrix, CausalOrdering, DataMatrix, DiscoveryResult};

/// A single audit record for one discovery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryAuditEntry {
    /// Caller-supplied identifier for this run.
    pub request_id: String,

    /// Measure that produced the ordering.
    pub measure: MeasureKind,

    /// 8-byte hash of the data matrix. Produced by [`hash_input`].
    pub input_hash: [u8; 8],

    /// 8-byte hash of the ordering and adjacency. Produced by
    /// [`hash_output`].
    pub output_hash: [u8; 8],

    /// Number of variables.
    pub variables: usize,

    /// Number of samples.
    pub samples: usize,

    /// Nonzero edges in the returned adjacency.
    pub edges: usize,

    /// Wall-clock time in microseconds.
    pub wall_time_us: u64,

    /// Timestamp as nanoseconds since the Unix epoch.
    pub timestamp_ns: u128,
}

/// Compute a deterministic 8-byte fingerprint of a data matrix.
///
/// Hashes the shape and the bit pattern of every value.
pub fn hash_input(data: &DataMatrix) -> [u8; 8] {
    let mut h = DefaultHasher::new();
    data.variables().hash(&mut h);
    data.samples().hash(&mut h);
    for &v in data.as_slice() {
        v.to_bits().hash(&mut h);
    }
    h.finish().to_le_bytes()
}

/// Compute a deterministic 8-byte fingerprint of a discovered structure.
pub fn hash_output(ordering: &CausalOrdering, adjacency: &AdjacencyMatrix) -> [u8; 8] {
    let mut h = DefaultHasher::new();
    ordering.as_slice().hash(&mut h);
    adjacency.dim().hash(&mut h);
    for row in 0..adjacency.dim() {
        for &w in adjacency.row(row) {
            w.to_bits().hash(&mut h);
        }
    }
    h.finish().to_le_bytes()
}

/// Convenience builder for [`DiscoveryAuditEntry`]. Used by
/// [`DirectLingam::fit_audited`](crate::lingam::DirectLingam::fit_audited);
/// start it before the run so the entry's wall time covers the whole fit.
///
/// # Example
///
/// ```rust
/// use ruvector_lingam::audit::{hash_input, AuditBuilder};
/// use ruvector_lingam::lingam::DirectLingam;
/// use ruvector_lingam::types::DataMatrix;
///
/// let a: Vec<f64> = (0..300).map(|k| ((k * 37 % 101) as f64 / 101.0).powi(3)).collect();
/// let e: Vec<f64> = (0..300).map(|k| ((k * 53 % 97) as f64 / 97.0).powi(3)).collect();
/// let b: Vec<f64> = a.iter().zip(&e).map(|(x, n)| 1.5 * x + n).collect();
/// let data = DataMatrix::from_rows(vec![a, b]).unwrap();
///
/// let lingam = DirectLingam::default();
/// let audit = AuditBuilder::start("run-42", &data);
/// let result = lingam.fit(&data).unwrap();
/// let entry = audit.finish(&result, lingam.config().measure);
///
/// assert_eq!(entry.input_hash, hash_input(&data));
/// assert_eq!(entry.edges, result.adjacency.nonzero_count());
/// ```
pub struct AuditBuilder {
    request_id: String,
    input_hash: [u8; 8],
    variables: usize,
    samples: usize,
    start: Instant,
    timestamp_ns: u128,
}

impl AuditBuilder {
    /// Begin an audit trace. The input hash is taken eagerly.
    pub fn start(request_id: impl Into<String>, data: &DataMatrix) -> Self {
        let timestamp_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos();

        Self {
            request_id: request_id.into(),
            input_hash: hash_input(data),
            variables: data.variables(),
            samples: data.samples(),
            start: Instant::now(),
            timestamp_ns,
        }
    }

    /// Finalize the entry once the run has returned.
    pub fn finish(self, result: &DiscoveryResult, measure: MeasureKind) -> DiscoveryAuditEntry {
        DiscoveryAuditEntry {
            request_id: self.request_id,
            measure,
            input_hash: self.input_hash,
            output_hash: hash_output(&result.ordering, &result.adjacency),
            variables: self.variables,
            samples: self.samples,
            edges: result.adjacency.nonzero_count(),
            wall_time_us: self.start.elapsed().as_micros() as u64,
            timestamp_ns: self.timestamp_ns,
        }
    }
}
