//! Error types for the generator crate.

use std::io;

use thiserror::Error;

use crate::edge::Edge;

/// Errors produced while configuring or running a generator.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Writing to the instance output failed.
    #[error("failed to write instance output: {0}")]
    Io(#[from] io::Error),
    /// The replay input contained no records.
    #[error("replay input contains no edge records")]
    EmptyInput,
    /// The replay vertex count must cover at least one vertex so query
    /// endpoints can be drawn.
    #[error("vertex count must be positive (got {got})")]
    InvalidVertexCount {
        /// The rejected vertex count.
        got: u64,
    },
    /// The query-injection frequency was negative or not finite.
    #[error("query frequency must be finite and non-negative (got {got})")]
    InvalidQueryFrequency {
        /// The rejected frequency value.
        got: f64,
    },
    /// The configured simulation window was inverted.
    #[error("replay window is inverted: start {start} exceeds end {end}")]
    InvalidTimeRange {
        /// Configured start of the simulated clock.
        start: i64,
        /// Configured end of the simulated clock.
        end: i64,
    },
    /// The edge survival time must be positive.
    #[error("survival time must be positive (got {got})")]
    InvalidSurvivalTime {
        /// The rejected survival time.
        got: i64,
    },
    /// The clustered generator was configured with an unusable clique shape.
    #[error(
        "clique size {clique_size} is invalid for {vertex_count} vertices; \
         need 2 <= clique_size <= vertex_count"
    )]
    InvalidCliqueShape {
        /// Requested clique size.
        clique_size: usize,
        /// Requested vertex count.
        vertex_count: usize,
    },
    /// A candidate edge list came out empty, so the edit loop cannot draw
    /// uniform indices from it.
    #[error("no {kind} candidate edges were generated; increase the vertex count or change the seed")]
    EmptyCandidateList {
        /// Which candidate list was empty (`"intra-clique"` or `"inter-clique"`).
        kind: &'static str,
    },
    /// An expiring edge was missing from the live table. This signals a
    /// loader or clock-ordering bug, never a recoverable input condition.
    #[error("edge {edge} expired at clock {clock} but has no live record")]
    ExpiredEdgeNotLive {
        /// The edge found in the expiry bucket.
        edge: Edge,
        /// Simulated clock at which the inconsistency was detected.
        clock: i64,
    },
    /// A live edge pointed at an expiry bucket that does not contain it.
    #[error("live edge {edge} is missing from its expiry bucket at {expiry}")]
    MissingExpiryEntry {
        /// The live edge whose bucket entry was absent.
        edge: Edge,
        /// Expiry timestamp the live record pointed at.
        expiry: i64,
    },
}

/// Convenient alias for results returned by the generator crate.
pub type Result<T> = core::result::Result<T, GeneratorError>;
