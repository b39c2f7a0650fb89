//! Canonical edge value types shared by both generators.

use std::fmt;

/// Identifier of a vertex in a generated instance.
pub type VertexId = u64;

/// Undirected edge, canonicalized so the smaller endpoint comes first.
///
/// The pair itself is the edge's identity; `Ord` follows the canonical
/// `(smaller, larger)` ordering so edge sets iterate deterministically.
///
/// # Examples
/// ```
/// use tempograph_core::Edge;
///
/// let edge = Edge::new(7, 3).expect("distinct endpoints form an edge");
/// assert_eq!(edge.endpoints(), (3, 7));
/// assert!(Edge::new(5, 5).is_none());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Edge {
    u: VertexId,
    v: VertexId,
}

impl Edge {
    /// Builds a canonical edge from two endpoints, rejecting self-loops.
    #[must_use]
    pub const fn new(a: VertexId, b: VertexId) -> Option<Self> {
        if a == b {
            return None;
        }
        if a < b {
            Some(Self { u: a, v: b })
        } else {
            Some(Self { u: b, v: a })
        }
    }

    /// Returns `(smaller, larger)` endpoint ids.
    #[must_use]
    pub const fn endpoints(self) -> (VertexId, VertexId) {
        (self.u, self.v)
    }

    /// The smaller endpoint.
    #[must_use]
    pub const fn smaller(self) -> VertexId {
        self.u
    }

    /// The larger endpoint.
    #[must_use]
    pub const fn larger(self) -> VertexId {
        self.v
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.u, self.v)
    }
}

/// An edge observation stamped with its raw dataset timestamp.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimedEdge {
    /// The canonical edge observed.
    pub edge: Edge,
    /// Timestamp of the observation, in epoch seconds (or dataset-specific
    /// integer time units).
    pub timestamp: i64,
}

impl TimedEdge {
    /// Pairs a canonical edge with its observation timestamp.
    #[must_use]
    pub const fn new(edge: Edge, timestamp: i64) -> Self {
        Self { edge, timestamp }
    }
}
