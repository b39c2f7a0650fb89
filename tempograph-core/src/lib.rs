//! Deterministic temporal-graph instance generation for
//! dynamic-connectivity benchmarks.
//!
//! Two generators share one textual event format: [`TemporalReplayGenerator`]
//! replays real timestamped edge datasets under a fixed edge-survival (TTL)
//! model, and [`ClusteredGraphGenerator`] synthesizes a clique-structured
//! graph and applies a randomized edit sequence. Both draw every random
//! decision from a single seeded generator, so identical parameters and seed
//! reproduce byte-identical output.

mod cliques;
mod edge;
mod error;
mod replay;
mod writer;

pub use crate::{
    cliques::{CliqueConfig, CliqueStats, ClusteredGraphGenerator, WARMUP_STEPS},
    edge::{Edge, TimedEdge, VertexId},
    error::{GeneratorError, Result},
    replay::{
        DEFAULT_SURVIVAL_TIME, ReplayConfig, ReplayStats, TemporalReplayGenerator,
        derive_test_points,
    },
    writer::InstanceWriter,
};
