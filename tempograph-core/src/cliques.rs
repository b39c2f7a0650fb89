//! Clustered random-graph generator.
//!
//! Synthesizes a clique-structured candidate graph and applies a randomized
//! edit sequence, maintained with swap-to-boundary partitioning: each
//! candidate list is a contiguous array logically split by a boundary index,
//! active edges below it, inactive at or above. Activating or deactivating
//! an edge is one swap with the boundary element plus a boundary move, never
//! a scan.
//!
//! The generator writes two lock-stepped streams. Both receive the identical
//! insert/delete sequence; only the secondary (block-query) stream receives
//! snapshot markers, so replaying either stream's mutations reconstructs the
//! same edge timeline.

use std::io::Write;

use rand::{Rng, SeedableRng, rngs::SmallRng, seq::SliceRandom};
use tracing::{info, instrument};

use crate::{
    edge::{Edge, VertexId},
    error::{GeneratorError, Result},
    writer::InstanceWriter,
};

/// Edit iterations excluded from measured snapshot markers.
pub const WARMUP_STEPS: u64 = 1000;

const SNAPSHOT_SAMPLES: u64 = 100;
const INTER_CLIQUE_EDGE_BUDGET: usize = 8;

/// Parameters of a clustered random-graph run.
#[derive(Clone, Copy, Debug)]
pub struct CliqueConfig {
    /// Number of vertices; the first `(vertex_count / clique_size) *
    /// clique_size` shuffled vertices are grouped into cliques.
    pub vertex_count: usize,
    /// Vertices per clique.
    pub clique_size: usize,
    /// Measured edit steps; [`WARMUP_STEPS`] warm-up steps are prepended.
    pub num_steps: u64,
    /// Seed for the run's random source.
    pub seed: u64,
}

/// Counters accumulated over one clustered run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CliqueStats {
    /// Intra-clique candidate edges generated in the build phase.
    pub intra_candidates: u64,
    /// Inter-clique candidate edges generated in the build phase.
    pub inter_candidates: u64,
    /// `a` events emitted before the edit phase.
    pub initial_inserts: u64,
    /// `a` events emitted by the edit phase.
    pub inserts: u64,
    /// `d` events emitted by the edit phase.
    pub deletes: u64,
    /// `b` markers written to the block-query stream.
    pub snapshots: u64,
    /// Edges active in both lists when the run finished.
    pub final_active: u64,
}

/// One candidate edge list split into active and inactive ranges by a
/// boundary index. Indices below the boundary are active.
#[derive(Clone, Debug)]
struct EdgePartition {
    edges: Vec<Edge>,
    boundary: usize,
}

enum Toggle {
    Activated(Edge),
    Deactivated(Edge),
}

impl EdgePartition {
    /// Starts with the first half of the (already shuffled) list active.
    fn new(edges: Vec<Edge>) -> Self {
        let boundary = edges.len() / 2;
        Self { edges, boundary }
    }

    fn len(&self) -> usize {
        self.edges.len()
    }

    const fn active(&self) -> usize {
        self.boundary
    }

    fn initially_active(&self) -> &[Edge] {
        &self.edges[..self.boundary]
    }

    /// Flips the element at `index` across the boundary in O(1).
    ///
    /// An active index deactivates its edge by swapping with the last active
    /// slot; an inactive index activates its edge by swapping with the first
    /// inactive slot. `index` must be below `len()`.
    fn toggle(&mut self, index: usize) -> Toggle {
        if index < self.boundary {
            self.boundary -= 1;
            self.edges.swap(index, self.boundary);
            Toggle::Deactivated(self.edges[self.boundary])
        } else {
            self.edges.swap(index, self.boundary);
            let edge = self.edges[self.boundary];
            self.boundary += 1;
            Toggle::Activated(edge)
        }
    }
}

/// Generates clique-structured graphs with randomized edit sequences.
#[derive(Clone, Copy, Debug)]
pub struct ClusteredGraphGenerator {
    config: CliqueConfig,
}

impl ClusteredGraphGenerator {
    /// Validates the clique shape.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidCliqueShape`] unless
    /// `2 <= clique_size <= vertex_count`.
    pub const fn new(config: CliqueConfig) -> Result<Self> {
        if config.clique_size < 2 || config.clique_size > config.vertex_count {
            return Err(GeneratorError::InvalidCliqueShape {
                clique_size: config.clique_size,
                vertex_count: config.vertex_count,
            });
        }
        Ok(Self { config })
    }

    /// Builds the candidate graph and streams the edit sequence into both
    /// writers. Both writers are flushed before returning.
    ///
    /// # Errors
    /// Returns [`GeneratorError::EmptyCandidateList`] when the build phase
    /// produced no intra- or no inter-clique candidates, and
    /// [`GeneratorError::Io`] on write failures.
    #[instrument(
        name = "cliques.generate",
        skip(self, primary, block_query),
        fields(
            vertex_count = self.config.vertex_count,
            clique_size = self.config.clique_size,
            num_steps = self.config.num_steps,
            seed = self.config.seed,
        )
    )]
    pub fn generate<P: Write, B: Write>(
        &self,
        primary: &mut InstanceWriter<P>,
        block_query: &mut InstanceWriter<B>,
    ) -> Result<CliqueStats> {
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let (inter, intra) = self.build_candidates(&mut rng)?;
        let mut stats = CliqueStats {
            intra_candidates: intra.len() as u64,
            inter_candidates: inter.len() as u64,
            ..CliqueStats::default()
        };

        let header = format!("clique-size: {}", self.config.clique_size);
        primary.comment(&header)?;
        block_query.comment(&header)?;

        let mut inter = EdgePartition::new(inter);
        let mut intra = EdgePartition::new(intra);
        for partition in [&inter, &intra] {
            for &edge in partition.initially_active() {
                primary.insert(edge)?;
                block_query.insert(edge)?;
                stats.initial_inserts += 1;
            }
        }

        let snapshot_interval = (self.config.num_steps / SNAPSHOT_SAMPLES).max(1);
        for step in 0..self.config.num_steps + WARMUP_STEPS {
            if step == WARMUP_STEPS {
                primary.transition_with(0, 0)?;
                block_query.transition_with(0, 0)?;
            }
            if step >= WARMUP_STEPS && (step - WARMUP_STEPS) % snapshot_interval == 0 {
                block_query.snapshot()?;
                stats.snapshots += 1;
            }

            let partition = if rng.gen_range(0_u32..2) == 0 {
                &mut inter
            } else {
                &mut intra
            };
            let index = rng.gen_range(0..partition.len());
            match partition.toggle(index) {
                Toggle::Activated(edge) => {
                    primary.insert(edge)?;
                    block_query.insert(edge)?;
                    stats.inserts += 1;
                }
                Toggle::Deactivated(edge) => {
                    primary.delete(edge)?;
                    block_query.delete(edge)?;
                    stats.deletes += 1;
                }
            }
        }

        primary.flush()?;
        block_query.flush()?;
        stats.final_active = (inter.active() + intra.active()) as u64;
        debug_assert_eq!(
            stats.final_active,
            stats.initial_inserts + stats.inserts - stats.deletes,
        );
        info!(
            intra_candidates = stats.intra_candidates,
            inter_candidates = stats.inter_candidates,
            inserts = stats.initial_inserts + stats.inserts,
            deletes = stats.deletes,
            snapshots = stats.snapshots,
            "clustered generation completed"
        );
        Ok(stats)
    }

    /// Build phase: shuffles the vertices into cliques and draws the two
    /// candidate lists, returning `(inter, intra)` already shuffled.
    ///
    /// Every in-clique pair is included with probability 1/2; every pair of
    /// distinct cliques is connected through one random member on each side
    /// with probability 9 / (clique_count + 1), so roughly four inter-clique
    /// edges per clique exist and no clique pair is connected twice.
    fn build_candidates(&self, rng: &mut SmallRng) -> Result<(Vec<Edge>, Vec<Edge>)> {
        let clique_size = self.config.clique_size;
        let clique_count = self.config.vertex_count / clique_size;

        let mut vertices: Vec<VertexId> = (0..self.config.vertex_count as u64).collect();
        vertices.shuffle(rng);
        let member = |clique: usize, slot: usize| vertices[clique * clique_size + slot];

        let mut intra = Vec::new();
        for clique in 0..clique_count {
            for a in 0..clique_size {
                for b in a + 1..clique_size {
                    if rng.gen_range(0_u32..2) == 1 {
                        // Shuffled vertex ids are distinct, so the pair is
                        // never a self-loop.
                        if let Some(edge) = Edge::new(member(clique, a), member(clique, b)) {
                            intra.push(edge);
                        }
                    }
                }
            }
        }

        let mut inter = Vec::new();
        for left in 0..clique_count {
            for right in left + 1..clique_count {
                if rng.gen_range(0..=clique_count) <= INTER_CLIQUE_EDGE_BUDGET {
                    let u = member(left, rng.gen_range(0..clique_size));
                    let v = member(right, rng.gen_range(0..clique_size));
                    if let Some(edge) = Edge::new(u, v) {
                        inter.push(edge);
                    }
                }
            }
        }

        inter.shuffle(rng);
        intra.shuffle(rng);

        if inter.is_empty() {
            return Err(GeneratorError::EmptyCandidateList {
                kind: "inter-clique",
            });
        }
        if intra.is_empty() {
            return Err(GeneratorError::EmptyCandidateList {
                kind: "intra-clique",
            });
        }
        Ok((inter, intra))
    }
}
