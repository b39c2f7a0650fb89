//! Temporal replay generator with TTL edge expiry.
//!
//! Walks an integer simulated clock over a timestamp-sorted edge sequence.
//! Each observed edge stays live for a fixed survival time; re-observing a
//! live edge silently refreshes its expiry instead of emitting an event.
//! Expiry firing emits a delete. After every insert and delete a
//! renewal-process query injection may emit zero or more connectivity
//! queries. In block-query mode, snapshot markers are emitted at
//! precomputed test points.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Write;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{info, instrument};

use crate::{
    edge::{Edge, TimedEdge, VertexId},
    error::{GeneratorError, Result},
    writer::InstanceWriter,
};

/// Default edge survival time: 1,296,000 seconds, roughly 14 days.
pub const DEFAULT_SURVIVAL_TIME: i64 = 1_296_000;

/// Step of the query-injection renewal process. A frequency of 1.0 yields on
/// average one query per trigger; frequencies above 1.0 yield several.
const QUERY_RENEWAL_STEP: f64 = 1000.0;

const TEST_POINT_SAMPLES: i64 = 100;
const TEST_POINT_SKIP: usize = 25;
const TEST_POINT_KEEP: usize = 50;

/// Derives snapshot test points for a dataset window.
///
/// Samples [`TEST_POINT_SAMPLES`] timestamps uniformly spaced across
/// `[start, end + 2 * survival_time]` and keeps the middle fifty, dropping
/// the first and last quarter to avoid cold-start and cooldown artifacts.
#[must_use]
pub fn derive_test_points(start: i64, end: i64, survival_time: i64) -> Vec<i64> {
    let spacing = (end - start + 2 * survival_time) / TEST_POINT_SAMPLES;
    (1..=TEST_POINT_SAMPLES)
        .map(|i| start + i * spacing)
        .skip(TEST_POINT_SKIP)
        .take(TEST_POINT_KEEP)
        .collect()
}

/// Parameters of a temporal replay run.
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    /// Fixed TTL applied to an edge from its (re)insertion time.
    pub survival_time: i64,
    /// First simulated clock tick.
    pub start: i64,
    /// Last input timestamp; the clock runs to `end + survival_time`.
    pub end: i64,
    /// Expected number of injected queries per insert/delete event.
    pub query_frequency: f64,
    /// Whether to emit the warm-up marker and snapshot markers.
    pub block_queries: bool,
    /// Sorted timestamps at which snapshot markers fire in block-query mode.
    pub test_points: Vec<i64>,
    /// Seed for the run's random source.
    pub seed: u64,
}

impl ReplayConfig {
    /// Builds a configuration whose window spans the record sequence, with
    /// test points derived from that window.
    ///
    /// # Errors
    /// Returns [`GeneratorError::EmptyInput`] when `records` is empty.
    pub fn from_records(records: &[TimedEdge], survival_time: i64, seed: u64) -> Result<Self> {
        let first = records.first().ok_or(GeneratorError::EmptyInput)?;
        let last = records.last().ok_or(GeneratorError::EmptyInput)?;
        let start = first.timestamp;
        let end = last.timestamp;
        Ok(Self {
            survival_time,
            start,
            end,
            query_frequency: 0.0,
            block_queries: false,
            test_points: derive_test_points(start, end, survival_time),
            seed,
        })
    }

    /// Overrides the simulation window and re-derives the test points.
    /// Datasets with documented clock overrides apply them here before any
    /// further adjustment.
    #[must_use]
    pub fn with_window(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        if let Some(start) = start {
            self.start = start;
        }
        if let Some(end) = end {
            self.end = end;
        }
        self.test_points = derive_test_points(self.start, self.end, self.survival_time);
        self
    }

    /// Sets the query-injection frequency.
    #[must_use]
    pub const fn with_query_frequency(mut self, frequency: f64) -> Self {
        self.query_frequency = frequency;
        self
    }

    /// Enables or disables block-query mode.
    #[must_use]
    pub const fn with_block_queries(mut self, enabled: bool) -> Self {
        self.block_queries = enabled;
        self
    }

    /// Replaces the derived test points, e.g. with a fixture's fixed pair.
    #[must_use]
    pub fn with_test_points(mut self, test_points: Vec<i64>) -> Self {
        self.test_points = test_points;
        self
    }
}

/// Counters accumulated over one replay run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReplayStats {
    /// `a` events emitted.
    pub inserts: u64,
    /// Silent TTL refreshes (re-insertions of live edges; no event).
    pub refreshes: u64,
    /// `d` events emitted.
    pub deletes: u64,
    /// `q` events emitted.
    pub queries: u64,
    /// `b` markers emitted.
    pub snapshots: u64,
    /// Distinct vertices touched by replayed records.
    pub vertices: u64,
}

/// Replays a sorted edge sequence into instance events under a TTL model.
#[derive(Clone, Debug)]
pub struct TemporalReplayGenerator {
    records: Vec<TimedEdge>,
    vertex_count: u64,
    config: ReplayConfig,
}

impl TemporalReplayGenerator {
    /// Validates the configuration against the record sequence.
    ///
    /// `records` must be sorted by timestamp (the loader guarantees this);
    /// `vertex_count` bounds the id range queries are drawn from.
    ///
    /// # Errors
    /// Returns [`GeneratorError`] when the input is empty, the vertex count
    /// is zero, the survival time is not positive, the query frequency is
    /// negative or not finite, or the window is inverted.
    pub fn new(records: Vec<TimedEdge>, vertex_count: u64, config: ReplayConfig) -> Result<Self> {
        if records.is_empty() {
            return Err(GeneratorError::EmptyInput);
        }
        if vertex_count == 0 {
            return Err(GeneratorError::InvalidVertexCount { got: vertex_count });
        }
        if config.survival_time <= 0 {
            return Err(GeneratorError::InvalidSurvivalTime {
                got: config.survival_time,
            });
        }
        if !config.query_frequency.is_finite() || config.query_frequency < 0.0 {
            return Err(GeneratorError::InvalidQueryFrequency {
                got: config.query_frequency,
            });
        }
        if config.start > config.end {
            return Err(GeneratorError::InvalidTimeRange {
                start: config.start,
                end: config.end,
            });
        }
        Ok(Self {
            records,
            vertex_count,
            config,
        })
    }

    /// Runs the simulated clock and streams events into `writer`.
    ///
    /// The writer is flushed before returning. Memory use is bounded by the
    /// currently live edges plus the expiry index, never by the emitted log.
    ///
    /// # Errors
    /// Returns [`GeneratorError::Io`] on write failures and an invariant
    /// violation when an expiring edge has no live record.
    #[instrument(
        name = "replay.generate",
        skip(self, writer),
        fields(
            records = self.records.len(),
            start = self.config.start,
            end = self.config.end,
            survival_time = self.config.survival_time,
            seed = self.config.seed,
        )
    )]
    pub fn generate<W: Write>(&self, writer: &mut InstanceWriter<W>) -> Result<ReplayStats> {
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let mut live: HashMap<Edge, i64> = HashMap::new();
        let mut expirations: HashMap<i64, BTreeSet<Edge>> = HashMap::new();
        let mut seen_vertices: HashSet<VertexId> = HashSet::new();
        let mut stats = ReplayStats::default();
        let mut pending = self.records.as_slice();
        let mut test_points = self.config.test_points.iter().copied().peekable();

        if self.config.block_queries {
            writer.comment("blockQueries")?;
            writer.transition()?;
        }

        let horizon = self.config.end + self.config.survival_time;
        let mut clock = self.config.start;
        while clock <= horizon {
            while let Some((record, rest)) = pending.split_first() {
                if record.timestamp > clock {
                    break;
                }
                pending = rest;
                if record.timestamp < clock {
                    // Records before the configured window are consumed
                    // without being replayed.
                    continue;
                }
                let edge = record.edge;
                seen_vertices.insert(edge.smaller());
                seen_vertices.insert(edge.larger());
                let expiry = clock + self.config.survival_time;
                if let Some(previous) = live.insert(edge, expiry) {
                    // Re-insertion of a live edge: silent TTL refresh.
                    remove_expiry_entry(&mut expirations, previous, edge)?;
                    expirations.entry(expiry).or_default().insert(edge);
                    stats.refreshes += 1;
                } else {
                    expirations.entry(expiry).or_default().insert(edge);
                    writer.insert(edge)?;
                    stats.inserts += 1;
                    stats.queries += self.inject_queries(&mut rng, writer)?;
                }
            }

            if let Some(bucket) = expirations.remove(&clock) {
                for edge in bucket {
                    if live.remove(&edge).is_none() {
                        return Err(GeneratorError::ExpiredEdgeNotLive { edge, clock });
                    }
                    writer.delete(edge)?;
                    stats.deletes += 1;
                    stats.queries += self.inject_queries(&mut rng, writer)?;
                }
            }

            while test_points.next_if(|&point| point < clock).is_some() {}
            if test_points.next_if_eq(&clock).is_some() && self.config.block_queries {
                writer.snapshot()?;
                stats.snapshots += 1;
            }

            clock += 1;
        }

        writer.flush()?;
        stats.vertices = seen_vertices.len() as u64;
        info!(
            inserts = stats.inserts,
            refreshes = stats.refreshes,
            deletes = stats.deletes,
            queries = stats.queries,
            snapshots = stats.snapshots,
            "replay generation completed"
        );
        Ok(stats)
    }

    /// Runs the query-injection renewal process after one insert or delete.
    ///
    /// A uniform draw in `[0, 1000)` is tested against
    /// `frequency * 1000`; each emission advances the draw by 1000 and
    /// re-tests, so one trigger can emit zero, one, or many queries. The
    /// exact shape of this process is part of the output contract; do not
    /// replace it with a single coin flip or a Poisson sample.
    fn inject_queries<W: Write>(
        &self,
        rng: &mut SmallRng,
        writer: &mut InstanceWriter<W>,
    ) -> Result<u64> {
        let mut emitted = 0;
        let mut draw = f64::from(rng.gen_range(0_u32..1000));
        while draw < self.config.query_frequency * QUERY_RENEWAL_STEP {
            draw += QUERY_RENEWAL_STEP;
            let u = rng.gen_range(0..self.vertex_count);
            let v = rng.gen_range(0..self.vertex_count);
            writer.query(u, v)?;
            emitted += 1;
        }
        Ok(emitted)
    }
}

fn remove_expiry_entry(
    expirations: &mut HashMap<i64, BTreeSet<Edge>>,
    expiry: i64,
    edge: Edge,
) -> Result<()> {
    let bucket = expirations
        .get_mut(&expiry)
        .ok_or(GeneratorError::MissingExpiryEntry { edge, expiry })?;
    if !bucket.remove(&edge) {
        return Err(GeneratorError::MissingExpiryEntry { edge, expiry });
    }
    if bucket.is_empty() {
        expirations.remove(&expiry);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn record(a: VertexId, b: VertexId, timestamp: i64) -> TimedEdge {
        TimedEdge::new(
            Edge::new(a, b).expect("test edges have distinct endpoints"),
            timestamp,
        )
    }

    #[test]
    fn derive_test_points_keeps_the_middle_fifty() {
        let points = derive_test_points(0, 6000, 2000);
        // span = 6000 + 2 * 2000, spacing = 100; samples 26..=75 survive.
        assert_eq!(points.len(), 50);
        assert_eq!(points.first().copied(), Some(2600));
        assert_eq!(points.last().copied(), Some(7500));
    }

    #[test]
    fn derive_test_points_offsets_from_start() {
        let points = derive_test_points(1000, 11_000, 0);
        assert_eq!(points.first().copied(), Some(1000 + 26 * 100));
    }

    #[test]
    fn from_records_rejects_empty_input() {
        let err = ReplayConfig::from_records(&[], DEFAULT_SURVIVAL_TIME, 42)
            .expect_err("empty input must fail");
        assert!(matches!(err, GeneratorError::EmptyInput));
    }

    #[test]
    fn from_records_spans_first_to_last_timestamp() {
        let records = vec![record(1, 2, 10), record(2, 3, 15), record(3, 4, 90)];
        let config =
            ReplayConfig::from_records(&records, 5, 42).expect("non-empty input must succeed");
        assert_eq!(config.start, 10);
        assert_eq!(config.end, 90);
    }

    #[test]
    fn with_window_rederives_test_points() {
        let records = vec![record(1, 2, 0), record(2, 3, 100)];
        let config = ReplayConfig::from_records(&records, 50, 42)
            .expect("non-empty input must succeed")
            .with_window(Some(1000), Some(2000));
        assert_eq!(config.start, 1000);
        assert_eq!(config.end, 2000);
        assert!(config.test_points.iter().all(|&point| point > 1000));
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(-0.5)]
    fn new_rejects_bad_query_frequency(#[case] frequency: f64) {
        let records = vec![record(1, 2, 0)];
        let config = ReplayConfig::from_records(&records, 3, 42)
            .expect("non-empty input must succeed")
            .with_query_frequency(frequency);
        let err = TemporalReplayGenerator::new(records, 3, config)
            .expect_err("bad frequency must fail");
        assert!(matches!(err, GeneratorError::InvalidQueryFrequency { .. }));
    }

    #[test]
    fn new_rejects_zero_vertex_count() {
        let records = vec![record(1, 2, 0)];
        let config =
            ReplayConfig::from_records(&records, 3, 42).expect("non-empty input must succeed");
        let err =
            TemporalReplayGenerator::new(records, 0, config).expect_err("zero vertices must fail");
        assert!(matches!(
            err,
            GeneratorError::InvalidVertexCount { got: 0 }
        ));
    }

    #[test]
    fn new_rejects_non_positive_survival_time() {
        let records = vec![record(1, 2, 0)];
        let config =
            ReplayConfig::from_records(&records, 3, 42).expect("non-empty input must succeed");
        let mut config = config;
        config.survival_time = 0;
        let err = TemporalReplayGenerator::new(records, 3, config)
            .expect_err("zero survival time must fail");
        assert!(matches!(err, GeneratorError::InvalidSurvivalTime { got: 0 }));
    }

    #[test]
    fn new_rejects_inverted_window() {
        let records = vec![record(1, 2, 0)];
        let config = ReplayConfig::from_records(&records, 3, 42)
            .expect("non-empty input must succeed")
            .with_window(Some(10), Some(5));
        let err =
            TemporalReplayGenerator::new(records, 3, config).expect_err("inverted window must fail");
        assert!(matches!(
            err,
            GeneratorError::InvalidTimeRange { start: 10, end: 5 }
        ));
    }

    #[test]
    fn zero_frequency_emits_no_queries() {
        let records = vec![record(1, 2, 0), record(3, 4, 1)];
        let config =
            ReplayConfig::from_records(&records, 3, 42).expect("non-empty input must succeed");
        let generator =
            TemporalReplayGenerator::new(records, 5, config).expect("valid configuration");
        let mut writer = InstanceWriter::new(Vec::new());
        let stats = generator.generate(&mut writer).expect("generation succeeds");
        assert_eq!(stats.queries, 0);
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.deletes, 2);
    }
}
