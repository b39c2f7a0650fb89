//! Streaming emitter for the textual instance format.
//!
//! One event per line; line order is temporal order. The grammar is shared
//! by both generators and by downstream benchmark consumers:
//!
//! | line        | meaning                                      |
//! |-------------|----------------------------------------------|
//! | `c <text>`  | comment/header, ignored by consumers         |
//! | `t [a b]`   | warm-up to measured phase transition         |
//! | `a <u> <v>` | insert undirected edge u-v                   |
//! | `d <u> <v>` | delete undirected edge u-v                   |
//! | `q <u> <v>` | connectivity query, non-mutating             |
//! | `b`         | snapshot marker (measure connectivity state) |

use std::io::{self, BufWriter, Write};

use crate::edge::{Edge, VertexId};

/// Writes instance events incrementally to an underlying sink.
///
/// Events stream out as they are produced; the full log is never buffered.
/// Call [`InstanceWriter::flush`] before dropping the writer so buffered
/// bytes reach the sink on every exit path.
///
/// # Examples
/// ```
/// use tempograph_core::{Edge, InstanceWriter};
///
/// let mut writer = InstanceWriter::new(Vec::new());
/// let edge = Edge::new(2, 1).expect("distinct endpoints form an edge");
/// writer.comment("demo instance")?;
/// writer.insert(edge)?;
/// writer.delete(edge)?;
/// let text = String::from_utf8(writer.into_inner()?).expect("utf-8");
/// assert_eq!(text, "c demo instance\na 1 2\nd 1 2\n");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct InstanceWriter<W: Write> {
    out: BufWriter<W>,
    events: u64,
}

impl<W: Write> InstanceWriter<W> {
    /// Wraps a sink in a buffered instance writer.
    pub fn new(sink: W) -> Self {
        Self {
            out: BufWriter::new(sink),
            events: 0,
        }
    }

    /// Emits a `c` comment/header line.
    pub fn comment(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "c {text}")
    }

    /// Emits a bare `t` warm-up transition marker.
    pub fn transition(&mut self) -> io::Result<()> {
        writeln!(self.out, "t")
    }

    /// Emits a `t a b` transition marker with trailing integers, which
    /// consumers ignore.
    pub fn transition_with(&mut self, a: u64, b: u64) -> io::Result<()> {
        writeln!(self.out, "t {a} {b}")
    }

    /// Emits an `a` edge-insert event.
    pub fn insert(&mut self, edge: Edge) -> io::Result<()> {
        self.events += 1;
        writeln!(self.out, "a {edge}")
    }

    /// Emits a `d` edge-delete event.
    pub fn delete(&mut self, edge: Edge) -> io::Result<()> {
        self.events += 1;
        writeln!(self.out, "d {edge}")
    }

    /// Emits a `q` connectivity query. The endpoints are not required to be
    /// distinct or canonically ordered; queries do not mutate the graph.
    pub fn query(&mut self, u: VertexId, v: VertexId) -> io::Result<()> {
        self.events += 1;
        writeln!(self.out, "q {u} {v}")
    }

    /// Emits a `b` snapshot marker.
    pub fn snapshot(&mut self) -> io::Result<()> {
        self.events += 1;
        writeln!(self.out, "b")
    }

    /// Number of `a`/`d`/`q`/`b` events written so far (comments and
    /// transitions excluded).
    #[must_use]
    pub const fn events_written(&self) -> u64 {
        self.events
    }

    /// Flushes buffered bytes to the sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Flushes and returns the underlying sink.
    pub fn into_inner(self) -> io::Result<W> {
        self.out.into_inner().map_err(io::IntoInnerError::into_error)
    }
}
