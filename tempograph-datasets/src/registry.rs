//! Declarative dataset registry.
//!
//! One [`DatasetSpec`] per supported dataset replaces per-dataset branching:
//! the raw-file format, retrieval coordinates, and replay parameters are all
//! data. Adding a dataset means adding a table row.

use tempograph_core::DEFAULT_SURVIVAL_TIME;

/// Field separator of a raw edge file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Delimiter {
    /// Comma-separated fields.
    Comma,
    /// Tab-separated fields.
    Tab,
    /// Any run of ASCII whitespace.
    Whitespace,
}

/// How the timestamp column decodes to integer simulated-clock units.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimestampDecode {
    /// Raw integer seconds.
    Seconds,
    /// Float seconds, truncated toward zero.
    FloatSeconds,
    /// ISO `YYYY-MM-DD` date, converted to epoch seconds at UTC midnight.
    IsoDate,
    /// A calendar year used directly as the clock value.
    Year,
}

/// Compression wrapping of the downloaded payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArchiveKind {
    /// The payload is the raw file itself.
    None,
    /// A zip archive containing the raw file as a member.
    Zip,
    /// A gzip-compressed raw file.
    Gzip,
}

/// Shape of a raw edge file: how to split rows into fields and where the
/// timestamp lives. Endpoint ids are always fields 0 and 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormatDescriptor {
    /// Field separator.
    pub delimiter: Delimiter,
    /// Header lines to skip before data rows.
    pub skip_lines: usize,
    /// Zero-based field index of the timestamp.
    pub timestamp_column: usize,
    /// Timestamp decoding strategy.
    pub decode: TimestampDecode,
    /// Lines starting with this marker are skipped.
    pub comment_marker: Option<char>,
}

/// Registry entry for one dataset.
#[derive(Clone, Copy, Debug)]
pub struct DatasetSpec {
    /// Registry key.
    pub name: &'static str,
    /// Raw file name inside the cache directory (and inside zip archives).
    pub file_name: &'static str,
    /// Download URL; `None` for local-only fixtures.
    pub url: Option<&'static str>,
    /// Compression of the downloaded payload.
    pub archive: ArchiveKind,
    /// Raw file format.
    pub format: FormatDescriptor,
    /// Edge TTL in clock units.
    pub survival_time: i64,
    /// Documented replacement for the first record's timestamp.
    pub start_override: Option<i64>,
    /// Documented replacement for the last record's timestamp.
    pub end_override: Option<i64>,
    /// Fixed snapshot test points, bypassing derivation.
    pub fixed_test_points: Option<&'static [i64]>,
}

const fn spec(
    name: &'static str,
    file_name: &'static str,
    url: Option<&'static str>,
    archive: ArchiveKind,
    format: FormatDescriptor,
) -> DatasetSpec {
    DatasetSpec {
        name,
        file_name,
        url,
        archive,
        format,
        survival_time: DEFAULT_SURVIVAL_TIME,
        start_override: None,
        end_override: None,
        fixed_test_points: None,
    }
}

const COMMA_SECONDS: FormatDescriptor = FormatDescriptor {
    delimiter: Delimiter::Comma,
    skip_lines: 0,
    timestamp_column: 2,
    decode: TimestampDecode::Seconds,
    comment_marker: None,
};

const COMMA_FLOAT_SECONDS: FormatDescriptor = FormatDescriptor {
    decode: TimestampDecode::FloatSeconds,
    ..COMMA_SECONDS
};

static DATASETS: [DatasetSpec; 10] = [
    DatasetSpec {
        start_override: Some(1_423_298_633),
        ..spec(
            "dnc",
            "email-dnc.edges",
            Some("https://nrvis.com/download/data/dynamic/email-dnc.zip"),
            ArchiveKind::Zip,
            COMMA_SECONDS,
        )
    },
    spec(
        "call",
        "ia-reality-call.edges",
        Some("https://nrvis.com/download/data/dynamic/ia-reality-call.zip"),
        ArchiveKind::Zip,
        COMMA_FLOAT_SECONDS,
    ),
    spec(
        "messages",
        "fb-messages.edges",
        Some("https://nrvis.com/download/data/dynamic/fb-messages.zip"),
        ArchiveKind::Zip,
        COMMA_FLOAT_SECONDS,
    ),
    spec(
        "fb",
        "fb-forum.edges",
        Some("https://nrvis.com/download/data/dynamic/fb-forum.zip"),
        ArchiveKind::Zip,
        COMMA_FLOAT_SECONDS,
    ),
    spec(
        "wiki",
        "soc-wiki-elec.edges",
        Some("https://nrvis.com/download/data/dynamic/soc-wiki-elec.zip"),
        ArchiveKind::Zip,
        FormatDescriptor {
            delimiter: Delimiter::Whitespace,
            skip_lines: 1,
            timestamp_column: 3,
            decode: TimestampDecode::Seconds,
            comment_marker: None,
        },
    ),
    spec(
        "tech",
        "tech-as-topology.edges",
        Some("https://nrvis.com/download/data/dynamic/tech-as-topology.zip"),
        ArchiveKind::Zip,
        FormatDescriptor {
            delimiter: Delimiter::Whitespace,
            skip_lines: 0,
            timestamp_column: 3,
            decode: TimestampDecode::Seconds,
            comment_marker: Some('%'),
        },
    ),
    DatasetSpec {
        start_override: Some(915_445_260),
        end_override: Some(1_040_459_085),
        ..spec(
            "enron",
            "ia-enron-email-dynamic.edges",
            Some("https://nrvis.com/download/data/dynamic/ia-enron-email-dynamic.zip"),
            ArchiveKind::Zip,
            FormatDescriptor {
                delimiter: Delimiter::Whitespace,
                skip_lines: 1,
                timestamp_column: 3,
                decode: TimestampDecode::Seconds,
                comment_marker: None,
            },
        )
    },
    spec(
        "youtube",
        "youtube-growth-sorted.txt",
        Some("http://socialnetworks.mpi-sws.mpg.de/data/youtube-u-growth.txt.gz"),
        ArchiveKind::Gzip,
        FormatDescriptor {
            delimiter: Delimiter::Tab,
            skip_lines: 0,
            timestamp_column: 2,
            decode: TimestampDecode::IsoDate,
            comment_marker: None,
        },
    ),
    spec(
        "stackoverflow",
        "sx-stackoverflow.txt",
        Some("http://snap.stanford.edu/data/sx-stackoverflow.txt.gz"),
        ArchiveKind::Gzip,
        FormatDescriptor {
            delimiter: Delimiter::Whitespace,
            skip_lines: 0,
            timestamp_column: 2,
            decode: TimestampDecode::Seconds,
            comment_marker: None,
        },
    ),
    // Local reference fixture used by the replay tests; never downloaded.
    DatasetSpec {
        survival_time: 3,
        fixed_test_points: Some(&[0, 10]),
        ..spec("test", "test.edges", None, ArchiveKind::None, COMMA_SECONDS)
    },
];

/// All registered datasets.
#[must_use]
pub fn datasets() -> &'static [DatasetSpec] {
    &DATASETS
}

/// Looks up a dataset by registry key.
#[must_use]
pub fn dataset(name: &str) -> Option<&'static DatasetSpec> {
    DATASETS.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_registered_names() {
        let spec = dataset("enron").expect("enron is registered");
        assert_eq!(spec.file_name, "ia-enron-email-dynamic.edges");
        assert_eq!(spec.archive, ArchiveKind::Zip);
        assert_eq!(spec.start_override, Some(915_445_260));
        assert_eq!(spec.end_override, Some(1_040_459_085));
    }

    #[test]
    fn lookup_rejects_unknown_names() {
        assert!(dataset("no-such-dataset").is_none());
    }

    #[test]
    fn only_the_fixture_lacks_a_url() {
        for spec in datasets() {
            assert_eq!(spec.url.is_none(), spec.name == "test", "{}", spec.name);
        }
    }

    #[test]
    fn fixture_uses_fixed_test_points_and_short_survival() {
        let spec = dataset("test").expect("fixture is registered");
        assert_eq!(spec.survival_time, 3);
        assert_eq!(spec.fixed_test_points, Some([0_i64, 10].as_slice()));
    }

    #[test]
    fn dnc_overrides_only_the_start_of_the_window() {
        let spec = dataset("dnc").expect("dnc is registered");
        assert_eq!(spec.start_override, Some(1_423_298_633));
        assert_eq!(spec.end_override, None);
        assert_eq!(spec.survival_time, tempograph_core::DEFAULT_SURVIVAL_TIME);
    }
}
