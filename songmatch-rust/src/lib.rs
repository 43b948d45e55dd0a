pub mod config;
pub mod core;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod logging;
pub mod matcher;
pub mod models;
pub mod registry;
pub mod sample;
pub mod source;
pub mod storage;

pub use config::MatchConfig;
pub use crate::core::{build_from_config, build_library, identify, identify_file};
pub use error::{ConfigError, DatabaseError, FingerprintError, LibraryError, SourceError};
pub use fingerprint::{FingerprintHasher, hash_tuple};
pub use index::{FingerprintIndex, IndexBuilder};
pub use models::{Candidate, FuzzFactor, Identified, ItemId, PeakTuple, PostingEntry};
pub use registry::Registry;
pub use sample::{SampleIndexer, SamplePostings};
pub use source::{JsonPeakSource, PeakTupleSource};
pub use storage::Database;
