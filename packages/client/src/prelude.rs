//! httpfs prelude
//!
//! The types a driver or façade needs to construct operations, drive them
//! and consume their results.

// Operations and their payloads
pub use crate::operations::{
    ChunkInfo, Configured, DirectoryListing, HttpOperation, ListdirKind, ListdirOperation,
    OpenKind, OpenOperation, Operation, OperationKind, PageInfo, PageReadKind, PageReadOperation,
    Pending, Phase, Progress, ReadKind, ReadOperation, StatFlags, StatInfo, StatKind,
    StatOperation, StatTarget, Step,
};

// Error types
pub use crate::error::{Error, ErrorClass, ErrorCode, Kind, Result, Subcode};

// Configuration and shared collaborators
pub use crate::config::{ClientCertConfig, OperationConfig, OperationContext};

// Seams implemented by the driver
pub use crate::broker::{BrokerConnector, BrokerError, BrokerSession};
pub use crate::transport::{ConnectMode, RequestMethod, Transport, TransportError};

// Caller-side state
pub use crate::cache::{DirectorCache, MirrorCache};
pub use crate::file::{FileHandle, FileProperty};
pub use crate::webdav::DavEntry;

// Telemetry types
pub use crate::telemetry::{OperationStats, OperationStatsSnapshot};

// URL handling
pub use url::Url;
