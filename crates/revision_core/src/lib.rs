pub mod controller;
pub mod diff;
pub mod domain;
pub mod error;
pub mod history;
pub mod ports;

pub use controller::{accept, create_revision, reject, restore};
pub use diff::compute_diff;
pub use domain::{DiffSegment, Restored, Revision, RevisionId, SegmentKind};
pub use error::{RevisionError, RevisionResult};
pub use history::History;
pub use ports::{KeyValueStore, PortError, PortResult, RewriteService};
