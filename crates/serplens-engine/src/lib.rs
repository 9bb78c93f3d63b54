//! Audit orchestration: runs provider calls under a deadline, extracts
//! structured payloads from assistant replies, and persists finished
//! generations to the growth archive.

mod archive;
mod assistant;
mod audit;
mod extract;

pub use archive::{ArchiveError, GrowthArchive};
pub use assistant::{send_turn, AssistantError};
pub use audit::{run_audit, AuditError, AuditInput, UploadedDocument};
pub use extract::{extract_reply, ExtractedReply};
