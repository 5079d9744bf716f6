//! Agents
//!
//! - **Query Router**: answers chat messages from local rules, falling back
//!   to the cloud client for anything it can't handle
//! - **File Upload Agent**: turns uploaded CSV/JSON files into datasets
//!
//! ```text
//! User Message
//!      │
//!      ▼
//! ┌─────────────┐   rule 1-5
//! │ Query Router│ ───────────▶ local answer
//! └─────────────┘
//!      │ rule 6-7
//!      ▼
//! ┌─────────────┐   failure / not configured
//! │Cloud Client │ ───────────▶ local fallback + hint
//! └─────────────┘
//!      │
//!      ▼
//!  cloud answer
//! ```

pub mod file_upload;
pub mod router;

pub use file_upload::FileUploadAgent;
pub use router::{LocalDecision, QueryRouter, RouterReply, CLOUD_HINT};
