#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

//! The outfit analysis pipeline: resolve a photo reference to image
//! data, run label detection, derive the style narrative, build one
//! deduplicated record per (user, canonical photo URL), and aggregate
//! stored records into stats and recommendations.

mod error;
mod orchestrator;
mod record;
mod resolver;
mod stats;

pub use error::AnalysisError;
pub use orchestrator::*;
pub use record::{build_outfit_record, canonical_photo_url, compute_doc_id, stable_photo_key};
pub use resolver::ImageResolver;
pub use stats::*;
