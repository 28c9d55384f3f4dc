//! Data model shared by every transformer.
//!
//! Documents and entities stay as `serde_json` trees: the engine maps fields
//! it knows and reports the rest, so there is no fully typed SPDX or
//! `CycloneDX` representation here. What is typed are the pieces with real
//! semantics: the format discriminator, graph edges, and the diagnostics
//! that flow out of every transform.

mod diagnostics;
mod edges;
mod format;
mod result;

pub use diagnostics::{ConversionError, Diagnostics, ErrorCode, Origin, Outcome, Severity};
pub use edges::{DependencyEdge, RelationshipEdge};
pub use format::{Document, Entity, SbomFormat};
pub use result::{ConversionResult, ConversionSummary};
