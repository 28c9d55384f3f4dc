//! Per-concern transformers used by both conversion directions.
//!
//! Each transformer is stateless (or holds only configuration) and returns
//! an [`Outcome`](crate::model::Outcome) instead of writing into a shared
//! diagnostics sink.

pub mod entity;
pub mod fields;
pub mod hash;
pub mod identifiers;
pub mod license;
pub mod party;
pub mod relationships;

pub use entity::{EntityKind, EntityTransformer};
pub use fields::{FieldError, FieldMapping, FieldTable, FieldTransform};
pub use hash::HashAlgorithmTransformer;
pub use identifiers::{IdentifierTransformer, SPDX_DOCUMENT_ID, SPDX_REF_PREFIX};
pub use license::LicenseTransformer;
pub use relationships::{Adjacency, RelationshipGraphTransformer};
