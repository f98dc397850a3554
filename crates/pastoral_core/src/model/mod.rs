//! Persisted domain model for pastoral care cases.
//!
//! # Responsibility
//! - Define the canonical wire shape of the whole stored document.
//! - Keep reference fields (`studentId`, `advisorId`, `ownerId`) as plain ids;
//!   joins happen at decoration time, never at load time.
//!
//! # Invariants
//! - The `Document` exclusively owns every entity collection.
//! - Timeline entries and intake records are append-only once created.
//!
//! # See also
//! - `service::decorator` for the read model built on top of these types.

pub mod case;
pub mod document;
pub mod due;

use uuid::Uuid;

const GENERATED_ID_HEX_CHARS: usize = 10;

/// Generates a short, prefixed identifier such as `tl-3f9a1c0b2e`.
pub(crate) fn generate_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &hex[..GENERATED_ID_HEX_CHARS])
}
