//! Record normalization
//!
//! Backend payloads for the same resource come in several shapes (renamed
//! keys, nested relations, pagination envelopes). An [`AliasTable`] declares,
//! per canonical field, the ordered source keys to try; [`normalize`] and
//! [`normalize_all`] turn raw JSON into [`CanonicalRecord`](crate::model::CanonicalRecord)s.

mod alias;
mod derive;
mod normalizer;
pub mod presets;

pub use alias::*;
pub use derive::*;
pub use normalizer::*;
