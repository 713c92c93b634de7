//! Canonical records

mod id;
mod kind;
mod record;
mod value;

pub use id::*;
pub use kind::*;
pub use record::*;
pub use value::*;
