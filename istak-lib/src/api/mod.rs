//! Remote resource operations

mod http;
mod multipart;
mod mutation;
mod resource;

pub use multipart::*;
pub use mutation::*;
pub use resource::*;

pub(crate) use mutation::classify;
