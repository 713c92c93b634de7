//! Session handling

mod guard;
mod session;
mod user;

pub use guard::*;
pub use session::*;
pub use user::*;
