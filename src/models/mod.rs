pub mod comment;
pub mod user;
pub mod vote;

pub use comment::*;
pub use user::*;
pub use vote::*;
