pub mod comment;
pub mod issue;
pub mod summary;
pub mod user;

pub use comment::*;
pub use issue::*;
pub use summary::*;
pub use user::*;
