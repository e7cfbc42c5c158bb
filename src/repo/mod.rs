pub mod project;
pub mod task;
pub mod service;
pub mod user;
pub mod current;
pub(crate) mod tags;

pub use project::*;
pub use task::*;
pub use service::*;
pub use user::*;
pub use current::*;
