pub mod admin;
pub mod common;
pub mod event;
pub mod participant;
pub mod winner;

pub use admin::*;
pub use common::*;
pub use event::*;
pub use participant::*;
pub use winner::*;
