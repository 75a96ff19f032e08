pub mod jwt;
pub mod password;
pub mod random;
pub mod validation;

pub use jwt::*;
pub use password::*;
pub use random::{OsSecureRandom, SecureRandom};
pub use validation::*;
