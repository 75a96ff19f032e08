pub mod connection;
pub mod transaction;

#[cfg(test)]
pub mod test_support;

pub use connection::*;
pub use transaction::*;
