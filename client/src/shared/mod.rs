pub mod errors;
pub mod formatting;
#[cfg(test)]
pub mod test_http;

pub use errors::*;
pub use formatting::*;
