//! Common test utilities for pvr-extract integration tests

#[allow(dead_code)]
pub mod assertions;
#[allow(dead_code)]
pub mod host;
#[allow(dead_code)]
pub mod tools;

#[allow(unused_imports)]
pub use assertions::*;
pub use host::*;
#[allow(unused_imports)]
pub use tools::*;
