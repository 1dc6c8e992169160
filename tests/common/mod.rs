//! Shared helpers for the lutwatch integration tests.
//!
//! Every test binary includes this module separately; helpers one binary
//! does not use would otherwise warn.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod fixtures;
pub mod stubs;
pub mod workspace;

pub use assertions::*;
pub use stubs::{FailingMetadata, FlakyCodec, PartialWriteCodec};
pub use workspace::TestWorkspace;
