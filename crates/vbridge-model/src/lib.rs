//! Domain and wire types shared by the bridge crates.
//!
//! Nothing in here performs I/O: these are the values that travel between the
//! HTTP surface, the correlation core and the external worker.

mod domain;
pub use domain::*;
