// Library root: re-exports all modules so integration tests and the CLI can
// reach the crate's public API.

pub mod batting;
pub mod bowling;
pub mod config;
pub mod estimator;
pub mod index;
pub mod loader;
pub mod model;
pub mod phase;
pub mod pipeline;
pub mod writer;
