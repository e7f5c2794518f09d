//! muxsync - aligns independently produced media sources and muxes them
//!
//! The library exposes every pipeline stage for integration testing: job
//! loading, alignment, command synthesis, backend selection and merging.

pub mod config;
pub mod fonts;
pub mod job;
pub mod merger;
pub mod mux;
pub mod probe;
pub mod sync;
