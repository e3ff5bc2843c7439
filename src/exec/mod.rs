//! Request execution: the failure-containing sandbox, engine options, and the engine that
//! ties registry, sandbox and raster backend together.

pub(crate) mod engine;
pub(crate) mod opts;
pub(crate) mod sandbox;
