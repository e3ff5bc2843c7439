//! The template contract, template sources and the registry that resolves ids to templates.

pub(crate) mod contract;
pub(crate) mod registry;
pub(crate) mod source;
