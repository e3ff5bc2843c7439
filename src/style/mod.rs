//! Shared styling helpers: colors, universal background/fill/stroke resolution, bounds and
//! themes. Everything here is a pure function of its inputs.

pub(crate) mod background;
pub(crate) mod bounds;
pub(crate) mod color;
pub(crate) mod paint;
pub(crate) mod theme;
