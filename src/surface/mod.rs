//! Drawing surfaces.
//!
//! Templates never paint pixels directly: they draw through a [`Painter`](painter::Painter),
//! which resolves canvas-style state into [`DrawCmd`](cmd::DrawCmd)s recorded in a
//! [`DisplayList`](display_list::DisplayList). A display list is replayed onto any
//! [`Surface`], such as the CPU [`RasterSurface`](raster::RasterSurface).

use crate::foundation::core::Canvas;
use crate::foundation::error::BrandwaveResult;
use crate::surface::cmd::DrawCmd;

pub(crate) mod cmd;
pub(crate) mod display_list;
pub(crate) mod font;
pub(crate) mod painter;
pub(crate) mod raster;

/// A target that executes drawing commands.
pub trait Surface {
    fn canvas(&self) -> Canvas;

    fn execute(&mut self, cmd: &DrawCmd) -> BrandwaveResult<()>;

    /// Advance width of `text` at `size` pixels per em.
    fn measure_text(&self, text: &str, size: f64) -> f64 {
        font::measure(text, size)
    }
}
