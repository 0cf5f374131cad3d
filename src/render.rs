//! Issuing draw calls for the chunk batches in view.
//!
//! The renderer walks every chunk key of a [`ViewRange`] and draws the batch
//! stored under it. Missing batches are normal (empty or never populated
//! space) and are skipped. Draws are independent and depth tested, so the walk
//! order does not matter.

use crate::{
    batch::{BatchTable, ChunkBatch, GpuBackend},
    view::ViewRange,
};

/// Something chunk batches can be drawn into, e.g. a `wgpu::RenderPass`.
pub trait DrawBatch<B: GpuBackend> {
    fn draw_batch(&mut self, batch: &ChunkBatch<B>);
}

/// Draws every batch inside `range` and returns the number of draw calls.
pub fn draw_visible<B, T>(target: &mut T, batches: &BatchTable<B>, range: &ViewRange) -> usize
where
    B: GpuBackend,
    T: DrawBatch<B> + ?Sized,
{
    let mut draws = 0;
    for key in range.keys() {
        if let Some(batch) = batches.get(key) {
            target.draw_batch(batch);
            draws += 1;
        }
    }
    log::trace!("{} chunk draws out of {} chunks in view", draws, range.len());
    draws
}
