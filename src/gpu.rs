//! `wgpu` implementation of the batching backend.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::{
    batch::{ChunkBatch, GpuBackend},
    error::{EngineError, Result},
    render::DrawBatch,
};

/// Draw object of a chunk batch. The vertex layout itself lives in the batch
/// pipeline (see [`crate::pipelines::basic::mk_batch_pipeline`]).
#[derive(Clone, Debug)]
pub struct BatchDraw {
    pub label: String,
    pub vertices: Range<u32>,
}

impl GpuBackend for wgpu::Device {
    type Buffer = wgpu::Buffer;
    type DrawObject = BatchDraw;

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> Result<wgpu::Buffer> {
        let max = self.limits().max_buffer_size;
        if contents.len() as u64 > max {
            return Err(EngineError::GpuAllocation {
                label: label.to_string(),
                reason: format!(
                    "{} bytes exceed the device limit of {} bytes",
                    contents.len(),
                    max
                ),
            });
        }
        Ok(self.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        }))
    }

    fn create_draw_object(
        &self,
        label: &str,
        buffer: &wgpu::Buffer,
        vertex_count: u32,
    ) -> Result<BatchDraw> {
        let stride = std::mem::size_of::<crate::data_structures::instance::BatchVertex>() as u64;
        if buffer.size() < stride * u64::from(vertex_count) {
            return Err(EngineError::GpuAllocation {
                label: label.to_string(),
                reason: format!(
                    "buffer of {} bytes cannot hold {} vertices",
                    buffer.size(),
                    vertex_count
                ),
            });
        }
        Ok(BatchDraw {
            label: label.to_string(),
            vertices: 0..vertex_count,
        })
    }

    fn release_buffer(&self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    fn release_draw_object(&self, _draw: BatchDraw) {}
}

impl<'pass> DrawBatch<wgpu::Device> for wgpu::RenderPass<'pass> {
    fn draw_batch(&mut self, batch: &ChunkBatch<wgpu::Device>) {
        self.set_vertex_buffer(0, batch.buffer.slice(..));
        self.draw(batch.draw.vertices.clone(), 0..1);
    }
}
