#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
};

use chunk_ngin::{
    batch::{ChunkBatch, GpuBackend},
    data_structures::instance::BatchVertex,
    error::{EngineError, Result},
    render::DrawBatch,
};

pub(crate) struct RecordedBuffer {
    pub id: u64,
    pub label: String,
    pub bytes: Vec<u8>,
}

pub(crate) struct RecordedDraw {
    pub id: u64,
    pub buffer: u64,
    pub vertex_count: u32,
}

/// A GPU backend that keeps buffers in memory and counts every allocation.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    next_id: Cell<u64>,
    live_buffers: RefCell<HashSet<u64>>,
    live_draws: RefCell<HashSet<u64>>,
    created_buffers: Cell<usize>,
    released_buffers: Cell<usize>,
    failing: Cell<bool>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every following buffer allocation fails.
    pub fn fail_allocations(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn live_buffers(&self) -> usize {
        self.live_buffers.borrow().len()
    }

    pub fn live_draws(&self) -> usize {
        self.live_draws.borrow().len()
    }

    pub fn created_buffers(&self) -> usize {
        self.created_buffers.get()
    }

    pub fn released_buffers(&self) -> usize {
        self.released_buffers.get()
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl GpuBackend for RecordingBackend {
    type Buffer = RecordedBuffer;
    type DrawObject = RecordedDraw;

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> Result<RecordedBuffer> {
        if self.failing.get() {
            return Err(EngineError::GpuAllocation {
                label: label.to_string(),
                reason: "out of memory".to_string(),
            });
        }
        let id = self.next_id();
        self.live_buffers.borrow_mut().insert(id);
        self.created_buffers.set(self.created_buffers.get() + 1);
        Ok(RecordedBuffer {
            id,
            label: label.to_string(),
            bytes: contents.to_vec(),
        })
    }

    fn create_draw_object(
        &self,
        _label: &str,
        buffer: &RecordedBuffer,
        vertex_count: u32,
    ) -> Result<RecordedDraw> {
        let id = self.next_id();
        self.live_draws.borrow_mut().insert(id);
        Ok(RecordedDraw {
            id,
            buffer: buffer.id,
            vertex_count,
        })
    }

    fn release_buffer(&self, buffer: RecordedBuffer) {
        assert!(
            self.live_buffers.borrow_mut().remove(&buffer.id),
            "buffer {} released twice",
            buffer.id
        );
        self.released_buffers.set(self.released_buffers.get() + 1);
    }

    fn release_draw_object(&self, draw: RecordedDraw) {
        assert!(
            self.live_draws.borrow_mut().remove(&draw.id),
            "draw object {} released twice",
            draw.id
        );
    }
}

/// Records the buffer id and vertex count of every draw.
#[derive(Default)]
pub(crate) struct RecordingTarget {
    pub draws: Vec<(u64, u32)>,
}

impl DrawBatch<RecordingBackend> for RecordingTarget {
    fn draw_batch(&mut self, batch: &ChunkBatch<RecordingBackend>) {
        self.draws.push((batch.buffer.id, batch.vertex_count()));
    }
}

/// Decodes the rows uploaded for a batch.
pub(crate) fn uploaded_rows(batch: &ChunkBatch<RecordingBackend>) -> Vec<BatchVertex> {
    let stride = std::mem::size_of::<BatchVertex>();
    assert_eq!(batch.buffer.bytes.len() % stride, 0);
    batch
        .buffer
        .bytes
        .chunks_exact(stride)
        .map(bytemuck::pod_read_unaligned::<BatchVertex>)
        .collect()
}

pub(crate) fn v3(x: f32, y: f32, z: f32) -> cgmath::Vector3<f32> {
    cgmath::Vector3::new(x, y, z)
}

pub(crate) fn unit() -> cgmath::Vector3<f32> {
    v3(1.0, 1.0, 1.0)
}

pub(crate) fn zero() -> cgmath::Vector3<f32> {
    v3(0.0, 0.0, 0.0)
}
