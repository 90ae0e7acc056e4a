use bytemuck::Pod;

use crate::device::{Device, DrawError, GeometryId, Primitive, SharedDevice};
use crate::frame::FrameContext;

use super::error::GeometryError;
use super::layout::VertexLayout;

/// Vertex storage, optional index storage and their attribute layout, uploaded once.
///
/// Released from the device on drop.
pub struct GeometryBuffer<D: Device> {
    device: SharedDevice<D>,
    id: GeometryId,
    layout: VertexLayout,
    vertex_count: u32,
    index_count: Option<u32>,
}

impl<D: Device> GeometryBuffer<D> {
    /// Validates and uploads `vertices` (and `indices`), attaching `layout`.
    pub fn create<V: Pod>(
        device: &SharedDevice<D>,
        vertices: &[V],
        indices: Option<&[u32]>,
        layout: VertexLayout,
    ) -> Result<Self, GeometryError> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if bytes.is_empty() {
            return Err(GeometryError::NoVertices);
        }
        let stride = layout.stride();
        if bytes.len() % stride as usize != 0 {
            return Err(GeometryError::PartialVertex {
                bytes: bytes.len(),
                stride,
            });
        }
        let vertex_count = (bytes.len() / stride as usize) as u32;

        if let Some(indices) = indices {
            if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count) {
                return Err(GeometryError::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
        }

        let id = device.borrow_mut().create_geometry(bytes, indices, &layout);
        log::debug!(
            "created {id}: {vertex_count} vertices, {} indices, stride {stride}",
            indices.map_or(0, <[u32]>::len)
        );

        Ok(Self {
            device: device.clone(),
            id,
            layout,
            vertex_count,
            index_count: indices.map(|i| i.len() as u32),
        })
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> Option<u32> {
        self.index_count
    }

    /// Makes this geometry the source of subsequent draws. Rebinding within a frame is
    /// free.
    pub fn bind(&self, frame: &mut FrameContext) {
        if frame.set_geometry(self.id) {
            self.device.borrow_mut().bind_geometry(self.id);
        }
    }

    /// Draws `count` vertices in storage order.
    pub fn draw_arrays(
        &self,
        frame: &FrameContext,
        primitive: Primitive,
        count: u32,
    ) -> Result<(), DrawError> {
        frame.check_draw(self.id, &self.layout)?;
        if count > self.vertex_count {
            return Err(DrawError::CountOutOfRange {
                count,
                available: self.vertex_count,
            });
        }
        self.device.borrow_mut().draw_arrays(primitive, 0, count)
    }

    /// Draws the first `count` indices.
    pub fn draw_indexed(
        &self,
        frame: &FrameContext,
        primitive: Primitive,
        count: u32,
    ) -> Result<(), DrawError> {
        frame.check_draw(self.id, &self.layout)?;
        let available = self.index_count.ok_or(DrawError::NoIndexBuffer)?;
        if count > available {
            return Err(DrawError::CountOutOfRange { count, available });
        }
        self.device.borrow_mut().draw_indexed(primitive, count)
    }
}

impl<D: Device> Drop for GeometryBuffer<D> {
    fn drop(&mut self) {
        match self.device.try_borrow_mut() {
            Ok(mut device) => {
                device.delete_geometry(self.id);
                log::debug!("released {}", self.id);
            }
            Err(_) => log::error!("device busy, leaking {}", self.id),
        }
    }
}

impl<D: Device> std::fmt::Debug for GeometryBuffer<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryBuffer")
            .field("id", &self.id)
            .field("vertex_count", &self.vertex_count)
            .field("index_count", &self.index_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, ProgramInterface, RecordingDevice, share};
    use crate::geometry::{LayoutError, VertexAttribute};
    use crate::shader::ShaderProgram;

    const TRIANGLE: [[f32; 3]; 3] = [[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]];

    fn position_only() -> VertexLayout {
        VertexLayout::packed_f32(&[3]).unwrap()
    }

    fn device_reading(inputs: Vec<u32>) -> SharedDevice<RecordingDevice> {
        share(RecordingDevice::new().with_interface(ProgramInterface {
            inputs,
            ..ProgramInterface::default()
        }))
    }

    fn program(device: &SharedDevice<RecordingDevice>) -> ShaderProgram<RecordingDevice> {
        ShaderProgram::from_sources(device, "vs", "fs").unwrap()
    }

    // ── creation ─────────────────────────────────────────────────────────

    #[test]
    fn counts_vertices_from_stride() {
        let device = device_reading(vec![0]);
        let geo = GeometryBuffer::create(&device, &TRIANGLE, None, position_only()).unwrap();
        assert_eq!(geo.vertex_count(), 3);
        assert_eq!(geo.index_count(), None);
    }

    #[test]
    fn rejects_partial_vertex() {
        let device = device_reading(vec![0]);
        let data = [0.0f32; 7];
        let err = GeometryBuffer::create(&device, &data, None, position_only()).unwrap_err();
        assert_eq!(err, GeometryError::PartialVertex { bytes: 28, stride: 12 });
    }

    #[test]
    fn rejects_out_of_range_index() {
        let device = device_reading(vec![0]);
        let err = GeometryBuffer::create(&device, &TRIANGLE, Some(&[0, 1, 3]), position_only())
            .unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
        assert!(device.borrow().calls().is_empty());
    }

    #[test]
    fn rejects_empty_vertices() {
        let device = device_reading(vec![0]);
        let data: [f32; 0] = [];
        let err = GeometryBuffer::create(&device, &data, None, position_only()).unwrap_err();
        assert_eq!(err, GeometryError::NoVertices);
    }

    #[test]
    fn layout_errors_convert() {
        let err: GeometryError = VertexLayout::new([VertexAttribute::float(0, 4, 12, 0)])
            .map_err(GeometryError::from)
            .unwrap_err();
        assert!(matches!(err, GeometryError::Layout(LayoutError::OutOfStride { .. })));
    }

    // ── binding and drawing ──────────────────────────────────────────────

    #[test]
    fn double_bind_records_same_calls_as_single_bind() {
        let run = |binds: usize| {
            let device = device_reading(vec![0]);
            let program = program(&device);
            let geo = GeometryBuffer::create(&device, &TRIANGLE, None, position_only()).unwrap();
            let mut frame = FrameContext::new();
            device.borrow_mut().clear_calls();

            program.use_program(&mut frame);
            for _ in 0..binds {
                geo.bind(&mut frame);
            }
            geo.draw_arrays(&frame, Primitive::Triangles, 3).unwrap();
            let calls = device.borrow().calls().to_vec();
            calls
        };
        assert_eq!(run(1), run(2));
    }

    #[test]
    fn draw_without_program_is_an_error() {
        let device = device_reading(vec![0]);
        let geo = GeometryBuffer::create(&device, &TRIANGLE, None, position_only()).unwrap();
        let mut frame = FrameContext::new();
        geo.bind(&mut frame);
        assert_eq!(
            geo.draw_arrays(&frame, Primitive::Triangles, 3),
            Err(DrawError::NoProgram)
        );
    }

    #[test]
    fn draw_requires_this_geometry_bound() {
        let device = device_reading(vec![0]);
        let program = program(&device);
        let a = GeometryBuffer::create(&device, &TRIANGLE, None, position_only()).unwrap();
        let b = GeometryBuffer::create(&device, &TRIANGLE, None, position_only()).unwrap();
        let mut frame = FrameContext::new();
        program.use_program(&mut frame);
        a.bind(&mut frame);
        assert_eq!(
            b.draw_arrays(&frame, Primitive::Triangles, 3),
            Err(DrawError::GeometryNotBound {
                bound: a.id(),
                requested: b.id()
            })
        );
    }

    #[test]
    fn indexed_draw_without_indices() {
        let device = device_reading(vec![0]);
        let program = program(&device);
        let geo = GeometryBuffer::create(&device, &TRIANGLE, None, position_only()).unwrap();
        let mut frame = FrameContext::new();
        program.use_program(&mut frame);
        geo.bind(&mut frame);
        assert_eq!(
            geo.draw_indexed(&frame, Primitive::Triangles, 3),
            Err(DrawError::NoIndexBuffer)
        );
    }

    #[test]
    fn count_past_end_is_rejected() {
        let device = device_reading(vec![0]);
        let program = program(&device);
        let geo =
            GeometryBuffer::create(&device, &TRIANGLE, Some(&[0, 1, 2]), position_only()).unwrap();
        let mut frame = FrameContext::new();
        program.use_program(&mut frame);
        geo.bind(&mut frame);
        assert_eq!(
            geo.draw_indexed(&frame, Primitive::Triangles, 6),
            Err(DrawError::CountOutOfRange {
                count: 6,
                available: 3
            })
        );
        assert_eq!(
            geo.draw_arrays(&frame, Primitive::Points, 4),
            Err(DrawError::CountOutOfRange {
                count: 4,
                available: 3
            })
        );
    }

    #[test]
    fn layout_must_cover_program_inputs() {
        let device = device_reading(vec![0, 1]);
        let program = program(&device);
        let geo = GeometryBuffer::create(&device, &TRIANGLE, None, position_only()).unwrap();
        let mut frame = FrameContext::new();
        program.use_program(&mut frame);
        geo.bind(&mut frame);
        assert_eq!(
            geo.draw_arrays(&frame, Primitive::Triangles, 3),
            Err(DrawError::MissingAttributes(vec![1]))
        );
    }

    // ── release ──────────────────────────────────────────────────────────

    #[test]
    fn drop_deletes_device_geometry() {
        let device = device_reading(vec![0]);
        let geo = GeometryBuffer::create(&device, &TRIANGLE, None, position_only()).unwrap();
        let id = geo.id();
        drop(geo);
        assert_eq!(
            device.borrow().calls().last(),
            Some(&DeviceCall::DeleteGeometry(id))
        );
    }
}
