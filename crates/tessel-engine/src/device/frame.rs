/// A surface texture acquired for one frame, with the encoder recording into it.
///
/// Must be handed back to [`Gpu::submit`](super::Gpu::submit) before the next
/// acquisition; an unreturned surface texture blocks the swapchain.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
