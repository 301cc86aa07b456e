//! Checkpoint 5: the textured quad under a perspective camera, spinning,
//! drawn with multisampling and depth testing.

use crate::core::Texture;
use crate::math::{Mat4, Vec2, Vec3};
use objc2::msg_send;
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_core_foundation::CGSize;
use objc2_foundation::NSString;
use objc2_metal::{
    MTLBuffer, MTLClearColor, MTLCommandBuffer, MTLCommandEncoder, MTLCommandQueue,
    MTLCompileOptions, MTLCreateSystemDefaultDevice, MTLDepthStencilDescriptor,
    MTLDepthStencilState, MTLDevice, MTLDrawable, MTLIndexType, MTLLibrary, MTLLoadAction,
    MTLPixelFormat, MTLPrimitiveType, MTLRenderCommandEncoder, MTLRenderPassDescriptor,
    MTLRenderPipelineDescriptor, MTLRenderPipelineState, MTLResourceOptions, MTLSamplerDescriptor,
    MTLSamplerMinMagFilter, MTLSamplerState, MTLStorageMode, MTLStoreAction, MTLTexture,
    MTLTextureDescriptor, MTLTextureType, MTLTextureUsage, MTLVertexDescriptor,
};
use objc2_quartz_core::{CAMetalDrawable, CAMetalLayer};
use winit::raw_window_handle::RawWindowHandle;

/// Sample count for the multisampled color and depth targets.
pub const MSAA_SAMPLE_COUNT: usize = 4;

#[repr(C)]
struct Uniforms {
    mvp_matrix: Mat4,
}

/// Vertex record shared by the quad checkpoints: position plus a
/// texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
}

/// The same square as the previous checkpoint, now living in model
/// space and transformed by the uniform matrix each frame.
#[must_use]
pub fn quad_vertices() -> [Vertex; 4] {
    [
        Vertex {
            position: Vec3::new(-0.5, -0.5, 0.0),
            uv: Vec2::new(0.0, 1.0),
        },
        Vertex {
            position: Vec3::new(0.5, -0.5, 0.0),
            uv: Vec2::new(1.0, 1.0),
        },
        Vertex {
            position: Vec3::new(0.5, 0.5, 0.0),
            uv: Vec2::new(1.0, 0.0),
        },
        Vertex {
            position: Vec3::new(-0.5, 0.5, 0.0),
            uv: Vec2::new(0.0, 0.0),
        },
    ]
}

/// Two triangles covering the square, counter-clockwise.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Model-view-projection matrix for the quad at `time` seconds.
///
/// The camera sits on the positive Z axis looking at the origin while
/// the quad tumbles around its own Y and Z axes.
#[must_use]
pub fn mvp_matrix(aspect_ratio: f32, time: f32) -> Mat4 {
    let projection = Mat4::perspective(std::f32::consts::FRAC_PI_4, aspect_ratio, 0.1, 100.0);
    let view = Mat4::look_at(
        &Vec3::new(0.0, 0.0, 2.5),
        &Vec3::zero(),
        &Vec3::new(0.0, 1.0, 0.0),
    );
    let model = Mat4::rotation_y(time).multiply(&Mat4::rotation_z(time * 0.5));

    projection.multiply(&view).multiply(&model)
}

/// Checkpoint 5: renders the textured quad into a 4x multisampled
/// color target with depth testing, resolving into the drawable.
pub struct SpinningQuadRenderer {
    device: Retained<ProtocolObject<dyn MTLDevice>>,
    command_queue: Retained<ProtocolObject<dyn MTLCommandQueue>>,
    layer: Retained<CAMetalLayer>,
    pipeline_state: Retained<ProtocolObject<dyn MTLRenderPipelineState>>,
    depth_stencil_state: Retained<ProtocolObject<dyn MTLDepthStencilState>>,
    vertex_buffer: Retained<ProtocolObject<dyn MTLBuffer>>,
    index_buffer: Retained<ProtocolObject<dyn MTLBuffer>>,
    uniform_buffer: Retained<ProtocolObject<dyn MTLBuffer>>,
    msaa_texture: Retained<ProtocolObject<dyn MTLTexture>>,
    depth_texture: Retained<ProtocolObject<dyn MTLTexture>>,
    texture: Texture,
    sampler_state: Retained<ProtocolObject<dyn MTLSamplerState>>,
    drawable_size: (u32, u32),
    time: f32,
}

impl SpinningQuadRenderer {
    pub fn new(
        window_handle: RawWindowHandle,
        width: u32,
        height: u32,
        texture_path: &str,
    ) -> Result<Self, String> {
        let device = MTLCreateSystemDefaultDevice()
            .ok_or_else(|| "Failed to get default Metal device".to_string())?;

        let command_queue = device
            .newCommandQueue()
            .ok_or_else(|| "Failed to create command queue".to_string())?;

        let layer = Self::create_metal_layer(&device, window_handle)?;

        let vertex_buffer = Self::create_vertex_buffer(&device)?;
        let index_buffer = Self::create_index_buffer(&device)?;
        let uniform_buffer = Self::create_uniform_buffer(&device)?;

        let pipeline_state = Self::create_pipeline_state(&device)?;
        let depth_stencil_state = Self::create_depth_stencil_state(&device)?;
        let msaa_texture = Self::create_msaa_color_texture(&device, width, height)?;
        let depth_texture = Self::create_depth_texture(&device, width, height)?;

        let texture = Texture::load(&device, texture_path)?;
        let sampler_state = Self::create_sampler_state(&device)?;

        Ok(Self {
            device,
            command_queue,
            layer,
            pipeline_state,
            depth_stencil_state,
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            msaa_texture,
            depth_texture,
            texture,
            sampler_state,
            drawable_size: (width, height),
            time: 0.0,
        })
    }

    fn create_metal_layer(
        device: &ProtocolObject<dyn MTLDevice>,
        window_handle: RawWindowHandle,
    ) -> Result<Retained<CAMetalLayer>, String> {
        let layer = unsafe { CAMetalLayer::new() };

        unsafe {
            layer.setDevice(Some(device));
            layer.setPixelFormat(MTLPixelFormat::BGRA8Unorm);
            layer.setOpaque(true);
        }

        match window_handle {
            RawWindowHandle::AppKit(handle) => unsafe {
                use objc2::runtime::AnyObject;

                let view = handle.ns_view.as_ptr().cast::<AnyObject>();
                let _: () = msg_send![view, setWantsLayer: true];
                let _: () = msg_send![view, setLayer: &*layer];
            },
            _ => return Err("Unsupported window handle type".to_string()),
        }

        Ok(layer)
    }

    fn create_vertex_buffer(
        device: &ProtocolObject<dyn MTLDevice>,
    ) -> Result<Retained<ProtocolObject<dyn MTLBuffer>>, String> {
        let vertices = quad_vertices();

        let vertex_data = vertices.as_ptr().cast::<std::ffi::c_void>();
        let vertex_data_size = std::mem::size_of_val(&vertices);

        let data_ptr = std::ptr::NonNull::new(vertex_data.cast_mut())
            .ok_or_else(|| "Failed to create NonNull pointer for vertex data".to_string())?;

        let buffer = unsafe {
            device.newBufferWithBytes_length_options(
                data_ptr,
                vertex_data_size,
                MTLResourceOptions::CPUCacheModeDefaultCache,
            )
        }
        .ok_or_else(|| "Failed to create vertex buffer".to_string())?;

        Ok(buffer)
    }

    fn create_index_buffer(
        device: &ProtocolObject<dyn MTLDevice>,
    ) -> Result<Retained<ProtocolObject<dyn MTLBuffer>>, String> {
        let index_data = QUAD_INDICES.as_ptr().cast::<std::ffi::c_void>();
        let index_data_size = std::mem::size_of_val(&QUAD_INDICES);

        let data_ptr = std::ptr::NonNull::new(index_data.cast_mut())
            .ok_or_else(|| "Failed to create NonNull pointer for index data".to_string())?;

        let buffer = unsafe {
            device.newBufferWithBytes_length_options(
                data_ptr,
                index_data_size,
                MTLResourceOptions::CPUCacheModeDefaultCache,
            )
        }
        .ok_or_else(|| "Failed to create index buffer".to_string())?;

        Ok(buffer)
    }

    fn create_uniform_buffer(
        device: &ProtocolObject<dyn MTLDevice>,
    ) -> Result<Retained<ProtocolObject<dyn MTLBuffer>>, String> {
        let buffer_size = std::mem::size_of::<Uniforms>();

        let buffer = device
            .newBufferWithLength_options(buffer_size, MTLResourceOptions::CPUCacheModeDefaultCache)
            .ok_or_else(|| "Failed to create uniform buffer".to_string())?;

        Ok(buffer)
    }

    fn create_pipeline_state(
        device: &ProtocolObject<dyn MTLDevice>,
    ) -> Result<Retained<ProtocolObject<dyn MTLRenderPipelineState>>, String> {
        let shader_source = include_str!("../shaders/spinning_quad.metal");
        let source_string = NSString::from_str(shader_source);
        let compile_options = MTLCompileOptions::new();

        let library = device
            .newLibraryWithSource_options_error(&source_string, Some(&compile_options))
            .map_err(|e| format!("Failed to compile shaders: {e:?}"))?;

        let vertex_fn_name = NSString::from_str("spinning_quad_vertex");
        let vertex_function = library
            .newFunctionWithName(&vertex_fn_name)
            .ok_or_else(|| "Failed to find vertex function".to_string())?;

        let fragment_fn_name = NSString::from_str("spinning_quad_fragment");
        let fragment_function = library
            .newFunctionWithName(&fragment_fn_name)
            .ok_or_else(|| "Failed to find fragment function".to_string())?;

        let vertex_descriptor = unsafe { MTLVertexDescriptor::new() };
        unsafe {
            let position_attr = vertex_descriptor.attributes().objectAtIndexedSubscript(0);
            position_attr.setFormat(objc2_metal::MTLVertexFormat::Float3);
            position_attr.setOffset(0);
            position_attr.setBufferIndex(0);

            let uv_attr = vertex_descriptor.attributes().objectAtIndexedSubscript(1);
            uv_attr.setFormat(objc2_metal::MTLVertexFormat::Float2);
            uv_attr.setOffset(std::mem::offset_of!(Vertex, uv));
            uv_attr.setBufferIndex(0);

            let layout = vertex_descriptor.layouts().objectAtIndexedSubscript(0);
            layout.setStride(std::mem::size_of::<Vertex>());
        }

        let pipeline_descriptor = MTLRenderPipelineDescriptor::new();
        unsafe {
            pipeline_descriptor.setVertexFunction(Some(&vertex_function));
            pipeline_descriptor.setFragmentFunction(Some(&fragment_function));
            pipeline_descriptor.setVertexDescriptor(Some(&vertex_descriptor));
            pipeline_descriptor.setDepthAttachmentPixelFormat(MTLPixelFormat::Depth32Float);
            pipeline_descriptor.setRasterSampleCount(MSAA_SAMPLE_COUNT);

            let color_attachment = pipeline_descriptor
                .colorAttachments()
                .objectAtIndexedSubscript(0);
            color_attachment.setPixelFormat(MTLPixelFormat::BGRA8Unorm);
        }

        let pipeline_state = device
            .newRenderPipelineStateWithDescriptor_error(&pipeline_descriptor)
            .map_err(|e| format!("Failed to create pipeline state: {e:?}"))?;

        Ok(pipeline_state)
    }

    fn create_depth_stencil_state(
        device: &ProtocolObject<dyn MTLDevice>,
    ) -> Result<Retained<ProtocolObject<dyn MTLDepthStencilState>>, String> {
        let descriptor = unsafe { MTLDepthStencilDescriptor::new() };
        descriptor.setDepthCompareFunction(objc2_metal::MTLCompareFunction::Less);
        descriptor.setDepthWriteEnabled(true);

        let state = device
            .newDepthStencilStateWithDescriptor(&descriptor)
            .ok_or_else(|| "Failed to create depth stencil state".to_string())?;

        Ok(state)
    }

    fn create_msaa_color_texture(
        device: &ProtocolObject<dyn MTLDevice>,
        width: u32,
        height: u32,
    ) -> Result<Retained<ProtocolObject<dyn MTLTexture>>, String> {
        let descriptor = unsafe { MTLTextureDescriptor::new() };
        descriptor.setTextureType(MTLTextureType::Type2DMultisample);
        descriptor.setPixelFormat(MTLPixelFormat::BGRA8Unorm);
        unsafe {
            descriptor.setWidth(width as usize);
            descriptor.setHeight(height as usize);
            descriptor.setSampleCount(MSAA_SAMPLE_COUNT);
        }
        // Multisampled targets are GPU-only.
        descriptor.setStorageMode(MTLStorageMode::Private);
        descriptor.setUsage(MTLTextureUsage::RenderTarget);

        let texture = device
            .newTextureWithDescriptor(&descriptor)
            .ok_or_else(|| "Failed to create MSAA color texture".to_string())?;

        Ok(texture)
    }

    fn create_depth_texture(
        device: &ProtocolObject<dyn MTLDevice>,
        width: u32,
        height: u32,
    ) -> Result<Retained<ProtocolObject<dyn MTLTexture>>, String> {
        let descriptor = unsafe { MTLTextureDescriptor::new() };
        descriptor.setTextureType(MTLTextureType::Type2DMultisample);
        descriptor.setPixelFormat(MTLPixelFormat::Depth32Float);
        unsafe {
            descriptor.setWidth(width as usize);
            descriptor.setHeight(height as usize);
            descriptor.setSampleCount(MSAA_SAMPLE_COUNT);
        }
        descriptor.setStorageMode(MTLStorageMode::Private);
        descriptor.setUsage(MTLTextureUsage::RenderTarget);

        let texture = device
            .newTextureWithDescriptor(&descriptor)
            .ok_or_else(|| "Failed to create depth texture".to_string())?;

        Ok(texture)
    }

    fn create_sampler_state(
        device: &ProtocolObject<dyn MTLDevice>,
    ) -> Result<Retained<ProtocolObject<dyn MTLSamplerState>>, String> {
        let descriptor = MTLSamplerDescriptor::new();
        descriptor.setMinFilter(MTLSamplerMinMagFilter::Linear);
        descriptor.setMagFilter(MTLSamplerMinMagFilter::Linear);

        let sampler = device
            .newSamplerStateWithDescriptor(&descriptor)
            .ok_or_else(|| "Failed to create sampler state".to_string())?;

        Ok(sampler)
    }

    /// Advances the spin by `delta_time` seconds and draws one frame.
    pub fn render(&mut self, delta_time: f32) -> Result<(), String> {
        self.time += delta_time;

        let drawable = unsafe { self.layer.nextDrawable() }
            .ok_or_else(|| "Failed to get next drawable".to_string())?;

        let command_buffer = self
            .command_queue
            .commandBuffer()
            .ok_or_else(|| "Failed to create command buffer".to_string())?;

        let label = NSString::from_str("Spinning Quad Render Pass");
        command_buffer.setLabel(Some(&label));

        // Update uniforms
        let (width, height) = self.drawable_size;
        let aspect_ratio = width as f32 / height as f32;
        let uniforms = Uniforms {
            mvp_matrix: mvp_matrix(aspect_ratio, self.time),
        };
        unsafe {
            let contents = self.uniform_buffer.contents();
            std::ptr::copy_nonoverlapping(
                &raw const uniforms,
                contents.as_ptr().cast::<Uniforms>(),
                1,
            );
        }

        let render_pass_descriptor = unsafe { MTLRenderPassDescriptor::new() };
        let color_attachment = unsafe {
            render_pass_descriptor
                .colorAttachments()
                .objectAtIndexedSubscript(0)
        };

        // Render into the multisampled texture and resolve into the drawable.
        unsafe {
            color_attachment.setTexture(Some(&self.msaa_texture));
            color_attachment.setResolveTexture(Some(&drawable.texture()));
            color_attachment.setLoadAction(MTLLoadAction::Clear);
            color_attachment.setClearColor(MTLClearColor {
                red: 0.2,
                green: 0.3,
                blue: 0.4,
                alpha: 1.0,
            });
            color_attachment.setStoreAction(MTLStoreAction::MultisampleResolve);
        }

        let depth_attachment = render_pass_descriptor.depthAttachment();
        depth_attachment.setTexture(Some(&self.depth_texture));
        depth_attachment.setLoadAction(MTLLoadAction::Clear);
        depth_attachment.setClearDepth(1.0);
        depth_attachment.setStoreAction(MTLStoreAction::DontCare);

        if let Some(render_encoder) =
            command_buffer.renderCommandEncoderWithDescriptor(&render_pass_descriptor)
        {
            let label = NSString::from_str("Spinning Quad Encoder");
            render_encoder.setLabel(Some(&label));

            render_encoder.setRenderPipelineState(&self.pipeline_state);
            render_encoder.setDepthStencilState(Some(&self.depth_stencil_state));

            unsafe {
                render_encoder.setVertexBuffer_offset_atIndex(Some(&self.vertex_buffer), 0, 0);
                render_encoder.setVertexBuffer_offset_atIndex(Some(&self.uniform_buffer), 0, 1);

                render_encoder.setFragmentTexture_atIndex(Some(&self.texture.texture), 0);
                render_encoder.setFragmentSamplerState_atIndex(Some(&self.sampler_state), 0);

                render_encoder
                    .drawIndexedPrimitives_indexCount_indexType_indexBuffer_indexBufferOffset(
                        MTLPrimitiveType::Triangle,
                        QUAD_INDICES.len(),
                        MTLIndexType::UInt16,
                        &self.index_buffer,
                        0,
                    );
            }

            render_encoder.endEncoding();
        }

        unsafe {
            let mtl_drawable = (&raw const *drawable).cast::<ProtocolObject<dyn MTLDrawable>>();
            command_buffer.presentDrawable(&*mtl_drawable);
        }

        command_buffer.commit();

        Ok(())
    }

    pub fn update_drawable_size(&mut self, width: u32, height: u32) {
        self.drawable_size = (width, height);

        let size = CGSize {
            width: f64::from(width),
            height: f64::from(height),
        };
        unsafe {
            self.layer.setDrawableSize(size);
        }

        // The render targets must match the drawable size exactly.
        if let Ok(texture) = Self::create_msaa_color_texture(&self.device, width, height) {
            self.msaa_texture = texture;
        }
        if let Ok(texture) = Self::create_depth_texture(&self.device, width, height) {
            self.depth_texture = texture;
        }
    }
}
