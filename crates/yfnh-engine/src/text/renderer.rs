use std::collections::HashMap;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};
use wgpu::util::DeviceExt;

use crate::gfx::FontId;

use super::atlas::ShelfPacker;
use super::font_system::FontSystem;

// ── atlas constants ────────────────────────────────────────────────────────

const ATLAS_SIZE: u32 = 1024;
const GLYPH_PADDING: u32 = 1;

/// One queued string, already resolved to pixel space.
///
/// `text` indexes into the string buffer passed alongside the runs, so queuing
/// text never allocates once the buffer has grown to its working size.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GlyphRun {
    pub font: FontId,
    /// Top-left corner in pixels, y-down.
    pub origin: [f32; 2],
    pub size: f32,
    /// Premultiplied RGBA.
    pub color: [f32; 4],
    pub text: Range<usize>,
}

struct CachedGlyph {
    uv_min: [f32; 2],
    uv_max: [f32; 2],
}

/// Draws queued [`GlyphRun`]s as instanced quads sampled from an R8 atlas.
///
/// Glyphs are rasterized with fontdue on first use and cached for the
/// renderer's lifetime, keyed by font, glyph index and pixel size.
pub(crate) struct TextRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    viewport_ubo: wgpu::Buffer,

    atlas: wgpu::Texture,
    packer: ShelfPacker,
    glyph_cache: HashMap<GlyphRasterConfig, CachedGlyph>,

    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,

    // reused every frame
    instances: Vec<GlyphInstance>,
    positions: Vec<(GlyphRasterConfig, f32, f32, usize, usize)>,
    layout: Layout<()>,
}

impl TextRenderer {
    pub(crate) fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("yfnh text shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/text.wgsl").into()),
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("yfnh text bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("yfnh text pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("yfnh text pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), GlyphInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let atlas = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("yfnh text atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let atlas_view = atlas.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("yfnh text sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("yfnh text viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("yfnh text bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: viewport_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("yfnh text quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("yfnh text quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            pipeline,
            bind_group,
            viewport_ubo,
            atlas,
            packer: ShelfPacker::new(ATLAS_SIZE, GLYPH_PADDING),
            glyph_cache: HashMap::new(),
            quad_vbo,
            quad_ibo,
            instance_vbo: None,
            instance_capacity: 0,
            instances: Vec::new(),
            positions: Vec::new(),
            layout: Layout::new(CoordinateSystem::PositiveYDown),
        }
    }

    /// Lays out `runs`, uploads any new glyphs and draws them over `view`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        viewport: [f32; 2],
        fonts: &FontSystem,
        runs: &[GlyphRun],
        text: &str,
    ) {
        self.instances.clear();

        for run in runs {
            let Some(font) = fonts.get(run.font) else {
                log::warn!("TextRenderer: unknown FontId {:?}, skipping", run.font);
                continue;
            };
            let Some(s) = text.get(run.text.clone()) else {
                continue;
            };

            self.layout.reset(&LayoutSettings {
                x: run.origin[0],
                y: run.origin[1],
                ..LayoutSettings::default()
            });
            self.layout.append(&[font], &TextStyle::new(s, run.size, 0));

            self.positions.clear();
            self.positions.extend(
                self.layout
                    .glyphs()
                    .iter()
                    .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
                    .map(|g| (g.key, g.x, g.y, g.width, g.height)),
            );

            for i in 0..self.positions.len() {
                let (key, x, y, w, h) = self.positions[i];

                if !self.glyph_cache.contains_key(&key) {
                    let (metrics, bitmap) = font.rasterize_config(key);
                    if metrics.width == 0 || metrics.height == 0 {
                        continue;
                    }
                    let (bw, bh) = (metrics.width as u32, metrics.height as u32);
                    if let Some(entry) = self.upload_glyph(queue, &bitmap, bw, bh) {
                        self.glyph_cache.insert(key, entry);
                    }
                }

                let Some(cached) = self.glyph_cache.get(&key) else {
                    continue;
                };

                self.instances.push(GlyphInstance {
                    dst_min: [x, y],
                    dst_max: [x + w as f32, y + h as f32],
                    uv_min: cached.uv_min,
                    uv_max: cached.uv_max,
                    color: run.color,
                });
            }
        }

        if self.instances.is_empty() {
            return;
        }

        queue.write_buffer(
            &self.viewport_ubo,
            0,
            bytemuck::bytes_of(&ViewportUniform {
                viewport: [viewport[0].max(1.0), viewport[1].max(1.0)],
                _pad: [0.0; 2],
            }),
        );
        self.ensure_instance_capacity(device, self.instances.len());

        let Some(instance_vbo) = self.instance_vbo.as_ref() else {
            return;
        };
        queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&self.instances));

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("yfnh text pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..self.instances.len() as u32);
    }

    fn upload_glyph(
        &mut self,
        queue: &wgpu::Queue,
        bitmap: &[u8],
        w: u32,
        h: u32,
    ) -> Option<CachedGlyph> {
        let was_full = self.packer.is_full();
        let Some(origin) = self.packer.place(w, h) else {
            if !was_full {
                log::warn!(
                    "TextRenderer: glyph atlas is full ({ATLAS_SIZE}x{ATLAS_SIZE}); \
                     some glyphs will not be rendered"
                );
            }
            return None;
        };

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.atlas,
                mip_level: 0,
                origin: wgpu::Origin3d { x: origin.0, y: origin.1, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            bitmap,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );

        let (uv_min, uv_max) = self.packer.uv(origin, w, h);
        Some(CachedGlyph { uv_min, uv_max })
    }

    fn ensure_instance_capacity(&mut self, device: &wgpu::Device, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(64);
        self.instance_vbo = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("yfnh text instance vbo"),
            size: (new_cap * std::mem::size_of::<GlyphInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    viewport: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Instance data layout (48 bytes):
///
///  offset  0  dst_min  [f32; 2]   loc 1
///  offset  8  dst_max  [f32; 2]   loc 2
///  offset 16  uv_min   [f32; 2]   loc 3
///  offset 24  uv_max   [f32; 2]   loc 4
///  offset 32  color    [f32; 4]   loc 5
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2,
        2 => Float32x2,
        3 => Float32x2,
        4 => Float32x2,
        5 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_layout_matches_shader_locations() {
        assert_eq!(std::mem::size_of::<GlyphInstance>(), 48);
        let offsets: Vec<u64> = GlyphInstance::ATTRS.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16, 24, 32]);
        let locations: Vec<u32> = GlyphInstance::ATTRS.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn uniform_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<ViewportUniform>() % 16, 0);
    }
}
