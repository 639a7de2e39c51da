use super::{BindingResources, DrawCmd, DrawItem, Rect};
use crate::formats::{FilterMode, TextureAspect};
use crate::resource_manager::{
	RenderPassDef, LoadOp, PipelineDef, VertexAttributesDef, TransformFeedbackDef, QueryDef, BufferDef, TextureDef,
};


/// Clear behaviour of the default surface, which has no descriptor of its own.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SurfaceOps {
	pub color: LoadOp<[f32; 4]>,
	pub depth: LoadOp<f32>,
	pub stencil: LoadOp<i32>,
	pub flip_y: bool,
}

impl SurfaceOps {
	pub fn clear(color: [f32; 4]) -> SurfaceOps {
		SurfaceOps {
			color: LoadOp::Clear(color),
			depth: LoadOp::Clear(1.0),
			stencil: LoadOp::Clear(0),
			flip_y: false,
		}
	}
}

#[derive(Debug, Copy, Clone)]
pub enum RenderTarget<'a> {
	Surface(SurfaceOps),
	Offscreen(&'a RenderPassDef),
}


#[derive(Debug, Clone)]
pub struct RenderPass<'a> {
	pub target: RenderTarget<'a>,
	pub draws: Vec<DrawItem<'a>>,
}

impl<'a> RenderPass<'a> {
	pub fn new(target: RenderTarget<'a>) -> RenderPass<'a> {
		RenderPass {
			target,
			draws: Vec::new(),
		}
	}

	pub fn draw(&mut self, cmd: DrawCmd<'a>) -> &mut Self {
		self.draws.push(DrawItem::Draw(cmd));
		self
	}

	pub fn occlusion_query(&mut self, query: &'a QueryDef, draws: impl IntoIterator<Item=DrawCmd<'a>>) -> &mut Self {
		let draws = draws.into_iter().map(DrawItem::Draw).collect();
		self.draws.push(DrawItem::OcclusionQuery { query, draws });
		self
	}
}


/// Runs a capture pipeline over `vertex_count` vertices without rasterizing anything,
/// writing its outputs into `feedback`.
#[derive(Debug, Clone)]
pub struct FeedbackPass<'a> {
	pub pipeline: &'a PipelineDef,
	pub vertices: &'a VertexAttributesDef,
	pub bindings: Option<&'a BindingResources>,
	pub feedback: &'a TransformFeedbackDef,
	pub first_vertex: u32,
	pub vertex_count: u32,
}


/// Copies a color rectangle between render targets, scaling if the rects differ in size.
#[derive(Debug, Clone)]
pub struct BlitPass<'a> {
	pub source: &'a RenderPassDef,
	pub source_attachment: u32,
	pub source_rect: Rect,
	/// The default surface if unset.
	pub destination: Option<&'a RenderPassDef>,
	pub destination_rect: Rect,
	pub filter: FilterMode,
}


#[derive(Debug, Clone)]
pub struct CopyBufferToBuffer<'a> {
	pub source: &'a BufferDef,
	pub source_offset: usize,
	pub destination: &'a BufferDef,
	pub destination_offset: usize,
	pub size: usize,
}

#[derive(Debug, Copy, Clone)]
pub struct TextureCopyView<'a> {
	pub texture: &'a TextureDef,
	pub mip_level: u32,
	/// x, y, and layer or slice.
	pub origin: (u32, u32, u32),
	pub aspect: TextureAspect,
}

impl<'a> TextureCopyView<'a> {
	pub fn new(texture: &'a TextureDef) -> TextureCopyView<'a> {
		TextureCopyView {
			texture,
			mip_level: 0,
			origin: (0, 0, 0),
			aspect: TextureAspect::All,
		}
	}

	pub fn at(mut self, x: u32, y: u32, layer: u32) -> Self {
		self.origin = (x, y, layer);
		self
	}

	pub fn mip(mut self, mip_level: u32) -> Self {
		self.mip_level = mip_level;
		self
	}
}

#[derive(Debug, Clone)]
pub struct CopyTextureToTexture<'a> {
	pub source: TextureCopyView<'a>,
	pub destination: TextureCopyView<'a>,
	/// Width, height and number of layers.
	pub size: (u32, u32, u32),
}


#[derive(Debug, Clone)]
pub enum PassItem<'a> {
	Render(RenderPass<'a>),
	TransformFeedback(FeedbackPass<'a>),
	Blit(BlitPass<'a>),
	CopyBufferToBuffer(CopyBufferToBuffer<'a>),
	CopyTextureToTexture(CopyTextureToTexture<'a>),
}
