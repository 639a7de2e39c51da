//! Lookup tables from the abstract descriptor enums to GL tokens.
//!
//! Nothing here touches the device. Lookups that can fail return `None` when the
//! combination isn't available on the given tier, so callers can report the gap.

use crate::caps::Tier;


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum TextureFormat {
	R8,
	Rg8,
	Rgb8,
	Rgba8,
	Rgba8Srgb,
	Rgb565,
	Rgba4,
	Rgb5A1,
	Rgb10A2,

	Luminance8,
	Alpha8,
	LuminanceAlpha8,

	R8Uint,
	Rgba8Uint,
	R32Uint,
	Rgba32Uint,
	R32Sint,

	R16Float,
	Rg16Float,
	Rgba16Float,
	R32Float,
	Rg32Float,
	Rgba32Float,

	Depth16,
	Depth24,
	Depth32Float,
	Depth24Stencil8,
	Depth32FloatStencil8,
	Stencil8,

	Bc1RgbaUnorm,
	Bc3RgbaUnorm,
	Etc2Rgb8Unorm,
	Astc4x4Unorm,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum FormatKind {
	Color,
	Depth,
	Stencil,
	DepthStencil,
}

/// How shaders and clears see the contents of a color format.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum SampleType {
	Float,
	Sint,
	Uint,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum TextureAspect {
	All,
	DepthOnly,
	StencilOnly,
}

impl TextureFormat {
	pub fn kind(self) -> FormatKind {
		use TextureFormat::*;

		match self {
			Depth16 | Depth24 | Depth32Float => FormatKind::Depth,
			Depth24Stencil8 | Depth32FloatStencil8 => FormatKind::DepthStencil,
			Stencil8 => FormatKind::Stencil,
			_ => FormatKind::Color,
		}
	}

	pub fn sample_type(self) -> SampleType {
		use TextureFormat::*;

		match self {
			R8Uint | Rgba8Uint | R32Uint | Rgba32Uint => SampleType::Uint,
			R32Sint => SampleType::Sint,
			_ => SampleType::Float,
		}
	}

	pub fn has_depth(self) -> bool {
		matches!(self.kind(), FormatKind::Depth | FormatKind::DepthStencil)
	}

	pub fn has_stencil(self) -> bool {
		matches!(self.kind(), FormatKind::Stencil | FormatKind::DepthStencil)
	}

	pub fn is_compressed(self) -> bool {
		use TextureFormat::*;
		matches!(self, Bc1RgbaUnorm | Bc3RgbaUnorm | Etc2Rgb8Unorm | Astc4x4Unorm)
	}

	/// Whether a copy of `aspect` can read from or write to this format.
	pub fn has_aspect(self, aspect: TextureAspect) -> bool {
		match aspect {
			TextureAspect::All => true,
			TextureAspect::DepthOnly => self.has_depth(),
			TextureAspect::StencilOnly => self.has_stencil(),
		}
	}
}


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureFormatInfo {
	pub internal_format: u32,
	pub format: u32,
	pub ty: u32,
	pub bytes_per_pixel: u32,
	pub color_renderable: bool,
}

const fn info(internal_format: u32, format: u32, ty: u32, bytes_per_pixel: u32, color_renderable: bool) -> Option<TextureFormatInfo> {
	Some(TextureFormatInfo { internal_format, format, ty, bytes_per_pixel, color_renderable })
}

/// (internal format, transfer format, transfer type) for a texture format.
pub fn texture_format(format: TextureFormat, tier: Tier) -> Option<TextureFormatInfo> {
	use TextureFormat::*;

	// Formats both tiers share. The baseline tier only knows unsized internal formats.
	match format {
		Luminance8 => return info(gl::LUMINANCE, gl::LUMINANCE, gl::UNSIGNED_BYTE, 1, false),
		Alpha8 => return info(gl::ALPHA, gl::ALPHA, gl::UNSIGNED_BYTE, 1, false),
		LuminanceAlpha8 => return info(gl::LUMINANCE_ALPHA, gl::LUMINANCE_ALPHA, gl::UNSIGNED_BYTE, 2, false),
		_ if format.is_compressed() => return None,
		_ => {}
	}

	match tier {
		Tier::Baseline => match format {
			Rgba8 => info(gl::RGBA, gl::RGBA, gl::UNSIGNED_BYTE, 4, true),
			Rgb8 => info(gl::RGB, gl::RGB, gl::UNSIGNED_BYTE, 3, true),
			Rgb565 => info(gl::RGB, gl::RGB, gl::UNSIGNED_SHORT_5_6_5, 2, true),
			Rgba4 => info(gl::RGBA, gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4, 2, true),
			Rgb5A1 => info(gl::RGBA, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1, 2, true),
			Depth16 => info(gl::DEPTH_COMPONENT, gl::DEPTH_COMPONENT, gl::UNSIGNED_SHORT, 2, false),
			Depth24 => info(gl::DEPTH_COMPONENT, gl::DEPTH_COMPONENT, gl::UNSIGNED_INT, 4, false),
			Depth24Stencil8 => info(gl::DEPTH_STENCIL, gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8, 4, false),
			_ => None,
		},

		Tier::Extended => match format {
			R8 => info(gl::R8, gl::RED, gl::UNSIGNED_BYTE, 1, true),
			Rg8 => info(gl::RG8, gl::RG, gl::UNSIGNED_BYTE, 2, true),
			Rgb8 => info(gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE, 3, true),
			Rgba8 => info(gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE, 4, true),
			Rgba8Srgb => info(gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE, 4, true),
			Rgb565 => info(gl::RGB565, gl::RGB, gl::UNSIGNED_SHORT_5_6_5, 2, true),
			Rgba4 => info(gl::RGBA4, gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4, 2, true),
			Rgb5A1 => info(gl::RGB5_A1, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1, 2, true),
			Rgb10A2 => info(gl::RGB10_A2, gl::RGBA, gl::UNSIGNED_INT_2_10_10_10_REV, 4, true),

			R8Uint => info(gl::R8UI, gl::RED_INTEGER, gl::UNSIGNED_BYTE, 1, true),
			Rgba8Uint => info(gl::RGBA8UI, gl::RGBA_INTEGER, gl::UNSIGNED_BYTE, 4, true),
			R32Uint => info(gl::R32UI, gl::RED_INTEGER, gl::UNSIGNED_INT, 4, true),
			Rgba32Uint => info(gl::RGBA32UI, gl::RGBA_INTEGER, gl::UNSIGNED_INT, 16, true),
			R32Sint => info(gl::R32I, gl::RED_INTEGER, gl::INT, 4, true),

			// Float color buffers need EXT_color_buffer_float, which isn't assumed.
			R16Float => info(gl::R16F, gl::RED, gl::HALF_FLOAT, 2, false),
			Rg16Float => info(gl::RG16F, gl::RG, gl::HALF_FLOAT, 4, false),
			Rgba16Float => info(gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT, 8, false),
			R32Float => info(gl::R32F, gl::RED, gl::FLOAT, 4, false),
			Rg32Float => info(gl::RG32F, gl::RG, gl::FLOAT, 8, false),
			Rgba32Float => info(gl::RGBA32F, gl::RGBA, gl::FLOAT, 16, false),

			Depth16 => info(gl::DEPTH_COMPONENT16, gl::DEPTH_COMPONENT, gl::UNSIGNED_SHORT, 2, false),
			Depth24 => info(gl::DEPTH_COMPONENT24, gl::DEPTH_COMPONENT, gl::UNSIGNED_INT, 4, false),
			Depth32Float => info(gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT, 4, false),
			Depth24Stencil8 => info(gl::DEPTH24_STENCIL8, gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8, 4, false),
			Depth32FloatStencil8 => info(gl::DEPTH32F_STENCIL8, gl::DEPTH_STENCIL, gl::FLOAT_32_UNSIGNED_INT_24_8_REV, 8, false),

			_ => None,
		},
	}
}

/// Internal format for renderbuffer storage, which only accepts sized formats.
pub fn renderbuffer_format(format: TextureFormat, tier: Tier) -> Option<u32> {
	use TextureFormat::*;

	match (format, tier) {
		(Rgba4, _) => Some(gl::RGBA4),
		(Rgb565, _) => Some(gl::RGB565),
		(Rgb5A1, _) => Some(gl::RGB5_A1),
		(Rgba8, _) => Some(gl::RGBA8),
		(Depth16, _) => Some(gl::DEPTH_COMPONENT16),
		(Stencil8, _) => Some(gl::STENCIL_INDEX8),
		(Depth24Stencil8, _) => Some(gl::DEPTH24_STENCIL8),

		(_, Tier::Baseline) => None,

		(format, Tier::Extended) => texture_format(format, Tier::Extended)
			.filter(|info| info.color_renderable || format.has_depth())
			.map(|info| info.internal_format),
	}
}


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum VertexFormat {
	Uint8x2, Uint8x4,
	Sint8x2, Sint8x4,
	Unorm8x2, Unorm8x4,
	Snorm8x2, Snorm8x4,
	Uint16x2, Uint16x4,
	Sint16x2, Sint16x4,
	Unorm16x2, Unorm16x4,
	Snorm16x2, Snorm16x4,
	Float16x2, Float16x4,
	Float32, Float32x2, Float32x3, Float32x4,
	Uint32, Uint32x2, Uint32x3, Uint32x4,
	Sint32, Sint32x2, Sint32x3, Sint32x4,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexFormatInfo {
	pub components: i32,
	pub ty: u32,
	pub normalized: bool,
	/// Read by the shader as an integer rather than converted to float.
	pub integer: bool,
	pub byte_size: u32,
}

pub fn vertex_format(format: VertexFormat, tier: Tier) -> Option<VertexFormatInfo> {
	use VertexFormat::*;

	let (components, ty, normalized, integer) = match format {
		Uint8x2 => (2, gl::UNSIGNED_BYTE, false, true),
		Uint8x4 => (4, gl::UNSIGNED_BYTE, false, true),
		Sint8x2 => (2, gl::BYTE, false, true),
		Sint8x4 => (4, gl::BYTE, false, true),
		Unorm8x2 => (2, gl::UNSIGNED_BYTE, true, false),
		Unorm8x4 => (4, gl::UNSIGNED_BYTE, true, false),
		Snorm8x2 => (2, gl::BYTE, true, false),
		Snorm8x4 => (4, gl::BYTE, true, false),
		Uint16x2 => (2, gl::UNSIGNED_SHORT, false, true),
		Uint16x4 => (4, gl::UNSIGNED_SHORT, false, true),
		Sint16x2 => (2, gl::SHORT, false, true),
		Sint16x4 => (4, gl::SHORT, false, true),
		Unorm16x2 => (2, gl::UNSIGNED_SHORT, true, false),
		Unorm16x4 => (4, gl::UNSIGNED_SHORT, true, false),
		Snorm16x2 => (2, gl::SHORT, true, false),
		Snorm16x4 => (4, gl::SHORT, true, false),
		Float16x2 => (2, gl::HALF_FLOAT, false, false),
		Float16x4 => (4, gl::HALF_FLOAT, false, false),
		Float32 => (1, gl::FLOAT, false, false),
		Float32x2 => (2, gl::FLOAT, false, false),
		Float32x3 => (3, gl::FLOAT, false, false),
		Float32x4 => (4, gl::FLOAT, false, false),
		Uint32 => (1, gl::UNSIGNED_INT, false, true),
		Uint32x2 => (2, gl::UNSIGNED_INT, false, true),
		Uint32x3 => (3, gl::UNSIGNED_INT, false, true),
		Uint32x4 => (4, gl::UNSIGNED_INT, false, true),
		Sint32 => (1, gl::INT, false, true),
		Sint32x2 => (2, gl::INT, false, true),
		Sint32x3 => (3, gl::INT, false, true),
		Sint32x4 => (4, gl::INT, false, true),
	};

	// No integer attributes, half floats or 32 bit integers before the extended tier.
	if tier == Tier::Baseline
		&& (integer || matches!(ty, gl::HALF_FLOAT | gl::INT | gl::UNSIGNED_INT))
	{
		return None
	}

	let component_size = match ty {
		gl::UNSIGNED_BYTE | gl::BYTE => 1,
		gl::UNSIGNED_SHORT | gl::SHORT | gl::HALF_FLOAT => 2,
		_ => 4,
	};

	Some(VertexFormatInfo {
		components,
		ty,
		normalized,
		integer,
		byte_size: components as u32 * component_size,
	})
}


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum CompareFunction {
	Never,
	#[default]
	Less,
	Equal,
	LessEqual,
	Greater,
	NotEqual,
	GreaterEqual,
	Always,
}

pub fn compare_function(func: CompareFunction) -> u32 {
	match func {
		CompareFunction::Never => gl::NEVER,
		CompareFunction::Less => gl::LESS,
		CompareFunction::Equal => gl::EQUAL,
		CompareFunction::LessEqual => gl::LEQUAL,
		CompareFunction::Greater => gl::GREATER,
		CompareFunction::NotEqual => gl::NOTEQUAL,
		CompareFunction::GreaterEqual => gl::GEQUAL,
		CompareFunction::Always => gl::ALWAYS,
	}
}


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum BlendFactor {
	Zero,
	One,
	Src,
	OneMinusSrc,
	SrcAlpha,
	OneMinusSrcAlpha,
	Dst,
	OneMinusDst,
	DstAlpha,
	OneMinusDstAlpha,
	SrcAlphaSaturated,
	Constant,
	OneMinusConstant,
}

pub fn blend_factor(factor: BlendFactor) -> u32 {
	match factor {
		BlendFactor::Zero => gl::ZERO,
		BlendFactor::One => gl::ONE,
		BlendFactor::Src => gl::SRC_COLOR,
		BlendFactor::OneMinusSrc => gl::ONE_MINUS_SRC_COLOR,
		BlendFactor::SrcAlpha => gl::SRC_ALPHA,
		BlendFactor::OneMinusSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
		BlendFactor::Dst => gl::DST_COLOR,
		BlendFactor::OneMinusDst => gl::ONE_MINUS_DST_COLOR,
		BlendFactor::DstAlpha => gl::DST_ALPHA,
		BlendFactor::OneMinusDstAlpha => gl::ONE_MINUS_DST_ALPHA,
		BlendFactor::SrcAlphaSaturated => gl::SRC_ALPHA_SATURATE,
		BlendFactor::Constant => gl::CONSTANT_COLOR,
		BlendFactor::OneMinusConstant => gl::ONE_MINUS_CONSTANT_COLOR,
	}
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum BlendOperation {
	#[default]
	Add,
	Subtract,
	ReverseSubtract,
	Min,
	Max,
}

/// Min and max blending need EXT_blend_minmax on the baseline tier, which isn't assumed.
pub fn blend_operation(op: BlendOperation, tier: Tier) -> Option<u32> {
	match op {
		BlendOperation::Add => Some(gl::FUNC_ADD),
		BlendOperation::Subtract => Some(gl::FUNC_SUBTRACT),
		BlendOperation::ReverseSubtract => Some(gl::FUNC_REVERSE_SUBTRACT),
		BlendOperation::Min if tier == Tier::Extended => Some(gl::MIN),
		BlendOperation::Max if tier == Tier::Extended => Some(gl::MAX),
		_ => None,
	}
}


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum StencilOperation {
	#[default]
	Keep,
	Zero,
	Replace,
	Invert,
	IncrementClamp,
	DecrementClamp,
	IncrementWrap,
	DecrementWrap,
}

pub fn stencil_operation(op: StencilOperation) -> u32 {
	match op {
		StencilOperation::Keep => gl::KEEP,
		StencilOperation::Zero => gl::ZERO,
		StencilOperation::Replace => gl::REPLACE,
		StencilOperation::Invert => gl::INVERT,
		StencilOperation::IncrementClamp => gl::INCR,
		StencilOperation::DecrementClamp => gl::DECR,
		StencilOperation::IncrementWrap => gl::INCR_WRAP,
		StencilOperation::DecrementWrap => gl::DECR_WRAP,
	}
}


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum CullMode {
	#[default]
	None,
	Front,
	Back,
}

/// `None` means face culling should be disabled.
pub fn cull_mode(mode: CullMode) -> Option<u32> {
	match mode {
		CullMode::None => None,
		CullMode::Front => Some(gl::FRONT),
		CullMode::Back => Some(gl::BACK),
	}
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum FrontFace {
	#[default]
	Ccw,
	Cw,
}

pub fn front_face(face: FrontFace) -> u32 {
	match face {
		FrontFace::Ccw => gl::CCW,
		FrontFace::Cw => gl::CW,
	}
}


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum PrimitiveTopology {
	PointList,
	LineList,
	LineStrip,
	#[default]
	TriangleList,
	TriangleStrip,
}

pub fn primitive_topology(topology: PrimitiveTopology) -> u32 {
	match topology {
		PrimitiveTopology::PointList => gl::POINTS,
		PrimitiveTopology::LineList => gl::LINES,
		PrimitiveTopology::LineStrip => gl::LINE_STRIP,
		PrimitiveTopology::TriangleList => gl::TRIANGLES,
		PrimitiveTopology::TriangleStrip => gl::TRIANGLE_STRIP,
	}
}

/// Transform feedback only captures the basic primitive types.
pub fn feedback_primitive_mode(topology: PrimitiveTopology) -> u32 {
	match topology {
		PrimitiveTopology::PointList => gl::POINTS,
		PrimitiveTopology::LineList | PrimitiveTopology::LineStrip => gl::LINES,
		PrimitiveTopology::TriangleList | PrimitiveTopology::TriangleStrip => gl::TRIANGLES,
	}
}


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum IndexFormat {
	Uint16,
	Uint32,
}

/// (element type, byte size)
pub fn index_format(format: IndexFormat) -> (u32, u32) {
	match format {
		IndexFormat::Uint16 => (gl::UNSIGNED_SHORT, 2),
		IndexFormat::Uint32 => (gl::UNSIGNED_INT, 4),
	}
}


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum AddressMode {
	#[default]
	ClampToEdge,
	Repeat,
	MirrorRepeat,
}

pub fn address_mode(mode: AddressMode) -> u32 {
	match mode {
		AddressMode::ClampToEdge => gl::CLAMP_TO_EDGE,
		AddressMode::Repeat => gl::REPEAT,
		AddressMode::MirrorRepeat => gl::MIRRORED_REPEAT,
	}
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum FilterMode {
	#[default]
	Nearest,
	Linear,
}

pub fn mag_filter(filter: FilterMode) -> u32 {
	match filter {
		FilterMode::Nearest => gl::NEAREST,
		FilterMode::Linear => gl::LINEAR,
	}
}

/// Combines the minification and mip filters into the single GL min filter token.
pub fn min_filter(filter: FilterMode, mipmap_filter: Option<FilterMode>) -> u32 {
	use FilterMode::*;

	match (filter, mipmap_filter) {
		(Nearest, None) => gl::NEAREST,
		(Linear, None) => gl::LINEAR,
		(Nearest, Some(Nearest)) => gl::NEAREST_MIPMAP_NEAREST,
		(Nearest, Some(Linear)) => gl::NEAREST_MIPMAP_LINEAR,
		(Linear, Some(Nearest)) => gl::LINEAR_MIPMAP_NEAREST,
		(Linear, Some(Linear)) => gl::LINEAR_MIPMAP_LINEAR,
	}
}


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum TextureDimension {
	#[default]
	D2,
	D2Array,
	Cube,
	D3,
}

pub fn texture_target(dimension: TextureDimension, tier: Tier) -> Option<u32> {
	match (dimension, tier) {
		(TextureDimension::D2, _) => Some(gl::TEXTURE_2D),
		(TextureDimension::Cube, _) => Some(gl::TEXTURE_CUBE_MAP),
		(TextureDimension::D2Array, Tier::Extended) => Some(gl::TEXTURE_2D_ARRAY),
		(TextureDimension::D3, Tier::Extended) => Some(gl::TEXTURE_3D),
		_ => None,
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn baseline_uses_unsized_formats() {
		let info = texture_format(TextureFormat::Rgba8, Tier::Baseline).unwrap();
		assert_eq!(info.internal_format, gl::RGBA);
		assert_eq!((info.format, info.ty), (gl::RGBA, gl::UNSIGNED_BYTE));

		let info = texture_format(TextureFormat::Rgba8, Tier::Extended).unwrap();
		assert_eq!(info.internal_format, gl::RGBA8);
	}

	#[test]
	fn unavailable_formats_are_reported_not_thrown() {
		assert_eq!(texture_format(TextureFormat::Rgba32Float, Tier::Baseline), None);
		assert_eq!(texture_format(TextureFormat::Bc1RgbaUnorm, Tier::Extended), None);
		assert_eq!(texture_format(TextureFormat::Stencil8, Tier::Extended), None);
		assert_eq!(renderbuffer_format(TextureFormat::Stencil8, Tier::Extended), Some(gl::STENCIL_INDEX8));
	}

	#[test]
	fn float_render_targets_are_not_renderbuffers() {
		assert_eq!(renderbuffer_format(TextureFormat::Rgba32Float, Tier::Extended), None);
		assert_eq!(renderbuffer_format(TextureFormat::Depth32Float, Tier::Extended), Some(gl::DEPTH_COMPONENT32F));
		assert_eq!(renderbuffer_format(TextureFormat::R8, Tier::Baseline), None);
	}

	#[test]
	fn vertex_format_sizes() {
		let info = vertex_format(VertexFormat::Float32x3, Tier::Baseline).unwrap();
		assert_eq!((info.components, info.ty, info.byte_size), (3, gl::FLOAT, 12));

		let info = vertex_format(VertexFormat::Unorm8x4, Tier::Baseline).unwrap();
		assert!(info.normalized && !info.integer);
		assert_eq!(info.byte_size, 4);

		let info = vertex_format(VertexFormat::Float16x2, Tier::Extended).unwrap();
		assert_eq!(info.byte_size, 4);
	}

	#[test]
	fn integer_vertex_formats_need_extended_tier() {
		assert_eq!(vertex_format(VertexFormat::Uint32x2, Tier::Baseline), None);
		assert!(vertex_format(VertexFormat::Uint32x2, Tier::Extended).unwrap().integer);
	}

	#[test]
	fn min_filter_combines_mip_filter() {
		assert_eq!(min_filter(FilterMode::Linear, Some(FilterMode::Nearest)), gl::LINEAR_MIPMAP_NEAREST);
		assert_eq!(min_filter(FilterMode::Nearest, None), gl::NEAREST);
	}

	#[test]
	fn minmax_blending_is_tier_gated() {
		assert_eq!(blend_operation(BlendOperation::Max, Tier::Baseline), None);
		assert_eq!(blend_operation(BlendOperation::Max, Tier::Extended), Some(gl::MAX));
	}

	#[test]
	fn feedback_mode_uses_base_primitives() {
		assert_eq!(feedback_primitive_mode(PrimitiveTopology::TriangleStrip), gl::TRIANGLES);
		assert_eq!(feedback_primitive_mode(PrimitiveTopology::LineStrip), gl::LINES);
	}
}
