use crate::error::Error;


/// The two capability levels the engine knows how to drive.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum Tier {
	/// Single render target, no uniform blocks, no native instancing, no transform feedback.
	Baseline,
	/// Multiple render targets, uniform blocks, instancing, transform feedback, multisampled renderbuffers.
	Extended,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum Feature {
	UniformBlocks,
	MultipleRenderTargets,
	Instancing,
	TransformFeedback,
	MultisampleRenderbuffers,
	SamplerObjects,
	VertexArrayObjects,
	OcclusionQuery,
	FramebufferBlit,
	BufferCopy,
	IntegerAttributes,
	Uint32Indices,
	Texture3d,
	TextureArrays,
	/// Sized, integer and float texture formats, and rendering to anything beyond the few
	/// formats every renderbuffer supports.
	SizedTextureFormats,
	BlendMinMax,
}


/// Capabilities of the device a [`Context`](crate::Context) drives.
///
/// Built once at startup and handed to everything with tier-gated behaviour.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Capabilities {
	pub tier: Tier,

	// Baseline tier extensions. All of these are implied by the extended tier.
	pub instanced_arrays: bool,
	pub vertex_array_objects: bool,
	pub occlusion_query: bool,
	pub draw_buffers: bool,
	pub element_index_uint: bool,

	pub max_draw_buffers: u32,
	pub max_texture_units: u32,
	pub max_samples: u32,
}

impl Capabilities {
	pub fn baseline() -> Capabilities {
		Capabilities {
			tier: Tier::Baseline,
			instanced_arrays: false,
			vertex_array_objects: false,
			occlusion_query: false,
			draw_buffers: false,
			element_index_uint: false,
			max_draw_buffers: 1,
			max_texture_units: 8,
			max_samples: 1,
		}
	}

	pub fn extended() -> Capabilities {
		Capabilities {
			tier: Tier::Extended,
			instanced_arrays: true,
			vertex_array_objects: true,
			occlusion_query: true,
			draw_buffers: true,
			element_index_uint: true,
			max_draw_buffers: 4,
			max_texture_units: 16,
			max_samples: 4,
		}
	}

	/// The same device, but restricted to what the baseline tier offers without extensions.
	pub fn clamped_to_baseline(&self) -> Capabilities {
		Capabilities {
			max_texture_units: self.max_texture_units,
			..Capabilities::baseline()
		}
	}

	pub fn is_extended(&self) -> bool {
		self.tier == Tier::Extended
	}

	pub fn supports(&self, feature: Feature) -> bool {
		let extended = self.is_extended();

		match feature {
			Feature::UniformBlocks
				| Feature::TransformFeedback
				| Feature::MultisampleRenderbuffers
				| Feature::SamplerObjects
				| Feature::FramebufferBlit
				| Feature::BufferCopy
				| Feature::IntegerAttributes
				| Feature::Texture3d
				| Feature::TextureArrays
				| Feature::SizedTextureFormats
				| Feature::BlendMinMax => extended,

			Feature::Instancing => extended || self.instanced_arrays,
			Feature::VertexArrayObjects => extended || self.vertex_array_objects,
			Feature::OcclusionQuery => extended || self.occlusion_query,
			Feature::MultipleRenderTargets => (extended || self.draw_buffers) && self.max_draw_buffers > 1,
			Feature::Uint32Indices => extended || self.element_index_uint,
		}
	}

	pub fn require(&self, feature: Feature) -> Result<(), Error> {
		if self.supports(feature) {
			Ok(())
		} else {
			Err(Error::UnsupportedFeature { feature, tier: self.tier })
		}
	}

	/// The error for something missing from this tier's format tables.
	///
	/// It's only an unsupported feature if `feature` would provide it, otherwise nothing does.
	pub(crate) fn missing(&self, feature: Feature, provided_by_feature: bool, path: &str, what: impl std::fmt::Display) -> Error {
		match self.require(feature) {
			Err(error) if provided_by_feature => error,
			_ => Error::malformed(path, format!("{what} is not supported")),
		}
	}
}
