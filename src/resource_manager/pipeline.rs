use super::{ResourceManager, ProgramHandle, Identity, DefId};
use super::shader::{self, ShaderType, ProgramReflection};
use crate::caps::Feature;
use crate::device::Device;
use crate::error::Error;
use crate::formats::{PrimitiveTopology, CullMode, FrontFace, CompareFunction, StencilOperation, BlendFactor, BlendOperation};

use std::rc::Rc;


#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PrimitiveState {
	pub topology: PrimitiveTopology,
	pub cull_mode: CullMode,
	pub front_face: FrontFace,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StencilFaceState {
	pub compare: CompareFunction,
	pub fail_op: StencilOperation,
	pub depth_fail_op: StencilOperation,
	pub pass_op: StencilOperation,
}

impl Default for StencilFaceState {
	fn default() -> Self {
		StencilFaceState {
			compare: CompareFunction::Always,
			fail_op: StencilOperation::Keep,
			depth_fail_op: StencilOperation::Keep,
			pass_op: StencilOperation::Keep,
		}
	}
}

impl StencilFaceState {
	pub(crate) fn is_noop(&self) -> bool {
		*self == StencilFaceState::default()
	}
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DepthStencilState {
	pub depth_write_enabled: bool,
	pub depth_compare: CompareFunction,
	pub stencil_front: StencilFaceState,
	pub stencil_back: StencilFaceState,
	pub stencil_read_mask: u32,
	pub stencil_write_mask: u32,
	/// Constant depth offset, in units of the smallest resolvable depth difference.
	pub depth_bias: f32,
	pub depth_bias_slope_scale: f32,
}

impl Default for DepthStencilState {
	fn default() -> Self {
		DepthStencilState {
			depth_write_enabled: true,
			depth_compare: CompareFunction::Less,
			stencil_front: StencilFaceState::default(),
			stencil_back: StencilFaceState::default(),
			stencil_read_mask: !0,
			stencil_write_mask: !0,
			depth_bias: 0.0,
			depth_bias_slope_scale: 0.0,
		}
	}
}

impl DepthStencilState {
	pub(crate) fn uses_stencil(&self) -> bool {
		!self.stencil_front.is_noop() || !self.stencil_back.is_noop()
	}
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlendComponent {
	pub src_factor: BlendFactor,
	pub dst_factor: BlendFactor,
	pub operation: BlendOperation,
}

impl BlendComponent {
	pub const REPLACE: BlendComponent = BlendComponent {
		src_factor: BlendFactor::One,
		dst_factor: BlendFactor::Zero,
		operation: BlendOperation::Add,
	};

	pub const OVER: BlendComponent = BlendComponent {
		src_factor: BlendFactor::SrcAlpha,
		dst_factor: BlendFactor::OneMinusSrcAlpha,
		operation: BlendOperation::Add,
	};
}

impl Default for BlendComponent {
	fn default() -> Self {
		BlendComponent::REPLACE
	}
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlendState {
	pub color: BlendComponent,
	pub alpha: BlendComponent,
}

impl BlendState {
	pub const ALPHA_BLENDING: BlendState = BlendState {
		color: BlendComponent::OVER,
		alpha: BlendComponent::OVER,
	};
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ColorWrites {
	pub r: bool,
	pub g: bool,
	pub b: bool,
	pub a: bool,
}

impl ColorWrites {
	pub const ALL: ColorWrites = ColorWrites { r: true, g: true, b: true, a: true };
}

impl Default for ColorWrites {
	fn default() -> Self {
		ColorWrites::ALL
	}
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorTargetState {
	/// Blending disabled if unset.
	pub blend: Option<BlendState>,
	pub write_mask: ColorWrites,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum FeedbackBufferMode {
	/// All varyings into the buffer at index 0.
	Interleaved,
	/// One buffer per varying, in declaration order.
	Separate,
}

impl FeedbackBufferMode {
	fn gl_mode(self) -> u32 {
		match self {
			FeedbackBufferMode::Interleaved => gl::INTERLEAVED_ATTRIBS,
			FeedbackBufferMode::Separate => gl::SEPARATE_ATTRIBS,
		}
	}
}


/// Shader sources plus the fixed function state draws with this pipeline use.
///
/// Shader sources are fixed at construction; fixed function state can be changed freely
/// between submissions since it's applied on every draw.
#[derive(Debug, Clone)]
pub struct PipelineDef {
	identity: Identity,
	vertex_source: String,
	fragment_source: String,
	capture: Option<(Vec<String>, FeedbackBufferMode)>,
	program_key: String,

	pub primitive: PrimitiveState,
	pub depth_stencil: Option<DepthStencilState>,
	pub targets: Vec<ColorTargetState>,
	pub blend_constant: [f32; 4],
}

impl PipelineDef {
	pub fn new(vertex_source: impl Into<String>, fragment_source: impl Into<String>) -> PipelineDef {
		PipelineDef::build(vertex_source.into(), fragment_source.into(), None)
	}

	/// A vertex-only pipeline whose `varyings` are written to a transform feedback buffer set.
	pub fn capture(vertex_source: impl Into<String>, varyings: &[&str], mode: FeedbackBufferMode) -> PipelineDef {
		let vertex_source = vertex_source.into();
		let fragment_source = empty_fragment_source(&vertex_source);
		let varyings = varyings.iter().map(|&v| v.to_owned()).collect();

		PipelineDef {
			primitive: PrimitiveState { topology: PrimitiveTopology::PointList, ..PrimitiveState::default() },
			..PipelineDef::build(vertex_source, fragment_source, Some((varyings, mode)))
		}
	}

	fn build(vertex_source: String, fragment_source: String, capture: Option<(Vec<String>, FeedbackBufferMode)>) -> PipelineDef {
		let program_key = match &capture {
			Some((varyings, mode)) => format!("{vertex_source}\0{fragment_source}\0{}\0{mode:?}", varyings.join(",")),
			None => format!("{vertex_source}\0{fragment_source}"),
		};

		PipelineDef {
			identity: Identity::new(),
			vertex_source,
			fragment_source,
			capture,
			program_key,

			primitive: PrimitiveState::default(),
			depth_stencil: None,
			targets: vec![ColorTargetState::default()],
			blend_constant: [0.0; 4],
		}
	}

	pub fn with_primitive(mut self, primitive: PrimitiveState) -> PipelineDef {
		self.primitive = primitive;
		self
	}

	pub fn with_depth_stencil(mut self, depth_stencil: DepthStencilState) -> PipelineDef {
		self.depth_stencil = Some(depth_stencil);
		self
	}

	pub fn with_blend(mut self, blend: BlendState) -> PipelineDef {
		for target in self.targets.iter_mut() {
			target.blend = Some(blend);
		}

		self
	}

	pub fn with_targets(mut self, targets: Vec<ColorTargetState>) -> PipelineDef {
		self.targets = targets;
		self
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}

	pub fn vertex_source(&self) -> &str {
		&self.vertex_source
	}

	pub fn fragment_source(&self) -> &str {
		&self.fragment_source
	}

	pub fn is_capture(&self) -> bool {
		self.capture.is_some()
	}

	pub fn feedback_mode(&self) -> Option<FeedbackBufferMode> {
		self.capture.as_ref().map(|(_, mode)| *mode)
	}
}

/// Capture pipelines still need a fragment stage to link.
fn empty_fragment_source(vertex_source: &str) -> String {
	let version = vertex_source.lines()
		.map(str::trim)
		.find(|line| line.starts_with("#version"));

	match version {
		Some(version) => format!("{version}\nvoid main() {{}}\n"),
		None => "void main() {}\n".to_owned(),
	}
}


/// A linked program, shared by every pipeline with the same sources.
#[derive(Debug)]
pub struct PipelineObject {
	pub name: u32,
	pub reflection: Rc<ProgramReflection>,
	pub serial: u64,
	key: String,
	vertex_source: String,
	fragment_source: String,
	users: u32,
}


impl ResourceManager {
	pub fn prepare_program(&mut self, device: &mut impl Device, def: &PipelineDef) -> Result<ProgramHandle, Error> {
		if let Some(&key) = self.pipeline_programs.get(&def.id()) {
			if self.programs.contains_key(key) {
				return Ok(key)
			}
		}

		if def.is_capture() {
			self.capabilities.require(Feature::TransformFeedback)?;
		}

		if let Some(reason) = self.failed_programs.get(&def.program_key) {
			return Err(Error::ProgramUnavailable { reason: reason.clone() })
		}

		if let Some(&key) = self.program_keys.get(&def.program_key) {
			if let Some(object) = self.programs.get_mut(key) {
				object.users += 1;
				self.pipeline_programs.insert(def.id(), key);
				return Ok(key)
			}
		}

		match self.build_program(device, def) {
			Ok(object) => {
				let key = self.programs.insert(object);
				self.program_keys.insert(def.program_key.clone(), key);
				self.pipeline_programs.insert(def.id(), key);
				Ok(key)
			}

			Err(error) => {
				self.failed_programs.insert(def.program_key.clone(), error.to_string());
				Err(error)
			}
		}
	}

	fn build_program(&mut self, device: &mut impl Device, def: &PipelineDef) -> Result<PipelineObject, Error> {
		let vertex = self.acquire_shader(device, ShaderType::Vertex, &def.vertex_source)?;

		let fragment = match self.acquire_shader(device, ShaderType::Fragment, &def.fragment_source) {
			Ok(name) => name,
			Err(error) => {
				self.release_shader(device, ShaderType::Vertex, &def.vertex_source);
				return Err(error)
			}
		};

		let name = device.create_program();
		device.attach_shader(name, vertex);
		device.attach_shader(name, fragment);

		if let Some((varyings, mode)) = &def.capture {
			device.transform_feedback_varyings(name, varyings, mode.gl_mode());
		}

		if let Err(log) = device.link_program(name) {
			device.delete_program(name);
			self.release_shader(device, ShaderType::Vertex, &def.vertex_source);
			self.release_shader(device, ShaderType::Fragment, &def.fragment_source);

			return Err(Error::Link {
				vertex: def.vertex_source.clone(),
				fragment: def.fragment_source.clone(),
				log,
			})
		}

		let (reflection, warnings) = shader::reflect_program(device, name, &self.capabilities);

		for warning in warnings {
			self.warn(warning);
		}

		log::debug!("Linked program {name} ({} attributes, {} uniforms, {} blocks)",
			reflection.attributes.len(), reflection.uniforms.len(), reflection.blocks.len());

		Ok(PipelineObject {
			name,
			reflection: Rc::new(reflection),
			serial: self.next_serial(),
			key: def.program_key.clone(),
			vertex_source: def.vertex_source.clone(),
			fragment_source: def.fragment_source.clone(),
			users: 1,
		})
	}

	pub fn program(&self, handle: ProgramHandle) -> Option<&PipelineObject> {
		self.programs.get(handle)
	}

	/// Forgets `def`'s program, deleting it once no other pipeline shares it.
	///
	/// Also forgets a previous build failure for the same sources, so they get compiled again
	/// next time.
	pub fn delete_program(&mut self, device: &mut impl Device, def: &PipelineDef) {
		self.failed_programs.remove(&def.program_key);
		self.delete_vertex_states_using(device, def.id());

		let Some(key) = self.pipeline_programs.remove(&def.id()) else {
			return
		};

		let Some(object) = self.programs.get_mut(key) else {
			return
		};

		object.users = object.users.saturating_sub(1);
		if object.users > 0 {
			return
		}

		if let Some(object) = self.programs.remove(key) {
			self.program_keys.remove(&object.key);
			device.delete_program(object.name);
			self.release_shader(device, ShaderType::Vertex, &object.vertex_source);
			self.release_shader(device, ShaderType::Fragment, &object.fragment_source);
			log::debug!("Deleted program {}", object.name);
		}
	}
}
