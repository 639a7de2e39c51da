pub mod buffer;
pub mod texture;
pub mod sampler;
pub mod renderbuffer;
pub mod fbo;
pub mod multisample;
pub mod layout;
pub mod shader;
pub mod pipeline;
pub mod vertex_state;
pub mod uniform_block;
pub mod transform_feedback;
pub mod query;

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{SlotMap, new_key_type};

use crate::caps::Capabilities;
use crate::device::Device;
use crate::error::Error;

pub use self::buffer::{BufferDef, BufferUsage, BufferHint, BufferView, BufferObject};
pub use self::texture::{TextureDef, TextureSize, TextureRegion, TextureObject};
pub use self::sampler::{SamplerDef, SamplerParams, SamplerObject};
pub use self::renderbuffer::{RenderbufferDef, RenderbufferObject};
pub use self::fbo::{RenderPassDef, ColorAttachment, DepthStencilAttachment, AttachmentView, LoadOp, FramebufferObject};
pub use self::multisample::MultisampleShadow;
pub use self::layout::{ScalarKind, ValueType, MemberLayout, BlockLayout};
pub use self::shader::{ShaderType, ProgramReflection, AttributeInfo, UniformInfo, UniformKind, BlockInfo};
pub use self::pipeline::{PipelineDef, PipelineObject, PrimitiveState, DepthStencilState, StencilFaceState,
	ColorTargetState, BlendState, BlendComponent, ColorWrites, FeedbackBufferMode};
pub use self::vertex_state::{VertexAttributesDef, VertexAttribute, VertexStepMode, IndicesDef, VertexStateObject};
pub use self::uniform_block::{UniformBlockDef, UniformBlockObject};
pub use self::transform_feedback::{TransformFeedbackDef, TransformFeedbackObject};
pub use self::query::{QueryDef, QueryObject};

use self::shader::ShaderObject;


new_key_type! {
	pub struct BufferHandle;
	pub struct TextureHandle;
	pub struct SamplerHandle;
	pub struct RenderbufferHandle;
	pub struct FramebufferHandle;
	pub struct ProgramHandle;
	pub struct VertexStateHandle;
	pub struct UniformBlockHandle;
	pub struct TransformFeedbackHandle;
	pub struct QueryHandle;
}


/// Identifies one descriptor instance for as long as it lives.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct DefId(u64);

static NEXT_DEF_ID: AtomicU64 = AtomicU64::new(1);

/// Embedded in every descriptor. Cloning a descriptor produces a new identity,
/// so a clone never shares backend objects with its original.
#[derive(Debug, Eq, PartialEq)]
pub struct Identity(DefId);

impl Identity {
	pub fn new() -> Identity {
		Identity(DefId(NEXT_DEF_ID.fetch_add(1, Ordering::Relaxed)))
	}

	pub fn id(&self) -> DefId {
		self.0
	}
}

impl Default for Identity {
	fn default() -> Self {
		Identity::new()
	}
}

impl Clone for Identity {
	fn clone(&self) -> Self {
		Identity::new()
	}
}


/// Half open byte range.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Span {
	pub start: usize,
	pub end: usize,
}

impl Span {
	pub fn new(start: usize, end: usize) -> Span {
		Span { start, end }
	}

	pub fn len(&self) -> usize {
		self.end.saturating_sub(self.start)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn union(self, other: Span) -> Span {
		Span {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}
}

pub(crate) fn mark_dirty(dirty: &Cell<Option<Span>>, span: Span) {
	let merged = match dirty.get() {
		Some(existing) => existing.union(span),
		None => span,
	};

	dirty.set(Some(merged));
}

pub(crate) fn bump(revision: &Cell<u64>) {
	revision.set(revision.get() + 1);
}


/// Backend objects derived from descriptors, indexed by generation checked handles.
#[derive(Debug)]
pub(crate) struct Cache<K: slotmap::Key, O> {
	objects: SlotMap<K, O>,
	by_def: HashMap<DefId, K>,
}

impl<K: slotmap::Key, O> Default for Cache<K, O> {
	fn default() -> Self {
		Cache {
			objects: SlotMap::with_key(),
			by_def: HashMap::new(),
		}
	}
}

impl<K: slotmap::Key, O> Cache<K, O> {
	pub fn lookup(&self, id: DefId) -> Option<K> {
		self.by_def.get(&id).copied()
	}

	pub fn get(&self, key: K) -> Option<&O> {
		self.objects.get(key)
	}

	pub fn get_mut(&mut self, key: K) -> Option<&mut O> {
		self.objects.get_mut(key)
	}

	pub fn insert(&mut self, id: DefId, object: O) -> K {
		let key = self.objects.insert(object);
		self.by_def.insert(id, key);
		key
	}

	pub fn remove(&mut self, id: DefId) -> Option<O> {
		let key = self.by_def.remove(&id)?;
		self.objects.remove(key)
	}

	pub fn values_mut(&mut self) -> impl Iterator<Item=&mut O> {
		self.objects.values_mut()
	}

	pub fn drain(&mut self) -> Vec<O> {
		self.by_def.clear();
		self.objects.drain().map(|(_, object)| object).collect()
	}

	pub fn len(&self) -> usize {
		self.objects.len()
	}
}


/// Owns every backend object derived from caller descriptors.
///
/// All `prepare_*` calls are lazy and idempotent: the first call for a descriptor creates
/// its backend object, later calls return the same handle and only touch the device if the
/// descriptor changed since.
#[derive(Debug)]
pub struct ResourceManager {
	capabilities: Capabilities,
	validate_framebuffers: bool,

	/// Non fatal problems hit while preparing resources, collected by the context.
	warnings: Vec<Error>,

	/// Stamped on every created object so snapshots can tell a recreated object from
	/// an old one, even if the device hands out a recycled name.
	next_serial: u64,

	buffers: Cache<BufferHandle, BufferObject>,
	textures: Cache<TextureHandle, TextureObject>,
	samplers: Cache<SamplerHandle, SamplerObject>,
	renderbuffers: Cache<RenderbufferHandle, RenderbufferObject>,
	framebuffers: Cache<FramebufferHandle, FramebufferObject>,
	uniform_blocks: Cache<UniformBlockHandle, UniformBlockObject>,
	transform_feedbacks: Cache<TransformFeedbackHandle, TransformFeedbackObject>,
	queries: Cache<QueryHandle, QueryObject>,

	shaders: HashMap<(ShaderType, String), ShaderObject>,
	programs: SlotMap<ProgramHandle, PipelineObject>,
	program_keys: HashMap<String, ProgramHandle>,
	pipeline_programs: HashMap<DefId, ProgramHandle>,
	failed_programs: HashMap<String, String>,

	vertex_states: SlotMap<VertexStateHandle, VertexStateObject>,
	vertex_state_keys: HashMap<(DefId, DefId, Option<DefId>), VertexStateHandle>,
	/// Attribute arrays left enabled by the last draw, when there are no vertex array objects.
	enabled_attributes: u32,

	scratch_framebuffer: Option<u32>,
}

impl ResourceManager {
	pub fn new(capabilities: Capabilities, validate_framebuffers: bool) -> Self {
		ResourceManager {
			capabilities,
			validate_framebuffers,
			warnings: Vec::new(),
			next_serial: 1,

			buffers: Cache::default(),
			textures: Cache::default(),
			samplers: Cache::default(),
			renderbuffers: Cache::default(),
			framebuffers: Cache::default(),
			uniform_blocks: Cache::default(),
			transform_feedbacks: Cache::default(),
			queries: Cache::default(),

			shaders: HashMap::new(),
			programs: SlotMap::with_key(),
			program_keys: HashMap::new(),
			pipeline_programs: HashMap::new(),
			failed_programs: HashMap::new(),

			vertex_states: SlotMap::with_key(),
			vertex_state_keys: HashMap::new(),
			enabled_attributes: 0,

			scratch_framebuffer: None,
		}
	}

	pub fn capabilities(&self) -> &Capabilities {
		&self.capabilities
	}

	pub(crate) fn warn(&mut self, error: Error) {
		self.warnings.push(error);
	}

	pub(crate) fn take_warnings(&mut self) -> Vec<Error> {
		std::mem::take(&mut self.warnings)
	}

	fn next_serial(&mut self) -> u64 {
		let serial = self.next_serial;
		self.next_serial += 1;
		serial
	}

	/// Framebuffer used to read from textures when copying between them.
	pub(crate) fn scratch_framebuffer(&mut self, device: &mut impl Device) -> u32 {
		*self.scratch_framebuffer.get_or_insert_with(|| device.create_framebuffer())
	}

	/// Number of live backend objects of every kind.
	pub fn live_object_count(&self) -> usize {
		self.buffers.len() + self.textures.len() + self.samplers.len() + self.renderbuffers.len()
			+ self.framebuffers.len() + self.uniform_blocks.len() + self.transform_feedbacks.len()
			+ self.queries.len() + self.shaders.len() + self.programs.len() + self.vertex_states.len()
	}

	/// Destroys every backend object the manager owns.
	pub fn release_all(&mut self, device: &mut impl Device) {
		for key in self.vertex_states.keys().collect::<Vec<_>>() {
			self.destroy_vertex_state(device, key);
		}

		for object in self.framebuffers.drain() {
			object.destroy(device);
		}

		for object in self.transform_feedbacks.drain() {
			device.delete_transform_feedback(object.name);
		}

		for object in self.queries.drain() {
			device.delete_query(object.name);
		}

		for object in self.uniform_blocks.drain() {
			device.delete_buffer(object.buffer);
		}

		for object in self.buffers.drain() {
			device.delete_buffer(object.name);
		}

		for object in self.textures.drain() {
			device.delete_texture(object.name);
		}

		for object in self.samplers.drain() {
			device.delete_sampler(object.name);
		}

		for object in self.renderbuffers.drain() {
			device.delete_renderbuffer(object.name);
		}

		for (_, object) in self.programs.drain() {
			device.delete_program(object.name);
		}

		for (_, object) in self.shaders.drain() {
			device.delete_shader(object.name);
		}

		if let Some(name) = self.scratch_framebuffer.take() {
			device.delete_framebuffer(name);
		}

		self.program_keys.clear();
		self.pipeline_programs.clear();
		self.failed_programs.clear();
		self.vertex_state_keys.clear();

		log::debug!("Released all backend objects");
	}
}
