use super::{ResourceManager, ProgramHandle, VertexStateHandle, Identity, DefId, bump};
use super::buffer::{BufferDef, BufferUsage};
use super::pipeline::PipelineDef;
use crate::caps::{Feature, Tier};
use crate::device::Device;
use crate::error::Error;
use crate::formats::{self, VertexFormat, VertexFormatInfo, IndexFormat};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Locations tracked by the enabled attribute mask.
const MAX_ATTRIBUTE_LOCATIONS: u32 = u32::BITS;


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum VertexStepMode {
	#[default]
	Vertex,
	Instance,
}

#[derive(Debug, Clone)]
pub struct VertexAttribute {
	pub buffer: Rc<BufferDef>,
	pub format: VertexFormat,
	pub offset: usize,
	/// Zero for tightly packed.
	pub stride: u32,
	pub step_mode: VertexStepMode,
}

impl VertexAttribute {
	pub fn new(buffer: Rc<BufferDef>, format: VertexFormat) -> VertexAttribute {
		VertexAttribute {
			buffer,
			format,
			offset: 0,
			stride: 0,
			step_mode: VertexStepMode::Vertex,
		}
	}

	pub fn with_offset(mut self, offset: usize) -> VertexAttribute {
		self.offset = offset;
		self
	}

	pub fn with_stride(mut self, stride: u32) -> VertexAttribute {
		self.stride = stride;
		self
	}

	pub fn per_instance(mut self) -> VertexAttribute {
		self.step_mode = VertexStepMode::Instance;
		self
	}
}


/// Named vertex shader inputs and where to read them from.
#[derive(Debug, Clone, Default)]
pub struct VertexAttributesDef {
	identity: Identity,
	attributes: RefCell<HashMap<String, VertexAttribute>>,
	revision: Cell<u64>,
}

impl VertexAttributesDef {
	pub fn new() -> VertexAttributesDef {
		VertexAttributesDef::default()
	}

	pub fn with(self, name: impl Into<String>, attribute: VertexAttribute) -> VertexAttributesDef {
		self.set(name, attribute);
		self
	}

	pub fn set(&self, name: impl Into<String>, attribute: VertexAttribute) {
		self.attributes.borrow_mut().insert(name.into(), attribute);
		bump(&self.revision);
	}

	pub fn remove(&self, name: &str) {
		if self.attributes.borrow_mut().remove(name).is_some() {
			bump(&self.revision);
		}
	}

	pub fn get(&self, name: &str) -> Option<VertexAttribute> {
		self.attributes.borrow().get(name).cloned()
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}

	pub fn revision(&self) -> u64 {
		self.revision.get()
	}
}


#[derive(Debug, Clone)]
pub struct IndicesDef {
	identity: Identity,
	pub buffer: Rc<BufferDef>,
	pub format: IndexFormat,
	/// In bytes.
	pub offset: usize,
}

impl IndicesDef {
	pub fn new(buffer: Rc<BufferDef>, format: IndexFormat) -> IndicesDef {
		IndicesDef {
			identity: Identity::new(),
			buffer,
			format,
			offset: 0,
		}
	}

	pub fn with_offset(mut self, offset: usize) -> IndicesDef {
		self.offset = offset;
		self
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}

	/// Number of whole indices available from `offset`.
	pub fn count(&self) -> usize {
		let (_, size) = formats::index_format(self.format);
		self.buffer.len().saturating_sub(self.offset) / size as usize
	}
}


#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
	program_serial: u64,
	attributes_revision: u64,
	buffer_serials: Vec<u64>,
	index_serial: Option<u64>,
}

/// A vertex array object for one (pipeline, vertices, indices) combination.
#[derive(Debug)]
pub struct VertexStateObject {
	pub vao: u32,
	snapshot: Snapshot,
}


#[derive(Debug)]
struct ResolvedAttribute {
	location: u32,
	buffer: u32,
	info: VertexFormatInfo,
	stride: u32,
	offset: usize,
	divisor: u32,
}

#[derive(Debug)]
struct ResolvedInputs {
	attributes: Vec<ResolvedAttribute>,
	buffer_serials: Vec<u64>,
	index_buffer: Option<(u32, u64)>,
}


impl ResourceManager {
	/// Makes the vertex inputs of `program` read from `vertices` and `indices`, leaving them
	/// bound for the next draw.
	pub fn bind_vertex_state(&mut self, device: &mut impl Device, pipeline: &PipelineDef, program: ProgramHandle,
		vertices: &VertexAttributesDef, indices: Option<&IndicesDef>) -> Result<(), Error>
	{
		let Some(program_object) = self.programs.get(program) else {
			return Err(Error::malformed("pipeline", "program is not prepared"))
		};

		let reflection = program_object.reflection.clone();
		let program_serial = program_object.serial;

		let inputs = self.resolve_vertex_inputs(device, &reflection.attributes, vertices, indices)?;

		if !self.capabilities.supports(Feature::VertexArrayObjects) {
			self.bind_vertex_inputs_directly(device, &inputs);
			return Ok(())
		}

		let snapshot = Snapshot {
			program_serial,
			attributes_revision: vertices.revision(),
			buffer_serials: inputs.buffer_serials.clone(),
			index_serial: inputs.index_buffer.map(|(_, serial)| serial),
		};

		let key = (pipeline.id(), vertices.id(), indices.map(IndicesDef::id));

		if let Some(&handle) = self.vertex_state_keys.get(&key) {
			match self.vertex_states.get(handle) {
				Some(object) if object.snapshot == snapshot => {
					device.bind_vertex_array(object.vao);
					return Ok(())
				}

				_ => {
					self.destroy_vertex_state(device, handle);
					self.vertex_state_keys.remove(&key);
				}
			}
		}

		let vao = device.create_vertex_array();
		device.bind_vertex_array(vao);

		for attribute in inputs.attributes.iter() {
			device.enable_vertex_attrib_array(attribute.location);
			set_attribute_pointer(device, attribute);

			if attribute.divisor != 0 {
				device.vertex_attrib_divisor(attribute.location, attribute.divisor);
			}
		}

		if let Some((name, _)) = inputs.index_buffer {
			device.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, name);
		}

		log::debug!("Created vertex array {vao}");

		let handle = self.vertex_states.insert(VertexStateObject { vao, snapshot });
		self.vertex_state_keys.insert(key, handle);

		Ok(())
	}

	fn resolve_vertex_inputs(&mut self, device: &mut impl Device, program_attributes: &[super::AttributeInfo],
		vertices: &VertexAttributesDef, indices: Option<&IndicesDef>) -> Result<ResolvedInputs, Error>
	{
		let tier = self.capabilities.tier;
		let instancing = self.capabilities.supports(Feature::Instancing);

		let mut resolved = ResolvedInputs {
			attributes: Vec::with_capacity(program_attributes.len()),
			buffer_serials: Vec::with_capacity(program_attributes.len()),
			index_buffer: None,
		};

		// Built-ins have no location and can't be fed.
		for program_attribute in program_attributes.iter().filter(|attribute| attribute.location >= 0) {
			let path = format!("vertices.{}", program_attribute.name);

			let location = program_attribute.location as u32;
			if location >= MAX_ATTRIBUTE_LOCATIONS {
				return Err(Error::LimitExceeded { what: "vertex attribute location", requested: location, max: MAX_ATTRIBUTE_LOCATIONS })
			}

			let attribute = vertices.get(&program_attribute.name)
				.ok_or_else(|| Error::malformed(&path, "no data for vertex shader input"))?;

			let info = match formats::vertex_format(attribute.format, tier) {
				Some(info) => info,
				None => {
					let integer = formats::vertex_format(attribute.format, Tier::Extended).map_or(false, |info| info.integer);
					return match integer {
						true => Err(Error::UnsupportedFeature { feature: Feature::IntegerAttributes, tier }),
						false => Err(Error::malformed(&path, format!("{:?} is unavailable on the {tier:?} tier", attribute.format))),
					}
				}
			};

			if attribute.offset + info.byte_size as usize > attribute.buffer.len() {
				return Err(Error::malformed(&path, format!("attribute at offset {} overruns buffer of {} bytes",
					attribute.offset, attribute.buffer.len())))
			}

			let divisor = match attribute.step_mode {
				VertexStepMode::Vertex => 0,
				VertexStepMode::Instance if instancing => 1,
				VertexStepMode::Instance => {
					self.warn(Error::UnsupportedFeature { feature: Feature::Instancing, tier });
					0
				}
			};

			let key = self.prepare_buffer(device, &attribute.buffer);
			let Some(buffer) = self.buffer(key) else {
				return Err(Error::malformed(&path, "buffer could not be created"))
			};

			resolved.buffer_serials.push(buffer.serial);
			resolved.attributes.push(ResolvedAttribute {
				location,
				buffer: buffer.name,
				info,
				stride: attribute.stride,
				offset: attribute.offset,
				divisor,
			});
		}

		if let Some(indices) = indices {
			if indices.format == IndexFormat::Uint32 {
				self.capabilities.require(Feature::Uint32Indices)?;
			}

			if indices.buffer.usage != BufferUsage::Index {
				return Err(Error::malformed("indices", format!("buffer has {:?} usage", indices.buffer.usage)))
			}

			let key = self.prepare_buffer(device, &indices.buffer);
			let Some(buffer) = self.buffer(key) else {
				return Err(Error::malformed("indices", "buffer could not be created"))
			};

			resolved.index_buffer = Some((buffer.name, buffer.serial));
		}

		Ok(resolved)
	}

	/// Without vertex array objects every draw sets up the global attribute state, and undoes
	/// whatever the previous draw left enabled.
	fn bind_vertex_inputs_directly(&mut self, device: &mut impl Device, inputs: &ResolvedInputs) {
		let instancing = self.capabilities.supports(Feature::Instancing);
		let mut enabled = 0u32;

		for attribute in inputs.attributes.iter() {
			enabled |= 1 << attribute.location;

			device.enable_vertex_attrib_array(attribute.location);
			set_attribute_pointer(device, attribute);

			if instancing {
				device.vertex_attrib_divisor(attribute.location, attribute.divisor);
			}
		}

		let stale = self.enabled_attributes & !enabled;
		for location in (0..MAX_ATTRIBUTE_LOCATIONS).filter(|location| stale & (1 << location) != 0) {
			device.disable_vertex_attrib_array(location);
		}

		self.enabled_attributes = enabled;

		if let Some((name, _)) = inputs.index_buffer {
			device.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, name);
		}
	}

	pub(crate) fn destroy_vertex_state(&mut self, device: &mut impl Device, handle: VertexStateHandle) {
		if let Some(object) = self.vertex_states.remove(handle) {
			log::debug!("Deleted vertex array {}", object.vao);
			device.delete_vertex_array(object.vao);
		}
	}

	/// Forgets every vertex array built for `vertices`.
	pub fn delete_vertex_state(&mut self, device: &mut impl Device, vertices: &VertexAttributesDef) {
		let id = vertices.id();
		self.delete_vertex_states_where(device, |&(_, vertices, _)| vertices == id);
	}

	pub(crate) fn delete_vertex_states_using(&mut self, device: &mut impl Device, pipeline: DefId) {
		self.delete_vertex_states_where(device, |&(pipeline_id, _, _)| pipeline_id == pipeline);
	}

	fn delete_vertex_states_where(&mut self, device: &mut impl Device, predicate: impl Fn(&(DefId, DefId, Option<DefId>)) -> bool) {
		let keys: Vec<_> = self.vertex_state_keys.keys().filter(|key| predicate(key)).copied().collect();

		for key in keys {
			if let Some(handle) = self.vertex_state_keys.remove(&key) {
				self.destroy_vertex_state(device, handle);
			}
		}
	}
}

fn set_attribute_pointer(device: &mut impl Device, attribute: &ResolvedAttribute) {
	device.bind_buffer(gl::ARRAY_BUFFER, attribute.buffer);

	let info = &attribute.info;
	if info.integer {
		device.vertex_attrib_i_pointer(attribute.location, info.components, info.ty, attribute.stride, attribute.offset);
	} else {
		device.vertex_attrib_pointer(attribute.location, info.components, info.ty, info.normalized, attribute.stride, attribute.offset);
	}
}
