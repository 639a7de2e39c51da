use super::ResourceManager;
use super::layout::{self, BlockLayout, ValueType};
use crate::caps::{Capabilities, Feature};
use crate::device::{Device, UniformData};
use crate::error::Error;

use std::rc::Rc;


#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum ShaderType {
	Vertex = gl::VERTEX_SHADER,
	Fragment = gl::FRAGMENT_SHADER,
}

impl ShaderType {
	pub fn stage_name(self) -> &'static str {
		match self {
			ShaderType::Vertex => "vertex",
			ShaderType::Fragment => "fragment",
		}
	}
}


/// A compiled stage, shared by every program built from the same source text.
#[derive(Debug)]
pub(crate) struct ShaderObject {
	pub name: u32,
	pub users: u32,
}


#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
	pub name: String,
	/// Negative for built-ins, which are never bound.
	pub location: i32,
	pub ty: u32,
	pub size: i32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformKind {
	Value(ValueType),
	/// A sampler, permanently assigned to `unit` at link time.
	Texture { unit: u32, target: u32 },
}

/// One uniform outside of any block. Arrays are expanded into one entry per element.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformInfo {
	pub name: String,
	pub location: i32,
	pub ty: u32,
	pub kind: UniformKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
	pub name: String,
	pub index: u32,
	pub binding: u32,
	pub layout: Rc<BlockLayout>,
}


/// Everything the executor needs to know about a linked program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramReflection {
	pub attributes: Vec<AttributeInfo>,
	pub uniforms: Vec<UniformInfo>,
	pub blocks: Vec<BlockInfo>,
}

impl ProgramReflection {
	pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
		self.attributes.iter().find(|attribute| attribute.name == name)
	}

	pub fn uniform(&self, name: &str) -> Option<&UniformInfo> {
		self.uniforms.iter().find(|uniform| uniform.name == name)
	}

	pub fn block(&self, name: &str) -> Option<&BlockInfo> {
		self.blocks.iter().find(|block| block.name == name)
	}
}


fn sampler_target(ty: u32) -> Option<u32> {
	let target = match ty {
		gl::SAMPLER_2D | gl::SAMPLER_2D_SHADOW | gl::INT_SAMPLER_2D | gl::UNSIGNED_INT_SAMPLER_2D
			=> gl::TEXTURE_2D,

		gl::SAMPLER_CUBE | gl::SAMPLER_CUBE_SHADOW | gl::INT_SAMPLER_CUBE | gl::UNSIGNED_INT_SAMPLER_CUBE
			=> gl::TEXTURE_CUBE_MAP,

		gl::SAMPLER_2D_ARRAY | gl::SAMPLER_2D_ARRAY_SHADOW | gl::INT_SAMPLER_2D_ARRAY | gl::UNSIGNED_INT_SAMPLER_2D_ARRAY
			=> gl::TEXTURE_2D_ARRAY,

		gl::SAMPLER_3D | gl::INT_SAMPLER_3D | gl::UNSIGNED_INT_SAMPLER_3D
			=> gl::TEXTURE_3D,

		_ => return None,
	};

	Some(target)
}


impl ResourceManager {
	/// Compiles `source`, or reuses an earlier compile of the same text for the same stage.
	pub(crate) fn acquire_shader(&mut self, device: &mut impl Device, shader_type: ShaderType, source: &str) -> Result<u32, Error> {
		let key = (shader_type, source.to_owned());

		if let Some(object) = self.shaders.get_mut(&key) {
			object.users += 1;
			return Ok(object.name)
		}

		let name = device.create_shader(shader_type as u32);

		if let Err(log) = device.compile_shader(name, source) {
			device.delete_shader(name);

			return Err(Error::Compile {
				stage: shader_type.stage_name(),
				source_text: source.to_owned(),
				log,
			})
		}

		log::debug!("Compiled {} shader {name}", shader_type.stage_name());

		self.shaders.insert(key, ShaderObject { name, users: 1 });
		Ok(name)
	}

	pub(crate) fn release_shader(&mut self, device: &mut impl Device, shader_type: ShaderType, source: &str) {
		let key = (shader_type, source.to_owned());

		let Some(object) = self.shaders.get_mut(&key) else {
			return
		};

		object.users = object.users.saturating_sub(1);

		if object.users == 0 {
			let name = object.name;
			self.shaders.remove(&key);
			device.delete_shader(name);
			log::debug!("Deleted {} shader {name}", shader_type.stage_name());
		}
	}
}


/// Reads back attributes, uniforms and blocks of a freshly linked program, and assigns texture
/// units and block bindings to it.
///
/// Also returns anything suspicious found along the way, which doesn't prevent the program
/// from being used.
pub(crate) fn reflect_program(device: &mut impl Device, program: u32, capabilities: &Capabilities)
	-> (ProgramReflection, Vec<Error>)
{
	let mut reflection = ProgramReflection::default();
	let mut warnings = Vec::new();

	for attribute in device.active_attributes(program) {
		reflection.attributes.push(AttributeInfo {
			name: attribute.name,
			location: attribute.location,
			ty: attribute.ty,
			size: attribute.size,
		});
	}

	let active_uniforms = device.active_uniforms(program);
	let active_blocks = match capabilities.supports(Feature::UniformBlocks) {
		true => device.active_uniform_blocks(program),
		false => Vec::new(),
	};

	let mut next_texture_unit = 0;
	device.use_program(program);

	for uniform in active_uniforms.iter().filter(|uniform| uniform.block_index.is_none()) {
		let value_type = ValueType::from_gl(uniform.ty);
		let target = sampler_target(uniform.ty);

		if value_type.is_none() && target.is_none() {
			log::warn!("Ignoring uniform '{}' of unknown type {:#x}", uniform.name, uniform.ty);
			continue
		}

		for name in layout::expand_array(&uniform.name, uniform.size) {
			let Some(location) = device.uniform_location(program, &name) else {
				continue
			};

			let kind = match (value_type, target) {
				(Some(value_type), _) => UniformKind::Value(value_type),

				(None, Some(target)) => {
					let unit = next_texture_unit;
					next_texture_unit += 1;

					// Units past the limit are rejected when bound.
					if unit < capabilities.max_texture_units {
						device.uniform(location, UniformData::Int { components: 1, values: &[unit as i32] });
					}

					UniformKind::Texture { unit, target }
				}

				(None, None) => continue,
			};

			reflection.uniforms.push(UniformInfo { name, location, ty: uniform.ty, kind });
		}
	}

	device.use_program(0);

	for (index, block) in active_blocks.iter().enumerate() {
		let index = index as u32;
		let prefix = format!("{}.", block.name);

		let members = active_uniforms.iter()
			.filter(|uniform| uniform.block_index == Some(index))
			.filter_map(|uniform| {
				let value_type = ValueType::from_gl(uniform.ty)?;
				let name = uniform.name.strip_prefix(&prefix).unwrap_or(&uniform.name);
				Some(layout::expand_array(name, uniform.size).into_iter().map(move |name| (name, value_type)))
			})
			.flatten();

		let mut layout = BlockLayout::compute(block.name.clone(), members);

		if layout.size != block.data_size {
			warnings.push(Error::LayoutConsistency {
				block: block.name.clone(),
				expected: layout.size,
				found: block.data_size,
			});

			layout.size = layout.size.max(block.data_size);
		}

		// Bindings are handed out in block order, so they're stable for a given program.
		device.uniform_block_binding(program, index, index);

		reflection.blocks.push(BlockInfo {
			name: block.name.clone(),
			index,
			binding: index,
			layout: Rc::new(layout),
		});
	}

	(reflection, warnings)
}
