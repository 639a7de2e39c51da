use super::{ResourceManager, UniformBlockHandle, Identity, DefId, Span, bump};
use super::layout::{self, BlockLayout, UniformValue};
use super::shader::BlockInfo;
use crate::caps::Feature;
use crate::device::Device;
use crate::error::Error;

use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;


/// Values for one uniform block, encoded into a backend buffer with the layout of whichever
/// program block it's first bound to.
///
/// Members can be given as typed values by name, or as raw bytes already in the block's
/// layout. Typed values are written over the raw bytes.
#[derive(Debug, Clone, Default)]
pub struct UniformBlockDef {
	identity: Identity,
	values: RefCell<BTreeMap<String, UniformValue>>,
	raw: RefCell<Vec<u8>>,
	revision: Cell<u64>,
}

impl UniformBlockDef {
	pub fn new() -> UniformBlockDef {
		UniformBlockDef::default()
	}

	pub fn from_bytes(bytes: Vec<u8>) -> UniformBlockDef {
		UniformBlockDef {
			raw: RefCell::new(bytes),
			..UniformBlockDef::default()
		}
	}

	pub fn with(self, member: impl Into<String>, value: impl Into<UniformValue>) -> UniformBlockDef {
		self.set(member, value);
		self
	}

	/// `member` is relative to the block, e.g. `lights[1].color`. Arrays of scalars and
	/// vectors can also be set as a whole by their base name.
	pub fn set(&self, member: impl Into<String>, value: impl Into<UniformValue>) {
		self.values.borrow_mut().insert(member.into(), value.into());
		bump(&self.revision);
	}

	pub fn set_bytes(&self, bytes: Vec<u8>) {
		*self.raw.borrow_mut() = bytes;
		bump(&self.revision);
	}

	pub fn write_bytes(&self, offset: usize, bytes: &[u8]) -> Result<(), Error> {
		let mut raw = self.raw.borrow_mut();
		let raw_len = raw.len();

		let Some(dest) = raw.get_mut(offset..offset + bytes.len()) else {
			return Err(Error::malformed("uniform block", format!("write of {} bytes at {offset} overruns {raw_len} raw bytes", bytes.len())))
		};

		dest.copy_from_slice(bytes);
		drop(raw);

		bump(&self.revision);
		Ok(())
	}

	pub fn value(&self, member: &str) -> Option<UniformValue> {
		self.values.borrow().get(member).cloned()
	}

	pub fn raw_bytes(&self) -> Ref<'_, [u8]> {
		Ref::map(self.raw.borrow(), Vec::as_slice)
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}

	pub fn revision(&self) -> u64 {
		self.revision.get()
	}

	/// Produces the full contents of the block for `layout`.
	pub fn encode(&self, layout: &BlockLayout) -> Result<Vec<u8>, Error> {
		let raw = self.raw.borrow();

		if !raw.is_empty() && raw.len() != layout.size {
			return Err(Error::LayoutConsistency {
				block: layout.name.clone(),
				expected: layout.size,
				found: raw.len(),
			})
		}

		let mut bytes = vec![0u8; layout.size];
		bytes[..raw.len()].copy_from_slice(&raw);

		let values = self.values.borrow();

		for (name, value) in values.iter() {
			if layout.member(name).is_none() && !is_array_base(layout, name) {
				return Err(Error::malformed(format!("{}.{name}", layout.name), "no such member in block"))
			}
		}

		for member in layout.members.iter() {
			let value = match values.get(&member.name) {
				Some(value) => value.clone(),
				None => match array_element(&values, &member.name, member.value_type.component_count()) {
					Some(value) => value,
					None => continue,
				}
			};

			member.encode(&value, &mut bytes)
				.map_err(|reason| Error::malformed(format!("{}.{}", layout.name, member.name), reason))?;
		}

		Ok(bytes)
	}
}

fn is_array_base(layout: &BlockLayout, name: &str) -> bool {
	layout.members.iter()
		.filter_map(|member| layout::split_index(&member.name))
		.any(|(base, _)| base == name)
}

/// `weights[2]` out of flat data set for `weights`.
fn array_element(values: &BTreeMap<String, UniformValue>, name: &str, components: usize) -> Option<UniformValue> {
	let (base, index) = layout::split_index(name)?;
	values.get(base)?.element(index, components)
}


/// Smallest span covering every byte that differs.
fn changed_span(old: &[u8], new: &[u8]) -> Option<Span> {
	if old.len() != new.len() {
		return Some(Span::new(0, new.len()))
	}

	let start = old.iter().zip(new).position(|(a, b)| a != b)?;
	let end = old.len() - old.iter().rev().zip(new.iter().rev()).position(|(a, b)| a != b)?;
	Some(Span::new(start, end))
}


#[derive(Debug)]
pub struct UniformBlockObject {
	pub buffer: u32,
	/// Whatever layout the block was first bound with. Never changes.
	pub layout: Rc<BlockLayout>,
	pub bytes: Vec<u8>,
	revision: u64,
}


impl ResourceManager {
	/// Gets the buffer backing `def` up to date for a program block laid out as `block`.
	///
	/// Binding the same values to a block of a different size than the one they were first
	/// bound to is a layout conflict.
	pub fn prepare_uniform_block(&mut self, device: &mut impl Device, def: &UniformBlockDef, block: &BlockInfo)
		-> Result<UniformBlockHandle, Error>
	{
		self.capabilities.require(Feature::UniformBlocks)?;

		if let Some(key) = self.uniform_blocks.lookup(def.id()) {
			let Some(object) = self.uniform_blocks.get_mut(key) else {
				return Err(Error::malformed(&block.name, "stale uniform block handle"))
			};

			if object.layout.size != block.layout.size {
				return Err(Error::LayoutConsistency {
					block: block.name.clone(),
					expected: object.layout.size,
					found: block.layout.size,
				})
			}

			if object.revision != def.revision() {
				let bytes = def.encode(&object.layout)?;

				if let Some(span) = changed_span(&object.bytes, &bytes) {
					device.bind_buffer(gl::UNIFORM_BUFFER, object.buffer);
					device.buffer_sub_data(gl::UNIFORM_BUFFER, span.start, &bytes[span.start..span.end]);
				}

				object.bytes = bytes;
				object.revision = def.revision();
			}

			return Ok(key)
		}

		let bytes = def.encode(&block.layout)?;

		let buffer = device.create_buffer();
		device.bind_buffer(gl::UNIFORM_BUFFER, buffer);
		device.buffer_data(gl::UNIFORM_BUFFER, &bytes, gl::DYNAMIC_DRAW);

		log::debug!("Created uniform buffer {buffer} for block '{}' ({} bytes)", block.name, bytes.len());

		let object = UniformBlockObject {
			buffer,
			layout: block.layout.clone(),
			bytes,
			revision: def.revision(),
		};

		Ok(self.uniform_blocks.insert(def.id(), object))
	}

	pub fn uniform_block(&self, handle: UniformBlockHandle) -> Option<&UniformBlockObject> {
		self.uniform_blocks.get(handle)
	}

	/// The bytes last uploaded for `def`, if it has been bound yet.
	pub fn uniform_block_bytes(&self, def: &UniformBlockDef) -> Option<&[u8]> {
		let key = self.uniform_blocks.lookup(def.id())?;
		self.uniform_blocks.get(key).map(|object| object.bytes.as_slice())
	}

	pub fn delete_uniform_block(&mut self, device: &mut impl Device, def: &UniformBlockDef) {
		if let Some(object) = self.uniform_blocks.remove(def.id()) {
			log::debug!("Deleted uniform buffer {}", object.buffer);
			device.delete_buffer(object.buffer);
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use super::super::layout::{ValueType, ScalarKind};
	use glam::{Vec3, Mat4};

	fn example_layout() -> BlockLayout {
		BlockLayout::compute("Params", [
			("a".to_owned(), ValueType::Scalar(ScalarKind::Float)),
			("b".to_owned(), ValueType::Vector(ScalarKind::Float, 3)),
			("c".to_owned(), ValueType::Matrix { columns: 4, rows: 4 }),
		])
	}

	fn floats(bytes: &[u8]) -> Vec<f32> {
		bytes.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
	}

	#[test]
	fn values_land_at_member_offsets() {
		let def = UniformBlockDef::new()
			.with("a", 0.5f32)
			.with("b", Vec3::new(1.0, 2.0, 3.0))
			.with("c", Mat4::IDENTITY);

		let bytes = def.encode(&example_layout()).unwrap();
		assert_eq!(bytes.len(), 96);

		let floats = floats(&bytes);
		assert_eq!(floats[0], 0.5);
		assert_eq!(&floats[4..7], &[1.0, 2.0, 3.0]);
		assert_eq!(floats[8], 1.0);
		assert_eq!(floats[13], 1.0);
	}

	#[test]
	fn unknown_members_are_malformed() {
		let def = UniformBlockDef::new().with("missing", 1.0f32);
		assert!(matches!(def.encode(&example_layout()), Err(Error::MalformedDescriptor{..})));
	}

	#[test]
	fn raw_bytes_of_the_wrong_size_conflict() {
		let def = UniformBlockDef::from_bytes(vec![0; 64]);
		assert!(matches!(def.encode(&example_layout()), Err(Error::LayoutConsistency{ expected: 96, found: 64, .. })));
	}

	#[test]
	fn scalar_arrays_set_by_base_name() {
		let layout = BlockLayout::compute("Weights", layout::expand_array("w[0]", 3).into_iter()
			.map(|name| (name, ValueType::Scalar(ScalarKind::Float))));

		let def = UniformBlockDef::new().with("w", vec![1.0f32, 2.0, 3.0]);
		let bytes = def.encode(&layout).unwrap();
		let floats = floats(&bytes);
		assert_eq!((floats[0], floats[4], floats[8]), (1.0, 2.0, 3.0));
	}

	#[test]
	fn changed_span_covers_only_differences() {
		assert_eq!(changed_span(&[0, 1, 2, 3], &[0, 9, 9, 3]), Some(Span::new(1, 3)));
		assert_eq!(changed_span(&[0, 1], &[0, 1]), None);
	}
}
