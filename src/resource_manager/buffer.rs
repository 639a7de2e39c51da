use super::{ResourceManager, BufferHandle, Identity, DefId, Span, mark_dirty, bump};
use crate::device::Device;
use crate::error::Error;

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum BufferUsage {
	Vertex,
	Index,
	Uniform,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
pub enum BufferHint {
	#[default]
	Static,
	Dynamic,
	Stream,
}


/// Caller side byte storage that gets mirrored into a backend buffer on use.
///
/// Writes that keep the size are uploaded as a single sub-write covering every byte
/// touched since the last upload. Anything that changes the size recreates the buffer.
#[derive(Debug, Clone)]
pub struct BufferDef {
	identity: Identity,
	pub usage: BufferUsage,
	pub hint: BufferHint,

	data: RefCell<Vec<u8>>,
	revision: Cell<u64>,
	dirty: Cell<Option<Span>>,
}

impl BufferDef {
	pub fn new(usage: BufferUsage, size: usize) -> BufferDef {
		BufferDef {
			identity: Identity::new(),
			usage,
			hint: BufferHint::default(),
			data: RefCell::new(vec![0; size]),
			revision: Cell::new(0),
			dirty: Cell::new(None),
		}
	}

	pub fn from_slice<T: bytemuck::Pod>(usage: BufferUsage, data: &[T]) -> BufferDef {
		BufferDef {
			data: RefCell::new(bytemuck::cast_slice(data).to_vec()),
			..BufferDef::new(usage, 0)
		}
	}

	pub fn with_hint(mut self, hint: BufferHint) -> BufferDef {
		self.hint = hint;
		self
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}

	pub fn len(&self) -> usize {
		self.data.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn data(&self) -> Ref<'_, [u8]> {
		Ref::map(self.data.borrow(), Vec::as_slice)
	}

	pub fn revision(&self) -> u64 {
		self.revision.get()
	}

	/// Overwrites part of the buffer. The range must lie within the current size.
	pub fn write<T: bytemuck::Pod>(&self, offset: usize, values: &[T]) -> Result<(), Error> {
		let bytes: &[u8] = bytemuck::cast_slice(values);
		let end = offset + bytes.len();

		let mut data = self.data.borrow_mut();
		if end > data.len() {
			return Err(Error::malformed("buffer", format!("write of {} bytes at {offset} overruns buffer of {} bytes", bytes.len(), data.len())))
		}

		data[offset..end].copy_from_slice(bytes);
		mark_dirty(&self.dirty, Span::new(offset, end));
		Ok(())
	}

	/// Replaces the whole contents. Only recreates the backend buffer if the size changed.
	pub fn set_data<T: bytemuck::Pod>(&self, values: &[T]) {
		let bytes: &[u8] = bytemuck::cast_slice(values);

		if bytes.len() == self.len() {
			self.data.borrow_mut().copy_from_slice(bytes);
			mark_dirty(&self.dirty, Span::new(0, bytes.len()));
		} else {
			*self.data.borrow_mut() = bytes.to_vec();
			self.dirty.set(None);
			bump(&self.revision);
		}
	}

	/// Changes the size, keeping the common prefix and zero filling the rest.
	pub fn resize(&self, size: usize) {
		if size == self.len() {
			return
		}

		self.data.borrow_mut().resize(size, 0);
		self.dirty.set(None);
		bump(&self.revision);
	}

	/// Updates the caller side copy without scheduling an upload, for when the backend
	/// buffer was already written by the device itself.
	pub(crate) fn mirror(&self, offset: usize, bytes: &[u8]) {
		let mut data = self.data.borrow_mut();
		if let Some(dest) = data.get_mut(offset..offset + bytes.len()) {
			dest.copy_from_slice(bytes);
		}
	}

	pub(crate) fn take_dirty(&self) -> Option<Span> {
		self.dirty.take()
	}
}


/// A range of a buffer, bound wherever a shader reads or writes buffer memory directly.
#[derive(Debug, Clone)]
pub struct BufferView {
	pub buffer: Rc<BufferDef>,
	pub offset: usize,
	/// Up to the end of the buffer if unset.
	pub size: Option<usize>,
}

impl BufferView {
	pub fn whole(buffer: Rc<BufferDef>) -> BufferView {
		BufferView { buffer, offset: 0, size: None }
	}

	pub fn range(buffer: Rc<BufferDef>, offset: usize, size: usize) -> BufferView {
		BufferView { buffer, offset, size: Some(size) }
	}

	pub fn resolved_size(&self) -> usize {
		self.size.unwrap_or_else(|| self.buffer.len().saturating_sub(self.offset))
	}

	pub fn validate(&self, path: &str) -> Result<(), Error> {
		let end = self.offset + self.resolved_size();
		if end > self.buffer.len() {
			return Err(Error::malformed(path, format!("view ends at {end} but buffer is only {} bytes", self.buffer.len())))
		}

		Ok(())
	}
}


#[derive(Debug)]
pub struct BufferObject {
	pub name: u32,
	pub target: u32,
	pub size: usize,
	pub serial: u64,
	revision: u64,
}


fn buffer_target(usage: BufferUsage, extended: bool) -> u32 {
	match usage {
		BufferUsage::Vertex => gl::ARRAY_BUFFER,
		BufferUsage::Index => gl::ELEMENT_ARRAY_BUFFER,
		BufferUsage::Uniform if extended => gl::UNIFORM_BUFFER,
		BufferUsage::Uniform => gl::ARRAY_BUFFER,
	}
}

fn buffer_usage_hint(hint: BufferHint) -> u32 {
	match hint {
		BufferHint::Static => gl::STATIC_DRAW,
		BufferHint::Dynamic => gl::DYNAMIC_DRAW,
		BufferHint::Stream => gl::STREAM_DRAW,
	}
}


impl ResourceManager {
	pub fn prepare_buffer(&mut self, device: &mut impl Device, def: &BufferDef) -> BufferHandle {
		if let Some(key) = self.buffers.lookup(def.id()) {
			let up_to_date = self.buffers.get(key)
				.map_or(false, |object| object.revision == def.revision());

			if up_to_date {
				self.flush_buffer_writes(device, key, def);
				return key
			}

			self.delete_buffer(device, def);
		}

		let target = buffer_target(def.usage, self.capabilities.is_extended());
		let name = device.create_buffer();

		self.bind_buffer_for_upload(device, target, name);
		device.buffer_data(target, &def.data(), buffer_usage_hint(def.hint));
		def.take_dirty();

		log::debug!("Created buffer {name} ({:?}, {} bytes)", def.usage, def.len());

		let object = BufferObject {
			name,
			target,
			size: def.len(),
			serial: self.next_serial(),
			revision: def.revision(),
		};

		self.buffers.insert(def.id(), object)
	}

	fn flush_buffer_writes(&mut self, device: &mut impl Device, key: BufferHandle, def: &BufferDef) {
		let Some(span) = def.take_dirty() else {
			return
		};

		let Some(&BufferObject{name, target, ..}) = self.buffers.get(key) else {
			return
		};

		self.bind_buffer_for_upload(device, target, name);

		let data = def.data();
		device.buffer_sub_data(target, span.start, &data[span.start..span.end]);
	}

	fn bind_buffer_for_upload(&self, device: &mut impl Device, target: u32, name: u32) {
		// Element buffer bindings are vertex array state.
		if target == gl::ELEMENT_ARRAY_BUFFER && self.capabilities.supports(crate::caps::Feature::VertexArrayObjects) {
			device.bind_vertex_array(0);
		}

		device.bind_buffer(target, name);
	}

	pub fn buffer(&self, handle: BufferHandle) -> Option<&BufferObject> {
		self.buffers.get(handle)
	}

	pub fn delete_buffer(&mut self, device: &mut impl Device, def: &BufferDef) {
		if let Some(object) = self.buffers.remove(def.id()) {
			log::debug!("Deleted buffer {}", object.name);
			device.delete_buffer(object.name);
		}
	}
}
