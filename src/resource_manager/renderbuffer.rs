use super::{ResourceManager, RenderbufferHandle, Identity, DefId, bump};
use crate::caps::{Feature, Tier};
use crate::device::Device;
use crate::error::Error;
use crate::formats::{self, TextureFormat};

use std::cell::Cell;


/// Render target storage that can't be sampled, but may be multisampled.
#[derive(Debug, Clone)]
pub struct RenderbufferDef {
	identity: Identity,
	format: Cell<TextureFormat>,
	size: Cell<(u32, u32)>,
	sample_count: Cell<u32>,
	revision: Cell<u64>,
}

impl RenderbufferDef {
	pub fn new(format: TextureFormat, width: u32, height: u32) -> RenderbufferDef {
		RenderbufferDef {
			identity: Identity::new(),
			format: Cell::new(format),
			size: Cell::new((width, height)),
			sample_count: Cell::new(1),
			revision: Cell::new(0),
		}
	}

	pub fn with_samples(self, sample_count: u32) -> RenderbufferDef {
		self.sample_count.set(sample_count.max(1));
		self
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}

	pub fn format(&self) -> TextureFormat {
		self.format.get()
	}

	pub fn size(&self) -> (u32, u32) {
		self.size.get()
	}

	pub fn sample_count(&self) -> u32 {
		self.sample_count.get()
	}

	pub fn revision(&self) -> u64 {
		self.revision.get()
	}

	pub fn set_size(&self, width: u32, height: u32) {
		if (width, height) != self.size() {
			self.size.set((width, height));
			bump(&self.revision);
		}
	}

	pub fn set_format(&self, format: TextureFormat) {
		if format != self.format() {
			self.format.set(format);
			bump(&self.revision);
		}
	}

	pub fn set_sample_count(&self, sample_count: u32) {
		let sample_count = sample_count.max(1);
		if sample_count != self.sample_count() {
			self.sample_count.set(sample_count);
			bump(&self.revision);
		}
	}
}


#[derive(Debug)]
pub struct RenderbufferObject {
	pub name: u32,
	pub size: (u32, u32),
	pub format: TextureFormat,
	/// What the storage was actually allocated with, which may be less than requested.
	pub samples: u32,
	pub serial: u64,
	revision: u64,
}


impl ResourceManager {
	pub fn prepare_renderbuffer(&mut self, device: &mut impl Device, def: &RenderbufferDef) -> Result<RenderbufferHandle, Error> {
		if let Some(key) = self.renderbuffers.lookup(def.id()) {
			let up_to_date = self.renderbuffers.get(key)
				.map_or(false, |object| object.revision == def.revision());

			if up_to_date {
				return Ok(key)
			}

			self.delete_renderbuffer(device, def);
		}

		let (width, height) = def.size();
		let samples = self.effective_samples(def.sample_count());
		let name = self.allocate_renderbuffer(device, def.format(), width, height, samples)?;

		let object = RenderbufferObject {
			name,
			size: (width, height),
			format: def.format(),
			samples,
			serial: self.next_serial(),
			revision: def.revision(),
		};

		Ok(self.renderbuffers.insert(def.id(), object))
	}

	/// Clamps a requested sample count to what the device can do, reporting when that means
	/// falling back to single sampled storage.
	pub(crate) fn effective_samples(&mut self, requested: u32) -> u32 {
		if requested <= 1 {
			return 1
		}

		if let Err(error) = self.capabilities.require(Feature::MultisampleRenderbuffers) {
			self.warn(error);
			return 1
		}

		requested.min(self.capabilities.max_samples.max(1))
	}

	/// Creates renderbuffer storage outside of any descriptor.
	pub(crate) fn allocate_renderbuffer(&mut self, device: &mut impl Device, format: TextureFormat,
		width: u32, height: u32, samples: u32) -> Result<u32, Error>
	{
		let capabilities = &self.capabilities;
		let internal_format = formats::renderbuffer_format(format, capabilities.tier).ok_or_else(|| {
			let on_extended = formats::renderbuffer_format(format, Tier::Extended).is_some();
			capabilities.missing(Feature::SizedTextureFormats, on_extended, "renderbuffer", format!("Rendering to {format:?}"))
		})?;

		let name = device.create_renderbuffer();
		let samples_arg = if samples > 1 { samples } else { 0 };
		device.renderbuffer_storage(name, samples_arg, internal_format, width, height);

		log::debug!("Created renderbuffer {name} ({format:?} {width}x{height}, {samples} samples)");

		Ok(name)
	}

	pub fn renderbuffer(&self, handle: RenderbufferHandle) -> Option<&RenderbufferObject> {
		self.renderbuffers.get(handle)
	}

	pub fn delete_renderbuffer(&mut self, device: &mut impl Device, def: &RenderbufferDef) {
		if let Some(object) = self.renderbuffers.remove(def.id()) {
			log::debug!("Deleted renderbuffer {}", object.name);
			device.delete_renderbuffer(object.name);
		}
	}
}
