use super::{ResourceManager, TextureHandle, Identity, DefId, SamplerParams, bump};
use crate::caps::{Feature, Tier};
use crate::device::Device;
use crate::error::Error;
use crate::formats::{self, TextureDimension, TextureFormat, TextureFormatInfo};

use std::cell::{Cell, RefCell};


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct TextureSize {
	pub width: u32,
	pub height: u32,
	/// Layers for array textures, depth for 3D textures, 6 for cube maps.
	pub depth_or_layers: u32,
}

impl TextureSize {
	pub fn new_2d(width: u32, height: u32) -> TextureSize {
		TextureSize { width, height, depth_or_layers: 1 }
	}

	pub fn texel_count(&self) -> usize {
		self.width as usize * self.height as usize * self.depth_or_layers as usize
	}

	pub(crate) fn mip(&self, level: u32, dimension: TextureDimension) -> TextureSize {
		let depth_or_layers = match dimension {
			TextureDimension::D3 => (self.depth_or_layers >> level).max(1),
			_ => self.depth_or_layers,
		};

		TextureSize {
			width: (self.width >> level).max(1),
			height: (self.height >> level).max(1),
			depth_or_layers,
		}
	}
}


/// A box within mip level 0 of a texture.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct TextureRegion {
	pub x: u32,
	pub y: u32,
	pub z: u32,
	pub width: u32,
	pub height: u32,
	pub depth: u32,
}

impl TextureRegion {
	pub fn whole(size: TextureSize) -> TextureRegion {
		TextureRegion {
			x: 0, y: 0, z: 0,
			width: size.width,
			height: size.height,
			depth: size.depth_or_layers,
		}
	}

	pub fn union(self, other: TextureRegion) -> TextureRegion {
		let x = self.x.min(other.x);
		let y = self.y.min(other.y);
		let z = self.z.min(other.z);

		TextureRegion {
			x, y, z,
			width: (self.x + self.width).max(other.x + other.width) - x,
			height: (self.y + self.height).max(other.y + other.height) - y,
			depth: (self.z + self.depth).max(other.z + other.depth) - z,
		}
	}

	fn fits_in(&self, size: TextureSize) -> bool {
		let within = |start: u32, len: u32, limit: u32| start.checked_add(len).is_some_and(|end| end <= limit);

		within(self.x, self.width, size.width)
			&& within(self.y, self.height, size.height)
			&& within(self.z, self.depth, size.depth_or_layers)
	}
}


/// Image storage plus an optional caller side copy of mip level 0.
///
/// Changing the format, size or mip count recreates the backend texture. Writing texels
/// only uploads the region touched since the last use.
#[derive(Debug, Clone)]
pub struct TextureDef {
	identity: Identity,
	dimension: TextureDimension,

	format: Cell<TextureFormat>,
	size: Cell<TextureSize>,
	mip_level_count: Cell<u32>,
	generate_mipmaps: Cell<bool>,

	data: RefCell<Option<Vec<u8>>>,
	revision: Cell<u64>,
	dirty: Cell<Option<TextureRegion>>,
	mipmaps_dirty: Cell<bool>,
}

impl TextureDef {
	pub fn new(dimension: TextureDimension, format: TextureFormat, size: TextureSize) -> TextureDef {
		let size = match dimension {
			TextureDimension::Cube => TextureSize { depth_or_layers: 6, ..size },
			TextureDimension::D2 => TextureSize { depth_or_layers: 1, ..size },
			_ => size,
		};

		TextureDef {
			identity: Identity::new(),
			dimension,
			format: Cell::new(format),
			size: Cell::new(size),
			mip_level_count: Cell::new(1),
			generate_mipmaps: Cell::new(false),
			data: RefCell::new(None),
			revision: Cell::new(0),
			dirty: Cell::new(None),
			mipmaps_dirty: Cell::new(false),
		}
	}

	pub fn new_2d(format: TextureFormat, width: u32, height: u32) -> TextureDef {
		TextureDef::new(TextureDimension::D2, format, TextureSize::new_2d(width, height))
	}

	pub fn render_target(format: TextureFormat, width: u32, height: u32) -> TextureDef {
		TextureDef::new_2d(format, width, height)
	}

	pub fn with_mip_levels(self, count: u32) -> TextureDef {
		self.mip_level_count.set(count.max(1));
		self
	}

	pub fn with_generate_mipmaps(self, generate: bool) -> TextureDef {
		self.generate_mipmaps.set(generate);
		self
	}

	pub fn with_data(self, bytes: &[u8]) -> Result<TextureDef, Error> {
		self.set_data(bytes)?;
		Ok(self)
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}

	pub fn dimension(&self) -> TextureDimension {
		self.dimension
	}

	pub fn format(&self) -> TextureFormat {
		self.format.get()
	}

	pub fn size(&self) -> TextureSize {
		self.size.get()
	}

	pub fn mip_level_count(&self) -> u32 {
		self.mip_level_count.get()
	}

	pub fn generate_mipmaps(&self) -> bool {
		self.generate_mipmaps.get()
	}

	pub fn revision(&self) -> u64 {
		self.revision.get()
	}

	pub fn has_mipmaps(&self) -> bool {
		self.mip_level_count() > 1 || self.generate_mipmaps()
	}

	pub fn set_size(&self, size: TextureSize) {
		if size != self.size() {
			self.size.set(size);
			self.invalidate_storage();
		}
	}

	pub fn set_format(&self, format: TextureFormat) {
		if format != self.format() {
			self.format.set(format);
			self.invalidate_storage();
		}
	}

	pub fn set_mip_level_count(&self, count: u32) {
		let count = count.max(1);
		if count != self.mip_level_count() {
			self.mip_level_count.set(count);
			bump(&self.revision);
		}
	}

	/// Not structural. Turning generation on regenerates the chain on next use.
	pub fn set_generate_mipmaps(&self, generate: bool) {
		if generate != self.generate_mipmaps() {
			self.generate_mipmaps.set(generate);
			self.mipmaps_dirty.set(generate);
		}
	}

	/// Replaces all of mip level 0.
	pub fn set_data(&self, bytes: &[u8]) -> Result<(), Error> {
		self.write(TextureRegion::whole(self.size()), bytes)
	}

	/// Writes tightly packed texels into a region of mip level 0.
	pub fn write(&self, region: TextureRegion, bytes: &[u8]) -> Result<(), Error> {
		let size = self.size();
		let bytes_per_texel = self.bytes_per_texel()?;

		if !region.fits_in(size) {
			return Err(Error::malformed("texture", format!("region {region:?} exceeds texture of size {size:?}")))
		}

		let row_len = region.width as usize * bytes_per_texel;
		let expected = row_len * region.height as usize * region.depth as usize;
		if bytes.len() != expected {
			return Err(Error::malformed("texture", format!("expected {expected} bytes for region {region:?}, got {}", bytes.len())))
		}

		let mut data = self.data.borrow_mut();
		let data = data.get_or_insert_with(|| vec![0; size.texel_count() * bytes_per_texel]);

		for z in 0..region.depth as usize {
			for y in 0..region.height as usize {
				let src = (z * region.height as usize + y) * row_len;
				let dst_texel = ((region.z as usize + z) * size.height as usize + region.y as usize + y) * size.width as usize
					+ region.x as usize;
				let dst = dst_texel * bytes_per_texel;

				data[dst..dst + row_len].copy_from_slice(&bytes[src..src + row_len]);
			}
		}

		let merged = match self.dirty.get() {
			Some(existing) => existing.union(region),
			None => region,
		};

		self.dirty.set(Some(merged));
		Ok(())
	}

	fn invalidate_storage(&self) {
		*self.data.borrow_mut() = None;
		self.dirty.set(None);
		bump(&self.revision);
	}

	fn bytes_per_texel(&self) -> Result<usize, Error> {
		// Either tier's table gives the same transfer size for formats both know.
		formats::texture_format(self.format(), Tier::Extended)
			.or_else(|| formats::texture_format(self.format(), Tier::Baseline))
			.map(|info| info.bytes_per_pixel as usize)
			.ok_or_else(|| Error::malformed("texture", format!("{:?} has no uncompressed transfer format", self.format())))
	}
}


#[derive(Debug)]
pub struct TextureObject {
	pub name: u32,
	pub target: u32,
	pub size: TextureSize,
	pub format: TextureFormat,
	pub format_info: TextureFormatInfo,
	pub has_mipmaps: bool,
	pub serial: u64,

	/// Sampling parameters currently set on the texture itself.
	pub applied_sampler: SamplerParams,

	revision: u64,
}


fn face_target(target: u32, layer: u32) -> u32 {
	if target == gl::TEXTURE_CUBE_MAP {
		gl::TEXTURE_CUBE_MAP_POSITIVE_X + layer
	} else {
		target
	}
}

/// Target to use when addressing a single 2D image of a texture.
pub(crate) fn image_target(object: &TextureObject, layer: u32) -> u32 {
	face_target(object.target, layer)
}


impl ResourceManager {
	pub fn prepare_texture(&mut self, device: &mut impl Device, def: &TextureDef) -> Result<TextureHandle, Error> {
		if let Some(key) = self.textures.lookup(def.id()) {
			let up_to_date = self.textures.get(key)
				.map_or(false, |object| object.revision == def.revision());

			if up_to_date {
				self.flush_texture_writes(device, key, def);
				return Ok(key)
			}

			self.delete_texture(device, def);
		}

		let capabilities = &self.capabilities;
		let (dimension, format) = (def.dimension(), def.format());

		let target = formats::texture_target(dimension, capabilities.tier).ok_or_else(|| {
			let feature = match dimension {
				TextureDimension::D3 => Feature::Texture3d,
				_ => Feature::TextureArrays,
			};

			let on_extended = formats::texture_target(dimension, Tier::Extended).is_some();
			capabilities.missing(feature, on_extended, "texture", format!("{dimension:?} texture"))
		})?;

		let format_info = formats::texture_format(format, capabilities.tier).ok_or_else(|| {
			let on_extended = formats::texture_format(format, Tier::Extended).is_some();
			capabilities.missing(Feature::SizedTextureFormats, on_extended, "texture", format!("{format:?}"))
		})?;

		let size = def.size();
		let name = device.create_texture();

		device.bind_texture(target, name);
		device.pixel_store_i(gl::UNPACK_ALIGNMENT, 1);

		let data = def.data.borrow();
		let level_count = if def.generate_mipmaps() { 1 } else { def.mip_level_count() };

		for level in 0..level_count {
			let level_size = size.mip(level, def.dimension());
			let level_data = if level == 0 { data.as_deref() } else { None };
			allocate_level(device, target, level, &format_info, level_size, level_data);
		}

		drop(data);
		def.dirty.set(None);

		// Defaults that keep a single level texture complete.
		let applied_sampler = SamplerParams::texture_default();
		let min_filter = formats::min_filter(applied_sampler.min_filter, None);
		device.tex_parameter_i(target, gl::TEXTURE_MIN_FILTER, min_filter as i32);
		device.tex_parameter_i(target, gl::TEXTURE_MAG_FILTER, formats::mag_filter(applied_sampler.mag_filter) as i32);
		device.tex_parameter_i(target, gl::TEXTURE_WRAP_S, formats::address_mode(applied_sampler.address_mode_u) as i32);
		device.tex_parameter_i(target, gl::TEXTURE_WRAP_T, formats::address_mode(applied_sampler.address_mode_v) as i32);

		if def.generate_mipmaps() {
			device.generate_mipmap(target);
		}
		def.mipmaps_dirty.set(false);

		log::debug!("Created texture {name} ({:?} {:?} {}x{}x{})", def.dimension(), def.format(),
			size.width, size.height, size.depth_or_layers);

		let object = TextureObject {
			name,
			target,
			size,
			format: def.format(),
			format_info,
			has_mipmaps: def.has_mipmaps(),
			serial: self.next_serial(),
			applied_sampler,
			revision: def.revision(),
		};

		Ok(self.textures.insert(def.id(), object))
	}

	fn flush_texture_writes(&mut self, device: &mut impl Device, key: TextureHandle, def: &TextureDef) {
		let region = def.dirty.take();
		let regenerate = def.mipmaps_dirty.replace(false) || (region.is_some() && def.generate_mipmaps());
		let has_mipmaps = def.has_mipmaps();

		let Some(object) = self.textures.get_mut(key) else {
			return
		};

		let mipmaps_changed = object.has_mipmaps != has_mipmaps;
		if region.is_none() && !regenerate && !mipmaps_changed {
			return
		}

		device.bind_texture(object.target, object.name);

		// Whether the applied min filter reads between mips depends on there being any.
		if mipmaps_changed {
			object.has_mipmaps = has_mipmaps;

			let sampler = object.applied_sampler;
			let min_filter = formats::min_filter(sampler.min_filter, sampler.mipmap_filter.filter(|_| has_mipmaps));
			device.tex_parameter_i(object.target, gl::TEXTURE_MIN_FILTER, min_filter as i32);
		}

		if let Some(region) = region {
			device.pixel_store_i(gl::UNPACK_ALIGNMENT, 1);

			let data = def.data.borrow();
			if let Some(data) = data.as_deref() {
				upload_region(device, object, region, data);
			}
		}

		if regenerate {
			device.generate_mipmap(object.target);
		}
	}

	pub fn texture(&self, handle: TextureHandle) -> Option<&TextureObject> {
		self.textures.get(handle)
	}

	pub(crate) fn texture_mut(&mut self, handle: TextureHandle) -> Option<&mut TextureObject> {
		self.textures.get_mut(handle)
	}

	pub fn delete_texture(&mut self, device: &mut impl Device, def: &TextureDef) {
		if let Some(object) = self.textures.remove(def.id()) {
			log::debug!("Deleted texture {}", object.name);
			device.delete_texture(object.name);
		}
	}
}


fn allocate_level(device: &mut impl Device, target: u32, level: u32, info: &TextureFormatInfo,
	size: TextureSize, data: Option<&[u8]>)
{
	let TextureFormatInfo{internal_format, format, ty, ..} = *info;

	match target {
		gl::TEXTURE_CUBE_MAP => {
			let face_len = size.width as usize * size.height as usize * info.bytes_per_pixel as usize;

			for face in 0..6 {
				let face_data = data.and_then(|d| d.get(face as usize * face_len..(face as usize + 1) * face_len));
				device.tex_image_2d(face_target(target, face), level, internal_format, size.width, size.height,
					format, ty, face_data);
			}
		}

		gl::TEXTURE_3D | gl::TEXTURE_2D_ARRAY => {
			device.tex_image_3d(target, level, internal_format, size.width, size.height, size.depth_or_layers,
				format, ty, data);
		}

		_ => {
			device.tex_image_2d(target, level, internal_format, size.width, size.height, format, ty, data);
		}
	}
}

/// Uploads `region` of the tightly packed level 0 image `data`.
fn upload_region(device: &mut impl Device, object: &TextureObject, region: TextureRegion, data: &[u8]) {
	let bytes_per_texel = object.format_info.bytes_per_pixel as usize;
	let size = object.size;
	let row_len = region.width as usize * bytes_per_texel;

	let mut staging = Vec::with_capacity(row_len * region.height as usize * region.depth as usize);
	for z in region.z..region.z + region.depth {
		for y in region.y..region.y + region.height {
			let start = ((z as usize * size.height as usize + y as usize) * size.width as usize + region.x as usize) * bytes_per_texel;
			staging.extend_from_slice(&data[start..start + row_len]);
		}
	}

	let TextureFormatInfo{format, ty, ..} = object.format_info;

	match object.target {
		gl::TEXTURE_CUBE_MAP => {
			let face_len = row_len * region.height as usize;

			for (index, face) in (region.z..region.z + region.depth).enumerate() {
				let face_data = &staging[index * face_len..(index + 1) * face_len];
				device.tex_sub_image_2d(face_target(object.target, face), 0, region.x, region.y,
					region.width, region.height, format, ty, face_data);
			}
		}

		gl::TEXTURE_3D | gl::TEXTURE_2D_ARRAY => {
			device.tex_sub_image_3d(object.target, 0, region.x, region.y, region.z,
				region.width, region.height, region.depth, format, ty, &staging);
		}

		_ => {
			device.tex_sub_image_2d(object.target, 0, region.x, region.y, region.width, region.height,
				format, ty, &staging);
		}
	}
}
