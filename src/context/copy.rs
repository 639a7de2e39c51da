use super::Context;
use crate::caps::Feature;
use crate::commands::{BlitPass, CopyBufferToBuffer, CopyTextureToTexture, TextureCopyView};
use crate::device::Device;
use crate::error::{Error, SubmitReport};
use crate::formats::{self, FilterMode, FormatKind, SampleType};
use crate::resource_manager::texture::image_target;


fn is_layered(target: u32) -> bool {
	target == gl::TEXTURE_2D_ARRAY || target == gl::TEXTURE_3D
}

fn validate_copy_view(view: &TextureCopyView<'_>, size: (u32, u32, u32), path: &str) -> Result<(), Error> {
	let texture = view.texture;
	let format = texture.format();

	if !format.has_aspect(view.aspect) {
		return Err(Error::malformed(path, format!("{format:?} has no {:?} aspect", view.aspect)))
	}

	if format.kind() != FormatKind::Color {
		return Err(Error::malformed(path, format!("only color textures can be copied, got {format:?}")))
	}

	if view.mip_level >= texture.mip_level_count().max(1) {
		return Err(Error::malformed(path, format!("mip level {} out of range", view.mip_level)))
	}

	let extent = texture.size().mip(view.mip_level, texture.dimension());
	let (x, y, layer) = view.origin;
	let (width, height, layers) = size;

	let within = |start: u32, len: u32, limit: u32| start.checked_add(len).is_some_and(|end| end <= limit);

	if !within(x, width, extent.width) || !within(y, height, extent.height) || !within(layer, layers, extent.depth_or_layers) {
		return Err(Error::malformed(path, format!("copy of {size:?} at {:?} overruns {extent:?}", view.origin)))
	}

	Ok(())
}


impl<D: Device> Context<D> {
	pub(super) fn execute_blit(&mut self, pass: &BlitPass<'_>, report: &mut SubmitReport) {
		if let Err(error) = self.blit(pass) {
			report.push(error);
		}
	}

	/// Scaled copy of one color attachment into every draw buffer of the destination.
	fn blit(&mut self, pass: &BlitPass<'_>) -> Result<(), Error> {
		self.resource_manager.capabilities().require(Feature::FramebufferBlit)?;

		let source = self.resource_manager.prepare_framebuffer(&mut self.device, pass.source)?;
		let destination = match pass.destination {
			Some(def) => Some(self.resource_manager.prepare_framebuffer(&mut self.device, def)?),
			None => None,
		};

		let Some(source) = self.resource_manager.framebuffer(source) else {
			return Err(Error::malformed("source", "framebuffer was not created"))
		};

		let Some(&format) = source.color_formats.get(pass.source_attachment as usize) else {
			return Err(Error::malformed("source_attachment",
				format!("attachment {} out of range, source has {}", pass.source_attachment, source.color_count())))
		};

		if format.sample_type() != SampleType::Float && pass.filter == FilterMode::Linear {
			return Err(Error::malformed("filter", "integer formats can only be blitted with nearest filtering"))
		}

		let source_rect = match pass.source.flip_y {
			true => pass.source_rect.flipped(source.size.1),
			false => pass.source_rect,
		};

		let (destination_name, destination_rect) = match (destination, pass.destination) {
			(Some(handle), Some(def)) => {
				let Some(object) = self.resource_manager.framebuffer(handle) else {
					return Err(Error::malformed("destination", "framebuffer was not created"))
				};

				let rect = match def.flip_y {
					true => pass.destination_rect.flipped(object.size.1),
					false => pass.destination_rect,
				};

				(object.name, rect)
			}

			_ => (0, pass.destination_rect),
		};

		self.device.bind_framebuffer(gl::READ_FRAMEBUFFER, source.name);
		self.device.bind_framebuffer(gl::DRAW_FRAMEBUFFER, destination_name);
		self.device.read_buffer(gl::COLOR_ATTACHMENT0 + pass.source_attachment);

		self.device.blit_framebuffer(source_rect.corners(), destination_rect.corners(),
			gl::COLOR_BUFFER_BIT, formats::mag_filter(pass.filter));

		self.device.read_buffer(gl::COLOR_ATTACHMENT0);
		self.device.bind_framebuffer(gl::FRAMEBUFFER, 0);

		Ok(())
	}

	pub(super) fn execute_buffer_copy(&mut self, copy: &CopyBufferToBuffer<'_>, report: &mut SubmitReport) {
		if let Err(error) = self.copy_buffer(copy) {
			report.push(error);
		}
	}

	/// Copies on the device where possible, otherwise through the caller side bytes.
	/// Either way both copies of the destination end up holding the same bytes.
	fn copy_buffer(&mut self, copy: &CopyBufferToBuffer<'_>) -> Result<(), Error> {
		let source_end = copy.source_offset.checked_add(copy.size)
			.ok_or_else(|| Error::malformed("source", "copy range overflows"))?;
		let destination_end = copy.destination_offset.checked_add(copy.size)
			.ok_or_else(|| Error::malformed("destination", "copy range overflows"))?;

		if source_end > copy.source.len() {
			return Err(Error::malformed("source", format!("copy ends at {source_end}, buffer is {} bytes", copy.source.len())))
		}

		if destination_end > copy.destination.len() {
			return Err(Error::malformed("destination",
				format!("copy ends at {destination_end}, buffer is {} bytes", copy.destination.len())))
		}

		let overlapping = copy.source.id() == copy.destination.id()
			&& copy.source_offset < destination_end
			&& copy.destination_offset < source_end;

		if overlapping {
			return Err(Error::malformed("destination", "source and destination ranges overlap"))
		}

		if copy.size == 0 {
			return Ok(())
		}

		let bytes = copy.source.data()[copy.source_offset..source_end].to_vec();

		if !self.resource_manager.capabilities().supports(Feature::BufferCopy) {
			copy.destination.write(copy.destination_offset, &bytes)?;
			self.resource_manager.prepare_buffer(&mut self.device, copy.destination);
			return Ok(())
		}

		let source = self.resource_manager.prepare_buffer(&mut self.device, copy.source);
		let destination = self.resource_manager.prepare_buffer(&mut self.device, copy.destination);

		let names = self.resource_manager.buffer(source).map(|object| object.name)
			.zip(self.resource_manager.buffer(destination).map(|object| object.name));

		let Some((source_name, destination_name)) = names else {
			return Err(Error::malformed("buffer copy", "buffer was not created"))
		};

		self.device.bind_buffer(gl::COPY_READ_BUFFER, source_name);
		self.device.bind_buffer(gl::COPY_WRITE_BUFFER, destination_name);
		self.device.copy_buffer_sub_data(gl::COPY_READ_BUFFER, gl::COPY_WRITE_BUFFER,
			copy.source_offset, copy.destination_offset, copy.size);

		copy.destination.mirror(copy.destination_offset, &bytes);

		Ok(())
	}

	pub(super) fn execute_texture_copy(&mut self, copy: &CopyTextureToTexture<'_>, report: &mut SubmitReport) {
		if let Err(error) = self.copy_texture(copy) {
			report.push(error);
		}
	}

	/// Reads the source one layer at a time through the scratch framebuffer.
	///
	/// The destination's caller side data isn't updated, only the backend texture.
	fn copy_texture(&mut self, copy: &CopyTextureToTexture<'_>) -> Result<(), Error> {
		let (source, destination) = (&copy.source, &copy.destination);

		if source.aspect != destination.aspect {
			return Err(Error::malformed("destination.aspect",
				format!("copying {:?} into {:?}", source.aspect, destination.aspect)))
		}

		validate_copy_view(source, copy.size, "source")?;
		validate_copy_view(destination, copy.size, "destination")?;

		if source.texture.format() != destination.texture.format() {
			return Err(Error::malformed("destination",
				format!("format {:?} differs from source {:?}", destination.texture.format(), source.texture.format())))
		}

		let (width, height, layers) = copy.size;
		if width == 0 || height == 0 || layers == 0 {
			return Ok(())
		}

		let source_handle = self.resource_manager.prepare_texture(&mut self.device, source.texture)?;
		let destination_handle = self.resource_manager.prepare_texture(&mut self.device, destination.texture)?;
		let scratch = self.resource_manager.scratch_framebuffer(&mut self.device);

		let objects = self.resource_manager.texture(source_handle)
			.zip(self.resource_manager.texture(destination_handle));

		let Some((source_object, destination_object)) = objects else {
			return Err(Error::malformed("texture copy", "texture was not created"))
		};

		let (source_x, source_y, source_layer) = source.origin;
		let (destination_x, destination_y, destination_layer) = destination.origin;

		self.device.bind_framebuffer(gl::FRAMEBUFFER, scratch);
		self.device.bind_texture(destination_object.target, destination_object.name);

		for layer in 0..layers {
			let read_layer = source_layer + layer;
			let write_layer = destination_layer + layer;

			if is_layered(source_object.target) {
				self.device.framebuffer_texture_layer(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0,
					source_object.name, source.mip_level, read_layer);
			} else {
				self.device.framebuffer_texture_2d(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0,
					image_target(source_object, read_layer), source_object.name, source.mip_level);
			}

			if is_layered(destination_object.target) {
				self.device.copy_tex_sub_image_3d(destination_object.target, destination.mip_level,
					destination_x, destination_y, write_layer, source_x, source_y, width, height);
			} else {
				self.device.copy_tex_sub_image_2d(image_target(destination_object, write_layer), destination.mip_level,
					destination_x, destination_y, source_x, source_y, width, height);
			}
		}

		self.device.framebuffer_texture_2d(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0, gl::TEXTURE_2D, 0, 0);
		self.device.bind_framebuffer(gl::FRAMEBUFFER, 0);

		log::trace!("Copied {width}x{height}x{layers} texels from texture {} to {}",
			source_object.name, destination_object.name);

		Ok(())
	}
}
