use super::Context;
use crate::caps::Feature;
use crate::commands::Rect;
use crate::device::Device;
use crate::error::Error;
use crate::formats::{SampleType, TextureFormat};
use crate::resource_manager::RenderPassDef;


/// (format, type, bytes per pixel) that pixels of `format` are read back as.
fn transfer_format(format: TextureFormat) -> (u32, u32, usize) {
	use TextureFormat::*;

	match format.sample_type() {
		SampleType::Uint => (gl::RGBA_INTEGER, gl::UNSIGNED_INT, 16),
		SampleType::Sint => (gl::RGBA_INTEGER, gl::INT, 16),
		SampleType::Float => match format {
			R16Float | Rg16Float | Rgba16Float | R32Float | Rg32Float | Rgba32Float => (gl::RGBA, gl::FLOAT, 16),
			_ => (gl::RGBA, gl::UNSIGNED_BYTE, 4),
		},
	}
}


/// GL always reads rows bottom up.
fn reverse_rows(pixels: &mut [u8], row_len: usize) {
	if row_len == 0 {
		return
	}

	let rows = pixels.len() / row_len;
	for row in 0..rows / 2 {
		let (front, back) = pixels.split_at_mut((rows - 1 - row) * row_len);
		front[row * row_len..(row + 1) * row_len].swap_with_slice(&mut back[..row_len]);
	}
}


impl<D: Device> Context<D> {
	/// Reads `rect` of color attachment `attachment` of `target` into `dest`, starting at `offset`.
	///
	/// Pixels are always read as four components, tightly packed. The first row in `dest` is the
	/// one at `rect.y`, so rows run bottom up, or top down for targets that flip y. Normalized
	/// formats are read as bytes, float formats as `f32`s and integer formats as 32 bit integers.
	pub fn read_pixels(&mut self, target: &RenderPassDef, attachment: u32, rect: Rect, dest: &mut [u8], offset: usize)
		-> Result<(), Error>
	{
		let extended = self.resource_manager.capabilities().is_extended();

		if attachment > 0 && !extended {
			return Err(Error::UnsupportedFeature {
				feature: Feature::MultipleRenderTargets,
				tier: self.resource_manager.capabilities().tier,
			})
		}

		let handle = self.resource_manager.prepare_framebuffer(&mut self.device, target)?;
		let Some(object) = self.resource_manager.framebuffer(handle) else {
			return Err(Error::malformed("target", "framebuffer was not created"))
		};

		let Some(&format) = object.color_formats.get(attachment as usize) else {
			return Err(Error::malformed("attachment", format!("attachment {attachment} out of range, target has {}", object.color_count())))
		};

		let (width, height) = object.size;
		let within = |start: i32, len: u32, limit: u32| start >= 0
			&& (start as u32).checked_add(len).is_some_and(|end| end <= limit);
		let in_bounds = within(rect.x, rect.width, width) && within(rect.y, rect.height, height);

		if !in_bounds {
			return Err(Error::malformed("rect", format!("{rect:?} is outside of the {width}x{height} target")))
		}

		let (pixel_format, ty, bytes_per_pixel) = transfer_format(format);
		let end = offset.checked_add(rect.width as usize * rect.height as usize * bytes_per_pixel)
			.filter(|&end| end <= dest.len())
			.ok_or_else(|| Error::malformed("dest", format!("read of {rect:?} at {offset} overruns {} bytes", dest.len())))?;

		let rect = match target.flip_y {
			true => rect.flipped(height),
			false => rect,
		};

		self.device.bind_framebuffer(gl::FRAMEBUFFER, object.name);

		if extended {
			self.device.read_buffer(gl::COLOR_ATTACHMENT0 + attachment);
		}

		self.device.pixel_store_i(gl::PACK_ALIGNMENT, 1);
		self.device.read_pixels(rect.x, rect.y, rect.width, rect.height, pixel_format, ty, &mut dest[offset..end]);

		if target.flip_y {
			reverse_rows(&mut dest[offset..end], rect.width as usize * bytes_per_pixel);
		}

		if extended {
			self.device.read_buffer(gl::COLOR_ATTACHMENT0);
		}

		self.device.bind_framebuffer(gl::FRAMEBUFFER, 0);

		Ok(())
	}
}
