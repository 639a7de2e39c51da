use super::ResourceManager;
use super::fbo::{depth_stencil_points, check_status};
use crate::device::Device;
use crate::error::Error;
use crate::formats::TextureFormat;


/// Multisampled stand-in for a render pass whose texture attachments can't be rendered to
/// with multisampling directly.
///
/// Draws go to `framebuffer`, which has one multisampled renderbuffer per color attachment of
/// the original pass. At the end of the pass each of them is blitted into the matching
/// attachment of the original framebuffer. Owned by the original pass's framebuffer object.
#[derive(Debug)]
pub struct MultisampleShadow {
	pub framebuffer: u32,
	pub color_renderbuffers: Vec<u32>,
	pub depth_stencil_renderbuffer: Option<u32>,
	pub samples: u32,
	pub size: (u32, u32),
}

impl MultisampleShadow {
	pub(crate) fn create(resource_manager: &mut ResourceManager, device: &mut impl Device,
		color_formats: &[TextureFormat], depth_stencil_format: Option<TextureFormat>, size: (u32, u32), samples: u32)
		-> Result<MultisampleShadow, Error>
	{
		let extended = resource_manager.capabilities().is_extended();
		let (width, height) = size;

		let mut shadow = MultisampleShadow {
			framebuffer: 0,
			color_renderbuffers: Vec::with_capacity(color_formats.len()),
			depth_stencil_renderbuffer: None,
			samples,
			size,
		};

		for &format in color_formats {
			match resource_manager.allocate_renderbuffer(device, format, width, height, samples) {
				Ok(name) => shadow.color_renderbuffers.push(name),
				Err(error) => {
					shadow.destroy(device);
					return Err(error)
				}
			}
		}

		// Every attachment of a framebuffer needs the same sample count, so depth gets shadowed too.
		if let Some(format) = depth_stencil_format {
			match resource_manager.allocate_renderbuffer(device, format, width, height, samples) {
				Ok(name) => shadow.depth_stencil_renderbuffer = Some(name),
				Err(error) => {
					shadow.destroy(device);
					return Err(error)
				}
			}
		}

		shadow.framebuffer = device.create_framebuffer();
		device.bind_framebuffer(gl::FRAMEBUFFER, shadow.framebuffer);

		for (index, &renderbuffer) in shadow.color_renderbuffers.iter().enumerate() {
			device.framebuffer_renderbuffer(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0 + index as u32, renderbuffer);
		}

		if let (Some(renderbuffer), Some(format)) = (shadow.depth_stencil_renderbuffer, depth_stencil_format) {
			for &point in depth_stencil_points(format, extended) {
				device.framebuffer_renderbuffer(gl::FRAMEBUFFER, point, renderbuffer);
			}
		}

		if shadow.color_renderbuffers.len() > 1 {
			device.draw_buffers(&shadow.draw_buffers());
		}

		if let Err(error) = check_status(device) {
			device.bind_framebuffer(gl::FRAMEBUFFER, 0);
			shadow.destroy(device);
			return Err(error)
		}

		log::debug!("Created {samples}x multisample shadow framebuffer {} ({width}x{height})", shadow.framebuffer);

		Ok(shadow)
	}

	fn draw_buffers(&self) -> Vec<u32> {
		(0..self.color_renderbuffers.len() as u32)
			.map(|index| gl::COLOR_ATTACHMENT0 + index)
			.collect()
	}

	/// Blits every color attachment into `target`, one attachment at a time.
	///
	/// `target_draw_buffers` is restored on `target` afterwards.
	pub(crate) fn resolve(&self, device: &mut impl Device, target: u32, target_draw_buffers: &[u32]) {
		let (width, height) = self.size;
		let rect = [0, 0, width as i32, height as i32];
		let count = self.color_renderbuffers.len() as u32;

		device.bind_framebuffer(gl::READ_FRAMEBUFFER, self.framebuffer);
		device.bind_framebuffer(gl::DRAW_FRAMEBUFFER, target);

		for index in 0..count {
			let attachment = gl::COLOR_ATTACHMENT0 + index;
			device.read_buffer(attachment);

			if count > 1 {
				let mut draw_buffers = vec![gl::NONE; index as usize + 1];
				draw_buffers[index as usize] = attachment;
				device.draw_buffers(&draw_buffers);
			}

			device.blit_framebuffer(rect, rect, gl::COLOR_BUFFER_BIT, gl::NEAREST);
		}

		if count > 1 {
			device.draw_buffers(target_draw_buffers);
		}

		device.read_buffer(gl::COLOR_ATTACHMENT0);
		device.bind_framebuffer(gl::FRAMEBUFFER, 0);
	}

	pub(crate) fn destroy(self, device: &mut impl Device) {
		if self.framebuffer != 0 {
			device.delete_framebuffer(self.framebuffer);
		}

		for name in self.color_renderbuffers {
			device.delete_renderbuffer(name);
		}

		if let Some(name) = self.depth_stencil_renderbuffer {
			device.delete_renderbuffer(name);
		}

		log::debug!("Deleted multisample shadow");
	}
}
