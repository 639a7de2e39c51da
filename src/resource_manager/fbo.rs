use super::{ResourceManager, FramebufferHandle, TextureDef, RenderbufferDef, MultisampleShadow, Identity, DefId};
use crate::caps::Feature;
use crate::device::Device;
use crate::error::Error;
use crate::formats::TextureFormat;

use std::rc::Rc;


#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LoadOp<V> {
	/// Keep whatever the attachment already holds.
	Load,
	Clear(V),
}

impl<V> Default for LoadOp<V> {
	fn default() -> Self {
		LoadOp::Load
	}
}


#[derive(Debug, Clone)]
pub enum AttachmentView {
	Texture {
		texture: Rc<TextureDef>,
		mip_level: u32,
		/// Array layer, cube face or 3D slice.
		layer: u32,
	},

	Renderbuffer(Rc<RenderbufferDef>),
}

impl AttachmentView {
	pub fn texture(texture: Rc<TextureDef>) -> AttachmentView {
		AttachmentView::Texture { texture, mip_level: 0, layer: 0 }
	}

	pub fn renderbuffer(renderbuffer: Rc<RenderbufferDef>) -> AttachmentView {
		AttachmentView::Renderbuffer(renderbuffer)
	}

	pub fn format(&self) -> TextureFormat {
		match self {
			AttachmentView::Texture { texture, .. } => texture.format(),
			AttachmentView::Renderbuffer(renderbuffer) => renderbuffer.format(),
		}
	}

	pub fn is_texture(&self) -> bool {
		matches!(self, AttachmentView::Texture{..})
	}
}


#[derive(Debug, Clone)]
pub struct ColorAttachment {
	pub view: AttachmentView,
	pub load_op: LoadOp<[f32; 4]>,
}

impl ColorAttachment {
	pub fn load(view: AttachmentView) -> ColorAttachment {
		ColorAttachment { view, load_op: LoadOp::Load }
	}

	pub fn clear(view: AttachmentView, color: [f32; 4]) -> ColorAttachment {
		ColorAttachment { view, load_op: LoadOp::Clear(color) }
	}
}

#[derive(Debug, Clone)]
pub struct DepthStencilAttachment {
	pub view: AttachmentView,
	pub depth_load_op: LoadOp<f32>,
	pub stencil_load_op: LoadOp<i32>,
}

impl DepthStencilAttachment {
	pub fn clear(view: AttachmentView, depth: f32, stencil: i32) -> DepthStencilAttachment {
		DepthStencilAttachment {
			view,
			depth_load_op: LoadOp::Clear(depth),
			stencil_load_op: LoadOp::Clear(stencil),
		}
	}
}


/// Where a render pass draws to.
///
/// Fields may be changed freely between submissions. The derived framebuffer is rebuilt
/// whenever the set of backend objects it resolves to changes.
#[derive(Debug, Clone)]
pub struct RenderPassDef {
	identity: Identity,
	pub color_attachments: Vec<ColorAttachment>,
	pub depth_stencil_attachment: Option<DepthStencilAttachment>,
	/// Texture attachments are rendered through multisampled renderbuffers and resolved
	/// at the end of the pass when this is more than one.
	pub sample_count: u32,
	/// Viewport and scissor rectangles are given with y pointing down.
	pub flip_y: bool,
}

impl Default for RenderPassDef {
	fn default() -> Self {
		RenderPassDef {
			identity: Identity::new(),
			color_attachments: Vec::new(),
			depth_stencil_attachment: None,
			sample_count: 1,
			flip_y: false,
		}
	}
}

impl RenderPassDef {
	pub fn new() -> RenderPassDef {
		RenderPassDef::default()
	}

	pub fn with_color(mut self, attachment: ColorAttachment) -> RenderPassDef {
		self.color_attachments.push(attachment);
		self
	}

	pub fn with_depth_stencil(mut self, attachment: DepthStencilAttachment) -> RenderPassDef {
		self.depth_stencil_attachment = Some(attachment);
		self
	}

	pub fn with_samples(mut self, sample_count: u32) -> RenderPassDef {
		self.sample_count = sample_count.max(1);
		self
	}

	pub fn with_flip_y(mut self, flip_y: bool) -> RenderPassDef {
		self.flip_y = flip_y;
		self
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}
}


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum ResolvedKind {
	Texture { target: u32, level: u32, layer: u32 },
	Renderbuffer,
}

/// An attachment after its backing object has been prepared.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct ResolvedAttachment {
	pub name: u32,
	pub serial: u64,
	pub kind: ResolvedKind,
	pub size: (u32, u32),
	pub format: TextureFormat,
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct Snapshot {
	colors: Vec<ResolvedAttachment>,
	depth_stencil: Option<ResolvedAttachment>,
	shadow_samples: u32,
}


#[derive(Debug)]
pub struct FramebufferObject {
	pub name: u32,
	pub size: (u32, u32),
	pub color_formats: Vec<TextureFormat>,
	pub depth_stencil_format: Option<TextureFormat>,
	/// Empty unless more than one color attachment is bound.
	pub draw_buffers: Vec<u32>,
	pub shadow: Option<MultisampleShadow>,
	snapshot: Snapshot,
}

impl FramebufferObject {
	/// The framebuffer draws should go to, which is the multisampled shadow if there is one.
	pub fn render_name(&self) -> u32 {
		self.shadow.as_ref().map_or(self.name, |shadow| shadow.framebuffer)
	}

	pub fn color_count(&self) -> usize {
		self.color_formats.len()
	}

	pub(crate) fn destroy(self, device: &mut impl Device) {
		log::debug!("Deleted framebuffer {}", self.name);
		device.delete_framebuffer(self.name);

		if let Some(shadow) = self.shadow {
			shadow.destroy(device);
		}
	}
}


/// Attachment points for a depth and/or stencil format.
pub(crate) fn depth_stencil_points(format: TextureFormat, extended: bool) -> &'static [u32] {
	match (format.has_depth(), format.has_stencil()) {
		(true, true) if extended => &[gl::DEPTH_STENCIL_ATTACHMENT],
		(true, true) => &[gl::DEPTH_ATTACHMENT, gl::STENCIL_ATTACHMENT],
		(true, false) => &[gl::DEPTH_ATTACHMENT],
		_ => &[gl::STENCIL_ATTACHMENT],
	}
}

fn attach(device: &mut impl Device, point: u32, attachment: &ResolvedAttachment) {
	match attachment.kind {
		ResolvedKind::Texture { target: gl::TEXTURE_2D, level, .. } => {
			device.framebuffer_texture_2d(gl::FRAMEBUFFER, point, gl::TEXTURE_2D, attachment.name, level);
		}

		ResolvedKind::Texture { target: gl::TEXTURE_CUBE_MAP, level, layer } => {
			device.framebuffer_texture_2d(gl::FRAMEBUFFER, point, gl::TEXTURE_CUBE_MAP_POSITIVE_X + layer, attachment.name, level);
		}

		ResolvedKind::Texture { level, layer, .. } => {
			device.framebuffer_texture_layer(gl::FRAMEBUFFER, point, attachment.name, level, layer);
		}

		ResolvedKind::Renderbuffer => {
			device.framebuffer_renderbuffer(gl::FRAMEBUFFER, point, attachment.name);
		}
	}
}

pub(crate) fn check_status(device: &mut impl Device) -> Result<(), Error> {
	let status = device.check_framebuffer_status(gl::FRAMEBUFFER);
	if status != gl::FRAMEBUFFER_COMPLETE {
		return Err(Error::IncompleteFramebuffer { status })
	}

	Ok(())
}


impl ResourceManager {
	pub fn prepare_framebuffer(&mut self, device: &mut impl Device, def: &RenderPassDef) -> Result<FramebufferHandle, Error> {
		let snapshot = self.resolve_attachments(device, def)?;

		if let Some(key) = self.framebuffers.lookup(def.id()) {
			let up_to_date = self.framebuffers.get(key)
				.map_or(false, |object| object.snapshot == snapshot);

			if up_to_date {
				return Ok(key)
			}

			self.delete_framebuffer(device, def);
		}

		let object = self.build_framebuffer(device, snapshot)?;
		Ok(self.framebuffers.insert(def.id(), object))
	}

	fn resolve_attachments(&mut self, device: &mut impl Device, def: &RenderPassDef) -> Result<Snapshot, Error> {
		let mut color_attachments = def.color_attachments.as_slice();

		if color_attachments.len() > 1 {
			let supported = match self.capabilities.require(Feature::MultipleRenderTargets) {
				Ok(()) => self.capabilities.max_draw_buffers as usize,
				Err(error) => {
					self.warn(error);
					1
				}
			};

			if color_attachments.len() > supported {
				log::warn!("Render pass has {} color attachments, only binding {supported}", color_attachments.len());
				color_attachments = &color_attachments[..supported];
			}
		}

		let mut colors = Vec::with_capacity(color_attachments.len());
		for (index, attachment) in color_attachments.iter().enumerate() {
			let path = format!("color_attachments[{index}]");
			colors.push(self.resolve_view(device, &attachment.view, &path)?);
		}

		let depth_stencil = match &def.depth_stencil_attachment {
			Some(attachment) => Some(self.resolve_view(device, &attachment.view, "depth_stencil_attachment")?),
			None => None,
		};

		let mut sizes = colors.iter().chain(depth_stencil.iter()).map(|a| a.size);
		let Some(size) = sizes.next() else {
			return Err(Error::malformed("render pass", "no attachments"))
		};

		if let Some(other) = sizes.find(|&other| other != size) {
			return Err(Error::malformed("render pass", format!("attachment sizes differ: {size:?} vs {other:?}")))
		}

		let wants_shadow = def.sample_count > 1
			&& def.color_attachments.iter().any(|attachment| attachment.view.is_texture());

		let shadow_samples = if wants_shadow { self.effective_samples(def.sample_count) } else { 1 };

		Ok(Snapshot { colors, depth_stencil, shadow_samples })
	}

	fn resolve_view(&mut self, device: &mut impl Device, view: &AttachmentView, path: &str) -> Result<ResolvedAttachment, Error> {
		match view {
			AttachmentView::Texture { texture, mip_level, layer } => {
				let handle = self.prepare_texture(device, texture)?;
				let object = self.texture(handle)
					.ok_or_else(|| Error::malformed(path, "texture was not created"))?;

				if *mip_level >= texture.mip_level_count().max(1) && !texture.generate_mipmaps() {
					return Err(Error::malformed(path, format!("mip level {mip_level} out of range")))
				}

				if *layer >= object.size.depth_or_layers {
					return Err(Error::malformed(path, format!("layer {layer} out of range")))
				}

				Ok(ResolvedAttachment {
					name: object.name,
					serial: object.serial,
					kind: ResolvedKind::Texture { target: object.target, level: *mip_level, layer: *layer },
					size: ((object.size.width >> mip_level).max(1), (object.size.height >> mip_level).max(1)),
					format: object.format,
				})
			}

			AttachmentView::Renderbuffer(renderbuffer) => {
				let handle = self.prepare_renderbuffer(device, renderbuffer)?;
				let object = self.renderbuffer(handle)
					.ok_or_else(|| Error::malformed(path, "renderbuffer was not created"))?;

				Ok(ResolvedAttachment {
					name: object.name,
					serial: object.serial,
					kind: ResolvedKind::Renderbuffer,
					size: object.size,
					format: object.format,
				})
			}
		}
	}

	fn build_framebuffer(&mut self, device: &mut impl Device, snapshot: Snapshot) -> Result<FramebufferObject, Error> {
		let extended = self.capabilities.is_extended();
		let size = snapshot.colors.iter().chain(snapshot.depth_stencil.iter())
			.map(|a| a.size)
			.next()
			.unwrap_or((1, 1));

		let name = device.create_framebuffer();
		device.bind_framebuffer(gl::FRAMEBUFFER, name);

		for (index, attachment) in snapshot.colors.iter().enumerate() {
			attach(device, gl::COLOR_ATTACHMENT0 + index as u32, attachment);
		}

		if let Some(attachment) = &snapshot.depth_stencil {
			for &point in depth_stencil_points(attachment.format, extended) {
				attach(device, point, attachment);
			}
		}

		let draw_buffers: Vec<u32> = if snapshot.colors.len() > 1 {
			(0..snapshot.colors.len() as u32).map(|index| gl::COLOR_ATTACHMENT0 + index).collect()
		} else {
			Vec::new()
		};

		if !draw_buffers.is_empty() {
			device.draw_buffers(&draw_buffers);
		}

		if self.validate_framebuffers {
			if let Err(error) = check_status(device) {
				device.bind_framebuffer(gl::FRAMEBUFFER, 0);
				device.delete_framebuffer(name);
				return Err(error)
			}
		}

		let color_formats: Vec<TextureFormat> = snapshot.colors.iter().map(|a| a.format).collect();
		let depth_stencil_format = snapshot.depth_stencil.map(|a| a.format);

		let shadow = if snapshot.shadow_samples > 1 {
			let result = MultisampleShadow::create(self, device, &color_formats, depth_stencil_format,
				size, snapshot.shadow_samples);

			match result {
				Ok(shadow) => Some(shadow),
				Err(error) => {
					device.bind_framebuffer(gl::FRAMEBUFFER, 0);
					device.delete_framebuffer(name);
					return Err(error)
				}
			}
		} else {
			None
		};

		device.bind_framebuffer(gl::FRAMEBUFFER, 0);

		log::debug!("Created framebuffer {name} ({} color attachments, {}x{})", color_formats.len(), size.0, size.1);

		Ok(FramebufferObject {
			name,
			size,
			color_formats,
			depth_stencil_format,
			draw_buffers,
			shadow,
			snapshot,
		})
	}

	pub fn framebuffer(&self, handle: FramebufferHandle) -> Option<&FramebufferObject> {
		self.framebuffers.get(handle)
	}

	/// Also destroys the multisample shadow, if the pass had one.
	pub fn delete_framebuffer(&mut self, device: &mut impl Device, def: &RenderPassDef) {
		if let Some(object) = self.framebuffers.remove(def.id()) {
			object.destroy(device);
		}
	}
}
