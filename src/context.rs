use crate::caps::Capabilities;
use crate::commands::{Submit, PassItem};
use crate::config::ContextConfig;
use crate::device::Device;
use crate::error::SubmitReport;
use crate::resource_manager::*;

mod render_pass;
mod feedback;
mod copy;
mod readback;


/// Drives a [`Device`] through submissions of caller owned descriptors.
///
/// Backend objects are created on first use and kept in the [`ResourceManager`] until
/// deleted explicitly or released all at once.
#[derive(Debug)]
pub struct Context<D: Device> {
	device: D,
	pub resource_manager: ResourceManager,

	surface_size: (u32, u32),
}

impl<D: Device> Context<D> {
	pub fn new(device: D, config: ContextConfig) -> anyhow::Result<Self> {
		let detected = device.capabilities();

		anyhow::ensure!(detected.max_texture_units > 0, "device reports no texture units");
		anyhow::ensure!(config.surface_size.0 > 0 && config.surface_size.1 > 0,
			"surface size must be non-zero, got {:?}", config.surface_size);

		let capabilities = if config.force_baseline {
			log::info!("Forcing baseline tier");
			detected.clamped_to_baseline()
		} else {
			detected
		};

		log::info!("Context created for {:?} tier device: {capabilities:?}", capabilities.tier);

		Ok(Self {
			device,
			resource_manager: ResourceManager::new(capabilities, config.validate_framebuffers),
			surface_size: config.surface_size,
		})
	}

	pub fn device(&self) -> &D {
		&self.device
	}

	pub fn device_mut(&mut self) -> &mut D {
		&mut self.device
	}

	pub fn capabilities(&self) -> &Capabilities {
		self.resource_manager.capabilities()
	}

	pub fn surface_size(&self) -> (u32, u32) {
		self.surface_size
	}

	/// Passes targeting the surface use the new extent from the next submission on.
	pub fn resize_surface(&mut self, width: u32, height: u32) {
		log::debug!("Surface resized to {width}x{height}");
		self.surface_size = (width.max(1), height.max(1));
	}

	/// Executes every pass of every encoder in order.
	///
	/// Failing items are skipped and reported, the rest of the submission still runs.
	pub fn submit(&mut self, submit: &Submit<'_>) -> SubmitReport {
		let mut report = SubmitReport::default();

		self.resource_manager.poll_queries(&mut self.device);

		for encoder in submit.command_encoders.iter() {
			for pass in encoder.passes.iter() {
				match pass {
					PassItem::Render(pass) => self.execute_render_pass(pass, &mut report),
					PassItem::TransformFeedback(pass) => self.execute_feedback_pass(pass, &mut report),
					PassItem::Blit(pass) => self.execute_blit(pass, &mut report),
					PassItem::CopyBufferToBuffer(copy) => self.execute_buffer_copy(copy, &mut report),
					PassItem::CopyTextureToTexture(copy) => self.execute_texture_copy(copy, &mut report),
				}

				self.flush_warnings(&mut report);
			}
		}

		self.resource_manager.poll_queries(&mut self.device);

		if !report.is_clean() {
			log::debug!("Submission finished with {} errors ({} draws issued, {} skipped)",
				report.errors.len(), report.draws_issued, report.draws_skipped);
		}

		report
	}

	/// Writes back any occlusion query results that have become available.
	/// Returns how many are still pending.
	pub fn poll_queries(&mut self) -> usize {
		self.resource_manager.poll_queries(&mut self.device)
	}

	/// The bytes last uploaded for `def`, if it has been bound by a draw.
	pub fn uniform_block_bytes(&self, def: &UniformBlockDef) -> Option<&[u8]> {
		self.resource_manager.uniform_block_bytes(def)
	}

	fn flush_warnings(&mut self, report: &mut SubmitReport) {
		for warning in self.resource_manager.take_warnings() {
			report.push(warning);
		}
	}
}


// Teardown
impl<D: Device> Context<D> {
	pub fn delete_buffer(&mut self, def: &BufferDef) {
		self.resource_manager.delete_buffer(&mut self.device, def);
	}

	pub fn delete_texture(&mut self, def: &TextureDef) {
		self.resource_manager.delete_texture(&mut self.device, def);
	}

	pub fn delete_sampler(&mut self, def: &SamplerDef) {
		self.resource_manager.delete_sampler(&mut self.device, def);
	}

	pub fn delete_renderbuffer(&mut self, def: &RenderbufferDef) {
		self.resource_manager.delete_renderbuffer(&mut self.device, def);
	}

	pub fn delete_framebuffer(&mut self, def: &RenderPassDef) {
		self.resource_manager.delete_framebuffer(&mut self.device, def);
	}

	/// Also forgets a previous build failure, so a fixed pipeline can be retried.
	pub fn delete_program(&mut self, def: &PipelineDef) {
		self.resource_manager.delete_program(&mut self.device, def);
	}

	pub fn delete_vertex_state(&mut self, def: &VertexAttributesDef) {
		self.resource_manager.delete_vertex_state(&mut self.device, def);
	}

	pub fn delete_transform_feedback(&mut self, def: &TransformFeedbackDef) {
		self.resource_manager.delete_transform_feedback(&mut self.device, def);
	}

	pub fn delete_uniform_block(&mut self, def: &UniformBlockDef) {
		self.resource_manager.delete_uniform_block(&mut self.device, def);
	}

	pub fn delete_query(&mut self, def: &QueryDef) {
		self.resource_manager.delete_query(&mut self.device, def);
	}

	/// Destroys every backend object. Descriptors stay valid and are rebuilt on next use.
	pub fn release_all(&mut self) {
		self.resource_manager.release_all(&mut self.device);
	}
}
