
/// Settings a [`Context`](crate::Context) is created with.
#[derive(Debug, Clone)]
pub struct ContextConfig {
	/// Size of the default surface, used by passes that target it.
	pub surface_size: (u32, u32),

	/// Drive the device as if it were baseline tier, even if it could do more.
	pub force_baseline: bool,

	/// Check framebuffer completeness whenever one is (re)built.
	pub validate_framebuffers: bool,
}

impl Default for ContextConfig {
	fn default() -> Self {
		ContextConfig {
			surface_size: (1, 1),
			force_baseline: false,
			validate_framebuffers: true,
		}
	}
}
