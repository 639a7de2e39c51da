pub mod bindings;
pub mod draw_cmd;
pub mod pass;

pub use self::bindings::{BindingResources, BindingValue};
pub use self::draw_cmd::{DrawCmd, DrawCall, DrawItem, Rect};
pub use self::pass::{
	PassItem, RenderPass, RenderTarget, SurfaceOps, FeedbackPass, BlitPass,
	CopyBufferToBuffer, CopyTextureToTexture, TextureCopyView,
};


/// An ordered list of passes.
#[derive(Debug, Clone, Default)]
pub struct CommandEncoder<'a> {
	pub passes: Vec<PassItem<'a>>,
}

impl<'a> CommandEncoder<'a> {
	pub fn new() -> Self {
		CommandEncoder { passes: Vec::new() }
	}

	pub fn render_pass(&mut self, target: RenderTarget<'a>) -> &mut RenderPass<'a> {
		self.passes.push(PassItem::Render(RenderPass::new(target)));

		match self.passes.last_mut() {
			Some(PassItem::Render(pass)) => pass,
			_ => unreachable!(),
		}
	}

	pub fn push(&mut self, item: impl Into<PassItem<'a>>) -> &mut Self {
		self.passes.push(item.into());
		self
	}
}


/// Everything executed by one [`Context::submit`](crate::Context::submit) call, in order.
#[derive(Debug, Clone, Default)]
pub struct Submit<'a> {
	pub command_encoders: Vec<CommandEncoder<'a>>,
}

impl<'a> Submit<'a> {
	pub fn new() -> Self {
		Submit { command_encoders: Vec::new() }
	}

	pub fn encoder(&mut self) -> &mut CommandEncoder<'a> {
		self.command_encoders.push(CommandEncoder::new());

		match self.command_encoders.last_mut() {
			Some(encoder) => encoder,
			None => unreachable!(),
		}
	}

	pub fn with_encoder(mut self, encoder: CommandEncoder<'a>) -> Self {
		self.command_encoders.push(encoder);
		self
	}
}


impl<'a> From<RenderPass<'a>> for PassItem<'a> {
	fn from(pass: RenderPass<'a>) -> Self {
		PassItem::Render(pass)
	}
}

impl<'a> From<FeedbackPass<'a>> for PassItem<'a> {
	fn from(pass: FeedbackPass<'a>) -> Self {
		PassItem::TransformFeedback(pass)
	}
}

impl<'a> From<BlitPass<'a>> for PassItem<'a> {
	fn from(pass: BlitPass<'a>) -> Self {
		PassItem::Blit(pass)
	}
}

impl<'a> From<CopyBufferToBuffer<'a>> for PassItem<'a> {
	fn from(copy: CopyBufferToBuffer<'a>) -> Self {
		PassItem::CopyBufferToBuffer(copy)
	}
}

impl<'a> From<CopyTextureToTexture<'a>> for PassItem<'a> {
	fn from(copy: CopyTextureToTexture<'a>) -> Self {
		PassItem::CopyTextureToTexture(copy)
	}
}
