use super::BindingResources;
use crate::resource_manager::{PipelineDef, VertexAttributesDef, IndicesDef, QueryDef};


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Rect {
	pub x: i32,
	pub y: i32,
	pub width: u32,
	pub height: u32,
}

impl Rect {
	pub fn new(x: i32, y: i32, width: u32, height: u32) -> Rect {
		Rect { x, y, width, height }
	}

	pub fn from_size((width, height): (u32, u32)) -> Rect {
		Rect { x: 0, y: 0, width, height }
	}

	/// The same rect measured from the other vertical edge of a target `target_height` tall.
	pub fn flipped(&self, target_height: u32) -> Rect {
		Rect {
			y: target_height as i32 - self.y - self.height as i32,
			..*self
		}
	}

	pub(crate) fn corners(&self) -> [i32; 4] {
		[self.x, self.y, self.x + self.width as i32, self.y + self.height as i32]
	}
}


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawCall {
	Vertices {
		first_vertex: u32,
		vertex_count: u32,
		/// Not instanced if unset.
		instance_count: Option<u32>,
	},

	Indexed {
		first_index: u32,
		index_count: u32,
		instance_count: Option<u32>,
	},
}

impl DrawCall {
	pub fn instance_count(&self) -> Option<u32> {
		match *self {
			DrawCall::Vertices { instance_count, .. } | DrawCall::Indexed { instance_count, .. } => instance_count,
		}
	}

	fn set_instance_count(&mut self, count: u32) {
		match self {
			DrawCall::Vertices { instance_count, .. } | DrawCall::Indexed { instance_count, .. } => *instance_count = Some(count),
		}
	}
}


/// One draw, with everything it needs borrowed from the caller.
#[derive(Debug, Clone)]
pub struct DrawCmd<'a> {
	pub pipeline: &'a PipelineDef,
	pub vertices: &'a VertexAttributesDef,
	pub indices: Option<&'a IndicesDef>,
	pub bindings: Option<&'a BindingResources>,
	pub call: DrawCall,

	/// Full target extent if unset.
	pub viewport: Option<Rect>,
	/// No scissoring if unset.
	pub scissor: Option<Rect>,
	pub stencil_reference: i32,
}

impl<'a> DrawCmd<'a> {
	pub fn new(pipeline: &'a PipelineDef, vertices: &'a VertexAttributesDef) -> DrawCmd<'a> {
		DrawCmd {
			pipeline,
			vertices,
			indices: None,
			bindings: None,
			call: DrawCall::Vertices { first_vertex: 0, vertex_count: 3, instance_count: None },
			viewport: None,
			scissor: None,
			stencil_reference: 0,
		}
	}

	pub fn vertices(mut self, first_vertex: u32, vertex_count: u32) -> Self {
		let instance_count = self.call.instance_count();
		self.indices = None;
		self.call = DrawCall::Vertices { first_vertex, vertex_count, instance_count };
		self
	}

	pub fn indexed(mut self, indices: &'a IndicesDef, first_index: u32, index_count: u32) -> Self {
		let instance_count = self.call.instance_count();
		self.indices = Some(indices);
		self.call = DrawCall::Indexed { first_index, index_count, instance_count };
		self
	}

	pub fn instances(mut self, instance_count: u32) -> Self {
		self.call.set_instance_count(instance_count);
		self
	}

	pub fn bindings(mut self, bindings: &'a BindingResources) -> Self {
		self.bindings = Some(bindings);
		self
	}

	pub fn viewport(mut self, viewport: Rect) -> Self {
		self.viewport = Some(viewport);
		self
	}

	pub fn scissor(mut self, scissor: Rect) -> Self {
		self.scissor = Some(scissor);
		self
	}

	pub fn stencil_reference(mut self, reference: i32) -> Self {
		self.stencil_reference = reference;
		self
	}
}


#[derive(Debug, Clone)]
pub enum DrawItem<'a> {
	Draw(DrawCmd<'a>),

	/// Draws whose combined visibility is written back to `query`. Can't be nested.
	OcclusionQuery {
		query: &'a QueryDef,
		draws: Vec<DrawItem<'a>>,
	},
}

impl<'a> From<DrawCmd<'a>> for DrawItem<'a> {
	fn from(cmd: DrawCmd<'a>) -> DrawItem<'a> {
		DrawItem::Draw(cmd)
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn instance_count_survives_switching_call_kind() {
		let pipeline = PipelineDef::new("vs", "fs");
		let vertices = VertexAttributesDef::new();

		let cmd = DrawCmd::new(&pipeline, &vertices).instances(4).vertices(0, 6);
		assert_eq!(cmd.call, DrawCall::Vertices { first_vertex: 0, vertex_count: 6, instance_count: Some(4) });
	}

	#[test]
	fn flipping_mirrors_vertically() {
		let rect = Rect::new(10, 0, 20, 30);
		assert_eq!(rect.flipped(100), Rect::new(10, 70, 20, 30));
		assert_eq!(rect.corners(), [10, 0, 30, 30]);
	}
}
