use crate::resource_manager::{TextureDef, SamplerDef, UniformBlockDef, BufferView};
use crate::resource_manager::layout::UniformValue;

use std::collections::HashMap;
use std::rc::Rc;


#[derive(Debug, Clone)]
pub enum BindingValue {
	Value(UniformValue),
	TextureSampler {
		texture: Rc<TextureDef>,
		sampler: Rc<SamplerDef>,
	},

	/// Typed values for a uniform block.
	Block(Rc<UniformBlockDef>),
	/// Raw bytes for a uniform block, already in the block's layout.
	Buffer(BufferView),

	Struct(BindingResources),
	Array(Vec<BindingValue>),
}

impl From<UniformValue> for BindingValue {
	fn from(value: UniformValue) -> Self {
		BindingValue::Value(value)
	}
}

impl From<Rc<UniformBlockDef>> for BindingValue {
	fn from(block: Rc<UniformBlockDef>) -> Self {
		BindingValue::Block(block)
	}
}

impl From<BufferView> for BindingValue {
	fn from(view: BufferView) -> Self {
		BindingValue::Buffer(view)
	}
}

impl From<BindingResources> for BindingValue {
	fn from(resources: BindingResources) -> Self {
		BindingValue::Struct(resources)
	}
}

impl From<Vec<BindingValue>> for BindingValue {
	fn from(values: Vec<BindingValue>) -> Self {
		BindingValue::Array(values)
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'p> {
	Field(&'p str),
	Index(usize),
}

/// `lights[2].color` -> `lights`, `2`, `color`
fn parse_path(path: &str) -> Option<Vec<Segment<'_>>> {
	let mut segments = Vec::new();

	for part in path.split('.') {
		let (field, mut rest) = match part.find('[') {
			Some(bracket) => part.split_at(bracket),
			None => (part, ""),
		};

		if field.is_empty() {
			return None
		}

		segments.push(Segment::Field(field));

		while !rest.is_empty() {
			let close = rest.find(']')?;
			let index = rest.get(1..close)?.parse().ok()?;
			segments.push(Segment::Index(index));
			rest = &rest[close + 1..];

			if !rest.is_empty() && !rest.starts_with('[') {
				return None
			}
		}
	}

	Some(segments)
}


/// Values for a draw's uniforms, by the name the program reflects them with.
///
/// Names can either be given flat (`"lights[0].color"`), or structured with
/// [`BindingValue::Struct`] and [`BindingValue::Array`]. Flat names win.
#[derive(Debug, Clone, Default)]
pub struct BindingResources {
	entries: HashMap<String, BindingValue>,
}

impl BindingResources {
	pub fn new() -> BindingResources {
		BindingResources::default()
	}

	pub fn with(mut self, name: impl Into<String>, value: impl Into<BindingValue>) -> BindingResources {
		self.set(name, value);
		self
	}

	pub fn with_value(self, name: impl Into<String>, value: impl Into<UniformValue>) -> BindingResources {
		self.with(name, value.into())
	}

	pub fn with_texture(self, name: impl Into<String>, texture: Rc<TextureDef>, sampler: Rc<SamplerDef>) -> BindingResources {
		self.with(name, BindingValue::TextureSampler { texture, sampler })
	}

	pub fn set(&mut self, name: impl Into<String>, value: impl Into<BindingValue>) {
		self.entries.insert(name.into(), value.into());
	}

	pub fn get(&self, name: &str) -> Option<&BindingValue> {
		self.entries.get(name)
	}

	pub fn remove(&mut self, name: &str) -> Option<BindingValue> {
		self.entries.remove(name)
	}

	pub fn iter(&self) -> impl Iterator<Item=(&str, &BindingValue)> {
		self.entries.iter().map(|(name, value)| (name.as_str(), value))
	}

	pub fn resolve(&self, path: &str) -> Option<&BindingValue> {
		if let Some(value) = self.entries.get(path) {
			return Some(value)
		}

		let segments = parse_path(path)?;
		let (first, rest) = segments.split_first()?;

		let Segment::Field(name) = first else {
			return None
		};

		let mut current = self.entries.get(*name)?;

		for segment in rest {
			current = match (segment, current) {
				(Segment::Field(name), BindingValue::Struct(fields)) => fields.resolve(name)?,
				(Segment::Index(index), BindingValue::Array(elements)) => elements.get(*index)?,
				_ => return None,
			};
		}

		Some(current)
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use glam::Vec3;

	#[test]
	fn paths_parse_into_segments() {
		use Segment::*;
		assert_eq!(parse_path("a.b[2].c"), Some(vec![Field("a"), Field("b"), Index(2), Field("c")]));
		assert_eq!(parse_path("m[1][3]"), Some(vec![Field("m"), Index(1), Index(3)]));
		assert_eq!(parse_path("a..b"), None);
		assert_eq!(parse_path("a[x]"), None);
	}

	#[test]
	fn structured_values_resolve() {
		let light = BindingResources::new().with_value("color", Vec3::X);
		let bindings = BindingResources::new()
			.with("lights", vec![BindingValue::Struct(BindingResources::new()), BindingValue::Struct(light)]);

		let resolved = bindings.resolve("lights[1].color");
		assert!(matches!(resolved, Some(BindingValue::Value(UniformValue::Vec3(v))) if *v == Vec3::X));
		assert!(bindings.resolve("lights[0].color").is_none());
		assert!(bindings.resolve("lights[2].color").is_none());
	}

	#[test]
	fn flat_names_take_priority() {
		let bindings = BindingResources::new()
			.with_value("lights[0].radius", 2.0f32)
			.with("lights", vec![BindingValue::Struct(BindingResources::new().with_value("radius", 1.0f32))]);

		assert!(matches!(bindings.resolve("lights[0].radius"), Some(BindingValue::Value(UniformValue::Float(v))) if *v == 2.0));
	}
}
