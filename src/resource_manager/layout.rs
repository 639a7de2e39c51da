//! Uniform value types and the byte layout of uniform blocks.
//!
//! Blocks are laid out the way the backend packs `std140` blocks: scalars and vectors align
//! to their size rounded up to a power of two (at most 16), matrices take one 16 byte aligned
//! slot per column, array elements and struct boundaries start on a 16 byte boundary, and the
//! total is rounded up to 16.

use glam::{Vec2, Vec3, Vec4, IVec2, IVec3, IVec4, UVec2, UVec3, UVec4, Mat2, Mat3, Mat4};


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum ScalarKind {
	Float,
	Int,
	Uint,
	Bool,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum ValueType {
	Scalar(ScalarKind),
	Vector(ScalarKind, u8),
	Matrix { columns: u8, rows: u8 },
}

impl ValueType {
	pub fn from_gl(ty: u32) -> Option<ValueType> {
		use ScalarKind::*;
		use ValueType::*;

		let value_type = match ty {
			gl::FLOAT => Scalar(Float),
			gl::FLOAT_VEC2 => Vector(Float, 2),
			gl::FLOAT_VEC3 => Vector(Float, 3),
			gl::FLOAT_VEC4 => Vector(Float, 4),
			gl::INT => Scalar(Int),
			gl::INT_VEC2 => Vector(Int, 2),
			gl::INT_VEC3 => Vector(Int, 3),
			gl::INT_VEC4 => Vector(Int, 4),
			gl::UNSIGNED_INT => Scalar(Uint),
			gl::UNSIGNED_INT_VEC2 => Vector(Uint, 2),
			gl::UNSIGNED_INT_VEC3 => Vector(Uint, 3),
			gl::UNSIGNED_INT_VEC4 => Vector(Uint, 4),
			gl::BOOL => Scalar(Bool),
			gl::BOOL_VEC2 => Vector(Bool, 2),
			gl::BOOL_VEC3 => Vector(Bool, 3),
			gl::BOOL_VEC4 => Vector(Bool, 4),
			gl::FLOAT_MAT2 => Matrix { columns: 2, rows: 2 },
			gl::FLOAT_MAT3 => Matrix { columns: 3, rows: 3 },
			gl::FLOAT_MAT4 => Matrix { columns: 4, rows: 4 },
			gl::FLOAT_MAT2x3 => Matrix { columns: 2, rows: 3 },
			gl::FLOAT_MAT2x4 => Matrix { columns: 2, rows: 4 },
			gl::FLOAT_MAT3x2 => Matrix { columns: 3, rows: 2 },
			gl::FLOAT_MAT3x4 => Matrix { columns: 3, rows: 4 },
			gl::FLOAT_MAT4x2 => Matrix { columns: 4, rows: 2 },
			gl::FLOAT_MAT4x3 => Matrix { columns: 4, rows: 3 },
			_ => return None,
		};

		Some(value_type)
	}

	pub fn scalar_kind(self) -> ScalarKind {
		match self {
			ValueType::Scalar(kind) | ValueType::Vector(kind, _) => kind,
			ValueType::Matrix{..} => ScalarKind::Float,
		}
	}

	pub fn component_count(self) -> usize {
		match self {
			ValueType::Scalar(_) => 1,
			ValueType::Vector(_, n) => n as usize,
			ValueType::Matrix { columns, rows } => columns as usize * rows as usize,
		}
	}

	/// (size, alignment) of one value inside a uniform block.
	pub fn block_size_align(self) -> (usize, usize) {
		match self {
			ValueType::Matrix { columns, .. } => (16 * columns as usize, 16),
			_ => {
				let size = 4 * self.component_count();
				(size, size.next_power_of_two().min(16))
			}
		}
	}
}


/// Splits `name[0]` style names reported for arrays into one name per element.
pub(crate) fn expand_array(name: &str, size: i32) -> Vec<String> {
	match name.strip_suffix("[0]") {
		Some(base) => (0..size.max(1)).map(|index| format!("{base}[{index}]")).collect(),
		None => vec![name.to_owned()],
	}
}

/// `lights[3]` -> (`lights`, 3)
pub(crate) fn split_index(name: &str) -> Option<(&str, usize)> {
	let stripped = name.strip_suffix(']')?;
	let (base, index) = stripped.rsplit_once('[')?;
	Some((base, index.parse().ok()?))
}


#[derive(Debug, Clone, PartialEq)]
pub struct MemberLayout {
	/// Relative to the block, without any `Block.` prefix.
	pub name: String,
	pub value_type: ValueType,
	pub offset: usize,
	pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
	pub name: String,
	pub members: Vec<MemberLayout>,
	pub size: usize,
}

fn align_to(offset: usize, alignment: usize) -> usize {
	(offset + alignment - 1) / alignment * alignment
}

impl BlockLayout {
	/// Lays out members in the order given. Array members must already be expanded.
	pub fn compute(name: impl Into<String>, members: impl IntoIterator<Item=(String, ValueType)>) -> BlockLayout {
		let mut offset = 0;
		let mut previous_prefix: Option<String> = None;
		let mut layouts = Vec::new();

		for (member_name, value_type) in members {
			let prefix = member_name.rsplit_once('.').map_or("", |(prefix, _)| prefix).to_owned();

			// Crossing into a different struct
			if previous_prefix.as_ref().map_or(false, |previous| *previous != prefix) {
				offset = align_to(offset, 16);
			}

			let is_array_element = member_name.ends_with(']');
			let (size, alignment) = value_type.block_size_align();
			let alignment = if is_array_element { 16 } else { alignment };

			offset = align_to(offset, alignment);
			layouts.push(MemberLayout { name: member_name, value_type, offset, size });
			offset += size;

			if is_array_element {
				offset = align_to(offset, 16);
			}

			previous_prefix = Some(prefix);
		}

		BlockLayout {
			name: name.into(),
			members: layouts,
			size: align_to(offset, 16),
		}
	}

	pub fn member(&self, name: &str) -> Option<&MemberLayout> {
		self.members.iter().find(|member| member.name == name)
	}
}


#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
	Float(f32),
	Vec2(Vec2),
	Vec3(Vec3),
	Vec4(Vec4),
	Int(i32),
	IVec2(IVec2),
	IVec3(IVec3),
	IVec4(IVec4),
	Uint(u32),
	UVec2(UVec2),
	UVec3(UVec3),
	UVec4(UVec4),
	Bool(bool),
	Mat2(Mat2),
	Mat3(Mat3),
	Mat4(Mat4),

	/// Flat data for arrays, or for shapes not covered above.
	Floats(Vec<f32>),
	Ints(Vec<i32>),
	Uints(Vec<u32>),
}

/// The scalars of a value, matrices in column major order.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalars {
	Float(Vec<f32>),
	Int(Vec<i32>),
	Uint(Vec<u32>),
}

impl Scalars {
	pub fn len(&self) -> usize {
		match self {
			Scalars::Float(values) => values.len(),
			Scalars::Int(values) => values.len(),
			Scalars::Uint(values) => values.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn as_bytes(&self) -> &[u8] {
		match self {
			Scalars::Float(values) => bytemuck::cast_slice(values),
			Scalars::Int(values) => bytemuck::cast_slice(values),
			Scalars::Uint(values) => bytemuck::cast_slice(values),
		}
	}
}

impl UniformValue {
	pub fn scalars(&self) -> Scalars {
		use UniformValue::*;

		match self {
			Float(v) => Scalars::Float(vec![*v]),
			Vec2(v) => Scalars::Float(v.to_array().to_vec()),
			Vec3(v) => Scalars::Float(v.to_array().to_vec()),
			Vec4(v) => Scalars::Float(v.to_array().to_vec()),
			Int(v) => Scalars::Int(vec![*v]),
			IVec2(v) => Scalars::Int(v.to_array().to_vec()),
			IVec3(v) => Scalars::Int(v.to_array().to_vec()),
			IVec4(v) => Scalars::Int(v.to_array().to_vec()),
			Uint(v) => Scalars::Uint(vec![*v]),
			UVec2(v) => Scalars::Uint(v.to_array().to_vec()),
			UVec3(v) => Scalars::Uint(v.to_array().to_vec()),
			UVec4(v) => Scalars::Uint(v.to_array().to_vec()),
			Bool(v) => Scalars::Int(vec![*v as i32]),
			Mat2(v) => Scalars::Float(v.to_cols_array().to_vec()),
			Mat3(v) => Scalars::Float(v.to_cols_array().to_vec()),
			Mat4(v) => Scalars::Float(v.to_cols_array().to_vec()),
			Floats(v) => Scalars::Float(v.clone()),
			Ints(v) => Scalars::Int(v.clone()),
			Uints(v) => Scalars::Uint(v.clone()),
		}
	}

	/// Element `index` of flat array data, `components` scalars wide.
	pub fn element(&self, index: usize, components: usize) -> Option<UniformValue> {
		let range = index * components..(index + 1) * components;

		match self {
			UniformValue::Floats(values) => values.get(range).map(|v| UniformValue::Floats(v.to_vec())),
			UniformValue::Ints(values) => values.get(range).map(|v| UniformValue::Ints(v.to_vec())),
			UniformValue::Uints(values) => values.get(range).map(|v| UniformValue::Uints(v.to_vec())),
			_ => None,
		}
	}

	/// Converts to the scalars `value_type` expects, or describes why it can't.
	pub fn coerce(&self, value_type: ValueType) -> Result<Scalars, String> {
		let scalars = self.scalars();
		let expected = value_type.component_count();

		if scalars.len() != expected {
			return Err(format!("expected {expected} components for {value_type:?}, got {}", scalars.len()))
		}

		let coerced = match (value_type.scalar_kind(), scalars) {
			(ScalarKind::Float, scalars @ Scalars::Float(_)) => scalars,
			(ScalarKind::Int, scalars @ Scalars::Int(_)) => scalars,
			(ScalarKind::Uint, scalars @ Scalars::Uint(_)) => scalars,

			(ScalarKind::Bool, Scalars::Int(values)) => Scalars::Int(values.iter().map(|&v| (v != 0) as i32).collect()),
			(ScalarKind::Bool, Scalars::Uint(values)) => Scalars::Int(values.iter().map(|&v| (v != 0) as i32).collect()),
			(ScalarKind::Bool, Scalars::Float(values)) => Scalars::Int(values.iter().map(|&v| (v != 0.0) as i32).collect()),

			(kind, scalars) => return Err(format!("{kind:?} value expected, got {scalars:?}")),
		};

		Ok(coerced)
	}
}

impl MemberLayout {
	/// Writes `value` into this member's bytes within `block`.
	pub fn encode(&self, value: &UniformValue, block: &mut [u8]) -> Result<(), String> {
		let scalars = value.coerce(self.value_type)?;
		let bytes = scalars.as_bytes();

		if self.offset + self.size > block.len() {
			return Err(format!("member at {} overruns block of {} bytes", self.offset, block.len()))
		}

		match self.value_type {
			ValueType::Matrix { columns, rows } => {
				let column_len = rows as usize * 4;

				for column in 0..columns as usize {
					let dest = self.offset + column * 16;
					block[dest..dest + column_len].copy_from_slice(&bytes[column * column_len..(column + 1) * column_len]);
				}
			}

			_ => {
				block[self.offset..self.offset + bytes.len()].copy_from_slice(bytes);
			}
		}

		Ok(())
	}
}


impl From<f32> for UniformValue {
	fn from(v: f32) -> Self { UniformValue::Float(v) }
}

impl From<Vec2> for UniformValue {
	fn from(v: Vec2) -> Self { UniformValue::Vec2(v) }
}

impl From<Vec3> for UniformValue {
	fn from(v: Vec3) -> Self { UniformValue::Vec3(v) }
}

impl From<Vec4> for UniformValue {
	fn from(v: Vec4) -> Self { UniformValue::Vec4(v) }
}

impl From<i32> for UniformValue {
	fn from(v: i32) -> Self { UniformValue::Int(v) }
}

impl From<IVec2> for UniformValue {
	fn from(v: IVec2) -> Self { UniformValue::IVec2(v) }
}

impl From<IVec3> for UniformValue {
	fn from(v: IVec3) -> Self { UniformValue::IVec3(v) }
}

impl From<IVec4> for UniformValue {
	fn from(v: IVec4) -> Self { UniformValue::IVec4(v) }
}

impl From<u32> for UniformValue {
	fn from(v: u32) -> Self { UniformValue::Uint(v) }
}

impl From<UVec2> for UniformValue {
	fn from(v: UVec2) -> Self { UniformValue::UVec2(v) }
}

impl From<UVec3> for UniformValue {
	fn from(v: UVec3) -> Self { UniformValue::UVec3(v) }
}

impl From<UVec4> for UniformValue {
	fn from(v: UVec4) -> Self { UniformValue::UVec4(v) }
}

impl From<bool> for UniformValue {
	fn from(v: bool) -> Self { UniformValue::Bool(v) }
}

impl From<Mat2> for UniformValue {
	fn from(v: Mat2) -> Self { UniformValue::Mat2(v) }
}

impl From<Mat3> for UniformValue {
	fn from(v: Mat3) -> Self { UniformValue::Mat3(v) }
}

impl From<Mat4> for UniformValue {
	fn from(v: Mat4) -> Self { UniformValue::Mat4(v) }
}

impl From<Vec<f32>> for UniformValue {
	fn from(v: Vec<f32>) -> Self { UniformValue::Floats(v) }
}


#[cfg(test)]
mod tests {
	use super::*;

	fn floats(bytes: &[u8]) -> Vec<f32> {
		bytes.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
	}

	fn vec_of(kind: ScalarKind, n: u8) -> ValueType {
		ValueType::Vector(kind, n)
	}

	#[test]
	fn float_vec3_mat4_block() {
		let layout = BlockLayout::compute("Block", [
			("a".to_owned(), ValueType::Scalar(ScalarKind::Float)),
			("b".to_owned(), vec_of(ScalarKind::Float, 3)),
			("c".to_owned(), ValueType::Matrix { columns: 4, rows: 4 }),
		]);

		let placed: Vec<_> = layout.members.iter().map(|m| (m.name.as_str(), m.offset, m.size)).collect();
		assert_eq!(placed, [("a", 0, 4), ("b", 16, 12), ("c", 32, 64)]);
		assert_eq!(layout.size, 96);
	}

	#[test]
	fn scalar_packs_after_vec3() {
		let layout = BlockLayout::compute("Block", [
			("dir".to_owned(), vec_of(ScalarKind::Float, 3)),
			("intensity".to_owned(), ValueType::Scalar(ScalarKind::Float)),
		]);

		assert_eq!(layout.member("intensity").unwrap().offset, 12);
		assert_eq!(layout.size, 16);
	}

	#[test]
	fn array_elements_take_whole_slots() {
		let members = expand_array("weights[0]", 3).into_iter()
			.map(|name| (name, ValueType::Scalar(ScalarKind::Float)));

		let layout = BlockLayout::compute("Block", members);
		let offsets: Vec<_> = layout.members.iter().map(|m| m.offset).collect();
		assert_eq!(offsets, [0, 16, 32]);
		assert_eq!(layout.size, 48);
	}

	#[test]
	fn struct_boundaries_realign() {
		let layout = BlockLayout::compute("Block", [
			("lights[0].color".to_owned(), vec_of(ScalarKind::Float, 3)),
			("lights[0].radius".to_owned(), ValueType::Scalar(ScalarKind::Float)),
			("lights[1].color".to_owned(), vec_of(ScalarKind::Float, 3)),
			("lights[1].radius".to_owned(), ValueType::Scalar(ScalarKind::Float)),
			("count".to_owned(), ValueType::Scalar(ScalarKind::Int)),
		]);

		let offsets: Vec<_> = layout.members.iter().map(|m| m.offset).collect();
		assert_eq!(offsets, [0, 12, 16, 28, 32]);
		assert_eq!(layout.size, 48);
	}

	#[test]
	fn mat3_columns_are_padded() {
		let layout = BlockLayout::compute("Block", [("m".to_owned(), ValueType::Matrix { columns: 3, rows: 3 })]);
		let member = &layout.members[0];
		assert_eq!(member.size, 48);

		let mut bytes = vec![0u8; layout.size];
		member.encode(&UniformValue::Mat3(Mat3::IDENTITY), &mut bytes).unwrap();

		let floats = floats(&bytes);
		assert_eq!(&floats[0..4], &[1.0, 0.0, 0.0, 0.0]);
		assert_eq!(&floats[4..8], &[0.0, 1.0, 0.0, 0.0]);
		assert_eq!(&floats[8..12], &[0.0, 0.0, 1.0, 0.0]);
	}

	#[test]
	fn mismatched_values_are_rejected() {
		let vec3 = vec_of(ScalarKind::Float, 3);
		assert!(UniformValue::Vec4(Vec4::ONE).coerce(vec3).is_err());
		assert!(UniformValue::IVec3(IVec3::ONE).coerce(vec3).is_err());
		assert_eq!(UniformValue::Bool(true).coerce(ValueType::Scalar(ScalarKind::Bool)), Ok(Scalars::Int(vec![1])));
	}

	#[test]
	fn array_names() {
		assert_eq!(expand_array("w[0]", 2), ["w[0]", "w[1]"]);
		assert_eq!(expand_array("single", 1), ["single"]);
		assert_eq!(split_index("lights[12]"), Some(("lights", 12)));
		assert_eq!(split_index("lights"), None);
	}
}
