//! A [`Device`] that records every call instead of talking to a GPU.
#![allow(dead_code)]

use glpass::device::{ActiveAttribute, ActiveUniform, ActiveUniformBlock, Device, UniformData};
use glpass::formats::VertexFormat;
use glpass::{BufferDef, BufferUsage, Capabilities, Context, ContextConfig, PipelineDef, VertexAttribute, VertexAttributesDef};
use glpass::{init_logging, LoggingConfig};

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;


#[derive(Debug, Clone, PartialEq)]
pub enum Values {
	Float(Vec<f32>),
	Int(Vec<i32>),
	Uint(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
	Create { kind: &'static str, name: u32 },
	Delete { kind: &'static str, name: u32 },

	BindBuffer { target: u32, name: u32 },
	BufferData { target: u32, data: Vec<u8> },
	BufferSubData { target: u32, offset: usize, data: Vec<u8> },
	BindBufferRange { target: u32, index: u32, name: u32, offset: usize, size: usize },
	CopyBufferSubData { read_offset: usize, write_offset: usize, size: usize },

	ActiveTexture(u32),
	BindTexture { target: u32, name: u32 },
	TexImage { target: u32, level: u32, width: u32, height: u32, depth: u32 },
	TexSubImage { target: u32, level: u32 },
	CopyTexSubImage { target: u32, level: u32, layer: Option<u32> },
	TexParameter { target: u32, pname: u32, value: i32 },
	GenerateMipmap(u32),

	SamplerParameter { name: u32, pname: u32 },
	BindSampler { unit: u32, name: u32 },

	RenderbufferStorage { name: u32, samples: u32, width: u32, height: u32 },

	BindFramebuffer { target: u32, name: u32 },
	FramebufferTexture { attachment: u32, texture: u32, layer: Option<u32> },
	FramebufferRenderbuffer { attachment: u32, renderbuffer: u32 },
	DrawBuffers(Vec<u32>),
	ReadBuffer(u32),
	BlitFramebuffer { src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32 },
	ReadPixels { x: i32, y: i32, width: u32, height: u32, format: u32, ty: u32 },

	CompileShader(u32),
	LinkProgram(u32),
	UseProgram(u32),
	TransformFeedbackVaryings { program: u32, varyings: Vec<String> },
	UniformBlockBinding { program: u32, index: u32, binding: u32 },
	Uniform { location: i32, values: Values },

	BindVertexArray(u32),
	EnableAttribute(u32),
	DisableAttribute(u32),
	AttributePointer { location: u32, components: i32, ty: u32, stride: u32, offset: usize },
	AttributeDivisor { location: u32, divisor: u32 },

	DrawArrays { mode: u32, first: u32, count: u32 },
	DrawArraysInstanced { mode: u32, first: u32, count: u32, instances: u32 },
	DrawElements { mode: u32, count: u32, ty: u32, offset: usize },
	DrawElementsInstanced { mode: u32, count: u32, ty: u32, offset: usize, instances: u32 },

	Enable(u32),
	Disable(u32),
	Viewport([i32; 4]),
	Scissor([i32; 4]),
	ColorMask([bool; 4]),
	DepthMask(bool),
	DepthFunc(u32),
	BlendEquation { rgb: u32, alpha: u32 },
	BlendFunc([u32; 4]),

	ClearColor([f32; 4]),
	Clear(u32),
	ClearBuffer { buffer: u32, draw_buffer: u32 },

	BeginQuery(u32),
	EndQuery,

	BindTransformFeedback(u32),
	BeginTransformFeedback(u32),
	EndTransformFeedback,

	/// Anything tests don't look at in detail.
	Other(&'static str),
}


/// What a program reports about itself once linked, registered by vertex shader source.
#[derive(Debug, Clone, Default)]
pub struct ProgramLayout {
	pub attributes: Vec<ActiveAttribute>,
	pub uniforms: Vec<ActiveUniform>,
	pub blocks: Vec<ActiveUniformBlock>,
}

impl ProgramLayout {
	pub fn new() -> ProgramLayout {
		ProgramLayout::default()
	}

	pub fn attribute(mut self, name: &str, ty: u32, location: i32) -> ProgramLayout {
		self.attributes.push(ActiveAttribute { name: name.into(), size: 1, ty, location });
		self
	}

	pub fn uniform(mut self, name: &str, ty: u32) -> ProgramLayout {
		self.uniforms.push(ActiveUniform { name: name.into(), size: 1, ty, block_index: None });
		self
	}

	pub fn uniform_array(mut self, name: &str, ty: u32, size: i32) -> ProgramLayout {
		self.uniforms.push(ActiveUniform { name: format!("{name}[0]"), size, ty, block_index: None });
		self
	}

	/// Members are named `Block.member`, as GL reports them.
	pub fn block(mut self, name: &str, data_size: usize, members: &[(&str, u32)]) -> ProgramLayout {
		let index = self.blocks.len() as u32;
		self.blocks.push(ActiveUniformBlock { name: name.into(), data_size });

		for &(member, ty) in members {
			self.uniforms.push(ActiveUniform {
				name: format!("{name}.{member}"),
				size: 1,
				ty,
				block_index: Some(index),
			});
		}

		self
	}
}


#[derive(Debug)]
pub struct RecordingDevice {
	pub capabilities: Capabilities,
	pub calls: Vec<Call>,

	next_name: u32,
	shader_sources: HashMap<u32, String>,
	program_shaders: HashMap<u32, Vec<u32>>,
	layouts: HashMap<String, ProgramLayout>,
	linked: HashMap<u32, ProgramLayout>,
	locations: HashMap<(u32, String), i32>,

	/// Results handed to queries as they end, `true` if any samples passed.
	pub query_script: VecDeque<bool>,
	/// While set, no query result is ever available.
	pub hold_queries: bool,
	query_results: HashMap<u32, bool>,
	active_query: Option<u32>,

	pub framebuffer_status: u32,
	/// Bytes handed out by `read_pixels`.
	pub pixel_fill: u8,
	/// Fill each row read back with its row number, counted from the bottom, instead.
	pub number_rows: bool,
}

impl RecordingDevice {
	pub fn new(capabilities: Capabilities) -> RecordingDevice {
		RecordingDevice {
			capabilities,
			calls: Vec::new(),

			next_name: 1,
			shader_sources: HashMap::new(),
			program_shaders: HashMap::new(),
			layouts: HashMap::new(),
			linked: HashMap::new(),
			locations: HashMap::new(),

			query_script: VecDeque::new(),
			hold_queries: false,
			query_results: HashMap::new(),
			active_query: None,

			framebuffer_status: gl::FRAMEBUFFER_COMPLETE,
			pixel_fill: 0xAB,
			number_rows: false,
		}
	}

	pub fn extended() -> RecordingDevice {
		RecordingDevice::new(Capabilities::extended())
	}

	pub fn baseline() -> RecordingDevice {
		RecordingDevice::new(Capabilities::baseline())
	}

	pub fn register_program(&mut self, vertex_source: &str, layout: ProgramLayout) {
		self.layouts.insert(vertex_source.to_owned(), layout);
	}

	pub fn clear_calls(&mut self) {
		self.calls.clear();
	}

	pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
		self.calls.iter().filter(|call| predicate(call)).count()
	}

	pub fn created(&self, kind: &str) -> Vec<u32> {
		self.calls.iter()
			.filter_map(|call| match call {
				Call::Create { kind: k, name } if *k == kind => Some(*name),
				_ => None,
			})
			.collect()
	}

	pub fn deleted(&self, kind: &str) -> Vec<u32> {
		self.calls.iter()
			.filter_map(|call| match call {
				Call::Delete { kind: k, name } if *k == kind => Some(*name),
				_ => None,
			})
			.collect()
	}

	pub fn draws(&self) -> Vec<Call> {
		self.calls.iter()
			.filter(|call| matches!(call, Call::DrawArrays{..} | Call::DrawArraysInstanced{..}
				| Call::DrawElements{..} | Call::DrawElementsInstanced{..}))
			.cloned()
			.collect()
	}

	pub fn position(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
		self.calls.iter().position(predicate)
	}

	fn create(&mut self, kind: &'static str) -> u32 {
		let name = self.next_name;
		self.next_name += 1;
		self.calls.push(Call::Create { kind, name });
		name
	}

	fn delete(&mut self, kind: &'static str, name: u32) {
		self.calls.push(Call::Delete { kind, name });
	}
}


pub const QUAD_VS: &str = "attribute vec2 position;\nvoid main() { gl_Position = vec4(position, 0.0, 1.0); }\n";
pub const QUAD_FS: &str = "void main() { gl_FragColor = vec4(1.0); }\n";

pub fn quad_layout() -> ProgramLayout {
	ProgramLayout::new().attribute("position", gl::FLOAT_VEC2, 0)
}

/// A pipeline drawing two triangles from `position`, with `layout` as its program.
pub fn quad_pipeline(device: &mut RecordingDevice, vertex_source: &str, layout: ProgramLayout) -> PipelineDef {
	device.register_program(vertex_source, layout);
	PipelineDef::new(vertex_source, QUAD_FS)
}

pub fn quad_vertices() -> VertexAttributesDef {
	let positions: [f32; 12] = [
		-1.0, -1.0,   1.0, -1.0,   1.0,  1.0,
		-1.0, -1.0,   1.0,  1.0,  -1.0,  1.0,
	];

	let buffer = Rc::new(BufferDef::from_slice(BufferUsage::Vertex, &positions));
	VertexAttributesDef::new().with("position", VertexAttribute::new(buffer, VertexFormat::Float32x2))
}


pub fn context(device: RecordingDevice) -> Context<RecordingDevice> {
	init_logging(LoggingConfig { is_test: true, ..LoggingConfig::default() });

	let config = ContextConfig {
		surface_size: (64, 32),
		..ContextConfig::default()
	};

	Context::new(device, config).expect("context creation")
}


impl Device for RecordingDevice {
	fn capabilities(&self) -> Capabilities {
		self.capabilities.clone()
	}

	fn create_buffer(&mut self) -> u32 { self.create("buffer") }
	fn delete_buffer(&mut self, name: u32) { self.delete("buffer", name) }

	fn bind_buffer(&mut self, target: u32, name: u32) {
		self.calls.push(Call::BindBuffer { target, name });
	}

	fn buffer_data(&mut self, target: u32, data: &[u8], _usage: u32) {
		self.calls.push(Call::BufferData { target, data: data.to_vec() });
	}

	fn buffer_sub_data(&mut self, target: u32, offset: usize, data: &[u8]) {
		self.calls.push(Call::BufferSubData { target, offset, data: data.to_vec() });
	}

	fn bind_buffer_base(&mut self, target: u32, index: u32, name: u32) {
		self.calls.push(Call::BindBufferRange { target, index, name, offset: 0, size: 0 });
	}

	fn bind_buffer_range(&mut self, target: u32, index: u32, name: u32, offset: usize, size: usize) {
		self.calls.push(Call::BindBufferRange { target, index, name, offset, size });
	}

	fn copy_buffer_sub_data(&mut self, _read_target: u32, _write_target: u32, read_offset: usize, write_offset: usize, size: usize) {
		self.calls.push(Call::CopyBufferSubData { read_offset, write_offset, size });
	}

	fn create_texture(&mut self) -> u32 { self.create("texture") }
	fn delete_texture(&mut self, name: u32) { self.delete("texture", name) }

	fn active_texture(&mut self, unit: u32) {
		self.calls.push(Call::ActiveTexture(unit));
	}

	fn bind_texture(&mut self, target: u32, name: u32) {
		self.calls.push(Call::BindTexture { target, name });
	}

	fn tex_image_2d(&mut self, target: u32, level: u32, _internal_format: u32, width: u32, height: u32,
		_format: u32, _ty: u32, _data: Option<&[u8]>)
	{
		self.calls.push(Call::TexImage { target, level, width, height, depth: 1 });
	}

	fn tex_image_3d(&mut self, target: u32, level: u32, _internal_format: u32, width: u32, height: u32, depth: u32,
		_format: u32, _ty: u32, _data: Option<&[u8]>)
	{
		self.calls.push(Call::TexImage { target, level, width, height, depth });
	}

	fn tex_sub_image_2d(&mut self, target: u32, level: u32, _x: u32, _y: u32, _width: u32, _height: u32,
		_format: u32, _ty: u32, _data: &[u8])
	{
		self.calls.push(Call::TexSubImage { target, level });
	}

	fn tex_sub_image_3d(&mut self, target: u32, level: u32, _x: u32, _y: u32, _z: u32, _width: u32, _height: u32, _depth: u32,
		_format: u32, _ty: u32, _data: &[u8])
	{
		self.calls.push(Call::TexSubImage { target, level });
	}

	fn copy_tex_sub_image_2d(&mut self, target: u32, level: u32, _dst_x: u32, _dst_y: u32,
		_src_x: u32, _src_y: u32, _width: u32, _height: u32)
	{
		self.calls.push(Call::CopyTexSubImage { target, level, layer: None });
	}

	fn copy_tex_sub_image_3d(&mut self, target: u32, level: u32, _dst_x: u32, _dst_y: u32, dst_z: u32,
		_src_x: u32, _src_y: u32, _width: u32, _height: u32)
	{
		self.calls.push(Call::CopyTexSubImage { target, level, layer: Some(dst_z) });
	}

	fn tex_parameter_i(&mut self, target: u32, pname: u32, value: i32) {
		self.calls.push(Call::TexParameter { target, pname, value });
	}

	fn tex_parameter_f(&mut self, target: u32, pname: u32, value: f32) {
		self.calls.push(Call::TexParameter { target, pname, value: value as i32 });
	}

	fn generate_mipmap(&mut self, target: u32) {
		self.calls.push(Call::GenerateMipmap(target));
	}

	fn pixel_store_i(&mut self, _pname: u32, _value: i32) {
		self.calls.push(Call::Other("pixel_store_i"));
	}

	fn create_sampler(&mut self) -> u32 { self.create("sampler") }
	fn delete_sampler(&mut self, name: u32) { self.delete("sampler", name) }

	fn sampler_parameter_i(&mut self, name: u32, pname: u32, _value: i32) {
		self.calls.push(Call::SamplerParameter { name, pname });
	}

	fn sampler_parameter_f(&mut self, name: u32, pname: u32, _value: f32) {
		self.calls.push(Call::SamplerParameter { name, pname });
	}

	fn bind_sampler(&mut self, unit: u32, name: u32) {
		self.calls.push(Call::BindSampler { unit, name });
	}

	fn create_renderbuffer(&mut self) -> u32 { self.create("renderbuffer") }
	fn delete_renderbuffer(&mut self, name: u32) { self.delete("renderbuffer", name) }

	fn renderbuffer_storage(&mut self, name: u32, samples: u32, _internal_format: u32, width: u32, height: u32) {
		self.calls.push(Call::RenderbufferStorage { name, samples, width, height });
	}

	fn create_framebuffer(&mut self) -> u32 { self.create("framebuffer") }
	fn delete_framebuffer(&mut self, name: u32) { self.delete("framebuffer", name) }

	fn bind_framebuffer(&mut self, target: u32, name: u32) {
		self.calls.push(Call::BindFramebuffer { target, name });
	}

	fn framebuffer_texture_2d(&mut self, _target: u32, attachment: u32, _texture_target: u32, texture: u32, _level: u32) {
		self.calls.push(Call::FramebufferTexture { attachment, texture, layer: None });
	}

	fn framebuffer_texture_layer(&mut self, _target: u32, attachment: u32, texture: u32, _level: u32, layer: u32) {
		self.calls.push(Call::FramebufferTexture { attachment, texture, layer: Some(layer) });
	}

	fn framebuffer_renderbuffer(&mut self, _target: u32, attachment: u32, renderbuffer: u32) {
		self.calls.push(Call::FramebufferRenderbuffer { attachment, renderbuffer });
	}

	fn check_framebuffer_status(&mut self, _target: u32) -> u32 {
		self.framebuffer_status
	}

	fn draw_buffers(&mut self, buffers: &[u32]) {
		self.calls.push(Call::DrawBuffers(buffers.to_vec()));
	}

	fn read_buffer(&mut self, buffer: u32) {
		self.calls.push(Call::ReadBuffer(buffer));
	}

	fn blit_framebuffer(&mut self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32) {
		self.calls.push(Call::BlitFramebuffer { src, dst, mask, filter });
	}

	fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32, format: u32, ty: u32, dest: &mut [u8]) {
		if self.number_rows {
			let row_len = dest.len() / height.max(1) as usize;
			for (row, bytes) in dest.chunks_mut(row_len.max(1)).enumerate() {
				bytes.fill(row as u8);
			}
		} else {
			dest.fill(self.pixel_fill);
		}

		self.calls.push(Call::ReadPixels { x, y, width, height, format, ty });
	}

	fn create_shader(&mut self, _stage: u32) -> u32 { self.create("shader") }
	fn delete_shader(&mut self, name: u32) { self.delete("shader", name) }

	fn compile_shader(&mut self, name: u32, source: &str) -> Result<(), String> {
		self.calls.push(Call::CompileShader(name));
		self.shader_sources.insert(name, source.to_owned());

		match source.contains("#error") {
			true => Err("0:1: '#error' : compilation terminated".into()),
			false => Ok(()),
		}
	}

	fn create_program(&mut self) -> u32 { self.create("program") }
	fn delete_program(&mut self, name: u32) { self.delete("program", name) }

	fn attach_shader(&mut self, program: u32, shader: u32) {
		self.program_shaders.entry(program).or_default().push(shader);
	}

	fn transform_feedback_varyings(&mut self, program: u32, varyings: &[String], _buffer_mode: u32) {
		self.calls.push(Call::TransformFeedbackVaryings { program, varyings: varyings.to_vec() });
	}

	fn link_program(&mut self, program: u32) -> Result<(), String> {
		self.calls.push(Call::LinkProgram(program));

		let sources: Vec<&String> = self.program_shaders.get(&program)
			.into_iter()
			.flatten()
			.filter_map(|shader| self.shader_sources.get(shader))
			.collect();

		if sources.iter().any(|source| source.contains("LINK_FAIL")) {
			return Err("error: varying mismatch".into())
		}

		let layout = sources.iter()
			.find_map(|source| self.layouts.get(source.as_str()))
			.cloned()
			.unwrap_or_default();

		self.linked.insert(program, layout);
		Ok(())
	}

	fn use_program(&mut self, program: u32) {
		self.calls.push(Call::UseProgram(program));
	}

	fn active_attributes(&mut self, program: u32) -> Vec<ActiveAttribute> {
		self.linked.get(&program).map(|layout| layout.attributes.clone()).unwrap_or_default()
	}

	fn active_uniforms(&mut self, program: u32) -> Vec<ActiveUniform> {
		self.linked.get(&program).map(|layout| layout.uniforms.clone()).unwrap_or_default()
	}

	fn active_uniform_blocks(&mut self, program: u32) -> Vec<ActiveUniformBlock> {
		self.linked.get(&program).map(|layout| layout.blocks.clone()).unwrap_or_default()
	}

	fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
		let next = self.locations.len() as i32;
		Some(*self.locations.entry((program, name.to_owned())).or_insert(next))
	}

	fn uniform_block_binding(&mut self, program: u32, index: u32, binding: u32) {
		self.calls.push(Call::UniformBlockBinding { program, index, binding });
	}

	fn uniform(&mut self, location: i32, data: UniformData<'_>) {
		let values = match data {
			UniformData::Float { values, .. } | UniformData::Matrix { values, .. } => Values::Float(values.to_vec()),
			UniformData::Int { values, .. } => Values::Int(values.to_vec()),
			UniformData::Uint { values, .. } => Values::Uint(values.to_vec()),
		};

		self.calls.push(Call::Uniform { location, values });
	}

	fn create_vertex_array(&mut self) -> u32 { self.create("vertex_array") }
	fn delete_vertex_array(&mut self, name: u32) { self.delete("vertex_array", name) }

	fn bind_vertex_array(&mut self, name: u32) {
		self.calls.push(Call::BindVertexArray(name));
	}

	fn enable_vertex_attrib_array(&mut self, location: u32) {
		self.calls.push(Call::EnableAttribute(location));
	}

	fn disable_vertex_attrib_array(&mut self, location: u32) {
		self.calls.push(Call::DisableAttribute(location));
	}

	fn vertex_attrib_pointer(&mut self, location: u32, components: i32, ty: u32, _normalized: bool, stride: u32, offset: usize) {
		self.calls.push(Call::AttributePointer { location, components, ty, stride, offset });
	}

	fn vertex_attrib_i_pointer(&mut self, location: u32, components: i32, ty: u32, stride: u32, offset: usize) {
		self.calls.push(Call::AttributePointer { location, components, ty, stride, offset });
	}

	fn vertex_attrib_divisor(&mut self, location: u32, divisor: u32) {
		self.calls.push(Call::AttributeDivisor { location, divisor });
	}

	fn draw_arrays(&mut self, mode: u32, first: u32, count: u32) {
		self.calls.push(Call::DrawArrays { mode, first, count });
	}

	fn draw_arrays_instanced(&mut self, mode: u32, first: u32, count: u32, instances: u32) {
		self.calls.push(Call::DrawArraysInstanced { mode, first, count, instances });
	}

	fn draw_elements(&mut self, mode: u32, count: u32, ty: u32, offset: usize) {
		self.calls.push(Call::DrawElements { mode, count, ty, offset });
	}

	fn draw_elements_instanced(&mut self, mode: u32, count: u32, ty: u32, offset: usize, instances: u32) {
		self.calls.push(Call::DrawElementsInstanced { mode, count, ty, offset, instances });
	}

	fn enable(&mut self, cap: u32) {
		self.calls.push(Call::Enable(cap));
	}

	fn disable(&mut self, cap: u32) {
		self.calls.push(Call::Disable(cap));
	}

	fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
		self.calls.push(Call::Viewport([x, y, width as i32, height as i32]));
	}

	fn scissor(&mut self, x: i32, y: i32, width: u32, height: u32) {
		self.calls.push(Call::Scissor([x, y, width as i32, height as i32]));
	}

	fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
		self.calls.push(Call::ColorMask([r, g, b, a]));
	}

	fn depth_mask(&mut self, write: bool) {
		self.calls.push(Call::DepthMask(write));
	}

	fn depth_func(&mut self, func: u32) {
		self.calls.push(Call::DepthFunc(func));
	}

	fn polygon_offset(&mut self, _factor: f32, _units: f32) {
		self.calls.push(Call::Other("polygon_offset"));
	}

	fn stencil_func_separate(&mut self, _face: u32, _func: u32, _reference: i32, _mask: u32) {
		self.calls.push(Call::Other("stencil_func_separate"));
	}

	fn stencil_op_separate(&mut self, _face: u32, _fail: u32, _depth_fail: u32, _pass: u32) {
		self.calls.push(Call::Other("stencil_op_separate"));
	}

	fn stencil_mask_separate(&mut self, _face: u32, _mask: u32) {
		self.calls.push(Call::Other("stencil_mask_separate"));
	}

	fn cull_face(&mut self, _mode: u32) {
		self.calls.push(Call::Other("cull_face"));
	}

	fn front_face(&mut self, _mode: u32) {
		self.calls.push(Call::Other("front_face"));
	}

	fn blend_equation_separate(&mut self, rgb: u32, alpha: u32) {
		self.calls.push(Call::BlendEquation { rgb, alpha });
	}

	fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
		self.calls.push(Call::BlendFunc([src_rgb, dst_rgb, src_alpha, dst_alpha]));
	}

	fn blend_color(&mut self, _color: [f32; 4]) {
		self.calls.push(Call::Other("blend_color"));
	}

	fn clear_color(&mut self, color: [f32; 4]) {
		self.calls.push(Call::ClearColor(color));
	}

	fn clear_depth(&mut self, _depth: f32) {
		self.calls.push(Call::Other("clear_depth"));
	}

	fn clear_stencil(&mut self, _stencil: i32) {
		self.calls.push(Call::Other("clear_stencil"));
	}

	fn clear(&mut self, mask: u32) {
		self.calls.push(Call::Clear(mask));
	}

	fn clear_buffer_fv(&mut self, buffer: u32, draw_buffer: u32, _values: [f32; 4]) {
		self.calls.push(Call::ClearBuffer { buffer, draw_buffer });
	}

	fn clear_buffer_iv(&mut self, buffer: u32, draw_buffer: u32, _values: [i32; 4]) {
		self.calls.push(Call::ClearBuffer { buffer, draw_buffer });
	}

	fn clear_buffer_uiv(&mut self, buffer: u32, draw_buffer: u32, _values: [u32; 4]) {
		self.calls.push(Call::ClearBuffer { buffer, draw_buffer });
	}

	fn clear_buffer_fi(&mut self, buffer: u32, draw_buffer: u32, _depth: f32, _stencil: i32) {
		self.calls.push(Call::ClearBuffer { buffer, draw_buffer });
	}

	fn create_query(&mut self) -> u32 { self.create("query") }
	fn delete_query(&mut self, name: u32) { self.delete("query", name) }

	fn begin_query(&mut self, _target: u32, name: u32) {
		self.active_query = Some(name);
		self.calls.push(Call::BeginQuery(name));
	}

	fn end_query(&mut self, _target: u32) {
		if let Some(name) = self.active_query.take() {
			let passed = self.query_script.pop_front().unwrap_or(true);
			self.query_results.insert(name, passed);
		}

		self.calls.push(Call::EndQuery);
	}

	fn query_result_available(&mut self, name: u32) -> bool {
		!self.hold_queries && self.query_results.contains_key(&name)
	}

	fn query_result(&mut self, name: u32) -> u32 {
		self.query_results.get(&name).map_or(0, |&passed| passed as u32)
	}

	fn create_transform_feedback(&mut self) -> u32 { self.create("transform_feedback") }
	fn delete_transform_feedback(&mut self, name: u32) { self.delete("transform_feedback", name) }

	fn bind_transform_feedback(&mut self, name: u32) {
		self.calls.push(Call::BindTransformFeedback(name));
	}

	fn begin_transform_feedback(&mut self, primitive_mode: u32) {
		self.calls.push(Call::BeginTransformFeedback(primitive_mode));
	}

	fn end_transform_feedback(&mut self) {
		self.calls.push(Call::EndTransformFeedback);
	}
}
