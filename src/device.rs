//! The handle-based graphics API the engine drives.
//!
//! Object names are plain `u32`s and every enum-like argument is a GL token, exactly as the
//! underlying API sees them. The trait exists so that the engine can be driven by something
//! other than a live GL context, e.g. a recording device in tests.

pub mod gl_device;

pub use self::gl_device::GlDevice;

use crate::caps::Capabilities;


#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActiveAttribute {
	pub name: String,
	pub size: i32,
	pub ty: u32,
	/// Negative for built-ins like `gl_VertexID`.
	pub location: i32,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActiveUniform {
	pub name: String,
	pub size: i32,
	pub ty: u32,
	pub block_index: Option<u32>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActiveUniformBlock {
	pub name: String,
	pub data_size: usize,
}


/// Data for a single uniform location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformData<'a> {
	Float { components: u8, values: &'a [f32] },
	Int { components: u8, values: &'a [i32] },
	Uint { components: u8, values: &'a [u32] },
	Matrix { columns: u8, rows: u8, values: &'a [f32] },
}


pub trait Device {
	fn capabilities(&self) -> Capabilities;

	// Buffers
	fn create_buffer(&mut self) -> u32;
	fn delete_buffer(&mut self, name: u32);
	fn bind_buffer(&mut self, target: u32, name: u32);
	fn buffer_data(&mut self, target: u32, data: &[u8], usage: u32);
	fn buffer_sub_data(&mut self, target: u32, offset: usize, data: &[u8]);
	fn bind_buffer_base(&mut self, target: u32, index: u32, name: u32);
	fn bind_buffer_range(&mut self, target: u32, index: u32, name: u32, offset: usize, size: usize);
	fn copy_buffer_sub_data(&mut self, read_target: u32, write_target: u32, read_offset: usize, write_offset: usize, size: usize);

	// Textures
	fn create_texture(&mut self) -> u32;
	fn delete_texture(&mut self, name: u32);
	/// `texture` is the unit enum itself, `gl::TEXTURE0 + index`.
	fn active_texture(&mut self, texture: u32);
	fn bind_texture(&mut self, target: u32, name: u32);
	fn tex_image_2d(&mut self, target: u32, level: u32, internal_format: u32, width: u32, height: u32,
		format: u32, ty: u32, data: Option<&[u8]>);
	fn tex_image_3d(&mut self, target: u32, level: u32, internal_format: u32, width: u32, height: u32, depth: u32,
		format: u32, ty: u32, data: Option<&[u8]>);
	fn tex_sub_image_2d(&mut self, target: u32, level: u32, x: u32, y: u32, width: u32, height: u32,
		format: u32, ty: u32, data: &[u8]);
	fn tex_sub_image_3d(&mut self, target: u32, level: u32, x: u32, y: u32, z: u32, width: u32, height: u32, depth: u32,
		format: u32, ty: u32, data: &[u8]);
	/// Copies from the bound read framebuffer into the bound texture.
	fn copy_tex_sub_image_2d(&mut self, target: u32, level: u32, dst_x: u32, dst_y: u32,
		src_x: u32, src_y: u32, width: u32, height: u32);
	fn copy_tex_sub_image_3d(&mut self, target: u32, level: u32, dst_x: u32, dst_y: u32, dst_z: u32,
		src_x: u32, src_y: u32, width: u32, height: u32);
	fn tex_parameter_i(&mut self, target: u32, pname: u32, value: i32);
	fn tex_parameter_f(&mut self, target: u32, pname: u32, value: f32);
	fn generate_mipmap(&mut self, target: u32);
	fn pixel_store_i(&mut self, pname: u32, value: i32);

	// Samplers
	fn create_sampler(&mut self) -> u32;
	fn delete_sampler(&mut self, name: u32);
	fn sampler_parameter_i(&mut self, name: u32, pname: u32, value: i32);
	fn sampler_parameter_f(&mut self, name: u32, pname: u32, value: f32);
	fn bind_sampler(&mut self, unit: u32, name: u32);

	// Renderbuffers
	fn create_renderbuffer(&mut self) -> u32;
	fn delete_renderbuffer(&mut self, name: u32);
	/// `samples == 0` allocates single sampled storage.
	fn renderbuffer_storage(&mut self, name: u32, samples: u32, internal_format: u32, width: u32, height: u32);

	// Framebuffers
	fn create_framebuffer(&mut self) -> u32;
	fn delete_framebuffer(&mut self, name: u32);
	fn bind_framebuffer(&mut self, target: u32, name: u32);
	fn framebuffer_texture_2d(&mut self, target: u32, attachment: u32, texture_target: u32, texture: u32, level: u32);
	fn framebuffer_texture_layer(&mut self, target: u32, attachment: u32, texture: u32, level: u32, layer: u32);
	fn framebuffer_renderbuffer(&mut self, target: u32, attachment: u32, renderbuffer: u32);
	fn check_framebuffer_status(&mut self, target: u32) -> u32;
	fn draw_buffers(&mut self, buffers: &[u32]);
	fn read_buffer(&mut self, buffer: u32);
	/// Rectangles are `[x0, y0, x1, y1]`.
	fn blit_framebuffer(&mut self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32);
	fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32, format: u32, ty: u32, dest: &mut [u8]);

	// Shaders and programs
	fn create_shader(&mut self, stage: u32) -> u32;
	fn delete_shader(&mut self, name: u32);
	/// Uploads the source and compiles it, returning the info log on failure.
	fn compile_shader(&mut self, name: u32, source: &str) -> Result<(), String>;
	fn create_program(&mut self) -> u32;
	fn delete_program(&mut self, name: u32);
	fn attach_shader(&mut self, program: u32, shader: u32);
	fn transform_feedback_varyings(&mut self, program: u32, varyings: &[String], buffer_mode: u32);
	/// Links the program, returning the info log on failure.
	fn link_program(&mut self, program: u32) -> Result<(), String>;
	fn use_program(&mut self, program: u32);
	fn active_attributes(&mut self, program: u32) -> Vec<ActiveAttribute>;
	fn active_uniforms(&mut self, program: u32) -> Vec<ActiveUniform>;
	fn active_uniform_blocks(&mut self, program: u32) -> Vec<ActiveUniformBlock>;
	fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32>;
	fn uniform_block_binding(&mut self, program: u32, block_index: u32, binding: u32);
	/// Sets a uniform of the program in use.
	fn uniform(&mut self, location: i32, data: UniformData<'_>);

	// Vertex state
	fn create_vertex_array(&mut self) -> u32;
	fn delete_vertex_array(&mut self, name: u32);
	fn bind_vertex_array(&mut self, name: u32);
	fn enable_vertex_attrib_array(&mut self, location: u32);
	fn disable_vertex_attrib_array(&mut self, location: u32);
	fn vertex_attrib_pointer(&mut self, location: u32, components: i32, ty: u32, normalized: bool, stride: u32, offset: usize);
	fn vertex_attrib_i_pointer(&mut self, location: u32, components: i32, ty: u32, stride: u32, offset: usize);
	fn vertex_attrib_divisor(&mut self, location: u32, divisor: u32);

	// Draws
	fn draw_arrays(&mut self, mode: u32, first: u32, count: u32);
	fn draw_arrays_instanced(&mut self, mode: u32, first: u32, count: u32, instances: u32);
	fn draw_elements(&mut self, mode: u32, count: u32, ty: u32, offset: usize);
	fn draw_elements_instanced(&mut self, mode: u32, count: u32, ty: u32, offset: usize, instances: u32);

	// Fixed function state
	fn enable(&mut self, cap: u32);
	fn disable(&mut self, cap: u32);
	fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
	fn scissor(&mut self, x: i32, y: i32, width: u32, height: u32);
	fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool);
	fn depth_mask(&mut self, write: bool);
	fn depth_func(&mut self, func: u32);
	fn polygon_offset(&mut self, factor: f32, units: f32);
	fn stencil_func_separate(&mut self, face: u32, func: u32, reference: i32, mask: u32);
	fn stencil_op_separate(&mut self, face: u32, fail: u32, depth_fail: u32, pass: u32);
	fn stencil_mask_separate(&mut self, face: u32, mask: u32);
	fn cull_face(&mut self, mode: u32);
	fn front_face(&mut self, mode: u32);
	fn blend_equation_separate(&mut self, rgb: u32, alpha: u32);
	fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);
	fn blend_color(&mut self, color: [f32; 4]);

	// Clears
	fn clear_color(&mut self, color: [f32; 4]);
	fn clear_depth(&mut self, depth: f32);
	fn clear_stencil(&mut self, stencil: i32);
	fn clear(&mut self, mask: u32);
	fn clear_buffer_fv(&mut self, buffer: u32, draw_buffer: u32, values: [f32; 4]);
	fn clear_buffer_iv(&mut self, buffer: u32, draw_buffer: u32, values: [i32; 4]);
	fn clear_buffer_uiv(&mut self, buffer: u32, draw_buffer: u32, values: [u32; 4]);
	fn clear_buffer_fi(&mut self, buffer: u32, draw_buffer: u32, depth: f32, stencil: i32);

	// Queries
	fn create_query(&mut self) -> u32;
	fn delete_query(&mut self, name: u32);
	fn begin_query(&mut self, target: u32, name: u32);
	fn end_query(&mut self, target: u32);
	fn query_result_available(&mut self, name: u32) -> bool;
	fn query_result(&mut self, name: u32) -> u32;

	// Transform feedback
	fn create_transform_feedback(&mut self) -> u32;
	fn delete_transform_feedback(&mut self, name: u32);
	fn bind_transform_feedback(&mut self, name: u32);
	fn begin_transform_feedback(&mut self, primitive_mode: u32);
	fn end_transform_feedback(&mut self);
}
