use super::{Device, ActiveAttribute, ActiveUniform, ActiveUniformBlock, UniformData};
use crate::caps::{Capabilities, Tier};

use gl::types::GLchar;
use std::ffi::{CStr, CString, c_void};


/// [`Device`] backed by the current GL context on this thread.
///
/// The context must already exist and be current. Creating and presenting it is the caller's job.
#[derive(Debug)]
pub struct GlDevice {
	caps: Capabilities,
}

impl GlDevice {
	pub fn load_with<F>(loader: F) -> anyhow::Result<GlDevice>
		where F: FnMut(&'static str) -> *const c_void
	{
		gl::load_with(loader);

		anyhow::ensure!(gl::GetString::is_loaded(), "Failed to load GL entry points");

		let caps = unsafe { detect_capabilities()? };
		log::info!("GL device is {:?} tier: {caps:?}", caps.tier);

		Ok(GlDevice { caps })
	}

	fn is_extended(&self) -> bool {
		self.caps.tier == Tier::Extended
	}
}


unsafe fn get_string(name: u32) -> Option<String> {
	let ptr = gl::GetString(name);
	if ptr.is_null() {
		return None
	}

	Some(CStr::from_ptr(ptr as *const _).to_string_lossy().into_owned())
}

unsafe fn get_integer(pname: u32) -> i32 {
	let mut value = 0;
	gl::GetIntegerv(pname, &mut value);
	value
}

unsafe fn detect_capabilities() -> anyhow::Result<Capabilities> {
	let version = get_string(gl::VERSION)
		.ok_or_else(|| anyhow::anyhow!("GL_VERSION unavailable, is a context current?"))?;

	// "OpenGL ES 3.0 ..." or "OpenGL ES 2.0 ..."
	let major = version.trim_start_matches("OpenGL ES ")
		.split('.')
		.next()
		.and_then(|s| s.trim().parse::<u32>().ok())
		.unwrap_or(2);

	let extensions: Vec<String> = if major >= 3 {
		let count = get_integer(gl::NUM_EXTENSIONS);
		(0..count.max(0) as u32)
			.filter_map(|index| {
				let ptr = gl::GetStringi(gl::EXTENSIONS, index);
				(!ptr.is_null()).then(|| CStr::from_ptr(ptr as *const _).to_string_lossy().into_owned())
			})
			.collect()
	} else {
		get_string(gl::EXTENSIONS)
			.map(|s| s.split_whitespace().map(String::from).collect())
			.unwrap_or_default()
	};

	let has = |name: &str| extensions.iter().any(|ext| ext == name);

	let mut caps = if major >= 3 {
		let mut caps = Capabilities::extended();
		caps.max_draw_buffers = get_integer(gl::MAX_DRAW_BUFFERS).max(1) as u32;
		caps.max_samples = get_integer(gl::MAX_SAMPLES).max(1) as u32;
		caps
	} else {
		let mut caps = Capabilities::baseline();
		caps.instanced_arrays = has("GL_EXT_instanced_arrays") && gl::DrawArraysInstancedEXT::is_loaded();
		caps.vertex_array_objects = has("GL_OES_vertex_array_object") && gl::GenVertexArraysOES::is_loaded();
		caps.occlusion_query = has("GL_EXT_occlusion_query_boolean") && gl::GenQueriesEXT::is_loaded();
		caps.draw_buffers = has("GL_EXT_draw_buffers") && gl::DrawBuffersEXT::is_loaded();
		caps.element_index_uint = has("GL_OES_element_index_uint");

		if caps.draw_buffers {
			caps.max_draw_buffers = get_integer(gl::MAX_DRAW_BUFFERS_EXT).max(1) as u32;
		}

		caps
	};

	caps.max_texture_units = get_integer(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS).max(1) as u32;

	Ok(caps)
}


unsafe fn gen_name(f: unsafe fn(i32, *mut u32)) -> u32 {
	let mut name = 0;
	f(1, &mut name);
	name
}

unsafe fn delete_name(f: unsafe fn(i32, *const u32), name: u32) {
	f(1, &name);
}

fn data_ptr(data: Option<&[u8]>) -> *const c_void {
	data.map_or(std::ptr::null(), |d| d.as_ptr() as *const c_void)
}

fn gl_bool(value: bool) -> u8 {
	if value { gl::TRUE } else { gl::FALSE }
}

unsafe fn read_info_log(len: i32, f: impl FnOnce(i32, *mut i32, *mut GLchar)) -> String {
	let mut buf = vec![0u8; len.max(1) as usize];
	let mut written = 0;
	f(buf.len() as i32, &mut written, buf.as_mut_ptr() as *mut GLchar);
	buf.truncate(written.max(0) as usize);
	String::from_utf8_lossy(&buf).into_owned()
}

fn c_string(s: &str) -> CString {
	// Interior nuls can't be represented, and no valid GLSL identifier contains one.
	CString::new(s.replace('\0', "")).unwrap_or_default()
}


impl Device for GlDevice {
	fn capabilities(&self) -> Capabilities {
		self.caps.clone()
	}

	fn create_buffer(&mut self) -> u32 {
		unsafe { gen_name(gl::GenBuffers) }
	}

	fn delete_buffer(&mut self, name: u32) {
		unsafe { delete_name(gl::DeleteBuffers, name) }
	}

	fn bind_buffer(&mut self, target: u32, name: u32) {
		unsafe { gl::BindBuffer(target, name) }
	}

	fn buffer_data(&mut self, target: u32, data: &[u8], usage: u32) {
		unsafe {
			gl::BufferData(target, data.len() as isize, data.as_ptr() as *const _, usage);
		}
	}

	fn buffer_sub_data(&mut self, target: u32, offset: usize, data: &[u8]) {
		unsafe {
			gl::BufferSubData(target, offset as isize, data.len() as isize, data.as_ptr() as *const _);
		}
	}

	fn bind_buffer_base(&mut self, target: u32, index: u32, name: u32) {
		unsafe { gl::BindBufferBase(target, index, name) }
	}

	fn bind_buffer_range(&mut self, target: u32, index: u32, name: u32, offset: usize, size: usize) {
		unsafe { gl::BindBufferRange(target, index, name, offset as isize, size as isize) }
	}

	fn copy_buffer_sub_data(&mut self, read_target: u32, write_target: u32, read_offset: usize, write_offset: usize, size: usize) {
		unsafe {
			gl::CopyBufferSubData(read_target, write_target, read_offset as isize, write_offset as isize, size as isize);
		}
	}

	fn create_texture(&mut self) -> u32 {
		unsafe { gen_name(gl::GenTextures) }
	}

	fn delete_texture(&mut self, name: u32) {
		unsafe { delete_name(gl::DeleteTextures, name) }
	}

	fn active_texture(&mut self, texture: u32) {
		unsafe { gl::ActiveTexture(texture) }
	}

	fn bind_texture(&mut self, target: u32, name: u32) {
		unsafe { gl::BindTexture(target, name) }
	}

	fn tex_image_2d(&mut self, target: u32, level: u32, internal_format: u32, width: u32, height: u32,
		format: u32, ty: u32, data: Option<&[u8]>)
	{
		unsafe {
			gl::TexImage2D(target, level as i32, internal_format as i32, width as i32, height as i32, 0,
				format, ty, data_ptr(data));
		}
	}

	fn tex_image_3d(&mut self, target: u32, level: u32, internal_format: u32, width: u32, height: u32, depth: u32,
		format: u32, ty: u32, data: Option<&[u8]>)
	{
		unsafe {
			gl::TexImage3D(target, level as i32, internal_format as i32, width as i32, height as i32, depth as i32, 0,
				format, ty, data_ptr(data));
		}
	}

	fn tex_sub_image_2d(&mut self, target: u32, level: u32, x: u32, y: u32, width: u32, height: u32,
		format: u32, ty: u32, data: &[u8])
	{
		unsafe {
			gl::TexSubImage2D(target, level as i32, x as i32, y as i32, width as i32, height as i32,
				format, ty, data.as_ptr() as *const _);
		}
	}

	fn tex_sub_image_3d(&mut self, target: u32, level: u32, x: u32, y: u32, z: u32, width: u32, height: u32, depth: u32,
		format: u32, ty: u32, data: &[u8])
	{
		unsafe {
			gl::TexSubImage3D(target, level as i32, x as i32, y as i32, z as i32, width as i32, height as i32, depth as i32,
				format, ty, data.as_ptr() as *const _);
		}
	}

	fn copy_tex_sub_image_2d(&mut self, target: u32, level: u32, dst_x: u32, dst_y: u32,
		src_x: u32, src_y: u32, width: u32, height: u32)
	{
		unsafe {
			gl::CopyTexSubImage2D(target, level as i32, dst_x as i32, dst_y as i32,
				src_x as i32, src_y as i32, width as i32, height as i32);
		}
	}

	fn copy_tex_sub_image_3d(&mut self, target: u32, level: u32, dst_x: u32, dst_y: u32, dst_z: u32,
		src_x: u32, src_y: u32, width: u32, height: u32)
	{
		unsafe {
			gl::CopyTexSubImage3D(target, level as i32, dst_x as i32, dst_y as i32, dst_z as i32,
				src_x as i32, src_y as i32, width as i32, height as i32);
		}
	}

	fn tex_parameter_i(&mut self, target: u32, pname: u32, value: i32) {
		unsafe { gl::TexParameteri(target, pname, value) }
	}

	fn tex_parameter_f(&mut self, target: u32, pname: u32, value: f32) {
		unsafe { gl::TexParameterf(target, pname, value) }
	}

	fn generate_mipmap(&mut self, target: u32) {
		unsafe { gl::GenerateMipmap(target) }
	}

	fn pixel_store_i(&mut self, pname: u32, value: i32) {
		unsafe { gl::PixelStorei(pname, value) }
	}

	fn create_sampler(&mut self) -> u32 {
		unsafe { gen_name(gl::GenSamplers) }
	}

	fn delete_sampler(&mut self, name: u32) {
		unsafe { delete_name(gl::DeleteSamplers, name) }
	}

	fn sampler_parameter_i(&mut self, name: u32, pname: u32, value: i32) {
		unsafe { gl::SamplerParameteri(name, pname, value) }
	}

	fn sampler_parameter_f(&mut self, name: u32, pname: u32, value: f32) {
		unsafe { gl::SamplerParameterf(name, pname, value) }
	}

	fn bind_sampler(&mut self, unit: u32, name: u32) {
		unsafe { gl::BindSampler(unit, name) }
	}

	fn create_renderbuffer(&mut self) -> u32 {
		unsafe { gen_name(gl::GenRenderbuffers) }
	}

	fn delete_renderbuffer(&mut self, name: u32) {
		unsafe { delete_name(gl::DeleteRenderbuffers, name) }
	}

	fn renderbuffer_storage(&mut self, name: u32, samples: u32, internal_format: u32, width: u32, height: u32) {
		unsafe {
			gl::BindRenderbuffer(gl::RENDERBUFFER, name);

			if samples > 0 && self.is_extended() {
				gl::RenderbufferStorageMultisample(gl::RENDERBUFFER, samples as i32, internal_format, width as i32, height as i32);
			} else {
				gl::RenderbufferStorage(gl::RENDERBUFFER, internal_format, width as i32, height as i32);
			}

			gl::BindRenderbuffer(gl::RENDERBUFFER, 0);
		}
	}

	fn create_framebuffer(&mut self) -> u32 {
		unsafe { gen_name(gl::GenFramebuffers) }
	}

	fn delete_framebuffer(&mut self, name: u32) {
		unsafe { delete_name(gl::DeleteFramebuffers, name) }
	}

	fn bind_framebuffer(&mut self, target: u32, name: u32) {
		unsafe { gl::BindFramebuffer(target, name) }
	}

	fn framebuffer_texture_2d(&mut self, target: u32, attachment: u32, texture_target: u32, texture: u32, level: u32) {
		unsafe { gl::FramebufferTexture2D(target, attachment, texture_target, texture, level as i32) }
	}

	fn framebuffer_texture_layer(&mut self, target: u32, attachment: u32, texture: u32, level: u32, layer: u32) {
		unsafe { gl::FramebufferTextureLayer(target, attachment, texture, level as i32, layer as i32) }
	}

	fn framebuffer_renderbuffer(&mut self, target: u32, attachment: u32, renderbuffer: u32) {
		unsafe { gl::FramebufferRenderbuffer(target, attachment, gl::RENDERBUFFER, renderbuffer) }
	}

	fn check_framebuffer_status(&mut self, target: u32) -> u32 {
		unsafe { gl::CheckFramebufferStatus(target) }
	}

	fn draw_buffers(&mut self, buffers: &[u32]) {
		unsafe {
			if self.is_extended() {
				gl::DrawBuffers(buffers.len() as i32, buffers.as_ptr());
			} else if self.caps.draw_buffers {
				gl::DrawBuffersEXT(buffers.len() as i32, buffers.as_ptr());
			}
		}
	}

	fn read_buffer(&mut self, buffer: u32) {
		if self.is_extended() {
			unsafe { gl::ReadBuffer(buffer) }
		}
	}

	fn blit_framebuffer(&mut self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32) {
		unsafe {
			gl::BlitFramebuffer(src[0], src[1], src[2], src[3], dst[0], dst[1], dst[2], dst[3], mask, filter);
		}
	}

	fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32, format: u32, ty: u32, dest: &mut [u8]) {
		unsafe {
			gl::ReadPixels(x, y, width as i32, height as i32, format, ty, dest.as_mut_ptr() as *mut _);
		}
	}

	fn create_shader(&mut self, stage: u32) -> u32 {
		unsafe { gl::CreateShader(stage) }
	}

	fn delete_shader(&mut self, name: u32) {
		unsafe { gl::DeleteShader(name) }
	}

	fn compile_shader(&mut self, name: u32, source: &str) -> Result<(), String> {
		let src_cstring = c_string(source);

		unsafe {
			let source_strings = [src_cstring.as_ptr()];
			gl::ShaderSource(name, 1, source_strings.as_ptr(), std::ptr::null());
			gl::CompileShader(name);

			let mut status = 0;
			gl::GetShaderiv(name, gl::COMPILE_STATUS, &mut status);
			if status != 0 {
				return Ok(())
			}

			let mut len = 0;
			gl::GetShaderiv(name, gl::INFO_LOG_LENGTH, &mut len);
			Err(read_info_log(len, |size, written, buf| gl::GetShaderInfoLog(name, size, written, buf)))
		}
	}

	fn create_program(&mut self) -> u32 {
		unsafe { gl::CreateProgram() }
	}

	fn delete_program(&mut self, name: u32) {
		unsafe { gl::DeleteProgram(name) }
	}

	fn attach_shader(&mut self, program: u32, shader: u32) {
		unsafe { gl::AttachShader(program, shader) }
	}

	fn transform_feedback_varyings(&mut self, program: u32, varyings: &[String], buffer_mode: u32) {
		let strings: Vec<CString> = varyings.iter().map(|s| c_string(s)).collect();
		let ptrs: Vec<*const GLchar> = strings.iter().map(|s| s.as_ptr()).collect();

		unsafe {
			gl::TransformFeedbackVaryings(program, ptrs.len() as i32, ptrs.as_ptr(), buffer_mode);
		}
	}

	fn link_program(&mut self, program: u32) -> Result<(), String> {
		unsafe {
			gl::LinkProgram(program);

			let mut status = 0;
			gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
			if status != 0 {
				return Ok(())
			}

			let mut len = 0;
			gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
			Err(read_info_log(len, |size, written, buf| gl::GetProgramInfoLog(program, size, written, buf)))
		}
	}

	fn use_program(&mut self, program: u32) {
		unsafe { gl::UseProgram(program) }
	}

	fn active_attributes(&mut self, program: u32) -> Vec<ActiveAttribute> {
		unsafe {
			let mut count = 0;
			let mut max_len = 0;
			gl::GetProgramiv(program, gl::ACTIVE_ATTRIBUTES, &mut count);
			gl::GetProgramiv(program, gl::ACTIVE_ATTRIBUTE_MAX_LENGTH, &mut max_len);

			(0..count.max(0) as u32)
				.map(|index| {
					let mut size = 0;
					let mut ty = 0;
					let name = read_info_log(max_len, |buf_size, written, buf| {
						gl::GetActiveAttrib(program, index, buf_size, written, &mut size, &mut ty, buf)
					});

					let name_cstring = c_string(&name);
					let location = gl::GetAttribLocation(program, name_cstring.as_ptr());

					ActiveAttribute { name, size, ty, location }
				})
				.collect()
		}
	}

	fn active_uniforms(&mut self, program: u32) -> Vec<ActiveUniform> {
		unsafe {
			let mut count = 0;
			let mut max_len = 0;
			gl::GetProgramiv(program, gl::ACTIVE_UNIFORMS, &mut count);
			gl::GetProgramiv(program, gl::ACTIVE_UNIFORM_MAX_LENGTH, &mut max_len);

			let count = count.max(0) as u32;
			let mut block_indices = vec![-1; count as usize];

			if self.is_extended() && count > 0 {
				let indices: Vec<u32> = (0..count).collect();
				gl::GetActiveUniformsiv(program, count as i32, indices.as_ptr(), gl::UNIFORM_BLOCK_INDEX,
					block_indices.as_mut_ptr());
			}

			(0..count)
				.map(|index| {
					let mut size = 0;
					let mut ty = 0;
					let name = read_info_log(max_len, |buf_size, written, buf| {
						gl::GetActiveUniform(program, index, buf_size, written, &mut size, &mut ty, buf)
					});

					let block_index = block_indices[index as usize];

					ActiveUniform {
						name,
						size,
						ty,
						block_index: (block_index >= 0).then_some(block_index as u32),
					}
				})
				.collect()
		}
	}

	fn active_uniform_blocks(&mut self, program: u32) -> Vec<ActiveUniformBlock> {
		if !self.is_extended() {
			return Vec::new()
		}

		unsafe {
			let mut count = 0;
			gl::GetProgramiv(program, gl::ACTIVE_UNIFORM_BLOCKS, &mut count);

			(0..count.max(0) as u32)
				.map(|index| {
					let mut name_len = 0;
					let mut data_size = 0;
					gl::GetActiveUniformBlockiv(program, index, gl::UNIFORM_BLOCK_NAME_LENGTH, &mut name_len);
					gl::GetActiveUniformBlockiv(program, index, gl::UNIFORM_BLOCK_DATA_SIZE, &mut data_size);

					let name = read_info_log(name_len, |buf_size, written, buf| {
						gl::GetActiveUniformBlockName(program, index, buf_size, written, buf)
					});

					ActiveUniformBlock { name, data_size: data_size.max(0) as usize }
				})
				.collect()
		}
	}

	fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
		let name_cstring = c_string(name);
		let location = unsafe { gl::GetUniformLocation(program, name_cstring.as_ptr()) };
		(location >= 0).then_some(location)
	}

	fn uniform_block_binding(&mut self, program: u32, block_index: u32, binding: u32) {
		unsafe { gl::UniformBlockBinding(program, block_index, binding) }
	}

	fn uniform(&mut self, location: i32, data: UniformData<'_>) {
		unsafe {
			match data {
				UniformData::Float { components, values } => {
					let count = values.len() as i32 / components.max(1) as i32;
					let ptr = values.as_ptr();
					match components {
						1 => gl::Uniform1fv(location, count, ptr),
						2 => gl::Uniform2fv(location, count, ptr),
						3 => gl::Uniform3fv(location, count, ptr),
						_ => gl::Uniform4fv(location, count, ptr),
					}
				}

				UniformData::Int { components, values } => {
					let count = values.len() as i32 / components.max(1) as i32;
					let ptr = values.as_ptr();
					match components {
						1 => gl::Uniform1iv(location, count, ptr),
						2 => gl::Uniform2iv(location, count, ptr),
						3 => gl::Uniform3iv(location, count, ptr),
						_ => gl::Uniform4iv(location, count, ptr),
					}
				}

				UniformData::Uint { components, values } => {
					let count = values.len() as i32 / components.max(1) as i32;
					let ptr = values.as_ptr();
					match components {
						1 => gl::Uniform1uiv(location, count, ptr),
						2 => gl::Uniform2uiv(location, count, ptr),
						3 => gl::Uniform3uiv(location, count, ptr),
						_ => gl::Uniform4uiv(location, count, ptr),
					}
				}

				UniformData::Matrix { columns, rows, values } => {
					let count = values.len() as i32 / (columns as i32 * rows as i32).max(1);
					let ptr = values.as_ptr();
					match (columns, rows) {
						(2, 2) => gl::UniformMatrix2fv(location, count, gl::FALSE, ptr),
						(3, 3) => gl::UniformMatrix3fv(location, count, gl::FALSE, ptr),
						(2, 3) => gl::UniformMatrix2x3fv(location, count, gl::FALSE, ptr),
						(3, 2) => gl::UniformMatrix3x2fv(location, count, gl::FALSE, ptr),
						(2, 4) => gl::UniformMatrix2x4fv(location, count, gl::FALSE, ptr),
						(4, 2) => gl::UniformMatrix4x2fv(location, count, gl::FALSE, ptr),
						(3, 4) => gl::UniformMatrix3x4fv(location, count, gl::FALSE, ptr),
						(4, 3) => gl::UniformMatrix4x3fv(location, count, gl::FALSE, ptr),
						_ => gl::UniformMatrix4fv(location, count, gl::FALSE, ptr),
					}
				}
			}
		}
	}

	fn create_vertex_array(&mut self) -> u32 {
		unsafe {
			if self.is_extended() {
				gen_name(gl::GenVertexArrays)
			} else {
				gen_name(gl::GenVertexArraysOES)
			}
		}
	}

	fn delete_vertex_array(&mut self, name: u32) {
		unsafe {
			if self.is_extended() {
				delete_name(gl::DeleteVertexArrays, name)
			} else {
				delete_name(gl::DeleteVertexArraysOES, name)
			}
		}
	}

	fn bind_vertex_array(&mut self, name: u32) {
		unsafe {
			if self.is_extended() {
				gl::BindVertexArray(name)
			} else if self.caps.vertex_array_objects {
				gl::BindVertexArrayOES(name)
			}
		}
	}

	fn enable_vertex_attrib_array(&mut self, location: u32) {
		unsafe { gl::EnableVertexAttribArray(location) }
	}

	fn disable_vertex_attrib_array(&mut self, location: u32) {
		unsafe { gl::DisableVertexAttribArray(location) }
	}

	fn vertex_attrib_pointer(&mut self, location: u32, components: i32, ty: u32, normalized: bool, stride: u32, offset: usize) {
		unsafe {
			gl::VertexAttribPointer(location, components, ty, gl_bool(normalized), stride as i32, offset as *const _);
		}
	}

	fn vertex_attrib_i_pointer(&mut self, location: u32, components: i32, ty: u32, stride: u32, offset: usize) {
		unsafe {
			gl::VertexAttribIPointer(location, components, ty, stride as i32, offset as *const _);
		}
	}

	fn vertex_attrib_divisor(&mut self, location: u32, divisor: u32) {
		unsafe {
			if self.is_extended() {
				gl::VertexAttribDivisor(location, divisor)
			} else if self.caps.instanced_arrays {
				gl::VertexAttribDivisorEXT(location, divisor)
			}
		}
	}

	fn draw_arrays(&mut self, mode: u32, first: u32, count: u32) {
		unsafe { gl::DrawArrays(mode, first as i32, count as i32) }
	}

	fn draw_arrays_instanced(&mut self, mode: u32, first: u32, count: u32, instances: u32) {
		unsafe {
			if self.is_extended() {
				gl::DrawArraysInstanced(mode, first as i32, count as i32, instances as i32)
			} else {
				gl::DrawArraysInstancedEXT(mode, first as i32, count as i32, instances as i32)
			}
		}
	}

	fn draw_elements(&mut self, mode: u32, count: u32, ty: u32, offset: usize) {
		unsafe { gl::DrawElements(mode, count as i32, ty, offset as *const _) }
	}

	fn draw_elements_instanced(&mut self, mode: u32, count: u32, ty: u32, offset: usize, instances: u32) {
		unsafe {
			if self.is_extended() {
				gl::DrawElementsInstanced(mode, count as i32, ty, offset as *const _, instances as i32)
			} else {
				gl::DrawElementsInstancedEXT(mode, count as i32, ty, offset as *const _, instances as i32)
			}
		}
	}

	fn enable(&mut self, cap: u32) {
		unsafe { gl::Enable(cap) }
	}

	fn disable(&mut self, cap: u32) {
		unsafe { gl::Disable(cap) }
	}

	fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
		unsafe { gl::Viewport(x, y, width as i32, height as i32) }
	}

	fn scissor(&mut self, x: i32, y: i32, width: u32, height: u32) {
		unsafe { gl::Scissor(x, y, width as i32, height as i32) }
	}

	fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
		unsafe { gl::ColorMask(gl_bool(r), gl_bool(g), gl_bool(b), gl_bool(a)) }
	}

	fn depth_mask(&mut self, write: bool) {
		unsafe { gl::DepthMask(gl_bool(write)) }
	}

	fn depth_func(&mut self, func: u32) {
		unsafe { gl::DepthFunc(func) }
	}

	fn polygon_offset(&mut self, factor: f32, units: f32) {
		unsafe { gl::PolygonOffset(factor, units) }
	}

	fn stencil_func_separate(&mut self, face: u32, func: u32, reference: i32, mask: u32) {
		unsafe { gl::StencilFuncSeparate(face, func, reference, mask) }
	}

	fn stencil_op_separate(&mut self, face: u32, fail: u32, depth_fail: u32, pass: u32) {
		unsafe { gl::StencilOpSeparate(face, fail, depth_fail, pass) }
	}

	fn stencil_mask_separate(&mut self, face: u32, mask: u32) {
		unsafe { gl::StencilMaskSeparate(face, mask) }
	}

	fn cull_face(&mut self, mode: u32) {
		unsafe { gl::CullFace(mode) }
	}

	fn front_face(&mut self, mode: u32) {
		unsafe { gl::FrontFace(mode) }
	}

	fn blend_equation_separate(&mut self, rgb: u32, alpha: u32) {
		unsafe { gl::BlendEquationSeparate(rgb, alpha) }
	}

	fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
		unsafe { gl::BlendFuncSeparate(src_rgb, dst_rgb, src_alpha, dst_alpha) }
	}

	fn blend_color(&mut self, [r, g, b, a]: [f32; 4]) {
		unsafe { gl::BlendColor(r, g, b, a) }
	}

	fn clear_color(&mut self, [r, g, b, a]: [f32; 4]) {
		unsafe { gl::ClearColor(r, g, b, a) }
	}

	fn clear_depth(&mut self, depth: f32) {
		unsafe { gl::ClearDepthf(depth) }
	}

	fn clear_stencil(&mut self, stencil: i32) {
		unsafe { gl::ClearStencil(stencil) }
	}

	fn clear(&mut self, mask: u32) {
		unsafe { gl::Clear(mask) }
	}

	fn clear_buffer_fv(&mut self, buffer: u32, draw_buffer: u32, values: [f32; 4]) {
		unsafe { gl::ClearBufferfv(buffer, draw_buffer as i32, values.as_ptr()) }
	}

	fn clear_buffer_iv(&mut self, buffer: u32, draw_buffer: u32, values: [i32; 4]) {
		unsafe { gl::ClearBufferiv(buffer, draw_buffer as i32, values.as_ptr()) }
	}

	fn clear_buffer_uiv(&mut self, buffer: u32, draw_buffer: u32, values: [u32; 4]) {
		unsafe { gl::ClearBufferuiv(buffer, draw_buffer as i32, values.as_ptr()) }
	}

	fn clear_buffer_fi(&mut self, buffer: u32, draw_buffer: u32, depth: f32, stencil: i32) {
		unsafe { gl::ClearBufferfi(buffer, draw_buffer as i32, depth, stencil) }
	}

	fn create_query(&mut self) -> u32 {
		unsafe {
			if self.is_extended() {
				gen_name(gl::GenQueries)
			} else {
				gen_name(gl::GenQueriesEXT)
			}
		}
	}

	fn delete_query(&mut self, name: u32) {
		unsafe {
			if self.is_extended() {
				delete_name(gl::DeleteQueries, name)
			} else {
				delete_name(gl::DeleteQueriesEXT, name)
			}
		}
	}

	fn begin_query(&mut self, target: u32, name: u32) {
		unsafe {
			if self.is_extended() {
				gl::BeginQuery(target, name)
			} else {
				gl::BeginQueryEXT(target, name)
			}
		}
	}

	fn end_query(&mut self, target: u32) {
		unsafe {
			if self.is_extended() {
				gl::EndQuery(target)
			} else {
				gl::EndQueryEXT(target)
			}
		}
	}

	fn query_result_available(&mut self, name: u32) -> bool {
		let mut available = 0;
		unsafe {
			if self.is_extended() {
				gl::GetQueryObjectuiv(name, gl::QUERY_RESULT_AVAILABLE, &mut available)
			} else {
				gl::GetQueryObjectuivEXT(name, gl::QUERY_RESULT_AVAILABLE_EXT, &mut available)
			}
		}
		available != 0
	}

	fn query_result(&mut self, name: u32) -> u32 {
		let mut result = 0;
		unsafe {
			if self.is_extended() {
				gl::GetQueryObjectuiv(name, gl::QUERY_RESULT, &mut result)
			} else {
				gl::GetQueryObjectuivEXT(name, gl::QUERY_RESULT_EXT, &mut result)
			}
		}
		result
	}

	fn create_transform_feedback(&mut self) -> u32 {
		unsafe { gen_name(gl::GenTransformFeedbacks) }
	}

	fn delete_transform_feedback(&mut self, name: u32) {
		unsafe { delete_name(gl::DeleteTransformFeedbacks, name) }
	}

	fn bind_transform_feedback(&mut self, name: u32) {
		unsafe { gl::BindTransformFeedback(gl::TRANSFORM_FEEDBACK, name) }
	}

	fn begin_transform_feedback(&mut self, primitive_mode: u32) {
		unsafe { gl::BeginTransformFeedback(primitive_mode) }
	}

	fn end_transform_feedback(&mut self) {
		unsafe { gl::EndTransformFeedback() }
	}
}
