use super::Context;
use crate::caps::Feature;
use crate::commands::{BindingResources, BindingValue, DrawCall, DrawCmd, DrawItem, Rect, RenderPass, RenderTarget};
use crate::device::{Device, UniformData};
use crate::error::{Error, SubmitReport};
use crate::formats::{self, SampleType};
use crate::resource_manager::layout::{split_index, Scalars};
use crate::resource_manager::*;


/// The framebuffer a pass is drawing into.
#[derive(Debug, Copy, Clone)]
struct BoundTarget {
	/// `None` for the surface.
	framebuffer: Option<FramebufferHandle>,
	size: (u32, u32),
	flip_y: bool,
}

impl BoundTarget {
	fn orient(&self, rect: Rect) -> Rect {
		if self.flip_y {
			rect.flipped(self.size.1)
		} else {
			rect
		}
	}
}


#[derive(Debug, Default)]
struct ClearValues {
	/// (attachment index, sample type, value)
	colors: Vec<(u32, SampleType, [f32; 4])>,
	depth: Option<f32>,
	stencil: Option<i32>,
}

impl ClearValues {
	fn is_empty(&self) -> bool {
		self.colors.is_empty() && self.depth.is_none() && self.stencil.is_none()
	}
}


fn count_draws(items: &[DrawItem<'_>]) -> u32 {
	items.iter()
		.map(|item| match item {
			DrawItem::Draw(_) => 1,
			DrawItem::OcclusionQuery { draws, .. } => count_draws(draws),
		})
		.sum()
}

fn uniform_data(value_type: ValueType, scalars: &Scalars) -> UniformData<'_> {
	let components = value_type.component_count() as u8;

	match (value_type, scalars) {
		(ValueType::Matrix { columns, rows }, Scalars::Float(values)) => UniformData::Matrix { columns, rows, values: &values[..] },
		(_, Scalars::Float(values)) => UniformData::Float { components, values: &values[..] },
		(_, Scalars::Int(values)) => UniformData::Int { components, values: &values[..] },
		(_, Scalars::Uint(values)) => UniformData::Uint { components, values: &values[..] },
	}
}

/// `weights[2]` can be bound as element 2 of flat data bound to `weights`.
fn flat_array_element(uniform: &UniformInfo, bindings: &BindingResources) -> Option<BindingValue> {
	let UniformKind::Value(value_type) = uniform.kind else {
		return None
	};

	let (base, index) = split_index(&uniform.name)?;

	match bindings.resolve(base)? {
		BindingValue::Value(value) => value.element(index, value_type.component_count())
			.or_else(|| (index == 0).then(|| value.clone()))
			.map(BindingValue::Value),

		_ => None,
	}
}


impl<D: Device> Context<D> {
	pub(super) fn execute_render_pass(&mut self, pass: &RenderPass<'_>, report: &mut SubmitReport) {
		let target = match self.bind_target(pass.target) {
			Ok(target) => target,
			Err(error) => {
				report.push(error);
				report.draws_skipped += count_draws(&pass.draws);
				return
			}
		};

		let clear_values = self.clear_values(pass.target, &target);
		self.clear(&clear_values, target.framebuffer.is_some());

		for item in pass.draws.iter() {
			self.execute_draw_item(item, &target, false, report);
		}

		if let Some(handle) = target.framebuffer {
			if let Some(object) = self.resource_manager.framebuffer(handle) {
				if let Some(shadow) = &object.shadow {
					shadow.resolve(&mut self.device, object.name, &object.draw_buffers);
				}
			}

			self.device.bind_framebuffer(gl::FRAMEBUFFER, 0);
		}
	}

	fn bind_target(&mut self, target: RenderTarget<'_>) -> Result<BoundTarget, Error> {
		match target {
			RenderTarget::Surface(ops) => {
				self.device.bind_framebuffer(gl::FRAMEBUFFER, 0);

				Ok(BoundTarget {
					framebuffer: None,
					size: self.surface_size,
					flip_y: ops.flip_y,
				})
			}

			RenderTarget::Offscreen(def) => {
				let handle = self.resource_manager.prepare_framebuffer(&mut self.device, def)?;
				let Some(object) = self.resource_manager.framebuffer(handle) else {
					return Err(Error::malformed("render pass", "framebuffer was not created"))
				};

				self.device.bind_framebuffer(gl::FRAMEBUFFER, object.render_name());

				Ok(BoundTarget {
					framebuffer: Some(handle),
					size: object.size,
					flip_y: def.flip_y,
				})
			}
		}
	}

	fn clear_values(&self, target: RenderTarget<'_>, bound: &BoundTarget) -> ClearValues {
		let mut values = ClearValues::default();

		match target {
			RenderTarget::Surface(ops) => {
				if let LoadOp::Clear(color) = ops.color {
					values.colors.push((0, SampleType::Float, color));
				}

				if let LoadOp::Clear(depth) = ops.depth {
					values.depth = Some(depth);
				}

				if let LoadOp::Clear(stencil) = ops.stencil {
					values.stencil = Some(stencil);
				}
			}

			RenderTarget::Offscreen(def) => {
				let bound_colors = bound.framebuffer
					.and_then(|handle| self.resource_manager.framebuffer(handle))
					.map_or(0, FramebufferObject::color_count);

				for (index, attachment) in def.color_attachments.iter().take(bound_colors).enumerate() {
					if let LoadOp::Clear(color) = attachment.load_op {
						values.colors.push((index as u32, attachment.view.format().sample_type(), color));
					}
				}

				if let Some(attachment) = &def.depth_stencil_attachment {
					let format = attachment.view.format();

					if let (true, LoadOp::Clear(depth)) = (format.has_depth(), attachment.depth_load_op) {
						values.depth = Some(depth);
					}

					if let (true, LoadOp::Clear(stencil)) = (format.has_stencil(), attachment.stencil_load_op) {
						values.stencil = Some(stencil);
					}
				}
			}
		}

		values
	}

	/// Clears per attachment where the tier allows it. Otherwise every color attachment is
	/// cleared to the first clear color.
	fn clear(&mut self, values: &ClearValues, offscreen: bool) {
		if values.is_empty() {
			return
		}

		// Clears respect write masks and the scissor, both of which the last draw may have left set.
		self.device.color_mask(true, true, true, true);
		self.device.depth_mask(true);
		self.device.stencil_mask_separate(gl::FRONT_AND_BACK, !0);
		self.device.disable(gl::SCISSOR_TEST);

		if offscreen && self.resource_manager.capabilities().is_extended() {
			for &(index, sample_type, color) in values.colors.iter() {
				match sample_type {
					SampleType::Float => self.device.clear_buffer_fv(gl::COLOR, index, color),
					SampleType::Sint => self.device.clear_buffer_iv(gl::COLOR, index, color.map(|c| c as i32)),
					SampleType::Uint => self.device.clear_buffer_uiv(gl::COLOR, index, color.map(|c| c as u32)),
				}
			}

			match (values.depth, values.stencil) {
				(Some(depth), Some(stencil)) => self.device.clear_buffer_fi(gl::DEPTH_STENCIL, 0, depth, stencil),
				(Some(depth), None) => self.device.clear_buffer_fv(gl::DEPTH, 0, [depth, 0.0, 0.0, 0.0]),
				(None, Some(stencil)) => self.device.clear_buffer_iv(gl::STENCIL, 0, [stencil, 0, 0, 0]),
				(None, None) => {}
			}

			return
		}

		let mut mask = 0;

		if let Some(&(_, _, color)) = values.colors.first() {
			self.device.clear_color(color);
			mask |= gl::COLOR_BUFFER_BIT;
		}

		if let Some(depth) = values.depth {
			self.device.clear_depth(depth);
			mask |= gl::DEPTH_BUFFER_BIT;
		}

		if let Some(stencil) = values.stencil {
			self.device.clear_stencil(stencil);
			mask |= gl::STENCIL_BUFFER_BIT;
		}

		self.device.clear(mask);
	}

	fn execute_draw_item(&mut self, item: &DrawItem<'_>, target: &BoundTarget, in_query: bool, report: &mut SubmitReport) {
		match item {
			DrawItem::Draw(cmd) => {
				let result = self.execute_draw(cmd, target, report);
				self.flush_warnings(report);

				match result {
					Ok(true) => report.draws_issued += 1,
					Ok(false) => {}
					Err(error) => {
						report.push(error);
						report.draws_skipped += 1;
					}
				}
			}

			DrawItem::OcclusionQuery { .. } if in_query => {
				report.push(Error::malformed("occlusion_query", "occlusion queries can't be nested"));
				report.draws_skipped += count_draws(std::slice::from_ref(item));
			}

			DrawItem::OcclusionQuery { query, draws } => {
				// Without query support the draws still happen, the result just never arrives.
				let handle = match self.resource_manager.prepare_query(&mut self.device, query) {
					Ok(handle) => Some(handle),
					Err(error) => {
						report.push(error);
						None
					}
				};

				if let Some(handle) = handle {
					self.resource_manager.begin_query(&mut self.device, handle);
				}

				for draw in draws.iter() {
					self.execute_draw_item(draw, target, true, report);
				}

				if let Some(handle) = handle {
					self.resource_manager.end_query(&mut self.device, handle);
				}
			}
		}
	}

	/// Returns whether anything was actually drawn.
	fn execute_draw(&mut self, cmd: &DrawCmd<'_>, target: &BoundTarget, report: &mut SubmitReport) -> Result<bool, Error> {
		let program = self.resource_manager.prepare_program(&mut self.device, cmd.pipeline)?;
		let Some(object) = self.resource_manager.program(program) else {
			return Err(Error::malformed("pipeline", "program was not created"))
		};

		let program_name = object.name;
		let reflection = object.reflection.clone();

		self.device.use_program(program_name);

		self.apply_viewport(cmd, target);
		self.apply_pipeline_state(cmd.pipeline, cmd.stencil_reference, report);
		self.bind_uniforms(&reflection, cmd.bindings, report)?;

		self.resource_manager.bind_vertex_state(&mut self.device, cmd.pipeline, program, cmd.vertices, cmd.indices)?;

		self.dispatch_draw(cmd, report)
	}

	fn apply_viewport(&mut self, cmd: &DrawCmd<'_>, target: &BoundTarget) {
		let viewport = target.orient(cmd.viewport.unwrap_or_else(|| Rect::from_size(target.size)));
		self.device.viewport(viewport.x, viewport.y, viewport.width, viewport.height);

		match cmd.scissor {
			Some(scissor) => {
				let scissor = target.orient(scissor);
				self.device.enable(gl::SCISSOR_TEST);
				self.device.scissor(scissor.x, scissor.y, scissor.width, scissor.height);
			}

			None => self.device.disable(gl::SCISSOR_TEST),
		}
	}

	/// GLES has a single blend state, so the first target's applies to every attachment.
	fn apply_pipeline_state(&mut self, pipeline: &PipelineDef, stencil_reference: i32, report: &mut SubmitReport) {
		let tier = self.resource_manager.capabilities().tier;
		let device = &mut self.device;

		match formats::cull_mode(pipeline.primitive.cull_mode) {
			Some(mode) => {
				device.enable(gl::CULL_FACE);
				device.cull_face(mode);
			}

			None => device.disable(gl::CULL_FACE),
		}

		device.front_face(formats::front_face(pipeline.primitive.front_face));

		match &pipeline.depth_stencil {
			Some(state) => {
				device.enable(gl::DEPTH_TEST);
				device.depth_func(formats::compare_function(state.depth_compare));
				device.depth_mask(state.depth_write_enabled);

				if state.depth_bias != 0.0 || state.depth_bias_slope_scale != 0.0 {
					device.enable(gl::POLYGON_OFFSET_FILL);
					device.polygon_offset(state.depth_bias_slope_scale, state.depth_bias);
				} else {
					device.disable(gl::POLYGON_OFFSET_FILL);
				}

				if state.uses_stencil() {
					device.enable(gl::STENCIL_TEST);

					for (face, face_state) in [(gl::FRONT, &state.stencil_front), (gl::BACK, &state.stencil_back)] {
						device.stencil_func_separate(face, formats::compare_function(face_state.compare),
							stencil_reference, state.stencil_read_mask);

						device.stencil_op_separate(face,
							formats::stencil_operation(face_state.fail_op),
							formats::stencil_operation(face_state.depth_fail_op),
							formats::stencil_operation(face_state.pass_op));

						device.stencil_mask_separate(face, state.stencil_write_mask);
					}
				} else {
					device.disable(gl::STENCIL_TEST);
				}
			}

			None => {
				device.disable(gl::DEPTH_TEST);
				device.disable(gl::STENCIL_TEST);
				device.disable(gl::POLYGON_OFFSET_FILL);
			}
		}

		let target = pipeline.targets.first().copied().unwrap_or_default();

		match target.blend {
			Some(blend) => {
				let color = formats::blend_operation(blend.color.operation, tier);
				let alpha = formats::blend_operation(blend.alpha.operation, tier);

				if color.is_none() || alpha.is_none() {
					report.push(Error::UnsupportedFeature { feature: Feature::BlendMinMax, tier });
				}

				device.enable(gl::BLEND);
				device.blend_equation_separate(color.unwrap_or(gl::FUNC_ADD), alpha.unwrap_or(gl::FUNC_ADD));
				device.blend_func_separate(
					formats::blend_factor(blend.color.src_factor),
					formats::blend_factor(blend.color.dst_factor),
					formats::blend_factor(blend.alpha.src_factor),
					formats::blend_factor(blend.alpha.dst_factor));
				device.blend_color(pipeline.blend_constant);
			}

			None => device.disable(gl::BLEND),
		}

		let mask = target.write_mask;
		device.color_mask(mask.r, mask.g, mask.b, mask.a);
	}

	/// Sets every uniform and block the program uses from `bindings`.
	pub(super) fn bind_uniforms(&mut self, reflection: &ProgramReflection, bindings: Option<&BindingResources>,
		report: &mut SubmitReport) -> Result<(), Error>
	{
		let empty = BindingResources::new();
		let bindings = bindings.unwrap_or(&empty);

		if let Err(error) = self.resource_manager.capabilities().require(Feature::UniformBlocks) {
			let wants_blocks = bindings.iter()
				.any(|(_, value)| matches!(value, BindingValue::Block(_) | BindingValue::Buffer(_)));

			if wants_blocks {
				report.push(error);
			}
		}

		for uniform in reflection.uniforms.iter() {
			self.bind_uniform(uniform, bindings)?;
		}

		for block in reflection.blocks.iter() {
			self.bind_block(block, bindings)?;
		}

		Ok(())
	}

	fn bind_uniform(&mut self, uniform: &UniformInfo, bindings: &BindingResources) -> Result<(), Error> {
		let element;
		let value = match bindings.resolve(&uniform.name) {
			Some(value) => value,
			None => {
				element = flat_array_element(uniform, bindings)
					.ok_or_else(|| Error::malformed(&uniform.name, "no value bound"))?;
				&element
			}
		};

		match (uniform.kind, value) {
			(UniformKind::Value(value_type), BindingValue::Value(value)) => {
				let scalars = value.coerce(value_type)
					.map_err(|reason| Error::malformed(&uniform.name, reason))?;

				self.device.uniform(uniform.location, uniform_data(value_type, &scalars));
				Ok(())
			}

			(UniformKind::Texture { unit, target }, BindingValue::TextureSampler { texture, sampler }) => {
				self.bind_texture_unit(&uniform.name, unit, target, texture, sampler)
			}

			(UniformKind::Value(_), _) => Err(Error::malformed(&uniform.name, "expected a value")),
			(UniformKind::Texture { .. }, _) => Err(Error::malformed(&uniform.name, "expected a texture and sampler")),
		}
	}

	fn bind_texture_unit(&mut self, path: &str, unit: u32, target: u32, texture: &TextureDef, sampler: &SamplerDef)
		-> Result<(), Error>
	{
		let max = self.resource_manager.capabilities().max_texture_units;
		if unit >= max {
			return Err(Error::LimitExceeded { what: "texture unit", requested: unit, max })
		}

		// Uploads bind to the active unit, so switch first to keep earlier units intact.
		self.device.active_texture(gl::TEXTURE0 + unit);

		let handle = self.resource_manager.prepare_texture(&mut self.device, texture)?;
		let Some(object) = self.resource_manager.texture(handle) else {
			return Err(Error::malformed(path, "texture was not created"))
		};

		if object.target != target {
			return Err(Error::malformed(path, format!("sampler expects a {target:#06x} texture, got {:#06x}", object.target)))
		}

		self.device.bind_texture(target, object.name);

		if self.resource_manager.capabilities().supports(Feature::SamplerObjects) {
			let sampler_handle = self.resource_manager.prepare_sampler(&mut self.device, sampler);

			if let Some(sampler_object) = self.resource_manager.sampler(sampler_handle) {
				self.device.bind_sampler(unit, sampler_object.name);
			}
		} else {
			self.resource_manager.apply_sampler_to_texture(&mut self.device, handle, &sampler.params());
		}

		Ok(())
	}

	fn bind_block(&mut self, block: &BlockInfo, bindings: &BindingResources) -> Result<(), Error> {
		match bindings.resolve(&block.name) {
			Some(BindingValue::Block(def)) => {
				let handle = self.resource_manager.prepare_uniform_block(&mut self.device, def, block)?;
				let Some(object) = self.resource_manager.uniform_block(handle) else {
					return Err(Error::malformed(&block.name, "uniform block was not created"))
				};

				self.device.bind_buffer_range(gl::UNIFORM_BUFFER, block.binding, object.buffer, 0, object.layout.size);
				Ok(())
			}

			Some(BindingValue::Buffer(view)) => {
				view.validate(&block.name)?;

				let size = view.resolved_size();
				if size != block.layout.size {
					return Err(Error::malformed(&block.name,
						format!("buffer view is {size} bytes, block is laid out as {}", block.layout.size)))
				}

				let handle = self.resource_manager.prepare_buffer(&mut self.device, &view.buffer);
				let Some(object) = self.resource_manager.buffer(handle) else {
					return Err(Error::malformed(&block.name, "buffer was not created"))
				};

				self.device.bind_buffer_range(gl::UNIFORM_BUFFER, block.binding, object.name, view.offset, size);
				Ok(())
			}

			Some(_) => Err(Error::malformed(&block.name, "expected uniform block values or a buffer view")),
			None => Err(Error::malformed(&block.name, "no uniform block bound")),
		}
	}

	/// Returns false for draws with nothing to draw.
	fn dispatch_draw(&mut self, cmd: &DrawCmd<'_>, report: &mut SubmitReport) -> Result<bool, Error> {
		let mode = formats::primitive_topology(cmd.pipeline.primitive.topology);

		let instances = match cmd.call.instance_count() {
			Some(0) => return Ok(false),
			Some(count) if count > 1 => match self.resource_manager.capabilities().require(Feature::Instancing) {
				Ok(()) => Some(count),
				Err(error) => {
					report.push(error);
					None
				}
			},
			_ => None,
		};

		match cmd.call {
			DrawCall::Vertices { first_vertex, vertex_count, .. } => {
				if vertex_count == 0 {
					return Ok(false)
				}

				match instances {
					Some(count) => self.device.draw_arrays_instanced(mode, first_vertex, vertex_count, count),
					None => self.device.draw_arrays(mode, first_vertex, vertex_count),
				}
			}

			DrawCall::Indexed { first_index, index_count, .. } => {
				let Some(indices) = cmd.indices else {
					return Err(Error::malformed("indices", "indexed draw without indices"))
				};

				if index_count == 0 {
					return Ok(false)
				}

				let end = first_index as usize + index_count as usize;
				if end > indices.count() {
					return Err(Error::malformed("indices", format!("draw reads up to index {end}, buffer holds {}", indices.count())))
				}

				let (ty, size) = formats::index_format(indices.format);
				let offset = indices.offset + first_index as usize * size as usize;

				match instances {
					Some(count) => self.device.draw_elements_instanced(mode, index_count, ty, offset, count),
					None => self.device.draw_elements(mode, index_count, ty, offset),
				}
			}
		}

		Ok(true)
	}
}
