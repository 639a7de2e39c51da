mod support;

use glam::{Mat4, Vec3, Vec4};
use glpass::formats::{AddressMode, FilterMode, TextureFormat};
use glpass::*;
use support::*;

use std::rc::Rc;


fn floats(bytes: &[u8]) -> Vec<f32> {
	bytes.chunks_exact(4)
		.map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
		.collect()
}

fn params_layout(data_size: usize) -> ProgramLayout {
	quad_layout().block("Params", data_size, &[
		("a", gl::FLOAT),
		("b", gl::FLOAT_VEC3),
		("c", gl::FLOAT_MAT4),
	])
}

fn submit_draw(ctx: &mut Context<RecordingDevice>, pipeline: &PipelineDef, vertices: &VertexAttributesDef,
	bindings: &BindingResources) -> SubmitReport
{
	let mut submit = Submit::new();
	submit.encoder()
		.render_pass(RenderTarget::Surface(SurfaceOps::default()))
		.draw(DrawCmd::new(pipeline, vertices).vertices(0, 6).bindings(bindings));

	ctx.submit(&submit)
}

fn uniform_floats(device: &RecordingDevice) -> Vec<Vec<f32>> {
	device.calls.iter()
		.filter_map(|call| match call {
			Call::Uniform { values: Values::Float(values), .. } => Some(values.clone()),
			_ => None,
		})
		.collect()
}


#[test]
fn blocks_are_laid_out_as_std140() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, params_layout(96));
	let vertices = quad_vertices();

	let matrix = Mat4::from_cols_array(&std::array::from_fn(|index| index as f32));
	let block = Rc::new(UniformBlockDef::new()
		.with("a", 1.5f32)
		.with("b", Vec3::new(2.0, 3.0, 4.0))
		.with("c", matrix));

	let bindings = BindingResources::new().with("Params", block.clone());
	let report = submit_draw(&mut ctx, &pipeline, &vertices, &bindings);
	assert!(report.is_clean(), "{:?}", report.errors);
	assert_eq!(report.draws_issued, 1);

	let bytes = ctx.uniform_block_bytes(&block).expect("block was uploaded").to_vec();
	assert_eq!(bytes.len(), 96);

	let values = floats(&bytes);
	assert_eq!(values[0], 1.5);
	assert_eq!(&values[4..7], &[2.0, 3.0, 4.0]);
	assert_eq!(&values[8..24], &matrix.to_cols_array());

	let device = ctx.device();
	assert!(device.calls.contains(&Call::BufferData { target: gl::UNIFORM_BUFFER, data: bytes.clone() }));
	assert!(device.calls.iter().any(|call| matches!(call,
		Call::UniformBlockBinding { index: 0, binding: 0, .. })));

	let buffer = device.created("buffer").last().copied();
	assert!(device.calls.iter().any(|call| matches!(*call,
		Call::BindBufferRange { target: gl::UNIFORM_BUFFER, index: 0, offset: 0, size: 96, name } if Some(name) == buffer)));
}

#[test]
fn raw_block_bytes_round_trip() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, params_layout(96));
	let vertices = quad_vertices();

	let typed = Rc::new(UniformBlockDef::new()
		.with("a", -3.0f32)
		.with("b", Vec3::X)
		.with("c", Mat4::IDENTITY));

	submit_draw(&mut ctx, &pipeline, &vertices, &BindingResources::new().with("Params", typed.clone()));
	let encoded = ctx.uniform_block_bytes(&typed).expect("typed block").to_vec();

	let raw = Rc::new(UniformBlockDef::from_bytes(encoded.clone()));
	let report = submit_draw(&mut ctx, &pipeline, &vertices, &BindingResources::new().with("Params", raw.clone()));
	assert!(report.is_clean(), "{:?}", report.errors);

	assert_eq!(ctx.uniform_block_bytes(&raw), Some(&encoded[..]));
	assert_eq!(floats(&encoded)[0], -3.0);
}

#[test]
fn changed_members_upload_only_their_bytes() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, params_layout(96));
	let vertices = quad_vertices();

	let block = Rc::new(UniformBlockDef::new().with("a", 1.0f32));
	let bindings = BindingResources::new().with("Params", block.clone());

	submit_draw(&mut ctx, &pipeline, &vertices, &bindings);
	ctx.device_mut().clear_calls();

	block.set("b", Vec3::new(0.0, 7.0, 0.0));
	submit_draw(&mut ctx, &pipeline, &vertices, &bindings);

	let uploads: Vec<&Call> = ctx.device().calls.iter()
		.filter(|call| matches!(call, Call::BufferData{..} | Call::BufferSubData{..}))
		.collect();

	assert_eq!(uploads, [&Call::BufferSubData {
		target: gl::UNIFORM_BUFFER,
		offset: 20,
		data: 7.0f32.to_le_bytes().to_vec(),
	}]);

	// Nothing changed, nothing uploaded.
	ctx.device_mut().clear_calls();
	submit_draw(&mut ctx, &pipeline, &vertices, &bindings);
	assert_eq!(ctx.device().count(|call| matches!(call, Call::BufferSubData{..})), 0);
}

#[test]
fn rebinding_a_block_to_a_different_layout_is_an_error() {
	let mut ctx = context(RecordingDevice::extended());
	let large = quad_pipeline(ctx.device_mut(), QUAD_VS, params_layout(96));

	let small_vs = "// small\nattribute vec2 position;\nvoid main() {}\n";
	let small = quad_pipeline(ctx.device_mut(), small_vs, quad_layout().block("Params", 16, &[("a", gl::FLOAT)]));
	let vertices = quad_vertices();

	let block = Rc::new(UniformBlockDef::new().with("a", 2.0f32));
	let bindings = BindingResources::new().with("Params", block.clone());

	assert!(submit_draw(&mut ctx, &large, &vertices, &bindings).is_clean());

	let report = submit_draw(&mut ctx, &small, &vertices, &bindings);
	assert_eq!(report.draws_issued, 0);
	assert_eq!(report.draws_skipped, 1);
	assert!(matches!(&report.errors[..],
		[Error::LayoutConsistency { block, expected: 96, found: 16 }] if block == "Params"), "{:?}", report.errors);

	assert_eq!(ctx.uniform_block_bytes(&block).map(<[u8]>::len), Some(96));
}

#[test]
fn reflected_block_size_wins_over_computed_layout() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, params_layout(112));
	let vertices = quad_vertices();

	let block = Rc::new(UniformBlockDef::new().with("a", 1.0f32));
	let report = submit_draw(&mut ctx, &pipeline, &vertices, &BindingResources::new().with("Params", block.clone()));

	assert_eq!(report.draws_issued, 1);
	assert!(matches!(&report.errors[..],
		[Error::LayoutConsistency { expected: 96, found: 112, .. }]), "{:?}", report.errors);
	assert_eq!(ctx.uniform_block_bytes(&block).map(<[u8]>::len), Some(112));
}

#[test]
fn uniform_blocks_on_baseline_are_reported_not_fatal() {
	let mut ctx = context(RecordingDevice::baseline());
	let layout = params_layout(96).uniform("tint", gl::FLOAT_VEC4);
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, layout);
	let vertices = quad_vertices();

	let block = Rc::new(UniformBlockDef::new().with("a", 1.0f32));
	let bindings = BindingResources::new()
		.with("Params", block.clone())
		.with_value("tint", Vec4::ONE);

	let report = submit_draw(&mut ctx, &pipeline, &vertices, &bindings);

	assert_eq!(report.draws_issued, 1);
	assert!(report.has_unsupported(Feature::UniformBlocks));
	assert!(matches!(&report.errors[..],
		[Error::UnsupportedFeature { feature: Feature::UniformBlocks, tier: Tier::Baseline }]), "{:?}", report.errors);

	let device = ctx.device();
	assert_eq!(device.draws().len(), 1);
	assert_eq!(uniform_floats(device), [vec![1.0; 4]]);
	assert_eq!(device.count(|call| matches!(call, Call::BindBufferRange{..} | Call::UniformBlockBinding{..})), 0);
	assert!(ctx.uniform_block_bytes(&block).is_none());
}

#[test]
fn flat_arrays_feed_each_element() {
	let mut ctx = context(RecordingDevice::extended());
	let layout = quad_layout().uniform_array("weights", gl::FLOAT, 3);
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, layout);
	let vertices = quad_vertices();

	let bindings = BindingResources::new().with_value("weights", vec![0.25f32, 0.5, 0.75]);
	let report = submit_draw(&mut ctx, &pipeline, &vertices, &bindings);

	assert!(report.is_clean(), "{:?}", report.errors);
	assert_eq!(uniform_floats(ctx.device()), [vec![0.25], vec![0.5], vec![0.75]]);
}

#[test]
fn missing_values_skip_only_their_draw() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout().uniform("tint", gl::FLOAT_VEC4));
	let vertices = quad_vertices();

	let bound = BindingResources::new().with_value("tint", Vec4::new(1.0, 0.0, 0.0, 1.0));
	let unbound = BindingResources::new();

	let mut submit = Submit::new();
	submit.encoder()
		.render_pass(RenderTarget::Surface(SurfaceOps::default()))
		.draw(DrawCmd::new(&pipeline, &vertices).vertices(0, 6).bindings(&unbound))
		.draw(DrawCmd::new(&pipeline, &vertices).vertices(0, 6).bindings(&bound));

	let report = ctx.submit(&submit);

	assert_eq!(report.draws_issued, 1);
	assert_eq!(report.draws_skipped, 1);
	assert!(matches!(&report.errors[..], [Error::MalformedDescriptor { path, .. }] if path == "tint"), "{:?}", report.errors);
	assert_eq!(ctx.device().draws().len(), 1);
}

#[test]
fn mismatched_value_types_are_malformed() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout().uniform("tint", gl::FLOAT_VEC4));
	let vertices = quad_vertices();

	let bindings = BindingResources::new().with_value("tint", 3i32);
	let report = submit_draw(&mut ctx, &pipeline, &vertices, &bindings);

	assert_eq!(report.draws_skipped, 1);
	assert!(matches!(&report.errors[..], [Error::MalformedDescriptor{..}]));
}

#[test]
fn samplers_get_consecutive_texture_units() {
	let mut ctx = context(RecordingDevice::extended());
	let layout = quad_layout()
		.uniform("albedo", gl::SAMPLER_2D)
		.uniform("normals", gl::SAMPLER_2D);
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, layout);
	let vertices = quad_vertices();

	let albedo = Rc::new(TextureDef::new_2d(TextureFormat::Rgba8, 8, 8));
	let normals = Rc::new(TextureDef::new_2d(TextureFormat::Rgba8, 8, 8));
	let sampler = Rc::new(SamplerDef::linear_repeat());

	let bindings = BindingResources::new()
		.with_texture("albedo", albedo, sampler.clone())
		.with_texture("normals", normals, sampler);

	let report = submit_draw(&mut ctx, &pipeline, &vertices, &bindings);
	assert!(report.is_clean(), "{:?}", report.errors);

	let device = ctx.device();
	let unit_assignments: Vec<&Call> = device.calls.iter()
		.filter(|call| matches!(call, Call::Uniform { values: Values::Int(_), .. }))
		.collect();

	assert!(matches!(&unit_assignments[..], [
		Call::Uniform { values: Values::Int(first), .. },
		Call::Uniform { values: Values::Int(second), .. },
	] if first == &[0] && second == &[1]));

	// One shared sampler object, bound to both units.
	let samplers = device.created("sampler");
	assert_eq!(samplers.len(), 1);
	assert!(device.calls.contains(&Call::BindSampler { unit: 0, name: samplers[0] }));
	assert!(device.calls.contains(&Call::BindSampler { unit: 1, name: samplers[0] }));

	let textures = device.created("texture");
	let unit_of = |texture: u32| {
		let bind = device.position(|call| matches!(*call, Call::BindTexture { name, .. } if name == texture))?;
		device.calls[..bind].iter().rev().find_map(|call| match *call {
			Call::ActiveTexture(unit) => Some(unit),
			_ => None,
		})
	};

	assert_eq!(unit_of(textures[0]), Some(gl::TEXTURE0));
	assert_eq!(unit_of(textures[1]), Some(gl::TEXTURE1));
}

#[test]
fn samplers_past_the_unit_limit_skip_the_draw() {
	let mut ctx = context(RecordingDevice::new(Capabilities { max_texture_units: 1, ..Capabilities::extended() }));
	let layout = quad_layout()
		.uniform("albedo", gl::SAMPLER_2D)
		.uniform("normals", gl::SAMPLER_2D);
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, layout);
	let vertices = quad_vertices();

	let sampler = Rc::new(SamplerDef::linear_repeat());
	let bindings = BindingResources::new()
		.with_texture("albedo", Rc::new(TextureDef::new_2d(TextureFormat::Rgba8, 8, 8)), sampler.clone())
		.with_texture("normals", Rc::new(TextureDef::new_2d(TextureFormat::Rgba8, 8, 8)), sampler);

	let report = submit_draw(&mut ctx, &pipeline, &vertices, &bindings);

	assert_eq!(report.errors, [Error::LimitExceeded { what: "texture unit", requested: 1, max: 1 }]);
	assert_eq!(report.draws_skipped, 1);

	let device = ctx.device();
	assert_eq!(device.count(|call| matches!(call, Call::Uniform { values: Values::Int(_), .. })), 1);
	assert!(!device.calls.contains(&Call::ActiveTexture(gl::TEXTURE1)));
	assert!(device.draws().is_empty());
}

#[test]
fn baseline_sampling_state_is_only_set_when_it_changes() {
	let mut ctx = context(RecordingDevice::baseline());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout().uniform("image", gl::SAMPLER_2D));
	let vertices = quad_vertices();

	let texture = Rc::new(TextureDef::new_2d(TextureFormat::Rgba8, 8, 8));
	let sampler = Rc::new(SamplerDef::nearest_clamped());
	let bindings = BindingResources::new().with_texture("image", texture, sampler.clone());

	let texture_parameters = |device: &RecordingDevice| -> Vec<u32> {
		device.calls.iter()
			.filter_map(|call| match *call {
				Call::TexParameter { pname, .. } => Some(pname),
				_ => None,
			})
			.collect()
	};

	submit_draw(&mut ctx, &pipeline, &vertices, &bindings);
	assert!(ctx.device().created("sampler").is_empty());

	let first = texture_parameters(ctx.device());
	assert!(first.ends_with(&[gl::TEXTURE_MIN_FILTER, gl::TEXTURE_MAG_FILTER]), "{first:?}");

	ctx.device_mut().clear_calls();
	submit_draw(&mut ctx, &pipeline, &vertices, &bindings);
	assert!(texture_parameters(ctx.device()).is_empty());

	sampler.set_params(SamplerParams {
		address_mode_u: AddressMode::Repeat,
		..sampler.params()
	});

	ctx.device_mut().clear_calls();
	submit_draw(&mut ctx, &pipeline, &vertices, &bindings);
	assert_eq!(texture_parameters(ctx.device()), [gl::TEXTURE_WRAP_S]);
}

#[test]
fn baseline_mip_filtering_follows_the_texture_gaining_mips() {
	let mut ctx = context(RecordingDevice::baseline());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout().uniform("image", gl::SAMPLER_2D));
	let vertices = quad_vertices();

	let texture = Rc::new(TextureDef::new_2d(TextureFormat::Rgba8, 8, 8));
	let sampler = Rc::new(SamplerDef::new(SamplerParams {
		mipmap_filter: Some(FilterMode::Linear),
		..SamplerDef::linear_clamped().params()
	}));
	let bindings = BindingResources::new().with_texture("image", texture.clone(), sampler);

	submit_draw(&mut ctx, &pipeline, &vertices, &bindings);
	assert!(ctx.device().calls.contains(&Call::TexParameter {
		target: gl::TEXTURE_2D,
		pname: gl::TEXTURE_MIN_FILTER,
		value: gl::LINEAR as i32,
	}));

	texture.set_generate_mipmaps(true);
	ctx.device_mut().clear_calls();
	submit_draw(&mut ctx, &pipeline, &vertices, &bindings);

	let device = ctx.device();
	assert!(device.calls.contains(&Call::TexParameter {
		target: gl::TEXTURE_2D,
		pname: gl::TEXTURE_MIN_FILTER,
		value: gl::LINEAR_MIPMAP_LINEAR as i32,
	}));
	assert!(device.calls.contains(&Call::GenerateMipmap(gl::TEXTURE_2D)));
}
