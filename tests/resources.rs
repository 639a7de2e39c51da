mod support;

use glpass::formats::{TextureDimension, TextureFormat};
use glpass::*;
use support::*;

use std::rc::Rc;


fn draw_quad(ctx: &mut Context<RecordingDevice>, pipeline: &PipelineDef, vertices: &VertexAttributesDef,
	bindings: Option<&BindingResources>) -> SubmitReport
{
	let mut submit = Submit::new();
	let mut cmd = DrawCmd::new(pipeline, vertices).vertices(0, 6);
	if let Some(bindings) = bindings {
		cmd = cmd.bindings(bindings);
	}

	submit.encoder()
		.render_pass(RenderTarget::Surface(SurfaceOps::clear([0.0; 4])))
		.draw(cmd);

	ctx.submit(&submit)
}


#[test]
fn repeated_submissions_reuse_backend_objects() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout());
	let vertices = quad_vertices();

	for _ in 0..3 {
		let report = draw_quad(&mut ctx, &pipeline, &vertices, None);
		assert!(report.is_clean(), "{:?}", report.errors);
		assert_eq!(report.draws_issued, 1);
	}

	let device = ctx.device();
	assert_eq!(device.created("shader").len(), 2);
	assert_eq!(device.created("program").len(), 1);
	assert_eq!(device.created("buffer").len(), 1);
	assert_eq!(device.created("vertex_array").len(), 1);
	assert_eq!(device.count(|call| matches!(call, Call::BufferData{..})), 1);
	assert_eq!(device.draws().len(), 3);
}

#[test]
fn pipelines_with_the_same_sources_share_a_program() {
	let mut ctx = context(RecordingDevice::extended());
	let first = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout());
	let second = PipelineDef::new(QUAD_VS, QUAD_FS);
	let vertices = quad_vertices();

	draw_quad(&mut ctx, &first, &vertices, None);
	draw_quad(&mut ctx, &second, &vertices, None);
	assert_eq!(ctx.device().created("program").len(), 1);

	ctx.delete_program(&first);
	assert!(ctx.device().deleted("program").is_empty());

	ctx.delete_program(&second);
	assert_eq!(ctx.device().deleted("program"), ctx.device().created("program"));
}

#[test]
fn resizing_a_texture_replaces_its_backend_object() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout().uniform("image", gl::SAMPLER_2D));
	let vertices = quad_vertices();

	let texture = Rc::new(TextureDef::new_2d(TextureFormat::Rgba8, 64, 64));
	let bindings = BindingResources::new()
		.with_texture("image", texture.clone(), Rc::new(SamplerDef::linear_clamped()));

	draw_quad(&mut ctx, &pipeline, &vertices, Some(&bindings));
	let original = ctx.device().created("texture");
	assert_eq!(original.len(), 1);

	texture.set_size(TextureSize::new_2d(128, 128));
	let report = draw_quad(&mut ctx, &pipeline, &vertices, Some(&bindings));
	assert!(report.is_clean(), "{:?}", report.errors);

	let device = ctx.device();
	let created = device.created("texture");
	assert_eq!(created.len(), 2);
	assert_ne!(created[0], created[1]);
	assert_eq!(device.deleted("texture"), original);

	let uploaded_sizes: Vec<(u32, u32)> = device.calls.iter()
		.filter_map(|call| match *call {
			Call::TexImage { level: 0, width, height, .. } => Some((width, height)),
			_ => None,
		})
		.collect();

	assert_eq!(uploaded_sizes, [(64, 64), (128, 128)]);

	let bound_last = device.calls.iter().rev()
		.find_map(|call| match *call {
			Call::BindTexture { name, .. } => Some(name),
			_ => None,
		});

	assert_eq!(bound_last, Some(created[1]));
}

#[test]
fn buffer_writes_upload_only_the_changed_range() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout());
	let vertices = quad_vertices();

	draw_quad(&mut ctx, &pipeline, &vertices, None);
	ctx.device_mut().clear_calls();

	let buffer = vertices.get("position").expect("position attribute").buffer;
	buffer.write(8, &[0.5f32, 0.25]).unwrap();

	draw_quad(&mut ctx, &pipeline, &vertices, None);

	let device = ctx.device();
	let uploads: Vec<&Call> = device.calls.iter()
		.filter(|call| matches!(call, Call::BufferData{..} | Call::BufferSubData{..}))
		.collect();

	let expected: Vec<u8> = [0.5f32, 0.25].iter().flat_map(|v| v.to_le_bytes()).collect();
	assert_eq!(uploads, [&Call::BufferSubData { target: gl::ARRAY_BUFFER, offset: 8, data: expected }]);
	assert!(device.created("buffer").is_empty());
}

#[test]
fn resizing_a_buffer_recreates_it() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout());
	let vertices = quad_vertices();

	draw_quad(&mut ctx, &pipeline, &vertices, None);

	let buffer = vertices.get("position").expect("position attribute").buffer;
	buffer.resize(96);
	draw_quad(&mut ctx, &pipeline, &vertices, None);

	let device = ctx.device();
	let created = device.created("buffer");
	assert_eq!(created.len(), 2);
	assert_eq!(device.deleted("buffer"), [created[0]]);

	// The vertex array pointed at the old buffer.
	assert_eq!(device.created("vertex_array").len(), 2);
}

#[test]
fn failed_compiles_are_reported_once() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = PipelineDef::new("#error broken on purpose\n", QUAD_FS);
	let vertices = quad_vertices();

	let report = draw_quad(&mut ctx, &pipeline, &vertices, None);
	assert_eq!(report.draws_issued, 0);
	assert_eq!(report.draws_skipped, 1);
	assert!(matches!(&report.errors[..], [Error::Compile { stage: "vertex", .. }]), "{:?}", report.errors);

	let compiles = ctx.device().count(|call| matches!(call, Call::CompileShader(_)));

	let report = draw_quad(&mut ctx, &pipeline, &vertices, None);
	assert!(matches!(&report.errors[..], [Error::ProgramUnavailable { .. }]), "{:?}", report.errors);
	assert_eq!(ctx.device().count(|call| matches!(call, Call::CompileShader(_))), compiles);

	// Deleting forgets the failure, so the next use tries again.
	ctx.delete_program(&pipeline);
	let report = draw_quad(&mut ctx, &pipeline, &vertices, None);
	assert!(matches!(&report.errors[..], [Error::Compile { .. }]), "{:?}", report.errors);
}

#[test]
fn link_failures_carry_both_sources() {
	let mut ctx = context(RecordingDevice::extended());
	let vertex_source = "// LINK_FAIL\nattribute vec2 position;\nvoid main() {}\n";
	let pipeline = quad_pipeline(ctx.device_mut(), vertex_source, quad_layout());
	let vertices = quad_vertices();

	let report = draw_quad(&mut ctx, &pipeline, &vertices, None);

	match &report.errors[..] {
		[Error::Link { vertex, fragment, log }] => {
			assert_eq!(vertex, vertex_source);
			assert_eq!(fragment, QUAD_FS);
			assert!(log.contains("mismatch"));
		}

		errors => panic!("expected a link error, got {errors:?}"),
	}

	let device = ctx.device();
	assert_eq!(device.deleted("program"), device.created("program"));
	assert_eq!(device.deleted("shader").len(), 2);
}

#[test]
fn missing_vertex_inputs_skip_the_draw() {
	let mut ctx = context(RecordingDevice::extended());
	let layout = quad_layout().attribute("normal", gl::FLOAT_VEC3, 1);
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, layout);
	let vertices = quad_vertices();

	let report = draw_quad(&mut ctx, &pipeline, &vertices, None);

	assert_eq!(report.draws_skipped, 1);
	assert!(matches!(&report.errors[..], [Error::MalformedDescriptor { path, .. }] if path == "vertices.normal"),
		"{:?}", report.errors);
	assert!(ctx.device().draws().is_empty());
}

#[test]
fn attribute_locations_past_the_enabled_mask_skip_the_draw() {
	let mut ctx = context(RecordingDevice::baseline());
	let layout = quad_layout().attribute("far", gl::FLOAT_VEC2, 40);
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, layout);
	let vertices = quad_vertices();

	let report = draw_quad(&mut ctx, &pipeline, &vertices, None);

	assert_eq!(report.draws_skipped, 1);
	assert_eq!(report.errors, [Error::LimitExceeded { what: "vertex attribute location", requested: 40, max: 32 }]);
	assert!(ctx.device().draws().is_empty());
}

#[test]
fn textures_the_baseline_tier_lacks_are_unsupported() {
	let mut ctx = context(RecordingDevice::baseline());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout().uniform("image", gl::SAMPLER_2D));
	let vertices = quad_vertices();
	let sampler = Rc::new(SamplerDef::nearest_clamped());

	let float_texture = Rc::new(TextureDef::new_2d(TextureFormat::R32Float, 4, 4));
	let bindings = BindingResources::new().with_texture("image", float_texture, sampler.clone());
	let report = draw_quad(&mut ctx, &pipeline, &vertices, Some(&bindings));

	assert_eq!(report.draws_skipped, 1);
	assert!(matches!(&report.errors[..],
		[Error::UnsupportedFeature { feature: Feature::SizedTextureFormats, tier: Tier::Baseline }]), "{:?}", report.errors);

	let size = TextureSize { width: 4, height: 4, depth_or_layers: 2 };
	let array_texture = Rc::new(TextureDef::new(TextureDimension::D2Array, TextureFormat::Rgba8, size));
	let bindings = BindingResources::new().with_texture("image", array_texture, sampler);
	let report = draw_quad(&mut ctx, &pipeline, &vertices, Some(&bindings));

	assert_eq!(report.draws_skipped, 1);
	assert!(matches!(&report.errors[..],
		[Error::UnsupportedFeature { feature: Feature::TextureArrays, tier: Tier::Baseline }]), "{:?}", report.errors);

	assert!(ctx.device().created("texture").is_empty());
}

#[test]
fn release_all_deletes_everything_once() {
	let mut ctx = context(RecordingDevice::extended());
	let pipeline = quad_pipeline(ctx.device_mut(), QUAD_VS, quad_layout().uniform("image", gl::SAMPLER_2D));
	let vertices = quad_vertices();

	let texture = Rc::new(TextureDef::new_2d(TextureFormat::Rgba8, 4, 4));
	let target = RenderPassDef::new()
		.with_color(ColorAttachment::clear(AttachmentView::texture(Rc::new(TextureDef::render_target(TextureFormat::Rgba8, 16, 16))), [0.0; 4]));
	let bindings = BindingResources::new()
		.with_texture("image", texture, Rc::new(SamplerDef::nearest_clamped()));

	let mut submit = Submit::new();
	submit.encoder()
		.render_pass(RenderTarget::Offscreen(&target))
		.draw(DrawCmd::new(&pipeline, &vertices).vertices(0, 6).bindings(&bindings));

	let report = ctx.submit(&submit);
	assert!(report.is_clean(), "{:?}", report.errors);

	ctx.release_all();

	let device = ctx.device();
	for kind in ["buffer", "texture", "sampler", "framebuffer", "program", "shader", "vertex_array"] {
		let mut created = device.created(kind);
		let mut deleted = device.deleted(kind);
		created.sort_unstable();
		deleted.sort_unstable();

		assert!(!created.is_empty(), "no {kind} was created");
		assert_eq!(created, deleted, "{kind}s");
	}

	ctx.release_all();
	assert_eq!(ctx.device().deleted("texture").len(), 2);
}
