use super::Context;
use crate::caps::Feature;
use crate::commands::FeedbackPass;
use crate::device::Device;
use crate::error::{Error, SubmitReport};
use crate::formats;


impl<D: Device> Context<D> {
	pub(super) fn execute_feedback_pass(&mut self, pass: &FeedbackPass<'_>, report: &mut SubmitReport) {
		match self.run_feedback_pass(pass, report) {
			Ok(true) => report.draws_issued += 1,
			Ok(false) => {}
			Err(error) => {
				report.push(error);
				report.draws_skipped += 1;
			}
		}
	}

	/// Captures the vertex outputs of `pass.pipeline` with rasterization turned off.
	///
	/// Strip topologies are captured as their list equivalents, since that's all capture supports.
	fn run_feedback_pass(&mut self, pass: &FeedbackPass<'_>, report: &mut SubmitReport) -> Result<bool, Error> {
		self.resource_manager.capabilities().require(Feature::TransformFeedback)?;

		if !pass.pipeline.is_capture() {
			return Err(Error::malformed("pipeline", "transform feedback passes need a capture pipeline"))
		}

		let program = self.resource_manager.prepare_program(&mut self.device, pass.pipeline)?;
		let Some(object) = self.resource_manager.program(program) else {
			return Err(Error::malformed("pipeline", "program was not created"))
		};

		let program_name = object.name;
		let reflection = object.reflection.clone();

		self.device.use_program(program_name);
		self.bind_uniforms(&reflection, pass.bindings, report)?;

		self.resource_manager.bind_vertex_state(&mut self.device, pass.pipeline, program, pass.vertices, None)?;

		let feedback = self.resource_manager.prepare_transform_feedback(&mut self.device, pass.feedback)?;
		let Some(feedback_name) = self.resource_manager.transform_feedback(feedback).map(|object| object.name) else {
			return Err(Error::malformed("feedback", "transform feedback was not created"))
		};

		if pass.vertex_count == 0 {
			return Ok(false)
		}

		let mode = formats::feedback_primitive_mode(pass.pipeline.primitive.topology);

		self.device.bind_transform_feedback(feedback_name);
		self.device.enable(gl::RASTERIZER_DISCARD);
		self.device.begin_transform_feedback(mode);

		self.device.draw_arrays(mode, pass.first_vertex, pass.vertex_count);

		self.device.end_transform_feedback();
		self.device.disable(gl::RASTERIZER_DISCARD);
		self.device.bind_transform_feedback(0);

		log::trace!("Captured {} vertices into transform feedback {feedback_name}", pass.vertex_count);

		Ok(true)
	}
}
