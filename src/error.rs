use crate::caps::{Feature, Tier};


/// Everything that can go wrong while building backend objects or executing a submission.
///
/// None of these abort a submission. The item that produced the error is skipped or degraded
/// and the error is collected into the [`SubmitReport`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("Failed to compile {stage} shader:\n{log}\n--- source ---\n{source_text}")]
	Compile {
		stage: &'static str,
		source_text: String,
		log: String,
	},

	#[error("Failed to link program:\n{log}\n--- vertex ---\n{vertex}\n--- fragment ---\n{fragment}")]
	Link {
		vertex: String,
		fragment: String,
		log: String,
	},

	#[error("Program is unavailable because it previously failed to build: {reason}")]
	ProgramUnavailable {
		reason: String,
	},

	#[error("{feature:?} is not available on the {tier:?} tier")]
	UnsupportedFeature {
		feature: Feature,
		tier: Tier,
	},

	#[error("Malformed descriptor at '{path}': {reason}")]
	MalformedDescriptor {
		path: String,
		reason: String,
	},

	#[error("Uniform block '{block}' was laid out as {expected} bytes, but is now bound to a {found} byte block")]
	LayoutConsistency {
		block: String,
		expected: usize,
		found: usize,
	},

	#[error("{what} {requested} is past the device limit of {max}")]
	LimitExceeded {
		what: &'static str,
		requested: u32,
		max: u32,
	},

	#[error("Framebuffer is incomplete (status {status:#06x})")]
	IncompleteFramebuffer {
		status: u32,
	},
}

impl Error {
	pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Error {
		Error::MalformedDescriptor {
			path: path.into(),
			reason: reason.into(),
		}
	}

	/// Logs the error at a level matching how severe it is for the caller.
	pub fn log(&self) {
		match self {
			Error::Compile{..} | Error::Link{..} | Error::LayoutConsistency{..}
				=> log::error!("{self}"),

			Error::ProgramUnavailable{..} | Error::UnsupportedFeature{..}
				| Error::MalformedDescriptor{..} | Error::IncompleteFramebuffer{..}
				| Error::LimitExceeded{..}
				=> log::warn!("{self}"),
		}
	}
}


/// What happened during a [`Context::submit`](crate::Context::submit).
#[derive(Debug, Default)]
pub struct SubmitReport {
	pub errors: Vec<Error>,
	pub draws_issued: u32,
	pub draws_skipped: u32,
}

impl SubmitReport {
	pub fn is_clean(&self) -> bool {
		self.errors.is_empty()
	}

	/// Unsupported features are only reported once per submission.
	pub(crate) fn push(&mut self, error: Error) {
		if let Error::UnsupportedFeature { feature, .. } = error {
			if self.has_unsupported(feature) {
				return
			}
		}

		error.log();
		self.errors.push(error);
	}

	pub fn has_unsupported(&self, feature: Feature) -> bool {
		self.errors.iter()
			.any(|e| matches!(e, Error::UnsupportedFeature{feature: f, ..} if *f == feature))
	}
}
