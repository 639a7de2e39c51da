use super::{ResourceManager, TransformFeedbackHandle, Identity, DefId, bump};
use super::buffer::BufferView;
use crate::caps::Feature;
use crate::device::Device;
use crate::error::Error;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;


/// Where a capture pipeline's outputs are written, by buffer index.
///
/// Captured data only exists on the device. The caller side copy of a target buffer is not
/// updated, and any later write to it through [`BufferDef`](super::BufferDef) overwrites
/// the captured range on upload.
#[derive(Debug, Clone, Default)]
pub struct TransformFeedbackDef {
	identity: Identity,
	buffers: RefCell<BTreeMap<u32, BufferView>>,
	revision: Cell<u64>,
}

impl TransformFeedbackDef {
	pub fn new() -> TransformFeedbackDef {
		TransformFeedbackDef::default()
	}

	pub fn with(self, index: u32, view: BufferView) -> TransformFeedbackDef {
		self.set(index, view);
		self
	}

	pub fn set(&self, index: u32, view: BufferView) {
		self.buffers.borrow_mut().insert(index, view);
		bump(&self.revision);
	}

	pub fn remove(&self, index: u32) {
		if self.buffers.borrow_mut().remove(&index).is_some() {
			bump(&self.revision);
		}
	}

	pub fn buffers(&self) -> Vec<(u32, BufferView)> {
		self.buffers.borrow().iter().map(|(&index, view)| (index, view.clone())).collect()
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}

	pub fn revision(&self) -> u64 {
		self.revision.get()
	}
}


#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundRange {
	index: u32,
	buffer_serial: u64,
	offset: usize,
	size: usize,
}

#[derive(Debug)]
pub struct TransformFeedbackObject {
	pub name: u32,
	ranges: Vec<BoundRange>,
}


impl ResourceManager {
	pub fn prepare_transform_feedback(&mut self, device: &mut impl Device, def: &TransformFeedbackDef)
		-> Result<TransformFeedbackHandle, Error>
	{
		self.capabilities.require(Feature::TransformFeedback)?;

		let views = def.buffers();
		if views.is_empty() {
			return Err(Error::malformed("transform_feedback", "no target buffers"))
		}

		let mut ranges = Vec::with_capacity(views.len());
		let mut names = Vec::with_capacity(views.len());

		for (index, view) in views.iter() {
			view.validate(&format!("transform_feedback[{index}]"))?;

			let key = self.prepare_buffer(device, &view.buffer);
			let Some(buffer) = self.buffer(key) else {
				return Err(Error::malformed(format!("transform_feedback[{index}]"), "buffer could not be created"))
			};

			names.push(buffer.name);
			ranges.push(BoundRange {
				index: *index,
				buffer_serial: buffer.serial,
				offset: view.offset,
				size: view.resolved_size(),
			});
		}

		if let Some(key) = self.transform_feedbacks.lookup(def.id()) {
			let up_to_date = self.transform_feedbacks.get(key)
				.map_or(false, |object| object.ranges == ranges);

			if up_to_date {
				return Ok(key)
			}

			self.delete_transform_feedback(device, def);
		}

		let name = device.create_transform_feedback();
		device.bind_transform_feedback(name);

		for (range, &buffer) in ranges.iter().zip(names.iter()) {
			device.bind_buffer_range(gl::TRANSFORM_FEEDBACK_BUFFER, range.index, buffer, range.offset, range.size);
		}

		device.bind_transform_feedback(0);

		log::debug!("Created transform feedback {name} ({} buffers)", ranges.len());

		Ok(self.transform_feedbacks.insert(def.id(), TransformFeedbackObject { name, ranges }))
	}

	pub fn transform_feedback(&self, handle: TransformFeedbackHandle) -> Option<&TransformFeedbackObject> {
		self.transform_feedbacks.get(handle)
	}

	pub fn delete_transform_feedback(&mut self, device: &mut impl Device, def: &TransformFeedbackDef) {
		if let Some(object) = self.transform_feedbacks.remove(def.id()) {
			log::debug!("Deleted transform feedback {}", object.name);
			device.delete_transform_feedback(object.name);
		}
	}
}
