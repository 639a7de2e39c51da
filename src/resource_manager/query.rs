use super::{ResourceManager, QueryHandle, Identity, DefId};
use crate::caps::Feature;
use crate::device::Device;
use crate::error::Error;

use std::cell::Cell;
use std::rc::Rc;


/// Whether any samples of a set of draws passed the depth and stencil tests.
///
/// The result arrives some time after the submission that ran the query, once the device has
/// it ready. See [`Context::poll_queries`](crate::Context::poll_queries).
#[derive(Debug, Default)]
pub struct QueryDef {
	identity: Identity,
	result: Rc<Cell<Option<bool>>>,
}

impl Clone for QueryDef {
	fn clone(&self) -> Self {
		QueryDef {
			identity: Identity::new(),
			result: Rc::new(Cell::new(self.result.get())),
		}
	}
}

impl QueryDef {
	pub fn new() -> QueryDef {
		QueryDef::default()
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}

	/// `None` until the first result has come back. Holds the latest result after that.
	pub fn result(&self) -> Option<bool> {
		self.result.get()
	}
}


#[derive(Debug)]
pub struct QueryObject {
	pub name: u32,
	result: Rc<Cell<Option<bool>>>,
	pending: bool,
}


impl ResourceManager {
	pub fn prepare_query(&mut self, device: &mut impl Device, def: &QueryDef) -> Result<QueryHandle, Error> {
		self.capabilities.require(Feature::OcclusionQuery)?;

		if let Some(key) = self.queries.lookup(def.id()) {
			return Ok(key)
		}

		let name = device.create_query();
		log::debug!("Created query {name}");

		let object = QueryObject {
			name,
			result: def.result.clone(),
			pending: false,
		};

		Ok(self.queries.insert(def.id(), object))
	}

	pub(crate) fn begin_query(&mut self, device: &mut impl Device, handle: QueryHandle) {
		if let Some(object) = self.queries.get_mut(handle) {
			device.begin_query(gl::ANY_SAMPLES_PASSED, object.name);
		}
	}

	pub(crate) fn end_query(&mut self, device: &mut impl Device, handle: QueryHandle) {
		if let Some(object) = self.queries.get_mut(handle) {
			device.end_query(gl::ANY_SAMPLES_PASSED);
			object.pending = true;
		}
	}

	/// Writes back every result the device has ready, without waiting for the rest.
	/// Returns how many queries are still pending.
	pub fn poll_queries(&mut self, device: &mut impl Device) -> usize {
		let mut still_pending = 0;

		for object in self.queries.values_mut().filter(|object| object.pending) {
			if !device.query_result_available(object.name) {
				still_pending += 1;
				continue
			}

			let any_samples_passed = device.query_result(object.name) != 0;
			object.result.set(Some(any_samples_passed));
			object.pending = false;

			log::trace!("Query {} resolved: {any_samples_passed}", object.name);
		}

		still_pending
	}

	pub fn delete_query(&mut self, device: &mut impl Device, def: &QueryDef) {
		if let Some(object) = self.queries.remove(def.id()) {
			log::debug!("Deleted query {}", object.name);
			device.delete_query(object.name);
		}
	}
}
