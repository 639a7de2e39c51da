use super::{ResourceManager, SamplerHandle, TextureHandle, Identity, DefId};
use crate::device::Device;
use crate::formats::{self, AddressMode, CompareFunction, FilterMode};

use std::cell::Cell;


#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SamplerParams {
	pub address_mode_u: AddressMode,
	pub address_mode_v: AddressMode,
	pub address_mode_w: AddressMode,
	pub mag_filter: FilterMode,
	pub min_filter: FilterMode,
	/// No mip filtering if unset.
	pub mipmap_filter: Option<FilterMode>,
	pub lod_min_clamp: f32,
	pub lod_max_clamp: f32,
	/// Depth comparison, for shadow samplers.
	pub compare: Option<CompareFunction>,
}

impl Default for SamplerParams {
	fn default() -> Self {
		SamplerParams {
			address_mode_u: AddressMode::ClampToEdge,
			address_mode_v: AddressMode::ClampToEdge,
			address_mode_w: AddressMode::ClampToEdge,
			mag_filter: FilterMode::Nearest,
			min_filter: FilterMode::Nearest,
			mipmap_filter: None,
			lod_min_clamp: -1000.0,
			lod_max_clamp: 1000.0,
			compare: None,
		}
	}
}

impl SamplerParams {
	/// What a freshly created texture is set up with.
	pub(crate) fn texture_default() -> SamplerParams {
		SamplerParams {
			mag_filter: FilterMode::Linear,
			min_filter: FilterMode::Linear,
			..SamplerParams::default()
		}
	}

	fn with_filter(filter: FilterMode, address_mode: AddressMode) -> SamplerParams {
		SamplerParams {
			address_mode_u: address_mode,
			address_mode_v: address_mode,
			address_mode_w: address_mode,
			mag_filter: filter,
			min_filter: filter,
			..SamplerParams::default()
		}
	}
}


#[derive(Debug, Clone)]
pub struct SamplerDef {
	identity: Identity,
	params: Cell<SamplerParams>,
}

impl SamplerDef {
	pub fn new(params: SamplerParams) -> SamplerDef {
		SamplerDef {
			identity: Identity::new(),
			params: Cell::new(params),
		}
	}

	pub fn linear_clamped() -> SamplerDef {
		SamplerDef::new(SamplerParams::with_filter(FilterMode::Linear, AddressMode::ClampToEdge))
	}

	pub fn nearest_clamped() -> SamplerDef {
		SamplerDef::new(SamplerParams::with_filter(FilterMode::Nearest, AddressMode::ClampToEdge))
	}

	pub fn linear_repeat() -> SamplerDef {
		SamplerDef::new(SamplerParams::with_filter(FilterMode::Linear, AddressMode::Repeat))
	}

	pub fn id(&self) -> DefId {
		self.identity.id()
	}

	pub fn params(&self) -> SamplerParams {
		self.params.get()
	}

	/// Takes effect on next use, without recreating anything.
	pub fn set_params(&self, params: SamplerParams) {
		self.params.set(params);
	}
}


#[derive(Debug)]
pub struct SamplerObject {
	pub name: u32,
	applied: SamplerParams,
}


#[derive(Debug, Copy, Clone)]
enum Param {
	Int(i32),
	Float(f32),
}

/// Issues one parameter call per field that differs between `applied` and `params`.
///
/// `set` is either a sampler object or a texture parameter setter.
fn apply_params(applied: Option<&SamplerParams>, params: &SamplerParams, use_mipmaps: bool, extended: bool,
	mut set: impl FnMut(u32, Param))
{
	let changed = |f: &dyn Fn(&SamplerParams) -> bool| applied.map_or(true, |applied| f(applied));

	let mipmap_filter = params.mipmap_filter.filter(|_| use_mipmaps);
	let min_filter = formats::min_filter(params.min_filter, mipmap_filter);

	if changed(&|a| formats::min_filter(a.min_filter, a.mipmap_filter.filter(|_| use_mipmaps)) != min_filter) {
		set(gl::TEXTURE_MIN_FILTER, Param::Int(min_filter as i32));
	}

	if changed(&|a| a.mag_filter != params.mag_filter) {
		set(gl::TEXTURE_MAG_FILTER, Param::Int(formats::mag_filter(params.mag_filter) as i32));
	}

	if changed(&|a| a.address_mode_u != params.address_mode_u) {
		set(gl::TEXTURE_WRAP_S, Param::Int(formats::address_mode(params.address_mode_u) as i32));
	}

	if changed(&|a| a.address_mode_v != params.address_mode_v) {
		set(gl::TEXTURE_WRAP_T, Param::Int(formats::address_mode(params.address_mode_v) as i32));
	}

	// The rest doesn't exist on the baseline tier.
	if !extended {
		return
	}

	if changed(&|a| a.address_mode_w != params.address_mode_w) {
		set(gl::TEXTURE_WRAP_R, Param::Int(formats::address_mode(params.address_mode_w) as i32));
	}

	if changed(&|a| a.lod_min_clamp != params.lod_min_clamp) {
		set(gl::TEXTURE_MIN_LOD, Param::Float(params.lod_min_clamp));
	}

	if changed(&|a| a.lod_max_clamp != params.lod_max_clamp) {
		set(gl::TEXTURE_MAX_LOD, Param::Float(params.lod_max_clamp));
	}

	if changed(&|a| a.compare != params.compare) {
		match params.compare {
			Some(func) => {
				set(gl::TEXTURE_COMPARE_MODE, Param::Int(gl::COMPARE_REF_TO_TEXTURE as i32));
				set(gl::TEXTURE_COMPARE_FUNC, Param::Int(formats::compare_function(func) as i32));
			}

			None => set(gl::TEXTURE_COMPARE_MODE, Param::Int(gl::NONE as i32)),
		}
	}
}

fn set_sampler_parameter(device: &mut impl Device, name: u32, pname: u32, value: Param) {
	match value {
		Param::Int(value) => device.sampler_parameter_i(name, pname, value),
		Param::Float(value) => device.sampler_parameter_f(name, pname, value),
	}
}


impl ResourceManager {
	/// Sampler objects only exist on the extended tier, see [`Self::apply_sampler_to_texture`] otherwise.
	pub fn prepare_sampler(&mut self, device: &mut impl Device, def: &SamplerDef) -> SamplerHandle {
		let params = def.params();

		if let Some(key) = self.samplers.lookup(def.id()) {
			if let Some(object) = self.samplers.get_mut(key) {
				if object.applied != params {
					let name = object.name;
					apply_params(Some(&object.applied), &params, true, true,
						|pname, value| set_sampler_parameter(device, name, pname, value));

					object.applied = params;
				}
			}

			return key
		}

		let name = device.create_sampler();
		apply_params(None, &params, true, true,
			|pname, value| set_sampler_parameter(device, name, pname, value));

		log::debug!("Created sampler {name}");

		self.samplers.insert(def.id(), SamplerObject { name, applied: params })
	}

	pub fn sampler(&self, handle: SamplerHandle) -> Option<&SamplerObject> {
		self.samplers.get(handle)
	}

	/// Sets sampling state directly on a bound texture, skipping fields that already match
	/// whatever was last applied to it. Mip filtering is dropped for textures without mips.
	pub fn apply_sampler_to_texture(&mut self, device: &mut impl Device, texture: TextureHandle, params: &SamplerParams) {
		let extended = self.capabilities.is_extended();

		let Some(object) = self.texture_mut(texture) else {
			return
		};

		if object.applied_sampler == *params {
			return
		}

		let target = object.target;
		apply_params(Some(&object.applied_sampler), params, object.has_mipmaps, extended,
			|pname, value| match value {
				Param::Int(value) => device.tex_parameter_i(target, pname, value),
				Param::Float(value) => device.tex_parameter_f(target, pname, value),
			});

		object.applied_sampler = *params;
	}

	pub fn delete_sampler(&mut self, device: &mut impl Device, def: &SamplerDef) {
		if let Some(object) = self.samplers.remove(def.id()) {
			log::debug!("Deleted sampler {}", object.name);
			device.delete_sampler(object.name);
		}
	}
}
