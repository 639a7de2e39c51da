
use gl_generator::{Registry, Api, Profile, Fallbacks, GlobalGenerator};
use std::env;
use std::fs::File;
use std::path::Path;

fn main() {
	let dest = env::var("OUT_DIR").unwrap();
	let mut file = File::create(&Path::new(&dest).join("gl_bindings.rs")).unwrap();

	// GLES 3.0 is the extended tier. The extensions cover what a GLES 2.0 context
	// can still offer the baseline tier.
	// https://registry.khronos.org/OpenGL/extensions/EXT/EXT_instanced_arrays.txt
	// https://registry.khronos.org/OpenGL/extensions/OES/OES_vertex_array_object.txt
	// https://registry.khronos.org/OpenGL/extensions/EXT/EXT_occlusion_query_boolean.txt
	// https://registry.khronos.org/OpenGL/extensions/EXT/EXT_draw_buffers.txt

	Registry::new(Api::Gles2, (3, 0), Profile::Core, Fallbacks::All, [
		"GL_EXT_instanced_arrays",
		"GL_OES_vertex_array_object",
		"GL_EXT_occlusion_query_boolean",
		"GL_EXT_draw_buffers",
	])
		.write_bindings(GlobalGenerator, &mut file)
		.unwrap();
}
