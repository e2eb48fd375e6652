automod::dir!("src/semantic/primitives");


/// The signature of a function provided by the runtime library.
/// Type names are spelled as in source code; None as return type means no value.
#[derive(Debug)]
pub struct Primitive {
	pub name: &'static str,
	pub params: &'static [&'static str],
	pub ret: Option<&'static str>,
}


impl Primitive {
	/// The linkage name the runtime library exports.
	pub fn linkage(&self) -> String {
		format!("__{}", self.name)
	}
}


inventory::collect!(Primitive);


/// All registered primitives, sorted by name so that declaration order is stable.
pub fn all() -> Vec<&'static Primitive> {
	let mut primitives: Vec<_> = inventory::iter::<Primitive>
		.into_iter()
		.collect();

	primitives.sort_by_key(|primitive| primitive.name);

	primitives
}
