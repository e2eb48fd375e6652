use std::fmt::Display as _;

use super::{Interner, Symbol};
use crate::{
	fmt::{Display, ILL_FORMED},
	term::color,
};


impl<'a> Display<'a> for Symbol {
	type Context = &'a Interner;

	/// Names from another interner print as ill-formed.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>, interner: Self::Context) -> std::fmt::Result {
		match interner.resolve(*self) {
			Some(name) => color::Fg(color::Green, name).fmt(f),
			None => ILL_FORMED.fmt(f),
		}
	}
}
