use std::fmt::Display as _;

use super::{FieldKind, FrameLayout, Frames};
use crate::{
	ast::NodeId,
	fmt::{Display, Indentation, ILL_FORMED},
	semantic::Resolution,
	symbol,
	term::color,
};


/// Context for displaying frames. Fields are shown by source name and functions by
/// linkage name.
#[derive(Debug, Copy, Clone)]
pub struct Context<'a> {
	pub interner: &'a symbol::Interner,
	pub resolution: &'a Resolution,
}


impl<'a> Context<'a> {
	pub(crate) fn function(&self, f: &mut std::fmt::Formatter, function: NodeId) -> std::fmt::Result {
		match self.resolution.function(function) {
			Some(info) => info.linkage.fmt(f, self.interner),
			None => ILL_FORMED.fmt(f),
		}
	}
}


impl<'a> Display<'a> for FrameLayout {
	type Context = Context<'a>;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		color::Bold("frame ").fmt(f)?;
		context.function(f, self.function)?;
		writeln!(f)?;

		for (ix, field) in self.fields.iter().enumerate() {
			write!(f, "{}{}: ", Indentation(1), ix)?;

			match field.kind {
				FieldKind::StaticLink(parent) => {
					color::Fg(color::Magenta, "static link ").fmt(f)?;
					context.function(f, parent)?;
				}

				FieldKind::Variable(var) => match context.resolution.var(var) {
					Some(info) => info.name.fmt(f, context.interner)?,
					None => ILL_FORMED.fmt(f)?,
				},
			}

			writeln!(f, " : {}", color::Fg(color::Blue, field.ty))?;
		}

		Ok(())
	}
}


impl<'a> Display<'a> for Frames {
	type Context = Context<'a>;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		for layout in self.layouts() {
			layout.fmt(f, context)?;
		}

		Ok(())
	}
}
