use std::fmt::Display as _;

use super::{Errors, Error, ErrorKind};
use crate::{
	fmt::{self, Display},
	symbol::{Interner, Symbol},
	term::color
};


#[derive(Debug, Copy, Clone)]
pub struct ErrorsDisplayContext<'a> {
	/// Errors past this count are summarized in a single line.
	pub max_errors: Option<usize>,
	pub interner: &'a Interner,
}


impl<'a> Display<'a> for ErrorKind {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, interner: Self::Context) -> std::fmt::Result {
		let quoted = |symbol: &Symbol, f: &mut std::fmt::Formatter| {
			write!(f, "'{}'", fmt::Show(symbol, interner))
		};

		match self {
			Self::Undefined(symbol) => {
				quoted(symbol, f)?;
				" is not declared in any enclosing scope".fmt(f)
			}

			Self::DuplicateDeclaration { symbol, previous } => {
				quoted(symbol, f)?;
				write!(f, " is declared twice in the same scope, first at {}", previous)
			}

			Self::NotAVariable { symbol, declared } => {
				quoted(symbol, f)?;
				write!(f, " names the function declared at {}, not a variable", declared)
			}

			Self::NotAFunction { symbol, declared } => {
				quoted(symbol, f)?;
				write!(f, " names the variable declared at {}, not a function", declared)
			}

			Self::OutsideExternalFunction { symbol, declared } => {
				quoted(symbol, f)?;
				write!(
					f,
					" is declared at {}, outside the enclosing external function",
					declared,
				)
			}

			Self::BreakOutsideLoop => "break is not inside a loop of this function".fmt(f),

			Self::UnknownType(symbol) => {
				"unknown type ".fmt(f)?;
				quoted(symbol, f)
			}
		}
	}
}


impl<'a> Display<'a> for Error {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, interner: Self::Context) -> std::fmt::Result {
		write!(f, "{} at {}: ", color::Fg(color::Red, "Error"), self.pos)?;
		self.kind.fmt(f, interner)
	}
}


impl<'a> Display<'a> for Errors {
	type Context = ErrorsDisplayContext<'a>;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		let shown = context.max_errors.unwrap_or(self.len()).min(self.len());

		for error in &self.0[.. shown] {
			writeln!(f, "{}", fmt::Show(error, context.interner))?;
		}

		if shown < self.len() {
			writeln!(
				f,
				"{}",
				color::Fg(color::Red, format_args!("{} more binding errors suppressed", self.len() - shown)),
			)?;
		}

		Ok(())
	}
}
