mod fmt;

use super::{Symbol, SourcePos};
pub use fmt::ErrorsDisplayContext;


/// Binding errors, in the order they were found.
#[derive(Debug, Default)]
pub struct Errors(Vec<Error>);


impl Errors {
	pub fn push(&mut self, error: Error) {
		self.0.push(error)
	}


	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}


	pub fn len(&self) -> usize {
		self.0.len()
	}


	#[cfg(test)]
	pub fn iter(&self) -> std::slice::Iter<Error> {
		self.0.iter()
	}
}


#[derive(Debug)]
pub enum ErrorKind {
	/// No enclosing scope declares the name.
	Undefined(Symbol),
	/// A second declaration of a name in the same scope, parameter lists included. The
	/// first one stays in effect.
	DuplicateDeclaration {
		symbol: Symbol,
		previous: SourcePos,
	},
	/// A function name used as a variable.
	NotAVariable {
		symbol: Symbol,
		declared: SourcePos,
	},
	/// A variable name used as a function.
	NotAFunction {
		symbol: Symbol,
		declared: SourcePos,
	},
	/// A name declared outside the enclosing external function, whose frame has no static
	/// link to reach it.
	OutsideExternalFunction {
		symbol: Symbol,
		declared: SourcePos,
	},
	/// Break with no loop between it and the enclosing function.
	BreakOutsideLoop,
	/// A type name other than int and string.
	UnknownType(Symbol),
}


#[derive(Debug)]
pub struct Error {
	pub kind: ErrorKind,
	pub pos: SourcePos,
}


impl Error {
	pub fn undefined(symbol: Symbol, pos: SourcePos) -> Self {
		Self { kind: ErrorKind::Undefined(symbol), pos }
	}


	pub fn duplicate_declaration(symbol: Symbol, pos: SourcePos, previous: SourcePos) -> Self {
		Self { kind: ErrorKind::DuplicateDeclaration { symbol, previous }, pos }
	}


	pub fn not_a_variable(symbol: Symbol, pos: SourcePos, declared: SourcePos) -> Self {
		Self { kind: ErrorKind::NotAVariable { symbol, declared }, pos }
	}


	pub fn not_a_function(symbol: Symbol, pos: SourcePos, declared: SourcePos) -> Self {
		Self { kind: ErrorKind::NotAFunction { symbol, declared }, pos }
	}


	pub fn outside_external_function(symbol: Symbol, pos: SourcePos, declared: SourcePos) -> Self {
		Self { kind: ErrorKind::OutsideExternalFunction { symbol, declared }, pos }
	}


	pub fn break_outside_loop(pos: SourcePos) -> Self {
		Self { kind: ErrorKind::BreakOutsideLoop, pos }
	}


	pub fn unknown_type(symbol: Symbol, pos: SourcePos) -> Self {
		Self { kind: ErrorKind::UnknownType(symbol), pos }
	}
}
