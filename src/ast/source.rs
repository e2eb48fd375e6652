use std::fmt::{self, Display};


/// A human readable position in the source code, as reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePos {
	pub line: u32,
	pub column: u32,
}


impl SourcePos {
	/// Create a position from a parser-reported line and column.
	pub fn new(line: u32, column: u32) -> Self {
		Self { line, column }
	}


	/// The position of nodes that do not come from the source, such as primitives and the
	/// implicit main function.
	pub fn synthetic() -> Self {
		Self { line: 0, column: 0 }
	}


	pub fn is_synthetic(&self) -> bool {
		*self == Self::synthetic()
	}
}


impl Default for SourcePos {
	fn default() -> Self {
		Self::synthetic()
	}
}


impl Display for SourcePos {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if self.is_synthetic() {
			write!(f, "<builtin>")
		} else {
			write!(f, "line {}, column {}", self.line, self.column)
		}
	}
}
