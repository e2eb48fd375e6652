use std::io;

use crate::ast::json;


/// A failure that prevents the compilation from starting or finishing its output.
#[derive(Debug)]
pub enum Failure {
	Io(io::Error),
	/// The input is not a valid AST document.
	Ast(json::Error),
}


impl From<io::Error> for Failure {
	fn from(error: io::Error) -> Self {
		Self::Io(error)
	}
}


impl From<json::Error> for Failure {
	fn from(error: json::Error) -> Self {
		Self::Ast(error)
	}
}


impl std::fmt::Display for Failure {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Io(error) => write!(f, "io error: {}", error),
			Self::Ast(error) => std::fmt::Display::fmt(error, f),
		}
	}
}


impl std::error::Error for Failure {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io(error) => Some(error),
			Self::Ast(error) => Some(error),
		}
	}
}
