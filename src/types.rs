//! Value types seen by the IR.
//!
//! Type checking happens before this crate runs, so the typer below only reads the
//! static type of an expression that is already known to be well-typed.

use std::collections::HashMap;

use crate::{
	ast::{Expr, NodeId},
	semantic::Resolution,
	symbol::{self, Symbol},
};


#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Type {
	Int,
	String,
	/// No value, the type of procedures, loops, assignments and one-armed conditionals.
	Void,
	/// A pointer to the frame of the given function declaration.
	Frame(NodeId),
}


impl Type {
	pub fn has_value(self) -> bool {
		self != Self::Void
	}
}


impl std::fmt::Display for Type {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Int => write!(f, "int"),
			Self::String => write!(f, "string"),
			Self::Void => write!(f, "void"),
			Self::Frame(function) => write!(f, "*frame{}", function),
		}
	}
}


/// The builtin type names of the language.
#[derive(Debug, Copy, Clone)]
pub struct TypeNames {
	int: Symbol,
	string: Symbol,
}


impl TypeNames {
	pub fn new(interner: &mut symbol::Interner) -> Self {
		Self {
			int: interner.get_or_intern("int"),
			string: interner.get_or_intern("string"),
		}
	}


	/// Resolve a type name. Returns None for names that denote no type.
	pub fn resolve(&self, name: Symbol) -> Option<Type> {
		if name == self.int {
			Some(Type::Int)
		} else if name == self.string {
			Some(Type::String)
		} else {
			None
		}
	}
}


/// Reads the static type of resolved expressions.
#[derive(Debug, Copy, Clone)]
pub struct Typer<'a> {
	resolution: &'a Resolution,
	variables: &'a HashMap<NodeId, Type>,
}


impl<'a> Typer<'a> {
	pub fn new(resolution: &'a Resolution, variables: &'a HashMap<NodeId, Type>) -> Self {
		Self { resolution, variables }
	}


	/// The type of a variable declaration. Panics if the variable was never typed, which
	/// means it is used before its declaration was visited.
	pub fn variable(&self, decl: NodeId) -> Type {
		*self.variables
			.get(&decl)
			.unwrap_or_else(|| panic!("variable {} used before being typed", decl))
	}


	pub fn type_of(&self, expr: &Expr) -> Type {
		match expr {
			Expr::IntegerLiteral { .. } => Type::Int,

			Expr::StringLiteral { .. } => Type::String,

			Expr::BinaryOperator { .. } => Type::Int,

			Expr::Sequence { exprs, .. } => self.type_of_last(exprs),

			Expr::Let { body, .. } => self.type_of_last(body),

			Expr::Identifier(identifier) => {
				let decl = self.resolution
					.variable(identifier.id)
					.unwrap_or_else(|| panic!("unresolved identifier {}", identifier.id));

				self.variable(decl)
			}

			Expr::IfThenElse { then, otherwise, .. } => match otherwise {
				Some(_) => self.type_of(then),
				None => Type::Void,
			},

			Expr::FunctionCall(call) => {
				let decl = self.resolution
					.call(call.id)
					.unwrap_or_else(|| panic!("unresolved call {}", call.id));

				self.resolution
					.function(decl)
					.map(|info| info.ret)
					.unwrap_or_else(|| panic!("call to undeclared function {}", decl))
			}

			Expr::WhileLoop { .. }
			| Expr::ForLoop { .. }
			| Expr::Break { .. }
			| Expr::Assign { .. } => Type::Void,
		}
	}


	fn type_of_last(&self, exprs: &[Expr]) -> Type {
		exprs
			.last()
			.map(|expr| self.type_of(expr))
			.unwrap_or(Type::Void)
	}
}
