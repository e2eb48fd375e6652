use std::collections::{HashMap, hash_map::Entry};

use super::{Error, NodeId, Symbol, SourcePos};


/// Which kind of declaration a name is bound to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeclKind {
	Variable,
	Function,
}


/// A name binding in some scope.
#[derive(Debug, Copy, Clone)]
pub struct Binding {
	pub decl: NodeId,
	pub kind: DeclKind,
	pub pos: SourcePos,
}


/// A scope stack.
#[derive(Debug, Default)]
pub struct Stack(Vec<HashMap<Symbol, Binding>>);


impl Stack {
	/// Enter a new empty scope.
	pub fn enter(&mut self) {
		self.0.push(HashMap::new());
	}


	/// Exit the current scope.
	/// Panics if the stack is empty.
	pub fn exit(&mut self) -> HashMap<Symbol, Binding> {
		self.0
			.pop()
			.expect("attempt to exit empty stack")
	}


	/// How many scopes are currently open.
	pub fn len(&self) -> usize {
		self.0.len()
	}


	/// Declares a symbol in the current scope.
	/// If the symbol was already declared in this very scope, the previous binding is kept
	/// and an error naming both positions is returned.
	/// Panics if the stack is empty.
	pub fn declare(&mut self, symbol: Symbol, binding: Binding) -> Result<(), Error> {
		let scope = self.0.last_mut().expect("empty scope stack");

		match scope.entry(symbol) {
			Entry::Vacant(entry) => {
				entry.insert(binding);
				Ok(())
			}

			Entry::Occupied(entry) => Err(
				Error::duplicate_declaration(symbol, binding.pos, entry.get().pos)
			),
		}
	}


	/// Find the innermost binding of a symbol.
	pub fn resolve(&self, symbol: Symbol, pos: SourcePos) -> Result<Binding, Error> {
		self.0
			.iter()
			.rev()
			.find_map(|scope| scope.get(&symbol))
			.copied()
			.ok_or_else(|| Error::undefined(symbol, pos))
	}
}
