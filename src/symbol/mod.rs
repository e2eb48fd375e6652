mod fmt;

use intaglio::{Symbol as SymbolInner, SymbolTable};


/// An interned identifier, type name or linkage name. Symbols from the same interner are
/// equal iff their strings are.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Symbol(SymbolInner);


/// Owns every name of a compilation run. Linkage names are added during resolution, so
/// the interner is borrowed mutably until the program is analyzed.
#[derive(Debug)]
pub struct Interner(SymbolTable);


impl Interner {
	pub fn new() -> Self {
		Self(SymbolTable::new())
	}


	/// Intern a name, reusing the existing symbol when there is one.
	pub fn get_or_intern<T>(&mut self, name: T) -> Symbol
	where
		T: AsRef<str>,
	{
		let name = name.as_ref();

		match self.0.check_interned(name) {
			Some(symbol) => Symbol(symbol),
			None => Symbol(
				self.0
					.intern(name.to_owned())
					.expect("symbol table overflow")
			),
		}
	}


	pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
		self.0.get(symbol.0)
	}


	/// Look a name up without interning it.
	#[cfg(test)]
	pub fn get(&self, name: &str) -> Option<Symbol> {
		self.0.check_interned(name).map(Symbol)
	}


	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.0.len()
	}
}


impl Default for Interner {
	fn default() -> Self {
		Self::new()
	}
}
