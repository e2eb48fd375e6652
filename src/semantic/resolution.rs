use std::collections::HashMap;

use super::{NodeId, Symbol};
use crate::types::Type;


/// What resolution learned about a variable declaration.
#[derive(Debug, Clone)]
pub struct VarInfo {
	pub name: Symbol,
	/// Depth of the scope where the variable is declared.
	pub depth: u32,
	/// The function whose frame or locals hold the variable.
	pub owner: NodeId,
	/// Whether the variable is used from a function nested in its owner.
	pub escapes: bool,
	/// The declared type, if the declaration names one.
	pub declared: Option<Type>,
}


/// What resolution learned about a function declaration.
#[derive(Debug, Clone)]
pub struct FunInfo {
	/// The externally visible name.
	pub linkage: Symbol,
	/// Depth of the scope where the function is declared.
	pub depth: u32,
	/// Depth of the function's parameters and body.
	pub body_depth: u32,
	/// The lexically enclosing function. None for main and primitives.
	pub parent: Option<NodeId>,
	pub is_external: bool,
	pub params: Box<[NodeId]>,
	pub ret: Type,
}


/// Side table with the results of name resolution, keyed by node id.
/// The resolver is its only writer.
#[derive(Debug, Default)]
pub struct Resolution {
	/// Identifier use to variable declaration.
	variables: HashMap<NodeId, NodeId>,
	/// Call to function declaration.
	calls: HashMap<NodeId, NodeId>,
	/// Depth of the scope active at each identifier use and call.
	depths: HashMap<NodeId, u32>,
	/// Break to its innermost enclosing loop.
	breaks: HashMap<NodeId, NodeId>,
	vars: HashMap<NodeId, VarInfo>,
	funs: HashMap<NodeId, FunInfo>,
}


impl Resolution {
	/// The variable declaration an identifier use is bound to.
	pub fn variable(&self, reference: NodeId) -> Option<NodeId> {
		self.variables.get(&reference).copied()
	}


	/// The function declaration a call is bound to.
	pub fn call(&self, reference: NodeId) -> Option<NodeId> {
		self.calls.get(&reference).copied()
	}


	/// The depth recorded at an identifier use or call.
	pub fn depth(&self, reference: NodeId) -> Option<u32> {
		self.depths.get(&reference).copied()
	}


	/// The loop a break exits.
	pub fn loop_of(&self, brk: NodeId) -> Option<NodeId> {
		self.breaks.get(&brk).copied()
	}


	pub fn var(&self, decl: NodeId) -> Option<&VarInfo> {
		self.vars.get(&decl)
	}


	pub fn function(&self, decl: NodeId) -> Option<&FunInfo> {
		self.funs.get(&decl)
	}


	pub(super) fn bind_variable(&mut self, reference: NodeId, decl: NodeId, depth: u32) {
		self.variables.insert(reference, decl);
		self.depths.insert(reference, depth);

		let var = self.vars
			.get_mut(&decl)
			.expect("variable bound before being declared");

		if depth > var.depth {
			var.escapes = true;
		}
	}


	pub(super) fn bind_call(&mut self, reference: NodeId, decl: NodeId, depth: u32) {
		self.calls.insert(reference, decl);
		self.depths.insert(reference, depth);
	}


	pub(super) fn bind_break(&mut self, brk: NodeId, lp: NodeId) {
		self.breaks.insert(brk, lp);
	}


	pub(super) fn declare_var(&mut self, decl: NodeId, info: VarInfo) {
		self.vars.insert(decl, info);
	}


	pub(super) fn declare_fun(&mut self, decl: NodeId, info: FunInfo) {
		self.funs.insert(decl, info);
	}
}
