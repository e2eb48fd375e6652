use std::cell::{Cell, RefCell};

use super::{
	Ast,
	BinaryOp,
	Decl,
	Expr,
	FunDecl,
	FunctionCall,
	Identifier,
	NodeId,
	SourcePos,
	Symbol,
	VarDecl,
};
use crate::symbol;


/// Construction API for the tree, used by the JSON reader and by tests.
/// Every method takes `&self` so that nodes may be built in nested calls. Each node gets
/// a fresh id and the position set by the last call to `at`.
pub struct Builder<'a> {
	interner: RefCell<&'a mut symbol::Interner>,
	next_id: Cell<NodeId>,
	pos: Cell<SourcePos>,
}


impl<'a> Builder<'a> {
	pub fn new(interner: &'a mut symbol::Interner) -> Self {
		Self {
			interner: RefCell::new(interner),
			next_id: Cell::new(NodeId(0)),
			pos: Cell::new(SourcePos::synthetic()),
		}
	}


	/// Set the position of the nodes built from now on.
	pub fn at(&self, line: u32, column: u32) -> &Self {
		self.pos.set(SourcePos::new(line, column));
		self
	}


	/// Close the tree with the given root expression.
	pub fn finish(self, root: Expr) -> Ast {
		Ast { root, next_id: self.next_id.get() }
	}


	pub fn symbol(&self, name: &str) -> Symbol {
		self.interner
			.borrow_mut()
			.get_or_intern(name)
	}


	fn fresh_id(&self) -> NodeId {
		let mut id = self.next_id.get();
		let fresh = id.bump();
		self.next_id.set(id);
		fresh
	}


	fn pos(&self) -> SourcePos {
		self.pos.get()
	}


	pub fn int(&self, value: i32) -> Expr {
		Expr::IntegerLiteral { value, pos: self.pos() }
	}


	pub fn string(&self, value: &str) -> Expr {
		Expr::StringLiteral { value: value.into(), pos: self.pos() }
	}


	pub fn binary(&self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
		Expr::BinaryOperator {
			op,
			left: Box::new(left),
			right: Box::new(right),
			pos: self.pos(),
		}
	}


	/// Unary negation, desugared as `0 - operand`.
	pub fn neg(&self, operand: Expr) -> Expr {
		self.binary(BinaryOp::Minus, self.int(0), operand)
	}


	pub fn seq(&self, exprs: Vec<Expr>) -> Expr {
		Expr::Sequence { exprs: exprs.into(), pos: self.pos() }
	}


	pub fn let_(&self, decls: Vec<Decl>, body: Vec<Expr>) -> Expr {
		Expr::Let {
			decls: decls.into(),
			body: body.into(),
			pos: self.pos(),
		}
	}


	pub fn identifier(&self, name: &str) -> Identifier {
		Identifier {
			id: self.fresh_id(),
			name: self.symbol(name),
			pos: self.pos(),
		}
	}


	pub fn id(&self, name: &str) -> Expr {
		Expr::Identifier(self.identifier(name))
	}


	pub fn if_(&self, condition: Expr, then: Expr, otherwise: Option<Expr>) -> Expr {
		Expr::IfThenElse {
			condition: Box::new(condition),
			then: Box::new(then),
			otherwise: otherwise.map(Box::new),
			pos: self.pos(),
		}
	}


	pub fn var_decl(&self, name: &str, type_name: Option<&str>, init: Option<Expr>) -> VarDecl {
		VarDecl {
			id: self.fresh_id(),
			name: self.symbol(name),
			init: init.map(Box::new),
			type_name: type_name.map(|name| self.symbol(name)),
			pos: self.pos(),
		}
	}


	/// A variable declaration with an initializer.
	#[cfg(test)]
	pub fn var(&self, name: &str, type_name: Option<&str>, init: Expr) -> Decl {
		Decl::Var(self.var_decl(name, type_name, Some(init)))
	}


	/// A function parameter.
	#[cfg(test)]
	pub fn param(&self, name: &str, type_name: &str) -> VarDecl {
		self.var_decl(name, Some(type_name), None)
	}


	pub fn fun_decl(
		&self,
		name: &str,
		params: Vec<VarDecl>,
		return_type: Option<&str>,
		body: Option<Expr>,
	) -> FunDecl {
		FunDecl {
			id: self.fresh_id(),
			name: self.symbol(name),
			params: params.into(),
			body: body.map(Box::new),
			return_type: return_type.map(|name| self.symbol(name)),
			is_external: false,
			external_name: None,
			pos: self.pos(),
		}
	}


	/// A function declaration with a body.
	#[cfg(test)]
	pub fn function(
		&self,
		name: &str,
		params: Vec<VarDecl>,
		return_type: Option<&str>,
		body: Expr,
	) -> Decl {
		Decl::Fun(self.fun_decl(name, params, return_type, Some(body)))
	}


	pub fn call(&self, name: &str, args: Vec<Expr>) -> Expr {
		Expr::FunctionCall(
			FunctionCall {
				id: self.fresh_id(),
				name: self.symbol(name),
				args: args.into(),
				pos: self.pos(),
			}
		)
	}


	pub fn while_(&self, condition: Expr, body: Expr) -> Expr {
		Expr::WhileLoop {
			id: self.fresh_id(),
			condition: Box::new(condition),
			body: Box::new(body),
			pos: self.pos(),
		}
	}


	/// `for variable := low to high do body`. The control variable is an int.
	pub fn for_(&self, variable: &str, low: Expr, high: Expr, body: Expr) -> Expr {
		Expr::ForLoop {
			id: self.fresh_id(),
			variable: self.var_decl(variable, Some("int"), Some(low)),
			high: Box::new(high),
			body: Box::new(body),
			pos: self.pos(),
		}
	}


	pub fn break_(&self) -> Expr {
		Expr::Break { id: self.fresh_id(), pos: self.pos() }
	}


	pub fn assign(&self, name: &str, rhs: Expr) -> Expr {
		Expr::Assign {
			lhs: self.identifier(name),
			rhs: Box::new(rhs),
			pos: self.pos(),
		}
	}
}
