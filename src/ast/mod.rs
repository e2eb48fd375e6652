//! The abstract syntax tree handed over by the parser.
//!
//! Nodes that later passes need to refer to (declarations, name uses, loops and breaks)
//! carry a `NodeId`. Resolution results are kept in side tables keyed by these ids, so
//! the tree itself is never mutated after construction.

mod build;
pub mod json;
mod source;

pub use crate::symbol::Symbol;
pub use build::Builder;
pub use source::SourcePos;


/// The identity of a node in the tree. Unique within a compilation run.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);


impl NodeId {
	/// Return the current id and advance to the next one.
	pub fn bump(&mut self) -> NodeId {
		let previous = *self;
		self.0 += 1;
		previous
	}
}


impl std::fmt::Display for NodeId {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "@{}", self.0)
	}
}


/// Binary operators. Unary negation is desugared to `0 - x` by the builder.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOp {
	Plus,  // +
	Minus, // -
	Times, // *
	Div,   // /

	Equals,        // =
	NotEquals,     // <>
	Lower,         // <
	LowerEquals,   // <=
	Greater,       // >
	GreaterEquals, // >=
}


impl BinaryOp {
	/// Parse the operator's source spelling.
	pub fn parse(op: &str) -> Option<Self> {
		match op {
			"+" => Some(Self::Plus),
			"-" => Some(Self::Minus),
			"*" => Some(Self::Times),
			"/" => Some(Self::Div),
			"=" => Some(Self::Equals),
			"<>" => Some(Self::NotEquals),
			"<" => Some(Self::Lower),
			"<=" => Some(Self::LowerEquals),
			">" => Some(Self::Greater),
			">=" => Some(Self::GreaterEquals),
			_ => None,
		}
	}
}


/// A use of a variable name.
#[derive(Debug)]
pub struct Identifier {
	pub id: NodeId,
	pub name: Symbol,
	pub pos: SourcePos,
}


/// A call to a named function.
#[derive(Debug)]
pub struct FunctionCall {
	pub id: NodeId,
	pub name: Symbol,
	pub args: Box<[Expr]>,
	pub pos: SourcePos,
}


/// A variable declaration. Also used for function parameters and for the control variable
/// of counting loops.
#[derive(Debug)]
pub struct VarDecl {
	pub id: NodeId,
	pub name: Symbol,
	pub init: Option<Box<Expr>>,
	pub type_name: Option<Symbol>,
	pub pos: SourcePos,
}


/// A function declaration. Primitives have no body and are external.
#[derive(Debug)]
pub struct FunDecl {
	pub id: NodeId,
	pub name: Symbol,
	pub params: Box<[VarDecl]>,
	pub body: Option<Box<Expr>>,
	/// None for procedures, which produce no value.
	pub return_type: Option<Symbol>,
	/// External functions have external linkage and take no static link.
	pub is_external: bool,
	/// The linkage name, if imposed by the declaration.
	pub external_name: Option<Symbol>,
	pub pos: SourcePos,
}


#[derive(Debug)]
pub enum Decl {
	Var(VarDecl),
	Fun(FunDecl),
}


/// Expressions of all kinds in the language.
#[derive(Debug)]
pub enum Expr {
	IntegerLiteral {
		value: i32,
		pos: SourcePos,
	},
	StringLiteral {
		value: Box<str>,
		pos: SourcePos,
	},
	BinaryOperator {
		op: BinaryOp,
		left: Box<Expr>,
		right: Box<Expr>,
		pos: SourcePos,
	},
	Sequence {
		exprs: Box<[Expr]>,
		pos: SourcePos,
	},
	/// Introduces a scope with the given declarations around the body sequence.
	Let {
		decls: Box<[Decl]>,
		body: Box<[Expr]>,
		pos: SourcePos,
	},
	Identifier(Identifier),
	IfThenElse {
		condition: Box<Expr>,
		then: Box<Expr>,
		otherwise: Option<Box<Expr>>,
		pos: SourcePos,
	},
	FunctionCall(FunctionCall),
	WhileLoop {
		id: NodeId,
		condition: Box<Expr>,
		body: Box<Expr>,
		pos: SourcePos,
	},
	/// Counting loop. The control variable's initializer is the lower bound.
	ForLoop {
		id: NodeId,
		variable: VarDecl,
		high: Box<Expr>,
		body: Box<Expr>,
		pos: SourcePos,
	},
	Break {
		id: NodeId,
		pos: SourcePos,
	},
	Assign {
		lhs: Identifier,
		rhs: Box<Expr>,
		pos: SourcePos,
	},
}


impl Expr {
	pub fn pos(&self) -> SourcePos {
		match self {
			Self::IntegerLiteral { pos, .. }
			| Self::StringLiteral { pos, .. }
			| Self::BinaryOperator { pos, .. }
			| Self::Sequence { pos, .. }
			| Self::Let { pos, .. }
			| Self::IfThenElse { pos, .. }
			| Self::WhileLoop { pos, .. }
			| Self::ForLoop { pos, .. }
			| Self::Break { pos, .. }
			| Self::Assign { pos, .. } => *pos,

			Self::Identifier(identifier) => identifier.pos,
			Self::FunctionCall(call) => call.pos,
		}
	}
}


/// The abstract syntax tree of a whole program, which is a single expression.
#[derive(Debug)]
pub struct Ast {
	pub root: Expr,
	/// The first id not used by any node in the tree.
	pub next_id: NodeId,
}
