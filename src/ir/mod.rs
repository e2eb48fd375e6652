//! The intermediate representation.
//!
//! Each function with a body becomes a control flow graph of basic blocks. Every block
//! holds straight-line operations and ends in exactly one terminator. Values live in
//! temporaries, in function-private locals, or in fields of frames that are
//! threaded through calls as static links.

mod builder;
pub mod fmt;
mod lower;
mod verify;
#[cfg(test)]
mod tests;

use crate::{
	ast::NodeId,
	frame::FrameLayout,
	symbol::Symbol,
	types::Type,
};
pub use builder::FunctionBuilder;
pub use lower::Generator;
pub use verify::verify;


/// A temporary, assigned exactly once.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Temp(pub u32);


/// A basic block, identified by its index in the function's block list.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);


/// A function-private storage slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LocalId(pub u32);


/// Index in the module's string pool.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StrIx(pub u32);


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Operand {
	Temp(Temp),
	/// The incoming value of a parameter. For internal functions, parameter 0 is the
	/// static link.
	Param(u32),
	Int(i32),
	Str(StrIx),
}


/// A storage address.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Place {
	Local(LocalId),
	/// A field in the frame pointed to by `frame`, whose layout belongs to `layout`.
	Field {
		frame: Operand,
		layout: NodeId,
		field: u32,
	},
}


#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinOp {
	Add,
	Sub,
	Mul,
	/// Signed division.
	Div,
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
}


/// Straight-line operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
	/// Allocate the frame of the current function.
	FrameAlloc {
		dst: Temp,
		layout: NodeId,
	},
	Load {
		dst: Temp,
		place: Place,
	},
	Store {
		place: Place,
		value: Operand,
	},
	/// Comparisons produce 0 or 1.
	Binary {
		dst: Temp,
		op: BinOp,
		left: Operand,
		right: Operand,
	},
	/// Calls by linkage name. Procedures have no destination.
	Call {
		dst: Option<Temp>,
		callee: Symbol,
		args: Box<[Operand]>,
	},
}


#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
	Branch(BlockId),
	/// Branch to `then` if `cond` is nonzero.
	CondBranch {
		cond: Operand,
		then: BlockId,
		otherwise: BlockId,
	},
	Return(Option<Operand>),
}


impl Terminator {
	pub fn successors(&self) -> Vec<BlockId> {
		match self {
			Self::Branch(target) => vec![*target],
			Self::CondBranch { then, otherwise, .. } => vec![*then, *otherwise],
			Self::Return(_) => Vec::new(),
		}
	}
}


#[derive(Debug, Clone, PartialEq)]
pub struct Block {
	pub id: BlockId,
	/// The role of the block in the lowered construct, like `loop_test`.
	pub label: &'static str,
	pub ops: Vec<Op>,
	pub terminator: Terminator,
}


#[derive(Debug, Clone, PartialEq)]
pub struct Local {
	/// The variable stored in the slot. Shared result slots of conditionals are unnamed.
	pub name: Option<Symbol>,
	pub ty: Type,
}


/// A callable signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
	pub decl: NodeId,
	/// The linkage name.
	pub name: Symbol,
	/// Includes the static link, if any.
	pub params: Box<[Type]>,
	pub ret: Type,
	pub is_external: bool,
}


impl Signature {
	pub fn has_static_link(&self) -> bool {
		!self.is_external
	}
}


#[derive(Debug, Clone, PartialEq)]
pub struct Function {
	pub signature: Signature,
	pub frame: FrameLayout,
	pub locals: Vec<Local>,
	/// The entry block is the first.
	pub blocks: Vec<Block>,
	/// Number of temporaries.
	pub temps: u32,
}


impl Function {
	#[cfg(test)]
	pub fn entry(&self) -> &Block {
		&self.blocks[0]
	}


	#[cfg(test)]
	pub fn block(&self, id: BlockId) -> &Block {
		&self.blocks[id.0 as usize]
	}
}


/// A lowered program.
#[derive(Debug, Default)]
pub struct Module {
	/// Generated functions, in generation order. Main is the first.
	pub functions: Vec<Function>,
	/// Signatures of the called functions that have no body.
	pub externals: Vec<Signature>,
	/// Pooled string literals.
	pub strings: Vec<Box<str>>,
}


#[cfg(test)]
impl Module {
	pub fn function(&self, name: Symbol) -> Option<&Function> {
		self.functions
			.iter()
			.find(|function| function.signature.name == name)
	}


	pub fn string(&self, ix: StrIx) -> &str {
		&self.strings[ix.0 as usize]
	}
}
