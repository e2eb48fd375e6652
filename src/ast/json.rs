//! The JSON interchange format produced by the external parser.
//!
//! Nodes are objects tagged by `kind`, optionally carrying `"pos": [line, column]`.

use serde::Deserialize;

use super::{Ast, BinaryOp, Builder, Decl, Expr, VarDecl};
use crate::symbol;


#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
	Int {
		value: i32,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	String {
		value: String,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	Binary {
		op: String,
		left: Box<Node>,
		right: Box<Node>,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	Neg {
		operand: Box<Node>,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	Seq {
		exprs: Vec<Node>,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	Let {
		decls: Vec<DeclNode>,
		body: Vec<Node>,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	Id {
		name: String,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	If {
		condition: Box<Node>,
		then: Box<Node>,
		#[serde(default, rename = "else")]
		otherwise: Option<Box<Node>>,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	Call {
		name: String,
		#[serde(default)]
		args: Vec<Node>,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	While {
		condition: Box<Node>,
		body: Box<Node>,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	For {
		variable: String,
		low: Box<Node>,
		high: Box<Node>,
		body: Box<Node>,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	Break {
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	Assign {
		name: String,
		value: Box<Node>,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
}


#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DeclNode {
	Var {
		name: String,
		#[serde(default, rename = "type")]
		type_name: Option<String>,
		#[serde(default)]
		init: Option<Box<Node>>,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
	Function {
		name: String,
		#[serde(default)]
		params: Vec<ParamNode>,
		#[serde(default)]
		return_type: Option<String>,
		#[serde(default)]
		body: Option<Box<Node>>,
		#[serde(default)]
		external: bool,
		#[serde(default)]
		pos: Option<(u32, u32)>,
	},
}


#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamNode {
	name: String,
	/// Untyped parameters are integers.
	#[serde(default, rename = "type")]
	type_name: Option<String>,
	#[serde(default)]
	pos: Option<(u32, u32)>,
}


/// An error in the interchange document.
#[derive(Debug)]
pub enum Error {
	/// The document is not valid JSON or does not match the node schema.
	Json(serde_json::Error),
	/// An operator spelling that does not exist in the language.
	UnknownOperator(Box<str>),
}


impl From<serde_json::Error> for Error {
	fn from(error: serde_json::Error) -> Self {
		Self::Json(error)
	}
}


impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Json(error) => write!(f, "malformed AST: {}", error),
			Self::UnknownOperator(op) => write!(f, "malformed AST: unknown operator '{}'", op),
		}
	}
}


impl std::error::Error for Error { }


/// Read a whole program from its JSON representation.
pub fn read<R>(reader: R, interner: &mut symbol::Interner) -> Result<Ast, Error>
where
	R: std::io::Read,
{
	let node: Node = serde_json::from_reader(reader)?;
	let builder = Builder::new(interner);
	let root = convert(node, &builder)?;
	Ok(builder.finish(root))
}


/// Read a whole program from a JSON string.
pub fn from_str(input: &str, interner: &mut symbol::Interner) -> Result<Ast, Error> {
	read(input.as_bytes(), interner)
}


fn place(builder: &Builder, pos: Option<(u32, u32)>) {
	let (line, column) = pos.unwrap_or((0, 0));
	builder.at(line, column);
}


fn convert_all(nodes: Vec<Node>, builder: &Builder) -> Result<Vec<Expr>, Error> {
	nodes
		.into_iter()
		.map(|node| convert(node, builder))
		.collect()
}


fn convert_boxed(node: Option<Box<Node>>, builder: &Builder) -> Result<Option<Expr>, Error> {
	node
		.map(|node| convert(*node, builder))
		.transpose()
}


// Children are converted before their parent, so the position must be placed right
// before the parent node is built.
fn convert(node: Node, builder: &Builder) -> Result<Expr, Error> {
	let expr = match node {
		Node::Int { value, pos } => {
			place(builder, pos);
			builder.int(value)
		}

		Node::String { value, pos } => {
			place(builder, pos);
			builder.string(&value)
		}

		Node::Binary { op, left, right, pos } => {
			let op = BinaryOp::parse(&op)
				.ok_or_else(|| Error::UnknownOperator(op.into_boxed_str()))?;
			let left = convert(*left, builder)?;
			let right = convert(*right, builder)?;
			place(builder, pos);
			builder.binary(op, left, right)
		}

		Node::Neg { operand, pos } => {
			let operand = convert(*operand, builder)?;
			place(builder, pos);
			builder.neg(operand)
		}

		Node::Seq { exprs, pos } => {
			let exprs = convert_all(exprs, builder)?;
			place(builder, pos);
			builder.seq(exprs)
		}

		Node::Let { decls, body, pos } => {
			let decls = decls
				.into_iter()
				.map(|decl| convert_decl(decl, builder))
				.collect::<Result<Vec<_>, _>>()?;
			let body = convert_all(body, builder)?;
			place(builder, pos);
			builder.let_(decls, body)
		}

		Node::Id { name, pos } => {
			place(builder, pos);
			builder.id(&name)
		}

		Node::If { condition, then, otherwise, pos } => {
			let condition = convert(*condition, builder)?;
			let then = convert(*then, builder)?;
			let otherwise = convert_boxed(otherwise, builder)?;
			place(builder, pos);
			builder.if_(condition, then, otherwise)
		}

		Node::Call { name, args, pos } => {
			let args = convert_all(args, builder)?;
			place(builder, pos);
			builder.call(&name, args)
		}

		Node::While { condition, body, pos } => {
			let condition = convert(*condition, builder)?;
			let body = convert(*body, builder)?;
			place(builder, pos);
			builder.while_(condition, body)
		}

		Node::For { variable, low, high, body, pos } => {
			let low = convert(*low, builder)?;
			let high = convert(*high, builder)?;
			let body = convert(*body, builder)?;
			place(builder, pos);
			builder.for_(&variable, low, high, body)
		}

		Node::Break { pos } => {
			place(builder, pos);
			builder.break_()
		}

		Node::Assign { name, value, pos } => {
			let value = convert(*value, builder)?;
			place(builder, pos);
			builder.assign(&name, value)
		}
	};

	Ok(expr)
}


fn convert_decl(decl: DeclNode, builder: &Builder) -> Result<Decl, Error> {
	match decl {
		DeclNode::Var { name, type_name, init, pos } => {
			let init = convert_boxed(init, builder)?;
			place(builder, pos);
			Ok(Decl::Var(builder.var_decl(&name, type_name.as_deref(), init)))
		}

		DeclNode::Function { name, params, return_type, body, external, pos } => {
			let params: Vec<VarDecl> = params
				.into_iter()
				.map(
					|param| {
						place(builder, param.pos);
						builder.var_decl(&param.name, param.type_name.as_deref(), None)
					}
				)
				.collect();
			let body = convert_boxed(body, builder)?;
			place(builder, pos);

			let mut decl = builder.fun_decl(&name, params, return_type.as_deref(), body);
			decl.is_external = external;
			Ok(Decl::Fun(decl))
		}
	}
}
