//! Frame layouts.
//!
//! Every function with a body gets a frame, allocated on entry. The frame holds the static
//! link, a pointer to the frame of the lexically enclosing function, and the variables
//! that nested functions may access through it. Variables that do not escape stay out of
//! the frame.

pub mod fmt;

use std::collections::HashMap;

use crate::{
	ast::{Decl, Expr, FunDecl, NodeId, VarDecl},
	semantic::{Program, Resolution},
	types::{Type, Typer},
};


/// What a frame field holds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldKind {
	/// Pointer to the frame of the given function.
	StaticLink(NodeId),
	/// An escaping variable.
	Variable(NodeId),
}


#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Field {
	pub kind: FieldKind,
	pub ty: Type,
}


/// The layout of a function's frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
	pub function: NodeId,
	/// The function whose frame the static link points to. When present, the static link
	/// is field 0.
	pub static_link: Option<NodeId>,
	pub fields: Vec<Field>,
}


impl FrameLayout {
	fn new(function: NodeId, static_link: Option<NodeId>) -> Self {
		let fields = static_link
			.map(
				|parent| Field {
					kind: FieldKind::StaticLink(parent),
					ty: Type::Frame(parent),
				}
			)
			.into_iter()
			.collect();

		Self { function, static_link, fields }
	}


	/// The field index of an escaping variable.
	pub fn field_of(&self, var: NodeId) -> Option<u32> {
		self.fields
			.iter()
			.position(|field| field.kind == FieldKind::Variable(var))
			.map(|ix| ix as u32)
	}


	pub fn len(&self) -> usize {
		self.fields.len()
	}


	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}


	fn push(&mut self, var: NodeId, ty: Type) {
		self.fields.push(Field { kind: FieldKind::Variable(var), ty });
	}
}


/// Frame layouts of all functions, and the type of every variable.
#[derive(Debug, Default)]
pub struct Frames {
	layouts: HashMap<NodeId, FrameLayout>,
	/// Functions in the order their layouts were created.
	order: Vec<NodeId>,
	var_types: HashMap<NodeId, Type>,
}


impl Frames {
	/// Compute the frames of a resolved program. A function's layout is created before the
	/// layouts of the functions nested in it.
	pub fn compute(program: &Program) -> Self {
		let mut walker = Walker {
			resolution: &program.resolution,
			frames: Frames::default(),
		};

		for primitive in program.primitives.iter() {
			walker.function(primitive);
		}

		walker.function(&program.main);

		tracing::debug!(frames = walker.frames.order.len(), "computed frame layouts");

		walker.frames
	}


	pub fn layout(&self, function: NodeId) -> Option<&FrameLayout> {
		self.layouts.get(&function)
	}


	/// All layouts, outer functions first.
	pub fn layouts(&self) -> impl Iterator<Item = &FrameLayout> {
		self.order
			.iter()
			.filter_map(move |function| self.layouts.get(function))
	}


	pub fn var_type(&self, var: NodeId) -> Option<Type> {
		self.var_types.get(&var).copied()
	}


	/// A typer over the variable types computed here.
	pub fn typer<'a>(&'a self, resolution: &'a Resolution) -> Typer<'a> {
		Typer::new(resolution, &self.var_types)
	}
}


/// Walks the tree in textual order, building the frames.
struct Walker<'a> {
	resolution: &'a Resolution,
	frames: Frames,
}


impl<'a> Walker<'a> {
	fn function(&mut self, decl: &FunDecl) {
		let info = self.resolution
			.function(decl.id)
			.expect("function was not resolved");

		if decl.body.is_some() {
			let static_link = if info.is_external { None } else { info.parent };

			self.frames.layouts.insert(decl.id, FrameLayout::new(decl.id, static_link));
			self.frames.order.push(decl.id);
		}

		for param in decl.params.iter() {
			let ty = self.resolution
				.var(param.id)
				.and_then(|var| var.declared)
				.unwrap_or(Type::Int);

			self.variable(param, ty);
		}

		if let Some(body) = &decl.body {
			self.expr(body);
		}
	}


	/// Record the type of a variable and, if it escapes, append it to its owner's frame.
	fn variable(&mut self, decl: &VarDecl, ty: Type) {
		self.frames.var_types.insert(decl.id, ty);

		let var = self.resolution
			.var(decl.id)
			.expect("variable was not resolved");

		if var.escapes {
			self.frames.layouts
				.get_mut(&var.owner)
				.expect("escaping variable owned by a function without frame")
				.push(decl.id, ty);
		}
	}


	fn var_decl(&mut self, decl: &VarDecl) {
		if let Some(init) = &decl.init {
			self.expr(init);
		}

		let declared = self.resolution
			.var(decl.id)
			.and_then(|var| var.declared);

		let ty = match (declared, &decl.init) {
			(Some(ty), _) => ty,
			(None, Some(init)) => Typer::new(self.resolution, &self.frames.var_types).type_of(init),
			(None, None) => Type::Int,
		};

		self.variable(decl, ty);
	}


	fn expr(&mut self, expr: &Expr) {
		match expr {
			Expr::IntegerLiteral { .. }
			| Expr::StringLiteral { .. }
			| Expr::Identifier(_)
			| Expr::Break { .. } => (),

			Expr::BinaryOperator { left, right, .. } => {
				self.expr(left);
				self.expr(right);
			}

			Expr::Sequence { exprs: body, .. } => self.exprs(body),

			Expr::Let { decls, body, .. } => {
				for decl in decls.iter() {
					match decl {
						Decl::Var(decl) => self.var_decl(decl),
						Decl::Fun(decl) => self.function(decl),
					}
				}

				self.exprs(body);
			}

			Expr::IfThenElse { condition, then, otherwise, .. } => {
				self.expr(condition);
				self.expr(then);

				if let Some(otherwise) = otherwise {
					self.expr(otherwise);
				}
			}

			Expr::FunctionCall(call) => self.exprs(&call.args),

			Expr::WhileLoop { condition, body, .. } => {
				self.expr(condition);
				self.expr(body);
			}

			Expr::ForLoop { variable, high, body, .. } => {
				if let Some(low) = &variable.init {
					self.expr(low);
				}
				self.expr(high);

				self.variable(variable, Type::Int);

				self.expr(body);
			}

			Expr::Assign { rhs, .. } => self.expr(rhs),
		}
	}


	fn exprs(&mut self, exprs: &[Expr]) {
		for expr in exprs {
			self.expr(expr);
		}
	}
}
