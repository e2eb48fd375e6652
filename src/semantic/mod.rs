//! Name resolution.
//!
//! Binds every identifier, call and break to its declaration, computes the depth of every
//! declaration and use, and marks the variables that escape into nested functions.
//! Errors are collected so that a single run reports as many as possible.

mod error;
pub mod primitives;
mod resolution;
mod scope;
#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use crate::{
	ast::{Ast, Decl, Expr, FunDecl, FunctionCall, Identifier, NodeId, SourcePos, VarDecl},
	symbol::{self, Symbol},
	types::{Type, TypeNames},
};
pub use error::{Error, ErrorKind, Errors, ErrorsDisplayContext};
use primitives::Primitive;
pub use resolution::{FunInfo, Resolution, VarInfo};
use scope::{Binding, DeclKind};


/// A program whose names are all successfully resolved. Owns the tree.
#[derive(Debug)]
pub struct Program {
	/// The implicit entry function wrapping the whole program.
	pub main: FunDecl,
	/// The runtime library declarations.
	pub primitives: Box<[FunDecl]>,
	pub resolution: Resolution,
	primitive_names: HashMap<&'static str, NodeId>,
}


impl Program {
	/// Get the primitive with the given declaration id.
	pub fn primitive(&self, decl: NodeId) -> Option<&FunDecl> {
		self.primitives
			.iter()
			.find(|primitive| primitive.id == decl)
	}


	/// Get a primitive by its source name.
	pub fn primitive_named(&self, name: &str) -> Option<&FunDecl> {
		self.primitive_names
			.get(name)
			.and_then(|decl| self.primitive(*decl))
	}
}


/// The name resolution pass.
#[derive(Debug)]
pub struct Analyzer;


impl Analyzer {
	/// Resolve a whole program. The root expression is wrapped in the implicit main
	/// function. Fails if any binding error is found.
	pub fn analyze(ast: Ast, interner: &mut symbol::Interner) -> Result<Program, Errors> {
		let Ast { root, mut next_id } = ast;
		let types = TypeNames::new(interner);

		let mut primitive_names = HashMap::new();
		let primitives: Box<[FunDecl]> = primitives::all()
			.into_iter()
			.map(
				|primitive| {
					let decl = synthesize_primitive(primitive, &mut next_id, interner);
					primitive_names.insert(primitive.name, decl.id);
					decl
				}
			)
			.collect();

		let main = synthesize_main(root, &mut next_id, interner);

		let mut scope = scope::Stack::default();
		let mut resolution = Resolution::default();
		let mut errors = Errors::default();
		let mut linkages = HashSet::new();

		tracing::debug!(primitives = primitives.len(), "resolving names");

		{
			let mut context = Context::new(
				&mut scope,
				&mut resolution,
				&mut errors,
				&mut linkages,
				interner,
				types,
			);

			for primitive in primitives.iter() {
				declare_function(primitive, &mut context);
			}

			declare_main(&main, &mut context);
			analyze_function(&main, &mut context);
		}

		debug_assert_eq!(scope.len(), 0);

		if errors.is_empty() {
			tracing::debug!("name resolution succeeded");

			Ok(
				Program {
					main,
					primitives,
					resolution,
					primitive_names,
				}
			)
		} else {
			tracing::debug!(errors = errors.len(), "name resolution failed");

			Err(errors)
		}
	}
}


fn synthesize_primitive(
	primitive: &Primitive,
	next_id: &mut NodeId,
	interner: &mut symbol::Interner,
) -> FunDecl {
	let pos = SourcePos::synthetic();

	let params: Box<[VarDecl]> = primitive.params
		.iter()
		.enumerate()
		.map(
			|(ix, type_name)| VarDecl {
				id: next_id.bump(),
				name: interner.get_or_intern(format!("a_{}", ix)),
				init: None,
				type_name: Some(interner.get_or_intern(type_name)),
				pos,
			}
		)
		.collect();

	FunDecl {
		id: next_id.bump(),
		name: interner.get_or_intern(primitive.name),
		params,
		body: None,
		return_type: primitive.ret.map(|name| interner.get_or_intern(name)),
		is_external: true,
		external_name: Some(interner.get_or_intern(primitive.linkage())),
		pos,
	}
}


/// Wrap the program in `function main(): int = (root; 0)`.
fn synthesize_main(
	root: Expr,
	next_id: &mut NodeId,
	interner: &mut symbol::Interner,
) -> FunDecl {
	let pos = SourcePos::synthetic();
	let main = interner.get_or_intern("main");

	let body = Expr::Sequence {
		exprs: vec![root, Expr::IntegerLiteral { value: 0, pos }].into(),
		pos,
	};

	FunDecl {
		id: next_id.bump(),
		name: main,
		params: Box::default(),
		body: Some(Box::new(body)),
		return_type: Some(interner.get_or_intern("int")),
		is_external: true,
		external_name: Some(main),
		pos,
	}
}


fn declare_main(main: &FunDecl, context: &mut Context) {
	let linkage = main.external_name.unwrap_or(main.name);
	context.linkages.insert(linkage);

	context.resolution.declare_fun(
		main.id,
		FunInfo {
			linkage,
			depth: 0,
			// The program's top level is depth 0 as well.
			body_depth: 0,
			parent: None,
			is_external: true,
			params: Box::default(),
			ret: Type::Int,
		}
	);
}


/// Enter a function into the current scope and record its signature. Parameters are
/// recorded too, as their types are part of the signature.
fn declare_function(decl: &FunDecl, context: &mut Context) {
	let depth = context.depth;
	let body_depth = depth + 1;
	let linkage = linkage_name(decl, context);

	let ret = match decl.return_type {
		Some(name) => context.resolve_type(name, decl.pos).unwrap_or(Type::Void),
		None => Type::Void,
	};

	for param in decl.params.iter() {
		let declared = param.type_name
			.and_then(|name| context.resolve_type(name, param.pos));

		context.resolution.declare_var(
			param.id,
			VarInfo {
				name: param.name,
				depth: body_depth,
				owner: decl.id,
				escapes: false,
				declared,
			}
		);
	}

	context.resolution.declare_fun(
		decl.id,
		FunInfo {
			linkage,
			depth,
			body_depth,
			parent: context.function,
			is_external: decl.is_external,
			params: decl.params.iter().map(|param| param.id).collect(),
			ret,
		}
	);

	context.declare(
		decl.name,
		Binding { decl: decl.id, kind: DeclKind::Function, pos: decl.pos }
	);
}


/// The externally visible name of a function. Nested functions are qualified with their
/// parent's linkage name, and a numeric suffix keeps the names unique.
fn linkage_name(decl: &FunDecl, context: &mut Context) -> Symbol {
	if let Some(name) = decl.external_name {
		context.linkages.insert(name);
		return name;
	}

	let parent = context.function
		.and_then(|parent| context.resolution.function(parent))
		.map(|info| info.linkage);

	let base = match parent {
		Some(parent) if !decl.is_external => format!(
			"{}.{}",
			context.name(parent),
			context.name(decl.name),
		),
		_ => context.name(decl.name),
	};

	let mut candidate = base.clone();
	let mut suffix = 1;

	loop {
		let symbol = context.interner.get_or_intern(&candidate);

		if context.linkages.insert(symbol) {
			return symbol;
		}

		suffix += 1;
		candidate = format!("{}.{}", base, suffix);
	}
}


/// Resolve the parameters and body of a function, in a scope of its own.
fn analyze_function(decl: &FunDecl, context: &mut Context) {
	let (body_depth, is_external) = context.resolution
		.function(decl.id)
		.map(|info| (info.body_depth, info.is_external))
		.expect("function analyzed before being declared");

	let mut context = context.enter_function(decl.id, body_depth, is_external);

	for param in decl.params.iter() {
		context.declare(
			param.name,
			Binding { decl: param.id, kind: DeclKind::Variable, pos: param.pos }
		);
	}

	if let Some(body) = &decl.body {
		analyze_expr(body, &mut context);
	}
}


/// Record a variable and enter it in the current scope.
fn declare_variable(decl: &VarDecl, context: &mut Context) {
	let declared = decl.type_name
		.and_then(|name| context.resolve_type(name, decl.pos));

	let owner = context.function.expect("variable declared outside any function");

	context.resolution.declare_var(
		decl.id,
		VarInfo {
			name: decl.name,
			depth: context.depth,
			owner,
			escapes: false,
			declared,
		}
	);

	context.declare(
		decl.name,
		Binding { decl: decl.id, kind: DeclKind::Variable, pos: decl.pos }
	);
}


/// The initializer cannot see the variable it initializes.
fn analyze_var_decl(decl: &VarDecl, context: &mut Context) {
	if let Some(init) = &decl.init {
		analyze_expr(init, context);
	}

	declare_variable(decl, context);
}


/// A contiguous run of function declarations is entered in the scope before any of the
/// bodies is resolved, which allows mutual recursion inside the run. A variable
/// declaration ends the run.
fn analyze_let(decls: &[Decl], body: &[Expr], context: &mut Context) {
	let mut context = context.enter_block();
	let mut run = Vec::new();

	for decl in decls {
		match decl {
			Decl::Fun(decl) => {
				declare_function(decl, &mut context);
				run.push(decl);
			}

			Decl::Var(decl) => {
				analyze_bodies(&mut run, &mut context);
				analyze_var_decl(decl, &mut context);
			}
		}
	}

	analyze_bodies(&mut run, &mut context);

	for expr in body {
		analyze_expr(expr, &mut context);
	}
}


fn analyze_bodies(run: &mut Vec<&FunDecl>, context: &mut Context) {
	for decl in run.drain(..) {
		analyze_function(decl, context);
	}
}


fn analyze_expr(expr: &Expr, context: &mut Context) {
	match expr {
		Expr::IntegerLiteral { .. } | Expr::StringLiteral { .. } => (),

		Expr::BinaryOperator { left, right, .. } => {
			analyze_expr(left, context);
			analyze_expr(right, context);
		}

		Expr::Sequence { exprs, .. } => {
			for expr in exprs.iter() {
				analyze_expr(expr, context);
			}
		}

		Expr::Let { decls, body, .. } => analyze_let(decls, body, context),

		Expr::Identifier(identifier) => resolve_variable(identifier, context),

		Expr::IfThenElse { condition, then, otherwise, .. } => {
			analyze_expr(condition, context);
			analyze_expr(then, context);

			if let Some(otherwise) = otherwise {
				analyze_expr(otherwise, context);
			}
		}

		Expr::FunctionCall(call) => {
			resolve_call(call, context);

			for arg in call.args.iter() {
				analyze_expr(arg, context);
			}
		}

		Expr::WhileLoop { id, condition, body, .. } => {
			analyze_expr(condition, context);

			let mut context = context.enter_loop(*id);
			analyze_expr(body, &mut context);
		}

		Expr::ForLoop { id, variable, high, body, .. } => {
			if let Some(low) = &variable.init {
				analyze_expr(low, context);
			}
			analyze_expr(high, context);

			let mut context = context.enter_loop(*id);
			declare_variable(variable, &mut context);
			analyze_expr(body, &mut context);
		}

		Expr::Break { id, pos } => match context.in_loop {
			Some(lp) => context.resolution.bind_break(*id, lp),
			None => context.report(Error::break_outside_loop(*pos)),
		},

		Expr::Assign { lhs, rhs, .. } => {
			resolve_variable(lhs, context);
			analyze_expr(rhs, context);
		}
	}
}


fn resolve_variable(identifier: &Identifier, context: &mut Context) {
	let binding = match context.scope.resolve(identifier.name, identifier.pos) {
		Ok(binding) => binding,
		Err(error) => return context.report(error),
	};

	match binding.kind {
		DeclKind::Variable => {
			let depth = context.resolution
				.var(binding.decl)
				.map(|var| var.depth)
				.expect("variable bound before being declared");

			if depth < context.frame_base {
				return context.report(
					Error::outside_external_function(identifier.name, identifier.pos, binding.pos)
				);
			}

			context.resolution.bind_variable(identifier.id, binding.decl, context.depth)
		}

		DeclKind::Function => context.report(
			Error::not_a_variable(identifier.name, identifier.pos, binding.pos)
		),
	}
}


fn resolve_call(call: &FunctionCall, context: &mut Context) {
	let binding = match context.scope.resolve(call.name, call.pos) {
		Ok(binding) => binding,
		Err(error) => return context.report(error),
	};

	match binding.kind {
		DeclKind::Function => {
			// External callees take no static link, so they are reachable from anywhere.
			let unreachable = context.resolution
				.function(binding.decl)
				.map(|info| !info.is_external && info.depth < context.frame_base)
				.expect("function bound before being declared");

			if unreachable {
				return context.report(
					Error::outside_external_function(call.name, call.pos, binding.pos)
				);
			}

			context.resolution.bind_call(call.id, binding.decl, context.depth)
		}

		DeclKind::Variable => context.report(
			Error::not_a_function(call.name, call.pos, binding.pos)
		),
	}
}


/// Static semantic analysis context. Each context owns one scope of the stack, which is
/// exited when the context is dropped.
#[derive(Debug)]
struct Context<'a> {
	/// Scope stack to resolve names.
	scope: &'a mut scope::Stack,
	/// Results of resolution.
	resolution: &'a mut Resolution,
	/// Collected errors.
	errors: &'a mut Errors,
	/// Linkage names already taken.
	linkages: &'a mut HashSet<Symbol>,
	interner: &'a mut symbol::Interner,
	types: TypeNames,
	/// Number of enclosing function bodies, not counting main.
	depth: u32,
	/// The innermost enclosing function.
	function: Option<NodeId>,
	/// Declarations shallower than this are out of reach of the static links, as the
	/// innermost enclosing external function has none.
	frame_base: u32,
	/// The innermost enclosing loop, if inside the current function.
	in_loop: Option<NodeId>,
}


impl<'a> Context<'a> {
	/// Create a new context, entering the outermost scope.
	fn new(
		scope: &'a mut scope::Stack,
		resolution: &'a mut Resolution,
		errors: &'a mut Errors,
		linkages: &'a mut HashSet<Symbol>,
		interner: &'a mut symbol::Interner,
		types: TypeNames,
	) -> Self {
		scope.enter();

		Self {
			scope,
			resolution,
			errors,
			linkages,
			interner,
			types,
			depth: 0,
			function: None,
			frame_base: 0,
			in_loop: None,
		}
	}


	fn nested<'b>(
		&'b mut self,
		depth: u32,
		function: Option<NodeId>,
		frame_base: u32,
		in_loop: Option<NodeId>,
	) -> Context<'b> {
		self.scope.enter();

		Context {
			scope: self.scope,
			resolution: self.resolution,
			errors: self.errors,
			linkages: self.linkages,
			interner: self.interner,
			types: self.types,
			depth,
			function,
			frame_base,
			in_loop,
		}
	}


	fn enter_block<'b>(&'b mut self) -> Context<'b> {
		self.nested(self.depth, self.function, self.frame_base, self.in_loop)
	}


	fn enter_loop<'b>(&'b mut self, lp: NodeId) -> Context<'b> {
		self.nested(self.depth, self.function, self.frame_base, Some(lp))
	}


	fn enter_function<'b>(&'b mut self, function: NodeId, depth: u32, is_external: bool) -> Context<'b> {
		let frame_base = if is_external { depth } else { self.frame_base };
		self.nested(depth, Some(function), frame_base, None)
	}


	fn declare(&mut self, symbol: Symbol, binding: Binding) {
		if let Err(error) = self.scope.declare(symbol, binding) {
			self.report(error);
		}
	}


	fn resolve_type(&mut self, name: Symbol, pos: SourcePos) -> Option<Type> {
		let resolved = self.types.resolve(name);

		if resolved.is_none() {
			self.report(Error::unknown_type(name, pos));
		}

		resolved
	}


	fn name(&self, symbol: Symbol) -> String {
		self.interner
			.resolve(symbol)
			.unwrap_or("<invalid symbol>")
			.to_owned()
	}


	fn report(&mut self, error: Error) {
		tracing::trace!(pos = %error.pos, "binding error");
		self.errors.push(error);
	}
}


impl<'a> Drop for Context<'a> {
	fn drop(&mut self) {
		self.scope.exit();
	}
}
