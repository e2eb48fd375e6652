use std::collections::{HashMap, VecDeque};

use super::{
	BinOp,
	BlockId,
	Function,
	FunctionBuilder,
	LocalId,
	Module,
	Op,
	Operand,
	Place,
	Signature,
	StrIx,
	Temp,
	Terminator,
};
use crate::{
	ast::{BinaryOp, Decl, Expr, FunDecl, FunctionCall, Identifier, NodeId, VarDecl},
	frame::Frames,
	semantic::{FunInfo, Program, Resolution},
	symbol::Symbol,
	types::{Type, Typer},
};


/// Control does not fall through the lowered code, as it ended in a break.
#[derive(Debug)]
struct Diverged;


/// The value of a lowered expression, None if it has no value.
type Lowered<T = Option<Operand>> = Result<T, Diverged>;


/// Generates the IR of a resolved program.
///
/// Function bodies are generated from a worklist. Declaring a function records its
/// signature and enqueues its body, so that every function called from a body already
/// has a signature when that body is generated.
#[derive(Debug)]
pub struct Generator<'a> {
	program: &'a Program,
	frames: &'a Frames,
	typer: Typer<'a>,
	signatures: HashMap<NodeId, Signature>,
	worklist: VecDeque<&'a FunDecl>,
	strings: HashMap<&'a str, StrIx>,
	module: Module,
}


impl<'a> Generator<'a> {
	/// Generate the module for a program. The program must be fully resolved, which the
	/// type of `Program` guarantees.
	pub fn generate(program: &'a Program, frames: &'a Frames) -> Module {
		let mut generator = Self {
			program,
			frames,
			typer: frames.typer(&program.resolution),
			signatures: HashMap::new(),
			worklist: VecDeque::new(),
			strings: HashMap::new(),
			module: Module::default(),
		};

		generator.declare_function(&program.main);

		while let Some(decl) = generator.worklist.pop_front() {
			let function = generator.generate_body(decl);
			generator.module.functions.push(function);
		}

		tracing::debug!(
			functions = generator.module.functions.len(),
			externals = generator.module.externals.len(),
			strings = generator.module.strings.len(),
			"generated module"
		);

		generator.module
	}


	fn info(&self, decl: NodeId) -> &'a FunInfo {
		self.program.resolution
			.function(decl)
			.unwrap_or_else(|| panic!("function {} was not resolved", decl))
	}


	/// Record the signature of a function. Functions with a body are enqueued for
	/// generation, the others become externals of the module.
	fn declare_function(&mut self, decl: &'a FunDecl) {
		if self.signatures.contains_key(&decl.id) {
			return;
		}

		let info = self.info(decl.id);
		let mut params = Vec::with_capacity(info.params.len() + 1);

		if !info.is_external {
			let parent = info.parent.expect("internal function without parent");
			params.push(Type::Frame(parent));
		}

		params.extend(
			info.params
				.iter()
				.map(|param| self.frames.var_type(*param).unwrap_or(Type::Int))
		);

		let signature = Signature {
			decl: decl.id,
			name: info.linkage,
			params: params.into(),
			ret: info.ret,
			is_external: info.is_external,
		};

		if decl.body.is_some() {
			self.worklist.push_back(decl);
		} else {
			self.module.externals.push(signature.clone());
		}

		self.signatures.insert(decl.id, signature);
	}


	fn generate_body(&mut self, decl: &'a FunDecl) -> Function {
		let info = self.info(decl.id);
		let body = decl.body.as_deref().expect("generating a function without body");

		let signature = self.signatures
			.get(&decl.id)
			.cloned()
			.expect("generating an undeclared function");

		let layout = self.frames
			.layout(decl.id)
			.cloned()
			.expect("function with a body has no frame");

		let mut builder = FunctionBuilder::new();
		let frame = builder.temp();
		builder.push(Op::FrameAlloc { dst: frame, layout: decl.id });

		let mut lowerer = Lowerer {
			generator: self,
			builder,
			function: decl.id,
			frame,
			locals: HashMap::new(),
			loop_exits: HashMap::new(),
		};

		let mut param_ix = 0;

		if signature.has_static_link() {
			assert_eq!(layout.static_link, info.parent, "static link does not match the parent");

			lowerer.builder.push(
				Op::Store {
					place: Place::Field { frame: Operand::Temp(frame), layout: decl.id, field: 0 },
					value: Operand::Param(0),
				}
			);

			param_ix += 1;
		}

		for (param, ty) in decl.params.iter().zip(signature.params[param_ix as usize ..].iter()) {
			let place = lowerer.declare_storage(param, *ty);

			lowerer.builder.push(Op::Store { place, value: Operand::Param(param_ix) });

			param_ix += 1;
		}

		if let Ok(value) = lowerer.lower(body) {
			let value = if signature.ret.has_value() {
				let value = value.unwrap_or_else(
					|| panic!("body of function {} has no value", decl.id)
				);

				Some(value)
			} else {
				None
			};

			lowerer.builder.terminate(Terminator::Return(value));
		}

		let (locals, blocks, temps) = lowerer.builder.finish();

		tracing::trace!(function = %decl.id, blocks = blocks.len(), temps, "generated function body");

		Function {
			signature,
			frame: layout,
			locals,
			blocks,
			temps,
		}
	}


	fn intern_string(&mut self, value: &'a str) -> StrIx {
		let strings = &mut self.module.strings;

		*self.strings
			.entry(value)
			.or_insert_with(
				|| {
					strings.push(value.into());
					StrIx(strings.len() as u32 - 1)
				}
			)
	}
}


/// Lowering state of the function being generated.
struct Lowerer<'g, 'a> {
	generator: &'g mut Generator<'a>,
	builder: FunctionBuilder,
	function: NodeId,
	/// The frame pointer of the current function.
	frame: Temp,
	/// Storage of the non-escaping variables.
	locals: HashMap<NodeId, LocalId>,
	/// The end block of each loop being lowered.
	loop_exits: HashMap<NodeId, BlockId>,
}


impl<'g, 'a> Lowerer<'g, 'a> {
	fn resolution(&self) -> &'a Resolution {
		&self.generator.program.resolution
	}


	fn typer(&self) -> Typer<'a> {
		self.generator.typer
	}


	fn temp(&mut self) -> Temp {
		self.builder.temp()
	}


	/// Allocate the storage of a variable owned by the current function: a frame field
	/// if it escapes, a local otherwise.
	fn declare_storage(&mut self, decl: &VarDecl, ty: Type) -> Place {
		let var = self.resolution()
			.var(decl.id)
			.unwrap_or_else(|| panic!("variable {} was not resolved", decl.id));

		if var.escapes {
			let field = self.generator.frames
				.layout(self.function)
				.and_then(|layout| layout.field_of(decl.id))
				.unwrap_or_else(|| panic!("escaping variable {} is missing from its frame", decl.id));

			Place::Field { frame: Operand::Temp(self.frame), layout: self.function, field }
		} else {
			let local = self.builder.local(Some(decl.name), ty);
			self.locals.insert(decl.id, local);

			Place::Local(local)
		}
	}


	/// Follow the static links `hops` times from the current frame. Returns the reached
	/// frame pointer and the function that owns it.
	fn frame_up(&mut self, hops: u32) -> (Operand, NodeId) {
		let mut frame = Operand::Temp(self.frame);
		let mut function = self.function;

		for _ in 0 .. hops {
			let parent = self.generator.frames
				.layout(function)
				.and_then(|layout| layout.static_link)
				.unwrap_or_else(|| panic!("function {} has no static link", function));

			let dst = self.temp();
			self.builder.push(
				Op::Load {
					dst,
					place: Place::Field { frame, layout: function, field: 0 },
				}
			);

			frame = Operand::Temp(dst);
			function = parent;
		}

		(frame, function)
	}


	/// The number of static links to follow from a use to reach the frame of a
	/// declaration at `decl_depth`.
	fn hops(&self, reference: NodeId, decl_depth: u32) -> u32 {
		let use_depth = self.resolution()
			.depth(reference)
			.unwrap_or_else(|| panic!("reference {} has no depth", reference));

		hop_count(reference, use_depth, decl_depth)
	}


	fn address_of(&mut self, identifier: &Identifier) -> Place {
		let resolution = self.resolution();

		let decl = resolution
			.variable(identifier.id)
			.unwrap_or_else(|| panic!("unresolved identifier {}", identifier.id));

		let var = resolution
			.var(decl)
			.unwrap_or_else(|| panic!("variable {} was not resolved", decl));

		let hops = self.hops(identifier.id, var.depth);

		if !var.escapes {
			if hops > 0 {
				panic!("non-escaping variable {} accessed through a static link", decl);
			}

			let local = self.locals
				.get(&decl)
				.copied()
				.unwrap_or_else(|| panic!("variable {} used before its declaration", decl));

			return Place::Local(local);
		}

		let (frame, owner) = self.frame_up(hops);
		assert_eq!(owner, var.owner, "static links of {} do not reach its owner", identifier.id);

		let field = self.generator.frames
			.layout(owner)
			.and_then(|layout| layout.field_of(decl))
			.unwrap_or_else(|| panic!("escaping variable {} is missing from its frame", decl));

		Place::Field { frame, layout: owner, field }
	}


	fn lower(&mut self, expr: &'a Expr) -> Lowered {
		match expr {
			Expr::IntegerLiteral { value, .. } => Ok(Some(Operand::Int(*value))),

			Expr::StringLiteral { value, .. } => {
				let ix = self.generator.intern_string(value);
				Ok(Some(Operand::Str(ix)))
			}

			Expr::BinaryOperator { op, left, right, .. } => self.lower_binary(*op, left, right),

			Expr::Sequence { exprs, .. } => self.lower_sequence(exprs),

			Expr::Let { decls, body, .. } => {
				for decl in decls.iter() {
					match decl {
						Decl::Var(decl) => self.lower_var_decl(decl)?,
						Decl::Fun(decl) => self.generator.declare_function(decl),
					}
				}

				self.lower_sequence(body)
			}

			Expr::Identifier(identifier) => {
				let place = self.address_of(identifier);
				let dst = self.temp();
				self.builder.push(Op::Load { dst, place });

				Ok(Some(Operand::Temp(dst)))
			}

			Expr::IfThenElse { condition, then, otherwise, .. } => {
				let ty = self.typer().type_of(expr);
				self.lower_if(ty, condition, then, otherwise.as_deref())
			}

			Expr::FunctionCall(call) => self.lower_call(call),

			Expr::WhileLoop { id, condition, body, .. } => self.lower_while(*id, condition, body),

			Expr::ForLoop { id, variable, high, body, .. } => self.lower_for(*id, variable, high, body),

			Expr::Break { id, .. } => {
				let lp = self.resolution()
					.loop_of(*id)
					.unwrap_or_else(|| panic!("break {} is not bound to a loop", id));

				let end = self.loop_exits
					.get(&lp)
					.copied()
					.unwrap_or_else(|| panic!("break {} reached outside its loop", id));

				self.builder.terminate(Terminator::Branch(end));

				Err(Diverged)
			}

			Expr::Assign { lhs, rhs, .. } => {
				let value = self.lower_value(rhs)?;
				let place = self.address_of(lhs);
				self.builder.push(Op::Store { place, value });

				Ok(None)
			}
		}
	}


	/// Lower an expression that must produce a value.
	fn lower_value(&mut self, expr: &'a Expr) -> Lowered<Operand> {
		let value = self.lower(expr)?;

		Ok(value.unwrap_or_else(|| panic!("expression at {} has no value", expr.pos())))
	}


	/// The value of a sequence is the value of its last expression.
	fn lower_sequence(&mut self, exprs: &'a [Expr]) -> Lowered {
		let mut value = None;

		for expr in exprs {
			value = self.lower(expr)?;
		}

		Ok(value)
	}


	fn lower_var_decl(&mut self, decl: &'a VarDecl) -> Lowered<()> {
		let ty = self.generator.frames
			.var_type(decl.id)
			.unwrap_or_else(|| panic!("variable {} was not typed", decl.id));

		let value = match &decl.init {
			Some(init) => Some(self.lower_value(init)?),
			None => None,
		};

		let place = self.declare_storage(decl, ty);

		if let Some(value) = value {
			self.builder.push(Op::Store { place, value });
		}

		Ok(())
	}


	/// Strings are compared by comparing the result of `strcmp` with zero.
	fn lower_binary(&mut self, op: BinaryOp, left: &'a Expr, right: &'a Expr) -> Lowered {
		let is_string = self.typer().type_of(left) == Type::String;

		let mut left = self.lower_value(left)?;
		let mut right = self.lower_value(right)?;

		if is_string {
			let strcmp = self.generator.program
				.primitive_named("strcmp")
				.expect("strcmp primitive is not registered");

			let callee = self.callee(strcmp.id).name;
			let dst = self.temp();

			self.builder.push(
				Op::Call {
					dst: Some(dst),
					callee,
					args: vec![left, right].into(),
				}
			);

			left = Operand::Temp(dst);
			right = Operand::Int(0);
		}

		let dst = self.temp();
		self.builder.push(Op::Binary { dst, op: bin_op(op), left, right });

		Ok(Some(Operand::Temp(dst)))
	}


	fn lower_if(
		&mut self,
		ty: Type,
		condition: &'a Expr,
		then: &'a Expr,
		otherwise: Option<&'a Expr>,
	) -> Lowered {
		let cond = self.lower_value(condition)?;

		let then_block = self.builder.create_block("if_then");
		let else_block = self.builder.create_block("if_else");
		let result = if ty.has_value() { Some(self.builder.local(None, ty)) } else { None };

		self.builder.terminate(
			Terminator::CondBranch { cond, then: then_block, otherwise: else_block }
		);

		// Created when the first arm falls through.
		let mut end = None;

		self.builder.position_at(then_block);
		self.lower_arm(then, result, &mut end);

		self.builder.position_at(else_block);
		match otherwise {
			Some(otherwise) => self.lower_arm(otherwise, result, &mut end),
			None => self.branch_to_end(&mut end),
		}

		let end = end.ok_or(Diverged)?;
		self.builder.position_at(end);

		match result {
			Some(local) => {
				let dst = self.temp();
				self.builder.push(Op::Load { dst, place: Place::Local(local) });

				Ok(Some(Operand::Temp(dst)))
			}

			None => Ok(None),
		}
	}


	fn lower_arm(&mut self, arm: &'a Expr, result: Option<LocalId>, end: &mut Option<BlockId>) {
		if let Ok(value) = self.lower(arm) {
			if let Some(local) = result {
				let value = value.unwrap_or_else(|| panic!("conditional arm at {} has no value", arm.pos()));
				self.builder.push(Op::Store { place: Place::Local(local), value });
			}

			self.branch_to_end(end);
		}
	}


	fn branch_to_end(&mut self, end: &mut Option<BlockId>) {
		let builder = &mut self.builder;
		let target = *end.get_or_insert_with(|| builder.create_block("if_end"));

		self.builder.terminate(Terminator::Branch(target));
	}


	fn lower_while(&mut self, id: NodeId, condition: &'a Expr, body: &'a Expr) -> Lowered {
		let test = self.builder.create_block("loop_test");
		self.builder.terminate(Terminator::Branch(test));

		self.builder.position_at(test);
		let cond = self.lower_value(condition)?;

		let body_block = self.builder.create_block("loop_body");
		let end = self.builder.create_block("loop_end");
		self.loop_exits.insert(id, end);

		self.builder.terminate(
			Terminator::CondBranch { cond, then: body_block, otherwise: end }
		);

		self.builder.position_at(body_block);
		if self.lower(body).is_ok() {
			self.builder.terminate(Terminator::Branch(test));
		}

		self.builder.position_at(end);

		Ok(None)
	}


	/// The high bound is evaluated once, before the first test.
	fn lower_for(
		&mut self,
		id: NodeId,
		variable: &'a VarDecl,
		high: &'a Expr,
		body: &'a Expr,
	) -> Lowered {
		let low = variable.init
			.as_deref()
			.unwrap_or_else(|| panic!("for loop {} has no lower bound", id));

		let low = self.lower_value(low)?;
		let place = self.declare_storage(variable, Type::Int);
		self.builder.push(Op::Store { place, value: low });

		let high = self.lower_value(high)?;

		let test = self.builder.create_block("loop_test");
		self.builder.terminate(Terminator::Branch(test));

		self.builder.position_at(test);
		let current = self.temp();
		self.builder.push(Op::Load { dst: current, place });
		let cond = self.temp();
		self.builder.push(
			Op::Binary { dst: cond, op: BinOp::Le, left: Operand::Temp(current), right: high }
		);

		let body_block = self.builder.create_block("loop_body");
		let end = self.builder.create_block("loop_end");
		self.loop_exits.insert(id, end);

		self.builder.terminate(
			Terminator::CondBranch { cond: Operand::Temp(cond), then: body_block, otherwise: end }
		);

		self.builder.position_at(body_block);
		if self.lower(body).is_ok() {
			let current = self.temp();
			self.builder.push(Op::Load { dst: current, place });

			let next = self.temp();
			self.builder.push(
				Op::Binary { dst: next, op: BinOp::Add, left: Operand::Temp(current), right: Operand::Int(1) }
			);

			self.builder.push(Op::Store { place, value: Operand::Temp(next) });
			self.builder.terminate(Terminator::Branch(test));
		}

		self.builder.position_at(end);

		Ok(None)
	}


	/// The signature of a called function. Primitives are declared on their first call.
	fn callee(&mut self, decl: NodeId) -> &Signature {
		if !self.generator.signatures.contains_key(&decl) {
			let primitive = self.generator.program
				.primitive(decl)
				.unwrap_or_else(|| panic!("call to undeclared function {}", decl));

			self.generator.declare_function(primitive);
		}

		&self.generator.signatures[&decl]
	}


	/// Internal callees get the static link first, then the arguments in order.
	fn lower_call(&mut self, call: &'a FunctionCall) -> Lowered {
		let resolution = self.resolution();

		let decl = resolution
			.call(call.id)
			.unwrap_or_else(|| panic!("unresolved call {}", call.id));

		let info = self.generator.info(decl);

		let (callee, ret, static_link): (Symbol, Type, bool) = {
			let signature = self.callee(decl);
			(signature.name, signature.ret, signature.has_static_link())
		};

		let mut args = Vec::with_capacity(call.args.len() + 1);

		if static_link {
			let hops = self.hops(call.id, info.depth);
			let (frame, owner) = self.frame_up(hops);

			assert_eq!(Some(owner), info.parent, "static link of call {} does not reach the callee's parent", call.id);

			args.push(frame);
		}

		for arg in call.args.iter() {
			args.push(self.lower_value(arg)?);
		}

		let dst = if ret.has_value() { Some(self.temp()) } else { None };

		self.builder.push(Op::Call { dst, callee, args: args.into() });

		Ok(dst.map(Operand::Temp))
	}
}


/// Static links between a use at `use_depth` and a declaration at `decl_depth`. A use
/// shallower than its declaration means resolution bound it wrongly.
pub(super) fn hop_count(reference: NodeId, use_depth: u32, decl_depth: u32) -> u32 {
	let hops = i64::from(use_depth) - i64::from(decl_depth);

	if hops < 0 {
		panic!("reference {} is {} levels outside the scope of its declaration", reference, -hops);
	}

	hops as u32
}


fn bin_op(op: BinaryOp) -> BinOp {
	match op {
		BinaryOp::Plus => BinOp::Add,
		BinaryOp::Minus => BinOp::Sub,
		BinaryOp::Times => BinOp::Mul,
		BinaryOp::Div => BinOp::Div,
		BinaryOp::Equals => BinOp::Eq,
		BinaryOp::NotEquals => BinOp::Ne,
		BinaryOp::Lower => BinOp::Lt,
		BinaryOp::LowerEquals => BinOp::Le,
		BinaryOp::Greater => BinOp::Gt,
		BinaryOp::GreaterEquals => BinOp::Ge,
	}
}
