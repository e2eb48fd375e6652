use std::io;

use assert_matches::assert_matches;

use crate::{
	ast::{self, BinaryOp, Builder, Decl, Expr, NodeId},
	fmt,
	semantic::ErrorsDisplayContext,
	symbol,
	tests,
	types::Type,
};
use super::{Analyzer, ErrorKind, Errors, Program};


fn test_dir<P, F>(path: P, mut check: F) -> io::Result<()>
where
	P: AsRef<std::path::Path>,
	F: FnMut(&Result<Program, Errors>) -> bool,
{
	let mut interner = symbol::Interner::new();

	tests::util::test_dir(
		path,
		move |path, file| {
			let ast = ast::json::read(file, &mut interner)
				.unwrap_or_else(|error| panic!("{}: {}", path.display(), error));

			let result = Analyzer::analyze(ast, &mut interner);

			if !check(&result) {
				match result {
					Ok(_) => panic!("{}: unexpected success", path.display()),

					Err(errors) => panic!(
						"{}: {}",
						path.display(),
						fmt::Show(
							errors,
							ErrorsDisplayContext {
								max_errors: None,
								interner: &interner,
							}
						)
					),
				}
			}

			Ok(())
		}
	)
}


/// Build a tree and resolve it. The closure may return ids of interesting nodes.
fn analyze<T, F>(build: F) -> (Result<Program, Errors>, T, symbol::Interner)
where
	F: FnOnce(&Builder) -> (Expr, T),
{
	let mut interner = symbol::Interner::new();

	let builder = Builder::new(&mut interner);
	let (root, extra) = build(&builder);
	let ast = builder.finish(root);

	let result = Analyzer::analyze(ast, &mut interner);

	(result, extra, interner)
}


fn kinds(errors: &Errors) -> Vec<&ErrorKind> {
	errors.iter().map(|error| &error.kind).collect()
}


#[test]
fn test_positive() -> io::Result<()> {
	test_dir(
		"src/semantic/tests/data/positive",
		Result::is_ok,
	)
}


#[test]
fn test_negative() -> io::Result<()> {
	test_dir(
		"src/semantic/tests/data/negative",
		Result::is_err,
	)
}


#[test]
fn test_shadowing() {
	let (result, (outer, inner, use_inner, use_outer), _) = analyze(
		|b| {
			let outer = b.var_decl("x", None, Some(b.int(1)));
			let inner = b.var_decl("x", None, Some(b.string("a")));
			let use_inner = b.identifier("x");
			let use_outer = b.identifier("x");
			let ids = (outer.id, inner.id, use_inner.id, use_outer.id);

			let root = b.let_(
				vec![Decl::Var(outer)],
				vec![
					b.let_(vec![Decl::Var(inner)], vec![Expr::Identifier(use_inner)]),
					Expr::Identifier(use_outer),
				],
			);

			(root, ids)
		}
	);

	let program = result.expect("program should resolve");

	assert_eq!(program.resolution.variable(use_inner), Some(inner));
	assert_eq!(program.resolution.variable(use_outer), Some(outer));
}


#[test]
fn test_mutual_recursion() {
	let (result, (even, odd, call_odd, call_even), _) = analyze(
		|b| {
			let call_odd = b.call("odd", vec![b.binary(BinaryOp::Minus, b.id("n"), b.int(1))]);
			let call_odd_id = match &call_odd { Expr::FunctionCall(call) => call.id, _ => unreachable!() };

			let call_even = b.call("even", vec![b.binary(BinaryOp::Minus, b.id("n"), b.int(1))]);
			let call_even_id = match &call_even { Expr::FunctionCall(call) => call.id, _ => unreachable!() };

			let even = b.fun_decl(
				"even",
				vec![b.param("n", "int")],
				Some("int"),
				Some(b.if_(b.binary(BinaryOp::Equals, b.id("n"), b.int(0)), b.int(1), Some(call_odd))),
			);
			let odd = b.fun_decl(
				"odd",
				vec![b.param("n", "int")],
				Some("int"),
				Some(b.if_(b.binary(BinaryOp::Equals, b.id("n"), b.int(0)), b.int(0), Some(call_even))),
			);
			let ids = (even.id, odd.id, call_odd_id, call_even_id);

			let root = b.let_(
				vec![Decl::Fun(even), Decl::Fun(odd)],
				vec![b.call("even", vec![b.int(4)])],
			);

			(root, ids)
		}
	);

	let program = result.expect("program should resolve");

	assert_eq!(program.resolution.call(call_odd), Some(odd));
	assert_eq!(program.resolution.call(call_even), Some(even));
}


#[test]
fn test_variable_ends_function_group() {
	let (result, _, interner) = analyze(
		|b| {
			let root = b.let_(
				vec![
					b.function("f", vec![], Some("int"), b.call("g", vec![])),
					b.var("x", None, b.int(1)),
					b.function("g", vec![], Some("int"), b.int(1)),
				],
				vec![b.call("f", vec![])],
			);

			(root, ())
		}
	);

	let errors = result.expect_err("g is not visible from f");
	let g = interner.get("g").expect("g interned");

	assert_matches!(kinds(&errors)[..], [ErrorKind::Undefined(symbol)] if *symbol == g);
}


#[test]
fn test_duplicate_is_reported_once() {
	let (result, _, _) = analyze(
		|b| {
			b.at(1, 5);
			let first = b.var("x", None, b.int(1));
			b.at(2, 5);
			let second = b.var("x", None, b.int(2));

			(b.let_(vec![first, second], vec![b.id("x")]), ())
		}
	);

	let errors = result.expect_err("duplicate declaration");

	assert_eq!(errors.len(), 1);
	assert_matches!(
		kinds(&errors)[..],
		[ErrorKind::DuplicateDeclaration { previous, .. }] if *previous == ast::SourcePos::new(1, 5)
	);
}


#[test]
fn test_duplicate_parameter() {
	let (result, _, _) = analyze(
		|b| {
			let root = b.let_(
				vec![b.function("f", vec![b.param("a", "int"), b.param("a", "int")], None, b.seq(vec![]))],
				vec![b.call("f", vec![b.int(1), b.int(2)])],
			);

			(root, ())
		}
	);

	assert_matches!(
		kinds(&result.expect_err("duplicate parameter"))[..],
		[ErrorKind::DuplicateDeclaration { .. }]
	);
}


#[test]
fn test_resolution_continues_after_errors() {
	let (result, _, _) = analyze(
		|b| (b.seq(vec![b.id("x"), b.call("f", vec![b.id("y")]), b.int(1)]), ())
	);

	let errors = result.expect_err("undefined names");

	assert_eq!(errors.len(), 3);
	assert!(errors.iter().all(|error| matches!(error.kind, ErrorKind::Undefined(_))));
}


#[test]
fn test_wrong_kind_of_name() {
	let (result, _, _) = analyze(
		|b| {
			let root = b.let_(
				vec![
					b.var("x", None, b.int(1)),
					b.function("f", vec![], None, b.seq(vec![])),
				],
				vec![b.call("x", vec![]), b.id("f")],
			);

			(root, ())
		}
	);

	assert_matches!(
		kinds(&result.expect_err("wrong kinds"))[..],
		[ErrorKind::NotAFunction { .. }, ErrorKind::NotAVariable { .. }]
	);
}


#[test]
fn test_break_binds_innermost_loop() {
	let (result, (outer, inner, brk), _) = analyze(
		|b| {
			let brk = b.break_();
			let brk_id = match &brk { Expr::Break { id, .. } => *id, _ => unreachable!() };

			let inner = b.while_(b.int(1), brk);
			let inner_id = match &inner { Expr::WhileLoop { id, .. } => *id, _ => unreachable!() };

			let outer = b.for_("i", b.int(0), b.int(10), inner);
			let outer_id = match &outer { Expr::ForLoop { id, .. } => *id, _ => unreachable!() };

			(outer, (outer_id, inner_id, brk_id))
		}
	);

	let program = result.expect("program should resolve");

	assert_eq!(program.resolution.loop_of(brk), Some(inner));
	assert_ne!(program.resolution.loop_of(brk), Some(outer));
}


#[test]
fn test_break_outside_loop() {
	let (result, _, _) = analyze(|b| (b.break_(), ()));

	assert_matches!(kinds(&result.expect_err("break"))[..], [ErrorKind::BreakOutsideLoop]);
}


#[test]
fn test_break_does_not_cross_functions() {
	let (result, _, _) = analyze(
		|b| {
			let body = b.let_(
				vec![b.function("f", vec![], None, b.break_())],
				vec![b.call("f", vec![])],
			);

			(b.while_(b.int(1), body), ())
		}
	);

	assert_matches!(kinds(&result.expect_err("break"))[..], [ErrorKind::BreakOutsideLoop]);
}


#[test]
fn test_escaping_variables() {
	let (result, (x, y, use_x), _) = analyze(
		|b| {
			let x = b.var_decl("x", None, Some(b.int(1)));
			let y = b.var_decl("y", None, Some(b.int(2)));
			let use_x = b.identifier("x");
			let ids = (x.id, y.id, use_x.id);

			let root = b.let_(
				vec![
					Decl::Var(x),
					Decl::Var(y),
					b.function("f", vec![], Some("int"), Expr::Identifier(use_x)),
				],
				vec![b.binary(BinaryOp::Plus, b.id("y"), b.call("f", vec![]))],
			);

			(root, ids)
		}
	);

	let program = result.expect("program should resolve");
	let resolution = &program.resolution;

	let x = resolution.var(x).expect("x declared");
	assert!(x.escapes);
	assert_eq!(x.depth, 0);
	assert_eq!(x.owner, program.main.id);
	assert_eq!(resolution.depth(use_x), Some(1));

	assert!(!resolution.var(y).expect("y declared").escapes);
}


#[test]
fn test_top_level_assignment_is_depth_zero() {
	let (result, (x, lhs, rhs), _) = analyze(
		|b| {
			let x = b.var_decl("x", None, Some(b.int(1)));
			let rhs = b.identifier("x");
			let ids = (x.id, rhs.id);

			let assign = b.assign("x", b.binary(BinaryOp::Plus, Expr::Identifier(rhs), b.int(1)));
			let lhs = match &assign { Expr::Assign { lhs, .. } => lhs.id, _ => unreachable!() };

			(b.let_(vec![Decl::Var(x)], vec![assign]), (ids.0, lhs, ids.1))
		}
	);

	let program = result.expect("program should resolve");
	let resolution = &program.resolution;

	assert_eq!(resolution.variable(lhs), Some(x));
	assert_eq!(resolution.variable(rhs), Some(x));
	assert_eq!(resolution.depth(lhs), Some(0));
	assert_eq!(resolution.depth(rhs), Some(0));
	assert!(!resolution.var(x).expect("x declared").escapes);
}


#[test]
fn test_function_depths_and_linkage() {
	let (result, (f, g, h), interner) = analyze(
		|b| {
			let g = b.fun_decl("g", vec![], Some("int"), Some(b.int(1)));
			let g_id = g.id;

			let f = b.fun_decl(
				"f",
				vec![],
				Some("int"),
				Some(b.let_(vec![Decl::Fun(g)], vec![b.call("g", vec![])])),
			);
			let f_id = f.id;

			let h = b.fun_decl("f", vec![], None, Some(b.seq(vec![])));
			let h_id = h.id;

			let root = b.seq(
				vec![
					b.let_(vec![Decl::Fun(f)], vec![b.call("f", vec![])]),
					b.let_(vec![Decl::Fun(h)], vec![b.call("f", vec![])]),
				]
			);

			(root, (f_id, g_id, h_id))
		}
	);

	let program = result.expect("program should resolve");
	let resolution = &program.resolution;
	let linkage = |decl| {
		interner
			.resolve(resolution.function(decl).expect("declared").linkage)
			.map(str::to_owned)
	};

	let f_info = resolution.function(f).expect("f declared");
	assert_eq!((f_info.depth, f_info.body_depth), (0, 1));
	assert_eq!(f_info.parent, Some(program.main.id));

	let g_info = resolution.function(g).expect("g declared");
	assert_eq!((g_info.depth, g_info.body_depth), (1, 2));
	assert_eq!(g_info.parent, Some(f));

	assert_eq!(linkage(f).as_deref(), Some("main.f"));
	assert_eq!(linkage(g).as_deref(), Some("main.f.g"));
	assert_eq!(linkage(h).as_deref(), Some("main.f.2"));
	assert_eq!(linkage(program.main.id).as_deref(), Some("main"));
	assert_eq!(resolution.function(h).expect("h declared").ret, Type::Void);
}


#[test]
fn test_primitives() {
	let (result, call, interner) = analyze(
		|b| {
			let call = b.call("print", vec![b.string("hello")]);
			let id = match &call { Expr::FunctionCall(call) => call.id, _ => unreachable!() };

			(b.seq(vec![call, b.call("exit", vec![b.int(0)])]), id)
		}
	);

	let program = result.expect("program should resolve");
	let print = program.primitive_named("print").expect("print primitive");

	assert_eq!(program.resolution.call(call), Some(print.id));
	assert_eq!(program.primitives.len(), 14);
	assert!(program.primitive_named("nonexistent").is_none());

	let info = program.resolution.function(print.id).expect("print declared");
	assert!(info.is_external);
	assert_eq!(info.parent, None);
	assert_eq!(interner.resolve(info.linkage), Some("__print"));

	let strcmp = program.primitive_named("strcmp").expect("strcmp primitive");
	let info = program.resolution.function(strcmp.id).expect("strcmp declared");
	assert_eq!(info.ret, Type::Int);
	assert_eq!(info.params.len(), 2);
	assert_eq!(
		program.resolution.var(info.params[0]).and_then(|param| param.declared),
		Some(Type::String)
	);
}


#[test]
fn test_for_loop_scope() {
	let (result, _, interner) = analyze(
		|b| {
			let root = b.seq(
				vec![
					b.for_("i", b.int(0), b.int(3), b.call("print_int", vec![b.id("i")])),
					b.id("i"),
				]
			);

			(root, ())
		}
	);

	let errors = result.expect_err("i is not visible after the loop");
	let i = interner.get("i").expect("i interned");

	assert_matches!(kinds(&errors)[..], [ErrorKind::Undefined(symbol)] if *symbol == i);
}


#[test]
fn test_unknown_type() {
	let (result, _, _) = analyze(
		|b| (b.let_(vec![b.var("x", Some("float"), b.int(1))], vec![b.id("x")]), ())
	);

	assert_matches!(kinds(&result.expect_err("unknown type"))[..], [ErrorKind::UnknownType(_)]);
}


#[test]
fn test_main_wraps_root() {
	let (result, _, _) = analyze(|b| (b.int(7), ()));

	let program = result.expect("program should resolve");
	let main = &program.main;

	assert!(main.is_external);
	assert!(main.params.is_empty());
	assert_matches!(
		main.body.as_deref(),
		Some(Expr::Sequence { exprs, .. })
			if matches!(exprs[..], [Expr::IntegerLiteral { value: 7, .. }, Expr::IntegerLiteral { value: 0, .. }])
	);

	let ids: Vec<NodeId> = program.primitives.iter().map(|p| p.id).collect();
	assert!(!ids.contains(&main.id));
}


#[test]
fn test_external_function_reaches_only_its_own_frame() {
	let (result, _, interner) = analyze(
		|b| {
			let h = b.function("h", vec![], Some("int"), b.id("n"));

			let mut f = b.fun_decl(
				"f",
				vec![b.param("n", "int")],
				Some("int"),
				Some(
					b.seq(
						vec![
							b.call("print", vec![b.string("f")]),
							b.call("g", vec![]),
							b.id("x"),
							b.let_(vec![h], vec![b.call("h", vec![])]),
							b.call("f", vec![b.id("n")]),
						]
					)
				),
			);
			f.is_external = true;

			let root = b.let_(
				vec![
					b.var("x", None, b.int(1)),
					b.function("g", vec![], None, b.seq(vec![])),
					Decl::Fun(f),
				],
				vec![b.call("f", vec![b.int(2)])],
			);

			(root, ())
		}
	);

	let errors = result.expect_err("outer names are out of reach");
	let g = interner.get("g").expect("g interned");
	let x = interner.get("x").expect("x interned");

	assert_matches!(
		kinds(&errors)[..],
		[
			ErrorKind::OutsideExternalFunction { symbol: first, .. },
			ErrorKind::OutsideExternalFunction { symbol: second, .. },
		] if *first == g && *second == x
	);
}
