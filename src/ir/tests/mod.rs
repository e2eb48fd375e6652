use std::io;

use assert_matches::assert_matches;

use super::*;
use crate::{
	ast::{self, BinaryOp, Builder, Decl, Expr},
	frame::Frames,
	semantic::{Analyzer, Program},
	symbol,
	tests,
};


fn generate<T, F>(build: F) -> (Module, Program, symbol::Interner, T)
where
	F: FnOnce(&Builder) -> (Expr, T),
{
	let mut interner = symbol::Interner::new();

	let builder = Builder::new(&mut interner);
	let (root, extra) = build(&builder);
	let ast = builder.finish(root);

	let program = Analyzer::analyze(ast, &mut interner).expect("program should resolve");
	let frames = Frames::compute(&program);
	let module = Generator::generate(&program, &frames);

	verify(&module);

	(module, program, interner, extra)
}


fn function<'a>(module: &'a Module, interner: &symbol::Interner, name: &str) -> &'a Function {
	let symbol = interner.get(name).expect("linkage name interned");

	module
		.function(symbol)
		.unwrap_or_else(|| panic!("function {} not generated", name))
}


fn blocks_labeled<'a>(function: &'a Function, label: &str) -> Vec<&'a Block> {
	function.blocks
		.iter()
		.filter(|block| block.label == label)
		.collect()
}


fn predecessors(function: &Function, target: BlockId) -> Vec<&'static str> {
	function.blocks
		.iter()
		.filter(|block| block.terminator.successors().contains(&target))
		.map(|block| block.label)
		.collect()
}


#[test]
fn test_fixtures() -> io::Result<()> {
	let mut interner = symbol::Interner::new();

	tests::util::test_dir(
		"src/semantic/tests/data/positive",
		move |path, file| {
			let ast = ast::json::read(file, &mut interner)
				.unwrap_or_else(|error| panic!("{}: {}", path.display(), error));

			let program = Analyzer::analyze(ast, &mut interner)
				.unwrap_or_else(|_| panic!("{}: resolution failed", path.display()));

			let frames = Frames::compute(&program);
			let module = Generator::generate(&program, &frames);

			verify(&module);

			assert!(!crate::fmt::Show(&module, &interner).to_string().is_empty());

			Ok(())
		}
	)
}


#[test]
fn test_top_level_assignment() {
	let (module, _, interner, _) = generate(
		|b| {
			let assign = b.assign("x", b.binary(BinaryOp::Plus, b.id("x"), b.int(1)));
			(b.let_(vec![b.var("x", None, b.int(1))], vec![assign]), ())
		}
	);

	let main = function(&module, &interner, "main");

	assert!(main.signature.params.is_empty());
	assert_eq!(main.signature.ret, Type::Int);
	assert_eq!(main.blocks.len(), 1);
	assert_eq!(main.locals.len(), 1);
	assert_eq!(main.temps, 3);

	let x = Place::Local(LocalId(0));

	assert_eq!(
		main.entry().ops,
		vec![
			Op::FrameAlloc { dst: Temp(0), layout: main.signature.decl },
			Op::Store { place: x, value: Operand::Int(1) },
			Op::Load { dst: Temp(1), place: x },
			Op::Binary { dst: Temp(2), op: BinOp::Add, left: Operand::Temp(Temp(1)), right: Operand::Int(1) },
			Op::Store { place: x, value: Operand::Temp(Temp(2)) },
		]
	);
	assert_eq!(main.entry().terminator, Terminator::Return(Some(Operand::Int(0))));
}


#[test]
fn test_static_link_threading() {
	let (module, program, interner, (outer, middle, inner)) = generate(
		|b| {
			let inner = b.fun_decl(
				"inner",
				vec![],
				Some("int"),
				Some(
					b.seq(
						vec![
							b.assign("total", b.binary(BinaryOp::Plus, b.id("a"), b.id("b"))),
							b.id("total"),
						]
					)
				),
			);
			let inner_id = inner.id;

			let middle = b.fun_decl(
				"middle",
				vec![b.param("b", "int")],
				Some("int"),
				Some(b.let_(vec![Decl::Fun(inner)], vec![b.call("inner", vec![])])),
			);
			let middle_id = middle.id;

			let outer = b.fun_decl(
				"outer",
				vec![b.param("a", "int")],
				Some("int"),
				Some(b.let_(vec![Decl::Fun(middle)], vec![b.call("middle", vec![b.neg(b.id("a"))])])),
			);
			let outer_id = outer.id;

			let root = b.let_(
				vec![b.var("total", None, b.int(0)), Decl::Fun(outer)],
				vec![b.call("print_int", vec![b.call("outer", vec![b.int(3)])])],
			);

			(root, (outer_id, middle_id, inner_id))
		}
	);

	let main = program.main.id;
	let inner_fn = function(&module, &interner, "main.outer.middle.inner");

	assert_eq!(inner_fn.signature.params[..], [Type::Frame(middle)]);
	assert!(!inner_fn.signature.is_external);

	let field = |frame: u32, layout, field| Place::Field { frame: Operand::Temp(Temp(frame)), layout, field };
	let load = |dst: u32, place| Op::Load { dst: Temp(dst), place };

	assert_eq!(
		inner_fn.entry().ops,
		vec![
			Op::FrameAlloc { dst: Temp(0), layout: inner },
			Op::Store { place: field(0, inner, 0), value: Operand::Param(0) },
			// a, two levels up.
			load(1, field(0, inner, 0)),
			load(2, field(1, middle, 0)),
			load(3, field(2, outer, 1)),
			// b, one level up.
			load(4, field(0, inner, 0)),
			load(5, field(4, middle, 1)),
			Op::Binary { dst: Temp(6), op: BinOp::Add, left: Operand::Temp(Temp(3)), right: Operand::Temp(Temp(5)) },
			// total, in main's frame.
			load(7, field(0, inner, 0)),
			load(8, field(7, middle, 0)),
			load(9, field(8, outer, 0)),
			Op::Store { place: field(9, main, 0), value: Operand::Temp(Temp(6)) },
			load(10, field(0, inner, 0)),
			load(11, field(10, middle, 0)),
			load(12, field(11, outer, 0)),
			load(13, field(12, main, 0)),
		]
	);
	assert_eq!(inner_fn.entry().terminator, Terminator::Return(Some(Operand::Temp(Temp(13)))));

	// Callers one level out pass their own frame.
	let middle_fn = function(&module, &interner, "main.outer.middle");
	assert_matches!(
		middle_fn.entry().ops.last(),
		Some(Op::Call { dst: Some(_), args, .. }) if args[..] == [Operand::Temp(Temp(0))]
	);

	let outer_fn = function(&module, &interner, "main.outer");
	assert_eq!(
		outer_fn.entry().ops[.. 3],
		[
			Op::FrameAlloc { dst: Temp(0), layout: outer },
			Op::Store { place: field(0, outer, 0), value: Operand::Param(0) },
			Op::Store { place: field(0, outer, 1), value: Operand::Param(1) },
		]
	);

	let main_fn = function(&module, &interner, "main");
	assert!(
		main_fn.entry().ops.iter().any(
			|op| matches!(op, Op::Call { args, .. } if args[..] == [Operand::Temp(Temp(0)), Operand::Int(3)])
		)
	);
}


#[test]
fn test_recursive_call_follows_static_link() {
	let (module, program, interner, f) = generate(
		|b| {
			let f = b.fun_decl(
				"f",
				vec![b.param("n", "int")],
				Some("int"),
				Some(b.call("f", vec![b.id("n")])),
			);
			let id = f.id;

			(b.let_(vec![Decl::Fun(f)], vec![b.call("f", vec![b.int(1)])]), id)
		}
	);

	let f_fn = function(&module, &interner, "main.f");

	assert_eq!(f_fn.frame.static_link, Some(program.main.id));
	assert_eq!(
		f_fn.entry().ops[2 ..],
		[
			Op::Store { place: Place::Local(LocalId(0)), value: Operand::Param(1) },
			Op::Load {
				dst: Temp(1),
				place: Place::Field { frame: Operand::Temp(Temp(0)), layout: f, field: 0 },
			},
			Op::Load { dst: Temp(2), place: Place::Local(LocalId(0)) },
			Op::Call {
				dst: Some(Temp(3)),
				callee: f_fn.signature.name,
				args: vec![Operand::Temp(Temp(1)), Operand::Temp(Temp(2))].into(),
			},
		]
	);
}


#[test]
fn test_break_targets_innermost_loop() {
	let (module, _, interner, _) = generate(
		|b| {
			let inner = b.for_("i", b.int(0), b.int(10), b.break_());
			let body = b.seq(vec![inner, b.call("print_int", vec![b.int(1)])]);

			(b.while_(b.int(1), body), ())
		}
	);

	let main = function(&module, &interner, "main");
	let ends = blocks_labeled(main, "loop_end");
	let bodies = blocks_labeled(main, "loop_body");

	assert_matches!((&ends[..], &bodies[..]), ([outer_end, inner_end], [_, inner_body]) => {
		assert_eq!(inner_body.terminator, Terminator::Branch(inner_end.id));
		assert_ne!(inner_end.id, outer_end.id);

		// The rest of the outer body continues after the inner loop.
		assert_matches!(inner_end.ops[..], [Op::Call { .. }]);
		assert_matches!(inner_end.terminator, Terminator::Branch(target) if main.block(target).label == "loop_test");
	});
}


#[test]
fn test_break_in_conditional() {
	let (module, _, interner, _) = generate(
		|b| {
			let body = b.seq(
				vec![
					b.if_(b.binary(BinaryOp::Equals, b.id("i"), b.int(2)), b.break_(), None),
					b.call("print_int", vec![b.id("i")]),
				]
			);

			(b.for_("i", b.int(1), b.int(3), body), ())
		}
	);

	let main = function(&module, &interner, "main");
	let end = blocks_labeled(main, "loop_end")[0].id;

	let mut preds = predecessors(main, end);
	preds.sort_unstable();
	assert_eq!(preds, vec!["if_then", "loop_test"]);

	let test = blocks_labeled(main, "loop_test")[0];
	assert_matches!(
		test.ops[..],
		[Op::Load { .. }, Op::Binary { op: BinOp::Le, right: Operand::Int(3), .. }]
	);

	// The increment closes the body.
	let increment = blocks_labeled(main, "if_end")[0];
	assert_matches!(
		increment.ops[..],
		[
			Op::Load { .. },
			Op::Call { dst: None, .. },
			Op::Load { .. },
			Op::Binary { op: BinOp::Add, right: Operand::Int(1), .. },
			Op::Store { .. },
		]
	);
	assert_matches!(increment.terminator, Terminator::Branch(target) if target == test.id);
}


#[test]
fn test_code_after_break_is_dropped() {
	let (module, _, interner, _) = generate(
		|b| {
			let body = b.seq(vec![b.break_(), b.call("print_int", vec![b.int(1)])]);
			(b.while_(b.int(1), body), ())
		}
	);

	let main = function(&module, &interner, "main");

	assert!(module.externals.is_empty());
	assert!(main.blocks.iter().all(|block| block.ops.iter().all(|op| !matches!(op, Op::Call { .. }))));
}


#[test]
fn test_both_arms_diverge() {
	let (module, _, interner, _) = generate(
		|b| {
			let body = b.if_(b.int(1), b.break_(), Some(b.break_()));
			(b.while_(b.int(1), body), ())
		}
	);

	let main = function(&module, &interner, "main");

	assert!(blocks_labeled(main, "if_end").is_empty());
	assert_eq!(blocks_labeled(main, "loop_test").len(), 1);
}


#[test]
fn test_conditional_value() {
	let (module, _, interner, _) = generate(
		|b| {
			let value = b.if_(b.id("c"), b.int(2), Some(b.int(3)));

			let root = b.let_(
				vec![b.var("c", None, b.int(1)), b.var("x", None, value)],
				vec![b.call("print_int", vec![b.id("x")])],
			);

			(root, ())
		}
	);

	let main = function(&module, &interner, "main");
	let result = main.locals
		.iter()
		.position(|local| local.name.is_none())
		.map(|ix| Place::Local(LocalId(ix as u32)))
		.expect("conditional result slot");

	let then = blocks_labeled(main, "if_then")[0];
	let otherwise = blocks_labeled(main, "if_else")[0];
	let end = blocks_labeled(main, "if_end")[0];

	assert_eq!(then.ops, vec![Op::Store { place: result, value: Operand::Int(2) }]);
	assert_eq!(otherwise.ops, vec![Op::Store { place: result, value: Operand::Int(3) }]);
	assert_eq!(then.terminator, Terminator::Branch(end.id));
	assert_eq!(otherwise.terminator, Terminator::Branch(end.id));
	assert_matches!(end.ops[0], Op::Load { place, .. } if place == result);
}


#[test]
fn test_string_comparison() {
	let (module, _, interner, _) = generate(
		|b| {
			let condition = b.binary(BinaryOp::Lower, b.string("a"), b.string("b"));
			let root = b.seq(
				vec![
					b.if_(condition, b.call("print", vec![b.string("y")]), None),
					b.call("print", vec![b.string("a")]),
				]
			);

			(root, ())
		}
	);

	let main = function(&module, &interner, "main");
	let strcmp = interner.get("__strcmp").expect("strcmp linkage");
	let print = interner.get("__print").expect("print linkage");

	assert_eq!(
		main.entry().ops[1 ..],
		[
			Op::Call {
				dst: Some(Temp(1)),
				callee: strcmp,
				args: vec![Operand::Str(StrIx(0)), Operand::Str(StrIx(1))].into(),
			},
			Op::Binary { dst: Temp(2), op: BinOp::Lt, left: Operand::Temp(Temp(1)), right: Operand::Int(0) },
		]
	);

	let strings: Vec<&str> = module.strings.iter().map(|string| &**string).collect();
	assert_eq!(strings, vec!["a", "b", "y"]);
	assert_eq!(module.string(StrIx(2)), "y");

	let externals: Vec<Symbol> = module.externals.iter().map(|external| external.name).collect();
	assert_eq!(externals, vec![strcmp, print]);
	assert_eq!(module.externals[0].params[..], [Type::String, Type::String]);
	assert_eq!(module.externals[1].ret, Type::Void);
}


#[test]
fn test_worklist_order() {
	let (module, _, interner, _) = generate(
		|b| {
			let g = b.function(
				"g",
				vec![],
				None,
				b.let_(vec![b.function("h", vec![], None, b.seq(vec![]))], vec![b.call("h", vec![])]),
			);
			let f = b.function("f", vec![], None, b.call("g", vec![]));

			(b.let_(vec![f, g], vec![b.call("f", vec![])]), ())
		}
	);

	let names: Vec<&str> = module.functions
		.iter()
		.map(|function| interner.resolve(function.signature.name).expect("linkage name"))
		.collect();

	assert_eq!(names, vec!["main", "main.f", "main.g", "main.g.h"]);

	let f = function(&module, &interner, "main.f");
	assert_eq!(f.signature.ret, Type::Void);
	assert_matches!(f.entry().terminator, Terminator::Return(None));
}


#[test]
fn test_uninitialized_variable_has_no_store() {
	let (module, program, interner, _) = generate(
		|b| {
			let decl = Decl::Var(b.var_decl("x", Some("int"), None));
			(b.let_(vec![decl], vec![b.int(0)]), ())
		}
	);

	let main = function(&module, &interner, "main");

	assert_eq!(main.locals.len(), 1);
	assert_eq!(main.entry().ops, vec![Op::FrameAlloc { dst: Temp(0), layout: program.main.id }]);
}


#[test]
#[should_panic(expected = "is unreachable")]
fn test_verify_rejects_unreachable_blocks() {
	let (mut module, _, _, _) = generate(|b| (b.int(1), ()));

	let function = &mut module.functions[0];
	let id = BlockId(function.blocks.len() as u32);
	function.blocks.push(
		Block {
			id,
			label: "orphan",
			ops: Vec::new(),
			terminator: Terminator::Return(None),
		}
	);

	verify(&module);
}


#[test]
fn test_external_function_in_let_has_no_static_link() {
	let (module, _, interner, _) = generate(
		|b| {
			let h = b.function("h", vec![], Some("int"), b.id("n"));

			let mut f = b.fun_decl(
				"f",
				vec![b.param("n", "int")],
				Some("int"),
				Some(b.let_(vec![h], vec![b.call("h", vec![])])),
			);
			f.is_external = true;

			(b.let_(vec![Decl::Fun(f)], vec![b.call("f", vec![b.int(2)])]), ())
		}
	);

	let f = function(&module, &interner, "f");
	let h = function(&module, &interner, "f.h");

	assert!(!f.signature.has_static_link());
	assert_eq!(f.signature.params[..], [Type::Int]);
	assert_eq!(h.signature.params[..], [Type::Frame(f.signature.decl)]);
}


#[test]
fn test_hop_count() {
	assert_eq!(lower::hop_count(ast::NodeId(7), 3, 1), 2);
	assert_eq!(lower::hop_count(ast::NodeId(7), 1, 1), 0);
}


#[test]
#[should_panic(expected = "levels outside the scope")]
fn test_use_shallower_than_declaration() {
	lower::hop_count(ast::NodeId(7), 0, 2);
}
