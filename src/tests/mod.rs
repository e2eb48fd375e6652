
use std::io;

use crate::{args::Args, ast, compile, symbol};


/// Compile a JSON document, returning the exit code and both outputs.
fn run(args: &Args, file: std::fs::File) -> (i32, String, String) {
	let mut interner = symbol::Interner::new();
	let ast = ast::json::read(file, &mut interner).expect("valid AST document");

	let mut out = Vec::new();
	let mut err = Vec::new();

	let code = compile(ast, args, &mut interner, &mut out, &mut err).expect("compilation failure");

	(
		code,
		String::from_utf8(out).expect("utf-8 output"),
		String::from_utf8(err).expect("utf-8 output"),
	)
}


#[test]
fn test_positive_programs_compile() -> io::Result<()> {
	let args = Args { print_frames: true, print_ir: true, ..Args::default() };

	util::test_dir(
		"src/semantic/tests/data/positive",
		|path, file| {
			let (code, out, err) = run(&args, file);

			assert_eq!(code, 0, "{}: {}", path.display(), err);
			assert!(out.contains("function "), "{}: no IR printed", path.display());
			assert!(out.contains("frame "), "{}: no frames printed", path.display());

			Ok(())
		}
	)
}


#[test]
fn test_negative_programs_report_errors() -> io::Result<()> {
	util::test_dir(
		"src/semantic/tests/data/negative",
		|path, file| {
			let (code, out, err) = run(&Args::default(), file);

			assert_eq!(code, 2, "{}", path.display());
			assert!(out.is_empty());
			assert!(err.contains("Error"), "{}: no diagnostic", path.display());

			Ok(())
		}
	)
}


#[test]
fn test_check_skips_code_generation() {
	let mut interner = symbol::Interner::new();
	let ast = ast::json::from_str(r#"{ "kind": "call", "name": "print_int", "args": [ { "kind": "int", "value": 1 } ] }"#, &mut interner)
		.expect("valid AST document");

	let args = Args { check: true, print_ir: true, ..Args::default() };
	let mut out = Vec::new();
	let mut err = Vec::new();

	let code = compile(ast, &args, &mut interner, &mut out, &mut err).expect("compilation failure");

	assert_eq!(code, 0);
	assert!(out.is_empty());
	assert!(err.is_empty());
}


#[test]
fn test_max_errors() {
	let mut interner = symbol::Interner::new();
	let ast = ast::json::from_str(
		r#"{ "kind": "seq", "exprs": [ { "kind": "id", "name": "a" }, { "kind": "id", "name": "b" }, { "kind": "id", "name": "c" } ] }"#,
		&mut interner
	)
		.expect("valid AST document");

	let args = Args { max_errors: 1, ..Args::default() };
	let mut out = Vec::new();
	let mut err = Vec::new();

	let code = compile(ast, &args, &mut interner, &mut out, &mut err).expect("compilation failure");
	let err = String::from_utf8(err).expect("utf-8 output");

	assert_eq!(code, 2);
	assert_eq!(err.matches("is not declared in any enclosing scope").count(), 1);
	assert!(err.contains("more binding errors suppressed"));
}
