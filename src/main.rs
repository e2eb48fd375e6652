mod args;
mod ast;
mod failure;
mod fmt;
mod frame;
mod ir;
mod semantic;
mod symbol;
mod term;
mod types;
#[cfg(test)]
mod tests;

use std::{fs::File, io::{self, BufReader, Write}};

use tracing_subscriber::EnvFilter;

use args::{Args, Command};
use failure::Failure;
use term::color;


/// The environment variable that configures the log filter.
const LOG_ENV: &str = "TIGERC_LOG";


fn main() -> ! {
	init_logging();

	let command = match args::parse(std::env::args_os()) {
		Ok(command) => command,
		Err(error) => {
			eprint!("{}", error);
			std::process::exit(1)
		}
	};

	let result = match command {
		Command::Run(args) => run(args),
		Command::Help(msg) | Command::Version(msg) => {
			println!("{}", msg);
			std::process::exit(0)
		},
	};

	let exit_code = match result {
		Ok(code) => code,
		Err(error) => {
			eprintln!("{}: {}", color::Fg(color::Red, "Error"), error);
			1
		}
	};

	std::process::exit(exit_code)
}


fn init_logging() {
	let filter = EnvFilter::try_from_env(LOG_ENV)
		.unwrap_or_else(|_| EnvFilter::new("warn"));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.init();
}


fn run(args: Args) -> Result<i32, Failure> {
	let mut interner = symbol::Interner::new();

	let ast = match &args.input {
		Some(path) => {
			tracing::debug!(path = %path.display(), "reading AST");
			ast::json::read(BufReader::new(File::open(path)?), &mut interner)?
		}

		None => {
			tracing::debug!("reading AST from stdin");
			ast::json::read(io::stdin().lock(), &mut interner)?
		}
	};

	let stdout = io::stdout();
	let stderr = io::stderr();

	compile(ast, &args, &mut interner, &mut stdout.lock(), &mut stderr.lock())
}


/// Run the passes over a tree. Returns the exit code: 2 if any binding error was found.
fn compile<O, E>(
	ast: ast::Ast,
	args: &Args,
	interner: &mut symbol::Interner,
	out: &mut O,
	err: &mut E,
) -> Result<i32, Failure>
where
	O: Write,
	E: Write,
{
	// ----------------------------------------------------------------------------------------
	let program = match semantic::Analyzer::analyze(ast, interner) {
		Ok(program) => program,

		Err(errors) => {
			write!(
				err,
				"{}",
				fmt::Show(
					errors,
					semantic::ErrorsDisplayContext {
						max_errors: Some(args.max_errors),
						interner,
					}
				)
			)?;

			return Ok(2);
		}
	};

	if args.check {
		return Ok(0);
	}

	// ----------------------------------------------------------------------------------------
	let frames = frame::Frames::compute(&program);

	if args.print_frames {
		writeln!(out, "{}", color::Fg(color::Yellow, "--------------------------------------------------"))?;
		write!(
			out,
			"{}",
			fmt::Show(
				&frames,
				frame::fmt::Context {
					interner,
					resolution: &program.resolution,
				}
			)
		)?;
	}

	// ----------------------------------------------------------------------------------------
	let module = ir::Generator::generate(&program, &frames);
	ir::verify(&module);

	if args.print_ir {
		writeln!(out, "{}", color::Fg(color::Yellow, "--------------------------------------------------"))?;
		write!(out, "{}", fmt::Show(&module, &*interner))?;
	}

	Ok(0)
}
