use std::{ffi::OsString, path::PathBuf};

use clap::{clap_app, crate_authors, crate_version, crate_description};


#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
	Help(Box<str>),
	Version(Box<str>),
	Run(Args)
}


#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Args {
	/// The JSON AST to compile. Standard input if absent.
	pub input: Option<PathBuf>,
	/// Resolve names only, don't generate code.
	pub check: bool,
	/// Print the frame layouts.
	pub print_frames: bool,
	/// Print the generated IR.
	pub print_ir: bool,
	/// Max number of reported binding errors.
	pub max_errors: usize,
}


impl Default for Args {
	fn default() -> Self {
		Self {
			input: None,
			check: false,
			print_frames: false,
			print_ir: false,
			max_errors: 20,
		}
	}
}


pub fn parse<A, T>(args: A) -> clap::Result<Command>
where
	A: IntoIterator<Item = T>,
	T: Into<OsString> + Clone
{
	let app = clap_app!(
		tigerc =>
			(version: crate_version!())
			(author: crate_authors!())
			(about: crate_description!())
			(@arg check: --check "Perform only name resolution instead of generating code.")
			(@arg frames: --frames "Print the frame layouts")
			(@arg ir: --ir "Print the generated IR")
			(@arg max_errors: --("max-errors") +takes_value "Max number of reported errors (default 20)")
			(@arg INPUT: "The JSON AST to compile. Reads standard input if omitted.")
	);

	match app.get_matches_from_safe(args) {
		Ok(matches) => {
			let max_errors = match matches.value_of("max_errors") {
				Some(value) => value
					.parse()
					.map_err(
						|_| clap::Error::with_description(
							&format!("invalid max errors: '{}'", value),
							clap::ErrorKind::InvalidValue,
						)
					)?,
				None => Args::default().max_errors,
			};

			Ok(
				Command::Run(
					Args {
						input: matches.value_of_os("INPUT").map(PathBuf::from),
						check: matches.is_present("check"),
						print_frames: matches.is_present("frames"),
						print_ir: matches.is_present("ir"),
						max_errors,
					}
				)
			)
		}

		Err(error) => match error.kind {
			clap::ErrorKind::HelpDisplayed => Ok(
				Command::Help(error.message.into_boxed_str())
			),
			clap::ErrorKind::VersionDisplayed => Ok(
				Command::Version(error.message.into_boxed_str())
			),
			_ => Err(error)
		}
	}
}
