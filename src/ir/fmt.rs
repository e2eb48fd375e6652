use std::fmt::Display as _;

use super::{BinOp, Block, Function, Module, Op, Operand, Place, Signature, Terminator};
use crate::{
	fmt::{self, Display, Indentation},
	symbol,
	term::color,
};


impl std::fmt::Display for Operand {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Temp(temp) => write!(f, "%{}", temp.0),
			Self::Param(ix) => write!(f, "${}", ix),
			Self::Int(value) => write!(f, "{}", color::Fg(color::Cyan, value)),
			Self::Str(ix) => write!(f, "{}", color::Fg(color::Yellow, format_args!("str{}", ix.0))),
		}
	}
}


impl std::fmt::Display for Place {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Local(local) => write!(f, "_{}", local.0),
			Self::Field { frame, layout, field } => write!(f, "{}->frame{}.{}", frame, layout, field),
		}
	}
}


impl std::fmt::Display for BinOp {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let op = match self {
			Self::Add => "add",
			Self::Sub => "sub",
			Self::Mul => "mul",
			Self::Div => "sdiv",
			Self::Eq => "eq",
			Self::Ne => "ne",
			Self::Lt => "slt",
			Self::Le => "sle",
			Self::Gt => "sgt",
			Self::Ge => "sge",
		};

		color::Fg(color::Magenta, op).fmt(f)
	}
}


impl std::fmt::Display for Terminator {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Branch(target) => write!(f, "{} bb{}", color::Bold("br"), target.0),

			Self::CondBranch { cond, then, otherwise } => write!(
				f,
				"{} {}, bb{}, bb{}",
				color::Bold("br"),
				cond,
				then.0,
				otherwise.0,
			),

			Self::Return(Some(value)) => write!(f, "{} {}", color::Bold("ret"), value),
			Self::Return(None) => color::Bold("ret").fmt(f),
		}
	}
}


impl<'a> Display<'a> for Op {
	type Context = &'a symbol::Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		match self {
			Self::FrameAlloc { dst, layout } => write!(f, "%{} = frame_alloc frame{}", dst.0, layout),

			Self::Load { dst, place } => write!(f, "%{} = load {}", dst.0, place),

			Self::Store { place, value } => write!(f, "store {}, {}", place, value),

			Self::Binary { dst, op, left, right } => write!(f, "%{} = {} {}, {}", dst.0, op, left, right),

			Self::Call { dst, callee, args } => {
				if let Some(dst) = dst {
					write!(f, "%{} = ", dst.0)?;
				}

				"call ".fmt(f)?;
				callee.fmt(f, context)?;
				"(".fmt(f)?;
				fmt::sep_by(args.iter(), f, |arg, f| arg.fmt(f), ", ")?;
				")".fmt(f)
			}
		}
	}
}


impl<'a> Display<'a> for Signature {
	type Context = &'a symbol::Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		self.name.fmt(f, context)?;
		"(".fmt(f)?;
		fmt::sep_by(self.params.iter(), f, |param, f| param.fmt(f), ", ")?;
		write!(f, ") : {}", self.ret)
	}
}


impl<'a> Display<'a> for Block {
	type Context = &'a symbol::Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		writeln!(f, "{}bb{} ({}):", Indentation(1), self.id.0, self.label)?;

		for op in &self.ops {
			write!(f, "{}", Indentation(2))?;
			op.fmt(f, context)?;
			writeln!(f)?;
		}

		writeln!(f, "{}{}", Indentation(2), self.terminator)
	}
}


impl<'a> Display<'a> for Function {
	type Context = &'a symbol::Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		color::Bold("function ").fmt(f)?;
		self.signature.fmt(f, context)?;
		writeln!(f)?;

		write!(f, "{}frame{}: ", Indentation(1), self.frame.function)?;
		fmt::sep_by(self.frame.fields.iter(), f, |field, f| field.ty.fmt(f), ", ")?;
		writeln!(f)?;

		for (ix, local) in self.locals.iter().enumerate() {
			write!(f, "{}_{}: {}", Indentation(1), ix, local.ty)?;

			if let Some(name) = local.name {
				" // ".fmt(f)?;
				name.fmt(f, context)?;
			}

			writeln!(f)?;
		}

		for block in &self.blocks {
			block.fmt(f, context)?;
		}

		Ok(())
	}
}


impl<'a> Display<'a> for Module {
	type Context = &'a symbol::Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		for external in &self.externals {
			color::Bold("extern ").fmt(f)?;
			external.fmt(f, context)?;
			writeln!(f)?;
		}

		for (ix, string) in self.strings.iter().enumerate() {
			writeln!(f, "{} = {:?}", color::Fg(color::Yellow, format_args!("str{}", ix)), string)?;
		}

		for function in &self.functions {
			writeln!(f)?;
			function.fmt(f, context)?;
		}

		Ok(())
	}
}
