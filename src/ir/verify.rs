use super::{Function, Module, Op, Operand, Place, Terminator};


/// Check the well-formedness of a generated module. Every block must be reachable from
/// its function's entry and every reference must point inside the function.
/// Violations are internal errors, so they panic.
pub fn verify(module: &Module) {
	for function in &module.functions {
		verify_function(function, module);
	}
}


fn verify_function(function: &Function, module: &Module) {
	let decl = function.signature.decl;

	if function.blocks.is_empty() {
		panic!("function {} has no blocks", decl);
	}

	let mut reached = vec![false; function.blocks.len()];
	let mut stack = vec![0];

	while let Some(ix) = stack.pop() {
		if reached[ix] {
			continue;
		}
		reached[ix] = true;

		let block = &function.blocks[ix];

		if block.id.0 as usize != ix {
			panic!("block {} of function {} is stored at index {}", block.id.0, decl, ix);
		}

		for op in &block.ops {
			verify_op(op, function, module);
		}

		if let Terminator::CondBranch { cond, .. } | Terminator::Return(Some(cond)) = &block.terminator {
			verify_operand(cond, function, module);
		}

		for successor in block.terminator.successors() {
			let successor = successor.0 as usize;

			if successor >= function.blocks.len() {
				panic!("block {} of function {} branches to missing block {}", ix, decl, successor);
			}

			stack.push(successor);
		}
	}

	if let Some(ix) = reached.iter().position(|reached| !reached) {
		panic!(
			"block {} ({}) of function {} is unreachable",
			ix,
			function.blocks[ix].label,
			decl,
		);
	}
}


fn verify_op(op: &Op, function: &Function, module: &Module) {
	match op {
		Op::FrameAlloc { layout, .. } => {
			if *layout != function.frame.function {
				panic!("function {} allocates the frame of {}", function.signature.decl, layout);
			}
		}

		Op::Load { place, .. } => verify_place(place, function, module),

		Op::Store { place, value } => {
			verify_place(place, function, module);
			verify_operand(value, function, module);
		}

		Op::Binary { left, right, .. } => {
			verify_operand(left, function, module);
			verify_operand(right, function, module);
		}

		Op::Call { args, .. } => {
			for arg in args.iter() {
				verify_operand(arg, function, module);
			}
		}
	}
}


fn verify_place(place: &Place, function: &Function, module: &Module) {
	match place {
		Place::Local(local) => {
			if local.0 as usize >= function.locals.len() {
				panic!("function {} uses missing local {}", function.signature.decl, local.0);
			}
		}

		Place::Field { frame, .. } => verify_operand(frame, function, module),
	}
}


fn verify_operand(operand: &Operand, function: &Function, module: &Module) {
	let decl = function.signature.decl;

	match operand {
		Operand::Temp(temp) if temp.0 >= function.temps => {
			panic!("function {} uses undefined temporary {}", decl, temp.0)
		}

		Operand::Param(ix) if *ix as usize >= function.signature.params.len() => {
			panic!("function {} uses missing parameter {}", decl, ix)
		}

		Operand::Str(ix) if ix.0 as usize >= module.strings.len() => {
			panic!("function {} uses missing string {}", decl, ix.0)
		}

		_ => (),
	}
}
