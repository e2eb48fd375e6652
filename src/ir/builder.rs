use super::{Block, BlockId, Local, LocalId, Op, Temp, Terminator};
use crate::{symbol::Symbol, types::Type};


#[derive(Debug)]
struct PartialBlock {
	label: &'static str,
	ops: Vec<Op>,
	terminator: Option<Terminator>,
}


/// Builds the blocks of a single function.
///
/// The builder is always either positioned at an open block, where operations are
/// appended, or sealed right after a terminator. Code generated while sealed would be
/// unreachable, so appending in that state is an internal error.
#[derive(Debug)]
pub struct FunctionBuilder {
	blocks: Vec<PartialBlock>,
	current: Option<BlockId>,
	locals: Vec<Local>,
	temps: u32,
}


impl FunctionBuilder {
	/// Create a builder positioned at a fresh entry block.
	pub fn new() -> Self {
		let mut builder = Self {
			blocks: Vec::new(),
			current: None,
			locals: Vec::new(),
			temps: 0,
		};

		let entry = builder.create_block("entry");
		builder.position_at(entry);

		builder
	}


	/// Create an empty block. The builder stays where it is.
	pub fn create_block(&mut self, label: &'static str) -> BlockId {
		let id = BlockId(self.blocks.len() as u32);

		self.blocks.push(
			PartialBlock {
				label,
				ops: Vec::new(),
				terminator: None,
			}
		);

		id
	}


	/// Continue appending at the given block, which must not be terminated.
	pub fn position_at(&mut self, block: BlockId) {
		let target = &self.blocks[block.0 as usize];

		if target.terminator.is_some() {
			panic!("positioning at terminated block {} ({})", block.0, target.label);
		}

		self.current = Some(block);
	}


	pub fn push(&mut self, op: Op) {
		let block = self.open_block();
		block.ops.push(op);
	}


	/// Terminate the open block and seal the builder.
	pub fn terminate(&mut self, terminator: Terminator) {
		let block = self.open_block();
		block.terminator = Some(terminator);

		self.current = None;
	}


	pub fn temp(&mut self) -> Temp {
		let temp = Temp(self.temps);
		self.temps += 1;
		temp
	}


	pub fn local(&mut self, name: Option<Symbol>, ty: Type) -> LocalId {
		let id = LocalId(self.locals.len() as u32);
		self.locals.push(Local { name, ty });
		id
	}


	/// Finish the function, returning its locals, blocks and temporary count.
	/// Panics if any block was left without a terminator.
	pub fn finish(self) -> (Vec<Local>, Vec<Block>, u32) {
		let blocks = self.blocks
			.into_iter()
			.enumerate()
			.map(
				|(ix, block)| {
					let PartialBlock { label, ops, terminator } = block;

					Block {
						id: BlockId(ix as u32),
						label,
						ops,
						terminator: terminator.unwrap_or_else(
							|| panic!("block {} ({}) has no terminator", ix, label)
						),
					}
				}
			)
			.collect();

		(self.locals, blocks, self.temps)
	}


	fn open_block(&mut self) -> &mut PartialBlock {
		let current = self.current.expect("code generated after a terminator");

		&mut self.blocks[current.0 as usize]
	}
}


impl Default for FunctionBuilder {
	fn default() -> Self {
		Self::new()
	}
}
