use crate::term::color;


/// Placeholder shown for names and nodes that have no printable form.
pub const ILL_FORMED: color::Fg<color::Red, &str> = color::Fg(color::Red, "<ill-formed>");


/// Formatting that needs something besides the value itself, usually the interner that
/// owns the names of declarations, diagnostics and IR.
pub trait Display<'a> {
	type Context: 'a;

	fn fmt(&self, f: &mut std::fmt::Formatter<'_>, context: Self::Context) -> std::fmt::Result;
}


impl<'a, T> Display<'a> for &T
where
	T: Display<'a>,
{
	type Context = T::Context;

	fn fmt(&self, f: &mut std::fmt::Formatter<'_>, context: Self::Context) -> std::fmt::Result {
		Display::fmt(*self, f, context)
	}
}


/// Pairs a value with its format context, so that it can be used with `{}`.
#[derive(Debug)]
pub struct Show<T, C>(pub T, pub C);


impl<'a, T, C> std::fmt::Display for Show<T, C>
where
	T: Display<'a, Context = C>,
	C: Copy,
{
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		self.0.fmt(f, self.1)
	}
}


/// Nesting depth in printed listings, two spaces per level.
#[derive(Debug, Default, Copy, Clone)]
pub struct Indentation(pub u8);


impl std::fmt::Display for Indentation {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{:width$}", "", width = 2 * self.0 as usize)
	}
}


/// Write the items of `iter` with `separator` between each pair.
pub fn sep_by<T, I, F, S>(
	iter: I,
	f: &mut std::fmt::Formatter,
	mut format: F,
	separator: S,
) -> std::fmt::Result
where
	I: IntoIterator<Item = T>,
	F: FnMut(T, &mut std::fmt::Formatter) -> std::fmt::Result,
	S: std::fmt::Display,
{
	for (ix, item) in iter.into_iter().enumerate() {
		if ix > 0 {
			separator.fmt(f)?;
		}
		format(item, f)?;
	}

	Ok(())
}
