//! Contains the definition of [`Spanned`], an AST wrapper providing span information.

use std::ops::Range;

use crate::macros::base;

/// A wrapper around a value that contains its span, i.e. the start and stop offsets into the
/// original SQL text.
///
/// Spans survive binding untouched, since downstream rewriting replaces text by span.
#[apply(base)]
pub struct Spanned<T>(pub T, pub Range<usize>);

impl<T> Spanned<T> {
    /// Returns the span of the value.
    #[inline(always)]
    pub fn span(&self) -> Range<usize> {
        self.1.clone()
    }

    /// Returns the inner value.
    #[inline(always)]
    pub fn value(&self) -> &T {
        &self.0
    }

    /// Takes a closure and applies it to the inner value while preserving the span.
    #[inline(always)]
    pub fn map<F, O>(self, f: F) -> Spanned<O>
    where
        F: FnOnce(T) -> O,
    {
        let Spanned(value, span) = self;
        Spanned(f(value), span)
    }

    /// Like [`Spanned::map`], but borrows the value.
    #[inline(always)]
    pub fn map_ref<F, O>(&self, f: F) -> Spanned<O>
    where
        F: FnOnce(&T) -> O,
    {
        Spanned(f(&self.0), self.span())
    }

    /// Fallible version of [`Spanned::map_ref`].
    #[inline(always)]
    pub fn try_map_ref<F, O, E>(&self, f: F) -> Result<Spanned<O>, E>
    where
        F: FnOnce(&T) -> Result<O, E>,
    {
        Ok(Spanned(f(&self.0)?, self.span()))
    }
}

/// Type alias for vectors of spanned values.
pub type VecSpanned<T> = Vec<Spanned<T>>;

/// Type alias for boxed spanned values.
pub type BoxSpanned<T> = Box<Spanned<T>>;

/// Type alias for optional spanned values.
pub type OptSpanned<T> = Option<Spanned<T>>;
