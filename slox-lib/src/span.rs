//! This module provides [`Span`], [`Spanned`], and [`SourceMap`].

use std::{cmp, fmt, hash::Hash, ops::Deref};

/// A half-open range of byte offsets into the source code.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Span {
    /// The byte offset of the first character of the span.
    pub start: usize,

    /// The byte offset one past the last character of the span.
    pub end: usize,
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Span {
    /// The span covering both this span and the other one.
    pub fn to(self, other: Span) -> Self {
        Self {
            start: cmp::min(self.start, other.start),
            end: cmp::max(self.end, other.end),
        }
    }

    /// Extend this span in-place to also cover the other one.
    pub fn extend(&mut self, other: Span) {
        *self = self.to(other);
    }
}

/// A value paired with the span of source code it came from.
pub struct Spanned<T> {
    /// The span of the value.
    pub span: Span,

    /// The value itself.
    pub item: T,
}

impl<T> Spanned<T> {
    /// Wrap the given value with the given span.
    pub fn new(span: Span, item: T) -> Self {
        Self { span, item }
    }

    /// Map the inner value, keeping the span.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            span: self.span,
            item: f(self.item),
        }
    }
}

impl<T: Clone> Clone for Spanned<T> {
    fn clone(&self) -> Self {
        Self {
            span: self.span,
            item: self.item.clone(),
        }
    }
}

impl<T: Copy> Copy for Spanned<T> {}

impl<T: fmt::Debug> fmt::Debug for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.item, self.span)
    }
}

impl<T: PartialEq> PartialEq for Spanned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.span == other.span && self.item == other.item
    }
}

impl<T: Eq> Eq for Spanned<T> {}

impl<T: Hash> Hash for Spanned<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.span.hash(state);
        self.item.hash(state);
    }
}

impl<T> Deref for Spanned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.item
    }
}

/// A table of line start offsets, used to turn a [`Span`] into a 1-based line number.
pub struct SourceMap {
    /// The byte offset of the start of each line. The first entry is always 0.
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Build the line table for the given source code.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// Get the 1-based line number containing the given byte offset.
    ///
    /// Offsets past the end of the source clamp to the last line, so diagnostics
    /// for an EOF token still get a sensible line.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Get the line number of the start of the given span.
    pub fn line_of_span(&self, span: Span) -> usize {
        self.line_of(span.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_lookup() {
        let map = SourceMap::new("one\ntwo\nthree\n");

        assert_eq!(map.line_of(0), 1);
        assert_eq!(map.line_of(3), 1);
        assert_eq!(map.line_of(4), 2);
        assert_eq!(map.line_of(7), 2);
        assert_eq!(map.line_of(8), 3);
        assert_eq!(map.line_of(13), 3);
        assert_eq!(map.line_of(14), 4);
    }

    #[test]
    fn line_lookup_clamps_past_the_end() {
        let map = SourceMap::new("var a;");
        assert_eq!(map.line_of(1000), 1);
    }

    #[test]
    fn span_union() {
        let a = Span { start: 3, end: 7 };
        let b = Span { start: 5, end: 12 };
        assert_eq!(a.to(b), Span { start: 3, end: 12 });
        assert_eq!(b.to(a), Span { start: 3, end: 12 });
    }
}
