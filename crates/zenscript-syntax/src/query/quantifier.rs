//! Item repetition and per-capture quantifiers.

use serde::Serialize;

/// How often a pattern item may match in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Repeat {
    One,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Repeat {
    pub fn min(self) -> usize {
        match self {
            Repeat::One | Repeat::OneOrMore => 1,
            Repeat::Optional | Repeat::ZeroOrMore => 0,
        }
    }

    /// `None` means unbounded.
    pub fn max(self) -> Option<usize> {
        match self {
            Repeat::One | Repeat::Optional => Some(1),
            Repeat::ZeroOrMore | Repeat::OneOrMore => None,
        }
    }

    pub fn quantifier(self) -> CaptureQuantifier {
        match self {
            Repeat::One => CaptureQuantifier::One,
            Repeat::Optional => CaptureQuantifier::ZeroOrOne,
            Repeat::ZeroOrMore => CaptureQuantifier::ZeroOrMore,
            Repeat::OneOrMore => CaptureQuantifier::OneOrMore,
        }
    }
}

/// How many nodes a capture holds in one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CaptureQuantifier {
    Zero,
    ZeroOrOne,
    ZeroOrMore,
    One,
    OneOrMore,
}

/// Lower bound 0 or 1, upper bound 0, 1 or many (2).
type Bounds = (u8, u8);

impl CaptureQuantifier {
    fn bounds(self) -> Bounds {
        match self {
            CaptureQuantifier::Zero => (0, 0),
            CaptureQuantifier::ZeroOrOne => (0, 1),
            CaptureQuantifier::ZeroOrMore => (0, 2),
            CaptureQuantifier::One => (1, 1),
            CaptureQuantifier::OneOrMore => (1, 2),
        }
    }

    fn from_bounds((min, max): Bounds) -> Self {
        match (min.min(1), max.min(2)) {
            (_, 0) => CaptureQuantifier::Zero,
            (0, 1) => CaptureQuantifier::ZeroOrOne,
            (0, _) => CaptureQuantifier::ZeroOrMore,
            (_, 1) => CaptureQuantifier::One,
            _ => CaptureQuantifier::OneOrMore,
        }
    }

    /// The capture appears in two alternatives; one of them matches.
    pub(crate) fn join(self, other: Self) -> Self {
        let (a, b) = (self.bounds(), other.bounds());
        Self::from_bounds((a.0.min(b.0), a.1.max(b.1)))
    }

    /// The capture appears in two places of one sequence; both match.
    pub(crate) fn add(self, other: Self) -> Self {
        let (a, b) = (self.bounds(), other.bounds());
        Self::from_bounds((a.0 + b.0, a.1 + b.1))
    }

    /// The capture appears inside an item repeated `outer` times.
    pub(crate) fn repeat(self, outer: Self) -> Self {
        let (a, b) = (self.bounds(), outer.bounds());
        Self::from_bounds((a.0 * b.0, a.1 * b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::CaptureQuantifier::*;

    #[test]
    fn alternatives_widen() {
        assert_eq!(One.join(Zero), ZeroOrOne);
        assert_eq!(One.join(OneOrMore), OneOrMore);
        assert_eq!(ZeroOrOne.join(OneOrMore), ZeroOrMore);
    }

    #[test]
    fn sequences_accumulate() {
        assert_eq!(One.add(One), OneOrMore);
        assert_eq!(Zero.add(ZeroOrOne), ZeroOrOne);
        assert_eq!(ZeroOrOne.add(ZeroOrOne), ZeroOrMore);
    }

    #[test]
    fn repetition_multiplies() {
        assert_eq!(One.repeat(ZeroOrOne), ZeroOrOne);
        assert_eq!(One.repeat(OneOrMore), OneOrMore);
        assert_eq!(ZeroOrOne.repeat(OneOrMore), ZeroOrMore);
        assert_eq!(Zero.repeat(OneOrMore), Zero);
    }
}
