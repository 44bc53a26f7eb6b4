//! Value domains for consistency checking
//!
//! A numeric variable is narrowed to an interval with optional pinned value
//! and a list of excluded points; a text variable has only equality and
//! exclusions. Applying a constraint returns `false` once the domain admits
//! no value.

use crate::semantic::Comparator;
use std::collections::HashSet;

/// One end of a numeric interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

/// The more restrictive of two lower bounds
pub fn tighter_lower(current: Option<Bound>, new: Bound) -> Bound {
    match current {
        None => new,
        Some(old) if new.value > old.value => new,
        Some(old) if new.value < old.value => old,
        Some(old) => Bound {
            value: old.value,
            inclusive: old.inclusive && new.inclusive,
        },
    }
}

/// The more restrictive of two upper bounds
pub fn tighter_upper(current: Option<Bound>, new: Bound) -> Bound {
    match current {
        None => new,
        Some(old) if new.value < old.value => new,
        Some(old) if new.value > old.value => old,
        Some(old) => Bound {
            value: old.value,
            inclusive: old.inclusive && new.inclusive,
        },
    }
}

pub fn bounds_contradict(lower: &Bound, upper: &Bound) -> bool {
    lower.value > upper.value
        || (lower.value == upper.value && !(lower.inclusive && upper.inclusive))
}

pub fn value_within(value: f64, lower: Option<&Bound>, upper: Option<&Bound>) -> bool {
    let above_lower = match lower {
        None => true,
        Some(b) if b.inclusive => value >= b.value,
        Some(b) => value > b.value,
    };
    let below_upper = match upper {
        None => true,
        Some(b) if b.inclusive => value <= b.value,
        Some(b) => value < b.value,
    };
    above_lower && below_upper
}

/// What is still possible for a number variable within one AND-group
///
/// Exclusions compare with exact `f64` equality, so `0.1 + 0.2` and `0.3`
/// are different points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericDomain {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
    pub equal: Option<f64>,
    pub excludes: Vec<f64>,
}

impl NumericDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow the domain by `variable <comparator> value`
    pub fn apply(&mut self, comparator: Comparator, value: f64) -> bool {
        match comparator {
            Comparator::GreaterThan | Comparator::GreaterThanOrEqual => {
                let bound = Bound {
                    value,
                    inclusive: comparator == Comparator::GreaterThanOrEqual,
                };
                self.lower = Some(tighter_lower(self.lower, bound));
            }
            Comparator::LessThan | Comparator::LessThanOrEqual => {
                let bound = Bound {
                    value,
                    inclusive: comparator == Comparator::LessThanOrEqual,
                };
                self.upper = Some(tighter_upper(self.upper, bound));
            }
            Comparator::Equal => {
                if !value_within(value, self.lower.as_ref(), self.upper.as_ref())
                    || self.excludes.contains(&value)
                {
                    return false;
                }
                self.equal = Some(value);
                self.lower = Some(Bound::inclusive(value));
                self.upper = Some(Bound::inclusive(value));
            }
            Comparator::NotEqual => {
                if self.equal == Some(value) {
                    return false;
                }
                self.excludes.push(value);
            }
        }
        !self.is_empty()
    }

    /// True once no number satisfies every constraint applied so far
    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => {
                if bounds_contradict(lower, upper) {
                    return true;
                }
                // A closed interval of width zero is a single point
                lower.value == upper.value && self.excludes.contains(&lower.value)
            }
            _ => false,
        }
    }
}

/// What is still possible for a text variable within one AND-group
///
/// Text has no ordering here, so only `=` and `!=` narrow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextDomain {
    pub equal: Option<String>,
    pub excludes: HashSet<String>,
}

impl TextDomain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, comparator: Comparator, value: &str) -> bool {
        match comparator {
            Comparator::Equal => {
                let conflicts_with_equal = self.equal.as_deref().is_some_and(|e| e != value);
                if conflicts_with_equal || self.excludes.contains(value) {
                    return false;
                }
                self.equal = Some(value.to_string());
                true
            }
            Comparator::NotEqual => {
                if self.equal.as_deref() == Some(value) {
                    return false;
                }
                self.excludes.insert(value.to_string());
                true
            }
            _ => true,
        }
    }
}
