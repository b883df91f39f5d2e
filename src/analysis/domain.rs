//! The constant-propagation abstract domain.
//!
//! Three layers:
//!
//! - [`SignedDomain`]: an exact signed integer or a sign interval. This is
//!   the numeric half of the domain; null references are modeled as the
//!   exact integer 0, so "provably non-null" is the non-zero interval.
//! - [`AbstractValue`]: the closed union over everything a register can be
//!   abstracted to — unreachable (bottom), a signed integer domain, a
//!   string constant, a class-object constant, or unconstrained (top).
//!   Adding a variant forces every consumer (most importantly the
//!   materializer) to handle it, by exhaustive matching.
//! - [`ConstantEnvironment`]: a register → value map valid at one program
//!   point. A bottom environment marks the point unreachable; storing a
//!   bottom value into any register collapses the whole environment to
//!   bottom.

use std::collections::HashMap;

use crate::{
    analysis::{JoinSemiLattice, MeetSemiLattice},
    ir::{Reg, StrRef, TypeRef},
};

/// A sign interval over the signed 64-bit integers.
///
/// The exact-zero set is not representable here; it normalizes to
/// [`SignedDomain::Exact`]`(0)` instead, so interval meets that collapse
/// to a single point return an exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// Any value.
    All,
    /// Strictly negative.
    Ltz,
    /// Non-positive.
    Lez,
    /// Strictly positive.
    Gtz,
    /// Non-negative.
    Gez,
    /// Non-zero.
    Nez,
}

impl Interval {
    /// Returns `true` if the interval contains the given value.
    #[must_use]
    pub const fn contains(self, value: i64) -> bool {
        match self {
            Self::All => true,
            Self::Ltz => value < 0,
            Self::Lez => value <= 0,
            Self::Gtz => value > 0,
            Self::Gez => value >= 0,
            Self::Nez => value != 0,
        }
    }

    /// Returns `true` if every value of the interval is non-zero.
    #[must_use]
    pub const fn excludes_zero(self) -> bool {
        matches!(self, Self::Ltz | Self::Gtz | Self::Nez)
    }

    fn intersect(self, other: Self) -> Option<SignedDomain> {
        use Interval::{All, Gez, Gtz, Lez, Ltz, Nez};
        let range = |i| Some(SignedDomain::Range(i));
        match (self, other) {
            (All, x) | (x, All) => range(x),
            (a, b) if a == b => range(a),
            (Ltz, Lez) | (Lez, Ltz) | (Ltz, Nez) | (Nez, Ltz) | (Lez, Nez) | (Nez, Lez) => {
                range(Ltz)
            }
            (Gtz, Gez) | (Gez, Gtz) | (Gtz, Nez) | (Nez, Gtz) | (Gez, Nez) | (Nez, Gez) => {
                range(Gtz)
            }
            (Lez, Gez) | (Gez, Lez) => Some(SignedDomain::Exact(0)),
            _ => None,
        }
    }

    fn cover(self, other: Self) -> Self {
        use Interval::{All, Gez, Gtz, Lez, Ltz, Nez};
        match (self, other) {
            (a, b) if a == b => a,
            (Ltz, Lez) | (Lez, Ltz) => Lez,
            (Ltz, Gtz) | (Gtz, Ltz) | (Ltz, Nez) | (Nez, Ltz) | (Gtz, Nez) | (Nez, Gtz) => Nez,
            (Gtz, Gez) | (Gez, Gtz) => Gez,
            _ => All,
        }
    }

    /// Returns the smallest interval containing this one and the value.
    fn cover_value(self, value: i64) -> Self {
        use Interval::{All, Gez, Gtz, Lez, Ltz, Nez};
        match self {
            Ltz if value < 0 => Ltz,
            Ltz if value == 0 => Lez,
            Ltz => Nez,
            Lez if value <= 0 => Lez,
            Lez => All,
            Gtz if value > 0 => Gtz,
            Gtz if value == 0 => Gez,
            Gtz => Nez,
            Gez if value >= 0 => Gez,
            Gez => All,
            Nez if value != 0 => Nez,
            Nez => All,
            All => All,
        }
    }
}

/// An exact signed integer or a sign interval.
///
/// This domain has no bottom element of its own: an infeasible meet is
/// reported as `None` and lifts to [`AbstractValue::Bottom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedDomain {
    /// Exactly this value.
    Exact(i64),
    /// Any value in the interval.
    Range(Interval),
}

impl SignedDomain {
    /// The non-zero domain, the abstraction of "provably non-null".
    pub const NEZ: Self = Self::Range(Interval::Nez);

    /// Returns the exact value, if the domain is a single point.
    #[must_use]
    pub const fn constant(self) -> Option<i64> {
        match self {
            Self::Exact(v) => Some(v),
            Self::Range(_) => None,
        }
    }

    /// Returns `true` if zero is excluded.
    #[must_use]
    pub const fn is_nonzero(self) -> bool {
        match self {
            Self::Exact(v) => v != 0,
            Self::Range(i) => i.excludes_zero(),
        }
    }

    /// Returns `true` if the domain contains the value.
    #[must_use]
    pub const fn contains(self, value: i64) -> bool {
        match self {
            Self::Exact(v) => v == value,
            Self::Range(i) => i.contains(value),
        }
    }

    /// Greatest lower bound; `None` when the intersection is empty.
    #[must_use]
    pub fn meet(self, other: Self) -> Option<Self> {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => (a == b).then_some(Self::Exact(a)),
            (Self::Exact(a), Self::Range(i)) | (Self::Range(i), Self::Exact(a)) => {
                i.contains(a).then_some(Self::Exact(a))
            }
            (Self::Range(a), Self::Range(b)) => a.intersect(b),
        }
    }

    /// Least upper bound.
    #[must_use]
    pub fn join(self, other: Self) -> Self {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) if a == b => Self::Exact(a),
            (Self::Exact(a), Self::Exact(b)) => {
                let interval = if a > 0 && b > 0 {
                    Interval::Gtz
                } else if a >= 0 && b >= 0 {
                    Interval::Gez
                } else if a < 0 && b < 0 {
                    Interval::Ltz
                } else if a <= 0 && b <= 0 {
                    Interval::Lez
                } else {
                    // one strictly negative, one strictly positive
                    Interval::Nez
                };
                Self::Range(interval)
            }
            (Self::Exact(a), Self::Range(i)) | (Self::Range(i), Self::Exact(a)) => {
                Self::Range(i.cover_value(a))
            }
            (Self::Range(a), Self::Range(b)) => Self::Range(a.cover(b)),
        }
    }

    /// Smallest known lower bound, when the domain has one.
    #[must_use]
    pub const fn lower_bound(self) -> Option<i64> {
        match self {
            Self::Exact(v) => Some(v),
            Self::Range(Interval::Gtz) => Some(1),
            Self::Range(Interval::Gez) => Some(0),
            Self::Range(_) => None,
        }
    }

    /// Largest known upper bound, when the domain has one.
    #[must_use]
    pub const fn upper_bound(self) -> Option<i64> {
        match self {
            Self::Exact(v) => Some(v),
            Self::Range(Interval::Ltz) => Some(-1),
            Self::Range(Interval::Lez) => Some(0),
            Self::Range(_) => None,
        }
    }
}

/// Abstract value of one register at one program point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AbstractValue {
    /// Unreachable / contradiction.
    Bottom,
    /// A signed integer (or null-ness, with null as exact zero).
    Int(SignedDomain),
    /// A known string constant.
    Str(StrRef),
    /// A known class-object constant (the result of a class-literal load).
    ClassObject(TypeRef),
    /// Unconstrained.
    #[default]
    Top,
}

impl AbstractValue {
    /// Convenience constructor for an exact integer.
    #[must_use]
    pub const fn exact(value: i64) -> Self {
        Self::Int(SignedDomain::Exact(value))
    }

    /// The abstraction of a provably non-null reference with unknown
    /// identity.
    #[must_use]
    pub const fn nonnull() -> Self {
        Self::Int(SignedDomain::NEZ)
    }

    /// Returns the exact integer, if this value is a single point.
    #[must_use]
    pub const fn constant_int(&self) -> Option<i64> {
        match self {
            Self::Int(d) => d.constant(),
            _ => None,
        }
    }

    /// Returns the signed domain, if this is an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<SignedDomain> {
        match self {
            Self::Int(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the string constant, if this is one.
    #[must_use]
    pub const fn as_string(&self) -> Option<&StrRef> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the class-object constant, if this is one.
    #[must_use]
    pub const fn as_class_object(&self) -> Option<&TypeRef> {
        match self {
            Self::ClassObject(t) => Some(t),
            _ => None,
        }
    }

    /// Returns `true` if the value is exactly the null reference.
    #[must_use]
    pub fn is_exact_null(&self) -> bool {
        self.constant_int() == Some(0)
    }

    /// Returns `true` if the value can never be the null reference.
    ///
    /// String and class-object constants are object identities and thus
    /// non-null; an integer domain qualifies when it excludes zero.
    #[must_use]
    pub const fn is_provably_nonnull(&self) -> bool {
        match self {
            Self::Str(_) | Self::ClassObject(_) => true,
            Self::Int(d) => d.is_nonzero(),
            Self::Bottom | Self::Top => false,
        }
    }

    /// Returns `true` if two values are provably the same concrete
    /// runtime value.
    ///
    /// This is deliberately conservative: it holds only when both sides
    /// are single concrete constants of the same kind. Top, bottom, and
    /// interval values never compare equal at runtime by proof.
    #[must_use]
    pub fn provably_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => match (a.constant(), b.constant()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::ClassObject(a), Self::ClassObject(b)) => a == b,
            _ => false,
        }
    }
}

impl MeetSemiLattice for AbstractValue {
    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Bottom, _) | (_, Self::Bottom) => Self::Bottom,
            (Self::Top, x) | (x, Self::Top) => x.clone(),
            (Self::Int(a), Self::Int(b)) => a.meet(*b).map_or(Self::Bottom, Self::Int),
            (Self::Str(a), Self::Str(b)) if a == b => Self::Str(a.clone()),
            (Self::ClassObject(a), Self::ClassObject(b)) if a == b => {
                Self::ClassObject(a.clone())
            }
            _ => Self::Bottom,
        }
    }

    fn is_bottom(&self) -> bool {
        matches!(self, Self::Bottom)
    }
}

impl JoinSemiLattice for AbstractValue {
    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Top, _) | (_, Self::Top) => Self::Top,
            (Self::Bottom, x) | (x, Self::Bottom) => x.clone(),
            (Self::Int(a), Self::Int(b)) => Self::Int(a.join(*b)),
            (Self::Str(a), Self::Str(b)) if a == b => Self::Str(a.clone()),
            (Self::ClassObject(a), Self::ClassObject(b)) if a == b => {
                Self::ClassObject(a.clone())
            }
            _ => Self::Top,
        }
    }

    fn is_top(&self) -> bool {
        matches!(self, Self::Top)
    }
}

/// The abstract state of all registers at one program point.
///
/// Registers absent from the map are unconstrained (top), so the map only
/// ever holds registers something is known about. The environment itself
/// can be bottom, which marks the program point as unreachable; every
/// query against a bottom environment answers bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantEnvironment {
    // None encodes the bottom environment.
    values: Option<HashMap<Reg, AbstractValue>>,
}

impl ConstantEnvironment {
    /// The environment knowing nothing (all registers top).
    #[must_use]
    pub fn top() -> Self {
        Self {
            values: Some(HashMap::new()),
        }
    }

    /// The unreachable environment.
    #[must_use]
    pub const fn bottom() -> Self {
        Self { values: None }
    }

    /// Returns `true` if this program point is unreachable.
    #[must_use]
    pub const fn is_bottom(&self) -> bool {
        self.values.is_none()
    }

    /// Marks this program point unreachable.
    pub fn set_to_bottom(&mut self) {
        self.values = None;
    }

    /// Returns the abstract value of a register.
    #[must_use]
    pub fn get(&self, reg: Reg) -> AbstractValue {
        match &self.values {
            None => AbstractValue::Bottom,
            Some(map) => map.get(&reg).cloned().unwrap_or_default(),
        }
    }

    /// Binds a register to a value.
    ///
    /// Binding bottom collapses the whole environment to bottom; binding
    /// top removes the register from the map.
    pub fn set(&mut self, reg: Reg, value: AbstractValue) {
        if self.values.is_none() {
            return;
        }
        if value.is_bottom() {
            self.values = None;
            return;
        }
        if let Some(map) = &mut self.values {
            if value.is_top() {
                map.remove(&reg);
            } else {
                map.insert(reg, value);
            }
        }
    }

    /// Refines a register by meeting its current value with `value`.
    pub fn refine(&mut self, reg: Reg, value: &AbstractValue) {
        let refined = self.get(reg).meet(value);
        self.set(reg, refined);
    }

    /// Builder-style [`set`](Self::set), for seeding entry environments.
    #[must_use]
    pub fn with_value(mut self, reg: Reg, value: AbstractValue) -> Self {
        self.set(reg, value);
        self
    }

    /// Joins another environment into this one, returning `true` if
    /// anything changed.
    ///
    /// This is the merge-point operation of the forward fixpoint: the
    /// result covers both incoming states, widening toward top.
    pub fn join_with(&mut self, other: &Self) -> bool {
        let Some(theirs) = &other.values else {
            // other is bottom: identity
            return false;
        };
        let Some(ours) = &self.values else {
            *self = other.clone();
            return true;
        };
        let mut joined: HashMap<Reg, AbstractValue> = HashMap::new();
        for (reg, value) in ours {
            let other_value = theirs.get(reg).cloned().unwrap_or_default();
            let j = value.join(&other_value);
            if !j.is_top() {
                joined.insert(*reg, j);
            }
        }
        let changed = ours != &joined;
        self.values = Some(joined);
        changed
    }
}

impl Default for ConstantEnvironment {
    fn default() -> Self {
        Self::top()
    }
}
