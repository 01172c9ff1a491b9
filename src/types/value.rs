//! Runtime values.
//!
//! Active objects are dynamically typed at the runtime boundary: fields,
//! method arguments, and results are all [`Value`]s. The variant set mirrors
//! the modeling language's ground types plus references to objects and
//! futures. Object equality is identity (object id), not structural; future
//! equality is slot identity.

use crate::future::Fut;
use crate::object::ObjectRef;
use core::fmt;

/// A tagged runtime value.
#[derive(Clone)]
pub enum Value {
    /// The unit value.
    Unit,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// A reference to an active object.
    Object(ObjectRef),
    /// A reference to a future.
    Fut(Fut),
    /// An ordered list of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns the integer payload, if this value is an `Int`.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this value is a `Bool`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string payload, if this value is a `Str`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the object reference, if this value is an `Object`.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns the future, if this value is a `Fut`.
    #[must_use]
    pub fn as_fut(&self) -> Option<&Fut> {
        match self {
            Self::Fut(f) => Some(f),
            _ => None,
        }
    }

    /// Returns true if this value is `Unit`.
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.id() == b.id(),
            (Self::Fut(a), Self::Fut(b)) => a.same_slot(b),
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "Unit"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(n) => write!(f, "Int({n})"),
            Self::Float(x) => write!(f, "Float({x})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Object(o) => write!(f, "Object({})", o.id()),
            Self::Fut(_) => write!(f, "Fut"),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Unit
    }
}
