use std::{any::Any, fmt, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::executor::FieldResult;

/// A deferred [`Data`] value produced by a zero-argument function.
pub type Thunk = Arc<dyn Fn() -> FieldResult + Send + Sync>;

/// A deferred [`Data`] value produced by an asynchronous computation.
pub type Deferred = Arc<dyn Fn() -> BoxFuture<'static, FieldResult> + Send + Sync>;

/// A dynamically typed value flowing into and out of resolvers.
///
/// `Data` is what resolvers return, what parent objects hand to their
/// children as the `source`, what coerced arguments are made of, and what
/// enum values carry as their internal payload. The executor only inspects
/// it at completion boundaries; in between it is opaque.
///
/// Deferred computation is normalized to two variants that the executor
/// forces uniformly before completing a value: [`Data::Thunk`] for
/// synchronous laziness and [`Data::Deferred`] for asynchronous work.
/// Application-specific values that the engine should not interpret go into
/// [`Data::Any`] and can be recovered in `is_type_of`/`resolve_type` hooks
/// and custom scalar serializers via [`Data::downcast_ref`].
#[derive(Clone)]
pub enum Data {
    /// The absence of a value.
    Null,
    /// A boolean value.
    Boolean(bool),
    /// A 32-bit signed integer value.
    Int(i32),
    /// An IEEE 754 double precision value.
    Float(f64),
    /// A string value.
    String(String),
    /// An ordered list of values.
    List(Arc<Vec<Data>>),
    /// An ordered map of values, keyed by field name.
    ///
    /// This is what the default resolver reads response keys from.
    Map(Arc<IndexMap<String, Data>>),
    /// A value that has to be forced by calling a zero-argument function.
    Thunk(Thunk),
    /// A value that has to be forced by awaiting a future.
    Deferred(Deferred),
    /// An opaque application value.
    Any(Arc<dyn Any + Send + Sync>),
}

impl Data {
    /// Construct a list value.
    pub fn list<I>(l: I) -> Self
    where
        I: IntoIterator<Item = Data>,
    {
        Self::List(Arc::new(l.into_iter().collect()))
    }

    /// Construct a map value.
    pub fn map<K, I>(m: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Data)>,
    {
        Self::Map(Arc::new(
            m.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Construct a lazily evaluated value.
    pub fn thunk<F>(f: F) -> Self
    where
        F: Fn() -> FieldResult + Send + Sync + 'static,
    {
        Self::Thunk(Arc::new(f))
    }

    /// Construct an asynchronously evaluated value.
    pub fn deferred<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = FieldResult> + Send + 'static,
    {
        Self::Deferred(Arc::new(move || Box::pin(f())))
    }

    /// Construct an opaque application value.
    pub fn any<T: Any + Send + Sync>(v: T) -> Self {
        Self::Any(Arc::new(v))
    }

    /// Does this value represent `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// View the underlying boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// View the underlying int value, if present.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// View the underlying float value, if present.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// View the underlying string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// View the underlying list value, if present.
    pub fn as_list(&self) -> Option<&[Data]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// View the underlying map value, if present.
    pub fn as_map(&self) -> Option<&IndexMap<String, Data>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Downcast an opaque [`Data::Any`] value to a concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Any(v) => v.downcast_ref(),
            _ => None,
        }
    }
}

impl Default for Data {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Self::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::List(l) => f.debug_tuple("List").field(l).finish(),
            Self::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Self::Thunk(..) => write!(f, "Thunk(..)"),
            Self::Deferred(..) => write!(f, "Deferred(..)"),
            Self::Any(..) => write!(f, "Any(..)"),
        }
    }
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(b1), Self::Boolean(b2)) => b1 == b2,
            (Self::Int(i1), Self::Int(i2)) => i1 == i2,
            (Self::Float(f1), Self::Float(f2)) => f1 == f2,
            (Self::String(s1), Self::String(s2)) => s1 == s2,
            (Self::List(l1), Self::List(l2)) => l1 == l2,
            (Self::Map(m1), Self::Map(m2)) => m1 == m2,
            (Self::Any(v1), Self::Any(v2)) => Arc::ptr_eq(v1, v2),
            _ => false,
        }
    }
}

impl<'a> From<&'a str> for Data {
    fn from(s: &'a str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i32> for Data {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Data {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Data {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<Data>> for Data {
    fn from(l: Vec<Data>) -> Self {
        Self::List(Arc::new(l))
    }
}

impl From<IndexMap<String, Data>> for Data {
    fn from(m: IndexMap<String, Data>) -> Self {
        Self::Map(Arc::new(m))
    }
}

impl<T> From<Option<T>> for Data
where
    Self: From<T>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
