//! Invocation Arguments
//!
//! Positional and named argument values passed to a memoized callable.

use crate::codec::Value;

// == Args ==
/// The literal argument values of one invocation.
///
/// Named arguments keep the order they were supplied in. That order feeds the
/// cache key, so callers must supply named arguments consistently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl Args {
    // == Constructor ==
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Adds a named argument. Re-using a name replaces the earlier value in place.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.named.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.named.push((name, value)),
        }
        self
    }

    // == Accessors ==
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Named arguments in supplied order.
    pub fn named_args(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.named.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Named argument by name.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Puts a bound receiver in front of the positional arguments.
    pub(crate) fn with_receiver(mut self, receiver: Value) -> Self {
        self.positional.insert(0, receiver);
        self
    }
}

/// Builds positional [`Args`] from a list of expressions.
///
/// ```ignore
/// let args = args![10, "usd"].named("precision", 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::memo::Args::new()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::memo::Args::new()$(.arg($arg))+
    };
}
