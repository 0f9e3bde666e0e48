use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// Anything a parsed expression can be evaluated against. The only
/// requirement is a field-name to field-value lookup; a field that is
/// absent makes any comparison on it false.
pub trait Record {
	fn field(&self, name: &str) -> Option<&str>;
}

impl<K, V, S> Record for HashMap<K, V, S>
where
	K: Borrow<str> + Eq + Hash,
	V: AsRef<str>,
	S: BuildHasher,
{
	fn field(&self, name: &str) -> Option<&str> {
		self.get(name).map(AsRef::as_ref)
	}
}

impl<K, V> Record for BTreeMap<K, V>
where
	K: Borrow<str> + Ord,
	V: AsRef<str>,
{
	fn field(&self, name: &str) -> Option<&str> {
		self.get(name).map(AsRef::as_ref)
	}
}

impl<R: Record + ?Sized> Record for &R {
	fn field(&self, name: &str) -> Option<&str> {
		(**self).field(name)
	}
}
