//! An explicit catalogue of the operations the workspace exposes.
//!
//! Each crate contributes entries through its own `register` function; the
//! CLI builds one registry at start-up and lists it.

/// A named operation with a one-line summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    name: &'static str,
    summary: &'static str,
}

impl Capability {
    /// Describe an operation.
    pub const fn new(name: &'static str, summary: &'static str) -> Self {
        Self { name, summary }
    }

    /// Operation name, unique within a registry.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// One-line description.
    pub const fn summary(&self) -> &'static str {
        self.summary
    }
}

/// Capabilities in registration order.
///
/// # Examples
/// ```
/// use windbreaks_core::{Capability, Registry};
///
/// let mut registry = Registry::new();
/// registry.register(Capability::new("ingest", "read storm events"));
/// assert_eq!(registry.len(), 1);
/// assert_eq!(registry.get("ingest").map(Capability::summary), Some("read storm events"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    capabilities: Vec<Capability>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capability. Registering a name twice replaces the earlier
    /// entry in place.
    pub fn register(&mut self, capability: Capability) {
        match self
            .capabilities
            .iter_mut()
            .find(|existing| existing.name == capability.name)
        {
            Some(existing) => *existing = capability,
            None => self.capabilities.push(capability),
        }
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.capabilities
            .iter()
            .find(|capability| capability.name == name)
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Capability> {
        self.capabilities.iter()
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Capability;
    type IntoIter = std::slice::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn duplicate_names_replace_in_place() {
        let mut registry = Registry::new();
        registry.register(Capability::new("a", "first"));
        registry.register(Capability::new("b", "second"));
        registry.register(Capability::new("a", "replacement"));
        let names: Vec<_> = registry.iter().map(Capability::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.get("a").map(Capability::summary), Some("replacement"));
    }

    #[rstest]
    fn core_registers_its_operations() {
        let mut registry = Registry::new();
        crate::register(&mut registry);
        for name in ["within_extent", "buffer_collection", "remove_outliers"] {
            assert!(registry.get(name).is_some(), "missing {name}");
        }
    }

    #[rstest]
    fn unknown_names_are_absent() {
        assert!(Registry::new().get("nothing").is_none());
        assert!(Registry::new().is_empty());
    }
}
