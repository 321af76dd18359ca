//! The flat key/value store produced by the parser.

use std::ops::ControlFlow;

/// One dotted path bound to a byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    path: String,
    value: Vec<u8>,
}

impl Binding {
    pub fn new(path: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// Outcome of [`Bindings::visit`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Every binding was delivered.
    Completed,
    /// The callback asked to stop early.
    Aborted,
}

impl Visit {
    pub fn is_aborted(self) -> bool {
        self == Visit::Aborted
    }
}

/// Bindings in depth-first, left-to-right discovery order.
///
/// Duplicate paths are kept. Point lookup returns the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: Vec<Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, path: &str, value: Vec<u8>) {
        self.entries.push(Binding {
            path: path.to_string(),
            value,
        });
    }

    /// Value of the first binding whose path equals `path`.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|b| b.path == path)
            .map(|b| b.value.as_slice())
    }

    /// Call `f` with every binding in order until it returns `Break`.
    pub fn visit<F>(&self, mut f: F) -> Visit
    where
        F: FnMut(&str, &[u8]) -> ControlFlow<()>,
    {
        for binding in &self.entries {
            if f(&binding.path, &binding.value).is_break() {
                log::debug!("traversal aborted at {}", binding.path);
                return Visit::Aborted;
            }
        }
        Visit::Completed
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Bindings {
    type Item = Binding;
    type IntoIter = std::vec::IntoIter<Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<Binding> for Bindings {
    fn from_iter<I: IntoIterator<Item = Binding>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bindings {
        [
            Binding::new("a", "1"),
            Binding::new("b.0", "2"),
            Binding::new("a", "shadowed"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_get_returns_first_match() {
        let bindings = sample();
        assert_eq!(bindings.get("a"), Some(&b"1"[..]));
        assert_eq!(bindings.get("b.0"), Some(&b"2"[..]));
        assert_eq!(bindings.get("b"), None);
    }

    #[test]
    fn test_visit_completes_with_duplicates() {
        let mut seen = Vec::new();
        let outcome = sample().visit(|path, value| {
            seen.push((path.to_string(), value.to_vec()));
            ControlFlow::Continue(())
        });
        assert_eq!(outcome, Visit::Completed);
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], ("a".to_string(), b"shadowed".to_vec()));
    }

    #[test]
    fn test_visit_aborts_on_break() {
        let mut calls = 0;
        let outcome = sample().visit(|_, _| {
            calls += 1;
            ControlFlow::Break(())
        });
        assert!(outcome.is_aborted());
        assert_eq!(calls, 1);
    }
}
