//! The operator's photo selection.

use serde::Serialize;

/// Selected photo names in the order they were selected, plus the
/// select-all indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSet {
    names: Vec<String>,
    all: bool,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects or unselects one name.
    ///
    /// Unselecting resets the select-all indicator.
    pub fn set_selected(&mut self, name: &str, checked: bool) {
        if checked {
            if !self.contains(name) {
                self.names.push(name.to_string());
            }
        } else {
            self.names.retain(|n| n != name);
            self.all = false;
        }
    }

    /// Flips one name and returns whether it is now selected.
    pub fn toggle(&mut self, name: &str) -> bool {
        let checked = !self.contains(name);
        self.set_selected(name, checked);
        checked
    }

    /// Selects every given name, or clears the selection.
    pub fn set_all<I, S>(&mut self, checked: bool, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if checked {
            self.names = names.into_iter().map(Into::into).collect();
            self.all = true;
        } else {
            self.clear();
        }
    }

    /// Empties the selection and resets select-all.
    pub fn clear(&mut self) {
        self.names.clear();
        self.all = false;
    }

    /// Forgets a deleted name.
    ///
    /// Select-all is reset, since the set no longer covers everything.
    pub fn remove(&mut self, name: &str) {
        self.names.retain(|n| n != name);
        self.all = false;
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Returns the selected names in selection order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the select-all indicator.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        self.all
    }
}
