use std::collections::HashMap;

/// The variable store: a mapping from identifier to its current value.
///
/// Reading an unbound identifier yields 0 rather than an error; assignments
/// are last-write-wins. The store lives for the duration of a run and is
/// not safe for concurrent use without external synchronization.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Store {
    values: HashMap<String, f64>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_names_read_as_zero() {
        let store = Store::new();
        assert_eq!(store.get("never"), 0.0);
        assert!(!store.contains("never"));
    }

    #[test]
    fn last_write_wins() {
        let mut store = Store::new();
        store.set("x", 1.0);
        store.set("x", 2.0);
        assert_eq!(store.get("x"), 2.0);
        assert!(store.contains("x"));
    }
}
