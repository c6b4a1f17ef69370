//! Cached client list with optimistic mutations.
//!
//! Mutations apply to the cache immediately; the corresponding remote
//! call happens afterwards and its failure is surfaced without rolling
//! the cache back. That gap is deliberate: the remote
//! store wins again on the next full refresh.

use crate::types::{ClientId, ClientRecord};

/// In-memory view of the remote client list.
#[derive(Debug, Clone, Default)]
pub struct ClientDirectory {
    clients: Vec<ClientRecord>,
}

impl ClientDirectory {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache with a freshly fetched list.
    pub fn replace_all(&mut self, clients: Vec<ClientRecord>) {
        self.clients = clients;
    }

    #[inline]
    #[must_use]
    pub fn clients(&self) -> &[ClientRecord] {
        &self.clients
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    #[must_use]
    pub fn find(&self, id: &ClientId) -> Option<&ClientRecord> {
        self.clients.iter().find(|c| &c.id == id)
    }

    /// Prepend a newly created client (newest first).
    pub fn apply_create(&mut self, record: ClientRecord) {
        self.clients.insert(0, record);
    }

    /// Replace the record with the same id; returns false if unknown.
    pub fn apply_update(&mut self, record: ClientRecord) -> bool {
        match self.clients.iter_mut().find(|c| c.id == record.id) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => false,
        }
    }

    /// Remove the record with the given id; returns false if unknown.
    pub fn apply_delete(&mut self, id: &ClientId) -> bool {
        let before = self.clients.len();
        self.clients.retain(|c| &c.id != id);
        self.clients.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> ClientRecord {
        ClientRecord::new(ClientId::new(id), name, format!("{name}@example.com"))
    }

    #[test]
    fn create_prepends() {
        let mut directory = ClientDirectory::new();
        directory.replace_all(vec![record("a", "Ada")]);
        directory.apply_create(record("b", "Bea"));
        assert_eq!(directory.clients()[0].name, "Bea");
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn update_replaces_matching_record() {
        let mut directory = ClientDirectory::new();
        directory.replace_all(vec![record("a", "Ada"), record("b", "Bea")]);

        let mut updated = record("b", "Beatrice");
        updated.email = "beatrice@example.com".into();
        assert!(directory.apply_update(updated));
        assert_eq!(directory.find(&ClientId::new("b")).unwrap().name, "Beatrice");

        assert!(!directory.apply_update(record("zz", "Nobody")));
    }

    #[test]
    fn delete_removes_by_id() {
        let mut directory = ClientDirectory::new();
        directory.replace_all(vec![record("a", "Ada"), record("b", "Bea")]);
        assert!(directory.apply_delete(&ClientId::new("a")));
        assert!(!directory.apply_delete(&ClientId::new("a")));
        assert_eq!(directory.len(), 1);
    }
}
