use crate::model::Record;
use crate::shared::errors::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

/// Receives the record assembled by a wizard on deploy.
pub trait SaveTarget<R> {
    fn on_save(&mut self, record: R) -> SaveOutcome;
}

/// Ordered in-memory collection owned by the console.
#[derive(Debug, Clone)]
pub struct ListState<R: Record> {
    records: Vec<R>,
}

impl<R: Record> Default for ListState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Record> ListState<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn position(&self, id: &R::Id) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// Replaces the record with the same id in place, or appends a new one.
    pub fn save(&mut self, record: R) -> SaveOutcome {
        match self.position(record.id()) {
            Some(index) => {
                self.records[index] = record;
                SaveOutcome::Updated
            }
            None => {
                self.records.push(record);
                SaveOutcome::Created
            }
        }
    }

    pub fn delete(&mut self, id: &R::Id) -> Result<R, CatalogError> {
        let index = self.position(id).ok_or_else(|| CatalogError::NotFound {
            kind: R::KIND,
            id: id.to_string(),
        })?;
        Ok(self.records.remove(index))
    }
}

impl<R: Record> SaveTarget<R> for ListState<R> {
    fn on_save(&mut self, record: R) -> SaveOutcome {
        self.save(record)
    }
}

impl<'a, R: Record> IntoIterator for &'a ListState<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Agent, AgentRole, AgentStatus};
    use crate::shared::ids::AgentId;

    fn agent(id: &str, name: &str) -> Agent {
        Agent {
            id: AgentId::parse(id).expect("id"),
            name: name.to_string(),
            role: AgentRole::Both,
            host: "10.0.0.1".to_string(),
            version: "4.2.0".to_string(),
            status: AgentStatus::Online,
        }
    }

    #[test]
    fn save_appends_new_and_updates_in_place() {
        let mut list = ListState::new(vec![agent("agt-1", "one"), agent("agt-2", "two")]);

        assert_eq!(list.save(agent("agt-3", "three")), SaveOutcome::Created);
        assert_eq!(list.save(agent("agt-1", "renamed")), SaveOutcome::Updated);

        let names: Vec<&str> = list.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["renamed", "two", "three"]);
    }

    #[test]
    fn delete_removes_only_matching_id() {
        let mut list = ListState::new(vec![
            agent("agt-1", "one"),
            agent("agt-2", "two"),
            agent("agt-3", "three"),
        ]);
        let removed = list
            .delete(&AgentId::parse("agt-2").expect("id"))
            .expect("delete");
        assert_eq!(removed.name, "two");
        let ids: Vec<&str> = list.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["agt-1", "agt-3"]);
    }

    #[test]
    fn delete_of_unknown_id_leaves_list_untouched() {
        let mut list = ListState::new(vec![agent("agt-1", "one")]);
        let err = list
            .delete(&AgentId::parse("agt-9").expect("id"))
            .expect_err("missing");
        assert_eq!(err.to_string(), "agent `agt-9` not found");
        assert_eq!(list.len(), 1);
    }
}
