use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use entity::{Employee, EmployeeId};
use tokio::sync::RwLock;

use crate::{RecordStore, StoreError, StoreResult};

/// Process-local store. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<EmployeeId, Employee>>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_id(&self, record: &mut Employee) -> StoreResult<EmployeeId> {
        match record.id {
            Some(id) => {
                // keep the sequence ahead of explicitly saved ids
                let next = id.checked_add(1).ok_or(StoreError::IdsExhausted)?;
                self.next_id.fetch_max(next, Ordering::SeqCst);
                Ok(id)
            }
            None => {
                let id = self
                    .next_id
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| next.checked_add(1))
                    .map_err(|_| StoreError::IdsExhausted)?;
                record.id = Some(id);
                Ok(id)
            }
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn save(&self, mut record: Employee) -> StoreResult<Employee> {
        let id = self.assign_id(&mut record)?;
        self.records.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn save_all(&self, records: Vec<Employee>) -> StoreResult<Vec<Employee>> {
        let mut guard = self.records.write().await;
        let saved = records
            .into_iter()
            .map(|mut record| self.assign_id(&mut record).map(|_| record))
            .collect::<StoreResult<Vec<_>>>()?;
        for record in &saved {
            if let Some(id) = record.id {
                guard.insert(id, record.clone());
            }
        }
        Ok(saved)
    }

    async fn find_all(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn delete(&self, record: &Employee) -> StoreResult<()> {
        if let Some(id) = record.id {
            self.records.write().await.remove(&id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ravi() -> Employee {
        Employee::new("ravi", "ravi@gmail.com", "developer")
    }

    #[tokio::test]
    async fn save_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let first = store.save(ravi()).await.unwrap();
        let second = store
            .save(Employee::new("arun", "arun@gmail.com", "tester"))
            .await
            .unwrap();
        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
    }

    #[tokio::test]
    async fn save_with_id_replaces_in_place() {
        let store = MemoryStore::new();
        let mut saved = store.save(ravi()).await.unwrap();
        saved.role = "lead".into();
        store.save(saved.clone()).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![saved]);
    }

    #[tokio::test]
    async fn explicit_ids_advance_the_sequence() {
        let store = MemoryStore::new();
        store
            .save(Employee {
                id: Some(10),
                ..ravi()
            })
            .await
            .unwrap();
        let next = store.save(ravi()).await.unwrap();
        assert_eq!(next.id, Some(11));
    }

    #[tokio::test]
    async fn exhausted_sequence_is_an_error() {
        let store = MemoryStore::new();
        let top = Employee {
            id: Some(i64::MAX),
            ..ravi()
        };
        let err = store.save(top).await.unwrap_err();
        assert!(matches!(err, StoreError::IdsExhausted));

        store
            .save(Employee {
                id: Some(i64::MAX - 1),
                ..ravi()
            })
            .await
            .unwrap();
        let err = store.save(ravi()).await.unwrap_err();
        assert!(matches!(err, StoreError::IdsExhausted));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn save_all_rejects_the_batch_on_exhaustion() {
        let store = MemoryStore::new();
        let batch = vec![
            ravi(),
            Employee {
                id: Some(i64::MAX),
                ..ravi()
            },
        ];
        assert!(store.save_all(batch).await.is_err());
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_all_preserves_order() {
        let store = MemoryStore::new();
        let saved = store
            .save_all(vec![ravi(), Employee::new("arun", "arun@gmail.com", "tester")])
            .await
            .unwrap();
        let names: Vec<_> = saved.iter().map(|e| (e.id, e.name.as_str())).collect();
        assert_eq!(names, vec![(Some(1), "ravi"), (Some(2), "arun")]);
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_removes_and_tolerates_unknown_records() {
        let store = MemoryStore::new();
        let saved = store.save(ravi()).await.unwrap();

        store.delete(&saved).await.unwrap();
        assert_eq!(store.find_by_id(1).await.unwrap(), None);

        store.delete(&saved).await.unwrap();
        store.delete(&ravi()).await.unwrap();
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
