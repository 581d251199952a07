use crate::config::Seed;
use crate::error::{RegistryError, Result};
use crate::student::{sample_students, AgeFilter, Student, StudentPatch};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn create(&self, student: Student) -> Result<Student>;
    async fn list_all(&self) -> Result<Vec<Student>>;
    async fn get(&self, national_id: i64) -> Result<Student>;
    async fn filter_by_age(&self, filter: AgeFilter) -> Result<Vec<Student>>;
    async fn update(&self, patch: StudentPatch) -> Result<Student>;
    /// Removes the student and returns everyone left, in insertion order.
    async fn delete(&self, national_id: i64) -> Result<Vec<Student>>;
    async fn len(&self) -> usize;
}

#[derive(Default)]
struct Records {
    by_id: HashMap<i64, Student>,
    order: Vec<i64>,
}

impl Records {
    fn ordered(&self) -> impl Iterator<Item = &Student> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}

/// In-memory registry. Both the index and the insertion order live under one
/// lock so every operation sees a consistent snapshot.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        let mut records = Records::default();
        for student in students {
            if records.by_id.contains_key(&student.national_id) {
                continue;
            }
            records.order.push(student.national_id);
            records.by_id.insert(student.national_id, student);
        }
        Self {
            records: RwLock::new(records),
        }
    }
}

fn not_found(national_id: i64) -> RegistryError {
    RegistryError::NotFound(format!("Student with DNI {} not found", national_id))
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn create(&self, student: Student) -> Result<Student> {
        let mut records = self.records.write().await;
        if records.by_id.contains_key(&student.national_id) {
            return Err(RegistryError::Conflict(student.national_id));
        }
        records.order.push(student.national_id);
        records.by_id.insert(student.national_id, student.clone());
        Ok(student)
    }

    async fn list_all(&self) -> Result<Vec<Student>> {
        Ok(self.records.read().await.ordered().cloned().collect())
    }

    async fn get(&self, national_id: i64) -> Result<Student> {
        self.records
            .read()
            .await
            .by_id
            .get(&national_id)
            .cloned()
            .ok_or_else(|| not_found(national_id))
    }

    async fn filter_by_age(&self, filter: AgeFilter) -> Result<Vec<Student>> {
        let matched: Vec<Student> = self
            .records
            .read()
            .await
            .ordered()
            .filter(|s| filter.matches(s.age))
            .cloned()
            .collect();

        match filter {
            AgeFilter::Between(min, max) if matched.is_empty() => Err(RegistryError::NotFound(
                format!("No students aged between {} and {}", min, max),
            )),
            _ => Ok(matched),
        }
    }

    async fn update(&self, patch: StudentPatch) -> Result<Student> {
        let mut records = self.records.write().await;
        let national_id = patch.national_id;
        let stored = records
            .by_id
            .get_mut(&national_id)
            .ok_or_else(|| not_found(national_id))?;
        stored.apply(patch);
        Ok(stored.clone())
    }

    async fn delete(&self, national_id: i64) -> Result<Vec<Student>> {
        let mut records = self.records.write().await;
        if records.by_id.remove(&national_id).is_none() {
            return Err(not_found(national_id));
        }
        records.order.retain(|id| *id != national_id);
        Ok(records.ordered().cloned().collect())
    }

    async fn len(&self) -> usize {
        self.records.read().await.by_id.len()
    }
}

pub fn create_store(seed: Seed) -> Arc<dyn StudentStore> {
    match seed {
        Seed::Sample => Arc::new(MemoryStore::with_students(sample_students())),
        Seed::Empty => Arc::new(MemoryStore::new()),
    }
}
