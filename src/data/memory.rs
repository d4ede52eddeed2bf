//! An in-process [`StudentStore`] for exercising handlers without Postgres.

use crate::{
    data::{
        StudentSession, StudentStore,
        student::{IdentityKey, Student, StudentFilter},
    },
    error::{GetDatabaseConnectionSnafu, MakeQuerySnafu, RosterResult},
};
use async_trait::async_trait;
use snafu::IntoError;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

type Rows = BTreeMap<IdentityKey, Student>;

/// Which operations should fail, to mimic a broken database.
#[derive(Debug, Default, Clone, Copy)]
pub struct Faults {
    pub begin: bool,
    pub ping: bool,
    pub count: bool,
    pub page: bool,
    pub lookup: bool,
    pub write: bool,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStudentStore {
    rows: Arc<Mutex<Rows>>,
    faults: Arc<Mutex<Faults>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn query_failure<T>() -> RosterResult<T> {
    Err(MakeQuerySnafu.into_error(sqlx::Error::PoolTimedOut))
}

impl MemoryStudentStore {
    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        let store = Self::default();
        lock(&store.rows).extend(students.into_iter().map(|s| (s.key(), s)));
        store
    }

    pub fn set_faults(&self, faults: Faults) {
        *lock(&self.faults) = faults;
    }

    pub fn snapshot(&self) -> Vec<Student> {
        lock(&self.rows).values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    fn faults(&self) -> Faults {
        *lock(&self.faults)
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn begin(&self) -> RosterResult<Box<dyn StudentSession>> {
        if self.faults().begin {
            return Err(GetDatabaseConnectionSnafu.into_error(sqlx::Error::PoolTimedOut));
        }
        Ok(Box::new(MemoryStudentSession {
            working: lock(&self.rows).clone(),
            store: self.clone(),
        }))
    }

    async fn ping(&self) -> RosterResult<()> {
        if self.faults().ping {
            return query_failure();
        }
        Ok(())
    }

    async fn close(&self) {}
}

/// Works on a private copy of the rows, published on commit.
pub struct MemoryStudentSession {
    working: Rows,
    store: MemoryStudentStore,
}

#[async_trait]
impl StudentSession for MemoryStudentSession {
    async fn count(&mut self) -> RosterResult<i64> {
        if self.store.faults().count {
            return query_failure();
        }
        Ok(i64::try_from(self.working.len()).unwrap_or(i64::MAX))
    }

    async fn page(&mut self, offset: i64, limit: i64) -> RosterResult<Vec<Student>> {
        if self.store.faults().page {
            return query_failure();
        }
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .working
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_first(&mut self, filter: &StudentFilter) -> RosterResult<Option<Student>> {
        if self.store.faults().lookup {
            return query_failure();
        }
        Ok(self.working.values().find(|s| filter.matches(s)).cloned())
    }

    async fn insert(&mut self, student: &Student) -> RosterResult<()> {
        if self.store.faults().write || self.working.contains_key(&student.key()) {
            return query_failure();
        }
        self.working.insert(student.key(), student.clone());
        Ok(())
    }

    async fn remove(&mut self, key: &IdentityKey) -> RosterResult<()> {
        if self.store.faults().write {
            return query_failure();
        }
        self.working.remove(key);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> RosterResult<()> {
        let Self { working, store } = *self;
        *lock(&store.rows) = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RosterResult<()> {
        Ok(())
    }
}
