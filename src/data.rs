use crate::{
    data::student::{IdentityKey, Student, StudentFilter},
    error::RosterResult,
};
use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(test)]
pub mod memory;
pub mod pagination;
pub mod postgres;
pub mod student;

/// Hands out one scoped session per request.
#[async_trait]
pub trait StudentStore: Debug + Send + Sync {
    async fn begin(&self) -> RosterResult<Box<dyn StudentSession>>;
    /// `SELECT 1`, for the health check
    async fn ping(&self) -> RosterResult<()>;
    async fn close(&self);
}

/// A unit of work against the `students` table.
///
/// Nothing is visible to other sessions until [`StudentSession::commit`];
/// dropping a session without committing rolls it back.
#[async_trait]
pub trait StudentSession: Send {
    async fn count(&mut self) -> RosterResult<i64>;
    /// Ordered by `(last_name, first_name)`.
    async fn page(&mut self, offset: i64, limit: i64) -> RosterResult<Vec<Student>>;
    async fn find_first(&mut self, filter: &StudentFilter) -> RosterResult<Option<Student>>;
    async fn insert(&mut self, student: &Student) -> RosterResult<()>;
    async fn remove(&mut self, key: &IdentityKey) -> RosterResult<()>;
    async fn commit(self: Box<Self>) -> RosterResult<()>;
    async fn rollback(self: Box<Self>) -> RosterResult<()>;
}
