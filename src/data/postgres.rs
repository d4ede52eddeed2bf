use crate::{
    data::{
        StudentSession, StudentStore,
        student::{IdentityKey, Predicate, Student, StudentFilter},
    },
    error::{
        CommitTransactionSnafu, GetDatabaseConnectionSnafu, MakeQuerySnafu, MigrateSnafu,
        OpenDatabaseSnafu, RollbackTransactionSnafu, RosterResult,
    },
};
use async_trait::async_trait;
use snafu::{IntoError, ResultExt};
use sqlx::{
    Connection, PgConnection, Pool, Postgres, QueryBuilder, Transaction, postgres::PgPoolOptions,
};
use std::{future::Future, pin::Pin};

const STUDENT_COLUMNS: &str =
    "last_name, first_name, patronymic, study_year, group_name, faculty_name";

type QueryFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, sqlx::Error>> + Send + 'c>>;

#[derive(Clone, Debug)]
pub struct PgStudentStore {
    pool: Pool<Postgres>,
}

impl PgStudentStore {
    pub async fn connect(options: PgPoolOptions, db_path: &str) -> RosterResult<Self> {
        let pool = options.connect(db_path).await.context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn begin(&self) -> RosterResult<Box<dyn StudentSession>> {
        let tx = self.pool.begin().await.context(GetDatabaseConnectionSnafu)?;
        Ok(Box::new(PgStudentSession { tx }))
    }

    async fn ping(&self) -> RosterResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)?;
        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

pub struct PgStudentSession {
    tx: Transaction<'static, Postgres>,
}

/// Runs one query inside a savepoint. A failing statement aborts the whole
/// transaction in Postgres; rolling back to the savepoint keeps the session
/// usable for whatever the caller does next.
async fn in_savepoint<T: Send>(
    tx: &mut Transaction<'static, Postgres>,
    query: impl for<'c> FnOnce(&'c mut PgConnection) -> QueryFuture<'c, T> + Send,
) -> RosterResult<T> {
    let mut savepoint = Connection::begin(&mut **tx)
        .await
        .context(GetDatabaseConnectionSnafu)?;

    match query(&mut *savepoint).await {
        Ok(value) => {
            savepoint.commit().await.context(CommitTransactionSnafu)?;
            Ok(value)
        }
        Err(source) => {
            savepoint.rollback().await.context(RollbackTransactionSnafu)?;
            Err(MakeQuerySnafu.into_error(source))
        }
    }
}

/// Appends `AND <column> = $n` for every predicate.
fn push_predicates(builder: &mut QueryBuilder<'_, Postgres>, predicates: &[Predicate<'_>]) {
    for predicate in predicates {
        builder.push(" AND ").push(predicate.column()).push(" = ");
        match *predicate {
            // int8 against the int4 column, so out-of-range years just never match
            Predicate::StudyYear(v) => builder.push_bind(v),
            Predicate::LastName(v)
            | Predicate::FirstName(v)
            | Predicate::Patronymic(v)
            | Predicate::GroupName(v)
            | Predicate::FacultyName(v) => builder.push_bind(v.to_string()),
        };
    }
}

fn select_matching(filter: &StudentFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {STUDENT_COLUMNS} FROM public.students WHERE TRUE"
    ));
    push_predicates(&mut builder, &filter.predicates());
    builder.push(" LIMIT 1");
    builder
}

/// Full identity key as the tie-breaker, so paging never repeats or skips rows.
fn page_sql() -> String {
    format!(
        "SELECT {STUDENT_COLUMNS} FROM public.students \
         ORDER BY last_name, first_name, patronymic LIMIT $1 OFFSET $2"
    )
}

#[async_trait]
impl StudentSession for PgStudentSession {
    async fn count(&mut self) -> RosterResult<i64> {
        in_savepoint(&mut self.tx, |conn| {
            Box::pin(
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM public.students").fetch_one(conn),
            )
        })
        .await
    }

    async fn page(&mut self, offset: i64, limit: i64) -> RosterResult<Vec<Student>> {
        sqlx::query_as(&page_sql())
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *self.tx)
            .await
            .context(MakeQuerySnafu)
    }

    async fn find_first(&mut self, filter: &StudentFilter) -> RosterResult<Option<Student>> {
        let mut query = select_matching(filter);
        in_savepoint(&mut self.tx, move |conn| {
            Box::pin(async move {
                query
                    .build_query_as::<Student>()
                    .fetch_optional(conn)
                    .await
            })
        })
        .await
    }

    async fn insert(&mut self, student: &Student) -> RosterResult<()> {
        sqlx::query(&format!(
            "INSERT INTO public.students ({STUDENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(&student.last_name)
        .bind(&student.first_name)
        .bind(&student.patronymic)
        .bind(student.study_year)
        .bind(&student.group_name)
        .bind(&student.faculty_name)
        .execute(&mut *self.tx)
        .await
        .context(MakeQuerySnafu)?;
        Ok(())
    }

    async fn remove(&mut self, key: &IdentityKey) -> RosterResult<()> {
        let done = sqlx::query(
            "DELETE FROM public.students WHERE last_name = $1 AND first_name = $2 AND patronymic = $3",
        )
        .bind(&key.last_name)
        .bind(&key.first_name)
        .bind(&key.patronymic)
        .execute(&mut *self.tx)
        .await
        .context(MakeQuerySnafu)?;

        if done.rows_affected() == 0 {
            warn!(?key, "student vanished between lookup and delete");
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> RosterResult<()> {
        self.tx.commit().await.context(CommitTransactionSnafu)
    }

    async fn rollback(self: Box<Self>) -> RosterResult<()> {
        self.tx.rollback().await.context(RollbackTransactionSnafu)
    }
}
