use async_trait::async_trait;
use entity::{Employee, EmployeeId};
use sqlx::{FromRow, PgConnection};

use crate::{DbPool, RecordStore, StoreResult};

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    role TEXT NOT NULL
)
"#;

const INSERT_SQL: &str =
    "INSERT INTO employees (name, email, role) VALUES ($1, $2, $3) RETURNING id, name, email, role";

const UPDATE_SQL: &str = r#"
UPDATE employees SET name = $2, email = $3, role = $4
WHERE id = $1
RETURNING id, name, email, role
"#;

const UPSERT_SQL: &str = r#"
INSERT INTO employees (id, name, email, role) VALUES ($1, $2, $3, $4)
ON CONFLICT (id) DO UPDATE
    SET name = EXCLUDED.name, email = EXCLUDED.email, role = EXCLUDED.role
RETURNING id, name, email, role
"#;

// Explicit ids bypass BIGSERIAL. The sequence only ever moves forward, so
// deleted ids are never handed out again.
const ADVANCE_SEQUENCE_SQL: &str = r#"
SELECT setval('employees_id_seq', $1)
FROM employees_id_seq
WHERE $1 > last_value OR (NOT is_called AND $1 >= last_value)
"#;

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: i64,
    name: String,
    email: String,
    role: String,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Self {
            id: Some(row.id),
            name: row.name,
            email: row.email,
            role: row.role,
        }
    }
}

/// Postgres-backed store over a single `employees` table.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the `employees` table when it does not exist yet.
    pub async fn ensure_table(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

async fn save_on(conn: &mut PgConnection, record: Employee) -> StoreResult<Employee> {
    let row = match record.id {
        None => {
            sqlx::query_as::<_, EmployeeRow>(INSERT_SQL)
                .bind(record.name)
                .bind(record.email)
                .bind(record.role)
                .fetch_one(&mut *conn)
                .await?
        }
        Some(id) => {
            let updated = sqlx::query_as::<_, EmployeeRow>(UPDATE_SQL)
                .bind(id)
                .bind(&record.name)
                .bind(&record.email)
                .bind(&record.role)
                .fetch_optional(&mut *conn)
                .await?;
            match updated {
                Some(row) => row,
                None => {
                    let row = sqlx::query_as::<_, EmployeeRow>(UPSERT_SQL)
                        .bind(id)
                        .bind(record.name)
                        .bind(record.email)
                        .bind(record.role)
                        .fetch_one(&mut *conn)
                        .await?;
                    sqlx::query(ADVANCE_SEQUENCE_SQL)
                        .bind(id)
                        .execute(&mut *conn)
                        .await?;
                    row
                }
            }
        }
    };
    Ok(row.into())
}

#[async_trait]
impl RecordStore for PgStore {
    async fn save(&self, record: Employee) -> StoreResult<Employee> {
        let mut conn = self.pool.acquire().await?;
        save_on(&mut conn, record).await
    }

    async fn save_all(&self, records: Vec<Employee>) -> StoreResult<Vec<Employee>> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(records.len());
        for record in records {
            saved.push(save_on(&mut tx, record).await?);
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn find_all(&self) -> StoreResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, name, email, role FROM employees ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn find_by_id(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, name, email, role FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Employee::from))
    }

    async fn delete(&self, record: &Employee) -> StoreResult<()> {
        let Some(id) = record.id else {
            return Ok(());
        };
        sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
