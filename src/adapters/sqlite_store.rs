use crate::domain::model::{Lead, NewLead};
use crate::domain::ports::LeadRepository;
use crate::utils::error::{CrmError, Result};
use rusqlite::{params, Connection, ErrorCode, Row, TransactionBehavior};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const CREATE_LEADS_SQL: &str = "CREATE TABLE IF NOT EXISTS leads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT UNIQUE NOT NULL,
    source TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

const LEAD_SELECT_SQL: &str = "SELECT id, name, phone, source, created_at FROM leads";

/// SQLite-backed lead store. Holds only the file path; every operation opens,
/// commits and closes its own connection.
#[derive(Debug, Clone)]
pub struct SqliteLeadStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteLeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(5),
        }
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

fn map_lead_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        source: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Only UNIQUE failures mean a duplicate phone; NOT NULL or CHECK stay database errors.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl LeadRepository for SqliteLeadStore {
    fn initialize(&self) -> Result<()> {
        let started_at = Instant::now();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = self.open()?;
        conn.execute_batch(CREATE_LEADS_SQL)?;

        tracing::info!(
            "🗄️ Lead store ready at {} ({} ms)",
            self.path.display(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn insert(&self, lead: &NewLead) -> Result<Lead> {
        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // UNIQUE(phone) 決定並發提交的勝負，輸家拿到 DuplicatePhone
        let inserted = tx.execute(
            "INSERT INTO leads (name, phone, source, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![lead.name, lead.phone, lead.source, lead.created_at],
        );
        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(CrmError::DuplicatePhone {
                    phone: lead.phone.clone(),
                });
            }
            return Err(err.into());
        }

        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::debug!("Inserted lead id={} phone={}", id, lead.phone);
        Ok(lead.clone().into_lead(id))
    }

    fn list_all(&self) -> Result<Vec<Lead>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id DESC", LEAD_SELECT_SQL))?;
        let leads = stmt
            .query_map([], map_lead_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(leads)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        let changed = tx.execute("DELETE FROM leads WHERE id = ?1", params![id])?;
        tx.commit()?;

        tracing::debug!("Delete lead id={} removed={}", id, changed);
        Ok(changed > 0)
    }

    fn count(&self) -> Result<u64> {
        let conn = self.open()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}
