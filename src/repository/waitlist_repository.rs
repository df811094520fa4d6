use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{
        new_waitlist_id, CreateWaitlistRequest, UpdateWaitlistRequest, WaitlistEntry,
        WaitlistStatus,
    },
    error::{AppError, Result},
    repository::WaitlistRepository,
};

#[derive(FromRow)]
struct WaitlistRow {
    waitlist_id: String,
    guest_email: String,
    guest_name: String,
    requested_date: NaiveDate,
    preferred_time: String,
    time_flexibility: String,
    players: i64,
    golf_course: String,
    club: String,
    priority: i64,
    status: String,
    source: String,
    opt_in_confirmed: bool,
    notes: Option<String>,
    notification_sent: bool,
    notification_sent_at: Option<NaiveDateTime>,
    original_booking_request: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct ActiveEntryRow {
    waitlist_id: String,
    status: String,
}

const WAITLIST_COLUMNS: &str = r#"
    waitlist_id, guest_email, guest_name, requested_date, preferred_time,
    time_flexibility, players, golf_course, club, priority, status, source,
    opt_in_confirmed, notes, notification_sent, notification_sent_at,
    original_booking_request, created_at, updated_at
"#;

pub struct SqliteWaitlistRepository {
    pool: SqlitePool,
}

impl SqliteWaitlistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: WaitlistRow) -> Result<WaitlistEntry> {
        Ok(WaitlistEntry {
            waitlist_id: row.waitlist_id,
            guest_email: row.guest_email,
            guest_name: row.guest_name,
            requested_date: row.requested_date,
            preferred_time: row.preferred_time,
            time_flexibility: row.time_flexibility,
            players: row.players,
            golf_course: row.golf_course,
            club: row.club,
            priority: row.priority,
            status: Self::parse_status(&row.status)?,
            source: row.source,
            opt_in_confirmed: row.opt_in_confirmed,
            notes: row.notes,
            notification_sent: row.notification_sent,
            notification_sent_at: row
                .notification_sent_at
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            original_booking_request: row.original_booking_request,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<WaitlistStatus> {
        match s {
            "Waiting" => Ok(WaitlistStatus::Waiting),
            "Notified" => Ok(WaitlistStatus::Notified),
            "Converted" => Ok(WaitlistStatus::Converted),
            "Declined" => Ok(WaitlistStatus::Declined),
            _ => Err(AppError::Database(format!("Invalid waitlist status: {}", s))),
        }
    }

    fn status_to_str(status: &WaitlistStatus) -> &'static str {
        match status {
            WaitlistStatus::Waiting => "Waiting",
            WaitlistStatus::Notified => "Notified",
            WaitlistStatus::Converted => "Converted",
            WaitlistStatus::Declined => "Declined",
        }
    }
}

#[async_trait]
impl WaitlistRepository for SqliteWaitlistRepository {
    async fn create(&self, request: CreateWaitlistRequest) -> Result<WaitlistEntry> {
        let now = Utc::now();
        let waitlist_id = new_waitlist_id(now);
        let now_naive = now.naive_utc();

        // Check-then-insert inside a single transaction so a concurrent add
        // for the same (email, date, club) triple cannot slip through. The
        // partial unique index on active entries backstops this under race.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = sqlx::query_as::<_, ActiveEntryRow>(
            r#"
            SELECT waitlist_id, status FROM waitlist
            WHERE guest_email = ? AND requested_date = ? AND club = ?
              AND status IN ('Waiting', 'Notified')
            "#,
        )
        .bind(&request.guest_email)
        .bind(request.requested_date)
        .bind(&request.club)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(existing) = existing {
            return Err(AppError::DuplicateActiveEntry {
                waitlist_id: existing.waitlist_id,
                status: Self::parse_status(&existing.status)?,
            });
        }

        let insert = sqlx::query(
            r#"
            INSERT INTO waitlist (
                waitlist_id, guest_email, guest_name, requested_date, preferred_time,
                time_flexibility, players, golf_course, club, priority, status, source,
                opt_in_confirmed, notes, notification_sent, original_booking_request,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&waitlist_id)
        .bind(&request.guest_email)
        .bind(&request.guest_name)
        .bind(request.requested_date)
        .bind(&request.preferred_time)
        .bind(&request.time_flexibility)
        .bind(request.players)
        .bind(&request.golf_course)
        .bind(&request.club)
        .bind(request.priority)
        .bind(Self::status_to_str(&WaitlistStatus::Waiting))
        .bind(&request.source)
        .bind(request.opt_in_confirmed)
        .bind(&request.notes)
        .bind(false)
        .bind(&request.original_booking_request)
        .bind(now_naive)
        .bind(now_naive)
        .execute(&mut *tx)
        .await;

        if let Err(e) = insert {
            let unique_violation = e
                .as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false);
            if unique_violation {
                drop(tx);
                let mut winners = self
                    .find_active(&request.guest_email, &request.club, Some(request.requested_date))
                    .await?;
                if let Some(winner) = winners.pop() {
                    return Err(AppError::DuplicateActiveEntry {
                        waitlist_id: winner.waitlist_id,
                        status: winner.status,
                    });
                }
            }
            return Err(AppError::Database(e.to_string()));
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_waitlist_id(&waitlist_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created waitlist entry".to_string())
        })
    }

    async fn find_by_waitlist_id(&self, waitlist_id: &str) -> Result<Option<WaitlistEntry>> {
        let row = sqlx::query_as::<_, WaitlistRow>(&format!(
            "SELECT {} FROM waitlist WHERE waitlist_id = ?",
            WAITLIST_COLUMNS
        ))
        .bind(waitlist_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_entry(r)?)),
            None => Ok(None),
        }
    }

    async fn find_active(
        &self,
        email: &str,
        club: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<WaitlistEntry>> {
        let rows = match date {
            Some(date) => {
                sqlx::query_as::<_, WaitlistRow>(&format!(
                    r#"
                    SELECT {} FROM waitlist
                    WHERE guest_email = ? AND club = ? AND requested_date = ?
                      AND status IN ('Waiting', 'Notified')
                    ORDER BY requested_date ASC, created_at ASC
                    "#,
                    WAITLIST_COLUMNS
                ))
                .bind(email)
                .bind(club)
                .bind(date)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, WaitlistRow>(&format!(
                    r#"
                    SELECT {} FROM waitlist
                    WHERE guest_email = ? AND club = ?
                      AND status IN ('Waiting', 'Notified')
                    ORDER BY requested_date ASC, created_at ASC
                    "#,
                    WAITLIST_COLUMNS
                ))
                .bind(email)
                .bind(club)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }

    async fn update(
        &self,
        waitlist_id: &str,
        update: UpdateWaitlistRequest,
    ) -> Result<WaitlistEntry> {
        let current = self.find_by_waitlist_id(waitlist_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Waitlist entry {} not found", waitlist_id))
        })?;

        let status = update.status.unwrap_or_else(|| current.status.clone());
        let notes = update.notes.or(current.notes);
        let notification_sent = update.notification_sent.unwrap_or(current.notification_sent);
        // The first flip to true stamps the timestamp; clearing the marker
        // clears it.
        let notification_sent_at = if notification_sent {
            if current.notification_sent {
                current.notification_sent_at
            } else {
                Some(Utc::now())
            }
        } else {
            None
        };

        let now = Utc::now().naive_utc();
        sqlx::query(
            r#"
            UPDATE waitlist
            SET status = ?,
                notes = ?,
                notification_sent = ?,
                notification_sent_at = ?,
                updated_at = ?
            WHERE waitlist_id = ?
            "#,
        )
        .bind(Self::status_to_str(&status))
        .bind(&notes)
        .bind(notification_sent)
        .bind(notification_sent_at.map(|dt| dt.naive_utc()))
        .bind(now)
        .bind(waitlist_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_waitlist_id(waitlist_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated waitlist entry".to_string())
        })
    }

    async fn delete(&self, waitlist_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM waitlist WHERE waitlist_id = ?")
            .bind(waitlist_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Waitlist entry {} not found",
                waitlist_id
            )));
        }

        Ok(())
    }

    async fn find_matches(&self, date: NaiveDate, club: &str) -> Result<Vec<WaitlistEntry>> {
        let rows = sqlx::query_as::<_, WaitlistRow>(&format!(
            r#"
            SELECT {} FROM waitlist
            WHERE club = ? AND requested_date = ? AND status = 'Waiting'
            ORDER BY priority DESC, created_at ASC
            "#,
            WAITLIST_COLUMNS
        ))
        .bind(club)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }
}
