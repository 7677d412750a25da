//! PostgreSQL implementation of CardRepository.
//!
//! A card is one `cards` header row plus one `card_items` row per occupied
//! position. Writes replace the item rows inside the same transaction as the
//! header. Reads run the header and item queries inside one read-only
//! `REPEATABLE READ` transaction, so both see the same snapshot.
//!
//! Inserts serialize per (owner, year) on a transaction-scoped advisory
//! lock before re-checking the untitled-card rule.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::card::{
    Card, CardCategory, CardItem, CardVersion, GridConfig, GridSize,
};
use crate::domain::foundation::{
    CardId, CardStatus, DomainError, ErrorCode, OwnedByUser, Timestamp, UserId,
};
use crate::ports::CardRepository;

/// PostgreSQL implementation of the CardRepository port.
#[derive(Clone)]
pub struct PostgresCardRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresCardRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCardRepository")
            .field("pool", &"PgPool")
            .finish()
    }
}

impl PostgresCardRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a read-only transaction pinned to one snapshot.
    async fn snapshot(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;
        sqlx::query(SNAPSHOT_READ)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to set isolation level", e))?;
        Ok(tx)
    }
}

const SNAPSHOT_READ: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

const SELECT_CARDS: &str = r#"
    SELECT id, owner_id, year, title, category,
           grid_size, free_position, header_text,
           status, is_archived, visible_to_friends, version,
           created_at, updated_at
    FROM cards
"#;

/// Loads items for every card in `rows` and assembles aggregates.
async fn hydrate(conn: &mut PgConnection, rows: Vec<CardRow>) -> Result<Vec<Card>, DomainError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let item_rows = sqlx::query_as::<_, ItemRow>(
        r#"
        SELECT card_id, position, content, completed_at, notes, proof_url, created_at
        FROM card_items
        WHERE card_id = ANY($1)
        ORDER BY card_id, position
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to load card items", e))?;

    let mut items_by_card: HashMap<Uuid, Vec<CardItem>> = HashMap::new();
    for row in item_rows {
        let card_id = row.card_id;
        items_by_card
            .entry(card_id)
            .or_default()
            .push(row_to_item(row)?);
    }

    rows.into_iter()
        .map(|row| {
            let items = items_by_card.remove(&row.id).unwrap_or_default();
            row_to_card(row, items)
        })
        .collect()
}

/// Internal row type for the `cards` table.
#[derive(Debug, sqlx::FromRow)]
struct CardRow {
    id: Uuid,
    owner_id: String,
    year: i32,
    title: Option<String>,
    category: Option<String>,
    grid_size: i16,
    free_position: Option<i16>,
    header_text: Option<String>,
    status: String,
    is_archived: bool,
    visible_to_friends: bool,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Internal row type for the `card_items` table.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    card_id: Uuid,
    position: i16,
    content: String,
    completed_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    proof_url: Option<String>,
    created_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Helper functions
// ═══════════════════════════════════════════════════════════════════════════

fn corrupt(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, message)
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DomainError::new(
            ErrorCode::Conflict,
            format!("{}: duplicate card for this owner, year and title", context),
        ),
        other => DomainError::database(format!("{}: {}", context, other)),
    }
}

fn to_position(raw: i16, field: &str) -> Result<u8, DomainError> {
    u8::try_from(raw).map_err(|_| corrupt(format!("Invalid {}: {}", field, raw)))
}

fn to_db_version(version: CardVersion) -> Result<i32, DomainError> {
    i32::try_from(version.as_u32()).map_err(|_| {
        DomainError::database(format!(
            "Card version {} exceeds column range",
            version.as_u32()
        ))
    })
}

fn row_to_item(row: ItemRow) -> Result<CardItem, DomainError> {
    Ok(CardItem::reconstitute(
        to_position(row.position, "position")?,
        row.content,
        row.completed_at.map(Timestamp::from_datetime),
        row.notes,
        row.proof_url,
        Timestamp::from_datetime(row.created_at),
    ))
}

fn row_to_card(row: CardRow, items: Vec<CardItem>) -> Result<Card, DomainError> {
    let owner_id = UserId::new(&row.owner_id)
        .map_err(|e| corrupt(format!("Invalid owner_id: {}", e)))?;

    let category = row
        .category
        .as_deref()
        .map(|c| c.parse::<CardCategory>())
        .transpose()
        .map_err(|e| corrupt(e.to_string()))?;

    let size_raw = u8::try_from(row.grid_size)
        .map_err(|_| corrupt(format!("Invalid grid_size: {}", row.grid_size)))?;
    let size = GridSize::new(size_raw).map_err(|e| corrupt(e.to_string()))?;
    let free_position = row
        .free_position
        .map(|p| to_position(p, "free_position"))
        .transpose()?;
    let grid = GridConfig::reconstitute(size, free_position, row.header_text)
        .map_err(|e| corrupt(e.to_string()))?;

    let status = CardStatus::parse(&row.status)
        .ok_or_else(|| corrupt(format!("Invalid status: {}", row.status)))?;

    let version = u32::try_from(row.version)
        .map(CardVersion::from_raw)
        .map_err(|_| corrupt(format!("Invalid version: {}", row.version)))?;

    Card::reconstitute(
        CardId::from_uuid(row.id),
        owner_id,
        row.year,
        row.title,
        category,
        grid,
        items,
        status,
        row.is_archived,
        row.visible_to_friends,
        version,
        Timestamp::from_datetime(row.created_at),
        Timestamp::from_datetime(row.updated_at),
    )
    .map_err(|e| corrupt(format!("Inconsistent card {}: {}", row.id, e)))
}

/// Serializes inserts for one (owner, year) until the transaction ends, then
/// rejects an untitled card if that year already holds any card.
async fn claim_year_slot(conn: &mut PgConnection, card: &Card) -> Result<(), DomainError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), $2)")
        .bind(card.owner_id().as_str())
        .bind(card.year())
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to lock card year", e))?;

    if card.title().is_some() {
        return Ok(());
    }
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM cards WHERE owner_id = $1 AND year = $2)",
    )
    .bind(card.owner_id().as_str())
    .bind(card.year())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to check card year", e))?;

    if taken {
        return Err(DomainError::new(
            ErrorCode::Conflict,
            format!("A card already exists for {}", card.year()),
        ));
    }
    Ok(())
}

async fn insert_items(conn: &mut PgConnection, card: &Card) -> Result<(), DomainError> {
    for item in card.items() {
        sqlx::query(
            r#"
            INSERT INTO card_items (
                card_id, position, content, completed_at, notes, proof_url, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(card.id().as_uuid())
        .bind(i16::from(item.position()))
        .bind(item.content())
        .bind(item.completed_at().map(|t| *t.as_datetime()))
        .bind(item.notes())
        .bind(item.proof_url())
        .bind(item.created_at().as_datetime())
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to insert card item", e))?;
    }
    Ok(())
}

#[async_trait]
impl CardRepository for PostgresCardRepository {
    async fn save(&self, card: &Card) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        claim_year_slot(&mut tx, card).await?;

        let grid = card.grid();
        sqlx::query(
            r#"
            INSERT INTO cards (
                id, owner_id, year, title, category,
                grid_size, free_position, header_text,
                status, is_archived, visible_to_friends, version,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(card.id().as_uuid())
        .bind(card.owner_id().as_str())
        .bind(card.year())
        .bind(card.title())
        .bind(card.category().map(|c| c.as_str()))
        .bind(i16::from(grid.size().get()))
        .bind(grid.free_position().map(i16::from))
        .bind(grid.header_text())
        .bind(card.status().as_str())
        .bind(card.is_archived())
        .bind(card.visible_to_friends())
        .bind(to_db_version(card.version())?)
        .bind(card.created_at().as_datetime())
        .bind(card.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert card", e))?;

        insert_items(&mut tx, card).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(())
    }

    async fn update(&self, card: &Card, expected_version: CardVersion) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        let grid = card.grid();
        let result = sqlx::query(
            r#"
            UPDATE cards SET
                title = $3,
                category = $4,
                grid_size = $5,
                free_position = $6,
                header_text = $7,
                status = $8,
                is_archived = $9,
                visible_to_friends = $10,
                version = $11,
                updated_at = $12
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(card.id().as_uuid())
        .bind(to_db_version(expected_version)?)
        .bind(card.title())
        .bind(card.category().map(|c| c.as_str()))
        .bind(i16::from(grid.size().get()))
        .bind(grid.free_position().map(i16::from))
        .bind(grid.header_text())
        .bind(card.status().as_str())
        .bind(card.is_archived())
        .bind(card.visible_to_friends())
        .bind(to_db_version(card.version())?)
        .bind(card.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update card", e))?;

        if result.rows_affected() == 0 {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM cards WHERE id = $1)")
                    .bind(card.id().as_uuid())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| db_error("Failed to check card existence", e))?;

            return Err(if exists {
                DomainError::new(
                    ErrorCode::ConcurrencyConflict,
                    "Card version mismatch - another update occurred",
                )
            } else {
                DomainError::new(
                    ErrorCode::CardNotFound,
                    format!("Card not found: {}", card.id()),
                )
            });
        }

        sqlx::query("DELETE FROM card_items WHERE card_id = $1")
            .bind(card.id().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete card items", e))?;

        insert_items(&mut tx, card).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &CardId) -> Result<Option<Card>, DomainError> {
        let mut tx = self.snapshot().await?;
        let row = sqlx::query_as::<_, CardRow>(&format!("{SELECT_CARDS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to load card", e))?;

        let card = match row {
            Some(row) => hydrate(&mut tx, vec![row]).await?.pop(),
            None => None,
        };
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(card)
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Card>, DomainError> {
        let mut tx = self.snapshot().await?;
        let rows = sqlx::query_as::<_, CardRow>(&format!(
            "{SELECT_CARDS} WHERE owner_id = $1 ORDER BY year DESC, created_at ASC"
        ))
        .bind(owner_id.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to list cards", e))?;

        let cards = hydrate(&mut tx, rows).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(cards)
    }

    async fn find_by_owner_and_year(
        &self,
        owner_id: &UserId,
        year: i32,
    ) -> Result<Vec<Card>, DomainError> {
        let mut tx = self.snapshot().await?;
        let rows = sqlx::query_as::<_, CardRow>(&format!(
            "{SELECT_CARDS} WHERE owner_id = $1 AND year = $2 ORDER BY created_at ASC"
        ))
        .bind(owner_id.as_str())
        .bind(year)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to list cards for year", e))?;

        let cards = hydrate(&mut tx, rows).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(cards)
    }

    async fn delete(&self, id: &CardId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete card", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::CardNotFound,
                format!("Card not found: {}", id),
            ));
        }
        Ok(())
    }
}
