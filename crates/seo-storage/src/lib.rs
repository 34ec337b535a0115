use async_trait::async_trait;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use seo_scoring::{AnalysisResult, ScoreDetail};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod entities;

use entities::analysis::{self, EMBEDDED_FOCUS_KEYWORD};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to connect to database: {0}")]
    ConnectionError(String),
    #[error("Failed to run migrations: {0}")]
    MigrationError(String),
    #[error("Store does not know the focus_keyword column: {0}")]
    UnknownFocusKeywordColumn(String),
    #[error("Database error: {0}")]
    QueryError(String),
    #[error("Failed to encode analysis: {0}")]
    EncodeError(String),
}

impl From<DbErr> for PersistenceError {
    fn from(err: DbErr) -> Self {
        let message = err.to_string();
        if message.contains(EMBEDDED_FOCUS_KEYWORD) {
            PersistenceError::UnknownFocusKeywordColumn(message)
        } else {
            PersistenceError::QueryError(message)
        }
    }
}

/// A row to insert. A `None` focus keyword leaves the column out of the statement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysis {
    pub url: String,
    pub focus_keyword: Option<String>,
    pub result: String,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, specta::Type)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisQuery {
    pub url: Option<String>,
    pub focus_keyword: Option<String>,
    pub order: SortOrder,
    pub limit: Option<u64>,
}

impl AnalysisQuery {
    pub fn newest(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }
}

/// Where completed analyses are kept.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn insert(&self, record: NewAnalysis) -> Result<i32, PersistenceError>;
    async fn select(&self, query: AnalysisQuery) -> Result<Vec<analysis::Model>, PersistenceError>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: i32) -> Result<bool, PersistenceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, specta::Type)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SaveOutcome {
    Saved { id: i32 },
    /// The store lacks the focus keyword column, so the keyword went into the result JSON.
    SavedWithEmbeddedKeyword { id: i32 },
}

impl SaveOutcome {
    pub fn id(&self) -> i32 {
        match self {
            SaveOutcome::Saved { id } | SaveOutcome::SavedWithEmbeddedKeyword { id } => *id,
        }
    }

    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SaveOutcome::Saved { .. } => None,
            SaveOutcome::SavedWithEmbeddedKeyword { .. } => Some(
                "Analysis saved, but the database has no focus keyword column; the keyword was stored with the result",
            ),
        }
    }
}

/// Persists one analysis. When the store rejects the focus keyword column the
/// insert is retried once with the keyword embedded in the result JSON.
pub async fn save_analysis<S>(
    store: &S,
    url: &str,
    focus_keyword: &str,
    result: &AnalysisResult,
    score: &ScoreDetail,
) -> Result<SaveOutcome, PersistenceError>
where
    S: AnalysisStore + ?Sized,
{
    let focus_keyword = Some(focus_keyword.trim())
        .filter(|k| !k.is_empty())
        .map(str::to_string);
    let encoded =
        serde_json::to_value(result).map_err(|e| PersistenceError::EncodeError(e.to_string()))?;
    let score = i32::try_from(score.overall_score).unwrap_or(i32::MAX);

    let record = NewAnalysis {
        url: url.to_string(),
        focus_keyword: focus_keyword.clone(),
        result: encoded.to_string(),
        score,
    };

    match store.insert(record).await {
        Ok(id) => {
            debug!("Saved analysis {} for {}", id, url);
            Ok(SaveOutcome::Saved { id })
        }
        Err(PersistenceError::UnknownFocusKeywordColumn(message)) => {
            warn!(
                "Store rejected the focus keyword column, embedding it in the result: {}",
                message
            );
            let mut embedded = encoded;
            if let Some(object) = embedded.as_object_mut() {
                object.insert(
                    EMBEDDED_FOCUS_KEYWORD.to_string(),
                    serde_json::to_value(&focus_keyword)
                        .map_err(|e| PersistenceError::EncodeError(e.to_string()))?,
                );
            }
            let id = store
                .insert(NewAnalysis {
                    url: url.to_string(),
                    focus_keyword: None,
                    result: embedded.to_string(),
                    score,
                })
                .await?;
            Ok(SaveOutcome::SavedWithEmbeddedKeyword { id })
        }
        Err(e) => Err(e),
    }
}

#[derive(Clone)]
pub struct SeoStorage {
    db: DatabaseConnection,
}

impl SeoStorage {
    /// Connects to any sea-orm database URL, e.g. `sqlite::memory:`.
    pub async fn connect(database_url: &str) -> Result<Self, PersistenceError> {
        let mut options = ConnectOptions::new(database_url.to_string());
        if database_url.contains(":memory:") {
            // every pooled connection would otherwise see its own empty database
            options.max_connections(1).min_connections(1);
        }
        options.sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .map_err(|e| PersistenceError::ConnectionError(e.to_string()))?;
        debug!("Connected to {}", database_url);
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> Result<(), PersistenceError> {
        Migrator::up(&self.db, None)
            .await
            .map_err(|e| PersistenceError::MigrationError(e.to_string()))?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn find(&self, id: i32) -> Result<Option<analysis::Model>, PersistenceError> {
        Ok(analysis::Entity::find_by_id(id).one(&self.db).await?)
    }
}

#[async_trait]
impl AnalysisStore for SeoStorage {
    async fn insert(&self, record: NewAnalysis) -> Result<i32, PersistenceError> {
        let model = analysis::ActiveModel {
            id: NotSet,
            url: Set(record.url),
            focus_keyword: match record.focus_keyword {
                Some(keyword) => Set(Some(keyword)),
                None => NotSet,
            },
            result: Set(record.result),
            score: Set(record.score),
            created_at: Set(Utc::now()),
        };

        // exec() only reads back the key, so this also works on tables missing columns
        let inserted = analysis::Entity::insert(model).exec(&self.db).await?;
        Ok(inserted.last_insert_id)
    }

    async fn select(&self, query: AnalysisQuery) -> Result<Vec<analysis::Model>, PersistenceError> {
        let mut select = analysis::Entity::find();
        if let Some(url) = query.url {
            select = select.filter(analysis::Column::Url.eq(url));
        }
        if let Some(keyword) = query.focus_keyword {
            select = select.filter(analysis::Column::FocusKeyword.eq(keyword));
        }
        select = match query.order {
            SortOrder::NewestFirst => select
                .order_by_desc(analysis::Column::CreatedAt)
                .order_by_desc(analysis::Column::Id),
            SortOrder::OldestFirst => select
                .order_by_asc(analysis::Column::CreatedAt)
                .order_by_asc(analysis::Column::Id),
        };
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        Ok(select.all(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, PersistenceError> {
        let deleted = analysis::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(deleted.rows_affected > 0)
    }
}
