use sea_orm::entity::prelude::*;
use seo_scoring::AnalysisResult;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use fake::Dummy;

/// Key used when a focus keyword has to travel inside the `result` JSON.
pub const EMBEDDED_FOCUS_KEYWORD: &str = "focus_keyword";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, specta::Type)]
#[cfg_attr(test, derive(Dummy))]
#[sea_orm(table_name = "analyses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub url: String,
    pub focus_keyword: Option<String>,
    /// JSON encoded `AnalysisResult`.
    #[sea_orm(column_type = "Text")]
    pub result: String,
    /// Overall score at the time of the analysis.
    pub score: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn analysis_result(&self) -> Result<AnalysisResult, serde_json::Error> {
        serde_json::from_str(&self.result)
    }

    /// The column value, or the keyword embedded in `result` by a degraded write.
    pub fn stored_focus_keyword(&self) -> Option<String> {
        if let Some(keyword) = self.focus_keyword.as_ref().filter(|k| !k.is_empty()) {
            return Some(keyword.clone());
        }
        serde_json::from_str::<serde_json::Value>(&self.result)
            .ok()?
            .get(EMBEDDED_FOCUS_KEYWORD)?
            .as_str()
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }
}
