use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250601_120000_create_analyses_table::Analyses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Analyses::Table)
                    .add_column(string_null(FocusKeyword::FocusKeyword))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Analyses::Table)
                    .drop_column(FocusKeyword::FocusKeyword)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum FocusKeyword {
    FocusKeyword,
}
