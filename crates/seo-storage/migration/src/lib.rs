pub use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_120000_create_analyses_table::Migration),
            Box::new(m20250715_090000_add_focus_keyword_to_analyses::Migration),
        ]
    }
}
mod m20250601_120000_create_analyses_table;
mod m20250715_090000_add_focus_keyword_to_analyses;
