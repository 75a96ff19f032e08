pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_admins;
mod m20251001_000002_create_events;
mod m20251001_000003_create_participants;
mod m20251001_000004_create_winners;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_admins::Migration),
            Box::new(m20251001_000002_create_events::Migration),
            Box::new(m20251001_000003_create_participants::Migration),
            Box::new(m20251001_000004_create_winners::Migration),
        ]
    }
}
