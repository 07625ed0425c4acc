//! OpsDesk startup: open the database, hydrate every entity store, and report
//! a summary. UI shells embed the library crate and subscribe to the stores;
//! this binary exercises the same startup path headlessly.

use std::process::ExitCode;

use opsdesk::db::OpsDb;
use opsdesk::mindmap::{FileStorage, MindMapStore};
use opsdesk::sync::{CompanyAdapter, IncidentAdapter, SyncStore, SystemAdapter, TaskAdapter};

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = OpsDb::open()?;

    let companies = SyncStore::new(CompanyAdapter);
    let systems = SyncStore::new(SystemAdapter);
    let tasks = SyncStore::new(TaskAdapter);
    let incidents = SyncStore::new(IncidentAdapter);

    companies.fetch_all(&db)?;
    systems.fetch_all(&db)?;
    tasks.fetch_all(&db)?;
    incidents.fetch_all(&db)?;

    log::info!(
        "loaded {} companies, {} systems, {} tasks, {} incidents",
        companies.snapshot().items.len(),
        systems.snapshot().items.len(),
        tasks.snapshot().items.len(),
        incidents.snapshot().items.len(),
    );

    let mindmaps = MindMapStore::open(Box::new(FileStorage::new()?));
    log::info!("loaded {} mind-map documents", mindmaps.documents().len());

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("startup failed: {e}");
            ExitCode::FAILURE
        }
    }
}
