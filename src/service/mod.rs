//! Domain services enforcing the tracker's invariants.
//!
//! Services own every rule the store does not: status validity, tag
//! auto-creation, cycle-free linking and task existence. Multi-step
//! operations run inside a single transaction and roll back on any error.

pub mod tags;
pub mod tasks;

pub use tags::TagService;
pub use tasks::TaskService;

use crate::db::Database;

/// Both services sharing one database handle.
#[derive(Clone)]
pub struct Services {
    pub tasks: TaskService,
    pub tags: TagService,
}

impl Services {
    pub fn new(db: Database) -> Self {
        Self {
            tasks: TaskService::new(db.clone()),
            tags: TagService::new(db),
        }
    }
}
