pub mod model;
pub mod queries;
pub mod service;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use model::Task;
pub use queries::PgTaskStore;
pub use service::TaskService;
