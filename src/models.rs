pub mod color;
pub mod column;
pub mod project;
pub mod project_type;
pub mod store;
pub mod task;
