pub mod models;
pub mod sync;
pub mod wizard;
