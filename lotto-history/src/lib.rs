pub mod io;
pub mod models;
pub mod store;

pub use models::{Draw, PICK_COUNT, POOL_SIZE};
pub use store::History;
