pub mod utils;

mod admin;
mod sessions;

pub use utils::{test_db, test_utils};
