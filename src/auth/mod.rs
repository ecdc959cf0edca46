pub mod guard;
pub mod password;
pub mod permissions;
pub mod principal;

pub use guard::*;
pub use password::*;
pub use permissions::*;
pub use principal::*;
