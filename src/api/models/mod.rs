pub mod captains;
pub mod system;

pub use captains::*;
pub use system::*;
