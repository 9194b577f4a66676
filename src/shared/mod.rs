pub mod shutdown;
pub mod utills;

pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
