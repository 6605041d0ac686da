mod session;

pub use session::{TempStore, TestSession};
