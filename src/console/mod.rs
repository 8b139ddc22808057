pub mod console;
pub mod ledger;
pub mod scan;
pub mod session;

pub use console::{Console, Feedback};
pub use ledger::Ledger;
pub use scan::{classify, ScanCode};
pub use session::{Session, DEFAULT_QUANTITY};
