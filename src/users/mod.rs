pub mod attribution;
pub mod repo;
pub mod repo_types;

pub use attribution::parse_payload;
pub use repo::{PgLedger, UserLedger};
pub use repo_types::{Attribution, LedgerStats, Profile, SourceStats, UserRecord};
