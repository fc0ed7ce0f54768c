pub mod commands;
pub mod errors;
pub mod events;
pub mod fine;
pub mod status;
pub mod transaction;
pub mod value_objects;

pub use errors::*;
pub use events::*;
pub use fine::{FINE_PER_DAY, FineAssessment, compute_fine, due_date};
pub use status::{TransactionStatus, allowed_statuses, check_declared_status, resolve_status};
pub use transaction::{LoanState, Transaction};
pub use value_objects::*;
