pub mod applier;
pub mod autofill;
pub mod config;
pub mod dropdown;
pub mod formatter;
pub mod memory;
pub mod options;
pub mod page;
pub mod remote;
pub mod resume;

pub use jobfill_common::dom;
pub use jobfill_common::protocol;
pub use jobfill_common::site;
