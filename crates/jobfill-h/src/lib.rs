pub mod bridge;
pub mod cdp;
pub mod page;
pub mod trigger;

pub use page::HeadlessPage;
