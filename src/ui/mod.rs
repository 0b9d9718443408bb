mod details;
mod help;
mod menu;
mod pagination;
mod pane;
mod preview;

pub use details::*;
pub use help::*;
pub use menu::*;
pub use pagination::*;
pub use pane::*;
pub use preview::*;
