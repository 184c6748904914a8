mod form;
mod health;
mod process;
mod ranges;

pub use form::*;
pub use health::*;
pub use process::*;
pub use ranges::*;
