pub mod action;
pub mod identity;
pub mod stage;

pub use action::*;
pub use identity::*;
pub use stage::*;
