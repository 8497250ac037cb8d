mod interface;
mod sequential;

pub use interface::*;
pub use sequential::*;
