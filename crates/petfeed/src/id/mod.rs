mod sequential;
#[cfg(feature = "serde")]
mod serde;

pub use sequential::*;
