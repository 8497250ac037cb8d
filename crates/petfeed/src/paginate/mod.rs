mod page;
mod paginator;
mod record;
mod sort;
#[cfg(test)]
mod tests;

pub use page::*;
pub use paginator::*;
pub use record::*;
pub use sort::*;
