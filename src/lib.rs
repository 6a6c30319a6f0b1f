//! Newsstand library exports for testing

pub mod core;
pub mod imaging;
pub mod navigation;
pub mod tui;

#[cfg(test)]
pub mod test_support;
