pub mod browser;
pub mod extract;
pub mod output;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
