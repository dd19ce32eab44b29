pub mod ai;
pub mod calculators;
pub mod engine;
pub mod runner;
pub mod scheduler;
pub mod selector;
pub mod state;
pub mod stats;

#[cfg(test)]
pub(crate) mod tests;
