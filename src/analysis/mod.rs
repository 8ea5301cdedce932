mod failure;
mod history;

pub use failure::extract as extract_failure;
pub use history::analyze as analyze_history;
