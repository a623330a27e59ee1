//! Command line journal for keeping track of sleep, mood, productivity and daily tasks.
//! Entries are kept in plain JSON files and summarized into a Markdown overview with text charts,
//! so everything stays readable without the tool itself.
//!

pub mod cli;
pub mod fs;
pub mod report;
pub mod storage;
pub mod utils;
