//! Engine test modules.

mod helpers;
mod matching_tests;
mod state_tests;
