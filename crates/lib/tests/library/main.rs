//! Resolution of whole project descriptions.

mod common;
mod overrides_tests;
mod pod_tests;
mod search_paths_tests;
mod write_tests;
