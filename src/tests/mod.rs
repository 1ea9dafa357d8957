pub mod support;

mod extraction_tests;
mod matching_tests;
mod pipeline_tests;
