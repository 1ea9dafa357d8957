pub mod agent;
pub mod config;
pub mod examiner;
pub mod fact_checker;
pub mod llm_client;
pub mod markush_extractor;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod retry;
pub mod smiles;
pub mod sse;
pub mod substituent_matcher;
