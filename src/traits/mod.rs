pub mod model_client;
pub mod markush_parsing;
pub mod substituent_matching;

// Re-export traits
pub use model_client::{ collect_text, ModelClient, ModelEvent, ModelRequest, TextStream };
pub use markush_parsing::MarkushParsingService;
pub use substituent_matching::SubstituentMatchingService;
