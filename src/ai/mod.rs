mod generator;
mod parser;
mod prompt;

pub use generator::ContentGenerator;
pub use parser::parse_resources;
pub use prompt::generation_prompt;
