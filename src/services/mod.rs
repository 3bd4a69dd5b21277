mod pdf;
mod scraper;
mod speech;

pub use pdf::write_resource_pdf;
pub use scraper::TrendScraper;
pub use speech::SpeechSynthesizer;
