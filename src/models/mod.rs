mod audio;
mod resource;
mod trend;

pub use audio::{AudioFile, AudioManifest, NarrationStyle};
pub use resource::{GeneratedContent, Resource, DEFAULT_PASSWORD};
pub use trend::{EngagementCounts, TrendRecord, TrendSummary, TrendingSnapshot};
