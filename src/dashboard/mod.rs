mod card;
mod document;
#[cfg(test)]
mod fixtures;
mod merge;
mod table;

use serde::{Deserialize, Serialize};

pub use document::next_day_number;
pub use merge::{merge_into_file, MergeOptions, MergeReport};

/// What to do with a resource whose day already has a card or table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateDayPolicy {
    /// Append regardless, leaving duplicate cards and table entries.
    #[default]
    Append,
    /// Leave out resources whose day is already present.
    Skip,
    /// Fail the whole merge.
    Reject,
}
