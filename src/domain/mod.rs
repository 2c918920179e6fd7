pub mod comment;
pub mod types;

pub use comment::{Comment, SortOrder, sort_comments, summarize};
pub use types::{Label, ModelTag, ToxicitySummary, Verdict};
