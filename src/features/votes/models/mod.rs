mod vote;

pub use vote::{VoteState, VoteStatus};
