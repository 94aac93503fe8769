use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Counter and caller state right after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VoteState {
    pub upvotes: i32,
    pub has_voted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VoteStatus {
    pub has_voted: bool,
}
