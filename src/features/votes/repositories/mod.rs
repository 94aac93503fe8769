mod vote_repository;

pub use vote_repository::{PgVoteRepository, VoteRepository};
