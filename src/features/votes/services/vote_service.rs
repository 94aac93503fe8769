use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::votes::models::{VoteState, VoteStatus};
use crate::features::votes::repositories::VoteRepository;

pub struct VoteService {
    votes: Arc<dyn VoteRepository>,
}

impl VoteService {
    pub fn new(votes: Arc<dyn VoteRepository>) -> Self {
        Self { votes }
    }

    pub async fn toggle(&self, user: &AuthenticatedUser, incident_id: Uuid) -> Result<VoteState> {
        let state = self.votes.toggle(incident_id, user.id).await?;

        tracing::info!(
            "User {} {} incident {} ({} upvotes)",
            user.id,
            if state.has_voted { "upvoted" } else { "withdrew vote on" },
            incident_id,
            state.upvotes
        );

        Ok(state)
    }

    /// Anonymous callers have never voted
    pub async fn status(
        &self,
        user: Option<&AuthenticatedUser>,
        incident_id: Uuid,
    ) -> Result<VoteStatus> {
        let has_voted = match user {
            Some(user) => self.votes.has_voted(incident_id, user.id).await?,
            None => false,
        };

        Ok(VoteStatus { has_voted })
    }
}
