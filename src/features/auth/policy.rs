//! Authorization decisions, one function per guarded action.

use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::models::Comment;
use crate::features::incidents::models::Incident;

/// Admins may move any incident; operators only the ones assigned to them.
pub fn can_change_status(actor: &AuthenticatedUser, incident: &Incident) -> bool {
    actor.is_admin() || (actor.is_operator() && incident.assigned_to_id == Some(actor.id))
}

pub fn can_assign_operator(actor: &AuthenticatedUser) -> bool {
    actor.is_admin()
}

/// Only the reporter may delete their incident.
pub fn can_delete_incident(actor: &AuthenticatedUser, incident: &Incident) -> bool {
    incident.user_id == actor.id
}

pub fn can_delete_comment(actor: &AuthenticatedUser, comment: &Comment) -> bool {
    comment.user_id == actor.id || actor.is_staff()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::Role;
    use crate::shared::test_helpers::{sample_comment, sample_incident, user_with_role};

    #[test]
    fn test_change_status_requires_admin_or_assigned_operator() {
        let reporter = user_with_role(Role::Citizen);
        let operator = user_with_role(Role::Operator);
        let other_operator = user_with_role(Role::Operator);
        let admin = user_with_role(Role::Admin);

        let mut incident = sample_incident(reporter.id);
        assert!(!can_change_status(&reporter, &incident));
        assert!(!can_change_status(&operator, &incident));
        assert!(can_change_status(&admin, &incident));

        incident.assigned_to_id = Some(operator.id);
        assert!(can_change_status(&operator, &incident));
        assert!(!can_change_status(&other_operator, &incident));
    }

    #[test]
    fn test_citizen_assigned_id_does_not_grant_status_change() {
        let citizen = user_with_role(Role::Citizen);
        let mut incident = sample_incident(citizen.id);
        incident.assigned_to_id = Some(citizen.id);
        assert!(!can_change_status(&citizen, &incident));
    }

    #[test]
    fn test_delete_comment_allows_author_and_staff() {
        let author = user_with_role(Role::Citizen);
        let stranger = user_with_role(Role::Citizen);
        let comment = sample_comment(author.id);

        assert!(can_delete_comment(&author, &comment));
        assert!(!can_delete_comment(&stranger, &comment));
        assert!(can_delete_comment(&user_with_role(Role::Operator), &comment));
        assert!(can_delete_comment(&user_with_role(Role::Admin), &comment));
    }

    #[test]
    fn test_only_admin_assigns_operators() {
        for role in [Role::Citizen, Role::Operator] {
            assert!(!can_assign_operator(&user_with_role(role)));
        }
        assert!(can_assign_operator(&user_with_role(Role::Admin)));
    }

    #[test]
    fn test_only_owner_deletes_incident() {
        let owner = user_with_role(Role::Citizen);
        let incident = sample_incident(owner.id);
        assert!(can_delete_incident(&owner, &incident));
        assert!(!can_delete_incident(&user_with_role(Role::Admin), &incident));
    }
}
