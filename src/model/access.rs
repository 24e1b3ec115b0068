use uuid::Uuid;

use crate::{
    model::error::{DatabaseError, DatabaseResult},
    web::AuthenticatedUser,
};

/// Records tied to a single learner account.
pub trait HasOwner {
    fn owner_id(&self) -> Uuid;
}

/// Admins reach every record, learners only their own. An impersonated
/// session acts as the impersonated learner.
pub fn check_access<T: HasOwner>(actor: &AuthenticatedUser, resource: &T) -> DatabaseResult<()> {
    if actor.is_admin() || resource.owner_id() == actor.user_id() {
        Ok(())
    } else {
        Err(DatabaseError::Forbidden)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::web::UserRole;

    struct Owned(Uuid);

    impl HasOwner for Owned {
        fn owner_id(&self) -> Uuid {
            self.0
        }
    }

    #[test]
    fn owner_has_access_test() {
        let owner = Uuid::new_v4();
        let actor = AuthenticatedUser::new(owner, UserRole::User);
        assert!(check_access(&actor, &Owned(owner)).is_ok());
    }

    #[test]
    fn stranger_is_forbidden_test() {
        let actor = AuthenticatedUser::new(Uuid::new_v4(), UserRole::User);
        assert!(matches!(
            check_access(&actor, &Owned(Uuid::new_v4())),
            Err(DatabaseError::Forbidden)
        ));
    }

    #[test]
    fn admin_reaches_everything_test() {
        let actor = AuthenticatedUser::new(Uuid::new_v4(), UserRole::Admin);
        assert!(check_access(&actor, &Owned(Uuid::new_v4())).is_ok());
    }

    #[test]
    fn impersonation_acts_as_the_learner_test() {
        let learner = Uuid::new_v4();
        let actor = AuthenticatedUser::impersonated(learner, UserRole::User, Uuid::new_v4());
        assert!(check_access(&actor, &Owned(learner)).is_ok());
        assert!(check_access(&actor, &Owned(Uuid::new_v4())).is_err());
    }
}
