//! User Service - permission rules, hashing and login

use axum_helpers::{ADMIN_ONLY, ADMINISTRATIVE, JwtAuth, JwtClaims, Role, authorize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{
    CreateUser, LoginRequest, LoginResponse, SeedAdmin, UpdateProfile, UpdateUser, User,
    UserResponse, normalize_email, present,
};
use crate::password::{hash_password, verify_password};
use crate::repository::UserRepository;

pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    jwt: JwtAuth,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, jwt: JwtAuth) -> Self {
        Self {
            repository: Arc::new(repository),
            jwt,
        }
    }

    pub fn jwt_auth(&self) -> &JwtAuth {
        &self.jwt
    }

    /// Register or add a user.
    ///
    /// Anyone may create a `user`; `admin` and `Manager` accounts need an
    /// admin caller.
    #[instrument(skip(self, input, caller), fields(username = %input.username))]
    pub async fn add_user(
        &self,
        input: CreateUser,
        caller: Option<&JwtClaims>,
    ) -> UserResult<UserResponse> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let role = input.role.unwrap_or_default();
        if role.is_privileged() {
            let caller = caller.ok_or_else(|| {
                UserError::Forbidden(format!("Creating a '{}' account requires an admin", role))
            })?;
            authorize(caller, ADMIN_ONLY)?;
        }

        if self
            .repository
            .get_by_email(&normalize_email(&input.email))
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateEmail(input.email));
        }
        if self
            .repository
            .get_by_username(input.username.trim())
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateUsername(input.username));
        }

        let password_hash = hash_password(&input.password)?;
        let created = self
            .repository
            .create(User::new(&input, password_hash))
            .await?;
        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        self.find(id).await.map(Into::into)
    }

    /// The caller's own record.
    #[instrument(skip(self, claims), fields(user_id = %claims.sub))]
    pub async fn view_profile(&self, claims: &JwtClaims) -> UserResult<UserResponse> {
        self.get_user(caller_id(claims)?).await
    }

    #[instrument(skip(self, caller), fields(caller = %caller.sub))]
    pub async fn list_users(&self, caller: &JwtClaims) -> UserResult<Vec<UserResponse>> {
        authorize(caller, ADMINISTRATIVE)?;
        let users = self.repository.list().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Partial edit of `id` on behalf of `caller`.
    ///
    /// - editing someone else needs an administrative caller; editing
    ///   another `admin` or `Manager` needs an admin
    /// - changing a role needs an administrative caller; granting
    ///   `admin` or `Manager` needs an admin
    /// - the password hash is replaced only when the supplied password does
    ///   not already verify against it
    #[instrument(skip(self, input, caller), fields(caller = %caller.sub))]
    pub async fn edit_user(
        &self,
        id: Uuid,
        input: UpdateUser,
        caller: &JwtClaims,
    ) -> UserResult<UserResponse> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let editing_other = caller_id(caller)? != id;
        if editing_other {
            authorize(caller, ADMINISTRATIVE)?;
        }

        let mut user = self.find(id).await?;
        if editing_other && user.role.is_privileged() {
            authorize(caller, ADMIN_ONLY)?;
        }

        if let Some(role) = input.role.filter(|role| *role != user.role) {
            authorize(caller, ADMINISTRATIVE)?;
            if role.is_privileged() {
                authorize(caller, ADMIN_ONLY)?;
            }
        }

        self.check_identity_available(&user, &input).await?;

        let new_password_hash = match input.password.as_deref().filter(|p| !p.is_empty()) {
            Some(candidate) if !verify_password(candidate, &user.password_hash) => {
                Some(hash_password(candidate)?)
            }
            _ => None,
        };

        user.apply_update(&input, new_password_hash);
        let updated = self.repository.update(user).await?;
        Ok(updated.into())
    }

    /// Self-service edit of name, email and username.
    #[instrument(skip(self, claims, input), fields(user_id = %claims.sub))]
    pub async fn update_profile(
        &self,
        claims: &JwtClaims,
        input: UpdateProfile,
    ) -> UserResult<UserResponse> {
        self.edit_user(caller_id(claims)?, input.into(), claims).await
    }

    /// Delete a user. Accounts with role `admin` are protected.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        let user = self.find(id).await?;
        if user.role == Role::Admin {
            return Err(UserError::ProtectedRole(id));
        }

        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    /// Check credentials and issue an access token.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<LoginResponse> {
        let username = input.username.trim();
        let user = self
            .repository
            .get_by_username(username)
            .await?
            .ok_or_else(|| UserError::UsernameNotFound(username.to_string()))?;

        if !verify_password(&input.password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(UserError::InvalidCredentials);
        }

        let token = self
            .jwt
            .issue(user.id, &user.username, user.role)
            .map_err(|e| UserError::Token(e.to_string()))?;

        tracing::info!(user_id = %user.id, role = %user.role, "Login successful");
        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
        })
    }

    /// Create the initial admin unless a user with that email already exists.
    ///
    /// Returns `None` when nothing was created.
    #[instrument(skip(self, seed), fields(username = %seed.username))]
    pub async fn ensure_admin(&self, seed: SeedAdmin) -> UserResult<Option<UserResponse>> {
        if self
            .repository
            .get_by_email(&normalize_email(&seed.email))
            .await?
            .is_some()
        {
            tracing::debug!("Seed admin already present");
            return Ok(None);
        }

        let input = CreateUser {
            name: seed.name,
            email: seed.email,
            role: Some(Role::Admin),
            username: seed.username,
            password: seed.password,
        };
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let password_hash = hash_password(&input.password)?;
        let created = self
            .repository
            .create(User::new(&input, password_hash))
            .await?;

        tracing::info!(user_id = %created.id, "Seed admin created");
        Ok(Some(created.into()))
    }

    async fn find(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn check_identity_available(&self, user: &User, input: &UpdateUser) -> UserResult<()> {
        if let Some(email) = present(&input.email).map(normalize_email) {
            if email != user.email {
                if let Some(other) = self.repository.get_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(UserError::DuplicateEmail(email));
                    }
                }
            }
        }

        if let Some(username) = present(&input.username) {
            if username != user.username {
                if let Some(other) = self.repository.get_by_username(username).await? {
                    if other.id != user.id {
                        return Err(UserError::DuplicateUsername(username.to_string()));
                    }
                }
            }
        }

        Ok(())
    }
}

fn caller_id(claims: &JwtClaims) -> UserResult<Uuid> {
    claims
        .user_id()
        .map_err(|_| UserError::Unauthenticated("Token subject is not a user id".to_string()))
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            jwt: self.jwt.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use axum_helpers::JwtConfig;

    const SECRET: &str = "user-service-test-secret-32-characters!!";

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new(SECRET))
    }

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::new(InMemoryUserRepository::new(), jwt())
    }

    fn new_user(username: &str, role: Option<Role>) -> CreateUser {
        CreateUser {
            name: format!("{username} name"),
            email: format!("{username}@example.com"),
            role,
            username: username.to_string(),
            password: "password1".to_string(),
        }
    }

    fn claims_for(user: &UserResponse) -> JwtClaims {
        JwtClaims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            iat: 0,
            exp: i64::MAX,
        }
    }

    async fn seed_admin(service: &UserService<InMemoryUserRepository>) -> JwtClaims {
        let admin = service
            .ensure_admin(SeedAdmin {
                name: "Root".into(),
                email: "root@example.com".into(),
                username: "root".into(),
                password: "rootpass".into(),
            })
            .await
            .unwrap()
            .unwrap();
        claims_for(&admin)
    }

    #[tokio::test]
    async fn test_add_then_login() {
        let service = service();
        let user = service.add_user(new_user("alice", None), None).await.unwrap();
        assert_eq!(user.role, Role::User);

        let response = service
            .login(LoginRequest {
                username: "alice".into(),
                password: "password1".into(),
            })
            .await
            .unwrap();
        assert_eq!(response.message, "Login successful");

        let claims = service.jwt_auth().verify(&response.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn test_duplicate_email_creates_nothing() {
        let service = service();
        service.add_user(new_user("alice", None), None).await.unwrap();

        let mut again = new_user("alice2", None);
        again.email = "ALICE@example.com".into();
        let result = service.add_user(again, None).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));

        let result = service
            .login(LoginRequest {
                username: "alice2".into(),
                password: "password1".into(),
            })
            .await;
        assert!(matches!(result, Err(UserError::UsernameNotFound(_))));
    }

    #[tokio::test]
    async fn test_privileged_roles_need_admin_caller() {
        let service = service();
        let result = service.add_user(new_user("boss", Some(Role::Manager)), None).await;
        assert!(matches!(result, Err(UserError::Forbidden(_))));

        let user = service.add_user(new_user("plain", None), None).await.unwrap();
        let result = service
            .add_user(new_user("boss", Some(Role::Admin)), Some(&claims_for(&user)))
            .await;
        assert!(matches!(result, Err(UserError::Forbidden(_))));

        let admin = seed_admin(&service).await;
        let manager = service
            .add_user(new_user("boss", Some(Role::Manager)), Some(&admin))
            .await
            .unwrap();
        assert_eq!(manager.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = service();
        service.add_user(new_user("carol", None), None).await.unwrap();

        let result = service
            .login(LoginRequest {
                username: "carol".into(),
                password: "not-her-password".into(),
            })
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_list_users_requires_administrative_role() {
        let service = service();
        let user = service.add_user(new_user("dave", None), None).await.unwrap();
        let result = service.list_users(&claims_for(&user)).await;
        assert!(matches!(result, Err(UserError::Forbidden(_))));

        let admin = seed_admin(&service).await;
        assert_eq!(service.list_users(&admin).await.unwrap().len(), 2);

        let manager = JwtClaims {
            role: Role::Manager,
            ..claims_for(&user)
        };
        assert!(service.list_users(&manager).await.is_ok());
    }

    #[tokio::test]
    async fn test_edit_merges_present_fields() {
        let service = service();
        let user = service.add_user(new_user("erin", None), None).await.unwrap();
        let claims = claims_for(&user);

        let edited = service
            .edit_user(
                user.id,
                UpdateUser {
                    name: Some("Erin Updated".into()),
                    email: Some(String::new()),
                    ..Default::default()
                },
                &claims,
            )
            .await
            .unwrap();
        assert_eq!(edited.name, "Erin Updated");
        assert_eq!(edited.email, user.email);
        assert_eq!(edited.version, user.version + 1);

        let unchanged = service
            .edit_user(user.id, UpdateUser::default(), &claims)
            .await
            .unwrap();
        assert_eq!(unchanged.name, "Erin Updated");
        assert_eq!(unchanged.username, user.username);
    }

    #[tokio::test]
    async fn test_edit_with_current_password_keeps_hash() {
        let repo = InMemoryUserRepository::new();
        let service = UserService::new(repo.clone(), jwt());
        let user = service.add_user(new_user("frank", None), None).await.unwrap();
        let claims = claims_for(&user);
        let original = repo.get_by_id(user.id).await.unwrap().unwrap().password_hash;

        service
            .edit_user(
                user.id,
                UpdateUser {
                    password: Some("password1".into()),
                    ..Default::default()
                },
                &claims,
            )
            .await
            .unwrap();
        let after_same = repo.get_by_id(user.id).await.unwrap().unwrap().password_hash;
        assert_eq!(after_same, original);

        service
            .edit_user(
                user.id,
                UpdateUser {
                    password: Some("brand-new-pass".into()),
                    ..Default::default()
                },
                &claims,
            )
            .await
            .unwrap();
        let after_change = repo.get_by_id(user.id).await.unwrap().unwrap().password_hash;
        assert_ne!(after_change, original);
        assert!(verify_password("brand-new-pass", &after_change));
    }

    #[tokio::test]
    async fn test_edit_permissions() {
        let service = service();
        let alice = service.add_user(new_user("alice", None), None).await.unwrap();
        let bob = service.add_user(new_user("bob", None), None).await.unwrap();
        let alice_claims = claims_for(&alice);

        let result = service
            .edit_user(bob.id, UpdateUser::default(), &alice_claims)
            .await;
        assert!(matches!(result, Err(UserError::Forbidden(_))));

        let result = service
            .edit_user(
                alice.id,
                UpdateUser {
                    role: Some(Role::Admin),
                    ..Default::default()
                },
                &alice_claims,
            )
            .await;
        assert!(matches!(result, Err(UserError::Forbidden(_))));

        let admin = seed_admin(&service).await;
        let promoted = service
            .edit_user(
                bob.id,
                UpdateUser {
                    role: Some(Role::Manager),
                    ..Default::default()
                },
                &admin,
            )
            .await
            .unwrap();
        assert_eq!(promoted.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_manager_cannot_edit_privileged_accounts() {
        let service = service();
        let admin = seed_admin(&service).await;
        let manager = service
            .add_user(new_user("mona", Some(Role::Manager)), Some(&admin))
            .await
            .unwrap();
        let other_manager = service
            .add_user(new_user("otto", Some(Role::Manager)), Some(&admin))
            .await
            .unwrap();
        let manager_claims = claims_for(&manager);
        let admin_id = admin.user_id().unwrap();

        let result = service
            .edit_user(
                admin_id,
                UpdateUser {
                    password: Some("owned-by-manager".into()),
                    ..Default::default()
                },
                &manager_claims,
            )
            .await;
        assert!(matches!(result, Err(UserError::Forbidden(_))));

        let result = service
            .login(LoginRequest {
                username: "root".into(),
                password: "owned-by-manager".into(),
            })
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));

        let result = service
            .edit_user(
                admin_id,
                UpdateUser {
                    role: Some(Role::User),
                    ..Default::default()
                },
                &manager_claims,
            )
            .await;
        assert!(matches!(result, Err(UserError::Forbidden(_))));
        assert_eq!(service.get_user(admin_id).await.unwrap().role, Role::Admin);

        let result = service
            .edit_user(other_manager.id, UpdateUser::default(), &manager_claims)
            .await;
        assert!(matches!(result, Err(UserError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_manager_may_edit_plain_users_and_self() {
        let service = service();
        let admin = seed_admin(&service).await;
        let manager = service
            .add_user(new_user("mona", Some(Role::Manager)), Some(&admin))
            .await
            .unwrap();
        let user = service.add_user(new_user("pete", None), None).await.unwrap();
        let manager_claims = claims_for(&manager);

        let edited = service
            .edit_user(
                user.id,
                UpdateUser {
                    name: Some("Pete Edited".into()),
                    ..Default::default()
                },
                &manager_claims,
            )
            .await
            .unwrap();
        assert_eq!(edited.name, "Pete Edited");

        let own = service
            .edit_user(
                manager.id,
                UpdateUser {
                    name: Some("Mona Edited".into()),
                    ..Default::default()
                },
                &manager_claims,
            )
            .await
            .unwrap();
        assert_eq!(own.name, "Mona Edited");

        let demoted = service
            .edit_user(
                manager.id,
                UpdateUser {
                    role: Some(Role::User),
                    ..Default::default()
                },
                &admin,
            )
            .await
            .unwrap();
        assert_eq!(demoted.role, Role::User);
    }

    #[tokio::test]
    async fn test_login_trims_username() {
        let service = service();
        let mut input = new_user("judy", None);
        input.username = " judy".into();
        let user = service.add_user(input, None).await.unwrap();
        assert_eq!(user.username, "judy");

        let response = service
            .login(LoginRequest {
                username: "judy ".into(),
                password: "password1".into(),
            })
            .await;
        assert!(response.is_ok());
    }

    #[tokio::test]
    async fn test_edit_rejects_taken_email() {
        let service = service();
        let alice = service.add_user(new_user("alice", None), None).await.unwrap();
        service.add_user(new_user("bob", None), None).await.unwrap();

        let result = service
            .edit_user(
                alice.id,
                UpdateUser {
                    email: Some("Bob@Example.com".into()),
                    ..Default::default()
                },
                &claims_for(&alice),
            )
            .await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_update_profile_ignores_role_and_password() {
        let service = service();
        let user = service.add_user(new_user("gina", None), None).await.unwrap();
        let updated = service
            .update_profile(
                &claims_for(&user),
                UpdateProfile {
                    username: Some("gina_b".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "gina_b");
        assert_eq!(updated.role, Role::User);
    }

    #[tokio::test]
    async fn test_delete_protects_admins() {
        let service = service();
        let admin = seed_admin(&service).await;
        let result = service.delete_user(admin.user_id().unwrap()).await;
        assert!(matches!(result, Err(UserError::ProtectedRole(_))));

        let user = service.add_user(new_user("hank", None), None).await.unwrap();
        service.delete_user(user.id).await.unwrap();
        assert!(matches!(
            service.get_user(user.id).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user(user.id).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let service = service();
        seed_admin(&service).await;
        let again = service
            .ensure_admin(SeedAdmin {
                name: "Root".into(),
                email: "ROOT@example.com".into(),
                username: "root".into(),
                password: "rootpass".into(),
            })
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_edit_surfaces_lost_race() {
        let mut mock_repo = MockUserRepository::new();
        let stored = User::new(&new_user("ivy", None), hash_password("password1").unwrap());
        let id = stored.id;

        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        mock_repo
            .expect_update()
            .returning(|user| Err(UserError::ConcurrentModification(user.id)));

        let service = UserService::new(mock_repo, jwt());
        let claims = JwtClaims {
            sub: id.to_string(),
            username: "ivy".into(),
            role: Role::User,
            iat: 0,
            exp: i64::MAX,
        };
        let result = service
            .edit_user(
                id,
                UpdateUser {
                    name: Some("Ivy".into()),
                    ..Default::default()
                },
                &claims,
            )
            .await;
        assert!(matches!(result, Err(UserError::ConcurrentModification(_))));
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_username()
            .returning(|_| Err(UserError::Database("connection refused".into())));

        let service = UserService::new(mock_repo, jwt());
        let result = service
            .login(LoginRequest {
                username: "anyone".into(),
                password: "whatever".into(),
            })
            .await;
        assert!(matches!(result, Err(UserError::Database(_))));
    }
}
