use crate::{
    config::AdminSeed,
    errors::AppResult,
    models::{NewUser, Role},
    password::hash_password,
    repository::Repository,
};

/// Creates the bootstrap admin account unless one with that email or
/// username already exists. Returns whether a row was inserted.
pub async fn seed_admin(repo: &dyn Repository, seed: &AdminSeed) -> AppResult<bool> {
    if repo.user_exists(&seed.email, &seed.username).await? {
        tracing::debug!(email = %seed.email, "admin account already present");
        return Ok(false);
    }

    let password_hash = hash_password(seed.password.clone()).await?;
    let admin = repo
        .create_user(NewUser {
            username: seed.username.clone(),
            email: seed.email.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await?;

    tracing::info!(user_id = admin.id, email = %admin.email, "admin account created");
    Ok(true)
}
