use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};
use uuid::Uuid;

const USERNAME_INDEX: &str = "idx_user_username";

stored_object!(User, "user", {
    username: String,
    /// Argon2 hash, never the plain password.
    password: String
});

impl User {
    /// Creates an account. Usernames are unique; a taken name is a validation error.
    pub async fn register(
        username: &str,
        password: &str,
        db: &SurrealDbClient,
    ) -> Result<Self, AppError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".into(),
            ));
        }

        if Self::find_by_username(username, db).await?.is_some() {
            return Err(AppError::Validation("Username already exists".into()));
        }

        Self::insert(username, password, db).await
    }

    /// Writes the account row. The unique username index still guards
    /// registrations that raced past the lookup above.
    async fn insert(username: &str, password: &str, db: &SurrealDbClient) -> Result<Self, AppError> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        let created: Result<Option<User>, surrealdb::Error> = db
            .client
            .query(
                "CREATE type::thing('user', $id) SET
                    username = $username,
                    password = crypto::argon2::generate($password),
                    created_at = $created_at,
                    updated_at = $updated_at",
            )
            .bind(("id", id))
            .bind(("username", username.to_owned()))
            .bind(("password", password.to_owned()))
            .bind(("created_at", surrealdb::Datetime::from(now)))
            .bind(("updated_at", surrealdb::Datetime::from(now)))
            .await?
            .take(0);

        let user = created.map_err(|err| {
            if err.to_string().contains(USERNAME_INDEX) {
                AppError::Validation("Username already exists".into())
            } else {
                AppError::Database(err)
            }
        })?;

        user.ok_or(AppError::InternalError("User failed to create".into()))
    }

    pub async fn authenticate(
        username: &str,
        password: &str,
        db: &SurrealDbClient,
    ) -> Result<Self, AppError> {
        let user: Option<User> = db
            .client
            .query(
                "SELECT * FROM user
                WHERE username = $username
                AND crypto::argon2::compare(password, $password)
                LIMIT 1",
            )
            .bind(("username", username.trim().to_owned()))
            .bind(("password", password.to_owned()))
            .await?
            .take(0)?;

        user.ok_or(AppError::Auth("Invalid username or password".into()))
    }

    pub async fn find_by_username(
        username: &str,
        db: &SurrealDbClient,
    ) -> Result<Option<Self>, AppError> {
        let user: Option<User> = db
            .client
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username.to_owned()))
            .await?
            .take(0)?;

        Ok(user)
    }
}
