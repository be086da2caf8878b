use crate::db::{Database, SESSION_KEY, USERS_KEY};
use crate::errors::{AppError, AppResult};
use crate::models::{Role, SignupPayload, User};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Tracks the signed-in user in memory and mirrors it to the persisted
/// `session` record so a restart restores the login.
#[derive(Clone)]
pub struct SessionManager {
    db: Arc<Database>,
    current: Arc<RwLock<Option<User>>>,
}

impl SessionManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Exact, case-sensitive match on email and password.
    pub fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<User>> {
        let users: Vec<User> = self.db.get_collection(USERS_KEY)?;
        Ok(users
            .into_iter()
            .find(|user| user.email == email && user.password == password))
    }

    /// Appends a new user unless the email is taken. Returns `None` on a
    /// duplicate email.
    pub fn register(&self, payload: SignupPayload) -> AppResult<Option<User>> {
        let mut users: Vec<User> = self.db.get_collection(USERS_KEY)?;
        if users.iter().any(|user| user.email == payload.email) {
            return Ok(None);
        }

        let user = User {
            id: format!("u-{}", Uuid::new_v4()),
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role: payload.role.unwrap_or(Role::Marketer),
            plan: None,
        };
        users.push(user.clone());
        self.db.set_collection(USERS_KEY, &users)?;
        Ok(Some(user))
    }

    pub fn begin(&self, user: User) -> AppResult<()> {
        self.db.set_json(SESSION_KEY, &user)?;
        *self.write()? = Some(user);
        Ok(())
    }

    pub fn end(&self) -> AppResult<()> {
        self.db.set(SESSION_KEY, &serde_json::Value::Null)?;
        *self.write()? = None;
        Ok(())
    }

    /// Drops the in-memory user without touching storage.
    pub fn forget(&self) -> AppResult<()> {
        *self.write()? = None;
        Ok(())
    }

    /// True when a persisted session exists. Hydrates the in-memory user from
    /// it on every call.
    pub fn is_authenticated(&self) -> AppResult<bool> {
        let persisted: Option<User> = self.db.get_json(SESSION_KEY)?;
        let authenticated = persisted.is_some();
        if let Some(user) = persisted {
            *self.write()? = Some(user);
        }
        Ok(authenticated)
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.read().ok().and_then(|current| current.clone())
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, Option<User>>> {
        self.current
            .write()
            .map_err(|_| AppError::Internal("session lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::SessionManager;
    use crate::db::Database;
    use crate::models::{Role, SignupPayload};
    use std::sync::Arc;

    fn sessions(dir: &tempfile::TempDir) -> (Arc<Database>, SessionManager) {
        let db = Arc::new(Database::new(&dir.path().join("test.db")).expect("db"));
        (db.clone(), SessionManager::new(db))
    }

    #[test]
    fn authenticate_requires_exact_credentials() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, sessions) = sessions(&dir);

        let admin = sessions.authenticate("admin@nexgen.com", "123").expect("auth");
        assert_eq!(admin.map(|user| user.role), Some(Role::Admin));
        assert!(sessions.authenticate("admin@nexgen.com", "wrong").expect("auth").is_none());
        assert!(sessions.authenticate("ADMIN@nexgen.com", "123").expect("auth").is_none());
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, sessions) = sessions(&dir);

        let duplicate = sessions
            .register(SignupPayload {
                name: "Other Jane".to_string(),
                email: "jane@nexgen.com".to_string(),
                password: "x".to_string(),
                role: None,
            })
            .expect("register");
        assert!(duplicate.is_none());

        let created = sessions
            .register(SignupPayload {
                name: "Client Two".to_string(),
                email: "two@client.com".to_string(),
                password: "pw".to_string(),
                role: Some(Role::Client),
            })
            .expect("register")
            .expect("created");
        assert!(created.id.starts_with("u-"));
        assert!(sessions.authenticate("two@client.com", "pw").expect("auth").is_some());
    }

    #[test]
    fn persisted_session_survives_a_new_manager() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (db, sessions) = sessions(&dir);

        let admin = sessions
            .authenticate("admin@nexgen.com", "123")
            .expect("auth")
            .expect("admin");
        sessions.begin(admin.clone()).expect("begin");

        let restarted = SessionManager::new(db);
        assert!(restarted.current_user().is_none());
        assert!(restarted.is_authenticated().expect("check"));
        assert_eq!(restarted.current_user(), Some(admin));

        restarted.end().expect("end");
        assert!(!restarted.is_authenticated().expect("check"));
        assert!(restarted.current_user().is_none());
    }
}
