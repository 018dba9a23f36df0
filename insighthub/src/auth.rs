//! Authentication collaborator interface. The real provider lives outside
//! the core; the mock issues opaque session tokens for local runs and tests.

use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub success: bool,
    pub user: Option<User>,
    pub message: String,
}

impl AuthOutcome {
    fn ok(user: Option<User>, message: &str) -> Self {
        Self {
            success: true,
            user,
            message: message.to_string(),
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            user: None,
            message: message.to_string(),
        }
    }
}

pub trait AuthProvider: Send {
    fn sign_up(&mut self, email: &str, password: &str) -> AuthOutcome;
    fn sign_in(&mut self, email: &str, password: &str) -> AuthOutcome;
    fn sign_in_with_google(&mut self) -> AuthOutcome;
    fn logout(&mut self) -> AuthOutcome;
    fn current_user(&self) -> Option<User>;
}

#[derive(Debug, Default)]
pub struct MockAuthProvider {
    accounts: HashMap<String, String>,
    session: Option<(User, String)>,
}

impl MockAuthProvider {
    fn start_session(&mut self, user: User) {
        let token = generate_session_token(&user.id);
        debug_assert!(validate_session_token(&token));
        self.session = Some((user, token));
    }
}

impl AuthProvider for MockAuthProvider {
    fn sign_up(&mut self, email: &str, password: &str) -> AuthOutcome {
        if self.accounts.contains_key(email) {
            return AuthOutcome::failed("An account with this email already exists.");
        }
        if password.len() < 6 {
            return AuthOutcome::failed("Password must be at least 6 characters.");
        }
        self.accounts.insert(email.to_string(), password.to_string());
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name: None,
        };
        self.start_session(user.clone());
        AuthOutcome::ok(Some(user), "Account created successfully!")
    }

    fn sign_in(&mut self, email: &str, password: &str) -> AuthOutcome {
        match self.accounts.get(email) {
            Some(stored) if stored == password => {
                let user = User {
                    id: Uuid::new_v4().to_string(),
                    email: email.to_string(),
                    display_name: None,
                };
                self.start_session(user.clone());
                AuthOutcome::ok(Some(user), "Signed in successfully!")
            }
            _ => AuthOutcome::failed("Invalid email or password."),
        }
    }

    fn sign_in_with_google(&mut self) -> AuthOutcome {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: "user@gmail.com".to_string(),
            display_name: Some("Google User".to_string()),
        };
        self.start_session(user.clone());
        AuthOutcome::ok(Some(user), "Signed in with Google successfully!")
    }

    fn logout(&mut self) -> AuthOutcome {
        self.session = None;
        AuthOutcome::ok(None, "Signed out successfully!")
    }

    fn current_user(&self) -> Option<User> {
        self.session.as_ref().map(|(user, _)| user.clone())
    }
}

fn generate_session_token(user_id: &str) -> String {
    format!("session_{}_{}", user_id, Uuid::new_v4())
}

fn validate_session_token(token: &str) -> bool {
    token.starts_with("session_") && token.len() > 20
}
