/// Kind of session transition reported to session listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChange {
    /// First resolved value after startup (may be "no session").
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

impl AuthChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthChange::InitialSession => "INITIAL_SESSION",
            AuthChange::SignedIn => "SIGNED_IN",
            AuthChange::SignedOut => "SIGNED_OUT",
            AuthChange::TokenRefreshed => "TOKEN_REFRESHED",
            AuthChange::UserUpdated => "USER_UPDATED",
        }
    }
}
