use crate::session::SessionStore;

/// Session key recording that the gate was passed.
pub const ACCESS_FLAG_KEY: &str = "csv_access_ok";

/// Soft passphrase check in front of the panel. The code is a plain
/// configured constant compared client-side; this is a UX gate, never an
/// authentication mechanism.
pub struct AccessGate {
    code: String,
}

impl AccessGate {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// True when the session already carries the access flag.
    pub fn is_open(&self, session: &dyn SessionStore) -> bool {
        session.get(ACCESS_FLAG_KEY).as_deref() == Some("1")
    }

    /// Compare the entered text (trimmed) against the configured code. On
    /// match the flag is persisted so the session is not asked again. No
    /// lockout, no rate limiting.
    pub fn unlock(&self, input: &str, session: &mut dyn SessionStore) -> bool {
        if input.trim() == self.code {
            session.set(ACCESS_FLAG_KEY, "1");
            true
        } else {
            false
        }
    }
}
