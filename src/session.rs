use std::collections::HashMap;

/// Session-scoped key/value store. Stands in for the browser's
/// `sessionStorage`: values live exactly as long as the session that owns
/// them and are never written to disk.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store for one process run.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: HashMap<String, String>,
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let mut session = MemorySession::default();
        assert_eq!(session.get("csv_access_ok"), None);
        session.set("csv_access_ok", "1");
        assert_eq!(session.get("csv_access_ok").as_deref(), Some("1"));
    }

    #[test]
    fn overwrite_keeps_latest() {
        let mut session = MemorySession::default();
        session.set("k", "a");
        session.set("k", "b");
        assert_eq!(session.get("k").as_deref(), Some("b"));
    }
}
