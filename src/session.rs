use chrono::{DateTime, Utc};

/// Explicit login state, created once credentials check out and handed to the
/// console. The query engine never sees it.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub is_admin: bool,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn open(username: &str, admins: &[String]) -> Self {
        Self {
            username: username.to_string(),
            is_admin: admins.iter().any(|a| a == username),
            logged_in_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_flag_comes_from_config_list() {
        let admins = vec!["root".to_string()];
        assert!(Session::open("root", &admins).is_admin);
        assert!(!Session::open("guest", &admins).is_admin);
    }
}
