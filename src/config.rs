// src/config.rs

use crate::error::{ReminderError, ReminderResult};
use std::fmt;

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Runtime settings, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub shared_url: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub email_username: String,
    pub email_password: String,
    pub recipient_email: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("shared_url", &self.shared_url)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("email_username", &self.email_username)
            .field("email_password", &"<redacted>")
            .field("recipient_email", &self.recipient_email)
            .finish()
    }
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> ReminderResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup. Blank values count as missing,
    /// and every missing name is reported at once.
    pub fn from_lookup<F>(lookup: F) -> ReminderResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut missing = Vec::new();
        let mut required = |name: &str| {
            get(name).unwrap_or_else(|| {
                missing.push(name.to_string());
                String::new()
            })
        };

        let shared_url = required("SHAREPOINT_SHARED_URL");
        let smtp_server = required("SMTP_SERVER");
        let email_username = required("EMAIL_USERNAME");
        let email_password = required("EMAIL_PASSWORD");
        let recipient_email = required("RECIPIENT_EMAIL");

        if !missing.is_empty() {
            return Err(ReminderError::MissingConfig { names: missing });
        }

        let smtp_port = match get("SMTP_PORT") {
            None => DEFAULT_SMTP_PORT,
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| {
                ReminderError::InvalidConfig {
                    name: "SMTP_PORT".into(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
        };

        Ok(Self {
            shared_url,
            smtp_server,
            smtp_port,
            email_username,
            email_password,
            recipient_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SHAREPOINT_SHARED_URL", "https://contoso.sharepoint.com/:x:/g/personal/a/b"),
            ("SMTP_SERVER", "smtp.example.com"),
            ("EMAIL_USERNAME", "bot@example.com"),
            ("EMAIL_PASSWORD", "hunter2"),
            ("RECIPIENT_EMAIL", "ops@example.com"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> ReminderResult<Config> {
        Config::from_lookup(|k| env.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_smtp_port() {
        let cfg = load(&full_env()).unwrap();
        assert_eq!(cfg.smtp_port, 587);
        assert_eq!(cfg.smtp_server, "smtp.example.com");
    }

    #[test]
    fn explicit_smtp_port() {
        let mut env = full_env();
        env.insert("SMTP_PORT", "2525");
        assert_eq!(load(&env).unwrap().smtp_port, 2525);
    }

    #[test]
    fn reports_all_missing_names() {
        let mut env = full_env();
        env.remove("SMTP_SERVER");
        env.insert("RECIPIENT_EMAIL", "   ");
        match load(&env) {
            Err(ReminderError::MissingConfig { names }) => {
                assert_eq!(names, vec!["SMTP_SERVER", "RECIPIENT_EMAIL"]);
            }
            other => panic!("expected MissingConfig, got {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_port() {
        let mut env = full_env();
        env.insert("SMTP_PORT", "smtp");
        assert!(matches!(
            load(&env),
            Err(ReminderError::InvalidConfig { name, .. }) if name == "SMTP_PORT"
        ));
    }

    #[test]
    fn debug_hides_password() {
        let cfg = load(&full_env()).unwrap();
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
