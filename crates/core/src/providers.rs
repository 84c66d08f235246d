//! Simulated third-party sign-in
//!
//! No OAuth happens here. Each button yields a fixed identity, with a fresh
//! provider id per click, that goes through the regular save path.

use std::fmt;

use crate::models::{random_base36, Provider, UserPatch};

/// Screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Login,
    Signup,
    Dashboard,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Login => "login",
            Page::Signup => "signup",
            Page::Dashboard => "dashboard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "login" => Some(Page::Login),
            "signup" => Some(Page::Signup),
            "dashboard" => Some(Page::Dashboard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialProvider {
    Google,
    Facebook,
}

impl SocialProvider {
    pub fn provider(&self) -> Provider {
        match self {
            SocialProvider::Google => Provider::Google,
            SocialProvider::Facebook => Provider::Facebook,
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            SocialProvider::Google => "google_",
            SocialProvider::Facebook => "fb_",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Some(SocialProvider::Google),
            "facebook" => Some(SocialProvider::Facebook),
            _ => None,
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider().display_name())
    }
}

/// Fixed identity returned by a sign-in button on `page`
pub fn simulated_identity(social: SocialProvider, page: Page) -> UserPatch {
    let (email, name, avatar) = match (social, page) {
        (SocialProvider::Google, Page::Signup) => (
            "newuser.google@gmail.com",
            "Google User",
            "https://ui-avatars.com/api/?name=Google+User&background=4285F4&color=fff",
        ),
        (SocialProvider::Facebook, Page::Signup) => (
            "newuser.fb@facebook.com",
            "Facebook User",
            "https://ui-avatars.com/api/?name=FB+User&background=1877F2&color=fff",
        ),
        (SocialProvider::Google, _) => (
            "demo.user@gmail.com",
            "Demo User",
            "https://ui-avatars.com/api/?name=Demo+User&background=4285F4&color=fff",
        ),
        (SocialProvider::Facebook, _) => (
            "demo.user@facebook.com",
            "Demo Facebook User",
            "https://ui-avatars.com/api/?name=Demo+FB&background=1877F2&color=fff",
        ),
    };

    UserPatch {
        name: Some(name.to_string()),
        provider: Some(social.provider()),
        provider_id: Some(format!("{}{}", social.id_prefix(), random_base36(9))),
        avatar: Some(avatar.to_string()),
        verified: Some(true),
        ..UserPatch::new(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_identities() {
        let google = simulated_identity(SocialProvider::Google, Page::Login);
        assert_eq!(google.email, "demo.user@gmail.com");
        assert_eq!(google.provider, Some(Provider::Google));
        assert_eq!(google.verified, Some(true));
        let provider_id = google.provider_id.unwrap();
        assert!(provider_id.starts_with("google_"));
        assert_eq!(provider_id.len(), "google_".len() + 9);

        let fb = simulated_identity(SocialProvider::Facebook, Page::Login);
        assert_eq!(fb.email, "demo.user@facebook.com");
        assert!(fb.provider_id.unwrap().starts_with("fb_"));
    }

    #[test]
    fn test_signup_page_identities() {
        let google = simulated_identity(SocialProvider::Google, Page::Signup);
        assert_eq!(google.email, "newuser.google@gmail.com");
        assert_eq!(google.name.as_deref(), Some("Google User"));

        let fb = simulated_identity(SocialProvider::Facebook, Page::Signup);
        assert_eq!(fb.email, "newuser.fb@facebook.com");
    }

    #[test]
    fn test_provider_id_changes_per_click() {
        let a = simulated_identity(SocialProvider::Google, Page::Login);
        let b = simulated_identity(SocialProvider::Google, Page::Login);
        assert_ne!(a.provider_id, b.provider_id);
    }

    #[test]
    fn test_parse() {
        assert_eq!(SocialProvider::parse("Google"), Some(SocialProvider::Google));
        assert_eq!(SocialProvider::parse("twitter"), None);
        assert_eq!(Page::parse("signup"), Some(Page::Signup));
        assert_eq!(Page::Dashboard.as_str(), "dashboard");
    }
}
