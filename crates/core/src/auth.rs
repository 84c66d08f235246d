//! Authentication flows
//!
//! Login, signup and simulated social sign-in on top of the record store.
//! Every successful flow ends the same way: save the user, issue a session.

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::config::MitraConfig;
use crate::credentials::{hash_password, verify_password};
use crate::error::{Error, Result};
use crate::models::{Provider, SessionRecord, UserPatch, UserRecord};
use crate::notice::Notice;
use crate::providers::{simulated_identity, Page, SocialProvider};
use crate::record_store::{DataExport, RecordStore};
use crate::storage::KeyValueStore;
use crate::validation::{is_valid_email, LoginForm, Rules, SignupForm, ValidationReport};

/// Result of a successful flow
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// Known email, correct password
    WelcomeBack {
        user: UserRecord,
        session: SessionRecord,
    },
    /// Unknown email on the login form: the account is created on the spot
    AccountCreated {
        user: UserRecord,
        session: SessionRecord,
    },
    /// Signup form completed
    Registered {
        user: UserRecord,
        session: SessionRecord,
    },
    SocialSignIn {
        social: SocialProvider,
        page: Page,
        user: UserRecord,
        session: SessionRecord,
    },
    /// Social signup for an email that already has an account; nothing written
    AlreadyRegistered { social: SocialProvider },
}

impl AuthOutcome {
    pub fn session(&self) -> Option<&SessionRecord> {
        match self {
            AuthOutcome::WelcomeBack { session, .. }
            | AuthOutcome::AccountCreated { session, .. }
            | AuthOutcome::Registered { session, .. }
            | AuthOutcome::SocialSignIn { session, .. } => Some(session),
            AuthOutcome::AlreadyRegistered { .. } => None,
        }
    }

    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            AuthOutcome::WelcomeBack { user, .. }
            | AuthOutcome::AccountCreated { user, .. }
            | AuthOutcome::Registered { user, .. }
            | AuthOutcome::SocialSignIn { user, .. } => Some(user),
            AuthOutcome::AlreadyRegistered { .. } => None,
        }
    }

    pub fn notice(&self) -> Notice {
        match self {
            AuthOutcome::WelcomeBack { .. } => Notice::success("Welcome back! Login successful."),
            AuthOutcome::AccountCreated { .. } => {
                Notice::success("Account created! Welcome to Study Mitra.")
            }
            AuthOutcome::Registered { .. } => {
                Notice::success("Account created successfully! Welcome to Study Mitra.")
            }
            AuthOutcome::SocialSignIn {
                social, page, user, ..
            } => match page {
                Page::Signup => Notice::success(format!(
                    "Welcome {}! Account created with {}.",
                    user.name, social
                )),
                _ => Notice::success(format!(
                    "Welcome {}! Signed in with {}.",
                    user.name, social
                )),
            },
            AuthOutcome::AlreadyRegistered { .. } => {
                Notice::info("Account already exists. Redirecting to login...")
            }
        }
    }

    /// How long the notice stays up before navigating to `destination`.
    ///
    /// Accounts created from the signup page linger longer than login flows.
    pub fn redirect_delay(&self, config: &MitraConfig) -> std::time::Duration {
        match self {
            AuthOutcome::Registered { .. }
            | AuthOutcome::SocialSignIn {
                page: Page::Signup, ..
            } => config.signup_redirect_delay(),
            _ => config.redirect_delay(),
        }
    }

    /// Where the user goes once the notice has been shown
    pub fn destination(&self) -> Page {
        match self {
            AuthOutcome::WelcomeBack { .. } | AuthOutcome::AccountCreated { .. } => {
                Page::Dashboard
            }
            AuthOutcome::SocialSignIn { page, .. } if *page != Page::Signup => Page::Dashboard,
            _ => Page::Login,
        }
    }
}

/// Auth service owning the record store
pub struct AuthService<D, V> {
    store: RecordStore<D, V>,
    rules: Rules,
}

impl<D: KeyValueStore, V: KeyValueStore> AuthService<D, V> {
    pub fn new(durable: D, volatile: V, config: &MitraConfig) -> Result<Self> {
        let store = RecordStore::new(durable, volatile)?.with_session_ttl(config.session_ttl()?);
        Ok(Self {
            store,
            rules: Rules {
                min_password_len: config.min_password_len,
            },
        })
    }

    pub fn store(&self) -> &RecordStore<D, V> {
        &self.store
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn check_login(&self, form: &LoginForm) -> ValidationReport {
        form.validate(self.rules)
    }

    /// Signup rules, including the already-registered lookup
    pub fn check_signup(&self, form: &SignupForm) -> Result<ValidationReport> {
        let taken = is_valid_email(&form.email) && self.store.user_exists(&form.email)?;
        Ok(form.validate(self.rules, taken))
    }

    /// Log in with email and password.
    ///
    /// An unknown email registers a new manual account instead of failing.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub fn login(&self, form: &LoginForm) -> Result<AuthOutcome> {
        self.check_login(form).into_result()?;

        if let Some(existing) = self.store.find_by_email(&form.email)? {
            if !verify_password(&form.password, existing.password_hash.as_deref()) {
                warn!(user_id = %existing.id, "Invalid password");
                return Err(Error::InvalidCredentials);
            }

            let patch = UserPatch {
                provider: Some(Provider::Manual),
                ..UserPatch::new(form.email.clone())
            };
            let user = self.store.save_user(patch)?;
            let session = self.store.issue_session(&user)?;
            info!(user_id = %user.id, "Login successful");
            return Ok(AuthOutcome::WelcomeBack { user, session });
        }

        let name = form.email.split('@').next().unwrap_or_default().to_string();
        let patch = UserPatch {
            name: Some(name),
            password_hash: Some(hash_password(&form.password)?),
            provider: Some(Provider::Manual),
            ..UserPatch::new(form.email.clone())
        };
        let user = self.store.save_user(patch)?;
        let session = self.store.issue_session(&user)?;
        info!(user_id = %user.id, "New user created on login");
        Ok(AuthOutcome::AccountCreated { user, session })
    }

    /// Register a manual account from the signup form
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub fn signup(&self, form: &SignupForm) -> Result<AuthOutcome> {
        self.check_signup(form)?.into_result()?;

        let patch = UserPatch {
            name: Some(form.full_name.trim().to_string()),
            phone: form.normalized_phone(),
            password_hash: Some(hash_password(&form.password)?),
            provider: Some(Provider::Manual),
            verified: Some(false),
            agreed_to_terms: Some(true),
            agreed_at: Some(Utc::now()),
            ..UserPatch::new(form.email.trim().to_lowercase())
        };
        let user = self.store.save_user(patch)?;
        let session = self.store.issue_session(&user)?;
        info!(user_id = %user.id, "New user registered");
        Ok(AuthOutcome::Registered { user, session })
    }

    /// Simulated Google/Facebook sign-in from `page`.
    ///
    /// From the signup page an existing account is reported instead of
    /// signed in; everywhere else the fixed identity is saved and a session
    /// issued. Validation does not apply.
    #[instrument(skip(self))]
    pub fn social_sign_in(&self, social: SocialProvider, page: Page) -> Result<AuthOutcome> {
        let identity = simulated_identity(social, page);

        if page == Page::Signup && self.store.user_exists(&identity.email)? {
            info!(email = %identity.email, "Social account already exists");
            return Ok(AuthOutcome::AlreadyRegistered { social });
        }

        let user = self.store.save_user(identity)?;
        let session = self.store.issue_session(&user)?;
        info!(user_id = %user.id, provider = %user.provider, "Social sign-in successful");
        Ok(AuthOutcome::SocialSignIn {
            social,
            page,
            user,
            session,
        })
    }

    pub fn session(&self) -> Result<Option<SessionRecord>> {
        self.store.current_session()
    }

    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        self.store.clear_session()?;
        info!("Logged out");
        Ok(())
    }

    pub fn export(&self) -> Result<DataExport> {
        self.store.export()
    }
}
