use std::fmt;
use std::sync::{PoisonError, RwLock};

use tracing::info;

use crate::{AuthProtocolError, AuthResult, Credentials, HandshakeStep, TokenPair};

/// Where the process stands in the out-of-band login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    RequestTokenObtained,
    AuthorizedPendingVerifier,
    Authenticated,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::RequestTokenObtained => "request token obtained",
            AuthState::AuthorizedPendingVerifier => "authorization pending",
            AuthState::Authenticated => "authenticated",
        })
    }
}

#[derive(Debug, Clone)]
struct PendingLogin {
    request: TokenPair,
    authorize_url_issued: bool,
}

#[derive(Debug, Default)]
struct Slot {
    access: Option<TokenPair>,
    pending: Option<PendingLogin>,
}

/// Process-wide holder of the TripIt credentials.
///
/// One access-token slot (last write wins) and one pending request token.
/// Readers always get a full copy of a pair, never half of an update.
#[derive(Debug)]
pub struct CredentialStore {
    consumer: Credentials,
    slot: RwLock<Slot>,
}

impl CredentialStore {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Self::with_consumer(Credentials::new(consumer_key, consumer_secret))
    }

    /// Starts from `credentials`; a token pair already on them counts as
    /// authenticated.
    pub fn with_consumer(credentials: Credentials) -> Self {
        let access = credentials.get_token().cloned();
        CredentialStore {
            consumer: credentials.consumer_only(),
            slot: RwLock::new(Slot {
                access,
                pending: None,
            }),
        }
    }

    /// Consumer-only credentials, used to sign the request-token call.
    pub fn consumer(&self) -> &Credentials {
        &self.consumer
    }

    pub fn set<TKey, TSecret>(&self, token: TKey, token_secret: TSecret)
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        self.write().access = Some(TokenPair::new(token, token_secret));
    }

    /// Full credentials when an access token is held.
    pub fn get(&self) -> Option<Credentials> {
        let access = self.read().access.clone()?;
        Some(self.consumer.clone().token_pair(access))
    }

    /// Drops the access token and any login in progress.
    pub fn clear(&self) {
        *self.write() = Slot::default();
        info!("cleared TripIt credentials");
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().access.is_some()
    }

    /// A login in progress takes precedence over an older access token.
    pub fn state(&self) -> AuthState {
        Self::state_of(&self.read())
    }

    fn state_of(slot: &Slot) -> AuthState {
        match (&slot.pending, &slot.access) {
            (Some(pending), _) if pending.authorize_url_issued => {
                AuthState::AuthorizedPendingVerifier
            }
            (Some(_), _) => AuthState::RequestTokenObtained,
            (None, Some(_)) => AuthState::Authenticated,
            (None, None) => AuthState::Unauthenticated,
        }
    }

    pub(crate) fn begin_login(&self, request: TokenPair) {
        self.write().pending = Some(PendingLogin {
            request,
            authorize_url_issued: false,
        });
    }

    pub(crate) fn pending_request(&self) -> Option<TokenPair> {
        self.read().pending.as_ref().map(|p| p.request.clone())
    }

    /// Records that the user was sent to authorize `request_token`.
    pub(crate) fn mark_authorize_issued(&self, request_token: &str) {
        if let Some(pending) = self.write().pending.as_mut() {
            if pending.request.token() == request_token {
                pending.authorize_url_issued = true;
            }
        }
    }

    /// Installs the access token and ends the login in one write, provided
    /// `request_token` is still the pending login. A login that was cleared or
    /// replaced meanwhile leaves the store untouched.
    pub(crate) fn complete_login(&self, request_token: &str, access: TokenPair) -> AuthResult<()> {
        let mut slot = self.write();
        let pending_token = slot.pending.as_ref().map(|p| p.request.token().to_string());
        match pending_token {
            Some(token) if token == request_token => {
                slot.access = Some(access);
                slot.pending = None;
                Ok(())
            }
            Some(_) => Err(AuthProtocolError::UnknownRequestToken(
                request_token.to_string(),
            )),
            None => Err(AuthProtocolError::StateViolation {
                step: HandshakeStep::AccessToken,
                state: Self::state_of(&slot),
            }),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::SecretsProvider;

    #[test]
    fn authenticated_after_set() {
        let store = CredentialStore::new("ck1", "cs1");
        assert!(!store.is_authenticated());
        assert!(store.get().is_none());
        assert_eq!(store.state(), AuthState::Unauthenticated);

        store.set("tok", "sec");
        assert!(store.is_authenticated());
        assert_eq!(store.state(), AuthState::Authenticated);
        let credentials = store.get().unwrap();
        assert_eq!(credentials.get_token_pair_option(), Some(("tok", "sec")));
        assert_eq!(credentials.get_consumer_key_pair(), ("ck1", "cs1"));
    }

    #[test]
    fn last_write_wins_and_clear_resets() {
        let store = CredentialStore::new("ck1", "cs1");
        store.set("tok1", "sec1");
        store.set("tok2", "sec2");
        assert_eq!(
            store.get().unwrap().get_token_pair_option(),
            Some(("tok2", "sec2"))
        );

        store.begin_login(TokenPair::new("rt", "rs"));
        store.clear();
        assert!(!store.is_authenticated());
        assert!(store.pending_request().is_none());
        assert_eq!(store.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn preprovisioned_token_counts_as_authenticated() {
        let store = CredentialStore::with_consumer(Credentials::new("ck1", "cs1").token("t", "s"));
        assert!(store.is_authenticated());
        assert!(store.consumer().get_token().is_none());
    }

    #[test]
    fn login_states() {
        let store = CredentialStore::new("ck1", "cs1");
        store.begin_login(TokenPair::new("rt", "rs"));
        assert_eq!(store.state(), AuthState::RequestTokenObtained);

        store.mark_authorize_issued("other");
        assert_eq!(store.state(), AuthState::RequestTokenObtained);
        store.mark_authorize_issued("rt");
        assert_eq!(store.state(), AuthState::AuthorizedPendingVerifier);
        assert!(!store.is_authenticated());

        store.complete_login("rt", TokenPair::new("at", "as")).unwrap();
        assert_eq!(store.state(), AuthState::Authenticated);
        assert!(store.pending_request().is_none());
    }

    #[test]
    fn completing_an_abandoned_login_changes_nothing() {
        let store = CredentialStore::new("ck1", "cs1");
        store.begin_login(TokenPair::new("rt", "rs"));
        store.clear();
        let err = store
            .complete_login("rt", TokenPair::new("at", "as"))
            .unwrap_err();
        assert!(matches!(
            err,
            AuthProtocolError::StateViolation {
                step: HandshakeStep::AccessToken,
                state: AuthState::Unauthenticated,
            }
        ));
        assert!(!store.is_authenticated());

        store.begin_login(TokenPair::new("rt2", "rs2"));
        let err = store
            .complete_login("rt", TokenPair::new("at", "as"))
            .unwrap_err();
        assert!(matches!(err, AuthProtocolError::UnknownRequestToken(t) if t == "rt"));
        assert!(!store.is_authenticated());
        assert_eq!(store.pending_request().unwrap().token(), "rt2");
    }

    #[test]
    fn concurrent_readers_see_whole_pairs() {
        let store = Arc::new(CredentialStore::new("ck1", "cs1"));
        store.set("tok0", "sec0");

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 1..500 {
                    store.set(format!("tok{}", i), format!("sec{}", i));
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let credentials = store.get().unwrap();
                        let (token, secret) = credentials.get_token_pair_option().unwrap();
                        assert_eq!(token.trim_start_matches("tok"), secret.trim_start_matches("sec"));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
