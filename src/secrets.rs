use secrecy::{ExposeSecret, SecretString};

/// Source of the secrets a request is signed with.
pub trait SecretsProvider {
    fn get_consumer_key_pair(&self) -> (&str, &str);

    fn get_token_pair_option(&self) -> Option<(&str, &str)>;

    fn get_token_option_pair(&self) -> (Option<&str>, Option<&str>) {
        self.get_token_pair_option()
            .map(|s| (Some(s.0), Some(s.1)))
            .unwrap_or((None, None))
    }
}

/// An OAuth token and its secret, either a request token or an access token.
#[derive(Debug, Clone)]
pub struct TokenPair {
    token: String,
    token_secret: SecretString,
}

impl TokenPair {
    pub fn new<TKey, TSecret>(token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        TokenPair {
            token: token.into(),
            token_secret: SecretString::from(token_secret.into()),
        }
    }

    /// Builds a pair only when both halves are non-blank.
    pub fn non_blank(token: Option<String>, token_secret: Option<String>) -> Option<Self> {
        match (token, token_secret) {
            (Some(t), Some(s)) if !t.trim().is_empty() && !s.trim().is_empty() => {
                Some(TokenPair::new(t, s))
            }
            _ => None,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_secret(&self) -> &str {
        self.token_secret.expose_secret()
    }
}

/// Consumer key pair plus, once authenticated, a token pair.
///
/// The consumer half is fixed for the life of the process; the token half is
/// replaced wholesale, never field by field.
#[derive(Debug, Clone)]
pub struct Credentials {
    consumer_key: String,
    consumer_secret: SecretString,
    token: Option<TokenPair>,
}

impl Credentials {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Credentials {
            consumer_key: consumer_key.into(),
            consumer_secret: SecretString::from(consumer_secret.into()),
            token: None,
        }
    }

    pub fn token<TKey, TSecret>(self, token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        self.token_pair(TokenPair::new(token, token_secret))
    }

    pub fn token_pair(self, pair: TokenPair) -> Self {
        Credentials {
            token: Some(pair),
            ..self
        }
    }

    /// The same consumer pair with the token half dropped.
    pub fn consumer_only(&self) -> Self {
        Credentials {
            token: None,
            ..self.clone()
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn get_token(&self) -> Option<&TokenPair> {
        self.token.as_ref()
    }
}

impl SecretsProvider for Credentials {
    fn get_consumer_key_pair(&self) -> (&str, &str) {
        (&self.consumer_key, self.consumer_secret.expose_secret())
    }

    fn get_token_pair_option(&self) -> Option<(&str, &str)> {
        self.token
            .as_ref()
            .map(|pair| (pair.token(), pair.token_secret()))
    }
}
