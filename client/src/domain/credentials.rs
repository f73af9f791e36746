//! Bearer credential primitives.
//!
//! Token values are held in zeroizing buffers and never appear in `Debug`
//! output, so they cannot leak through logs.

use std::fmt;

use zeroize::Zeroizing;

macro_rules! secret_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(Zeroizing<String>);

        impl $name {
            /// Wrap a raw token value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(Zeroizing::new(value.into()))
            }

            /// Raw token value, for building headers and request bodies.
            pub fn expose(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(***)"))
            }
        }
    };
}

secret_token! {
    /// Short-lived token sent as `Authorization: Bearer <token>`.
    AccessToken
}

secret_token! {
    /// Long-lived token exchanged for a fresh access token.
    RefreshToken
}

/// Credential pair persisted between sessions.
///
/// Created on login or registration, updated when the access token is
/// refreshed, and cleared on logout or unrecoverable auth failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Current access token, if any.
    pub access_token: Option<AccessToken>,
    /// Current refresh token, if any.
    pub refresh_token: Option<RefreshToken>,
}

impl Credentials {
    /// Build a credential pair with both tokens present.
    pub fn new(access: AccessToken, refresh: RefreshToken) -> Self {
        Self {
            access_token: Some(access),
            refresh_token: Some(refresh),
        }
    }

    /// Whether neither token is present.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Format an access token as an `Authorization` header value.
pub(crate) fn bearer(token: &AccessToken) -> String {
    format!("Bearer {}", token.expose())
}
