//! Authentication use-cases over the request pipeline.
//!
//! Login and registration store the returned token pair; logout clears it
//! before telling the server. Profile and password calls are thin wrappers
//! that carry the bearer token.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{info, warn};
use zeroize::Zeroizing;

use super::pipeline::RequestPipeline;
use super::ports::{CredentialStore, HttpTransport};
use super::{AccessToken, ApiResult, HttpMethod, RefreshToken, RequestDescriptor};

const LOGIN_ENDPOINT: &str = "/api/users/login/";
const REGISTER_ENDPOINT: &str = "/api/users/register/";
const LOGOUT_ENDPOINT: &str = "/api/users/logout/";
const ME_ENDPOINT: &str = "/api/users/me/";
const CHANGE_PASSWORD_ENDPOINT: &str = "/api/users/change-password/";
const FORGOT_PASSWORD_ENDPOINT: &str = "/api/users/forgot-password/";

/// Domain error returned when credential inputs are invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginValidationError {
    /// Phone number was missing or blank once trimmed.
    #[error("phone number must not be empty")]
    EmptyPhoneNumber,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Registration name was missing or blank once trimmed.
    #[error("first name must not be empty")]
    EmptyName,
}

fn required_phone(phone_number: &str) -> Result<String, LoginValidationError> {
    let normalized = phone_number.trim();
    if normalized.is_empty() {
        return Err(LoginValidationError::EmptyPhoneNumber);
    }
    Ok(normalized.to_owned())
}

fn required_password(password: &str) -> Result<Zeroizing<String>, LoginValidationError> {
    if password.is_empty() {
        return Err(LoginValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials.
///
/// ## Invariants
/// - `phone_number` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use chakula_client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" 0712345678 ", "secret").unwrap();
/// assert_eq!(creds.phone_number(), "0712345678");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    phone_number: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw phone number and password inputs.
    pub fn try_from_parts(phone_number: &str, password: &str) -> Result<Self, LoginValidationError> {
        Ok(Self {
            phone_number: required_phone(phone_number)?,
            password: required_password(password)?,
        })
    }

    /// Normalised phone number.
    pub fn phone_number(&self) -> &str {
        self.phone_number.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("phone_number", &self.phone_number)
            .field("password", &"***")
            .finish()
    }
}

/// Validated registration payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    first_name: String,
    phone_number: String,
    password: Zeroizing<String>,
    last_name: Option<String>,
    email: Option<String>,
    registration_number: Option<String>,
    university: Option<String>,
}

impl Registration {
    /// Start a registration with the required fields.
    pub fn try_new(
        first_name: &str,
        phone_number: &str,
        password: &str,
    ) -> Result<Self, LoginValidationError> {
        let name = first_name.trim();
        if name.is_empty() {
            return Err(LoginValidationError::EmptyName);
        }
        Ok(Self {
            first_name: name.to_owned(),
            phone_number: required_phone(phone_number)?,
            password: required_password(password)?,
            last_name: None,
            email: None,
            registration_number: None,
            university: None,
        })
    }

    /// Set the last name.
    #[must_use]
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Set the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the university registration number.
    #[must_use]
    pub fn with_registration_number(mut self, number: impl Into<String>) -> Self {
        self.registration_number = Some(number.into());
        self
    }

    /// Set the university identifier.
    #[must_use]
    pub fn with_university(mut self, university: impl Into<String>) -> Self {
        self.university = Some(university.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("first_name".to_owned(), json!(self.first_name));
        body.insert("phone_number".to_owned(), json!(self.phone_number));
        body.insert("password".to_owned(), json!(self.password.as_str()));
        insert_optional(&mut body, "last_name", self.last_name.as_deref());
        insert_optional(&mut body, "email", self.email.as_deref());
        insert_optional(
            &mut body,
            "registration_number",
            self.registration_number.as_deref(),
        );
        insert_optional(&mut body, "university", self.university.as_deref());
        Value::Object(body)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("phone_number", &self.phone_number)
            .field("password", &"***")
            .finish_non_exhaustive()
    }
}

/// Partial profile update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New phone number.
    pub phone_number: Option<String>,
    /// New university registration number.
    pub registration_number: Option<String>,
}

impl ProfileUpdate {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone_number,
            &self.registration_number,
        ]
        .iter()
        .all(|field| field.is_none())
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        insert_optional(&mut body, "first_name", self.first_name.as_deref());
        insert_optional(&mut body, "last_name", self.last_name.as_deref());
        insert_optional(&mut body, "email", self.email.as_deref());
        insert_optional(&mut body, "phone_number", self.phone_number.as_deref());
        insert_optional(
            &mut body,
            "registration_number",
            self.registration_number.as_deref(),
        );
        Value::Object(body)
    }
}

fn insert_optional(body: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(text) = value {
        body.insert(key.to_owned(), json!(text));
    }
}

/// Role assigned to an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Subscribed student.
    #[default]
    Student,
    /// Cafeteria staff.
    Staff,
    /// University administrator.
    Admin,
    /// Platform administrator.
    SuperAdmin,
    /// Developer account.
    Developer,
    /// Role not known to this client.
    #[serde(other)]
    Unknown,
}

/// Account profile returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Account identifier; numeric ids are kept in their decimal form.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// CPS number shown on the identifier card.
    pub cps_number: Option<String>,
    /// Full display name.
    pub full_name: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Login phone number.
    pub phone_number: String,
    /// University registration number.
    pub registration_number: Option<String>,
    /// University display name.
    pub university_name: Option<String>,
    /// Account role.
    #[serde(default)]
    pub role: Role,
    /// Whether the account may sign in.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl User {
    /// Name to show for the account, falling back to the phone number.
    pub fn display_name(&self) -> String {
        if let Some(full) = self.full_name.as_deref().filter(|name| !name.trim().is_empty()) {
            return full.trim().to_owned();
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self.phone_number.clone()
        } else {
            joined
        }
    }
}

const fn default_active() -> bool {
    true
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Signed-in account returned by login and registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Account profile.
    pub user: User,
    /// CPS number, from the response or the profile.
    pub cps_number: Option<String>,
}

#[derive(Deserialize)]
struct AuthResponse {
    access: String,
    refresh: String,
    user: User,
    cps_number: Option<String>,
}

/// Authentication calls over a [`RequestPipeline`].
pub struct AuthApi<S, T> {
    pipeline: RequestPipeline<S, T>,
}

impl<S, T> AuthApi<S, T>
where
    S: CredentialStore,
    T: HttpTransport,
{
    /// Wrap a pipeline.
    pub fn new(pipeline: RequestPipeline<S, T>) -> Self {
        Self { pipeline }
    }

    /// Underlying pipeline.
    pub fn pipeline(&self) -> &RequestPipeline<S, T> {
        &self.pipeline
    }

    /// Sign in and store the returned token pair.
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<AuthSession> {
        let descriptor = RequestDescriptor::new(HttpMethod::Post, LOGIN_ENDPOINT)
            .with_body(json!({
                "phone_number": credentials.phone_number(),
                "password": credentials.password(),
            }))
            .without_auth();
        self.authenticate(&descriptor).await
    }

    /// Create an account and store the returned token pair.
    pub async fn register(&self, registration: &Registration) -> ApiResult<AuthSession> {
        let descriptor = RequestDescriptor::new(HttpMethod::Post, REGISTER_ENDPOINT)
            .with_body(registration.to_json())
            .without_auth();
        self.authenticate(&descriptor).await
    }

    /// Clear stored tokens, then tell the server.
    ///
    /// Tokens are gone before the call is sent, so the server call carries no
    /// bearer token; its outcome is informational only.
    pub async fn logout(&self) -> ApiResult<Value> {
        if let Err(err) = self.pipeline.store().clear_tokens() {
            warn!(kind = err.kind(), error = %err, "failed to clear credentials on logout");
        }
        let descriptor = RequestDescriptor::new(HttpMethod::Post, LOGOUT_ENDPOINT)
            .with_body(json!({}))
            .without_auth();
        self.pipeline.request(&descriptor).await
    }

    /// Fetch the signed-in account.
    pub async fn me(&self) -> ApiResult<User> {
        self.pipeline.get(ME_ENDPOINT).await
    }

    /// Apply a partial profile update.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        self.pipeline.patch(ME_ENDPOINT, update.to_json()).await
    }

    /// Change the signed-in account's password.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> ApiResult<Value> {
        self.pipeline
            .post(
                CHANGE_PASSWORD_ENDPOINT,
                json!({ "old_password": old_password, "new_password": new_password }),
            )
            .await
    }

    /// Request a password reset for a phone number.
    pub async fn forgot_password(&self, phone_number: &str) -> ApiResult<Value> {
        let descriptor = RequestDescriptor::new(HttpMethod::Post, FORGOT_PASSWORD_ENDPOINT)
            .with_body(json!({ "phone_number": phone_number.trim() }))
            .without_auth();
        self.pipeline.request(&descriptor).await
    }

    async fn authenticate(&self, descriptor: &RequestDescriptor) -> ApiResult<AuthSession> {
        let result = self.pipeline.request::<AuthResponse>(descriptor).await;
        if let Some(response) = result.data() {
            let access = AccessToken::new(response.access.as_str());
            let refresh = RefreshToken::new(response.refresh.as_str());
            match self.pipeline.store().set_tokens(&access, &refresh) {
                Ok(()) => info!(endpoint = descriptor.endpoint(), "signed in"),
                Err(err) => {
                    warn!(kind = err.kind(), error = %err, "failed to store credentials");
                }
            }
        }
        result.map(|response| {
            let cps_number = response
                .cps_number
                .or_else(|| response.user.cps_number.clone());
            AuthSession {
                user: response.user,
                cps_number,
            }
        })
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
