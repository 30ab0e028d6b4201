use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use crate::{
    config::Config,
    models::users::{AuthUser, LoginOutcome},
    Result,
};

/// Delegated login. Strategies are tried in order and the first decisive
/// outcome wins: a configured relay URL, then the identity provider's
/// password sign-in, then sign-up for addresses the provider has never seen.
/// Upstream trouble never turns into an error status; the caller always gets
/// a 200 with the failure spelled out in the body.
#[derive(Clone)]
pub struct AuthService {
    http: Client,
    login_url: String,
    identity_url: String,
    api_key: String,
}

impl AuthService {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.store_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            login_url: config.auth_login_url.clone(),
            identity_url: config.auth_identity_url.trim_end_matches('/').to_string(),
            api_key: config.auth_api_key.clone(),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        if !self.login_url.is_empty() {
            return self.login_via_relay(email, password).await;
        }
        if self.api_key.is_empty() {
            return LoginOutcome::failed("Login is not configured yet.");
        }
        self.login_via_identity_provider(email, password).await
    }

    async fn login_via_relay(&self, email: &str, password: &str) -> LoginOutcome {
        let response = self
            .http
            .post(&self.login_url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => return transport_failure(&err),
        };

        let ok = response.status().is_success();
        let data: Value = response.json().await.unwrap_or(Value::Null);

        if !ok {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Login failed.");
            return LoginOutcome::failed(message);
        }

        let token = data
            .get("token")
            .or_else(|| data.get("idToken"))
            .and_then(Value::as_str)
            .unwrap_or("");
        let user_email = data
            .get("user")
            .and_then(|user| user.get("email"))
            .and_then(Value::as_str)
            .unwrap_or(email);

        LoginOutcome::succeeded(
            token,
            None,
            AuthUser {
                email: user_email.to_string(),
                local_id: None,
            },
        )
    }

    async fn login_via_identity_provider(&self, email: &str, password: &str) -> LoginOutcome {
        let (ok, data) = match self
            .identity_call("accounts:signInWithPassword", email, password)
            .await
        {
            Ok(result) => result,
            Err(err) => return transport_failure(&err),
        };

        if ok {
            return provider_success(&data, email);
        }

        let reason = provider_error_reason(&data);

        if reason == "INVALID_LOGIN_CREDENTIALS" || reason == "EMAIL_NOT_FOUND" {
            // first-time addresses are signed up on the spot
            match self.identity_call("accounts:signUp", email, password).await {
                Ok((true, data)) => return provider_success(&data, email),
                Ok((false, data)) => {
                    if provider_error_reason(&data) == "EMAIL_EXISTS" {
                        return LoginOutcome::failed("The email or password does not match.");
                    }
                }
                Err(err) => return transport_failure(&err),
            }
        }

        if reason == "OPERATION_NOT_ALLOWED" {
            return LoginOutcome::failed(
                "Email/password sign-in is switched off for this project.",
            );
        }

        LoginOutcome::failed("The email or password does not match.")
    }

    async fn identity_call(
        &self,
        action: &str,
        email: &str,
        password: &str,
    ) -> reqwest::Result<(bool, Value)> {
        let url = format!(
            "{}/{}?key={}",
            self.identity_url,
            action,
            urlencoding::encode(&self.api_key)
        );

        let response = self
            .http
            .post(url)
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        let ok = response.status().is_success();
        let data = response.json().await.unwrap_or(Value::Null);
        Ok((ok, data))
    }
}

fn provider_error_reason(data: &Value) -> &str {
    data.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn provider_success(data: &Value, email: &str) -> LoginOutcome {
    LoginOutcome::succeeded(
        data.get("idToken").and_then(Value::as_str).unwrap_or(""),
        data.get("refreshToken").and_then(Value::as_str),
        AuthUser {
            email: data
                .get("email")
                .and_then(Value::as_str)
                .unwrap_or(email)
                .to_string(),
            local_id: data
                .get("localId")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
    )
}

fn transport_failure(err: &reqwest::Error) -> LoginOutcome {
    warn!("login upstream call failed: {:?}", err);
    if err.is_timeout() {
        LoginOutcome::failed("The login server took too long to respond.")
    } else {
        LoginOutcome::failed("Something went wrong while logging in.")
    }
}
