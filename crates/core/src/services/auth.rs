//! Authentication service.
//!
//! Completes the Kakao OAuth2 code flow: exchanges the authorization code
//! for a provider token, fetches the profile, upserts the local user, and
//! mints the application access token delivered as a cookie.

use chrono::Utc;
use maru_common::{AppError, AppResult, IdGenerator, TokenCodec, config::KakaoConfig};
use maru_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;

const KAKAO_AUTHORIZE_URL: &str = "https://kauth.kakao.com/oauth/authorize";
const KAKAO_TOKEN_URL: &str = "https://kauth.kakao.com/oauth/token";
const KAKAO_PROFILE_URL: &str = "https://kapi.kakao.com/v2/user/me";

const PROVIDER: &str = "kakao";

#[derive(Debug, Deserialize)]
struct KakaoTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct KakaoUserResponse {
    id: i64,
    #[serde(default)]
    kakao_account: KakaoAccount,
}

#[derive(Debug, Default, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
    #[serde(default)]
    profile: KakaoProfile,
}

#[derive(Debug, Default, Deserialize)]
struct KakaoProfile {
    nickname: Option<String>,
    profile_image_url: Option<String>,
}

/// Authentication service for the OAuth2 login flow.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    token_codec: TokenCodec,
    http: reqwest::Client,
    kakao: KakaoConfig,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(user_repo: UserRepository, token_codec: TokenCodec, kakao: KakaoConfig) -> Self {
        Self {
            user_repo,
            token_codec,
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            kakao,
            id_gen: IdGenerator::new(),
        }
    }

    /// Token lifetime, for the cookie max-age.
    #[must_use]
    pub const fn token_ttl_secs(&self) -> i64 {
        self.token_codec.ttl_secs()
    }

    /// The Kakao authorize URL the login endpoint redirects to.
    pub fn authorize_url(&self) -> AppResult<String> {
        let mut url = url::Url::parse(KAKAO_AUTHORIZE_URL)
            .map_err(|e| AppError::Internal(format!("Bad authorize URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.kakao.client_id)
            .append_pair("redirect_uri", &self.kakao.redirect_uri)
            .append_pair("response_type", "code");
        Ok(url.into())
    }

    /// Complete a login with the authorization code from the callback.
    ///
    /// Returns the (possibly freshly created) user and a minted access token.
    pub async fn login_with_code(&self, code: &str) -> AppResult<(user::Model, String)> {
        let provider_token = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&provider_token).await?;

        let user = self.upsert_user(&profile).await?;
        let token = self.token_codec.mint(&user.id, &user.role)?;

        tracing::info!(user_id = %user.id, "Login completed");
        Ok((user, token))
    }

    /// Verify an access token and return the user id it names.
    pub fn verify_token(&self, token: &str) -> AppResult<String> {
        Ok(self.token_codec.verify(token)?.sub)
    }

    async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let mut form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("client_id", self.kakao.client_id.clone()),
            ("redirect_uri", self.kakao.redirect_uri.clone()),
            ("code", code.to_string()),
        ];
        if let Some(secret) = &self.kakao.client_secret {
            form.push(("client_secret", secret.clone()));
        }

        let response = self
            .http
            .post(KAKAO_TOKEN_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Kakao token request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Kakao token exchange returned {}",
                response.status()
            )));
        }

        let token: KakaoTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Bad Kakao token response: {e}")))?;
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, provider_token: &str) -> AppResult<KakaoUserResponse> {
        let response = self
            .http
            .get(KAKAO_PROFILE_URL)
            .bearer_auth(provider_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Kakao profile request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Kakao profile fetch returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Bad Kakao profile response: {e}")))
    }

    async fn upsert_user(&self, profile: &KakaoUserResponse) -> AppResult<user::Model> {
        let provider_user_id = profile.id.to_string();

        if let Some(existing) = self
            .user_repo
            .find_by_provider_identity(PROVIDER, &provider_user_id)
            .await?
        {
            return Ok(existing);
        }

        let username = profile
            .kakao_account
            .profile
            .nickname
            .clone()
            .unwrap_or_else(|| format!("user-{provider_user_id}"));

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            provider: Set(PROVIDER.to_string()),
            provider_user_id: Set(provider_user_id),
            username: Set(username),
            email: Set(profile.kakao_account.email.clone()),
            avatar_url: Set(profile.kakao_account.profile.profile_image_url.clone()),
            role: Set("user".to_string()),
            created_at: Set(Utc::now().into()),
        };

        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, "Registered new user from Kakao profile");
        Ok(created)
    }
}
