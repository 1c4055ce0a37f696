//! Main authentication service implementation

use std::sync::Arc;
use tracing::{error, info, warn};

use md_shared::config::rate_limit::{LimitPreset, RateLimitPurpose};
use md_shared::utils::validation::{normalize_email, validators};

use crate::domain::entities::user::User;
use crate::domain::value_objects::auth_outcome::{
    EmailVerificationOutcome, LoginSuccess, PasswordChanged, PasswordResetCompleted,
    PasswordResetRequested, RegisterSuccess, VerificationResendRequested,
};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
use crate::repositories::UserRepository;
use crate::services::rate_limit::{rate_limit_key, RateLimiter};
use crate::services::token::{SecurityTokenService, TokenPurpose};

use super::config::AuthServiceConfig;
use super::email_utils::{is_safe_redirect, mask_email};
use super::mailer::MailerTrait;
use super::password::{hash_password, verify_password};
use super::requests::{
    ChangePasswordRequest, ForgotPasswordRequest, Identity, LoginRequest, RegisterRequest,
    ResendVerificationRequest, ResetPasswordRequest, VerifyEmailRequest,
};

/// Authentication service orchestrating every credential flow.
///
/// Each flow runs the same gate order: rate check, then input validation,
/// then store access, cheapest rejection first. Attempt-guarded flows
/// (login, reset completion, password change) clear their limiter entry on
/// success; request-throttled flows keep their counters.
pub struct AuthService<U, M>
where
    U: UserRepository,
    M: MailerTrait,
{
    /// User repository for credential persistence
    user_repository: Arc<U>,
    /// Outbound email delivery
    mailer: Arc<M>,
    /// Shared process-wide rate limiter
    rate_limiter: Arc<RateLimiter>,
    /// Single-use token issuance and validation
    token_service: SecurityTokenService,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<U, M> AuthService<U, M>
where
    U: UserRepository,
    M: MailerTrait,
{
    /// Create a new authentication service
    pub fn new(
        user_repository: Arc<U>,
        mailer: Arc<M>,
        rate_limiter: Arc<RateLimiter>,
        token_service: SecurityTokenService,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            mailer,
            rate_limiter,
            token_service,
            config,
        }
    }

    /// Authenticate a user by email and password
    ///
    /// An unknown email and a wrong password produce the same failure, built
    /// by the same code path, so the two cases cannot be told apart.
    /// Account-state failures (suspended, inactive, unverified) stay
    /// distinct: the caller already supplied the correct identity.
    pub async fn login(&self, request: LoginRequest) -> DomainResult<LoginSuccess> {
        let email = normalize_email(&request.email);
        let preset = self.config.rate_limit.policy_for(RateLimitPurpose::Login);
        let key = rate_limit_key(RateLimitPurpose::Login, &email, None);

        self.ensure_allowed(&key, &preset)?;

        let user = self
            .user_repository
            .find_by_email(&email)
            .await
            .map_err(Self::store_failure)?;

        let user = match user {
            Some(user) => user,
            None => {
                info!(email = %mask_email(&email), "Login attempt for unknown email");
                return Err(self.record_failed_attempt(&key, &preset).into());
            }
        };

        if user.is_blocked {
            warn!(user_id = %user.id, "Login refused for suspended account");
            return Err(AuthError::AccountSuspended.into());
        }

        if !user.is_email_verified() {
            // No password comparison for unverified accounts; the token's
            // own expiry is the only source of truth for verification state
            return Err(AuthError::EmailNotVerified { email: user.email }.into());
        }

        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        let matches =
            verify_password(request.password, user.password_hash.clone()).await?;
        if !matches {
            info!(user_id = %user.id, "Login attempt with wrong password");
            return Err(self.record_failed_attempt(&key, &preset).into());
        }

        // Success wipes the caller's earlier failures
        self.rate_limiter.clear(&key);

        let redirect_to = request
            .callback_url
            .filter(|target| is_safe_redirect(target))
            .unwrap_or_else(|| self.config.auth.default_login_redirect.clone());

        info!(user_id = %user.id, "Login successful");

        Ok(LoginSuccess {
            user_id: user.id,
            redirect_to,
        })
    }

    /// Register a new account and send the verification email
    ///
    /// The email send is best-effort: the persisted user record is
    /// authoritative, and a provider error is logged, not surfaced.
    pub async fn register(&self, request: RegisterRequest) -> DomainResult<RegisterSuccess> {
        let ip = request.client_ip.as_deref().unwrap_or("unknown");
        let preset = self.config.rate_limit.policy_for(RateLimitPurpose::Register);
        let key = rate_limit_key(RateLimitPurpose::Register, ip, None);

        self.ensure_allowed(&key, &preset)?;
        self.rate_limiter.increment(&key, &preset);

        self.validate_registration(&request)?;

        let email = normalize_email(&request.email);

        // Both uniqueness queries run unconditionally so a collision on
        // either field produces the same work and the same response
        let email_taken = self
            .user_repository
            .exists_by_email(&email)
            .await
            .map_err(Self::store_failure)?;
        let phone_taken = self
            .user_repository
            .exists_by_phone(&request.phone_number)
            .await
            .map_err(Self::store_failure)?;

        if email_taken || phone_taken {
            info!(email = %mask_email(&email), "Registration rejected: duplicate account");
            return Err(AuthError::DuplicateAccount.into());
        }

        let password_hash =
            hash_password(request.password, self.config.bcrypt_cost()).await?;

        let issued = self.token_service.issue(TokenPurpose::EmailVerification);

        let mut user = User::new(
            email,
            request.phone_number,
            password_hash,
            request.first_name,
            request.last_name,
        );
        user.alternate_number = request.alternate_number;
        user.address = request.address;
        user.set_verification_token(issued.hash, issued.expires_at);

        // A unique-constraint race at insert time is still a duplicate; any
        // other store error stays behind the generic boundary
        let user = self.user_repository.create(user).await.map_err(|e| match e {
            DomainError::Auth(AuthError::DuplicateAccount) => e,
            other => Self::store_failure(other),
        })?;

        info!(user_id = %user.id, "User registered, verification pending");

        if let Err(e) = self
            .mailer
            .send_verification_email(&user.email, &user.full_name(), &issued.plaintext)
            .await
        {
            error!(
                user_id = %user.id,
                error = %e,
                "Verification email failed to send; user can request a resend"
            );
        }

        Ok(RegisterSuccess {
            user_id: user.id,
            message: String::from(
                "Registration successful. Please check your inbox to verify your email.",
            ),
        })
    }

    /// Consume an email verification token
    ///
    /// The caller is a browser following a link, so every failure maps to a
    /// redirect reason code via [`DomainError::redirect_reason`].
    pub async fn verify_email(
        &self,
        request: VerifyEmailRequest,
    ) -> DomainResult<EmailVerificationOutcome> {
        let preset = self
            .config
            .rate_limit
            .policy_for(RateLimitPurpose::VerifyEmail);
        let key = rate_limit_key(RateLimitPurpose::VerifyEmail, &request.client_ip, None);

        self.ensure_allowed(&key, &preset)?;
        self.rate_limiter.increment(&key, &preset);

        let token = match request.token.as_deref() {
            None | Some("") => return Err(TokenError::Missing.into()),
            Some(token) => token,
        };

        // Shape check before any store access
        if !SecurityTokenService::validate_format(token) {
            return Err(TokenError::Malformed.into());
        }

        let token_hash = SecurityTokenService::hash(token);
        let user = self
            .user_repository
            .find_by_verification_token_hash(&token_hash)
            .await
            .map_err(Self::store_failure)?
            .ok_or(TokenError::InvalidOrUsed)?;

        if user.is_blocked {
            warn!(user_id = %user.id, "Verification refused for suspended account");
            return Err(AuthError::AccountSuspended.into());
        }

        if self.verification_token_expired(&user) {
            // A dead token must not be retryable: clear it before reporting
            let mut expired_user = user;
            let email = expired_user.email.clone();
            expired_user.clear_verification_token();
            self.user_repository
                .update(expired_user)
                .await
                .map_err(Self::store_failure)?;
            info!(email = %mask_email(&email), "Expired verification token cleared");
            return Err(TokenError::Expired { email: Some(email) }.into());
        }

        if user.is_email_verified() {
            // Idempotent: report the distinction for messaging only
            let mut verified_user = user;
            let email = verified_user.email.clone();
            verified_user.clear_verification_token();
            self.user_repository
                .update(verified_user)
                .await
                .map_err(Self::store_failure)?;
            return Ok(EmailVerificationOutcome::AlreadyVerified { email });
        }

        let mut user = user;
        user.mark_email_verified();
        let user = self
            .user_repository
            .update(user)
            .await
            .map_err(Self::store_failure)?;

        info!(user_id = %user.id, "Email verified, account activated");

        Ok(EmailVerificationOutcome::Verified { email: user.email })
    }

    /// Request a password reset link
    ///
    /// The caller-visible response is identical whether or not the account
    /// exists or is blocked; only the internal log distinguishes the cases.
    pub async fn request_password_reset(
        &self,
        request: ForgotPasswordRequest,
    ) -> DomainResult<PasswordResetRequested> {
        let email = normalize_email(&request.email);
        let preset = self
            .config
            .rate_limit
            .policy_for(RateLimitPurpose::ForgotPassword);
        let key = rate_limit_key(RateLimitPurpose::ForgotPassword, &email, None);

        self.ensure_allowed(&key, &preset)?;
        self.rate_limiter.increment(&key, &preset);

        let user = self
            .user_repository
            .find_by_email(&email)
            .await
            .map_err(Self::store_failure)?;

        let mut user = match user {
            Some(user) if user.is_blocked => {
                warn!(
                    user_id = %user.id,
                    "Password reset requested for suspended account; not sending"
                );
                return Ok(PasswordResetRequested::uniform());
            }
            Some(user) => user,
            None => {
                info!(email = %mask_email(&email), "Password reset requested for unknown email");
                return Ok(PasswordResetRequested::uniform());
            }
        };

        let issued = self.token_service.issue(TokenPurpose::PasswordReset);
        user.set_reset_token(issued.hash, issued.expires_at);
        let user = self
            .user_repository
            .update(user)
            .await
            .map_err(Self::store_failure)?;

        if let Err(e) = self
            .mailer
            .send_password_reset_email(&user.email, &user.full_name(), &issued.plaintext)
            .await
        {
            // A persisted but undelivered token is a dead token: roll it back
            error!(user_id = %user.id, error = %e, "Reset email failed, rolling back token");
            let mut rollback = user;
            rollback.clear_reset_token();
            self.user_repository
                .update(rollback)
                .await
                .map_err(Self::store_failure)?;
            return Err(AuthError::EmailDeliveryFailure.into());
        }

        info!(user_id = %user.id, "Password reset link sent");

        Ok(PasswordResetRequested::uniform())
    }

    /// Complete a password reset with a token from the email link
    pub async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> DomainResult<PasswordResetCompleted> {
        let preset = self
            .config
            .rate_limit
            .policy_for(RateLimitPurpose::ResetPassword);
        let key = rate_limit_key(RateLimitPurpose::ResetPassword, &request.client_ip, None);

        self.ensure_allowed(&key, &preset)?;

        self.validate_password_length(&request.new_password)?;

        if request.token.is_empty() {
            return Err(TokenError::Missing.into());
        }
        if !SecurityTokenService::validate_format(&request.token) {
            return Err(TokenError::Malformed.into());
        }

        let token_hash = SecurityTokenService::hash(&request.token);
        let user = match self
            .user_repository
            .find_by_reset_token_hash(&token_hash)
            .await
            .map_err(Self::store_failure)?
        {
            Some(user) => user,
            None => {
                self.rate_limiter.increment(&key, &preset);
                return Err(TokenError::InvalidOrUsed.into());
            }
        };

        if self.reset_token_expired(&user) {
            let mut expired_user = user;
            let email = expired_user.email.clone();
            expired_user.clear_reset_token();
            self.user_repository
                .update(expired_user)
                .await
                .map_err(Self::store_failure)?;
            self.rate_limiter.increment(&key, &preset);
            info!(email = %mask_email(&email), "Expired reset token cleared");
            return Err(TokenError::Expired { email: Some(email) }.into());
        }

        if user.is_blocked {
            warn!(user_id = %user.id, "Password reset refused for suspended account");
            return Err(AuthError::AccountSuspended.into());
        }
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        // Reuse check compares against the stored hash; the new password
        // only ever exists in plaintext on this side
        if verify_password(request.new_password.clone(), user.password_hash.clone()).await? {
            return Err(AuthError::PasswordReuse.into());
        }

        let password_hash =
            hash_password(request.new_password, self.config.bcrypt_cost()).await?;

        // One store-level unit of work: new hash in, token fields out
        self.user_repository
            .update_password_and_clear_reset_token(user.id, &password_hash)
            .await
            .map_err(Self::store_failure)?;

        self.rate_limiter.clear(&key);

        info!(user_id = %user.id, "Password reset completed");

        Ok(PasswordResetCompleted {
            user_id: user.id,
            message: String::from("Your password has been reset. Please log in."),
        })
    }

    /// Change the password of the authenticated user
    ///
    /// Identity comes from the session, never from the payload. The rate
    /// limit guards against a stolen session brute-forcing the current
    /// password.
    pub async fn change_password(
        &self,
        identity: &Identity,
        request: ChangePasswordRequest,
    ) -> DomainResult<PasswordChanged> {
        let preset = self
            .config
            .rate_limit
            .policy_for(RateLimitPurpose::ChangePassword);
        let key = rate_limit_key(
            RateLimitPurpose::ChangePassword,
            &identity.user_id.to_string(),
            None,
        );

        self.ensure_allowed(&key, &preset)?;

        let user = self
            .user_repository
            .find_by_id(identity.user_id)
            .await
            .map_err(Self::store_failure)?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_blocked {
            return Err(AuthError::AccountSuspended.into());
        }
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        let current_ok =
            verify_password(request.current_password, user.password_hash.clone()).await?;
        if !current_ok {
            warn!(user_id = %user.id, "Password change with wrong current password");
            return Err(self
                .record_failed_change_attempt(&key, &preset)
                .into());
        }

        self.validate_password_length(&request.new_password)?;
        if request.new_password != request.confirm_password {
            return Err(AuthError::PasswordMismatch.into());
        }
        if verify_password(request.new_password.clone(), user.password_hash.clone()).await? {
            return Err(AuthError::PasswordReuse.into());
        }

        let password_hash =
            hash_password(request.new_password, self.config.bcrypt_cost()).await?;

        let mut user = user;
        user.set_password_hash(password_hash);
        let user = self
            .user_repository
            .update(user)
            .await
            .map_err(Self::store_failure)?;

        self.rate_limiter.clear(&key);

        info!(user_id = %user.id, "Password changed, session must be re-established");

        Ok(PasswordChanged {
            user_id: user.id,
            reauthentication_required: true,
            message: String::from("Password changed. Please log in again."),
        })
    }

    /// Re-issue and re-send a verification email
    ///
    /// Uniform response regardless of whether the account exists, is
    /// blocked, or is already verified.
    pub async fn resend_verification_email(
        &self,
        request: ResendVerificationRequest,
    ) -> DomainResult<VerificationResendRequested> {
        let email = normalize_email(&request.email);
        let preset = self
            .config
            .rate_limit
            .policy_for(RateLimitPurpose::ResendVerification);
        let key = rate_limit_key(RateLimitPurpose::ResendVerification, &email, None);

        self.ensure_allowed(&key, &preset)?;
        self.rate_limiter.increment(&key, &preset);

        let user = self
            .user_repository
            .find_by_email(&email)
            .await
            .map_err(Self::store_failure)?;

        let mut user = match user {
            Some(user) if user.is_blocked || user.is_email_verified() => {
                info!(
                    user_id = %user.id,
                    "Verification resend skipped (blocked or already verified)"
                );
                return Ok(VerificationResendRequested::uniform());
            }
            Some(user) => user,
            None => {
                info!(email = %mask_email(&email), "Verification resend for unknown email");
                return Ok(VerificationResendRequested::uniform());
            }
        };

        let issued = self.token_service.issue(TokenPurpose::EmailVerification);
        user.set_verification_token(issued.hash, issued.expires_at);
        let user = self
            .user_repository
            .update(user)
            .await
            .map_err(Self::store_failure)?;

        if let Err(e) = self
            .mailer
            .send_verification_email(&user.email, &user.full_name(), &issued.plaintext)
            .await
        {
            error!(user_id = %user.id, error = %e, "Resend failed, rolling back token");
            let mut rollback = user;
            rollback.clear_verification_token();
            self.user_repository
                .update(rollback)
                .await
                .map_err(Self::store_failure)?;
            return Err(AuthError::EmailDeliveryFailure.into());
        }

        Ok(VerificationResendRequested::uniform())
    }

    // Gate helpers

    /// Reject up front when the key is rate limited or locked out
    fn ensure_allowed(&self, key: &str, preset: &LimitPreset) -> Result<(), AuthError> {
        if !self.config.rate_limit.enabled {
            return Ok(());
        }
        let decision = self.rate_limiter.check(key, preset);
        if decision.allowed {
            return Ok(());
        }
        let retry_after_seconds = decision.retry_after_seconds.unwrap_or(1);
        warn!(key = key, retry_after_seconds, "Request rate limited");
        if decision.locked {
            Err(AuthError::LockedOut {
                retry_after_seconds,
            })
        } else {
            Err(AuthError::RateLimited {
                retry_after_seconds,
            })
        }
    }

    /// Record a failed credential attempt and build the uniform failure.
    /// Used identically for unknown-email and wrong-password so the two are
    /// indistinguishable.
    fn record_failed_attempt(&self, key: &str, preset: &LimitPreset) -> AuthError {
        self.rate_limiter.increment(key, preset);
        let decision = self.rate_limiter.check(key, preset);
        if decision.locked {
            AuthError::LockedOut {
                retry_after_seconds: decision.retry_after_seconds.unwrap_or(1),
            }
        } else {
            AuthError::InvalidCredentials {
                remaining_attempts: Some(decision.remaining),
            }
        }
    }

    /// Same escalation for the authenticated change-password flow
    fn record_failed_change_attempt(&self, key: &str, preset: &LimitPreset) -> AuthError {
        self.rate_limiter.increment(key, preset);
        let decision = self.rate_limiter.check(key, preset);
        if decision.locked {
            AuthError::LockedOut {
                retry_after_seconds: decision.retry_after_seconds.unwrap_or(1),
            }
        } else {
            AuthError::InvalidCurrentPassword {
                remaining_attempts: Some(decision.remaining),
            }
        }
    }

    // Validation helpers

    fn validate_registration(&self, request: &RegisterRequest) -> Result<(), DomainError> {
        if request.first_name.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "first_name".to_string(),
            }
            .into());
        }
        if request.last_name.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "last_name".to_string(),
            }
            .into());
        }
        if !validators::is_valid_email(request.email.trim()) {
            return Err(ValidationError::InvalidEmail.into());
        }
        if !validators::is_valid_phone(&request.phone_number) {
            return Err(ValidationError::InvalidPhone.into());
        }
        self.validate_password_length(&request.password)
    }

    fn validate_password_length(&self, password: &str) -> Result<(), DomainError> {
        let min = self.config.password_min_length();
        let max = self.config.password_max_length();
        if !validators::length_between(password, min, max) {
            return Err(ValidationError::InvalidLength {
                field: "password".to_string(),
                min,
                max,
            }
            .into());
        }
        Ok(())
    }

    fn verification_token_expired(&self, user: &User) -> bool {
        match user.verification_token_expires_at {
            Some(expires_at) => SecurityTokenService::is_expired(expires_at, chrono::Utc::now()),
            // A token hash with no expiry is unusable
            None => true,
        }
    }

    fn reset_token_expired(&self, user: &User) -> bool {
        match user.password_reset_token_expires_at {
            Some(expires_at) => SecurityTokenService::is_expired(expires_at, chrono::Utc::now()),
            None => true,
        }
    }

    /// Store failures are logged in full and surfaced as a generic internal
    /// error; raw store errors never cross the flow boundary
    fn store_failure(e: DomainError) -> DomainError {
        error!(error = %e, "Credential store operation failed");
        DomainError::Internal {
            message: String::from("Something went wrong. Please try again later."),
        }
    }
}
