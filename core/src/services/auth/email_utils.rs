//! Email helpers for the authentication flows

/// Mask an email address for logging: keeps the first character of the local
/// part and the full domain.
///
/// `alice@example.com` becomes `a****@example.com`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().unwrap();
            format!("{}{}@{}", first, "*".repeat(local.chars().count() - 1), domain)
        }
        _ => "*".repeat(email.chars().count()),
    }
}

/// Validate a post-login callback target. Only same-site relative paths are
/// accepted; anything else falls back to the configured default.
pub fn is_safe_redirect(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//")
}
