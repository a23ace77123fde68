//! User, role, and password reset token models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use mobigear_core::{Email, ResetTokenId, RoleName, UserId};

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<RoleName>,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    /// Background brightness preference in percent (50-100).
    pub theme_brightness: i32,
    pub is_active: bool,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(RoleName::Admin)
    }

    /// Full name when set, username otherwise.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_owned()
        }
    }
}

/// A one-time password reset token.
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: ResetTokenId,
    pub user_id: UserId,
    pub token: String,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Whether the token has passed its expiry time.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            username: "user1".to_owned(),
            email: Email::parse("user1@example.com").expect("valid email"),
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            avatar_url: None,
            role: Some(RoleName::User),
            address: None,
            latitude: None,
            longitude: None,
            theme_brightness: 100,
            is_active: true,
            is_locked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_admin() {
        let mut user = sample_user();
        assert!(!user.is_admin());
        user.role = Some(RoleName::Admin);
        assert!(user.is_admin());
        user.role = None;
        assert!(!user.is_admin());
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = sample_user();
        assert_eq!(user.display_name(), "user1");
        user.first_name = "Minh".to_owned();
        user.last_name = "Nguyen".to_owned();
        assert_eq!(user.display_name(), "Minh Nguyen");
    }

    #[test]
    fn test_reset_token_expiry() {
        let now = Utc::now();
        let token = PasswordResetToken {
            id: ResetTokenId::new(1),
            user_id: UserId::new(1),
            token: "abc".to_owned(),
            is_used: false,
            expires_at: now + Duration::hours(1),
            created_at: now,
        };
        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::hours(2)));
    }
}
