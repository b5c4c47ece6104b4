//! Session cookies
//!
//! All three cookies share the same attributes: `HttpOnly`, `SameSite=Lax`,
//! `Path=/`, and `Secure` when the gateway runs in production.

use axum_extra::extract::cookie::{Cookie, SameSite};
use lotline_shared::StoreId;
use time::Duration;

pub const ACCESS_COOKIE_NAME: &str = "lotline_access";
pub const REFRESH_COOKIE_NAME: &str = "lotline_refresh";
pub const SUPPORT_COOKIE_NAME: &str = "lotline_support_store";

pub const ACCESS_TTL: Duration = Duration::minutes(15);
pub const REFRESH_TTL: Duration = Duration::days(30);
pub const SUPPORT_TTL: Duration = Duration::days(7);

fn session_cookie(name: &'static str, value: String, ttl: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(ttl)
        .build()
}

fn removal_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Access credential cookie (15 minutes)
pub fn access_cookie(token: &str, secure: bool) -> Cookie<'static> {
    session_cookie(ACCESS_COOKIE_NAME, token.to_string(), ACCESS_TTL, secure)
}

/// Refresh credential cookie (30 days)
pub fn refresh_cookie(token: &str, secure: bool) -> Cookie<'static> {
    session_cookie(REFRESH_COOKIE_NAME, token.to_string(), REFRESH_TTL, secure)
}

/// Support-mode selector cookie (7 days)
pub fn support_cookie(store_id: StoreId, secure: bool) -> Cookie<'static> {
    session_cookie(SUPPORT_COOKIE_NAME, store_id.to_string(), SUPPORT_TTL, secure)
}

pub fn clear_support_cookie(secure: bool) -> Cookie<'static> {
    removal_cookie(SUPPORT_COOKIE_NAME, secure)
}

/// Removal cookies for logout. All three go together.
pub fn clear_session_cookies(secure: bool) -> [Cookie<'static>; 3] {
    [
        removal_cookie(ACCESS_COOKIE_NAME, secure),
        removal_cookie(REFRESH_COOKIE_NAME, secure),
        removal_cookie(SUPPORT_COOKIE_NAME, secure),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_access_cookie_attributes() {
        let cookie = access_cookie("tok", true);
        assert_eq!(cookie.name(), ACCESS_COOKIE_NAME);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::minutes(15)));
    }

    #[test]
    fn test_ttls() {
        assert_eq!(refresh_cookie("r", false).max_age(), Some(Duration::days(30)));
        let store = StoreId(Uuid::new_v4());
        let support = support_cookie(store, false);
        assert_eq!(support.max_age(), Some(Duration::days(7)));
        assert_eq!(support.value(), store.to_string());
        assert_eq!(support.secure(), Some(false));
    }

    #[test]
    fn test_logout_clears_all_three() {
        let names: Vec<_> = clear_session_cookies(false)
            .iter()
            .map(|c| {
                assert_eq!(c.max_age(), Some(Duration::ZERO));
                assert_eq!(c.path(), Some("/"));
                c.name().to_string()
            })
            .collect();
        assert_eq!(
            names,
            vec![ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, SUPPORT_COOKIE_NAME]
        );
    }
}
