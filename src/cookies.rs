use std::time::Duration;
use tower_cookies::cookie::{time, SameSite};
use tower_cookies::{Cookie, Cookies};

/// The name of the cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "sid";

/// Builds the session cookie. Its value is the bare session identifier.
///
/// The cookie is `HttpOnly`, scoped to `/` and lives exactly as long as the
/// session it points to.
pub fn session_cookie(session_id: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id);

    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::seconds(max_age.as_secs() as i64));
    cookie.set_path("/");

    cookie
}

/// Builds a cookie that makes the client drop `sid`.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");

    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.make_removal();

    cookie
}

/// Adds the session cookie to the response.
pub fn issue_session_cookie(cookies: &Cookies, session_id: String, max_age: Duration, secure: bool) {
    cookies.add(session_cookie(session_id, max_age, secure));
}

/// Reads the session identifier from a request.
pub fn read_session_id(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Tells the client to drop its session cookie, whether or not it sent one.
pub fn clear_session_cookie(cookies: &Cookies, secure: bool) {
    cookies.add(removal_cookie(secure));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), Duration::from_secs(3600), false);

        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_secure_flag_follows_config() {
        let cookie = session_cookie("abc".to_string(), Duration::from_secs(3600), true);
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = removal_cookie(false);

        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
    }
}
