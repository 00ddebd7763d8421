use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, time::Duration as CookieDuration};
use chrono::{DateTime, Duration, TimeZone, Utc};

pub const COMPLETED_COOKIE: &str = "signup_completed";
pub const TIMESTAMP_COOKIE: &str = "signup_timestamp";
pub const SOURCE_COOKIE: &str = "signup_source";
pub const TTL_DAYS: i64 = 365;

/// Remembers that a visitor already signed up, so download prompts are not
/// shown again. Not a security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignupGate {
    pub completed: bool,
    pub signed_up_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
}

impl SignupGate {
    pub fn completed(source: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            completed: true,
            signed_up_at: Some(now),
            source: Some(source.into()),
        }
    }

    pub fn from_request(req: &HttpRequest) -> Self {
        let completed = req
            .cookie(COMPLETED_COOKIE)
            .map(|c| c.value() == "true")
            .unwrap_or(false);
        let signed_up_at = req
            .cookie(TIMESTAMP_COOKIE)
            .and_then(|c| c.value().parse::<i64>().ok())
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single());
        let source = req
            .cookie(SOURCE_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|s| !s.is_empty());

        Self {
            completed,
            signed_up_at,
            source,
        }
    }

    /// True while the flag is set and the signup is younger than the TTL.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match (self.completed, self.signed_up_at) {
            (true, Some(at)) => now - at < Duration::days(TTL_DAYS),
            (true, None) => true,
            _ => false,
        }
    }

    pub fn to_cookies(&self) -> Vec<Cookie<'static>> {
        let mut cookies = vec![gate_cookie(COMPLETED_COOKIE, self.completed.to_string())];
        if let Some(at) = self.signed_up_at {
            cookies.push(gate_cookie(TIMESTAMP_COOKIE, at.timestamp_millis().to_string()));
        }
        if let Some(source) = &self.source {
            cookies.push(gate_cookie(SOURCE_COOKIE, source.clone()));
        }
        cookies
    }
}

fn gate_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .max_age(CookieDuration::days(TTL_DAYS))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn cookies_round_trip_through_a_request() {
        let now = Utc.timestamp_millis_opt(1_760_000_000_000).unwrap();
        let gate = SignupGate::completed("download-toolkit", now);

        let mut req = TestRequest::default();
        for cookie in gate.to_cookies() {
            assert_eq!(cookie.max_age(), Some(CookieDuration::days(365)));
            assert_eq!(cookie.path(), Some("/"));
            req = req.cookie(cookie);
        }

        let restored = SignupGate::from_request(&req.to_http_request());
        assert_eq!(restored, gate);
        assert!(restored.is_active(now));
    }

    #[test]
    fn gate_expires_after_a_year() {
        let then = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let gate = SignupGate::completed("footer", then);

        assert!(gate.is_active(then + Duration::days(364)));
        assert!(!gate.is_active(then + Duration::days(365)));
    }

    #[test]
    fn missing_cookies_mean_no_signup() {
        let gate = SignupGate::from_request(&TestRequest::default().to_http_request());
        assert!(!gate.completed);
        assert!(!gate.is_active(Utc::now()));
    }
}
