use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Login reply. Providers have been seen answering with either `token` or
/// `access_token`, so both are accepted.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub access_token: Option<String>,
    pub expires_in: Option<Value>,
}

impl LoginResponse {
    /// Fallback order: `token`, then `access_token`. Empty values are skipped.
    pub fn bearer_token(&self) -> Option<&str> {
        [self.token.as_deref(), self.access_token.as_deref()]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
    }

    /// Token lifetime in whole seconds, when the provider states one.
    pub fn lifetime_secs(&self) -> Option<i64> {
        match self.expires_in.as_ref()? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> LoginResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn prefers_token_over_access_token() {
        let res = parse(r#"{"token":"a","access_token":"b"}"#);
        assert_eq!(res.bearer_token(), Some("a"));
    }

    #[test]
    fn falls_back_to_access_token() {
        let res = parse(r#"{"access_token":"b","expires_in":3600}"#);
        assert_eq!(res.bearer_token(), Some("b"));
        assert_eq!(res.lifetime_secs(), Some(3600));
    }

    #[test]
    fn lifetime_tolerates_strings_and_floats() {
        assert_eq!(parse(r#"{"token":"a","expires_in":"900"}"#).lifetime_secs(), Some(900));
        assert_eq!(parse(r#"{"token":"a","expires_in":60.5}"#).lifetime_secs(), Some(60));
        assert_eq!(parse(r#"{"token":"a","expires_in":true}"#).lifetime_secs(), None);
        assert_eq!(parse(r#"{"token":"a"}"#).lifetime_secs(), None);
    }

    #[test]
    fn lifetime_rejects_out_of_range_numbers() {
        assert_eq!(parse(r#"{"token":"a","expires_in":1e300}"#).lifetime_secs(), None);
        assert_eq!(parse(r#"{"token":"a","expires_in":-1e300}"#).lifetime_secs(), None);
        assert_eq!(
            parse(r#"{"token":"a","expires_in":18446744073709551615}"#).lifetime_secs(),
            None
        );
        assert_eq!(
            parse(r#"{"token":"a","expires_in":"-9223372036854775808"}"#).lifetime_secs(),
            Some(i64::MIN)
        );
    }

    #[test]
    fn skips_empty_token() {
        let res = parse(r#"{"token":"","access_token":"b"}"#);
        assert_eq!(res.bearer_token(), Some("b"));
    }

    #[test]
    fn no_token_at_all() {
        assert_eq!(parse(r#"{"user":"x"}"#).bearer_token(), None);
    }
}
