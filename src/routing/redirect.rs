//! Static redirects.

use std::collections::HashMap;

use axum::http::{HeaderValue, StatusCode};

use crate::config::validation::{redirect_status, DEFAULT_REDIRECT_CODE};
use crate::config::{ConfigError, HttpConfig, RedirectConfig, ValidationError};
use crate::routing::normalize_key;

/// Marks a location read from an environment variable.
pub const ENV_PREFIX: &str = "env.";

/// Route key → redirect.
pub type RedirectMap = HashMap<String, Redirect>;

/// A resolved redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub code: StatusCode,
}

impl Redirect {
    /// Resolve a configured redirect; `env.NAME` locations are read through `lookup`.
    pub fn from_config<F>(path: &str, config: &RedirectConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let code = redirect_status(config.code).ok_or_else(|| {
            ConfigError::Validation(vec![ValidationError::RedirectCode {
                path: path.to_string(),
                code: config.code.unwrap_or(DEFAULT_REDIRECT_CODE),
            }])
        })?;

        let location = match config.location.strip_prefix(ENV_PREFIX) {
            Some(name) => lookup(name).ok_or_else(|| ConfigError::UnsetRedirectVariable {
                path: path.to_string(),
                name: name.to_string(),
            })?,
            None => config.location.clone(),
        };
        // The location becomes a `Location` header on every hit.
        if location.is_empty() || HeaderValue::try_from(location.as_str()).is_err() {
            return Err(ConfigError::Validation(vec![ValidationError::RedirectLocation {
                path: path.to_string(),
            }]));
        }

        Ok(Self { location, code })
    }
}

/// Resolve every configured redirect once.
pub fn build_redirects<F>(http: &HttpConfig, lookup: F) -> Result<RedirectMap, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    http.redirects
        .iter()
        .map(|(path, config)| {
            let redirect = Redirect::from_config(path, config, &lookup)?;
            Ok((normalize_key(path).to_string(), redirect))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(location: &str, code: Option<u16>) -> RedirectConfig {
        RedirectConfig {
            location: location.into(),
            code,
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_code_is_301() {
        let r = Redirect::from_config("old", &redirect("/new", None), no_env).unwrap();
        assert_eq!(r.code, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(r.location, "/new");
    }

    #[test]
    fn test_env_location() {
        let lookup = |name: &str| (name == "SHOP_URL").then(|| "https://shop.example".to_string());
        let r = Redirect::from_config("shop", &redirect("env.SHOP_URL", Some(307)), lookup).unwrap();
        assert_eq!(r.location, "https://shop.example");
        assert_eq!(r.code, StatusCode::TEMPORARY_REDIRECT);

        let err = Redirect::from_config("shop", &redirect("env.MISSING", None), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::UnsetRedirectVariable { .. }));
    }

    #[test]
    fn test_location_must_be_a_header_value() {
        let lookup = |_: &str| Some("https://shop.example/\r\nSet-Cookie: a=b".to_string());
        let err = Redirect::from_config("shop", &redirect("env.SHOP_URL", None), lookup).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref errors)
                if errors == &[ValidationError::RedirectLocation { path: "shop".into() }]
        ));

        let empty = |_: &str| Some(String::new());
        let err = Redirect::from_config("shop", &redirect("env.SHOP_URL", None), empty).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_invalid_code() {
        let err = Redirect::from_config("old", &redirect("/new", Some(404)), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_build_normalizes_keys() {
        let mut http = HttpConfig::default();
        http.redirects.insert("/old-page".into(), redirect("/new-page", Some(302)));
        let redirects = build_redirects(&http, no_env).unwrap();
        assert_eq!(
            redirects.get("old-page"),
            Some(&Redirect {
                location: "/new-page".into(),
                code: StatusCode::FOUND,
            })
        );
    }
}
