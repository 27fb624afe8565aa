//! OAuth authentication module for Twitter/X and OpenAI API integration.
//!
//! This module implements the one-legged OAuth 1.0a HMAC-SHA1 flow used to
//! sign requests to the Twitter/X posting endpoint with a pre-provisioned
//! access token, plus the Bearer header used for the OpenAI API.
//!
//! The signing steps are exposed individually (`parameter_string`,
//! `signature_base_string`, `signing_key`, `hmac_sha1_base64`) so that each
//! one can be checked against known values.

use base64::Engine;
use hmac::{Hmac, Mac};
use log::debug;
use sha1::Sha1;
use std::fmt;

use crate::error::AppError;

/// The only signature method this signer produces.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// The OAuth protocol version sent with every request.
pub const OAUTH_VERSION: &str = "1.0";

/// Number of random bytes in a nonce (hex-encoded to twice as many characters).
const NONCE_BYTES: usize = 16;

type HmacSha1 = Hmac<Sha1>;

/// The four secrets needed to sign a request on behalf of a single account.
///
/// Instances can only be built through [`OAuthCredentials::new`], which
/// rejects blank values, so a signature is never attempted with a missing
/// secret. The `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    consumer_key: String,
    consumer_secret: String,
    access_token: String,
    access_token_secret: String,
}

impl OAuthCredentials {
    /// Validates and bundles the four OAuth 1.0a secrets.
    ///
    /// # Returns
    ///
    /// - `Ok(OAuthCredentials)`: If every value is non-blank
    /// - `Err(AppError::Configuration)`: Naming the first blank value (for the server log only)
    pub fn new(
        consumer_key: &str,
        consumer_secret: &str,
        access_token: &str,
        access_token_secret: &str,
    ) -> Result<Self, AppError> {
        let checks = [
            ("xapi_consumer_key", consumer_key),
            ("xapi_consumer_secret", consumer_secret),
            ("xapi_access_token", access_token),
            ("xapi_access_token_secret", access_token_secret),
        ];
        for (name, value) in checks {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(name));
            }
        }

        Ok(OAuthCredentials {
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            access_token: access_token.to_string(),
            access_token_secret: access_token_secret.to_string(),
        })
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &"[REDACTED]")
            .field("consumer_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .finish()
    }
}

/// Percent-encodes a string per RFC 3986.
///
/// Every byte of the UTF-8 representation is encoded as `%XX` (uppercase hex)
/// except the unreserved characters `A-Z a-z 0-9 - . _ ~`.
///
/// # Example
///
/// ```rust
/// use postcraft::oauth::percent_encode;
///
/// assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
/// assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
/// ```
pub fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Generates a fresh nonce from the operating system's CSPRNG.
///
/// # Returns
///
/// - `Ok(String)`: 32 lowercase hex characters
/// - `Err(AppError::Internal)`: If the OS random source is unavailable
pub fn generate_nonce() -> Result<String, AppError> {
    let mut bytes = [0u8; NONCE_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| AppError::Internal(format!("Failed to generate random nonce: {}", e)))?;
    Ok(hex::encode(bytes))
}

/// Current Unix time in whole seconds.
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Reduces an endpoint URL to the form used in the base string.
///
/// The scheme and host are lowercased, a default port is dropped, and any
/// query string or fragment is removed.
pub fn normalize_url(endpoint: &str) -> Result<String, AppError> {
    let mut url = url::Url::parse(endpoint)
        .map_err(|e| AppError::Internal(format!("Invalid endpoint URL '{}': {}", endpoint, e)))?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

/// Builds the normalized parameter string.
///
/// Keys and values are percent-encoded, pairs are sorted by encoded key
/// (then encoded value) and joined as `key=value` with `&`.
pub fn parameter_string(params: &[(&str, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds the signature base string: `METHOD&enc(url)&enc(parameter_string)`.
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, String)]) -> String {
    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&parameter_string(params))
    )
}

/// Builds the HMAC key: `enc(consumer_secret)&enc(access_token_secret)`.
pub fn signing_key(consumer_secret: &str, access_token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(access_token_secret)
    )
}

/// Computes HMAC-SHA1 over `data` and returns the base64-encoded digest.
pub fn hmac_sha1_base64(key: &str, data: &str) -> Result<String, AppError> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| AppError::Internal(format!("HMAC-SHA1 key setup failed: {}", e)))?;
    mac.update(data.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Signs requests for a single fixed account.
#[derive(Debug)]
pub struct OAuthSigner<'a> {
    credentials: &'a OAuthCredentials,
}

impl<'a> OAuthSigner<'a> {
    pub fn new(credentials: &'a OAuthCredentials) -> Self {
        OAuthSigner { credentials }
    }

    /// The six protocol parameters covered by the signature.
    ///
    /// Request body parameters are never included: the posting endpoint takes
    /// a JSON body, which is not part of the base string.
    pub fn oauth_params(&self, timestamp: i64, nonce: &str) -> Vec<(&'static str, String)> {
        vec![
            ("oauth_consumer_key", self.credentials.consumer_key.clone()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", timestamp.to_string()),
            ("oauth_token", self.credentials.access_token.clone()),
            ("oauth_version", OAUTH_VERSION.to_string()),
        ]
    }

    /// Computes `oauth_signature` for the given method, endpoint, timestamp and nonce.
    pub fn signature(
        &self,
        method: &str,
        endpoint: &str,
        timestamp: i64,
        nonce: &str,
    ) -> Result<String, AppError> {
        let url = normalize_url(endpoint)?;
        let params = self.oauth_params(timestamp, nonce);
        let base_string = signature_base_string(method, &url, &params);
        let key = signing_key(
            &self.credentials.consumer_secret,
            &self.credentials.access_token_secret,
        );
        hmac_sha1_base64(&key, &base_string)
    }

    /// Builds the `Authorization` header value with a fresh timestamp and nonce.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: `OAuth oauth_consumer_key="...", ...`
    /// - `Err(AppError::Internal)`: If the nonce or HMAC could not be produced
    pub fn sign(&self, method: &str, endpoint: &str) -> Result<String, AppError> {
        let nonce = generate_nonce()?;
        self.sign_with(method, endpoint, current_timestamp(), &nonce)
    }

    /// Deterministic form of [`OAuthSigner::sign`].
    ///
    /// Header entries are emitted in ascending key order, each value
    /// individually percent-encoded.
    pub fn sign_with(
        &self,
        method: &str,
        endpoint: &str,
        timestamp: i64,
        nonce: &str,
    ) -> Result<String, AppError> {
        let signature = self.signature(method, endpoint, timestamp, nonce)?;

        let mut header_params = self.oauth_params(timestamp, nonce);
        header_params.push(("oauth_signature", signature));
        header_params.sort_by(|a, b| a.0.cmp(b.0));

        let header = header_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        debug!(
            "Built OAuth 1.0a header for {} {} (timestamp {})",
            method, endpoint, timestamp
        );
        Ok(format!("OAuth {}", header))
    }
}

/// Builds the Authorization header for Bearer Token authentication.
///
/// Used for the OpenAI chat-completion API.
///
/// # Example
///
/// ```rust
/// use postcraft::build_bearer_auth_header;
///
/// let header = build_bearer_auth_header("your_api_key");
/// assert_eq!(header, "Bearer your_api_key");
/// ```
pub fn build_bearer_auth_header(bearer_token: &str) -> String {
    format!("Bearer {}", bearer_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://api.x.com/2/tweets";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: i64 = 1318622958;

    fn test_credentials() -> OAuthCredentials {
        OAuthCredentials::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        )
        .unwrap()
    }

    #[test]
    fn test_percent_encode_reserved_characters() {
        let encoded = [
            ("!", "%21"),
            ("*", "%2A"),
            ("'", "%27"),
            ("(", "%28"),
            (")", "%29"),
            (";", "%3B"),
            (":", "%3A"),
            ("@", "%40"),
            ("&", "%26"),
            ("=", "%3D"),
            ("+", "%2B"),
            ("$", "%24"),
            (",", "%2C"),
            ("/", "%2F"),
            ("?", "%3F"),
            ("#", "%23"),
            ("[", "%5B"),
            ("]", "%5D"),
            (" ", "%20"),
            ("%", "%25"),
        ];
        for (input, expected) in encoded {
            assert_eq!(percent_encode(input), expected, "encoding {:?}", input);
        }
    }

    #[test]
    fn test_percent_encode_leaves_unreserved_characters() {
        let unreserved = "ABCXYZabcxyz0189-._~";
        assert_eq!(percent_encode(unreserved), unreserved);
    }

    #[test]
    fn test_percent_encode_utf8() {
        assert_eq!(percent_encode("☃"), "%E2%98%83");
        assert_eq!(percent_encode("é"), "%C3%A9");
    }

    #[test]
    fn test_parameter_string_is_sorted_and_encoded() {
        let params = vec![
            ("b", "2 3".to_string()),
            ("a", "x!y".to_string()),
            ("a b", "z".to_string()),
        ];
        assert_eq!(parameter_string(&params), "a=x%21y&a%20b=z&b=2%203");
    }

    #[test]
    fn test_signature_base_string_known_vector() {
        let credentials = test_credentials();
        let signer = OAuthSigner::new(&credentials);
        let params = signer.oauth_params(TIMESTAMP, NONCE);

        let base = signature_base_string("post", ENDPOINT, &params);
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.x.com%2F2%2Ftweets&oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26oauth_version%3D1.0"
        );
    }

    #[test]
    fn test_oauth_params_exclude_signature() {
        let credentials = test_credentials();
        let signer = OAuthSigner::new(&credentials);
        let params = signer.oauth_params(TIMESTAMP, NONCE);

        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "oauth_consumer_key",
                "oauth_nonce",
                "oauth_signature_method",
                "oauth_timestamp",
                "oauth_token",
                "oauth_version",
            ]
        );
    }

    #[test]
    fn test_signing_key_encodes_both_secrets() {
        assert_eq!(signing_key("c s!", "t*s'"), "c%20s%21&t%2As%27");
    }

    #[test]
    fn test_hmac_sha1_base64_known_digest() {
        let digest =
            hmac_sha1_base64("key", "The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(digest, "3nybhbi3iqa8ino29wqQcBydtNk=");
    }

    #[test]
    fn test_signature_known_vector() {
        let credentials = test_credentials();
        let signer = OAuthSigner::new(&credentials);
        let signature = signer
            .signature("POST", ENDPOINT, TIMESTAMP, NONCE)
            .unwrap();
        assert_eq!(signature, "lr+tV/DKclEvXKVjG6tgaSSLV0k=");
    }

    #[test]
    fn test_sign_with_is_deterministic() {
        let credentials = test_credentials();
        let signer = OAuthSigner::new(&credentials);

        let first = signer.sign_with("POST", ENDPOINT, TIMESTAMP, NONCE).unwrap();
        let second = signer.sign_with("POST", ENDPOINT, TIMESTAMP, NONCE).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            "OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", oauth_nonce=\"kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg\", oauth_signature=\"lr%2BtV%2FDKclEvXKVjG6tgaSSLV0k%3D\", oauth_signature_method=\"HMAC-SHA1\", oauth_timestamp=\"1318622958\", oauth_token=\"370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb\", oauth_version=\"1.0\""
        );
    }

    #[test]
    fn test_signature_ignores_query_string() {
        let credentials = test_credentials();
        let signer = OAuthSigner::new(&credentials);

        let plain = signer.signature("POST", ENDPOINT, TIMESTAMP, NONCE).unwrap();
        let with_query = signer
            .signature("POST", "https://API.x.com:443/2/tweets?x=1#frag", TIMESTAMP, NONCE)
            .unwrap();
        assert_eq!(plain, with_query);
    }

    #[test]
    fn test_signature_changes_with_nonce() {
        let credentials = test_credentials();
        let signer = OAuthSigner::new(&credentials);

        let a = signer.signature("POST", ENDPOINT, TIMESTAMP, "nonce-a").unwrap();
        let b = signer.signature("POST", ENDPOINT, TIMESTAMP, "nonce-b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sign_uses_fresh_nonce() {
        let credentials = test_credentials();
        let signer = OAuthSigner::new(&credentials);

        let first = signer.sign("POST", ENDPOINT).unwrap();
        let second = signer.sign("POST", ENDPOINT).unwrap();
        assert!(first.starts_with("OAuth "));
        assert_ne!(first, second);
    }

    #[test]
    fn test_generate_nonce() {
        let nonce1 = generate_nonce().unwrap();
        let nonce2 = generate_nonce().unwrap();

        assert_ne!(nonce1, nonce2);
        assert_eq!(nonce1.len(), 32);
        assert!(nonce1.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_blank_credentials_rejected() {
        let err = OAuthCredentials::new("key", "   ", "token", "secret").unwrap_err();
        assert!(matches!(err, AppError::Configuration("xapi_consumer_secret")));

        let err = OAuthCredentials::new("key", "secret", "token", "").unwrap_err();
        assert!(matches!(err, AppError::Configuration("xapi_access_token_secret")));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let rendered = format!("{:?}", test_credentials());
        assert!(!rendered.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_build_bearer_auth_header() {
        assert_eq!(build_bearer_auth_header("abc"), "Bearer abc");
    }
}
