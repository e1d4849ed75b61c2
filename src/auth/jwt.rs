use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct Claims {
    exp: Option<Value>,
}

/// Read the `exp` claim (Unix seconds) from a JWT without verifying it
///
/// The signing key belongs to upstream, so only the payload is decoded.
/// Returns `None` for opaque tokens, undecodable payloads, or a missing or
/// non-positive `exp`.
pub(crate) fn expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;

    data.claims
        .exp?
        .as_f64()
        .map(|exp| exp as i64)
        .filter(|exp| *exp > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn make_token(claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"upstream-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_reads_exp_claim() {
        let token = make_token(json!({"sub": "42", "exp": 1893456000}));
        assert_eq!(expiry(&token), Some(1_893_456_000));
    }

    #[test]
    fn test_reads_expired_claim() {
        let token = make_token(json!({"exp": 1000}));
        assert_eq!(expiry(&token), Some(1000));
    }

    #[test]
    fn test_opaque_token_has_no_expiry() {
        assert_eq!(expiry("a1b2c3d4"), None);
        assert_eq!(expiry("not.base64!.jwt"), None);
    }

    #[test]
    fn test_missing_or_zero_exp() {
        assert_eq!(expiry(&make_token(json!({"sub": "42"}))), None);
        assert_eq!(expiry(&make_token(json!({"exp": 0}))), None);
        assert_eq!(expiry(&make_token(json!({"exp": "soon"}))), None);
    }
}
