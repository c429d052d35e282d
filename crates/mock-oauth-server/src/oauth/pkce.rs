//! PKCE (Proof Key for Code Exchange) verification.
//!
//! Implements S256 code challenge verification per RFC 7636. Every other
//! method fails closed.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use super::types::{ChallengeRecord, CodeChallengeMethod};

/// Verify a PKCE S256 code challenge.
///
/// Computes `BASE64URL(SHA256(code_verifier))` and compares to the stored challenge.
pub fn verify_s256(code_verifier: &str, code_challenge: &str) -> bool {
    let hash = Sha256::digest(code_verifier.as_bytes());
    let computed = URL_SAFE_NO_PAD.encode(hash);
    computed == code_challenge
}

/// Check a presented verifier against the challenge stored in `record`.
pub fn validate(record: &ChallengeRecord, code_verifier: &str) -> bool {
    match record.code_challenge_method.parse::<CodeChallengeMethod>() {
        Ok(CodeChallengeMethod::S256) => verify_s256(code_verifier, &record.code_challenge),
        Err(_) => {
            tracing::warn!(
                method = %record.code_challenge_method,
                "Rejecting unsupported code_challenge_method"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::types::UserClaims;

    fn record(challenge: &str, method: &str) -> ChallengeRecord {
        ChallengeRecord {
            code: "code".into(),
            tenant_id: "tenant".into(),
            client_id: "client".into(),
            code_challenge: challenge.into(),
            code_challenge_method: method.into(),
            user_claims: UserClaims {
                email: "a@b.com".into(),
                family_name: "Doe".into(),
                given_name: "Jane".into(),
                account_type: "VENDOR".into(),
            },
        }
    }

    #[test]
    fn test_s256_valid() {
        // RFC 7636 Appendix B test vector
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";
        assert!(verify_s256(verifier, challenge));
    }

    #[test]
    fn test_s256_invalid_verifier() {
        let challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";
        assert!(!verify_s256("wrong-verifier", challenge));
    }

    #[test]
    fn test_s256_no_padding_or_case_normalization() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert!(!verify_s256(verifier, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM="));
        assert!(!verify_s256(verifier, "e9melhoa2owvfremtjguchaoek1t8urwbugjsstw-cm"));
        assert!(!verify_s256(verifier, " E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"));
    }

    #[test]
    fn test_validate_record() {
        let rec = record("XkjGR8UpEbhuwOI3U7uHd_GWLss6XU9rCDFL73pQMyo", "S256");
        assert!(validate(&rec, "NCf1tth97RkR64fofrITK_W2F_43NuDEtqdVBl_pt6Y"));
        assert!(!validate(&rec, "wrong"));
    }

    #[test]
    fn test_validate_method_case_insensitive() {
        let rec = record("XkjGR8UpEbhuwOI3U7uHd_GWLss6XU9rCDFL73pQMyo", "s256");
        assert!(validate(&rec, "NCf1tth97RkR64fofrITK_W2F_43NuDEtqdVBl_pt6Y"));
    }

    #[test]
    fn test_validate_plain_fails_closed() {
        // A "plain" challenge equal to the verifier must still be refused.
        let rec = record("verifier", "plain");
        assert!(!validate(&rec, "verifier"));
    }
}
