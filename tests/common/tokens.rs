//! Bearer token builders
//!
//! Tokens are signed with RSA keys from `tests/fixtures`. Only the trusted
//! key is published in [`jwk_set`]; the untrusted key signs forgeries.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use super::{TEST_AUDIENCE, TEST_ISSUER};

/// Key id of the published signing key
pub const TEST_KID: &str = "recordme-test-key";

/// Key id the key set does not list
pub const ROTATED_KID: &str = "rotated-away";

const TRUSTED_KEY_PEM: &[u8] = include_bytes!("../fixtures/trusted_rsa.pem");
const UNTRUSTED_KEY_PEM: &[u8] = include_bytes!("../fixtures/untrusted_rsa.pem");

/// Base64url modulus of the trusted key
const TRUSTED_MODULUS: &str = "urh2dHPSBVZw5Hwlvq7-ORv8AfXFqtCYARWyHFgwccowYyD5f7VTBNRv_Pyw_ol_pm4mcSYaX4peSH4kkMSf6N4dpfnxC1sNO3hs3oyPbnQml44OSTIbAxBzbVc3oWkSImYeR0_F-sGYWD_5dPwe3TkLvraYQvXpvwQLN18miJzJEkEZdUnOhYBSmzqVHDc4q-bb21z0nJMCjdBbuva_bdUIGU6HKc1uSP5ECCeohHoofz0eV_vWihjmcPlKhmSd87N5Y_bB4aEZ8-dNc4HA79Pw3gGAdNHNfGPXm4U99ACRLL38TVUhJE1IQOpUPLQTYbqZfSfd074ktCXcVPbkSQ";

/// Key set publishing the trusted key under [`TEST_KID`]
pub fn jwk_set() -> Value {
    jwk_set_with_kid(TEST_KID)
}

/// Key set publishing the trusted key under `kid`
pub fn jwk_set_with_kid(kid: &str) -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "kid": kid,
            "use": "sig",
            "alg": "RS256",
            "n": TRUSTED_MODULUS,
            "e": "AQAB"
        }]
    })
}

/// Claims the standard-mode test application accepts
pub fn valid_claims() -> Value {
    let now = Utc::now().timestamp();
    json!({
        "sub": "auth0|user-1",
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "org_id": "org_abc",
        "org_name": "org_1",
        "user_email": "test@test.com"
    })
}

fn sign_with(claims: &Value, pem: &[u8], kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(pem).expect("Invalid test signing key");
    encode(&header, claims, &key).expect("Failed to sign test token")
}

/// Token signed with the published key
pub fn signed_token(claims: &Value) -> String {
    sign_with(claims, TRUSTED_KEY_PEM, TEST_KID)
}

/// Token signed with a key outside the key set, claiming the published `kid`
pub fn forged_token(claims: &Value) -> String {
    sign_with(claims, UNTRUSTED_KEY_PEM, TEST_KID)
}

/// Token signed with the published key under a `kid` the set does not list
pub fn unknown_kid_token(claims: &Value) -> String {
    sign_with(claims, TRUSTED_KEY_PEM, ROTATED_KID)
}

/// Well-formed token with a garbage signature
pub fn unsigned_token(claims: &Value) -> String {
    let header = json!({"alg": "RS256", "typ": "JWT", "kid": TEST_KID});
    format!(
        "{}.{}.unsigned",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}
