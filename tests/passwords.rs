use srp_auth::{
    compute_key_password, generate_key_salt, srp_password_hash, AuthVersion, SrpError,
    KEY_SALT_LEN_BYTES, SALT_LEN_BYTES, SRP_LEN_BYTES,
};

use base64::prelude::BASE64_STANDARD;
use base64::Engine as _;

const MODULUS: [u8; SRP_LEN_BYTES] = [7u8; SRP_LEN_BYTES];
const SALT: [u8; SALT_LEN_BYTES] = [42u8; SALT_LEN_BYTES];

#[test]
fn hashing_is_deterministic() {
    let first = srp_password_hash(AuthVersion::V4, None, "hunter2", Some(&SALT), &MODULUS).unwrap();
    let second = srp_password_hash(AuthVersion::V4, None, "hunter2", Some(&SALT), &MODULUS).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn v3_and_v4_share_one_construction() {
    let v3 = srp_password_hash(AuthVersion::V3, None, "hunter2", Some(&SALT), &MODULUS).unwrap();
    let v4 = srp_password_hash(AuthVersion::V4, None, "hunter2", Some(&SALT), &MODULUS).unwrap();
    assert_eq!(v3.as_bytes(), v4.as_bytes());
}

#[test]
fn v2_strips_separators_before_v1() {
    let v2 = srp_password_hash(
        AuthVersion::V2,
        Some("User.Name_2-0"),
        "hunter2",
        None,
        &MODULUS,
    )
    .unwrap();
    let v1 = srp_password_hash(AuthVersion::V1, Some("username20"), "hunter2", None, &MODULUS)
        .unwrap();
    assert_eq!(v2.as_bytes(), v1.as_bytes());
}

#[test]
fn v1_and_v2_agree_on_a_clean_username() {
    let v2 = srp_password_hash(AuthVersion::V2, Some("alice"), "hunter2", None, &MODULUS).unwrap();
    let v1 = srp_password_hash(AuthVersion::V1, Some("alice"), "hunter2", None, &MODULUS).unwrap();
    assert_eq!(v2.as_bytes(), v1.as_bytes());
}

#[test]
fn v0_prehashes_before_v1() {
    let v0 = srp_password_hash(AuthVersion::V0, Some("alice"), "hunter2", None, &MODULUS).unwrap();
    let v1 = srp_password_hash(AuthVersion::V1, Some("alice"), "hunter2", None, &MODULUS).unwrap();
    assert_ne!(v0.as_bytes(), v1.as_bytes());
}

#[test]
fn salt_changes_the_hash() {
    let other_salt = [43u8; SALT_LEN_BYTES];
    let first = srp_password_hash(AuthVersion::V4, None, "hunter2", Some(&SALT), &MODULUS).unwrap();
    let second =
        srp_password_hash(AuthVersion::V4, None, "hunter2", Some(&other_salt), &MODULUS).unwrap();
    assert_ne!(first.as_bytes(), second.as_bytes());
}

#[test]
fn modern_versions_require_a_salt() {
    assert!(matches!(
        srp_password_hash(AuthVersion::V4, Some("alice"), "hunter2", None, &MODULUS),
        Err(SrpError::MissingSalt(4))
    ));
}

#[test]
fn legacy_versions_require_a_username() {
    for version in [AuthVersion::V0, AuthVersion::V1, AuthVersion::V2] {
        assert!(matches!(
            srp_password_hash(version, None, "hunter2", Some(&SALT), &MODULUS),
            Err(SrpError::MissingUsername(_))
        ));
    }
}

#[test]
fn key_password_has_bcrypt_hash_width() {
    let key_salt = BASE64_STANDARD.encode([9u8; KEY_SALT_LEN_BYTES]);
    let derived = compute_key_password("hunter2", &key_salt).unwrap();
    assert_eq!(derived.len(), 31);
    assert_eq!(derived, compute_key_password("hunter2", &key_salt).unwrap());
}

#[test]
fn key_password_depends_on_the_salt() {
    let first = compute_key_password("hunter2", &BASE64_STANDARD.encode([1u8; 16])).unwrap();
    let second = compute_key_password("hunter2", &BASE64_STANDARD.encode([2u8; 16])).unwrap();
    assert_ne!(first, second);
}

#[test]
fn key_password_rejects_bad_inputs() {
    assert!(matches!(
        compute_key_password("", &BASE64_STANDARD.encode([1u8; 16])),
        Err(SrpError::KeyPasswordInput)
    ));
    assert!(matches!(
        compute_key_password("hunter2", "tooshort"),
        Err(SrpError::KeyPasswordInput)
    ));
}

#[test]
fn generated_key_salt_decodes_to_sixteen_bytes() {
    let salt = generate_key_salt();
    assert_eq!(salt.len(), 24);
    assert_eq!(
        BASE64_STANDARD.decode(&salt).unwrap().len(),
        KEY_SALT_LEN_BYTES
    );
}
