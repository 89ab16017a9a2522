#![cfg(feature = "pgpinternal")]

//! Signature checks on the server-provided modulus.

use srp_auth::{ModulusError, ModulusSignatureVerifier, RpgpVerifier, SRP_MODULUS_KEY};

const SIGNED_MODULUS: &str = "-----BEGIN PGP SIGNED MESSAGE-----
Hash: SHA256

y6TtufhYg2mIeauZYOti+GPbd/0vP66kP34TgE6elK/kXkTW/Yfrp1jMmtLiWWSq5cszTMRIEighuwPbZ/z3RrWPxsOg0+jYgbFu8yZ8vOAwrPtLxZl94x0PFTAZBrVapmCn+VYcM+UXdO9v70xFDLwj34tpPbvpODHVWHSlGlhOwndWg3XBE2D9PJopFZajNZiqOScBXree5rDgzU5BBaPbIb6nySpyaeThMCcNzpcEqE8r3ro+E/VdXBvSSJpusr1dvAwHc3IDGUzAhodqV5mjYy9nXwq/9gHWpYNtm76Ols7ReWAhZwy1+cQllQZwGfzzOVGpc+3WutOntQjM6Q==
-----BEGIN PGP SIGNATURE-----
Version: ProtonMail
Comment: https://protonmail.com

wl4EARYIABAFAlwB1j8JEDUFhcTpUY8mAADfEAD8DFdNXn4TsgbfbAZRDa9a
yywqa/2W9Qyg5MJaNZd2a+0BAPg04gEZI+G8RaoPVh/SYvWx7jpP3L1O8bEi
M/j1cjIO
=5RYw
-----END PGP SIGNATURE-----";

const MODULUS_B64: &str = "y6TtufhYg2mIeauZYOti+GPbd/0vP66kP34TgE6elK/kXkTW/Yfrp1jMmtLiWWSq5cszTMRIEighuwPbZ/z3RrWPxsOg0+jYgbFu8yZ8vOAwrPtLxZl94x0PFTAZBrVapmCn+VYcM+UXdO9v70xFDLwj34tpPbvpODHVWHSlGlhOwndWg3XBE2D9PJopFZajNZiqOScBXree5rDgzU5BBaPbIb6nySpyaeThMCcNzpcEqE8r3ro+E/VdXBvSSJpusr1dvAwHc3IDGUzAhodqV5mjYy9nXwq/9gHWpYNtm76Ols7ReWAhZwy1+cQllQZwGfzzOVGpc+3WutOntQjM6Q==";

#[test]
fn extracts_the_modulus_from_a_signed_message() {
    let verifier = RpgpVerifier::default();
    let extracted = verifier
        .verify_and_extract_modulus(SIGNED_MODULUS, SRP_MODULUS_KEY)
        .unwrap();
    assert_eq!(extracted.trim(), MODULUS_B64);
}

#[test]
fn the_cached_key_survives_a_second_use() {
    let verifier = RpgpVerifier::default();
    verifier
        .verify_and_extract_modulus(SIGNED_MODULUS, SRP_MODULUS_KEY)
        .unwrap();
    verifier
        .verify_and_extract_modulus(SIGNED_MODULUS, SRP_MODULUS_KEY)
        .unwrap();
}

#[test]
fn rejects_a_tampered_modulus() {
    // Flip one character of the signed body.
    let tampered = SIGNED_MODULUS.replacen("y6Tt", "z6Tt", 1);
    let verifier = RpgpVerifier::default();
    assert!(matches!(
        verifier.verify_and_extract_modulus(&tampered, SRP_MODULUS_KEY),
        Err(ModulusError::InvalidSignature)
    ));
}

#[test]
fn verifier_generation_refuses_a_forged_modulus() {
    use srp_auth::{SrpAuth, SrpError};

    let tampered = SIGNED_MODULUS.replacen("y6Tt", "z6Tt", 1);
    assert!(matches!(
        SrpAuth::generate_verifier_with_pgp("password", None, &tampered),
        Err(SrpError::Modulus(ModulusError::InvalidSignature))
    ));
}

#[test]
fn rejects_garbage_instead_of_a_message() {
    let verifier = RpgpVerifier::default();
    assert!(matches!(
        verifier.verify_and_extract_modulus("not a signed message", SRP_MODULUS_KEY),
        Err(ModulusError::MalformedMessage(_))
    ));
}
