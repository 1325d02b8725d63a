//! Secret material must not leak through formatting or errors.

use credlock_core::{
    Credential, CredentialError, CredentialHasher, HasherConfig, LoginError, SecretBuffer,
};

const SECRET: &str = "hunter2-correct-horse";

#[test]
fn secret_buffer_is_masked() {
    let buf = SecretBuffer::new(SECRET.as_bytes());
    assert!(!format!("{buf:?}").contains(SECRET));
    assert!(!format!("{buf}").contains(SECRET));
}

#[test]
fn credential_debug_omits_digest() {
    let hasher = CredentialHasher::new(HasherConfig::bcrypt(4)).unwrap();
    let token = hasher.hash(SECRET.as_bytes()).unwrap();
    let credential = Credential::parse(&token).unwrap();
    let debug = format!("{credential:?}");
    assert!(!debug.contains(&token[29..]));
    assert!(debug.contains("[23 bytes]"));
}

#[test]
fn errors_never_echo_the_secret() {
    let hasher = CredentialHasher::new(HasherConfig::bcrypt(4)).unwrap();
    let long = SECRET.repeat(5);
    let err = hasher.hash(long.as_bytes()).unwrap_err();
    assert!(matches!(err, CredentialError::InputTooLong { .. }));
    assert!(!err.to_string().contains(SECRET));
    assert!(!format!("{err:?}").contains(SECRET));
}

#[test]
fn login_error_is_generic() {
    let hasher = CredentialHasher::new(HasherConfig::bcrypt(4)).unwrap();
    let stored = hasher.hash(SECRET.as_bytes()).unwrap();
    let err = credlock_core::authenticate(&hasher, b"guess", Some(&stored)).unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));
    assert!(!err.to_string().contains("guess"));
}
