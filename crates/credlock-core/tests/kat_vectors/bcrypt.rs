use credlock_core::{
    BcryptVersion, Credential, CredentialError, CredentialHasher, HasherConfig, Scheme,
};

/// (secret, credential) pairs from crypt_blowfish.
const VECTORS: &[(&[u8], &str)] = &[
    (b"U*U", "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW"),
    (b"U*U*", "$2a$05$CCCCCCCCCCCCCCCCCCCCC.VGOzA784oUp/Z0DY336zx7pLYAy0lwK"),
    (b"U*U*U", "$2a$05$XXXXXXXXXXXXXXXXXXXXXOAcXxm9kjPGEMsLznoKqmqw7tc8WCx4a"),
    (b"", "$2a$05$CCCCCCCCCCCCCCCCCCCCC.7uG0VCzI2bS7j6ymqJi9CdcdxiRTWNy"),
    (
        b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
        "$2a$05$abcdefghijklmnopqrstuu5s2v8.iXieOjg/.AySBTTZIIVFJeBui",
    ),
];

fn hasher() -> CredentialHasher {
    CredentialHasher::new(HasherConfig::bcrypt(4)).unwrap()
}

#[test]
fn known_answers_verify() {
    let hasher = hasher();
    for (secret, credential) in VECTORS {
        assert!(
            hasher.verify(secret, credential).unwrap(),
            "vector {credential} did not verify"
        );
    }
}

#[test]
fn known_answers_reject_neighbours() {
    let hasher = hasher();
    for (secret, credential) in VECTORS {
        let mut other = secret.to_vec();
        other.push(b'!');
        if other.len() <= 72 {
            assert!(!hasher.verify(&other, credential).unwrap());
        }
    }
}

#[test]
fn version_tags_share_one_algorithm() {
    let hasher = hasher();
    let (secret, credential) = VECTORS[0];
    for tag in ["2b", "2y"] {
        let retagged = credential.replacen("2a", tag, 1);
        assert!(hasher.verify(secret, &retagged).unwrap(), "{retagged}");
    }
    let parsed = Credential::parse(credential).unwrap();
    assert_eq!(parsed.scheme(), Scheme::Bcrypt(BcryptVersion::V2a));
}

#[test]
fn parsed_vector_reencodes_unchanged() {
    for (_, credential) in VECTORS {
        assert_eq!(Credential::parse(credential).unwrap().to_string(), *credential);
    }
}

#[test]
fn input_past_72_bytes_is_rejected_not_truncated() {
    let hasher = hasher();
    let (secret, credential) = VECTORS[4];
    let mut long = secret.to_vec();
    long.extend_from_slice(b"chars after 72 are ignored");

    let err = hasher.verify(&long, credential).unwrap_err();
    assert!(matches!(
        err,
        CredentialError::InputTooLong { len: 98, max: 72, .. }
    ));
    assert!(matches!(
        hasher.hash(&long),
        Err(CredentialError::InputTooLong { .. })
    ));
}

#[test]
fn our_credentials_verify_with_bcrypt_crate() {
    let token = hasher().hash(b"Secret123!").unwrap();
    assert!(::bcrypt::verify(b"Secret123!", &token).unwrap());
    assert!(!::bcrypt::verify(b"wrongpass", &token).unwrap());
}

#[test]
fn bcrypt_crate_credentials_verify_with_ours() {
    let token = ::bcrypt::hash(b"Secret123!", 4).unwrap();
    let hasher = hasher();
    assert!(hasher.verify(b"Secret123!", &token).unwrap());
    assert!(!hasher.verify(b"wrongpass", &token).unwrap());
}
