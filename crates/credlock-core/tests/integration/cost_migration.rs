use credlock_core::{Cost, Credential, CredentialHasher, HasherConfig};

#[test]
fn old_cost_still_verifies_after_upgrade() {
    let old = CredentialHasher::new(HasherConfig::bcrypt(4)).unwrap();
    let stored = old.hash(b"Secret123!").unwrap();

    let new = CredentialHasher::new(HasherConfig::bcrypt(5)).unwrap();
    assert!(new.verify(b"Secret123!", &stored).unwrap());
    assert!(!new.verify(b"wrongpass", &stored).unwrap());
    assert!(new.needs_rehash(&stored).unwrap());
}

#[test]
fn new_hashes_embed_new_cost() {
    let new = CredentialHasher::new(HasherConfig::bcrypt(5)).unwrap();
    let fresh = new.hash(b"Secret123!").unwrap();
    assert!(fresh.starts_with("$2b$05$"));
    assert_eq!(*Credential::parse(&fresh).unwrap().cost(), Cost::Bcrypt(5));
    assert!(!new.needs_rehash(&fresh).unwrap());
}

#[test]
fn rehash_on_login_replaces_credential() {
    let old = CredentialHasher::new(HasherConfig::bcrypt(4)).unwrap();
    let mut stored = old.hash(b"Secret123!").unwrap();

    let new = CredentialHasher::new(HasherConfig::bcrypt(5)).unwrap();
    if new.verify(b"Secret123!", &stored).unwrap() && new.needs_rehash(&stored).unwrap() {
        stored = new.hash(b"Secret123!").unwrap();
    }
    assert!(stored.starts_with("$2b$05$"));
    assert!(new.verify(b"Secret123!", &stored).unwrap());
}

#[test]
fn downgrade_also_verifies() {
    let strong = CredentialHasher::new(HasherConfig::bcrypt(6)).unwrap();
    let stored = strong.hash(b"pw").unwrap();
    let weak = CredentialHasher::new(HasherConfig::bcrypt(4)).unwrap();
    assert!(weak.verify(b"pw", &stored).unwrap());
    assert!(weak.needs_rehash(&stored).unwrap());
}
