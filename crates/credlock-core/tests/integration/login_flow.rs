use std::collections::HashMap;

use credlock_core::{authenticate, CredentialHasher, HasherConfig, LoginError};

struct Accounts {
    hasher: CredentialHasher,
    stored: HashMap<&'static str, String>,
}

impl Accounts {
    fn new() -> Self {
        Self {
            hasher: CredentialHasher::new(HasherConfig::bcrypt(4)).unwrap(),
            stored: HashMap::new(),
        }
    }

    fn register(&mut self, user: &'static str, secret: &[u8]) {
        let credential = self.hasher.hash(secret).unwrap();
        self.stored.insert(user, credential);
    }

    fn login(&self, user: &str, secret: &[u8]) -> Result<(), LoginError> {
        authenticate(
            &self.hasher,
            secret,
            self.stored.get(user).map(String::as_str),
        )
    }
}

#[test]
fn registered_user_logs_in() {
    let mut accounts = Accounts::new();
    accounts.register("alice", b"Secret123!");
    assert!(accounts.login("alice", b"Secret123!").is_ok());
}

#[test]
fn wrong_secret_and_unknown_user_look_the_same() {
    let mut accounts = Accounts::new();
    accounts.register("alice", b"Secret123!");

    let wrong = accounts.login("alice", b"wrongpass").unwrap_err();
    let unknown = accounts.login("mallory", b"Secret123!").unwrap_err();
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert!(matches!(wrong, LoginError::InvalidCredentials));
    assert!(matches!(unknown, LoginError::InvalidCredentials));
}

#[test]
fn corrupted_store_entry_is_an_invalid_login() {
    let mut accounts = Accounts::new();
    accounts.register("alice", b"Secret123!");
    accounts.stored.insert("alice", "$2b$04$truncated".to_owned());
    assert!(matches!(
        accounts.login("alice", b"Secret123!"),
        Err(LoginError::InvalidCredentials)
    ));
}

#[test]
fn unknown_user_repeated_lookups_stay_rejected() {
    let accounts = Accounts::new();
    for _ in 0..3 {
        assert!(matches!(
            accounts.login("nobody", b"anything"),
            Err(LoginError::InvalidCredentials)
        ));
    }
}
