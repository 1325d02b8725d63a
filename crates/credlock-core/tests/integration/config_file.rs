use credlock_core::{Algorithm, CredentialError, CredentialHasher, HasherConfig};
use tempfile::TempDir;

#[test]
fn hasher_built_from_file_uses_its_cost() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hasher.json");
    std::fs::write(&path, r#"{ "algorithm": "bcrypt", "bcryptCost": 5 }"#).unwrap();

    let config = HasherConfig::from_file(&path).unwrap();
    let hasher = CredentialHasher::new(config).unwrap();
    assert!(hasher.hash(b"pw").unwrap().starts_with("$2b$05$"));
}

#[test]
fn argon2id_file_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hasher.json");
    std::fs::write(
        &path,
        r#"{ "algorithm": "argon2id", "argon2id": { "mCost": 32, "tCost": 1, "pCost": 1 } }"#,
    )
    .unwrap();

    let config = HasherConfig::from_file(&path).unwrap();
    assert_eq!(config.algorithm, Algorithm::Argon2id);
    let hasher = CredentialHasher::new(config).unwrap();
    let stored = hasher.hash(b"pw").unwrap();
    assert!(stored.starts_with("$argon2id$v=19$m=32,t=1,p=1$"));
}

#[test]
fn corrupt_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hasher.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        HasherConfig::from_file(&path),
        Err(CredentialError::InvalidConfig(_))
    ));
}

#[test]
fn saved_config_reloads_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested.json");
    let config = HasherConfig::argon2id(super::FAST_ARGON2);
    config.save(&path).unwrap();
    assert_eq!(HasherConfig::from_file(&path).unwrap(), config);
}
