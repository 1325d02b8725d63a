//! Self-describing credential tokens (Modular Crypt Format).
//!
//! # Layouts
//!
//! ```text
//! $2b$10$<22 chars salt><31 chars digest>                 bcrypt, 60 chars
//! $argon2id$v=19$m=19456,t=2,p=1$<salt b64>$<digest b64>  argon2id
//! ```
//!
//! bcrypt uses its own base64 alphabet (`./A-Za-z0-9`); argon2id uses
//! standard base64. Neither is padded.
//!
//! Parsing distinguishes two failure modes:
//! - `UnsupportedAlgorithm`: a well-formed `$id$` prefix naming a scheme
//!   this build does not implement (`2x`, `argon2i`, `scrypt`, ...)
//! - `MalformedCredential`: everything else that does not parse

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;
use crate::kdf::{argon2id, bcrypt, Algorithm, Argon2idParams, Cost};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// bcrypt base64: custom alphabet, no padding, lenient on the unused low
/// bits of the final character (some encoders leave them set).
const BCRYPT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Encoded bcrypt salt length (16 bytes).
const BCRYPT_SALT_CHARS: usize = 22;

/// Encoded bcrypt digest length (23 bytes).
const BCRYPT_DIGEST_CHARS: usize = 31;

/// Salt and digest together.
const BCRYPT_PAYLOAD_CHARS: usize = 53;

/// Longest identifier still treated as a scheme name.
const MAX_IDENT_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// bcrypt revision tag. All three share one algorithm for secrets of at
/// most 72 bytes; `2x` (the broken sign-extension variant) is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BcryptVersion {
    /// `$2a$`
    V2a,
    /// `$2b$`: emitted for new credentials.
    V2b,
    /// `$2y$`
    V2y,
}

impl BcryptVersion {
    const fn ident(self) -> &'static str {
        match self {
            Self::V2a => "2a",
            Self::V2b => "2b",
            Self::V2y => "2y",
        }
    }
}

/// Scheme identifier as written in the token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// One of the bcrypt revisions.
    Bcrypt(BcryptVersion),
    /// Argon2id, version 19.
    Argon2id,
}

impl Scheme {
    /// The scheme new credentials of `algorithm` are written with.
    #[must_use]
    pub const fn current(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Bcrypt => Self::Bcrypt(BcryptVersion::V2b),
            Algorithm::Argon2id => Self::Argon2id,
        }
    }

    /// Algorithm family of this scheme.
    #[must_use]
    pub const fn algorithm(self) -> Algorithm {
        match self {
            Self::Bcrypt(_) => Algorithm::Bcrypt,
            Self::Argon2id => Algorithm::Argon2id,
        }
    }

    /// Identifier between the first two `$`.
    #[must_use]
    pub const fn ident(self) -> &'static str {
        match self {
            Self::Bcrypt(v) => v.ident(),
            Self::Argon2id => "argon2id",
        }
    }
}

/// A parsed credential: scheme, cost, salt and digest.
///
/// `Display` produces the storable token and `FromStr` reads it back.
/// `Debug` omits salt and digest contents.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Credential {
    scheme: Scheme,
    cost: Cost,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl Credential {
    /// Assemble a credential from freshly derived parts.
    pub(crate) fn new(scheme: Scheme, cost: Cost, salt: Vec<u8>, digest: Vec<u8>) -> Self {
        debug_assert_eq!(scheme.algorithm(), cost.algorithm());
        Self {
            scheme,
            cost,
            salt,
            digest,
        }
    }

    /// Parse a stored token.
    ///
    /// # Errors
    ///
    /// `CredentialError::MalformedCredential` or
    /// `CredentialError::UnsupportedAlgorithm`.
    pub fn parse(token: &str) -> Result<Self, CredentialError> {
        token.parse()
    }

    /// Scheme identifier the token was written with.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Algorithm family.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.scheme.algorithm()
    }

    /// Work factor embedded in the token.
    #[must_use]
    pub const fn cost(&self) -> &Cost {
        &self.cost
    }

    pub(crate) fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub(crate) fn digest(&self) -> &[u8] {
        &self.digest
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("scheme", &self.scheme)
            .field("cost", &self.cost)
            .field("salt", &format_args!("[{} bytes]", self.salt.len()))
            .field("digest", &format_args!("[{} bytes]", self.digest.len()))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.scheme, &self.cost) {
            (Scheme::Bcrypt(version), Cost::Bcrypt(rounds)) => write!(
                f,
                "${}${rounds:02}${}{}",
                version.ident(),
                BCRYPT_B64.encode(&self.salt),
                BCRYPT_B64.encode(&self.digest),
            ),
            (Scheme::Argon2id, Cost::Argon2id(p)) => write!(
                f,
                "$argon2id$v={}$m={},t={},p={}${}${}",
                argon2id::VERSION,
                p.m_cost,
                p.t_cost,
                p.p_cost,
                STANDARD_NO_PAD.encode(&self.salt),
                STANDARD_NO_PAD.encode(&self.digest),
            ),
            // `new` and the parsers never pair a scheme with a foreign cost.
            _ => Err(fmt::Error),
        }
    }
}

impl From<Credential> for String {
    fn from(credential: Credential) -> Self {
        credential.to_string()
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

impl FromStr for Credential {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('$')
            .ok_or_else(|| malformed("missing leading `$`"))?;
        let (ident, body) = rest
            .split_once('$')
            .ok_or_else(|| malformed("missing algorithm identifier"))?;

        match ident {
            "2a" => parse_bcrypt(BcryptVersion::V2a, body),
            "2b" => parse_bcrypt(BcryptVersion::V2b, body),
            "2y" => parse_bcrypt(BcryptVersion::V2y, body),
            "argon2id" => parse_argon2id(body),
            other if is_identifier(other) => {
                Err(CredentialError::UnsupportedAlgorithm(other.to_owned()))
            }
            _ => Err(malformed("invalid algorithm identifier")),
        }
    }
}

impl TryFrom<String> for Credential {
    type Error = CredentialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn malformed(reason: &str) -> CredentialError {
    CredentialError::MalformedCredential(reason.to_owned())
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_IDENT_LEN
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// `NN$<salt><digest>` after `$2?$`.
fn parse_bcrypt(version: BcryptVersion, body: &str) -> Result<Credential, CredentialError> {
    let (rounds, payload) = body
        .split_once('$')
        .ok_or_else(|| malformed("bcrypt: missing cost separator"))?;

    if rounds.len() != 2 || !rounds.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("bcrypt: cost must be two decimal digits"));
    }
    let rounds: u32 = rounds
        .parse()
        .map_err(|_| malformed("bcrypt: cost is not a number"))?;
    if bcrypt::validate_rounds(rounds).is_err() {
        return Err(malformed("bcrypt: cost out of range"));
    }

    if !payload.is_ascii() || payload.len() != BCRYPT_PAYLOAD_CHARS {
        return Err(malformed("bcrypt: salt and digest have the wrong length"));
    }
    let (salt, digest) = payload.split_at(BCRYPT_SALT_CHARS);

    let salt = BCRYPT_B64
        .decode(salt)
        .map_err(|_| malformed("bcrypt: salt is not valid base64"))?;
    let digest = BCRYPT_B64
        .decode(digest)
        .map_err(|_| malformed("bcrypt: digest is not valid base64"))?;
    if salt.len() != bcrypt::SALT_LEN || digest.len() != bcrypt::DIGEST_LEN {
        return Err(malformed("bcrypt: salt and digest have the wrong length"));
    }

    Ok(Credential::new(
        Scheme::Bcrypt(version),
        Cost::Bcrypt(rounds),
        salt,
        digest,
    ))
}

/// `v=19$m=..,t=..,p=..$<salt>$<digest>` after `$argon2id$`.
fn parse_argon2id(body: &str) -> Result<Credential, CredentialError> {
    let mut fields = body.split('$');
    let (Some(version), Some(params), Some(salt), Some(digest), None) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return Err(malformed("argon2id: expected version, params, salt and digest"));
    };

    let version = version
        .strip_prefix("v=")
        .ok_or_else(|| malformed("argon2id: missing version"))?;
    let version: u32 = parse_decimal(version).ok_or_else(|| malformed("argon2id: bad version"))?;
    if version != argon2id::VERSION {
        return Err(CredentialError::UnsupportedAlgorithm(format!(
            "argon2id v={version}"
        )));
    }

    let params = parse_argon2_params(params)?;
    if params.validate().is_err() {
        return Err(malformed("argon2id: parameters out of range"));
    }

    let salt = STANDARD_NO_PAD
        .decode(salt)
        .map_err(|_| malformed("argon2id: salt is not valid base64"))?;
    if !(argon2id::MIN_SALT_LEN..=argon2id::MAX_SALT_LEN).contains(&salt.len()) {
        return Err(malformed("argon2id: salt has the wrong length"));
    }
    let digest = STANDARD_NO_PAD
        .decode(digest)
        .map_err(|_| malformed("argon2id: digest is not valid base64"))?;
    if digest.len() != argon2id::DIGEST_LEN {
        return Err(malformed("argon2id: digest has the wrong length"));
    }

    Ok(Credential::new(
        Scheme::Argon2id,
        Cost::Argon2id(params),
        salt,
        digest,
    ))
}

/// `m=<u32>,t=<u32>,p=<u32>`, in that order.
fn parse_argon2_params(s: &str) -> Result<Argon2idParams, CredentialError> {
    let mut pairs = s.split(',');
    let mut field = |key: &str| -> Result<u32, CredentialError> {
        pairs
            .next()
            .and_then(|pair| pair.strip_prefix(key))
            .and_then(|v| v.strip_prefix('='))
            .and_then(parse_decimal)
            .ok_or_else(|| malformed("argon2id: expected m=<n>,t=<n>,p=<n>"))
    };
    let m_cost = field("m")?;
    let t_cost = field("t")?;
    let p_cost = field("p")?;
    if pairs.next().is_some() {
        return Err(malformed("argon2id: unexpected parameter"));
    }
    Ok(Argon2idParams {
        m_cost,
        t_cost,
        p_cost,
    })
}

/// Plain ASCII decimal, no sign, no leading `+`.
fn parse_decimal(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
