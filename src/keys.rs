use crate::error::ClaimError;
use crate::types::Address;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

const WIF_VERSION: u8 = 0x80;
const WIF_COMPRESSED_FLAG: u8 = 0x01;
const BTC_ADDRESS_VERSION: u8 = 0;
const PTS_ADDRESS_VERSION: u8 = 56;

/// Recovered private key with its public key string. Lives only for one claim attempt.
#[derive(Clone)]
pub struct KeyMaterial {
    secret: SecretKey,
    public: PublicKey,
    public_key: String,
}

impl KeyMaterial {
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public_key_string(&self) -> &str {
        &self.public_key
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

pub trait AddressDeriver: Send + Sync {
    fn parse_key(&self, text: &str) -> Result<KeyMaterial, ClaimError>;

    /// Every address format a balance owned by this key may have been recorded under.
    fn addresses(&self, key: &KeyMaterial) -> Vec<Address>;
}

/// WIF keys and graphene-style public key / address strings.
#[derive(Clone, Debug)]
pub struct GrapheneKeys {
    prefix: String,
}

impl GrapheneKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn public_key_string(&self, public: &PublicKey) -> String {
        let compressed = public.serialize();
        self.checksummed(&compressed)
    }

    fn checksummed(&self, payload: &[u8]) -> String {
        let checksum = Ripemd160::digest(payload);
        let mut bytes = payload.to_vec();
        bytes.extend_from_slice(&checksum[..4]);
        format!("{}{}", self.prefix, bs58::encode(bytes).into_string())
    }

    fn legacy_address(&self, public_bytes: &[u8], version: u8) -> Address {
        let mut versioned = vec![version];
        versioned.extend_from_slice(&Ripemd160::digest(Sha256::digest(public_bytes)));
        let check = Sha256::digest(Sha256::digest(&versioned));
        versioned.extend_from_slice(&check[..4]);
        Address::new(self.checksummed(&Ripemd160::digest(&versioned)))
    }

    fn native_address(&self, public: &PublicKey) -> Address {
        let hash = Ripemd160::digest(Sha512::digest(public.serialize()));
        Address::new(self.checksummed(&hash))
    }
}

fn decode_wif(text: &str) -> Result<SecretKey, ClaimError> {
    let bytes = bs58::decode(text.trim())
        .into_vec()
        .map_err(|err| ClaimError::KeyParse(format!("invalid base58: {err}")))?;
    let (body, checksum) = match bytes.len() {
        37 | 38 => bytes.split_at(bytes.len() - 4),
        len => {
            return Err(ClaimError::KeyParse(format!(
                "unexpected key length: {len}"
            )))
        }
    };
    if Sha256::digest(Sha256::digest(body))[..4] != *checksum {
        return Err(ClaimError::KeyParse("checksum mismatch".to_string()));
    }
    if body[0] != WIF_VERSION {
        return Err(ClaimError::KeyParse(format!(
            "unexpected version byte: {:#04x}",
            body[0]
        )));
    }
    if body.len() == 34 && body[33] != WIF_COMPRESSED_FLAG {
        return Err(ClaimError::KeyParse("invalid compression flag".to_string()));
    }
    SecretKey::from_slice(&body[1..33]).map_err(|err| ClaimError::KeyParse(err.to_string()))
}

impl AddressDeriver for GrapheneKeys {
    fn parse_key(&self, text: &str) -> Result<KeyMaterial, ClaimError> {
        let secret = decode_wif(text)?;
        let public = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret);
        Ok(KeyMaterial {
            secret,
            public,
            public_key: self.public_key_string(&public),
        })
    }

    fn addresses(&self, key: &KeyMaterial) -> Vec<Address> {
        let compressed = key.public.serialize();
        let uncompressed = key.public.serialize_uncompressed();
        vec![
            self.legacy_address(&uncompressed, BTC_ADDRESS_VERSION),
            self.legacy_address(&compressed, BTC_ADDRESS_VERSION),
            self.legacy_address(&uncompressed, PTS_ADDRESS_VERSION),
            self.legacy_address(&compressed, PTS_ADDRESS_VERSION),
            self.native_address(&key.public),
        ]
    }
}

#[cfg(test)]
pub(crate) fn encode_wif(secret: &[u8; 32], compressed: bool) -> String {
    let mut body = vec![WIF_VERSION];
    body.extend_from_slice(secret);
    if compressed {
        body.push(WIF_COMPRESSED_FLAG);
    }
    let checksum = Sha256::digest(Sha256::digest(&body));
    body.extend_from_slice(&checksum[..4]);
    bs58::encode(body).into_string()
}
