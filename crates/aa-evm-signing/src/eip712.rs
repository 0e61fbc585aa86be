//! Generic EIP-712 typed data signing.
//!
//! Implements [EIP-712](https://eips.ethereum.org/EIPS/eip-712) typed structured data hashing
//! and signing in a **protocol-agnostic** way. Two entry points are provided:
//!
//! - A static path: callers implement the [`Eip712Type`] trait for their own
//!   domain-specific structs; this module handles the cryptographic envelope.
//! - A dynamic path ([`sign_typed_data_v4_json`]): callers pass the standard
//!   `eth_signTypedData_v4` JSON payload (`types`/`primaryType`/`domain`/`message`)
//!   and this module encodes and hashes it without any compile-time struct.
//!
//! Both paths are gated behind the `eip712` feature, which pulls in `serde`/`serde_json`.

use crate::{account, Address, Error, PrivateKeyAccount, Result, Signature};
use sha3::{Digest, Keccak256};
use std::collections::{BTreeMap, HashMap};

pub(crate) fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// A type that can be hashed as an EIP-712 struct.
pub trait Eip712Type {
    /// The EIP-712 type string, e.g. `"Mail(address from,address to,string contents)"`.
    fn type_string() -> &'static str;

    /// ABI-encodes the struct's member values in declaration order (each
    /// member pre-hashed/padded to 32 bytes per EIP-712 encoding rules).
    fn encode_data(&self) -> Vec<u8>;

    /// `keccak256(type_string())`.
    fn type_hash() -> [u8; 32] {
        keccak256(Self::type_string().as_bytes())
    }

    /// `keccak256(type_hash() || encode_data())`.
    fn hash_struct(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(32 + self.encode_data().len());
        buf.extend_from_slice(&Self::type_hash());
        buf.extend_from_slice(&self.encode_data());
        keccak256(&buf)
    }
}

/// The EIP-712 domain separator fields. All fields are optional; only the
/// ones present are included in the domain type string and hash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eip712Domain {
    pub name: Option<String>,
    pub version: Option<String>,
    pub chain_id: Option<u64>,
    pub verifying_contract: Option<Address>,
    pub salt: Option<[u8; 32]>,
}

impl Eip712Domain {
    pub fn new(
        name: Option<String>,
        version: Option<String>,
        chain_id: Option<u64>,
        verifying_contract: Option<Address>,
    ) -> Self {
        Eip712Domain {
            name,
            version,
            chain_id,
            verifying_contract,
            salt: None,
        }
    }

    pub fn builder() -> Eip712DomainBuilder {
        Eip712DomainBuilder::default()
    }

    /// Builds the domain's EIP-712 type string, including only present fields.
    pub fn type_string(&self) -> String {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("string name");
        }
        if self.version.is_some() {
            fields.push("string version");
        }
        if self.chain_id.is_some() {
            fields.push("uint256 chainId");
        }
        if self.verifying_contract.is_some() {
            fields.push("address verifyingContract");
        }
        if self.salt.is_some() {
            fields.push("bytes32 salt");
        }
        format!("EIP712Domain({})", fields.join(","))
    }

    pub fn type_hash(&self) -> [u8; 32] {
        keccak256(self.type_string().as_bytes())
    }

    /// The domain separator: `keccak256(type_hash || encoded fields)`.
    pub fn domain_separator(&self) -> [u8; 32] {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.type_hash());
        if let Some(name) = &self.name {
            buf.extend_from_slice(&keccak256(name.as_bytes()));
        }
        if let Some(version) = &self.version {
            buf.extend_from_slice(&keccak256(version.as_bytes()));
        }
        if let Some(chain_id) = self.chain_id {
            buf.extend_from_slice(&encode_uint256(chain_id as u128));
        }
        if let Some(contract) = self.verifying_contract {
            buf.extend_from_slice(&encode_address(&contract));
        }
        if let Some(salt) = self.salt {
            buf.extend_from_slice(&salt);
        }
        keccak256(&buf)
    }
}

/// Fluent builder for [`Eip712Domain`].
#[derive(Debug, Clone, Default)]
pub struct Eip712DomainBuilder {
    name: Option<String>,
    version: Option<String>,
    chain_id: Option<u64>,
    verifying_contract: Option<Address>,
    salt: Option<[u8; 32]>,
}

impl Eip712DomainBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn verifying_contract(mut self, contract: Address) -> Self {
        self.verifying_contract = Some(contract);
        self
    }

    pub fn salt(mut self, salt: [u8; 32]) -> Self {
        self.salt = Some(salt);
        self
    }

    pub fn build(self) -> Eip712Domain {
        Eip712Domain {
            name: self.name,
            version: self.version,
            chain_id: self.chain_id,
            verifying_contract: self.verifying_contract,
            salt: self.salt,
        }
    }
}

/// Computes the final EIP-712 digest: `keccak256(0x1901 || domainSeparator || hashStruct(message))`.
pub fn hash_typed_data<T: Eip712Type>(domain: &Eip712Domain, message: &T) -> [u8; 32] {
    let mut buf = Vec::with_capacity(2 + 32 + 32);
    buf.push(0x19);
    buf.push(0x01);
    buf.extend_from_slice(&domain.domain_separator());
    buf.extend_from_slice(&message.hash_struct());
    keccak256(&buf)
}

/// Signs typed data using the static [`Eip712Type`] path.
pub fn sign_typed_data<T: Eip712Type>(
    account: &PrivateKeyAccount,
    domain: &Eip712Domain,
    message: &T,
) -> Result<Signature> {
    let hash = hash_typed_data(domain, message);
    account.sign_hash(&hash)
}

/// Verifies that `signature` was produced by `expected_signer` over `message`.
pub fn verify_typed_data<T: Eip712Type>(
    domain: &Eip712Domain,
    message: &T,
    signature: &Signature,
    expected_signer: Address,
) -> Result<bool> {
    let hash = hash_typed_data(domain, message);
    let recovered = account::recover_signer(&hash, signature)?;
    Ok(recovered == expected_signer)
}

// --- ABI encoding helpers for EIP-712 struct members ---

pub fn encode_address(address: &Address) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..32].copy_from_slice(address.as_bytes());
    out
}

pub fn encode_uint256(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..32].copy_from_slice(&value.to_be_bytes());
    out
}

pub fn encode_u256_bytes(value: &[u8; 32]) -> [u8; 32] {
    *value
}

pub fn encode_uint64(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..32].copy_from_slice(&value.to_be_bytes());
    out
}

pub fn encode_bool(value: bool) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[31] = value as u8;
    out
}

pub fn encode_bytes32(value: &[u8; 32]) -> [u8; 32] {
    *value
}

/// Hashes dynamic `bytes`/`string` values per EIP-712 ("the keccak256 hash of ... is used in place of it").
pub fn encode_bytes_dynamic(value: &[u8]) -> [u8; 32] {
    keccak256(value)
}

// --- Dynamic JSON-based typed data (eth_signTypedData_v4 payload) ---

/// A single field declaration within an EIP-712 `types` entry.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Eip712FieldType {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// The standard `eth_signTypedData_v4` JSON payload.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct TypedData {
    pub types: HashMap<String, Vec<Eip712FieldType>>,
    #[serde(rename = "primaryType")]
    pub primary_type: String,
    pub domain: serde_json::Value,
    pub message: serde_json::Value,
}

impl TypedData {
    /// Parses a JSON `eth_signTypedData_v4` payload.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::TypedDataError(e.to_string()))
    }

    /// Computes the final EIP-712 digest for this dynamic payload.
    pub fn hash(&self) -> Result<[u8; 32]> {
        let domain_separator = self.hash_struct_value("EIP712Domain", &self.domain)?;
        let message_hash = self.hash_struct_value(&self.primary_type, &self.message)?;

        let mut buf = Vec::with_capacity(66);
        buf.push(0x19);
        buf.push(0x01);
        buf.extend_from_slice(&domain_separator);
        buf.extend_from_slice(&message_hash);
        Ok(keccak256(&buf))
    }

    fn encode_type_string(&self, type_name: &str) -> Result<String> {
        let fields = self
            .types
            .get(type_name)
            .ok_or_else(|| Error::TypedDataError(format!("unknown type: {}", type_name)))?;

        let mut referenced = BTreeMap::new();
        self.collect_referenced_types(type_name, &mut referenced)?;
        referenced.remove(type_name);

        let own_fields = fields
            .iter()
            .map(|f| format!("{} {}", f.type_name, f.name))
            .collect::<Vec<_>>()
            .join(",");
        let mut out = format!("{}({})", type_name, own_fields);

        for (name, fields) in referenced {
            let dep_fields = fields
                .iter()
                .map(|f| format!("{} {}", f.type_name, f.name))
                .collect::<Vec<_>>()
                .join(",");
            out.push_str(&format!("{}({})", name, dep_fields));
        }
        Ok(out)
    }

    fn collect_referenced_types(
        &self,
        type_name: &str,
        seen: &mut BTreeMap<String, Vec<Eip712FieldType>>,
    ) -> Result<()> {
        if seen.contains_key(type_name) {
            return Ok(());
        }
        let fields = match self.types.get(type_name) {
            Some(fields) => fields,
            None => return Ok(()),
        };
        seen.insert(type_name.to_string(), fields.clone());
        for field in fields {
            let base_type = field.type_name.trim_end_matches("[]");
            if self.types.contains_key(base_type) {
                self.collect_referenced_types(base_type, seen)?;
            }
        }
        Ok(())
    }

    fn type_hash_for(&self, type_name: &str) -> Result<[u8; 32]> {
        Ok(keccak256(self.encode_type_string(type_name)?.as_bytes()))
    }

    fn hash_struct_value(&self, type_name: &str, value: &serde_json::Value) -> Result<[u8; 32]> {
        let fields = self
            .types
            .get(type_name)
            .ok_or_else(|| Error::TypedDataError(format!("unknown type: {}", type_name)))?
            .clone();

        let mut buf = Vec::new();
        buf.extend_from_slice(&self.type_hash_for(type_name)?);

        for field in &fields {
            let field_value = value.get(&field.name).ok_or_else(|| {
                Error::TypedDataError(format!("missing field: {}", field.name))
            })?;
            buf.extend_from_slice(&self.encode_value(&field.type_name, field_value)?);
        }

        Ok(keccak256(&buf))
    }

    fn encode_value(&self, type_name: &str, value: &serde_json::Value) -> Result<[u8; 32]> {
        if let Some(base_type) = type_name.strip_suffix("[]") {
            let items = value
                .as_array()
                .ok_or_else(|| Error::TypedDataError(format!("expected array for {}", type_name)))?;
            let mut buf = Vec::new();
            for item in items {
                buf.extend_from_slice(&self.encode_value(base_type, item)?);
            }
            return Ok(keccak256(&buf));
        }

        if self.types.contains_key(type_name) {
            return self.hash_struct_value(type_name, value);
        }

        match type_name {
            "string" => {
                let s = value
                    .as_str()
                    .ok_or_else(|| Error::TypedDataError("expected string".to_string()))?;
                Ok(encode_bytes_dynamic(s.as_bytes()))
            }
            "bytes" => {
                let s = value
                    .as_str()
                    .ok_or_else(|| Error::TypedDataError("expected hex bytes string".to_string()))?;
                let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
                Ok(encode_bytes_dynamic(&bytes))
            }
            "address" => {
                let s = value
                    .as_str()
                    .ok_or_else(|| Error::TypedDataError("expected address string".to_string()))?;
                let addr: Address = s.parse()?;
                Ok(encode_address(&addr))
            }
            "bool" => {
                let b = value
                    .as_bool()
                    .ok_or_else(|| Error::TypedDataError("expected bool".to_string()))?;
                Ok(encode_bool(b))
            }
            t if t.starts_with("uint") || t.starts_with("int") => {
                let as_u128 = match value {
                    serde_json::Value::Number(n) => n
                        .as_u64()
                        .map(|v| v as u128)
                        .ok_or_else(|| Error::TypedDataError(format!("invalid integer for {}", t)))?,
                    serde_json::Value::String(s) => {
                        let s = s.strip_prefix("0x").unwrap_or(s);
                        if s.chars().all(|c| c.is_ascii_hexdigit()) && value.as_str().unwrap().starts_with("0x") {
                            u128::from_str_radix(s, 16)
                                .map_err(|e| Error::TypedDataError(e.to_string()))?
                        } else {
                            s.parse::<u128>()
                                .map_err(|e| Error::TypedDataError(e.to_string()))?
                        }
                    }
                    _ => {
                        return Err(Error::TypedDataError(format!(
                            "unsupported value for {}",
                            t
                        )))
                    }
                };
                Ok(encode_uint256(as_u128))
            }
            t if t.starts_with("bytes") => {
                let s = value
                    .as_str()
                    .ok_or_else(|| Error::TypedDataError(format!("expected hex string for {}", t)))?;
                let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
                let mut out = [0u8; 32];
                let len = bytes.len().min(32);
                out[..len].copy_from_slice(&bytes[..len]);
                Ok(out)
            }
            other => Err(Error::TypedDataError(format!(
                "unsupported EIP-712 field type: {}",
                other
            ))),
        }
    }
}

/// Signs a dynamic `eth_signTypedData_v4` JSON payload.
pub fn sign_typed_data_v4_json(account: &PrivateKeyAccount, json: &str) -> Result<Signature> {
    let typed_data = TypedData::from_json(json)?;
    let hash = typed_data.hash()?;
    account.sign_hash(&hash)
}

/// Verifies a dynamic `eth_signTypedData_v4` JSON payload's signature.
pub fn verify_typed_data_v4_json(
    json: &str,
    signature: &Signature,
    expected_signer: Address,
) -> Result<bool> {
    let typed_data = TypedData::from_json(json)?;
    let hash = typed_data.hash()?;
    let recovered = account::recover_signer(&hash, signature)?;
    Ok(recovered == expected_signer)
}
