//! Serde helpers for secret token fields.
//!
//! `SecretString` deliberately has no `Serialize` impl; tokens that must
//! travel over the wire opt in field by field with
//! `#[serde(with = "secret")]`.

use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize as _, Deserializer, Serializer};

/// Serializes the exposed secret as a plain JSON string.
pub(crate) fn serialize<S: Serializer>(
    secret: &SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Deserializes a plain JSON string into a [`SecretString`].
pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}
