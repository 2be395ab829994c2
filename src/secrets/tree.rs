//! Leaf-wise encryption of JSON value trees.

use super::crypto::{CryptoResult, SecretCodec};
use serde_json::{Map, Value};

/// Encrypt every string leaf of `value`.
///
/// Numbers, booleans and null are kept as they are; arrays are walked
/// element by element and object keys are never touched.
pub fn encrypt_leaves(codec: &SecretCodec, value: &Value) -> CryptoResult<Value> {
    map_strings(value, &mut |s| codec.encrypt(s))
}

/// Reverse of [`encrypt_leaves`]. Fails on the first leaf that is not a valid token.
pub fn decrypt_leaves(codec: &SecretCodec, value: &Value) -> CryptoResult<Value> {
    map_strings(value, &mut |s| codec.decrypt(s))
}

fn map_strings<F>(value: &Value, f: &mut F) -> CryptoResult<Value>
where
    F: FnMut(&str) -> CryptoResult<String>,
{
    Ok(match value {
        Value::String(s) => Value::String(f(s)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| map_strings(item, f))
                .collect::<CryptoResult<Vec<_>>>()?,
        ),
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, field) in fields {
                out.insert(key.clone(), map_strings(field, f)?);
            }
            Value::Object(out)
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::crypto::{looks_like_token, CryptoError, EncryptionKey};
    use serde_json::json;

    #[test]
    fn test_nested_leaves() {
        let codec = SecretCodec::new(&EncryptionKey::generate());
        let plain = json!({"a": "secret1", "b": {"c": "secret2", "d": 5}});

        let encrypted = encrypt_leaves(&codec, &plain).unwrap();
        assert!(looks_like_token(encrypted["a"].as_str().unwrap()));
        assert!(looks_like_token(encrypted["b"]["c"].as_str().unwrap()));
        assert_ne!(encrypted["a"], "secret1");
        assert_eq!(encrypted["b"]["d"], 5);

        assert_eq!(decrypt_leaves(&codec, &encrypted).unwrap(), plain);
    }

    #[test]
    fn test_arrays_and_scalars() {
        let codec = SecretCodec::new(&EncryptionKey::generate());
        let plain = json!({"list": ["x", 1, true, null, {"y": "z"}], "flag": false});

        let encrypted = encrypt_leaves(&codec, &plain).unwrap();
        assert!(looks_like_token(encrypted["list"][0].as_str().unwrap()));
        assert_eq!(encrypted["list"][1], 1);
        assert_eq!(encrypted["list"][2], true);
        assert!(encrypted["list"][3].is_null());
        assert!(looks_like_token(encrypted["list"][4]["y"].as_str().unwrap()));
        assert_eq!(encrypted["flag"], false);

        assert_eq!(decrypt_leaves(&codec, &encrypted).unwrap(), plain);
    }

    #[test]
    fn test_plaintext_leaf_fails_decryption() {
        let codec = SecretCodec::new(&EncryptionKey::generate());
        let mut encrypted = encrypt_leaves(&codec, &json!({"a": "x", "b": "y"})).unwrap();
        encrypted["b"] = json!("not-a-token");

        assert!(matches!(
            decrypt_leaves(&codec, &encrypted),
            Err(CryptoError::MalformedToken(_))
        ));
    }
}
