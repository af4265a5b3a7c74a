//! Dispatch errors reported by the runtime for an included extrinsic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index pair locating an error in the runtime metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleError {
    /// Pallet index in the runtime.
    pub index: u8,
    /// Encoded error; the first byte is the error variant within the pallet.
    pub error: [u8; 4],
}

impl ModuleError {
    pub fn new(index: u8, variant: u8) -> Self {
        Self {
            index,
            error: [variant, 0, 0, 0],
        }
    }

    /// Error variant index within the pallet.
    pub fn variant(&self) -> u8 {
        self.error[0]
    }
}

/// Reason an extrinsic's dispatch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "details", rename_all = "snake_case")]
pub enum DispatchError {
    /// A pallet returned one of its declared errors.
    Module(ModuleError),
    /// Untyped failure with a message.
    Other(String),
    CannotLookup,
    BadOrigin,
    ConsumerRemaining,
    NoProviders,
    TooManyConsumers,
    /// Token-level failure (funds, frozen, unknown asset).
    Token(String),
    /// Overflow, underflow or division by zero.
    Arithmetic(String),
    Exhausted,
    Corruption,
    Unavailable,
}

impl DispatchError {
    /// The module error, if this is one.
    pub fn as_module(&self) -> Option<&ModuleError> {
        match self {
            DispatchError::Module(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Module(m) => write!(
                f,
                "{{\"module\":{{\"index\":{},\"error\":\"0x{}\"}}}}",
                m.index,
                hex::encode(m.error)
            ),
            DispatchError::Other(msg) => write!(f, "Other: {}", msg),
            DispatchError::CannotLookup => write!(f, "CannotLookup"),
            DispatchError::BadOrigin => write!(f, "BadOrigin"),
            DispatchError::ConsumerRemaining => write!(f, "ConsumerRemaining"),
            DispatchError::NoProviders => write!(f, "NoProviders"),
            DispatchError::TooManyConsumers => write!(f, "TooManyConsumers"),
            DispatchError::Token(t) => write!(f, "Token: {}", t),
            DispatchError::Arithmetic(a) => write!(f, "Arithmetic: {}", a),
            DispatchError::Exhausted => write!(f, "Exhausted"),
            DispatchError::Corruption => write!(f, "Corruption"),
            DispatchError::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// Metadata entry describing a module error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleErrorMeta {
    /// Pallet name, e.g. `settlementGroth16Pallet`.
    pub section: String,
    /// Error variant name, e.g. `InvalidProof`.
    pub name: String,
    /// Doc lines attached to the variant.
    #[serde(default)]
    pub docs: Vec<String>,
}

/// A dispatch error translated into something a human can act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedDispatchError {
    /// Resolved against runtime metadata.
    Module {
        section: String,
        name: String,
        docs: Vec<String>,
    },
    /// Anything that is not a module error, or could not be resolved.
    Other { message: String },
}

impl From<ModuleErrorMeta> for DecodedDispatchError {
    fn from(meta: ModuleErrorMeta) -> Self {
        DecodedDispatchError::Module {
            section: meta.section,
            name: meta.name,
            docs: meta.docs,
        }
    }
}

impl fmt::Display for DecodedDispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedDispatchError::Module {
                section,
                name,
                docs,
            } => write!(f, "{}.{}: {}", section, name, docs.join(" ")),
            DecodedDispatchError::Other { message } => write!(f, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoded_module_error_format() {
        let decoded = DecodedDispatchError::from(ModuleErrorMeta {
            section: "settlementFFlonkPallet".into(),
            name: "VerifyError".into(),
            docs: vec!["Provided data has not valid".into(), "proof.".into()],
        });
        assert_eq!(
            decoded.to_string(),
            "settlementFFlonkPallet.VerifyError: Provided data has not valid proof."
        );
    }

    #[test]
    fn test_module_error_json() {
        let err: DispatchError =
            serde_json::from_str(r#"{"kind": "module", "details": {"index": 9, "error": [2, 0, 0, 0]}}"#)
                .unwrap();
        assert_eq!(err.as_module(), Some(&ModuleError::new(9, 2)));
        assert_eq!(err.to_string(), r#"{"module":{"index":9,"error":"0x02000000"}}"#);

        let err: DispatchError = serde_json::from_str(r#"{"kind": "bad_origin"}"#).unwrap();
        assert_eq!(err, DispatchError::BadOrigin);
        assert!(err.as_module().is_none());
    }
}
