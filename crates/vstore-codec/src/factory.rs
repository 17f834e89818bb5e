use std::sync::Arc;

use serde_json::{Map, Value};
use vstore_types::{Resource, SchemaVersion, TypeMeta};

use crate::error::{CodecError, CodecResult};
use crate::scheme::Scheme;

/// Media type of the JSON document format.
pub const MEDIA_TYPE_JSON: &str = "application/json";

const SUPPORTED_MEDIA_TYPES: &[&str] = &[MEDIA_TYPE_JSON];

/// A serializer selected by media type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializerInfo {
    /// Canonical media type.
    pub media_type: &'static str,
    /// Indent output for human readers.
    pub pretty: bool,
}

impl SerializerInfo {
    /// The same serializer with indented output.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

/// Entry point to the codec: serializer lookup, encoder construction, and
/// version-detecting decode, all against one [`Scheme`].
#[derive(Clone, Debug)]
pub struct CodecFactory {
    scheme: Arc<Scheme>,
}

impl CodecFactory {
    /// A factory over `scheme`.
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme: Arc::new(scheme),
        }
    }

    /// The scheme this factory encodes and decodes against.
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Media types a serializer exists for.
    pub fn supported_media_types(&self) -> &'static [&'static str] {
        SUPPORTED_MEDIA_TYPES
    }

    /// Find the serializer for `media_type`. Parameters such as
    /// `; charset=utf-8` are ignored and matching is case-insensitive.
    pub fn serializer_for_media_type(&self, media_type: &str) -> Option<SerializerInfo> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        SUPPORTED_MEDIA_TYPES
            .iter()
            .find(|supported| **supported == essence)
            .map(|supported| SerializerInfo {
                media_type: *supported,
                pretty: false,
            })
    }

    /// An encoder that writes every document at `version`.
    pub fn encoder_for_version(&self, serializer: SerializerInfo, version: SchemaVersion) -> Encoder {
        Encoder {
            scheme: Arc::clone(&self.scheme),
            serializer,
            version,
        }
    }

    /// Read just the `apiVersion`/`kind` header of a document.
    pub fn decode_type_meta(&self, data: &[u8]) -> CodecResult<TypeMeta> {
        let mut body = parse_object(data)?;
        let (api_version, kind) = take_header(&mut body)?;
        Ok(TypeMeta { api_version, kind })
    }

    /// Decode a document into `T`, detecting its schema version from the
    /// embedded header and upgrading it to `T`'s hub version.
    ///
    /// Returns the decoded object and the version the document was stored in.
    /// Fails with [`CodecError::KindMismatch`] if the document holds some
    /// other registered kind.
    pub fn decode<T: Resource>(&self, data: &[u8]) -> CodecResult<(T, SchemaVersion)> {
        let mut body = parse_object(data)?;
        let (api_version, kind) = take_header(&mut body)?;
        let version = SchemaVersion::parse_api_version(&api_version)?;

        let registration = self.scheme.kind(&kind)?;
        if kind != T::KIND {
            return Err(CodecError::KindMismatch {
                expected: T::KIND.to_string(),
                found: kind,
            });
        }
        if !registration.recognizes(&version) {
            return Err(CodecError::UnknownVersion { kind, version });
        }

        self.scheme.upgrade(&kind, &version, &mut body)?;
        let object = serde_json::from_value(Value::Object(body))
            .map_err(|e| CodecError::Deserialization(e.to_string()))?;
        Ok((object, version))
    }
}

impl Default for CodecFactory {
    fn default() -> Self {
        Self::new(Scheme::default())
    }
}

/// Serializes resources at one fixed schema version.
///
/// Whatever version an object was read from, an encoder writes it back at
/// its own version, so stored documents converge on one layout.
#[derive(Clone, Debug)]
pub struct Encoder {
    scheme: Arc<Scheme>,
    serializer: SerializerInfo,
    version: SchemaVersion,
}

impl Encoder {
    /// The schema version this encoder writes.
    pub fn version(&self) -> &SchemaVersion {
        &self.version
    }

    /// The serializer in use.
    pub fn serializer(&self) -> &SerializerInfo {
        &self.serializer
    }

    /// Encode `object` as a self-describing document.
    pub fn encode<T: Resource>(&self, object: &T) -> CodecResult<Vec<u8>> {
        let registration = self.scheme.kind(T::KIND)?;
        if !registration.recognizes(&self.version) {
            return Err(CodecError::UnknownVersion {
                kind: T::KIND.to_string(),
                version: self.version.clone(),
            });
        }

        let mut body = match serde_json::to_value(object) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(CodecError::Serialization(format!(
                    "{} serialized to {}, expected an object",
                    T::KIND,
                    json_type_name(&other)
                )))
            }
            Err(e) => return Err(CodecError::Serialization(e.to_string())),
        };
        body.remove("apiVersion");
        body.remove("kind");
        self.scheme.downgrade(T::KIND, &self.version, &mut body)?;

        let mut document = Map::with_capacity(body.len() + 2);
        document.insert("apiVersion".into(), Value::String(self.version.api_version()));
        document.insert("kind".into(), Value::String(T::KIND.to_string()));
        document.extend(body);
        let document = Value::Object(document);

        let encoded = if self.serializer.pretty {
            serde_json::to_vec_pretty(&document)
        } else {
            serde_json::to_vec(&document)
        };
        encoded.map_err(|e| CodecError::Serialization(e.to_string()))
    }
}

fn parse_object(data: &[u8]) -> CodecResult<Map<String, Value>> {
    match serde_json::from_slice::<Value>(data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CodecError::Syntax(format!(
            "expected an object, found {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(CodecError::Syntax(e.to_string())),
    }
}

fn take_header(body: &mut Map<String, Value>) -> CodecResult<(String, String)> {
    let api_version = take_string(body, "apiVersion")?;
    let kind = take_string(body, "kind")?;
    Ok((api_version, kind))
}

fn take_string(body: &mut Map<String, Value>, field: &'static str) -> CodecResult<String> {
    match body.remove(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        _ => Err(CodecError::MissingTypeMeta(field)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
