//! Client principal decoding
//!
//! The authentication proxy in front of this service forwards the caller's
//! identity as `x-ms-client-principal`: base64 of a UTF-8 JSON object. The
//! service never validates it; it only decodes and echoes it.

mod error;

use std::collections::BTreeMap;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use hyper::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use error::DecodeError;

/// Header carrying the encoded principal
pub const CLIENT_PRINCIPAL_HEADER: &str = "x-ms-client-principal";

/// Prefix shared by every header the platform injects
pub const PLATFORM_HEADER_PREFIX: &str = "x-ms-";

const LENIENT_PADDING: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_PADDING);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_PADDING);

/// Decoded identity claim set.
///
/// Any JSON object is accepted and kept as sent, member types and explicit
/// `null`s included. The well-known members are read through accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientPrincipal(Map<String, Value>);

impl ClientPrincipal {
    pub const USER_ID: &'static str = "userId";
    pub const USER_DETAILS: &'static str = "userDetails";
    pub const IDENTITY_PROVIDER: &'static str = "identityProvider";
    pub const CLAIMS: &'static str = "claims";

    /// Decode the principal header of a request, if any
    pub fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, DecodeError> {
        decode_client_principal(headers.get(CLIENT_PRINCIPAL_HEADER).map(HeaderValue::as_bytes))
    }

    pub fn get(&self, member: &str) -> Option<&Value> {
        self.0.get(member)
    }

    pub fn user_id(&self) -> Option<&Value> {
        self.get(Self::USER_ID)
    }

    pub fn user_details(&self) -> Option<&Value> {
        self.get(Self::USER_DETAILS)
    }

    pub fn identity_provider(&self) -> Option<&Value> {
        self.get(Self::IDENTITY_PROVIDER)
    }

    pub fn claims(&self) -> Option<&Value> {
        self.get(Self::CLAIMS)
    }
}

/// Decode a base64 JSON principal.
///
/// An absent or blank value means "no identity" and is not an error.
pub fn decode_client_principal(
    encoded: Option<&[u8]>,
) -> Result<Option<ClientPrincipal>, DecodeError> {
    let Some(encoded) = encoded.map(<[u8]>::trim_ascii).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    // Report the standard-alphabet error when both alphabets reject the input
    let bytes = STANDARD_LENIENT
        .decode(encoded)
        .or_else(|err| URL_SAFE_LENIENT.decode(encoded).map_err(|_| err))?;
    let text = String::from_utf8(bytes)?;
    let principal = serde_json::from_str(&text)?;

    Ok(Some(principal))
}

/// Whether the request carries a non-empty principal header (not decoded)
pub fn has_client_principal(headers: &HeaderMap) -> bool {
    headers
        .get(CLIENT_PRINCIPAL_HEADER)
        .is_some_and(|v| !v.is_empty())
}

/// Collect every platform-injected header, name to value.
///
/// Repeated headers are joined with `", "`.
pub fn platform_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .filter(|name| name.as_str().starts_with(PLATFORM_HEADER_PREFIX))
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()))
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_string(), joined)
        })
        .collect()
}
