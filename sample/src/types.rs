//! Response DTOs for the httpbin endpoints the sample calls.
//!
//! Only the fields the sample prints are declared; serde ignores the rest.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetResponse {
    pub origin: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Named {
    #[serde(default)]
    pub name: String,
}

/// httpbin only fills `form` for form-encoded bodies; a JSON POST gets `{}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostResponse {
    #[serde(default)]
    pub form: Named,
}

/// httpbin puts the raw request body in `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PutResponse {
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    pub origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchResponse {
    pub json: Named,
}
