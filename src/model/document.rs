// Artifacts attached to a case: uploaded files, generated documents, signatures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of generated document a claimant signs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Consent,
    Contract,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Consent => "consent",
            DocumentKind::Contract => "contract",
        }
    }

    /// Case field holding the stored document path
    pub fn document_field(&self) -> &'static str {
        match self {
            DocumentKind::Consent => "consentForm",
            DocumentKind::Contract => "contract",
        }
    }

    /// Case field holding the captured signature
    pub fn signature_field(&self) -> &'static str {
        match self {
            DocumentKind::Consent => "signature",
            DocumentKind::Contract => "contractSignature",
        }
    }

    pub fn signature_date_field(&self) -> &'static str {
        match self {
            DocumentKind::Consent => "consentSignatureDate",
            DocumentKind::Contract => "contractSignatureDate",
        }
    }

    pub fn signed_flag_field(&self) -> &'static str {
        match self {
            DocumentKind::Consent => "consentSigned",
            DocumentKind::Contract => "contractSigned",
        }
    }

    /// Public signing page for a case, e.g. `https://host/consentDigitalSignature/abc`
    pub fn signing_link(&self, public_url: &str, case_id: &str) -> String {
        format!(
            "{}/{}DigitalSignature/{}",
            public_url.trim_end_matches('/'),
            self.as_str(),
            case_id
        )
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "consent" => Ok(DocumentKind::Consent),
            "contract" => Ok(DocumentKind::Contract),
            other => Err(format!("unknown document kind '{other}' (expected consent or contract)")),
        }
    }
}

/// An uploaded file in the case's file bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A claimant's signature, either drawn on the signing page or typed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signature {
    Drawn {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
    Typed {
        name: String,
    },
}

impl Signature {
    pub fn is_blank(&self) -> bool {
        match self {
            Signature::Drawn { image_url } => image_url.trim().is_empty(),
            Signature::Typed { name } => name.trim().is_empty(),
        }
    }
}
