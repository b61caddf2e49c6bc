use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the seller store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SellerId(pub String);

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted approval status. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SellerStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SellerStatus::Pending => "pending",
            SellerStatus::Accepted => "accepted",
            SellerStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, SellerStatus::Accepted | SellerStatus::Rejected)
    }
}

impl fmt::Display for SellerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SellerStatus {
    type Err = UnknownValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SellerStatus::Pending),
            "accepted" => Ok(SellerStatus::Accepted),
            "rejected" => Ok(SellerStatus::Rejected),
            _ => Err(UnknownValue {
                kind: "seller status",
                value: raw.to_string(),
            }),
        }
    }
}

/// Compliance documents every seller has to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequirementKind {
    BarangayClearance,
    BusinessPermit,
    IdProof,
}

impl RequirementKind {
    pub const ALL: [RequirementKind; 3] = [
        RequirementKind::BarangayClearance,
        RequirementKind::BusinessPermit,
        RequirementKind::IdProof,
    ];

    /// Wire key used inside the encoded requirements object and in URLs.
    pub const fn key(self) -> &'static str {
        match self {
            RequirementKind::BarangayClearance => "barangayClearance",
            RequirementKind::BusinessPermit => "businessPermit",
            RequirementKind::IdProof => "idProof",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RequirementKind::BarangayClearance => "Barangay Clearance",
            RequirementKind::BusinessPermit => "Business Permit",
            RequirementKind::IdProof => "Valid ID",
        }
    }
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RequirementKind {
    type Err = UnknownValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "barangayclearance" | "clearance" => Ok(RequirementKind::BarangayClearance),
            "businesspermit" | "permit" => Ok(RequirementKind::BusinessPermit),
            "idproof" | "id" | "validid" => Ok(RequirementKind::IdProof),
            _ => Err(UnknownValue {
                kind: "requirement",
                value: raw.to_string(),
            }),
        }
    }
}

/// Raised when a status or requirement name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

/// The three requirement flags. Missing keys decode as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Requirements {
    pub barangay_clearance: bool,
    pub business_permit: bool,
    pub id_proof: bool,
}

impl Requirements {
    pub const fn all_submitted() -> Self {
        Self {
            barangay_clearance: true,
            business_permit: true,
            id_proof: true,
        }
    }

    pub fn get(&self, kind: RequirementKind) -> bool {
        match kind {
            RequirementKind::BarangayClearance => self.barangay_clearance,
            RequirementKind::BusinessPermit => self.business_permit,
            RequirementKind::IdProof => self.id_proof,
        }
    }

    pub fn set(&mut self, kind: RequirementKind, value: bool) {
        match kind {
            RequirementKind::BarangayClearance => self.barangay_clearance = value,
            RequirementKind::BusinessPermit => self.business_permit = value,
            RequirementKind::IdProof => self.id_proof = value,
        }
    }

    /// Compliance requires every flag, not a majority.
    pub fn is_complete(&self) -> bool {
        self.barangay_clearance && self.business_permit && self.id_proof
    }

    pub fn missing(&self) -> Vec<RequirementKind> {
        RequirementKind::ALL
            .into_iter()
            .filter(|kind| !self.get(*kind))
            .collect()
    }

    /// Encode to the JSON string stored by the seller store.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::default());
        }
        serde_json::from_str(trimmed)
    }
}

/// Serde adapter for the JSON-encoded `requirements` column.
pub mod encoded_requirements {
    use super::Requirements;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Encoded {
        Text(String),
        Object(Requirements),
        Missing(()),
    }

    pub fn serialize<S>(requirements: &Requirements, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded = requirements.encode().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Requirements, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Encoded::deserialize(deserializer)? {
            Encoded::Text(raw) => Requirements::decode(&raw).map_err(serde::de::Error::custom),
            Encoded::Object(requirements) => Ok(requirements),
            Encoded::Missing(()) => Ok(Requirements::default()),
        }
    }
}

/// Serde adapter accepting RFC 3339 or `YYYY-MM-DD HH:MM:SS` (UTC) timestamps.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        let trimmed = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
            .map(|naive| naive.and_utc())
            .map_err(|err| format!("failed to parse '{raw}' as a timestamp ({err})"))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Uploaded document backing a requirement flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementFile {
    pub requirement: RequirementKind,
    pub file_name: String,
    pub content_type: String,
    #[serde(with = "timestamp")]
    pub uploaded_at: DateTime<Utc>,
}

/// Seller record as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRecord {
    pub id: SellerId,
    pub unique_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub status: SellerStatus,
    #[serde(with = "encoded_requirements", default)]
    pub requirements: Requirements,
    #[serde(default)]
    pub files: Vec<RequirementFile>,
    #[serde(with = "timestamp")]
    pub date_added: DateTime<Utc>,
}

impl SellerRecord {
    pub fn file_for(&self, kind: RequirementKind) -> Option<&RequirementFile> {
        self.files.iter().find(|file| file.requirement == kind)
    }

    pub fn has_file(&self, kind: RequirementKind) -> bool {
        self.file_for(kind).is_some()
    }
}

/// Registration payload for a new seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSeller {
    pub name: String,
    pub email: String,
}

/// Human-facing seller code, e.g. `SELLER-1718000000000`.
pub fn unique_id_for(created_at: DateTime<Utc>) -> String {
    format!("SELLER-{}", created_at.timestamp_millis())
}

/// Body of `PUT /api/sellers/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: SellerStatus,
}

/// Body of `PUT /api/sellers/{id}/requirements`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsUpdate {
    #[serde(with = "encoded_requirements")]
    pub requirements: Requirements,
}

/// Body of `POST /api/sellers/{id}/files/{requirement}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
}
