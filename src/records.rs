//! Typed records decoded from the executable's JSON output.
//!
//! Field names follow the executable's own key spelling. Unknown keys are ignored
//! and absent keys default, so newer executables with extra fields still decode.
//! Collections also accept `null`, which the executable emits for empty lists and maps.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;

/// Result shape discriminator: which record type a command's output decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Scan,
    Project,
    Predicate,
    BestFixLocation,
    CodeBashing,
    KicsRealtime,
    LearnMoreDescriptions,
    Results,
}

impl ResultKind {
    pub const ALL: &'static [ResultKind] = &[
        ResultKind::Scan,
        ResultKind::Project,
        ResultKind::Predicate,
        ResultKind::BestFixLocation,
        ResultKind::CodeBashing,
        ResultKind::KicsRealtime,
        ResultKind::LearnMoreDescriptions,
        ResultKind::Results,
    ];

    /// The wire tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            ResultKind::Scan => "CxScan",
            ResultKind::Project => "CxProject",
            ResultKind::Predicate => "CxPredicate",
            ResultKind::BestFixLocation => "CxBFL",
            ResultKind::CodeBashing => "CxCodeBashing",
            ResultKind::KicsRealtime => "CxKicsRealTime",
            ResultKind::LearnMoreDescriptions => "CxLearnMoreDescriptions",
            ResultKind::Results => "CxResults",
        }
    }

    /// Look up a kind by wire tag. Unknown tags yield `None` (raw text output).
    pub fn from_tag(tag: &str) -> Option<ResultKind> {
        ResultKind::ALL.iter().copied().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A scan, as reported by `scan create|cancel|show|list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Scan {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "ProjectID")]
    pub project_id: String,
    pub project_name: String,
    /// `Queued`, `Running`, `Completed`, `Failed`, `Canceled`, ...
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_details: Vec<StatusDetail>,
    pub branch: String,
    pub created_at: String,
    pub updated_at: String,
    pub origin: String,
    pub initiator: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub engines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusDetail {
    pub name: String,
    pub status: String,
    pub details: String,
}

/// A project, as reported by `project list|show`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Project {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub groups: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: BTreeMap<String, String>,
}

/// One triage history entry, as reported by `triage show`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Predicate {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "SimilarityID", deserialize_with = "string_or_number")]
    pub similarity_id: String,
    #[serde(rename = "ProjectID")]
    pub project_id: String,
    pub state: String,
    pub severity: String,
    pub comment: String,
    pub created_by: String,
    pub created_at: String,
}

/// A codebashing lesson link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodeBashingLink {
    pub cwe_id: String,
    pub language: String,
    pub query_name: String,
    pub path: String,
}

/// Output of `scan kics-realtime`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KicsRealtimeResults {
    #[serde(alias = "queries", deserialize_with = "null_as_default")]
    pub results: Vec<KicsQueryResult>,
    #[serde(alias = "total_counter")]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KicsQueryResult {
    pub query_name: String,
    pub query_id: String,
    pub severity: String,
    pub platform: String,
    pub category: String,
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub files: Vec<KicsFileLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KicsFileLocation {
    pub file_name: String,
    pub similarity_id: String,
    pub line: u64,
    pub issue_type: String,
    pub search_key: String,
    pub expected_value: String,
    pub actual_value: String,
}

/// Query documentation, as reported by `utils learn-more`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearnMoreDescription {
    #[serde(deserialize_with = "string_or_number")]
    pub query_id: String,
    pub query_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub query_description_id: String,
    pub result_description: String,
    pub risk: String,
    pub cause: String,
    pub general_recommendations: String,
    #[serde(deserialize_with = "null_as_default")]
    pub samples: Vec<LearnMoreSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearnMoreSample {
    pub prog_language: String,
    pub code: String,
    pub title: String,
}

/// The results document written by `result show --report-format json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanResults {
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<ScanResult>,
    pub total_count: u64,
    #[serde(rename = "scanID")]
    pub scan_id: String,
}

/// One finding in a results document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanResult {
    /// Engine type: `sast`, `sca`, `kics`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub similarity_id: String,
    pub status: String,
    pub state: String,
    pub severity: String,
    pub created: String,
    pub first_found_at: String,
    pub found_at: String,
    pub first_scan_id: String,
    pub description: String,
    pub data: ResultData,
    /// Engine-specific extras, kept undecoded.
    pub vulnerability_details: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultData {
    #[serde(deserialize_with = "string_or_number")]
    pub query_id: String,
    pub query_name: String,
    pub group: String,
    pub result_hash: String,
    pub language_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub nodes: Vec<ResultNode>,
}

/// A node on a finding's data-flow path.
///
/// Structurally comparable with [`BflNode`](crate::BflNode) through [`NodeLocation`](crate::NodeLocation).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultNode {
    pub id: String,
    pub line: u64,
    pub column: u64,
    pub length: u64,
    pub name: String,
    pub method: String,
    #[serde(rename = "nodeID")]
    pub node_id: u64,
    pub dom_type: String,
    pub file_name: String,
    pub full_name: String,
    pub type_name: String,
    pub method_line: u64,
}

/// Treat `null` like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept `"123"`, `123` or `null` and keep the textual form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Text(s) => s,
        Repr::Number(n) => n.to_string(),
        Repr::Null => String::new(),
    })
}
