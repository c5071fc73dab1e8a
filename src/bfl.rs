//! Best-fix-location matching.
//!
//! `result bfl` returns the authoritative best-fix-location nodes for a query.
//! Callers already hold their own node list (usually a finding's data-flow path);
//! [`find_index`] reports which of the caller's nodes is the best place to fix.

use crate::records::ResultNode;
use serde::Deserialize;

/// Sentinel index reported when no caller node matches.
pub const BFL_NOT_FOUND: i64 = -1;

/// The nine structural fields that identify a code node.
///
/// Two nodes are the same location iff their keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey<'a> {
    pub line: u64,
    pub column: u64,
    pub length: u64,
    pub name: &'a str,
    pub method: &'a str,
    pub dom_type: &'a str,
    pub file_name: &'a str,
    pub full_name: &'a str,
    pub method_line: u64,
}

/// Anything that describes a code node location.
pub trait NodeLocation {
    fn node_key(&self) -> NodeKey<'_>;

    /// Exact structural equality over all nine fields.
    fn same_location<O: NodeLocation + ?Sized>(&self, other: &O) -> bool {
        self.node_key() == other.node_key()
    }
}

/// A best-fix-location node, as reported by `result bfl`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BflNode {
    pub line: u64,
    pub column: u64,
    pub length: u64,
    pub name: String,
    pub method: String,
    pub dom_type: String,
    pub file_name: String,
    pub full_name: String,
    pub method_line: u64,
    #[serde(rename = "nodeID")]
    pub node_id: u64,
    pub type_name: String,
}

impl NodeLocation for BflNode {
    fn node_key(&self) -> NodeKey<'_> {
        NodeKey {
            line: self.line,
            column: self.column,
            length: self.length,
            name: &self.name,
            method: &self.method,
            dom_type: &self.dom_type,
            file_name: &self.file_name,
            full_name: &self.full_name,
            method_line: self.method_line,
        }
    }
}

impl NodeLocation for ResultNode {
    fn node_key(&self) -> NodeKey<'_> {
        NodeKey {
            line: self.line,
            column: self.column,
            length: self.length,
            name: &self.name,
            method: &self.method,
            dom_type: &self.dom_type,
            file_name: &self.file_name,
            full_name: &self.full_name,
            method_line: self.method_line,
        }
    }
}

impl<T: NodeLocation + ?Sized> NodeLocation for &T {
    fn node_key(&self) -> NodeKey<'_> {
        (**self).node_key()
    }
}

/// Position in `candidates` of the earliest match.
///
/// Authoritative nodes are tried in order; for each, candidates are scanned in
/// order and the first structural match wins.
pub fn find_index<A, C>(authoritative: &[A], candidates: &[C]) -> Option<usize>
where
    A: NodeLocation,
    C: NodeLocation,
{
    authoritative.iter().find_map(|bfl| {
        let key = bfl.node_key();
        candidates.iter().position(|c| c.node_key() == key)
    })
}

/// [`find_index`] with the miss reported as [`BFL_NOT_FOUND`].
pub fn find_index_or_sentinel<A, C>(authoritative: &[A], candidates: &[C]) -> i64
where
    A: NodeLocation,
    C: NodeLocation,
{
    find_index(authoritative, candidates)
        .and_then(|i| i64::try_from(i).ok())
        .unwrap_or(BFL_NOT_FOUND)
}
