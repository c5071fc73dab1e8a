//! Per-call parameters for `scan create`.
//!
//! Each [`ParamKind`] maps to a fixed [`FlagRule`] through a declarative table, so
//! the flag spelling on the command line never depends on how a Rust identifier
//! happens to be spelled.

use tracing::debug;

/// How a parameter kind is rendered on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagRule {
    /// `-x value`
    Short(char),
    /// `--name value`
    Long(&'static str),
    /// Raw shell-like text, tokenized and spliced in verbatim.
    Raw,
}

impl FlagRule {
    /// Render the flag token, or `None` for raw parameters.
    pub fn flag(self) -> Option<String> {
        match self {
            FlagRule::Short(c) => Some(format!("-{}", c)),
            FlagRule::Long(name) => Some(format!("--{}", name)),
            FlagRule::Raw => None,
        }
    }
}

/// Closed set of parameters accepted by `scan create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Source directory, zip file or repository URL (`-s`).
    Source,
    /// Verbose CLI logging (`-v`).
    Verbose,
    ProjectName,
    ScanTypes,
    SastPresetName,
    SastIncremental,
    SastFilter,
    KicsFilter,
    KicsPlatforms,
    ScaFilter,
    FileFilter,
    FileInclude,
    Agent,
    Branch,
    ProjectGroups,
    ProjectTags,
    ScanTags,
    ScaResolver,
    Tenant,
    /// Free-form extra arguments, e.g. `--nowait --debug`.
    AdditionalParameters,
}

impl ParamKind {
    /// Every kind, in declaration order.
    pub const ALL: &'static [ParamKind] = &[
        ParamKind::Source,
        ParamKind::Verbose,
        ParamKind::ProjectName,
        ParamKind::ScanTypes,
        ParamKind::SastPresetName,
        ParamKind::SastIncremental,
        ParamKind::SastFilter,
        ParamKind::KicsFilter,
        ParamKind::KicsPlatforms,
        ParamKind::ScaFilter,
        ParamKind::FileFilter,
        ParamKind::FileInclude,
        ParamKind::Agent,
        ParamKind::Branch,
        ParamKind::ProjectGroups,
        ParamKind::ProjectTags,
        ParamKind::ScanTags,
        ParamKind::ScaResolver,
        ParamKind::Tenant,
        ParamKind::AdditionalParameters,
    ];

    /// The rendering rule for this kind.
    pub fn rule(self) -> FlagRule {
        match self {
            ParamKind::Source => FlagRule::Short('s'),
            ParamKind::Verbose => FlagRule::Short('v'),
            ParamKind::ProjectName => FlagRule::Long("project-name"),
            ParamKind::ScanTypes => FlagRule::Long("scan-types"),
            ParamKind::SastPresetName => FlagRule::Long("sast-preset-name"),
            ParamKind::SastIncremental => FlagRule::Long("sast-incremental"),
            ParamKind::SastFilter => FlagRule::Long("sast-filter"),
            ParamKind::KicsFilter => FlagRule::Long("kics-filter"),
            ParamKind::KicsPlatforms => FlagRule::Long("kics-platforms"),
            ParamKind::ScaFilter => FlagRule::Long("sca-filter"),
            ParamKind::FileFilter => FlagRule::Long("file-filter"),
            ParamKind::FileInclude => FlagRule::Long("file-include"),
            ParamKind::Agent => FlagRule::Long("agent"),
            ParamKind::Branch => FlagRule::Long("branch"),
            ParamKind::ProjectGroups => FlagRule::Long("project-groups"),
            ParamKind::ProjectTags => FlagRule::Long("project-tags"),
            ParamKind::ScanTags => FlagRule::Long("tags"),
            ParamKind::ScaResolver => FlagRule::Long("sca-resolver"),
            ParamKind::Tenant => FlagRule::Long("tenant"),
            ParamKind::AdditionalParameters => FlagRule::Raw,
        }
    }
}

/// Ordered mapping from parameter kind to value.
///
/// Iteration follows first-insertion order. Setting a kind again replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(ParamKind, String)>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, builder style.
    pub fn with(mut self, kind: ParamKind, value: impl Into<String>) -> Self {
        self.set(kind, value);
        self
    }

    /// Set a parameter.
    pub fn set(&mut self, kind: ParamKind, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((kind, value)),
        }
    }

    /// Get a parameter value.
    pub fn get(&self, kind: ParamKind) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamKind, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Render the set as argv entries.
    ///
    /// Empty values contribute nothing. Additional parameters are tokenized and
    /// appended verbatim at the position they occupy in the set.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (kind, value) in self.iter() {
            if value.is_empty() {
                continue;
            }
            match kind.rule().flag() {
                Some(flag) => {
                    args.push(flag);
                    args.push(value.to_string());
                }
                None => {
                    let tokens = tokenize_additional(value);
                    debug!(?tokens, "additional parameters refined");
                    args.extend(tokens);
                }
            }
        }
        args
    }
}

impl FromIterator<(ParamKind, String)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (ParamKind, String)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (kind, value) in iter {
            set.set(kind, value);
        }
        set
    }
}

/// Split a shell-like string into arguments.
///
/// # Rules
///
/// - Unquoted whitespace separates tokens
/// - A double-quoted segment keeps its whitespace; the quotes are dropped
/// - Quoted and unquoted text with no whitespace between them join into one token
/// - `""` on its own yields an empty token
///
/// No escapes, no single quotes, no variable expansion.
pub fn tokenize_additional(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        tokens.push(current);
    }

    tokens
}
