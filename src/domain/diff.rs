use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Unchanged,
}

impl ChangeKind {
    /// Classifies a diff line from its markers. `added` wins when both are present.
    pub fn classify(is_added: bool, is_removed: bool) -> Self {
        if is_added {
            ChangeKind::Added
        } else if is_removed {
            ChangeKind::Removed
        } else {
            ChangeKind::Unchanged
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            ChangeKind::Added => '+',
            ChangeKind::Removed => '-',
            ChangeKind::Unchanged => ' ',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLine {
    #[serde(alias = "type")]
    pub kind: ChangeKind,
    #[serde(alias = "content")]
    pub text: String,
}

impl ChangeLine {
    /// Trims `raw`; blank lines yield `None`.
    pub fn parse(kind: ChangeKind, raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            text: text.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    pub file_name: String,
    #[serde(alias = "changes")]
    pub lines: Vec<ChangeLine>,
}

impl FileDiff {
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.lines.iter().filter(|line| line.kind == kind).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub file_name: String,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ChangeSummary {
    pub fn from_file(file: &FileDiff) -> Self {
        let texts = |kind: ChangeKind| {
            file.lines
                .iter()
                .filter(|line| line.kind == kind)
                .map(|line| line.text.clone())
                .collect::<Vec<_>>()
        };

        Self {
            file_name: file.file_name.clone(),
            added: texts(ChangeKind::Added),
            removed: texts(ChangeKind::Removed),
        }
    }
}

pub fn summarize(files: &[FileDiff]) -> Vec<ChangeSummary> {
    files.iter().map(ChangeSummary::from_file).collect()
}

/// Reads a JSON array, dropping `null` entries.
pub fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Vec::<Option<T>>::deserialize(deserializer)?;
    Ok(entries.into_iter().flatten().collect())
}
