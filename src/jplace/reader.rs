//! Reader for jplace version 3 documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::jplace::JPLACE_VERSION;
use crate::newick::NewickParser;
use crate::parser::{ParseError, ParseErrorKind};
use crate::placement::pquery::{Pquery, PqueryName, PqueryPlacement};
use crate::placement::sample::Sample;

// =#========================================================================#=
// DOCUMENT SHAPE
// =#========================================================================#=
#[derive(Deserialize)]
struct Document {
    version: Value,
    tree: String,
    placements: Vec<Entry>,
    fields: Vec<String>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct Entry {
    p: Vec<Vec<f64>>,
    #[serde(default)]
    n: Option<Vec<String>>,
    #[serde(default)]
    nm: Option<Vec<(String, f64)>>,
}

/// One column of a placement row, as named by the `fields` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    EdgeNum,
    Likelihood,
    LikeWeightRatio,
    DistalLength,
    ProximalLength,
    PendantLength,
    Parsimony,
    /// A field name this reader does not know; its column is skipped.
    Ignored,
}

impl Field {
    fn from_name(name: &str) -> Field {
        match name {
            "edge_num" => Field::EdgeNum,
            "likelihood" => Field::Likelihood,
            "like_weight_ratio" => Field::LikeWeightRatio,
            "distal_length" => Field::DistalLength,
            "proximal_length" => Field::ProximalLength,
            "pendant_length" => Field::PendantLength,
            "parsimony" => Field::Parsimony,
            _ => Field::Ignored,
        }
    }
}

// =#========================================================================#=
// JPLACE READER
// =#========================================================================#=
/// Reads jplace version 3 documents into [Sample] objects.
///
/// # Example
/// ```
/// use phylomass::jplace::JplaceReader;
///
/// let doc = r#"{
///     "version": 3,
///     "tree": "((A:1{0},B:1{1}):1{2},C:2{3}):0{4};",
///     "placements": [
///         {"p": [[0, -120.5, 1.0, 0.5, 0.1]], "n": ["read_1"]}
///     ],
///     "fields": ["edge_num", "likelihood", "like_weight_ratio",
///                "distal_length", "pendant_length"],
///     "metadata": {}
/// }"#;
///
/// let sample = JplaceReader::new().from_string(doc).unwrap();
/// assert_eq!(sample.pquery_count(), 1);
/// assert_eq!(sample.placement_count(), 1);
/// ```
pub struct JplaceReader {}

impl JplaceReader {
    pub fn new() -> Self {
        Self {}
    }

    /// Reads a jplace document from a file.
    ///
    /// # Errors
    /// Fails on IO errors and on everything [from_string](Self::from_string)
    /// fails on.
    pub fn from_file(&self, path: &Path) -> Result<Sample, ParseError> {
        let content = fs::read_to_string(path)?;
        self.from_string(&content)
    }

    /// Reads a jplace document from a string.
    ///
    /// # Errors
    /// Fails on malformed JSON, an unsupported version, an invalid
    /// `fields` array, a malformed placement row, or an `edge_num` absent
    /// from the tree.
    pub fn from_string(&self, input: &str) -> Result<Sample, ParseError> {
        let doc: Document = serde_json::from_str(input)?;

        check_version(&doc.version)?;
        let fields = check_fields(&doc.fields)?;

        let tree = NewickParser::new().parse(&doc.tree)?;
        let mut sample = Sample::new(tree);

        for entry in doc.placements {
            let pquery = self.parse_entry(&sample, &fields, entry)?;
            sample.add_pquery(pquery)?;
        }

        for (key, value) in doc.metadata {
            match value {
                Value::String(s) => sample.set_metadata(&key, &s),
                other => {
                    tracing::warn!(key = %key, "ignoring non-string metadata value {}", other);
                }
            }
        }

        Ok(sample)
    }

    fn parse_entry(
        &self,
        sample: &Sample,
        fields: &[Field],
        entry: Entry,
    ) -> Result<Pquery, ParseError> {
        let invalid = |message: String| {
            ParseError::without_context(ParseErrorKind::InvalidJplaceDocument(message))
        };

        let mut placements = Vec::with_capacity(entry.p.len());
        for row in &entry.p {
            if row.len() != fields.len() {
                return Err(invalid(format!(
                    "placement row has {} values but the fields array names {}",
                    row.len(),
                    fields.len()
                )));
            }

            let mut placement = PqueryPlacement::default();
            let mut proximal = None;
            for (&field, &value) in fields.iter().zip(row) {
                match field {
                    Field::EdgeNum => placement.edge_num = value as i64,
                    Field::Likelihood => placement.likelihood = value,
                    Field::LikeWeightRatio => placement.like_weight_ratio = value,
                    Field::DistalLength => placement.distal_length = value,
                    Field::ProximalLength => proximal = Some(value),
                    Field::PendantLength => placement.pendant_length = value,
                    Field::Parsimony => placement.parsimony = value as i64,
                    Field::Ignored => {}
                }
            }

            // Proximal lengths are measured from the root-proximal node,
            // so they convert against the branch length of the edge.
            if let Some(proximal) = proximal {
                let edge = sample
                    .edge_num_map()
                    .get(&placement.edge_num)
                    .copied()
                    .ok_or_else(|| ParseError::unresolved_edge_num(placement.edge_num))?;
                let length = *sample.tree().edge(edge).branch_length();
                let distal = length - proximal;
                if !(0.0..=length).contains(&distal) {
                    tracing::warn!(
                        edge_num = placement.edge_num,
                        proximal,
                        length,
                        "proximal length outside the branch; clamping"
                    );
                }
                placement.distal_length = distal.clamp(0.0, length);
            }

            placements.push(placement);
        }

        let names = match (entry.nm, entry.n) {
            (Some(nm), _) => {
                nm.into_iter().map(|(name, mult)| PqueryName::new(&name, mult)).collect()
            }
            (None, Some(n)) => n.iter().map(|name| PqueryName::new(name, 0.0)).collect(),
            (None, None) => Vec::new(),
        };

        Ok(Pquery::new(placements, names))
    }
}

impl Default for JplaceReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a jplace file using default settings.
///
/// See [JplaceReader] for details.
pub fn read_file(path: &Path) -> Result<Sample, ParseError> {
    JplaceReader::new().from_file(path)
}

/// Accepts the version both as a JSON number and as a numeric string.
fn check_version(version: &Value) -> Result<(), ParseError> {
    let number = match version {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match number {
        Some(v) if v == JPLACE_VERSION => Ok(()),
        Some(v) => {
            Err(ParseError::without_context(ParseErrorKind::UnsupportedJplaceVersion(v)))
        }
        None => Err(ParseError::without_context(ParseErrorKind::InvalidJplaceDocument(
            format!("version is not a number: {}", version),
        ))),
    }
}

/// Validates the `fields` array: all required columns present, no
/// duplicates, and not both distal and proximal length at once. Unknown
/// field names are warned about and their columns skipped.
fn check_fields(names: &[String]) -> Result<Vec<Field>, ParseError> {
    let invalid =
        |message: String| ParseError::without_context(ParseErrorKind::InvalidJplaceFields(message));

    let mut fields = Vec::with_capacity(names.len());
    for name in names {
        let field = Field::from_name(name);
        if field == Field::Ignored {
            tracing::warn!(field = %name, "unknown jplace field; column will be skipped");
        } else if fields.contains(&field) {
            return Err(invalid(format!("duplicate field '{}'", name)));
        }
        fields.push(field);
    }

    for required in [Field::EdgeNum, Field::LikeWeightRatio] {
        if !fields.contains(&required) {
            return Err(invalid(format!("missing required field '{:?}'", required)));
        }
    }
    let has_distal = fields.contains(&Field::DistalLength);
    let has_proximal = fields.contains(&Field::ProximalLength);
    if has_distal && has_proximal {
        return Err(invalid(
            "both distal_length and proximal_length given; they are mutually exclusive".to_string(),
        ));
    }
    if !has_distal && !has_proximal {
        return Err(invalid("neither distal_length nor proximal_length given".to_string()));
    }

    Ok(fields)
}
