//! Writer for jplace version 3 documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::{Number, Value};

use crate::jplace::JPLACE_VERSION;
use crate::newick::{self, NewickFlavor};
use crate::parser::ParseError;
use crate::placement::sample::Sample;

/// Canonical column order written to the `fields` array.
const FIELD_NAMES: [&str; 5] =
    ["edge_num", "likelihood", "like_weight_ratio", "distal_length", "pendant_length"];

#[derive(Serialize)]
struct Document {
    version: i64,
    tree: String,
    placements: Vec<Entry>,
    fields: Vec<&'static str>,
    metadata: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct Entry {
    p: Vec<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nm: Option<Vec<(String, f64)>>,
}

// =#========================================================================#=
// JPLACE WRITER
// =#========================================================================#=
/// Writes [Sample] objects as jplace version 3 documents.
///
/// Placement rows always use the canonical column order `edge_num`,
/// `likelihood`, `like_weight_ratio`, `distal_length`, `pendant_length`.
/// A pquery's names are written as `nm` pairs if any of them carries a
/// non-zero multiplicity, and as a plain `n` array otherwise.
pub struct JplaceWriter {}

impl JplaceWriter {
    pub fn new() -> Self {
        Self {}
    }

    /// Serializes a sample to a pretty-printed jplace string.
    pub fn to_string(&self, smp: &Sample) -> Result<String, ParseError> {
        let doc = self.to_document(smp);
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Writes a sample to a jplace file.
    ///
    /// Refuses to overwrite: if the target already exists, a warning is
    /// logged, nothing is written, and `Ok(false)` is returned.
    ///
    /// # Errors
    /// Fails on IO errors while writing.
    pub fn to_file(&self, smp: &Sample, path: &Path) -> Result<bool, ParseError> {
        if path.exists() {
            tracing::warn!(path = %path.display(), "output file exists; not overwriting");
            return Ok(false);
        }
        fs::write(path, self.to_string(smp)?)?;
        Ok(true)
    }

    fn to_document(&self, smp: &Sample) -> Document {
        let tree = smp.tree();
        let mut placements = Vec::with_capacity(smp.pquery_count());
        for pquery in smp.pqueries() {
            let mut rows = Vec::with_capacity(pquery.placements.len());
            for placement in &pquery.placements {
                rows.push(vec![
                    Value::from(placement.edge_num),
                    json_number(placement.likelihood),
                    json_number(placement.like_weight_ratio),
                    json_number(placement.distal_length),
                    json_number(placement.pendant_length),
                ]);
            }

            let has_multiplicity = pquery.names.iter().any(|name| name.multiplicity != 0.0);
            let (n, nm) = if has_multiplicity {
                let pairs = pquery
                    .names
                    .iter()
                    .map(|name| (name.name.clone(), name.multiplicity))
                    .collect();
                (None, Some(pairs))
            } else {
                (Some(pquery.names.iter().map(|name| name.name.clone()).collect()), None)
            };

            placements.push(Entry { p: rows, n, nm });
        }

        Document {
            version: JPLACE_VERSION,
            tree: newick::write(tree, NewickFlavor::EdgeNums),
            placements,
            fields: FIELD_NAMES.to_vec(),
            metadata: smp.metadata().clone(),
        }
    }
}

impl Default for JplaceWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes a sample to a jplace file using default settings.
///
/// See [JplaceWriter] for details, including the refusal to overwrite.
pub fn write_file(smp: &Sample, path: &Path) -> Result<bool, ParseError> {
    JplaceWriter::new().to_file(smp, path)
}

/// Converts a float to a JSON number, mapping non-finite values to zero
/// since JSON cannot represent them.
fn json_number(value: f64) -> Value {
    match Number::from_f64(value) {
        Some(number) => Value::Number(number),
        None => {
            tracing::warn!(value, "non-finite number in jplace output; writing 0");
            Value::from(0)
        }
    }
}
