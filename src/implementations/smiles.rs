//! Helpers for the extended-SMILES notation used by Markush structures.
//!
//! An extended SMILES string is `SMILES<sep>EXTENSION`, where the extension
//! holds tags mapping atom (`<a>`), ring (`<r>`) or circle (`<c>`) indices to
//! R-group labels, e.g. `<a>0:B[5]</a>`.

use std::collections::BTreeMap;

use crate::errors::{ PatentError, PatentResult };

pub const SEPARATOR: &str = "<sep>";

/// Kind of index an extension tag refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Atom,
    Ring,
    Circle,
}

impl TagKind {
    fn from_name(name: &str) -> Option<TagKind> {
        match name {
            "a" => Some(TagKind::Atom),
            "r" => Some(TagKind::Ring),
            "c" => Some(TagKind::Circle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTag {
    pub kind: TagKind,
    pub index: usize,
    /// Canonical label, or `<dum>` for a bare attachment point
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedSmiles {
    pub smiles: String,
    pub tags: Vec<ExtensionTag>,
}

impl ExtendedSmiles {
    pub fn parse(input: &str) -> PatentResult<ExtendedSmiles> {
        let input = input.trim();
        let (smiles, extension) = match input.split_once(SEPARATOR) {
            Some((smiles, extension)) => (smiles.trim(), extension.trim()),
            None => (input, ""),
        };
        if smiles.is_empty() {
            return Err(PatentError::ExtractionError("Empty SMILES before <sep>".to_string()));
        }

        let mut tags = Vec::new();
        let mut rest = extension;
        while let Some(open) = rest.find('<') {
            rest = &rest[open + 1..];
            let close = rest
                .find('>')
                .ok_or_else(|| PatentError::ExtractionError(format!("Unclosed tag in '{}'", extension)))?;
            let name = &rest[..close];
            rest = &rest[close + 1..];

            let kind = TagKind::from_name(name).ok_or_else(||
                PatentError::ExtractionError(format!("Unknown extension tag <{}>", name))
            )?;
            let end_tag = format!("</{}>", name);
            let end = rest
                .find(&end_tag)
                .ok_or_else(|| PatentError::ExtractionError(format!("Missing {}", end_tag)))?;
            let body = &rest[..end];
            rest = &rest[end + end_tag.len()..];

            let (index, label) = body
                .split_once(':')
                .ok_or_else(|| PatentError::ExtractionError(format!("Malformed tag body '{}'", body)))?;
            let index = index
                .trim()
                .parse::<usize>()
                .map_err(|e| PatentError::ExtractionError(format!("Bad tag index '{}': {}", index, e)))?;
            let label = label.trim();
            let label = if label == "<dum>" {
                label.to_string()
            } else {
                canonical_group_id(label)
            };

            tags.push(ExtensionTag { kind, index, label });
        }

        Ok(ExtendedSmiles { smiles: smiles.to_string(), tags })
    }

    /// Atom-index tags, in extension order
    pub fn atom_labels(&self) -> impl Iterator<Item = &ExtensionTag> {
        self.tags.iter().filter(|t| t.kind == TagKind::Atom)
    }
}

/// Normalise an R-group label to the bracketed form: `B5` and `B[5]` both become `B[5]`.
pub fn canonical_group_id(label: &str) -> String {
    let label = label.trim();
    if label.contains('[') {
        return label.replace(' ', "");
    }
    let split = label.find(|c: char| c.is_ascii_digit()).unwrap_or(label.len());
    let (prefix, digits) = label.split_at(split);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return label.to_string();
    }
    format!("{}[{}]", prefix, digits)
}

/// Heavy-atom composition and coarse topology of a substituent fragment.
///
/// Two fragments with equal heteroatoms, ring presence and unsaturation are
/// treated as the same substituent written in different notation
/// (e.g. `c1ccnnc1` vs `CC1C=NN=CC=1`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FragmentSignature {
    /// Non-carbon heavy atoms and their counts
    pub heteroatoms: BTreeMap<String, usize>,
    pub heavy_atoms: usize,
    pub hydrogens: usize,
    /// A ring-closure digit occurs outside bracket atoms
    pub ring: bool,
    /// Aromatic atoms or double/triple bonds
    pub unsaturated: bool,
}

impl FragmentSignature {
    pub fn of(fragment: &str) -> FragmentSignature {
        let mut signature = FragmentSignature::default();
        let chars: Vec<char> = fragment.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '[' {
                let end = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| i + p)
                    .unwrap_or(chars.len());
                let inner: String = chars[i + 1..end.min(chars.len())].iter().collect();
                signature.record(&bracket_element(&inner));
                i = end + 1;
                continue;
            }
            // Two-letter organic subset atoms
            if c == 'C' && chars.get(i + 1) == Some(&'l') {
                signature.record("Cl");
                i += 2;
                continue;
            }
            if c == 'B' && chars.get(i + 1) == Some(&'r') {
                signature.record("Br");
                i += 2;
                continue;
            }
            match c {
                'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' => signature.record(&c.to_string()),
                'b' | 'c' | 'n' | 'o' | 'p' | 's' => {
                    signature.unsaturated = true;
                    signature.record(&c.to_ascii_uppercase().to_string())
                }
                '=' | '#' => {
                    signature.unsaturated = true;
                }
                '0'..='9' | '%' => {
                    signature.ring = true;
                }
                _ => {}
            }
            i += 1;
        }
        signature
    }

    fn record(&mut self, element: &str) {
        match element {
            "" | "*" => {}
            "H" => {
                self.hydrogens += 1;
            }
            "C" => {
                self.heavy_atoms += 1;
            }
            other => {
                self.heavy_atoms += 1;
                *self.heteroatoms.entry(other.to_string()).or_insert(0) += 1;
            }
        }
    }

    pub fn is_hydrogen(&self) -> bool {
        self.heavy_atoms == 0 && self.hydrogens > 0
    }

    pub fn is_empty(&self) -> bool {
        self.heavy_atoms == 0 && self.hydrogens == 0
    }

    pub fn equivalent(&self, other: &FragmentSignature) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if self.is_hydrogen() || other.is_hydrogen() {
            return self.is_hydrogen() && other.is_hydrogen();
        }
        self.heteroatoms == other.heteroatoms &&
            self.ring == other.ring &&
            self.unsaturated == other.unsaturated
    }
}

/// Element symbol of a bracket atom body such as `13CH3`, `nH` or `H`
fn bracket_element(inner: &str) -> String {
    let body = inner.trim_start_matches(|c: char| c.is_ascii_digit());
    let mut chars = body.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => first.to_ascii_uppercase().to_string(),
        Some(first) if first.is_ascii_uppercase() => {
            match chars.next() {
                Some(second) if second.is_ascii_lowercase() => {
                    format!("{}{}", first, second)
                }
                _ => first.to_string(),
            }
        }
        _ => String::new(),
    }
}

/// Whether two substituent strings describe the same fragment
pub fn fragments_equivalent(a: &str, b: &str) -> bool {
    a == b || FragmentSignature::of(a).equivalent(&FragmentSignature::of(b))
}

/// Short chemical name for the fragments the estimators produce
pub fn describe_fragment(fragment: &str) -> String {
    if fragment.trim().is_empty() {
        return "No assignment".to_string();
    }
    let signature = FragmentSignature::of(fragment);
    if signature.is_hydrogen() {
        return "Hydrogen".to_string();
    }
    let hetero: Vec<(&str, usize)> = signature.heteroatoms
        .iter()
        .map(|(element, count)| (element.as_str(), *count))
        .collect();
    let aromatic_ring = signature.ring && signature.unsaturated;
    match (hetero.as_slice(), aromatic_ring) {
        ([("S", 1)], true) => "Thiophene ring".to_string(),
        ([("N", 2)], true) => "Pyridazine ring".to_string(),
        ([("N", 1)], true) => "Pyridine ring".to_string(),
        ([], true) => "Phenyl ring".to_string(),
        ([], false) if signature.heavy_atoms == 1 => "Methyl".to_string(),
        ([], false) => "Alkyl chain".to_string(),
        _ => "Unclassified fragment".to_string(),
    }
}
