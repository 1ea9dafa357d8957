use std::collections::{ BTreeSet, HashMap };

use crate::errors::{ PatentError, PatentResult };
use crate::models::common::AgentRole;

/// Glossary fragment shared by every agent's system prompt
pub const EXTENDED_SMILES_DEFINITION: &str =
    r#"Markush structures are written in extended SMILES: `SMILES<sep>EXTENSION`.
- `*` in the SMILES marks an R-group attachment point.
- The extension maps indices to R-group labels:
  - `<a>INDEX:LABEL</a>` maps atom INDEX to LABEL, e.g. `<a>0:B[5]</a>`
  - `<r>INDEX:LABEL</r>` maps ring INDEX to LABEL
  - `<c>INDEX:LABEL</c>` maps circle INDEX to LABEL
  - `<dum>` as a label marks a bare attachment point
- Group ids are written in bracketed form, e.g. `B[5]`, `D[1]`, `R[21]`.
- A substituent value of `[H]` or `[H][H]` means hydrogen."#;

pub const EXAMINER_SYSTEM: &str =
    r#"You are a patent requirements examiner specialised in chemical Markush claims.
Given a Markush claim, a query molecule and the substituent assignment proposed for each R-group, decide for every R-group whether the assigned substituent satisfies the claim's requirement for that group, then decide whether the query molecule falls within the scope of the claim.

A molecule is PROTECTED only if the scaffold matches and every R-group assignment satisfies its requirement. A single failing group makes the molecule NOT PROTECTED.

Where two estimators disagreed on a group, adjudicate between the candidate values using the chemistry and say which one you accept.

{{extended_smiles_definition}}"#;

pub const EXAMINER_USER: &str =
    r#"Using the information below, decide whether the query molecule falls within the scope of the patent claim.

**Markush claim**: '{{markush_string}}'

**Current substituent assignment:**
{{r_group_mapping}}

**Groups needing adjudication:**
{{disputed_groups}}

**Query molecule**:
{{molecule_string}}

**Claim requirement text:**
{{claim_text}}

Analyse every R-group against its claim requirement in detail and give a final determination.
Format the output as Markdown with headings and bullet points:

## Analysis

### R-group compliance
(one entry per R-group)

### Final determination
(PROTECTED or NOT PROTECTED)

### Rationale
(detailed reasons)

End your answer with exactly one line of the form `VERDICT: PROTECTED` or `VERDICT: NOT_PROTECTED`."#;

pub const FACT_CHECKER_SYSTEM: &str =
    r#"You are a fact checker for chemical patent infringement analyses.
Verify that every piece of evidence used in an analysis is actually stated in the patent document. Flag any claim, substituent definition or example the analysis relies on that the patent text does not support, and correct it.
You advise; you do not issue a new infringement verdict.

{{extended_smiles_definition}}"#;

pub const FACT_CHECKER_USER: &str =
    r#"Verify the reasoning of the following infringement analysis.

# Target molecule:
{{target_molecule}}

# Patent document block:
{{block_text}}

# Infringement analysis:
Infringement: {{protection_status}}

Analysis: {{reasoning_text}}

Confirm that all evidence used in the analysis above appears in the patent document.
Format the output as Markdown with headings and bullet points:

## Verification

### Evidence check
(one entry per piece of evidence)

### Verified facts
(list of confirmed facts)

### Conclusion
(summary of the verification)"#;

pub const PLANNER_SYSTEM: &str =
    r#"You are the coordinator of a patent infringement assessment team.
You receive the outputs of a Markush extractor, a substituent matcher, a requirements examiner and a fact checker, and compile them into one comprehensive infringement report for a patent attorney. Where the fact checker corrected something, the corrected version wins.

{{extended_smiles_definition}}"#;

pub const PLANNER_USER: &str =
    r#"Using the information below, write the final patent infringement report.

## Query molecule
SMILES: {{query_molecule}}

## Patent information
{{patent_info}}

## Markush extraction
Core Markush structure: {{core_markush}}
Claim requirements:
{{claim_requirements}}

## Substituent matching
R-group mapping:
{{r_group_mapping}}
Skeleton match: {{skeleton_match}}

## Requirements examination
{{examiner_text}}

## Fact check
{{fact_check_text}}

Integrate all of the results above into a comprehensive infringement report covering:
1. The structure of the query molecule
2. The protected core Markush structure and its R-group definitions
3. Each R-group value and whether it meets the patent requirement
4. The final infringement determination and its reasons"#;

/// Name of the system template for a role, e.g. `examiner.system`
pub fn system_template(role: AgentRole) -> String {
    format!("{}.system", role.template_prefix())
}

/// Name of the user template for a role, e.g. `examiner.user`
pub fn user_template(role: AgentRole) -> String {
    format!("{}.user", role.template_prefix())
}

/// Named prompt templates with `{{placeholder}}` substitution
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    templates: HashMap<String, String>,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        let templates = [
            ("examiner.system", EXAMINER_SYSTEM),
            ("examiner.user", EXAMINER_USER),
            ("fact_checker.system", FACT_CHECKER_SYSTEM),
            ("fact_checker.user", FACT_CHECKER_USER),
            ("planner.system", PLANNER_SYSTEM),
            ("planner.user", PLANNER_USER),
        ]
            .into_iter()
            .map(|(name, body)| (name.to_string(), body.to_string()))
            .collect();
        Self { templates }
    }
}

impl PromptLibrary {
    /// Built-in templates with `overrides` replacing entries of the same name
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut library = Self::default();
        for (name, body) in overrides {
            if !library.templates.contains_key(name) {
                log::warn!("Prompt override '{}' does not replace a built-in template", name);
            }
            log::debug!("Using prompt override for '{}'", name);
            library.templates.insert(name.clone(), body.clone());
        }
        library
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Render a template. `extended_smiles_definition` is always available;
    /// any other placeholder missing from `params` is an error.
    pub fn render(&self, name: &str, params: &HashMap<&str, String>) -> PatentResult<String> {
        let template = self
            .get(name)
            .ok_or_else(|| PatentError::TemplateError(format!("Template not found: {}", name)))?;

        let unresolved: Vec<String> = placeholders(template)
            .into_iter()
            .filter(|key| *key != "extended_smiles_definition" && !params.contains_key(key))
            .map(str::to_string)
            .collect();
        if !unresolved.is_empty() {
            return Err(
                PatentError::TemplateError(
                    format!("Template '{}' has unresolved placeholders: {}", name, unresolved.join(", "))
                )
            );
        }

        let mut result = template.replace(
            "{{extended_smiles_definition}}",
            EXTENDED_SMILES_DEFINITION
        );
        for (key, value) in params {
            let placeholder = format!("{{{{{}}}}}", key);
            result = result.replace(&placeholder, value);
        }
        Ok(result)
    }
}

/// Placeholder names appearing in a template, deduplicated
fn placeholders(template: &str) -> BTreeSet<&str> {
    let mut found = BTreeSet::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    found.insert(key);
                }
                rest = &after[end + 2..];
            }
            None => {
                break;
            }
        }
    }
    found
}
