use anyhow::Result;

use patentfinder::samples::{
    SampleMolecule,
    EXTENDED_SMILES_EXPLANATION,
    SAMPLE_CORE_MARKUSH,
    SAMPLE_PATENT_CLAIM,
};

use crate::cli::commands::OutputFormat;
use crate::cli::ui;

pub fn execute(format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let value =
            serde_json::json!({
            "molecules": {
                "protected": SampleMolecule::Protected.smiles(),
                "not_protected": SampleMolecule::NotProtected.smiles(),
            },
            "core_markush": SAMPLE_CORE_MARKUSH,
            "patent_claim": SAMPLE_PATENT_CLAIM,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    ui::print_header("Sample Molecules");
    for sample in [SampleMolecule::NotProtected, SampleMolecule::Protected] {
        ui::print_result(sample.label(), sample.smiles());
    }

    ui::print_header("Sample Patent Claim");
    ui::print_text(SAMPLE_PATENT_CLAIM);

    ui::print_header("Extended SMILES");
    ui::print_text(EXTENDED_SMILES_EXPLANATION);
    Ok(())
}
