use clap::{ Parser, Subcommand, ValueEnum };
use std::path::PathBuf;

use patentfinder::samples::SampleMolecule;

pub mod commands;
pub mod ui;

#[derive(Parser)]
#[command(
    name = "patentfinder",
    about = "Assess whether a molecule falls within a patent's Markush claim",
    version,
    author,
    long_about = None
)]
pub struct PatentCli {
    /// Sets the log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    pub output_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Bundled query molecules
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleArg {
    /// B5 = thiophenyl
    Protected,
    /// B5 = pyridazinyl
    NotProtected,
}

impl From<SampleArg> for SampleMolecule {
    fn from(arg: SampleArg) -> Self {
        match arg {
            SampleArg::Protected => SampleMolecule::Protected,
            SampleArg::NotProtected => SampleMolecule::NotProtected,
        }
    }
}

/// Where the query molecule and patent text come from
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Query molecule SMILES
    #[arg(short, long, conflicts_with = "sample")]
    pub molecule: Option<String>,

    /// Use a bundled sample molecule instead of --molecule
    #[arg(short, long, value_enum)]
    pub sample: Option<SampleArg>,

    /// File holding the patent claim text. Defaults to the bundled sample claim.
    #[arg(short, long, conflicts_with = "patent_text")]
    pub patent: Option<PathBuf>,

    /// Patent claim text given inline
    #[arg(long)]
    pub patent_text: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full five-step infringement assessment
    Assess {
        #[command(flatten)]
        input: InputArgs,

        /// Stream model output as it is generated
        #[arg(long, default_value = "false")]
        stream: bool,

        /// Save the Markdown report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Enter the inputs interactively, then run the assessment
    Interactive {
        /// Stream model output as it is generated
        #[arg(long, default_value = "false")]
        stream: bool,
    },

    /// Run step 1 only: extract the Markush structure
    Extract {
        /// File holding the patent claim text. Defaults to the bundled sample claim.
        #[arg(short, long)]
        patent: Option<PathBuf>,
    },

    /// Run steps 1 and 2: extract and match substituents
    Match {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show the bundled sample inputs and the extended SMILES notation
    Samples,
}
