use colored::*;
use console::Term;
use dialoguer::{ theme::ColorfulTheme, Confirm, Input, Select };
use indicatif::{ ProgressBar, ProgressStyle };
use std::io::Write;
use std::time::Duration;
use textwrap::wrap;

use patentfinder::implementations::pipeline::{ PipelineObserver, StepOutput };
use patentfinder::models::common::{ PipelineStep, Verdict };
use patentfinder::models::markush::MarkushStructure;
use patentfinder::models::matching::{ EstimatorOutput, MatchResult, MatchStatus };
use patentfinder::samples::SampleMolecule;

/// UI theme for consistent appearance
pub fn get_theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// Print a section header
pub fn print_header(title: &str) {
    let title = format!(" {} ", title);
    println!("\n{}\n", title.bold().white().on_blue());
}

/// Print text with proper wrapping
pub fn print_text(text: &str) {
    let width = Term::stdout().size().1 as usize;
    let mut in_code = false;
    for line in text.lines() {
        if line.starts_with("```") {
            in_code = !in_code;
            println!("{}", line.dimmed());
        } else if in_code || line.starts_with('|') {
            println!("{}", line);
        } else if line.starts_with('#') {
            println!("{}", line.bold());
        } else {
            for wrapped_line in wrap(line, width.saturating_sub(10).max(20)) {
                println!("{}", wrapped_line);
            }
        }
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "ERROR:".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "WARNING:".yellow().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "SUCCESS:".green().bold(), message);
}

/// Print information
pub fn print_info(message: &str) {
    println!("{} {}", "INFO:".blue().bold(), message);
}

/// Print a formatted result
pub fn print_result(label: &str, value: &str) {
    println!("{}: {}", label.bold(), value);
}

pub fn print_verdict(verdict: Verdict) {
    let label = format!(" {} ", verdict);
    let styled = match verdict {
        Verdict::Protected => label.white().on_red().bold(),
        Verdict::NotProtected => label.black().on_green().bold(),
        Verdict::Undetermined => label.black().on_yellow().bold(),
    };
    println!("\n{} {}\n", "Verdict:".bold(), styled);
}

fn status_colored(status: MatchStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        MatchStatus::Agreed | MatchStatus::Equivalent => text.green(),
        MatchStatus::RuleBasedOnly | MatchStatus::LearnedOnly => text.yellow(),
        MatchStatus::Disputed | MatchStatus::Missing => text.red().bold(),
    }
}

pub fn display_markush(markush: &MarkushStructure) {
    print_result("Core Markush structure", "");
    println!("  {}", markush.core_smiles.cyan());
    println!("\n{}", "Claim requirements:".bold());
    for (group, requirement) in &markush.claim_requirements {
        let index = markush
            .position(group)
            .map(|p| format!("atom {}", p.atom_index))
            .unwrap_or_else(|| "unplaced".to_string());
        println!("  - {} ({}): {}", group.bold(), index.dimmed(), requirement);
    }
    print_result(
        "Relevant blocks",
        &markush.relevant_block_indices
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

fn display_estimator(output: &EstimatorOutput) {
    println!("{} ({})", output.method.bold(), output.kind);
    for (group, value) in &output.r_group_mapping {
        println!("  - {}: {}", group, value.cyan());
    }
    println!("  {}", format!("Confidence: {:.2}", output.confidence).dimmed());
}

pub fn display_match(result: &MatchResult) {
    display_estimator(&result.rule_based);
    println!();
    display_estimator(&result.learned);

    println!("\n{}", "Reconciled assignment:".bold());
    for analysis in &result.substituent_analysis {
        let value = if analysis.verified_value.is_empty() {
            "(none)".to_string()
        } else {
            analysis.verified_value.clone()
        };
        println!(
            "  - {}: {} {} [{}]",
            analysis.group_id.bold(),
            value.cyan(),
            analysis.description.dimmed(),
            status_colored(analysis.status)
        );
    }
    print_result("Skeleton match", &result.skeleton_match.to_string());
    print_result("Tanimoto similarity", &format!("{:.3}", result.similarity_score));
    println!("{}", result.verification_notes.dimmed());
}

/// Display a spinner while waiting for an operation to complete
pub fn spinner_with_message(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Prompt for a free-text value, allowing an empty answer
pub fn input_text(prompt: &str, default: Option<&str>) -> std::io::Result<String> {
    let theme = get_theme();
    let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt).allow_empty(true);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    input.interact_text().map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Yes/no question answered with a single key
pub fn confirm(prompt: &str, default: bool) -> std::io::Result<bool> {
    Confirm::with_theme(&get_theme())
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Interactive choice of query molecule source
pub fn select_molecule() -> std::io::Result<Option<SampleMolecule>> {
    let choices = vec![
        "Enter a SMILES string",
        SampleMolecule::NotProtected.label(),
        SampleMolecule::Protected.label()
    ];

    let selection = Select::with_theme(&get_theme())
        .with_prompt("Query molecule")
        .items(&choices)
        .default(0)
        .interact()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    Ok(match selection {
        1 => Some(SampleMolecule::NotProtected),
        2 => Some(SampleMolecule::Protected),
        _ => None,
    })
}

/// Renders pipeline progress on the terminal
pub struct ConsoleObserver {
    spinner: Option<ProgressBar>,
    streaming: bool,
}

impl ConsoleObserver {
    pub fn new(streaming: bool) -> Self {
        Self { spinner: None, streaming }
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl PipelineObserver for ConsoleObserver {
    fn on_step_started(&mut self, step: PipelineStep) {
        print_header(&format!("Step {}: {}", step.number(), step));
        if !(self.streaming && step.uses_model()) {
            self.spinner = Some(spinner_with_message(&format!("{}...", step)));
        }
    }

    fn on_fragment(&mut self, _step: PipelineStep, fragment: &str) {
        print!("{}", fragment);
        let _ = std::io::stdout().flush();
    }

    fn on_step_completed(&mut self, step: PipelineStep, output: StepOutput<'_>) {
        self.stop_spinner();
        match output {
            StepOutput::Markush(markush) => display_markush(markush),
            StepOutput::Match(result) => display_match(result),
            StepOutput::Examination(examination) => {
                if !self.streaming {
                    print_text(&examination.text);
                } else {
                    println!();
                }
                print_verdict(examination.verdict);
                if examination.verdict == Verdict::Undetermined {
                    print_warning("No VERDICT line in the examiner output; treated as not protected");
                }
            }
            StepOutput::FactCheck(check) => {
                if !self.streaming {
                    print_text(&check.text);
                } else {
                    println!();
                }
                println!(
                    "{}",
                    "The fact checker verifies that the reasoning's evidence appears in the patent, not whether the verdict is right."
                        .dimmed()
                );
            }
            StepOutput::Report(report) => {
                if !self.streaming {
                    print_text(&report.markdown);
                } else {
                    println!();
                }
            }
        }
        print_success(&format!("Step {} complete", step.number()));
    }
}

impl Drop for ConsoleObserver {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
