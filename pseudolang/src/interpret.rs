//! Pseudocode execution pipeline: prompt, translate, extract, run

use anyhow::{Context, Result};
use llm_client::Config;
use std::io::{self, Write};
use std::path::Path;

use crate::llm::LlmClient;
use crate::prompt::{build_pseudocode_prompt, extract_python_code};
use crate::runner::PythonRunner;

const CODE_HEADER: &str = "--- Generated Python Code ---";
const CODE_FOOTER: &str = "-----------------------------";

/// Translate `input` with the configured model and run the result
pub async fn execute_with_llm(input: &str, verbose: bool) -> Result<()> {
    let config = Config::load().context("failed to load config")?;
    let llm = LlmClient::from_config(&config)?;

    execute(&llm, input, verbose, &mut io::stdout(), &mut io::stderr()).await
}

/// Run an existing Python file without translation
pub async fn execute_python_file(path: &Path) -> Result<()> {
    let runner = PythonRunner::discover()?;
    let output = runner.run_file(path).await?;

    output
        .relay(&mut io::stdout(), &mut io::stderr())
        .context("failed to relay Python output")?;
    output.check()?;
    Ok(())
}

/// Ask the model for Python source implementing `input`
pub async fn translate(llm: &LlmClient, input: &str) -> Result<String> {
    let prompt = build_pseudocode_prompt(input);
    let response = llm.complete(&prompt).await?;
    Ok(extract_python_code(&response)?)
}

/// Translate `input`, optionally echo the code, then run it.
///
/// Python's stdout goes to `out` and its stderr to `err` after the child exits.
pub async fn execute(
    llm: &LlmClient,
    input: &str,
    verbose: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let code = translate(llm, input).await?;

    if verbose {
        writeln!(out, "{}\n{}\n{}\n", CODE_HEADER, code, CODE_FOOTER)?;
        out.flush()?;
    }

    let runner = PythonRunner::discover()?;
    let output = runner.run_source(&code).await?;

    output
        .relay(out, err)
        .context("failed to relay Python output")?;
    output.check()?;
    Ok(())
}
