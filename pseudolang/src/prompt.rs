//! Prompt construction and extraction of the generated Python source

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const PLACEHOLDER: &str = "{{PSEUDOCODE}}";

const PSEUDOCODE_TO_PYTHON_PROMPT: &str = r##"# Pseudocode to Python Conversion Prompt

You will convert pseudocode into valid, executable Python 3 code.

Here is the pseudocode you need to convert:

<pseudocode>
{{PSEUDOCODE}}
</pseudocode>

Your task is to interpret this pseudocode and generate Python code that can be executed with `python file.py`.

## Conversion Requirements

- Convert all comments (whether using "#" or "//") to Python's "#" format
- Handle mixed language syntax (Python, C, etc.) and convert to proper Python syntax
- Convert function definitions to Python's "def" syntax with proper indentation
- Convert control structures (if/else, loops, etc.) to Python syntax
- Convert data types to appropriate Python equivalents
- Use Python's print() function for output statements
- Use Python's input() function for input operations when appropriate
- Only use imports from Python's standard library
- Ensure the code is executable without syntax errors
- Preserve the original logic and functionality
- Make reasonable assumptions for ambiguous pseudocode elements
- Include appropriate error handling if the pseudocode suggests it
- Generate fully correct, working Python code

## Process

First, analyze the pseudocode systematically in <conversion_analysis> tags. In your analysis:

1. Go through the pseudocode line by line, identifying what each line contains and what specific conversions are needed
2. List all syntax transformations required (e.g., function definitions, variable declarations, control structures, operators, etc.)
3. Note any data type conversions needed and what Python equivalents you'll use
4. Identify any input/output operations and plan the appropriate Python functions
5. Note any ambiguous parts and clearly state your assumptions for handling them
6. Plan the overall structure and indentation of the final Python code

**Be concise but thorough in your analysis.**

After your analysis, provide the converted Python code in <code> tags.

## Output Format

```
<conversion_analysis>
[Your systematic line-by-line analysis of the pseudocode and detailed conversion plan]
</conversion_analysis>

<code>
[Your converted Python code here]
</code>
```
"##;

/// First `<code>...</code>` block, shortest match, spanning lines
static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<code>\s*(.*?)\s*</code>").expect("code block pattern is valid"));

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no <code> tags found in response")]
    NoCodeTags,

    #[error("code block is empty")]
    EmptyBlock,
}

/// Substitute `pseudocode` into the conversion prompt.
///
/// Only the template's placeholder is replaced; the input is inserted verbatim.
pub fn build_pseudocode_prompt(pseudocode: &str) -> String {
    PSEUDOCODE_TO_PYTHON_PROMPT.replacen(PLACEHOLDER, pseudocode, 1)
}

/// Pull the Python source out of the first `<code>` block of an LLM response
pub fn extract_python_code(response: &str) -> Result<String, ExtractError> {
    let captures = CODE_BLOCK
        .captures(response)
        .ok_or(ExtractError::NoCodeTags)?;

    let code = captures.get(1).map_or("", |m| m.as_str()).trim();
    if code.is_empty() {
        return Err(ExtractError::EmptyBlock);
    }

    Ok(code.to_string())
}
