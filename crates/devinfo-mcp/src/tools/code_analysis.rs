// crates/devinfo-mcp/src/tools/code_analysis.rs
// ============================================================================
// Module: Code Analysis Tool
// Description: Substring heuristics over short code snippets.
// Purpose: Implement the `analyze-code` tool.
// Dependencies: devinfo-mcp registry and handler contracts
// ============================================================================

//! ## Overview
//! Reports language-specific patterns found by substring matching, the
//! number of non-empty lines, and a count of complexity keywords. The
//! heuristics match substrings only; no parsing happens here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::handler::ToolFailure;
use crate::registry::FieldKind;
use crate::registry::FieldSpec;
use crate::registry::ToolDescriptor;
use crate::tools::title_case;
use crate::validation::ValidatedArguments;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tool name.
pub const NAME: &str = "analyze-code";

/// Keywords counted once per line that contains them.
const COMPLEXITY_INDICATORS: &[&str] = &["if", "for", "while", "switch", "try", "catch", "finally"];

/// Marker for a detected pattern.
const FOUND: &str = "\u{2705}";
/// Marker for a caution line.
const CAUTION: &str = "\u{26a0}\u{fe0f}";

// ============================================================================
// SECTION: Tool
// ============================================================================

/// Returns the tool descriptor.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Analyze code snippets for patterns and provide insights",
        vec![
            FieldSpec::required("code_snippet", FieldKind::String)
                .with_description("Code snippet to analyze"),
            FieldSpec::required("language", FieldKind::String)
                .with_description("Programming language of the code"),
        ],
    )
}

/// Handler entry point.
///
/// # Errors
///
/// Returns [`ToolFailure`] when an argument is unavailable.
pub fn handle(arguments: &ValidatedArguments) -> Result<String, ToolFailure> {
    let code_snippet = arguments.require_str("code_snippet")?;
    let language = arguments.require_str("language")?;
    Ok(analyze_code(code_snippet, language))
}

/// Renders the analysis report for a snippet.
#[must_use]
pub fn analyze_code(code_snippet: &str, language: &str) -> String {
    let language = language.to_lowercase();
    let code = code_snippet.trim();
    if code.is_empty() {
        return "No code snippet provided for analysis.".to_string();
    }
    let patterns = detect_patterns(code, &language);
    let non_empty: Vec<&str> = code.split('\n').filter(|line| !line.trim().is_empty()).collect();
    let complexity: usize = non_empty
        .iter()
        .map(|line| {
            let lowered = line.to_lowercase();
            COMPLEXITY_INDICATORS.iter().filter(|indicator| lowered.contains(*indicator)).count()
        })
        .sum();
    let mut lines = vec![
        format!("**Code Analysis Results for {}:**", title_case(&language)),
        format!("- Lines of code: {}", non_empty.len()),
        format!("- Complexity indicators: {complexity}"),
    ];
    if patterns.is_empty() {
        lines.push(format!("{CAUTION}  No specific patterns detected for this language"));
    } else {
        lines.push("**Pattern Analysis:**".to_string());
        lines.extend(patterns);
    }
    lines.join("\n")
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the pattern lines detected for a language.
fn detect_patterns(code: &str, language: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut check = |condition: bool, marker: &str, text: &str| {
        if condition {
            found.push(format!("{marker} {text}"));
        }
    };
    match language {
        "java" => {
            check(code.contains("public class"), FOUND, "Java class definition found");
            check(
                code.contains("public static void main"),
                FOUND,
                "Main method detected - executable class",
            );
            check(code.contains('@'), FOUND, "Annotations found - modern Java practices");
            check(code.contains("import"), FOUND, "Import statements present");
            check(code.contains("throws"), CAUTION, " Exception handling declared");
        }
        "javascript" | "typescript" => {
            check(
                code.contains("function") || code.contains("=>"),
                FOUND,
                "Function definitions found",
            );
            check(
                code.contains("const ") || code.contains("let "),
                FOUND,
                "Modern variable declarations (const/let)",
            );
            check(
                code.contains("import") || code.contains("require("),
                FOUND,
                "Module imports detected",
            );
            if language == "typescript" {
                check(
                    code.contains(':')
                        && (code.contains("string")
                            || code.contains("number")
                            || code.contains("boolean")),
                    FOUND,
                    "TypeScript type annotations found",
                );
                check(
                    code.contains("interface") || code.contains("type "),
                    FOUND,
                    "TypeScript type definitions present",
                );
            }
            check(
                code.contains("async") || code.contains("await"),
                FOUND,
                "Asynchronous code patterns detected",
            );
        }
        "python" => {
            check(code.contains("def "), FOUND, "Function definitions found");
            check(code.contains("class "), FOUND, "Class definitions present");
            check(
                code.contains("import ") || code.contains("from "),
                FOUND,
                "Module imports detected",
            );
            check(
                code.contains("async def") || code.contains("await "),
                FOUND,
                "Asynchronous code patterns found",
            );
        }
        _ => {}
    }
    found
}
