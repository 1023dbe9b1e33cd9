use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::ast::{Diagnostic, Severity};
use crate::error::{Error, Result};

static DIAGNOSTIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(.*?):(\d+):(\d+):\s*(fatal error|error|warning|note|remark):\s*(.*?)(?:\s+\[(-W[^\],]+)(?:,[^\]]*)?\])?$",
    )
    .expect("valid diagnostic regex")
});

static UNLOCATED_DIAGNOSTIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\S+: )?(fatal error|error): (.*)$").expect("valid diagnostic regex"));

fn clang_command(program: &str) -> Command {
    let mut command = Command::new(program);
    command.stdin(Stdio::null());
    command
}

fn run(
    program: &str,
    args: &[String],
) -> Result<Output> {
    debug!("Running: {program} {}", args.join(" "));
    clang_command(program).args(args).output().map_err(|source| Error::Spawn {
        program: program.to_owned(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Include path discovery
// ---------------------------------------------------------------------------

/// Run `clang -v -E -x c -` and turn its default search list into
/// `-isystem` flags.
pub fn discover_system_includes(program: &str) -> Vec<String> {
    let output = match clang_command(program).args(["-v", "-E", "-x", "c", "-"]).output() {
        Ok(o) => o,
        Err(e) => {
            warn!("Failed to run {program} -v: {e}");
            return Vec::new();
        },
    };

    // Search lists are printed to stderr, but parse both streams anyway.
    let discovery_output =
        format!("{}\n{}", String::from_utf8_lossy(&output.stderr), String::from_utf8_lossy(&output.stdout));
    let paths = parse_include_search_paths(&discovery_output);
    if paths.is_empty() {
        warn!("No system include paths found in `{program} -v` output");
    } else {
        debug!("Discovered system include paths: {:?}", paths);
    }

    paths.into_iter().flat_map(|p| ["-isystem".to_string(), p.display().to_string()]).collect()
}

fn parse_include_search_paths(raw_output: &str) -> Vec<PathBuf> {
    let mut parsing_includes = false;
    let mut seen = HashSet::new();
    let mut discovered_paths = Vec::new();

    for line in raw_output.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("#include <...> search starts here:") {
            parsing_includes = true;
            continue;
        }
        if !parsing_includes {
            continue;
        }
        if trimmed.starts_with("End of search list.") {
            break;
        }
        if trimmed.is_empty() || trimmed.ends_with("(framework directory)") {
            continue;
        }

        let path = PathBuf::from(trimmed.trim_matches('"'));
        if seen.insert(path.clone()) {
            discovered_paths.push(path);
        }
    }

    discovered_paths
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Raw result of the AST dump invocation.
pub struct AstDump {
    pub json: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Dump the AST of `path` as JSON and collect the diagnostics clang printed
/// while doing so.
pub fn run_ast_dump(
    program: &str,
    path: &Path,
    args: &[String],
) -> Result<AstDump> {
    let mut command_args = vec![
        "-fsyntax-only".to_string(),
        "-fno-color-diagnostics".to_string(),
        "-fno-caret-diagnostics".to_string(),
        "-fdiagnostics-show-option".to_string(),
        "-Xclang".to_string(),
        "-ast-dump=json".to_string(),
    ];
    command_args.extend(args.iter().cloned());
    command_args.push(path.display().to_string());

    let output = run(program, &command_args)?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut diagnostics = parse_diagnostics(&stderr);

    if !output.status.success() && !diagnostics.iter().any(|d| d.severity.is_fatal()) {
        diagnostics.push(Diagnostic {
            file: Some(path.display().to_string()),
            line: 0,
            column: 0,
            severity: Severity::Fatal,
            message: format!("{program} exited with {}", output.status),
            option: None,
        });
    }

    let json = String::from_utf8(output.stdout).unwrap_or_default();
    debug!("[ast-dump] produced {} bytes of JSON for {}", json.len(), path.display());

    Ok(AstDump { json, diagnostics })
}

/// Preprocess `path` keeping `#define` directives in place (`-E -dD`).
pub fn run_preprocessor(
    program: &str,
    path: &Path,
    args: &[String],
) -> Result<String> {
    let mut command_args = vec!["-E".to_string(), "-dD".to_string(), "-w".to_string()];
    command_args.extend(args.iter().cloned());
    command_args.push(path.display().to_string());

    let output = run(program, &command_args)?;
    if !output.status.success() {
        warn!("[preprocess] {program} exited with {} for {}", output.status, path.display());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Parse clang's stderr into diagnostics.
pub fn parse_diagnostics(output: &str) -> Vec<Diagnostic> {
    output.lines().filter_map(parse_diagnostic_line).collect()
}

/// Attempt to parse a single line of compiler output.
///
/// Expected format: `filename:line:column: severity: message [-Wflag]`.
/// Errors without a location (`clang: error: ...`) are kept as well.
fn parse_diagnostic_line(line: &str) -> Option<Diagnostic> {
    if let Some(caps) = DIAGNOSTIC_RE.captures(line) {
        return Some(Diagnostic {
            file: caps.get(1).map(|m| m.as_str().to_owned()),
            line: caps.get(2)?.as_str().parse().ok()?,
            column: caps.get(3)?.as_str().parse().ok()?,
            severity: Severity::from_label(caps.get(4)?.as_str())?,
            message: caps.get(5)?.as_str().to_string(),
            option: caps.get(6).map(|m| m.as_str().to_owned()),
        });
    }

    let caps = UNLOCATED_DIAGNOSTIC_RE.captures(line)?;
    Some(Diagnostic {
        file: None,
        line: 0,
        column: 0,
        severity: Severity::from_label(caps.get(1)?.as_str())?,
        message: caps.get(2)?.as_str().to_string(),
        option: None,
    })
}

#[cfg(test)]
#[path = "../../tests/src/clang/compiler_tests.rs"]
mod tests;
