use super::*;

#[test]
fn parse_error_line() {
    let line = "widget.c:10:5: error: use of undeclared identifier 'foo'";
    let diag = parse_diagnostic_line(line).unwrap();

    assert_eq!(diag.file.as_deref(), Some("widget.c"));
    assert_eq!(diag.line, 10);
    assert_eq!(diag.column, 5);
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.message, "use of undeclared identifier 'foo'");
    assert_eq!(diag.option, None);
    assert!(diag.severity.is_fatal());
}

#[test]
fn parse_documentation_warning_line() {
    let line = "/work/include/widget.h:7:12: warning: parameter 'wdith' not found in the function declaration [-Wdocumentation]";
    let diag = parse_diagnostic_line(line).unwrap();

    assert_eq!(diag.file.as_deref(), Some("/work/include/widget.h"));
    assert_eq!(diag.line, 7);
    assert_eq!(diag.column, 12);
    assert_eq!(diag.severity, Severity::Warning);
    assert_eq!(diag.message, "parameter 'wdith' not found in the function declaration");
    assert_eq!(diag.option.as_deref(), Some("-Wdocumentation"));
    assert!(diag.is_documentation());
    assert!(!diag.severity.is_fatal());
}

#[test]
fn parse_warning_with_category_suffix() {
    let line = "a.c:1:1: warning: unused variable 'x' [-Wunused-variable,Unused Entity Issue]";
    let diag = parse_diagnostic_line(line).unwrap();

    assert_eq!(diag.option.as_deref(), Some("-Wunused-variable"));
    assert_eq!(diag.message, "unused variable 'x'");
    assert!(!diag.is_documentation());
}

#[test]
fn parse_fatal_error_line() {
    let line = "/work/src/widget.c:1:10: fatal error: 'missing.h' file not found";
    let diag = parse_diagnostic_line(line).unwrap();

    assert_eq!(diag.severity, Severity::Fatal);
    assert_eq!(diag.message, "'missing.h' file not found");
}

#[test]
fn parse_note_line() {
    let line = "widget.c:1:1: note: previous definition is here";
    let diag = parse_diagnostic_line(line).unwrap();

    assert_eq!(diag.severity, Severity::Note);
    assert!(!diag.severity.is_fatal());
}

#[test]
fn parse_unlocated_driver_error() {
    let diag = parse_diagnostic_line("clang: error: no such file or directory: 'nope.c'").unwrap();

    assert_eq!(diag.file, None);
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.message, "no such file or directory: 'nope.c'");
}

#[test]
fn parse_non_diagnostic_line() {
    assert!(parse_diagnostic_line("some random output").is_none());
    assert!(parse_diagnostic_line("1 warning generated.").is_none());
    assert!(parse_diagnostic_line("").is_none());
}

#[test]
fn parse_diagnostics_keeps_order() {
    let stderr = "\
In file included from /work/src/widget.c:1:
/work/include/widget.h:3:5: warning: empty paragraph passed to '@param' command [-Wdocumentation]
/work/src/widget.c:9:1: error: expected ';' after top level declarator
1 warning and 1 error generated.
";
    let diags = parse_diagnostics(stderr);

    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0].severity, Severity::Warning);
    assert_eq!(diags[1].severity, Severity::Error);
}

#[test]
fn parse_include_search_paths_skips_framework_directories() {
    let compiler_output = r#"
clang version 17.0.6
#include "..." search starts here:
#include <...> search starts here:
 /usr/lib/clang/17/include
 /usr/local/include
 /usr/include
 /System/Library/Frameworks (framework directory)
 /usr/include
End of search list.
"#;
    let paths = parse_include_search_paths(compiler_output);

    assert_eq!(
        paths,
        vec![
            PathBuf::from("/usr/lib/clang/17/include"),
            PathBuf::from("/usr/local/include"),
            PathBuf::from("/usr/include"),
        ]
    );
}

#[test]
fn parse_include_search_paths_without_list() {
    assert!(parse_include_search_paths("clang version 17.0.6\n").is_empty());
}
