use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn temp_source(
    name: &str,
    text: &str,
) -> std::path::PathBuf {
    static NONCE: AtomicUsize = AtomicUsize::new(0);
    let dir = std::env::temp_dir().join(format!(
        "tagdoc-provider-{}-{}",
        std::process::id(),
        NONCE.fetch_add(1, Ordering::Relaxed)
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    fs::write(&path, text).expect("write source");
    path
}

#[test]
fn leading_comment_is_the_first_token() {
    let provider = ClangProvider::with_program("clang");

    let documented = temp_source("widget.h", "\n/* Widget library. */\n#include <stdio.h>\n");
    assert_eq!(provider.leading_comment(&documented).as_deref(), Some("/* Widget library. */"));

    let late = temp_source("late.c", "int x;\n/** late */\n");
    assert_eq!(provider.leading_comment(&late), None);

    for path in [documented, late] {
        let _ = fs::remove_dir_all(path.parent().expect("temp parent"));
    }
}

#[test]
fn unreadable_file_has_no_leading_comment() {
    let provider = ClangProvider::with_program("clang");
    let missing = std::env::temp_dir().join(format!("tagdoc-provider-missing-{}.c", std::process::id()));

    assert_eq!(provider.leading_comment(&missing), None);
}

#[test]
fn documentation_warnings_lead_the_arguments() {
    let provider = ClangProvider::with_program("clang-18");

    assert_eq!(provider.program(), "clang-18");
    assert_eq!(provider.arguments(&["-DNDEBUG".to_owned()]), ["-Wdocumentation", "-DNDEBUG"]);
}
