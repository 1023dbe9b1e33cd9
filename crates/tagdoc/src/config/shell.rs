//! POSIX-ish word splitting for list-valued settings and `CFLAGS`.

/// Split `line` into words. Whitespace separates words; single quotes group
/// literally, double quotes group with `\"` and `\\` escapes, and a
/// backslash outside quotes escapes the next character.
///
/// Returns `None` when a quote is left open or the line ends in a lone
/// backslash.
pub fn split(line: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            },
            '\'' => {
                in_word = true;
                loop {
                    match chars.next()? {
                        '\'' => break,
                        c => word.push(c),
                    }
                }
            },
            '"' => {
                in_word = true;
                loop {
                    match chars.next()? {
                        '"' => break,
                        '\\' => match chars.next()? {
                            c @ ('"' | '\\') => word.push(c),
                            c => {
                                word.push('\\');
                                word.push(c);
                            },
                        },
                        c => word.push(c),
                    }
                }
            },
            '\\' => {
                in_word = true;
                word.push(chars.next()?);
            },
            c => {
                in_word = true;
                word.push(c);
            },
        }
    }

    if in_word {
        words.push(word);
    }
    Some(words)
}

#[cfg(test)]
#[path = "../../tests/src/config/shell_tests.rs"]
mod tests;
