use std::fmt;

/// Diagnostic severity, ordered the way clang ranks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Note,
    Remark,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "note" => Some(Self::Note),
            "remark" => Some(Self::Remark),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "fatal error" => Some(Self::Fatal),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Remark => "remark",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal error",
        }
    }

    /// Anything above a warning stops the whole run.
    pub fn is_fatal(self) -> bool {
        self > Severity::Warning
    }
}

/// A diagnostic reported by the AST provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Option<String>,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    pub severity: Severity,
    pub message: String,
    /// Warning flag that enabled this diagnostic, e.g. `-Wdocumentation`.
    pub option: Option<String>,
}

impl Diagnostic {
    pub fn is_documentation(&self) -> bool {
        self.option.as_deref().is_some_and(|opt| opt.starts_with("-Wdocumentation"))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}: ", file, self.line, self.column)?;
        }
        write!(f, "{}: {}", self.severity.label(), self.message)?;
        if let Some(option) = &self.option {
            write!(f, " [{option}]")?;
        }
        Ok(())
    }
}
