//! Diagnostic output for `roadmap check` and friends
//!
//! - `TerminalEmitter`: one `severity[CODE]: message` block per finding
//! - `JsonEmitter`: machine-readable JSON array
//!
//! ## Exit Code Semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: no errors (warnings allowed) |
//! | 1 | Failure: one or more errors emitted |
//!
//! `--strict` escalates warnings to errors before the exit code is decided.

use std::io::Write;
use std::process;

use roadmap_core::{Diagnostic, Severity};
use serde::Serialize;

// ============================================================================
// Exit Code
// ============================================================================

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    pub fn from_error_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Emitters
// ============================================================================

/// Output policy shared by the emitters
#[derive(Debug, Clone, Default)]
pub struct DiagnosticConfig {
    /// Treat warnings as errors
    pub strict: bool,
    /// Only show errors
    pub quiet: bool,
}

impl DiagnosticConfig {
    pub fn effective_severity(&self, severity: Severity) -> Severity {
        if self.strict {
            Severity::Error
        } else {
            severity
        }
    }

    pub fn should_show(&self, severity: Severity) -> bool {
        !self.quiet || self.effective_severity(severity) == Severity::Error
    }
}

/// Sink for validation findings
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Exit code for everything emitted so far
    fn exit_code(&self) -> ExitCode;

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }
}

/// Human-readable findings
pub struct TerminalEmitter<W: Write> {
    writer: W,
    config: DiagnosticConfig,
    error_count: usize,
    warning_count: usize,
    /// First failed write; findings are still counted after it
    write_error: Option<std::io::Error>,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, config: DiagnosticConfig) -> Self {
        Self {
            writer,
            config,
            error_count: 0,
            warning_count: 0,
            write_error: None,
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Report the first write that failed during `emit`
    pub fn check_writes(&mut self) -> std::io::Result<()> {
        match self.write_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Closing line, e.g. `2 errors, 1 warning`
    pub fn finish(&mut self) -> std::io::Result<()> {
        self.check_writes()?;
        if self.error_count == 0 && self.warning_count == 0 {
            return writeln!(self.writer, "ok: no problems found");
        }
        writeln!(
            self.writer,
            "{} error{}, {} warning{}",
            self.error_count,
            if self.error_count == 1 { "" } else { "s" },
            self.warning_count,
            if self.warning_count == 1 { "" } else { "s" }
        )
    }

    fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> std::io::Result<()> {
        if !self.config.should_show(diagnostic.severity) {
            return Ok(());
        }
        let severity = self.config.effective_severity(diagnostic.severity);
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        writeln!(self.writer, "{}[{}]: {}", severity, diagnostic.code, diagnostic.message)?;
        writeln!(self.writer, "  --> {}", diagnostic.location)?;
        writeln!(self.writer)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        if let Err(err) = self.write_diagnostic(diagnostic) {
            self.write_error.get_or_insert(err);
        }
    }

    fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count)
    }
}

/// Collects findings for `--format json`
pub struct JsonEmitter {
    diagnostics: Vec<JsonDiagnostic>,
    config: DiagnosticConfig,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub location: String,
}

impl JsonEmitter {
    pub fn new(config: DiagnosticConfig) -> Self {
        Self {
            diagnostics: Vec::new(),
            config,
        }
    }

    pub fn diagnostics(&self) -> &[JsonDiagnostic] {
        &self.diagnostics
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.diagnostics)
    }
}

impl DiagnosticEmitter for JsonEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        if !self.config.should_show(diagnostic.severity) {
            return;
        }
        self.diagnostics.push(JsonDiagnostic {
            code: diagnostic.code.to_string(),
            severity: self.config.effective_severity(diagnostic.severity),
            message: diagnostic.message.clone(),
            location: diagnostic.location.clone(),
        });
    }

    fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(
            self.diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .count(),
        )
    }
}
