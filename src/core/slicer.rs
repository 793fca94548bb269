// src/core/slicer.rs
use std::path::Path;

use crate::error::{CallsliceError, Result};
use super::{CompilationUnit, FunctionDecl, LineSpan};

/// Extract the verbatim source of a declaration, documentation comments first
///
/// The file is read again from disk, so the text reflects the file as it is
/// now; every emitted line keeps its original indentation and ends in `\n`.
pub fn slice_source(unit: &CompilationUnit, decl: &FunctionDecl) -> Result<String> {
    let content = std::fs::read_to_string(&unit.path).map_err(|e| {
        CallsliceError::SourceReadFailure {
            path: unit.path.clone(),
            reason: e.to_string(),
        }
    })?;
    let lines: Vec<&str> = content.split('\n').collect();

    let mut out = String::new();
    for span in decl.doc.iter().chain(std::iter::once(&decl.span)) {
        push_lines(&mut out, &lines, *span, &unit.path)?;
    }
    Ok(out)
}

fn push_lines(out: &mut String, lines: &[&str], span: LineSpan, path: &Path) -> Result<()> {
    if span.start == 0 || span.end < span.start || span.end > lines.len() {
        return Err(CallsliceError::SourceReadFailure {
            path: path.to_path_buf(),
            reason: format!(
                "lines {}-{} outside a file of {} lines",
                span.start,
                span.end,
                lines.len()
            ),
        });
    }
    for line in &lines[span.start - 1..span.end] {
        out.push_str(line);
        out.push('\n');
    }
    Ok(())
}
