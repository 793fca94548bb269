// src/core/assembler.rs
use super::walker::Accumulator;
use super::Package;
use crate::config::OutputConfig;

/// Rendering switches for the final document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// The first slot holds the entry point's package and is dropped
    pub exclude_root: bool,
    /// No fences; headers become line comments
    pub code_only: bool,
    /// Info string after the opening fence
    pub fence_info: Option<String>,
    /// Headers show the import path instead of the package name
    pub qualified_headers: bool,
}

impl FormatOptions {
    pub fn from_config(output: &OutputConfig) -> Self {
        Self {
            exclude_root: output.exclude_root,
            code_only: output.code_only,
            fence_info: output.fence_info.clone(),
            qualified_headers: output.qualified_headers,
        }
    }
}

/// Render collected sources as one document
///
/// Only the first emitted slot goes without a package header. When the
/// root slot is dropped, the next package takes over that headerless slot.
pub fn assemble(accumulator: &Accumulator, options: &FormatOptions) -> String {
    let order = accumulator.order();
    let mut result = String::new();

    for (k, package) in order.iter().enumerate() {
        if k == 0 && options.exclude_root {
            continue;
        }
        if k > 1 || (k == 1 && !options.exclude_root) {
            result.push_str(&format_header(package, options));
            result.push('\n');
        }
        result.push_str(&format_functions(accumulator.source(package), options));
        if k + 1 < order.len() {
            result.push_str("\n\n");
        }
    }

    result
}

fn format_header(package: &Package, options: &FormatOptions) -> String {
    let label = if options.qualified_headers {
        &package.path
    } else {
        &package.name
    };
    if options.code_only {
        format!("// {}", label)
    } else {
        label.to_string()
    }
}

fn format_functions(functions: &str, options: &FormatOptions) -> String {
    if options.code_only {
        return functions.to_string();
    }
    format!(
        "```{}{}```",
        options.fence_info.as_deref().unwrap_or(""),
        functions
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(path: &str, name: &str) -> Package {
        Package {
            path: path.to_string(),
            name: name.to_string(),
            units: Vec::new(),
        }
    }

    fn three_packages() -> [Package; 3] {
        [
            package("m", "main"),
            package("m/p1", "p1"),
            package("m/p2", "p2"),
        ]
    }

    fn filled<'m>(packages: &'m [Package], root_text: bool) -> Accumulator<'m> {
        let mut acc = Accumulator::default();
        if root_text {
            acc.append(&packages[0], "func Root() {}\n");
        } else {
            acc.register(&packages[0]);
        }
        acc.append(&packages[1], "func One() {}\n");
        acc.append(&packages[2], "func Two() {}\n");
        acc
    }

    #[test]
    fn first_slot_has_no_header() {
        let packages = three_packages();
        let doc = assemble(&filled(&packages, true), &FormatOptions::default());
        assert_eq!(
            doc,
            "```\nfunc Root() {}\n```\n\np1\n```\nfunc One() {}\n```\n\np2\n```\nfunc Two() {}\n```"
        );
    }

    #[test]
    fn excluded_root_promotes_second_slot() {
        let packages = three_packages();
        let options = FormatOptions {
            exclude_root: true,
            ..FormatOptions::default()
        };
        let doc = assemble(&filled(&packages, false), &options);
        assert_eq!(
            doc,
            "```\nfunc One() {}\n```\n\np2\n```\nfunc Two() {}\n```"
        );
    }

    #[test]
    fn code_only_uses_comment_headers() {
        let packages = three_packages();
        let options = FormatOptions {
            code_only: true,
            ..FormatOptions::default()
        };
        let doc = assemble(&filled(&packages, true), &options);
        assert_eq!(
            doc,
            "\nfunc Root() {}\n\n\n// p1\n\nfunc One() {}\n\n\n// p2\n\nfunc Two() {}\n"
        );
    }

    #[test]
    fn fence_info_and_qualified_headers() {
        let packages = three_packages();
        let options = FormatOptions {
            fence_info: Some("go".to_string()),
            qualified_headers: true,
            ..FormatOptions::default()
        };
        let doc = assemble(&filled(&packages, true), &options);
        assert!(doc.starts_with("```go\nfunc Root() {}\n```"));
        assert!(doc.contains("\n\nm/p1\n```go\n"));
    }

    #[test]
    fn only_root_excluded_renders_empty() {
        let packages = three_packages();
        let mut acc = Accumulator::default();
        acc.register(&packages[0]);
        let options = FormatOptions {
            exclude_root: true,
            ..FormatOptions::default()
        };
        assert_eq!(assemble(&acc, &options), "");
    }
}
