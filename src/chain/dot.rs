// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graphviz rendering of a built chain.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::chain::plan::BuildChain;
use crate::errors::ChainBuildError;
use crate::observability::messages::chain::GraphWritten;
use crate::observability::messages::StructuredLog;

/// Render the kept steps as a left-to-right digraph, one edge per
/// dependency. Steps without dependencies share the first rank and steps
/// nothing depends on share the last.
pub fn render_dot(chain: &BuildChain) -> String {
    let steps = chain.chain_steps();
    let mut has_dependents = vec![false; steps.len()];
    for step in steps {
        for &dependency in &step.dependencies {
            has_dependents[dependency] = true;
        }
    }

    let mut out = String::new();
    out.push_str("digraph {\n");
    out.push_str("    node [shape=rectangle];\n");
    out.push_str("    rankdir=LR;\n\n");

    out.push_str("    { rank = same; ");
    for step in steps.iter().filter(|s| s.dependencies.is_empty()) {
        let _ = write!(out, "{}; ", quote(step.descriptor.id().as_str()));
    }
    out.push_str("};\n");

    out.push_str("    { rank = same; ");
    for (index, step) in steps.iter().enumerate() {
        if !has_dependents[index] && !step.dependencies.is_empty() {
            let _ = write!(out, "{}; ", quote(step.descriptor.id().as_str()));
        }
    }
    out.push_str("};\n\n");

    for step in steps {
        for &dependency in &step.dependencies {
            let _ = writeln!(
                out,
                "    {} -> {};",
                quote(steps[dependency].descriptor.id().as_str()),
                quote(step.descriptor.id().as_str())
            );
        }
    }

    out.push_str("}\n");
    out
}

pub fn write_graph(chain: &BuildChain, path: &Path) -> Result<(), ChainBuildError> {
    fs::write(path, render_dot(chain)).map_err(|source| ChainBuildError::GraphOutput {
        path: path.to_path_buf(),
        source,
    })?;

    GraphWritten {
        path: &path.display().to_string(),
        step_count: chain.step_count(),
    }
    .log();
    Ok(())
}

fn quote(id: &str) -> String {
    let mut quoted = String::with_capacity(id.len() + 2);
    quoted.push('"');
    for c in id.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
    }
}
