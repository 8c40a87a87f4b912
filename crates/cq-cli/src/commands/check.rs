use std::path::Path;

use colored::Colorize;

pub fn run(dir: &Path, name: &str) -> Result<(), String> {
    let graph = super::load_graph(dir, name)?;
    let issues = graph.validate();

    let (errors, warnings): (Vec<_>, Vec<_>) = issues.iter().partition(|i| i.is_error());
    for issue in &errors {
        println!("  {} {issue}", "error:".red().bold());
    }
    for issue in &warnings {
        println!("  {} {issue}", "warning:".yellow().bold());
    }

    if !errors.is_empty() {
        return Err(format!(
            "{} error(s), {} warning(s) in '{}'",
            errors.len(),
            warnings.len(),
            graph.file_name
        ));
    }

    if warnings.is_empty() {
        println!("  All checks passed for '{}'.", graph.file_name);
    } else {
        println!("  {} warning(s) in '{}'", warnings.len(), graph.file_name);
    }
    println!(
        "  {} nodes, {} choices, {} groups",
        graph.node_count(),
        graph.choice_count(),
        graph.group_count()
    );

    Ok(())
}
