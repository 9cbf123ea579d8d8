//! List checks command implementation.

use tree_lint_checks::all_checks;

/// Runs the list-checks command.
pub fn run() {
    println!("Available checks:\n");
    println!("{:<15} {:<9} Description", "Name", "Severity");
    println!("{}", "-".repeat(80));

    for check in all_checks() {
        println!(
            "{:<15} {:<9} {}",
            check.name(),
            check.default_severity().to_string(),
            check.description()
        );
        let tokens: Vec<&str> = check.acceptable_tokens().iter().map(|t| t.name()).collect();
        println!("{:<25} tokens: {}", "", tokens.join(", "));
    }

    println!("\nPresets:");
    println!("  recommended  - NestingDepth, MethodCount, EmptyBlock (default)");
    println!("  strict       - All checks with tighter limits");

    println!("\nUse --checks to run specific configured checks, e.g.:");
    println!("  tree-lint check --checks NestingDepth,EmptyBlock");
}
