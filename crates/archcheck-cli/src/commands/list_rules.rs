//! List rules command implementation.

use archcheck_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<28} {:<9} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(90));

    for rule in all_rules() {
        println!(
            "{:<8} {:<28} {:<9} {}",
            rule.code(),
            rule.name(),
            rule.default_severity().to_string(),
            rule.description()
        );
    }

    println!("\nConfigure rules under [rules.<name>] in archcheck.toml.");
    println!("\nUse --rules to run specific rules, e.g.:");
    println!("  archcheck check --rules require-base-class,forbidden-dependency");
    println!("  archcheck check --rules AC001,AC003");
}
