//! Integration test: built-in rules over real Java source.
//!
//! Sources are parsed with the tree-sitter frontend, so these tests cover
//! lowering, resolution and rule logic together. The fixture project under
//! `tests/fixtures/blueprints/` is analyzed end-to-end through discovery.

use archcheck_core::{Analyzer, Config, LintResult, Severity};
use archcheck_java::JavaParser;
use archcheck_rules::{
    all_rules, rules_from_config, ForbiddenDependency, NoParameterReassignment, RequireBaseClass,
};
use std::path::{Path, PathBuf};

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/blueprints")
}

fn lines(result: &LintResult) -> Vec<(&str, usize)> {
    result
        .violations
        .iter()
        .map(|v| (v.code.as_str(), v.location.line))
        .collect()
}

// ── Inheritance ──

#[test]
fn action_without_base_class_is_reported_at_declaration() {
    let mut analyzer = Analyzer::builder()
        .root(fixture_root())
        .parser(JavaParser::new())
        .rule(RequireBaseClass::new())
        .build()
        .expect("analyzer should build");

    let path = fixture_root().join("consumerwebsite/actions/CatalogHTMLAction.java");
    let source = std::fs::read_to_string(&path).expect("fixture should exist");
    let result = analyzer
        .analyze_source(&path, &source)
        .expect("fixture should parse");

    // DummyHTMLAction on line 21 extends HTMLActionSupport.
    assert_eq!(lines(&result), vec![("AC001", 13)]);
    assert_eq!(
        result.violations[0].message,
        "HTML action classes must extend HTMLActionSupport"
    );
    assert_eq!(
        result.violations[0].location.file,
        Path::new("consumerwebsite/actions/CatalogHTMLAction.java")
    );
}

#[test]
fn nested_and_annotated_actions() {
    let source = r#"
package a.web;

public class Outer extends HTMLActionSupport {
    static class InnerHTMLAction { }

    @Generated
    class GeneratedHTMLAction { }
}
"#;
    let mut analyzer = Analyzer::builder()
        .parser(JavaParser::new())
        .rule(RequireBaseClass::new())
        .build()
        .expect("analyzer should build");
    let result = analyzer
        .analyze_source(Path::new("Outer.java"), source)
        .expect("source should parse");
    assert_eq!(lines(&result), vec![("AC001", 5), ("AC001", 7)]);

    let mut analyzer = Analyzer::builder()
        .parser(JavaParser::new())
        .rule(
            RequireBaseClass::new()
                .ignore_inner_classes(false)
                .exempt_annotation("Generated"),
        )
        .build()
        .expect("analyzer should build");
    let result = analyzer
        .analyze_source(Path::new("Outer.java"), source)
        .expect("source should parse");
    assert_eq!(lines(&result), vec![("AC001", 5)]);
}

// ── Forbidden dependency ──

#[test]
fn restricted_package_import_is_reported_per_line() {
    let source = "package a.b.processmanager.sub;\n\
                  import a.b.opc.Thing;\n\
                  import a.b.other.Thing;\n\
                  class X {}\n";
    let mut analyzer = Analyzer::builder()
        .parser(JavaParser::new())
        .rule(
            ForbiddenDependency::new()
                .from_package("a.b.processmanager")
                .to_package("a.b.opc"),
        )
        .build()
        .expect("analyzer should build");

    let result = analyzer
        .analyze_source(Path::new("X.java"), source)
        .expect("source should parse");
    assert_eq!(lines(&result), vec![("AC002", 2)]);
}

#[test]
fn restricted_flag_resets_between_files() {
    let restricted = "package a.b.processmanager.sub;\nimport a.b.opc.Thing;\nclass X {}\n";
    let unrelated = "package a.b.unrelated;\nimport a.b.opc.Thing;\nclass Y {}\n";
    let no_package = "import a.b.opc.Thing;\nclass Z {}\n";

    let mut analyzer = Analyzer::builder()
        .parser(JavaParser::new())
        .rule(
            ForbiddenDependency::new()
                .from_package("a.b.processmanager")
                .to_package("a.b.opc"),
        )
        .build()
        .expect("analyzer should build");

    let first = analyzer
        .analyze_source(Path::new("X.java"), restricted)
        .expect("source should parse");
    assert_eq!(lines(&first), vec![("AC002", 2)]);

    let second = analyzer
        .analyze_source(Path::new("Y.java"), unrelated)
        .expect("source should parse");
    assert!(second.violations.is_empty());

    analyzer
        .analyze_source(Path::new("X.java"), restricted)
        .expect("source should parse");
    let third = analyzer
        .analyze_source(Path::new("Z.java"), no_package)
        .expect("source should parse");
    assert!(third.violations.is_empty());
}

// ── Parameter reassignment ──

#[test]
fn only_assignments_resolving_to_parameters_are_reported() {
    let source = r#"
class Account {
    private String owner;
    private int[] history;

    Account(String owner) {
        this.owner = owner;
    }

    void rename(String name, int[] xs) {
        name = name.trim();
        xs[0] = 1;
        String copy = name;
        copy = copy + "!";
        owner = copy;
        this.history = xs;
    }

    void other() {
        String name = "x";
        name = "y";
    }
}
"#;
    let mut analyzer = Analyzer::builder()
        .parser(JavaParser::new())
        .rule(NoParameterReassignment::new())
        .build()
        .expect("analyzer should build");
    let result = analyzer
        .analyze_source(Path::new("Account.java"), source)
        .expect("source should parse");

    assert_eq!(lines(&result), vec![("AC003", 11)]);
    let violation = &result.violations[0];
    assert_eq!(violation.severity, Severity::Warning);
    assert_eq!(violation.message, "Parameter `name` is reassigned");
    assert!(violation.suggestion.is_some());
}

#[test]
fn parameter_wins_over_field_of_same_name() {
    let source = r#"
class Holder {
    private int value;

    void set(int value) {
        value = value + 1;
        this.value = value;
    }
}
"#;
    let mut analyzer = Analyzer::builder()
        .parser(JavaParser::new())
        .rule(NoParameterReassignment::new())
        .build()
        .expect("analyzer should build");
    let result = analyzer
        .analyze_source(Path::new("Holder.java"), source)
        .expect("source should parse");
    assert_eq!(lines(&result), vec![("AC003", 6)]);
}

#[test]
fn long_concatenations_and_records_are_checked() {
    let banner = ["\"=\""; 4000].join(" + ");
    let source = format!(
        "class ReportHTMLAction extends HTMLActionSupport {{\n\
         \x20   static final String BANNER = {banner};\n\
         \x20   void render(String title) {{\n\
         \x20       title = BANNER;\n\
         \x20       print(this, title);\n\
         \x20   }}\n\
         }}\n\
         record ViewHTMLAction(String name) {{ }}\n"
    );

    let mut builder = Analyzer::builder().parser(JavaParser::new());
    for rule in all_rules() {
        builder = builder.rule_box(rule);
    }
    let mut analyzer = builder.build().expect("analyzer should build");
    let result = analyzer
        .analyze_source(Path::new("ReportHTMLAction.java"), &source)
        .expect("source should parse");

    assert_eq!(lines(&result), vec![("AC003", 4)]);
    assert_eq!(result.rule_failures, 0);
}

// ── End-to-end ──

#[test]
fn analyzes_fixture_project() {
    let mut builder = Analyzer::builder()
        .root(fixture_root())
        .parser(JavaParser::new());
    for rule in all_rules() {
        builder = builder.rule_box(rule);
    }
    let mut analyzer = builder.build().expect("analyzer should build");
    let result = analyzer.analyze().expect("analysis should succeed");

    // util/Broken.java does not parse and is skipped.
    assert_eq!(result.files_checked, 3);
    assert_eq!(
        lines(&result),
        vec![("AC001", 13), ("AC002", 4), ("AC002", 5), ("AC003", 13)],
        "{}",
        result.format()
    );
    assert!(result.has_errors());
    assert_eq!(result.count_by_severity(), (3, 1, 0));
}

#[test]
fn config_disables_and_reconfigures_rules() {
    let config = Config::parse(
        r#"
[rules.require-base-class]
enabled = false

[rules.forbidden-dependency]
from = "com.sun.j2ee.blueprints.opc"
to = "com.sun.j2ee.blueprints.processmanager"
message = "opc must not reach back into processmanager"
severity = "warning"
"#,
    )
    .expect("config should parse");

    let mut builder = Analyzer::builder()
        .root(fixture_root())
        .parser(JavaParser::new())
        .config(config.clone());
    for rule in rules_from_config(&config) {
        builder = builder.rule_box(rule);
    }
    let mut analyzer = builder.build().expect("analyzer should build");
    assert_eq!(analyzer.rule_count(), 2);

    let result = analyzer.analyze().expect("analysis should succeed");
    let dependency: Vec<_> = result
        .violations
        .iter()
        .filter(|v| v.code == "AC002")
        .collect();
    assert_eq!(dependency.len(), 1);
    assert_eq!(
        dependency[0].location.file,
        Path::new("opc/ejb/OrderFulfillmentBean.java")
    );
    assert_eq!(dependency[0].location.line, 3);
    assert_eq!(dependency[0].severity, Severity::Warning);
    assert_eq!(
        dependency[0].message,
        "opc must not reach back into processmanager"
    );
}
