//! Core analyzer for orchestrating rule execution.

use crate::config::Config;
use crate::context::FileContext;
use crate::parser::{ParserBox, SourceParser};
use crate::query::{find_first_descendant, package_matches, qualified_name};
use crate::rule::{walk, Rule, RuleBox};
use crate::tree::{NodeKind, SyntaxTree};
use crate::types::LintResult;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error walking the source tree.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Error parsing a source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Source analysis was requested without a parser.
    #[error("No source parser configured")]
    NoParser,
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    parser: Option<ParserBox>,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the frontend used to parse discovered files.
    #[must_use]
    pub fn parser<P: SourceParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// Rules disabled in the configuration are dropped here.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be read or an
    /// exclude pattern is not a valid glob.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut patterns = self.exclude_patterns;
        patterns.extend(config.analyzer.exclude.iter().cloned());
        let excludes = patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let rules = self
            .rules
            .into_iter()
            .filter(|rule| {
                let enabled = config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .collect();

        Ok(Analyzer {
            root,
            rules,
            excludes,
            config,
            parser: self.parser,
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// The main analyzer that orchestrates rule execution.
///
/// Use [`Analyzer::builder()`] to construct an instance. An analyzer owns its
/// rule instances and runs them on one file at a time.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    excludes: Vec<glob::Pattern>,
    config: Config,
    parser: Option<ParserBox>,
    fail_on_parse_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of enabled rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Analyzes every source file under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if no parser is configured, discovery fails, a file
    /// cannot be read, or a file fails to parse while
    /// `fail_on_parse_error` is set.
    pub fn analyze(&mut self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let mut result = LintResult::new();
        for path in &files {
            let content = std::fs::read_to_string(path)?;
            match self.analyze_source(path, &content) {
                Ok(file_result) => result.extend(file_result),
                Err(AnalyzerError::Parse { path, message }) => {
                    warn!("Failed to parse {}: {}", path.display(), message);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse { path, message });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Parses and checks one in-memory source file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::NoParser`] without a parser and
    /// [`AnalyzerError::Parse`] when the source does not parse.
    pub fn analyze_source(
        &mut self,
        path: &Path,
        content: &str,
    ) -> Result<LintResult, AnalyzerError> {
        debug!("Analyzing: {}", path.display());

        let parser = self.parser.as_mut().ok_or(AnalyzerError::NoParser)?;
        let tree = parser.parse(content).map_err(|e| AnalyzerError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let ctx = FileContext::new(path, content, &self.root);
        Ok(self.check_tree(&ctx, &tree))
    }

    /// Runs every enabled rule over an already built tree.
    ///
    /// Files whose package is listed in `analyzer.ignore_packages` are
    /// skipped and not counted as checked.
    pub fn check_tree(&mut self, ctx: &FileContext<'_>, tree: &SyntaxTree) -> LintResult {
        let mut result = LintResult::new();

        if let Some(package) = self.ignored_package(tree) {
            debug!(
                "Skipping {} in ignored package {package}",
                ctx.relative_path.display()
            );
            return result;
        }

        let report = walk(tree, ctx, &mut self.rules);
        result.violations = report.violations;
        result.rule_failures = report.failures;
        result.files_checked = 1;

        for v in &mut result.violations {
            if let Some(severity) = self.config.rule_severity(&v.rule) {
                v.severity = severity;
            }
        }

        result
    }

    fn ignored_package(&self, tree: &SyntaxTree) -> Option<String> {
        let ignore = &self.config.analyzer.ignore_packages;
        if ignore.is_empty() {
            return None;
        }
        let package = find_first_descendant(tree.root(), NodeKind::PackageDef)?;
        let name = qualified_name(package).ok()?;
        ignore
            .iter()
            .any(|prefix| package_matches(&name, prefix))
            .then_some(name)
    }

    /// Discovers source files with the parser's extensions, sorted by path.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let parser = self.parser.as_ref().ok_or(AnalyzerError::NoParser)?;
        let extensions = parser.extensions();

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.config.analyzer.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let matches_extension = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.contains(&e));
            if !matches_extension {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks a path against the exclude patterns, both as given and
    /// relative to the root.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.excludes
            .iter()
            .any(|pattern| pattern.matches_path(path) || pattern.matches_path(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseError;
    use crate::query::QueryError;
    use crate::rule::Reporter;
    use crate::tree::{Node, TreeBuilder};
    use crate::types::Severity;
    use std::fs;

    /// Reads `package x;` and `import y;` lines, one node per line.
    struct LineParser;

    impl SourceParser for LineParser {
        fn language_id(&self) -> &'static str {
            "lines"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["java"]
        }

        fn parse(&mut self, source: &str) -> Result<SyntaxTree, ParseError> {
            let mut b = TreeBuilder::new();
            b.start_node(NodeKind::CompilationUnit, 1);
            for (i, line) in source.lines().enumerate() {
                let line_no = i + 1;
                let line = line.trim().trim_end_matches(';');
                let (kind, name) = if let Some(name) = line.strip_prefix("package ") {
                    (NodeKind::PackageDef, name)
                } else if let Some(name) = line.strip_prefix("import ") {
                    (NodeKind::Import, name)
                } else if line == "!!" {
                    return Err(ParseError::Syntax { line: line_no });
                } else {
                    continue;
                };
                b.start_node(kind, line_no);
                b.qualified(name, line_no);
                b.finish_node();
            }
            b.finish_node();
            Ok(b.finish()?)
        }
    }

    struct EveryImport;

    impl Rule for EveryImport {
        fn name(&self) -> &'static str {
            "every-import"
        }
        fn code(&self) -> &'static str {
            "T100"
        }
        fn interests(&self) -> &'static [NodeKind] {
            &[NodeKind::Import]
        }
        fn begin_file(&mut self, _ctx: &FileContext<'_>) {}
        fn visit(&mut self, node: Node<'_>, report: &mut Reporter) -> Result<(), QueryError> {
            report.report(node.line(), qualified_name(node)?);
            Ok(())
        }
    }

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write");
    }

    #[test]
    fn builder_rejects_bad_glob() {
        let err = Analyzer::builder()
            .root(".")
            .exclude("[")
            .build()
            .err()
            .expect("invalid pattern");
        assert!(matches!(err, AnalyzerError::Glob(_)));
    }

    #[test]
    fn exclude_patterns_match_relative_and_absolute_paths() {
        let analyzer = Analyzer::builder()
            .root("/repo")
            .exclude("**/generated/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new("/repo/target/A.java")));
        assert!(analyzer.should_exclude(Path::new("/repo/src/generated/B.java")));
        assert!(!analyzer.should_exclude(Path::new("/repo/src/C.java")));
    }

    #[test]
    fn analyze_requires_parser() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(EveryImport)
            .build()
            .expect("build");
        assert!(matches!(analyzer.analyze(), Err(AnalyzerError::NoParser)));
    }

    #[test]
    fn analyze_discovers_sorts_and_excludes() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "src/b/B.java", "package b;\nimport x.Y;\n");
        write(dir.path(), "src/a/A.java", "package a;\nimport x.Z;\nimport x.W;\n");
        write(dir.path(), "build/Gen.java", "import gen.G;\n");
        write(dir.path(), "src/notes.txt", "import no.Pe;\n");

        let mut analyzer = Analyzer::builder()
            .root(dir.path())
            .parser(LineParser)
            .rule(EveryImport)
            .build()
            .expect("build");

        let result = analyzer.analyze().expect("analyze");
        assert_eq!(result.files_checked, 2);
        let messages: Vec<&str> = result.violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages, vec!["x.Z", "x.W", "x.Y"]);
        assert_eq!(
            result.violations[0].location.file,
            Path::new("src/a/A.java")
        );
    }

    #[test]
    fn parse_errors_are_skipped_unless_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "Bad.java", "!!\n");
        write(dir.path(), "Good.java", "import a.B;\n");

        let mut lenient = Analyzer::builder()
            .root(dir.path())
            .parser(LineParser)
            .rule(EveryImport)
            .build()
            .expect("build");
        let result = lenient.analyze().expect("analyze");
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations.len(), 1);

        let mut strict = Analyzer::builder()
            .root(dir.path())
            .parser(LineParser)
            .rule(EveryImport)
            .fail_on_parse_error(true)
            .build()
            .expect("build");
        assert!(matches!(
            strict.analyze(),
            Err(AnalyzerError::Parse { .. })
        ));
    }

    #[test]
    fn config_disables_rules_and_overrides_severity() {
        let config = Config::parse(
            r#"
[rules.every-import]
severity = "info"
"#,
        )
        .expect("config");
        let mut analyzer = Analyzer::builder()
            .root(".")
            .config(config)
            .parser(LineParser)
            .rule(EveryImport)
            .build()
            .expect("build");
        let result = analyzer
            .analyze_source(Path::new("A.java"), "import a.B;\n")
            .expect("analyze");
        assert_eq!(result.violations[0].severity, Severity::Info);

        let config = Config::parse("[rules.every-import]\nenabled = false\n").expect("config");
        let analyzer = Analyzer::builder()
            .config(config)
            .rule(EveryImport)
            .build()
            .expect("build");
        assert_eq!(analyzer.rule_count(), 0);
    }

    #[test]
    fn ignored_packages_are_not_checked() {
        let config = Config::parse(
            r#"
[analyzer]
ignore_packages = ["br.gov.tcu"]
"#,
        )
        .expect("config");
        let mut analyzer = Analyzer::builder()
            .root(".")
            .config(config)
            .parser(LineParser)
            .rule(EveryImport)
            .build()
            .expect("build");

        let skipped = analyzer
            .analyze_source(Path::new("A.java"), "package br.gov.tcu.contas;\nimport a.B;\n")
            .expect("analyze");
        assert_eq!(skipped.files_checked, 0);
        assert!(skipped.violations.is_empty());

        let checked = analyzer
            .analyze_source(Path::new("B.java"), "package br.gov.tcux;\nimport a.B;\n")
            .expect("analyze");
        assert_eq!(checked.files_checked, 1);
        assert_eq!(checked.violations.len(), 1);
    }
}
