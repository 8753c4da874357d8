//! The `engine` module contains [`MutationEngine`], which drives a whole mutation run:
//! validate the request, parse the input, select candidates, try every applicable
//! transform against every candidate with each attempt isolated in its own tree clone,
//! and hand successes to the writer.
//!
//! Failure isolation is the load-bearing rule here.  A correlation mismatch or a
//! refused apply is recorded and the loop continues; only validation and parse errors
//! abort a run.

use crate::ast::SyntaxNode;
use crate::bug_report::BugReport;
use crate::error::EquimorphError;
use crate::index::SyntaxIndex;
use crate::mutant::{Mutant, MutationResult, RunMetadata};
use crate::parser::parse;
use crate::pretty_printer::PrettyPrinter;
use crate::selection::{Candidate, GuidedStrategy, RandomStrategy, TargetStrategy};
use crate::transform::{Transform, TransformRegistry};
use crate::writer::MutantWriter;
use std::path::Path;

/// Drives mutation runs against a transform registry.
pub struct MutationEngine<'a> {
    registry: &'a TransformRegistry,
    printer: PrettyPrinter,
}

impl<'a> MutationEngine<'a> {
    pub fn new(registry: &'a TransformRegistry) -> MutationEngine<'a> {
        MutationEngine {
            registry,
            printer: PrettyPrinter::new(4),
        }
    }

    /// Run with randomly sampled candidates.
    ///
    /// # Arguments
    ///
    /// * `input_path` - The source file to mutate.
    /// * `output_directory` - Where mutants are written.
    /// * `count` - Requested candidate count; zero selects the default.
    /// * `seed` - Fixed RNG seed, or None to seed from the clock.
    /// * `transform` - Restrict the run to one transform by name.
    pub fn run_random(
        &self,
        input_path: &Path,
        output_directory: &Path,
        count: i64,
        seed: Option<u64>,
        transform: Option<&str>,
    ) -> Result<MutationResult, EquimorphError> {
        let working_set = self.validate(input_path, output_directory, transform)?;
        if count < 0 {
            return Err(EquimorphError::InvalidArgument(format!(
                "candidate count must be non-negative, found {}",
                count
            )));
        }
        let (source, tree) = Self::load(input_path)?;
        let index = SyntaxIndex::build(&tree);
        let mut strategy = match seed {
            Some(seed) => RandomStrategy::new(seed),
            None => RandomStrategy::from_time(),
        };
        let candidates = strategy.select(&index, count);
        Ok(self.execute(&source, &index, input_path, output_directory, candidates, &working_set))
    }

    /// Run against explicit target lines.
    pub fn run_target(
        &self,
        input_path: &Path,
        output_directory: &Path,
        target_lines: &[i64],
        transform: Option<&str>,
    ) -> Result<MutationResult, EquimorphError> {
        let working_set = self.validate(input_path, output_directory, transform)?;
        let (source, tree) = Self::load(input_path)?;
        let index = SyntaxIndex::build(&tree);
        let candidates = TargetStrategy.select(&index, target_lines)?;
        // An explicitly empty line list is an empty request the caller asked for,
        // not a zero-mutant failure.
        if target_lines.is_empty() {
            return Ok(MutationResult {
                success: true,
                mutants: Vec::new(),
                error_messages: Vec::new(),
                metadata: RunMetadata::default(),
            });
        }
        Ok(self.execute(&source, &index, input_path, output_directory, candidates, &working_set))
    }

    /// Run guided by an analyzer bug report.
    pub fn run_guided(
        &self,
        input_path: &Path,
        output_directory: &Path,
        report: &BugReport,
        transform: Option<&str>,
    ) -> Result<MutationResult, EquimorphError> {
        let working_set = self.validate(input_path, output_directory, transform)?;
        report.validate()?;
        let (source, tree) = Self::load(input_path)?;
        let index = SyntaxIndex::build(&tree);
        let candidates = GuidedStrategy.select(&index, report)?;
        Ok(self.execute(&source, &index, input_path, output_directory, candidates, &working_set))
    }

    /// Fail-fast request validation, resolving the working transform set.
    fn validate(
        &self,
        input_path: &Path,
        output_directory: &Path,
        transform: Option<&str>,
    ) -> Result<Vec<&dyn Transform>, EquimorphError> {
        if input_path.as_os_str().is_empty() {
            return Err(EquimorphError::InvalidArgument(String::from(
                "input path must not be empty",
            )));
        }
        if output_directory.as_os_str().is_empty() {
            return Err(EquimorphError::InvalidArgument(String::from(
                "output directory must not be empty",
            )));
        }
        let working_set: Vec<&dyn Transform> = match transform {
            Some(name) => vec![self
                .registry
                .get(name)
                .ok_or_else(|| EquimorphError::TransformNotFound(String::from(name)))?],
            None => self.registry.all().collect(),
        };
        if working_set.is_empty() {
            return Err(EquimorphError::NoTransforms);
        }
        Ok(working_set)
    }

    fn load(input_path: &Path) -> Result<(String, crate::ast::SyntaxTree), EquimorphError> {
        let source = std::fs::read_to_string(input_path)?;
        let tree = parse(&source)?;
        Ok((source, tree))
    }

    /// The core loop over `candidates` x `working_set`, in that order.
    fn execute(
        &self,
        source: &str,
        index: &SyntaxIndex<'_>,
        input_path: &Path,
        output_directory: &Path,
        candidates: Vec<Candidate>,
        working_set: &[&dyn Transform],
    ) -> MutationResult {
        let writer = MutantWriter::new(output_directory);
        let mut mutants: Vec<Mutant> = Vec::new();
        let mut error_messages: Vec<String> = Vec::new();
        let mut attempt_count: usize = 0;

        for candidate in &candidates {
            for transform in working_set {
                let applicable = transform.check(index, &candidate.node);
                if applicable.is_empty() {
                    continue;
                }
                for node in &applicable {
                    attempt_count += 1;
                    match self.attempt(source, *transform, candidate, node) {
                        Ok(mut mutant) => {
                            if let Err(error) = writer.write(&mut mutant, input_path) {
                                let message = format!(
                                    "could not write mutant from {}: {}",
                                    transform.name(),
                                    error
                                );
                                log::debug!("{}", message);
                                error_messages.push(message);
                            }
                            mutants.push(mutant);
                        }
                        Err(message) => {
                            log::debug!("{}", message);
                            error_messages.push(message);
                        }
                    }
                }
            }
        }

        let success = !mutants.is_empty();
        if !success {
            let message = if candidates.is_empty() {
                "no candidate nodes found for mutation"
            } else if attempt_count == 0 {
                "no transform was applicable to any candidate"
            } else {
                "all mutation attempts failed during apply"
            };
            error_messages.push(String::from(message));
        }

        MutationResult {
            success,
            mutants,
            error_messages,
            metadata: RunMetadata {
                candidate_count: candidates.len(),
                attempt_count,
            },
        }
    }

    /// One isolated attempt: re-parse the source into a fresh clone, correlate the
    /// target and candidate into it, apply, and print.
    fn attempt(
        &self,
        source: &str,
        transform: &dyn Transform,
        candidate: &Candidate,
        node: &SyntaxNode,
    ) -> Result<Mutant, String> {
        let mut clone = parse(source).map_err(|e| e.to_string())?;

        let (target, correlated_source, sibling) = {
            let clone_index = SyntaxIndex::build(&clone);
            let target = clone_index
                .find_node_by_position(node, node.pos.line, node.pos.column)
                .map_err(|e| e.to_string())?;
            let correlated_source = clone_index
                .find_node_by_position(&candidate.node, candidate.node.pos.line, candidate.node.pos.column)
                .map_err(|e| e.to_string())?;
            let sibling = clone.next_sibling(correlated_source.id).cloned();
            (target.clone(), correlated_source.clone(), sibling)
        };

        if transform.apply(&target, &mut clone, sibling.as_ref(), &correlated_source) {
            let text = self.printer.print_tree(&clone);
            Ok(Mutant::new(transform.name(), node, text))
        } else {
            Err(format!(
                "transform {} did not apply to {} at {}",
                transform.name(),
                node.tag(),
                node.pos
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxTree;
    use std::fs;
    use tempfile::tempdir;

    static SAMPLE: &str = "class Account {\n\
        int balance = 0;\n\
        void deposit(int amount) {\n\
            if (amount > 0) {\n\
                balance = balance + amount;\n\
            }\n\
        }\n\
    }\n";

    fn write_sample(dir: &Path) -> std::path::PathBuf {
        let input = dir.join("Account.java");
        fs::write(&input, SAMPLE).unwrap();
        input
    }

    struct AlwaysRefuses {}

    impl Transform for AlwaysRefuses {
        fn name(&self) -> &'static str {
            "always_refuses"
        }
        fn description(&self) -> &'static str {
            "Accepts every statement in check and refuses every apply."
        }
        fn check(&self, _index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode> {
            if node.is_statement() {
                vec![node.clone()]
            } else {
                Vec::new()
            }
        }
        fn apply(
            &self,
            _target: &SyntaxNode,
            _tree: &mut SyntaxTree,
            _sibling: Option<&SyntaxNode>,
            _source: &SyntaxNode,
        ) -> bool {
            false
        }
    }

    struct NeverApplicable {}

    impl Transform for NeverApplicable {
        fn name(&self) -> &'static str {
            "never_applicable"
        }
        fn description(&self) -> &'static str {
            "Rejects every candidate in check."
        }
        fn check(&self, _index: &SyntaxIndex<'_>, _node: &SyntaxNode) -> Vec<SyntaxNode> {
            Vec::new()
        }
        fn apply(
            &self,
            _target: &SyntaxNode,
            _tree: &mut SyntaxTree,
            _sibling: Option<&SyntaxNode>,
            _source: &SyntaxNode,
        ) -> bool {
            false
        }
    }

    #[test]
    fn test_seeded_random_run_produces_written_mutants() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());
        let output = dir.path().join("out");

        let registry = TransformRegistry::with_builtins();
        let engine = MutationEngine::new(&registry);
        let result = engine
            .run_random(&input, &output, 3, Some(11), None)
            .unwrap();

        assert!(result.success);
        assert_eq!(result.metadata.candidate_count, 3);
        for mutant in &result.mutants {
            let path = mutant.output_path.as_ref().unwrap();
            let contents = fs::read_to_string(path).unwrap();
            let header = contents.lines().next().unwrap();
            assert_eq!(
                header,
                format!(
                    "// mutant by transform {} from {}",
                    mutant.transform,
                    input.display()
                )
            );
            // The body must still parse as a well-formed program.
            let body = contents.splitn(2, '\n').nth(1).unwrap();
            assert!(parse(body).is_ok());
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());
        let registry = TransformRegistry::with_builtins();
        let engine = MutationEngine::new(&registry);

        let first = engine
            .run_random(&input, &dir.path().join("a"), 3, Some(7), None)
            .unwrap();
        let second = engine
            .run_random(&input, &dir.path().join("b"), 3, Some(7), None)
            .unwrap();

        let first_texts: Vec<&String> = first.mutants.iter().map(|m| &m.text).collect();
        let second_texts: Vec<&String> = second.mutants.iter().map(|m| &m.text).collect();
        assert_eq!(first_texts, second_texts);
    }

    #[test]
    fn test_target_run_hits_only_requested_lines() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());
        let registry = TransformRegistry::with_builtins();
        let engine = MutationEngine::new(&registry);

        let result = engine
            .run_target(&input, &dir.path().join("out"), &[5], Some("self_assign"))
            .unwrap();

        assert!(result.success);
        for mutant in &result.mutants {
            assert_eq!(mutant.transform, "self_assign");
            assert_eq!(mutant.target.line, 5);
        }
    }

    #[test]
    fn test_two_applicable_transforms_yield_two_distinct_files() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());

        let mut registry = TransformRegistry::new();
        registry.register(Box::new(crate::transforms::SelfAssign {}));
        registry.register(Box::new(crate::transforms::IfTrueWrap {}));
        let engine = MutationEngine::new(&registry);

        let result = engine
            .run_target(&input, &dir.path().join("out"), &[5], None)
            .unwrap();

        assert!(result.success);
        assert_eq!(result.mutants.len(), 2);
        let paths: Vec<&std::path::Path> = result
            .mutants
            .iter()
            .map(|m| m.output_path.as_deref().unwrap())
            .collect();
        assert_ne!(paths[0], paths[1]);
        for path in paths {
            assert!(path.exists());
        }
    }

    #[test]
    fn test_random_run_with_selective_transforms_yields_one_mutant_each() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());

        // Of the sample's nodes, double_negation applies only to the if statement
        // and self_assign only to the assignment statement.
        let mut registry = TransformRegistry::new();
        registry.register(Box::new(crate::transforms::DoubleNegation {}));
        registry.register(Box::new(crate::transforms::SelfAssign {}));
        let engine = MutationEngine::new(&registry);

        // A count larger than the tree selects every node.
        let result = engine
            .run_random(&input, &dir.path().join("out"), 100, Some(3), None)
            .unwrap();

        assert!(result.success);
        assert_eq!(result.mutants.len(), 2);
        let mut names: Vec<&str> = result
            .mutants
            .iter()
            .map(|m| m.transform.as_str())
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["double_negation", "self_assign"]);

        let paths: Vec<&std::path::Path> = result
            .mutants
            .iter()
            .map(|m| m.output_path.as_deref().unwrap())
            .collect();
        assert_ne!(paths[0], paths[1]);
        for mutant in &result.mutants {
            let path = mutant.output_path.as_ref().unwrap();
            let contents = fs::read_to_string(path).unwrap();
            let header = contents.lines().next().unwrap();
            assert_eq!(
                header,
                format!(
                    "// mutant by transform {} from {}",
                    mutant.transform,
                    input.display()
                )
            );
        }
    }

    #[test]
    fn test_empty_target_lines_is_an_empty_success() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());
        let registry = TransformRegistry::with_builtins();
        let engine = MutationEngine::new(&registry);

        let result = engine
            .run_target(&input, &dir.path().join("out"), &[], None)
            .unwrap();

        assert!(result.success);
        assert!(result.mutants.is_empty());
        assert!(result.error_messages.is_empty());
        assert_eq!(result.metadata.candidate_count, 0);
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_guided_run_from_report() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());
        let registry = TransformRegistry::with_builtins();
        let engine = MutationEngine::new(&registry);

        let report = BugReport::new(true, vec![5]).unwrap();
        let result = engine
            .run_guided(&input, &dir.path().join("out"), &report, None)
            .unwrap();
        assert!(result.success);
        assert!(result.metadata.candidate_count > 0);
    }

    #[test]
    fn test_failing_apply_is_recorded_not_fatal() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());

        let mut registry = TransformRegistry::new();
        registry.register(Box::new(AlwaysRefuses {}));
        let engine = MutationEngine::new(&registry);

        let result = engine
            .run_target(&input, &dir.path().join("out"), &[4, 5], None)
            .unwrap();

        assert!(!result.success);
        assert!(result.metadata.attempt_count > 0);
        assert!(result
            .error_messages
            .iter()
            .any(|m| m == "all mutation attempts failed during apply"));
        assert!(result
            .error_messages
            .iter()
            .any(|m| m.contains("always_refuses")));
    }

    #[test]
    fn test_no_applicable_transform_is_distinguished() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());

        let mut registry = TransformRegistry::new();
        registry.register(Box::new(NeverApplicable {}));
        let engine = MutationEngine::new(&registry);

        let result = engine
            .run_target(&input, &dir.path().join("out"), &[4, 5], None)
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.metadata.attempt_count, 0);
        assert!(result
            .error_messages
            .iter()
            .any(|m| m == "no transform was applicable to any candidate"));
    }

    #[test]
    fn test_no_candidates_is_distinguished() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());
        let registry = TransformRegistry::with_builtins();
        let engine = MutationEngine::new(&registry);

        let result = engine
            .run_target(&input, &dir.path().join("out"), &[400], None)
            .unwrap();

        assert!(!result.success);
        assert!(result
            .error_messages
            .iter()
            .any(|m| m == "no candidate nodes found for mutation"));
    }

    #[test]
    fn test_unknown_transform_name_fails_fast() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());
        let registry = TransformRegistry::with_builtins();
        let engine = MutationEngine::new(&registry);

        let result = engine.run_random(&input, &dir.path().join("out"), 3, Some(1), Some("bogus"));
        assert!(matches!(result, Err(EquimorphError::TransformNotFound(_))));
    }

    #[test]
    fn test_empty_registry_fails_fast() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());
        let registry = TransformRegistry::new();
        let engine = MutationEngine::new(&registry);

        let result = engine.run_random(&input, &dir.path().join("out"), 3, Some(1), None);
        assert!(matches!(result, Err(EquimorphError::NoTransforms)));
    }

    #[test]
    fn test_negative_count_fails_fast() {
        let dir = tempdir().unwrap();
        let input = write_sample(dir.path());
        let registry = TransformRegistry::with_builtins();
        let engine = MutationEngine::new(&registry);

        let result = engine.run_random(&input, &dir.path().join("out"), -1, Some(1), None);
        assert!(matches!(result, Err(EquimorphError::InvalidArgument(_))));
    }

    #[test]
    fn test_invalid_report_fails_fast_without_reading_input() {
        let registry = TransformRegistry::with_builtins();
        let engine = MutationEngine::new(&registry);
        let report = BugReport {
            has_bugs: true,
            lines: vec![],
        };
        // The input path does not exist; validation must fail before any I/O.
        let result = engine.run_guided(
            Path::new("missing.java"),
            Path::new("out"),
            &report,
            None,
        );
        assert!(matches!(result, Err(EquimorphError::InvalidArgument(_))));
    }
}
