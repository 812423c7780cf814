//! Batch applier implementation.

use orbix_directives::{Directive, extract, sanitize};
use orbix_vcs::{AuthorProvider, VcsError, VersionControl};
use orbix_worktree::{WorkTree, parent_dir};

use crate::CommitRequest;
use crate::error::{ApplyError, StepError};
use crate::message::commit_message;
use crate::result::{BatchResult, ChangeCounts};

/// Default prefix of commit subjects.
const DEFAULT_PREFIX: &str = "[orbix]";

/// File mutations of one response, grouped by kind in document order.
#[derive(Debug, Default)]
struct Plan {
    writes: Vec<(String, String)>,
    renames: Vec<(String, String)>,
    deletes: Vec<String>,
    packages: Vec<String>,
    summary: Option<String>,
}

impl Plan {
    fn from_response(text: &str) -> Self {
        let extraction = extract(&sanitize(text));
        let mut plan = Self::default();

        for directive in extraction.directives {
            match directive {
                Directive::Write { path, content, .. } => plan.writes.push((path, content)),
                Directive::Rename { from, to } => plan.renames.push((from, to)),
                Directive::Delete { path } => plan.deletes.push(path),
                Directive::AddDependency { packages } => plan.packages.extend(packages),
                Directive::ChatSummary { text } => plan.summary = Some(text),
                _ => {}
            }
        }

        plan
    }

    fn is_empty(&self) -> bool {
        self.writes.is_empty()
            && self.renames.is_empty()
            && self.deletes.is_empty()
            && self.packages.is_empty()
    }
}

/// Applies the file directives of a finished response and commits them.
///
/// Writes run first, then renames, then deletes, each in document order.
/// A working-tree failure stops the batch; changes made before it are still
/// committed and the failure is reported in [`BatchResult::error`].
/// Version-control failures abort with [`ApplyError::Vcs`].
///
/// Callers must not run two batches against the same working tree at once.
pub struct BatchApplier<'a> {
    tree: &'a dyn WorkTree,
    vcs: &'a dyn VersionControl,
    author: &'a dyn AuthorProvider,
    message_prefix: String,
}

impl<'a> BatchApplier<'a> {
    /// Create a new batch applier.
    #[must_use]
    pub fn new(
        tree: &'a dyn WorkTree,
        vcs: &'a dyn VersionControl,
        author: &'a dyn AuthorProvider,
    ) -> Self {
        Self {
            tree,
            vcs,
            author,
            message_prefix: DEFAULT_PREFIX.to_owned(),
        }
    }

    /// Set the commit subject prefix.
    #[must_use]
    pub fn message_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.message_prefix = prefix.into();
        self
    }

    /// Apply every file directive in `text` and commit the result once.
    ///
    /// Returns `updated_files: false` without side effects when the response
    /// holds no file directive. The commit subject uses `request.summary`,
    /// falling back to the response's `Orbix-chat-summary`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::Vcs`] if staging or committing fails.
    pub fn apply(&self, text: &str, request: &CommitRequest) -> Result<BatchResult, ApplyError> {
        let plan = Plan::from_response(text);
        if plan.is_empty() {
            tracing::debug!(message_id = ?request.message_id, "No directives to apply");
            return Ok(BatchResult::default());
        }

        let mut counts = ChangeCounts::default();
        let mut touched = Vec::new();

        let error = match self.execute(&plan, &mut counts, &mut touched) {
            Ok(()) => None,
            Err(StepError::Fs(err)) => {
                tracing::warn!(error = %err, "Stopping batch after working-tree failure");
                Some(err.to_string())
            }
            Err(StepError::Vcs(err)) => return Err(err.into()),
        };

        let mut result = BatchResult {
            dependencies: plan.packages.clone(),
            counts,
            error,
            ..BatchResult::default()
        };

        if counts.total() == 0 {
            return Ok(result);
        }

        let extra = self.stage_extra_files(&touched);
        let has_extra = extra.as_ref().is_ok_and(|files| !files.is_empty());
        match extra {
            Ok(files) if !files.is_empty() => result.extra_files = Some(files),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "Failed to stage extra files");
                result.extra_files_error = Some(err.to_string());
            }
        }

        let summary = request.summary.as_deref().or(plan.summary.as_deref());
        let message = commit_message(
            &self.message_prefix,
            summary,
            &counts,
            plan.packages.len(),
            has_extra,
        );
        let author = self.author.author();
        let hash = self.vcs.commit(&message, &author)?;

        tracing::info!(
            commit = %hash,
            message_id = ?request.message_id,
            written = counts.written,
            renamed = counts.renamed,
            deleted = counts.deleted,
            "Committed batch"
        );

        result.updated_files = true;
        result.commit = Some(hash);
        Ok(result)
    }

    fn execute(
        &self,
        plan: &Plan,
        counts: &mut ChangeCounts,
        touched: &mut Vec<String>,
    ) -> Result<(), StepError> {
        for (path, content) in &plan.writes {
            self.tree.ensure_dir(parent_dir(path))?;
            self.tree.write_file(path, content)?;
            self.vcs.stage(path)?;
            touched.push(path.clone());
            counts.written += 1;
        }

        for (from, to) in &plan.renames {
            self.tree.ensure_dir(parent_dir(to))?;
            if !self.tree.exists(from) {
                tracing::warn!(from, to, "Rename source does not exist, skipping");
                counts.skipped += 1;
                continue;
            }
            self.tree.rename(from, to)?;
            self.vcs.stage(to)?;
            self.vcs.remove(from)?;
            touched.push(from.clone());
            touched.push(to.clone());
            counts.renamed += 1;
        }

        for path in &plan.deletes {
            if !self.tree.exists(path) {
                tracing::warn!(path, "Delete target does not exist, skipping");
                counts.skipped += 1;
                continue;
            }
            self.tree.remove(path)?;
            self.vcs.remove(path)?;
            touched.push(path.clone());
            counts.deleted += 1;
        }

        Ok(())
    }

    /// Stage changed files the batch did not touch. Returns their paths.
    fn stage_extra_files(&self, touched: &[String]) -> Result<Vec<String>, VcsError> {
        let extra: Vec<String> = self
            .vcs
            .status()?
            .into_iter()
            .filter(|path| !is_touched(path, touched))
            .collect();

        for path in &extra {
            self.vcs.stage(path)?;
        }
        if !extra.is_empty() {
            tracing::info!(count = extra.len(), "Staged extra files");
        }
        Ok(extra)
    }
}

/// Whether `path` equals a touched path or lies below a touched directory.
fn is_touched(path: &str, touched: &[String]) -> bool {
    touched.iter().any(|t| {
        path == t
            || path
                .strip_prefix(t.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

#[cfg(test)]
mod tests {
    use orbix_vcs::{Author, MockVcs, VcsCall};
    use orbix_worktree::{MockWorkTree, WorkTreeOp};

    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(tree: &MockWorkTree, vcs: &MockVcs, text: &str) -> BatchResult {
        let author = Author::default();
        BatchApplier::new(tree, vcs, &author)
            .apply(text, &CommitRequest::default())
            .unwrap()
    }

    fn stage(path: &str) -> VcsCall {
        VcsCall::Stage(path.to_owned())
    }

    fn remove(path: &str) -> VcsCall {
        VcsCall::Remove(path.to_owned())
    }

    #[test]
    fn test_no_directives() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new();

        let result = apply(&tree, &vcs, "No Orbix-write tags here");

        assert_eq!(result, BatchResult::default());
        assert!(tree.ops().is_empty());
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_single_write() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new();

        let result = apply(
            &tree,
            &vcs,
            r#"<Orbix-write path="src/components/TodoItem.tsx" description="Todo item">export const TodoItem = () => null;</Orbix-write>"#,
        );

        assert!(result.updated_files);
        assert_eq!(result.commit.as_deref(), Some(format!("{:040x}", 1).as_str()));
        assert_eq!(result.counts.written, 1);
        assert!(result.error.is_none());
        assert_eq!(
            tree.ops(),
            vec![
                WorkTreeOp::EnsureDir("src/components".to_owned()),
                WorkTreeOp::Write {
                    path: "src/components/TodoItem.tsx".to_owned(),
                    contents: "export const TodoItem = () => null;".to_owned(),
                },
            ]
        );
        assert_eq!(vcs.commits(), vec!["[orbix] wrote 1 file(s)"]);
    }

    #[test]
    fn test_multiple_writes_one_commit() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new();

        let result = apply(
            &tree,
            &vcs,
            r#"<Orbix-write path="src/a.ts">a</Orbix-write>
<Orbix-write path="src/b.ts">b</Orbix-write>
<Orbix-write path="README.md">readme</Orbix-write>"#,
        );

        assert_eq!(result.counts.written, 3);
        assert_eq!(vcs.commits(), vec!["[orbix] wrote 3 file(s)"]);
        assert_eq!(tree.paths(), vec!["README.md", "src/a.ts", "src/b.ts"]);
    }

    #[test]
    fn test_rename_missing_source_skips() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new();

        let result = apply(
            &tree,
            &vcs,
            r#"<Orbix-rename from="src/Old.jsx" to="src/components/New.jsx"></Orbix-rename>"#,
        );

        assert!(!result.updated_files);
        assert_eq!(result.counts.skipped, 1);
        assert_eq!(
            tree.ops(),
            vec![WorkTreeOp::EnsureDir("src/components".to_owned())]
        );
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_delete_missing_skips() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new();

        let result = apply(&tree, &vcs, r#"<Orbix-delete path="gone.js"></Orbix-delete>"#);

        assert!(!result.updated_files);
        assert!(tree.ops().is_empty());
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_mixed_batch() {
        let tree = MockWorkTree::new()
            .with_file("src/components/OldComponent.jsx", "old")
            .with_file("src/components/Unused.jsx", "unused");
        let vcs = MockVcs::new();

        let result = apply(
            &tree,
            &vcs,
            r#"
    <Orbix-delete path="src/components/Unused.jsx"></Orbix-delete>
    <Orbix-rename from="src/components/OldComponent.jsx" to="src/components/RenamedComponent.jsx"></Orbix-rename>
    <Orbix-write path="src/components/NewComponent.jsx">import React from 'react'; export default () => <div>New</div>;</Orbix-write>
    "#,
        );

        assert!(result.updated_files);
        assert_eq!(
            vcs.calls(),
            vec![
                stage("src/components/NewComponent.jsx"),
                stage("src/components/RenamedComponent.jsx"),
                remove("src/components/OldComponent.jsx"),
                remove("src/components/Unused.jsx"),
                VcsCall::Commit {
                    message: "[orbix] wrote 1 file(s), renamed 1 file(s), deleted 1 file(s)"
                        .to_owned(),
                    author: Author::default(),
                },
            ]
        );
        assert_eq!(
            tree.paths(),
            vec![
                "src/components/NewComponent.jsx",
                "src/components/RenamedComponent.jsx"
            ]
        );
        assert_eq!(
            tree.file("src/components/NewComponent.jsx").as_deref(),
            Some("import React from 'react'; export default () => <div>New</div>;")
        );
    }

    #[test]
    fn test_failure_after_success_still_commits() {
        let tree = MockWorkTree::new().with_failure("src/locked.ts");
        let vcs = MockVcs::new();

        let result = apply(
            &tree,
            &vcs,
            r#"<Orbix-write path="src/a.ts">a</Orbix-write>
<Orbix-write path="src/locked.ts">b</Orbix-write>
<Orbix-write path="src/c.ts">c</Orbix-write>
<Orbix-delete path="src/a.ts"></Orbix-delete>"#,
        );

        assert!(result.updated_files);
        assert_eq!(result.counts.written, 1);
        assert_eq!(result.counts.deleted, 0);
        let error = result.error.unwrap();
        assert!(error.contains("src/locked.ts"), "{error}");
        assert_eq!(tree.paths(), vec!["src/a.ts"]);
        assert_eq!(vcs.commits(), vec!["[orbix] wrote 1 file(s)"]);
    }

    #[test]
    fn test_failure_before_any_change_does_not_commit() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new();

        let result = apply(&tree, &vcs, r#"<Orbix-write path="../escape.ts">x</Orbix-write>"#);

        assert!(!result.updated_files);
        assert!(result.error.unwrap().contains("Invalid path"));
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_delete_directory() {
        let tree = MockWorkTree::new()
            .with_file("src/utils/a.ts", "a")
            .with_file("src/utils/b.ts", "b")
            .with_file("src/main.ts", "m");
        let vcs = MockVcs::new();

        let result = apply(&tree, &vcs, r#"<Orbix-delete path="src/utils/"></Orbix-delete>"#);

        assert_eq!(result.counts.deleted, 1);
        assert_eq!(tree.paths(), vec!["src/main.ts"]);
        assert_eq!(vcs.calls()[0], remove("src/utils"));
    }

    #[test]
    fn test_extra_files_are_committed() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new().with_status(["notes.md", "src/a.ts"]);

        let result = apply(&tree, &vcs, r#"<Orbix-write path="src/a.ts">a</Orbix-write>"#);

        assert_eq!(result.extra_files, Some(vec!["notes.md".to_owned()]));
        assert!(result.extra_files_error.is_none());
        assert_eq!(
            vcs.calls()[..2].to_vec(),
            vec![stage("src/a.ts"), stage("notes.md")]
        );
        assert_eq!(
            vcs.commits(),
            vec!["[orbix] wrote 1 file(s) + extra files edited outside of Orbix"]
        );
    }

    #[test]
    fn test_files_below_deleted_directory_are_not_extra() {
        let tree = MockWorkTree::new().with_file("old/a.ts", "a");
        let vcs = MockVcs::new().with_status(["old/a.ts", "oldish.ts"]);

        let result = apply(&tree, &vcs, r#"<Orbix-delete path="old"></Orbix-delete>"#);

        assert_eq!(result.extra_files, Some(vec!["oldish.ts".to_owned()]));
    }

    #[test]
    fn test_extra_files_staging_failure_is_reported() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new()
            .with_status(["notes.md"])
            .with_failing_path("notes.md");

        let result = apply(&tree, &vcs, r#"<Orbix-write path="a.ts">a</Orbix-write>"#);

        assert!(result.updated_files);
        assert!(result.extra_files.is_none());
        assert!(result.extra_files_error.unwrap().contains("notes.md"));
        assert_eq!(vcs.commits(), vec!["[orbix] wrote 1 file(s)"]);
    }

    #[test]
    fn test_dependencies_only() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new();

        let result = apply(
            &tree,
            &vcs,
            r#"<Orbix-add-dependency packages="react-router zod"></Orbix-add-dependency>"#,
        );

        assert!(!result.updated_files);
        assert_eq!(result.dependencies, vec!["react-router", "zod"]);
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_summary_and_author() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new();
        let author = Author::new("[Orbix]", "dev@example.com");
        let text = r#"<Orbix-chat-summary>Add login page</Orbix-chat-summary>
<Orbix-write path="src/Login.tsx">x</Orbix-write>
<Orbix-add-dependency packages="zod"></Orbix-add-dependency>"#;

        BatchApplier::new(&tree, &vcs, &author)
            .message_prefix("[app]")
            .apply(text, &CommitRequest::default())
            .unwrap();
        BatchApplier::new(&tree, &vcs, &author)
            .apply(
                text,
                &CommitRequest {
                    summary: Some("Explicit".to_owned()),
                    message_id: Some(7),
                },
            )
            .unwrap();

        assert_eq!(
            vcs.commits(),
            vec![
                "[app] Add login page - wrote 1 file(s), requested 1 package(s)",
                "[orbix] Explicit - wrote 1 file(s), requested 1 package(s)",
            ]
        );
        let VcsCall::Commit { author: used, .. } = vcs.calls().pop().unwrap() else {
            panic!("expected commit");
        };
        assert_eq!(used, author);
    }

    #[test]
    fn test_sanitized_attributes() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new();

        apply(
            &tree,
            &vcs,
            r#"<Orbix-write path="src/Nav.tsx" description="Use <a> tags">const a = <a href="/">x</a>;</Orbix-write>"#,
        );

        assert_eq!(
            tree.file("src/Nav.tsx").as_deref(),
            Some(r#"const a = <a href="/">x</a>;"#)
        );
    }

    #[test]
    fn test_commit_failure_propagates() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new().with_failing_commit();
        let author = Author::default();

        let err = BatchApplier::new(&tree, &vcs, &author)
            .apply(
                r#"<Orbix-write path="a.ts">a</Orbix-write>"#,
                &CommitRequest::default(),
            )
            .unwrap_err();

        assert!(matches!(err, ApplyError::Vcs(_)));
    }

    #[test]
    fn test_stage_failure_propagates() {
        let tree = MockWorkTree::new();
        let vcs = MockVcs::new().with_failing_path("a.ts");
        let author = Author::default();

        let err = BatchApplier::new(&tree, &vcs, &author)
            .apply(
                r#"<Orbix-write path="a.ts">a</Orbix-write>"#,
                &CommitRequest::default(),
            )
            .unwrap_err();

        assert!(matches!(err, ApplyError::Vcs(_)));
    }

    #[test]
    fn test_is_touched() {
        let touched = vec!["src/utils".to_owned(), "a.ts".to_owned()];
        assert!(is_touched("src/utils", &touched));
        assert!(is_touched("src/utils/x.ts", &touched));
        assert!(is_touched("a.ts", &touched));
        assert!(!is_touched("src/utilsx.ts", &touched));
        assert!(!is_touched("b.ts", &touched));
    }
}
