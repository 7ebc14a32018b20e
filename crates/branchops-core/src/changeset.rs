//! Change-set classification.
//!
//! Partitions modified files from `git status` text into ruby application
//! code, ruby spec code, and javascript, then derives the minimal spec
//! subset worth running for a push. Derived fresh on every pipeline run so
//! it always reflects the current working tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Fallback scope for the test gate when no application files changed but a
/// run is still forced.
pub const DEFAULT_TEST_SCOPE: &[&str] = &["spec/models", "spec/services"];

/// Spec subdirectories that hold non-runnable support code.
const EXCLUDED_SPEC_DIRS: &[&str] = &["spec/factories", "spec/support"];

/// Modified files, partitioned by role. Partitions are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Ruby application source (`.rb` outside `spec/`).
    pub primary_files: BTreeSet<PathBuf>,

    /// Ruby spec files (`.rb` under `spec/`).
    pub spec_files: BTreeSet<PathBuf>,

    /// Javascript source (`.js` / `.jsx`).
    pub secondary_files: BTreeSet<PathBuf>,
}

impl ChangeSet {
    /// No modified files in any partition.
    pub fn is_empty(&self) -> bool {
        self.primary_files.is_empty()
            && self.spec_files.is_empty()
            && self.secondary_files.is_empty()
    }

    /// All changed ruby files, application and spec alike. This is the
    /// partition the ruby checks (style, security, tests) care about.
    pub fn ruby_files(&self) -> BTreeSet<PathBuf> {
        self.primary_files
            .union(&self.spec_files)
            .cloned()
            .collect()
    }

    pub fn has_ruby_changes(&self) -> bool {
        !self.primary_files.is_empty() || !self.spec_files.is_empty()
    }

    pub fn has_javascript_changes(&self) -> bool {
        !self.secondary_files.is_empty()
    }
}

/// Parse `modified: <path>` lines out of a `git status` report.
///
/// Lines that are not modifications, or whose path is neither ruby nor
/// javascript, are ignored. Returns empty partitions for an empty report.
pub fn classify(status_text: &str) -> ChangeSet {
    let mut changeset = ChangeSet::default();

    for line in status_text.lines() {
        let line = line.trim();
        let Some(path) = line.strip_prefix("modified:") else {
            continue;
        };
        let path = Path::new(path.trim());

        if has_extension(path, &["rb"]) {
            if under_spec_dir(path) {
                changeset.spec_files.insert(path.to_path_buf());
            } else {
                changeset.primary_files.insert(path.to_path_buf());
            }
        } else if has_extension(path, &["js", "jsx"]) {
            changeset.secondary_files.insert(path.to_path_buf());
        }
    }

    changeset
}

/// The spec files worth running for this change set.
///
/// Each application file maps to its unit spec (`app/models/x.rb` becomes
/// `spec/models/x_spec.rb`), included only when that spec exists on disk.
/// Changed spec files are included directly unless they live in an excluded
/// support directory. This is a heuristic: callers fall back to
/// [`DEFAULT_TEST_SCOPE`] when it comes up empty but a run is still wanted.
pub fn impacted_test_subset(changeset: &ChangeSet, repo_root: &Path) -> BTreeSet<PathBuf> {
    let mut subset = BTreeSet::new();

    for file in &changeset.primary_files {
        if let Some(candidate) = unit_spec_for(file) {
            if repo_root.join(&candidate).is_file() {
                subset.insert(candidate);
            }
        }
    }

    for file in &changeset.spec_files {
        let excluded = EXCLUDED_SPEC_DIRS
            .iter()
            .any(|dir| file.starts_with(dir));
        if !excluded {
            subset.insert(file.clone());
        }
    }

    subset
}

/// Map an application source path to its conventional unit-spec path.
fn unit_spec_for(source: &Path) -> Option<PathBuf> {
    let stem = source.file_stem()?.to_str()?;
    let relative = source.strip_prefix("app").unwrap_or(source);
    let spec_name = format!("{stem}_spec.rb");
    Some(
        Path::new("spec")
            .join(relative.parent().unwrap_or_else(|| Path::new("")))
            .join(spec_name),
    )
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.contains(&e))
}

fn under_spec_dir(path: &Path) -> bool {
    path.starts_with("spec")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(set: &BTreeSet<PathBuf>) -> Vec<&str> {
        set.iter().filter_map(|p| p.to_str()).collect()
    }

    #[test]
    fn test_classify_partitions_by_role() {
        let status = "\
\tmodified:   app/foo.rb
\tmodified:   spec/foo_spec.rb
\tmodified:   app/bar.js
";
        let changeset = classify(status);
        assert_eq!(paths(&changeset.primary_files), vec!["app/foo.rb"]);
        assert_eq!(paths(&changeset.spec_files), vec!["spec/foo_spec.rb"]);
        assert_eq!(paths(&changeset.secondary_files), vec!["app/bar.js"]);
    }

    #[test]
    fn test_classify_ignores_unrecognized_lines() {
        let status = "\
On branch jd-checkin-1-fix
Changes not staged for commit:
\tmodified:   README.md
\tdeleted:    app/gone.rb
\tmodified:   app/component.jsx
no changes added to commit
";
        let changeset = classify(status);
        assert!(changeset.primary_files.is_empty());
        assert!(changeset.spec_files.is_empty());
        assert_eq!(paths(&changeset.secondary_files), vec!["app/component.jsx"]);
    }

    #[test]
    fn test_classify_empty_report_yields_empty_sets() {
        let changeset = classify("");
        assert!(changeset.is_empty());
    }

    #[test]
    fn test_ruby_files_unions_primary_and_spec() {
        let changeset = classify("modified: app/a.rb\nmodified: spec/a_spec.rb\n");
        assert_eq!(changeset.ruby_files().len(), 2);
        assert!(changeset.has_ruby_changes());
        assert!(!changeset.has_javascript_changes());
    }

    #[test]
    fn test_impacted_subset_includes_only_existing_specs() {
        let repo = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(repo.path().join("spec/models")).unwrap();
        std::fs::write(repo.path().join("spec/models/widget_spec.rb"), "").unwrap();

        let changeset = classify("modified: app/models/widget.rb\nmodified: app/models/gadget.rb\n");
        let subset = impacted_test_subset(&changeset, repo.path());

        assert_eq!(
            subset.into_iter().collect::<Vec<_>>(),
            vec![PathBuf::from("spec/models/widget_spec.rb")]
        );
    }

    #[test]
    fn test_impacted_subset_empty_when_no_spec_exists() {
        let repo = tempfile::tempdir().unwrap();
        let changeset = classify("modified: app/models/widget.rb\n");
        assert!(impacted_test_subset(&changeset, repo.path()).is_empty());
    }

    #[test]
    fn test_impacted_subset_takes_changed_specs_directly() {
        let repo = tempfile::tempdir().unwrap();
        let changeset = classify(
            "modified: spec/models/widget_spec.rb\nmodified: spec/factories/widgets.rb\nmodified: spec/support/helpers.rb\n",
        );
        let subset = impacted_test_subset(&changeset, repo.path());
        assert_eq!(
            subset.into_iter().collect::<Vec<_>>(),
            vec![PathBuf::from("spec/models/widget_spec.rb")]
        );
    }

    #[test]
    fn test_unit_spec_mapping_strips_app_prefix() {
        assert_eq!(
            unit_spec_for(Path::new("app/services/sync.rb")).unwrap(),
            PathBuf::from("spec/services/sync_spec.rb")
        );
        assert_eq!(
            unit_spec_for(Path::new("lib/tasks/cleanup.rb")).unwrap(),
            PathBuf::from("spec/lib/tasks/cleanup_spec.rb")
        );
    }
}
