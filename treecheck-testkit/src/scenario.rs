//! Export scenario definitions.

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use treecheck_core::{
    verify, verify_export, CollectMode, Completion, Entry, StatusCode, TreeState, TriggerFailure,
    Tweak, VerificationFailure, VerificationResult,
};

use crate::sandbox::{Sandbox, SandboxError};
use crate::trigger::Client;

/// One export and what it must produce.
///
/// With both expectations set the export is checked through its output and
/// through the tree it wrote. With one, only that side is checked. With
/// neither, the export only has to succeed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,

    /// Description of what this scenario tests.
    pub description: String,

    /// Changes made to the sandbox repository before exporting.
    #[serde(default)]
    pub setup: Setup,

    /// Repository path to export; `""` is the whole repository.
    #[serde(default)]
    pub export: String,

    /// Expected output, relative to the export target.
    #[serde(default)]
    pub expect_output: Option<TreeState>,

    /// Expected tree at the export target.
    #[serde(default)]
    pub expect_disk: Option<TreeState>,
}

/// Repository changes applied before the export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Setup {
    /// Files to write: path -> contents.
    #[serde(default)]
    pub files: BTreeMap<String, String>,

    /// Paths to delete.
    #[serde(default)]
    pub remove: Vec<String>,
}

impl Setup {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.remove.is_empty()
    }

    fn apply(&self, sandbox: &Sandbox) -> Result<(), SandboxError> {
        for (path, contents) in &self.files {
            sandbox.write_file(path, contents.as_bytes())?;
        }
        for path in &self.remove {
            let target = sandbox.path(path);
            if target.is_dir() {
                fs::remove_dir_all(&target)?;
            } else if target.exists() {
                fs::remove_file(&target)?;
            }
        }
        Ok(())
    }
}

impl Scenario {
    /// Create a new scenario builder.
    pub fn builder(name: &str) -> ScenarioBuilder {
        ScenarioBuilder::new(name)
    }

    /// Apply the setup, let `client` prepare the repository, export and verify.
    ///
    /// Sandbox errors are setup defects and come back as `Err`; anything
    /// the export itself does wrong is in the returned result.
    pub fn run(
        &self,
        sandbox: &Sandbox,
        client: &Client,
    ) -> Result<VerificationResult, SandboxError> {
        log::info!(
            "Running scenario '{}' with {} client",
            self.name,
            client.name()
        );
        self.setup.apply(sandbox)?;
        client.prepare(sandbox)?;
        sandbox.remove_wc()?;

        let mut trigger = client.export_trigger(sandbox, &self.export);
        let target = sandbox.wc_dir();

        let result = match (&self.expect_output, &self.expect_disk) {
            (Some(output), Some(disk)) => verify_export(trigger.as_mut(), target, output, disk),
            (Some(output), None) => {
                verify(output, trigger.as_mut(), CollectMode::output_under(target))
            }
            (None, Some(disk)) => verify(disk, trigger.as_mut(), CollectMode::disk(target)),
            (None, None) => {
                let completion = trigger.fire();
                smoke_result(trigger.name(), completion)
            }
        };

        log::info!(
            "Scenario '{}' {}",
            self.name,
            if result.passed() { "passed" } else { "failed" }
        );
        Ok(result)
    }
}

fn smoke_result(name: &str, completion: Completion) -> VerificationResult {
    if completion.success {
        return VerificationResult::Passed;
    }
    VerificationResult::Failed(VerificationFailure::Trigger(TriggerFailure {
        trigger: name.to_string(),
        exit_code: completion.exit_code,
        stdout: completion.stdout,
        stderr: completion.stderr,
    }))
}

/// Builder for creating scenarios.
pub struct ScenarioBuilder {
    name: String,
    description: String,
    setup: Setup,
    export: String,
    expect_output: Option<TreeState>,
    expect_disk: Option<TreeState>,
}

impl ScenarioBuilder {
    /// Create a new builder.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            setup: Setup::default(),
            export: String::new(),
            expect_output: None,
            expect_disk: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    /// Write a repository file before exporting.
    pub fn setup_file(mut self, path: &str, content: &str) -> Self {
        self.setup
            .files
            .insert(path.to_string(), content.to_string());
        self
    }

    /// Delete a repository path before exporting.
    pub fn setup_remove(mut self, path: &str) -> Self {
        self.setup.remove.push(path.to_string());
        self
    }

    /// Export `path` of the repository.
    pub fn export(mut self, path: &str) -> Self {
        self.export = path.to_string();
        self
    }

    pub fn expect_output(mut self, state: TreeState) -> Self {
        self.expect_output = Some(state);
        self
    }

    pub fn expect_disk(mut self, state: TreeState) -> Self {
        self.expect_disk = Some(state);
        self
    }

    /// Build the scenario.
    pub fn build(self) -> Scenario {
        Scenario {
            name: self.name,
            description: self.description,
            setup: self.setup,
            export: self.export,
            expect_output: self.expect_output,
            expect_disk: self.expect_disk,
        }
    }
}

/// Standard export scenarios over the greek tree.
pub mod standard {
    use super::*;
    use treecheck_core::greek_tree;

    /// What the export prints for `state`: every path added, contents
    /// not part of the output.
    pub fn exported_output(state: &TreeState) -> TreeState {
        let mut output = state.copy();
        output.tweak_all(&Tweak::new().ignore_contents().status(StatusCode::ADDED));
        output
    }

    /// `state` with the export target itself as the root entry.
    fn rooted(mut state: TreeState) -> TreeState {
        if !state.contains("") {
            state.desc_mut().insert(String::new(), Entry::dir());
        }
        state
    }

    /// Export of an empty directory creates the target and nothing else.
    pub fn export_empty_directory() -> Scenario {
        Scenario::builder("export_empty_directory")
            .description("Export an empty directory")
            .export("A/C")
            .expect_disk(rooted(TreeState::new()))
            .build()
    }

    /// Export of the whole repository.
    pub fn export_greek_tree() -> Scenario {
        let disk = rooted(greek_tree().copy());
        Scenario::builder("export_greek_tree")
            .description("Export the greek tree")
            .export("")
            .expect_output(exported_output(&disk))
            .expect_disk(disk)
            .build()
    }

    /// Export of one populated subdirectory.
    pub fn export_subtree() -> Scenario {
        let disk = greek_tree().as_state().subtree("A/D/H");
        Scenario::builder("export_subtree")
            .description("Export a populated subdirectory")
            .export("A/D/H")
            .expect_output(exported_output(&disk))
            .expect_disk(disk)
            .build()
    }

    /// All standard scenarios.
    pub fn all() -> Vec<Scenario> {
        vec![export_empty_directory(), export_greek_tree(), export_subtree()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_builder() {
        let scenario = Scenario::builder("test")
            .description("A test scenario")
            .setup_file("A/new", "content")
            .setup_remove("iota")
            .export("A")
            .expect_disk(TreeState::new())
            .build();

        assert_eq!(scenario.name, "test");
        assert_eq!(scenario.setup.files.len(), 1);
        assert_eq!(scenario.setup.remove, vec!["iota"]);
        assert_eq!(scenario.export, "A");
        assert!(scenario.expect_output.is_none());
        assert!(scenario.expect_disk.is_some());
    }

    #[test]
    fn test_standard_scenarios() {
        let scenarios = standard::all();
        assert_eq!(scenarios.len(), 3);

        for s in scenarios {
            assert!(!s.name.is_empty());
            assert!(!s.description.is_empty());
            assert!(s.setup.is_empty());
            assert!(s.expect_disk.is_some());
        }
    }

    #[test]
    fn test_greek_export_expectations() {
        let scenario = standard::export_greek_tree();
        let output = scenario.expect_output.unwrap();
        let disk = scenario.expect_disk.unwrap();

        assert_eq!(output.len(), 21);
        assert_eq!(disk.len(), 21);
        for (_, entry) in output.iter() {
            assert!(entry.contents().is_ignored());
            assert_eq!(entry.status(), Some(StatusCode::ADDED));
        }
        assert_eq!(disk.get("").unwrap(), &Entry::dir());
        assert!(disk.get("A/mu").unwrap().status().is_none());
    }

    #[test]
    fn test_subtree_expectations_are_rerooted() {
        let disk = standard::export_subtree().expect_disk.unwrap();
        let paths: Vec<_> = disk.paths().collect();
        assert_eq!(paths, vec!["", "chi", "psi", "omega"]);
    }

    #[test]
    fn test_scenario_serde_roundtrip() {
        let scenario = standard::export_empty_directory();
        let json = serde_json::to_string(&scenario).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, scenario.name);
        assert_eq!(back.export, "A/C");
        assert_eq!(back.expect_disk, scenario.expect_disk);
    }

    #[test]
    fn test_smoke_result() {
        assert!(smoke_result("export", Completion::success(Vec::new())).passed());

        let failed = smoke_result("export", Completion::failure(Some(2), "nope"));
        match failed {
            VerificationResult::Failed(VerificationFailure::Trigger(f)) => {
                assert_eq!(f.trigger, "export");
                assert_eq!(f.exit_code, Some(2));
            }
            other => panic!("expected trigger failure, got {:?}", other),
        }
    }
}
