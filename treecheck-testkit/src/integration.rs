//! End-to-end export verification.
//!
//! These tests run whole scenarios against real sandboxes: seed the
//! repository, export it, then check the output lines and the exported tree.

#[cfg(test)]
mod tests {
    use crate::sandbox::Sandbox;
    use crate::scenario::{standard, Scenario};
    use crate::trigger::{Client, ExportTrigger};
    use fs_err as fs;
    use treecheck_core::{
        greek_tree, verify, verify_export, CollectMode, Entry, MismatchKind, StatusCode,
        TreeState, Tweak, VerificationFailure, VerificationResult,
    };

    fn greek_export_expectations() -> (TreeState, TreeState) {
        let mut disk = greek_tree().copy();
        disk.add("", Entry::dir()).unwrap();
        let output = standard::exported_output(&disk);
        (output, disk)
    }

    // ============================================================================
    // Standard scenarios
    // ============================================================================

    #[test]
    fn test_export_empty_directory() {
        let sandbox = Sandbox::build("export_empty_directory").unwrap();
        let result = standard::export_empty_directory()
            .run(&sandbox, &Client::Reference)
            .unwrap();

        assert!(result.passed(), "{:?}", result);
        assert!(sandbox.wc_dir().is_dir());
    }

    #[test]
    fn test_export_greek_tree() {
        let sandbox = Sandbox::build("export_greek_tree").unwrap();
        let result = standard::export_greek_tree()
            .run(&sandbox, &Client::Reference)
            .unwrap();

        assert!(result.passed(), "{:?}", result);
    }

    #[test]
    fn test_all_standard_scenarios_pass() {
        for scenario in standard::all() {
            let sandbox = Sandbox::build(&scenario.name).unwrap();
            let result = scenario.run(&sandbox, &Client::Reference).unwrap();
            assert!(result.passed(), "{}: {:?}", scenario.name, result);
        }
    }

    #[test]
    fn test_scenario_rerun_replaces_target() {
        let sandbox = Sandbox::build("rerun").unwrap();
        let scenario = standard::export_greek_tree();

        assert!(scenario.run(&sandbox, &Client::Reference).unwrap().passed());
        // The target exists now; run must clear it before exporting again.
        assert!(scenario.run(&sandbox, &Client::Reference).unwrap().passed());
    }

    // ============================================================================
    // Failure reporting
    // ============================================================================

    #[test]
    fn test_missing_output_path_reports_one_record() {
        let sandbox = Sandbox::build("missing_path").unwrap();
        let (mut output, disk) = greek_export_expectations();
        output
            .add("X", Entry::new().with_status(StatusCode::ADDED))
            .unwrap();

        let mut trigger = ExportTrigger::from_sandbox(&sandbox, "");
        let result = verify_export(&mut trigger, sandbox.wc_dir(), &output, &disk);

        let report = result.mismatches().expect("mismatch failure");
        assert_eq!(report.len(), 1, "{report}");
        assert_eq!(report.records[0].path, "X");
        assert_eq!(report.records[0].kind, MismatchKind::Missing);
        assert!(report.to_string().contains("X"));
    }

    #[test]
    fn test_export_of_missing_path_is_trigger_failure() {
        let sandbox = Sandbox::build("no_such_path").unwrap();
        let scenario = Scenario::builder("no_such_path")
            .description("Export a path the repository does not have")
            .export("A/no/such/path")
            .expect_disk(TreeState::from_entries([("", Entry::dir())]))
            .build();

        let result = scenario.run(&sandbox, &Client::Reference).unwrap();
        match result {
            VerificationResult::Failed(VerificationFailure::Trigger(f)) => {
                assert_eq!(f.trigger, "export");
                assert_eq!(f.exit_code, Some(1));
                assert!(f.stderr.contains("does not exist"));
            }
            other => panic!("expected trigger failure, got {:?}", other),
        }
        assert!(!sandbox.wc_dir().exists());
    }

    #[test]
    fn test_tampered_repository_file_is_content_diff() {
        let sandbox = Sandbox::build("tampered").unwrap();
        let scenario = Scenario::builder("tampered")
            .description("Repository file changed behind the expectation's back")
            .setup_file("A/D/gamma", "something else\n")
            .export("")
            .expect_disk(greek_export_expectations().1)
            .build();

        let result = scenario.run(&sandbox, &Client::Reference).unwrap();
        let report = result.mismatches().expect("mismatch failure");
        assert_eq!(report.len(), 1);
        assert_eq!(report.records[0].path, "A/D/gamma");
        assert_eq!(report.records[0].kind, MismatchKind::ContentDiff);
    }

    #[test]
    fn test_removed_and_added_paths() {
        let sandbox = Sandbox::build("shape").unwrap();
        let scenario = Scenario::builder("shape")
            .description("Repository shape differs from the baseline")
            .setup_remove("A/B/E")
            .setup_file("A/extra", "extra\n")
            .export("")
            .expect_disk(greek_export_expectations().1)
            .build();

        let report = scenario
            .run(&sandbox, &Client::Reference)
            .unwrap()
            .mismatches()
            .cloned()
            .expect("mismatch failure");
        assert_eq!(report.count(MismatchKind::Missing), 3);
        assert_eq!(report.count(MismatchKind::Unexpected), 1);

        let paths: Vec<_> = report.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["A/B/E", "A/B/E/alpha", "A/B/E/beta", "A/extra"]);
    }

    #[test]
    fn test_wrong_status_is_attr_diff() {
        let sandbox = Sandbox::build("status").unwrap();
        let (mut output, _) = greek_export_expectations();
        output
            .tweak(&["iota"], &Tweak::new().status(StatusCode::UPDATED))
            .unwrap();

        let mut trigger = ExportTrigger::from_sandbox(&sandbox, "");
        let result = verify(
            &output,
            &mut trigger,
            CollectMode::output_under(sandbox.wc_dir()),
        );

        let report = result.mismatches().expect("mismatch failure");
        assert_eq!(report.len(), 1);
        assert_eq!(report.records[0].kind, MismatchKind::AttrDiff);
        assert!(report.report().contains("iota"));
    }

    #[test]
    fn test_failures_are_deterministic() {
        let run = || {
            let sandbox = Sandbox::build("determinism").unwrap();
            sandbox.write_file("iota", b"changed\n").unwrap();
            sandbox.write_file("zeta", b"new\n").unwrap();
            let (output, disk) = greek_export_expectations();
            let mut trigger = ExportTrigger::from_sandbox(&sandbox, "");
            verify_export(&mut trigger, sandbox.wc_dir(), &output, &disk)
                .mismatches()
                .cloned()
                .unwrap()
        };

        let first = run();
        let second = run();
        assert_eq!(first, second);
        // zeta is unexpected in the output and on disk.
        assert_eq!(first.count(MismatchKind::Unexpected), 2);
        assert_eq!(first.count(MismatchKind::ContentDiff), 1);
    }

    #[test]
    fn test_baseline_unchanged_by_scenarios() {
        let before = greek_tree().copy();
        let sandbox = Sandbox::build("baseline_intact").unwrap();
        let _ = standard::export_greek_tree().run(&sandbox, &Client::Reference);
        let _ = greek_export_expectations();
        assert_eq!(greek_tree().as_state(), &before);
        assert!(!before.contains(""));
    }

    #[test]
    fn test_target_written_matches_repository() {
        let sandbox = Sandbox::build("bytes").unwrap();
        standard::export_greek_tree()
            .run(&sandbox, &Client::Reference)
            .unwrap();

        for (path, entry) in greek_tree().iter() {
            if let Some(bytes) = entry.contents().as_bytes() {
                assert_eq!(fs::read(sandbox.wc_dir().join(path)).unwrap(), bytes);
            }
        }
    }

    // ============================================================================
    // External client
    // ============================================================================

    #[cfg(unix)]
    #[test]
    fn test_external_repository_failure_is_setup_error() {
        let mut config = crate::config::HarnessConfig::default();
        config.set_admin("false");
        let sandbox = Sandbox::build("provision_failed").unwrap();

        let err = standard::export_greek_tree()
            .run(&sandbox, &Client::External(config))
            .unwrap_err();
        assert!(err.to_string().contains("create failed"), "{err}");
        assert!(!sandbox.wc_dir().exists());
    }

    #[cfg(feature = "external-client")]
    mod external {
        use super::*;
        use crate::config::HarnessConfig;

        #[test]
        fn test_external_client_standard_scenarios() {
            let config = HarnessConfig::default().with_env_overrides().unwrap();
            let client = Client::External(config.clone());

            for scenario in standard::all() {
                let sandbox = Sandbox::build_with(&scenario.name, &config).unwrap();
                let result = scenario.run(&sandbox, &client).unwrap();
                assert!(result.passed(), "{}: {}", scenario.name, describe(&result));
                assert!(sandbox.store_dir().is_dir());
            }
        }

        fn describe(result: &VerificationResult) -> String {
            match result.failure() {
                Some(failure) => failure.to_string(),
                None => "passed".to_string(),
            }
        }
    }
}
