//! Property tests: allowlist precedence and edit application.

use cleft_rules::{DiagnosticKind, LintConfig, Linter, TextEdit, TextEdits, apply_edits};
use proptest::prelude::*;

fn module_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{2,8}",
        "@[a-z]{2,5}/[a-z]{2,6}",
        Just("framer-motion".to_string()),
        Just("react-hot-toast".to_string()),
        Just("next/headers".to_string()),
    ]
}

fn hook_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "use[A-Z][a-z]{1,6}",
        Just("useState".to_string()),
        Just("useEffect".to_string()),
        Just("cookies".to_string()),
    ]
}

fn source_for(module: &str, export: &str) -> String {
    format!("import {{ {export} }} from '{module}';\nexport function C() {{ return {export}(); }}\n")
}

proptest! {
    #[test]
    fn allowlisted_module_yields_no_verdict(module in module_name(), export in hook_name()) {
        let linter = Linter::from_value(serde_json::json!({
            "allowlist": { module.clone(): true }
        })).unwrap();
        let report = linter.lint_source("c.tsx", &source_for(&module, &export));
        prop_assert!(report.is_clean(), "{:?}", report.diagnostics);
    }

    #[test]
    fn allowlisted_export_yields_no_verdict(module in module_name(), export in hook_name()) {
        let linter = Linter::from_value(serde_json::json!({
            "allowlist": { module.clone(): [export.clone()] }
        })).unwrap();
        let report = linter.lint_source("c.tsx", &source_for(&module, &export));
        prop_assert!(report.is_clean(), "{:?}", report.diagnostics);
    }

    #[test]
    fn wildcard_export_list_covers_everything(module in module_name(), export in hook_name()) {
        let linter = Linter::from_value(serde_json::json!({
            "allowlist": { module.clone(): ["*"] }
        })).unwrap();
        let report = linter.lint_source("c.tsx", &source_for(&module, &export));
        prop_assert!(report.is_clean(), "{:?}", report.diagnostics);
    }

    #[test]
    fn unlisted_hooks_still_need_the_client(export in "useAcme[A-Z][a-z]{1,4}") {
        let linter = Linter::new(LintConfig::default());
        let report = linter.lint_source("c.tsx", &source_for("@acme/hooks", &export));
        prop_assert_eq!(report.count(DiagnosticKind::MissingDirective), 1);
    }

    #[test]
    fn disjoint_edits_apply_like_reverse_splicing(
        (source, cuts) in "[a-z \n]{0,48}".prop_flat_map(|source| {
            let len = source.len();
            (Just(source), prop::collection::btree_set(0..=len, 0..10))
        }),
        replacements in prop::collection::vec("[A-Z]{0,3}", 5),
    ) {
        let cuts: Vec<usize> = cuts.into_iter().collect();
        let edits: Vec<TextEdit> = cuts
            .chunks_exact(2)
            .zip(&replacements)
            .map(|(pair, text)| TextEdit {
                start: pair[0] as u32,
                end: pair[1] as u32,
                replacement: text.clone(),
            })
            .collect();

        let mut expected = source.clone();
        for edit in edits.iter().rev() {
            expected.replace_range(edit.start as usize..edit.end as usize, &edit.replacement);
        }

        // Order of the input must not matter
        let mut shuffled = edits.clone();
        shuffled.reverse();
        prop_assert_eq!(apply_edits(&source, &shuffled), expected);
    }

    #[test]
    fn accepted_edits_never_overlap(
        spans in prop::collection::vec((0u32..40, 0u32..6), 0..12),
    ) {
        let mut edits = TextEdits::new();
        for (start, width) in spans {
            edits.push(TextEdit {
                start,
                end: start + width,
                replacement: "x".to_string(),
            });
        }
        let sorted = edits.into_sorted();
        for (i, a) in sorted.iter().enumerate() {
            for b in &sorted[i + 1..] {
                prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }
}
