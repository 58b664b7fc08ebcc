//! Property tests for rule set prefix queries.

use import_fence_core::RuleSet;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn module_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-c]", 1..4).prop_map(|segments| segments.join("."))
}

fn rule_text() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec(
        (module_name(), prop::collection::vec(module_name(), 1..3)),
        0..5,
    )
}

fn render(rules: &[(String, Vec<String>)]) -> String {
    rules
        .iter()
        .map(|(tree, forbidden)| format!("{tree}:{}", forbidden.join(";")))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_ancestor_or_equal(tree: &str, module: &str) -> bool {
    module == tree || module.starts_with(&format!("{tree}."))
}

proptest! {
    #[test]
    fn forbidden_trees_are_union_of_ancestor_rules(
        rules in rule_text(),
        module in module_name()
    ) {
        let set = RuleSet::build(&render(&rules)).unwrap();

        let expected: BTreeSet<String> = rules
            .iter()
            .filter(|(tree, _)| is_ancestor_or_equal(tree, &module))
            .flat_map(|(_, forbidden)| forbidden.iter().cloned())
            .collect();
        let actual: BTreeSet<String> = set
            .forbidden_trees_for(&module)
            .into_iter()
            .map(|t| t.as_str().to_owned())
            .collect();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn is_forbidden_agrees_with_forbidden_trees(
        rules in rule_text(),
        importer in module_name(),
        imported in module_name()
    ) {
        let set = RuleSet::build(&render(&rules)).unwrap();
        let expected = set
            .forbidden_trees_for(&importer)
            .iter()
            .any(|t| t.contains(&imported));
        prop_assert_eq!(set.is_forbidden(&importer, &imported), expected);
    }

    #[test]
    fn display_reparses_to_same_rule_set(rules in rule_text()) {
        let set = RuleSet::build(&render(&rules)).unwrap();
        let reparsed = RuleSet::build(&set.to_string()).unwrap();
        prop_assert_eq!(set, reparsed);
    }

    #[test]
    fn empty_rule_set_forbids_nothing(importer in module_name(), imported in module_name()) {
        let set = RuleSet::build("").unwrap();
        prop_assert!(!set.is_forbidden(&importer, &imported));
    }
}
