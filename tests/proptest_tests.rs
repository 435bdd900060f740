// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests generate well-formed service files and check that parsing and
//! rendering preserve them, and that edits stay inside their own section.

use pgservice::domain::{ServiceFile, ServiceName, ServiceParams};
use proptest::prelude::*;
use std::collections::BTreeMap;

type Sections = BTreeMap<String, BTreeMap<String, String>>;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn sections_strategy() -> impl Strategy<Value = Sections> {
    prop::collection::btree_map(
        name_strategy(),
        prop::collection::btree_map("[a-z][a-z_]{0,8}", "[A-Za-z0-9.:/_=-]{0,12}", 0..5),
        1..5,
    )
}

fn params_strategy() -> impl Strategy<Value = ServiceParams> {
    prop::collection::btree_map("[a-z][a-z_]{0,8}", "[A-Za-z0-9._-]{1,12}", 0..5)
        .prop_map(|map| map.into_iter().collect())
}

/// Writes `sections` as a service file, varying comments and spacing.
fn render_text(sections: &Sections, spaced: bool, commented: bool) -> String {
    let mut text = String::new();
    if commented {
        text.push_str("# generated\n\n");
    }
    for (index, (name, params)) in sections.iter().enumerate() {
        if index > 0 {
            text.push('\n');
        }
        if commented {
            text.push_str(&format!("; about {}\n", name));
        }
        text.push_str(&format!("[{}]\n", name));
        for (key, value) in params {
            if spaced {
                text.push_str(&format!("{} = {}\n", key, value));
            } else {
                text.push_str(&format!("{}={}\n", key, value));
            }
        }
    }
    text
}

fn to_params(map: &BTreeMap<String, String>) -> ServiceParams {
    map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

fn to_map(params: &ServiceParams) -> BTreeMap<String, String> {
    params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// Parsing then rendering reproduces the input exactly
proptest! {
    #[test]
    fn test_parse_render_roundtrip(
        sections in sections_strategy(),
        spaced in any::<bool>(),
        commented in any::<bool>(),
    ) {
        let text = render_text(&sections, spaced, commented);
        let file = ServiceFile::parse(&text).unwrap();
        prop_assert_eq!(file.render(), text);
        prop_assert_eq!(file.len(), sections.len());
    }
}

// Every parsed service carries the parameters that were written for it
proptest! {
    #[test]
    fn test_parse_reads_every_param(
        sections in sections_strategy(),
        spaced in any::<bool>(),
    ) {
        let file = ServiceFile::parse(&render_text(&sections, spaced, false)).unwrap();
        for (name, params) in &sections {
            prop_assert_eq!(file.get(name).unwrap(), to_params(params));
        }
    }
}

// Replacing one service leaves every other service and the order unchanged
proptest! {
    #[test]
    fn test_replace_is_isolated(
        sections in sections_strategy(),
        pick in any::<prop::sample::Index>(),
        params in params_strategy(),
        spaced in any::<bool>(),
        commented in any::<bool>(),
    ) {
        let text = render_text(&sections, spaced, commented);
        let mut file = ServiceFile::parse(&text).unwrap();
        let names: Vec<&String> = sections.keys().collect();
        let target = names[pick.index(names.len())];

        file.replace(target, &params).unwrap();
        let reparsed = ServiceFile::parse(&file.render()).unwrap();

        prop_assert_eq!(
            reparsed.names().map(|n| n.as_str()).collect::<Vec<_>>(),
            names.iter().map(|n| n.as_str()).collect::<Vec<_>>()
        );
        // kept keys stay where they were, so compare contents only
        prop_assert_eq!(to_map(&reparsed.get(target).unwrap()), to_map(&params));
        for (name, original) in &sections {
            if name != target {
                prop_assert_eq!(reparsed.get(name).unwrap(), to_params(original));
            }
        }
    }
}

// Replacing a service with its own parameters is a no-op on the text
proptest! {
    #[test]
    fn test_replace_with_same_params_keeps_text(
        sections in sections_strategy(),
        pick in any::<prop::sample::Index>(),
        spaced in any::<bool>(),
    ) {
        let text = render_text(&sections, spaced, true);
        let mut file = ServiceFile::parse(&text).unwrap();
        let names: Vec<&String> = sections.keys().collect();
        let target = names[pick.index(names.len())];

        file.replace(target, &to_params(&sections[target])).unwrap();
        prop_assert_eq!(file.render(), text);
    }
}

// Pushing then removing a new service restores the remaining services
proptest! {
    #[test]
    fn test_push_then_remove(
        sections in sections_strategy(),
        name in "new-[a-z]{1,6}",
        params in params_strategy(),
    ) {
        let text = render_text(&sections, false, false);
        let mut file = ServiceFile::parse(&text).unwrap();

        file.push(ServiceName::new(&name).unwrap(), &params).unwrap();
        prop_assert_eq!(file.names().last().map(|n| n.as_str()), Some(name.as_str()));
        prop_assert_eq!(file.get(&name).unwrap(), params.clone());

        let removed = file.remove(&name).unwrap();
        prop_assert_eq!(removed, params);
        prop_assert_eq!(file.len(), sections.len());
        for (existing, original) in &sections {
            prop_assert_eq!(file.get(existing).unwrap(), to_params(original));
        }
    }
}

// Any whitespace around a name resolves to the same service
proptest! {
    #[test]
    fn test_service_name_trims(name in name_strategy(), pad in "[ \t]{0,3}") {
        let padded = format!("{}{}{}", pad, name, pad);
        let trimmed = ServiceName::new(&padded).unwrap();
        prop_assert_eq!(trimmed.as_str(), name.as_str());
    }
}
