//! # Manifest Format Properties
//!
//! Property tests over generated manifests. Names and versions range over
//! arbitrary Unicode text so the ASCII escaping path is exercised alongside
//! plain identifiers.

use modlist_core::{
    from_json_str, to_pretty_json, Manifest, ManifestPolicy, ModEntry, SourceUri,
};
use proptest::prelude::*;

fn source_strategy() -> impl Strategy<Value = SourceUri> {
    ("[a-z]{1,12}", "[a-z0-9-]{1,16}", "[A-Za-z0-9._-]{1,24}").prop_map(|(host, dir, file)| {
        SourceUri::parse(&format!("https://{host}.example/{dir}/{file}"))
            .expect("generated URI is absolute")
    })
}

fn entry_strategy() -> impl Strategy<Value = ModEntry> {
    (
        any::<String>(),
        source_strategy(),
        proptest::option::of("[0-9]{1,2}\\.[0-9]{1,2}(\\.[0-9]{1,2})?"),
        proptest::option::of(any::<String>()),
    )
        .prop_map(|(name, source, version, file)| {
            let mut entry = ModEntry::new(name, source);
            entry.version = version.map(Into::into);
            entry.file = file.map(Into::into);
            entry
        })
}

fn manifest_strategy() -> impl Strategy<Value = Manifest> {
    (
        "[0-9]{1,2}\\.[0-9]{1,2}(\\.[0-9]{1,2})?",
        proptest::collection::vec(entry_strategy(), 0..8),
    )
        .prop_map(|(version, mods)| {
            let mut manifest = Manifest::new(version);
            manifest.mods = mods;
            manifest
        })
}

proptest! {
    #[test]
    fn formatted_manifest_parses_back_unchanged(manifest in manifest_strategy()) {
        let json = to_pretty_json(&manifest).unwrap();
        prop_assert!(json.is_ascii());
        let back = from_json_str(&json).unwrap();
        prop_assert_eq!(back, manifest);
    }

    #[test]
    fn formatting_is_idempotent(manifest in manifest_strategy()) {
        let once = to_pretty_json(&manifest).unwrap();
        let twice = to_pretty_json(&from_json_str(&once).unwrap()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn strict_policy_flags_exactly_the_repeats(manifest in manifest_strategy()) {
        let unique = ManifestPolicy { unique_names: true, ..Default::default() };
        let flagged = unique.check(&manifest).len();
        let mut names: Vec<&str> = manifest.mods.iter().map(|m| m.name.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(flagged, total - names.len());
    }

    #[test]
    fn permissive_policy_never_flags(manifest in manifest_strategy()) {
        prop_assert!(ManifestPolicy::permissive().check(&manifest).is_empty());
    }
}
