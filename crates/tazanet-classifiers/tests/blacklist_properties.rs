//! Property tests for the blacklist filter

use proptest::prelude::*;
use tazanet_classifiers::{Blacklist, DEFAULT_BANNED_TERMS};

fn recase(term: &str, mask: &[bool]) -> String {
    term.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| {
            if *upper {
                c.to_uppercase().collect::<String>()
            } else {
                c.to_string()
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn banned_term_matches_in_any_case_and_position(
        index in 0..DEFAULT_BANNED_TERMS.len(),
        prefix in "[a-zA-Z0-9 ]{0,24}",
        suffix in "[a-zA-Z0-9 ]{0,24}",
        mask in proptest::collection::vec(any::<bool>(), 1..8),
    ) {
        let blacklist = Blacklist::with_defaults().unwrap();
        let text = format!("{}{}{}", prefix, recase(DEFAULT_BANNED_TERMS[index], &mask), suffix);

        prop_assert!(blacklist.check(&text).is_some());
    }

    #[test]
    fn ascii_text_never_matches_cyrillic_terms(text in "[a-zA-Z0-9 .,!?]{0,64}") {
        let blacklist = Blacklist::with_defaults().unwrap();
        prop_assert!(blacklist.check(&text).is_none());
    }

    #[test]
    fn check_is_deterministic(text in "\\PC{0,40}") {
        let blacklist = Blacklist::with_defaults().unwrap();
        prop_assert_eq!(blacklist.check(&text), blacklist.check(&text));
    }
}
