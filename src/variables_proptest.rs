//! Property-based tests for variable expansion.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use std::borrow::Cow;
    use std::collections::HashMap;

    use crate::error::Error;
    use crate::variables::{expand, expand_str, placeholders};
    use proptest::prelude::*;

    fn variables() -> impl Strategy<Value = HashMap<String, String>> {
        // Values never contain '$', so expanded output has no placeholders.
        prop::collection::hash_map("[A-Z_]{1,8}", "[a-zA-Z0-9 ./-]{0,12}", 1..5)
    }

    /// Text mixing literal runs with `${NAME}` references to known names.
    fn template(names: Vec<String>) -> impl Strategy<Value = String> {
        let piece = prop_oneof![
            "[a-zA-Z0-9 \n#{}]{0,10}".boxed(),
            prop::sample::select(names)
                .prop_map(|n| format!("${{{n}}}"))
                .boxed(),
        ];
        prop::collection::vec(piece, 0..8).prop_map(|parts| parts.concat())
    }

    fn vars_and_template() -> impl Strategy<Value = (HashMap<String, String>, String)> {
        variables().prop_flat_map(|vars| {
            let names: Vec<String> = vars.keys().cloned().collect();
            (Just(vars), template(names))
        })
    }

    proptest! {
        /// Property: expanding known variables leaves no placeholders and a
        /// second pass changes nothing
        #[test]
        fn expansion_is_idempotent((vars, text) in vars_and_template()) {
            let once = expand_str(&text, &vars, "test").unwrap();
            prop_assert!(placeholders(once.as_bytes()).is_empty());
            let twice = expand_str(&once, &vars, "test").unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Property: content without `$` is returned borrowed and unchanged
        #[test]
        fn content_without_dollar_is_borrowed(text in "[^$]*", vars in variables()) {
            let result = expand(text.as_bytes(), &vars, "test").unwrap();
            prop_assert!(matches!(result, Cow::Borrowed(_)));
            prop_assert_eq!(result.as_ref(), text.as_bytes());
        }

        /// Property: a reference to a name missing from the mapping always
        /// fails and names that variable
        #[test]
        fn unknown_variable_always_fails(
            (vars, text) in vars_and_template(),
            missing in "[a-z]{1,8}",
        ) {
            // Generated keys are upper case, so `missing` is never defined.
            let input = format!("{text}${{{missing}}}");
            match expand_str(&input, &vars, "test") {
                Err(Error::UnknownVariable { name, .. }) => prop_assert_eq!(name, missing),
                other => prop_assert!(false, "expected UnknownVariable, got {:?}", other),
            }
        }

        /// Property: expansion is deterministic
        #[test]
        fn expansion_is_deterministic((vars, text) in vars_and_template()) {
            prop_assert_eq!(
                expand_str(&text, &vars, "a").unwrap(),
                expand_str(&text, &vars, "b").unwrap()
            );
        }
    }
}
