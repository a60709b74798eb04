//! Recursive partial-update merge.
//!
//! A nested update payload is decomposed into one shallow partial write per
//! nesting path that contains at least one scalar leaf. Each write touches
//! only the leaf fields actually present, so sibling fields at intermediate
//! levels survive concurrent writers.

use statewire_model::{JsonObject, Reference};

/// Decomposes a nested payload into per-path shallow writes.
///
/// The write for a path precedes the writes for its nested children, and
/// children are visited in key order. A path whose subtree holds no scalar
/// leaf produces no write at all.
///
/// ```
/// use serde_json::json;
/// use statewire_model::Reference;
/// use statewire_core::flatten_update;
///
/// let params = json!({"a": 1, "b": {"c": 2, "d": {"e": 3}}});
/// let serde_json::Value::Object(params) = params else { unreachable!() };
/// let writes = flatten_update(&Reference::new("r"), &params);
///
/// assert_eq!(writes.len(), 3);
/// assert_eq!(writes[0].0, Reference::new("r"));
/// assert_eq!(writes[1].0, Reference::new("r/b"));
/// assert_eq!(writes[2].0, Reference::new("r/b/d"));
/// ```
pub fn flatten_update(
    reference: &Reference,
    parameters: &JsonObject,
) -> Vec<(Reference, JsonObject)> {
    let mut writes = Vec::new();
    collect(reference, parameters, &mut writes);
    writes
}

fn collect(
    reference: &Reference,
    parameters: &JsonObject,
    writes: &mut Vec<(Reference, JsonObject)>,
) {
    let mut leaves = JsonObject::new();
    let mut nested = Vec::new();
    for (key, value) in parameters {
        match value {
            serde_json::Value::Object(children) => nested.push((key, children)),
            scalar => {
                leaves.insert(key.clone(), scalar.clone());
            }
        }
    }
    if !leaves.is_empty() {
        writes.push((reference.clone(), leaves));
    }
    for (key, children) in nested {
        collect(&reference.child(key), children, writes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn worked_example() {
        let reference = Reference::new("r");
        let params = object(json!({"a": 1, "b": {"c": 2, "d": {"e": 3}}}));

        let writes = flatten_update(&reference, &params);

        assert_eq!(
            writes,
            vec![
                (Reference::new("r"), object(json!({"a": 1}))),
                (Reference::new("r/b"), object(json!({"c": 2}))),
                (Reference::new("r/b/d"), object(json!({"e": 3}))),
            ]
        );
    }

    #[test]
    fn empty_nested_object_is_a_no_op_branch() {
        let reference = Reference::new("r");
        let params = object(json!({"a": 1, "b": {}}));

        let writes = flatten_update(&reference, &params);

        // "b" appears in no write at any level.
        assert_eq!(writes, vec![(Reference::new("r"), object(json!({"a": 1})))]);
    }

    #[test]
    fn fully_empty_payload_issues_nothing() {
        let writes = flatten_update(&Reference::new("r"), &JsonObject::new());
        assert!(writes.is_empty());

        let params = object(json!({"only": {"empty": {}}}));
        let writes = flatten_update(&Reference::new("r"), &params);
        assert!(writes.is_empty());
    }

    #[test]
    fn arrays_and_nulls_are_leaves() {
        let reference = Reference::new("r");
        let params = object(json!({"tags": ["a", "b"], "gone": null}));

        let writes = flatten_update(&reference, &params);

        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, object(json!({"tags": ["a", "b"], "gone": null})));
    }

    #[test]
    fn deep_single_leaf() {
        let reference = Reference::new("r");
        let params = object(json!({"a": {"b": {"c": {"d": true}}}}));

        let writes = flatten_update(&reference, &params);

        assert_eq!(
            writes,
            vec![(Reference::new("r/a/b/c"), object(json!({"d": true})))]
        );
    }

    // Reference walker used to state the property independently of the
    // production recursion.
    fn count_paths_with_scalar_leaves(params: &JsonObject) -> usize {
        let own = params.values().any(|v| !v.is_object());
        let nested: usize = params
            .values()
            .filter_map(|v| v.as_object())
            .map(count_paths_with_scalar_leaves)
            .sum();
        usize::from(own) + nested
    }

    fn arb_params() -> impl Strategy<Value = JsonObject> {
        let leaf = prop_oneof![
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[a-z]{0,6}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop::collection::btree_map("[a-d]{1,2}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect()))
        })
        .prop_map(|value| match value {
            Value::Object(map) => map,
            scalar => {
                let mut map = JsonObject::new();
                map.insert("leaf".to_owned(), scalar);
                map
            }
        })
    }

    proptest! {
        #[test]
        fn one_write_per_path_with_a_scalar_leaf(params in arb_params()) {
            let reference = Reference::new("base");
            let writes = flatten_update(&reference, &params);

            prop_assert_eq!(writes.len(), count_paths_with_scalar_leaves(&params));

            for (write_ref, values) in &writes {
                // Every write is shallow and non-empty.
                prop_assert!(!values.is_empty());
                prop_assert!(values.values().all(|v| !v.is_object()));
                // And lands at or under the base reference.
                prop_assert!(write_ref.path().starts_with("base"));
            }
        }
    }
}
