// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

use std::collections::HashMap;

use super::pattern::ParamIndex;

/// Splits a subscription filter into levels, stripping a leading
/// `$share/<group>/` prefix first so shared-subscription filters are
/// matched against their underlying filter. Grounded on
/// `engine.go`'s `routeSplit`.
fn filter_levels(filter: &str) -> Vec<&str> {
    if filter.is_empty() {
        return Vec::new();
    }
    let mut levels: Vec<&str> = filter.split('/').collect();
    if levels.first().copied() == Some("$share") && levels.len() >= 2 {
        levels.drain(0..2);
    }
    levels
}

/// Returns `true` when every topic matched by `candidate` is also
/// matched by `filter` — i.e. `filter` is broader than or equal to
/// `candidate` in the MQTT sense. Grounded on `engine.go`'s
/// `match`/`matchDeep`.
#[must_use]
pub fn is_match(filter: &str, candidate: &str) -> bool {
    if filter == candidate {
        return true;
    }
    match_levels(&filter_levels(filter), &filter_levels(candidate))
}

fn match_levels(filter: &[&str], candidate: &[&str]) -> bool {
    match (filter.first(), candidate.first()) {
        (None, None) => true,
        (None, Some(_)) => false,
        (Some(&"#"), _) => true,
        (Some(&"+"), Some(_)) => match_levels(&filter[1..], &candidate[1..]),
        (Some(head), Some(other)) if head == other => {
            match_levels(&filter[1..], &candidate[1..])
        }
        (Some(_), None) => filter.len() == 1 && filter[0] == "#",
        _ => false,
    }
}

/// Reduces a set of subscription filters to an antichain under
/// [`is_match`]'s partial order: when one filter is broader than or
/// equal to another, the narrower one is dropped since the broker would
/// already deliver everything it matches. Grounded on `engine.go`'s
/// `buildSubscriptions`, generalized from `paho.SubscribeOptions` to a
/// caller-supplied value type so callers can carry a QoS or similar
/// payload alongside each subscription.
///
/// Ties (`is_match(a, b) && is_match(b, a)`, e.g. textually identical
/// filters) keep whichever entry `subscriptions` iterates first,
/// keeping whichever entry was encountered first.
pub fn minimize_set<V>(subscriptions: &HashMap<String, V>) -> HashMap<String, V>
where
    V: Clone,
{
    let filters: Vec<&String> = subscriptions.keys().collect();
    let mut redundant = vec![false; filters.len()];

    for i in 0..filters.len() {
        for j in (i + 1)..filters.len() {
            if redundant[i] || redundant[j] {
                continue;
            }
            if is_match(filters[i], filters[j]) {
                redundant[j] = true;
            } else if is_match(filters[j], filters[i]) {
                redundant[i] = true;
            }
        }
    }

    filters
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !redundant[*i])
        .map(|(_, filter)| (filter.clone(), subscriptions[filter].clone()))
        .collect()
}

/// Extracts named parameters from a concrete `topic` given the
/// `param_index` recorded at pattern-compile time. A non-negative index
/// yields a single-element sequence;
/// a negative `-i` yields every level from `i` onward, possibly empty
/// if the topic is shorter than the pattern.
#[must_use]
pub fn extract(param_index: &ParamIndex, topic: &str) -> HashMap<String, Vec<String>> {
    let levels: Vec<&str> = topic.split('/').collect();
    let mut params = HashMap::with_capacity(param_index.len());
    for (name, &idx) in param_index {
        let value = if idx >= 0 {
            let i = idx as usize;
            levels.get(i).map_or_else(Vec::new, |level| vec![(*level).to_string()])
        } else {
            let from = (-idx) as usize;
            levels
                .get(from..)
                .map(|rest| rest.iter().map(|level| (*level).to_string()).collect())
                .unwrap_or_default()
        };
        params.insert(name.clone(), value);
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_matches_one_level() {
        assert!(is_match("a/+/c", "a/b/c"));
        assert!(!is_match("a/+/c", "a/b/x/c"));
    }

    #[test]
    fn hash_matches_trailing_levels() {
        assert!(is_match("a/#", "a"));
        assert!(is_match("a/#", "a/b"));
        assert!(is_match("a/#", "a/b/c"));
        assert!(!is_match("a/#", "x/b/c"));
    }

    #[test]
    fn shared_subscription_prefix_is_stripped() {
        assert!(is_match("$share/group1/a/+/c", "a/b/c"));
    }

    #[test]
    fn scenario_minimize_set() {
        let mut subs = HashMap::new();
        subs.insert("MQRR/+/+/#".to_string(), ());
        subs.insert("MQRR/tests/test".to_string(), ());
        subs.insert("MQRR/G1/+/new".to_string(), ());
        subs.insert("MQRR/G1/G2/+".to_string(), ());
        let minimized = minimize_set(&subs);
        assert_eq!(minimized.len(), 1);
        assert!(minimized.contains_key("MQRR/+/+/#"));
    }

    #[test]
    fn minimize_set_is_idempotent() {
        let mut subs = HashMap::new();
        subs.insert("a/+".to_string(), ());
        subs.insert("a/b".to_string(), ());
        let once = minimize_set(&subs);
        let twice = minimize_set(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn scenario_param_extraction() {
        let compiled = super::super::CompiledPattern::compile("MQRR/:name/:age/*last").unwrap();
        let params = extract(&compiled.params, "MQRR/john/50/sex/a/b/c");
        assert_eq!(params["name"], vec!["john".to_string()]);
        assert_eq!(params["age"], vec!["50".to_string()]);
        assert_eq!(
            params["last"],
            vec!["sex", "a", "b", "c"]
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn multi_level_param_at_boundary_is_empty() {
        let mut idx = ParamIndex::new();
        idx.insert("rest".to_string(), -2);
        let params = extract(&idx, "a/b");
        assert_eq!(params["rest"], Vec::<String>::new());
    }
}
