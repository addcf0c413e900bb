// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

use std::collections::HashMap;

use crate::error::{Error, ErrorKind, Result};

/// Maps a parameter name to where it was found in a compiled pattern.
/// A non-negative value is the 0-based level index of a single-level
/// (`:name`) capture; a negative value `-i` means "levels `i..` joined",
/// the multi-level (`*name`) capture.
pub type ParamIndex = HashMap<String, i64>;

/// The result of compiling a user-facing pattern
/// "Compiled pattern"): the MQTT subscription filter to hand to the
/// broker, and the parameter index the [`crate::Context`] uses to pull
/// named captures back out of a matching topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    pub subscription: String,
    pub params: ParamIndex,
}

impl CompiledPattern {
    /// Compiles a pattern such as `:name/:age/*rest` into its MQTT
    /// subscription filter and parameter index.
    ///
    /// Fails (a programmer error, fatal at registration time per
    /// registration time) when:
    /// - any level is empty,
    /// - a `:`/`*` level has an empty name,
    /// - `*name` appears anywhere but the last level.
    pub fn compile(pattern: &str) -> Result<Self> {
        let raw_levels: Vec<&str> = pattern.split('/').collect();
        let mut levels = Vec::with_capacity(raw_levels.len());
        let mut params = ParamIndex::new();

        for (i, part) in raw_levels.iter().enumerate() {
            if part.is_empty() {
                return Err(Error::new(
                    ErrorKind::PatternError,
                    format!("empty level in topic pattern {pattern:?}"),
                ));
            }
            let mut chars = part.chars();
            let level = match chars.next() {
                Some(':') => {
                    let name = &part[1..];
                    if name.is_empty() {
                        return Err(Error::new(
                            ErrorKind::PatternError,
                            format!("empty parameter name in topic pattern {pattern:?}"),
                        ));
                    }
                    params.insert(name.to_string(), i as i64);
                    "+".to_string()
                }
                Some('*') => {
                    if i != raw_levels.len() - 1 {
                        return Err(Error::new(
                            ErrorKind::PatternError,
                            "the multi-level wildcard must be the last level in the topic",
                        ));
                    }
                    let name = &part[1..];
                    if name.is_empty() {
                        return Err(Error::new(
                            ErrorKind::PatternError,
                            format!("empty parameter name in topic pattern {pattern:?}"),
                        ));
                    }
                    params.insert(name.to_string(), -(i as i64));
                    "#".to_string()
                }
                _ => (*part).to_string(),
            };
            levels.push(level);
        }

        Ok(CompiledPattern {
            subscription: levels.join("/"),
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_named_params() {
        let compiled = CompiledPattern::compile("MQRR/:name/:age/*last").unwrap();
        assert_eq!(compiled.subscription, "MQRR/+/+/#");
        assert_eq!(compiled.params.get("name"), Some(&1));
        assert_eq!(compiled.params.get("age"), Some(&2));
        assert_eq!(compiled.params.get("last"), Some(&-3));
    }

    #[test]
    fn raw_wildcards_pass_through_without_binding() {
        let compiled = CompiledPattern::compile("a/+/b/#").unwrap();
        assert_eq!(compiled.subscription, "a/+/b/#");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn rejects_empty_level() {
        assert!(CompiledPattern::compile("a//b").is_err());
    }

    #[test]
    fn rejects_empty_param_name() {
        assert!(CompiledPattern::compile("a/:").is_err());
        assert!(CompiledPattern::compile("a/*").is_err());
    }

    #[test]
    fn rejects_non_final_multi_level_wildcard() {
        assert!(CompiledPattern::compile("*rest/a").is_err());
    }
}
