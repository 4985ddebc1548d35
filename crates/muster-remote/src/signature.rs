// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use muster_message::RemoteValue;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

/// A method or attribute's declared shape, captured once when its
/// `RemoteHandle` is built rather than inspected per call (reified once,
/// not reflected, unlike the original `inspect.signature` call on every
/// invocation).
#[derive(Debug, Clone)]
pub struct RemoteSignature {
  arity: RangeInclusive<usize>,
  kwarg_names: BTreeSet<String>,
}

impl RemoteSignature {
  /// `required` positional arguments, plus up to `optional` more, plus
  /// any of `kwarg_names` by name.
  pub fn new(required: usize, optional: usize, kwarg_names: impl IntoIterator<Item = String>) -> Self {
    RemoteSignature {
      arity: required..=(required + optional),
      kwarg_names: kwarg_names.into_iter().collect(),
    }
  }

  /// A signature that accepts nothing at all — what a plain attribute
  /// read uses.
  pub fn none() -> Self {
    RemoteSignature::new(0, 0, [])
  }

  pub fn validate(&self, args: &[RemoteValue], kwargs: &BTreeMap<String, RemoteValue>) -> Result<(), String> {
    if !self.arity.contains(&args.len()) {
      return Err(format!(
        "expected {}..={} positional argument(s), got {}",
        self.arity.start(),
        self.arity.end(),
        args.len()
      ));
    }
    for name in kwargs.keys() {
      if !self.kwarg_names.contains(name) {
        return Err(format!("unexpected keyword argument '{name}'"));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn none_rejects_any_argument_at_all() {
    let sig = RemoteSignature::none();
    assert!(sig.validate(&[], &BTreeMap::new()).is_ok());
    assert!(sig.validate(&[RemoteValue::Int(1)], &BTreeMap::new()).is_err());
  }

  #[test]
  fn required_and_optional_together_define_an_inclusive_arity_range() {
    let sig = RemoteSignature::new(1, 2, []);
    assert!(sig.validate(&[RemoteValue::Int(1)], &BTreeMap::new()).is_ok());
    assert!(sig
      .validate(&[RemoteValue::Int(1), RemoteValue::Int(2), RemoteValue::Int(3)], &BTreeMap::new())
      .is_ok());
    assert!(sig.validate(&[], &BTreeMap::new()).is_err());
    assert!(sig
      .validate(
        &[RemoteValue::Int(1), RemoteValue::Int(2), RemoteValue::Int(3), RemoteValue::Int(4)],
        &BTreeMap::new()
      )
      .is_err());
  }

  #[test]
  fn unknown_keyword_argument_names_are_rejected() {
    let sig = RemoteSignature::new(0, 0, ["by".to_string()]);
    let mut kwargs = BTreeMap::new();
    kwargs.insert("by".to_string(), RemoteValue::Int(1));
    assert!(sig.validate(&[], &kwargs).is_ok());

    let mut bad_kwargs = BTreeMap::new();
    bad_kwargs.insert("unexpected".to_string(), RemoteValue::Int(1));
    let err = sig.validate(&[], &bad_kwargs).unwrap_err();
    assert!(err.contains("unexpected"));
  }
}
