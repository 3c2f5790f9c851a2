// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Command templates.
//!
//! Every external command publicist issues starts life as a __command
//! template__: a plain string with zero or more `${name}` placeholders. A
//! template is rendered against a set of [`Values`] right before it is handed
//! to a [`CommandRunner`](crate::runner::CommandRunner).
//!
//! # Placeholder Syntax
//!
//! A placeholder is `${` followed by an identifier made of ASCII letters,
//! digits, and underscores (not starting with a digit), followed by `}`.
//! Placeholders naming a key that is not in the value set are kept verbatim.
//! Anything that does not form a valid placeholder, e.g., `$ {name}`, `${}`,
//! or an unterminated `${name`, is kept verbatim as well. There is no escape
//! sequence, so a lone `$` is always passed through untouched.

use regex::{Captures, Regex};
use std::{collections::BTreeMap, sync::OnceLock};

/// Substitution set used to render command templates.
pub type Values = BTreeMap<String, String>;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Render command template with target substitution set.
///
/// Pure function. Rendering the same template with the same values always
/// yields the same string.
pub fn render(template: &str, values: &Values) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures<'_>| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
