//! Default input extraction from a raw data bag.

use crate::constructor::Constructor;
use crate::node::{NodeData, PropValue, PropsData};

/// Pulls the constructor's declared inputs out of `data`.
///
/// Each declared name is looked up as written and hyphenated, first in
/// `data.props` (left in place) and then in `data.attrs` (removed, so it is
/// not also rendered as an attribute). Undeclared entries are untouched.
pub fn extract_props(data: &mut NodeData, ctor: &Constructor, tag: Option<&str>) -> PropsData {
    let options = ctor.options();
    let mut extracted = PropsData::new();
    for name in &options.props {
        let hyphenated = hyphenate(name);
        if let Some(value) = lookup(&data.props, name, &hyphenated) {
            extracted.insert(name.clone(), value);
            continue;
        }
        let key = if data.attrs.contains_key(name.as_str()) {
            Some(name.as_str())
        } else if data.attrs.contains_key(hyphenated.as_str()) {
            Some(hyphenated.as_str())
        } else {
            None
        };
        if let Some(key) = key {
            if let Some(value) = data.attrs.shift_remove(key) {
                extracted.insert(name.clone(), value);
            }
        }
    }
    log::trace!(
        "extracted {} of {} declared inputs for {}",
        extracted.len(),
        options.props.len(),
        tag.unwrap_or("<anonymous>")
    );
    extracted
}

fn lookup(bag: &PropsData, name: &str, hyphenated: &str) -> Option<PropValue> {
    bag.get(name).or_else(|| bag.get(hyphenated)).cloned()
}

/// `fooBar` -> `foo-bar`. Only interior capitals get a separator.
pub fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_word_char = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if previous_word_char {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
        previous_word_char = ch.is_alphanumeric() || ch == '_';
    }
    out
}
