//! Casing normalization of wire identifiers.

/// `"grandfather_father.son grandson"` -> `"grandfatherFatherSonGrandson"`.
pub fn to_lower_camel(identifier: &str) -> String {
    let mut result = String::with_capacity(identifier.len());
    for (position, word) in split_words(identifier).iter().enumerate() {
        if position == 0 {
            result.push_str(&word.to_lowercase());
        } else {
            push_capitalized(&mut result, word);
        }
    }
    result
}

/// `"grandfather_father.son grandson"` -> `"GrandfatherFatherSonGrandson"`.
pub fn to_upper_camel(identifier: &str) -> String {
    let mut result = String::with_capacity(identifier.len());
    for word in split_words(identifier) {
        push_capitalized(&mut result, &word);
    }
    result
}

fn push_capitalized(target: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        target.extend(first.to_uppercase());
        target.push_str(&chars.as_str().to_lowercase());
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Case {
    Upper,
    Lower,
}

fn case_of(c: char) -> Option<Case> {
    if c.is_uppercase() {
        Some(Case::Upper)
    } else if c.is_lowercase() {
        Some(Case::Lower)
    } else {
        None
    }
}

fn split_words(identifier: &str) -> Vec<String> {
    let mut words = Vec::new();
    for run in identifier.split(|c: char| !c.is_alphanumeric()) {
        if !run.is_empty() {
            split_run(run, &mut words);
        }
    }
    words
}

fn split_run(run: &str, words: &mut Vec<String>) {
    let chars: Vec<char> = run.chars().collect();
    let mut current = String::new();
    // Case of the last letter seen, digits are transparent.
    let mut previous: Option<Case> = None;

    for (position, &c) in chars.iter().enumerate() {
        let case = case_of(c);
        let boundary = match (previous, case) {
            (Some(Case::Lower), Some(Case::Upper)) => true,
            (Some(Case::Upper), Some(Case::Upper)) => chars
                .get(position + 1)
                .is_some_and(|next| case_of(*next) == Some(Case::Lower)),
            _ => false,
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        if case.is_some() {
            previous = case;
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
}
