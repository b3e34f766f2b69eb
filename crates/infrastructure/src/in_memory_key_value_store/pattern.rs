//! Redis-style glob matching for key listings.

/// Returns whether `candidate` matches the glob `pattern`.
///
/// Supports `*`, `?`, character classes (`[abc]`, `[^abc]`, `[a-z]`) and
/// backslash escapes. An unterminated class runs to the end of the pattern.
pub(super) fn glob_matches(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    let (mut token, mut position) = (0, 0);
    // Pattern index after the last `*` and the candidate index it resumes from.
    let mut last_star: Option<(usize, usize)> = None;

    while position < candidate.len() {
        if pattern.get(token) == Some(&'*') {
            token += 1;
            last_star = Some((token, position));
            continue;
        }

        if let Some(next) = match_token(&pattern, token, candidate[position]) {
            token = next;
            position += 1;
            continue;
        }

        let Some((after_star, resume)) = last_star else {
            return false;
        };
        token = after_star;
        position = resume + 1;
        last_star = Some((after_star, position));
    }

    pattern[token..].iter().all(|remaining| *remaining == '*')
}

/// Matches `character` against the token at `index` and returns the index of
/// the following token.
fn match_token(pattern: &[char], index: usize, character: char) -> Option<usize> {
    match *pattern.get(index)? {
        '?' => Some(index + 1),
        '[' => {
            let (matched, rest) = match_class(&pattern[index + 1..], character);
            matched.then_some(pattern.len() - rest.len())
        }
        '\\' if index + 1 < pattern.len() => {
            (pattern[index + 1] == character).then_some(index + 2)
        }
        literal => (literal == character).then_some(index + 1),
    }
}

/// Matches one character against the class body following `[` and returns
/// the pattern remaining after the closing `]`.
fn match_class(class: &[char], character: char) -> (bool, &[char]) {
    let (negated, mut index) = match class.first() {
        Some('^') => (true, 1),
        _ => (false, 0),
    };
    let mut matched = false;

    while index < class.len() && class[index] != ']' {
        let current = class[index];
        if current == '\\' && index + 1 < class.len() {
            matched |= class[index + 1] == character;
            index += 2;
        } else if index + 2 < class.len() && class[index + 1] == '-' && class[index + 2] != ']' {
            let (low, high) = if current <= class[index + 2] {
                (current, class[index + 2])
            } else {
                (class[index + 2], current)
            };
            matched |= (low..=high).contains(&character);
            index += 3;
        } else {
            matched |= current == character;
            index += 1;
        }
    }

    let rest = if index < class.len() {
        &class[index + 1..]
    } else {
        &class[index..]
    };

    (matched != negated, rest)
}
