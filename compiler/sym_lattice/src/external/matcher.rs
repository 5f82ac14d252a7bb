/// Suffix turning a path or URL pattern into a prefix pattern.
const PREFIX_SUFFIX: &str = "/...";

/// Matching rules for path, URL and host patterns.
///
/// The provided methods implement the default rules; runtimes override the
/// ones whose semantics differ.
pub trait LocatorMatcher {
    /// `pattern` is either a prefix pattern (`/dir/...`) or a glob where `*`
    /// and `?` stay within a segment and `**` spans segments.
    fn path_matches(&self, pattern: &str, path: &str) -> bool {
        match pattern.strip_suffix("...") {
            Some(prefix) if pattern.ends_with(PREFIX_SUFFIX) => path.starts_with(prefix),
            _ => glob_match(pattern.as_bytes(), path.as_bytes(), b'/'),
        }
    }

    /// `pattern` is either a prefix pattern (`https://host/dir/...`) or an
    /// exact URL.
    fn url_matches(&self, pattern: &str, url: &str) -> bool {
        match pattern.strip_suffix("...") {
            Some(prefix) if pattern.ends_with(PREFIX_SUFFIX) => url.starts_with(prefix),
            _ => pattern == url,
        }
    }

    /// `pattern` is `[scheme://]labels` where a `*` label matches exactly one
    /// label and `**` any number of them. Labels compare case-insensitively.
    fn host_matches(&self, pattern: &str, host: &str) -> bool {
        let (pattern_scheme, pattern_name) = split_scheme(pattern);
        let (host_scheme, host_name) = split_scheme(host);
        if pattern_scheme.is_some() && pattern_scheme != host_scheme {
            return false;
        }
        let pattern_labels: Vec<&str> = pattern_name.split('.').collect();
        let host_labels: Vec<&str> = host_name.split('.').collect();
        labels_match(&pattern_labels, &host_labels)
    }

    /// Does every locator `inner` matches also match `outer`?
    ///
    /// Only prefix patterns include patterns other than themselves.
    fn pattern_includes(&self, outer: &str, inner: &str) -> bool {
        match outer.strip_suffix("...") {
            Some(prefix) if outer.ends_with(PREFIX_SUFFIX) => inner.starts_with(prefix),
            _ => outer == inner,
        }
    }
}

/// Rules used when no runtime is attached.
#[derive(Copy, Clone, Default, Debug)]
pub struct DefaultMatcher;

impl LocatorMatcher for DefaultMatcher {}

fn split_scheme(locator: &str) -> (Option<&str>, &str) {
    match locator.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, locator),
    }
}

/// One pattern item of a glob or host pattern.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Token<T> {
    /// `**`: any number of units.
    Many,
    /// `*`: a run of units (globs) or exactly one label (hosts).
    Star,
    /// `?`: one unit.
    One,
    Exact(T),
}

/// Dynamic-programming match, one row per pattern token, so every
/// `(token, position)` pair is decided once.
///
/// `star_step(unit)` says whether a `*` may consume `unit`; `star_empty`
/// whether it may consume nothing. `equal` compares exact units.
fn table_match<T, U>(
    tokens: &[Token<T>],
    text: &[U],
    star_empty: bool,
    star_step: impl Fn(&U) -> bool,
    one: impl Fn(&U) -> bool,
    equal: impl Fn(&T, &U) -> bool,
) -> bool {
    let len = text.len();
    // `next[j]`: do the tokens after the current one match `text[j..]`?
    let mut next = vec![false; len + 1];
    next[len] = true;
    let mut current = vec![false; len + 1];
    for token in tokens.iter().rev() {
        for j in (0..=len).rev() {
            let unit = text.get(j);
            let matched = match token {
                Token::Many => next[j] || (unit.is_some() && current[j + 1]),
                Token::Star if star_empty => {
                    next[j] || unit.is_some_and(|u| star_step(u) && current[j + 1])
                }
                // A label wildcard consumes exactly one label.
                Token::Star => unit.is_some_and(|u| star_step(u) && next[j + 1]),
                Token::One => unit.is_some_and(|u| one(u) && next[j + 1]),
                Token::Exact(expected) => unit.is_some_and(|u| equal(expected, u) && next[j + 1]),
            };
            current[j] = matched;
        }
        std::mem::swap(&mut next, &mut current);
    }
    next[0]
}

fn labels_match(pattern: &[&str], host: &[&str]) -> bool {
    let tokens: Vec<Token<&str>> = pattern
        .iter()
        .map(|label| match *label {
            "**" => Token::Many,
            "*" => Token::Star,
            label => Token::Exact(label),
        })
        .collect();
    table_match(
        &tokens,
        host,
        false,
        |_| true,
        |_| true,
        |expected, label| expected.eq_ignore_ascii_case(label),
    )
}

fn glob_tokens(pattern: &[u8]) -> Vec<Token<u8>> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some((&first, tail)) = rest.split_first() {
        rest = match (first, tail) {
            (b'*', [b'*', tail @ ..]) => {
                tokens.push(Token::Many);
                tail
            }
            (b'*', _) => {
                tokens.push(Token::Star);
                tail
            }
            (b'?', _) => {
                tokens.push(Token::One);
                tail
            }
            (byte, _) => {
                tokens.push(Token::Exact(byte));
                tail
            }
        };
    }
    tokens
}

/// Byte-wise glob match. `*` and `?` never consume `separator`; `**`
/// consumes anything.
fn glob_match(pattern: &[u8], text: &[u8], separator: u8) -> bool {
    table_match(
        &glob_tokens(pattern),
        text,
        true,
        |&b| b != separator,
        |&b| b != separator,
        |expected, b| expected == b,
    )
}
