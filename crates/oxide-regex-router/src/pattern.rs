//! Path template compilation and matching.
//!
//! A template mixes four kinds of tokens:
//!
//! | token             | emitted pattern | capture            |
//! |-------------------|-----------------|--------------------|
//! | `{name}`          | `([^/]+)`       | `name`             |
//! | `{name:pattern}`  | `(pattern)`     | `name`             |
//! | `:name`           | `([^/]+)`       | `name`             |
//! | `*`               | `(.+)`          | next wildcard slot |
//! | anything else     | escaped literal | none               |
//!
//! The emitted pattern is anchored at both ends, so `/users/:id` never matches
//! `/users/1/edit`.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::DuplicateCaptures;
use crate::error::{Result, RouterError};
use crate::params::{Params, ParamsPool};

/// Pattern for one path segment.
const SEGMENT: &str = "([^/]+)";
/// Pattern for a wildcard, which may span segments.
const WILDCARD: &str = "(.+)";

// Alternatives are tried in order at each position:
//   1. `{...}`, allowing nested `{n}` / `{n,m}` quantifiers inside a subpattern
//   2. `:name`
//   3. `*`
//   4. a literal run
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{((?:\{[0-9,]+\}|[^{}]+)+)\}|:([A-Za-z0-9_]+)|(\*)|([^{:*]+)")
        .expect("token grammar is a valid regex")
});

/// What a capturing group in a compiled pattern feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// A named capture.
    Named(Arc<str>),
    /// An anonymous wildcard, appended to the wildcard list.
    Wildcard,
}

impl Capture {
    fn named(name: &str) -> Self {
        Self::Named(Arc::from(name))
    }
}

/// Translates a template into an anchored regex source and its captures.
///
/// This only tokenizes; the regex itself is built by [`PathPattern::new`].
///
/// ```
/// use oxide_regex_router::pattern::{compile, Capture};
///
/// let (regex, captures) = compile(r"/blog/{year:\d{4}}/*").unwrap();
/// assert_eq!(regex, r"^/blog/(\d{4})/(.+)$");
/// assert_eq!(captures, [Capture::Named("year".into()), Capture::Wildcard]);
/// ```
pub fn compile(template: &str) -> Result<(String, Vec<Capture>)> {
    let mut source = String::with_capacity(template.len() + 16);
    let mut captures = Vec::new();
    let mut end = 0;

    source.push('^');
    for caps in TOKEN.captures_iter(template) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        if whole.start != end {
            return Err(RouterError::UnexpectedToken {
                template: template.to_string(),
                offset: end,
            });
        }
        end = whole.end;

        if let Some(inner) = caps.get(1) {
            let (name, pattern) = match inner.as_str().split_once(':') {
                Some((name, pattern)) => (name, Some(pattern)),
                None => (inner.as_str(), None),
            };
            if name.is_empty() {
                return Err(RouterError::InvalidPattern {
                    template: template.to_string(),
                    message: "empty capture name".to_string(),
                });
            }
            match pattern {
                Some(pattern) => {
                    source.push('(');
                    source.push_str(pattern);
                    source.push(')');
                }
                None => source.push_str(SEGMENT),
            }
            captures.push(Capture::named(name));
        } else if let Some(name) = caps.get(2) {
            source.push_str(SEGMENT);
            captures.push(Capture::named(name.as_str()));
        } else if caps.get(3).is_some() {
            source.push_str(WILDCARD);
            captures.push(Capture::Wildcard);
        } else if let Some(literal) = caps.get(4) {
            source.push_str(&regex::escape(literal.as_str()));
        }
    }
    if end != template.len() {
        return Err(RouterError::UnexpectedToken {
            template: template.to_string(),
            offset: end,
        });
    }
    source.push('$');

    Ok((source, captures))
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The template as registered.
    template: String,
    /// Compiled, anchored regex.
    regex: Regex,
    /// One entry per capturing group the template declares, in order.
    captures: Vec<Capture>,
}

impl PathPattern {
    /// Compiles a template, rejecting repeated capture names.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use oxide_regex_router::PathPattern;
    /// use oxide_regex_router::params::ParamsPool;
    ///
    /// let pool = Arc::new(ParamsPool::new(1));
    /// let pattern = PathPattern::new("/posts/{id}/comments/:comment_id").unwrap();
    /// let params = pattern.match_path("/posts/123/comments/456", &pool).unwrap().unwrap();
    /// assert_eq!(params.get("id"), Some("123"));
    /// assert_eq!(params.get("comment_id"), Some("456"));
    /// ```
    pub fn new(template: &str) -> Result<Self> {
        Self::with_policy(template, DuplicateCaptures::Reject)
    }

    /// Compiles a template, treating repeated capture names according to `policy`.
    pub fn with_policy(template: &str, policy: DuplicateCaptures) -> Result<Self> {
        let (source, captures) = compile(template)?;
        if policy == DuplicateCaptures::Reject {
            check_unique(template, &captures)?;
        }
        Self::from_parts(template, &source, captures)
    }

    /// Builds a pattern from an already-compiled regex source and its captures.
    ///
    /// Nothing checks that `captures` agrees with the groups in `source`; a pattern
    /// that disagrees reports [`RouterError::CaptureMismatch`] whenever it matches.
    pub fn from_parts(template: &str, source: &str, captures: Vec<Capture>) -> Result<Self> {
        let regex = Regex::new(source).map_err(|e| RouterError::InvalidPattern {
            template: template.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            template: template.to_string(),
            regex,
            captures,
        })
    }

    /// Returns the template as registered.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the compiled regex source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the declared captures, in group order.
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    /// Number of capturing groups the compiled regex contains.
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Returns true if the declared captures line up with the regex groups.
    pub fn is_consistent(&self) -> bool {
        self.group_count() == self.captures.len()
    }

    /// Returns true if `path` matches the whole pattern.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Attempts to match `path`, filling a buffer drawn from `pool` on success.
    ///
    /// Returns `Ok(None)` when the path does not match and
    /// [`RouterError::CaptureMismatch`] when it matches but the group count disagrees
    /// with the declared captures.
    pub fn match_path(&self, path: &str, pool: &Arc<ParamsPool>) -> Result<Option<Params>> {
        let Some(caps) = self.regex.captures(path) else {
            return Ok(None);
        };

        let captured = caps.len() - 1;
        if captured != self.captures.len() {
            return Err(RouterError::CaptureMismatch {
                pattern: self.regex.as_str().to_string(),
                declared: self.captures.len(),
                captured,
            });
        }

        let mut params = pool.acquire();
        if captured > 0 {
            let buf = params.buffer_mut();
            for (i, capture) in self.captures.iter().enumerate() {
                let value = caps.get(i + 1).map_or("", |m| m.as_str());
                match capture {
                    Capture::Wildcard => buf.push_wildcard(value),
                    Capture::Named(name) => buf.set(name, value),
                }
            }
        }
        Ok(Some(params))
    }
}

fn check_unique(template: &str, captures: &[Capture]) -> Result<()> {
    let mut seen = HashSet::new();
    for capture in captures {
        if let Capture::Named(name) = capture {
            if !seen.insert(name.as_ref()) {
                return Err(RouterError::DuplicateCapture {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
        }
    }
    Ok(())
}
