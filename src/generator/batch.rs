//! Grouping input lines into template contexts.

use crate::template::TemplateContext;
use regex::Regex;
use std::num::NonZeroUsize;

/// How input lines become commands.
#[derive(Debug, Clone)]
pub enum BatchPolicy {
    /// Every `n` lines form one command; `{N}` addresses line `N` of the batch.
    Count(NonZeroUsize),
    /// Every line forms one command; `{N}` addresses field `N` of the split line.
    Separator(Regex),
}

impl Default for BatchPolicy {
    fn default() -> Self {
        BatchPolicy::Count(NonZeroUsize::MIN)
    }
}

/// Accumulates lines and yields a context whenever a batch is complete.
#[derive(Debug)]
pub struct Batcher {
    policy: BatchPolicy,
    pending: Vec<String>,
}

impl Batcher {
    pub fn new(policy: BatchPolicy) -> Self {
        let capacity = match &policy {
            BatchPolicy::Count(n) => n.get(),
            BatchPolicy::Separator(_) => 0,
        };
        Self {
            policy,
            pending: Vec::with_capacity(capacity),
        }
    }

    /// Add one line, returning a context if it completed a batch.
    pub fn push(&mut self, line: String) -> Option<TemplateContext> {
        match &self.policy {
            BatchPolicy::Separator(sep) => {
                let tokens = split_tokens(sep, &line);
                Some(TemplateContext::split(line, tokens))
            }
            BatchPolicy::Count(n) => {
                self.pending.push(line);
                if self.pending.len() < n.get() {
                    return None;
                }
                let lines = std::mem::replace(&mut self.pending, Vec::with_capacity(n.get()));
                Some(TemplateContext::batch(lines))
            }
        }
    }

    /// Flush the trailing partial batch at end of input, if any.
    pub fn finish(&mut self) -> Option<TemplateContext> {
        if self.pending.is_empty() {
            None
        } else {
            Some(TemplateContext::batch(std::mem::take(&mut self.pending)))
        }
    }
}

/// Split `line` on every match of `sep`.
///
/// An empty match at the very start of the line does not produce a leading
/// empty token, and a match that starts at the end of the line does not
/// produce a trailing one. An empty line is a single empty token.
pub fn split_tokens(sep: &Regex, line: &str) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }

    let mut tokens = Vec::new();
    let mut beg = 0;
    let mut end = 0;
    for m in sep.find_iter(line) {
        end = m.start();
        if m.end() != 0 {
            tokens.push(line[beg..end].to_string());
        }
        beg = m.end();
    }
    if end != line.len() {
        tokens.push(line[beg..].to_string());
    }
    tokens
}
