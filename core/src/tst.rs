//! Ternary search tree keyed by surface strings.
//!
//! This is the dictionary's primary index: it files wordform ids under
//! their surface string and answers two queries, exact lookup and
//! longest-matching-prefix. The latter drives out-of-vocabulary
//! prediction: when a word is not itself a key, the walk still reports the
//! deepest prefix of the query that *is* a key, plus the wordforms stored
//! there.
//!
//! Nodes live in a flat arena indexed by `u32`; `NIL` marks an absent
//! child. Posting lists keep insertion order, which is the only ordering
//! consumers may rely on for a given frozen dictionary.

/// Sentinel for "no node".
const NIL: u32 = u32::MAX;

#[derive(Debug)]
struct TstNode {
    ch: char,
    lo: u32,
    eq: u32,
    hi: u32,
    /// Wordform ids filed under the key ending at this node. Non-empty
    /// exactly when the path to this node spells a key.
    postings: Vec<u32>,
}

/// Result of a longest-prefix walk.
///
/// `matched_len` counts characters, not bytes. It is always `<=` the query
/// length in characters, and equals it exactly when the query itself is a
/// key (`is_exact`). A zero length means nothing in the index shares even
/// the first character with the query.
#[derive(Debug, Clone)]
pub struct PrefixMatch<'a> {
    pub matched_len: usize,
    pub is_exact: bool,
    pub postings: &'a [u32],
}

/// String-keyed index with ternary-search-tree semantics.
#[derive(Debug)]
pub struct Tst {
    nodes: Vec<TstNode>,
    root: u32,
    keys: usize,
}

impl Default for Tst {
    fn default() -> Self {
        Self::new()
    }
}

impl Tst {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NIL,
            keys: 0,
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys == 0
    }

    /// Arena size, for memory diagnostics.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push_node(&mut self, ch: char) -> u32 {
        let idx = self.nodes.len() as u32;
        self.nodes.push(TstNode {
            ch,
            lo: NIL,
            eq: NIL,
            hi: NIL,
            postings: Vec::new(),
        });
        idx
    }

    /// File `posting` under `key`. Empty keys are ignored.
    pub fn insert(&mut self, key: &str, posting: u32) {
        let chars: Vec<char> = key.chars().collect();
        if chars.is_empty() {
            return;
        }
        if self.root == NIL {
            self.root = self.push_node(chars[0]);
        }
        let mut cur = self.root;
        let mut i = 0;
        loop {
            let ch = chars[i];
            let node_ch = self.nodes[cur as usize].ch;
            if ch < node_ch {
                let next = self.nodes[cur as usize].lo;
                cur = if next == NIL {
                    let n = self.push_node(ch);
                    self.nodes[cur as usize].lo = n;
                    n
                } else {
                    next
                };
            } else if ch > node_ch {
                let next = self.nodes[cur as usize].hi;
                cur = if next == NIL {
                    let n = self.push_node(ch);
                    self.nodes[cur as usize].hi = n;
                    n
                } else {
                    next
                };
            } else if i + 1 == chars.len() {
                let node = &mut self.nodes[cur as usize];
                if node.postings.is_empty() {
                    self.keys += 1;
                }
                node.postings.push(posting);
                return;
            } else {
                i += 1;
                let next = self.nodes[cur as usize].eq;
                cur = if next == NIL {
                    let n = self.push_node(chars[i]);
                    self.nodes[cur as usize].eq = n;
                    n
                } else {
                    next
                };
            }
        }
    }

    fn find_node(&self, key: &str) -> Option<u32> {
        let mut cur = self.root;
        let mut it = key.chars();
        let mut ch = it.next()?;
        while cur != NIL {
            let node = &self.nodes[cur as usize];
            if ch < node.ch {
                cur = node.lo;
            } else if ch > node.ch {
                cur = node.hi;
            } else {
                match it.next() {
                    Some(c) => {
                        ch = c;
                        cur = node.eq;
                    }
                    None => return Some(cur),
                }
            }
        }
        None
    }

    /// Wordform ids filed under exactly `key`, in insertion order. Empty
    /// if `key` is not in the index.
    pub fn exact_lookup(&self, key: &str) -> &[u32] {
        match self.find_node(key) {
            Some(n) => &self.nodes[n as usize].postings,
            None => &[],
        }
    }

    /// Walk as deep as the query allows and report the deepest key-prefix.
    pub fn longest_prefix_match(&self, word: &str) -> PrefixMatch<'_> {
        let total = word.chars().count();
        let mut best: Option<(usize, u32)> = None;
        let mut consumed = 0usize;
        let mut cur = self.root;
        let mut it = word.chars();
        let mut next_ch = it.next();
        while cur != NIL {
            let ch = match next_ch {
                Some(c) => c,
                None => break,
            };
            let node = &self.nodes[cur as usize];
            if ch < node.ch {
                cur = node.lo;
            } else if ch > node.ch {
                cur = node.hi;
            } else {
                consumed += 1;
                if !node.postings.is_empty() {
                    best = Some((consumed, cur));
                }
                next_ch = it.next();
                cur = node.eq;
            }
        }
        match best {
            Some((len, node)) => PrefixMatch {
                matched_len: len,
                is_exact: len == total,
                postings: &self.nodes[node as usize].postings,
            },
            None => PrefixMatch {
                matched_len: 0,
                is_exact: false,
                postings: &[],
            },
        }
    }

    /// Visit every key with its postings, in lexicographic key order.
    pub fn for_each_key<F: FnMut(&str, &[u32])>(&self, mut f: F) {
        enum Step {
            Explore(u32),
            Enter(u32),
            Pop,
        }
        let mut stack = vec![Step::Explore(self.root)];
        let mut prefix = String::new();
        while let Some(step) = stack.pop() {
            match step {
                Step::Explore(n) => {
                    if n == NIL {
                        continue;
                    }
                    let node = &self.nodes[n as usize];
                    stack.push(Step::Explore(node.hi));
                    stack.push(Step::Enter(n));
                    stack.push(Step::Explore(node.lo));
                }
                Step::Enter(n) => {
                    let node = &self.nodes[n as usize];
                    prefix.push(node.ch);
                    if !node.postings.is_empty() {
                        f(&prefix, &node.postings);
                    }
                    stack.push(Step::Pop);
                    stack.push(Step::Explore(node.eq));
                }
                Step::Pop => {
                    prefix.pop();
                }
            }
        }
    }
}
