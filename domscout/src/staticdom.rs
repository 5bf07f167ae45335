//! In-memory DOM backend for deterministic, browser-free probe runs.
//!
//! Supports the selector subset the probe flows actually use: tag names,
//! `#id`, `[attr]` tests with `=` / `^=` / `*=` / `$=`, compound simple
//! selectors, the `>` child combinator, absolute indexed XPath steps, and
//! exact-text queries. Anything else fails the query rather than silently
//! matching nothing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::backend::{DomBackend, DomElementImpl};
use crate::element::DomElement;
use crate::errors::ScoutError;
use crate::selector::Selector;

/// One node of the fixture tree.
#[derive(Debug, Clone, Default)]
pub struct StaticNode {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<StaticNode>,
}

impl StaticNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(mut self, child: StaticNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = StaticNode>) -> Self {
        self.children.extend(children);
        self
    }

    fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ").trim().to_string()
    }

    fn collect_text(&self, parts: &mut Vec<String>) {
        if !self.text.trim().is_empty() {
            parts.push(self.text.trim().to_string());
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }
}

#[derive(Debug, Default)]
struct RunState {
    url: Mutex<String>,
    clicks: AtomicUsize,
    closed: AtomicBool,
}

/// A fixture page standing in for the live one.
#[derive(Clone)]
pub struct StaticDom {
    root: Arc<StaticNode>,
    state: Arc<RunState>,
}

impl StaticDom {
    /// Build a page around a document root (conventionally an `html` node).
    pub fn new(root: StaticNode) -> Self {
        Self::with_url(root, "static://fixture")
    }

    pub fn with_url(root: StaticNode, url: impl Into<String>) -> Self {
        let state = RunState {
            url: Mutex::new(url.into()),
            ..Default::default()
        };
        Self {
            root: Arc::new(root),
            state: Arc::new(state),
        }
    }

    /// Total number of clicks delivered to any element of the page.
    pub fn click_count(&self) -> usize {
        self.state.clicks.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    fn element(&self, path: Vec<usize>) -> DomElement {
        DomElement::new(Arc::new(StaticElement {
            root: self.root.clone(),
            state: self.state.clone(),
            path,
        }))
    }

    fn search(&self, selector: &Selector, scope: &[usize]) -> Result<Vec<Vec<usize>>, ScoutError> {
        match selector {
            Selector::Css(css) => {
                let chain = parse_css(css).map_err(ScoutError::QueryFailed)?;
                Ok(self.match_chain(&chain, scope))
            }
            Selector::AriaLabel(label) => {
                let chain = vec![Compound {
                    attrs: vec![AttrTest {
                        name: "aria-label".to_string(),
                        op: AttrOp::Equals,
                        value: label.clone(),
                    }],
                    ..Default::default()
                }];
                Ok(self.match_chain(&chain, scope))
            }
            Selector::XPath(xpath) => self.match_xpath(xpath),
            Selector::Text(needle) => {
                let needle = needle.trim();
                let mut hits = Vec::new();
                for path in descendant_paths(&self.root, scope) {
                    if let Some(node) = node_at(&self.root, &path) {
                        if node.text.trim() == needle {
                            hits.push(path);
                        }
                    }
                }
                Ok(hits)
            }
            Selector::Invalid(reason) => Err(ScoutError::InvalidSelector(reason.clone())),
        }
    }

    fn match_chain(&self, chain: &[Compound], scope: &[usize]) -> Vec<Vec<usize>> {
        let mut hits = Vec::new();
        for path in descendant_paths(&self.root, scope) {
            if self.chain_matches(chain, &path) {
                hits.push(path);
            }
        }
        hits
    }

    // The candidate must match the last compound and each preceding compound
    // must match the next ancestor up, per the `>` combinator.
    fn chain_matches(&self, chain: &[Compound], path: &[usize]) -> bool {
        let Some((last, ancestor_chain)) = chain.split_last() else {
            return false;
        };
        let Some(node) = node_at(&self.root, path) else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }
        let mut path = path.to_vec();
        for compound in ancestor_chain.iter().rev() {
            // No parent above the document root
            if path.pop().is_none() {
                return false;
            }
            let Some(parent) = node_at(&self.root, &path) else {
                return false;
            };
            if !compound.matches(parent) {
                return false;
            }
        }
        true
    }

    fn match_xpath(&self, xpath: &str) -> Result<Vec<Vec<usize>>, ScoutError> {
        let steps = parse_xpath(xpath).map_err(ScoutError::QueryFailed)?;
        let mut path = Vec::new();
        let mut node: &StaticNode = &self.root;
        let mut steps = steps.into_iter();

        // First step addresses the document root itself
        match steps.next() {
            Some(step) if step.tag == node.tag && step.index == 1 => {}
            _ => return Ok(Vec::new()),
        }
        for step in steps {
            let mut seen = 0usize;
            let mut matched = None;
            for (i, child) in node.children.iter().enumerate() {
                if child.tag == step.tag {
                    seen += 1;
                    if seen == step.index {
                        matched = Some((i, child));
                        break;
                    }
                }
            }
            match matched {
                Some((i, child)) => {
                    path.push(i);
                    node = child;
                }
                None => return Ok(Vec::new()),
            }
        }
        Ok(vec![path])
    }
}

#[async_trait]
impl DomBackend for StaticDom {
    async fn find_all(&self, selector: &Selector) -> Result<Vec<DomElement>, ScoutError> {
        let hits = self.search(selector, &[])?;
        Ok(hits.into_iter().map(|path| self.element(path)).collect())
    }

    async fn current_url(&self) -> Result<String, ScoutError> {
        Ok(self
            .state
            .url
            .lock()
            .map_err(|_| ScoutError::Session("url lock poisoned".to_string()))?
            .clone())
    }

    async fn goto(&self, url: &str) -> Result<(), ScoutError> {
        *self
            .state
            .url
            .lock()
            .map_err(|_| ScoutError::Session("url lock poisoned".to_string()))? =
            url.to_string();
        Ok(())
    }

    async fn close(&self) -> Result<(), ScoutError> {
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct StaticElement {
    root: Arc<StaticNode>,
    state: Arc<RunState>,
    path: Vec<usize>,
}

impl StaticElement {
    fn node(&self) -> Result<&StaticNode, ScoutError> {
        node_at(&self.root, &self.path)
            .ok_or_else(|| ScoutError::ElementNotFound("element path no longer valid".to_string()))
    }
}

#[async_trait]
impl DomElementImpl for StaticElement {
    async fn attribute(&self, name: &str) -> Result<Option<String>, ScoutError> {
        Ok(self.node()?.attrs.get(&name.to_ascii_lowercase()).cloned())
    }

    async fn text(&self) -> Result<String, ScoutError> {
        Ok(self.node()?.text_content())
    }

    async fn click(&self) -> Result<(), ScoutError> {
        self.node()?;
        self.state.clicks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<DomElement>, ScoutError> {
        let dom = StaticDom {
            root: self.root.clone(),
            state: self.state.clone(),
        };
        let hits = dom.search(selector, &self.path)?;
        Ok(hits.into_iter().map(|path| dom.element(path)).collect())
    }
}

fn node_at<'a>(root: &'a StaticNode, path: &[usize]) -> Option<&'a StaticNode> {
    let mut node = root;
    for &index in path {
        node = node.children.get(index)?;
    }
    Some(node)
}

/// Paths of every strict descendant of `scope`, in document order.
fn descendant_paths(root: &StaticNode, scope: &[usize]) -> Vec<Vec<usize>> {
    let Some(scope_node) = node_at(root, scope) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut stack: Vec<(Vec<usize>, &StaticNode)> = scope_node
        .children
        .iter()
        .enumerate()
        .rev()
        .map(|(i, child)| {
            let mut path = scope.to_vec();
            path.push(i);
            (path, child)
        })
        .collect();
    while let Some((path, node)) = stack.pop() {
        out.push(path.clone());
        for (i, child) in node.children.iter().enumerate().rev() {
            let mut child_path = path.clone();
            child_path.push(i);
            stack.push((child_path, child));
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    StartsWith,
    EndsWith,
    Contains,
    Present,
}

#[derive(Debug, Clone)]
struct AttrTest {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrTest {
    fn matches(&self, node: &StaticNode) -> bool {
        match node.attrs.get(&self.name) {
            None => false,
            Some(actual) => match self.op {
                AttrOp::Present => true,
                AttrOp::Equals => actual == &self.value,
                AttrOp::StartsWith => actual.starts_with(&self.value),
                AttrOp::EndsWith => actual.ends_with(&self.value),
                AttrOp::Contains => actual.contains(&self.value),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn matches(&self, node: &StaticNode) -> bool {
        if let Some(tag) = &self.tag {
            if tag != &node.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attrs.get("id") != Some(id) {
                return false;
            }
        }
        self.attrs.iter().all(|test| test.matches(node))
    }
}

/// Parse a child-combinator chain of compound simple selectors.
fn parse_css(css: &str) -> Result<Vec<Compound>, String> {
    let css = css.trim();
    if css.is_empty() {
        return Err("empty CSS selector".to_string());
    }
    css.split('>')
        .map(|part| parse_compound(part.trim()))
        .collect()
}

fn parse_compound(part: &str) -> Result<Compound, String> {
    if part.is_empty() {
        return Err("empty selector component".to_string());
    }

    let mut compound = Compound::default();
    let mut rest = part;

    // Leading tag name or universal selector
    if let Some(end) = rest.find(['#', '[']) {
        let tag = &rest[..end];
        if !tag.is_empty() && tag != "*" {
            if !valid_tag(tag) {
                return Err(format!("unsupported selector syntax in {part:?}"));
            }
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[end..];
    } else {
        if rest != "*" {
            if !valid_tag(rest) {
                return Err(format!("unsupported selector syntax in {part:?}"));
            }
            compound.tag = Some(rest.to_ascii_lowercase());
        }
        return Ok(compound);
    }

    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('#') {
            let end = stripped.find(['#', '[']).unwrap_or(stripped.len());
            if end == 0 {
                return Err(format!("empty id in {part:?}"));
            }
            compound.id = Some(stripped[..end].to_string());
            rest = &stripped[end..];
        } else if let Some(stripped) = rest.strip_prefix('[') {
            let end = stripped
                .find(']')
                .ok_or_else(|| format!("unterminated attribute test in {part:?}"))?;
            compound.attrs.push(parse_attr_test(&stripped[..end])?);
            rest = &stripped[end + 1..];
        } else {
            return Err(format!("unsupported token at {rest:?} in {part:?}"));
        }
    }
    Ok(compound)
}

fn valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_attr_test(body: &str) -> Result<AttrTest, String> {
    let body = body.trim();
    let (name_part, op, value_part) = if let Some((n, v)) = body.split_once("^=") {
        (n, AttrOp::StartsWith, Some(v))
    } else if let Some((n, v)) = body.split_once("$=") {
        (n, AttrOp::EndsWith, Some(v))
    } else if let Some((n, v)) = body.split_once("*=") {
        (n, AttrOp::Contains, Some(v))
    } else if let Some((n, v)) = body.split_once('=') {
        (n, AttrOp::Equals, Some(v))
    } else {
        (body, AttrOp::Present, None)
    };

    let name = name_part.trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err(format!("empty attribute name in [{body}]"));
    }
    let value = match value_part {
        Some(v) => unquote(v.trim()).to_string(),
        None => String::new(),
    };
    Ok(AttrTest { name, op, value })
}

fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0]
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

#[derive(Debug)]
struct XPathStep {
    tag: String,
    index: usize,
}

/// Parse an absolute, indexed XPath like `/html/body/div[4]/div[2]`.
fn parse_xpath(xpath: &str) -> Result<Vec<XPathStep>, String> {
    let rest = xpath
        .trim()
        .strip_prefix('/')
        .ok_or_else(|| format!("only absolute XPath is supported: {xpath:?}"))?;
    if rest.starts_with('/') {
        return Err(format!("descendant axis is not supported: {xpath:?}"));
    }
    rest.split('/')
        .map(|step| {
            let step = step.trim();
            if step.is_empty() {
                return Err(format!("empty step in {xpath:?}"));
            }
            match step.split_once('[') {
                None => Ok(XPathStep {
                    tag: step.to_ascii_lowercase(),
                    index: 1,
                }),
                Some((tag, index_part)) => {
                    let index_str = index_part
                        .strip_suffix(']')
                        .ok_or_else(|| format!("unterminated index in {xpath:?}"))?;
                    let index: usize = index_str
                        .trim()
                        .parse()
                        .map_err(|_| format!("non-numeric index in {xpath:?}"))?;
                    if index == 0 {
                        return Err(format!("XPath indexes are 1-based: {xpath:?}"));
                    }
                    Ok(XPathStep {
                        tag: tag.to_ascii_lowercase(),
                        index,
                    })
                }
            }
        })
        .collect()
}
