// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML text extraction
//!
//! Narrows the document to an optional selector, skips non-visible elements and
//! returns a single whitespace-normalized text blob.

use scraper::{ElementRef, Html, Node};
use tracing::debug;

/// Elements whose contents are never visible text
const STRIPPED_TAGS: [&str; 2] = ["script", "style"];

/// Elements that start a new line of text, so their edges separate words
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Parsed form of a content selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSelector {
    /// `#main`
    Id(String),
    /// `.article`
    Class(String),
    /// `article`
    Tag(String),
}

impl ContentSelector {
    /// Parse a selector string, `None` when it names nothing
    pub fn parse(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            (!id.is_empty()).then(|| Self::Id(id.to_string()))
        } else if let Some(class) = selector.strip_prefix('.') {
            (!class.is_empty()).then(|| Self::Class(class.to_string()))
        } else {
            (!selector.is_empty()).then(|| Self::Tag(selector.to_ascii_lowercase()))
        }
    }

    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let value = element.value();
        match self {
            Self::Id(id) => value.id() == Some(id.as_str()),
            Self::Class(class) => value.classes().any(|c| c == class),
            Self::Tag(tag) => value.name().eq_ignore_ascii_case(tag),
        }
    }
}

/// Where the extracted text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// The selected element
    Selector,
    /// The whole document, no selector given
    Document,
    /// The whole document, selector matched nothing
    SelectorMissed,
    /// Input carried no markup, raw input used as text
    RawText,
}

/// Normalized page text plus its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub source: ExtractionSource,
}

/// Extract normalized text from `markup`, scoped by an optional selector
pub fn extract(markup: &str, selector: Option<&str>) -> Extraction {
    if !markup.contains('<') {
        debug!("Input has no markup, using it as plain text");
        return Extraction {
            text: clean_text(markup),
            source: ExtractionSource::RawText,
        };
    }

    let document = Html::parse_document(markup);
    let root = document.root_element();

    let (scope, source) = match selector.and_then(ContentSelector::parse) {
        Some(parsed) => match find_first(root, &parsed) {
            Some(element) => (element, ExtractionSource::Selector),
            None => (root, ExtractionSource::SelectorMissed),
        },
        None => (root, ExtractionSource::Document),
    };

    let mut raw = String::new();
    collect_visible_text(scope, &mut raw);

    Extraction {
        text: clean_text(&raw),
        source,
    }
}

/// First element in document order matching `selector`
fn find_first<'a>(root: ElementRef<'a>, selector: &ContentSelector) -> Option<ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| selector.matches(element))
}

/// Append the inner text below `element`, skipping stripped subtrees.
///
/// Text nodes are concatenated as-is; a space is only inserted at the edges of
/// block elements.
fn collect_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if is_tag_in(el.name(), &STRIPPED_TAGS) => {}
            Node::Element(el) => {
                let block = is_tag_in(el.name(), BLOCK_TAGS);
                if block {
                    out.push(' ');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_visible_text(child_element, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn is_tag_in(name: &str, tags: &[&str]) -> bool {
    tags.iter().any(|tag| name.eq_ignore_ascii_case(tag))
}

/// Collapse whitespace runs into single spaces and trim
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
