//! Markup Extractor
//!
//! Literal-text keyed lookups over an HTML DOM. The registry pages have no
//! stable ids for most fields, only label and caption text, so every lookup
//! here is "find the cell/caption containing this literal". Nothing in this
//! module fails on a missing match: absent fields come back as `""`, absent
//! rows as an empty list. Values are trimmed and otherwise left untouched.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

pub(crate) static TD: LazyLock<Selector> = LazyLock::new(|| static_selector("td"));
pub(crate) static TH: LazyLock<Selector> = LazyLock::new(|| static_selector("th"));
pub(crate) static TABLE: LazyLock<Selector> = LazyLock::new(|| static_selector("table"));
pub(crate) static BODY_ROWS: LazyLock<Selector> = LazyLock::new(|| static_selector("tbody tr"));
pub(crate) static ANCHOR: LazyLock<Selector> = LazyLock::new(|| static_selector("a"));
pub(crate) static ACTION_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| static_selector("a[onclick]"));
pub(crate) static LINK_ANCHOR: LazyLock<Selector> = LazyLock::new(|| static_selector("a[href]"));
pub(crate) static IMG: LazyLock<Selector> = LazyLock::new(|| static_selector("img"));
pub(crate) static SPAN: LazyLock<Selector> = LazyLock::new(|| static_selector("span"));
pub(crate) static MAIN_TEXT: LazyLock<Selector> =
    LazyLock::new(|| static_selector("span.maintxt"));
pub(crate) static SMALL_TEXT: LazyLock<Selector> =
    LazyLock::new(|| static_selector("span.smalltxt"));
pub(crate) static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| static_selector("p"));
pub(crate) static DIV: LazyLock<Selector> = LazyLock::new(|| static_selector("div"));
pub(crate) static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| static_selector("li"));

/// Parsed page
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Root element, the scope for page-wide lookups
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn select<'a>(&'a self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.html.select(selector).collect()
    }
}

/// Trimmed text content of an element
pub fn text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match of `selector` under `scope`
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope.select(selector).next().map(text).unwrap_or_default()
}

/// Trimmed text of the last match of `selector` under `scope`
pub fn last_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope.select(selector).last().map(text).unwrap_or_default()
}

/// Concatenated trimmed text of every match of `selector` under `scope`
pub fn all_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .map(|el| el.text().collect::<String>())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Attribute of the first match of `selector` under `scope`, if non-empty
pub fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Text of the first child node (text node or element), trimmed
pub fn first_child_text(el: ElementRef<'_>) -> String {
    let Some(child) = el.first_child() else {
        return String::new();
    };
    match child.value() {
        Node::Text(t) => t.trim().to_string(),
        Node::Element(_) => ElementRef::wrap(child).map(text).unwrap_or_default(),
        _ => String::new(),
    }
}

/// Innermost `td` cells under `scope` whose text contains `needle`, in
/// document order. Layout cells that merely wrap a matching cell are skipped.
pub fn cells_containing<'a>(scope: ElementRef<'a>, needle: &str) -> Vec<ElementRef<'a>> {
    if needle.is_empty() {
        return Vec::new();
    }
    scope
        .select(&TD)
        .filter(|td| td.text().collect::<String>().contains(needle))
        .filter(|td| {
            !td.select(&TD)
                .any(|inner| inner.id() != td.id() && inner.text().collect::<String>().contains(needle))
        })
        .collect()
}

/// Next sibling `td` of the first innermost cell containing `label`
pub fn value_cell<'a>(scope: ElementRef<'a>, label: &str) -> Option<ElementRef<'a>> {
    cells_containing(scope, label).into_iter().find_map(|cell| {
        cell.next_siblings()
            .filter_map(ElementRef::wrap)
            .next()
            .filter(|sibling| sibling.value().name() == "td")
    })
}

/// "Cell whose text contains `label`; text of the next cell", or `""`
pub fn field(scope: ElementRef<'_>, label: &str) -> String {
    value_cell(scope, label).map(text).unwrap_or_default()
}

/// Closest ancestor element with the given tag name
pub fn closest<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == tag)
}

/// Tables whose own `caption` contains `caption`
pub fn tables_with_caption<'a>(scope: ElementRef<'a>, caption: &str) -> Vec<ElementRef<'a>> {
    if caption.is_empty() {
        return Vec::new();
    }
    scope
        .select(&TABLE)
        .filter(|table| {
            table
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| c.value().name() == "caption")
                .any(|c| c.text().collect::<String>().contains(caption))
        })
        .collect()
}

/// Body rows (`tbody tr`) of the tables whose caption contains `caption`
pub fn rows_under_caption<'a>(scope: ElementRef<'a>, caption: &str) -> Vec<Row<'a>> {
    tables_with_caption(scope, caption)
        .into_iter()
        .flat_map(|table| table.select(&BODY_ROWS).map(Row::new).collect::<Vec<_>>())
        .collect()
}

/// Rows matched by an arbitrary row selector
pub fn rows<'a>(scope: ElementRef<'a>, selector: &Selector) -> Vec<Row<'a>> {
    scope.select(selector).map(Row::new).collect()
}

/// First capture group of `pattern` in `haystack`
pub fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Handle to a table row, queryable cell by cell
#[derive(Clone, Copy)]
pub struct Row<'a> {
    el: ElementRef<'a>,
}

impl<'a> Row<'a> {
    pub fn new(el: ElementRef<'a>) -> Self {
        Self { el }
    }

    /// The row's own `td` cells (nested tables excluded)
    pub fn cells(&self) -> Vec<ElementRef<'a>> {
        self.el
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| c.value().name() == "td")
            .collect()
    }

    pub fn cell_text(&self, index: usize) -> String {
        self.cells().get(index).copied().map(text).unwrap_or_default()
    }

    pub fn has_header_cells(&self) -> bool {
        self.el.select(&TH).next().is_some()
    }
}
