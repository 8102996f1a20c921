//! Pure rendering: snapshot in, list of DOM updates out.
//!
//! Nothing here touches the browser, so every view's output can be checked
//! in native tests.

use std::collections::HashMap;

use crate::domain::markup::{Element, Markup};
use crate::domain::session::SessionId;
use crate::domain::snapshot::{Balance, BlockHeight, Progress, Snapshot, TxHistoryPage, TxLine};
use crate::domain::view::{EXPLORER_PATH, Target, ViewKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomOp {
    /// Replace the element's content with serialized markup
    InnerHtml(String),
    /// Replace the element's full class list
    ClassName(String),
    /// Set the `value` of an input
    Value(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomUpdate {
    pub target: Target,
    pub op: DomOp,
}

impl DomUpdate {
    pub fn inner_html(target: Target, markup: impl Into<Markup>) -> Self {
        Self { target, op: DomOp::InnerHtml(markup.into().to_html()) }
    }

    pub fn class_name(target: Target, class: impl Into<String>) -> Self {
        Self { target, op: DomOp::ClassName(class.into()) }
    }

    pub fn value(target: Target, value: impl Into<String>) -> Self {
        Self { target, op: DomOp::Value(value.into()) }
    }
}

/// Inputs a render needs besides the snapshot itself.
pub struct RenderContext<'a> {
    pub session: &'a SessionId,
    pub base_url: &'a str,
    /// Appended to form actions so the browser never serves a cached page
    pub cache_buster: &'a str,
    /// Notes keyed by short transaction id
    pub notes: &'a HashMap<String, String>,
}

pub const TX_HISTORY_PAGE: Target = Target::Id("tx_history_page");
pub const TX_HISTORY_PAGE_COUNT: Target = Target::Id("tx_history_page_count");
pub const TX_HISTORY_PAGES: Target = Target::Id("tx_history_pages");
pub const NOTE_INPUT_CLASS: &str = "tx-note";
pub const NOTE_ID_ATTRIBUTE: &str = "data-short-id";

pub fn render(view: ViewKind, snapshot: &Snapshot, ctx: &RenderContext<'_>) -> Vec<DomUpdate> {
    match snapshot {
        Snapshot::Balance(balance) => render_balance(balance),
        Snapshot::BlockHeight(height) => render_block_height(height),
        Snapshot::Progress(progress) => render_progress(view, progress),
        Snapshot::TxHistory(page) => render_tx_history(page, ctx),
    }
}

pub fn render_balance(balance: &Balance) -> Vec<DomUpdate> {
    let whale_label = format!("Whale Size: {}", balance.whale_size);
    vec![
        DomUpdate::inner_html(Target::Class("confirmed"), balance.confirmed.as_str()),
        DomUpdate::inner_html(Target::Class("unconfirmed"), balance.unconfirmed.as_str()),
        DomUpdate::inner_html(Target::Class("spf_funds"), balance.fund_a.as_str()),
        DomUpdate::inner_html(Target::Class("spf_b_funds"), balance.fund_b.as_str()),
        DomUpdate::inner_html(Target::Id("whale_size"), whale_label.as_str()),
        DomUpdate::value(Target::Id("whale_size_button"), whale_label),
    ]
}

pub fn render_block_height(height: &BlockHeight) -> Vec<DomUpdate> {
    vec![
        DomUpdate::inner_html(Target::Class("block_height"), height.height.as_str()),
        DomUpdate::inner_html(Target::Class("status"), height.status.as_str()),
        DomUpdate::class_name(Target::Class("status"), format!("status {}", height.color)),
    ]
}

pub fn render_progress(view: ViewKind, progress: &Progress) -> Vec<DomUpdate> {
    vec![DomUpdate::inner_html(view.anchor(), progress.percentage.as_str())]
}

pub fn render_tx_history(page: &TxHistoryPage, ctx: &RenderContext<'_>) -> Vec<DomUpdate> {
    vec![
        DomUpdate::inner_html(TX_HISTORY_PAGE, tx_history_markup(page, ctx)),
        DomUpdate::inner_html(TX_HISTORY_PAGE_COUNT, page.total.to_string()),
        DomUpdate::inner_html(TX_HISTORY_PAGES, page_options(page)),
    ]
}

const HEADER_CELL: &str = "col-5 center no-wrap";
const ROW_CELL: &str = "col-5 center no-wrap white-underline pad-col";

pub fn tx_history_markup(page: &TxHistoryPage, ctx: &RenderContext<'_>) -> Markup {
    let header = Element::new("ul")
        .class("row")
        .child(Element::new("h3").class(HEADER_CELL).text("Transaction ID"))
        .children(
            ["Type", "Amount", "Date", "Confirmed", "Note"]
                .into_iter()
                .map(|title| Element::new("li").class(HEADER_CELL).text(title)),
        );
    let rows = page.lines.iter().map(|line| tx_row(line, ctx));
    Markup::fragment(std::iter::once(Markup::from(header)).chain(rows.map(Markup::from)))
}

fn tx_row(line: &TxLine, ctx: &RenderContext<'_>) -> Element {
    let action = format!("{}{}?{}", ctx.base_url, EXPLORER_PATH, ctx.cache_buster);
    let details = Element::new("form")
        .class("inline-block input-wide")
        .attr("action", action)
        .attr("method", "post")
        .child(hidden_input("session_id", ctx.session.value()))
        .child(hidden_input("transaction_id", &line.transaction_id))
        .child(
            Element::new("input")
                .class("txid-button")
                .attr("type", "submit")
                .attr("value", line.short_transaction_id.as_str()),
        );
    let note = ctx.notes.get(&line.short_transaction_id).map(String::as_str).unwrap_or("");

    Element::new("ul")
        .class("row")
        .attr("data-transaction-id", line.transaction_id.as_str())
        .child(
            Element::new("h3")
                .class("col-5 center no-wrap monospace white-underline pad-col")
                .child(details),
        )
        .child(Element::new("li").class(ROW_CELL).text(line.kind.as_str()))
        .child(Element::new("li").class(ROW_CELL).text(line.amount.as_str()))
        .child(Element::new("li").class(ROW_CELL).text(line.time.as_str()))
        .child(Element::new("li").class(ROW_CELL).text(line.confirmed.as_str()))
        .child(
            Element::new("li").class(ROW_CELL).child(
                Element::new("input")
                    .class(NOTE_INPUT_CLASS)
                    .attr("type", "text")
                    .attr(NOTE_ID_ATTRIBUTE, line.short_transaction_id.as_str())
                    .attr("value", note)
                    .attr("placeholder", "Note"),
            ),
        )
}

fn hidden_input(name: &str, value: &str) -> Element {
    Element::new("input").attr("type", "hidden").attr("name", name.to_string()).attr("value", value)
}

/// One `<option>` per page, `1..=total`, with the current page selected.
pub fn page_options(page: &TxHistoryPage) -> Markup {
    Markup::fragment((1..=page.total).map(|number| {
        Markup::from(
            Element::new("option")
                .flag("selected", number == page.current)
                .attr("value", number.to_string())
                .text(number.to_string()),
        )
    }))
}

/// Content shown once the server acknowledged a shutdown.
pub fn shutdown_notice(base_url: &str) -> Markup {
    let logo = Element::new("img")
        .class("scprime-logo")
        .attr("alt", "ScPrime Web Wallet")
        .attr("src", format!("{base_url}/gui/logo.png"));
    let header = Element::new("div")
        .class("col-5 left top no-wrap")
        .child(Element::new("div").child(logo));
    let popup = Element::new("div")
        .id("popup")
        .class("popup center")
        .child(Element::new("h2").class("uppercase").text("Shutdown Notice"))
        .child(
            Element::new("div")
                .class("middle pad blue-dashed")
                .id("popup_content")
                .text("Wallet was shutdown. You can now close your browser."),
        );
    let fade = Element::new("div").id("fade").class("fade");
    Markup::fragment([Markup::from(header), Markup::from(popup), Markup::from(fade)])
}

/// Upload progress while bytes are in flight; never reports completion.
pub fn upload_progress_percent(loaded: f64, total: f64) -> u8 {
    if !(total > 0.0) || !loaded.is_finite() {
        return 0;
    }
    let percent = (loaded / total * 100.0).round().clamp(0.0, 99.0);
    percent as u8
}

pub fn upload_status_text(percent: u8) -> String {
    format!("Uploading Consensus ({percent}%)")
}
