//! HTML rendering for streamed search pages.
//!
//! Responsibilities:
//! - Turn jobs, statuses and event batches into HTML fragments.
//! - Produce the complete page used when nothing was streamed.
//!
//! Does NOT handle:
//! - Writing to the client (see [`super::streamer`]).
//!
//! Invariants:
//! - Every renderer method is pure.
//! - All remote text (query, raw events, messages) is escaped.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::time::Duration;

use hyper::StatusCode;
use splunkblaze_client::{EventBatch, JobStatus, SearchJob};

use super::poll::StopReason;
use super::streamer::FinalView;

const STYLE: &str = include_str!("templates/style.css");
const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// Page fragments written by the response streamer.
///
/// The streamed page is `header`, any number of `events`, an optional
/// `notice`, then `footer`. `full_page` renders the same page in one piece.
pub trait Render: Send + Sync {
    /// Search form, carrying `xsrf_token` in a hidden field.
    fn index_page(&self, xsrf_token: &str) -> String;

    /// Opening of the results page, written once events exist.
    fn header(&self, job: &SearchJob, status: &JobStatus) -> String;

    /// One batch of events, in offset order.
    fn events(&self, batch: &EventBatch) -> String;

    /// Closing message explaining why the stream stopped, if it needs one.
    fn notice(&self, view: &FinalView) -> Option<String>;

    /// Closing of the results page.
    fn footer(&self) -> String;

    /// The complete page, for responses that never streamed a header.
    fn full_page(&self, view: &FinalView) -> String;

    /// Error page for requests rejected before streaming.
    fn error_page(&self, status: StatusCode, message: &str) -> String;
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn format_wait(max_wait: Option<Duration>) -> String {
    match max_wait {
        Some(d) if d.subsec_millis() == 0 => format!("{}s", d.as_secs()),
        Some(d) => format!("{:.1}s", d.as_secs_f64()),
        None => "an unlimited wait".to_string(),
    }
}

/// Default renderer producing a self-contained HTML page.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn page_open(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n",
            escape_html(title),
            STYLE
        )
    }

    fn job_meta(&self, job: &SearchJob) -> String {
        format!(
            "<h1>Search results</h1>\n<div class=\"meta\"><span class=\"query\">{}</span> &middot; job <code>{}</code> &middot; dispatched {}</div>\n",
            escape_html(&job.query),
            escape_html(&job.sid),
            job.dispatched_at.format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }

    fn summary(&self, status: &JobStatus) -> String {
        format!(
            "<div class=\"summary\">{} event{} in {:.2}s</div>\n",
            status.event_count,
            if status.event_count == 1 { "" } else { "s" },
            status.run_duration,
        )
    }

    fn stop_message(&self, view: &FinalView) -> Option<(&'static str, String)> {
        let wait = format_wait(view.max_wait);
        let message = match &view.reason {
            StopReason::Completed | StopReason::ClientGone => return None,
            StopReason::Failed(message) => ("notice error", format!("Search failed: {message}")),
            StopReason::TimedOut if view.events_flushed == 0 => (
                "notice",
                format!("No events after {wait}. The search is still running."),
            ),
            StopReason::TimedOut => (
                "notice",
                format!(
                    "Stopped waiting after {wait}. Showing the first {} events.",
                    view.events_flushed
                ),
            ),
            StopReason::PartialOnStop => match &view.status {
                Some(status) if status.is_done => (
                    "notice",
                    format!(
                        "Showing the first {} of {} events. Stopped streaming after {wait}.",
                        view.events_flushed, status.event_count
                    ),
                ),
                _ => (
                    "notice",
                    format!(
                        "Showing the first {} events. The search was paused after {wait}.",
                        view.events_flushed
                    ),
                ),
            },
        };
        Some(message)
    }
}

impl Render for HtmlRenderer {
    fn index_page(&self, xsrf_token: &str) -> String {
        INDEX_TEMPLATE
            .replace("{STYLE}", STYLE)
            .replace("{XSRF}", &escape_html(xsrf_token))
    }

    fn header(&self, job: &SearchJob, _status: &JobStatus) -> String {
        let mut out = self.page_open("splunkblaze: search results");
        out.push_str(&self.job_meta(job));
        out.push_str("<div class=\"events\">\n");
        out
    }

    fn events(&self, batch: &EventBatch) -> String {
        let mut out = String::new();
        for (i, event) in batch.events.iter().enumerate() {
            let _ = write!(
                out,
                "<div class=\"event\" data-offset=\"{}\">",
                batch.start + i
            );
            let origin: Vec<Cow<'_, str>> = [
                event.time.as_deref(),
                event.field("host"),
                event.field("sourcetype"),
            ]
            .into_iter()
            .flatten()
            .map(escape_html)
            .collect();
            if !origin.is_empty() {
                let _ = write!(out, "<div class=\"time\">{}</div>", origin.join(" &middot; "));
            }
            let _ = writeln!(out, "<pre>{}</pre></div>", escape_html(&event.raw));
        }
        out
    }

    fn notice(&self, view: &FinalView) -> Option<String> {
        let mut out = String::new();
        if let Some(status) = &view.status {
            for warning in status.warnings() {
                let _ = writeln!(
                    out,
                    "<div class=\"notice\">Search warning: {}</div>",
                    escape_html(warning)
                );
            }
        }
        if let Some((class, text)) = self.stop_message(view) {
            let _ = writeln!(out, "<div class=\"{}\">{}</div>", class, escape_html(&text));
        }
        (!out.is_empty()).then_some(out)
    }

    fn footer(&self) -> String {
        "</div>\n</body>\n</html>\n".to_string()
    }

    fn full_page(&self, view: &FinalView) -> String {
        let mut out = self.page_open("splunkblaze: search results");
        out.push_str(&self.job_meta(&view.job));
        out.push_str("<div class=\"events\">\n");
        out.push_str(&self.events(&view.events));
        if let Some(status) = &view.status
            && matches!(view.reason, StopReason::Completed)
        {
            out.push_str(&self.summary(status));
        }
        if let Some(notice) = self.notice(view) {
            out.push_str(&notice);
        }
        out.push_str(&self.footer());
        out
    }

    fn error_page(&self, status: StatusCode, message: &str) -> String {
        let title = format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Error")
        );
        let mut out = self.page_open(&title);
        let _ = write!(
            out,
            "<h1>{}</h1>\n<div class=\"notice error\">{}</div>\n<p><a href=\"/\">New search</a></p>\n</body>\n</html>\n",
            escape_html(&title),
            escape_html(message)
        );
        out
    }
}
