//! Writing lookup outcomes into a display region.
//!
//! Every render operation clears the region first and then appends a fixed
//! sequence of [`Node`]s, so repeating a call leaves the region unchanged.
//! A [`Region`] can be turned into HTML with [`Region::to_html`] or printed
//! as plain text through its `Display` impl.

use std::fmt::{self, Write as _};

use chrono::{Local, TimeZone};

use crate::{Config, LookupError, WeatherRecord};

pub const NOT_FOUND_MESSAGE: &str = "Location not found";
pub const REQUEST_FAILED_MESSAGE: &str = "Unable to fetch weather";
pub const MAP_LINK_TEXT: &str = "Click to view map";

/// A single piece of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading(String),
    /// `new_context` asks the host to open the link in a new window or tab.
    Link { href: String, text: String, new_context: bool },
    Image { src: String },
    /// `capitalize` is a display hint: each word is shown with a leading capital.
    Paragraph { text: String, capitalize: bool },
    LineBreak,
}

impl Node {
    fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into(), capitalize: false }
    }
}

/// The container rendered output is written into.
pub trait DisplayRegion {
    /// Remove all existing content.
    fn clear(&mut self);

    fn append(&mut self, node: Node);

    fn nodes(&self) -> &[Node];
}

/// In-memory display region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    nodes: Vec<Node>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize the region's content as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            // Writing into a String cannot fail.
            let _ = match node {
                Node::Heading(text) => writeln!(out, "<h2>{}</h2>", escape_html(text)),
                Node::Link { href, text, new_context } => {
                    let target =
                        if *new_context { r#" target="_blank" rel="noopener""# } else { "" };
                    writeln!(out, r#"<a href="{}"{}>{}</a>"#, escape_html(href), target, escape_html(text))
                }
                Node::Image { src } => writeln!(out, r#"<img src="{}" alt="">"#, escape_html(src)),
                Node::Paragraph { text, capitalize: true } => writeln!(
                    out,
                    r#"<p style="text-transform: capitalize">{}</p>"#,
                    escape_html(text)
                ),
                Node::Paragraph { text, capitalize: false } => {
                    writeln!(out, "<p>{}</p>", escape_html(text))
                }
                Node::LineBreak => writeln!(out, "<br>"),
            };
        }
        out
    }
}

impl DisplayRegion for Region {
    fn clear(&mut self) {
        self.nodes.clear();
    }

    fn append(&mut self, node: Node) {
        self.nodes.push(node);
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// Plain-text rendering for terminals.
impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match node {
                Node::Heading(text) => writeln!(f, "{text}")?,
                Node::Link { href, text, .. } => writeln!(f, "{text} <{href}>")?,
                Node::Image { src } => writeln!(f, "[icon: {src}]")?,
                Node::Paragraph { text, capitalize: true } => {
                    writeln!(f, "{}", capitalize_words(text))?
                }
                Node::Paragraph { text, capitalize: false } => writeln!(f, "{text}")?,
                Node::LineBreak => writeln!(f)?,
            }
        }
        Ok(())
    }
}

/// Turns lookup outcomes into region content.
#[derive(Debug, Clone)]
pub struct Renderer {
    map_base_url: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Renderer {
    pub fn new(config: &Config) -> Self {
        Self { map_base_url: config.map_base_url.clone() }
    }

    /// Render `record` with its timestamp shown in the local time zone.
    pub fn render_success<R>(&self, region: &mut R, record: &WeatherRecord)
    where
        R: DisplayRegion + ?Sized,
    {
        self.render_success_in(region, record, &Local);
    }

    pub fn render_success_in<R, Tz>(&self, region: &mut R, record: &WeatherRecord, tz: &Tz)
    where
        R: DisplayRegion + ?Sized,
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        region.clear();

        region.append(Node::Heading(record.place.clone()));
        region.append(Node::Link {
            href: format!("{}{}", self.map_base_url, record.coordinates),
            text: MAP_LINK_TEXT.to_string(),
            new_context: true,
        });
        region.append(Node::Image { src: record.icon_url.clone() });
        region.append(Node::Paragraph { text: record.description.clone(), capitalize: true });
        region.append(Node::LineBreak);
        region.append(Node::paragraph(format!(
            "Current: {}° F",
            display_temp(record.current_temp)
        )));
        region.append(Node::paragraph(format!(
            "Feels like: {}° F",
            display_temp(record.feels_like_temp)
        )));
        region.append(Node::LineBreak);
        region.append(Node::paragraph(format!(
            "Last updated: {}",
            format_time_of_day(&record.observed_at.with_timezone(tz))
        )));
    }

    pub fn render_not_found<R>(&self, region: &mut R)
    where
        R: DisplayRegion + ?Sized,
    {
        region.clear();
        region.append(Node::Heading(NOT_FOUND_MESSAGE.to_string()));
    }

    /// Shown for transport and parse failures, distinct from "not found".
    pub fn render_request_failed<R>(&self, region: &mut R, error: &LookupError)
    where
        R: DisplayRegion + ?Sized,
    {
        region.clear();
        region.append(Node::Heading(REQUEST_FAILED_MESSAGE.to_string()));
        region.append(Node::paragraph(error.to_string()));
    }
}

/// Folds `-0.0` into `0.0` so it doesn't print as `-0`.
fn display_temp(temp: f64) -> f64 {
    temp + 0.0
}

/// `h:mm AM/PM`, hour without a leading zero.
pub fn format_time_of_day<Tz>(time: &chrono::DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    time.format("%-I:%M %p").to_string()
}

/// Upper-case the first letter of every whitespace-separated word.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
