use colored::{ ColoredString, Colorize };
use pulldown_cmark::{ Event, Options, Parser, Tag, TagEnd };
use std::io::{ self, Write };

use crate::models::chat::Role;
use super::session::{ Entry, EntryKind };

/// Output surface for the chat transcript. Assistant replies are trusted
/// formatted text; user input is printed exactly as typed.
pub trait Renderer {
    fn render_formatted(&mut self, speaker: &str, text: &str) -> io::Result<()>;
    fn render_plain(&mut self, speaker: &str, text: &str) -> io::Result<()>;
    fn render_hint(&mut self, text: &str) -> io::Result<()>;

    fn render_entry(&mut self, entry: &Entry) -> io::Result<()> {
        match (entry.message.role, entry.kind) {
            (_, EntryKind::Placeholder) => self.render_hint(&format!("Connor: {}", entry.message.content)),
            (Role::User, _) => self.render_plain("You", &entry.message.content),
            _ => self.render_formatted("Connor", &entry.message.content),
        }
    }
}

pub struct ConsoleRenderer<W: Write> {
    out: W,
    color: bool,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_markdown(&self, text: &str) -> String {
        MarkdownWriter::new(self.color).write(text)
    }
}

/// Flattens CommonMark into terminal text: headings and `**strong**` in bold,
/// bullets as `•`, numbered lists keep their numbers, code blocks indented,
/// link targets shown after the link text.
struct MarkdownWriter {
    out: String,
    color: bool,
    strong: usize,
    emphasis: usize,
    strike: usize,
    heading: bool,
    lists: Vec<Option<u64>>,
    links: Vec<String>,
    code_block: bool,
    first_cell: bool,
}

impl MarkdownWriter {
    fn new(color: bool) -> Self {
        Self {
            out: String::new(),
            color,
            strong: 0,
            emphasis: 0,
            strike: 0,
            heading: false,
            lists: Vec::new(),
            links: Vec::new(),
            code_block: false,
            first_cell: true,
        }
    }

    fn write(mut self, text: &str) -> String {
        let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
        for event in Parser::new_ext(text, options) {
            match event {
                Event::Start(tag) => self.start(tag),
                Event::End(tag) => self.end(tag),
                Event::Text(text) if self.code_block => self.code_lines(&text),
                Event::Text(text) => self.inline(&text),
                Event::Code(code) => {
                    let code = if self.color { code.yellow().to_string() } else { code.to_string() };
                    self.out.push_str(&code);
                }
                Event::Html(html) | Event::InlineHtml(html) => self.out.push_str(&html),
                Event::SoftBreak | Event::HardBreak => self.newline(),
                Event::Rule => {
                    self.newline();
                    self.out.push_str("────────\n\n");
                }
                Event::TaskListMarker(done) => self.out.push_str(if done { "[x] " } else { "[ ] " }),
                _ => {}
            }
        }
        self.out.trim_end().to_string()
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { .. } => {
                self.newline();
                self.heading = true;
            }
            Tag::Strong => self.strong += 1,
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strikethrough => self.strike += 1,
            Tag::List(first) => {
                self.newline();
                self.lists.push(first);
            }
            Tag::Item => {
                self.newline();
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                match self.lists.last_mut() {
                    Some(Some(n)) => {
                        self.out.push_str(&format!("{}. ", n));
                        *n += 1;
                    }
                    _ => self.out.push_str("• "),
                }
            }
            Tag::CodeBlock(_) => {
                self.newline();
                self.code_block = true;
            }
            Tag::Link { dest_url, .. } => self.links.push(dest_url.to_string()),
            Tag::TableHead | Tag::TableRow => self.first_cell = true,
            Tag::TableCell => {
                if !self.first_cell {
                    self.out.push_str(" | ");
                }
                self.first_cell = false;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.heading = false;
                self.out.push_str("\n\n");
            }
            TagEnd::Paragraph => {
                self.out.push_str(if self.lists.is_empty() { "\n\n" } else { "\n" });
            }
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strikethrough => self.strike = self.strike.saturating_sub(1),
            TagEnd::Item => self.newline(),
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.out.push('\n');
                }
            }
            TagEnd::CodeBlock => {
                self.code_block = false;
                self.out.push('\n');
            }
            TagEnd::Link => {
                if let Some(url) = self.links.pop() {
                    if !self.out.ends_with(url.as_str()) {
                        self.out.push_str(&format!(" ({})", url));
                    }
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => self.out.push('\n'),
            TagEnd::Table => self.out.push('\n'),
            _ => {}
        }
    }

    fn inline(&mut self, text: &str) {
        if !self.color {
            self.out.push_str(text);
            return;
        }
        let mut styled = text.normal();
        if self.strong > 0 || self.heading {
            styled = styled.bold();
        }
        if self.emphasis > 0 {
            styled = styled.italic();
        }
        if self.strike > 0 {
            styled = styled.strikethrough();
        }
        if !self.links.is_empty() {
            styled = styled.underline();
        }
        self.out.push_str(&styled.to_string());
    }

    fn code_lines(&mut self, text: &str) {
        for line in text.lines() {
            self.out.push_str("    ");
            let line = if self.color { line.yellow().to_string() } else { line.to_string() };
            self.out.push_str(&line);
            self.out.push('\n');
        }
    }

    fn newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn render_formatted(&mut self, speaker: &str, text: &str) -> io::Result<()> {
        let label = self.paint(speaker, |s| s.green().bold());
        let body = self.format_markdown(text);
        writeln!(self.out, "{}: {}\n", label, body)?;
        self.out.flush()
    }

    fn render_plain(&mut self, speaker: &str, text: &str) -> io::Result<()> {
        let label = self.paint(speaker, |s| s.blue().bold());
        writeln!(self.out, "{}: {}\n", label, text)?;
        self.out.flush()
    }

    fn render_hint(&mut self, text: &str) -> io::Result<()> {
        let hint = self.paint(text, |s| s.dimmed());
        writeln!(self.out, "{}", hint)?;
        self.out.flush()
    }
}
