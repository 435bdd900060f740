// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsed representation of a `pg_service.conf` document.
//!
//! The file is INI-style: a `[name]` header per service followed by
//! `key=value` lines. Blank lines and comments (`#` or `;`) are kept verbatim,
//! so a document that is parsed and rendered without edits reproduces the
//! original text exactly. Edits only ever touch the lines of the section they
//! target.
//!
//! Comment lines directly above a header, with no blank line in between, are
//! attached to that section and move with it when it is deleted.
//!
//! Every line keeps its own terminator. Lines the document creates use the
//! file's predominant line ending.

use crate::domain::{Result, ServiceEntry, ServiceError, ServiceName, ServiceParams};
use std::fmt;
use std::str::FromStr;

/// Line terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Returns the terminator as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// One line of text without its terminator.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RawLine {
    text: String,
    eol: LineEnding,
}

impl RawLine {
    fn new(text: impl Into<String>, eol: LineEnding) -> Self {
        Self {
            text: text.into(),
            eol,
        }
    }

    /// Splits a physical line into its text and terminator. An unterminated
    /// final line gets `fallback`.
    fn split(piece: &str, fallback: LineEnding) -> Self {
        if let Some(text) = piece.strip_suffix("\r\n") {
            RawLine::new(text, LineEnding::CrLf)
        } else if let Some(text) = piece.strip_suffix('\n') {
            RawLine::new(text, LineEnding::Lf)
        } else {
            RawLine::new(piece, fallback)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Line {
    /// Blank or comment line, kept as written.
    Raw(RawLine),
    Param {
        key: String,
        value: String,
        raw: RawLine,
    },
}

impl Line {
    fn param(key: &str, value: &str, eol: LineEnding) -> Self {
        Line::Param {
            key: key.to_string(),
            value: value.to_string(),
            raw: RawLine::new(format!("{}={}", key, value), eol),
        }
    }

    fn raw(&self) -> &RawLine {
        match self {
            Line::Raw(raw) | Line::Param { raw, .. } => raw,
        }
    }

    fn text(&self) -> &str {
        &self.raw().text
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Section {
    /// Attached comments, or the blank separator of an appended section.
    leading: Vec<RawLine>,
    name: ServiceName,
    header: RawLine,
    lines: Vec<Line>,
}

impl Section {
    fn has_key(&self, key: &str) -> bool {
        self.lines
            .iter()
            .any(|line| matches!(line, Line::Param { key: k, .. } if k == key))
    }

    fn params(&self) -> ServiceParams {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Line::Param { key, value, .. } => Some((key.as_str(), value.as_str())),
                Line::Raw(_) => None,
            })
            .collect()
    }

    fn last_text(&self) -> &str {
        self.lines
            .last()
            .map_or(self.header.text.as_str(), Line::text)
    }

    fn raw_lines(&self) -> impl Iterator<Item = &RawLine> {
        self.leading
            .iter()
            .chain(std::iter::once(&self.header))
            .chain(self.lines.iter().map(Line::raw))
    }

    /// Rewrites the parameter lines so they match `params`. New lines end
    /// with `eol`.
    fn replace_params(&mut self, params: &ServiceParams, eol: LineEnding) {
        let existing: Vec<String> = self
            .lines
            .iter()
            .filter_map(|line| match line {
                Line::Param { key, .. } => Some(key.clone()),
                Line::Raw(_) => None,
            })
            .collect();

        let mut lines = Vec::with_capacity(self.lines.len() + params.len());
        let mut insert_at = 0;
        for line in self.lines.drain(..) {
            match line {
                Line::Param { key, value, raw } => {
                    // keys missing from the new mapping are dropped
                    if let Some(new_value) = params.get(&key) {
                        let raw = if new_value == value {
                            raw
                        } else {
                            RawLine::new(rewrite_value(&raw.text, &key, new_value), raw.eol)
                        };
                        lines.push(Line::Param {
                            key,
                            value: new_value.to_string(),
                            raw,
                        });
                        insert_at = lines.len();
                    }
                }
                raw => lines.push(raw),
            }
        }

        let additions: Vec<Line> = params
            .iter()
            .filter(|(key, _)| !existing.iter().any(|k| k == key))
            .map(|(key, value)| Line::param(key, value, eol))
            .collect();
        let tail = lines.split_off(insert_at);
        lines.extend(additions);
        lines.extend(tail);

        self.lines = lines;
    }
}

/// Replaces the value part of a `key = value` line, keeping what precedes it.
fn rewrite_value(raw: &str, key: &str, value: &str) -> String {
    match raw.find('=') {
        Some(eq) => {
            let after = &raw[eq + 1..];
            let gap = after.len() - after.trim_start().len();
            format!("{}{}", &raw[..eq + 1 + gap], value)
        }
        None => format!("{}={}", key, value),
    }
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with('#') || trimmed.starts_with(';')
}

/// Number of comment lines at the end of `lines` with nothing else after them.
fn attached_len<'a>(lines: impl DoubleEndedIterator<Item = &'a RawLine>) -> usize {
    lines
        .rev()
        .take_while(|line| is_comment(line.text.trim()))
        .count()
}

/// The ending used by most terminated lines; ties go to `\n`.
fn predominant_ending(content: &str) -> LineEnding {
    let total = content.matches('\n').count();
    let crlf = content.matches("\r\n").count();
    if crlf * 2 > total {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    }
}

/// A parsed service file.
///
/// # Examples
///
/// ```
/// use pgservice::domain::{ServiceFile, ServiceParams};
///
/// let mut file: ServiceFile = "# shared\n[prod]\nhost=db1\nport=5432\n".parse().unwrap();
/// assert_eq!(file.names().map(|n| n.as_str()).collect::<Vec<_>>(), vec!["prod"]);
///
/// let params: ServiceParams = [("host", "db2"), ("port", "5432")].into_iter().collect();
/// file.replace("prod", &params).unwrap();
/// assert_eq!(file.to_string(), "# shared\n[prod]\nhost=db2\nport=5432\n");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceFile {
    preamble: Vec<RawLine>,
    sections: Vec<Section>,
    line_ending: LineEnding,
    trailing_newline: bool,
}

impl ServiceFile {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self {
            preamble: Vec::new(),
            sections: Vec::new(),
            line_ending: LineEnding::Lf,
            trailing_newline: true,
        }
    }

    /// Parses the text of a service file.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ParseError` with the 1-based line number for an
    /// unterminated or invalid header, a repeated service name, a parameter
    /// before the first header, a line without `=`, an empty key, or a key
    /// repeated within one section.
    pub fn parse(content: &str) -> Result<Self> {
        let line_ending = predominant_ending(content);
        let trailing_newline = content.is_empty() || content.ends_with('\n');

        let mut preamble: Vec<RawLine> = Vec::new();
        let mut sections: Vec<Section> = Vec::new();

        for (index, piece) in content.split_inclusive('\n').enumerate() {
            let line_no = index + 1;
            let raw = RawLine::split(piece, line_ending);
            let trimmed = raw.text.trim();

            if trimmed.is_empty() || is_comment(trimmed) {
                match sections.last_mut() {
                    Some(section) => section.lines.push(Line::Raw(raw)),
                    None => preamble.push(raw),
                }
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let inner = rest
                    .strip_suffix(']')
                    .ok_or_else(|| ServiceError::parse(line_no, "unterminated section header"))?;
                let name = ServiceName::new(inner)
                    .map_err(|e| ServiceError::parse(line_no, e.to_string()))?;
                if sections.iter().any(|s| s.name == name) {
                    return Err(ServiceError::parse(
                        line_no,
                        format!("duplicate service '{}'", name),
                    ));
                }

                let leading = match sections.last_mut() {
                    Some(previous) => {
                        let count = attached_len(previous.lines.iter().map(Line::raw));
                        let start = previous.lines.len() - count;
                        previous
                            .lines
                            .split_off(start)
                            .iter()
                            .map(|line| line.raw().clone())
                            .collect()
                    }
                    None => {
                        let count = attached_len(preamble.iter());
                        let start = preamble.len() - count;
                        preamble.split_off(start)
                    }
                };

                sections.push(Section {
                    leading,
                    name,
                    header: raw,
                    lines: Vec::new(),
                });
                continue;
            }

            let section = sections.last_mut().ok_or_else(|| {
                ServiceError::parse(line_no, "parameter outside of any service section")
            })?;
            let (key, value) = trimmed
                .split_once('=')
                .ok_or_else(|| ServiceError::parse(line_no, "expected key=value"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ServiceError::parse(line_no, "empty parameter key"));
            }
            if section.has_key(key) {
                return Err(ServiceError::parse(
                    line_no,
                    format!("duplicate parameter '{}' in service '{}'", key, section.name),
                ));
            }
            section.lines.push(Line::Param {
                key: key.to_string(),
                value: value.trim().to_string(),
                raw: raw.clone(),
            });
        }

        tracing::debug!(
            "Parsed service file with {} services ({} leading lines)",
            sections.len(),
            preamble.len()
        );

        Ok(Self {
            preamble,
            sections,
            line_ending,
            trailing_newline,
        })
    }

    /// Renders the document back to text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut last_eol = "";
        let lines = self
            .preamble
            .iter()
            .chain(self.sections.iter().flat_map(Section::raw_lines));
        for line in lines {
            last_eol = line.eol.as_str();
            out.push_str(&line.text);
            out.push_str(last_eol);
        }

        if !self.trailing_newline {
            out.truncate(out.len() - last_eol.len());
        }
        out
    }

    /// The line ending given to lines this document creates: the one most
    /// lines of the parsed text used.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Service names in file order.
    pub fn names(&self) -> impl Iterator<Item = &ServiceName> {
        self.sections.iter().map(|s| &s.name)
    }

    /// Returns `true` if a service named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the parameters of `name`.
    pub fn get(&self, name: &str) -> Option<ServiceParams> {
        self.position(name).map(|i| self.sections[i].params())
    }

    /// All entries in file order.
    pub fn entries(&self) -> Vec<ServiceEntry> {
        self.sections
            .iter()
            .map(|s| ServiceEntry::new(s.name.clone(), s.params()))
            .collect()
    }

    /// Number of services.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns `true` if the file has no services.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Appends a new service at the end of the file.
    ///
    /// A blank line is written before the header unless the document already
    /// ends with one.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::DuplicateName` if the name exists, or
    /// `ServiceError::InvalidParam` if a parameter cannot be written.
    pub fn push(&mut self, name: ServiceName, params: &ServiceParams) -> Result<()> {
        params.validate()?;
        if self.contains(name.as_str()) {
            return Err(ServiceError::DuplicateName {
                name: name.into_string(),
            });
        }

        let eol = self.line_ending;
        let last = match self.sections.last() {
            Some(section) => Some(section.last_text()),
            None => self.preamble.last().map(|line| line.text.as_str()),
        };
        let leading = match last {
            Some(text) if !text.trim().is_empty() => vec![RawLine::new("", eol)],
            _ => Vec::new(),
        };

        self.sections.push(Section {
            leading,
            header: RawLine::new(name.header(), eol),
            name,
            lines: params.iter().map(|(k, v)| Line::param(k, v, eol)).collect(),
        });
        Ok(())
    }

    /// Replaces the parameters of an existing service in place.
    ///
    /// Unchanged parameter lines keep their exact text; only the target
    /// section is modified.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the name is absent, or
    /// `ServiceError::InvalidParam` if a parameter cannot be written.
    pub fn replace(&mut self, name: &str, params: &ServiceParams) -> Result<()> {
        params.validate()?;
        let index = self.position(name).ok_or_else(|| not_found(name))?;
        let eol = self.line_ending;
        self.sections[index].replace_params(params, eol);
        Ok(())
    }

    /// Removes a service, returning its parameters.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the name is absent.
    pub fn remove(&mut self, name: &str) -> Result<ServiceParams> {
        let index = self.position(name).ok_or_else(|| not_found(name))?;
        Ok(self.sections.remove(index).params())
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.sections.iter().position(|s| s.name == name)
    }
}

fn not_found(name: &str) -> ServiceError {
    ServiceError::NotFound {
        name: name.trim().to_string(),
    }
}

impl Default for ServiceFile {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ServiceFile {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        ServiceFile::parse(s)
    }
}

impl fmt::Display for ServiceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
