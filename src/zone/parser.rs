use super::{LineError, RecordFilter, ZoneRecord};
use crate::error::{Result, ZoneScanError};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Directive state carried from one line to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserState {
    /// Origin used to expand relative names
    pub current_origin: Option<String>,
    /// TTL inherited by records that do not carry one
    pub current_ttl: Option<String>,
    /// Zone apex: last `$ORIGIN`, or the owner of the first SOA if no `$ORIGIN` preceded it
    pub zone_origin: Option<String>,
    /// Set by the first SOA record and never cleared
    pub first_soa_seen: bool,
}

/// Field layout of a record line, decided from its first two tokens.
///
/// The rules are tried in declaration order and the first match wins. A
/// purely numeric owner name is indistinguishable from a leading TTL and is
/// always read as one of the anchored forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayout {
    /// `<@|digits> <class> <type> <data...>`
    AnchoredInheritedTtl,
    /// `<@|digits> <ttl> <class> <type> <data...>`
    AnchoredExplicitTtl,
    /// `<name> <digits> <class> <type> <data...>`
    NamedExplicitTtl,
    /// `<name> <class> <type> <data...>`
    NamedInheritedTtl,
}

impl RecordLayout {
    /// Every layout needs at least this many tokens
    pub const MIN_TOKENS: usize = 4;

    pub fn classify(tokens: &[&str]) -> Self {
        let owner = tokens.first().copied().unwrap_or_default();
        let second = tokens.get(1).copied().unwrap_or_default();

        if owner == "@" || is_digits(owner) {
            if is_alphabetic(second) {
                Self::AnchoredInheritedTtl
            } else {
                Self::AnchoredExplicitTtl
            }
        } else if is_digits(second) {
            Self::NamedExplicitTtl
        } else {
            Self::NamedInheritedTtl
        }
    }

    /// Index of the TTL token, `None` when the TTL is inherited
    pub fn ttl_index(self) -> Option<usize> {
        match self {
            Self::AnchoredExplicitTtl | Self::NamedExplicitTtl => Some(1),
            Self::AnchoredInheritedTtl | Self::NamedInheritedTtl => None,
        }
    }

    /// Index of the class token; type follows it, data follows the type
    pub fn class_index(self) -> usize {
        match self.ttl_index() {
            Some(_) => 2,
            None => 1,
        }
    }
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn is_alphabetic(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

/// What a single input line turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line or comment
    Skip,
    /// `$ORIGIN` or `$TTL`, applied to the parser state
    Directive,
    /// A record, not yet filtered
    Record(ZoneRecord),
    /// A line that could not be interpreted
    Invalid(LineError),
}

/// Result of one parse run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    /// Accepted records, in input order
    pub records: Vec<ZoneRecord>,
    /// Blank, comment, malformed and filtered-out lines
    pub skipped_lines: usize,
    /// Resolved zone origin, if any
    pub zone_origin: Option<String>,
}

/// Line-oriented zone file reader.
///
/// Directives and records are handled one line at a time with no lookahead,
/// so relative names that appear before the first `$ORIGIN` stay relative.
#[derive(Debug, Default)]
pub struct ZoneParser {
    state: ParserState,
    filter: RecordFilter,
}

impl ZoneParser {
    /// Create a parser that keeps every record
    pub fn new() -> Self {
        Self::with_filter(RecordFilter::allow_all())
    }

    /// Create a parser that only keeps records accepted by `filter`
    pub fn with_filter(filter: RecordFilter) -> Self {
        Self {
            state: ParserState::default(),
            filter,
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Best-known zone origin so far
    pub fn zone_origin(&self) -> Option<&str> {
        self.state.zone_origin.as_deref()
    }

    /// Parse zone file contents held in memory
    pub fn parse(&mut self, contents: &str) -> ParseOutcome {
        self.state = ParserState::default();
        let mut outcome = ParseOutcome::default();

        for (index, line) in contents.lines().enumerate() {
            self.process_line(index + 1, line, &mut outcome);
        }

        self.finish(outcome)
    }

    /// Parse a zone file from any buffered reader.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily. Only a read error
    /// from the underlying reader stops the run.
    pub fn parse_reader<R: BufRead>(&mut self, mut reader: R) -> Result<ParseOutcome> {
        self.state = ParserState::default();
        let mut outcome = ParseOutcome::default();
        let mut buf = Vec::new();
        let mut line_number = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;
            let line = String::from_utf8_lossy(&buf);
            self.process_line(line_number, &line, &mut outcome);
        }

        Ok(self.finish(outcome))
    }

    /// Parse a zone file from path
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ParseOutcome> {
        let path = path.as_ref();

        let metadata = fs::metadata(path).map_err(|e| ZoneScanError::from_open(path, e))?;
        if !metadata.is_file() {
            return Err(ZoneScanError::NotAFile(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|e| ZoneScanError::from_open(path, e))?;
        debug!("Reading zone file {}", path.display());
        self.parse_reader(BufReader::new(file))
    }

    fn finish(&self, mut outcome: ParseOutcome) -> ParseOutcome {
        outcome.zone_origin = self.state.zone_origin.clone();
        debug!(
            "Parsed zone {} with {} records, {} lines skipped",
            outcome.zone_origin.as_deref().unwrap_or("<unknown>"),
            outcome.records.len(),
            outcome.skipped_lines
        );
        outcome
    }

    /// Interpret one line, filter any record it yields, and account for it
    fn process_line(&mut self, line_number: usize, line: &str, outcome: &mut ParseOutcome) {
        match self.interpret_line(line_number, line) {
            LineOutcome::Skip => outcome.skipped_lines += 1,
            LineOutcome::Directive => {}
            LineOutcome::Invalid(err) => {
                warn!(line = err.line(), "{}", err);
                outcome.skipped_lines += 1;
            }
            LineOutcome::Record(record) => {
                match self.filter.evaluate(&record, self.state.zone_origin.as_deref()) {
                    Ok(()) => outcome.records.push(record),
                    Err(reason) => {
                        trace!(
                            "Line {}: {} {} excluded: {}",
                            line_number, record.name, record.rtype, reason
                        );
                        outcome.skipped_lines += 1;
                    }
                }
            }
        }
    }

    /// Interpret a single line against the current directive state.
    ///
    /// Directives update the state; record lines are resolved but not
    /// filtered.
    pub fn interpret_line(&mut self, line_number: usize, line: &str) -> LineOutcome {
        let text = line.trim();
        if text.is_empty() || text.starts_with(';') {
            return LineOutcome::Skip;
        }

        trace!("Parsing line {}: {}", line_number, text);

        let tokens: Vec<&str> = text.split_whitespace().collect();
        match tokens.first().copied() {
            Some("$ORIGIN") => self.apply_origin(&tokens, line_number, text),
            Some("$TTL") => self.apply_ttl(&tokens, line_number, text),
            _ => match self.parse_record(&tokens, line_number, text) {
                Ok(record) => LineOutcome::Record(record),
                Err(err) => LineOutcome::Invalid(err),
            },
        }
    }

    fn apply_origin(&mut self, tokens: &[&str], line: usize, text: &str) -> LineOutcome {
        let Some(origin) = tokens.get(1) else {
            return LineOutcome::Invalid(LineError::MissingDirectiveValue {
                directive: "$ORIGIN",
                line,
                text: text.to_string(),
            });
        };

        debug!("Set origin to: {}", origin);
        self.state.current_origin = Some(origin.to_string());
        self.state.zone_origin = Some(origin.to_string());
        LineOutcome::Directive
    }

    fn apply_ttl(&mut self, tokens: &[&str], line: usize, text: &str) -> LineOutcome {
        let Some(ttl) = tokens.get(1) else {
            return LineOutcome::Invalid(LineError::MissingDirectiveValue {
                directive: "$TTL",
                line,
                text: text.to_string(),
            });
        };

        debug!("Set default TTL to: {}", ttl);
        self.state.current_ttl = Some(ttl.to_string());
        LineOutcome::Directive
    }

    /// Resolve a record line into a record
    fn parse_record(
        &mut self,
        tokens: &[&str],
        line: usize,
        text: &str,
    ) -> std::result::Result<ZoneRecord, LineError> {
        if tokens.len() < 3 {
            return Err(LineError::Malformed {
                line,
                text: text.to_string(),
            });
        }
        if tokens.len() < RecordLayout::MIN_TOKENS {
            return Err(LineError::Incomplete {
                line,
                text: text.to_string(),
            });
        }

        // MIN_TOKENS covers every index a layout reads
        let layout = RecordLayout::classify(tokens);
        let owner = tokens[0];
        let ttl = match layout.ttl_index() {
            Some(index) => Some(tokens[index].to_string()),
            None => self.state.current_ttl.clone(),
        };
        let class_index = layout.class_index();
        let class = tokens[class_index];
        let rtype = tokens[class_index + 1];
        let data = tokens[class_index + 2..].join(" ");

        let name = self.resolve_name(owner);
        self.observe_type(&name, rtype);

        Ok(ZoneRecord::new(
            name,
            ttl,
            class.to_string(),
            rtype.to_string(),
            data,
            line,
        ))
    }

    /// Expand `@` and relative names against the current origin
    fn resolve_name(&self, name: &str) -> String {
        match self.state.current_origin.as_deref() {
            Some(origin) if name == "@" => origin.to_string(),
            Some(origin) if !name.ends_with('.') => format!("{}.{}", name, origin),
            _ => name.to_string(),
        }
    }

    /// Take the zone origin from the first SOA when `$ORIGIN` never set it
    fn observe_type(&mut self, name: &str, rtype: &str) {
        if self.state.first_soa_seen || rtype != "SOA" {
            return;
        }
        if self.state.zone_origin.is_none() {
            debug!("Zone origin taken from first SOA: {}", name);
            self.state.zone_origin = Some(name.to_string());
        }
        self.state.first_soa_seen = true;
    }
}
