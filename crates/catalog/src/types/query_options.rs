//! Pagination, sort and filter state of a browsing session.
//!
//! [`QueryOptions`] is created once per session, merged with every request's
//! form values through [`QueryOptions::update`] and stored between requests
//! as a single `|`-delimited record (see the `Display` and `FromStr` impls).
//!
//! Text slots are double-quoted with Go-style escapes: `\\`, `\"`, `\a`,
//! `\b`, `\f`, `\n`, `\r`, `\t`, `\v`, `\xHH` (ASCII only), `\uHHHH` and
//! `\UHHHHHHHH`. Records written by older servers decode unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::metadata::{FieldMetadata, VirtualLibraries};
use crate::query::{FieldResolver, SearchRequest};

use super::choices::{GuiLang, Layout, SortBy, Theme};

/// Page sizes offered to the user.
pub const PAGE_SIZES: [u32; 5] = [9, 24, 48, 99, 249];

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 24;

/// Virtual-library form value meaning "no library".
pub const NO_VIRTUAL_LIBRARY: &str = "-";

/// Request values recognized by [`QueryOptions::update`].
///
/// Every field is optional; an absent or empty value is treated the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptionsForm {
    /// Interface language (`de`, `en`).
    #[serde(default)]
    pub guilang: Option<String>,
    /// `list` or `grid`.
    #[serde(default)]
    pub layout: Option<String>,
    /// Requested page size, snapped to [`PAGE_SIZES`].
    #[serde(default)]
    pub limitlength: Option<String>,
    /// Search text.
    #[serde(default)]
    pub matching: Option<String>,
    /// `descending` or `ascending`.
    #[serde(default)]
    pub order: Option<String>,
    /// Sort field name, see [`SortBy::from_form`].
    #[serde(default)]
    pub sortby: Option<String>,
    /// `light` or `dark`.
    #[serde(default)]
    pub theme: Option<String>,
    /// Virtual library name, [`NO_VIRTUAL_LIBRARY`] for none.
    #[serde(default)]
    pub virtlib: Option<String>,
}

impl QueryOptionsForm {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a form value by its request name.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), OptionsError> {
        let slot = match key {
            "guilang" => &mut self.guilang,
            "layout" => &mut self.layout,
            "limitlength" => &mut self.limitlength,
            "matching" => &mut self.matching,
            "order" => &mut self.order,
            "sortby" => &mut self.sortby,
            "theme" => &mut self.theme,
            "virtlib" => &mut self.virtlib,
            _ => {
                return Err(OptionsError::InvalidValue {
                    field: "form".to_string(),
                    value: key.to_string(),
                });
            }
        };
        *slot = Some(value.into());
        Ok(())
    }

    /// Builder form of [`set`](Self::set) for known keys.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Result<Self, OptionsError> {
        self.set(key, value)?;
        Ok(self)
    }
}

/// Returns the value if present and non-empty.
fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Query options of one browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Entity ID to look up.
    pub id: i64,
    /// Sort direction.
    pub descending: bool,
    /// Entity kind the ID refers to (authors, publisher, series, tags).
    pub entity: String,
    /// Interface language.
    pub gui_lang: GuiLang,
    /// List or grid view.
    pub layout: Layout,
    /// Documents per page.
    pub limit_length: u32,
    /// Offset of the first document shown.
    pub limit_start: u32,
    /// Search text.
    pub matching: String,
    /// Number of documents matching the current options.
    pub query_count: u64,
    /// Sort field.
    pub sort_by: SortBy,
    /// Colour theme.
    pub theme: Theme,
    /// Selected virtual library; empty for none.
    pub virt_lib: String,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::new(0)
    }
}

impl QueryOptions {
    /// Creates options for a new session.
    ///
    /// The page size snaps to the first entry of [`PAGE_SIZES`] not below
    /// `docs_per_page`, or the largest one; non-positive values use
    /// [`DEFAULT_PAGE_SIZE`]. Documents are sorted descending.
    pub fn new(docs_per_page: i64) -> Self {
        Self {
            id: 0,
            descending: true,
            entity: String::new(),
            gui_lang: GuiLang::default(),
            layout: Layout::default(),
            limit_length: snap_page_size(docs_per_page),
            limit_start: 0,
            matching: String::new(),
            query_count: 0,
            sort_by: SortBy::default(),
            theme: Theme::default(),
            virt_lib: String::new(),
        }
    }

    /// Advances to the next page.
    pub fn inc_limit(&mut self) -> &mut Self {
        self.limit_start = self.limit_start.saturating_add(self.limit_length);
        self
    }

    /// Goes back one page, never before the first.
    pub fn dec_limit(&mut self) -> &mut Self {
        self.limit_start = self.limit_start.saturating_sub(self.limit_length);
        self
    }

    /// Compiles the search text into a `WHERE` clause, or an empty string.
    pub fn where_clause<M: FieldMetadata>(&self, resolver: &FieldResolver<M>) -> String {
        SearchRequest::new(self.matching.as_str()).clause(resolver)
    }

    /// Page sizes with a flag marking the current one.
    pub fn page_size_choices(&self) -> impl Iterator<Item = (u32, bool)> + '_ {
        PAGE_SIZES
            .into_iter()
            .map(move |size| (size, size == self.limit_length))
    }

    /// Merges the values of one request.
    ///
    /// Changing the page size, sort order or sort direction returns to the
    /// first page. A new search text forgets the entity ID and the virtual
    /// library.
    pub fn update<L: VirtualLibraries>(
        &mut self,
        form: &QueryOptionsForm,
        libraries: &L,
    ) -> &mut Self {
        self.gui_lang = given(&form.guilang).map_or(GuiLang::German, GuiLang::from_form);
        self.layout = given(&form.layout).map_or(Layout::List, Layout::from_form);

        if let Some(length) = given(&form.limitlength) {
            match length.trim().parse::<u32>() {
                Ok(length) if length != self.limit_length => {
                    self.limit_length = length;
                    self.limit_start = 0;
                }
                Ok(_) => {}
                Err(_) => tracing::debug!(value = length, "Ignoring unparseable page size"),
            }
        }

        match given(&form.matching) {
            Some(matching) => {
                if matching != self.matching {
                    self.id = 0;
                    self.matching = matching.to_string();
                    self.limit_start = 0;
                    self.virt_lib.clear();
                }
            }
            None => {
                self.entity.clear();
                self.id = 0;
                self.matching.clear();
            }
        }

        match given(&form.order) {
            Some(order) => {
                let descending = order == "descending";
                if descending != self.descending {
                    self.descending = descending;
                    self.limit_start = 0;
                }
            }
            None => self.descending = false,
        }

        match given(&form.sortby) {
            Some(name) => {
                let sort_by = SortBy::from_form(name);
                if sort_by != self.sort_by {
                    self.sort_by = sort_by;
                    self.limit_start = 0;
                }
            }
            None => self.sort_by = SortBy::Acquisition,
        }

        self.theme = given(&form.theme).map_or(Theme::Light, Theme::from_form);

        match given(&form.virtlib) {
            Some(name) => {
                let selected = if name == NO_VIRTUAL_LIBRARY { "" } else { name };
                if selected != self.virt_lib {
                    self.switch_virtual_library(selected, libraries);
                }
            }
            None => self.virt_lib.clear(),
        }

        self
    }

    /// Selects `selected` (empty for none), replacing the search text only if
    /// the user has not edited the previous library's query.
    fn switch_virtual_library<L: VirtualLibraries>(&mut self, selected: &str, libraries: &L) {
        let previous = std::mem::replace(&mut self.virt_lib, selected.to_string());

        let previous_query = if previous.is_empty() {
            None
        } else {
            lookup_library(libraries, &previous)
        };
        let untouched =
            self.matching.is_empty() || previous_query.as_deref() == Some(self.matching.as_str());

        if untouched {
            if selected.is_empty() {
                self.matching.clear();
            } else if let Some(query) = lookup_library(libraries, selected) {
                self.matching = query;
            }
        }

        self.entity.clear();
        self.id = 0;
        self.limit_start = 0;
    }
}

fn lookup_library<L: VirtualLibraries>(libraries: &L, name: &str) -> Option<String> {
    match libraries.virtual_library_query(name) {
        Ok(query) => query,
        Err(e) => {
            tracing::warn!(library = name, error = %e, "Virtual library lookup failed");
            None
        }
    }
}

fn snap_page_size(docs_per_page: i64) -> u32 {
    if docs_per_page <= 0 {
        return DEFAULT_PAGE_SIZE;
    }
    PAGE_SIZES
        .into_iter()
        .find(|&size| i64::from(size) >= docs_per_page)
        .unwrap_or(PAGE_SIZES[PAGE_SIZES.len() - 1])
}

/// Writes `text` as a double-quoted record string.
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in text.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{7}' => f.write_str("\\a")?,
            '\u{8}' => f.write_str("\\b")?,
            '\u{b}' => f.write_str("\\v")?,
            '\u{c}' => f.write_str("\\f")?,
            c if c.is_ascii_control() => write!(f, "\\x{:02x}", u32::from(c))?,
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                write!(f, "\\u{:04x}", u32::from(c))?
            }
            _ => write!(f, "{ch}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for QueryOptions {
    /// Serializes to
    /// `|id|descending|"entity"|guilang|layout|limitlength|limitstart|"matching"|querycount|sortby|theme|"virtlib"|`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}|{}|", self.id, self.descending)?;
        write_quoted(f, &self.entity)?;
        write!(
            f,
            "|{}|{}|{}|{}|",
            self.gui_lang.code(),
            self.layout.code(),
            self.limit_length,
            self.limit_start
        )?;
        write_quoted(f, &self.matching)?;
        write!(
            f,
            "|{}|{}|{}|",
            self.query_count,
            self.sort_by.code(),
            self.theme.code()
        )?;
        write_quoted(f, &self.virt_lib)?;
        f.write_str("|")
    }
}

/// Cursor over a serialized options record.
struct RecordReader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> RecordReader<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn malformed(&self, message: impl Into<String>) -> OptionsError {
        OptionsError::MalformedRecord {
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), OptionsError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.consume();
                Ok(())
            }
            Some(c) => Err(self.malformed(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.malformed(format!("expected '{expected}', found end of record"))),
        }
    }

    /// Reads an unquoted slot and its closing delimiter.
    fn slot(&mut self) -> Result<&'a str, OptionsError> {
        let rest = &self.input[self.pos..];
        let len = rest
            .find('|')
            .ok_or_else(|| self.malformed("unterminated slot"))?;
        self.pos += len;
        self.expect('|')?;
        Ok(&rest[..len])
    }

    fn number<T: FromStr>(&mut self, field: &str) -> Result<T, OptionsError> {
        let text = self.slot()?;
        text.parse().map_err(|_| invalid(field, text))
    }

    fn boolean(&mut self, field: &str) -> Result<bool, OptionsError> {
        match self.slot()? {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(invalid(field, other)),
        }
    }

    fn choice<T>(&mut self, field: &str, from_code: fn(u8) -> Option<T>) -> Result<T, OptionsError> {
        let text = self.slot()?;
        text.parse::<u8>()
            .ok()
            .and_then(from_code)
            .ok_or_else(|| invalid(field, text))
    }

    /// Reads a quoted slot and its closing delimiter.
    fn quoted(&mut self) -> Result<String, OptionsError> {
        self.expect('"')?;
        let mut text = String::new();
        loop {
            match self.consume() {
                Some('"') => break,
                Some('\\') => match self.consume() {
                    Some('\\') => text.push('\\'),
                    Some('"') => text.push('"'),
                    Some('n') => text.push('\n'),
                    Some('r') => text.push('\r'),
                    Some('t') => text.push('\t'),
                    Some('a') => text.push('\u{7}'),
                    Some('b') => text.push('\u{8}'),
                    Some('f') => text.push('\u{c}'),
                    Some('v') => text.push('\u{b}'),
                    Some('x') => {
                        let c = self.hex_escape(2)?;
                        if !c.is_ascii() {
                            return Err(self.malformed("byte escape outside ASCII"));
                        }
                        text.push(c);
                    }
                    Some('u') => text.push(self.hex_escape(4)?),
                    Some('U') => text.push(self.hex_escape(8)?),
                    Some(c) => return Err(self.malformed(format!("unknown escape '\\{c}'"))),
                    None => return Err(self.malformed("unterminated string")),
                },
                Some(c) => text.push(c),
                None => return Err(self.malformed("unterminated string")),
            }
        }
        self.expect('|')?;
        Ok(text)
    }

    /// Reads `digits` hex digits of an escape as one character.
    fn hex_escape(&mut self, digits: usize) -> Result<char, OptionsError> {
        let hex = self
            .input
            .get(self.pos..self.pos + digits)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.malformed(format!("expected {digits} hex digits")))?;
        let c = u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.malformed(format!("invalid character escape '{hex}'")))?;
        self.pos += digits;
        Ok(c)
    }

    fn finish(&self) -> Result<(), OptionsError> {
        if self.pos == self.input.len() {
            Ok(())
        } else {
            Err(self.malformed("trailing data after record"))
        }
    }
}

fn invalid(field: &str, value: &str) -> OptionsError {
    OptionsError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

impl FromStr for QueryOptions {
    type Err = OptionsError;

    fn from_str(record: &str) -> Result<Self, Self::Err> {
        let mut reader = RecordReader::new(record.trim());
        reader.expect('|')?;

        let id = reader.number("id")?;
        let descending = reader.boolean("descending")?;
        let entity = reader.quoted()?;
        let gui_lang = reader.choice("guilang", GuiLang::from_code)?;
        let layout = reader.choice("layout", Layout::from_code)?;
        let limit_length = reader.number("limitlength")?;
        let limit_start = reader.number("limitstart")?;
        let matching = reader.quoted()?;
        let query_count = reader.number("querycount")?;
        let sort_by = reader.choice("sortby", SortBy::from_code)?;
        let theme = reader.choice("theme", Theme::from_code)?;
        let virt_lib = reader.quoted()?;
        reader.finish()?;

        let virt_lib = match virt_lib.trim() {
            NO_VIRTUAL_LIBRARY => String::new(),
            name => name.to_string(),
        };

        Ok(Self {
            id,
            descending,
            entity,
            gui_lang,
            layout,
            limit_length,
            limit_start,
            matching: matching.trim().to_string(),
            query_count,
            sort_by,
            theme,
            virt_lib,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::InMemoryMetadata;

    fn libraries() -> InMemoryMetadata {
        InMemoryMetadata::new()
            .with_virtual_library("Fantasy", r#"tags:"=fantasy""#)
            .with_virtual_library("Crime", r#"tags:"=crime""#)
    }

    fn form(pairs: &[(&str, &str)]) -> QueryOptionsForm {
        let mut form = QueryOptionsForm::new();
        for (key, value) in pairs {
            form.set(key, *value).unwrap();
        }
        form
    }

    #[test]
    fn test_new_snaps_page_size() {
        assert_eq!(QueryOptions::new(0).limit_length, 24);
        assert_eq!(QueryOptions::new(-3).limit_length, 24);
        assert_eq!(QueryOptions::new(1).limit_length, 9);
        assert_eq!(QueryOptions::new(9).limit_length, 9);
        assert_eq!(QueryOptions::new(25).limit_length, 48);
        assert_eq!(QueryOptions::new(100).limit_length, 249);
        assert_eq!(QueryOptions::new(5000).limit_length, 249);
        assert!(QueryOptions::new(24).descending);
    }

    #[test]
    fn test_paging() {
        let mut qo = QueryOptions::new(24);
        qo.inc_limit().inc_limit();
        assert_eq!(qo.limit_start, 48);
        qo.dec_limit();
        assert_eq!(qo.limit_start, 24);
        qo.limit_start = 10;
        qo.dec_limit();
        assert_eq!(qo.limit_start, 0);
        qo.dec_limit();
        assert_eq!(qo.limit_start, 0);
    }

    #[test]
    fn test_page_size_change_resets_offset() {
        let mut qo = QueryOptions::new(24);
        qo.limit_start = 72;
        qo.update(&form(&[("limitlength", "48"), ("order", "descending")]), &libraries());
        assert_eq!(qo.limit_length, 48);
        assert_eq!(qo.limit_start, 0);
    }

    #[test]
    fn test_same_page_size_keeps_offset() {
        let mut qo = QueryOptions::new(24);
        qo.limit_start = 72;
        qo.update(&form(&[("limitlength", "24"), ("order", "descending")]), &libraries());
        assert_eq!(qo.limit_start, 72);

        qo.update(&form(&[("limitlength", "lots"), ("order", "descending")]), &libraries());
        assert_eq!(qo.limit_length, 24);
        assert_eq!(qo.limit_start, 72);
    }

    #[test]
    fn test_absent_values_fall_back() {
        let mut qo = QueryOptions::new(24);
        qo.gui_lang = GuiLang::English;
        qo.layout = Layout::Grid;
        qo.theme = Theme::Dark;
        qo.sort_by = SortBy::Title;
        qo.entity = "authors".into();
        qo.id = 7;
        qo.matching = "dune".into();
        qo.virt_lib = "Fantasy".into();

        qo.update(&QueryOptionsForm::new(), &libraries());

        assert_eq!(qo.gui_lang, GuiLang::German);
        assert_eq!(qo.layout, Layout::List);
        assert_eq!(qo.theme, Theme::Light);
        assert_eq!(qo.sort_by, SortBy::Acquisition);
        assert!(!qo.descending);
        assert_eq!(qo.entity, "");
        assert_eq!(qo.id, 0);
        assert_eq!(qo.matching, "");
        assert_eq!(qo.virt_lib, "");
    }

    #[test]
    fn test_new_matching_resets_selection() {
        let mut qo = QueryOptions::new(24);
        qo.id = 12;
        qo.limit_start = 48;
        qo.virt_lib = "Fantasy".into();
        qo.matching = "old".into();

        qo.update(
            &form(&[("matching", "dragons"), ("order", "descending"), ("virtlib", "Fantasy")]),
            &libraries(),
        );

        assert_eq!(qo.matching, "dragons");
        assert_eq!(qo.id, 0);
        assert_eq!(qo.limit_start, 0);
        // cleared by the new text, then reselected without touching the edited search
        assert_eq!(qo.virt_lib, "Fantasy");
        assert_eq!(qo.matching, "dragons");
    }

    #[test]
    fn test_sort_changes_reset_offset() {
        let mut qo = QueryOptions::new(24);
        qo.limit_start = 24;
        qo.update(&form(&[("sortby", "title"), ("order", "descending")]), &libraries());
        assert_eq!(qo.sort_by, SortBy::Title);
        assert_eq!(qo.limit_start, 0);

        qo.limit_start = 24;
        qo.update(&form(&[("sortby", "title"), ("order", "ascending")]), &libraries());
        assert!(!qo.descending);
        assert_eq!(qo.limit_start, 0);
    }

    #[test]
    fn test_virtual_library_swaps_untouched_search() {
        let libs = libraries();
        let mut qo = QueryOptions::new(24);

        qo.update(&form(&[("virtlib", "Fantasy")]), &libs);
        assert_eq!(qo.virt_lib, "Fantasy");
        assert_eq!(qo.matching, r#"tags:"=fantasy""#);

        let mut next = form(&[("virtlib", "Crime")]);
        next.matching = Some(qo.matching.clone());
        qo.update(&next, &libs);
        assert_eq!(qo.virt_lib, "Crime");
        assert_eq!(qo.matching, r#"tags:"=crime""#);

        let mut none = form(&[("virtlib", "-")]);
        none.matching = Some(qo.matching.clone());
        qo.update(&none, &libs);
        assert_eq!(qo.virt_lib, "");
        assert_eq!(qo.matching, "");
    }

    #[test]
    fn test_virtual_library_keeps_edited_search() {
        let libs = libraries();
        let mut qo = QueryOptions::new(24);
        qo.virt_lib = "Fantasy".into();
        qo.matching = "dragons".into();
        qo.limit_start = 24;
        qo.id = 3;

        qo.update(&form(&[("matching", "dragons"), ("virtlib", "Crime")]), &libs);

        assert_eq!(qo.virt_lib, "Crime");
        assert_eq!(qo.matching, "dragons");
        assert_eq!(qo.limit_start, 0);
        assert_eq!(qo.id, 0);
    }

    #[test]
    fn test_unknown_form_key() {
        let mut form = QueryOptionsForm::new();
        assert!(matches!(
            form.set("colour", "red"),
            Err(OptionsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_record_layout() {
        let mut qo = QueryOptions::new(24);
        qo.id = 5;
        qo.entity = "authors".into();
        qo.matching = r#"title:"=Dune""#.into();
        qo.query_count = 3;
        qo.sort_by = SortBy::Title;
        assert_eq!(
            qo.to_string(),
            r#"|5|true|"authors"|0|0|24|0|"title:\"=Dune\""|3|9|0|""|"#
        );
        assert_eq!(qo.to_string().parse::<QueryOptions>().unwrap(), qo);
    }

    #[test]
    fn test_decode_normalizes() {
        let qo: QueryOptions = r#"|0|false|""|1|1|48|96|"  dune  "|0|2|1|"-"|"#.parse().unwrap();
        assert_eq!(qo.matching, "dune");
        assert_eq!(qo.virt_lib, "");
        assert_eq!(qo.gui_lang, GuiLang::English);
        assert_eq!(qo.layout, Layout::Grid);
        assert_eq!(qo.sort_by, SortBy::Language);
        assert_eq!(qo.theme, Theme::Dark);
        assert_eq!(qo.limit_start, 96);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            "".parse::<QueryOptions>(),
            Err(OptionsError::MalformedRecord { position: 0, .. })
        ));
        assert!(matches!(
            r#"|x|true|""|0|0|24|0|""|0|0|0|""|"#.parse::<QueryOptions>(),
            Err(OptionsError::InvalidValue { ref field, .. }) if field == "id"
        ));
        assert!(matches!(
            r#"|1|true|""|0|0|24|0|""|0|12|0|""|"#.parse::<QueryOptions>(),
            Err(OptionsError::InvalidValue { ref field, .. }) if field == "sortby"
        ));
        assert!(matches!(
            r#"|1|true|"unterminated|0|0|24|0|""|0|0|0|""|"#.parse::<QueryOptions>(),
            Err(OptionsError::MalformedRecord { .. })
        ));
        assert!(matches!(
            r#"|1|true|""|0|0|24|0|""|0|0|0|""|extra"#.parse::<QueryOptions>(),
            Err(OptionsError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_decode_go_escapes() {
        let qo: QueryOptions = r#"|0|false|"\x1a\u2028"|0|0|24|0|"\U0001F4DA\v\a"|0|0|0|""|"#
            .parse()
            .unwrap();
        assert_eq!(qo.entity, "\u{1a}\u{2028}");
        assert_eq!(qo.matching, "\u{1F4DA}\u{b}\u{7}");

        assert!(matches!(
            r#"|0|false|"\xff"|0|0|24|0|""|0|0|0|""|"#.parse::<QueryOptions>(),
            Err(OptionsError::MalformedRecord { .. })
        ));
        assert!(matches!(
            r#"|0|false|"\u12"|0|0|24|0|""|0|0|0|""|"#.parse::<QueryOptions>(),
            Err(OptionsError::MalformedRecord { .. })
        ));
        assert!(matches!(
            r#"|0|false|"\ud800"|0|0|24|0|""|0|0|0|""|"#.parse::<QueryOptions>(),
            Err(OptionsError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_control_characters_are_escaped() {
        let mut qo = QueryOptions::new(24);
        qo.entity = "a\u{1a}b\u{85}\u{2028}".into();
        let record = qo.to_string();
        assert!(record.contains(r#""a\x1ab\u0085\u2028""#), "{record}");
        assert_eq!(record.parse::<QueryOptions>().unwrap(), qo);
    }

    #[test]
    fn test_page_size_choices() {
        let qo = QueryOptions::new(48);
        let selected: Vec<u32> = qo
            .page_size_choices()
            .filter(|(_, selected)| *selected)
            .map(|(size, _)| size)
            .collect();
        assert_eq!(selected, vec![48]);
        assert_eq!(qo.page_size_choices().count(), 5);
    }
}
