//! User-selectable presentation choices.
//!
//! Each choice has a form name (the value posted by the browsing UI) and a
//! numeric code (its slot value in a serialized options record). Unknown
//! form names fall back to the default variant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display order of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Date the book was added.
    #[default]
    Acquisition,
    /// Author sort name.
    Authors,
    /// Language code.
    Language,
    /// Publisher name.
    Publisher,
    /// Rating.
    Rating,
    /// Series name and index.
    Series,
    /// File size.
    Size,
    /// Tag names.
    Tags,
    /// Publication date.
    Time,
    /// Title sort.
    Title,
}

impl SortBy {
    /// All orders, by code.
    pub const ALL: [SortBy; 10] = [
        SortBy::Acquisition,
        SortBy::Authors,
        SortBy::Language,
        SortBy::Publisher,
        SortBy::Rating,
        SortBy::Series,
        SortBy::Size,
        SortBy::Tags,
        SortBy::Time,
        SortBy::Title,
    ];

    /// Parses a form name; unknown names sort by acquisition.
    pub fn from_form(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|sort| sort.form_name() == name)
            .unwrap_or_default()
    }

    /// Returns the form name.
    pub fn form_name(&self) -> &'static str {
        match self {
            SortBy::Acquisition => "acquisition",
            SortBy::Authors => "authors",
            SortBy::Language => "language",
            SortBy::Publisher => "publisher",
            SortBy::Rating => "rating",
            SortBy::Series => "series",
            SortBy::Size => "size",
            SortBy::Tags => "tags",
            SortBy::Time => "time",
            SortBy::Title => "title",
        }
    }

    /// Returns the record code.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Parses a record code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

/// Language of the browsing UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuiLang {
    /// `de`
    #[default]
    German,
    /// `en`
    English,
}

impl GuiLang {
    /// `en` selects English, anything else German.
    pub fn from_form(name: &str) -> Self {
        if name == "en" {
            GuiLang::English
        } else {
            GuiLang::German
        }
    }

    /// Returns the form name.
    pub fn form_name(&self) -> &'static str {
        match self {
            GuiLang::German => "de",
            GuiLang::English => "en",
        }
    }

    /// Returns the record code.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Parses a record code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(GuiLang::German),
            1 => Some(GuiLang::English),
            _ => None,
        }
    }
}

/// Arrangement of the document list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Table of titles.
    #[default]
    List,
    /// Cover grid.
    Grid,
}

impl Layout {
    /// `grid` selects the grid, anything else the list.
    pub fn from_form(name: &str) -> Self {
        if name == "grid" {
            Layout::Grid
        } else {
            Layout::List
        }
    }

    /// Returns the form name.
    pub fn form_name(&self) -> &'static str {
        match self {
            Layout::List => "list",
            Layout::Grid => "grid",
        }
    }

    /// Returns the record code.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Parses a record code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Layout::List),
            1 => Some(Layout::Grid),
            _ => None,
        }
    }
}

/// Colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

impl Theme {
    /// `dark` selects the dark theme, anything else the light one.
    pub fn from_form(name: &str) -> Self {
        if name == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Returns the form name.
    pub fn form_name(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Returns the record code.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Parses a record code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Theme::Light),
            1 => Some(Theme::Dark),
            _ => None,
        }
    }
}

macro_rules! display_form_name {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.form_name())
                }
            }
        )*
    };
}

display_form_name!(SortBy, GuiLang, Layout, Theme);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_codes() {
        for (code, sort) in SortBy::ALL.iter().enumerate() {
            assert_eq!(usize::from(sort.code()), code);
            assert_eq!(SortBy::from_code(sort.code()), Some(*sort));
        }
        assert_eq!(SortBy::from_code(10), None);
        assert_eq!(SortBy::Title.code(), 9);
    }

    #[test]
    fn test_sort_by_form_names() {
        assert_eq!(SortBy::from_form("authors"), SortBy::Authors);
        assert_eq!(SortBy::from_form("time"), SortBy::Time);
        assert_eq!(SortBy::from_form("shoe size"), SortBy::Acquisition);
        assert_eq!(SortBy::Series.to_string(), "series");
    }

    #[test]
    fn test_binary_choices() {
        assert_eq!(GuiLang::from_form("en"), GuiLang::English);
        assert_eq!(GuiLang::from_form("fr"), GuiLang::German);
        assert_eq!(Layout::from_form("grid"), Layout::Grid);
        assert_eq!(Layout::from_form("GRID"), Layout::List);
        assert_eq!(Theme::from_form("dark"), Theme::Dark);
        assert_eq!(Theme::Dark.code(), 1);
        assert_eq!(Theme::from_code(2), None);
    }
}
