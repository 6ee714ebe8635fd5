/// Quote character for synthesized string tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// Double quotes (`"`), the strict-JSON default.
    Double,
    /// Single quotes (`'`), JSON5 style.
    Single,
}

impl QuoteStyle {
    pub(crate) fn character(&self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }
}

/// Character used to build indentation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentCharacter {
    Space,
    Tab,
}

impl IndentCharacter {
    pub(crate) fn character(&self) -> char {
        match self {
            IndentCharacter::Space => ' ',
            IndentCharacter::Tab => '\t',
        }
    }
}

/// Style toggles for one collection kind (arrays or objects).
///
/// Every field is optional: `None` means "keep whatever the document
/// already does", as inferred by formatting detection. Setting a field
/// overrides both the detected and the inherited style for that concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionOptions {
    /// Spaces (or tabs) per indentation level.
    pub indentation_size: Option<usize>,
    /// Newline straight after the opening delimiter.
    pub leading_indentation: Option<bool>,
    /// Newline before the closing delimiter.
    pub trailing_indentation: Option<bool>,
    /// Each entry starts on its own indented line.
    pub entry_indentation: Option<bool>,
    /// Comma after the last entry.
    pub trailing_comma: Option<bool>,
    /// A space after each comma.
    pub comma_spacing: Option<bool>,
    /// A space after each colon (meaningful for objects).
    pub colon_spacing: Option<bool>,
}

/// Style overrides applied when serializing or reformatting a document.
///
/// Collection-level toggles are kept separately for arrays and objects;
/// the remaining fields apply document-wide. Anything left `None` falls
/// back to the style detected from the text being rebuilt, so a default
/// `FormatOptions` changes nothing.
///
/// # Example
///
/// ```rust
/// use losslessjson::{parse, FormatOptions};
///
/// let mut doc = parse("{\"a\":1}").unwrap();
/// let mut options = FormatOptions::pretty(4);
/// options.object.trailing_comma = Some(false);
/// let text = doc.to_text_with(&options);
/// assert_eq!(text, "{\n    \"a\": 1\n}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Array-specific toggles.
    pub array: CollectionOptions,
    /// Object-specific toggles.
    pub object: CollectionOptions,
    /// Character used for indentation tokens.
    pub indentation_character: Option<IndentCharacter>,
    /// Quote for string values.
    pub string_quote: Option<QuoteStyle>,
    /// Quote for quoted property keys.
    pub property_quote: Option<QuoteStyle>,
    /// Write property keys unquoted wherever they form valid,
    /// non-reserved identifiers.
    pub property_unquoted: Option<bool>,
}

impl FormatOptions {
    /// Conventional multi-line style: indented entries, spaces after
    /// commas and colons, no trailing commas.
    pub fn pretty(indentation_size: usize) -> Self {
        let collection = CollectionOptions {
            indentation_size: Some(indentation_size),
            leading_indentation: Some(true),
            trailing_indentation: Some(true),
            entry_indentation: Some(true),
            trailing_comma: Some(false),
            comma_spacing: Some(true),
            colon_spacing: Some(true),
        };
        FormatOptions {
            array: collection.clone(),
            object: collection,
            indentation_character: Some(IndentCharacter::Space),
            ..FormatOptions::default()
        }
    }

    /// Everything on one line with no optional spacing at all.
    pub fn compact() -> Self {
        let collection = CollectionOptions {
            indentation_size: Some(0),
            leading_indentation: Some(false),
            trailing_indentation: Some(false),
            entry_indentation: Some(false),
            trailing_comma: Some(false),
            comma_spacing: Some(false),
            colon_spacing: Some(false),
        };
        FormatOptions {
            array: collection.clone(),
            object: collection,
            ..FormatOptions::default()
        }
    }
}
