//! Node kinds
//!
//! The set of node kinds is closed: every kind a doctree producer may emit is
//! listed here under its wire name. Anything else deserializes into
//! [`NodeKind::Unrecognized`] so that consumers can reject it explicitly
//! instead of silently dropping content.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! node_kinds {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)*) => {
        /// Kind tag of a [`Node`](crate::Node)
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum NodeKind {
            $($(#[$doc])* $variant,)*
            /// A kind name outside the known set
            Unrecognized(String),
        }

        impl NodeKind {
            /// Wire name of this kind (e.g. `"bullet_list"`)
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $name,)*
                    Self::Unrecognized(name) => name,
                }
            }

            /// Look up a kind by its wire name
            pub fn from_name(name: &str) -> Self {
                match name {
                    $($name => Self::$variant,)*
                    other => Self::Unrecognized(other.to_string()),
                }
            }

            /// All known kinds, in declaration order
            pub fn known() -> &'static [NodeKind] {
                &[$(Self::$variant,)*]
            }
        }
    };
}

node_kinds! {
    // Structure
    Document => "document",
    /// Boundary of an inlined sub-document
    SubDocument => "start_of_file",
    Section => "section",
    Title => "title",
    Subtitle => "subtitle",
    Topic => "topic",
    Sidebar => "sidebar",
    Rubric => "rubric",
    Compound => "compound",
    Container => "container",
    Glossary => "glossary",
    Attribution => "attribution",
    Transition => "transition",
    Centered => "centered",
    Hlist => "hlist",
    Hlistcol => "hlistcol",
    VersionModified => "versionmodified",

    // Admonitions
    Admonition => "admonition",
    Attention => "attention",
    Caution => "caution",
    Danger => "danger",
    Error => "error",
    Hint => "hint",
    Important => "important",
    Note => "note",
    SeeAlso => "seealso",
    Tip => "tip",
    Warning => "warning",

    // Paragraph-level
    Paragraph => "paragraph",
    CompactParagraph => "compact_paragraph",
    LiteralBlock => "literal_block",
    DoctestBlock => "doctest_block",
    LineBlock => "line_block",
    Line => "line",
    BlockQuote => "block_quote",

    // Lists
    BulletList => "bullet_list",
    EnumeratedList => "enumerated_list",
    ListItem => "list_item",
    DefinitionList => "definition_list",
    DefinitionListItem => "definition_list_item",
    Term => "term",
    Classifier => "classifier",
    Definition => "definition",
    FieldList => "field_list",
    Field => "field",
    FieldName => "field_name",
    FieldBody => "field_body",
    OptionList => "option_list",
    OptionListItem => "option_list_item",
    OptionGroup => "option_group",
    Option => "option",
    OptionString => "option_string",
    OptionArgument => "option_argument",
    Description => "description",

    // Tables
    Table => "table",
    Tgroup => "tgroup",
    Colspec => "colspec",
    Thead => "thead",
    Tbody => "tbody",
    Row => "row",
    Entry => "entry",
    TabularColSpec => "tabular_col_spec",

    // Figures and media
    Figure => "figure",
    Caption => "caption",
    Legend => "legend",
    Image => "image",

    // Notes
    Footnote => "footnote",
    Citation => "citation",
    Label => "label",

    // API descriptions
    Desc => "desc",
    DescSignature => "desc_signature",
    DescSignatureLine => "desc_signature_line",
    DescName => "desc_name",
    DescAddname => "desc_addname",
    DescType => "desc_type",
    DescReturns => "desc_returns",
    DescParameterlist => "desc_parameterlist",
    DescParameter => "desc_parameter",
    DescOptional => "desc_optional",
    DescAnnotation => "desc_annotation",
    DescContent => "desc_content",
    Productionlist => "productionlist",

    // Inline markup
    Text => "text",
    Emphasis => "emphasis",
    Strong => "strong",
    Literal => "literal",
    LiteralEmphasis => "literal_emphasis",
    LiteralStrong => "literal_strong",
    Subscript => "subscript",
    Superscript => "superscript",
    TitleReference => "title_reference",
    Manpage => "manpage",
    Abbreviation => "abbreviation",
    Inline => "inline",
    Generated => "generated",
    Problematic => "problematic",

    // References
    Reference => "reference",
    PendingXref => "pending_xref",
    NumberReference => "number_reference",
    DownloadReference => "download_reference",
    FootnoteReference => "footnote_reference",
    CitationReference => "citation_reference",
    Target => "target",

    // Math
    Math => "math",
    MathBlock => "math_block",
    DisplayMath => "displaymath",

    // Markers and passthrough
    Toctree => "toctree",
    Index => "index",
    SubstitutionDefinition => "substitution_definition",
    Highlightlang => "highlightlang",
    Acks => "acks",
    SystemMessage => "system_message",
    Comment => "comment",
    Meta => "meta",
    Raw => "raw",
}

impl NodeKind {
    /// Admonition kinds (`note`, `warning`, ... and the generic `admonition`)
    pub fn is_admonition(&self) -> bool {
        matches!(
            self,
            Self::Admonition
                | Self::Attention
                | Self::Caution
                | Self::Danger
                | Self::Error
                | Self::Hint
                | Self::Important
                | Self::Note
                | Self::SeeAlso
                | Self::Tip
                | Self::Warning
        )
    }

    /// Constructs rendered as tables in the output
    pub fn is_table_like(&self) -> bool {
        matches!(
            self,
            Self::Table | Self::FieldList | Self::OptionList | Self::MathBlock | Self::DisplayMath
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl From<String> for NodeKind {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}
