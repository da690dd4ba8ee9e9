//! Build configuration (`treedocx.toml`)
//!
//! Every key is optional. A minimal project needs no configuration file at
//! all: the master document `index` is translated into `Project.docx` with
//! the built-in template.
//!
//! # Example
//!
//! ```toml
//! master_doc = "index"
//! project = "Manual"
//! style = "templates/corporate.dotx"
//! pagebreak_level = 1
//! imagetable_align = "center"
//!
//! [core_properties]
//! creator = "Docs Team"
//!
//! [[documents]]
//! start = "index"
//! name = "manual"
//!
//! [[documents]]
//! start = "api/index"
//! name = "api-reference"
//! core_properties = { title = "API Reference" }
//!
//! [numfig_format]
//! figure = "Figure %s"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use treedocx_ast::Alignment;

use crate::error::{CoreError, Result};

/// Default file name looked up in the source directory
pub const CONFIG_FILE_NAME: &str = "treedocx.toml";

/// Build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root document of the default output
    pub master_doc: String,
    /// Project name; default output file name and title
    pub project: String,
    /// Output documents; empty means one document rooted at `master_doc`
    pub documents: Vec<OutputDocument>,
    /// Template (.docx/.dotx) path, relative to the source directory
    pub style: Option<String>,
    /// Core properties applied to every output document
    pub core_properties: BTreeMap<String, String>,
    /// Headings at this level or above start on a new page
    pub pagebreak_level: Option<u8>,
    /// Default alignment of images and tables
    pub imagetable_align: Option<Alignment>,
    /// Prefix captions with figure numbers
    pub numfig: bool,
    /// Caption prefix pattern per figure type; `%s` receives the number
    pub numfig_format: BTreeMap<String, String>,
    /// Offset added to section depth to get the heading level
    pub initial_header_level: u8,
    /// Share of the table width given to the second column of field and
    /// option lists
    pub item_width_rate: f64,
    /// Number sections without a numbered table of contents
    pub section_numbering: Option<SectionNumbering>,
}

/// One output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputDocument {
    /// Root document name
    pub start: String,
    /// Output file stem (`<name>.docx`)
    pub name: String,
    /// Core properties for this document, layered over the global ones
    #[serde(default)]
    pub core_properties: BTreeMap<String, String>,
}

/// Automatic section numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionNumbering {
    /// First section depth that carries numbers (1 = top-level sections)
    pub start_depth: usize,
    /// Number of section levels that carry numbers
    pub max_depth: usize,
}

impl Default for SectionNumbering {
    fn default() -> Self {
        Self {
            start_depth: 1,
            max_depth: 9,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut numfig_format = BTreeMap::new();
        numfig_format.insert("figure".to_string(), "Fig. %s".to_string());
        numfig_format.insert("table".to_string(), "Table %s".to_string());
        numfig_format.insert("code-block".to_string(), "Listing %s".to_string());

        Self {
            master_doc: "index".to_string(),
            project: "Project".to_string(),
            documents: Vec::new(),
            style: None,
            core_properties: BTreeMap::new(),
            pagebreak_level: None,
            imagetable_align: None,
            numfig: true,
            numfig_format,
            initial_header_level: 0,
            item_width_rate: 0.8,
            section_numbering: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Load `treedocx.toml` from a source directory, or the defaults if absent
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    ///
    /// Figure formats given in the file are merged over the defaults, so
    /// overriding `figure` keeps the `table` and `code-block` patterns.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        for (figtype, format) in Config::default().numfig_format {
            config.numfig_format.entry(figtype).or_insert(format);
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.item_width_rate) {
            return Err(CoreError::InvalidConfig(format!(
                "item_width_rate must be between 0 and 1, got {}",
                self.item_width_rate
            )));
        }
        if let Some(numbering) = self.section_numbering {
            if numbering.start_depth == 0 {
                return Err(CoreError::InvalidConfig(
                    "section_numbering.start_depth starts at 1".to_string(),
                ));
            }
        }
        for doc in &self.documents {
            if doc.name.trim().is_empty() {
                return Err(CoreError::InvalidConfig(format!(
                    "output document rooted at '{}' has an empty name",
                    doc.start
                )));
            }
        }
        Ok(())
    }

    /// Output documents to build, with core properties merged
    pub fn output_documents(&self) -> Vec<OutputDocument> {
        if self.documents.is_empty() {
            return vec![OutputDocument {
                start: self.master_doc.clone(),
                name: self.project.clone(),
                core_properties: self.core_properties.clone(),
            }];
        }

        self.documents
            .iter()
            .map(|doc| {
                let mut props = self.core_properties.clone();
                props.extend(doc.core_properties.clone());
                OutputDocument {
                    start: doc.start.clone(),
                    name: doc.name.clone(),
                    core_properties: props,
                }
            })
            .collect()
    }

    /// Caption pattern for a figure type
    pub fn numfig_format(&self, figtype: &str) -> Option<&str> {
        self.numfig_format.get(figtype).map(String::as_str)
    }
}
