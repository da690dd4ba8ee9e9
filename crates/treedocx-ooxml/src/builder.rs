//! Batch build of every configured output document
//!
//! For each output document: assemble the tree from its start document,
//! start a fresh document from the template, apply core properties,
//! translate, and write `<out_dir>/<name>.docx`. A document that cannot be
//! written is reported as a warning and the batch carries on; assembly and
//! translation errors stop it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use treedocx_core::diagnostics::CODE_WRITE_FAILED;
use treedocx_core::{
    Assembler, Assembly, Config, Diagnostic, Diagnostics, DoctreeSource, OutputDocument,
};

use crate::error::Result;
use crate::model::{DocumentModel, DocxDocument, MemoryDocument, Mutation};
use crate::template::Template;
use crate::translator::translate;

/// Outcome of a build
#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
    /// Files written
    pub written: Vec<PathBuf>,
    /// Files that could not be written
    pub failed: Vec<PathBuf>,
    /// Skipped inclusions and write failures
    pub diagnostics: Diagnostics,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Mutations one output document would receive
#[derive(Debug, Serialize)]
pub struct DryRun {
    pub name: String,
    pub docnames: Vec<String>,
    pub journal: Vec<Mutation>,
}

/// Builds the configured output documents from a doctree source
pub struct DocxBuilder<'a, S: DoctreeSource + ?Sized> {
    source: &'a S,
    config: &'a Config,
    source_root: PathBuf,
    out_dir: PathBuf,
}

impl<'a, S: DoctreeSource + ?Sized> DocxBuilder<'a, S> {
    /// `source_root` resolves picture paths and the configured template
    pub fn new(source: &'a S, config: &'a Config, source_root: impl Into<PathBuf>) -> Self {
        let source_root = source_root.into();
        Self {
            source,
            config,
            out_dir: source_root.join("_build"),
            source_root,
        }
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// Output file of a document
    pub fn target_path(&self, document: &OutputDocument) -> PathBuf {
        self.out_dir.join(format!("{}.docx", document.name))
    }

    /// Build and write every output document
    pub fn build(&self) -> Result<BuildReport> {
        let figures = self.source.figure_numbers()?;
        let mut report = BuildReport::default();

        for document in self.config.output_documents() {
            let Assembly {
                tree, diagnostics, ..
            } = self.assemble(&document)?;
            report.diagnostics.extend(diagnostics);

            let mut docx = DocxDocument::from_template(self.template()?)?;
            docx.set_core_properties(&document.core_properties);
            translate(
                &tree,
                &mut docx,
                &figures,
                self.config,
                &self.source_root,
            )?;

            let path = self.target_path(&document);
            tracing::info!(name = %document.name, path = %path.display(), "writing");
            match write_document(&docx, &path) {
                Ok(()) => report.written.push(path),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not write document");
                    report.diagnostics.push(
                        Diagnostic::warning(format!("could not write {}: {}", path.display(), e))
                            .with_code(CODE_WRITE_FAILED)
                            .with_file(path.display().to_string()),
                    );
                    report.failed.push(path);
                }
            }
        }
        Ok(report)
    }

    /// Translate every output document in memory and return the journals
    pub fn dry_run(&self) -> Result<Vec<DryRun>> {
        let figures = self.source.figure_numbers()?;
        let block_width = self.template()?.block_width();

        self.config
            .output_documents()
            .into_iter()
            .map(|document| {
                let assembly = self.assemble(&document)?;
                let mut model = MemoryDocument::new().with_block_width(block_width);
                translate(
                    &assembly.tree,
                    &mut model,
                    &figures,
                    self.config,
                    &self.source_root,
                )?;
                Ok(DryRun {
                    name: document.name,
                    docnames: assembly.docnames,
                    journal: model.journal().to_vec(),
                })
            })
            .collect()
    }

    fn assemble(&self, document: &OutputDocument) -> Result<Assembly> {
        let assembly = Assembler::new(self.source)
            .with_merged_target(format!("{}.docx", self.config.master_doc))
            .assemble(&document.start)?;
        for diagnostic in assembly.diagnostics.iter() {
            diagnostic.emit();
        }
        Ok(assembly)
    }

    fn template(&self) -> Result<Template> {
        match &self.config.style {
            Some(style) => Template::load(self.source_root.join(style)),
            None => Template::builtin(),
        }
    }
}

fn write_document(docx: &DocxDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    docx.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OoxmlError;
    use crate::test_utils::part_of;
    use tempfile::TempDir;
    use treedocx_ast::{Node, NodeKind};
    use treedocx_core::MemoryStore;

    fn store() -> MemoryStore {
        let toctree = Node::new(NodeKind::Toctree).with_attr("includefiles", vec!["intro"]);
        let index = Node::new(NodeKind::Document).with_child(
            Node::new(NodeKind::Section)
                .with_child(Node::new(NodeKind::Title).with_child(Node::text("Manual")))
                .with_child(Node::new(NodeKind::Compound).with_child(toctree)),
        );
        let intro = Node::new(NodeKind::Document).with_child(
            Node::new(NodeKind::Section)
                .with_child(Node::new(NodeKind::Title).with_child(Node::text("Intro")))
                .with_child(Node::new(NodeKind::Paragraph).with_child(Node::text("Hello"))),
        );
        MemoryStore::new()
            .with_tree("index", index)
            .with_tree("intro", intro)
    }

    #[test]
    fn test_build_writes_document() {
        let dir = TempDir::new().unwrap();
        let store = store();
        let config = Config::default();
        let report = DocxBuilder::new(&store, &config, dir.path())
            .with_out_dir(dir.path().join("out"))
            .build()
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.written, vec![dir.path().join("out/Project.docx")]);
        let bytes = std::fs::read(&report.written[0]).unwrap();
        let document = part_of(&bytes, "word/document.xml");
        assert!(document.contains("Manual"));
        assert!(document.contains("Hello"));
    }

    #[test]
    fn test_write_failure_is_warning() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let store = store();
        let config = Config::default();

        let report = DocxBuilder::new(&store, &config, dir.path())
            .with_out_dir(&blocker)
            .build()
            .unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.diagnostics.count_code(CODE_WRITE_FAILED), 1);
    }

    #[test]
    fn test_dry_run_lists_inlined_documents() {
        let store = store();
        let config = Config::default();
        let runs = DocxBuilder::new(&store, &config, ".").dry_run().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].docnames, vec!["index", "intro"]);
        assert!(runs[0]
            .journal
            .iter()
            .any(|m| matches!(m, Mutation::AddHeading { text, .. } if text == "Intro")));
    }

    #[test]
    fn test_translation_error_aborts() {
        let store = MemoryStore::new().with_tree(
            "index",
            Node::new(NodeKind::Document).with_child(Node::new(NodeKind::from_name("plot"))),
        );
        let config = Config::default();
        let err = DocxBuilder::new(&store, &config, ".").dry_run().unwrap_err();
        assert!(matches!(err, OoxmlError::UnimplementedNode(name) if name == "plot"));
    }
}
