//! Template-backed Word document
//!
//! The template contributes styles, numbering definitions, relationships,
//! page setup and any parts the translator never touches (headers, footers,
//! themes). Its body is replaced by the translated content.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use super::{BodyArena, BodyItem, DocumentModel, Mutation, PictureId, RunContent, RunId, TableId};
use super::{BreakKind, ParagraphId};
use crate::archive::{
    OoxmlArchive, CONTENT_TYPES_PART, CORE_PROPS_PART, DOCUMENT_PART, DOCUMENT_RELS_PART,
    NUMBERING_PART,
};
use crate::core_props;
use crate::error::{OoxmlError, Result};
use crate::image::{content_type, emu_to_twips, probe_bytes};
use crate::numbering::{NumId, NumberingPart, NumberingTemplate};
use crate::relationships::Relationships;
use crate::styles::{ResolvedStyles, StyleRole};
use crate::template::Template;
use crate::xml::escape_xml;

const NUMBERING_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";

/// A Word document under construction
#[derive(Debug, Clone)]
pub struct DocxDocument {
    arena: BodyArena,
    archive: OoxmlArchive,
    styles: ResolvedStyles,
    numbering: NumberingPart,
    relationships: Relationships,
    /// Embedded media, by source path: (relationship id, extension)
    media: HashMap<PathBuf, (String, String)>,
    /// Relationship id per picture handle
    picture_rels: Vec<String>,
    block_width: i64,
    section_properties: Option<String>,
    core_properties: BTreeMap<String, String>,
    continuation: Option<NumId>,
}

impl DocxDocument {
    /// Start a document from a template.
    ///
    /// Fails when the template lacks a required style.
    pub fn from_template(template: Template) -> Result<Self> {
        let styles = ResolvedStyles::resolve(template.styles())?;
        let numbering = template.numbering()?;
        let mut relationships = template.relationships()?;
        if relationships
            .find_by_type(Relationships::TYPE_NUMBERING)
            .is_none()
        {
            relationships.add("numbering.xml", Relationships::TYPE_NUMBERING);
        }
        let block_width = template.block_width();
        let section_properties = template.section_properties();

        Ok(Self {
            arena: BodyArena::new(),
            archive: template.into_archive(),
            styles,
            numbering,
            relationships,
            media: HashMap::new(),
            picture_rels: Vec::new(),
            block_width,
            section_properties,
            core_properties: BTreeMap::new(),
            continuation: None,
        })
    }

    /// Start a document from the built-in template
    pub fn builtin() -> Result<Self> {
        Self::from_template(Template::builtin()?)
    }

    /// Metadata written to docProps/core.xml on save
    pub fn set_core_properties(&mut self, properties: &BTreeMap<String, String>) {
        self.core_properties
            .extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn styles(&self) -> &ResolvedStyles {
        &self.styles
    }

    /// Write the package to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "saving document");
        self.package()?.write_to_file(path)
    }

    /// Serialize the package into memory
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.package()?.to_bytes()
    }

    fn package(&self) -> Result<OoxmlArchive> {
        let mut archive = self.archive.clone();
        archive.set_string(DOCUMENT_PART, self.document_xml()?);
        archive.set_string(NUMBERING_PART, self.numbering.to_xml());
        archive.set_string(DOCUMENT_RELS_PART, self.relationships.to_xml());

        let content_types = archive
            .get_string(CONTENT_TYPES_PART)
            .ok_or_else(|| OoxmlError::MissingFile(CONTENT_TYPES_PART.to_string()))?;
        archive.set_string(CONTENT_TYPES_PART, self.content_types(content_types));

        if !self.core_properties.is_empty() {
            let core = core_props::apply(
                archive.get_string(CORE_PROPS_PART).as_deref(),
                &self.core_properties,
            )?;
            archive.set_string(CORE_PROPS_PART, core);
        }
        Ok(archive)
    }

    fn content_types(&self, mut xml: String) -> String {
        let extensions: BTreeSet<&str> = self.media.values().map(|(_, ext)| ext.as_str()).collect();
        for ext in extensions {
            if !xml.contains(&format!("Extension=\"{}\"", ext)) {
                xml = xml.replace(
                    "</Types>",
                    &format!(
                        "  <Default Extension=\"{}\" ContentType=\"{}\"/>\n</Types>",
                        ext,
                        content_type(ext)
                    ),
                );
            }
        }
        if !xml.contains("/word/numbering.xml") {
            xml = xml.replace(
                "</Types>",
                &format!(
                    "  <Override PartName=\"/word/numbering.xml\" ContentType=\"{}\"/>\n</Types>",
                    NUMBERING_CONTENT_TYPE
                ),
            );
        }
        xml
    }

    // ===== document.xml =====

    /// The main document part
    pub fn document_xml(&self) -> Result<String> {
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        out.push_str(r#"<w:document "#);
        out.push_str(r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#);
        out.push_str(
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        );
        out.push_str(
            r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
        );
        out.push_str(r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
        out.push_str(r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#);
        out.push('\n');
        out.push_str("<w:body>\n");

        self.write_items(self.arena.body(), &mut out)?;
        if let Some(sect) = &self.section_properties {
            out.push_str(sect);
            out.push('\n');
        }

        out.push_str("</w:body>\n");
        out.push_str("</w:document>");
        Ok(out)
    }

    fn write_items(&self, items: &[BodyItem], out: &mut String) -> Result<()> {
        for item in items {
            match item {
                BodyItem::Paragraph(p) => self.write_paragraph(*p, out)?,
                BodyItem::Table(t) => self.write_table(*t, out)?,
            }
        }
        Ok(())
    }

    fn write_paragraph(&self, id: ParagraphId, out: &mut String) -> Result<()> {
        let paragraph = self.arena.paragraph(id)?;
        out.push_str("<w:p>");

        let mut props = String::new();
        if let Some(style) = paragraph.style.and_then(|role| self.styles.id(role)) {
            props.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape_xml(style)));
        }
        if paragraph.keep_with_next {
            props.push_str("<w:keepNext/>");
        }
        if let Some((level, num)) = paragraph.numbering {
            props.push_str(&format!(
                r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                level, num.0
            ));
        }
        if let Some(alignment) = paragraph.alignment {
            props.push_str(&format!(r#"<w:jc w:val="{}"/>"#, alignment.as_ooxml()));
        }
        if !props.is_empty() {
            out.push_str("<w:pPr>");
            out.push_str(&props);
            out.push_str("</w:pPr>");
        }

        for run in &paragraph.runs {
            self.write_run(*run, out)?;
        }
        out.push_str("</w:p>\n");
        Ok(())
    }

    fn write_run(&self, id: RunId, out: &mut String) -> Result<()> {
        let run = self.arena.run(id)?;
        out.push_str("<w:r>");
        if let Some(style) = run.style.and_then(|role| self.styles.id(role)) {
            out.push_str(&format!(
                r#"<w:rPr><w:rStyle w:val="{}"/></w:rPr>"#,
                escape_xml(style)
            ));
        }
        for content in &run.content {
            match content {
                RunContent::Text(text) => write_text(text, out),
                RunContent::Break(BreakKind::Line) => out.push_str("<w:br/>"),
                RunContent::Break(BreakKind::Page) => out.push_str(r#"<w:br w:type="page"/>"#),
                RunContent::Picture(picture) => self.write_drawing(*picture, out)?,
            }
        }
        out.push_str("</w:r>");
        Ok(())
    }

    fn write_drawing(&self, id: PictureId, out: &mut String) -> Result<()> {
        let picture = self.arena.picture(id)?;
        let rel_id = self
            .picture_rels
            .get(id.0)
            .ok_or(OoxmlError::InvalidHandle {
                kind: "picture",
                index: id.0,
            })?;
        let drawing_id = id.0 + 1;
        let name = format!("Picture {}", drawing_id);
        let descr = picture
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        out.push_str("<w:drawing>");
        out.push_str(r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#);
        out.push_str(&format!(
            r#"<wp:extent cx="{}" cy="{}"/>"#,
            picture.width, picture.height
        ));
        out.push_str(r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#);
        out.push_str(&format!(
            r#"<wp:docPr id="{}" name="{}" descr="{}"/>"#,
            drawing_id,
            escape_xml(&name),
            escape_xml(&descr)
        ));
        out.push_str(
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
        );
        out.push_str(r#"<a:graphic>"#);
        out.push_str(
            r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
        );
        out.push_str("<pic:pic>");
        out.push_str(&format!(
            r#"<pic:nvPicPr><pic:cNvPr id="{}" name="{}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            drawing_id,
            escape_xml(&name)
        ));
        out.push_str(&format!(
            r#"<pic:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            rel_id
        ));
        out.push_str(&format!(
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            picture.width, picture.height
        ));
        out.push_str("</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>");
        Ok(())
    }

    fn write_table(&self, id: TableId, out: &mut String) -> Result<()> {
        let table = self.arena.table(id)?;
        let grid = &table.grid;

        out.push_str("<w:tbl><w:tblPr>");
        if let Some(style) = table.style.and_then(|role| self.styles.id(role)) {
            out.push_str(&format!(r#"<w:tblStyle w:val="{}"/>"#, escape_xml(style)));
        }
        out.push_str(r#"<w:tblW w:w="0" w:type="auto"/>"#);
        if let Some(alignment) = table.alignment {
            out.push_str(&format!(r#"<w:jc w:val="{}"/>"#, alignment.as_ooxml()));
        }
        out.push_str(r#"<w:tblLook w:val="04A0" w:firstRow="1" w:lastRow="0" w:firstColumn="1" w:lastColumn="0" w:noHBand="0" w:noVBand="1"/>"#);
        out.push_str("</w:tblPr>\n");

        let columns = self.column_widths(id)?;
        out.push_str("<w:tblGrid>");
        for width in &columns {
            out.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, emu_to_twips(*width)));
        }
        out.push_str("</w:tblGrid>\n");

        for row in 0..grid.rows() {
            out.push_str("<w:tr>");
            if row < table.header_rows {
                out.push_str("<w:trPr><w:tblHeader/></w:trPr>");
            }
            for col in 0..grid.cols() {
                let cell_id = grid.get(row, col).ok_or(OoxmlError::InvalidHandle {
                    kind: "cell position",
                    index: row,
                })?;
                let span = grid.span(cell_id).ok_or(OoxmlError::InvalidHandle {
                    kind: "cell",
                    index: cell_id.0,
                })?;
                if col != span.col {
                    continue;
                }
                let cell = self.arena.cell_data(cell_id)?;

                out.push_str("<w:tc><w:tcPr>");
                if table.autofit {
                    out.push_str(r#"<w:tcW w:w="0" w:type="auto"/>"#);
                } else {
                    let width = cell
                        .width
                        .unwrap_or_else(|| columns[span.col..span.col + span.cols].iter().sum());
                    out.push_str(&format!(
                        r#"<w:tcW w:w="{}" w:type="dxa"/>"#,
                        emu_to_twips(width)
                    ));
                }
                if span.cols > 1 {
                    out.push_str(&format!(r#"<w:gridSpan w:val="{}"/>"#, span.cols));
                }
                if span.rows > 1 {
                    if row == span.row {
                        out.push_str(r#"<w:vMerge w:val="restart"/>"#);
                    } else {
                        out.push_str("<w:vMerge/>");
                    }
                }
                out.push_str("</w:tcPr>");

                if row == span.row {
                    self.write_items(&cell.items, out)?;
                    if !matches!(cell.items.last(), Some(BodyItem::Paragraph(_))) {
                        out.push_str("<w:p/>");
                    }
                } else {
                    out.push_str("<w:p/>");
                }
                out.push_str("</w:tc>");
            }
            out.push_str("</w:tr>\n");
        }
        out.push_str("</w:tbl>\n");
        Ok(())
    }

    /// Grid column widths in EMUs: explicit single-column widths from the
    /// first row that has them, an even split of the text width otherwise
    fn column_widths(&self, id: TableId) -> Result<Vec<i64>> {
        let grid = &self.arena.table(id)?.grid;
        let even = self.block_width / grid.cols().max(1) as i64;
        let mut widths = Vec::with_capacity(grid.cols());
        for col in 0..grid.cols() {
            let mut width = None;
            for row in 0..grid.rows() {
                let explicit = grid
                    .get(row, col)
                    .filter(|cell| grid.span(*cell).map_or(false, |s| s.cols == 1))
                    .and_then(|cell| self.arena.cell_data(cell).ok())
                    .and_then(|cell| cell.width);
                if explicit.is_some() {
                    width = explicit;
                    break;
                }
            }
            widths.push(width.unwrap_or(even));
        }
        Ok(widths)
    }

    fn embed_media(&mut self, path: &Path) -> Result<(String, i64, i64)> {
        let bytes = std::fs::read(path).map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "picture unreadable");
            OoxmlError::MissingFile(path.display().to_string())
        })?;
        let info = probe_bytes(&bytes).map_err(|e| match e {
            OoxmlError::Image { source, .. } => OoxmlError::Image {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        let (width, height) = info.size_emu();

        if let Some((rel_id, _)) = self.media.get(path) {
            return Ok((rel_id.clone(), width, height));
        }

        let mut index = self.media.len() + 1;
        let mut target = format!("media/treedocx{}.{}", index, info.extension);
        while self.archive.contains(&format!("word/{}", target)) {
            index += 1;
            target = format!("media/treedocx{}.{}", index, info.extension);
        }
        self.archive.set(format!("word/{}", target), bytes);
        let rel_id = self
            .relationships
            .add(target.as_str(), Relationships::TYPE_IMAGE);
        tracing::debug!(path = %path.display(), %target, "embedded picture");
        self.media
            .insert(path.to_path_buf(), (rel_id.clone(), info.extension));
        Ok((rel_id, width, height))
    }
}

/// Text content of a run; line feeds and tabs become their own elements
fn write_text(text: &str, out: &mut String) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        for (j, segment) in line.split('\t').enumerate() {
            if j > 0 {
                out.push_str("<w:tab/>");
            }
            if !segment.is_empty() {
                out.push_str(&format!(
                    r#"<w:t xml:space="preserve">{}</w:t>"#,
                    escape_xml(segment)
                ));
            }
        }
    }
}

impl DocumentModel for DocxDocument {
    fn arena(&self) -> &BodyArena {
        &self.arena
    }

    fn arena_mut(&mut self) -> &mut BodyArena {
        &mut self.arena
    }

    fn allocate_numbering(&mut self, template: NumberingTemplate) -> NumId {
        let num = self.numbering.allocate(template);
        self.arena
            .record(Mutation::AllocateNumbering { num, template });
        num
    }

    fn continuation_numbering(&mut self) -> NumId {
        match self.continuation {
            Some(num) => num,
            None => {
                let num = self.numbering.shared(NumberingTemplate::Continuation);
                self.arena.record(Mutation::AllocateNumbering {
                    num,
                    template: NumberingTemplate::Continuation,
                });
                self.continuation = Some(num);
                num
            }
        }
    }

    fn add_picture(&mut self, run: RunId, path: &Path) -> Result<PictureId> {
        let (rel_id, width, height) = self.embed_media(path)?;
        let picture = self
            .arena
            .add_picture(run, path.to_path_buf(), width, height)?;
        self.picture_rels.push(rel_id);
        Ok(picture)
    }

    fn block_width(&self) -> i64 {
        self.block_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::STYLES_PART;
    use crate::model::Container;
    use crate::test_utils::{part_of, png_bytes};
    use treedocx_ast::Alignment;

    #[test]
    fn test_paragraph_properties_order() {
        let mut doc = DocxDocument::builtin().unwrap();
        let num = doc.allocate_numbering(NumberingTemplate::Bullet);
        let p = doc
            .add_paragraph(Container::Body, "item", Some(StyleRole::LiteralBlock))
            .unwrap();
        doc.set_keep_with_next(p).unwrap();
        doc.set_numbering(p, 0, num).unwrap();
        doc.set_alignment(p, Alignment::Center).unwrap();

        let xml = doc.document_xml().unwrap();
        assert!(xml.contains(&format!(
            r#"<w:pPr><w:pStyle w:val="LiteralBlock"/><w:keepNext/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="{}"/></w:numPr><w:jc w:val="center"/></w:pPr>"#,
            num.0
        )));
        assert!(xml.contains(r#"<w:t xml:space="preserve">item</w:t>"#));
    }

    #[test]
    fn test_heading_styles() {
        let mut doc = DocxDocument::builtin().unwrap();
        doc.add_heading("Manual", 0);
        doc.add_heading("Intro", 1);
        let xml = doc.document_xml().unwrap();
        assert!(xml.contains(r#"<w:pStyle w:val="Title"/>"#));
        assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/>"#));
    }

    #[test]
    fn test_run_text_escaping_and_breaks() {
        let mut doc = DocxDocument::builtin().unwrap();
        let p = doc.add_paragraph(Container::Body, "", None).unwrap();
        let r = doc.add_run(p, "a < b\n\tc", Some(StyleRole::Literal)).unwrap();
        doc.add_break(r, BreakKind::Page).unwrap();
        let xml = doc.document_xml().unwrap();
        assert!(xml.contains(
            r#"<w:r><w:rPr><w:rStyle w:val="Literal"/></w:rPr><w:t xml:space="preserve">a &lt; b</w:t><w:br/><w:tab/><w:t xml:space="preserve">c</w:t><w:br w:type="page"/></w:r>"#
        ));
    }

    #[test]
    fn test_table_with_merges() {
        let mut doc = DocxDocument::builtin().unwrap();
        let table = doc.add_table(Container::Body, 3, 3).unwrap();
        doc.merge_cells(table, (0, 0), (1, 1)).unwrap();
        doc.set_table_style(table, StyleRole::TableWithHeader).unwrap();
        doc.mark_header_rows(table, 1).unwrap();
        doc.autofit_cells(table).unwrap();

        let xml = doc.document_xml().unwrap();
        assert!(xml.contains(r#"<w:tblStyle w:val="TableGridHeader"/>"#));
        assert_eq!(xml.matches("<w:tblHeader/>").count(), 1);
        assert_eq!(xml.matches(r#"<w:gridSpan w:val="2"/>"#).count(), 2);
        assert_eq!(xml.matches(r#"<w:vMerge w:val="restart"/>"#).count(), 1);
        assert_eq!(xml.matches("<w:vMerge/>").count(), 1);
        // 9 positions, 3 covered by the 2x2 span's gridSpan
        assert_eq!(xml.matches("<w:tc>").count(), 7);
        assert_eq!(xml.matches("<w:gridCol ").count(), 3);
    }

    #[test]
    fn test_cell_widths_in_twips() {
        let mut doc = DocxDocument::builtin().unwrap();
        let table = doc.add_table(Container::Body, 1, 2).unwrap();
        let left = doc.cell(table, 0, 0).unwrap();
        doc.set_cell_width(left, 635 * 1000).unwrap();
        let xml = doc.document_xml().unwrap();
        assert!(xml.contains(r#"<w:gridCol w:w="1000"/>"#));
        assert!(xml.contains(r#"<w:tcW w:w="1000" w:type="dxa"/>"#));
    }

    #[test]
    fn test_picture_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, png_bytes(10, 5)).unwrap();

        let mut doc = DocxDocument::builtin().unwrap();
        let p = doc.add_paragraph(Container::Body, "", None).unwrap();
        let r = doc.add_run(p, "", None).unwrap();
        let picture = doc.add_picture(r, &path).unwrap();
        assert_eq!(doc.picture_size(picture).unwrap(), (95250, 47625));

        let bytes = doc.to_bytes().unwrap();
        let archive = OoxmlArchive::from_reader(std::io::Cursor::new(bytes.clone())).unwrap();
        assert!(archive.contains("word/media/treedocx1.png"));
        let rels = part_of(&bytes, DOCUMENT_RELS_PART);
        assert!(rels.contains(r#"Target="media/treedocx1.png""#));
        let types = part_of(&bytes, CONTENT_TYPES_PART);
        assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        let document = part_of(&bytes, DOCUMENT_PART);
        assert!(document.contains(r#"<wp:extent cx="95250" cy="47625"/>"#));
        assert!(document.contains(r#"descr="logo.png""#));
    }

    #[test]
    fn test_package_parts() {
        let mut doc = DocxDocument::builtin().unwrap();
        let mut props = BTreeMap::new();
        props.insert("title".to_string(), "User Guide".to_string());
        doc.set_core_properties(&props);
        doc.allocate_numbering(NumberingTemplate::Enumerated);

        let bytes = doc.to_bytes().unwrap();
        assert!(part_of(&bytes, CORE_PROPS_PART).contains("<dc:title>User Guide</dc:title>"));
        assert!(part_of(&bytes, NUMBERING_PART).contains(r#"<w:abstractNumId w:val="15"/>"#));
        assert!(part_of(&bytes, CONTENT_TYPES_PART).contains("/word/numbering.xml"));
        assert!(part_of(&bytes, DOCUMENT_RELS_PART).contains(r#"Target="numbering.xml""#));
        assert!(part_of(&bytes, DOCUMENT_PART).contains("<w:sectPr>"));
        assert!(!part_of(&bytes, STYLES_PART).is_empty());
    }

    #[test]
    fn test_missing_required_style() {
        let mut archive = Template::builtin().unwrap().into_archive();
        archive.set_string(
            crate::archive::STYLES_PART,
            r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#,
        );
        let template = Template::from_archive(archive).unwrap();
        match DocxDocument::from_template(template) {
            Err(OoxmlError::MissingStyles(missing)) => {
                assert!(missing.contains(&"Title".to_string()));
                assert!(missing.contains(&"heading 6".to_string()));
                assert!(!missing.contains(&"heading 7".to_string()));
            }
            other => panic!("expected missing styles, got {:?}", other.map(|_| ())),
        }
    }
}
