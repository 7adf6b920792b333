//! Minimal WordprocessingML (`.docx`) writer.
//!
//! A generated document has a Heading 1 title, the definition as a lead
//! paragraph, then one paragraph per styled block. List items use the
//! `List Bullet` / `List Number` styles backed by `numbering.xml`.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use contentfactory_shared::{BlockKind, ContentFactoryError, Result, StyledBlock};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Everything that goes into one topic's document.
#[derive(Debug, Clone)]
pub struct ArticleDocument {
    /// Document title (the H1 keyword).
    pub title: String,
    /// Lead paragraph (the definition); skipped when blank.
    pub lead: String,
    pub blocks: Vec<StyledBlock>,
}

/// Document-writing collaborator.
pub trait DocumentWriter: Send + Sync {
    /// File extension of produced documents, without the dot.
    fn extension(&self) -> &'static str;

    /// Write `doc` to `dest`, replacing any existing file.
    fn write(&self, doc: &ArticleDocument, dest: &Path) -> Result<()>;
}

/// Writes `.docx` packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxWriter;

impl DocumentWriter for DocxWriter {
    fn extension(&self) -> &'static str {
        "docx"
    }

    #[instrument(skip_all, fields(title = %doc.title, dest = %dest.display()))]
    fn write(&self, doc: &ArticleDocument, dest: &Path) -> Result<()> {
        let file = File::create(dest).map_err(|e| ContentFactoryError::io(dest, e))?;
        let mut out = BufWriter::new(file);
        write_docx(&mut out, doc)?;
        out.flush().map_err(|e| ContentFactoryError::io(dest, e))?;
        debug!(blocks = doc.blocks.len(), "document written");
        Ok(())
    }
}

/// Write a complete `.docx` package for `doc` into `sink`.
pub fn write_docx<W: Write + Seek>(sink: W, doc: &ArticleDocument) -> Result<()> {
    let parts: [(&str, Vec<u8>); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes().to_vec()),
        ("docProps/core.xml", core_properties(&doc.title)?),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes().to_vec()),
        ("word/styles.xml", styles().into_bytes()),
        ("word/numbering.xml", NUMBERING.as_bytes().to_vec()),
        ("word/document.xml", document_xml(doc)?),
    ];

    let mut zip = ZipWriter::new(sink);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in parts {
        zip.start_file(name, options).map_err(zip_err)?;
        zip.write_all(&bytes)
            .map_err(|e| ContentFactoryError::Artifact(format!("failed to write {name}: {e}")))?;
    }
    zip.finish().map_err(zip_err)?;
    Ok(())
}

/// Paragraph style id for a block kind (`None` = Normal).
fn style_for(kind: BlockKind) -> Option<&'static str> {
    match kind {
        BlockKind::Heading1 => Some("Heading1"),
        BlockKind::Heading2 => Some("Heading2"),
        BlockKind::Heading3 => Some("Heading3"),
        BlockKind::Heading4 => Some("Heading4"),
        BlockKind::Paragraph => None,
        BlockKind::BulletItem => Some("ListBullet"),
        BlockKind::NumberedItem => Some("ListNumber"),
    }
}

// ---------------------------------------------------------------------------
// XML parts built with quick-xml
// ---------------------------------------------------------------------------

fn document_xml(doc: &ArticleDocument) -> Result<Vec<u8>> {
    let mut w = Writer::new(Vec::new());
    decl(&mut w)?;
    emit(&mut w, Event::Start(BytesStart::new("w:document").with_attributes([("xmlns:w", W_NS)])))?;
    emit(&mut w, Event::Start(BytesStart::new("w:body")))?;

    paragraph(&mut w, style_for(BlockKind::Heading1), &doc.title)?;
    if !doc.lead.trim().is_empty() {
        paragraph(&mut w, None, doc.lead.trim())?;
    }
    for block in &doc.blocks {
        paragraph(&mut w, style_for(block.kind), &block.text)?;
    }

    emit(&mut w, Event::Start(BytesStart::new("w:sectPr")))?;
    emit(
        &mut w,
        Event::Empty(BytesStart::new("w:pgSz").with_attributes([("w:w", "12240"), ("w:h", "15840")])),
    )?;
    emit(
        &mut w,
        Event::Empty(BytesStart::new("w:pgMar").with_attributes([
            ("w:top", "1440"),
            ("w:right", "1440"),
            ("w:bottom", "1440"),
            ("w:left", "1440"),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ])),
    )?;
    emit(&mut w, Event::End(BytesEnd::new("w:sectPr")))?;

    emit(&mut w, Event::End(BytesEnd::new("w:body")))?;
    emit(&mut w, Event::End(BytesEnd::new("w:document")))?;
    Ok(w.into_inner())
}

fn paragraph(w: &mut Writer<Vec<u8>>, style: Option<&str>, text: &str) -> Result<()> {
    emit(w, Event::Start(BytesStart::new("w:p")))?;
    if let Some(style) = style {
        emit(w, Event::Start(BytesStart::new("w:pPr")))?;
        emit(w, Event::Empty(BytesStart::new("w:pStyle").with_attributes([("w:val", style)])))?;
        emit(w, Event::End(BytesEnd::new("w:pPr")))?;
    }
    emit(w, Event::Start(BytesStart::new("w:r")))?;
    emit(
        w,
        Event::Start(BytesStart::new("w:t").with_attributes([("xml:space", "preserve")])),
    )?;
    emit(w, Event::Text(BytesText::new(text)))?;
    emit(w, Event::End(BytesEnd::new("w:t")))?;
    emit(w, Event::End(BytesEnd::new("w:r")))?;
    emit(w, Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn core_properties(title: &str) -> Result<Vec<u8>> {
    let created = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut w = Writer::new(Vec::new());
    decl(&mut w)?;
    emit(
        &mut w,
        Event::Start(BytesStart::new("cp:coreProperties").with_attributes([
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ])),
    )?;
    text_element(&mut w, BytesStart::new("dc:title"), title)?;
    text_element(&mut w, BytesStart::new("dc:creator"), "Content Factory")?;
    text_element(
        &mut w,
        BytesStart::new("dcterms:created").with_attributes([("xsi:type", "dcterms:W3CDTF")]),
        &created,
    )?;
    emit(&mut w, Event::End(BytesEnd::new("cp:coreProperties")))?;
    Ok(w.into_inner())
}

fn text_element(w: &mut Writer<Vec<u8>>, start: BytesStart<'_>, text: &str) -> Result<()> {
    let end = start.to_end().into_owned();
    emit(w, Event::Start(start))?;
    emit(w, Event::Text(BytesText::new(text)))?;
    emit(w, Event::End(end))?;
    Ok(())
}

fn decl(w: &mut Writer<Vec<u8>>) -> Result<()> {
    emit(w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
}

fn emit(w: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    w.write_event(event)
        .map_err(|e| ContentFactoryError::Artifact(format!("xml write failed: {e}")))
}

fn zip_err(e: zip::result::ZipError) -> ContentFactoryError {
    ContentFactoryError::Artifact(format!("docx packaging failed: {e}"))
}

// ---------------------------------------------------------------------------
// Static parts
// ---------------------------------------------------------------------------

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

// numId 1 = bullets, numId 2 = decimal
const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num><w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num></w:numbering>"#;

/// `styles.xml` with Normal, Heading 1-4 and the two list styles.
fn styles() -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
    );

    for (level, size) in [(1u8, 36u8), (2, 30), (3, 26), (4, 24)] {
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="{}"/></w:pPr><w:rPr><w:b/><w:sz w:val="{size}"/></w:rPr></w:style>"#,
            level - 1
        ));
    }

    for (id, name, num_id) in [("ListBullet", "List Bullet", 1u8), ("ListNumber", "List Number", 2)] {
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="{name}"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="{num_id}"/></w:numPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:style>"#
        ));
    }

    xml.push_str("</w:styles>");
    xml
}
