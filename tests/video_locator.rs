//! Integration tests for video resolution against mapping tables loaded from
//! CSV and XLSX, remote folder listings, and a local video root.

use std::io::{Cursor, Write};

use mos_annotate::{
    AnnotateError, FolderIndex, MappingRow, MappingSource, MappingTable, PlayableRef, RemoteFile,
    StaticFolderLister, VideoLocator, resolve,
};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn url_of(playable: Option<&PlayableRef>) -> Option<&str> {
    match playable {
        Some(PlayableRef::DirectUrl { url }) => Some(url.as_str()),
        _ => None,
    }
}

/// Minimal single-sheet workbook using inline strings.
fn workbook(rows: &[&[&str]]) -> Vec<u8> {
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            let column = char::from(b'A' + c as u8);
            sheet.push_str(&format!(
                r#"<c r="{column}{}" t="inlineStr"><is><t>{value}</t></is></c>"#,
                r + 1
            ));
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let parts = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="mapping" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
        ),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, body) in parts {
        writer.start_file(name, options).expect("start part");
        writer.write_all(body.as_bytes()).expect("write part");
    }
    writer.finish().expect("finish workbook").into_inner()
}

#[test]
fn derived_variant_wins_over_literal_name() {
    let mapping = MappingTable::from_rows(vec![
        MappingRow::new("clip01.mp4", Some("video"), Some("https://literal/clip01.mp4"), None),
        MappingRow::new("clip01__cv2.mp4", Some("video"), Some("https://derived/clip01.mp4"), None),
    ]);
    let resolution = resolve("/data/clip01.mp4", Some(&mapping));
    assert_eq!(resolution.display_name, "clip01.mp4");
    assert_eq!(
        url_of(resolution.playable.as_ref()),
        Some("https://derived/clip01.mp4")
    );
}

#[test]
fn direct_url_without_mapping_is_returned_verbatim() {
    let resolution = resolve("https://cdn/a.mp4", None);
    assert_eq!(url_of(resolution.playable.as_ref()), Some("https://cdn/a.mp4"));
    assert_eq!(resolution.display_name, "a.mp4");
}

#[test]
fn unknown_name_with_empty_mapping_is_unresolved() {
    let mapping = MappingTable::default();
    let resolution = resolve("nothing_here.mp4", Some(&mapping));
    assert!(!resolution.is_resolved());
    assert_eq!(resolution.display_name, "nothing_here.mp4");
    assert!(
        resolution
            .guidance()
            .is_some_and(|text| text.contains("nothing_here.mp4"))
    );
}

#[test]
fn csv_mapping_with_file_ids_resolves_to_cloud_previews() {
    let csv = b"\xef\xbb\xbfName,Type,URL,file_id\n\
                clip02.mp4,video,,abc123\n\
                notes.txt,document,https://x/notes,\n\
                clip03__cv2.mp4,,https://cdn/clip03_v2.mp4,\n";
    let mapping = MappingSource::blob("mapping.csv", csv.to_vec())
        .load()
        .expect("csv mapping");
    assert_eq!(mapping.len(), 3);

    let locator = VideoLocator::new().with_mapping(mapping);
    let preview = locator.resolve("clips/clip02.mp4");
    assert_eq!(
        preview.playable,
        Some(PlayableRef::CloudPreview {
            file_id: "abc123".into()
        })
    );
    assert_eq!(
        preview.playable.as_ref().and_then(PlayableRef::embed_url).as_deref(),
        Some("https://drive.google.com/file/d/abc123/preview")
    );

    // Rows without a type count as video.
    let derived = locator.resolve("clip03.mp4");
    assert_eq!(url_of(derived.playable.as_ref()), Some("https://cdn/clip03_v2.mp4"));

    // Non-video rows never match.
    assert!(!locator.resolve("notes.txt").is_resolved());
}

#[test]
fn mapping_without_a_name_column_is_rejected() {
    let err = MappingSource::blob("bad.csv", b"url,file_id\nhttps://a,\n".to_vec())
        .load()
        .expect_err("no name column");
    assert!(matches!(err, AnnotateError::InvalidMapping { .. }));
}

#[test]
fn strict_mapping_rejects_repeated_names() {
    let csv = b"name,url\nclip.mp4,https://first\nclip.mp4,https://second\n".to_vec();

    let lenient = MappingSource::blob("m.csv", csv.clone()).load().expect("lenient");
    assert_eq!(lenient.duplicate_names(), ["clip.mp4".to_string()]);
    assert_eq!(
        url_of(resolve("clip.mp4", Some(&lenient)).playable.as_ref()),
        Some("https://first")
    );

    let err = MappingSource::blob("m.csv", csv)
        .strict(true)
        .load()
        .expect_err("strict");
    assert!(matches!(err, AnnotateError::InvalidMapping { .. }));
}

#[test]
fn xlsx_mapping_loads_from_the_first_sheet() {
    let bytes = workbook(&[
        &["name", "type", "url", "file_id"],
        &["clip04.mp4", "video", "https://cdn/clip04.mp4", ""],
        &["clip05__cv2.mp4", "video", "", "xyz789"],
    ]);
    let mapping = MappingSource::blob("mapping.xlsx", bytes)
        .load()
        .expect("xlsx mapping");
    assert_eq!(mapping.len(), 2);

    let locator = VideoLocator::new().with_mapping(mapping);
    assert_eq!(
        url_of(locator.resolve("clip04.mp4").playable.as_ref()),
        Some("https://cdn/clip04.mp4")
    );
    assert_eq!(
        locator.resolve("/x/clip05.mp4").playable,
        Some(PlayableRef::CloudPreview {
            file_id: "xyz789".into()
        })
    );
}

#[test]
fn mapping_is_tried_before_folder_and_video_root() {
    let root = TempDir::new().expect("tmp");
    std::fs::write(root.path().join("local.mp4"), b"").expect("local video");
    std::fs::write(root.path().join("both.mp4"), b"").expect("shadowed video");

    let folder = FolderIndex::from_lister(&StaticFolderLister::new(vec![
        RemoteFile::new("both.mp4", "folder-both"),
        RemoteFile::new("remote__cv2.mp4", "folder-remote-derived"),
    ]))
    .expect("folder index");
    let mapping = MappingTable::from_rows(vec![MappingRow::new(
        "mapped.mp4",
        None,
        Some("https://mapped"),
        None,
    )]);

    let locator = VideoLocator::new()
        .with_mapping(mapping)
        .with_folder_index(folder)
        .with_video_root(root.path());

    assert_eq!(url_of(locator.resolve("mapped.mp4").playable.as_ref()), Some("https://mapped"));
    assert_eq!(
        locator.resolve("both.mp4").playable,
        Some(PlayableRef::CloudPreview {
            file_id: "folder-both".into()
        })
    );
    assert_eq!(
        locator.resolve("remote.mp4").playable,
        Some(PlayableRef::CloudPreview {
            file_id: "folder-remote-derived".into()
        })
    );
    assert_eq!(
        locator.resolve("some/dir/local.mp4").playable,
        Some(PlayableRef::LocalFile {
            path: root.path().join("local.mp4")
        })
    );
    assert!(!locator.resolve("missing.mp4").is_resolved());
}

#[test]
fn mapping_loads_from_a_file_path() {
    let dir = TempDir::new().expect("tmp");
    let path = dir.path().join("videos.csv");
    std::fs::write(&path, "name,url\nfile.mp4,https://from-file\n").expect("write mapping");

    let mapping = MappingSource::file(&path).load().expect("file mapping");
    assert_eq!(
        url_of(resolve("file.mp4", Some(&mapping)).playable.as_ref()),
        Some("https://from-file")
    );

    let missing = MappingSource::file(dir.path().join("absent.csv")).load();
    assert!(matches!(missing, Err(AnnotateError::SourceLoad { .. })));
}
