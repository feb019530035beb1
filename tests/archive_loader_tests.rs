use std::io::{Cursor, Write};

use bundle_charts::bundle::{
    ArchiveBundle, ArchiveLoader, BundleWriter, ChartOptions, FileFetcher, MemoryFetcher,
};
use bundle_charts::error::ChartError;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn raw_bundle(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default())
            .expect("start entry");
        zip.write_all(bytes).expect("write entry");
    }
    zip.finish().expect("finish archive").into_inner()
}

#[tokio::test]
async fn fetch_indexes_entries_in_archive_order() {
    let bytes = raw_bundle(&[
        ("metadata.json", b"{}"),
        ("a.csv", b"x,y\n1,2\n"),
        ("b.csv", b"x,y\n3,4\n"),
    ]);
    let fetcher = MemoryFetcher::new().with_blob("mem://bundle", bytes);
    let bundle = ArchiveLoader::new(fetcher)
        .fetch("mem://bundle")
        .await
        .expect("bundle loads");

    let names: Vec<&str> = bundle.entry_names().collect();
    assert_eq!(names, vec!["metadata.json", "a.csv", "b.csv"]);
    assert_eq!(bundle.len(), 3);
    assert!(bundle.contains("a.csv"));
    assert!(!bundle.contains("A.csv"));
}

#[tokio::test]
async fn unreachable_url_is_network_error() {
    let loader = ArchiveLoader::new(MemoryFetcher::new());
    let err = loader.fetch("mem://missing").await.expect_err("must fail");
    assert!(matches!(err, ChartError::Network(_)));
}

#[tokio::test]
async fn non_zip_blob_is_format_error() {
    let fetcher = MemoryFetcher::new().with_blob("mem://junk", b"definitely not a zip".to_vec());
    let err = ArchiveLoader::new(fetcher)
        .fetch("mem://junk")
        .await
        .expect_err("must fail");
    assert!(matches!(err, ChartError::Format(_)));
}

#[tokio::test]
async fn missing_entry_is_not_found() {
    let bundle = ArchiveBundle::from_bytes(raw_bundle(&[("a.csv", b"x,y\n")])).expect("bundle");
    let err = bundle.entry("b.csv").await.expect_err("must fail");
    assert!(matches!(err, ChartError::NotFound(name) if name == "b.csv"));
}

#[tokio::test]
async fn invalid_utf8_entry_is_decode_error() {
    let bundle =
        ArchiveBundle::from_bytes(raw_bundle(&[("bin.csv", &[0xff, 0xfe, 0x00, 0xc3])]))
            .expect("bundle");
    let err = bundle.entry("bin.csv").await.expect_err("must fail");
    assert!(matches!(err, ChartError::Decode { entry, .. } if entry == "bin.csv"));
    assert_eq!(
        bundle.entry_bytes("bin.csv").expect("raw bytes"),
        vec![0xff, 0xfe, 0x00, 0xc3]
    );
}

#[tokio::test]
async fn repeated_and_concurrent_decodes_are_identical() {
    let bundle =
        ArchiveBundle::from_bytes(raw_bundle(&[("a.csv", "t,v\n1,é\n".as_bytes())])).expect("bundle");
    let shared = bundle.clone();

    let (first, second) = tokio::join!(bundle.entry("a.csv"), shared.entry("a.csv"));
    let first = first.expect("first decode");
    assert_eq!(first, second.expect("second decode"));
    assert_eq!(first, bundle.entry("a.csv").await.expect("third decode"));
    assert_eq!(first, "t,v\n1,é\n");
}

#[tokio::test]
async fn file_fetcher_reads_plain_paths_and_file_urls() {
    let bytes = raw_bundle(&[("metadata.json", b"{}")]);
    let dir = std::env::temp_dir().join(format!("bundle-charts-fetch-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("session.zip");
    std::fs::write(&path, &bytes).expect("write bundle");

    let loader = ArchiveLoader::new(FileFetcher::new());
    let plain = loader
        .fetch(path.to_str().expect("utf8 path"))
        .await
        .expect("plain path");
    let url = format!("file://{}", path.display());
    let from_url = loader.fetch(&url).await.expect("file url");
    assert!(plain.contains("metadata.json"));
    assert_eq!(from_url.len(), 1);

    let rooted = ArchiveLoader::new(FileFetcher::with_root(&dir));
    assert!(rooted.fetch("session.zip").await.is_ok());
    let err = rooted.fetch("absent.zip").await.expect_err("must fail");
    assert!(matches!(err, ChartError::Network(_)));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn bundle_writer_output_round_trips_through_loader() {
    let mut writer = BundleWriter::new("Lab run");
    writer
        .add_chart("temp.csv", "time,temp\n0,20.5\n10,22.0\n", ChartOptions::new())
        .expect("chart added");
    writer.add_entry("notes.txt", "free text");
    let bytes = writer.finish().expect("archive");

    let bundle = ArchiveBundle::from_bytes(bytes).expect("bundle");
    let names: Vec<&str> = bundle.entry_names().collect();
    assert_eq!(names, vec!["metadata.json", "temp.csv", "notes.txt"]);
    assert_eq!(
        bundle.entry("temp.csv").await.expect("payload"),
        "time,temp\n0,20.5\n10,22.0\n"
    );
}

#[test]
fn memory_fetcher_blobs_can_be_replaced_and_removed() {
    let fetcher = MemoryFetcher::new();
    fetcher.insert("mem://a", b"one".to_vec());
    fetcher.insert("mem://a", b"two".to_vec());
    assert!(fetcher.remove("mem://a"));
    assert!(!fetcher.remove("mem://a"));
}

#[test]
fn edit_chart_updates_one_descriptor_attribute() {
    let mut writer = BundleWriter::new("Edits");
    let index = writer
        .add_chart("a.csv", "x,y\n0,1\n5,2\n", ChartOptions::new())
        .expect("chart added");
    writer
        .edit_chart(index, "title", serde_json::json!("Renamed"))
        .expect("edit");

    let metadata =
        bundle_charts::metadata::parse(&writer.metadata_json().expect("json")).expect("parses");
    assert_eq!(metadata.chart_data[0].title, "Renamed");
    assert_eq!(metadata.chart_data[0].x_column, "x");

    let err = writer
        .edit_chart(3, "title", serde_json::json!("x"))
        .expect_err("no such chart");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn remove_zero_keeps_ragged_records() {
    let csv_text = "t,v\n0,1\n1,0\n2,3,9\n";
    let mut plain = BundleWriter::new("Plain");
    plain
        .add_chart("r.csv", csv_text, ChartOptions::new())
        .expect("ragged payload accepted");

    let mut filtered = BundleWriter::new("Filtered");
    filtered
        .add_chart("r.csv", csv_text, ChartOptions::new().remove_zero())
        .expect("ragged payload accepted with zero filtering");

    let bundle = ArchiveBundle::from_bytes(filtered.finish().expect("archive")).expect("bundle");
    let payload = bundle.entry_bytes("nz_r.csv").expect("filtered payload");
    assert_eq!(String::from_utf8(payload).expect("utf-8"), "t,v\n0,1\n2,3,9\n");
}
