use artpack_layout::{LayoutDocument, Node};
use artpack_merge::{
    open_archive, ContentStore, EntryStatus, Error, MergeConfig, MergeOrchestrator, MergeStage,
    SkipReason,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nbezel";

fn layout(image: &str, view_width: u32) -> String {
    format!(
        r#"<?xml version="1.0"?>
<mamelayout version="2">
    <element name="bezel">
        <image file="{image}" />
    </element>
    <view name="Artwork">
        <element ref="bezel">
            <bounds x="0" y="0" width="{view_width}" height="3" />
        </element>
    </view>
</mamelayout>"#
    )
}

fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in files {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

struct Fixture {
    dir: TempDir,
    config: MergeConfig,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let config = MergeConfig {
            output_dir: root.join("out"),
            scratch_dir: Some(root.join("scratch")),
            ..MergeConfig::default()
        };
        Self { dir, config }
    }

    fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).unwrap()
    }

    /// Add a zip pack whose nested archives are built from `entries`.
    fn add_pack(&mut self, label: &str, entries: &[(&str, Vec<u8>)]) {
        let path = self.root().join(format!("{}.zip", label));
        let files: Vec<(&str, &[u8])> = entries.iter().map(|(n, b)| (*n, b.as_slice())).collect();
        std::fs::write(&path, zip_bytes(&files)).unwrap();
        self.config.pack_paths.push(path);
        self.config.pack_labels.push(label.to_string());
    }

    fn run(&self, store: &ContentStore) -> artpack_merge::RunSummary {
        MergeOrchestrator::new(&self.config, store)
            .unwrap()
            .run()
            .unwrap()
    }

    fn output(&self, id: &str) -> Utf8PathBuf {
        self.config.output_dir.join(format!("{}.zip", id))
    }
}

fn read_output(path: &Utf8Path) -> (BTreeSet<String>, LayoutDocument) {
    let mut reader = open_archive(path).unwrap();
    let names: BTreeSet<String> = reader
        .entries()
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    let layout = LayoutDocument::from_bytes(&reader.read_entry("default.lay").unwrap()).unwrap();
    (names, layout)
}

fn root_children<'a>(doc: &'a LayoutDocument, tag: &str) -> Vec<&'a Node> {
    doc.root().child_nodes().filter(|n| n.tag() == tag).collect()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn identical_assets_are_stored_once_and_both_layouts_point_at_them() {
    let mut fixture = Fixture::new();
    let a_layout = layout("bezel.png", 4);
    let b_layout = layout("bezel.png", 8);
    fixture.add_pack(
        "A",
        &[(
            "mario.zip",
            zip_bytes(&[("bezel.png", PNG), ("default.lay", a_layout.as_bytes())]),
        )],
    );
    fixture.add_pack(
        "B",
        &[(
            "mario.zip",
            zip_bytes(&[("bezel.png", PNG), ("default.lay", b_layout.as_bytes())]),
        )],
    );

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 0);

    let (names, merged) = read_output(&fixture.output("mario"));
    assert_eq!(names, set(&["A/bezel.png", "default.lay"]));

    let elements = root_children(&merged, "element");
    let element_names: Vec<_> = elements.iter().filter_map(|e| e.attr("name")).collect();
    assert_eq!(element_names, vec!["A__bezel", "B__bezel"]);
    for element in &elements {
        assert_eq!(element.find_all("image")[0].attr("file"), Some("A/bezel.png"));
    }

    let views = root_children(&merged, "view");
    let view_names: Vec<_> = views.iter().filter_map(|v| v.attr("name")).collect();
    assert_eq!(view_names, vec!["A: Artwork", "B: Artwork"]);
    assert_eq!(views[0].find_all("element")[0].attr("ref"), Some("A__bezel"));
    assert_eq!(views[1].find_all("element")[0].attr("ref"), Some("B__bezel"));

    let outcome = &summary.outcomes[0];
    assert_eq!(outcome.assets_written, 1);
    assert_eq!(outcome.assets_deduplicated, 1);
    let report = outcome.verification.as_ref().unwrap();
    assert_eq!(report.checked, 2);
    assert!(report.is_clean());
}

#[test]
fn entry_in_one_of_three_packs_is_merged_alone() {
    let mut fixture = Fixture::new();
    let galaga_layout = layout("art/bezel.png", 4);
    fixture.add_pack("A", &[("dkong.zip", zip_bytes(&[("bezel.png", b"dk")]))]);
    fixture.add_pack("B", &[("pacman.zip", zip_bytes(&[("bezel.png", b"pm")]))]);
    fixture.add_pack(
        "C",
        &[(
            "galaga.zip",
            zip_bytes(&[
                ("art/bezel.png", PNG),
                ("default.lay", galaga_layout.as_bytes()),
            ]),
        )],
    );

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.failed, 0);

    let galaga = summary.outcomes.iter().find(|o| o.id == "galaga").unwrap();
    assert_eq!(galaga.contributions, 1);
    assert!(galaga.verification.as_ref().unwrap().is_clean());

    let (names, merged) = read_output(&fixture.output("galaga"));
    assert_eq!(names, set(&["C/art/bezel.png", "default.lay"]));
    assert_eq!(merged.find_all("image")[0].attr("file"), Some("C/art/bezel.png"));
}

#[test]
fn missing_reference_is_reported_once_and_run_continues() {
    let mut fixture = Fixture::new();
    let broken = r#"<mamelayout version="2">
        <element name="bezel"><image file="bezel.png" alphafile="missing.png" /></element>
    </mamelayout>"#;
    fixture.add_pack(
        "A",
        &[
            (
                "mario.zip",
                zip_bytes(&[("bezel.png", PNG), ("default.lay", broken.as_bytes())]),
            ),
            ("zaxxon.zip", zip_bytes(&[("bezel.png", PNG)])),
        ],
    );

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 2);

    let mario = summary.outcomes.iter().find(|o| o.id == "mario").unwrap();
    let report = mario.verification.as_ref().unwrap();
    assert_eq!(report.missing, vec!["missing.png".to_string()]);
    assert!(report.repaired.is_empty());
    assert_eq!(summary.findings(), 1);
}

#[test]
fn processing_cap_limits_entries_in_sorted_order() {
    let mut fixture = Fixture::new();
    let entries: Vec<(&str, Vec<u8>)> = ["Echo.zip", "alpha.zip", "delta.zip", "Bravo.zip", "charlie.zip"]
        .iter()
        .map(|name| (*name, zip_bytes(&[("bezel.png", name.as_bytes())])))
        .collect();
    fixture.add_pack("A", &entries);
    fixture.config.max_entries = 2;

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.failed, 0);

    let merged: Vec<_> = summary
        .outcomes
        .iter()
        .filter(|o| o.status == EntryStatus::Merged)
        .map(|o| o.id.as_str())
        .collect();
    assert_eq!(merged, vec!["alpha", "Bravo"]);
    assert!(summary
        .outcomes
        .iter()
        .skip(2)
        .all(|o| o.status == EntryStatus::Skipped(SkipReason::Capped)));
    assert!(!fixture.output("charlie").as_std_path().exists());
}

#[test]
fn disabled_dedup_copies_every_file() {
    let mut fixture = Fixture::new();
    let lay = layout("bezel.png", 4);
    for label in ["A", "B"] {
        fixture.add_pack(
            label,
            &[(
                "mario.zip",
                zip_bytes(&[
                    ("bezel.png", PNG),
                    ("art/shadow.png", PNG),
                    ("default.lay", lay.as_bytes()),
                ]),
            )],
        );
    }
    fixture.config.dedup = false;

    let store = ContentStore::from_config(&fixture.config);
    let summary = fixture.run(&store);
    assert_eq!(summary.outcomes[0].assets_written, 4);
    assert_eq!(summary.outcomes[0].assets_deduplicated, 0);

    let (names, merged) = read_output(&fixture.output("mario"));
    assert_eq!(
        names,
        set(&[
            "A/bezel.png",
            "A/art/shadow.png",
            "B/bezel.png",
            "B/art/shadow.png",
            "default.lay"
        ])
    );
    let images = merged.find_all("image");
    let files: Vec<_> = images
        .iter()
        .filter_map(|i| i.attr("file"))
        .collect();
    assert_eq!(files, vec!["A/bezel.png", "B/bezel.png"]);
}

#[test]
fn canonical_path_is_reused_across_entries() {
    let mut fixture = Fixture::new();
    let mario_layout = layout("frame.png", 4);
    // dkong sorts first, so pack A introduces the bytes
    fixture.add_pack("A", &[("dkong.zip", zip_bytes(&[("bezel.png", PNG)]))]);
    fixture.add_pack(
        "B",
        &[(
            "mario.zip",
            zip_bytes(&[("frame.png", PNG), ("default.lay", mario_layout.as_bytes())]),
        )],
    );

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 2);

    let (names, merged) = read_output(&fixture.output("mario"));
    assert_eq!(names, set(&["A/bezel.png", "default.lay"]));
    assert_eq!(merged.find_all("image")[0].attr("file"), Some("A/bezel.png"));
    assert_eq!(summary.findings(), 0);
}

#[test]
fn same_file_name_in_root_and_subdirectory_resolves_by_path() {
    let mut fixture = Fixture::new();
    let two_bezels = r#"<mamelayout version="2">
        <element name="bezel"><image file="bezel.png" /></element>
        <element name="frame"><image file="art/bezel.png" /></element>
    </mamelayout>"#;
    fixture.add_pack(
        "A",
        &[(
            "mario.zip",
            zip_bytes(&[
                ("bezel.png", b"ROOT"),
                ("art/bezel.png", b"ART"),
                ("default.lay", two_bezels.as_bytes()),
            ]),
        )],
    );

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 1);

    let (names, merged) = read_output(&fixture.output("mario"));
    assert_eq!(names, set(&["A/bezel.png", "A/art/bezel.png", "default.lay"]));
    let images = merged.find_all("image");
    let files: Vec<_> = images
        .iter()
        .filter_map(|image| image.attr("file"))
        .collect();
    assert_eq!(files, vec!["A/bezel.png", "A/art/bezel.png"]);

    let mut output = open_archive(&fixture.output("mario")).unwrap();
    assert_eq!(output.read_entry("A/bezel.png").unwrap(), b"ROOT");
    assert_eq!(output.read_entry("A/art/bezel.png").unwrap(), b"ART");
    assert_eq!(summary.findings(), 0);
}

#[test]
fn backslash_entry_names_are_copied_and_resolved() {
    let mut fixture = Fixture::new();
    let windows_layout = r#"<mamelayout version="2">
        <element name="bezel"><image file="art\bezel.png" /></element>
    </mamelayout>"#;
    fixture.add_pack(
        "A",
        &[(
            "sub\\mario.zip",
            zip_bytes(&[
                ("art\\bezel.png", PNG),
                ("default.lay", windows_layout.as_bytes()),
            ]),
        )],
    );

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 0);

    let (names, merged) = read_output(&fixture.output("mario"));
    assert_eq!(names, set(&["A/art/bezel.png", "default.lay"]));
    assert_eq!(merged.find_all("image")[0].attr("file"), Some("A/art/bezel.png"));
    assert_eq!(summary.outcomes[0].assets_written, 1);
    assert_eq!(summary.findings(), 0);
}

#[test]
fn duplicate_path_in_nested_archive_keeps_first_copy() {
    let mut fixture = Fixture::new();
    let lay = layout("bezel.png", 4);
    fixture.add_pack(
        "A",
        &[(
            "mario.zip",
            zip_bytes(&[
                ("bezel.png", b"first"),
                ("./bezel.png", b"second"),
                ("default.lay", lay.as_bytes()),
            ]),
        )],
    );

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.outcomes[0].assets_written, 1);

    let (names, _) = read_output(&fixture.output("mario"));
    assert_eq!(names, set(&["A/bezel.png", "default.lay"]));
    let mut output = open_archive(&fixture.output("mario")).unwrap();
    assert_eq!(output.read_entry("A/bezel.png").unwrap(), b"first");
}

#[test]
fn malformed_layout_keeps_assets_and_omits_layout() {
    let mut fixture = Fixture::new();
    let good = layout("bezel.png", 4);
    fixture.add_pack(
        "A",
        &[(
            "mario.zip",
            zip_bytes(&[("bezel.png", PNG), ("default.lay", good.as_bytes())]),
        )],
    );
    fixture.add_pack(
        "B",
        &[(
            "mario.zip",
            zip_bytes(&[
                ("overlay.png", b"overlay"),
                ("default.lay", b"<mamelayout><element name=\"x\"></mamelayout>"),
            ]),
        )],
    );

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 1);

    let (names, merged) = read_output(&fixture.output("mario"));
    assert_eq!(names, set(&["A/bezel.png", "B/overlay.png", "default.lay"]));
    let element_names: Vec<_> = root_children(&merged, "element")
        .iter()
        .filter_map(|e| e.attr("name"))
        .collect();
    assert_eq!(element_names, vec!["A__bezel"]);
}

#[test]
fn unreadable_nested_archive_is_skipped() {
    let mut fixture = Fixture::new();
    let good = layout("bezel.png", 4);
    fixture.add_pack(
        "A",
        &[(
            "mario.zip",
            zip_bytes(&[("bezel.png", PNG), ("default.lay", good.as_bytes())]),
        )],
    );
    fixture.add_pack("B", &[("mario.zip", b"not a zip archive".to_vec())]);

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 0);

    let (names, _) = read_output(&fixture.output("mario"));
    assert_eq!(names, set(&["A/bezel.png", "default.lay"]));
}

#[test]
fn entry_without_any_layout_gets_default_root() {
    let mut fixture = Fixture::new();
    fixture.add_pack("A", &[("mario.zip", zip_bytes(&[("bezel.png", PNG)]))]);

    fixture.run(&ContentStore::default());
    let (_, merged) = read_output(&fixture.output("mario"));
    assert_eq!(merged.root().tag(), "mamelayout");
    assert_eq!(merged.root().attr("version"), Some("2"));
    assert_eq!(merged.root().child_nodes().count(), 0);
}

#[test]
fn existing_output_is_skipped_unless_overwrite() {
    let mut fixture = Fixture::new();
    fixture.add_pack("A", &[("mario.zip", zip_bytes(&[("bezel.png", PNG)]))]);

    assert_eq!(fixture.run(&ContentStore::default()).processed, 1);

    let again = fixture.run(&ContentStore::default());
    assert_eq!(again.processed, 0);
    assert_eq!(
        again.outcomes[0].status,
        EntryStatus::Skipped(SkipReason::OutputExists)
    );

    fixture.config.overwrite = true;
    assert_eq!(fixture.run(&ContentStore::default()).processed, 1);
}

#[test]
fn directory_pack_is_read_in_place() {
    let mut fixture = Fixture::new();
    let pack_dir = fixture.root().join("Orny");
    std::fs::create_dir_all(pack_dir.join("sub")).unwrap();
    let lay = layout("bezel.png", 4);
    std::fs::write(
        pack_dir.join("sub/mario.zip"),
        zip_bytes(&[("bezel.png", PNG), ("default.lay", lay.as_bytes())]),
    )
    .unwrap();
    fixture.config.pack_paths.push(pack_dir);
    fixture.config.pack_labels.push("Orny".to_string());

    let summary = fixture.run(&ContentStore::default());
    assert_eq!(summary.processed, 1);
    let (names, _) = read_output(&fixture.output("mario"));
    assert_eq!(names, set(&["Orny/bezel.png", "default.lay"]));
}

#[test]
fn scratch_space_is_cleaned_up() {
    let mut fixture = Fixture::new();
    fixture.add_pack("A", &[("mario.zip", zip_bytes(&[("bezel.png", PNG)]))]);

    fixture.run(&ContentStore::default());
    let scratch = fixture.config.scratch_dir.clone().unwrap();
    let leftovers = std::fs::read_dir(scratch.as_std_path())
        .map(|dir| dir.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[test]
fn label_count_mismatch_is_fatal() {
    let mut fixture = Fixture::new();
    fixture.add_pack("A", &[("mario.zip", zip_bytes(&[("bezel.png", PNG)]))]);
    fixture.config.pack_labels.push("B".to_string());

    let store = ContentStore::default();
    let err = MergeOrchestrator::new(&fixture.config, &store)
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(err, Error::PackLabelMismatch { packs: 1, labels: 2 }));
    assert!(!fixture.config.output_dir.as_std_path().exists());
}

#[test]
fn progress_reports_each_stage_in_order() {
    let mut fixture = Fixture::new();
    let lay = layout("bezel.png", 4);
    let nested = zip_bytes(&[("bezel.png", PNG), ("default.lay", lay.as_bytes())]);
    fixture.add_pack("A", &[("mario.zip", nested.clone()), ("dkong.zip", nested)]);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let store = ContentStore::default();
    MergeOrchestrator::new(&fixture.config, &store)
        .unwrap()
        .with_progress(move |progress| {
            sink.lock()
                .unwrap()
                .push((progress.stage, progress.current_entry, progress.current));
        })
        .run()
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (MergeStage::Indexing, None, 0),
            (MergeStage::Merging, Some("dkong".to_string()), 1),
            (MergeStage::Merging, Some("mario".to_string()), 2),
            (MergeStage::Complete, None, 2),
        ]
    );
}
