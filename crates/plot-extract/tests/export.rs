use assert_json_diff::assert_json_eq;
use base64::Engine as _;
use plot_extract::{
    convert_html, decode_trace, export_file, ExportOptions, ExportPaths, ExtractError,
    TraceOutcome,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::path::Path;

fn pack_f32(values: &[f32]) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// A page shaped like a standalone Plotly export: the inlined library
/// mentions `Plotly.newPlot(` long before the real call.
fn plotly_page(traces: &Value) -> String {
    format!(
        r#"<html><head><meta charset="utf-8" /></head><body>
<script type="text/javascript">/*! plotly.js */ var x={{newPlot:function(){{}}}};
function demo(gd) {{ return Plotly.newPlot(gd, [{{"name":"bundled","x":[9],"y":[9],"z":[9]}}]); }}
</script>
<div id="abc" class="plotly-graph-div" style="height:100%; width:100%;"></div>
<script type="text/javascript">
window.PLOTLYENV=window.PLOTLYENV || {{}};
if (document.getElementById("abc")) {{ Plotly.newPlot("abc", {traces}, {{"template":{{"data":{{"scatter3d":[{{"type":"scatter3d"}}]}}}}}}, {{"responsive": true}}) }};
</script>
</body></html>"#
    )
}

fn write_page(root: &Path, traces: &Value) -> ExportPaths {
    let paths = ExportPaths::from_root(root);
    std::fs::create_dir_all(paths.input.parent().unwrap()).unwrap();
    std::fs::write(&paths.input, plotly_page(traces)).unwrap();
    paths
}

fn read_output(paths: &ExportPaths) -> Value {
    serde_json::from_str(&std::fs::read_to_string(&paths.output).unwrap()).unwrap()
}

#[test]
fn test_end_to_end_example() {
    let html = r#"<script>Plotly.newPlot("id",[{"customdata":[],"name":"cat","x":[1.005,2.0],"y":[0.0,0.0],"z":[0.0,0.0],"type":"scatter3d"}], {}, {})</script>"#;
    let conversion = convert_html(html, ExportOptions::default()).unwrap();
    assert_eq!(
        conversion.data.to_json().unwrap(),
        r#"{"cat":{"x":[1.0,2.0],"y":[0.0,0.0],"z":[0.0,0.0]}}"#
    );
}

#[test]
fn test_export_packed_and_plain_traces() {
    let dir = tempfile::tempdir().unwrap();
    let traces = json!([
        {
            "customdata": [["a.wav"], ["b.wav"]],
            "name": "dog",
            "type": "scatter3d",
            "x": {"dtype": "f4", "bdata": pack_f32(&[0.1, 0.25])},
            "y": {"dtype": "f4", "bdata": pack_f32(&[-1.006, 3.0])},
            "z": {"dtype": "f4", "bdata": pack_f32(&[12.5, 0.0])},
        },
        {
            "customdata": [["c.wav"]],
            "name": "cat",
            "type": "scatter3d",
            "x": [1.111],
            "y": [2.222],
            "z": [3.339],
        },
    ]);
    let paths = write_page(dir.path(), &traces);

    let report = export_file(&paths, ExportOptions::default()).unwrap();
    assert_eq!(report.exported, 2);
    assert_eq!(report.total_points, 3);
    assert_eq!(report.skipped().count(), 0);

    let written = std::fs::read_to_string(&paths.output).unwrap();
    assert_eq!(report.bytes_written, written.len() as u64);
    assert!(!written.contains(' '));

    let actual: Value = serde_json::from_str(&written).unwrap();
    assert_json_eq!(
        actual,
        json!({
            "dog": {"x": [0.1, 0.25], "y": [-1.01, 3.0], "z": [12.5, 0.0]},
            "cat": {"x": [1.11], "y": [2.22], "z": [3.34]},
        })
    );
    assert!(written.starts_with(r#"{"dog":"#));
}

#[test]
fn test_last_marker_wins() {
    let dir = tempfile::tempdir().unwrap();
    let traces = json!([{"customdata": [], "name": "real", "x": [1], "y": [2], "z": [3]}]);
    let paths = write_page(dir.path(), &traces);

    export_file(&paths, ExportOptions::default()).unwrap();
    let actual = read_output(&paths);
    assert_json_eq!(actual, json!({"real": {"x": [1], "y": [2], "z": [3]}}));
}

#[test]
fn test_unknown_shapes_skip_only_that_trace() {
    for bad in [Value::Null, json!("1,2,3")] {
        let dir = tempfile::tempdir().unwrap();
        let traces = json!([
            {"customdata": [], "name": "first", "x": [1], "y": [1], "z": [1]},
            {"customdata": [], "name": "second", "x": [2], "y": bad, "z": [2]},
            {"customdata": [], "name": "third", "x": [3], "y": [3], "z": [3]},
        ]);
        let paths = write_page(dir.path(), &traces);

        let report = export_file(&paths, ExportOptions::default()).unwrap();
        assert_eq!(report.exported, 2);
        let skipped: Vec<_> = report.skipped().collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].name, "second");

        let actual = read_output(&paths);
        let keys: Vec<&String> = actual.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["first", "third"]);
    }
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let traces = json!([
        {"customdata": [], "name": "a", "x": {"bdata": pack_f32(&[0.333, 1.5])}, "y": [0.1, 0.2], "z": [7, 8]},
        {"customdata": [], "name": "b", "x": [5.555], "y": [6.666], "z": [7.777]},
    ]);
    let paths = write_page(dir.path(), &traces);

    export_file(&paths, ExportOptions::default()).unwrap();
    let first = std::fs::read(&paths.output).unwrap();
    assert!(String::from_utf8_lossy(&first).contains(r#""z":[7,8]"#));
    export_file(&paths, ExportOptions::default()).unwrap();
    let second = std::fs::read(&paths.output).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_input_leaves_output_alone() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ExportPaths::from_root(dir.path());

    let err = export_file(&paths, ExportOptions::default()).unwrap_err();
    assert!(matches!(err, ExtractError::InputMissing(ref p) if p == &paths.input));
    assert!(!paths.output.exists());
}

#[test]
fn test_fatal_errors_do_not_overwrite_output() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ExportPaths::from_root(dir.path());
    std::fs::create_dir_all(paths.input.parent().unwrap()).unwrap();
    std::fs::write(&paths.output, "previous").unwrap();

    std::fs::write(&paths.input, "<html>no plot</html>").unwrap();
    let err = export_file(&paths, ExportOptions::default()).unwrap_err();
    assert!(err.is_not_found());

    std::fs::write(&paths.input, r#"Plotly.newPlot("id",[{"name":"a","x":[1,}])"#).unwrap();
    let err = export_file(&paths, ExportOptions::default()).unwrap_err();
    assert!(matches!(err, ExtractError::MalformedData(_)));

    assert_eq!(std::fs::read_to_string(&paths.output).unwrap(), "previous");
}

proptest! {
    #[test]
    fn packed_and_plain_decode_identically(values in prop::collection::vec(-1.0e4f32..1.0e4f32, 0..64)) {
        let plain: Vec<f64> = values.iter().map(|v| *v as f64).collect();
        let trace = json!({
            "name": "p",
            "x": {"dtype": "f4", "bdata": pack_f32(&values)},
            "y": plain,
            "z": {"bdata": pack_f32(&values)},
        });

        let points = match decode_trace(&trace, 2).unwrap() {
            TraceOutcome::Decoded { points, .. } => points,
            other => panic!("expected decoded trace, got {other:?}"),
        };
        prop_assert_eq!(points.x.len(), values.len());
        prop_assert_eq!(&points.x, &points.y);
        prop_assert_eq!(&points.x, &points.z);
    }
}
