use std::fs;
use tempfile::TempDir;
use toolcrib_core::{Library, ParamValue, Quantity, Shape, Tool};
use toolcrib_fcformat::{FcSerializer, LIBRARY_DIR, SHAPE_DIR, TOOL_DIR};

fn store() -> (TempDir, FcSerializer) {
    let dir = tempfile::tempdir().unwrap();
    let serializer = FcSerializer::new(dir.path()).unwrap();
    (dir, serializer)
}

/// A non-builtin shape with numeric, unit, and text parameters.
fn dovetail_shape() -> Shape {
    let mut shape = Shape::new("dovetail-55");
    shape.set_param("Diameter", ParamValue::Quantity(Quantity::mm(9.5)));
    shape.set_param("CuttingAngle", ParamValue::Quantity(Quantity::degrees(55.0)));
    shape.set_param("Flutes", ParamValue::Integer(3));
    shape.set_param("Material", ParamValue::Text("Carbide".to_string()));
    shape.set_param("Chipload", ParamValue::Real(0.05));
    shape
}

#[test]
fn round_trip_preserves_tools_and_parameters() {
    let (_dir, serializer) = store();

    let mut library = Library::new("Default");
    let tool_a = Tool::with_id("dove-9.5".into(), "9.5mm Dovetail", dovetail_shape());
    let tool_b = Tool::with_id("dove-12".into(), "12mm Dovetail", {
        let mut shape = dovetail_shape();
        shape.set_param("Diameter", ParamValue::Quantity(Quantity::mm(12.0)));
        shape
    });
    library.add_tool(tool_a.clone());
    library.add_tool(tool_b.clone());

    library.serialize(&serializer).unwrap();
    let loaded = Library::deserialize(&serializer, library.id()).unwrap();

    assert_eq!(loaded.id(), library.id());
    assert_eq!(loaded.len(), 2);

    let ids: Vec<&str> = loaded.tools().iter().map(|t| t.id().as_str()).collect();
    assert_eq!(ids, ["dove-9.5", "dove-12"]);

    let first = &loaded.tools()[0];
    assert_eq!(first.label(), "9.5mm Dovetail");
    assert_eq!(first.shape().name(), "dovetail-55");
    assert_eq!(
        first.shape().get_param("Diameter"),
        Some(&ParamValue::Quantity(Quantity::mm(9.5)))
    );
    assert_eq!(
        first.shape().get_param("CuttingAngle"),
        Some(&ParamValue::Quantity(Quantity::degrees(55.0)))
    );
    assert_eq!(first.shape().get_param("Flutes"), Some(&ParamValue::Integer(3)));
    assert_eq!(
        first.shape().get_param("Material"),
        Some(&ParamValue::Text("Carbide".to_string()))
    );
    assert_eq!(first.shape().get_param("Chipload"), Some(&ParamValue::Real(0.05)));
}

#[test]
fn quantity_parameters_are_written_with_comma_separator() {
    let (dir, serializer) = store();

    let tool = Tool::with_id("dove-9.5".into(), "9.5mm Dovetail", dovetail_shape());
    serializer.serialize_tool(&tool).unwrap();

    let content =
        fs::read_to_string(dir.path().join(TOOL_DIR).join("dove-9.5.fctb")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["parameter"]["Diameter"], "9,5 mm");
    assert_eq!(doc["parameter"]["CuttingAngle"], "55 \u{00b0}");
    assert_eq!(doc["parameter"]["Flutes"], "3");
    assert_eq!(doc["shape"], "dovetail-55.fcstd");
    assert_eq!(doc["version"], 1);

    // Reading the comma form back reconstructs the original value.
    let loaded = serializer.deserialize_tool(&"dove-9.5".into()).unwrap();
    assert_eq!(
        loaded.shape().get_param("Diameter"),
        Some(&ParamValue::Quantity(Quantity::mm(9.5)))
    );
}

#[test]
fn reserialize_reuses_recorded_legacy_ids() {
    let (_dir, serializer) = store();

    let mut library = Library::new("Default");
    library.add_tool(Tool::with_id("a".into(), "Tool A", dovetail_shape()));
    library.add_tool(Tool::with_id("b".into(), "Tool B", dovetail_shape()));
    serializer.serialize_library(&library).unwrap();

    let loaded = serializer.deserialize_library(library.id()).unwrap();
    assert_eq!(loaded.fc_tool_id_of(&"a".into()), Some(1));
    assert_eq!(loaded.fc_tool_id_of(&"b".into()), Some(2));
    assert_eq!(loaded.tools()[0].pocket(), Some(1));
    assert_eq!(loaded.tools()[1].pocket(), Some(2));

    // An unchanged library re-serializes with identical numbering.
    serializer.serialize_library(&loaded).unwrap();
    let reloaded = serializer.deserialize_library(library.id()).unwrap();
    assert_eq!(reloaded.fc_tool_id_of(&"a".into()), Some(1));
    assert_eq!(reloaded.fc_tool_id_of(&"b".into()), Some(2));
}

#[test]
fn new_tool_gets_id_past_highest_recorded() {
    let (_dir, serializer) = store();

    let mut library = Library::new("Default");
    library.add_tool(Tool::with_id("a".into(), "Tool A", dovetail_shape()));
    library.add_tool(Tool::with_id("b".into(), "Tool B", dovetail_shape()));
    // Ids as the host application might have assigned them.
    library.record_fc_tool_id("a".into(), 3);
    library.record_fc_tool_id("b".into(), 7);
    library.add_tool(Tool::with_id("c".into(), "Tool C", dovetail_shape()));

    serializer.serialize_library(&library).unwrap();
    let loaded = serializer.deserialize_library(library.id()).unwrap();

    assert_eq!(loaded.fc_tool_id_of(&"a".into()), Some(3));
    assert_eq!(loaded.fc_tool_id_of(&"b".into()), Some(7));
    assert_eq!(loaded.fc_tool_id_of(&"c".into()), Some(8));
}

#[test]
fn unset_float_and_text_parameters_stay_unset() {
    let (_dir, serializer) = store();

    // Builtin endmill: Material and SpindleDirection have no template
    // default and are never assigned on this tool.
    let tool = Tool::with_id("em-5".into(), "5mm Endmill", Shape::new("endmill"));
    serializer.serialize_tool(&tool).unwrap();

    let loaded = serializer.deserialize_tool(&"em-5".into()).unwrap();
    assert!(loaded.shape().get_param("Material").is_none());
    assert!(loaded.shape().get_param("SpindleDirection").is_none());
    // Integer properties default to zero-filled, not absent.
    assert!(loaded.shape().get_param("Flutes").is_some());
}

#[test]
fn builtin_shapes_are_never_written_to_disk() {
    let (dir, serializer) = store();

    let mut library = Library::new("Default");
    library.add_tool(Tool::with_id("em-5".into(), "5mm Endmill", Shape::new("endmill")));
    serializer.serialize_library(&library).unwrap();

    let shape_files: Vec<_> = fs::read_dir(dir.path().join(SHAPE_DIR))
        .unwrap()
        .collect();
    assert!(shape_files.is_empty());

    let loaded = serializer.deserialize_library(library.id()).unwrap();
    let shape = loaded.tools()[0].shape();
    assert_eq!(shape.name(), "endmill");
    assert!(shape.is_builtin());
    assert!(shape.filename().is_none());
}

#[test]
fn bulk_sync_deletes_libraries_not_in_the_set() {
    let (dir, serializer) = store();

    let lib_a = Library::with_id("a".into(), "A");
    let lib_b = Library::with_id("b".into(), "B");
    let lib_c = Library::with_id("c".into(), "C");
    serializer
        .serialize_libraries(&[lib_a.clone(), lib_b, lib_c.clone()])
        .unwrap();
    assert_eq!(serializer.library_ids().unwrap().len(), 3);

    serializer.serialize_libraries(&[lib_a, lib_c]).unwrap();

    let lib_dir = dir.path().join(LIBRARY_DIR);
    assert!(lib_dir.join("a.fctl").is_file());
    assert!(!lib_dir.join("b.fctl").exists());
    assert!(lib_dir.join("c.fctl").is_file());
}

#[test]
fn missing_tool_file_skips_only_that_tool() {
    let (dir, serializer) = store();

    let mut library = Library::new("Default");
    library.add_tool(Tool::with_id("keep".into(), "Kept", dovetail_shape()));
    library.add_tool(Tool::with_id("lost".into(), "Lost", dovetail_shape()));
    serializer.serialize_library(&library).unwrap();

    fs::remove_file(dir.path().join(TOOL_DIR).join("lost.fctb")).unwrap();

    let loaded = serializer.deserialize_library(library.id()).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.tools()[0].id().as_str(), "keep");
}

#[test]
fn corrupt_tool_file_skips_only_that_tool() {
    let (dir, serializer) = store();

    let mut library = Library::new("Default");
    library.add_tool(Tool::with_id("keep".into(), "Kept", dovetail_shape()));
    library.add_tool(Tool::with_id("bad".into(), "Bad", dovetail_shape()));
    serializer.serialize_library(&library).unwrap();

    fs::write(dir.path().join(TOOL_DIR).join("bad.fctb"), "{not json").unwrap();

    let loaded = serializer.deserialize_library(library.id()).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.tools()[0].id().as_str(), "keep");
}

#[test]
fn corrupt_library_document_propagates() {
    let (dir, serializer) = store();

    fs::write(dir.path().join(LIBRARY_DIR).join("broken.fctl"), "{not json").unwrap();
    assert!(serializer.deserialize_library(&"broken".into()).is_err());
}

#[test]
fn unknown_parameters_survive_round_trip_as_text() {
    let (dir, serializer) = store();

    let tool = Tool::with_id("dove".into(), "Dovetail", dovetail_shape());
    serializer.serialize_tool(&tool).unwrap();

    // Simulate a newer host writing a parameter this codec's schema
    // does not enumerate.
    let path = dir.path().join(TOOL_DIR).join("dove.fctb");
    let mut doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    doc["parameter"]["CustomFinish"] = "mirror".into();
    fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    let loaded = serializer.deserialize_tool(&"dove".into()).unwrap();
    assert_eq!(
        loaded.shape().get_param("CustomFinish"),
        Some(&ParamValue::Text("mirror".to_string()))
    );

    serializer.serialize_tool(&loaded).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["parameter"]["CustomFinish"], "mirror");
}

#[test]
fn shape_preview_is_written_and_optional_on_read() {
    let (dir, serializer) = store();

    let shape = dovetail_shape();
    serializer.serialize_shape(&shape).unwrap();

    let shape_dir = dir.path().join(SHAPE_DIR);
    assert!(shape_dir.join("dovetail-55.fcstd").is_file());
    assert!(shape_dir.join("dovetail-55.svg").is_file());

    let loaded = serializer.deserialize_shape("dovetail-55").unwrap();
    assert!(loaded.svg().is_some());

    // A template without its preview still loads.
    fs::remove_file(shape_dir.join("dovetail-55.svg")).unwrap();
    let loaded = serializer.deserialize_shape("dovetail-55").unwrap();
    assert!(loaded.svg().is_none());
    assert_eq!(
        loaded.get_param("Diameter"),
        Some(&ParamValue::Quantity(Quantity::mm(9.5)))
    );
}

#[test]
fn deserialize_libraries_loads_every_library() {
    let (_dir, serializer) = store();

    let mut lib_a = Library::with_id("a".into(), "A");
    lib_a.add_tool(Tool::with_id("t1".into(), "T1", dovetail_shape()));
    let lib_b = Library::with_id("b".into(), "B");
    serializer.serialize_libraries(&[lib_a, lib_b]).unwrap();

    let loaded = serializer.deserialize_libraries().unwrap();
    assert_eq!(loaded.len(), 2);
    let ids: Vec<&str> = loaded.iter().map(|l| l.id().as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
}
