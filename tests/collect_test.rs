use ndarray::{Array1, Array2};
use vizflow::diagnostics::MemorySink;
use vizflow::module_tools::*;
use vizflow::modules::{Collect, CollectParamsBuilder};
use vizflow::object::attributes::*;
use vizflow::object::payload::PointBlock;

fn points(space: &ObjectSpace, name: &str) -> ObjectHandle {
    space
        .create(
            name,
            Payload::Points(PointBlock::new(Array2::zeros((8, 3))).unwrap()),
        )
        .unwrap()
}

fn scalar_field(space: &ObjectSpace, name: &str) -> ObjectHandle {
    space
        .create(name, Payload::Float(Array1::zeros(8)))
        .unwrap()
}

fn run(collect: &mut Collect, space: &ObjectSpace) -> (ComputeStatus, MemorySink) {
    let sink = MemorySink::new();
    let status = execute(collect, space, &sink.clone().into());
    (status, sink)
}

#[test]
fn grid_only_combine_attaches_nothing() {
    let space = ObjectSpace::new();
    let mut collect = Collect::default();
    collect
        .input("GridIn0")
        .unwrap()
        .feed(points(&space, "grid"))
        .unwrap();

    let (status, _) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Success);

    let result = collect.output("GeometryOut0").unwrap().current().unwrap();
    let geometry = result.as_geometry().unwrap();
    assert_eq!(geometry.grid().name(), "grid");
    assert_eq!(geometry.num_channels(), 0);
    assert!(!result.has_attribute(ATTR_BOUNDING_BOX));
}

#[test]
fn combine_retains_the_producer_references() {
    let space = ObjectSpace::new();
    let grid = points(&space, "grid");
    let colors = scalar_field(&space, "colors");

    let mut collect = Collect::default();
    collect.input("GridIn0").unwrap().feed(grid.clone()).unwrap();
    collect.input("DataIn0").unwrap().feed(colors.clone()).unwrap();

    let (status, _) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Success);

    // The composite holds its own references; the producers keep theirs.
    let result = collect.output("GeometryOut0").unwrap().current().unwrap();
    let geometry = result.as_geometry().unwrap();
    assert_eq!(geometry.colors().unwrap().name(), "colors");
    assert!(grid.ref_count() > 1);
    assert!(colors.ref_count() > 1);
}

#[test]
fn degenerate_bounds_omit_the_bounding_box() {
    let space = ObjectSpace::new();
    let mut collect = Collect::new(
        CollectParamsBuilder::default()
            .min_bound([0.0; 3])
            .max_bound([0.0; 3])
            .build()
            .unwrap(),
    );
    collect
        .input("GridIn0")
        .unwrap()
        .feed(points(&space, "grid"))
        .unwrap();
    let (status, _) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Success);
    let result = collect.output("GeometryOut0").unwrap().current().unwrap();
    assert!(!result.has_attribute(ATTR_BOUNDING_BOX));
}

#[test]
fn bounding_box_format_is_stable() {
    let space = ObjectSpace::new();
    let mut collect = Collect::new(
        CollectParamsBuilder::default()
            .max_bound([1.0; 3])
            .build()
            .unwrap(),
    );
    collect
        .input("GridIn0")
        .unwrap()
        .feed(points(&space, "grid"))
        .unwrap();
    let (status, _) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Success);
    let result = collect.output("GeometryOut0").unwrap().current().unwrap();
    assert_eq!(
        result.attribute(ATTR_BOUNDING_BOX).unwrap(),
        "0.000000 0.000000 0.000000 1.000000 1.000000 1.000000"
    );
}

#[test]
fn malformed_free_form_entries_are_dropped() {
    let space = ObjectSpace::new();
    let mut collect = Collect::new(
        CollectParamsBuilder::default()
            .attributes("a=1;b=2;bad;c=3".to_string())
            .build()
            .unwrap(),
    );
    collect
        .input("GridIn0")
        .unwrap()
        .feed(points(&space, "grid"))
        .unwrap();
    let (status, _) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Success);
    let result = collect.output("GeometryOut0").unwrap().current().unwrap();
    assert_eq!(result.attribute("a"), Some("1".to_string()));
    assert_eq!(result.attribute("b"), Some("2".to_string()));
    assert_eq!(result.attribute("c"), Some("3".to_string()));
    assert!(!result.has_attribute("bad"));
}

#[test]
fn variant_stamps_module_and_object_name() {
    let space = ObjectSpace::new();
    let mut collect = Collect::new(
        CollectParamsBuilder::default()
            .variant("wing".to_string())
            .build()
            .unwrap(),
    );
    collect
        .input("GridIn0")
        .unwrap()
        .feed(points(&space, "grid"))
        .unwrap();
    let (status, _) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Success);
    let result = collect.output("GeometryOut0").unwrap().current().unwrap();
    assert_eq!(result.attribute(ATTR_VARIANT), Some("wing".to_string()));
    assert_eq!(result.attribute(ATTR_MODULE), Some("Variant".to_string()));
    assert_eq!(result.attribute(ATTR_OBJECTNAME), Some("wing".to_string()));
}

#[test]
fn object_name_prefers_the_user_title_then_the_grid() {
    let space = ObjectSpace::new();
    let grid = points(&space, "grid");
    grid.add_attribute(ATTR_OBJECTNAME, "inherited");

    let mut collect = Collect::default();
    collect.input("GridIn0").unwrap().feed(grid.clone()).unwrap();
    let (status, _) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Success);
    let result = collect.output("GeometryOut0").unwrap().current().unwrap();
    assert_eq!(result.attribute(ATTR_OBJECTNAME), Some("inherited".to_string()));

    collect.info_mut().set_title("my wing");
    let (status, _) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Success);
    let result = collect.output("GeometryOut0").unwrap().current().unwrap();
    assert_eq!(result.attribute(ATTR_OBJECTNAME), Some("my wing".to_string()));
}

#[test]
fn empty_variant_is_still_stamped() {
    let space = ObjectSpace::new();
    let mut collect = Collect::default();
    collect
        .input("GridIn0")
        .unwrap()
        .feed(points(&space, "grid"))
        .unwrap();
    let (status, _) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Success);
    let result = collect.output("GeometryOut0").unwrap().current().unwrap();
    assert_eq!(result.attribute(ATTR_VARIANT), Some(String::new()));
    assert!(!result.has_attribute(ATTR_MODULE));
    assert!(!result.has_attribute(ATTR_OBJECTNAME));
}

#[test]
fn missing_grid_fails_without_output() {
    let space = ObjectSpace::new();
    let mut collect = Collect::default();
    let (status, sink) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Fail);
    assert!(collect.output("GeometryOut0").unwrap().current().is_none());
    assert_eq!(sink.messages().len(), 1);
}

#[test]
fn material_mode_copies_the_grid_and_stamps_the_tree() {
    let space = ObjectSpace::new();
    let a = points(&space, "a");
    let b = points(&space, "b");
    let series = space
        .create("series", Payload::Set(SetData::new(vec![a, b])))
        .unwrap();

    let mut collect = Collect::new(
        CollectParamsBuilder::default()
            .material(Some("metal".to_string()))
            .build()
            .unwrap(),
    );
    collect.input("GridIn0").unwrap().feed(series.clone()).unwrap();
    let (status, _) = run(&mut collect, &space);
    assert_eq!(status, ComputeStatus::Success);

    let result = collect.output("GeometryOut0").unwrap().current().unwrap();
    assert_eq!(result.attribute(ATTR_MATERIAL), Some("MAT: metal".to_string()));

    // The composite wraps a private copy; the original set is untouched.
    let copied_grid = result.as_geometry().unwrap().grid().clone();
    assert_ne!(copied_grid.name(), "series");
    assert!(!series.has_attribute(ATTR_MATERIAL));
    for child in copied_grid.as_set().unwrap().children() {
        assert_eq!(child.attribute(ATTR_MATERIAL), Some("MAT: metal".to_string()));
    }
    for child in series.as_set().unwrap().children() {
        assert!(!child.has_attribute(ATTR_MATERIAL));
    }
}
