use ndarray::Array1;
use vizflow::object::{Payload, SetData};
use vizflow::space::ObjectSpace;

fn field(space: &ObjectSpace, name: &str) -> vizflow::space::ObjectHandle {
    space
        .create(name, Payload::Float(Array1::zeros(16)))
        .unwrap()
}

/// N extra holders plus the original: destruction happens exactly once,
/// after the last release, never before.
#[test]
fn destruction_after_the_last_release() {
    let space = ObjectSpace::new();
    let original = field(&space, "field");

    let holders: Vec<_> = (0..10).map(|_| original.clone()).collect();
    assert_eq!(original.ref_count(), 11);

    drop(original);
    for holder in holders {
        assert_eq!(space.stats().destroyed, 0);
        assert!(space.contains("field"));
        drop(holder);
    }
    assert_eq!(space.stats().destroyed, 1);
    assert!(!space.contains("field"));
}

#[test]
fn lookup_based_sharing_counts_as_holding() {
    let space = ObjectSpace::new();
    let original = field(&space, "field");
    let shared = space.lookup("field").unwrap();
    drop(original);
    assert!(space.contains("field"));
    assert_eq!(shared.attribute("X"), None);
    drop(shared);
    assert!(!space.contains("field"));
}

#[test]
fn shared_set_children_survive_either_owner() {
    let space = ObjectSpace::new();
    let step = field(&space, "step");
    let first = space
        .create("a", Payload::Set(SetData::new(vec![step.clone()])))
        .unwrap();
    let second = space
        .create("b", Payload::Set(SetData::new(vec![step.clone()])))
        .unwrap();
    drop(step);

    drop(first);
    assert!(space.contains("step"));
    drop(second);
    assert!(!space.contains("step"));
    assert_eq!(space.stats().destroyed, 3);
}

#[test]
fn concurrent_clone_and_drop_destroys_once() {
    let space = ObjectSpace::new();
    let original = field(&space, "field");

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let space = space.clone();
            scope.spawn(move || {
                for _ in 0..1000 {
                    if let Some(handle) = space.lookup("field") {
                        let extra = handle.clone();
                        drop(handle);
                        drop(extra);
                    }
                }
            });
        }
    });

    assert_eq!(original.ref_count(), 1);
    assert_eq!(space.stats().destroyed, 0);
    drop(original);
    assert_eq!(space.stats().destroyed, 1);
}

#[test]
fn concurrent_creation_under_distinct_names() {
    let space = ObjectSpace::new();
    std::thread::scope(|scope| {
        for thread in 0..4 {
            let space = space.clone();
            scope.spawn(move || {
                for index in 0..100 {
                    let name = format!("t{}_{}", thread, index);
                    let handle = field(&space, &name);
                    assert!(space.contains(&name));
                    drop(handle);
                }
            });
        }
    });
    let stats = space.stats();
    assert_eq!(stats.created, 400);
    assert_eq!(stats.destroyed, 400);
    assert_eq!(stats.bound, 0);
}

#[test]
fn deep_clone_of_nested_sets() {
    let space = ObjectSpace::new();
    let inner_child = field(&space, "leaf");
    inner_child.add_attribute("DEPTH", "2");
    let inner = space
        .create("inner", Payload::Set(SetData::new(vec![inner_child])))
        .unwrap();
    let outer = space
        .create("outer", Payload::Set(SetData::new(vec![inner])))
        .unwrap();

    let copy = space.clone_object(&outer, "copy").unwrap();
    let copied_inner = &copy.as_set().unwrap().children()[0];
    assert_eq!(copied_inner.name(), "copy_1");
    let copied_leaf = &copied_inner.as_set().unwrap().children()[0];
    assert_eq!(copied_leaf.name(), "copy_1_1");
    assert_eq!(copied_leaf.attribute("DEPTH"), Some("2".to_string()));

    // The copy is fully independent of the original tree.
    drop(outer);
    assert!(space.contains("copy_1_1"));
    assert!(!space.contains("leaf"));
}
