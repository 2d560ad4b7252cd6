use std::sync::atomic::Ordering;
use std::sync::Arc;

use apiver_core::{
    ApiVersion, ControllerDescriptor, DescriptorGroup, FilterScope, HeaderReader, IndexedSequence,
    VersioningError, VersioningOptions,
};
use apiver_test::{named_filter, single_filter, RecordingDescriptor, RequestBuilder};

fn users(label: &str, versions: &[&str]) -> RecordingDescriptor {
    RecordingDescriptor::new("users", label).versions(versions.iter().copied())
}

fn v1_v2() -> DescriptorGroup<RecordingDescriptor> {
    DescriptorGroup::new("users", None, vec![users("v1", &["1.0"]), users("v2", &["2.0"])]).unwrap()
}

fn label(group: &DescriptorGroup<RecordingDescriptor>, parts: &http::request::Parts) -> String {
    group.create_controller(parts).unwrap().label
}

// ── Construction ────────────────────────────────────────────────────────

#[test]
fn empty_group_is_rejected() {
    let err = DescriptorGroup::new("users", None, Vec::<RecordingDescriptor>::new()).unwrap_err();
    assert!(matches!(err, VersioningError::InvalidArgument(_)));
}

#[test]
fn empty_name_is_rejected() {
    let err = DescriptorGroup::new("  ", None, vec![users("v1", &["1.0"])]).unwrap_err();
    assert!(matches!(err, VersioningError::InvalidArgument(_)));
}

#[test]
fn from_descriptors_takes_first_name() {
    let group = DescriptorGroup::from_descriptors([users("v1", &["1.0"])]).unwrap();
    assert_eq!(group.controller_name(), "users");
    assert!(matches!(
        DescriptorGroup::from_descriptors(Vec::<RecordingDescriptor>::new()),
        Err(VersioningError::InvalidArgument(_))
    ));
}

#[test]
fn shared_collection_is_not_copied() {
    let members: Arc<[RecordingDescriptor]> = Arc::from(vec![users("v1", &["1.0"])]);
    let group = DescriptorGroup::new("users", None, members.clone()).unwrap();
    assert!(Arc::ptr_eq(group.descriptors(), &members));
    let clone = group.clone();
    assert!(Arc::ptr_eq(clone.descriptors(), &members));
}

#[test]
fn invalid_options_fail_construction() {
    let options = VersioningOptions {
        query_parameter: None,
        headers: Vec::new(),
        media_type_parameter: None,
        ..VersioningOptions::default()
    };
    let err = DescriptorGroup::new("users", Some(Arc::new(options)), vec![users("v1", &["1.0"])])
        .unwrap_err();
    assert!(matches!(err, VersioningError::Config(_)));
}

// ── Selection ───────────────────────────────────────────────────────────

#[test]
fn single_member_always_serves() {
    let group = DescriptorGroup::new("users", None, vec![users("only", &["1.0"])]).unwrap();
    for parts in [
        RequestBuilder::get("/").parts(),
        RequestBuilder::get("/").api_version("9.0").parts(),
        // Ambiguous, but a single member never reads the version.
        RequestBuilder::get("/").api_version("1.0").header("api-version", "2.0").parts(),
    ] {
        assert_eq!(label(&group, &parts), "only");
    }
}

#[test]
fn matching_version_selects_member() {
    let group = v1_v2();
    let parts = RequestBuilder::get("/").api_version("2.0").parts();
    assert_eq!(label(&group, &parts), "v2");
}

#[test]
fn unmatched_version_falls_back_to_first() {
    let group = v1_v2();
    let parts = RequestBuilder::get("/").api_version("3.0").parts();
    assert_eq!(label(&group, &parts), "v1");
}

#[test]
fn unspecified_version_uses_first() {
    let group = v1_v2();
    let parts = RequestBuilder::get("/").parts();
    assert_eq!(label(&group, &parts), "v1");
}

#[test]
fn unparseable_version_uses_first() {
    let group = v1_v2();
    let parts = RequestBuilder::get("/").api_version("latest").parts();
    assert_eq!(label(&group, &parts), "v1");
}

#[test]
fn first_declaring_member_wins() {
    let group = DescriptorGroup::new(
        "users",
        None,
        vec![
            users("v1", &["1.0"]),
            users("v2-a", &["2.0"]),
            users("v2-b", &["2.0", "3.0"]),
        ],
    )
    .unwrap();
    let parts = RequestBuilder::get("/").api_version("2.0").parts();
    assert_eq!(label(&group, &parts), "v2-a");
    let parts = RequestBuilder::get("/").api_version("3.0").parts();
    assert_eq!(label(&group, &parts), "v2-b");
}

#[test]
fn implied_minor_matches() {
    let group = v1_v2();
    let parts = RequestBuilder::get("/").api_version("2").parts();
    assert_eq!(label(&group, &parts), "v2");
}

#[test]
fn version_from_header() {
    let group = v1_v2();
    let parts = RequestBuilder::get("/").header("api-version", "2.0").parts();
    assert_eq!(label(&group, &parts), "v2");
}

#[test]
fn ambiguous_request_fails() {
    let group = v1_v2();
    let parts = RequestBuilder::get("/")
        .api_version("1.0")
        .header("api-version", "2.0")
        .parts();
    assert!(matches!(
        group.create_controller(&parts),
        Err(VersioningError::AmbiguousApiVersion(_))
    ));
}

#[test]
fn creation_is_delegated_to_selected_member_only() {
    let v1 = users("v1", &["1.0"]);
    let v2 = users("v2", &["2.0"]);
    let (c1, c2) = (v1.counter(), v2.counter());
    let group = DescriptorGroup::new("users", None, vec![v1, v2]).unwrap();

    group
        .create_controller(&RequestBuilder::get("/").api_version("2.0").parts())
        .unwrap();
    assert_eq!(c1.load(Ordering::SeqCst), 0);
    assert_eq!(c2.load(Ordering::SeqCst), 1);
}

#[test]
fn member_errors_propagate() {
    let group = DescriptorGroup::new(
        "users",
        None,
        vec![users("v1", &["1.0"]), users("v2", &["2.0"]).failing("no container")],
    )
    .unwrap();
    let parts = RequestBuilder::get("/").api_version("2.0").parts();
    assert_eq!(
        group.create_controller(&parts).unwrap_err(),
        VersioningError::Controller("no container".into())
    );
}

#[test]
fn custom_reader_is_used() {
    let group = v1_v2().with_reader(HeaderReader::new(["x-version"]).unwrap());
    let parts = RequestBuilder::get("/")
        .api_version("1.0")
        .header("x-version", "2.0")
        .parts();
    assert_eq!(label(&group, &parts), "v2");
}

#[test]
fn options_reader_is_used() {
    let options = VersioningOptions {
        query_parameter: Some("v".into()),
        headers: Vec::new(),
        ..VersioningOptions::default()
    };
    let group = DescriptorGroup::new(
        "users",
        Some(Arc::new(options)),
        vec![users("v1", &["1.0"]), users("v2", &["2.0"])],
    )
    .unwrap();
    assert_eq!(label(&group, &RequestBuilder::get("/").query("v", "2.0").parts()), "v2");
    assert_eq!(
        label(&group, &RequestBuilder::get("/").header("api-version", "2.0").parts()),
        "v1"
    );
}

#[test]
fn assume_default_version_when_unspecified() {
    let options = VersioningOptions {
        default_version: ApiVersion::new(2, 0),
        assume_default_version_when_unspecified: true,
        ..VersioningOptions::default()
    };
    let group = DescriptorGroup::new(
        "users",
        Some(Arc::new(options)),
        vec![users("v1", &["1.0"]), users("v2", &["2.0"])],
    )
    .unwrap();
    assert_eq!(label(&group, &RequestBuilder::get("/").parts()), "v2");
    assert_eq!(label(&group, &RequestBuilder::get("/").api_version("1.0").parts()), "v1");
}

#[test]
fn select_returns_member_reference() {
    let group = v1_v2();
    let parts = RequestBuilder::get("/").api_version("2.0").parts();
    let selected = group.select(&parts).unwrap();
    assert_eq!(selected.label(), "v2");
    assert_eq!(group.default_descriptor().label(), "v1");
}

// ── Metadata ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Tag(&'static str);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Other(u8);

#[test]
fn attributes_are_merged_without_duplicates() {
    let group = DescriptorGroup::new(
        "users",
        None,
        vec![
            users("v1", &["1.0"]).attribute(Tag("a")).attribute(Tag("b")),
            users("v2", &["2.0"]).attribute(Tag("b")).attribute(Tag("c")).attribute(Other(1)),
        ],
    )
    .unwrap();
    assert_eq!(group.custom_attributes::<Tag>(false), vec![Tag("a"), Tag("b"), Tag("c")]);
    assert_eq!(group.custom_attributes::<Other>(false), vec![Other(1)]);
    // Idempotent.
    assert_eq!(group.custom_attributes::<Tag>(false), group.custom_attributes::<Tag>(false));
}

#[test]
fn inherit_is_passed_through() {
    let group = DescriptorGroup::new(
        "users",
        None,
        vec![
            users("v1", &["1.0"]).attribute(Tag("own")).inherited_attribute(Tag("base")),
            users("v2", &["2.0"]).inherited_attribute(Tag("base")),
        ],
    )
    .unwrap();
    assert_eq!(group.custom_attributes::<Tag>(false), vec![Tag("own")]);
    assert_eq!(group.custom_attributes::<Tag>(true), vec![Tag("own"), Tag("base")]);
}

#[test]
fn filters_are_merged_by_instance() {
    let shared = named_filter("auth", FilterScope::Global);
    let group = DescriptorGroup::new(
        "users",
        None,
        vec![
            users("v1", &["1.0"])
                .filter(shared.clone())
                .filter(named_filter("log", FilterScope::Controller)),
            users("v2", &["2.0"])
                .filter(shared.clone())
                .filter(named_filter("log", FilterScope::Controller)),
        ],
    )
    .unwrap();
    let filters = group.filters();
    let names: Vec<&str> = filters.iter().map(|f| f.name()).collect();
    // The shared instance appears once; the two distinct "log" instances both stay.
    assert_eq!(names, vec!["auth", "log", "log"]);
    assert_eq!(group.filters(), group.filters());
}

#[test]
fn single_instance_filters_collapse_by_name_and_scope() {
    let group = DescriptorGroup::new(
        "users",
        None,
        vec![
            users("v1", &["1.0"])
                .filter(single_filter("rate-limit", FilterScope::Controller))
                .filter(single_filter("rate-limit", FilterScope::Action)),
            users("v2", &["2.0"])
                .filter(single_filter("rate-limit", FilterScope::Controller))
                .filter(named_filter("log", FilterScope::Controller)),
        ],
    )
    .unwrap();
    let filters = group.filters();
    let entries: Vec<(&str, FilterScope)> = filters.iter().map(|f| (f.name(), f.scope())).collect();
    assert_eq!(
        entries,
        vec![
            ("rate-limit", FilterScope::Controller),
            ("rate-limit", FilterScope::Action),
            ("log", FilterScope::Controller),
        ]
    );
    assert!(Arc::ptr_eq(filters[0].filter(), group.get(0).unwrap().filters()[0].filter()));
}

#[test]
fn selected_member_is_debuggable() {
    let group = v1_v2();
    let selected = group.select(&RequestBuilder::get("/").api_version("2.0").parts()).unwrap();
    let rendered = format!("{selected:?}");
    assert!(rendered.starts_with("RecordingDescriptor"), "{rendered}");
    assert!(rendered.contains("\"v2\""), "{rendered}");
}

#[test]
fn declared_versions_are_the_union() {
    let group = DescriptorGroup::new(
        "users",
        None,
        vec![users("v1", &["1.0", "1.1"]), users("v2", &["2.0", "1.1"])],
    )
    .unwrap();
    let versions: Vec<String> = group.declared_versions().iter().map(ToString::to_string).collect();
    assert_eq!(versions, ["1.0", "1.1", "2.0"]);
    assert!(group.supports(&ApiVersion::new(2, 0)));
    assert!(!group.supports(&ApiVersion::new(3, 0)));
}

#[test]
fn groups_compose() {
    let inner = v1_v2();
    let outer = DescriptorGroup::new(
        "users",
        None,
        vec![inner, DescriptorGroup::new("users", None, vec![users("v3", &["3.0"])]).unwrap()],
    )
    .unwrap();
    let parts = RequestBuilder::get("/").api_version("3.0").parts();
    assert_eq!(outer.create_controller(&parts).unwrap().label, "v3");
    let parts = RequestBuilder::get("/").api_version("2.0").parts();
    assert_eq!(outer.create_controller(&parts).unwrap().label, "v2");
}

// ── Indexed sequence ────────────────────────────────────────────────────

#[test]
fn indexed_access_is_bounds_checked() {
    let group = v1_v2();
    assert_eq!(group.len(), 2);
    assert!(!group.is_empty());
    assert_eq!(group.get(0).unwrap().label(), "v1");
    assert_eq!(group.get(1).unwrap().label(), "v2");
    assert_eq!(
        group.get(2).unwrap_err(),
        VersioningError::IndexOutOfRange { index: 2, len: 2 }
    );
    assert!(matches!(
        group.get(usize::MAX),
        Err(VersioningError::IndexOutOfRange { len: 2, .. })
    ));
    assert_eq!(group.get_signed(1).unwrap().label(), "v2");
    assert_eq!(
        group.get_signed(-1).unwrap_err(),
        VersioningError::IndexOutOfRange { index: -1, len: 2 }
    );
}

#[test]
fn iteration_is_ordered_and_restartable() {
    let group = v1_v2();
    let first: Vec<&str> = group.iter().map(|d| d.label()).collect();
    let second: Vec<&str> = (&group).into_iter().map(|d| d.label()).collect();
    assert_eq!(first, ["v1", "v2"]);
    assert_eq!(first, second);
    let mut count = 0;
    for _ in &group {
        count += 1;
    }
    assert_eq!(count, group.len());
}

#[test]
fn group_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DescriptorGroup<RecordingDescriptor>>();
}
