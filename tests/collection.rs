// Copyright 2024 - 2026 Martin Pool

//! End-to-end tests of path discovery, shadowing, and class resolution over
//! real (temporary) MATLAB trees.

use indoc::indoc;
use pretty_assertions::assert_eq;
use test_log::test;

use matmap::{ArgumentKind, Entity, Error, Kind, PathsCollection};

mod util;
use util::TestTree;

fn get(collection: &PathsCollection, identifier: &str) -> Entity {
    collection
        .get(identifier)
        .unwrap()
        .unwrap_or_else(|| panic!("{identifier} should resolve"))
}

fn as_function(entity: &Entity) -> &std::sync::Arc<matmap::Function> {
    match entity {
        Entity::Function(function) => function,
        other => panic!("expected a function, got {other:?}"),
    }
}

fn as_class(entity: &Entity) -> &std::sync::Arc<matmap::Class> {
    match entity {
        Entity::Class(class) => class,
        other => panic!("expected a class, got {other:?}"),
    }
}

#[test]
fn plain_function_file_resolves_by_stem() {
    let tree = TestTree::new();
    tree.file("src/foo.m", "function foo()\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let foo = get(&collection, "foo");
    assert_eq!(foo.kind(), Kind::Function);
    assert!(as_function(&foo).arguments().is_empty());
    assert_eq!(foo.filepath().unwrap(), tree.path("src/foo.m"));
}

#[test]
fn namespace_member_has_dotted_identifier_and_path() {
    let tree = TestTree::new();
    tree.file("src/+pkg/bar.m", "function bar(x)\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();

    let bar = get(&collection, "pkg.bar");
    assert_eq!(bar.canonical_path(), "pkg.bar");

    let pkg = get(&collection, "+pkg");
    assert_eq!(pkg.kind(), Kind::Namespace);
    assert_eq!(pkg.path(), "+pkg");
    let member = pkg.members()["bar"].target().unwrap();
    assert!(member.ptr_eq(&bar), "namespace member is the same object");
}

#[test]
fn namespace_members_carry_the_namespace_prefix() {
    let tree = TestTree::new();
    tree.file("src/+outer/+inner/deep.m", "function deep()\nend\n")
        .file("src/+outer/shallow.m", "function shallow()\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    assert_eq!(
        get(&collection, "outer.inner.deep").canonical_path(),
        "outer.inner.deep"
    );
    assert_eq!(
        get(&collection, "outer.shallow").canonical_path(),
        "outer.shallow"
    );
    let inner = get(&collection, "+outer.inner");
    assert!(inner.canonical_path().starts_with("outer."));
}

#[test]
fn class_folder_assembles_methods_with_the_class_as_parent() {
    let tree = TestTree::new();
    tree.file(
        "src/@Widget/Widget.m",
        indoc! {"
            classdef Widget < handle
                properties
                    value
                end
            end
        "},
    )
    .file("src/@Widget/resize.m", "function resize(obj, n)\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();

    let widget = get(&collection, "Widget");
    assert_eq!(widget.kind(), Kind::Class);
    assert_eq!(as_class(&widget).bases(), ["handle"]);

    let resize = widget.members()["resize"].target().unwrap();
    assert!(resize.parent().unwrap().ptr_eq(&widget));

    // The implicit instance argument is stripped.
    let arguments = as_function(&resize).arguments();
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments[0].name(), "n");

    // Dotted member lookup reaches the method too.
    let dotted = get(&collection, "Widget.resize");
    assert!(dotted.ptr_eq(&resize));
}

#[test]
fn class_folder_accessor_file_binds_to_the_property() {
    let tree = TestTree::new();
    tree.file(
        "src/@Widget/Widget.m",
        indoc! {"
            classdef Widget
                properties
                    value
                end
            end
        "},
    )
    .file(
        "src/@Widget/get.value.m",
        "function v = get.value(obj)\nv = obj.value;\nend\n",
    );
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();

    let widget = get(&collection, "Widget");
    let members = widget.members();
    assert!(
        !members.contains_key("get.value"),
        "accessor is not a separate method"
    );
    let value = members["value"].target().unwrap();
    let Entity::Property(property) = &value else {
        panic!("value should be a property");
    };
    let getter = property.getter().expect("getter should be bound");
    assert!(getter.is_getter());
}

#[test]
fn earlier_root_shadows_later_and_removal_unshadows() {
    let tree = TestTree::new();
    tree.file("A/util.m", "function util()\nend\n")
        .file("B/util.m", "function util()\nend\n");
    let collection =
        PathsCollection::new([tree.path("A"), tree.path("B")], false).unwrap();

    assert_eq!(
        get(&collection, "util").filepath().unwrap(),
        tree.path("A/util.m")
    );

    collection.rm_path(tree.path("A"), false).unwrap();
    assert_eq!(
        get(&collection, "util").filepath().unwrap(),
        tree.path("B/util.m")
    );
}

#[test]
fn addpath_to_front_shadows_existing_candidates() {
    let tree = TestTree::new();
    tree.file("A/util.m", "function util()\nend\n")
        .file("B/util.m", "function util()\nend\n");
    let collection = PathsCollection::new([tree.path("A")], false).unwrap();
    collection.addpath(tree.path("B"), false, false).unwrap();
    assert_eq!(
        get(&collection, "util").filepath().unwrap(),
        tree.path("B/util.m")
    );
}

#[test]
fn addpath_is_idempotent_and_rm_path_restores_the_previous_state() {
    let tree = TestTree::new();
    tree.file("A/one.m", "function one()\nend\n")
        .file("B/two.m", "function two()\nend\n");
    let collection = PathsCollection::new([tree.path("A")], false).unwrap();
    let before: Vec<String> = collection.members().keys().cloned().collect();

    collection.addpath(tree.path("A"), true, false).unwrap();
    let repeated: Vec<String> = collection.members().keys().cloned().collect();
    assert_eq!(before, repeated);
    assert_eq!(collection.search_path(), [tree.path("A")]);

    collection.addpath(tree.path("B"), true, false).unwrap();
    assert!(collection.contains("two"));
    collection.rm_path(tree.path("B"), false).unwrap();
    let after: Vec<String> = collection.members().keys().cloned().collect();
    assert_eq!(before, after);
    assert!(!collection.contains("two"));
}

#[test]
fn rm_path_recursive_removes_sub_roots() {
    let tree = TestTree::new();
    tree.file("outer/a.m", "function a()\nend\n")
        .file("outer/sub/b.m", "function b()\nend\n");
    let collection =
        PathsCollection::new([tree.path("outer"), tree.path("outer/sub")], false).unwrap();
    assert!(collection.contains("a"));
    assert!(collection.contains("b"));
    collection.rm_path(tree.path("outer"), true).unwrap();
    assert!(collection.is_empty());
    assert!(collection.search_path().is_empty());
}

#[test]
fn rm_path_of_unknown_root_is_a_no_op() {
    let tree = TestTree::new();
    tree.file("src/foo.m", "function foo()\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    collection.rm_path(tree.path("elsewhere"), false).unwrap();
    assert!(collection.contains("foo"));
}

#[test]
fn identifiers_round_trip_to_their_files() {
    let tree = TestTree::new();
    tree.file("src/top.m", "function top()\nend\n")
        .file("src/+pkg/inner.m", "function inner()\nend\n")
        .file("src/sub/nested.m", "function nested()\nend\n");
    let collection = PathsCollection::new([tree.path("src")], true).unwrap();
    for (identifier, file) in [
        ("top", "src/top.m"),
        ("pkg.inner", "src/+pkg/inner.m"),
        ("nested", "src/sub/nested.m"),
    ] {
        assert_eq!(
            get(&collection, identifier).filepath().unwrap(),
            tree.path(file),
            "{identifier} should round-trip"
        );
    }
}

#[test]
fn mro_is_c3_linearized() {
    let tree = TestTree::new();
    tree.file("src/H.m", "classdef H\nend\n")
        .file("src/A.m", "classdef A < H\nend\n")
        .file("src/B.m", "classdef B < H\nend\n")
        .file("src/C.m", "classdef C < A & B\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let c = get(&collection, "C");
    let mro: Vec<String> = as_class(&c)
        .mro()
        .unwrap()
        .iter()
        .map(|class| class.path())
        .collect();
    assert_eq!(mro, ["A", "B", "H"]);
}

#[test]
fn inheritance_cycle_is_reported_with_its_chain() {
    let tree = TestTree::new();
    tree.file("src/A.m", "classdef A < C\nend\n")
        .file("src/C.m", "classdef C < A\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let c = get(&collection, "C");
    let err = as_class(&c).mro().unwrap_err();
    match err {
        Error::InheritanceCycle { ref chain } => {
            assert_eq!(chain, &["C", "A", "C"]);
        }
        other => panic!("expected InheritanceCycle, got {other}"),
    }
}

#[test]
fn unresolvable_bases_are_kept_as_strings_but_skipped_in_mro() {
    let tree = TestTree::new();
    tree.file("src/Child.m", "classdef Child < matlab.mixin.Copyable\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let child = get(&collection, "Child");
    assert_eq!(as_class(&child).bases(), ["matlab.mixin.Copyable"]);
    assert_eq!(as_class(&child).mro().unwrap().len(), 0);
}

#[test]
fn inherited_members_project_through_the_mro() {
    let tree = TestTree::new();
    tree.file(
        "src/Base.m",
        indoc! {"
            classdef Base
                methods
                    function greet(obj)
                    end
                end
            end
        "},
    )
    .file("src/Derived.m", "classdef Derived < Base\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let derived = get(&collection, "Derived");
    assert!(!derived.members().contains_key("greet"));
    let all = derived.all_members().unwrap();
    let greet = &all["greet"];
    assert!(greet.is_inherited());
    assert_eq!(greet.target().unwrap().kind(), Kind::Function);
    // The projected member is addressed at the derived class.
    assert_eq!(greet.path(), "Derived.greet");
}

#[test]
fn declared_members_win_over_inherited_ones() {
    let tree = TestTree::new();
    tree.file(
        "src/Base.m",
        indoc! {"
            classdef Base
                methods
                    function greet(obj)
                    end
                end
            end
        "},
    )
    .file(
        "src/Derived.m",
        indoc! {"
            classdef Derived < Base
                methods
                    function greet(obj, name)
                    end
                end
            end
        "},
    );
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let derived = get(&collection, "Derived");
    let all = derived.all_members().unwrap();
    assert!(!all["greet"].is_inherited());
    let greet = all["greet"].target().unwrap();
    assert_eq!(as_function(&greet).arguments().len(), 1);
}

#[test]
fn keyword_only_arguments_replace_the_options_placeholder() {
    let tree = TestTree::new();
    tree.file(
        "src/opts_fn.m",
        indoc! {"
            function result = opts_fn(x, options)
                arguments
                    x double
                    options.flag (1,1) logical = false
                end
                result = x;
            end
        "},
    );
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let function = get(&collection, "opts_fn");
    let arguments = as_function(&function).arguments();
    let names: Vec<&str> = arguments.iter().map(|a| a.name()).collect();
    assert_eq!(names, ["x", "flag"]);
    assert_eq!(arguments.get("flag").unwrap().kind(), ArgumentKind::KeywordOnly);
    assert_eq!(
        arguments.get("x").unwrap().kind(),
        ArgumentKind::PositionalOnly
    );
    assert_eq!(
        arguments.get("x").unwrap().ty().unwrap().to_string(),
        "double"
    );
}

#[test]
fn docstring_is_extracted_and_pragmas_are_stripped() {
    let tree = TestTree::new();
    tree.file(
        "src/f.m",
        indoc! {"
            function y = f(x)
            %F One-line summary.
            %  Detailed.
            %#codegen
            y = x;
            end
        "},
    );
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let f = get(&collection, "f");
    let docstring = f.docstring().expect("f should have a docstring");
    assert!(docstring.value().starts_with("F One-line summary."));
    assert!(docstring.value().contains("Detailed."));
    assert!(!docstring.value().contains("%#codegen"));
    assert!(!docstring.value().contains("codegen"));
}

#[test]
fn folder_docstring_comes_from_contents_m() {
    let tree = TestTree::new();
    tree.file("src/util.m", "function util()\nend\n").file(
        "src/Contents.m",
        "% My Toolbox\n% Utility routines.\n",
    );
    let collection =
        PathsCollection::with_working_directory([tree.path("src")], false, &tree.root).unwrap();
    assert!(!collection.contains("Contents"));
    let folder = get(&collection, "./src");
    assert_eq!(folder.kind(), Kind::Folder);
    let docstring = folder.docstring().expect("folder docstring from Contents.m");
    assert!(docstring.value().contains("My Toolbox"));
}

#[test]
fn readme_is_the_docstring_fallback_for_namespaces() {
    let tree = TestTree::new();
    tree.file("src/+pkg/bar.m", "function bar()\nend\n")
        .file("src/+pkg/README.md", "Package documentation.\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let pkg = get(&collection, "+pkg");
    assert!(pkg
        .docstring()
        .unwrap()
        .value()
        .contains("Package documentation."));
}

#[test]
fn filesystem_relative_lookup_finds_folder_members() {
    let tree = TestTree::new();
    tree.file("src/util.m", "function util()\nend\n");
    let collection =
        PathsCollection::with_working_directory([tree.path("src")], false, &tree.root).unwrap();
    let util = get(&collection, "src/util.m");
    assert_eq!(util.kind(), Kind::Function);
    assert_eq!(util.filepath().unwrap(), tree.path("src/util.m"));
}

#[test]
fn scripts_are_recognized_and_carry_the_header_docstring() {
    let tree = TestTree::new();
    tree.file(
        "src/setup_env.m",
        "% Configure the environment.\nx = 1;\ndisp(x)\n",
    );
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let script = get(&collection, "setup_env");
    assert_eq!(script.kind(), Kind::Script);
    assert!(script
        .docstring()
        .unwrap()
        .value()
        .contains("Configure the environment."));
}

#[test]
fn lines_and_source_are_cached_at_parse_time() {
    let tree = TestTree::new();
    tree.file(
        "src/f.m",
        "function y = f(x)\ny = x + 1;\nend\n",
    );
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let f = get(&collection, "f");
    assert_eq!(f.lineno(), Some(1));
    assert_eq!(f.endlineno(), Some(3));
    let lines = f.lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "y = x + 1;");
    assert!(f.source().starts_with("function y = f(x)"));
    assert!(collection.lines(tree.path("src/f.m")).is_some());
}

#[test]
fn missing_identifiers_resolve_to_none() {
    let tree = TestTree::new();
    tree.file("src/foo.m", "function foo()\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    assert!(collection.get("missing").unwrap().is_none());
    assert!(collection.get("foo.not_a_member").unwrap().is_none());
    assert!(!collection.contains("missing"));
}

#[test]
fn file_deleted_after_discovery_raises_file_not_found() {
    let tree = TestTree::new();
    tree.file("src/gone.m", "function gone()\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    std::fs::remove_file(tree.path("src/gone.m")).unwrap();
    let err = collection.get("gone").unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[test]
fn parse_failure_does_not_poison_other_entries() {
    let tree = TestTree::new();
    tree.file("src/ok.m", "function ok()\nend\n")
        .file("src/broken.m", "function broken(\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    // Whatever happens to the broken file, the healthy one still resolves.
    let _ = collection.get("broken");
    assert_eq!(get(&collection, "ok").kind(), Kind::Function);
}

#[test]
fn non_utf8_roots_are_rejected() {
    #[cfg(unix)]
    {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        let bogus = std::path::PathBuf::from(OsStr::from_bytes(b"\xff\xfe"));
        let err = PathsCollection::new([bogus], false).unwrap_err();
        assert!(matches!(err, Error::InvalidRoot { .. }));
    }
}

#[test]
fn internal_namespaces_hide_their_contents() {
    let tree = TestTree::new();
    tree.file("src/+internal/helper.m", "function helper()\nend\n")
        .file("src/visible.m", "function visible()\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let helper = get(&collection, "internal.helper");
    assert!(helper.is_internal());
    assert!(helper.is_hidden());
    assert!(!get(&collection, "visible").is_hidden());
}

#[test]
fn member_order_is_stable_and_lexicographic() {
    let tree = TestTree::new();
    tree.file("src/zeta.m", "function zeta()\nend\n")
        .file("src/alpha.m", "function alpha()\nend\n")
        .file("src/mid.m", "function mid()\nend\n");
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let identifiers: Vec<String> = collection.members().keys().cloned().collect();
    assert_eq!(identifiers, ["alpha", "mid", "zeta"]);
}

#[test]
fn method_attribute_names_include_narrowed_access() {
    let tree = TestTree::new();
    tree.file(
        "src/Locked.m",
        indoc! {"
            classdef Locked
                methods (Static, Access = private)
                    function go()
                    end
                end
            end
        "},
    );
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let locked = get(&collection, "Locked");
    let go = locked.members()["go"].target().unwrap();
    let Entity::Function(go) = &go else {
        panic!("go should be a function");
    };
    assert_eq!(go.attribute_names(), ["Static", "Access=private"]);
}

#[test]
fn class_constructor_supplies_the_class_arguments() {
    let tree = TestTree::new();
    tree.file(
        "src/Point.m",
        indoc! {"
            classdef Point
                methods
                    function obj = Point(x, y)
                    end
                end
            end
        "},
    );
    let collection = PathsCollection::new([tree.path("src")], false).unwrap();
    let point = get(&collection, "Point");
    let class = as_class(&point);
    let constructor = class.constructor().unwrap().expect("Point has a constructor");
    assert!(constructor.is_constructor_method());
    // Constructors keep their full argument list.
    let arguments = class.arguments().unwrap();
    let names: Vec<&str> = arguments.iter().map(|a| a.name()).collect();
    assert_eq!(names, ["x", "y"]);
}
