use super::support::*;
use crate::{
    interface::Builder,
    language::{
        ast::NodeFactory,
        names::TypeName,
        registry::Signatures,
        signature::MethodKind,
        types::TypeExpr,
    },
    typecheck::{check_node, Assignability, Subtyping, TypeErrorKind, TypecheckOptions},
};

fn app_signatures() -> Signatures {
    signatures(vec![
        class("::Base").done(),
        class("::Derived")
            .inherits("Base", &[])
            .members(vec![include("Comparable", &[])])
            .done(),
        module("::Comparable", None, vec![def("<=>", &["(any) -> Integer"])]),
        module("::Greeter", Some("Base"), vec![def("greet", &["() -> String"])]),
        class("::List")
            .members(vec![def("each", &["() { (Integer) -> any } -> self"])])
            .done(),
        class("::Box")
            .params(&["a"])
            .members(vec![def("get", &["() -> 'a"]), def("put", &["('a) -> self"])])
            .done(),
        interface(
            "::_Each",
            &["a"],
            vec![method_with(
                MethodKind::Instance,
                "each",
                &["() { ('a) -> any } -> self"],
            )],
        ),
        class("::Point")
            .members(vec![
                def("initialize", &["(Integer) -> any"]),
                def("x", &["() -> Integer"]),
            ])
            .done(),
        class("::App")
            .members(vec![
                def("make_int", &["() -> Integer"]),
                def("make_str", &["() -> String"]),
                def("takes_int", &["(Integer) -> any"]),
                def("greet", &["(String, ?Integer, name: String, **any) -> String"]),
                def("takes_base", &["(Base) -> any"]),
                def("make_derived", &["() -> Derived"]),
                def("make_list", &["() -> List"]),
                def("takes_each", &["(_Each<Integer>) -> any"]),
                def("point_class", &["() -> Point.class constructor"]),
            ])
            .done(),
    ])
}

fn app_options() -> TypecheckOptions {
    TypecheckOptions {
        self_type: TypeExpr::instance("::App"),
    }
}

#[test]
fn checks_a_program_against_built_interfaces() {
    let sigs = app_signatures();
    let mut subtyping = Subtyping::new(Builder::new(&sigs));
    let mut nodes = NodeFactory::new();

    let make_int = nodes.send(None, "make_int", Vec::new());
    let first = nodes.lvasgn("x", make_int);
    let make_str = nodes.send(None, "make_str", Vec::new());
    let second = nodes.lvasgn("x", make_str);

    let bad_str = nodes.send(None, "make_str", Vec::new());
    let takes_str = nodes.send(None, "takes_int", vec![bad_str.clone()]);
    let derived = nodes.send(None, "make_derived", Vec::new());
    let takes_base = nodes.send(None, "takes_base", vec![derived]);
    let bad_derived = nodes.send(None, "make_derived", Vec::new());
    let takes_derived = nodes.send(None, "takes_int", vec![bad_derived.clone()]);
    let list = nodes.send(None, "make_list", Vec::new());
    let takes_each = nodes.send(None, "takes_each", vec![list]);

    let point_class = nodes.send(None, "point_class", Vec::new());
    let point_arg = nodes.send(None, "make_int", Vec::new());
    let new_point = nodes.send(Some(point_class), "new", vec![point_arg]);
    let assign_point = nodes.lvasgn("p", new_point);
    let p = nodes.lvar("p");
    let read_x = nodes.send(Some(p), "x", Vec::new());
    let p = nodes.lvar("p");
    let missing = nodes.send(Some(p), "missing", Vec::new());

    let name_only = nodes.send(None, "make_str", Vec::new());
    let greet_without_name = nodes.send(None, "greet", vec![name_only]);

    let greeting = nodes.send(None, "make_str", Vec::new());
    let count = nodes.send(None, "make_int", Vec::new());
    let name = nodes.send(None, "make_str", Vec::new());
    let name = nodes.keyword("name", name);
    let extra = nodes.send(None, "make_int", Vec::new());
    let extra = nodes.keyword("extra", extra);
    let options = nodes.hash(vec![name, extra]);
    let greet = nodes.send(None, "greet", vec![greeting, count, options]);

    let program = nodes.begin(vec![
        first,
        second.clone(),
        takes_str,
        takes_base,
        takes_derived,
        takes_each,
        assign_point.clone(),
        read_x.clone(),
        missing.clone(),
        greet_without_name.clone(),
        greet.clone(),
    ]);

    let typing = check_node(&mut subtyping, &program, &app_options());

    let kinds: Vec<&TypeErrorKind> = typing.errors().iter().map(|err| &err.kind).collect();
    assert_eq!(
        kinds,
        vec![
            &TypeErrorKind::IncompatibleAssignment {
                lhs_type: TypeExpr::instance("::Integer"),
                rhs_type: TypeExpr::instance("::String"),
            },
            &TypeErrorKind::InvalidArgument {
                expected: TypeExpr::instance("::Integer"),
                actual: TypeExpr::instance("::String"),
            },
            &TypeErrorKind::InvalidArgument {
                expected: TypeExpr::instance("::Integer"),
                actual: TypeExpr::instance("::Derived"),
            },
            &TypeErrorKind::NoMethod {
                method: "missing".to_string(),
                receiver_type: TypeExpr::instance("::Point"),
            },
            &TypeErrorKind::ExpectedKeywordMissing {
                keyword: "name".to_string(),
            },
        ]
    );
    let error_nodes: Vec<_> = typing.errors().iter().map(|err| err.node).collect();
    assert_eq!(
        error_nodes,
        vec![
            second.id,
            bad_str.id,
            bad_derived.id,
            missing.id,
            greet_without_name.id,
        ]
    );

    assert_eq!(typing.type_of(&assign_point), Some(&TypeExpr::instance("::Point")));
    assert_eq!(typing.type_of(&read_x), Some(&TypeExpr::instance("::Integer")));
    assert_eq!(typing.type_of(&missing), Some(&TypeExpr::Any));
    assert_eq!(typing.type_of(&greet), Some(&TypeExpr::instance("::String")));
    assert_eq!(typing.type_of(&program), Some(&TypeExpr::instance("::String")));
    assert!(subtyping.builder().resolution_failures().is_empty());
}

#[test]
fn nominal_and_union_relations() {
    let sigs = app_signatures();
    let mut subtyping = Subtyping::new(Builder::new(&sigs));
    let int = ty("::Integer");
    let string = ty("::String");
    let base = ty("::Base");
    let derived = ty("::Derived");

    assert!(subtyping.test(&derived, &base));
    assert!(!subtyping.test(&base, &derived));
    assert!(subtyping.test(&derived, &ty("::Comparable")));
    assert!(subtyping.test(&derived, &ty("::Object")));
    assert!(subtyping.test(&ty("::Greeter"), &base));

    assert!(subtyping.test(&int, &ty("::Integer | ::String")));
    assert!(!subtyping.test(&ty("::Integer | ::String"), &int));
    assert!(subtyping.test(&ty("::Integer | ::String"), &ty("::String | ::Integer")));
    assert!(subtyping.test(&derived, &ty("::Base & ::Comparable")));
    assert!(!subtyping.test(&base, &ty("::Base & ::Comparable")));

    assert!(subtyping.test(&string, &TypeExpr::Any));
    assert!(subtyping.test(&TypeExpr::Any, &string));
    assert!(!subtyping.test(&string, &int));

    assert!(subtyping.test(&ty("::Box<::Integer>"), &ty("::Box<::Integer>")));
    assert!(!subtyping.test(&ty("::Box<::Integer>"), &ty("::Box<::String>")));
}

#[test]
fn interfaces_are_matched_by_method_name() {
    let sigs = app_signatures();
    let mut subtyping = Subtyping::new(Builder::new(&sigs));
    let each = ty("::_Each<::Integer>");

    assert!(subtyping.test(&ty("::List"), &each));
    assert!(!subtyping.test(&ty("::Point"), &each));
}

#[test]
fn method_types_are_specialized_for_the_receiver() {
    let sigs = app_signatures();
    let mut subtyping = Subtyping::new(Builder::new(&sigs));

    let box_of_string = ty("::Box<::String>");
    let get = subtyping
        .method_type(&box_of_string, "get")
        .expect("Box#get");
    assert_eq!(get.return_type, ty("::String"));
    let put = subtyping
        .method_type(&box_of_string, "put")
        .expect("Box#put");
    assert_eq!(put.params.required, vec![ty("::String")]);
    assert_eq!(put.return_type, box_of_string);

    let each = subtyping
        .method_type(&ty("::_Each<::Integer>"), "each")
        .expect("_Each#each");
    let block = each.block.expect("block");
    assert_eq!(block.params.required, vec![ty("::Integer")]);

    let new = subtyping
        .method_type(
            &TypeExpr::named(TypeName::class("::Point", true), Vec::new()),
            "new",
        )
        .expect("Point.new");
    assert_eq!(new.params.required, vec![ty("::Integer")]);
    assert_eq!(new.return_type, ty("::Point"));

    assert!(subtyping.method_type(&ty("::Point"), "initialize").is_none());
    assert!(subtyping.method_type(&ty("::Unknown"), "foo").is_none());
    assert!(subtyping.method_type(&TypeExpr::var("a"), "foo").is_none());
}

#[test]
fn dynamic_receivers_accept_any_call() {
    let sigs = app_signatures();
    let mut subtyping = Subtyping::new(Builder::new(&sigs));
    let mut nodes = NodeFactory::new();

    let receiver = nodes.lvar("unknown");
    let one = nodes.int(1);
    let value = nodes.str("v");
    let key = nodes.keyword("key", value);
    let hash = nodes.hash(vec![key]);
    let call = nodes.send(Some(receiver), "whatever", vec![one, hash]);
    let chained = nodes.send(Some(call.clone()), "more", Vec::new());

    let typing = check_node(&mut subtyping, &chained, &TypecheckOptions::default());
    assert!(typing.errors().is_empty());
    assert_eq!(typing.type_of(&call), Some(&TypeExpr::Any));
    assert_eq!(typing.type_of(&chained), Some(&TypeExpr::Any));
}

#[test]
fn self_type_supers_mentioning_the_type_terminate() {
    let sigs = signatures(vec![
        module("::Tagged", Some("Foo | Bar"), vec![def("tag", &["() -> Symbol"])]),
        class("::Foo").members(vec![include("Tagged", &[])]).done(),
        class("::Bar").done(),
        class("::Zed").done(),
        class("::Caller")
            .members(vec![
                def("make_foo", &["() -> Foo"]),
                def("takes_zed", &["(Zed) -> any"]),
            ])
            .done(),
    ]);
    let mut subtyping = Subtyping::new(Builder::new(&sigs));
    let foo = ty("::Foo");
    let zed = ty("::Zed");

    let foo_interface = subtyping
        .builder_mut()
        .build(&TypeName::instance("::Foo"), None)
        .expect("Foo");
    assert_eq!(foo_interface.supers, vec![ty("::Foo | ::Bar")]);

    assert!(!subtyping.test(&foo, &zed));
    assert!(!subtyping.test(&foo, &zed));
    assert!(subtyping.test(&foo, &ty("::Tagged")));
    assert!(subtyping.test(&foo, &ty("::Foo | ::Bar")));

    let mut nodes = NodeFactory::new();
    let make_foo = nodes.send(None, "make_foo", Vec::new());
    let call = nodes.send(None, "takes_zed", vec![make_foo.clone()]);
    let options = TypecheckOptions {
        self_type: TypeExpr::instance("::Caller"),
    };
    let typing = check_node(&mut subtyping, &call, &options);

    assert_eq!(
        typing.errors().iter().map(|err| &err.kind).collect::<Vec<_>>(),
        vec![&TypeErrorKind::InvalidArgument {
            expected: zed,
            actual: foo,
        }]
    );
    assert_eq!(typing.errors()[0].node, make_foo.id);
}
