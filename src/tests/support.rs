use crate::language::{
    names::ModuleName,
    parser::{parse_method_type, parse_type},
    registry::{Decl, Signatures},
    signature::{
        ClassDecl, ExtensionDecl, InterfaceDecl, Member, MethodKind, MethodMember, MixinMember,
        ModuleDecl, SuperClass,
    },
    span::Span,
    types::TypeExpr,
};

pub fn ty(source: &str) -> TypeExpr {
    parse_type(source).unwrap_or_else(|err| panic!("bad type `{source}`: {err}"))
}

pub fn method_with(kind: MethodKind, name: &str, types: &[&str]) -> MethodMember {
    let types = types
        .iter()
        .map(|source| {
            parse_method_type(source)
                .unwrap_or_else(|err| panic!("bad method type `{source}`: {err}"))
        })
        .collect();
    MethodMember::new(name, kind, types)
}

pub fn def(name: &str, types: &[&str]) -> Member {
    Member::Method(method_with(MethodKind::Instance, name, types))
}

pub fn defs(name: &str, types: &[&str]) -> Member {
    Member::Method(method_with(MethodKind::Module, name, types))
}

pub fn include(name: &str, args: &[&str]) -> Member {
    Member::Include(mixin(name, args))
}

pub fn extend(name: &str, args: &[&str]) -> Member {
    Member::Extend(mixin(name, args))
}

fn mixin(name: &str, args: &[&str]) -> MixinMember {
    MixinMember {
        name: ModuleName::parse(name),
        args: args.iter().map(|arg| ty(arg)).collect(),
    }
}

pub struct ClassBuilder {
    decl: ClassDecl,
}

impl ClassBuilder {
    pub fn params(mut self, params: &[&str]) -> Self {
        self.decl.params = params.iter().map(|param| param.to_string()).collect();
        self
    }

    pub fn inherits(mut self, name: &str, args: &[&str]) -> Self {
        self.decl.super_class = Some(SuperClass {
            name: ModuleName::parse(name),
            args: args.iter().map(|arg| ty(arg)).collect(),
        });
        self
    }

    pub fn members(mut self, members: Vec<Member>) -> Self {
        self.decl.members = members;
        self
    }

    pub fn done(self) -> Decl {
        Decl::Class(self.decl)
    }
}

pub fn class(name: &str) -> ClassBuilder {
    ClassBuilder {
        decl: ClassDecl {
            name: ModuleName::parse(name),
            params: Vec::new(),
            super_class: None,
            members: Vec::new(),
            span: Span::default(),
        },
    }
}

pub fn module(name: &str, self_type: Option<&str>, members: Vec<Member>) -> Decl {
    Decl::Module(ModuleDecl {
        name: ModuleName::parse(name),
        params: Vec::new(),
        self_type: self_type.map(ty),
        members,
        span: Span::default(),
    })
}

pub fn generic_module(name: &str, params: &[&str], members: Vec<Member>) -> Decl {
    Decl::Module(ModuleDecl {
        name: ModuleName::parse(name),
        params: params.iter().map(|param| param.to_string()).collect(),
        self_type: None,
        members,
        span: Span::default(),
    })
}

pub fn interface(name: &str, params: &[&str], methods: Vec<MethodMember>) -> Decl {
    Decl::Interface(InterfaceDecl {
        name: ModuleName::parse(name),
        params: params.iter().map(|param| param.to_string()).collect(),
        methods,
        span: Span::default(),
    })
}

pub fn extension(module_name: &str, name: &str, members: Vec<Member>) -> Decl {
    Decl::Extension(ExtensionDecl {
        module_name: ModuleName::parse(module_name),
        name: name.to_string(),
        members,
        span: Span::default(),
    })
}

/// The root hierarchy every signature set needs, plus a few value classes.
pub fn core_decls() -> Vec<Decl> {
    vec![
        class("::BasicObject")
            .members(vec![def("__id__", &["() -> Integer"])])
            .done(),
        class("::Object")
            .inherits("::BasicObject", &[])
            .members(vec![
                include("Kernel", &[]),
                def("to_s", &["() -> String"]),
                def("itself", &["() -> self"]),
            ])
            .done(),
        module("::Kernel", None, vec![def("puts", &["(*any) -> any"])]),
        class("::Module")
            .members(vec![def("name", &["() -> String"])])
            .done(),
        class("::Class")
            .inherits("::Module", &[])
            .members(vec![
                def("new", &["() -> instance"]),
                def("allocate", &["() -> instance"]),
            ])
            .done(),
        class("::Integer")
            .members(vec![def("+", &["(Integer) -> Integer"])])
            .done(),
        class("::String")
            .members(vec![def("+", &["(String) -> String"])])
            .done(),
        class("::Symbol").done(),
    ]
}

pub fn signatures(decls: Vec<Decl>) -> Signatures {
    let mut signatures = Signatures::new();
    signatures
        .extend(core_decls().into_iter().chain(decls))
        .expect("register signatures");
    signatures
}
