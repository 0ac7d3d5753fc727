use crate::language::{names::ModuleName, span::Span, types::TypeExpr};

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    pub name: ModuleName,
    pub params: Vec<String>,
    pub super_class: Option<SuperClass>,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SuperClass {
    pub name: ModuleName,
    pub args: Vec<TypeExpr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModuleDecl {
    pub name: ModuleName,
    pub params: Vec<String>,
    pub self_type: Option<TypeExpr>,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceDecl {
    pub name: ModuleName,
    pub params: Vec<String>,
    pub methods: Vec<MethodMember>,
    pub span: Span,
}

/// Instance methods added to an existing class or module outside its
/// primary declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtensionDecl {
    pub module_name: ModuleName,
    pub name: String,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    Method(MethodMember),
    Include(MixinMember),
    Extend(MixinMember),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MixinMember {
    pub name: ModuleName,
    pub args: Vec<TypeExpr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Instance,
    Module,
    InstanceAndModule,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodAttribute {
    Incompatible,
    Private,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodMember {
    pub name: String,
    pub kind: MethodKind,
    pub types: Vec<MethodTypeDecl>,
    pub attributes: Vec<MethodAttribute>,
}

impl MethodMember {
    pub fn new(name: impl Into<String>, kind: MethodKind, types: Vec<MethodTypeDecl>) -> Self {
        Self {
            name: name.into(),
            kind,
            types,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: MethodAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn is_instance_method(&self) -> bool {
        matches!(self.kind, MethodKind::Instance | MethodKind::InstanceAndModule)
    }

    pub fn is_module_method(&self) -> bool {
        matches!(self.kind, MethodKind::Module | MethodKind::InstanceAndModule)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodTypeDecl {
    pub type_params: Vec<String>,
    pub params: Option<Box<ParamsDecl>>,
    pub block: Option<BlockDecl>,
    pub return_type: TypeExpr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockDecl {
    pub params: Option<Box<ParamsDecl>>,
    pub return_type: TypeExpr,
}

/// One link of a parameter list as written.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamsDecl {
    pub param: ParamDecl,
    pub next: Option<Box<ParamsDecl>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParamDecl {
    Required(TypeExpr),
    Optional(TypeExpr),
    Rest(TypeExpr),
    RequiredKeyword(String, TypeExpr),
    OptionalKeyword(String, TypeExpr),
    RestKeyword(TypeExpr),
}

impl ParamsDecl {
    /// Links `params` in order; `None` for an empty list.
    pub fn chain(params: Vec<ParamDecl>) -> Option<Box<ParamsDecl>> {
        params
            .into_iter()
            .rev()
            .fold(None, |next, param| Some(Box::new(ParamsDecl { param, next })))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamDecl> {
        std::iter::successors(Some(self), |link| link.next.as_deref()).map(|link| &link.param)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ClassOrModule<'a> {
    Class(&'a ClassDecl),
    Module(&'a ModuleDecl),
}

impl<'a> ClassOrModule<'a> {
    pub fn name(&self) -> &'a ModuleName {
        match self {
            ClassOrModule::Class(decl) => &decl.name,
            ClassOrModule::Module(decl) => &decl.name,
        }
    }

    pub fn params(&self) -> &'a [String] {
        match self {
            ClassOrModule::Class(decl) => &decl.params,
            ClassOrModule::Module(decl) => &decl.params,
        }
    }

    pub fn members(&self) -> &'a [Member] {
        match self {
            ClassOrModule::Class(decl) => &decl.members,
            ClassOrModule::Module(decl) => &decl.members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_preserves_declaration_order() {
        let chain = ParamsDecl::chain(vec![
            ParamDecl::Required(TypeExpr::Any),
            ParamDecl::RestKeyword(TypeExpr::Any),
        ])
        .expect("non-empty chain");
        let params: Vec<&ParamDecl> = chain.iter().collect();
        assert!(matches!(params[0], ParamDecl::Required(_)));
        assert!(matches!(params[1], ParamDecl::RestKeyword(_)));
        assert!(ParamsDecl::chain(Vec::new()).is_none());
    }

    #[test]
    fn module_function_methods_are_both_kinds() {
        let member = MethodMember::new("puts", MethodKind::InstanceAndModule, Vec::new());
        assert!(member.is_instance_method());
        assert!(member.is_module_method());
    }
}
