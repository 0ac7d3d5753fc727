pub mod builder;
pub mod error;

pub use builder::{merge_interface, Builder, BuilderOptions, ResolutionFailure};
pub use error::{BuildError, BuildResult};

use crate::language::{
    names::TypeName,
    signature::MethodAttribute,
    span::Span,
    types::{Substitution, TypeExpr},
};
use indexmap::IndexMap;
use std::{fmt, rc::Rc};

/// The flattened method table of one resolved type name.
#[derive(Clone, Debug, PartialEq)]
pub struct Interface {
    pub name: TypeName,
    pub params: Vec<String>,
    pub methods: IndexMap<String, Method>,
    pub supers: Vec<TypeExpr>,
}

impl Interface {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Binds the interface's generic parameters to `args` and replaces the
    /// pseudo-types as `subst` says, across every method and super.
    pub fn instantiate(&self, args: &[TypeExpr], subst: &Substitution) -> Interface {
        let subst = subst.clone().with_args(&self.params, args);
        Interface {
            name: self.name.clone(),
            params: self.params.clone(),
            methods: self
                .methods
                .iter()
                .map(|(name, method)| (name.clone(), method.substitute(&subst)))
                .collect(),
            supers: self.supers.iter().map(|ty| ty.substitute(&subst)).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub type_name: TypeName,
    pub name: String,
    pub types: Vec<MethodType>,
    pub super_method: Option<Rc<Method>>,
    pub attributes: Vec<MethodAttribute>,
}

impl Method {
    pub fn with_super(&self, super_method: Method) -> Method {
        Method {
            super_method: Some(Rc::new(super_method)),
            ..self.clone()
        }
    }

    /// Same owner, name, overloads and attributes; super links are ignored.
    pub fn same_definition(&self, other: &Method) -> bool {
        self.type_name == other.type_name
            && self.name == other.name
            && self.types == other.types
            && self.attributes == other.attributes
    }

    /// Whether `other` is this method or one it already overrides.
    pub fn include_in_chain(&self, other: &Method) -> bool {
        self.super_chain().any(|method| method.same_definition(other))
    }

    /// This method followed by every method it overrides, most derived first.
    pub fn super_chain(&self) -> impl Iterator<Item = &Method> {
        std::iter::successors(Some(self), |method| method.super_method.as_deref())
    }

    pub fn has_attribute(&self, attribute: MethodAttribute) -> bool {
        self.attributes.contains(&attribute)
    }

    pub fn substitute(&self, subst: &Substitution) -> Method {
        Method {
            type_name: self.type_name.clone(),
            name: self.name.clone(),
            types: self.types.iter().map(|ty| ty.substitute(subst)).collect(),
            super_method: self
                .super_method
                .as_ref()
                .map(|method| Rc::new(method.substitute(subst))),
            attributes: self.attributes.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodType {
    pub type_params: Vec<String>,
    pub params: Params,
    pub return_type: TypeExpr,
    pub block: Option<Block>,
    pub span: Span,
}

impl MethodType {
    pub fn substitute(&self, subst: &Substitution) -> MethodType {
        let subst = subst.without(&self.type_params);
        MethodType {
            type_params: self.type_params.clone(),
            params: self.params.substitute(&subst),
            return_type: self.return_type.substitute(&subst),
            block: self.block.as_ref().map(|block| Block {
                params: block.params.substitute(&subst),
                return_type: block.return_type.substitute(&subst),
            }),
            span: self.span,
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_params.is_empty() {
            let vars: Vec<String> = self.type_params.iter().map(|v| format!("'{v}")).collect();
            write!(f, "<{}> ", vars.join(", "))?;
        }
        write!(f, "({})", self.params)?;
        if let Some(block) = &self.block {
            write!(f, " {{ ({}) -> {} }}", block.params, block.return_type)?;
        }
        write!(f, " -> {}", self.return_type)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub params: Params,
    pub return_type: TypeExpr,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params {
    pub required: Vec<TypeExpr>,
    pub optional: Vec<TypeExpr>,
    pub rest: Option<TypeExpr>,
    pub required_keywords: IndexMap<String, TypeExpr>,
    pub optional_keywords: IndexMap<String, TypeExpr>,
    pub rest_keywords: Option<TypeExpr>,
}

impl Params {
    pub fn has_keywords(&self) -> bool {
        !self.required_keywords.is_empty()
            || !self.optional_keywords.is_empty()
            || self.rest_keywords.is_some()
    }

    /// Required then optional positional parameter types.
    pub fn flat_unnamed_params(&self) -> impl Iterator<Item = &TypeExpr> {
        self.required.iter().chain(self.optional.iter())
    }

    /// Required then optional keyword parameters.
    pub fn flat_keywords(&self) -> impl Iterator<Item = (&String, &TypeExpr)> {
        self.required_keywords
            .iter()
            .chain(self.optional_keywords.iter())
    }

    pub fn declares_keyword(&self, name: &str) -> bool {
        self.required_keywords.contains_key(name) || self.optional_keywords.contains_key(name)
    }

    pub fn substitute(&self, subst: &Substitution) -> Params {
        let map_keywords = |keywords: &IndexMap<String, TypeExpr>| -> IndexMap<String, TypeExpr> {
            keywords
                .iter()
                .map(|(name, ty)| (name.clone(), ty.substitute(subst)))
                .collect()
        };
        Params {
            required: self.required.iter().map(|ty| ty.substitute(subst)).collect(),
            optional: self.optional.iter().map(|ty| ty.substitute(subst)).collect(),
            rest: self.rest.as_ref().map(|ty| ty.substitute(subst)),
            required_keywords: map_keywords(&self.required_keywords),
            optional_keywords: map_keywords(&self.optional_keywords),
            rest_keywords: self.rest_keywords.as_ref().map(|ty| ty.substitute(subst)),
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        parts.extend(self.required.iter().map(|ty| ty.to_string()));
        parts.extend(self.optional.iter().map(|ty| format!("?{ty}")));
        if let Some(rest) = &self.rest {
            parts.push(format!("*{rest}"));
        }
        parts.extend(
            self.required_keywords
                .iter()
                .map(|(name, ty)| format!("{name}: {ty}")),
        );
        parts.extend(
            self.optional_keywords
                .iter()
                .map(|(name, ty)| format!("?{name}: {ty}")),
        );
        if let Some(rest) = &self.rest_keywords {
            parts.push(format!("**{rest}"));
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(owner: &str, ret: &str) -> Method {
        Method {
            type_name: TypeName::instance(owner),
            name: "foo".into(),
            types: vec![MethodType {
                type_params: Vec::new(),
                params: Params::default(),
                return_type: TypeExpr::instance(ret),
                block: None,
                span: Span::default(),
            }],
            super_method: None,
            attributes: Vec::new(),
        }
    }

    #[test]
    fn include_in_chain_walks_super_links() {
        let base = method("::M", "::Integer");
        let derived = method("::D", "::String").with_super(base.clone());
        assert!(derived.include_in_chain(&base));
        assert!(derived.include_in_chain(&derived));
        assert!(!base.include_in_chain(&derived));
        let owners: Vec<String> = derived
            .super_chain()
            .map(|m| m.type_name.to_string())
            .collect();
        assert_eq!(owners, vec!["::D", "::M"]);
    }

    #[test]
    fn method_type_params_shadow_interface_params() {
        let mut foo = method("::Box", "::Integer");
        foo.types[0].type_params = vec!["a".into()];
        foo.types[0].return_type = TypeExpr::var("a");
        foo.types[0].params.required.push(TypeExpr::var("b"));

        let interface = Interface {
            name: TypeName::instance("::Box"),
            params: vec!["a".into(), "b".into()],
            methods: IndexMap::from([("foo".to_string(), foo)]),
            supers: Vec::new(),
        };
        let instantiated = interface.instantiate(
            &[TypeExpr::instance("::String"), TypeExpr::instance("::Symbol")],
            &Substitution::polymorphic(),
        );
        let method_type = &instantiated.methods["foo"].types[0];
        assert_eq!(method_type.return_type, TypeExpr::var("a"));
        assert_eq!(method_type.params.required, vec![TypeExpr::instance("::Symbol")]);
    }

    #[test]
    fn params_display_lists_every_kind() {
        let params = Params {
            required: vec![TypeExpr::instance("Integer")],
            optional: vec![TypeExpr::instance("String")],
            rest: Some(TypeExpr::Any),
            required_keywords: IndexMap::from([("name".to_string(), TypeExpr::Any)]),
            optional_keywords: IndexMap::new(),
            rest_keywords: Some(TypeExpr::Any),
        };
        assert_eq!(
            params.to_string(),
            "Integer, ?String, *any, name: any, **any"
        );
    }
}
