use crate::language::names::{ModuleName, TypeName};
use std::{collections::HashMap, fmt};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Any,
    Var(String),
    SelfType,
    Instance,
    Class,
    Name { name: TypeName, args: Vec<TypeExpr> },
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
}

impl TypeExpr {
    pub fn instance(name: &str) -> Self {
        TypeExpr::Name {
            name: TypeName::instance(name),
            args: Vec::new(),
        }
    }

    pub fn named(name: TypeName, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Name { name, args }
    }

    pub fn var(name: impl Into<String>) -> Self {
        TypeExpr::Var(name.into())
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeExpr::Any)
    }

    pub fn substitute(&self, subst: &Substitution) -> TypeExpr {
        match self {
            TypeExpr::Var(name) => subst
                .vars
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeExpr::SelfType => subst.self_type.clone(),
            TypeExpr::Instance => subst.instance_type.clone(),
            TypeExpr::Class => subst.module_type.clone(),
            TypeExpr::Name { name, args } => TypeExpr::Name {
                name: name.clone(),
                args: args.iter().map(|ty| ty.substitute(subst)).collect(),
            },
            TypeExpr::Union(types) => {
                TypeExpr::Union(types.iter().map(|ty| ty.substitute(subst)).collect())
            }
            TypeExpr::Intersection(types) => {
                TypeExpr::Intersection(types.iter().map(|ty| ty.substitute(subst)).collect())
            }
            TypeExpr::Any => TypeExpr::Any,
        }
    }

    /// Rewrites every embedded type name, leaving the shape untouched.
    pub fn map_names(&self, f: &mut impl FnMut(&TypeName) -> TypeName) -> TypeExpr {
        match self {
            TypeExpr::Name { name, args } => TypeExpr::Name {
                name: f(name),
                args: args.iter().map(|ty| ty.map_names(f)).collect(),
            },
            TypeExpr::Union(types) => {
                TypeExpr::Union(types.iter().map(|ty| ty.map_names(f)).collect())
            }
            TypeExpr::Intersection(types) => {
                TypeExpr::Intersection(types.iter().map(|ty| ty.map_names(f)).collect())
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Any => write!(f, "any"),
            TypeExpr::Var(name) => write!(f, "'{name}"),
            TypeExpr::SelfType => write!(f, "self"),
            TypeExpr::Instance => write!(f, "instance"),
            TypeExpr::Class => write!(f, "class"),
            TypeExpr::Name { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    let rendered: Vec<String> = args.iter().map(|ty| ty.to_string()).collect();
                    write!(f, "<{}>", rendered.join(", "))?;
                }
                Ok(())
            }
            TypeExpr::Union(types) => {
                let rendered: Vec<String> = types.iter().map(|ty| ty.to_string()).collect();
                write!(f, "({})", rendered.join(" | "))
            }
            TypeExpr::Intersection(types) => {
                let rendered: Vec<String> = types.iter().map(|ty| ty.to_string()).collect();
                write!(f, "({})", rendered.join(" & "))
            }
        }
    }
}

/// Replacement for generic parameters and the `self` / `instance` / `class`
/// pseudo-types.
#[derive(Clone, Debug)]
pub struct Substitution {
    pub vars: HashMap<String, TypeExpr>,
    pub self_type: TypeExpr,
    pub instance_type: TypeExpr,
    pub module_type: TypeExpr,
}

impl Substitution {
    /// Leaves the pseudo-types symbolic, as they are while building.
    pub fn polymorphic() -> Self {
        Self {
            vars: HashMap::new(),
            self_type: TypeExpr::SelfType,
            instance_type: TypeExpr::Instance,
            module_type: TypeExpr::Class,
        }
    }

    /// Binds `params` to `args` pairwise; parameters without an argument stay
    /// as variables.
    pub fn with_args(mut self, params: &[String], args: &[TypeExpr]) -> Self {
        for (param, arg) in params.iter().zip(args) {
            self.vars.insert(param.clone(), arg.clone());
        }
        self
    }

    pub fn with_self(mut self, self_type: TypeExpr) -> Self {
        self.self_type = self_type;
        self
    }

    pub fn with_instance(mut self, instance_type: TypeExpr) -> Self {
        self.instance_type = instance_type;
        self
    }

    pub fn with_module(mut self, module_type: TypeExpr) -> Self {
        self.module_type = module_type;
        self
    }

    /// Drops bindings shadowed by a method's own type parameters.
    pub fn without(&self, shadowed: &[String]) -> Substitution {
        if shadowed.is_empty() {
            return self.clone();
        }
        let mut subst = self.clone();
        for name in shadowed {
            subst.vars.remove(name);
        }
        subst
    }

    /// The concrete substitution for values of `name` with `args`.
    pub fn for_receiver(name: &ModuleName, args: &[TypeExpr], self_type: TypeExpr) -> Self {
        Substitution::polymorphic()
            .with_self(self_type)
            .with_instance(TypeExpr::Name {
                name: TypeName::Instance(name.clone()),
                args: args.to_vec(),
            })
            .with_module(TypeExpr::Name {
                name: TypeName::Class {
                    name: name.clone(),
                    constructor: true,
                },
                args: Vec::new(),
            })
    }
}
