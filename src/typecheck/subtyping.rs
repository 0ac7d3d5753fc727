use super::Assignability;
use crate::{
    interface::{Builder, MethodType, Params},
    language::{
        names::{ModuleName, TypeName},
        registry::SignatureRegistry,
        signature::{ClassOrModule, Member},
        span::Span,
        types::{Substitution, TypeExpr},
    },
};
use rustc_hash::FxHashSet;

/// Assignability backed by built interfaces.
///
/// Instance types are related nominally through superclasses and included
/// modules, interface types structurally by method name, and `any` is
/// compatible in both directions. Method lookup picks the first overload.
///
/// A pair met again while it is still being tested is not assignable, so
/// self-type supers that mention the type itself terminate.
pub struct Subtyping<'s, R: SignatureRegistry + ?Sized> {
    builder: Builder<'s, R>,
    in_progress: FxHashSet<(TypeExpr, TypeExpr)>,
}

impl<'s, R: SignatureRegistry + ?Sized> Subtyping<'s, R> {
    pub fn new(builder: Builder<'s, R>) -> Self {
        Self {
            builder,
            in_progress: FxHashSet::default(),
        }
    }

    pub fn builder(&self) -> &Builder<'s, R> {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut Builder<'s, R> {
        &mut self.builder
    }

    /// Every class or module `name` inherits from or includes, itself first.
    pub fn ancestors(&self, name: &ModuleName) -> Vec<ModuleName> {
        let signatures = self.builder.signatures();
        let options = self.builder.options();
        let mut seen = FxHashSet::default();
        let mut ancestors = Vec::new();
        let mut stack = vec![name.absolute()];

        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            ancestors.push(current.clone());
            let Ok(sig) = signatures.find_class_or_module(&current, None) else {
                continue;
            };
            if let ClassOrModule::Class(decl) = sig {
                if decl.name != options.basic_object {
                    let super_name = decl
                        .super_class
                        .as_ref()
                        .map(|super_class| super_class.name.clone())
                        .unwrap_or_else(|| options.object.clone());
                    if let Ok(found) = signatures.find_class_or_module(&super_name, Some(&decl.name)) {
                        stack.push(found.name().clone());
                    }
                }
            }
            for member in sig.members() {
                if let Member::Include(mixin) = member {
                    if let Ok(found) = signatures.find_class_or_module(&mixin.name, Some(sig.name())) {
                        stack.push(found.name().clone());
                    }
                }
            }
        }
        ancestors
    }

    fn relate(&mut self, src: &TypeExpr, dest: &TypeExpr) -> bool {
        match (src, dest) {
            (TypeExpr::Any, _) | (_, TypeExpr::Any) => true,
            _ if src == dest => true,
            (TypeExpr::Union(types), _) => types.iter().all(|ty| self.test(ty, dest)),
            (_, TypeExpr::Union(types)) => types.iter().any(|ty| self.test(src, ty)),
            (_, TypeExpr::Intersection(types)) => types.iter().all(|ty| self.test(src, ty)),
            (TypeExpr::Intersection(types), _) => types.iter().any(|ty| self.test(ty, dest)),
            _ => self.nominal(src, dest),
        }
    }

    fn nominal(&mut self, src: &TypeExpr, dest: &TypeExpr) -> bool {
        let (
            TypeExpr::Name {
                name: src_name,
                args: src_args,
            },
            TypeExpr::Name {
                name: dest_name,
                args: dest_args,
            },
        ) = (src, dest)
        else {
            return false;
        };

        match (src_name, dest_name) {
            (TypeName::Instance(from), TypeName::Instance(to))
            | (TypeName::Class { name: from, .. }, TypeName::Class { name: to, .. }) => {
                if from.absolute() == to.absolute() {
                    return src_args.len() == dest_args.len()
                        && src_args
                            .iter()
                            .zip(dest_args)
                            .all(|(s, d)| self.test(s, d) && self.test(d, s));
                }
                if self.ancestors(from).contains(&to.absolute()) {
                    return true;
                }
                self.satisfies_supers(src, dest)
            }
            (_, TypeName::Interface(_)) => self.structural(src, dest),
            (TypeName::Module(from), TypeName::Module(to)) => from.absolute() == to.absolute(),
            _ => false,
        }
    }

    /// A module's self-type constraint makes its instances compatible with
    /// that type.
    fn satisfies_supers(&mut self, src: &TypeExpr, dest: &TypeExpr) -> bool {
        let TypeExpr::Name { name, .. } = src else {
            return false;
        };
        let supers = match self.builder.build(name, None) {
            Ok(interface) => interface.supers.clone(),
            Err(_) => return false,
        };
        supers
            .iter()
            .any(|super_type| super_type != src && self.test(super_type, dest))
    }

    fn structural(&mut self, src: &TypeExpr, dest: &TypeExpr) -> bool {
        let (TypeExpr::Name { name: src_name, .. }, TypeExpr::Name { name: dest_name, .. }) =
            (src, dest)
        else {
            return false;
        };
        let required = match self.builder.build(dest_name, None) {
            Ok(interface) => interface,
            Err(err) => {
                tracing::warn!(%err, "cannot build interface type");
                return false;
            }
        };
        let provided = match self.builder.build(src_name, None) {
            Ok(interface) => interface,
            Err(err) => {
                tracing::warn!(%err, "cannot build source type");
                return false;
            }
        };
        required
            .methods
            .keys()
            .all(|method| provided.methods.contains_key(method))
    }
}

fn permissive_method_type() -> MethodType {
    MethodType {
        type_params: Vec::new(),
        params: Params {
            rest: Some(TypeExpr::Any),
            rest_keywords: Some(TypeExpr::Any),
            ..Params::default()
        },
        return_type: TypeExpr::Any,
        block: None,
        span: Span::default(),
    }
}

impl<'s, R: SignatureRegistry + ?Sized> Assignability for Subtyping<'s, R> {
    fn test(&mut self, src: &TypeExpr, dest: &TypeExpr) -> bool {
        let pair = (src.clone(), dest.clone());
        if !self.in_progress.insert(pair.clone()) {
            tracing::trace!(%src, %dest, "assignability cycle");
            return false;
        }
        let result = self.relate(src, dest);
        self.in_progress.remove(&pair);
        result
    }

    fn method_type(&mut self, receiver: &TypeExpr, method: &str) -> Option<MethodType> {
        let (name, args) = match receiver {
            TypeExpr::Any => return Some(permissive_method_type()),
            TypeExpr::Name { name, args } => (name, args),
            _ => return None,
        };
        let interface = match self.builder.build(name, None) {
            Ok(interface) => interface,
            Err(err) => {
                tracing::warn!(%err, receiver = %receiver, "cannot build receiver interface");
                return None;
            }
        };
        let method_type = interface.method(method)?.types.first()?;
        let instance_args: &[TypeExpr] = match name {
            TypeName::Instance(_) => args,
            _ => &[],
        };
        let subst = Substitution::for_receiver(name.name(), instance_args, receiver.clone())
            .with_args(&interface.params, args);
        Some(method_type.substitute(&subst))
    }
}
